//! Holdings table loader.
//!
//! The table is CSV with the columns `Ticker`, `Market`, `Quantity` and
//! `Cost_Price`. Header names are matched case-insensitively, column order
//! is free and unknown columns are ignored. Data rows are numbered from 1
//! in error messages.

use std::io::Read;
use std::path::PathBuf;

use crate::http_client::{HttpClient, HttpRequest};
use crate::{Holding, HoldingsError, MarketCodes, Ticker, ValidationError};

const TICKER: &str = "ticker";
const MARKET: &str = "market";
const QUANTITY: &str = "quantity";
const COST_PRICE: &str = "cost_price";

/// Where the holdings table lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoldingsLocation {
    File(PathBuf),
    Url(String),
}

impl HoldingsLocation {
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Self::Url(trimmed.to_owned())
        } else {
            Self::File(PathBuf::from(trimmed))
        }
    }

    /// Reads and parses the table.
    pub async fn load(
        &self,
        http_client: &dyn HttpClient,
        codes: &MarketCodes,
        timeout_ms: u64,
    ) -> Result<Vec<Holding>, HoldingsError> {
        let holdings = match self {
            Self::File(path) => {
                let file = std::fs::File::open(path).map_err(|source| HoldingsError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                parse_holdings_csv(file, codes)?
            }
            Self::Url(url) => {
                let request = HttpRequest::get(url.as_str()).with_timeout_ms(timeout_ms);
                let response = http_client.execute(request).await.map_err(|e| {
                    HoldingsError::Download {
                        url: url.clone(),
                        message: e.message().to_owned(),
                    }
                })?;
                if !response.is_success() {
                    return Err(HoldingsError::Download {
                        url: url.clone(),
                        message: format!("status {}", response.status),
                    });
                }
                parse_holdings_csv(response.body.as_bytes(), codes)?
            }
        };

        tracing::info!(location = %self, rows = holdings.len(), "holdings loaded");
        Ok(holdings)
    }
}

impl std::fmt::Display for HoldingsLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    ticker: usize,
    market: usize,
    quantity: usize,
    cost_price: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, HoldingsError> {
        let find = |column: &'static str| {
            headers
                .iter()
                .position(|header| normalize_header(header) == column)
                .ok_or(HoldingsError::MissingColumn { column })
        };

        Ok(Self {
            ticker: find(TICKER)?,
            market: find(MARKET)?,
            quantity: find(QUANTITY)?,
            cost_price: find(COST_PRICE)?,
        })
    }
}

/// Lowercases and maps spaces/dashes to underscores, so `Cost Price`,
/// `cost-price` and `Cost_Price` all match. A UTF-8 BOM is dropped.
fn normalize_header(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .trim()
        .to_ascii_lowercase()
        .replace([' ', '-'], "_")
}

/// Parses a decimal number. Commas are accepted only as thousands separators
/// in the integer part (`1,200.5`); `1,5` or `1,,0` are rejected.
fn parse_number(raw: &str) -> Option<f64> {
    let (integer, fraction) = match raw.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (raw, None),
    };
    if fraction.is_some_and(|fraction| fraction.contains(',')) {
        return None;
    }

    if integer.contains(',') {
        let digits = integer.trim_start_matches(['+', '-']);
        let mut groups = digits.split(',');
        let leading = groups.next().unwrap_or_default();
        let leading_ok = (1..=3).contains(&leading.len())
            && leading.bytes().all(|byte| byte.is_ascii_digit());
        let rest_ok = groups
            .all(|group| group.len() == 3 && group.bytes().all(|byte| byte.is_ascii_digit()));
        if !leading_ok || !rest_ok {
            return None;
        }
    }

    raw.replace(',', "").parse::<f64>().ok()
}

/// Parses a holdings table, failing on the first malformed row.
pub fn parse_holdings_csv<R: Read>(
    reader: R,
    codes: &MarketCodes,
) -> Result<Vec<Holding>, HoldingsError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = ColumnIndex::from_headers(reader.headers()?)?;
    let mut holdings = Vec::new();

    for (index, record) in reader.records().enumerate() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        holdings.push(parse_row(index + 1, &record, columns, codes)?);
    }

    Ok(holdings)
}

fn parse_row(
    row: usize,
    record: &csv::StringRecord,
    columns: ColumnIndex,
    codes: &MarketCodes,
) -> Result<Holding, HoldingsError> {
    let invalid = |field: &'static str, reason: String| HoldingsError::InvalidRow {
        row,
        field,
        reason,
    };
    let cell = |field: &'static str, index: usize| {
        record
            .get(index)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| invalid(field, String::from("is missing")))
    };
    let number = |field: &'static str, index: usize| -> Result<f64, HoldingsError> {
        let raw = cell(field, index)?;
        parse_number(raw).ok_or_else(|| invalid(field, format!("is not a number: '{raw}'")))
    };

    let ticker = Ticker::parse(cell("Ticker", columns.ticker)?)
        .map_err(|e| invalid("Ticker", e.to_string()))?;
    let market = codes
        .resolve(cell("Market", columns.market)?)
        .map_err(|e| invalid("Market", e.to_string()))?;
    let quantity = number("Quantity", columns.quantity)?;
    let cost_price = number("Cost_Price", columns.cost_price)?;

    Holding::new(ticker, market, quantity, cost_price).map_err(|e| {
        let field = match &e {
            ValidationError::NonFiniteValue { field }
            | ValidationError::NegativeValue { field } => {
                if *field == "quantity" {
                    "Quantity"
                } else {
                    "Cost_Price"
                }
            }
            _ => "row",
        };
        invalid(field, e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Market;

    fn parse(csv: &str) -> Result<Vec<Holding>, HoldingsError> {
        parse_holdings_csv(csv.as_bytes(), &MarketCodes::default())
    }

    #[test]
    fn parses_rows_with_aliases_and_reordered_columns() {
        let holdings = parse(
            "Market,Ticker,Cost_Price,Quantity,Note\n\
             US,aapl,100,10,long term\n\
             CN,600000,10.5,100,\n\
             FOREIGN,MSFT,\"1,200.5\",2,\n",
        )
        .expect("table parses");

        assert_eq!(holdings.len(), 3);
        assert_eq!(holdings[0].ticker.as_str(), "AAPL");
        assert_eq!(holdings[0].market, Market::Foreign);
        assert_eq!(holdings[0].quantity, 10.0);
        assert_eq!(holdings[1].market, Market::Domestic);
        assert_eq!(holdings[1].cost_price, 10.5);
        assert_eq!(holdings[2].cost_price, 1_200.5);
    }

    #[test]
    fn header_matching_is_lenient() {
        let holdings = parse("\u{feff}TICKER, market ,quantity,Cost Price\nAAPL,US,1,2\n")
            .expect("table parses");
        assert_eq!(holdings.len(), 1);
    }

    #[test]
    fn missing_column_is_reported() {
        let err = parse("Ticker,Market,Quantity\nAAPL,US,1\n").expect_err("must fail");
        assert!(matches!(
            err,
            HoldingsError::MissingColumn {
                column: COST_PRICE
            }
        ));
    }

    #[test]
    fn unknown_market_identifies_row_and_field() {
        let err = parse("Ticker,Market,Quantity,Cost_Price\nAAPL,US,1,2\nX,MARS,1,2\n")
            .expect_err("must fail");
        match err {
            HoldingsError::InvalidRow { row, field, reason } => {
                assert_eq!(row, 2);
                assert_eq!(field, "Market");
                assert!(reason.contains("MARS"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_quantity_fails_fast() {
        let err = parse("Ticker,Market,Quantity,Cost_Price\nAAPL,US,,2\n").expect_err("must fail");
        assert!(matches!(
            err,
            HoldingsError::InvalidRow {
                row: 1,
                field: "Quantity",
                ..
            }
        ));
    }

    #[test]
    fn commas_are_only_thousands_separators() {
        for (quantity, cost, field) in [
            ("1,5", "2", "Quantity"),
            ("1,,,0", "2", "Quantity"),
            ("1", "9,9", "Cost_Price"),
            ("1", "1.2,5", "Cost_Price"),
        ] {
            let csv = format!(
                "Ticker,Market,Quantity,Cost_Price\nAAPL,US,\"{quantity}\",\"{cost}\"\n"
            );
            match parse(&csv).expect_err("ambiguous comma must fail") {
                HoldingsError::InvalidRow { row, field: actual, .. } => {
                    assert_eq!((row, actual), (1, field), "{quantity} / {cost}");
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn grouped_digits_parse() {
        assert_eq!(parse_number("1,234,567"), Some(1_234_567.0));
        assert_eq!(parse_number("12,345.25"), Some(12_345.25));
        assert_eq!(parse_number("42"), Some(42.0));
        assert_eq!(parse_number(",100"), None);
        assert_eq!(parse_number("1,0000"), None);
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let err =
            parse("Ticker,Market,Quantity,Cost_Price\nAAPL,US,-3,2\n").expect_err("must fail");
        assert!(matches!(
            err,
            HoldingsError::InvalidRow {
                field: "Quantity",
                ..
            }
        ));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let holdings =
            parse("Ticker,Market,Quantity,Cost_Price\n\nAAPL,US,1,2\n,,,\n").expect("parses");
        assert_eq!(holdings.len(), 1);
    }

    #[test]
    fn location_detects_urls() {
        assert_eq!(
            HoldingsLocation::parse(" https://example.test/p.csv "),
            HoldingsLocation::Url(String::from("https://example.test/p.csv"))
        );
        assert_eq!(
            HoldingsLocation::parse("portfolio.csv"),
            HoldingsLocation::File(PathBuf::from("portfolio.csv"))
        );
    }
}
