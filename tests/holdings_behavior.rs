//! Behavior-driven tests for the holdings source
//!
//! These tests verify HOW holdings tables are read from files and URLs and
//! how malformed input is reported.

use std::future::Future;
use std::io::Write;
use std::pin::Pin;

use ferrofolio_core::{
    HoldingsError, HoldingsLocation, HttpClient, HttpError, HttpRequest, HttpResponse, Market,
    MarketCodes,
};

struct StaticHttpClient {
    response: Result<HttpResponse, HttpError>,
}

impl HttpClient for StaticHttpClient {
    fn execute<'a>(
        &'a self,
        _request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let response = self.response.clone();
        Box::pin(async move { response })
    }
}

fn offline() -> StaticHttpClient {
    StaticHttpClient {
        response: Err(HttpError::new("network disabled in tests")),
    }
}

const PORTFOLIO: &str = "Ticker,Market,Quantity,Cost_Price\n\
                         AAPL,US,10,100\n\
                         600000.SS,CN,100,10\n";

// =============================================================================
// Holdings: Sources
// =============================================================================

#[tokio::test]
async fn when_holdings_file_exists_rows_are_loaded_in_order() {
    // Given: A holdings file on disk
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(PORTFOLIO.as_bytes()).expect("write fixture");
    let location = HoldingsLocation::parse(&file.path().display().to_string());

    // When: The table is loaded
    let holdings = location
        .load(&offline(), &MarketCodes::default(), 1_000)
        .await
        .expect("holdings load");

    // Then: Rows keep their order and market labels are resolved
    assert!(matches!(location, HoldingsLocation::File(_)));
    assert_eq!(holdings.len(), 2);
    assert_eq!(holdings[0].ticker.as_str(), "AAPL");
    assert_eq!(holdings[0].market, Market::Foreign);
    assert_eq!(holdings[1].ticker.as_str(), "600000.SS");
    assert_eq!(holdings[1].market, Market::Domestic);
}

#[tokio::test]
async fn when_holdings_url_responds_the_body_is_parsed() {
    // Given: A remote CSV served by the HTTP client
    let client = StaticHttpClient {
        response: Ok(HttpResponse::ok(PORTFOLIO)),
    };
    let location = HoldingsLocation::parse("https://example.test/portfolio.csv");

    // When: The table is loaded
    let holdings = location
        .load(&client, &MarketCodes::default(), 1_000)
        .await
        .expect("holdings load");

    // Then: The same rows are produced as from a file
    assert_eq!(holdings.len(), 2);
    assert_eq!(holdings[0].quantity, 10.0);
}

#[tokio::test]
async fn when_holdings_url_fails_a_download_error_is_returned() {
    // Given: A server answering 404
    let client = StaticHttpClient {
        response: Ok(HttpResponse::new(404, "not found")),
    };
    let location = HoldingsLocation::parse("https://example.test/missing.csv");

    // When: The table is loaded
    let err = location
        .load(&client, &MarketCodes::default(), 1_000)
        .await
        .expect_err("must fail");

    // Then: The URL and status are reported
    match err {
        HoldingsError::Download { url, message } => {
            assert_eq!(url, "https://example.test/missing.csv");
            assert!(message.contains("404"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn when_holdings_file_is_missing_an_io_error_names_the_path() {
    // Given: A path inside an empty directory
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("absent.csv");
    let location = HoldingsLocation::parse(&path.display().to_string());

    // When: The table is loaded
    let err = location
        .load(&offline(), &MarketCodes::default(), 1_000)
        .await
        .expect_err("must fail");

    // Then: The error carries the path
    assert!(matches!(err, HoldingsError::Io { .. }));
    assert!(err.to_string().contains("absent.csv"));
}

// =============================================================================
// Holdings: Validation
// =============================================================================

#[tokio::test]
async fn when_market_label_is_unknown_the_row_is_identified() {
    // Given: A table using a label only known through an alias
    let client = StaticHttpClient {
        response: Ok(HttpResponse::ok("Ticker,Market,Quantity,Cost_Price\n0700.HK,HK,5,300\n")),
    };
    let location = HoldingsLocation::parse("https://example.test/hk.csv");

    // When: It is loaded without and then with the alias
    let err = location
        .load(&client, &MarketCodes::default(), 1_000)
        .await
        .expect_err("must fail");
    let mut codes = MarketCodes::default();
    codes.insert_spec("HK=FOREIGN").expect("valid alias");
    let holdings = location.load(&client, &codes, 1_000).await.expect("loads");

    // Then: The first load names row 1, the second resolves the market
    assert!(matches!(
        err,
        HoldingsError::InvalidRow {
            row: 1,
            field: "Market",
            ..
        }
    ));
    assert_eq!(holdings[0].market, Market::Foreign);
}

#[tokio::test]
async fn when_cost_price_is_not_numeric_loading_fails_fast() {
    // Given: A table whose third row has a text cost
    let body = "Ticker,Market,Quantity,Cost_Price\nA,US,1,1\nB,US,1,1\nC,US,1,abc\nD,US,1,1\n";
    let client = StaticHttpClient {
        response: Ok(HttpResponse::ok(body)),
    };

    // When: The table is loaded
    let err = HoldingsLocation::parse("https://example.test/bad.csv")
        .load(&client, &MarketCodes::default(), 1_000)
        .await
        .expect_err("must fail");

    // Then: The failing row and field are reported
    let message = err.to_string();
    assert!(message.contains("row 3"), "{message}");
    assert!(message.contains("Cost_Price"), "{message}");
}
