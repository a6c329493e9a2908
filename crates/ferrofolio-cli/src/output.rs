use std::io::{self, Write};

use ferrofolio_core::{Envelope, FetchProgress, Treemap, TreemapNode};
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::commands::ValueResponseData;
use crate::error::CliError;

const ABSENT: &str = "-";

pub fn render(
    envelope: &Envelope<Value>,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(envelope)?
            } else {
                serde_json::to_string(envelope)?
            };
            writeln!(out, "{payload}")?;
        }
        OutputFormat::Table => {
            render_meta(&mut out, envelope)?;
            match value_data(&envelope.data) {
                Some(data) => {
                    render_value_table(&mut out, &data, &envelope.meta.reporting_currency)?
                }
                None => render_raw(&mut out, &envelope.data)?,
            }
            render_errors(&mut out, envelope)?;
        }
        OutputFormat::Treemap => match value_data(&envelope.data) {
            Some(data) => render_treemap(&mut out, &data.treemap)?,
            None => {
                tracing::warn!("treemap format only applies to the value command");
                render_raw(&mut out, &envelope.data)?;
            }
        },
    }

    Ok(())
}

/// Callback printing one progress line per fetched ticker on stderr.
pub fn progress_reporter() -> impl FnMut(FetchProgress) {
    |event: FetchProgress| {
        eprintln!(
            "[{:>3.0}%] {}/{} {} {}",
            event.fraction() * 100.0,
            event.completed,
            event.total,
            event.ticker,
            if event.found { "ok" } else { "unavailable" }
        );
    }
}

fn value_data(data: &Value) -> Option<ValueResponseData> {
    serde_json::from_value(data.clone()).ok()
}

fn render_meta(out: &mut impl Write, envelope: &Envelope<Value>) -> Result<(), CliError> {
    let meta = &envelope.meta;
    writeln!(out, "request_id  : {}", meta.request_id)?;
    let generated_at = meta
        .generated_at_rfc3339()
        .unwrap_or_else(|_| meta.generated_at.to_string());
    writeln!(out, "generated_at: {generated_at}")?;
    writeln!(out, "currency    : {}", meta.reporting_currency)?;
    if let Some(rate) = meta.exchange_rate {
        writeln!(out, "fx_rate     : {rate}")?;
    }
    writeln!(out, "latency_ms  : {}", meta.latency_ms)?;

    if !meta.warnings.is_empty() {
        writeln!(out, "warnings:")?;
        for warning in &meta.warnings {
            writeln!(out, "  - {warning}")?;
        }
    }
    writeln!(out)?;
    Ok(())
}

fn render_errors(out: &mut impl Write, envelope: &Envelope<Value>) -> Result<(), CliError> {
    if envelope.errors.is_empty() {
        return Ok(());
    }

    writeln!(out, "errors:")?;
    for error in &envelope.errors {
        match &error.ticker {
            Some(ticker) => writeln!(out, "  - {} [{ticker}]: {}", error.code, error.message)?,
            None => writeln!(out, "  - {}: {}", error.code, error.message)?,
        }
    }
    Ok(())
}

fn render_raw(out: &mut impl Write, data: &Value) -> Result<(), CliError> {
    writeln!(out, "data:")?;
    for line in serde_json::to_string_pretty(data)?.lines() {
        writeln!(out, "  {line}")?;
    }
    Ok(())
}

fn render_value_table(
    out: &mut impl Write,
    data: &ValueResponseData,
    currency: &str,
) -> Result<(), CliError> {
    writeln!(
        out,
        "{:<12} {:<9} {:>12} {:>12} {:>12} {:>9} {:>16} {:>16} {:>16}",
        "ticker",
        "market",
        "quantity",
        "cost_price",
        "price",
        "change%",
        format!("value_{currency}"),
        format!("cost_{currency}"),
        format!("profit_{currency}"),
    )?;

    for row in &data.rows {
        writeln!(
            out,
            "{:<12} {:<9} {:>12} {:>12.2} {:>12} {:>9} {:>16} {:>16.2} {:>16}",
            row.ticker.as_str(),
            row.market.as_str(),
            row.quantity,
            row.cost_price,
            fixed(row.current_price, 2),
            fixed(row.change_pct, 2),
            fixed(row.market_value_reporting, 2),
            row.cost_reporting,
            fixed(row.profit_reporting, 2),
        )?;
    }

    let totals = &data.totals;
    writeln!(out)?;
    for market in &totals.by_market {
        writeln!(
            out,
            "{:<9} value {:>16.2}  cost {:>16.2}  profit {:>16.2}  rows {}/{}",
            market.market.as_str(),
            market.market_value,
            market.cost,
            market.profit,
            market.priced_rows,
            market.priced_rows + market.unpriced_rows,
        )?;
    }
    writeln!(
        out,
        "{:<9} value {:>16.2}  cost {:>16.2}  profit {:>16.2}  return {}%",
        "TOTAL",
        totals.market_value,
        totals.cost,
        totals.profit,
        fixed(totals.return_pct, 2),
    )?;
    Ok(())
}

fn render_treemap(out: &mut impl Write, treemap: &Treemap) -> Result<(), CliError> {
    let total = treemap.root.value;
    render_node(out, &treemap.root, total, 0)?;

    if !treemap.unpriced.is_empty() {
        let tickers = treemap
            .unpriced
            .iter()
            .map(|ticker| ticker.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(out, "unpriced: {tickers}")?;
    }
    Ok(())
}

fn render_node(
    out: &mut impl Write,
    node: &TreemapNode,
    total: f64,
    depth: usize,
) -> Result<(), CliError> {
    let share = node.share_of(total);
    let bar = "#".repeat((share * 40.0).round() as usize);
    let mut line = format!(
        "{:indent$}{:<width$} {:>6.2}% {:>16.2} {:>+14.2} {} {}",
        "",
        node.label,
        share * 100.0,
        node.value,
        node.profit,
        node.fill,
        bar,
        indent = depth * 2,
        width = 20usize.saturating_sub(depth * 2),
    );
    if node.is_leaf() && depth > 0 {
        line.push_str(&format!(
            "  price {} chg {}%",
            fixed(node.current_price, 2),
            fixed(node.change_pct, 2)
        ));
    }
    writeln!(out, "{line}")?;

    for child in &node.children {
        render_node(out, child, total, depth + 1)?;
    }
    Ok(())
}

fn fixed(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| String::from(ABSENT), |value| format!("{value:.precision$}"))
}
