//! Universe and screening result CSV files.
//!
//! Both files share one layout: `symbol,name,exchange,ipoDate`. A literal
//! `null` or an empty cell in `ipoDate` means the first trading day is unknown.

use anyhow::{Context, Result};
use bluechip_screen::ScreeningResult;
use bluechip_traits::{Date, TickerRecord};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// One row of a universe or result file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct UniverseRow {
    pub(crate) symbol: String,
    #[serde(default)]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) exchange: String,
    #[serde(rename = "ipoDate", default)]
    pub(crate) ipo_date: Option<String>,
}

impl UniverseRow {
    /// Parse the IPO date, treating `null`, blanks and bad values as unknown.
    pub(crate) fn first_trade_date(&self) -> Option<Date> {
        let raw = self.ipo_date.as_deref()?.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("null") {
            return None;
        }
        match Date::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                warn!(symbol = %self.symbol, ipo_date = raw, "Ignoring malformed ipoDate");
                None
            }
        }
    }

    fn from_record(record: &TickerRecord) -> Self {
        Self {
            symbol: record.symbol.clone(),
            name: record.name.clone(),
            exchange: record.exchange.clone(),
            ipo_date: Some(
                record
                    .first_trade_date
                    .map_or_else(|| "null".to_string(), |d| d.format("%Y-%m-%d").to_string()),
            ),
        }
    }
}

/// Read universe rows from any CSV source.
pub(crate) fn read_rows<R: Read>(source: R) -> Result<Vec<UniverseRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);
    let mut rows = Vec::new();
    for (idx, row) in reader.deserialize::<UniverseRow>().enumerate() {
        let row = row.with_context(|| format!("Invalid universe row at line {}", idx + 2))?;
        if row.symbol.is_empty() {
            continue;
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Load a universe CSV file.
pub(crate) fn load_universe(path: &Path) -> Result<Vec<UniverseRow>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open universe '{}'", path.display()))?;
    read_rows(file)
}

/// Turn universe rows into ticker records.
///
/// Rows whose analysis window would be empty are dropped with a warning.
pub(crate) fn to_records(
    rows: &[UniverseRow],
    start: Option<Date>,
    end: Option<Date>,
    today: Date,
) -> Vec<TickerRecord> {
    rows.iter()
        .filter_map(|row| {
            TickerRecord::from_listing(
                row.symbol.as_str(),
                row.name.as_str(),
                row.exchange.as_str(),
                row.first_trade_date(),
                start,
                end,
                today,
            )
            .inspect_err(|e| warn!(symbol = %row.symbol, error = %e, "Dropping universe row"))
            .ok()
        })
        .collect()
}

/// Write rows as CSV to any sink.
pub(crate) fn write_rows<W: Write>(sink: W, rows: &[UniverseRow]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(sink);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Accepted tickers as rows, sorted by symbol.
pub(crate) fn accepted_rows(result: &ScreeningResult) -> Vec<UniverseRow> {
    result
        .accepted_symbols()
        .into_iter()
        .filter_map(|symbol| result.accepted.get(symbol))
        .map(|ticker| UniverseRow::from_record(&ticker.record))
        .collect()
}

/// Persist the accepted tickers. Nothing is written for an empty result.
///
/// Returns whether a file was written.
pub(crate) fn write_accepted(path: &Path, result: &ScreeningResult) -> Result<bool> {
    let rows = accepted_rows(result);
    if rows.is_empty() {
        return Ok(false);
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create '{}'", path.display()))?;
    write_rows(file, &rows)?;
    Ok(true)
}

/// Path of the result file for a screening date.
pub(crate) fn result_path(dir: &Path, date: Date) -> PathBuf {
    dir.join(format!("symbols_blue_chips_{}.csv", date.format("%Y-%m-%d")))
}
