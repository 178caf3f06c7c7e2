//! Screen command implementation.

use crate::{data, universe};
use anyhow::{Result, bail};
use bluechip_screen::{
    CancellationToken, PipelineConfig, ScreeningCriteria, ScreeningPipeline, ScreeningResult,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{info, warn};

/// Contents of a screen config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ScreenConfig {
    pub(crate) criteria: ScreeningCriteria,
    pub(crate) pipeline: PipelineConfig,
}

/// Command line arguments of `bluechip screen`.
#[derive(Debug, Clone, Default, clap::Args)]
pub(crate) struct ScreenArgs {
    /// Universe CSV with columns symbol,name,exchange,ipoDate
    #[arg(short, long, conflicts_with = "exchange")]
    pub(crate) universe: Option<PathBuf>,

    /// Screen every common stock listed on this exchange
    #[arg(short, long)]
    pub(crate) exchange: Option<String>,

    /// JSON config file with `criteria` and `pipeline` sections
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,

    /// Start of the analysis window (YYYY-MM-DD, defaults to ipoDate)
    #[arg(long)]
    pub(crate) start: Option<String>,

    /// End of the analysis window (YYYY-MM-DD, defaults to yesterday)
    #[arg(long)]
    pub(crate) end: Option<String>,

    /// Minimum shares outstanding
    #[arg(long)]
    pub(crate) min_shares: Option<u64>,

    /// Minimum number of institutional holders
    #[arg(long)]
    pub(crate) min_holders: Option<u64>,

    /// Minimum fraction of the float held by institutions
    #[arg(long)]
    pub(crate) min_float_fraction: Option<f64>,

    /// Years of uninterrupted quarterly dividends
    #[arg(long)]
    pub(crate) years: Option<u32>,

    /// Missing quarters at which continuity fails
    #[arg(long)]
    pub(crate) allowed_missing: Option<usize>,

    /// Minimum dividend increases within the lookback
    #[arg(long)]
    pub(crate) min_increases: Option<usize>,

    /// Symbols per batch before a quota pause
    #[arg(long)]
    pub(crate) batch_size: Option<usize>,

    /// Quota pause between batches in seconds
    #[arg(long)]
    pub(crate) batch_pause: Option<u64>,

    /// Directory for the result file
    #[arg(short, long, default_value = ".")]
    pub(crate) output_dir: PathBuf,

    /// Screen again even if today's result file exists
    #[arg(long)]
    pub(crate) force: bool,
}

impl ScreenArgs {
    fn apply_overrides(&self, config: &mut ScreenConfig) {
        let criteria = &mut config.criteria;
        if let Some(v) = self.min_shares {
            criteria.min_shares = v;
        }
        if let Some(v) = self.min_holders {
            criteria.min_institutional_holders = v;
        }
        if let Some(v) = self.min_float_fraction {
            criteria.min_float_held_fraction = v;
        }
        if let Some(v) = self.years {
            criteria.uninterrupted_dividend_years = v;
        }
        if let Some(v) = self.allowed_missing {
            criteria.allowed_missing_quarters = v;
        }
        if let Some(v) = self.min_increases {
            criteria.min_dividend_increases = v;
        }
        if let Some(v) = self.batch_size {
            config.pipeline.batch_size = v;
        }
        if let Some(v) = self.batch_pause {
            config.pipeline.batch_pause_secs = v;
        }
    }
}

/// Screen a universe and write the accepted tickers.
pub(crate) async fn run_screen(args: &ScreenArgs) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Blue Chip Screen                          ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let today = Utc::now().date_naive();
    let output = universe::result_path(&args.output_dir, today);

    if output.exists() && !args.force {
        info!(path = %output.display(), "Reusing today's screening result");
        let rows = universe::load_universe(&output)?;
        println!("Result for {today} already exists: {}", output.display());
        println!("{} blue chips (use --force to screen again)\n", rows.len());
        for row in &rows {
            println!("  {:8} {}", row.symbol, row.name);
        }
        return Ok(());
    }

    let mut config: ScreenConfig = data::load_config(args.config.as_deref())?;
    args.apply_overrides(&mut config);
    let pipeline = ScreeningPipeline::new(&config.criteria, config.pipeline.clone())?;

    let start = data::parse_opt_date(args.start.as_deref())?;
    let end = data::parse_opt_date(args.end.as_deref())?;
    let provider = data::fmp_provider(today)?;

    let rows = match (&args.universe, &args.exchange) {
        (Some(path), _) => universe::load_universe(path)?,
        (None, Some(exchange)) => provider
            .client()
            .exchange_listing(exchange)
            .await?
            .into_iter()
            .map(|entry| universe::UniverseRow {
                symbol: entry.symbol,
                name: entry.company_name,
                exchange: entry.exchange_short_name,
                ipo_date: None,
            })
            .collect(),
        (None, None) => bail!("Provide a universe file (--universe) or an exchange (--exchange)"),
    };
    let records = universe::to_records(&rows, start, end, today);

    println!("Universe:  {} symbols", records.len());
    println!("Criteria:  {}", pipeline.criterion_names().join(" -> "));
    println!(
        "Pacing:    {} symbols per batch, {} s pause\n",
        config.pipeline.batch_size, config.pipeline.batch_pause_secs
    );

    let token = CancellationToken::new();
    let on_interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing current symbol");
            on_interrupt.cancel();
        }
    });

    let result = pipeline.run_filter_with_cancel(&records, &provider, &token).await?;
    print_summary(&result);

    if result.cancelled {
        println!("\nScreen cancelled; no result file written.");
    } else if universe::write_accepted(&output, &result)? {
        println!("\nWrote {}", output.display());
    } else {
        println!("\nNo blue chips found; no result file written.");
    }

    Ok(())
}

fn rejections_by_criterion(result: &ScreeningResult) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for rejection in &result.rejected {
        *counts.entry(rejection.criterion.as_str()).or_insert(0) += 1;
    }
    counts
}

fn print_summary(result: &ScreeningResult) {
    println!("\nResults");
    println!("{}", "-".repeat(60));
    println!("  Processed: {}", result.processed);
    println!("  Accepted:  {}", result.accepted.len());
    println!("  Rejected:  {}", result.rejected.len());
    println!("  Skipped:   {}", result.skipped.len());

    let counts = rejections_by_criterion(result);
    if !counts.is_empty() {
        println!("\nRejections by criterion");
        println!("{}", "-".repeat(60));
        for (criterion, count) in counts {
            println!("  {criterion:25} {count}");
        }
    }

    if !result.skipped.is_empty() {
        println!("\nSkipped");
        println!("{}", "-".repeat(60));
        for skip in &result.skipped {
            println!("  {:8} {} (attempts: {})", skip.symbol, skip.reason, skip.attempts);
        }
    }

    let accepted = result.accepted_symbols();
    if !accepted.is_empty() {
        println!("\nBlue chips");
        println!("{}", "-".repeat(60));
        for symbol in accepted {
            if let Some(ticker) = result.accepted.get(symbol) {
                println!("  {:8} {}", symbol, ticker.record.name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bluechip_screen::Rejection;

    #[test]
    fn test_overrides() {
        let args = ScreenArgs {
            min_shares: Some(1_000),
            years: Some(10),
            batch_size: Some(5),
            ..Default::default()
        };
        let mut config = ScreenConfig::default();
        args.apply_overrides(&mut config);

        assert_eq!(config.criteria.min_shares, 1_000);
        assert_eq!(config.criteria.uninterrupted_dividend_years, 10);
        assert_eq!(config.pipeline.batch_size, 5);
        assert_eq!(config.criteria.min_institutional_holders, 80);
    }

    #[test]
    fn test_config_sections_are_optional() {
        let config: ScreenConfig =
            serde_json::from_str(r#"{"pipeline": {"batch_size": 10}}"#).unwrap();
        assert_eq!(config.pipeline.batch_size, 10);
        assert_eq!(config.criteria, ScreeningCriteria::default());
    }

    #[test]
    fn test_rejections_by_criterion() {
        let mut result = ScreeningResult::default();
        for (symbol, criterion) in [("A", "share_count"), ("B", "share_count"), ("C", "dividend_growth")] {
            result.rejected.push(Rejection {
                symbol: symbol.to_string(),
                criterion: criterion.to_string(),
                reason: String::new(),
            });
        }
        let counts = rejections_by_criterion(&result);
        assert_eq!(counts["share_count"], 2);
        assert_eq!(counts["dividend_growth"], 1);
    }
}
