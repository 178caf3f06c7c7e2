//! Profile command implementation.

use crate::{data, universe};
use anyhow::{Context, Result, bail};
use bluechip_traits::{MarketDataProvider, TickerRecord};
use bluechip_value::{ValuationConfig, ValuationProfile};
use chrono::Utc;
use std::path::PathBuf;
use tracing::warn;

/// Command line arguments of `bluechip profile`.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ProfileArgs {
    /// Ticker symbols
    #[arg(value_delimiter = ',', required_unless_present = "universe")]
    pub(crate) symbols: Vec<String>,

    /// Universe or screening result CSV whose symbols are profiled
    #[arg(short, long, conflicts_with = "symbols")]
    pub(crate) universe: Option<PathBuf>,

    /// JSON valuation config file
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,

    /// Start of the history (YYYY-MM-DD)
    #[arg(long)]
    pub(crate) start: Option<String>,

    /// End of the history (YYYY-MM-DD, defaults to yesterday)
    #[arg(long)]
    pub(crate) end: Option<String>,

    /// Minimum years of overlapping dividend and price history
    #[arg(long)]
    pub(crate) min_years: Option<usize>,

    /// Extend fair values one year ahead using mean dividend growth
    #[arg(long)]
    pub(crate) project: bool,

    /// Print the full per-year tables
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

/// Compute and print valuation profiles.
pub(crate) async fn show_profiles(args: &ProfileArgs) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Valuation Profile                         ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let mut config: ValuationConfig = data::load_config(args.config.as_deref())?;
    if let Some(min_years) = args.min_years {
        config.min_years = min_years;
    }
    config.project_next_year |= args.project;
    config.validate()?;

    let today = Utc::now().date_naive();
    let start = data::parse_opt_date(args.start.as_deref())?;
    let end = data::parse_opt_date(args.end.as_deref())?;
    let provider = data::fmp_provider(today)?;

    let records = match &args.universe {
        Some(path) => universe::to_records(&universe::load_universe(path)?, start, end, today),
        None => args
            .symbols
            .iter()
            .map(|symbol| {
                TickerRecord::from_listing(symbol.to_uppercase(), "", "", None, start, end, today)
            })
            .collect::<bluechip_traits::Result<Vec<_>>>()?,
    };
    if records.is_empty() {
        bail!("No symbols to profile");
    }

    for record in records {
        let symbol = record.symbol.clone();
        match build_profile(&provider, record, &config).await {
            Ok(profile) => print_profile(&profile, args.verbose)?,
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Profile failed");
                println!("{symbol}: {e:#}\n");
            }
        }
    }

    Ok(())
}

async fn build_profile(
    provider: &dyn MarketDataProvider,
    record: TickerRecord,
    config: &ValuationConfig,
) -> Result<ValuationProfile> {
    let symbol = record.symbol.clone();
    let history = data::load_history(provider, record).await?;
    ValuationProfile::build(&history, config).with_context(|| format!("{symbol}: valuation"))
}

fn print_profile(profile: &ValuationProfile, verbose: bool) -> Result<()> {
    let band = profile.band();

    println!("{}", profile.symbol());
    println!("{}", "=".repeat(60));
    println!(
        "Yield band:       {:.2}% (overvalued) - {:.2}% (undervalued)",
        band.overvalue_yield * 100.0,
        band.undervalue_yield * 100.0
    );
    println!("Sample years:     {}", band.sample_years);

    let high: Vec<String> = profile.yields().selected_high_years().map(|y| y.to_string()).collect();
    let low: Vec<String> = profile.yields().selected_low_years().map(|y| y.to_string()).collect();
    println!("High yield years: {}", high.join(", "));
    println!("Low yield years:  {}", low.join(", "));

    if let Some(bar) = profile.latest_close() {
        println!("Last close:       {:.2} on {}", bar.close, bar.date);
        let over = profile.overvalue_prices().value_at(bar.date);
        let under = profile.undervalue_prices().value_at(bar.date);
        if let (Some(over), Some(under)) = (over, under) {
            println!("Fair value range: {under:.2} - {over:.2}");
        }
    }
    if let Some(zone) = profile.current_zone() {
        println!("Zone:             {zone}");
    }

    let trend = profile.trend();
    if let Some(share) = trend.positive_share() {
        println!(
            "Positive trend:   {:.0}% of {} years",
            share * 100.0,
            trend.points.len()
        );
    }
    if let Some(last) = trend.points.last() {
        println!(
            "Trend {}:       {:+.4} per day ({} weeks)",
            last.year, last.slope, last.observations
        );
    }

    if verbose {
        println!("\nAnnual yields");
        println!("{}", profile.aggregates_frame()?);
        println!("\nPrice trend");
        println!("{}", profile.trend_frame()?);
        println!("\nFair values (latest)");
        println!("{}", profile.fair_value_frame()?.tail(Some(10)));
    }
    println!();

    Ok(())
}
