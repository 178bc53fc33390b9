//! Command-line front end for stocksage
//!
//! Loads OHLCV CSV files into a workspace, prints the derived metric
//! cards, and optionally runs the AI advisory pipeline and a one-shot
//! chat turn against the configured advisory endpoint.

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use sage_advisor::{AdvisoryService, HttpAdvisoryService};
use sage_analytics::format::{format_price, format_volume};
use sage_analytics::{is_volume_spike, summarize, CLOSE_MA_WINDOWS};
use sage_workspace::{Coordinator, DateRange, Series, Workspace};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "stocksage")]
#[command(about = "Stock CSV analysis with AI-assisted predictions", long_about = None)]
struct Cli {
    /// Advisory service base URL (defaults to STOCKSAGE_ADVISOR_URL)
    #[arg(long, global = true)]
    advisor_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load CSV files and print metric cards per series
    Analyze {
        /// CSV files to load, one series each
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Start of the shared date range (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// End of the shared date range (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Also request prediction and recommendation per series
        #[arg(long)]
        advise: bool,

        /// Moving-average columns to show
        #[arg(long, value_delimiter = ',', default_value = "7,14", value_parser = parse_ma_window)]
        ma: Vec<usize>,
    },

    /// Ask a question about one CSV file's data
    Chat {
        /// CSV file to load
        file: PathBuf,

        /// Free-text question about the data
        question: String,
    },
}

/// Only the computed moving-average windows are accepted; anything
/// else is a CLI usage error rather than a silently empty column.
fn parse_ma_window(value: &str) -> Result<usize, String> {
    let window: usize = value
        .parse()
        .map_err(|_| format!("invalid moving-average window '{value}'"))?;
    if CLOSE_MA_WINDOWS.contains(&window) {
        Ok(window)
    } else {
        Err(format!(
            "unsupported moving-average window {window} (supported: 7, 14, 30)"
        ))
    }
}

/// Initialize tracing subscriber with default configuration
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::Analyze {
            files,
            from,
            to,
            advise,
            ma,
        } => analyze(files, from, to, advise, &ma, cli.advisor_url).await,
        Command::Chat { file, question } => chat(file, &question, cli.advisor_url).await,
    }
}

fn build_advisor(url: Option<String>) -> anyhow::Result<Arc<dyn AdvisoryService>> {
    let service = match url {
        Some(url) => HttpAdvisoryService::new(url)?,
        None => HttpAdvisoryService::from_env()
            .context("pass --advisor-url or set STOCKSAGE_ADVISOR_URL")?,
    };
    Ok(Arc::new(service))
}

/// Load each file as a series; a file that fails to read or parse is
/// reported and skipped, the run continues.
fn load_files(workspace: &mut Workspace, files: &[PathBuf]) {
    for path in files {
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                warn!("could not read {}: {e}", path.display());
                continue;
            }
        };
        if let Err(e) = workspace.add_series(text, name) {
            warn!("{e}");
        }
    }
}

fn resolve_range(
    workspace: &Workspace,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Option<DateRange> {
    if from.is_none() && to.is_none() {
        return None;
    }
    let (span_from, span_to) = workspace.all_dates_span()?;
    Some(DateRange::new(from.unwrap_or(span_from), to.unwrap_or(span_to)))
}

fn metric_table(workspace: &Workspace, ma_windows: &[usize]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);

    let mut header = vec![
        "Series".to_string(),
        "Bars".to_string(),
        "Trend".to_string(),
        "Volatility".to_string(),
        "Latest Close".to_string(),
        "Latest Volume".to_string(),
        "Spike".to_string(),
    ];
    for window in ma_windows {
        header.push(format!("MA{window}"));
    }
    table.set_header(header.iter().map(Cell::new));

    for series in workspace.displayed_series() {
        table.add_row(series_row(series, ma_windows));
    }
    table
}

fn series_row(series: &Series, ma_windows: &[usize]) -> Vec<Cell> {
    let bars = &series.visible_bars;
    // Cards fall back to the on-the-fly summary when the advisory
    // pipeline has not stored one yet
    let summary = series.summary.clone().or_else(|| summarize(bars));

    let (trend, volatility) = summary.as_ref().map_or_else(
        || ("N/A".to_string(), "N/A".to_string()),
        |s| (s.trend.to_string(), s.volatility_display()),
    );
    let latest_close = bars
        .last()
        .map_or_else(|| "N/A".to_string(), |bar| format_price(bar.close));
    let latest_volume = summary
        .as_ref()
        .map_or_else(|| "N/A".to_string(), |s| format_volume(s.latest_volume));
    let spike = bars.last().map_or("-", |bar| {
        if is_volume_spike(bar) { "yes" } else { "no" }
    });

    let mut row = vec![
        Cell::new(&series.display_name),
        Cell::new(format!("{}/{}", bars.len(), series.full_bars.len())),
        Cell::new(trend),
        Cell::new(volatility),
        Cell::new(latest_close),
        Cell::new(latest_volume),
        Cell::new(spike),
    ];
    for window in ma_windows {
        let value = bars.last().and_then(|bar| match window {
            7 => bar.ma7,
            14 => bar.ma14,
            30 => bar.ma30,
            _ => None,
        });
        row.push(Cell::new(
            value.map_or_else(|| "-".to_string(), format_price),
        ));
    }
    row
}

async fn analyze(
    files: Vec<PathBuf>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    advise: bool,
    ma_windows: &[usize],
    advisor_url: Option<String>,
) -> anyhow::Result<()> {
    if advise {
        let coordinator = Coordinator::new(build_advisor(advisor_url)?);
        let workspace = coordinator.workspace();

        let ids: Vec<_> = {
            let mut ws = workspace
                .lock()
                .map_err(|e| anyhow::anyhow!("lock error: {e}"))?;
            load_files(&mut ws, &files);
            let range = resolve_range(&ws, from, to);
            ws.set_date_range(range);
            ws.iter().map(|series| series.id).collect()
        };

        let mut handles = Vec::new();
        for id in ids {
            match coordinator.compute_if_needed(id) {
                Ok(Some(handle)) => handles.push(handle),
                Ok(None) => {}
                Err(e) => warn!("{e}"),
            }
        }
        info!(pipelines = handles.len(), "waiting for advisory results");
        for handle in handles {
            let _ = handle.await;
        }

        let ws = workspace
            .lock()
            .map_err(|e| anyhow::anyhow!("lock error: {e}"))?;
        println!("{}", metric_table(&ws, ma_windows));
        for series in ws.displayed_series() {
            if let Some(prediction) = &series.prediction {
                println!(
                    "{}: predicted next close {} - {}",
                    series.display_name,
                    format_price(prediction.predicted_price),
                    prediction.analysis
                );
            }
            if let Some(recommendation) = &series.recommendation {
                println!(
                    "{}: {} - {}",
                    series.display_name,
                    recommendation.recommendation,
                    recommendation.reasoning
                );
            }
        }
    } else {
        let mut workspace = Workspace::new();
        load_files(&mut workspace, &files);
        let range = resolve_range(&workspace, from, to);
        workspace.set_date_range(range);
        println!("{}", metric_table(&workspace, ma_windows));
    }
    Ok(())
}

async fn chat(file: PathBuf, question: &str, advisor_url: Option<String>) -> anyhow::Result<()> {
    let coordinator = Coordinator::new(build_advisor(advisor_url)?);
    let workspace = coordinator.workspace();

    let id = {
        let mut ws = workspace
            .lock()
            .map_err(|e| anyhow::anyhow!("lock error: {e}"))?;
        let name = file
            .file_name()
            .map_or_else(|| file.display().to_string(), |n| n.to_string_lossy().into_owned());
        let text = std::fs::read_to_string(&file)
            .with_context(|| format!("could not read {}", file.display()))?;
        ws.add_series(text, name)?
    };

    // Enrich the digest with prediction and recommendation first; a
    // failed pipeline still leaves a usable digest behind.
    match coordinator.compute_if_needed(id) {
        Ok(Some(handle)) => {
            let _ = handle.await;
        }
        Ok(None) => {}
        Err(e) => warn!("{e}"),
    }

    let answer = coordinator.chat(question).await?;
    println!("{}", answer.answer);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ma_windows_default_and_explicit() {
        let cli = Cli::try_parse_from(["stocksage", "analyze", "prices.csv"]).unwrap();
        let Command::Analyze { ma, .. } = cli.command else {
            panic!("expected analyze command");
        };
        assert_eq!(ma, vec![7, 14]);

        let cli =
            Cli::try_parse_from(["stocksage", "analyze", "--ma", "7,30", "prices.csv"]).unwrap();
        let Command::Analyze { ma, .. } = cli.command else {
            panic!("expected analyze command");
        };
        assert_eq!(ma, vec![7, 30]);
    }

    #[test]
    fn test_unsupported_ma_window_is_a_usage_error() {
        let result = Cli::try_parse_from(["stocksage", "analyze", "--ma", "9", "prices.csv"]);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unsupported moving-average window 9"));

        let result = Cli::try_parse_from(["stocksage", "analyze", "--ma", "abc", "prices.csv"]);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("invalid moving-average window 'abc'"));
    }

    #[test]
    fn test_parse_ma_window_accepts_computed_set() {
        for window in CLOSE_MA_WINDOWS {
            assert_eq!(parse_ma_window(&window.to_string()), Ok(window));
        }
        assert!(parse_ma_window("20").is_err());
    }
}
