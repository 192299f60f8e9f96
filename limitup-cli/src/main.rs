//! LimitUp CLI: ingest, label, stats, backtest and run commands.
//!
//! Commands:
//! - `ingest`: normalise daily-bar and instrument tables into canonical Parquet
//! - `label`: write the labeled, filtered dataset with streaks and forward returns
//! - `stats`: dataset summary and grouped forward-return quantiles
//! - `backtest`: IDEAL vs CONSERVATIVE comparison with the full artifact set
//! - `run`: same as `backtest`, driven by a TOML run config

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use limitup_core::data::{
    read_daily_bars, read_instruments, write_daily_bars_parquet, write_instruments_parquet,
};
use limitup_core::labels::DEFAULT_EPS;
use limitup_core::rules::LimitRuleResolver;
use limitup_core::strategy::BuyFirstLimitUpSellNextClose;
use limitup_runner::config::{BacktestConfig, DataConfig, OutputConfig, RulesConfig};
use limitup_runner::reporting::write_annotated;
use limitup_runner::stats::DEFAULT_GROUP_KEYS;
use limitup_runner::{
    group_stats, load_inputs, prepare_dataset, run_study, ArtifactManager, DatasetSummary,
    GroupKey, RunConfig, StudyResult,
};

#[derive(Parser)]
#[command(
    name = "limitup",
    about = "LimitUp CLI: A-share limit-up labeling, streaks and fill-model backtests"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Input tables and labeling settings shared by every analysis command.
#[derive(Args)]
struct InputArgs {
    /// Daily bars (.csv, .parquet or .pq).
    #[arg(long)]
    daily: PathBuf,

    /// Instrument table (.csv, .parquet or .pq).
    #[arg(long)]
    instruments: PathBuf,

    /// Limit-rule override TOML. Built-in rules when omitted.
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Tolerance for at-limit price comparisons.
    #[arg(long, default_value_t = DEFAULT_EPS)]
    eps: f64,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalise raw tables into canonical Parquet (daily.parquet, instruments.parquet).
    Ingest {
        #[arg(long)]
        daily: PathBuf,

        #[arg(long)]
        instruments: PathBuf,

        /// Output directory.
        #[arg(long, default_value = "data/processed")]
        out: PathBuf,
    },
    /// Label bars and write the annotated dataset.
    Label {
        #[command(flatten)]
        input: InputArgs,

        /// Output file (.csv, .parquet or .pq).
        #[arg(long)]
        out: PathBuf,
    },
    /// Compute the dataset summary and grouped return quantiles.
    Stats {
        #[command(flatten)]
        input: InputArgs,

        /// Group columns: board, is_st, streak_up, one_word, opened.
        #[arg(long, value_delimiter = ',')]
        group_by: Vec<GroupKey>,

        /// Output directory for summary.json and tables/group_quantiles.csv.
        #[arg(long, default_value = "artifacts/stats")]
        out: PathBuf,
    },
    /// Backtest a strategy under IDEAL and CONSERVATIVE fills and export artifacts.
    Backtest {
        #[command(flatten)]
        input: InputArgs,

        /// Strategy name.
        #[arg(long, default_value = BuyFirstLimitUpSellNextClose::NAME)]
        strategy: String,

        /// Fee per side in basis points.
        #[arg(long, default_value_t = 0.0)]
        fee_bps: f64,

        /// Slippage per side in basis points.
        #[arg(long, default_value_t = 0.0)]
        slippage_bps: f64,

        /// Output directory for the artifact set.
        #[arg(long, default_value = "artifacts")]
        out: PathBuf,
    },
    /// Execute a study from a TOML run config.
    Run {
        /// Path to the run config.
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest {
            daily,
            instruments,
            out,
        } => run_ingest(daily, instruments, out),
        Commands::Label { input, out } => run_label(input, out),
        Commands::Stats {
            input,
            group_by,
            out,
        } => run_stats(input, group_by, out),
        Commands::Backtest {
            input,
            strategy,
            fee_bps,
            slippage_bps,
            out,
        } => {
            let config = RunConfig {
                data: DataConfig {
                    daily: input.daily,
                    instruments: input.instruments,
                },
                rules: RulesConfig {
                    path: input.rules,
                    eps: input.eps,
                },
                backtest: BacktestConfig {
                    strategy,
                    fee_bps,
                    slippage_bps,
                },
                output: OutputConfig { dir: out },
            };
            run_config(&config)
        }
        Commands::Run { config } => {
            let config = RunConfig::from_file(&config)
                .with_context(|| format!("Failed to load run config {}", config.display()))?;
            run_config(&config)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("limitup=info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run_ingest(daily: PathBuf, instruments: PathBuf, out: PathBuf) -> Result<()> {
    let bars = read_daily_bars(&daily)?;
    let instrument_rows = read_instruments(&instruments)?;

    let daily_out = out.join("daily.parquet");
    let instruments_out = out.join("instruments.parquet");
    write_daily_bars_parquet(&bars, &daily_out)?;
    write_instruments_parquet(&instrument_rows, &instruments_out)?;

    println!("Wrote {} bars to {}", bars.len(), daily_out.display());
    println!(
        "Wrote {} instruments to {}",
        instrument_rows.len(),
        instruments_out.display()
    );
    Ok(())
}

fn run_label(input: InputArgs, out: PathBuf) -> Result<()> {
    let loaded = load_inputs(&input.daily, &input.instruments)?;
    let resolver = LimitRuleResolver::from_path(input.rules.as_deref())?;
    let dataset = prepare_dataset(loaded.bars, &loaded.instruments, &resolver, input.eps);

    write_annotated(&out, &dataset)?;
    println!("Wrote {} labeled rows to {}", dataset.len(), out.display());
    Ok(())
}

fn run_stats(input: InputArgs, group_by: Vec<GroupKey>, out: PathBuf) -> Result<()> {
    let loaded = load_inputs(&input.daily, &input.instruments)?;
    let resolver = LimitRuleResolver::from_path(input.rules.as_deref())?;
    let dataset = prepare_dataset(loaded.bars, &loaded.instruments, &resolver, input.eps);

    let keys = if group_by.is_empty() {
        DEFAULT_GROUP_KEYS.to_vec()
    } else {
        group_by
    };
    let summary = DatasetSummary::compute(&dataset);
    let groups = group_stats(&dataset, &keys);
    let paths = ArtifactManager::new(&out)?.save_stats(&summary, &groups)?;

    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?
    );
    println!("Summary written to: {}", paths.summary_json.display());
    println!("Group table written to: {}", paths.group_quantiles_csv.display());
    Ok(())
}

fn run_config(config: &RunConfig) -> Result<()> {
    config.validate().context("Invalid run configuration")?;
    let study = run_study(config)?;
    print_summary(&study);

    let paths = ArtifactManager::new(&config.output.dir)?.save_study(&study)?;
    println!("Artifacts saved to: {}", config.output.dir.display());
    println!("Report: {}", paths.report_markdown.display());
    Ok(())
}

fn print_summary(study: &StudyResult) {
    let s = &study.summary;
    println!();
    println!("=== Limit-Up Study ===");
    println!("Strategy:       {}", study.comparison.strategy_id);
    println!(
        "Period:         {} to {}",
        s.start_date.map_or_else(|| "-".to_string(), |d| d.to_string()),
        s.end_date.map_or_else(|| "-".to_string(), |d| d.to_string())
    );
    println!(
        "Rows:           {} ({} before filters)",
        s.total_rows, study.input_rows
    );
    println!("Instruments:    {}", s.total_instruments);
    println!(
        "Limit-up days:  {} ({:.2}%)",
        s.limit_up_days,
        s.limit_up_rate * 100.0
    );
    println!(
        "Blocked (CONS): {} ({:.1}%)",
        s.blocked_buy_days_conservative,
        s.blocked_buy_ratio_conservative * 100.0
    );
    println!();
    println!("--- Fill Models ---");
    println!(
        "{:<14}{:>8}{:>14}{:>14}{:>10}",
        "model", "trades", "total_ret", "max_dd", "win"
    );
    for run in &study.comparison.runs {
        let m = &run.summary;
        println!(
            "{:<14}{:>8}{:>13.2}%{:>13.2}%{:>9.1}%",
            m.fill_model.as_str(),
            m.trade_count,
            m.total_return * 100.0,
            m.max_drawdown * 100.0,
            m.win_rate * 100.0
        );
    }
    println!();
}
