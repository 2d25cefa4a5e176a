//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::bar::BarFeed;
use crate::domain::broker::Broker;
use crate::domain::config_validation::{validate_backtest_config, validate_strategy_config};
use crate::domain::engine::{BacktestResult, Engine};
use crate::domain::error::BarsimError;
use crate::domain::metrics::{compute_metrics, Frequency, MetricsSummary};
use crate::domain::strategies::{MeanReversion, SmaCrossover};
use crate::domain::strategy::Strategy;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "barsim", about = "Event-driven OHLCV backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Bar data CSV, overrides the config's data path
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Directory for the output CSVs
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Validate config and build the strategy without touching data
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a backtest configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the range and shape of a bar data file
    Info {
        #[arg(short, long)]
        data: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            data,
            output,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config)
            } else {
                run_backtest(&config, data.as_deref(), output.as_deref())
            }
        }
        Command::Validate { config } => run_validate(&config),
        Command::Info { data } => run_info(&data),
    }
}

fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

fn run_backtest(config_path: &Path, data_override: Option<&Path>, output: Option<&Path>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_strategy_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let strategy = match build_strategy(&adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("Strategy: {}", strategy.name());
    for (key, value) in strategy.params() {
        eprintln!("  {key} = {value}");
    }

    let data_path = match resolve_data_path(data_override, &adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("Loading bars from {}", data_path.display());
    let bars = match CsvAdapter::new(data_path).load_bars() {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let feed = match BarFeed::new(bars) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("  {} bars", feed.len());

    let broker = Broker::new(
        adapter.get_double("backtest", "slippage_bps", 1.0),
        adapter.get_double("backtest", "commission_bps", 0.0),
    );
    let initial_cash = adapter.get_double("backtest", "initial_cash", 100_000.0);

    let engine = Engine::new(feed, broker, strategy, initial_cash);
    let result = match engine.run() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let frequency = adapter
        .get_string("backtest", "frequency")
        .map_or(Ok(Frequency::Daily), |s| Frequency::parse(&s));
    let frequency = match frequency {
        Ok(f) => f,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let rf = adapter.get_double("backtest", "risk_free_rate", 0.0);

    let equity: Vec<f64> = result.history.iter().map(|s| s.equity).collect();
    let metrics = compute_metrics(&equity, frequency, rf);
    print_summary(&result, &metrics);

    let output_dir = output.unwrap_or_else(|| Path::new("."));
    write_reports(&result, &metrics, output_dir);

    ExitCode::SUCCESS
}

fn print_summary(result: &BacktestResult, metrics: &MetricsSummary) {
    eprintln!("\n=== Results ===");
    eprintln!("Bars:             {}", result.history.len());
    eprintln!("Fills:            {}", result.fills.len());
    eprintln!("Final Equity:     {:.2}", result.portfolio.equity);
    eprintln!("Realized PnL:     {:.2}", result.portfolio.realized_pnl);
    eprintln!("Total Return:     {:.2}%", metrics.total_return * 100.0);
    eprintln!("CAGR:             {:.2}%", metrics.cagr * 100.0);
    eprintln!("Ann. Volatility:  {:.2}%", metrics.ann_vol * 100.0);
    eprintln!("Sharpe Ratio:     {:.2}", metrics.sharpe);
    eprintln!("Max Drawdown:     {:.2}%", metrics.max_dd * 100.0);
    eprintln!("Calmar Ratio:     {:.2}", metrics.calmar);
    eprintln!("Hit Rate:         {:.1}%", metrics.hit_rate * 100.0);
    eprintln!("Profit Factor:    {:.2}", metrics.profit_factor);
}

/// Report failures are warnings: the run already completed and its summary
/// has been printed.
fn write_reports(result: &BacktestResult, metrics: &MetricsSummary, output_dir: &Path) {
    let reporter = CsvReportAdapter;
    let history_path = output_dir.join("history.csv");
    match reporter.write_history(&result.history, &history_path) {
        Ok(()) => eprintln!("\nHistory written to: {}", history_path.display()),
        Err(e) => eprintln!("warning: {e}"),
    }
    let fills_path = output_dir.join("fills.csv");
    match reporter.write_fills(&result.fills, &fills_path) {
        Ok(()) => eprintln!("Fills written to: {}", fills_path.display()),
        Err(e) => eprintln!("warning: {e}"),
    }
    let metrics_path = output_dir.join("metrics.csv");
    match reporter.write_metrics(metrics, &metrics_path) {
        Ok(()) => eprintln!("Metrics written to: {}", metrics_path.display()),
        Err(e) => eprintln!("warning: {e}"),
    }
}

fn resolve_data_path(
    data_override: Option<&Path>,
    config: &dyn ConfigPort,
) -> Result<PathBuf, BarsimError> {
    if let Some(p) = data_override {
        return Ok(p.to_path_buf());
    }
    match config.get_string("backtest", "data") {
        Some(s) if !s.trim().is_empty() => Ok(PathBuf::from(s.trim())),
        _ => Err(BarsimError::ConfigMissing {
            section: "backtest".into(),
            key: "data".into(),
        }),
    }
}

pub fn build_strategy(adapter: &dyn ConfigPort) -> Result<Box<dyn Strategy>, BarsimError> {
    let name = adapter
        .get_string("strategy", "name")
        .ok_or_else(|| BarsimError::ConfigMissing {
            section: "strategy".into(),
            key: "name".into(),
        })?;

    match name.trim() {
        "sma_crossover" => Ok(Box::new(SmaCrossover::new(
            adapter.get_int("strategy", "fast", 10) as usize,
            adapter.get_int("strategy", "slow", 30) as usize,
            adapter.get_double("strategy", "size_pct", 0.5),
            adapter.get_int("strategy", "cooldown", 0) as usize,
            adapter.get_bool("strategy", "long_only", true),
        ))),
        "mean_reversion" => Ok(Box::new(MeanReversion::new(
            adapter.get_int("strategy", "window", 20) as usize,
            adapter.get_double("strategy", "entry_z", 2.0),
            adapter.get_double("strategy", "exit_z", 0.5),
            adapter.get_double("strategy", "size_pct", 0.25),
            optional_pct(adapter, "stop_pct"),
            optional_pct(adapter, "tp_pct"),
            adapter.get_int("strategy", "cooldown", 0) as usize,
            adapter.get_bool("strategy", "allow_short", true),
        ))),
        other => Err(BarsimError::ConfigInvalid {
            section: "strategy".into(),
            key: "name".into(),
            reason: format!("unknown strategy '{other}'"),
        }),
    }
}

/// Zero or absent both mean "disabled" for the optional stop/take levels.
fn optional_pct(adapter: &dyn ConfigPort, key: &str) -> Option<f64> {
    let value = adapter.get_double("strategy", key, 0.0);
    if value > 0.0 { Some(value) } else { None }
}

fn run_dry_run(config_path: &Path) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_strategy_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let strategy = match build_strategy(&adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("\nStrategy: {}", strategy.name());
    for (key, value) in strategy.params() {
        eprintln!("  {key} = {value}");
    }
    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_strategy_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    eprintln!("Configuration is valid.");
    ExitCode::SUCCESS
}

fn run_info(data_path: &Path) -> ExitCode {
    let bars = match CsvAdapter::new(data_path.to_path_buf()).load_bars() {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if bars.is_empty() {
        eprintln!("{}: no bars", data_path.display());
        return ExitCode::SUCCESS;
    }

    let first = &bars[0];
    let last = &bars[bars.len() - 1];
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for bar in &bars {
        lo = lo.min(bar.low);
        hi = hi.max(bar.high);
    }

    println!(
        "{}: {} bars, {} to {}, price range {:.4} to {:.4}",
        data_path.display(),
        bars.len(),
        first.ts,
        last.ts,
        lo,
        hi
    );
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn builds_sma_crossover_from_config() {
        let adapter = make_config(
            "[strategy]\nname = sma_crossover\nfast = 5\nslow = 20\nsize_pct = 0.4\n",
        );
        let strategy = build_strategy(&adapter).unwrap();
        assert_eq!(strategy.name(), "sma_crossover");
        let params = strategy.params();
        assert!(params.contains(&("fast".to_string(), "5".to_string())));
        assert!(params.contains(&("slow".to_string(), "20".to_string())));
    }

    #[test]
    fn builds_mean_reversion_with_optional_stops() {
        let adapter = make_config(
            "[strategy]\nname = mean_reversion\nwindow = 10\nentry_z = 2.0\nstop_pct = 0.05\n",
        );
        let strategy = build_strategy(&adapter).unwrap();
        assert_eq!(strategy.name(), "mean_reversion");
        let params = strategy.params();
        assert!(params.contains(&("stop_pct".to_string(), "0.05".to_string())));
        assert!(params.contains(&("tp_pct".to_string(), "none".to_string())));
    }

    #[test]
    fn unknown_strategy_name_is_an_error() {
        let adapter = make_config("[strategy]\nname = momentum\n");
        assert!(matches!(
            build_strategy(&adapter),
            Err(BarsimError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn missing_strategy_section_is_an_error() {
        let adapter = make_config("[backtest]\ninitial_cash = 1000\n");
        assert!(matches!(
            build_strategy(&adapter),
            Err(BarsimError::ConfigMissing { .. })
        ));
    }

    #[test]
    fn data_path_override_wins() {
        let adapter = make_config("[backtest]\ndata = config.csv\n");
        let path = resolve_data_path(Some(Path::new("cli.csv")), &adapter).unwrap();
        assert_eq!(path, PathBuf::from("cli.csv"));
    }

    #[test]
    fn data_path_falls_back_to_config() {
        let adapter = make_config("[backtest]\ndata = bars.csv\n");
        let path = resolve_data_path(None, &adapter).unwrap();
        assert_eq!(path, PathBuf::from("bars.csv"));
    }

    #[test]
    fn missing_data_path_is_an_error() {
        let adapter = make_config("[backtest]\ninitial_cash = 1000\n");
        assert!(matches!(
            resolve_data_path(None, &adapter),
            Err(BarsimError::ConfigMissing { .. })
        ));
    }
}
