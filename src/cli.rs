//! CLI definition and dispatch.

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::console_report::{format_summary, format_trade_table};
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::svg_chart_adapter::SvgChartAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestResult};
use crate::domain::config_validation::validate_config;
use crate::domain::error::BandtraderError;
use crate::domain::indicator::IndicatorParams;
use crate::domain::indicator_helpers::{attach_indicators, effective_warmup};
use crate::domain::metrics::TradeStats;
use crate::domain::ohlcv::parse_timestamp;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

const DEFAULT_SYMBOL: &str = "UNKNOWN";

#[derive(Parser, Debug)]
#[command(name = "bandtrader", about = "Single-instrument EMA/RSI/Bollinger backtester")]
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
        /// Bar CSV file or directory, overrides [data] path
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(long)]
        trades_out: Option<PathBuf>,
        #[arg(long)]
        chart_out: Option<PathBuf>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show bar count and time range of a data file
    Info {
        #[arg(short, long)]
        data: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Backtest {
            config,
            data,
            trades_out,
            chart_out,
            start,
            end,
        } => run_backtest(
            &config,
            &BacktestOverrides {
                data,
                trades_out,
                chart_out,
                start,
                end,
            },
        ),
        Command::Validate { config } => run_validate(&config),
        Command::Info { data, symbol } => run_info(&data, symbol.as_deref()),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default, Clone)]
pub struct BacktestOverrides {
    pub data: Option<PathBuf>,
    pub trades_out: Option<PathBuf>,
    pub chart_out: Option<PathBuf>,
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Where bars come from and which slice of them to simulate.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    pub path: PathBuf,
    pub symbol: String,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportSettings {
    pub trades_csv: Option<PathBuf>,
    pub balance_svg: Option<PathBuf>,
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, BandtraderError> {
    info!("loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, BandtraderError> {
    let defaults = BacktestConfig::default();
    let bt_config = BacktestConfig {
        initial_balance: config.decimal_or("backtest", "initial_balance", defaults.initial_balance)?,
        lot_size: config.decimal_or("backtest", "lot_size", defaults.lot_size)?,
        stop_loss_distance: config.double_or(
            "backtest",
            "stop_loss_distance",
            defaults.stop_loss_distance,
        )?,
        take_profit_distance: config.double_or(
            "backtest",
            "take_profit_distance",
            defaults.take_profit_distance,
        )?,
        contract_multiplier: config.decimal_or(
            "instrument",
            "contract_multiplier",
            defaults.contract_multiplier,
        )?,
        price_increment: config.double_or(
            "instrument",
            "price_increment",
            defaults.price_increment,
        )?,
    };
    bt_config.validate()?;
    Ok(bt_config)
}

pub fn build_indicator_params(config: &dyn ConfigPort) -> Result<IndicatorParams, BandtraderError> {
    let defaults = IndicatorParams::default();
    Ok(IndicatorParams {
        ema_fast: config.usize_or("indicators", "ema_fast", defaults.ema_fast)?,
        ema_slow: config.usize_or("indicators", "ema_slow", defaults.ema_slow)?,
        rsi_period: config.usize_or("indicators", "rsi_period", defaults.rsi_period)?,
        bollinger_period: config.usize_or(
            "indicators",
            "bollinger_period",
            defaults.bollinger_period,
        )?,
        bollinger_stddev: config.double_or(
            "indicators",
            "bollinger_stddev",
            defaults.bollinger_stddev,
        )?,
    })
}

fn window_bound(
    config: &dyn ConfigPort,
    key: &str,
    cli_value: Option<&str>,
) -> Result<Option<NaiveDateTime>, BandtraderError> {
    let raw = match cli_value {
        Some(v) => Some(v.to_string()),
        None => config.get_string("data", key),
    };
    raw.map(|value| {
        parse_timestamp(&value).ok_or_else(|| {
            BandtraderError::invalid(
                "data",
                key,
                format!("invalid {key} '{value}', expected YYYY-MM-DD[ HH:MM:SS]"),
            )
        })
    })
    .transpose()
}

pub fn build_data_settings(
    config: &dyn ConfigPort,
    overrides: &BacktestOverrides,
) -> Result<DataSettings, BandtraderError> {
    let path = match &overrides.data {
        Some(p) => p.clone(),
        None => config
            .get_string("data", "path")
            .map(PathBuf::from)
            .ok_or_else(|| BandtraderError::ConfigMissing {
                section: "data".into(),
                key: "path".into(),
            })?,
    };
    let symbol = config
        .get_string("data", "symbol")
        .unwrap_or_else(|| DEFAULT_SYMBOL.to_string());

    let start = window_bound(config, "start", overrides.start.as_deref())?;
    let end = window_bound(config, "end", overrides.end.as_deref())?;
    if let (Some(s), Some(e)) = (start, end) {
        if s >= e {
            return Err(BandtraderError::invalid(
                "data",
                "start",
                "start must be before end",
            ));
        }
    }

    Ok(DataSettings {
        path,
        symbol,
        start,
        end,
    })
}

pub fn build_report_settings(config: &dyn ConfigPort, overrides: &BacktestOverrides) -> ReportSettings {
    ReportSettings {
        trades_csv: overrides
            .trades_out
            .clone()
            .or_else(|| config.get_string("report", "trades_csv").map(PathBuf::from)),
        balance_svg: overrides
            .chart_out
            .clone()
            .or_else(|| config.get_string("report", "balance_svg").map(PathBuf::from)),
    }
}

fn run_backtest(config_path: &Path, overrides: &BacktestOverrides) -> Result<(), BandtraderError> {
    let config = load_config(config_path)?;
    validate_config(&config)?;

    let bt_config = build_backtest_config(&config)?;
    let params = build_indicator_params(&config)?;
    let warmup = effective_warmup(&params, config.get_usize("backtest", "warmup_bars")?);
    let data = build_data_settings(&config, overrides)?;
    let reports = build_report_settings(&config, overrides);

    let data_port = CsvAdapter::new(data.path.clone());
    let result = run_backtest_pipeline(&data_port, &data, &params, warmup, &bt_config)?;

    print!("{}", format_trade_table(&result));
    println!();
    print!("{}", format_summary(&result, &TradeStats::compute(&result.ledger)));

    write_reports(&result, &reports)
}

/// Fetch bars, attach indicators, drop the warm-up and replay the rest.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    data: &DataSettings,
    params: &IndicatorParams,
    warmup: usize,
    bt_config: &BacktestConfig,
) -> Result<BacktestResult, BandtraderError> {
    let raw = data_port.fetch_ohlcv(&data.symbol, data.start, data.end)?;
    info!(
        "loaded {} bars for {} from {}",
        raw.len(),
        data.symbol,
        data.path.display()
    );

    let bars = attach_indicators(&raw, params, warmup)?;
    info!(
        "simulating {} bars after a warm-up of {} ({})",
        bars.len(),
        warmup,
        params
    );

    backtest_engine::run_backtest(&bars, bt_config)
}

pub fn write_reports(result: &BacktestResult, reports: &ReportSettings) -> Result<(), BandtraderError> {
    let outputs: [(Option<&PathBuf>, &dyn ReportPort, &str); 2] = [
        (reports.trades_csv.as_ref(), &CsvReportAdapter, "trade log"),
        (reports.balance_svg.as_ref(), &SvgChartAdapter, "balance chart"),
    ];
    for (path, writer, label) in outputs {
        if let Some(path) = path {
            writer.write(result, path)?;
            info!("{} written to {}", label, path.display());
        }
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), BandtraderError> {
    let config = load_config(config_path)?;
    validate_config(&config)?;

    let bt_config = build_backtest_config(&config)?;
    let params = build_indicator_params(&config)?;
    let warmup = effective_warmup(&params, config.get_usize("backtest", "warmup_bars")?);
    if config.get_string("data", "path").is_none() {
        warn!("[data] path is not set; backtest will need --data");
    }

    println!("Indicators:       {}", params);
    println!("Warm-up bars:     {}", warmup);
    println!(
        "Exits:            SL {} / TP {} price units",
        bt_config.stop_loss_offset(),
        bt_config.take_profit_offset()
    );
    println!("Configuration is valid.");
    Ok(())
}

fn run_info(data_path: &Path, symbol: Option<&str>) -> Result<(), BandtraderError> {
    let symbol = symbol.unwrap_or(DEFAULT_SYMBOL);
    let adapter = CsvAdapter::new(data_path.to_path_buf());
    match adapter.get_data_range(symbol)? {
        Some((first, last, count)) => {
            println!("{}: {} bars, {} to {}", data_path.display(), count, first, last);
        }
        None => println!("{}: no data found", data_path.display()),
    }
    Ok(())
}
