//! # accidents
//!
//! Command-line interface for the monthly accident forecaster: normalize the
//! raw table, train and save a model, and query a saved model.

use algorithm::prelude::*;
use algorithm::seasonal::FitSummary;
use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use data::{
    load_series, ColumnMapping, CsvRecordSource, MonthlyObservation, Selection,
    ANNUAL_TOTAL_SENTINEL,
};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_MODEL_PATH: &str = "prophet_model.bin";

#[derive(Parser)]
#[command(name = "accidents", version)]
#[command(about = "Monthly accident normalization and forecasting", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reduce the raw table to one clean monthly series
    Normalize {
        /// Input CSV file
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        slice: SliceArgs,

        #[command(flatten)]
        columns: ColumnArgs,

        /// Output file (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Normalize, fit the model and save the artifact
    Train {
        /// Input CSV file
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        slice: SliceArgs,

        #[command(flatten)]
        columns: ColumnArgs,

        /// Where to write the model artifact
        #[arg(long, default_value = DEFAULT_MODEL_PATH)]
        model_out: PathBuf,

        /// Coverage of the prediction interval
        #[arg(long, default_value_t = 0.8)]
        interval_width: f64,
    },

    /// Forecast one month with a saved model
    Predict {
        /// Model artifact
        #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,

        #[arg(long)]
        year: i32,

        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: u32,
    },
}

/// Which slice of the table to keep
#[derive(Args, Debug, Clone)]
struct SliceArgs {
    /// Category (MONATSZAHL) to keep
    #[arg(long, default_value = "Alkoholunfälle")]
    category: String,

    /// Metric (AUSPRAEGUNG) to keep
    #[arg(long, default_value = "insgesamt")]
    metric: String,

    /// Last year to include
    #[arg(long, default_value_t = 2020)]
    cutoff_year: i32,

    /// Month value marking annual-total rows
    #[arg(long, default_value = ANNUAL_TOTAL_SENTINEL)]
    sentinel: String,
}

impl SliceArgs {
    fn selection(&self) -> Selection {
        Selection::new(&self.category, &self.metric, self.cutoff_year).with_sentinel(&self.sentinel)
    }
}

/// Header names of the input table
#[derive(Args, Debug, Clone)]
struct ColumnArgs {
    #[arg(long, default_value = "JAHR")]
    year_column: String,

    #[arg(long, default_value = "MONATSZAHL")]
    category_column: String,

    #[arg(long, default_value = "AUSPRAEGUNG")]
    metric_column: String,

    #[arg(long, default_value = "MONAT")]
    month_column: String,

    #[arg(long, default_value = "WERT")]
    value_column: String,

    /// Field delimiter
    #[arg(long, default_value_t = ',')]
    delimiter: char,
}

impl ColumnArgs {
    fn mapping(&self) -> ColumnMapping {
        ColumnMapping {
            year: self.year_column.clone(),
            category: self.category_column.clone(),
            metric: self.metric_column.clone(),
            month: self.month_column.clone(),
            value: self.value_column.clone(),
        }
    }

    fn delimiter(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(|b| b.is_ascii())
            .ok_or_else(|| anyhow!("delimiter must be a single ASCII character"))
    }
}

#[derive(Debug, Serialize)]
struct ForecastOutput {
    date: NaiveDate,
    prediction: f64,
    lower: f64,
    upper: f64,
}

impl From<Forecast> for ForecastOutput {
    fn from(f: Forecast) -> Self {
        Self {
            date: f.date,
            prediction: f.yhat,
            lower: f.yhat_lower,
            upper: f.yhat_upper,
        }
    }
}

#[derive(Debug, Serialize)]
struct TrainOutput {
    model: PathBuf,
    summary: FitSummary,
    next: ForecastOutput,
}

/// Read the CSV and normalize the requested slice
fn read_series(
    input: &Path,
    slice: &SliceArgs,
    columns: &ColumnArgs,
) -> Result<Vec<MonthlyObservation>> {
    let source = CsvRecordSource::from_path(input, columns.mapping())
        .with_delimiter(columns.delimiter()?);
    let (series, report) = load_series(&source, &slice.selection())
        .with_context(|| format!("Failed to load {}", input.display()))?;

    if report.kept == 0 {
        warn!(
            category = %slice.category,
            metric = %slice.metric,
            "no rows matched the requested slice"
        );
    }
    Ok(series)
}

fn fit(series: &[MonthlyObservation], interval_width: f64) -> Result<SeasonalTrendModel> {
    let config = SeasonalTrendConfig { interval_width };
    train(series, config).map_err(|e| match e {
        TsError::InsufficientData { required, actual } => anyhow!(
            "insufficient data: the selected slice has {} monthly observation(s), at least {} are required",
            actual,
            required
        ),
        other => anyhow!(other).context("Failed to fit model"),
    })
}

fn run_train(
    input: &Path,
    slice: &SliceArgs,
    columns: &ColumnArgs,
    model_out: &Path,
    interval_width: f64,
) -> Result<TrainOutput> {
    let series = read_series(input, slice, columns)?;
    let model = fit(&series, interval_width)?;
    save(&model, model_out)
        .with_context(|| format!("Failed to save model to {}", model_out.display()))?;

    let summary = model.summary(&series)?;
    info!(
        observations = summary.n_observations,
        mae = summary.mae,
        rmse = summary.rmse,
        "model trained"
    );

    let next_month = model
        .future_dates(1)?
        .first()
        .copied()
        .ok_or_else(|| anyhow!("no month follows the training history"))?;
    let next = model.predict(&[next_month])?;
    let next = next
        .first()
        .copied()
        .ok_or_else(|| anyhow!("model returned no forecast"))?;

    Ok(TrainOutput {
        model: model_out.to_path_buf(),
        summary,
        next: next.into(),
    })
}

fn run_predict(model_path: &Path, year: i32, month: u32) -> Result<ForecastOutput> {
    let model = load(model_path)
        .with_context(|| format!("Failed to load model from {}", model_path.display()))?;
    let forecast = model.predict_month(year, month)?;
    Ok(forecast.into())
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.flush()?;
            info!(path = %path.display(), "results written");
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            serde_json::to_writer_pretty(&mut handle, value)?;
            writeln!(handle)?;
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Normalize {
            input,
            slice,
            columns,
            output,
        } => {
            let series = read_series(&input, &slice, &columns)?;
            write_json(&series, output.as_deref())
        }
        Commands::Train {
            input,
            slice,
            columns,
            model_out,
            interval_width,
        } => {
            if !(interval_width > 0.0 && interval_width < 1.0) {
                bail!("--interval-width must lie strictly between 0 and 1");
            }
            let result = run_train(&input, &slice, &columns, &model_out, interval_width)?;
            write_json(&result, None)
        }
        Commands::Predict { model, year, month } => {
            let forecast = run_predict(&model, year, month)?;
            write_json(&forecast, None)
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cli=info,data=info,algorithm=info".into()),
        )
        .init();

    run(Cli::parse())
}
