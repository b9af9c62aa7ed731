//! CLI entry point for the KPI vendor comparison tool.
//!
//! Provides subcommands for plotting two vendors' drive-test measurements
//! side by side, listing the plotting catalog, and computing the per-band
//! dashboard.

use anyhow::{Context, Result, anyhow, bail};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use kpi_compare::catalog::{DEFAULT_ALL_BANDS, PLOTTING_COLUMNS, axis_limit, plotting_column};
use kpi_compare::chart::{
    Figure, PlotStyle, build_dual_axis_figure, build_scatter_figure, build_single_figure,
};
use kpi_compare::config::{
    BATCH_VENDOR1_LABEL, BATCH_VENDOR2_LABEL, DEFAULT_VENDOR1_LABEL, DEFAULT_VENDOR2_LABEL,
    LoadOptions, VendorLabels,
};
use kpi_compare::loader::load_tables;
use kpi_compare::metrics::bands::{all_bands_stats, band_vendor_stats, guess_band_column};
use kpi_compare::output::{
    DashboardSnapshot, append_records, print_dashboard, print_json, write_json,
};
use kpi_compare::table::MeasurementTable;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "kpi-compare")]
#[command(about = "Compare two vendors' LTE drive-test KPIs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// The two input workbooks and how to read them.
#[derive(Args)]
struct SourceArgs {
    /// Vendor 1 workbook (xlsx/xls/ods) or CSV file
    #[arg(value_name = "VENDOR1_FILE")]
    vendor1_file: PathBuf,

    /// Vendor 2 workbook (xlsx/xls/ods) or CSV file
    #[arg(value_name = "VENDOR2_FILE")]
    vendor2_file: PathBuf,

    /// Sheet to read from each workbook
    #[arg(short, long)]
    sheet: Option<String>,

    /// Label for vendor 1 rows
    #[arg(long)]
    vendor1: Option<String>,

    /// Label for vendor 2 rows
    #[arg(long)]
    vendor2: Option<String>,
}

impl SourceArgs {
    fn load(&self, default1: &str, default2: &str) -> Result<(MeasurementTable, VendorLabels)> {
        let labels = VendorLabels::resolve(
            self.vendor1.as_deref(),
            self.vendor2.as_deref(),
            default1,
            default2,
        );
        let options = LoadOptions::default()
            .with_sheet(self.sheet.as_deref())
            .with_labels(labels.clone());

        let table = load_tables(
            self.vendor1_file.clone().into(),
            self.vendor2_file.clone().into(),
            &options,
        )
        .context("Failed to load vendor data")?;
        Ok((table, labels))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build a side-by-side comparison chart and save it as PNG
    Plot {
        #[command(flatten)]
        source: SourceArgs,

        /// X column, by catalog number (1-14) or name
        #[arg(short = 'x', long)]
        x: String,

        /// Y1 column, by catalog number (1-14) or name
        #[arg(long)]
        y1: String,

        /// Optional Y2 column drawn on a twin right axis
        #[arg(long, conflicts_with = "scatter_only")]
        y2: Option<String>,

        /// How Y1 is drawn
        #[arg(long, value_enum, default_value_t = PlotStyle::Scatter)]
        y1_style: PlotStyle,

        /// How Y2 is drawn
        #[arg(long, value_enum, default_value_t = PlotStyle::Bar)]
        y2_style: PlotStyle,

        /// Plot raw Y1 points only
        #[arg(long, default_value_t = false)]
        scatter_only: bool,

        /// Directory to write the PNG into
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// List the numbered plotting columns
    Catalog,
    /// Compute per-vendor, per-band dashboard metrics
    Dashboard {
        #[command(flatten)]
        source: SourceArgs,

        /// Column holding the band identifier (guessed when omitted)
        #[arg(short, long)]
        band_column: Option<String>,

        /// Band values summarised as "All Bands"
        #[arg(long, value_delimiter = ',')]
        bands: Vec<String>,

        /// Write the dashboard snapshot to this JSON file
        #[arg(long)]
        json: Option<PathBuf>,

        /// CSV file to append one row per vendor and band to
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Log the snapshot as pretty JSON instead of dashboard cards
        #[arg(long, default_value_t = false)]
        print_json: bool,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/kpi_compare.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("kpi_compare.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Plot {
            source,
            x,
            y1,
            y2,
            y1_style,
            y2_style,
            scatter_only,
            output_dir,
        } => plot(
            &source,
            &x,
            &y1,
            y2.as_deref(),
            (y1_style, y2_style),
            scatter_only,
            &output_dir,
        ),
        Commands::Catalog => {
            list_catalog();
            Ok(())
        }
        Commands::Dashboard {
            source,
            band_column,
            bands,
            json,
            csv,
            print_json,
        } => dashboard(
            &source,
            band_column.as_deref(),
            &bands,
            json.as_deref(),
            csv.as_deref(),
            print_json,
        ),
    };

    if let Err(e) = &result {
        error!(error = ?e, "Command failed");
    }
    result
}

/// Maps a catalog number or column name onto a column name.
fn resolve_column(choice: &str) -> Result<&'static str> {
    plotting_column(choice).ok_or_else(|| {
        anyhow!(
            "Invalid column choice '{choice}': expected 1-{} or a catalog column name",
            PLOTTING_COLUMNS.len()
        )
    })
}

/// Loads both vendors and writes one chart to `output_dir`.
#[tracing::instrument(skip(source), fields(output_dir = %output_dir.display()))]
fn plot(
    source: &SourceArgs,
    x: &str,
    y1: &str,
    y2: Option<&str>,
    styles: (PlotStyle, PlotStyle),
    scatter_only: bool,
    output_dir: &Path,
) -> Result<()> {
    let (y1_style, y2_style) = styles;
    let x = resolve_column(x)?;
    let y1 = resolve_column(y1)?;
    let y2 = y2.map(resolve_column).transpose()?;

    let (table, labels) = source.load(BATCH_VENDOR1_LABEL, BATCH_VENDOR2_LABEL)?;
    let (v1, v2) = (labels.vendor1.as_str(), labels.vendor2.as_str());

    for column in [Some(x), Some(y1), y2].into_iter().flatten() {
        if !table.has_column(column) {
            warn!(column, "Column not present in the loaded data");
        }
    }

    let figure: Option<Figure> = match (scatter_only, y2) {
        (true, _) => build_scatter_figure(&table, x, y1, v1, v2),
        (false, Some(y2)) => {
            build_dual_axis_figure(&table, x, y1, y2, y1_style, y2_style, v1, v2)
        }
        (false, None) => build_single_figure(&table, x, y1, y1_style, v1, v2),
    };

    let Some(figure) = figure else {
        bail!("Not enough data found for the selected columns");
    };

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    let path = output_dir.join(&figure.file_name);
    figure
        .save_png(&path)
        .with_context(|| format!("Failed to save plot to {}", path.display()))?;

    info!(path = %path.display(), title = %figure.title, "Chart written");
    Ok(())
}

fn list_catalog() {
    for (number, column) in PLOTTING_COLUMNS {
        match axis_limit(column) {
            Some((min, max)) => info!(number, column, min, max, "Plotting column"),
            None => info!(number, column, "Plotting column"),
        }
    }
}

/// Loads both vendors, computes all-bands and per-band metrics, and logs
/// them as dashboard cards (or as one JSON document with `as_json`).
#[tracing::instrument(skip(source, json, csv))]
fn dashboard(
    source: &SourceArgs,
    band_column: Option<&str>,
    bands: &[String],
    json: Option<&Path>,
    csv: Option<&Path>,
    as_json: bool,
) -> Result<()> {
    let (table, labels) = source.load(DEFAULT_VENDOR1_LABEL, DEFAULT_VENDOR2_LABEL)?;
    let (v1, v2) = (labels.vendor1.as_str(), labels.vendor2.as_str());

    let band_column = match band_column {
        Some(column) => column.to_string(),
        None => {
            let guessed = guess_band_column(&table)
                .context("No band column found; pass --band-column")?;
            info!(band_column = guessed, "Using guessed band column");
            guessed.to_string()
        }
    };

    let bands: Vec<&str> = if bands.is_empty() {
        DEFAULT_ALL_BANDS.to_vec()
    } else {
        bands.iter().map(String::as_str).collect()
    };

    let all_bands = all_bands_stats(&table, Some(&band_column), &bands, v1, v2)?;
    let per_band = band_vendor_stats(&table, Some(&band_column), v1, v2)?;

    let snapshot = DashboardSnapshot {
        generated_at: Utc::now(),
        band_column,
        all_bands,
        per_band,
    };
    if as_json {
        print_json(&snapshot)?;
    } else {
        print_dashboard(&snapshot);
    }

    if let Some(path) = json {
        write_json(path, &snapshot)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "Dashboard JSON written");
    }
    if let Some(path) = csv {
        let rows = append_records(path, &snapshot)
            .with_context(|| format!("Failed to append to {}", path.display()))?;
        info!(path = %path.display(), rows, "Dashboard rows appended");
    }

    Ok(())
}
