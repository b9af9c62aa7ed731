//! Reads the two vendor workbooks into one Source-tagged measurement table.
//!
//! Workbooks (xlsx, xls, xlsb, ods) are read with `calamine`; paths ending in
//! `.csv` are read with the `csv` crate and ignore the sheet selector.

use std::fmt;
use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};

use calamine::{Data, Range, Reader, Sheets, open_workbook_auto, open_workbook_auto_from_rs};
use polars::prelude::PolarsError;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::LoadOptions;
use crate::table::{Cell, MeasurementTable, SOURCE_COLUMN, TableBuilder};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("sheet named '{sheet}' not found in {origin}")]
    SheetNotFound { sheet: String, origin: String },

    #[error("failed to read workbook {origin}: {error}")]
    Workbook {
        origin: String,
        #[source]
        error: calamine::Error,
    },

    #[error("failed to read CSV {origin}: {error}")]
    Csv {
        origin: String,
        #[source]
        error: csv::Error,
    },

    #[error("I/O error reading {origin}: {error}")]
    Io {
        origin: String,
        #[source]
        error: std::io::Error,
    },

    #[error("failed to build table from {origin}: {error}")]
    Frame {
        origin: String,
        #[source]
        error: PolarsError,
    },
}

/// Where one vendor's measurements come from.
pub enum TableSource {
    Path(PathBuf),
    Stream(Box<dyn Read>),
}

impl TableSource {
    fn origin(&self) -> String {
        match self {
            TableSource::Path(path) => path.display().to_string(),
            TableSource::Stream(_) => "<stream>".to_string(),
        }
    }
}

impl fmt::Debug for TableSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableSource::Path(path) => f.debug_tuple("Path").field(path).finish(),
            TableSource::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<PathBuf> for TableSource {
    fn from(path: PathBuf) -> Self {
        TableSource::Path(path)
    }
}

impl From<&Path> for TableSource {
    fn from(path: &Path) -> Self {
        TableSource::Path(path.to_path_buf())
    }
}

/// Loads both vendors' measurements and concatenates them, vendor 1 first.
///
/// # Errors
///
/// Any [`LoadError`]; callers are expected to stop the workflow rather than
/// continue with one vendor's data.
#[tracing::instrument(skip_all, fields(sheet = %options.sheet_name))]
pub fn load_tables(
    vendor1: TableSource,
    vendor2: TableSource,
    options: &LoadOptions,
) -> Result<MeasurementTable, LoadError> {
    let first = read_table(vendor1, &options.sheet_name, &options.labels.vendor1)?;
    let second = read_table(vendor2, &options.sheet_name, &options.labels.vendor2)?;

    info!(
        vendor1 = %options.labels.vendor1,
        vendor1_rows = first.len(),
        vendor2 = %options.labels.vendor2,
        vendor2_rows = second.len(),
        "Vendor tables loaded"
    );

    first.concat(second).map_err(|error| LoadError::Frame {
        origin: "concat".to_string(),
        error,
    })
}

/// Reads one source and tags every row with `label`.
pub fn read_table(
    source: TableSource,
    sheet: &str,
    label: &str,
) -> Result<MeasurementTable, LoadError> {
    let origin = source.origin();
    let grid = match source {
        TableSource::Path(path) => {
            if !path.exists() {
                return Err(LoadError::FileNotFound(path));
            }
            if is_csv(&path) {
                read_csv(&path)?
            } else {
                let workbook = open_workbook_auto(&path).map_err(|error| map_open_error(&path, error))?;
                read_sheet(workbook, sheet, &origin)?
            }
        }
        TableSource::Stream(mut reader) => {
            let mut bytes = Vec::new();
            reader
                .read_to_end(&mut bytes)
                .map_err(|error| LoadError::Io {
                    origin: origin.clone(),
                    error,
                })?;
            let workbook =
                open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|error| LoadError::Workbook {
                    origin: origin.clone(),
                    error,
                })?;
            read_sheet(workbook, sheet, &origin)?
        }
    };

    let table = build_table(grid, label).map_err(|error| LoadError::Frame {
        origin: origin.clone(),
        error,
    })?;
    debug!(origin, label, rows = table.len(), columns = table.headers().len(), "Source read");
    Ok(table)
}

/// Header row plus data rows, before tagging.
struct Grid {
    header: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

fn map_open_error(path: &Path, error: calamine::Error) -> LoadError {
    match error {
        calamine::Error::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
            LoadError::FileNotFound(path.to_path_buf())
        }
        error => LoadError::Workbook {
            origin: path.display().to_string(),
            error,
        },
    }
}

fn read_sheet<RS: Read + Seek>(
    mut workbook: Sheets<RS>,
    sheet: &str,
    origin: &str,
) -> Result<Grid, LoadError> {
    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(LoadError::SheetNotFound {
            sheet: sheet.to_string(),
            origin: origin.to_string(),
        });
    }

    let range: Range<Data> = workbook
        .worksheet_range(sheet)
        .map_err(|error| LoadError::Workbook {
            origin: origin.to_string(),
            error,
        })?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .map(|cells| cells.iter().map(|c| c.to_string()).collect())
        .unwrap_or_default();
    let rows = rows
        .map(|cells| cells.iter().map(cell_from_data).collect())
        .collect();

    Ok(Grid { header, rows })
}

fn read_csv(path: &Path) -> Result<Grid, LoadError> {
    let origin = path.display().to_string();
    let csv_error = |error| LoadError::Csv {
        origin: origin.clone(),
        error,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;

    let header = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        rows.push(record.iter().map(cell_from_text).collect());
    }

    Ok(Grid { header, rows })
}

fn cell_from_data(value: &Data) -> Cell {
    match value {
        Data::Empty | Data::Error(_) => Cell::Null,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) => cell_from_text(s),
        other => Cell::Text(other.to_string()),
    }
}

fn cell_from_text(value: &str) -> Cell {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Cell::Null;
    }
    match trimmed.parse::<f64>() {
        Ok(n) if !n.is_nan() => Cell::Number(n),
        _ => Cell::Text(value.to_string()),
    }
}

/// Fills blank headers and de-duplicates repeated ones (`x`, `x.1`, ...).
fn header_names(raw: Vec<String>) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(raw.len());
    for (i, name) in raw.into_iter().enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {i}")
        } else {
            name
        };
        let mut candidate = base.clone();
        let mut suffix = 1;
        while names.contains(&candidate) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        names.push(candidate);
    }
    names
}

/// Tags every row with `label`; a spreadsheet column named `Source` is
/// replaced by the tag.
fn build_table(grid: Grid, label: &str) -> Result<MeasurementTable, PolarsError> {
    let mut headers = header_names(grid.header);
    let source_index = headers.iter().position(|h| h == SOURCE_COLUMN);
    if let Some(index) = source_index {
        warn!(label, "Spreadsheet has its own Source column; it is replaced by the vendor tag");
        headers.remove(index);
    }

    let mut builder = TableBuilder::new(headers);
    for mut cells in grid.rows {
        if cells.iter().all(Cell::is_null) {
            continue;
        }
        if let Some(index) = source_index {
            if index < cells.len() {
                cells.remove(index);
            }
        }
        builder.push_row(label, cells);
    }
    builder.build()
}
