//! Per-vendor, per-band breakdown of the dashboard metrics.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::{BAND_NAMES, EARFCN_COL};
use crate::metrics::aggregate::aggregate;
use crate::metrics::types::{BandVendorStats, MetricKey, MetricRecord};
use crate::table::{MeasurementTable, SOURCE_COLUMN};

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Band column not found in table: {0}")]
    InvalidConfiguration(String),

    #[error("failed to slice measurement table: {0}")]
    Frame(#[from] PolarsError),
}

/// "All bands" card values for both vendors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorSummary {
    pub vendor: String,
    pub bands: Vec<String>,
    pub metrics: MetricRecord,
}

/// Picks a default band column: the downlink EARFCN if present, otherwise
/// the first header mentioning "band".
pub fn guess_band_column(table: &MeasurementTable) -> Option<&str> {
    if table.has_column(EARFCN_COL) {
        return Some(EARFCN_COL);
    }
    table
        .headers()
        .into_iter()
        .find(|h| h.to_lowercase().contains("band"))
}

/// Computes a [`MetricRecord`] for every (vendor, band) pair present in the
/// table. Bands a vendor never reported have no entry on that vendor's side.
///
/// # Errors
///
/// Returns [`StatsError::InvalidConfiguration`] when `band_column` is `None`
/// or not a header of `table`.
pub fn band_vendor_stats(
    table: &MeasurementTable,
    band_column: Option<&str>,
    vendor1: &str,
    vendor2: &str,
) -> Result<BandVendorStats, StatsError> {
    let band_column = resolve_band_column(table, band_column)?;

    let mut result: BandVendorStats = BTreeMap::new();
    for vendor in [vendor1, vendor2] {
        let vendor_rows = table.for_source(vendor)?;
        let bands = distinct_bands(&vendor_rows, band_column);
        debug!(vendor, band_column, band_count = bands.len(), "Computing band stats");

        let per_band = result.entry(vendor.to_string()).or_default();
        for band in bands {
            let slice = vendor_rows.filter(col(band_column).eq(lit(band.as_str())))?;
            per_band.insert(band, aggregate(&slice));
        }
    }

    Ok(result)
}

/// Aggregates each vendor's rows whose band value is one of `bands`.
///
/// Numeric band values match numerically and exactly, so `"100"` selects
/// `100` and `100.0` but not `100.7`. Other values match as text.
///
/// # Errors
///
/// Same as [`band_vendor_stats`].
pub fn all_bands_stats(
    table: &MeasurementTable,
    band_column: Option<&str>,
    bands: &[&str],
    vendor1: &str,
    vendor2: &str,
) -> Result<[VendorSummary; 2], StatsError> {
    let band_column = resolve_band_column(table, band_column)?;
    let wanted: BTreeSet<String> = bands.iter().map(|b| normalize_band(b)).collect();
    let in_bands = band_predicate(band_column, &wanted);

    let summary = |vendor: &str| -> Result<VendorSummary, StatsError> {
        let slice = table.filter(col(SOURCE_COLUMN).eq(lit(vendor)).and(in_bands.clone()))?;
        Ok(VendorSummary {
            vendor: vendor.to_string(),
            bands: wanted.iter().cloned().collect(),
            metrics: aggregate(&slice),
        })
    };

    let result = [summary(vendor1)?, summary(vendor2)?];
    info!(
        bands = ?bands,
        vendor1_samples = result[0].metrics.value(MetricKey::CountOfSamples),
        vendor2_samples = result[1].metrics.value(MetricKey::CountOfSamples),
        "All-bands summary computed"
    );
    Ok(result)
}

/// Sorted distinct band values across all rows, for band pickers.
pub fn distinct_bands(table: &MeasurementTable, band_column: &str) -> Vec<String> {
    let Some(values) = table.text(band_column) else {
        return Vec::new();
    };
    let bands: BTreeSet<String> = values
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect();
    bands.into_iter().collect()
}

/// Human-readable carrier name for an EARFCN band value.
pub fn band_display_name(band: &str) -> String {
    let normalized = normalize_band(band);
    BAND_NAMES
        .iter()
        .find(|(earfcn, _)| *earfcn == normalized)
        .map(|(_, name)| name.to_string())
        .unwrap_or(normalized)
}

/// Whole-number band values are rendered as integers (`"100.0"` becomes
/// `"100"`); anything else is returned trimmed and otherwise unchanged.
pub fn normalize_band(band: &str) -> String {
    let trimmed = band.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 => format!("{}", value as i64),
        _ => trimmed.to_string(),
    }
}

fn band_predicate(band_column: &str, wanted: &BTreeSet<String>) -> Expr {
    wanted.iter().fold(lit(false), |acc, band| {
        let matches = match band.parse::<f64>() {
            Ok(value) if value.is_finite() => {
                col(band_column).cast(DataType::Float64).eq(lit(value))
            }
            _ => col(band_column).eq(lit(band.as_str())),
        };
        acc.or(matches)
    })
}

fn resolve_band_column<'a>(
    table: &MeasurementTable,
    band_column: Option<&'a str>,
) -> Result<&'a str, StatsError> {
    match band_column {
        Some(name) if table.has_column(name) => Ok(name),
        Some(name) => Err(StatsError::InvalidConfiguration(name.to_string())),
        None => Err(StatsError::InvalidConfiguration("<none>".to_string())),
    }
}
