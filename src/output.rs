//! Dashboard formatting and persistence.
//!
//! Supports card-style logging, JSON serialization, and CSV append.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::metrics::badge::{Badge, badge};
use crate::metrics::bands::{VendorSummary, band_display_name};
use crate::metrics::types::{BandVendorStats, MetricKey, MetricRecord};
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Band label used for the all-bands rows of an export.
pub const ALL_BANDS_LABEL: &str = "All Bands";

/// One displayable dashboard value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    pub key: MetricKey,
    pub value: String,
    pub unit: &'static str,
    pub description: &'static str,
    pub badge: Option<Badge>,
}

/// Everything the `dashboard` command computed, as exported to JSON.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub band_column: String,
    pub all_bands: [VendorSummary; 2],
    pub per_band: BandVendorStats,
}

/// Formats a value the way the cards show it: throughputs as whole numbers,
/// everything else to two decimals, missing values as `N/A`.
pub fn format_value(key: MetricKey, value: Option<f64>) -> String {
    match (key, value) {
        (_, None) => "N/A".to_string(),
        (MetricKey::CountOfSamples | MetricKey::PdcpDl | MetricKey::L1Dl, Some(v)) => {
            format!("{v:.0}")
        }
        (_, Some(v)) => format!("{v:.2}"),
    }
}

/// Cards for one record in display order. The L1/PDCP ratio is not shown.
pub fn cards(record: &MetricRecord) -> Vec<Card> {
    MetricKey::ALL
        .iter()
        .filter(|key| **key != MetricKey::L1ToPdcpRatio)
        .filter_map(|&key| {
            let entry = record.get(key)?;
            Some(Card {
                key,
                value: format_value(key, entry.value),
                unit: entry.unit,
                description: entry.description,
                badge: badge(key, entry.value),
            })
        })
        .collect()
}

/// Logs one card group, e.g. a vendor's all-bands summary.
pub fn print_cards(heading: &str, record: &MetricRecord) {
    info!("{heading}");
    for card in cards(record) {
        match card.badge {
            Some(badge) => info!(
                metric = %card.key,
                value = %card.value,
                unit = card.unit,
                badge = ?badge,
                "{}",
                card.description
            ),
            None => info!(
                metric = %card.key,
                value = %card.value,
                unit = card.unit,
                "{}",
                card.description
            ),
        }
    }
}

/// Logs the full dashboard as cards: all-bands first, then each band.
pub fn print_dashboard(snapshot: &DashboardSnapshot) {
    for summary in &snapshot.all_bands {
        let bands = summary.bands.join(", ");
        print_cards(
            &format!("{} - {ALL_BANDS_LABEL} ({bands})", summary.vendor),
            &summary.metrics,
        );
    }
    for (vendor, per_band) in &snapshot.per_band {
        for (band, record) in per_band {
            print_cards(&format!("{vendor} - {}", band_display_name(band)), record);
        }
    }
}

/// Logs any serializable value as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes the snapshot to `path` as pretty-printed JSON, replacing the file.
pub fn write_json(path: &Path, snapshot: &DashboardSnapshot) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, json)?;
    debug!(path = %path.display(), "Dashboard JSON written");
    Ok(())
}

/// CSV header: timestamp, vendor and band, then one column per metric.
fn export_header() -> Vec<&'static str> {
    let mut header = vec!["timestamp", "vendor", "band"];
    header.extend(MetricKey::ALL.iter().map(MetricKey::as_str));
    header
}

fn export_row(timestamp: &str, vendor: &str, band: &str, record: &MetricRecord) -> Vec<String> {
    let mut row = vec![timestamp.to_string(), vendor.to_string(), band.to_string()];
    row.extend(
        MetricKey::ALL
            .iter()
            .map(|&key| record.value(key).map(|v| v.to_string()).unwrap_or_default()),
    );
    row
}

/// Appends one row per (vendor, band), plus each vendor's all-bands row, to a
/// CSV file. Returns the number of rows written.
///
/// Creates the file with headers if it does not already exist.
pub fn append_records(path: &Path, snapshot: &DashboardSnapshot) -> Result<usize> {
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, "Appending CSV records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

    if !file_exists {
        writer.write_record(export_header())?;
    }

    let timestamp = snapshot.generated_at.to_rfc3339();
    let mut written = 0;
    for summary in &snapshot.all_bands {
        writer.write_record(export_row(
            &timestamp,
            &summary.vendor,
            ALL_BANDS_LABEL,
            &summary.metrics,
        ))?;
        written += 1;
    }
    for (vendor, per_band) in &snapshot.per_band {
        for (band, record) in per_band {
            writer.write_record(export_row(&timestamp, vendor, band, record))?;
            written += 1;
        }
    }
    writer.flush()?;

    Ok(written)
}
