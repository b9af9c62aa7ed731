//! Static domain tables shared by the aggregator and the chart builders.
//!
//! Column names here are the drive-test tool's export headers. Everything
//! else in the crate looks these up instead of matching on names inline.

use crate::metrics::types::MetricKey;

pub const RSRP_COL: &str = "LTE_UE_RSRP";
pub const PATHLOSS_COL: &str = "LTE_UE_PathLoss_DL";
pub const BLER_COL: &str = "LTE_UE_BLER_DL";

/// Preferred band identifier column (downlink EARFCN).
pub const EARFCN_COL: &str = "LTE_UE_EARFCN_DL";

/// Band values summarised by the "All Bands" dashboard cards.
pub const DEFAULT_ALL_BANDS: &[&str] = &["100", "1651"];

/// Fixed axis ranges for columns whose natural range is known up front.
pub static AXIS_LIMITS: &[(&str, (f64, f64))] = &[
    (RSRP_COL, (-110.0, -60.0)),
    (PATHLOSS_COL, (80.0, 130.0)),
    (BLER_COL, (0.0, 20.0)),
];

/// Numbered choices offered by the batch plotting command.
pub static PLOTTING_COLUMNS: &[(u8, &str)] = &[
    (1, "LTE_UE_RSRP"),
    (2, "LTE_UE_PathLoss_DL"),
    (3, "Physical_Throughput_DL"),
    (4, "Longitude"),
    (5, "Latitude"),
    (6, "LTE_UE_RI"),
    (7, "LTE_UE_Power_Tx_PUCCH"),
    (8, "LTE_UE_Power_Tx_PUSCH"),
    (9, "LTE_UE_Total_Power_Tx_PUSCH"),
    (10, "LTE_UE_MCS_Average_DL"),
    (11, "LTE_UE_Throughput_PDCP_DL"),
    (12, "LTE_UE_BLER_DL"),
    (13, "LTE_UE_Throughput_L1_DL"),
    (14, "LTE_UE_SINR"),
];

/// Metrics computed as a plain mean over a single spreadsheet column.
pub static KNOWN_COLUMNS: &[(MetricKey, &str)] = &[
    (MetricKey::Rsrp, "LTE_UE_RSRP"),
    (MetricKey::Rsrq, "LTE_UE_RSRQ"),
    (MetricKey::Sinr, "LTE_UE_SINR"),
    (MetricKey::PathLossDl, "LTE_UE_PathLoss_DL"),
    (MetricKey::Ri, "LTE_UE_RI"),
    (MetricKey::PdcpDl, "LTE_UE_Throughput_PDCP_DL"),
    (MetricKey::L1Dl, "LTE_UE_Throughput_L1_DL"),
    (MetricKey::BlerDl, "LTE_UE_BLER_DL"),
    (MetricKey::PuschPwr, "LTE_UE_Power_Tx_PUSCH"),
    (MetricKey::PucchPwr, "LTE_UE_Power_Tx_PUCCH"),
    (MetricKey::TotalPwr, "LTE_UE_Total_Power_Tx_PUSCH"),
    (MetricKey::McsAvgDl, "LTE_UE_MCS_Average_DL"),
];

/// Unit and description carried by every metric entry.
pub static METRIC_INFO: &[(MetricKey, &str, &str)] = &[
    (MetricKey::CountOfSamples, "samples", "Number of samples"),
    (MetricKey::Rsrp, "dBm", "Reference Signal Received Power"),
    (MetricKey::Rsrq, "dB", "Reference Signal Received Quality"),
    (MetricKey::Sinr, "dB", "Signal to Interference Noise Ratio"),
    (MetricKey::PathLossDl, "dB", "Downlink Path Loss"),
    (MetricKey::Ri, "index", "Rank Indicator"),
    (MetricKey::PdcpDl, "Mbps", "PDCP Downlink Throughput"),
    (MetricKey::L1Dl, "Mbps", "L1 Downlink Throughput"),
    (MetricKey::BlerDl, "%", "Block Error Rate Downlink"),
    (MetricKey::PuschPwr, "dBm", "PUSCH Transmit Power"),
    (MetricKey::PucchPwr, "dBm", "PUCCH Transmit Power"),
    (MetricKey::TotalPwr, "dBm", "Total Transmit Power"),
    (MetricKey::McsAvgDl, "index", "MCS Average Downlink"),
    (MetricKey::UePowerTx, "dBm", "UE Transmit Power"),
    (MetricKey::L1ToPdcpRatio, "", "L1 to PDCP Throughput Ratio"),
    (MetricKey::QpskPct, "%", "QPSK Modulation Percentage"),
    (MetricKey::Qam16Pct, "%", "16QAM Modulation Percentage"),
    (MetricKey::Qam64Pct, "%", "64QAM Modulation Percentage"),
    (MetricKey::Qam256Pct, "%", "256QAM Modulation Percentage"),
];

/// Modulation labels as they appear (uppercased) in the modulation column.
pub static MODULATION_LABELS: &[(MetricKey, &str)] = &[
    (MetricKey::QpskPct, "QPSK"),
    (MetricKey::Qam16Pct, "16QAM"),
    (MetricKey::Qam64Pct, "64QAM"),
    (MetricKey::Qam256Pct, "256QAM"),
];

/// Carrier names for the operator's downlink EARFCNs.
pub static BAND_NAMES: &[(&str, &str)] = &[
    ("100", "B1 - 1st Carrier"),
    ("550", "B1 - 2nd Carrier"),
    ("1651", "B3 - 1st Carrier"),
    ("1795", "B3 - 2nd Carrier"),
    ("6400", "B20"),
    ("2850", "B7"),
];

pub fn axis_limit(column: &str) -> Option<(f64, f64)> {
    AXIS_LIMITS
        .iter()
        .find(|(name, _)| *name == column)
        .map(|(_, limits)| *limits)
}

pub fn metric_info(key: MetricKey) -> (&'static str, &'static str) {
    METRIC_INFO
        .iter()
        .find(|(k, _, _)| *k == key)
        .map(|(_, unit, description)| (*unit, *description))
        .unwrap_or(("", ""))
}

/// Resolves a batch plotting choice given either as a catalog number
/// (`"12"`) or as a column name.
pub fn plotting_column(choice: &str) -> Option<&'static str> {
    let choice = choice.trim();
    if let Ok(number) = choice.parse::<u8>() {
        return PLOTTING_COLUMNS
            .iter()
            .find(|(n, _)| *n == number)
            .map(|(_, column)| *column);
    }
    PLOTTING_COLUMNS
        .iter()
        .find(|(_, column)| *column == choice)
        .map(|(_, column)| *column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_limit_lookup() {
        assert_eq!(axis_limit(RSRP_COL), Some((-110.0, -60.0)));
        assert_eq!(axis_limit(BLER_COL), Some((0.0, 20.0)));
        assert_eq!(axis_limit("LTE_UE_SINR"), None);
    }

    #[test]
    fn test_plotting_column_by_number_and_name() {
        assert_eq!(plotting_column("1"), Some("LTE_UE_RSRP"));
        assert_eq!(plotting_column(" 14 "), Some("LTE_UE_SINR"));
        assert_eq!(plotting_column("Latitude"), Some("Latitude"));
        assert_eq!(plotting_column("0"), None);
        assert_eq!(plotting_column("15"), None);
        assert_eq!(plotting_column("Altitude"), None);
    }

    #[test]
    fn test_every_metric_has_info() {
        for key in MetricKey::ALL {
            let (_, description) = metric_info(*key);
            assert!(!description.is_empty(), "{key:?} has no description");
        }
    }
}
