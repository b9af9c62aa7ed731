use serde::Serialize;

use crate::metrics::types::MetricKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    Green,
    Yellow,
    Red,
}

/// Traffic-light colour for a dashboard value.
///
/// | Metric             | Green   | Yellow     | Red    |
/// |--------------------|---------|------------|--------|
/// | BLER_DL            | <= 2    | (2, 5]     | > 5    |
/// | L1toPDCPTp_ratio   | >= 0.95 | [0.8, 0.95)| < 0.8  |
/// | QPSK/QAM shares    | > 0.7   | (0.4, 0.7] | <= 0.4 |
///
/// Other metrics and missing values have no badge.
pub fn badge(key: MetricKey, value: Option<f64>) -> Option<Badge> {
    let v = value?;
    match key {
        MetricKey::BlerDl => Some(match v {
            v if v > 5.0 => Badge::Red,
            v if v > 2.0 => Badge::Yellow,
            _ => Badge::Green,
        }),
        MetricKey::L1ToPdcpRatio => Some(match v {
            v if v < 0.8 => Badge::Red,
            v if v < 0.95 => Badge::Yellow,
            _ => Badge::Green,
        }),
        MetricKey::QpskPct | MetricKey::Qam16Pct | MetricKey::Qam64Pct | MetricKey::Qam256Pct => {
            Some(match v {
                v if v > 0.7 => Badge::Green,
                v if v > 0.4 => Badge::Yellow,
                _ => Badge::Red,
            })
        }
        _ => None,
    }
}
