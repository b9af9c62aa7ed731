//! Data types produced by the aggregation pipeline.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::catalog::metric_info;

/// Dashboard metric identifiers, declared in card display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum MetricKey {
    #[serde(rename = "CountOfSamples")]
    CountOfSamples,
    #[serde(rename = "RSRP")]
    Rsrp,
    #[serde(rename = "RSRQ")]
    Rsrq,
    #[serde(rename = "SINR")]
    Sinr,
    #[serde(rename = "PathLoss_DL")]
    PathLossDl,
    #[serde(rename = "RI")]
    Ri,
    #[serde(rename = "PDCP_DL")]
    PdcpDl,
    #[serde(rename = "L1_DL")]
    L1Dl,
    #[serde(rename = "BLER_DL")]
    BlerDl,
    #[serde(rename = "PUSCH_PWR")]
    PuschPwr,
    #[serde(rename = "PUCCH_PWR")]
    PucchPwr,
    #[serde(rename = "TOTAL_PWR")]
    TotalPwr,
    #[serde(rename = "MCS_AVG_DL")]
    McsAvgDl,
    #[serde(rename = "UE_Power_Tx")]
    UePowerTx,
    #[serde(rename = "L1toPDCPTp_ratio")]
    L1ToPdcpRatio,
    #[serde(rename = "QPSK_pct")]
    QpskPct,
    #[serde(rename = "QAM16_pct")]
    Qam16Pct,
    #[serde(rename = "QAM64_pct")]
    Qam64Pct,
    #[serde(rename = "QAM256_pct")]
    Qam256Pct,
}

impl MetricKey {
    pub const ALL: &'static [MetricKey] = &[
        MetricKey::CountOfSamples,
        MetricKey::Rsrp,
        MetricKey::Rsrq,
        MetricKey::Sinr,
        MetricKey::PathLossDl,
        MetricKey::Ri,
        MetricKey::PdcpDl,
        MetricKey::L1Dl,
        MetricKey::BlerDl,
        MetricKey::PuschPwr,
        MetricKey::PucchPwr,
        MetricKey::TotalPwr,
        MetricKey::McsAvgDl,
        MetricKey::UePowerTx,
        MetricKey::L1ToPdcpRatio,
        MetricKey::QpskPct,
        MetricKey::Qam16Pct,
        MetricKey::Qam64Pct,
        MetricKey::Qam256Pct,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKey::CountOfSamples => "CountOfSamples",
            MetricKey::Rsrp => "RSRP",
            MetricKey::Rsrq => "RSRQ",
            MetricKey::Sinr => "SINR",
            MetricKey::PathLossDl => "PathLoss_DL",
            MetricKey::Ri => "RI",
            MetricKey::PdcpDl => "PDCP_DL",
            MetricKey::L1Dl => "L1_DL",
            MetricKey::BlerDl => "BLER_DL",
            MetricKey::PuschPwr => "PUSCH_PWR",
            MetricKey::PucchPwr => "PUCCH_PWR",
            MetricKey::TotalPwr => "TOTAL_PWR",
            MetricKey::McsAvgDl => "MCS_AVG_DL",
            MetricKey::UePowerTx => "UE_Power_Tx",
            MetricKey::L1ToPdcpRatio => "L1toPDCPTp_ratio",
            MetricKey::QpskPct => "QPSK_pct",
            MetricKey::Qam16Pct => "QAM16_pct",
            MetricKey::Qam64Pct => "QAM64_pct",
            MetricKey::Qam256Pct => "QAM256_pct",
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One dashboard value with its static unit and description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricEntry {
    pub value: Option<f64>,
    pub unit: &'static str,
    pub description: &'static str,
}

impl MetricEntry {
    pub fn new(key: MetricKey, value: Option<f64>) -> Self {
        let (unit, description) = metric_info(key);
        Self {
            value,
            unit,
            description,
        }
    }
}

/// Summary of one row subset: every [`MetricKey`] mapped to its entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetricRecord {
    entries: BTreeMap<MetricKey, MetricEntry>,
}

impl MetricRecord {
    pub(crate) fn set(&mut self, key: MetricKey, value: Option<f64>) {
        self.entries.insert(key, MetricEntry::new(key, value));
    }

    pub fn get(&self, key: MetricKey) -> Option<&MetricEntry> {
        self.entries.get(&key)
    }

    /// The computed value, `None` when the metric had no data.
    pub fn value(&self, key: MetricKey) -> Option<f64> {
        self.get(key).and_then(|entry| entry.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricKey, &MetricEntry)> {
        self.entries.iter().map(|(key, entry)| (*key, entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Vendor label → band value → metrics for that vendor on that band.
pub type BandVendorStats = BTreeMap<String, BTreeMap<String, MetricRecord>>;
