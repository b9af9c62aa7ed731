use crate::catalog::{KNOWN_COLUMNS, MODULATION_LABELS};
use crate::metrics::types::{MetricKey, MetricRecord};
use crate::metrics::utility::{mean, pct};
use crate::table::MeasurementTable;

/// Aggregates a row subset into a [`MetricRecord`].
///
/// Known KPI columns are averaged over the values that coerce to numbers;
/// anything else is dropped. Derived metrics (UE transmit power, L1/PDCP
/// ratio, modulation shares) are computed from those means and from the
/// first modulation-looking column. Never fails, including on an empty
/// subset.
pub fn aggregate(rows: &MeasurementTable) -> MetricRecord {
    let mut record = MetricRecord::default();

    record.set(MetricKey::CountOfSamples, Some(rows.len() as f64));

    for (key, column) in KNOWN_COLUMNS {
        record.set(*key, column_mean(rows, column));
    }

    // Prefer total power, then PUSCH, then PUCCH.
    let total = record.value(MetricKey::TotalPwr);
    let pusch = record.value(MetricKey::PuschPwr);
    let pucch = record.value(MetricKey::PucchPwr);
    let ue_power = [total, pusch]
        .into_iter()
        .find(|v| is_truthy(*v))
        .unwrap_or(pucch);
    record.set(MetricKey::UePowerTx, ue_power);

    let l1 = record.value(MetricKey::L1Dl);
    let pdcp = record.value(MetricKey::PdcpDl);
    let ratio = match (l1, pdcp) {
        (Some(l1), Some(pdcp)) if l1 != 0.0 && pdcp != 0.0 => Some(l1 / pdcp),
        _ => None,
    };
    record.set(MetricKey::L1ToPdcpRatio, ratio);

    let shares = modulation_shares(rows);
    for ((key, _), share) in MODULATION_LABELS.iter().zip(shares) {
        record.set(*key, share);
    }

    record
}

/// Mean of the numeric values in `column`; `None` if the column is absent
/// or holds no numbers.
pub fn column_mean(rows: &MeasurementTable, column: &str) -> Option<f64> {
    let values: Vec<f64> = rows
        .numeric(column)?
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .collect();
    mean(&values)
}

/// First header naming a modulation column (`modulation` or `qam`, any case).
pub fn modulation_column(rows: &MeasurementTable) -> Option<&str> {
    rows.headers().into_iter().find(|h| {
        let lower = h.to_lowercase();
        lower.contains("modulation") || lower.contains("qam")
    })
}

fn modulation_shares(rows: &MeasurementTable) -> [Option<f64>; 4] {
    let Some(column) = modulation_column(rows) else {
        return [None; 4];
    };
    let Some(cells) = rows.text(column) else {
        return [None; 4];
    };

    let labels: Vec<String> = cells
        .into_iter()
        .map(|c| c.map(str::to_uppercase).unwrap_or_default())
        .collect();
    let total = rows.len();

    let mut shares = [None; 4];
    for (share, (_, label)) in shares.iter_mut().zip(MODULATION_LABELS) {
        let count = labels.iter().filter(|l| l.as_str() == *label).count();
        *share = pct(count, total);
    }
    shares
}

fn is_truthy(value: Option<f64>) -> bool {
    matches!(value, Some(v) if v != 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Cell, TableBuilder};

    fn table(headers: &[&str], rows: &[Vec<Cell>]) -> MeasurementTable {
        let mut builder = TableBuilder::new(headers.iter().map(|s| s.to_string()).collect());
        for row in rows {
            builder.push_row("A", row.clone());
        }
        builder.build().unwrap()
    }

    fn num(v: f64) -> Cell {
        Cell::Number(v)
    }

    #[test]
    fn test_empty_subset() {
        let record = aggregate(&MeasurementTable::default());

        assert_eq!(record.value(MetricKey::CountOfSamples), Some(0.0));
        for key in MetricKey::ALL.iter().skip(1) {
            assert_eq!(record.value(*key), None, "{key} should be null");
        }
        assert_eq!(record.len(), MetricKey::ALL.len());
    }

    #[test]
    fn test_empty_subset_with_columns() {
        let t = table(&["LTE_UE_RSRP", "Modulation_DL"], &[]);
        let record = aggregate(&t);

        assert_eq!(record.value(MetricKey::CountOfSamples), Some(0.0));
        assert_eq!(record.value(MetricKey::Rsrp), None);
        assert_eq!(record.value(MetricKey::QpskPct), None);
    }

    #[test]
    fn test_means_skip_non_numeric() {
        let t = table(
            &["LTE_UE_RSRP", "LTE_UE_BLER_DL"],
            &[
                vec![num(-90.0), num(3.0)],
                vec![num(-100.0), num(1.0)],
                vec![Cell::Text("n/a".into()), Cell::Null],
            ],
        );
        let record = aggregate(&t);

        assert_eq!(record.value(MetricKey::CountOfSamples), Some(3.0));
        assert_eq!(record.value(MetricKey::Rsrp), Some(-95.0));
        assert_eq!(record.value(MetricKey::BlerDl), Some(2.0));
        assert_eq!(record.value(MetricKey::Sinr), None);
    }

    #[test]
    fn test_all_null_column_is_null() {
        let t = table(&["LTE_UE_SINR"], &[vec![Cell::Null], vec!["x".into()]]);
        assert_eq!(aggregate(&t).value(MetricKey::Sinr), None);
    }

    #[test]
    fn test_entries_carry_catalog_units() {
        let record = aggregate(&MeasurementTable::default());
        let rsrp = record.get(MetricKey::Rsrp).unwrap();
        assert_eq!(rsrp.unit, "dBm");
        assert_eq!(rsrp.description, "Reference Signal Received Power");
        assert_eq!(record.get(MetricKey::L1ToPdcpRatio).unwrap().unit, "");
    }

    #[test]
    fn test_ue_power_priority() {
        let t = table(
            &[
                "LTE_UE_Total_Power_Tx_PUSCH",
                "LTE_UE_Power_Tx_PUSCH",
                "LTE_UE_Power_Tx_PUCCH",
            ],
            &[vec![num(10.0), num(5.0), num(1.0)]],
        );
        assert_eq!(aggregate(&t).value(MetricKey::UePowerTx), Some(10.0));

        let t = table(
            &["LTE_UE_Power_Tx_PUSCH", "LTE_UE_Power_Tx_PUCCH"],
            &[vec![num(5.0), num(1.0)]],
        );
        assert_eq!(aggregate(&t).value(MetricKey::UePowerTx), Some(5.0));

        // zero total power falls through to the next source
        let t = table(
            &["LTE_UE_Total_Power_Tx_PUSCH", "LTE_UE_Power_Tx_PUCCH"],
            &[vec![num(0.0), num(-3.0)]],
        );
        assert_eq!(aggregate(&t).value(MetricKey::UePowerTx), Some(-3.0));

        assert_eq!(
            aggregate(&MeasurementTable::default()).value(MetricKey::UePowerTx),
            None
        );
    }

    #[test]
    fn test_l1_pdcp_ratio() {
        let headers = ["LTE_UE_Throughput_L1_DL", "LTE_UE_Throughput_PDCP_DL"];

        let t = table(&headers, &[vec![num(90.0), num(100.0)]]);
        assert_eq!(aggregate(&t).value(MetricKey::L1ToPdcpRatio), Some(0.9));

        let t = table(&headers, &[vec![num(90.0), num(0.0)]]);
        assert_eq!(aggregate(&t).value(MetricKey::L1ToPdcpRatio), None);

        let t = table(&headers, &[vec![num(90.0), Cell::Null]]);
        assert_eq!(aggregate(&t).value(MetricKey::L1ToPdcpRatio), None);
    }

    #[test]
    fn test_modulation_percentages() {
        let t = table(
            &["LTE_UE_Modulation_DL"],
            &[
                vec!["qpsk".into()],
                vec!["64QAM".into()],
                vec!["64QAM".into()],
                vec![Cell::Null],
            ],
        );
        let record = aggregate(&t);

        assert_eq!(record.value(MetricKey::QpskPct), Some(25.0));
        assert_eq!(record.value(MetricKey::Qam16Pct), Some(0.0));
        assert_eq!(record.value(MetricKey::Qam64Pct), Some(50.0));
        assert_eq!(record.value(MetricKey::Qam256Pct), Some(0.0));

        let sum: f64 = [
            MetricKey::QpskPct,
            MetricKey::Qam16Pct,
            MetricKey::Qam64Pct,
            MetricKey::Qam256Pct,
        ]
        .iter()
        .filter_map(|k| record.value(*k))
        .sum();
        assert!(sum <= 100.0);
    }

    #[test]
    fn test_modulation_absent() {
        let t = table(&["LTE_UE_RSRP"], &[vec![num(-80.0)]]);
        let record = aggregate(&t);
        assert_eq!(record.value(MetricKey::QpskPct), None);
        assert_eq!(record.value(MetricKey::Qam256Pct), None);
    }

    #[test]
    fn test_modulation_column_detection() {
        let t = table(&["Lat", "DL_QAM_Order", "Modulation"], &[]);
        assert_eq!(modulation_column(&t), Some("DL_QAM_Order"));
        let t = table(&["Lat"], &[]);
        assert_eq!(modulation_column(&t), None);
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let t = table(
            &["LTE_UE_RSRP", "Modulation"],
            &[vec![num(-80.0), "QPSK".into()], vec![num(-81.5), "256qam".into()]],
        );
        assert_eq!(aggregate(&t), aggregate(&t));
    }
}
