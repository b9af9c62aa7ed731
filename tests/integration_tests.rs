use kpi_compare::chart::{PlotStyle, build_dual_axis_figure, build_scatter_figure};
use kpi_compare::config::{LoadOptions, VendorLabels};
use kpi_compare::loader::load_tables;
use kpi_compare::metrics::aggregate::aggregate;
use kpi_compare::metrics::bands::{all_bands_stats, band_vendor_stats, guess_band_column};
use kpi_compare::metrics::types::MetricKey;
use std::path::PathBuf;

const VENDOR1_CSV: &str = "\
LTE_UE_EARFCN_DL,LTE_UE_RSRP,LTE_UE_BLER_DL,LTE_UE_Throughput_PDCP_DL,LTE_UE_Throughput_L1_DL,Modulation_DL
100,-95,2,40,44,QPSK
100,-95,2,60,66,256QAM
1651,-101.2,6,10,9,QPSK
";

const VENDOR2_CSV: &str = "\
LTE_UE_EARFCN_DL,LTE_UE_RSRP,LTE_UE_BLER_DL,LTE_UE_Throughput_PDCP_DL,Modulation_DL
100,-80,1,80,64QAM
550,-85,n/a,70,64QAM
";

fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_full_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(&dir, "pw.csv", VENDOR1_CSV);
    let b = write(&dir, "hw.csv", VENDOR2_CSV);

    let options = LoadOptions::default().with_labels(VendorLabels::new("PW", "HW"));
    let table = load_tables(a.into(), b.into(), &options).unwrap();
    assert_eq!(table.len(), 5);
    assert!(!table.has_column("LTE_UE_SINR"));

    // dashboard numbers
    let pw = aggregate(&table.for_source("PW").unwrap());
    assert_eq!(pw.value(MetricKey::CountOfSamples), Some(3.0));
    assert_eq!(pw.value(MetricKey::Sinr), None);

    let band_column = guess_band_column(&table).unwrap();
    assert_eq!(band_column, "LTE_UE_EARFCN_DL");

    let stats = band_vendor_stats(&table, Some(band_column), "PW", "HW").unwrap();
    let pw_100 = &stats["PW"]["100"];
    assert_eq!(pw_100.value(MetricKey::Rsrp), Some(-95.0));
    assert_eq!(pw_100.value(MetricKey::BlerDl), Some(2.0));
    assert_eq!(pw_100.value(MetricKey::QpskPct), Some(50.0));
    assert!(stats["HW"].contains_key("550"));
    assert!(!stats["PW"].contains_key("550"));
    assert!(!stats["HW"].contains_key("1651"));
    assert_eq!(table.sources().iter().filter(|s| *s == "HW").count(), 2);

    let [pw_all, hw_all] =
        all_bands_stats(&table, Some(band_column), &["100", "1651"], "PW", "HW").unwrap();
    assert_eq!(pw_all.metrics.value(MetricKey::CountOfSamples), Some(3.0));
    assert_eq!(hw_all.metrics.value(MetricKey::CountOfSamples), Some(1.0));

    // charts
    let figure = build_dual_axis_figure(
        &table,
        "LTE_UE_RSRP",
        "LTE_UE_Throughput_PDCP_DL",
        "LTE_UE_BLER_DL",
        PlotStyle::Scatter,
        PlotStyle::Bar,
        "PW",
        "HW",
    )
    .unwrap();
    // the unparsable BLER row is dropped before plotting
    assert_eq!(figure.panels[1].primary.points, vec![(-80.0, 80.0)]);
    assert_eq!(figure.panels[0].secondary.as_ref().unwrap().points.len(), 2);
    assert_eq!(figure.y1_range.min, 0.0);
    assert_eq!(figure.y1_range.max, 80.0);

    assert!(build_scatter_figure(&table, "LTE_UE_RSRP", "LTE_UE_SINR", "PW", "HW").is_none());
}

#[test]
fn test_missing_vendor_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(&dir, "pw.csv", VENDOR1_CSV);
    let missing = dir.path().join("nope.xlsx");

    let err = load_tables(a.into(), missing.into(), &LoadOptions::default()).unwrap_err();
    assert!(err.to_string().contains("nope.xlsx"));
}
