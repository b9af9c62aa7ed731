//! Shared data preparation for every chart shape: numeric cleaning, vendor
//! split, 0.5-wide X binning and axis-limit resolution.

use polars::prelude::*;
use serde::Serialize;

use crate::catalog::axis_limit;
use crate::chart::PlotStyle;
use crate::table::{MeasurementTable, SOURCE_COLUMN};

/// Width of one X bucket in bar style.
pub const BIN_WIDTH: f64 = 0.5;

/// Closed axis interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Same range, widened to a unit span if it collapsed to a point.
    pub fn non_degenerate(self) -> Self {
        if self.max > self.min {
            self
        } else {
            Self::new(self.min - 0.5, self.min + 0.5)
        }
    }
}

/// Column holding X in a cleaned frame.
pub const X_FIELD: &str = "x";

const BUCKET_FIELD: &str = "bucket";

/// Column holding the values of the `axis`-th Y column in a cleaned frame.
pub fn y_field(axis: usize) -> String {
    format!("y{axis}")
}

/// Keeps rows whose X and every Y column coerce to finite numbers.
///
/// The result has the Source column, [`X_FIELD`] and one [`y_field`] per Y
/// column, all `Float64` except Source. A missing column leaves nothing to
/// keep. Returns `Ok(None)` when no row survives.
pub fn clean_frame(
    table: &MeasurementTable,
    x_column: &str,
    y_columns: &[&str],
) -> PolarsResult<Option<DataFrame>> {
    if !table.has_column(x_column) || !y_columns.iter().all(|c| table.has_column(c)) {
        return Ok(None);
    }

    let mut fields = vec![X_FIELD.to_string()];
    let mut exprs = vec![
        col(SOURCE_COLUMN),
        col(x_column).cast(DataType::Float64).alias(X_FIELD),
    ];
    for (axis, column) in y_columns.iter().enumerate() {
        let field = y_field(axis);
        exprs.push(col(column).cast(DataType::Float64).alias(&field));
        fields.push(field);
    }
    let numeric = table.frame().clone().lazy().select(exprs).collect()?;

    let mut keep = BooleanChunked::full("keep", true, numeric.height());
    for field in &fields {
        let finite: BooleanChunked = numeric
            .column(field)?
            .f64()?
            .into_iter()
            .map(|v| v.is_some_and(f64::is_finite))
            .collect();
        keep = &keep & &finite;
    }

    let clean = numeric.filter(&keep)?;
    Ok((clean.height() > 0).then_some(clean))
}

/// Rows of a cleaned frame that belong to `vendor`.
pub fn vendor_frame(clean: &DataFrame, vendor: &str) -> PolarsResult<DataFrame> {
    clean
        .clone()
        .lazy()
        .filter(col(SOURCE_COLUMN).eq(lit(vendor)))
        .collect()
}

/// Mean of `y` per X bucket `floor(x * 2) / 2`, ordered by bucket.
pub fn bin_means(frame: &DataFrame, x: &str, y: &str) -> PolarsResult<Vec<(f64, f64)>> {
    let bucket = ((col(x) * lit(2.0)).floor() / lit(2.0)).alias(BUCKET_FIELD);
    let binned = frame
        .clone()
        .lazy()
        .group_by([bucket])
        .agg([col(y).mean()])
        .collect()?;

    let mut points = pairs(&binned, BUCKET_FIELD, y)?;
    points.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(points)
}

/// Points to plot for one vendor on one Y axis, in the axis' style.
///
/// Scatter returns every cleaned sample; bar returns one bucket mean per
/// occupied 0.5-wide X bucket.
pub fn vendor_points(
    vendor: &DataFrame,
    axis: usize,
    style: PlotStyle,
) -> PolarsResult<Vec<(f64, f64)>> {
    let y = y_field(axis);
    match style {
        PlotStyle::Scatter => pairs(vendor, X_FIELD, &y),
        PlotStyle::Bar => bin_means(vendor, X_FIELD, &y),
    }
}

/// X values of a cleaned frame, in row order.
pub fn x_values(frame: &DataFrame) -> PolarsResult<Vec<f64>> {
    Ok(frame.column(X_FIELD)?.f64()?.into_iter().flatten().collect())
}

fn pairs(frame: &DataFrame, x: &str, y: &str) -> PolarsResult<Vec<(f64, f64)>> {
    let xs = frame.column(x)?.f64()?;
    let ys = frame.column(y)?.f64()?;
    Ok(xs
        .into_iter()
        .zip(ys)
        .filter_map(|(x, y)| Some((x?, y?)))
        .collect())
}

/// Y limits shared by both vendor panels.
///
/// `observed` is whatever is drawn on the axis: raw samples in scatter
/// style, bucket means in bar style. Columns in the override table get their
/// fixed range. Otherwise the observed minimum is floored at 0 when
/// non-negative, a missing or zero maximum becomes 1, and a range that
/// collapsed to a point is widened to a unit span.
pub fn resolve_y_limits(column: &str, observed: impl IntoIterator<Item = f64>) -> AxisRange {
    if let Some((min, max)) = axis_limit(column) {
        return AxisRange::new(min, max);
    }

    let (min, max) = observed_bounds(observed);
    let min = match min {
        Some(m) if m < 0.0 => m,
        _ => 0.0,
    };
    let max = match max {
        Some(m) if m != 0.0 => m,
        _ => 1.0,
    };
    AxisRange::new(min, max).non_degenerate()
}

/// X range for one panel: the override if the column has one, otherwise the
/// panel's own data with a 5% margin (bars also get half a bucket of room).
pub fn resolve_x_limits(column: &str, xs: &[f64], has_bars: bool) -> AxisRange {
    if let Some((min, max)) = axis_limit(column) {
        return AxisRange::new(min, max);
    }

    let (Some(mut min), Some(mut max)) = observed_bounds(xs.iter().copied()) else {
        return AxisRange::new(0.0, 1.0);
    };
    if has_bars {
        max += BIN_WIDTH;
    }
    let pad = (max - min) * 0.05;
    min -= pad;
    max += pad;
    AxisRange::new(min, max).non_degenerate()
}

fn observed_bounds(values: impl IntoIterator<Item = f64>) -> (Option<f64>, Option<f64>) {
    values.into_iter().fold((None, None), |(lo, hi), v| {
        (
            Some(lo.map_or(v, |l: f64| l.min(v))),
            Some(hi.map_or(v, |h: f64| h.max(v))),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Cell, TableBuilder};

    fn table() -> MeasurementTable {
        let mut t = TableBuilder::new(vec!["x".into(), "y".into(), "z".into()]);
        t.push_row("A", vec![1.0.into(), 2.0.into(), 3.0.into()]);
        t.push_row("A", vec![Cell::Text("bad".into()), 2.0.into(), 3.0.into()]);
        t.push_row("B", vec![1.2.into(), Cell::Null, 3.0.into()]);
        t.push_row("B", vec![1.7.into(), Cell::Text("4".into()), 5.0.into()]);
        t.push_row("B", vec![f64::INFINITY.into(), 1.0.into(), 1.0.into()]);
        t.build().unwrap()
    }

    fn frame(xs: &[f64], ys: &[f64]) -> DataFrame {
        polars::df!(X_FIELD => xs, "y0" => ys).unwrap()
    }

    #[test]
    fn test_clean_frame_drops_unparsable() {
        let t = table();
        let clean = clean_frame(&t, "x", &["y"]).unwrap().unwrap();
        assert_eq!(clean.height(), 2);
        assert_eq!(x_values(&clean).unwrap(), vec![1.0, 1.7]);

        let b = vendor_frame(&clean, "B").unwrap();
        assert_eq!(vendor_points(&b, 0, PlotStyle::Scatter).unwrap(), vec![(1.7, 4.0)]);
    }

    #[test]
    fn test_clean_frame_empty_is_none() {
        let t = table();
        assert!(clean_frame(&t, "x", &["missing"]).unwrap().is_none());

        let mut t = TableBuilder::new(vec!["x".into(), "y".into()]);
        t.push_row("A", vec![Cell::Null, 1.0.into()]);
        let t = t.build().unwrap();
        assert!(clean_frame(&t, "x", &["y"]).unwrap().is_none());
    }

    #[test]
    fn test_bin_means() {
        let f = frame(&[1.1, 1.4, 2.0, -0.2], &[2.0, 4.0, 10.0, 1.0]);
        let means = bin_means(&f, X_FIELD, "y0").unwrap();
        assert_eq!(means, vec![(-0.5, 1.0), (1.0, 3.0), (2.0, 10.0)]);
    }

    #[test]
    fn test_bin_bucket_edges() {
        // lower bound is inclusive, upper bound exclusive
        let f = frame(&[1.0, 1.49, 1.5, -0.1, -90.3, 7.4999], &[1.0; 6]);
        let buckets: Vec<f64> = bin_means(&f, X_FIELD, "y0")
            .unwrap()
            .into_iter()
            .map(|(b, _)| b)
            .collect();
        assert_eq!(buckets, vec![-90.5, -0.5, 1.0, 1.5, 7.0]);
    }

    #[test]
    fn test_vendor_points_by_style() {
        let t = table();
        let clean = clean_frame(&t, "x", &["z"]).unwrap().unwrap();
        let b = vendor_frame(&clean, "B").unwrap();
        assert_eq!(
            vendor_points(&b, 0, PlotStyle::Scatter).unwrap(),
            vec![(1.2, 3.0), (1.7, 5.0)]
        );
        assert_eq!(
            vendor_points(&b, 0, PlotStyle::Bar).unwrap(),
            vec![(1.0, 3.0), (1.5, 5.0)]
        );
        let c = vendor_frame(&clean, "C").unwrap();
        assert!(vendor_points(&c, 0, PlotStyle::Scatter).unwrap().is_empty());
        assert!(vendor_points(&c, 0, PlotStyle::Bar).unwrap().is_empty());
    }

    #[test]
    fn test_resolve_y_limits_override() {
        let limits = resolve_y_limits("LTE_UE_PathLoss_DL", vec![10.0, 500.0]);
        assert_eq!(limits, AxisRange::new(80.0, 130.0));
        let limits = resolve_y_limits("LTE_UE_RSRP", vec![-70.0]);
        assert_eq!(limits, AxisRange::new(-110.0, -60.0));
    }

    #[test]
    fn test_resolve_y_limits_floor_and_default_max() {
        assert_eq!(resolve_y_limits("tp", vec![3.0, 9.0]), AxisRange::new(0.0, 9.0));
        assert_eq!(resolve_y_limits("sinr", vec![-4.0, 9.0]), AxisRange::new(-4.0, 9.0));
        assert_eq!(resolve_y_limits("zero", vec![0.0, 0.0]), AxisRange::new(0.0, 1.0));
        assert_eq!(resolve_y_limits("none", Vec::new()), AxisRange::new(0.0, 1.0));
        assert_eq!(resolve_y_limits("neg", vec![-5.0, -2.0]), AxisRange::new(-5.0, -2.0));
    }

    #[test]
    fn test_resolve_y_limits_constant_negative() {
        let limits = resolve_y_limits("neg", vec![-3.0, -3.0]);
        assert_eq!(limits, AxisRange::new(-3.5, -2.5));
        assert!(limits.max > limits.min);
    }

    #[test]
    fn test_resolve_x_limits() {
        assert_eq!(
            resolve_x_limits("LTE_UE_RSRP", &[-95.0], false),
            AxisRange::new(-110.0, -60.0)
        );
        assert_eq!(resolve_x_limits("x", &[], false), AxisRange::new(0.0, 1.0));

        let fitted = resolve_x_limits("x", &[0.0, 10.0], false);
        assert_eq!(fitted, AxisRange::new(-0.5, 10.5));

        let single = resolve_x_limits("x", &[3.0], false);
        assert!(single.max > single.min);
    }
}
