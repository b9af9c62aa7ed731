//! Figure model and the three public chart builders.

use polars::prelude::{DataFrame, PolarsResult};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::axis_limit;
use crate::chart::PlotStyle;
use crate::chart::pipeline::{
    AxisRange, clean_frame, resolve_x_limits, resolve_y_limits, vendor_frame, vendor_points,
    x_values,
};
use crate::table::MeasurementTable;

/// RGB colour plus opacity, independent of the drawing backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesColor {
    pub rgb: (u8, u8, u8),
    pub opacity: f64,
}

const ORANGE: (u8, u8, u8) = (255, 127, 14);
const GREEN: (u8, u8, u8) = (44, 160, 44);
const BLUE: (u8, u8, u8) = (31, 119, 180);
const RED: (u8, u8, u8) = (214, 39, 40);

/// One plotted metric on one panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    pub style: PlotStyle,
    pub color: SeriesColor,
    pub points: Vec<(f64, f64)>,
}

/// One vendor's half of the figure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub vendor: String,
    pub title: String,
    pub x_label: String,
    pub y1_label: String,
    pub y2_label: Option<String>,
    pub x_range: AxisRange,
    pub primary: Series,
    pub secondary: Option<Series>,
}

/// A fully resolved two-panel comparison chart.
///
/// Both panels share `y1_range` (and `y2_range` on dual-axis figures) so
/// the vendors are drawn on the same scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub title: String,
    pub file_name: String,
    pub panels: [Panel; 2],
    /// Fitted to the plotted Y1 values of both vendors. For a bar-style Y1
    /// those are the bucket means, so a raw sample outside the range can
    /// still exist.
    pub y1_range: AxisRange,
    pub y2_range: Option<AxisRange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Single,
    ScatterOnly,
    DualAxis,
}

#[derive(Debug, Clone, Copy)]
struct AxisSpec<'a> {
    column: &'a str,
    style: PlotStyle,
}

/// One vendor's cleaned X values and plotted points.
struct VendorData {
    xs: Vec<f64>,
    y1: Vec<(f64, f64)>,
    y2: Option<Vec<(f64, f64)>>,
}

/// Two panels with Y1 on the left axis and Y2 on a twin right axis.
///
/// Each axis' limits are shared by both panels and fitted to what that axis
/// draws, so a bar-style axis is scaled to its bucket means rather than to
/// the raw samples. Returns `None` when no row has numeric X, Y1 and Y2.
#[tracing::instrument(skip(table), fields(rows = table.len()))]
#[allow(clippy::too_many_arguments)]
pub fn build_dual_axis_figure(
    table: &MeasurementTable,
    x_column: &str,
    y1_column: &str,
    y2_column: &str,
    left_style: PlotStyle,
    right_style: PlotStyle,
    vendor1: &str,
    vendor2: &str,
) -> Option<Figure> {
    build_figure(
        table,
        x_column,
        AxisSpec {
            column: y1_column,
            style: left_style,
        },
        Some(AxisSpec {
            column: y2_column,
            style: right_style,
        }),
        Layout::DualAxis,
        [vendor1, vendor2],
    )
}

/// Two panels with a single Y metric in the given style.
///
/// In bar style the shared Y limits come from the bucket means. Returns
/// `None` when no row has numeric X and Y1.
#[tracing::instrument(skip(table), fields(rows = table.len()))]
pub fn build_single_figure(
    table: &MeasurementTable,
    x_column: &str,
    y1_column: &str,
    y1_style: PlotStyle,
    vendor1: &str,
    vendor2: &str,
) -> Option<Figure> {
    build_figure(
        table,
        x_column,
        AxisSpec {
            column: y1_column,
            style: y1_style,
        },
        None,
        Layout::Single,
        [vendor1, vendor2],
    )
}

/// Two raw scatter panels for a single Y metric.
///
/// Returns `None` when no row has numeric X and Y1.
#[tracing::instrument(skip(table), fields(rows = table.len()))]
pub fn build_scatter_figure(
    table: &MeasurementTable,
    x_column: &str,
    y1_column: &str,
    vendor1: &str,
    vendor2: &str,
) -> Option<Figure> {
    build_figure(
        table,
        x_column,
        AxisSpec {
            column: y1_column,
            style: PlotStyle::Scatter,
        },
        None,
        Layout::ScatterOnly,
        [vendor1, vendor2],
    )
}

fn build_figure(
    table: &MeasurementTable,
    x_column: &str,
    y1: AxisSpec<'_>,
    y2: Option<AxisSpec<'_>>,
    layout: Layout,
    vendors: [&str; 2],
) -> Option<Figure> {
    match try_build_figure(table, x_column, y1, y2, layout, vendors) {
        Ok(figure) => figure,
        Err(error) => {
            warn!(%error, x = x_column, y1 = y1.column, "Failed to prepare chart data");
            None
        }
    }
}

fn try_build_figure(
    table: &MeasurementTable,
    x_column: &str,
    y1: AxisSpec<'_>,
    y2: Option<AxisSpec<'_>>,
    layout: Layout,
    vendors: [&str; 2],
) -> PolarsResult<Option<Figure>> {
    let mut y_columns = vec![y1.column];
    if let Some(y2) = y2 {
        y_columns.push(y2.column);
    }

    let Some(clean) = clean_frame(table, x_column, &y_columns)? else {
        warn!(
            x = x_column,
            y = ?y_columns,
            "Not enough data found for the selected columns"
        );
        return Ok(None);
    };
    debug!(clean_rows = clean.height(), "Rows kept after numeric cleaning");

    log_overrides(x_column, y1, y2);

    let [first, second] = vendors;
    let data = [
        vendor_data(&clean, first, y1, y2)?,
        vendor_data(&clean, second, y1, y2)?,
    ];

    let y1_range = resolve_y_limits(y1.column, data.iter().flat_map(|d| d.y1.iter().map(|p| p.1)));
    let y2_range = y2.map(|spec| {
        resolve_y_limits(
            spec.column,
            data.iter()
                .filter_map(|d| d.y2.as_ref())
                .flatten()
                .map(|p| p.1),
        )
    });

    let [first_data, second_data] = data;
    let panels = [
        build_panel(x_column, y1, y2, layout, 0, first, first_data),
        build_panel(x_column, y1, y2, layout, 1, second, second_data),
    ];

    Ok(Some(Figure {
        title: figure_title(x_column, y1, y2, layout, vendors),
        file_name: file_name(x_column, y1, y2, layout, vendors),
        panels,
        y1_range,
        y2_range,
    }))
}

fn vendor_data(
    clean: &DataFrame,
    vendor: &str,
    y1: AxisSpec<'_>,
    y2: Option<AxisSpec<'_>>,
) -> PolarsResult<VendorData> {
    let rows = vendor_frame(clean, vendor)?;
    Ok(VendorData {
        xs: x_values(&rows)?,
        y1: vendor_points(&rows, 0, y1.style)?,
        y2: y2.map(|spec| vendor_points(&rows, 1, spec.style)).transpose()?,
    })
}

fn build_panel(
    x_column: &str,
    y1: AxisSpec<'_>,
    y2: Option<AxisSpec<'_>>,
    layout: Layout,
    index: usize,
    vendor: &str,
    data: VendorData,
) -> Panel {
    let (primary_rgb, secondary_rgb) = if index == 0 { (ORANGE, GREEN) } else { (BLUE, RED) };

    let primary = Series {
        label: series_label(y1),
        style: y1.style,
        color: SeriesColor {
            rgb: primary_rgb,
            opacity: if y1.style == PlotStyle::Bar { 0.6 } else { 0.7 },
        },
        points: data.y1,
    };

    let secondary = y2.zip(data.y2).map(|(spec, points)| Series {
        label: series_label(spec),
        style: spec.style,
        color: SeriesColor {
            rgb: secondary_rgb,
            opacity: if spec.style == PlotStyle::Bar { 0.4 } else { 0.6 },
        },
        points,
    });

    let has_bars = primary.style == PlotStyle::Bar
        || secondary.as_ref().is_some_and(|s| s.style == PlotStyle::Bar);

    Panel {
        vendor: vendor.to_string(),
        title: panel_title(x_column, y1, y2, layout, vendor),
        x_label: x_column.to_string(),
        y1_label: y1.column.to_string(),
        y2_label: y2.map(|spec| {
            let kind = match spec.style {
                PlotStyle::Bar => "Mean",
                PlotStyle::Scatter => "Scatter",
            };
            format!("{} ({kind})", spec.column)
        }),
        x_range: resolve_x_limits(x_column, &data.xs, has_bars),
        primary,
        secondary,
    }
}

fn series_label(spec: AxisSpec<'_>) -> String {
    match spec.style {
        PlotStyle::Bar => format!("{} (Bar Mean)", spec.column),
        PlotStyle::Scatter => format!("{} (Scatter)", spec.column),
    }
}

fn panel_title(
    x_column: &str,
    y1: AxisSpec<'_>,
    y2: Option<AxisSpec<'_>>,
    layout: Layout,
    vendor: &str,
) -> String {
    match (layout, y2) {
        (Layout::DualAxis, Some(y2)) => format!(
            "{vendor} Data: {} ({}) & {} ({}) vs. {x_column}",
            y1.column,
            y1.style.title(),
            y2.column,
            y2.style.title()
        ),
        _ => format!(
            "{vendor} Data: {} ({}) vs. {x_column}",
            y1.column,
            y1.style.title()
        ),
    }
}

fn figure_title(
    x_column: &str,
    y1: AxisSpec<'_>,
    y2: Option<AxisSpec<'_>>,
    layout: Layout,
    [vendor1, vendor2]: [&str; 2],
) -> String {
    match (layout, y2) {
        (Layout::DualAxis, Some(y2)) => format!(
            "{} & {} vs. {x_column} - {vendor1} / {vendor2} ({} / {})",
            y1.column,
            y2.column,
            y1.style.title(),
            y2.style.title()
        ),
        (Layout::ScatterOnly, _) => format!(
            "{} vs. {x_column} (Scatter Only) - {vendor1} / {vendor2}",
            y1.column
        ),
        _ => format!(
            "{} vs. {x_column} - {vendor1} / {vendor2} ({})",
            y1.column,
            y1.style.title()
        ),
    }
}

fn file_name(
    x_column: &str,
    y1: AxisSpec<'_>,
    y2: Option<AxisSpec<'_>>,
    layout: Layout,
    [vendor1, vendor2]: [&str; 2],
) -> String {
    let name = match (layout, y2) {
        (Layout::DualAxis, Some(y2)) => format!(
            "separated_plot_{vendor1}_vs_{vendor2}_{x_column}_vs_{}_and_{}_{}_{}.png",
            y1.column, y2.column, y1.style, y2.style
        ),
        (Layout::ScatterOnly, _) => {
            format!("scatter_{vendor1}_vs_{vendor2}_{x_column}_vs_{}.png", y1.column)
        }
        _ => format!(
            "single_{vendor1}_vs_{vendor2}_{x_column}_vs_{}_{}.png",
            y1.column, y1.style
        ),
    };
    sanitize_file_name(&name)
}

/// Replaces spaces and slashes so the name is safe as a single path segment.
pub fn sanitize_file_name(name: &str) -> String {
    name.replace([' ', '/'], "_")
}

fn log_overrides(x_column: &str, y1: AxisSpec<'_>, y2: Option<AxisSpec<'_>>) {
    let x = axis_limit(x_column);
    let y1_limits = axis_limit(y1.column);
    let y2_limits = y2.and_then(|spec| axis_limit(spec.column));
    if x.is_some() || y1_limits.is_some() || y2_limits.is_some() {
        info!(x = ?x, y1 = ?y1_limits, y2 = ?y2_limits, "Applying custom axis limits");
    }
}
