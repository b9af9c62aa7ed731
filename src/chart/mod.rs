//! Side-by-side vendor comparison charts.
//!
//! Every chart shape goes through the same [`pipeline`]; [`figure`] turns
//! the prepared data into an immutable [`Figure`], and [`render`] draws it to
//! PNG with `plotters`.

pub mod figure;
pub mod pipeline;
pub mod render;

use serde::Serialize;
use std::fmt;

pub use figure::{
    Figure, Panel, Series, build_dual_axis_figure, build_scatter_figure, build_single_figure,
};
pub use pipeline::AxisRange;
pub use render::RenderError;

/// How one Y axis is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PlotStyle {
    /// Raw points.
    Scatter,
    /// Mean of Y per 0.5-wide X bucket.
    Bar,
}

impl PlotStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlotStyle::Scatter => "scatter",
            PlotStyle::Bar => "bar",
        }
    }

    /// Capitalised form used in chart titles.
    pub fn title(&self) -> &'static str {
        match self {
            PlotStyle::Scatter => "Scatter",
            PlotStyle::Bar => "Bar",
        }
    }
}

impl fmt::Display for PlotStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
