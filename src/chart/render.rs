//! PNG rendering of a [`Figure`] with `plotters`.

use std::fmt::Display;
use std::io::Cursor;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use thiserror::Error;
use tracing::info;

use crate::chart::PlotStyle;
use crate::chart::figure::{Figure, Panel, Series, SeriesColor};
use crate::chart::pipeline::AxisRange;

/// Output size in pixels, two panels side by side.
pub const FIGURE_SIZE: (u32, u32) = (1500, 450);

/// Drawn bar width in X units; narrower than a bucket so neighbours stay apart.
const BAR_WIDTH: f64 = 0.4;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Rendered buffer does not match the figure size")]
    Buffer,

    #[error("Failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Failed to save plot to file: {0}")]
    FileSave(#[from] std::io::Error),
}

type Result<T> = core::result::Result<T, RenderError>;

fn drawing(e: impl Display) -> RenderError {
    RenderError::Drawing(e.to_string())
}

fn rgba(color: SeriesColor) -> RGBAColor {
    let (r, g, b) = color.rgb;
    RGBColor(r, g, b).mix(color.opacity)
}

/// Draws `$series` with `$chart.$draw` in the series' style and registers its
/// legend entry. Bars grow from `$baseline`.
macro_rules! draw_styled {
    ($chart:ident . $draw:ident, $series:expr, $baseline:expr) => {{
        let series: &Series = $series;
        let baseline: f64 = $baseline;
        let color = rgba(series.color);
        let anno = match series.style {
            PlotStyle::Scatter => $chart.$draw(
                series
                    .points
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), 3, color.filled())),
            ),
            PlotStyle::Bar => $chart.$draw(series.points.iter().map(|&(x, y)| {
                let half = BAR_WIDTH / 2.0;
                Rectangle::new([(x - half, baseline), (x + half, y)], color.filled())
            })),
        }
        .map_err(drawing)?;
        anno.label(series.label.clone())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }};
}

impl Figure {
    /// Renders both panels into an in-memory PNG.
    ///
    /// Text is drawn with system fonts, so a host without any sans-serif font
    /// fails with [`RenderError::Drawing`].
    pub fn render_png(&self) -> Result<Vec<u8>> {
        let (width, height) = FIGURE_SIZE;
        let mut buffer = vec![0u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, FIGURE_SIZE).into_drawing_area();
            root.fill(&WHITE).map_err(drawing)?;
            let body = root.titled(&self.title, ("sans-serif", 22)).map_err(drawing)?;

            let areas = body.split_evenly((1, 2));
            for (area, panel) in areas.iter().zip(self.panels.iter()) {
                self.draw_panel(area, panel)?;
            }
            root.present().map_err(drawing)?;
        }

        let pixels = image::RgbImage::from_raw(width, height, buffer).ok_or(RenderError::Buffer)?;
        let mut out = Cursor::new(Vec::new());
        pixels.write_to(&mut out, image::ImageOutputFormat::Png)?;
        Ok(out.into_inner())
    }

    /// Renders the figure and writes it to `path`.
    pub fn save_png(&self, path: &Path) -> Result<()> {
        let bytes = self.render_png()?;
        std::fs::write(path, bytes)?;
        info!(path = %path.display(), "Plot saved");
        Ok(())
    }

    fn draw_panel(&self, area: &DrawingArea<BitMapBackend<'_>, Shift>, panel: &Panel) -> Result<()> {
        let x = panel.x_range;
        let y1 = self.y1_range;
        let twin = panel.secondary.as_ref().zip(self.y2_range);

        let mut chart = ChartBuilder::on(area)
            .caption(&panel.title, ("sans-serif", 15))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .right_y_label_area_size(if twin.is_some() { 60 } else { 0 })
            .build_cartesian_2d(x.min..x.max, y1.min..y1.max)
            .map_err(drawing)?;

        chart
            .configure_mesh()
            .x_desc(panel.x_label.as_str())
            .y_desc(panel.y1_label.as_str())
            .light_line_style(TRANSPARENT)
            .draw()
            .map_err(drawing)?;

        match twin {
            Some((secondary, y2)) => {
                let mut chart = chart.set_secondary_coord(x.min..x.max, y2.min..y2.max);
                chart
                    .configure_secondary_axes()
                    .y_desc(panel.y2_label.as_deref().unwrap_or_default())
                    .draw()
                    .map_err(drawing)?;

                draw_styled!(chart.draw_series, &panel.primary, baseline(y1));
                draw_styled!(chart.draw_secondary_series, secondary, baseline(y2));

                chart
                    .configure_series_labels()
                    .position(SeriesLabelPosition::UpperLeft)
                    .background_style(WHITE.mix(0.8))
                    .border_style(BLACK)
                    .draw()
                    .map_err(drawing)?;
            }
            None => {
                draw_styled!(chart.draw_series, &panel.primary, baseline(y1));

                chart
                    .configure_series_labels()
                    .position(SeriesLabelPosition::UpperLeft)
                    .background_style(WHITE.mix(0.8))
                    .border_style(BLACK)
                    .draw()
                    .map_err(drawing)?;
            }
        }

        Ok(())
    }
}

/// Zero, pulled into the visible range.
fn baseline(range: AxisRange) -> f64 {
    0.0_f64.max(range.min).min(range.max)
}
