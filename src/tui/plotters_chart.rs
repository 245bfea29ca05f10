//! Plotters-powered spending bar chart widget for Ratatui.
//!
//! Plotters draws only the bars and the baseline; tick and date labels are
//! laid out by the caller in Ratatui cells around the chart rect, which reads
//! better at terminal resolution.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Fraction of each slot left empty on either side of a bar.
pub const BAR_GAP: f64 = 0.15;

/// A render-only bar chart description.
///
/// All values and bounds are computed outside the render call.
pub struct SpendingBarsChart<'a> {
    /// One bar per date label, in chart order.
    pub values: &'a [f64],
    /// Top of the y axis (bars start at zero).
    pub y_max: f64,
}

impl<'a> Widget for SpendingBarsChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 10 || area.height < 4 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let n = self.values.len();
        let y_max = self.y_max;
        if n == 0 || !(y_max.is_finite() && y_max > 0.0) {
            return;
        }
        let x_max = n as f64;

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root).build_cartesian_2d(0.0..x_max, 0.0..y_max)?;

            // Same teal as the web chart's dataset.
            let bar_color = RGBColor(75, 192, 192);

            chart.draw_series(self.values.iter().enumerate().map(|(i, &v)| {
                let x = i as f64;
                Rectangle::new(
                    [(x + BAR_GAP, 0.0), (x + 1.0 - BAR_GAP, v.clamp(0.0, y_max))],
                    bar_color.filled(),
                )
            }))?;

            chart.draw_series(std::iter::once(PathElement::new(
                vec![(0.0, 0.0), (x_max, 0.0)],
                WHITE,
            )))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
