//! Plotters-powered census bar chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.
//! Category labels under each group are drawn by the caller with plain Ratatui
//! paragraphs, since terminal cells are too coarse for Plotters' text layout.

use plotters::prelude::*;
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Horizontal room reserved per group; bars sit inside `[i + GAP, i + 1 - GAP]`.
const GROUP_GAP: f64 = 0.12;

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call, which keeps
/// `render()` focused on drawing.
pub struct CensusBarChart<'a> {
    /// One group per regime, in display order: `(active, debris)` counts.
    pub groups: &'a [(usize, usize)],
    /// Upper y bound (object count).
    pub y_max: f64,
    pub y_label: &'a str,
}

pub const ACTIVE_COLOR: RGBColor = RGBColor(0, 255, 255); // cyan
pub const DEBRIS_COLOR: RGBColor = RGBColor(255, 80, 80); // red

impl<'a> Widget for CensusBarChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x1 = self.groups.len().max(1) as f64;
        let y1 = self.y_max;
        if !(y1.is_finite() && y1 > 0.0) {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 1)
                .build_cartesian_2d(0.0..x1, 0.0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(0)
                .y_labels(5)
                .y_desc(self.y_label)
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .draw()?;

            let half = 0.5 - GROUP_GAP;
            for (i, &(active, debris)) in self.groups.iter().enumerate() {
                let left = i as f64 + GROUP_GAP;
                let mid = left + half;
                let right = mid + half;

                if active > 0 {
                    chart.draw_series(std::iter::once(Rectangle::new(
                        [(left, 0.0), (mid - 0.02, active as f64)],
                        ACTIVE_COLOR.filled(),
                    )))?;
                }
                if debris > 0 {
                    chart.draw_series(std::iter::once(Rectangle::new(
                        [(mid + 0.02, 0.0), (right, debris as f64)],
                        DEBRIS_COLOR.filled(),
                    )))?;
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Y-axis upper bound with a little headroom above the tallest bar.
pub fn y_upper_bound(groups: &[(usize, usize)]) -> f64 {
    let tallest = groups
        .iter()
        .map(|&(a, d)| a.max(d))
        .max()
        .unwrap_or(0);
    if tallest == 0 {
        return 1.0;
    }
    tallest as f64 * 1.1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upper_bound_has_headroom() {
        assert_eq!(y_upper_bound(&[]), 1.0);
        assert_eq!(y_upper_bound(&[(0, 0), (0, 0)]), 1.0);
        let y = y_upper_bound(&[(100, 20), (5, 300)]);
        assert!((y - 330.0).abs() < 1e-9);
    }

    fn render_into(area: Rect, groups: &[(usize, usize)]) -> Buffer {
        let mut buf = Buffer::empty(area);
        CensusBarChart {
            groups,
            y_max: y_upper_bound(groups),
            y_label: "objects",
        }
        .render(area, &mut buf);
        buf
    }

    #[test]
    fn small_area_shows_resize_hint() {
        let buf = render_into(Rect::new(0, 0, 50, 4), &[(3, 1)]);
        let first_row: String = (0..buf.area.width).map(|x| buf[(x, 0)].symbol().to_string()).collect();
        assert!(first_row.starts_with("Chart area too small"));
    }

    #[test]
    fn renders_filled_bars_without_panicking() {
        let groups = [(120, 40), (3, 0), (0, 7)];
        let buf = render_into(Rect::new(0, 0, 60, 20), &groups);
        assert_eq!(buf.area, Rect::new(0, 0, 60, 20));
    }
}
