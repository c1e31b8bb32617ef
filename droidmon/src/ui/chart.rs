//! Line chart of the selected metric over the rolling window.

use droidmon::chart::Series;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
};

use crate::ui::theme::metric_color;
use crate::ui::util::fmt_value;

// y axis starts at zero unless values go negative, with 10% headroom
fn y_bounds(series: &Series) -> [f64; 2] {
    let (lo, hi) = series.bounds().unwrap_or((0.0, 1.0));
    let lo = if lo < 0.0 { lo * 1.1 } else { 0.0 };
    let hi = if hi <= 0.0 { 1.0 } else { hi * 1.1 };
    [lo, hi]
}

pub fn draw_metric_chart(f: &mut ratatui::Frame<'_>, area: Rect, series: &Series) {
    let metric = series.metric;
    let color = metric_color(metric);
    let title = match series.points.back() {
        Some(p) => format!(
            "{} ({}) now: {}",
            metric.label(),
            metric.unit(),
            fmt_value(p.value)
        ),
        None => format!("{} ({})", metric.label(), metric.unit()),
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    if series.points.is_empty() {
        f.render_widget(
            Paragraph::new("waiting for samples...")
                .style(Style::default().fg(Color::DarkGray))
                .block(block),
            area,
        );
        return;
    }

    let data: Vec<(f64, f64)> = series
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.value))
        .collect();
    let x_max = (data.len().saturating_sub(1)).max(1) as f64;
    let [y_lo, y_hi] = y_bounds(series);

    let first = series.points.front().map(|p| p.label.clone()).unwrap_or_default();
    let last = series.points.back().map(|p| p.label.clone()).unwrap_or_default();

    let dataset = Dataset::default()
        .name(metric.label())
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .title("time")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, x_max])
                .labels(vec![Span::raw(first), Span::raw(last)]),
        )
        .y_axis(
            Axis::default()
                .title(metric.unit())
                .style(Style::default().fg(Color::Gray))
                .bounds([y_lo, y_hi])
                .labels(vec![
                    Span::raw(fmt_value(y_lo)),
                    Span::raw(fmt_value((y_lo + y_hi) / 2.0)),
                    Span::raw(fmt_value(y_hi)),
                ]),
        );
    f.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use droidmon::chart::{ChartPoint, ChartSink};

    #[test]
    fn y_axis_begins_at_zero() {
        let mut s = Series::default();
        assert_eq!(y_bounds(&s), [0.0, 1.0]);
        for v in [40.0, 60.0] {
            s.push(ChartPoint { label: String::new(), value: v });
        }
        let [lo, hi] = y_bounds(&s);
        assert_eq!(lo, 0.0);
        assert!((hi - 66.0).abs() < 1e-9);
    }
}
