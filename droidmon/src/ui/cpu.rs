//! Per-core rows: load sparkline, frequency and load with a trend arrow.

use ratatui::style::Modifier;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Sparkline},
};

use droidmon::history::PerCoreHistory;
use droidmon::sample::{core_ids, Sample};

use crate::ui::theme::load_color;

pub fn draw_per_core(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    latest: Option<&Sample>,
    per_core_hist: &PerCoreHistory,
) {
    let title = match latest {
        Some(s) => format!("CPU cores ({})", core_ids(s).len()),
        None => "CPU cores".into(),
    };
    f.render_widget(Block::default().borders(Borders::ALL).title(title), area);
    let Some(sample) = latest else {
        return;
    };

    let inner = Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    };
    if inner.height == 0 {
        return;
    }

    let show_n = (inner.height as usize).min(sample.cores.len());
    let constraints: Vec<Constraint> = (0..show_n).map(|_| Constraint::Length(1)).collect();
    let vchunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (i, core) in sample.cores.iter().take(show_n).enumerate() {
        let hchunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(4), Constraint::Length(22)])
            .split(vchunks[i]);

        let curr = core.load_pct;
        let older = per_core_hist
            .deques
            .get(i)
            .and_then(|d| d.iter().rev().nth(10).copied())
            .map(|v| v as f64)
            .unwrap_or(curr);
        let trend = if curr > older + 0.2 {
            "↑"
        } else if curr + 0.2 < older {
            "↓"
        } else {
            "╌"
        };
        let fg = load_color(curr);

        let hist: Vec<u64> = per_core_hist
            .deques
            .get(i)
            .map(|d| {
                let max_points = hchunks[0].width as usize;
                let start = d.len().saturating_sub(max_points);
                d.iter().skip(start).map(|&v| v as u64).collect()
            })
            .unwrap_or_default();
        let spark = Sparkline::default()
            .data(&hist)
            .max(100)
            .style(Style::default().fg(fg));
        f.render_widget(spark, hchunks[0]);

        let label = format!(
            "c{:<2}{:>5.0}MHz{}{:>5.1}%",
            core.index, core.freq_mhz, trend, curr
        );
        let line = Line::from(Span::styled(
            label,
            Style::default().fg(fg).add_modifier(Modifier::BOLD),
        ));
        f.render_widget(Paragraph::new(line).right_aligned(), hchunks[1]);
    }
}
