use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Span,
    widgets::{Block, Borders, Gauge, Paragraph},
};

use droidmon::sample::Sample;

use crate::ui::theme::load_color;

pub fn draw_gpu(f: &mut ratatui::Frame<'_>, area: Rect, latest: Option<&Sample>) {
    let mut area = area;
    let block = Block::default().borders(Borders::ALL).title("GPU");
    f.render_widget(block, area);

    // Guard: need some space inside the block
    if area.height <= 2 || area.width <= 2 {
        return;
    }
    area.y += 1;
    area.height = area.height.saturating_sub(2);
    area.x += 1;
    area.width = area.width.saturating_sub(2);

    let Some(s) = latest else {
        f.render_widget(Paragraph::new("no data"), area);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(1); area.height.min(2) as usize])
        .split(area);

    let load = s.gpu_load.clamp(0.0, 100.0);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(8), Constraint::Length(12)])
        .split(rows[0]);
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(load_color(load)))
        .label(Span::raw(""))
        .ratio(load / 100.0);
    f.render_widget(gauge, cols[0]);
    f.render_widget(
        Paragraph::new(Span::raw(format!("load: {:.0}%", s.gpu_load)))
            .style(Style::default().fg(Color::Gray)),
        cols[1],
    );

    if rows.len() > 1 {
        f.render_widget(
            Paragraph::new(Span::raw(format!("freq: {:.0} MHz", s.gpu_freq)))
                .style(Style::default().fg(Color::Gray)),
            rows[1],
        );
    }
}
