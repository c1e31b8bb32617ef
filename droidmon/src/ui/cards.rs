//! Row of headline values from the newest sample.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
};

use droidmon::sample::{mean_cpu_freq, mean_cpu_load, Sample};

use crate::ui::util::fmt_value;

fn card(f: &mut ratatui::Frame<'_>, area: Rect, title: &str, value: String) {
    let p = Paragraph::new(value)
        .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        .centered()
        .block(Block::default().borders(Borders::ALL).title(title.to_string()));
    f.render_widget(p, area);
}

pub fn draw_cards(f: &mut ratatui::Frame<'_>, area: Rect, latest: Option<&Sample>) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 5); 5])
        .split(area);

    let dash = || "-".to_string();
    let values = match latest {
        Some(s) => [
            fmt_value(s.fps),
            mean_cpu_load(s).map(|v| format!("{v:.1} %")).unwrap_or_else(|_| dash()),
            mean_cpu_freq(s).map(|v| format!("{v:.0} MHz")).unwrap_or_else(|_| dash()),
            format!("{} mA", fmt_value(s.current)),
            format!("{} mW", fmt_value(s.power)),
        ],
        None => [dash(), dash(), dash(), dash(), dash()],
    };
    let titles = ["FPS", "CPU load", "CPU freq", "Current", "Power"];
    for ((rect, title), value) in cols.iter().zip(titles).zip(values) {
        card(f, *rect, title, value);
    }
}
