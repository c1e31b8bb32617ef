//! Key help and last status message.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

pub fn draw_footer(f: &mut ratatui::Frame<'_>, area: Rect, interval: f64, status: &str) {
    let keys = format!(
        "c connect  d disconnect  s start  x stop  e export  1-4/Tab metric  +/- interval ({interval}s)  "
    );
    let line = Line::from(vec![
        Span::styled(keys, Style::default().fg(Color::DarkGray)),
        Span::raw(status.to_string()),
    ]);
    f.render_widget(Paragraph::new(line), area);
}
