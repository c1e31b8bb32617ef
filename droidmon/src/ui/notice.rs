//! Modal notice drawn over everything until dismissed.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::Notice;
use crate::ui::theme::NOTICE_BORDER;

/// `pending` counts `notice` itself plus any queued behind it.
pub fn draw_notice(f: &mut ratatui::Frame<'_>, area: Rect, notice: &Notice, pending: usize) {
    let width = area.width.saturating_sub(4).min(60);
    let height = 7.min(area.height);
    let rect = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(NOTICE_BORDER))
        .title(Span::styled(
            match pending {
                0 | 1 => notice.title.to_string(),
                n => format!("{} (+{} more)", notice.title, n - 1),
            },
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
    let text = vec![
        Line::from(notice.body.clone()),
        Line::from(""),
        Line::from(Span::styled(
            "press Enter to dismiss",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
        rect,
    );
}
