//! Top header: server, session state, device identity and sample count.

use droidmon::session::SessionState;
use ratatui::{
    layout::Rect,
    widgets::{Block, Borders},
};

use crate::ui::util::truncate_middle;

pub fn draw_header(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    server: &str,
    state: &SessionState,
    samples: usize,
) {
    let device = match state.device() {
        None => "no device".to_string(),
        Some(d) => {
            let id = truncate_middle(&d.id, 24);
            match &d.info {
                Some(i) => format!(
                    "{id} | {} | Android {} (API {})",
                    i.model, i.os_version, i.api_level
                ),
                None => id,
            }
        }
    };
    let session = match state.interval() {
        Some(iv) => format!("monitoring every {iv}s"),
        None => state.label().to_string(),
    };
    let title = format!(
        "droidmon | {server} | {session} | {device} | {samples} samples  (press 'q' to quit)"
    );
    f.render_widget(Block::default().title(title).borders(Borders::BOTTOM), area);
}
