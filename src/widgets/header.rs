use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::ui::AppState;

/// Top banner: app title centered, thin separator below.
pub fn draw_header(f: &mut Frame, area: Rect, state: &AppState) {
    let border = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(if state.status_text.is_some() {
            crate::theme::border_focused()
        } else {
            crate::theme::text_muted()
        });
    let inner = border.inner(area);
    let title = state
        .config
        .title
        .clone()
        .unwrap_or_else(|| "Lager TUI".to_string());
    let p = Paragraph::new(Line::from(Span::styled(title, crate::theme::title_style())))
        .alignment(Alignment::Center);
    f.render_widget(p, inner);
    f.render_widget(border, area);
}
