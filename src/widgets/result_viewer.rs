use crossterm::event::KeyCode;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::AppMsg;
use crate::widgets::chrome::panel_block;

/// Scrollable pane for the text of the last submit response.
#[derive(Default)]
pub struct ResultViewerState {
    text: String,
    wrap: bool,
    scroll_y: u16,
    last_viewport_h: u16,
}

impl ResultViewerState {
    pub fn set_text(&mut self, text: String) {
        self.text = text;
        self.scroll_y = 0;
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.scroll_y = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn on_key(&mut self, key: KeyCode) -> Vec<AppMsg> {
        match key {
            KeyCode::Up => {
                self.scroll_y = self.scroll_y.saturating_sub(1);
            }
            KeyCode::Down => self.scroll_y = self.scroll_y.saturating_add(1),
            KeyCode::PageUp => {
                self.scroll_y = self.scroll_y.saturating_sub(self.last_viewport_h);
            }
            KeyCode::PageDown => {
                self.scroll_y = self.scroll_y.saturating_add(self.last_viewport_h);
            }
            KeyCode::Home => self.scroll_y = 0,
            KeyCode::End => {
                self.scroll_y = self
                    .text
                    .lines()
                    .count()
                    .saturating_sub(self.last_viewport_h as usize)
                    as u16;
            }
            KeyCode::Char('w') | KeyCode::Char('W') => self.wrap = !self.wrap,
            KeyCode::Char('c') | KeyCode::Char('C') => return vec![AppMsg::ClearResult],
            _ => {}
        }
        Vec::new()
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, focused: bool) {
        let mut lines: Vec<Line> = Vec::new();
        if self.text.is_empty() {
            lines.push(Line::from(Span::styled(
                "No result yet. Submit a request from the form above.",
                crate::theme::text_muted(),
            )));
        } else {
            for l in self.text.lines() {
                lines.push(Line::from(l.to_string()));
            }
        }
        self.last_viewport_h = area.height.saturating_sub(2);
        let total = lines.len() as u16;
        let max_scroll = total.saturating_sub(self.last_viewport_h);
        if self.scroll_y > max_scroll {
            self.scroll_y = max_scroll;
        }
        let block = panel_block("Result", focused);
        let p = Paragraph::new(lines)
            .block(block)
            .wrap(ratatui::widgets::Wrap { trim: !self.wrap })
            .scroll((self.scroll_y, 0));
        f.render_widget(p, area);
    }
}
