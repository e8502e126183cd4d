use crossterm::event::KeyCode;
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::AppMsg;
use crate::model::Item;
use crate::ui::AppState;
use crate::widgets::chrome::panel_block;

#[derive(Default)]
pub struct StockListState {
    pub items: Vec<Item>,
    pub cursor: usize,
    pub loading: bool,
    pub last_error: Option<String>,
}

impl StockListState {
    /// Replace the rows after a successful fetch; a success also clears
    /// any error left over from a previous attempt.
    pub fn set_items(&mut self, items: Vec<Item>) {
        self.items = items;
        if self.cursor >= self.items.len() {
            self.cursor = self.items.len().saturating_sub(1);
        }
        self.last_error = None;
    }

    pub fn on_key(&mut self, key: KeyCode) -> Vec<AppMsg> {
        match key {
            KeyCode::Up => {
                self.cursor = self.cursor.saturating_sub(1);
                Vec::new()
            }
            KeyCode::Down => {
                if self.cursor + 1 < self.items.len() {
                    self.cursor += 1;
                }
                Vec::new()
            }
            KeyCode::Home => {
                self.cursor = 0;
                Vec::new()
            }
            KeyCode::End => {
                self.cursor = self.items.len().saturating_sub(1);
                Vec::new()
            }
            KeyCode::Enter | KeyCode::Char(' ') => vec![AppMsg::ActivateRow(self.cursor)],
            KeyCode::Char('r') | KeyCode::Char('R') => vec![AppMsg::FetchList],
            _ => Vec::new(),
        }
    }
}

pub(crate) fn compute_scroll_window(total: usize, selected: usize, inner_h: u16) -> (usize, usize) {
    if inner_h == 0 || total == 0 {
        return (0, 0);
    }
    let sel = selected.min(total.saturating_sub(1));
    let ih = inner_h as usize;
    let start = sel.saturating_sub(ih - 1);
    let end = (start + ih).min(total);
    (start, end)
}

fn clip(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

pub fn draw_stock_list(f: &mut Frame, area: Rect, state: &AppState, focused: bool) {
    let stock = &state.stock;
    let title = if stock.loading {
        let spinner = ["⠋", "⠙", "⠸", "⠴", "⠦", "⠇"][state.tick as usize % 6];
        format!("Lagerförteckning {spinner}")
    } else {
        "Lagerförteckning".to_string()
    };
    let block = panel_block(&title, focused);
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let stock_w: usize = 10;
    let name_w = (inner.width as usize).saturating_sub(stock_w + 4).max(8);

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(
        format!("  {:<name_w$} {:>stock_w$}", "Namn", "Lagersaldo"),
        crate::theme::text_muted(),
    )));

    // One line for the header, maybe one for an error at the bottom.
    let mut list_h = inner.height.saturating_sub(1);
    if stock.last_error.is_some() {
        list_h = list_h.saturating_sub(1);
    }
    let (start, end) = compute_scroll_window(stock.items.len(), stock.cursor, list_h);
    for (idx, item) in stock.items.iter().enumerate().skip(start).take(end - start) {
        let is_cursor = idx == stock.cursor;
        let is_selected = state
            .bridge
            .selection()
            .map(|sel| sel.id == item.id)
            .unwrap_or(false);
        let marker = if is_cursor { "> " } else { "  " };
        let name = clip(item.name.as_deref().unwrap_or(""), name_w);
        let saldo = item.stock.map(|n| n.to_string()).unwrap_or_default();
        let text = format!("{marker}{:<name_w$} {:>stock_w$}", name, saldo);
        let style = if is_cursor && focused {
            crate::theme::list_cursor_style()
        } else if is_selected {
            crate::theme::text_active_bold()
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(text, style)));
    }
    if stock.items.is_empty() && !stock.loading && stock.last_error.is_none() {
        lines.push(Line::from(Span::styled(
            "  (no products)",
            crate::theme::text_muted(),
        )));
    }
    if let Some(err) = &stock.last_error {
        lines.push(Line::from(Span::styled(
            format!("! {}", clip(err, (inner.width as usize).saturating_sub(2))),
            crate::theme::text_error(),
        )));
    }
    let p = Paragraph::new(lines);
    f.render_widget(p, inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_window_keeps_cursor_visible() {
        let (s1, e1) = compute_scroll_window(20, 0, 5);
        assert_eq!((s1, e1), (0, 5));
        let (s2, e2) = compute_scroll_window(20, 4, 5);
        assert_eq!((s2, e2), (0, 5));
        let (s3, e3) = compute_scroll_window(20, 5, 5);
        assert_eq!((s3, e3), (1, 6));
        let (s4, e4) = compute_scroll_window(20, 19, 5);
        assert_eq!((s4, e4), (15, 20));
    }

    #[test]
    fn cursor_stays_in_bounds_after_shrink() {
        let mut st = StockListState {
            items: vec![Item::default(), Item::default(), Item::default()],
            cursor: 2,
            ..Default::default()
        };
        st.set_items(vec![Item::default()]);
        assert_eq!(st.cursor, 0);
        st.set_items(Vec::new());
        assert_eq!(st.cursor, 0);
    }

    #[test]
    fn keys_emit_row_activation_and_refresh() {
        let mut st = StockListState {
            items: vec![Item::default(), Item::default()],
            cursor: 1,
            ..Default::default()
        };
        let msgs = st.on_key(KeyCode::Enter);
        assert!(matches!(msgs.as_slice(), [AppMsg::ActivateRow(1)]));
        let msgs = st.on_key(KeyCode::Char('r'));
        assert!(matches!(msgs.as_slice(), [AppMsg::FetchList]));
        st.on_key(KeyCode::Down);
        assert_eq!(st.cursor, 1);
    }

    #[test]
    fn clip_appends_ellipsis() {
        assert_eq!(clip("short", 10), "short");
        assert_eq!(clip("longer name", 7), "longer…");
    }
}
