use std::collections::HashMap;

use crossterm::event::KeyCode;
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::AppMsg;
use crate::model::{field_label, Item, OperationMode, PRODUCT_KEYS};
use crate::widgets::chrome::panel_block;

/// Editor form state. Row 0 is the mode selector, rows 1..=n the fields
/// the current mode shows, and the last row the submit button.
///
/// Field values live in one backing map keyed by field name, so text
/// typed into a field survives mode switches that hide and re-show it.
#[derive(Clone, Debug, Default)]
pub struct FormState {
    pub mode: OperationMode,
    values: HashMap<String, String>,
    pub selected: usize,
    pub editing: bool,
    pub message: Option<String>,
    pub disabled: bool,
}

fn all_field_keys() -> impl Iterator<Item = &'static str> {
    PRODUCT_KEYS.into_iter().chain(std::iter::once("id"))
}

impl FormState {
    fn field_count(&self) -> usize {
        self.mode.visible_fields().len()
    }

    fn submit_row(&self) -> usize {
        self.field_count() + 1
    }

    fn selected_field_key(&self) -> Option<&'static str> {
        if self.selected == 0 || self.selected > self.field_count() {
            return None;
        }
        Some(self.mode.visible_fields()[self.selected - 1])
    }

    pub fn value(&self, key: &str) -> String {
        self.values.get(key).cloned().unwrap_or_default()
    }

    pub fn set_value(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    pub fn set_mode(&mut self, mode: OperationMode) {
        self.mode = mode;
        self.editing = false;
        self.message = None;
        if self.selected > self.submit_row() {
            self.selected = self.submit_row();
        }
    }

    /// Seed every field from the activated row, or blank them all out
    /// when the selection is cleared.
    pub fn populate_from(&mut self, item: Option<&Item>) {
        self.editing = false;
        match item {
            Some(it) => {
                for key in all_field_keys() {
                    self.values
                        .insert(key.to_string(), it.field(key).unwrap_or_default());
                }
            }
            None => self.values.clear(),
        }
    }

    /// Reseed just the fields the current mode shows; hidden fields keep
    /// whatever they held.
    pub fn refresh_visible_from(&mut self, item: &Item) {
        for key in self.mode.visible_fields() {
            self.values
                .insert(key.to_string(), item.field(key).unwrap_or_default());
        }
    }

    /// Field name/value pairs in display order, ready for the request
    /// builder. Absent values submit as empty strings.
    pub fn visible_pairs(&self) -> Vec<(String, String)> {
        self.mode
            .visible_fields()
            .iter()
            .map(|key| (key.to_string(), self.value(key)))
            .collect()
    }

    pub fn on_key(&mut self, key: KeyCode) -> Vec<AppMsg> {
        if self.disabled {
            return Vec::new();
        }
        match key {
            KeyCode::Up if !self.editing => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down if !self.editing => {
                if self.selected < self.submit_row() {
                    self.selected += 1;
                }
            }
            KeyCode::Left if !self.editing && self.selected == 0 => {
                return vec![AppMsg::ChangeMode(self.mode.prev())];
            }
            KeyCode::Right if !self.editing && self.selected == 0 => {
                return vec![AppMsg::ChangeMode(self.mode.next())];
            }
            KeyCode::Enter => {
                if self.editing {
                    self.editing = false;
                } else if self.selected == self.submit_row() {
                    return vec![AppMsg::Submit];
                } else if self.selected_field_key().is_some() {
                    self.editing = true;
                    self.message = None;
                }
            }
            KeyCode::Esc if self.editing => {
                self.editing = false;
            }
            KeyCode::Backspace if self.editing => {
                if let Some(key) = self.selected_field_key() {
                    let mut v = self.value(key);
                    v.pop();
                    return vec![AppMsg::FieldInput {
                        key: key.to_string(),
                        value: v,
                    }];
                }
            }
            KeyCode::Char(c) if self.editing => {
                if let Some(key) = self.selected_field_key() {
                    let mut v = self.value(key);
                    v.push(c);
                    return vec![AppMsg::FieldInput {
                        key: key.to_string(),
                        value: v,
                    }];
                }
            }
            _ => {}
        }
        Vec::new()
    }
}

pub fn draw_form(f: &mut Frame, area: Rect, form: &FormState, highlight: bool, cursor_on: bool) {
    let mut lines: Vec<Line> = Vec::new();

    let sel = if form.selected == 0 { '›' } else { ' ' };
    let mode_style = if form.selected == 0 {
        crate::theme::text_active_bold()
    } else {
        Style::default()
    };
    lines.push(Line::from(vec![
        Span::raw(format!("{sel} Mode: ")),
        Span::styled(format!("‹ {} ›", form.mode.label()), mode_style),
        Span::styled(
            format!("  {}", form.mode.verb()),
            crate::theme::text_muted(),
        ),
    ]));

    for (i, key) in form.mode.visible_fields().iter().enumerate() {
        let row = i + 1;
        let sel = if row == form.selected { '›' } else { ' ' };
        let mut val = form.value(key);
        if form.editing && row == form.selected && cursor_on {
            val.push('▏');
        }
        let value_style = if row == form.selected {
            if form.editing {
                crate::theme::text_editing_bold()
            } else {
                crate::theme::text_active_bold()
            }
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::raw(format!("{sel} {}: ", field_label(key))),
            Span::styled(val, value_style),
        ]));
    }

    lines.push(Line::from(""));
    let submit_label = format!("[ {} ]", form.mode.verb());
    let submit_style = if form.disabled {
        crate::theme::text_muted()
    } else if form.selected == form.submit_row() {
        crate::theme::list_cursor_style()
    } else {
        crate::theme::text_active_bold()
    };
    lines.push(Line::from(Span::styled(
        format!("  {submit_label}"),
        submit_style,
    )));

    if let Some(msg) = &form.message {
        lines.push(Line::from(Span::styled(
            msg.clone(),
            crate::theme::text_muted(),
        )));
    }

    let title = if form.disabled {
        "Editor — sending…".to_string()
    } else if form.editing {
        "Editor — editing".to_string()
    } else {
        "Editor".to_string()
    };
    let block = panel_block(&title, highlight);
    let p = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(p, area);
}
