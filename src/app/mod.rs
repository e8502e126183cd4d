use serde_json::Value as JsonValue;

use crate::model::{Item, OperationMode};
use crate::services::api::{build_submit_request, ApiRequest};
use crate::ui::AppState;

pub enum AppMsg {
    FetchList,
    ListLoaded {
        seq: u64,
        outcome: Result<Vec<Item>, String>,
    },
    ActivateRow(usize),
    ChangeMode(OperationMode),
    FieldInput {
        key: String,
        value: String,
    },
    Submit,
    SubmitDone {
        mode: OperationMode,
        id: String,
        outcome: Result<Option<JsonValue>, String>,
    },
    ClearResult,
    ToggleEditor,
}

pub enum Effect {
    FetchList {
        seq: u64,
    },
    Submit {
        request: ApiRequest,
        id: String,
    },
    ShowToast {
        text: String,
        level: crate::ui::ToastLevel,
        seconds: u64,
    },
}

/// Start a list fetch: bump the sequence number so older in-flight
/// responses are discarded, and mark the list as loading.
fn schedule_fetch(state: &mut AppState) -> Effect {
    let seq = state.bridge.begin_fetch();
    state.stock.loading = true;
    Effect::FetchList { seq }
}

pub fn update(state: &mut AppState, msg: AppMsg) -> Vec<Effect> {
    use AppMsg::*;
    let mut effects: Vec<Effect> = Vec::new();
    match msg {
        FetchList => {
            effects.push(schedule_fetch(state));
        }
        ListLoaded { seq, outcome } => {
            if !state.bridge.is_current_fetch(seq) {
                state.dbg(format!("list: dropped stale response (seq {})", seq));
                return effects;
            }
            state.stock.loading = false;
            match outcome {
                Ok(items) => {
                    state.dbg(format!("list: loaded {} items", items.len()));
                    state.stock.set_items(items);
                }
                Err(err) => {
                    // Keep the stale rows visible; the pane shows the error inline.
                    state.dbg(format!("list: fetch failed: {}", err));
                    state.stock.last_error = Some(err);
                }
            }
        }
        ActivateRow(idx) => {
            let Some(item) = state.stock.items.get(idx).cloned() else {
                return effects;
            };
            let already = state
                .bridge
                .selection()
                .map(|sel| sel.id == item.id)
                .unwrap_or(false);
            if already {
                state.bridge.set_selection(None);
                state.form.populate_from(None);
            } else {
                state.form.populate_from(Some(&item));
                state.bridge.set_selection(Some(item));
                state.editor_visible = true;
            }
        }
        ChangeMode(mode) => {
            state.form.set_mode(mode);
            // A live selection reseeds the fields the new mode shows;
            // without one, whatever was typed stays put.
            if let Some(sel) = state.bridge.selection().cloned() {
                state.form.refresh_visible_from(&sel);
            }
        }
        FieldInput { key, value } => {
            state.form.set_value(&key, value);
        }
        Submit => {
            if state.submitting {
                state.dbg("submit: ignored, request already in flight".to_string());
                return effects;
            }
            let mode = state.form.mode;
            let fields = state.form.visible_pairs();
            let id = fields
                .iter()
                .find(|(k, _)| k == "id")
                .map(|(_, v)| v.clone())
                .unwrap_or_default();
            let request = build_submit_request(&state.config, mode, &fields);
            state.submitting = true;
            state.form.disabled = true;
            state.status_text = Some(format!("{} /products…", mode.verb()));
            effects.push(Effect::Submit { request, id });
        }
        SubmitDone { mode, id, outcome } => {
            state.submitting = false;
            state.form.disabled = false;
            state.status_text = None;
            match outcome {
                Ok(data) => {
                    let text = crate::services::api::summarize(mode, &id, data.as_ref());
                    state.result.set_text(text);
                    if mode != OperationMode::Read {
                        state.bridge.request_reload();
                        effects.push(schedule_fetch(state));
                        effects.push(Effect::ShowToast {
                            text: "Stock list refreshed".to_string(),
                            level: crate::ui::ToastLevel::Success,
                            seconds: 3,
                        });
                    }
                }
                Err(err) => {
                    state.result.set_text(err);
                    effects.push(Effect::ShowToast {
                        text: "Request failed".to_string(),
                        level: crate::ui::ToastLevel::Error,
                        seconds: 4,
                    });
                }
            }
        }
        ClearResult => {
            state.result.clear();
        }
        ToggleEditor => {
            state.editor_visible = !state.editor_visible;
            if !state.editor_visible
                && matches!(state.focus, crate::ui::Focus::Form | crate::ui::Focus::Result)
            {
                state.focus = crate::ui::Focus::List;
            }
        }
    }
    effects
}

#[cfg(test)]
mod tests;
