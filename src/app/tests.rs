use super::*;
use crate::ui::AppState;
use serde_json::json;

fn item(id: &str, name: &str, stock: i64) -> Item {
    Item {
        id: id.to_string(),
        name: Some(name.to_string()),
        stock: Some(stock),
        ..Default::default()
    }
}

fn loaded(state: &mut AppState, items: Vec<Item>) {
    let seq = match update(state, AppMsg::FetchList).as_slice() {
        [Effect::FetchList { seq }] => *seq,
        _ => panic!("expected a fetch effect"),
    };
    let _ = update(
        state,
        AppMsg::ListLoaded {
            seq,
            outcome: Ok(items),
        },
    );
}

#[test]
fn fetch_then_load_fills_the_list() {
    let mut st = AppState::default();
    loaded(&mut st, vec![item("1", "Skruv", 10), item("2", "Mutter", 3)]);
    assert!(!st.stock.loading);
    assert_eq!(st.stock.items.len(), 2);
    assert!(st.stock.last_error.is_none());
}

#[test]
fn stale_list_response_is_dropped() {
    let mut st = AppState::default();
    let first = match update(&mut st, AppMsg::FetchList).as_slice() {
        [Effect::FetchList { seq }] => *seq,
        _ => panic!("expected a fetch effect"),
    };
    let second = match update(&mut st, AppMsg::FetchList).as_slice() {
        [Effect::FetchList { seq }] => *seq,
        _ => panic!("expected a fetch effect"),
    };
    let _ = update(
        &mut st,
        AppMsg::ListLoaded {
            seq: second,
            outcome: Ok(vec![item("1", "Skruv", 10)]),
        },
    );
    // The superseded response must not clobber the newer one.
    let _ = update(
        &mut st,
        AppMsg::ListLoaded {
            seq: first,
            outcome: Ok(Vec::new()),
        },
    );
    assert_eq!(st.stock.items.len(), 1);
}

#[test]
fn failed_fetch_keeps_rows_and_surfaces_error() {
    let mut st = AppState::default();
    loaded(&mut st, vec![item("1", "Skruv", 10)]);
    let seq = match update(&mut st, AppMsg::FetchList).as_slice() {
        [Effect::FetchList { seq }] => *seq,
        _ => panic!("expected a fetch effect"),
    };
    let _ = update(
        &mut st,
        AppMsg::ListLoaded {
            seq,
            outcome: Err("failed to reach https://api".into()),
        },
    );
    assert_eq!(st.stock.items.len(), 1);
    assert!(st.stock.last_error.as_deref().unwrap().contains("failed"));
    // A later success clears the error line again.
    loaded(&mut st, vec![item("1", "Skruv", 9)]);
    assert!(st.stock.last_error.is_none());
}

#[test]
fn activating_a_row_selects_and_populates() {
    let mut st = AppState::default();
    loaded(&mut st, vec![item("7", "Bult", 4)]);
    let _ = update(&mut st, AppMsg::ActivateRow(0));
    assert_eq!(st.bridge.selection().unwrap().id, "7");
    assert!(st.editor_visible);
    assert_eq!(st.form.value("id"), "7");
    assert_eq!(st.form.value("name"), "Bult");
    assert_eq!(st.form.value("stock"), "4");
}

#[test]
fn activating_the_selected_row_again_clears_selection() {
    let mut st = AppState::default();
    loaded(&mut st, vec![item("7", "Bult", 4)]);
    let _ = update(&mut st, AppMsg::ActivateRow(0));
    let _ = update(&mut st, AppMsg::ActivateRow(0));
    assert!(st.bridge.selection().is_none());
    assert_eq!(st.form.value("id"), "");
    assert_eq!(st.form.value("name"), "");
}

#[test]
fn selection_toggle_matches_by_id_not_position() {
    let mut st = AppState::default();
    loaded(&mut st, vec![item("7", "Bult", 4), item("8", "Spik", 1)]);
    let _ = update(&mut st, AppMsg::ActivateRow(0));
    // Reload reorders the list; the same id at a new index still toggles off.
    loaded(&mut st, vec![item("8", "Spik", 1), item("7", "Bult", 4)]);
    let _ = update(&mut st, AppMsg::ActivateRow(1));
    assert!(st.bridge.selection().is_none());
}

#[test]
fn mode_change_reseeds_fields_only_with_a_selection() {
    let mut st = AppState::default();
    loaded(&mut st, vec![item("7", "Bult", 4)]);
    let _ = update(&mut st, AppMsg::ActivateRow(0));
    let _ = update(
        &mut st,
        AppMsg::FieldInput {
            key: "id".into(),
            value: "typed".into(),
        },
    );
    let _ = update(&mut st, AppMsg::ChangeMode(OperationMode::Delete));
    assert_eq!(st.form.value("id"), "7");

    // Without a selection, typed values survive the round trip.
    let _ = update(&mut st, AppMsg::ActivateRow(0));
    let _ = update(
        &mut st,
        AppMsg::FieldInput {
            key: "id".into(),
            value: "99".into(),
        },
    );
    let _ = update(&mut st, AppMsg::ChangeMode(OperationMode::Create));
    let _ = update(&mut st, AppMsg::ChangeMode(OperationMode::Delete));
    assert_eq!(st.form.value("id"), "99");
}

#[test]
fn submit_builds_request_and_gates_reentry() {
    let mut st = AppState::default();
    st.config.api_key = "k".into();
    st.config.base_url = "https://api.example.se/v2".into();
    let _ = update(&mut st, AppMsg::ChangeMode(OperationMode::Delete));
    let _ = update(
        &mut st,
        AppMsg::FieldInput {
            key: "id".into(),
            value: "5".into(),
        },
    );
    let effects = update(&mut st, AppMsg::Submit);
    match effects.as_slice() {
        [Effect::Submit { request, id }] => {
            assert_eq!(id, "5");
            assert_eq!(request.url, "https://api.example.se/v2/products");
            assert_eq!(request.body.as_deref(), Some("id=5&api_key=k"));
        }
        _ => panic!("expected a submit effect"),
    }
    assert!(st.submitting);
    assert!(st.form.disabled);
    // A second submit while one is in flight is a no-op.
    assert!(update(&mut st, AppMsg::Submit).is_empty());
}

#[test]
fn read_submit_shows_result_without_reload() {
    let mut st = AppState::default();
    let _ = update(&mut st, AppMsg::Submit);
    let before = st.bridge.reload();
    let effects = update(
        &mut st,
        AppMsg::SubmitDone {
            mode: OperationMode::Read,
            id: "3".into(),
            outcome: Ok(Some(json!({"name": "Skruv", "stock": 7}))),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(st.bridge.reload(), before);
    assert!(!st.submitting);
    assert!(!st.form.disabled);
    assert_eq!(st.result.text(), "name: Skruv\nstock: 7");
}

#[test]
fn mutating_submit_reloads_exactly_once() {
    let mut st = AppState::default();
    let _ = update(&mut st, AppMsg::Submit);
    let before = st.bridge.reload();
    let effects = update(
        &mut st,
        AppMsg::SubmitDone {
            mode: OperationMode::Update,
            id: "3".into(),
            outcome: Ok(Some(json!({}))),
        },
    );
    assert_eq!(st.bridge.reload(), before + 1);
    assert_eq!(st.result.text(), "Edited item by ID 3.");
    assert!(st.stock.loading);
    let fetches = effects
        .iter()
        .filter(|e| matches!(e, Effect::FetchList { .. }))
        .count();
    assert_eq!(fetches, 1);
}

#[test]
fn failed_submit_shows_error_verbatim() {
    let mut st = AppState::default();
    let _ = update(&mut st, AppMsg::Submit);
    let effects = update(
        &mut st,
        AppMsg::SubmitDone {
            mode: OperationMode::Create,
            id: String::new(),
            outcome: Err("failed to reach https://api.example.se/v2: timed out".into()),
        },
    );
    assert!(st
        .result
        .text()
        .starts_with("failed to reach https://api.example.se/v2"));
    assert!(effects
        .iter()
        .any(|e| matches!(e, Effect::ShowToast { .. })));
    assert!(!st.submitting);
}

#[test]
fn toggle_editor_pulls_focus_back_to_list() {
    let mut st = AppState {
        editor_visible: true,
        focus: crate::ui::Focus::Form,
        ..Default::default()
    };
    let _ = update(&mut st, AppMsg::ToggleEditor);
    assert!(!st.editor_visible);
    assert!(matches!(st.focus, crate::ui::Focus::List));
    let _ = update(&mut st, AppMsg::ToggleEditor);
    assert!(st.editor_visible);
}

#[test]
fn clear_result_empties_the_pane() {
    let mut st = AppState::default();
    st.result.set_text("old".into());
    let _ = update(&mut st, AppMsg::ClearResult);
    assert!(st.result.is_empty());
}
