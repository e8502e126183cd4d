use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use ratatui::widgets::*;
use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use crate::app::{update, AppMsg, Effect};
use crate::bridge::SharedState;
use crate::model::{load_config, ApiConfig};
use crate::services::api::{self, ApiEvent};
use crate::widgets::form::{draw_form, FormState};
use crate::widgets::result_viewer::ResultViewerState;
use crate::widgets::status_bar::draw_footer;
use crate::widgets::stock_list::{draw_stock_list, StockListState};

#[derive(Default)]
pub(crate) struct AppState {
    pub(crate) config: ApiConfig,
    pub(crate) bridge: SharedState,
    pub(crate) stock: StockListState,
    pub(crate) form: FormState,
    pub(crate) result: ResultViewerState,
    pub(crate) editor_visible: bool,
    pub(crate) focus: Focus,
    pub(crate) submitting: bool,
    pub(crate) status_text: Option<String>,
    pub(crate) toast: Option<Toast>,
    pub(crate) tick: u64,
    pub(crate) booted: bool,
    pub(crate) tx: Option<Sender<ApiEvent>>,
    pub(crate) rx: Option<Receiver<ApiEvent>>,
    pub(crate) theme: crate::theme::Theme,
    pub(crate) debug_log: VecDeque<String>,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Focus {
    #[default]
    List,
    Form,
    Result,
}

impl AppState {
    pub fn dbg(&mut self, msg: impl Into<String>) {
        const MAX_LOG_LINES: usize = 200;
        if self.debug_log.len() >= MAX_LOG_LINES {
            self.debug_log.pop_front();
        }
        self.debug_log.push_back(msg.into());
    }
}

#[derive(Clone, Copy)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

pub struct Toast {
    pub text: String,
    pub level: ToastLevel,
    pub expires_at_tick: u64,
}

fn run_effects(state: &mut AppState, effects: Vec<Effect>) {
    for e in effects {
        match e {
            Effect::FetchList { seq } => {
                if let Some(tx) = &state.tx {
                    api::spawn_fetch_products(state.config.clone(), seq, tx.clone());
                }
            }
            Effect::Submit { request, id } => {
                if let Some(tx) = &state.tx {
                    api::spawn_submit(state.config.clone(), request, id, tx.clone());
                }
            }
            Effect::ShowToast {
                text,
                level,
                seconds,
            } => {
                let ticks = seconds.saturating_mul(5); // ~200ms tick
                let exp = state.tick.saturating_add(ticks);
                state.toast = Some(Toast {
                    text,
                    level,
                    expires_at_tick: exp,
                });
            }
        }
    }
}

fn dispatch(state: &mut AppState, msgs: Vec<AppMsg>) {
    for msg in msgs {
        let effects = update(state, msg);
        run_effects(state, effects);
    }
}

/// Drain worker-thread results and feed them through the update loop.
fn pump_api_events(state: &mut AppState) {
    let mut drained: Vec<ApiEvent> = Vec::new();
    if let Some(rx) = &state.rx {
        while let Ok(ev) = rx.try_recv() {
            drained.push(ev);
        }
    }
    for ev in drained {
        let msg = match ev {
            ApiEvent::ListLoaded { seq, outcome } => AppMsg::ListLoaded { seq, outcome },
            ApiEvent::SubmitDone { mode, id, outcome } => AppMsg::SubmitDone { mode, id, outcome },
        };
        let effects = update(state, msg);
        run_effects(state, effects);
    }
}

fn boot(state: &mut AppState) {
    if state.booted {
        return;
    }
    state.booted = true;
    let effs = update(state, AppMsg::FetchList);
    run_effects(state, effs);
}

pub fn run() -> Result<()> {
    let cfg = load_config()?;
    let mut state = AppState {
        config: cfg,
        editor_visible: true,
        theme: crate::theme::Theme::warehouse_dark(),
        ..Default::default()
    };
    let (tx, rx) = mpsc::channel::<ApiEvent>();
    state.tx = Some(tx);
    state.rx = Some(rx);

    // Headless smoke mode
    let headless = std::env::var("LAGER_TUI_HEADLESS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
        .unwrap_or(false);
    let headless_ticks: u64 = std::env::var("LAGER_TUI_TICKS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(10);
    let headless_summary: bool = std::env::var("LAGER_TUI_SMOKE_SUMMARY")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
        .unwrap_or(false);
    if headless {
        let backend = ratatui::backend::TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend)?;
        let tick_rate = Duration::from_millis(200);
        let mut last_tick = Instant::now();
        for _ in 0..headless_ticks {
            boot(&mut state);
            terminal.draw(|f| ui(f, &mut state))?;
            pump_api_events(&mut state);
            if last_tick.elapsed() >= tick_rate {
                state.tick = state.tick.wrapping_add(1);
                last_tick = Instant::now();
            }
            std::thread::sleep(tick_rate);
        }
        if headless_summary {
            let summary = serde_json::json!({
                "ok": state.stock.last_error.is_none(),
                "items": state.stock.items.len(),
                "editor": state.editor_visible,
                "result_present": !state.result.is_empty(),
            });
            println!("{summary}");
        }
        return Ok(());
    }

    // Setup terminal (interactive)
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();
    let res = loop {
        boot(&mut state);
        terminal.draw(|f| ui(f, &mut state))?;
        pump_api_events(&mut state);
        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                let editing = state.form.editing && matches!(state.focus, Focus::Form);
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
                {
                    copy_focused_pane(&mut state);
                } else if editing {
                    // While editing, every key belongs to the form.
                    let msgs = state.form.on_key(key.code);
                    dispatch(&mut state, msgs);
                } else {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break Ok(()),
                        KeyCode::Tab => cycle_focus(&mut state, true),
                        KeyCode::BackTab => cycle_focus(&mut state, false),
                        KeyCode::Char('e') | KeyCode::Char('E') => {
                            let effs = update(&mut state, AppMsg::ToggleEditor);
                            run_effects(&mut state, effs);
                        }
                        other => {
                            let msgs = match state.focus {
                                Focus::List => state.stock.on_key(other),
                                Focus::Form => state.form.on_key(other),
                                Focus::Result => state.result.on_key(other),
                            };
                            dispatch(&mut state, msgs);
                        }
                    }
                }
            }
        }
        if last_tick.elapsed() >= tick_rate {
            state.tick = state.tick.wrapping_add(1);
            last_tick = Instant::now();
        }
    };
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    res
}

fn cycle_focus(state: &mut AppState, forward: bool) {
    let order: &[Focus] = if state.editor_visible {
        &[Focus::List, Focus::Form, Focus::Result]
    } else {
        &[Focus::List]
    };
    let pos = order.iter().position(|f| *f == state.focus).unwrap_or(0);
    let next = if forward {
        (pos + 1) % order.len()
    } else {
        (pos + order.len() - 1) % order.len()
    };
    state.focus = order[next];
}

fn copy_focused_pane(state: &mut AppState) {
    let content = match state.focus {
        Focus::List => state
            .stock
            .items
            .iter()
            .map(|it| {
                format!(
                    "{}\t{}",
                    it.name.as_deref().unwrap_or(""),
                    it.stock.map(|n| n.to_string()).unwrap_or_default()
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Focus::Form => state
            .form
            .visible_pairs()
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join("\n"),
        Focus::Result => state.result.text().to_string(),
    };
    if !content.is_empty() {
        if let Ok(mut clipboard) = arboard::Clipboard::new() {
            let _ = clipboard.set_text(&content);
            state.status_text = Some("Copied to clipboard!".to_string());
        }
    }
}

fn help_text(state: &AppState) -> String {
    if state.form.editing && matches!(state.focus, Focus::Form) {
        return "type to edit  |  Enter done  |  Esc cancel".to_string();
    }
    match state.focus {
        Focus::List => "↑/↓ move  |  Enter select  |  r refresh  |  e editor  |  Tab focus  |  q quit"
            .to_string(),
        Focus::Form => "↑/↓ rows  |  ←/→ mode  |  Enter edit/submit  |  Tab focus  |  q quit"
            .to_string(),
        Focus::Result => "↑/↓ scroll  |  w wrap  |  c clear  |  Tab focus  |  q quit".to_string(),
    }
}

fn ui(f: &mut Frame, state: &mut AppState) {
    // Clear expired toast
    if let Some(t) = &state.toast {
        if state.tick >= t.expires_at_tick {
            state.toast = None;
        }
    }

    let screen = f.area();
    let bg = Block::default().style(Style::default().bg(state.theme.bg));
    f.render_widget(bg, screen);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(screen);
    crate::widgets::header::draw_header(f, rows[0], state);

    let body = rows[1];
    if state.editor_visible {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(body);
        draw_stock_list(f, cols[0], state, matches!(state.focus, Focus::List));
        let mut form_h = state.form.mode.visible_fields().len() as u16 + 5;
        if state.form.message.is_some() {
            form_h += 1;
        }
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(form_h), Constraint::Min(0)])
            .split(cols[1]);
        let cursor_on = state.tick % 2 == 0;
        draw_form(
            f,
            right[0],
            &state.form,
            matches!(state.focus, Focus::Form),
            cursor_on,
        );
        state
            .result
            .render(f, right[1], matches!(state.focus, Focus::Result));
    } else {
        draw_stock_list(f, body, state, matches!(state.focus, Focus::List));
    }

    let help = help_text(state);
    draw_footer(f, rows[2], state, &help);
}
