use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::Backend;
use std::time::Duration;
use tracing::{debug, info};

use crate::app::{AppState, FormState, InputMode, KeyAction, ModalState};
use crate::model::UserId;
use crate::store::{Confirmation, DeleteOutcome, SaveOutcome};
use crate::ui;

/// Draw, poll input, repeat until the user quits.
pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: AppState) -> Result<()> {
    info!("event loop started");
    while !app.should_quit {
        app.tick();
        terminal.draw(|f| ui::render(f, &mut app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(&mut app, key);
                }
            }
        }
    }
    info!("event loop finished");
    Ok(())
}

/// Route one key press according to the current input mode.
pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    match app.input_mode() {
        InputMode::Form => handle_form_key(app, key),
        InputMode::Modal => handle_modal_key(app, key.code),
        InputMode::Normal => {
            if let Some(action) = app.keymap.resolve(&key) {
                apply_action(app, action);
            }
        }
    }
}

fn apply_action(app: &mut AppState, action: KeyAction) {
    let len = app.store.users().len();
    let rpp = app.rows_per_page.max(1);
    match action {
        KeyAction::Quit => app.should_quit = true,
        KeyAction::OpenHelp => app.modal = Some(ModalState::Help),
        KeyAction::NewUser => {
            app.form = FormState::default();
            app.store.open_create_modal();
        }
        KeyAction::EditSelection => {
            if let Some(user) = app.selected_user().cloned() {
                app.form = FormState::default();
                app.store.open_edit_modal(&user);
            }
        }
        KeyAction::DeleteSelection => {
            let target = app.selected_user().map(|u| (u.id, u.name.clone()));
            if let Some((id, name)) = target {
                app.modal = Some(ModalState::DeleteConfirm { id, name, selected: 1 });
            }
        }
        KeyAction::MoveUp => {
            app.selected_user_index = app.selected_user_index.saturating_sub(1);
        }
        KeyAction::MoveDown => {
            if app.selected_user_index + 1 < len {
                app.selected_user_index += 1;
            }
        }
        KeyAction::PageUp | KeyAction::MoveLeftPage => {
            app.selected_user_index = app.selected_user_index.saturating_sub(rpp);
        }
        KeyAction::PageDown | KeyAction::MoveRightPage => {
            let new_idx = app.selected_user_index.saturating_add(rpp);
            app.selected_user_index = new_idx.min(len.saturating_sub(1));
        }
        KeyAction::Ignore => {}
    }
}

fn handle_form_key(app: &mut AppState, key: KeyEvent) {
    let focus = app.form.focus;
    match key.code {
        KeyCode::Esc => {
            app.store.close_modal();
            app.form.error = None;
        }
        KeyCode::Tab | KeyCode::Down => app.form.focus = focus.next(),
        KeyCode::BackTab | KeyCode::Up => app.form.focus = focus.prev(),
        KeyCode::Enter => match app.store.save_user() {
            Ok(outcome) => {
                app.form.error = None;
                app.status = Some(describe_save(&outcome));
                if let SaveOutcome::Created(id) = outcome {
                    if let Some(idx) = app.store.users().iter().position(|u| u.id == id) {
                        app.selected_user_index = idx;
                    }
                }
            }
            Err(err) => {
                debug!(error = %err, "save rejected");
                app.form.error = Some(err.to_string());
            }
        },
        KeyCode::Backspace => {
            app.store.edit_draft(|d| {
                d.field_mut(focus).pop();
            });
        }
        KeyCode::Char(c) if key.modifiers == KeyModifiers::NONE || key.modifiers == KeyModifiers::SHIFT => {
            app.form.error = None;
            app.store.edit_draft(|d| d.field_mut(focus).push(c));
        }
        _ => {}
    }
}

fn handle_modal_key(app: &mut AppState, code: KeyCode) {
    match app.modal.clone() {
        Some(ModalState::DeleteConfirm { id, name, selected }) => match code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::Char('h') | KeyCode::Char('l') => {
                app.modal = Some(ModalState::DeleteConfirm { id, name, selected: 1 - selected.min(1) });
            }
            KeyCode::Char('y') => finish_delete(app, id, Confirmation::Accepted),
            KeyCode::Char('n') | KeyCode::Esc => finish_delete(app, id, Confirmation::Declined),
            KeyCode::Enter => {
                let answer = if selected == 0 { Confirmation::Accepted } else { Confirmation::Declined };
                finish_delete(app, id, answer);
            }
            _ => {}
        },
        Some(ModalState::Info { .. }) | Some(ModalState::Help) => match code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('?') => app.modal = None,
            _ => {}
        },
        None => {}
    }
}

fn finish_delete(app: &mut AppState, id: UserId, answer: Confirmation) {
    app.modal = None;
    app.status = Some(match app.store.delete_user(id, answer) {
        DeleteOutcome::Removed(user) => format!("deleted user {} ({})", user.id, user.name),
        DeleteOutcome::NotFound => format!("user {id} no longer exists"),
        DeleteOutcome::Declined => "delete cancelled".to_string(),
    });
}

fn describe_save(outcome: &SaveOutcome) -> String {
    match outcome {
        SaveOutcome::Created(id) => format!("created user {id}"),
        SaveOutcome::Updated(id) => format!("updated user {id}"),
        SaveOutcome::StaleTarget(id) => format!("user {id} no longer exists; nothing saved"),
        SaveOutcome::Inactive => "nothing to save".to_string(),
        SaveOutcome::Loading => "users are still loading; try again once they arrive".to_string(),
    }
}
