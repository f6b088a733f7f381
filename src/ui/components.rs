//! Shared UI components (status bar, modal helpers).
//!
use std::collections::{BTreeMap, BTreeSet};

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::keymap::{KeyAction, Keymap};
use crate::app::{AppState, InputMode, ModalState};

/// Render the bottom status bar with mode, counts, and the last message.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let mode = match app.input_mode() {
        InputMode::Normal => "NORMAL",
        InputMode::Form => "FORM",
        InputMode::Modal => "MODAL",
    };
    let mut msg = format!("mode: {mode}  users:{}  rows/page:{}", app.store.users().len(), app.rows_per_page);
    if let Some(err) = app.store.error() {
        msg.push_str(&format!("  error: {err}"));
    }
    if let Some(status) = &app.status {
        msg.push_str(&format!("  | {status}"));
    }
    let p = Paragraph::new(msg).style(Style::default().fg(app.theme.status_fg).bg(app.theme.status_bg));
    f.render_widget(p, area);
}

/// Compute a rectangle centered within `area` with a maximum size.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render a generic informational modal dialog.
pub fn render_info_modal(f: &mut Frame, area: Rect, app: &AppState, state: &ModalState) {
    if let ModalState::Info { message } = state {
        let width = 50u16.min(area.width.saturating_sub(4)).max(30);
        let approx_lines = (message.len() as u16 / width.saturating_sub(4).max(10)).max(1)
            + message.matches('\n').count() as u16;
        let height = (approx_lines + 4).min(area.height.saturating_sub(4)).max(5);
        let rect = centered_rect(width, height, area);
        let p = Paragraph::new(message.clone()).wrap(Wrap { trim: false }).block(
            Block::default()
                .title("Info")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
        f.render_widget(Clear, rect);
        f.render_widget(p, rect);
    }
}

fn action_label(action: KeyAction) -> Option<&'static str> {
    let label = match action {
        KeyAction::Quit => "Quit",
        KeyAction::OpenHelp => "Help",
        KeyAction::NewUser => "New user",
        KeyAction::EditSelection => "Edit user",
        KeyAction::DeleteSelection => "Delete user",
        KeyAction::MoveUp => "Move up",
        KeyAction::MoveDown => "Move down",
        KeyAction::PageUp | KeyAction::MoveLeftPage => "Page up",
        KeyAction::PageDown | KeyAction::MoveRightPage => "Page down",
        KeyAction::Ignore => return None,
    };
    Some(label)
}

/// Render the help modal: current table bindings plus the fixed form keys.
pub fn render_help_modal(f: &mut Frame, area: Rect, app: &AppState) {
    let width = 64u16.min(area.width.saturating_sub(4)).max(40);
    let height = 24u16.min(area.height.saturating_sub(2)).max(10);
    let rect = centered_rect(width, height, area);

    let mut grouped: BTreeMap<&'static str, BTreeSet<String>> = BTreeMap::new();
    for ((mods, code), action) in app.keymap.all_bindings() {
        if let Some(label) = action_label(action) {
            grouped.entry(label).or_default().insert(Keymap::format_key(mods, code));
        }
    }

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let italic = Style::default().add_modifier(Modifier::ITALIC);
    let label_w = grouped.keys().map(|k| k.len()).max().unwrap_or(0).max("Next/prev field".len());

    let mut lines: Vec<Line> = vec![Line::from(Span::styled("Users table:", bold))];
    for (label, keys) in &grouped {
        let joined = keys.iter().cloned().collect::<Vec<_>>().join(", ");
        lines.push(Line::from(vec![
            Span::raw(format!("  {label:>label_w$} │ ")),
            Span::styled(joined, italic),
        ]));
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled("User form:", bold)));
    for (label, keys) in [
        ("Save", "Enter"),
        ("Cancel", "Esc"),
        ("Next/prev field", "Tab, Down / BackTab, Up"),
        ("Erase", "Backspace"),
    ] {
        lines.push(Line::from(vec![
            Span::raw(format!("  {label:>label_w$} │ ")),
            Span::styled(keys, italic),
        ]));
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled("Delete dialog:", bold)));
    lines.push(Line::from(vec![
        Span::raw(format!("  {:>label_w$} │ ", "Answer")),
        Span::styled("y / n, Left/Right + Enter, Esc = no", italic),
    ]));
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        "Changes stay in memory; nothing is sent to the server.",
        Style::default().fg(app.theme.muted),
    )));

    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title("Help")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
