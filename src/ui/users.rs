use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};

use crate::app::{AppState, ModalState};
use crate::model::DraftField;

pub fn render_users_table(f: &mut Frame, area: Rect, app: &mut AppState) {
    let block = Block::default()
        .title("Users")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border));

    if app.store.is_loading() || (app.store.users().is_empty() && app.store.error().is_some()) {
        let (msg, color) = match app.store.error() {
            Some(err) if !app.store.is_loading() => (format!("Failed to load users: {err}"), app.theme.error),
            _ => ("Loading users...".to_string(), app.theme.muted),
        };
        let p = Paragraph::new(msg)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(color))
            .block(block);
        f.render_widget(p, area);
        return;
    }

    let body_height = area.height.saturating_sub(3) as usize;
    if body_height > 0 {
        app.rows_per_page = body_height;
    }

    let users = app.store.users();
    let rpp = app.rows_per_page.max(1);
    let start = (app.selected_user_index / rpp) * rpp;
    let end = (start + rpp).min(users.len());
    let slice = users.get(start..end).unwrap_or(&[]);

    let rows = slice.iter().enumerate().map(|(i, u)| {
        let style = if start + i == app.selected_user_index {
            Style::default()
                .fg(app.theme.highlight_fg)
                .bg(app.theme.highlight_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text)
        };
        Row::new(vec![
            Cell::from(u.id.to_string()),
            Cell::from(u.name.clone()),
            Cell::from(u.username.clone()),
            Cell::from(u.email.clone()),
            Cell::from(u.phone.clone()),
        ])
        .style(style)
    });

    let widths = [
        Constraint::Length(5),
        Constraint::Percentage(25),
        Constraint::Percentage(18),
        Constraint::Percentage(32),
        Constraint::Percentage(25),
    ];
    let header = Row::new(vec!["ID", "NAME", "USERNAME", "EMAIL", "PHONE"])
        .style(Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD));

    let table = Table::new(rows, widths).header(header).block(block).column_spacing(1);
    f.render_widget(table, area);
}

pub fn render_user_details(f: &mut Frame, area: Rect, app: &AppState) {
    let text = match app.selected_user() {
        Some(u) => format!(
            "ID: {}\nName: {}\nUsername: {}\nEmail: {}\nPhone: {}",
            u.id, u.name, u.username, u.email, u.phone
        ),
        None => String::new(),
    };
    let p = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(app.theme.text))
        .block(
            Block::default()
                .title("Details")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
    f.render_widget(p, area);
}

/// The create/edit form, drawn from the store's draft.
pub fn render_user_form(f: &mut Frame, area: Rect, app: &AppState) {
    let rect = crate::ui::components::centered_rect(64, 12, area);
    let draft = app.store.draft();

    let mut lines: Vec<Line> = Vec::with_capacity(DraftField::ALL.len() + 4);
    for field in DraftField::ALL {
        let focused = field == app.form.focus;
        let marker = if focused { "▶" } else { " " };
        let cursor = if focused { "_" } else { "" };
        let value_style = if focused {
            Style::default().fg(app.theme.highlight_fg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text)
        };
        lines.push(Line::from(vec![
            Span::raw(format!("{marker} {:<9} ", format!("{}:", field.label()))),
            Span::styled(format!("{}{cursor}", draft.field(field)), value_style),
        ]));
    }
    lines.push(Line::raw(""));
    match &app.form.error {
        Some(err) => lines.push(Line::from(Span::styled(err.clone(), Style::default().fg(app.theme.error)))),
        None => lines.push(Line::raw("")),
    }
    lines.push(Line::from(Span::styled(
        "Enter: save   Esc: cancel   Tab/Up/Down: field",
        Style::default().fg(app.theme.muted).add_modifier(Modifier::ITALIC),
    )));

    let p = Paragraph::new(lines).block(
        Block::default()
            .title(app.store.modal_title())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

pub fn render_delete_confirm(f: &mut Frame, area: Rect, app: &AppState, state: &ModalState) {
    if let ModalState::DeleteConfirm { id, name, selected } = state {
        let rect = crate::ui::components::centered_rect(52, 7, area);
        let yes = if *selected == 0 { "[Yes]" } else { " Yes " };
        let no = if *selected == 1 { "[No]" } else { " No " };
        let body = format!(
            "{}\n{name} (id {id})\n\n  {yes}    {no}",
            crate::store::DELETE_PROMPT
        );
        let p = Paragraph::new(body).wrap(Wrap { trim: false }).block(
            Block::default()
                .title("Confirm delete")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
        f.render_widget(Clear, rect);
        f.render_widget(p, rect);
    }
}
