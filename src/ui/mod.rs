pub mod components;
pub mod users;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{AppState, ModalState};

pub fn render(f: &mut Frame, app: &mut AppState) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)].as_ref())
        .split(f.area());
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)].as_ref())
        .split(root[1]);

    let state = if app.store.is_loading() {
        "loading"
    } else if app.store.error().is_some() {
        "load failed"
    } else {
        "ready"
    };
    let p = Paragraph::new(format!(
        "users:{}  [{state}]  n: new; Enter/e: edit; d/Del: delete; ?: help; q: quit",
        app.store.users().len()
    ))
    .block(
        Block::default()
            .title("userboard")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    )
    .style(Style::default().fg(app.theme.header_fg).bg(app.theme.header_bg));
    f.render_widget(p, root[0]);

    users::render_users_table(f, body[0], app);
    users::render_user_details(f, body[1], app);
    components::render_status_bar(f, root[2], app);

    let area = f.area();
    if app.store.modal_visible() {
        users::render_user_form(f, area, app);
    } else if app.modal.is_some() {
        render_modal(f, area, app);
    }
}

fn render_modal(f: &mut Frame, area: Rect, app: &AppState) {
    match &app.modal {
        Some(state @ ModalState::DeleteConfirm { .. }) => users::render_delete_confirm(f, area, app, state),
        Some(state @ ModalState::Info { .. }) => components::render_info_modal(f, area, app, state),
        Some(ModalState::Help) => components::render_help_modal(f, area, app),
        None => {}
    }
}
