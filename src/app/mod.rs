//! Application state types and entry glue.
//!
//! [`AppState`] wraps the [`UserStore`] with what only the terminal view
//! needs: selection, overlays, theme, keymap, and the pending load.
//! The event loop itself lives in [`update`] (re-exported as `run`).
//!
pub mod keymap;
pub mod update;

use std::cell::Cell;
use std::rc::Rc;

use ratatui::style::Color;

use crate::model::{DraftField, User, UserId};
use crate::remote::PendingLoad;
use crate::store::{StoreChange, UserStore};

pub use keymap::{KeyAction, Keymap};

/// Current input mode for key handling, derived from store and overlay state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Form,
    Modal,
}

/// Color palette for theming the TUI.
#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub text: Color,
    pub muted: Color,
    pub title: Color,
    pub border: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub error: Color,
}

impl Theme {
    /// Plain terminal colors.
    pub fn dark() -> Self {
        Self {
            text: Color::Gray,
            muted: Color::DarkGray,
            title: Color::Cyan,
            border: Color::Gray,
            header_bg: Color::Black,
            header_fg: Color::Cyan,
            status_bg: Color::DarkGray,
            status_fg: Color::Black,
            highlight_fg: Color::Yellow,
            highlight_bg: Color::Reset,
            error: Color::Red,
        }
    }

    /// Catppuccin Mocha palette.
    pub fn mocha() -> Self {
        Self {
            text: Color::Rgb(0xcd, 0xd6, 0xf4),         // text
            muted: Color::Rgb(0x7f, 0x84, 0x9c),        // overlay1
            title: Color::Rgb(0xcb, 0xa6, 0xf7),        // mauve
            border: Color::Rgb(0x58, 0x5b, 0x70),       // surface2
            header_bg: Color::Rgb(0x31, 0x32, 0x44),    // surface0
            header_fg: Color::Rgb(0xb4, 0xbe, 0xfe),    // lavender
            status_bg: Color::Rgb(0x45, 0x47, 0x5a),    // surface1
            status_fg: Color::Rgb(0xcd, 0xd6, 0xf4),    // text
            highlight_fg: Color::Rgb(0xf9, 0xe2, 0xaf), // yellow
            highlight_bg: Color::Rgb(0x45, 0x47, 0x5a), // surface1
            error: Color::Rgb(0xf3, 0x8b, 0xa8),        // red
        }
    }

    /// Read a `key = color` file on top of `mocha`. Unknown keys and
    /// unparseable colors are skipped.
    pub fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let mut theme = Self::mocha();
        for raw_line in contents.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else { continue };
            let Some(color) = Self::parse_color(val) else { continue };
            if let Some(slot) = theme.slot_mut(key.trim()) {
                *slot = color;
            }
        }
        Some(theme)
    }

    fn slot_mut(&mut self, key: &str) -> Option<&mut Color> {
        let slot = match key {
            "text" => &mut self.text,
            "muted" => &mut self.muted,
            "title" => &mut self.title,
            "border" => &mut self.border,
            "header_bg" => &mut self.header_bg,
            "header_fg" => &mut self.header_fg,
            "status_bg" => &mut self.status_bg,
            "status_fg" => &mut self.status_fg,
            "highlight_fg" => &mut self.highlight_fg,
            "highlight_bg" => &mut self.highlight_bg,
            "error" => &mut self.error,
            _ => return None,
        };
        Some(slot)
    }

    fn entries(&self) -> [(&'static str, Color); 11] {
        [
            ("text", self.text),
            ("muted", self.muted),
            ("title", self.title),
            ("border", self.border),
            ("header_bg", self.header_bg),
            ("header_fg", self.header_fg),
            ("status_bg", self.status_bg),
            ("status_fg", self.status_fg),
            ("highlight_fg", self.highlight_fg),
            ("highlight_bg", self.highlight_bg),
            ("error", self.error),
        ]
    }

    /// "#RRGGBB", "RRGGBB", or "reset".
    fn parse_color(s: &str) -> Option<Color> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "reset" {
            return Some(Color::Reset);
        }
        let hex = lower.strip_prefix('#').unwrap_or(&lower);
        if hex.len() != 6 {
            return None;
        }
        let rgb = u32::from_str_radix(hex, 16).ok()?;
        Some(Color::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8))
    }

    fn format_color(c: Color) -> String {
        match c {
            Color::Rgb(r, g, b) => format!("#{r:02X}{g:02X}{b:02X}"),
            Color::Reset => "reset".to_string(),
            Color::Black => "#000000".to_string(),
            Color::Red => "#FF0000".to_string(),
            Color::Green => "#00FF00".to_string(),
            Color::Yellow => "#FFFF00".to_string(),
            Color::Blue => "#0000FF".to_string(),
            Color::Magenta => "#FF00FF".to_string(),
            Color::Cyan => "#00FFFF".to_string(),
            Color::Gray => "#B3B3B3".to_string(),
            Color::DarkGray => "#4D4D4D".to_string(),
            Color::White => "#FFFFFF".to_string(),
            // Light variants and indexed colors have no fixed RGB; fall back.
            _ => "reset".to_string(),
        }
    }

    /// Write the theme as `key = color` lines.
    pub fn write_file(&self, path: &str) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# userboard theme configuration\n");
        buf.push_str("# Colors: hex as #RRGGBB or RRGGBB, or 'reset'\n\n");
        for (key, color) in self.entries() {
            let _ = writeln!(&mut buf, "{key} = {}", Self::format_color(color));
        }
        std::fs::write(path, buf)
    }

    /// Load `path`, else the per-user config copy, else write defaults to `path`.
    pub fn load_or_init(path: &str) -> Self {
        if std::path::Path::new(path).exists() {
            return Self::from_file(path).unwrap_or_else(Self::mocha);
        }
        if let Some(existing) = config_file_read_path("theme.conf") {
            return Self::from_file(&existing).unwrap_or_else(Self::mocha);
        }
        let theme = Self::mocha();
        if let Err(err) = theme.write_file(path) {
            tracing::debug!(path, error = %err, "could not write default theme");
        }
        theme
    }
}

/// Look for `name` under `$XDG_CONFIG_HOME/userboard/` or `~/.config/userboard/`.
pub fn config_file_read_path(name: &str) -> Option<String> {
    let mut dirs = Vec::new();
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        dirs.push(std::path::PathBuf::from(xdg));
    }
    if let Some(home) = std::env::var_os("HOME") {
        dirs.push(std::path::PathBuf::from(home).join(".config"));
    }
    dirs.into_iter()
        .map(|d| d.join("userboard").join(name))
        .find(|p| p.is_file())
        .map(|p| p.to_string_lossy().into_owned())
}

/// Overlays drawn above the table that are not the store's form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModalState {
    /// Yes/No before deleting; `selected` 0 = Yes, 1 = No.
    DeleteConfirm {
        id: UserId,
        name: String,
        selected: usize,
    },
    Info {
        message: String,
    },
    Help,
}

/// View-only state of the create/edit form. The field values live in the
/// store's draft.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormState {
    pub focus: DraftField,
    pub error: Option<String>,
}

impl Default for FormState {
    fn default() -> Self {
        Self { focus: DraftField::Name, error: None }
    }
}

pub struct AppState {
    pub store: UserStore,
    pub pending: Option<PendingLoad>,
    pub selected_user_index: usize,
    pub rows_per_page: usize,
    pub theme: Theme,
    pub keymap: Keymap,
    pub modal: Option<ModalState>,
    pub form: FormState,
    pub status: Option<String>,
    pub should_quit: bool,
    users_changed: Rc<Cell<bool>>,
}

impl AppState {
    /// Wrap a store (usually still loading) and the handle of its load.
    pub fn new(mut store: UserStore, pending: Option<PendingLoad>, theme: Theme, keymap: Keymap) -> Self {
        let users_changed = Rc::new(Cell::new(false));
        let flag = Rc::clone(&users_changed);
        store.watch(move |change| {
            if *change == StoreChange::Users {
                flag.set(true);
            }
        });
        Self {
            store,
            pending,
            selected_user_index: 0,
            rows_per_page: 10,
            theme,
            keymap,
            modal: None,
            form: FormState::default(),
            status: None,
            should_quit: false,
            users_changed,
        }
    }

    pub fn input_mode(&self) -> InputMode {
        if self.store.modal_visible() {
            InputMode::Form
        } else if self.modal.is_some() {
            InputMode::Modal
        } else {
            InputMode::Normal
        }
    }

    pub fn selected_user(&self) -> Option<&User> {
        self.store.users().get(self.selected_user_index)
    }

    /// Deliver a finished load to the store and keep the selection in range.
    /// Called once per loop iteration.
    pub fn tick(&mut self) {
        if let Some(pending) = self.pending.as_mut() {
            if let Some(outcome) = pending.poll() {
                self.store.finish_load(outcome);
                self.pending = None;
                if let Some(err) = self.store.error() {
                    self.status = Some(format!("load failed: {err}"));
                    self.modal = Some(ModalState::Info {
                        message: format!("Could not load users.\n\n{err}"),
                    });
                }
            }
        }
        if self.users_changed.replace(false) {
            self.clamp_selection();
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.store.users().len();
        if self.selected_user_index >= len {
            self.selected_user_index = len.saturating_sub(1);
        }
    }
}

/// Re-export the application event loop entry function.
pub use update::run_app as run;
