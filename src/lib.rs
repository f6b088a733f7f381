//! Library crate for userboard.
//!
//! This crate exposes the building blocks of the TUI:
//! - The user store and its operations (`store`)
//! - Publish-on-change cells the store is built from (`observe`)
//! - User records and the form draft (`model`)
//! - The remote collection and background loader (`remote`)
//! - Error and result types (`error`)
//! - Command-line options and logging setup (`cli`)
//! - Application state and update loop (`app`)
//! - UI rendering and widgets (`ui`)
//!
//! It is used by the `userboard` binary and by tests.
#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod app;
pub mod cli;
pub mod error;
pub mod model;
pub mod observe;
pub mod remote;
pub mod store;
pub mod ui;

// Re-export commonly used items at the crate root for convenience
/// Convenient error and result types shared across the crate.
pub use error::{DynError, LoadError, Result, ValidationError};
pub use model::{Draft, DraftField, User, UserId};
pub use store::{Confirm, Confirmation, DeleteOutcome, ModalMode, SaveOutcome, StoreChange, UserStore};
