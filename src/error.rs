//! Error and result types.
//!
//! Domain errors ([`LoadError`], [`ValidationError`]) are typed; application
//! glue (terminal, config, log file) uses the boxed [`DynError`] with
//! [`Context`] to attach what was being attempted.
//!
use std::fmt::{Display, Formatter};

use crate::model::UserId;

pub type DynError = Box<dyn std::error::Error + Send + Sync + 'static>;
pub type Result<T> = std::result::Result<T, DynError>;

/// Why loading the remote user collection failed.
///
/// The store never propagates these; it stores their `Display` text in its
/// `error` cell.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("HTTP error: {status}")]
    Network { status: u16 },

    #[error("response was not a list of users")]
    Malformed,

    #[error("request failed: {0}")]
    Transport(String),

    #[error("could not decode users: {0}")]
    Decode(String),
}

/// Why a draft could not be saved. Blocks that save attempt only.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("please enter an email address")]
    MissingEmail,

    #[error("please enter a valid email address (got '{0}')")]
    InvalidEmail(String),

    #[error("no user id left after {0}")]
    IdExhausted(UserId),
}

pub trait Context<T> {
    fn with_ctx<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

#[derive(Debug)]
pub struct WithContextError {
    pub context: String,
    pub source: DynError,
}

impl Display for WithContextError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.context, self.source)
    }
}

impl std::error::Error for WithContextError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.source)
    }
}

impl<T, E> Context<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_ctx<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            Box::new(WithContextError {
                context: f(),
                source: e.into(),
            }) as DynError
        })
    }
}

#[derive(Debug)]
pub struct SimpleError(pub String);

impl SimpleError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl std::fmt::Display for SimpleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for SimpleError {}

pub fn simple_error(msg: impl Into<String>) -> DynError {
    Box::new(SimpleError::new(msg))
}
