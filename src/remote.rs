//! Remote user collection: the one outbound GET and its background runner.
//!
//! Writes are never sent back; create/edit/delete only touch the store.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use reqwest::header::ACCEPT;
use tracing::{debug, info, warn};

use crate::error::LoadError;
use crate::model::User;

pub const DEFAULT_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/users";

/// Anything that can produce the initial list of users.
pub trait UserSource {
    fn fetch_users(&self) -> Result<Vec<User>, LoadError>;
}

/// Blocking HTTP source for a JSON collection endpoint.
#[derive(Clone, Debug)]
pub struct HttpUserSource {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpUserSource {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, LoadError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("userboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LoadError::Transport(e.to_string()))?;
        Ok(Self { client, endpoint: endpoint.into() })
    }

    /// Use a preconfigured client (proxy, TLS, or timeout settings).
    pub fn with_client(client: reqwest::blocking::Client, endpoint: impl Into<String>) -> Self {
        Self { client, endpoint: endpoint.into() }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl UserSource for HttpUserSource {
    fn fetch_users(&self) -> Result<Vec<User>, LoadError> {
        debug!(endpoint = %self.endpoint, "fetching users");
        let response = self
            .client
            .get(&self.endpoint)
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|e| LoadError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Network { status: status.as_u16() });
        }
        let body = response
            .text()
            .map_err(|e| LoadError::Transport(e.to_string()))?;
        let users = parse_users(&body)?;
        info!(count = users.len(), "users fetched");
        Ok(users)
    }
}

/// Parse a response body into users.
///
/// Anything that is not a JSON array is `Malformed`; an array whose
/// elements are not user records is a `Decode` failure.
pub fn parse_users(body: &str) -> Result<Vec<User>, LoadError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| LoadError::Decode(e.to_string()))?;
    if !value.is_array() {
        return Err(LoadError::Malformed);
    }
    serde_json::from_value(value).map_err(|e| LoadError::Decode(e.to_string()))
}

/// A fetch running on a background thread.
///
/// The thread sends exactly one outcome; `poll` hands it out once.
#[derive(Debug)]
pub struct PendingLoad {
    rx: Receiver<Result<Vec<User>, LoadError>>,
    done: bool,
}

impl PendingLoad {
    pub fn spawn<S>(source: S) -> Self
    where
        S: UserSource + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let outcome = source.fetch_users();
            // Receiver gone means the view already exited.
            let _ = tx.send(outcome);
        });
        Self { rx, done: false }
    }

    /// Non-blocking check for the outcome. Returns `Some` exactly once.
    pub fn poll(&mut self) -> Option<Result<Vec<User>, LoadError>> {
        if self.done {
            return None;
        }
        match self.rx.try_recv() {
            Ok(outcome) => {
                self.done = true;
                Some(outcome)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                warn!("loader thread exited without reporting");
                self.done = true;
                Some(Err(LoadError::Transport("loader thread exited".to_string())))
            }
        }
    }

    /// Block until the outcome arrives.
    pub fn wait(mut self) -> Result<Vec<User>, LoadError> {
        if self.done {
            return Err(LoadError::Transport("outcome already taken".to_string()));
        }
        self.done = true;
        self.rx
            .recv()
            .unwrap_or_else(|_| Err(LoadError::Transport("loader thread exited".to_string())))
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}
