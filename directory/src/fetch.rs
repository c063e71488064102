use crate::cache::QueryKey;
use std::fmt::Display;
use std::future::Future;

pub const LOADING_MESSAGE: &str = "Loading...";

/// Lifecycle of one request: `Idle -> Loading -> (Success | Error)`.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    Idle,
    Loading,
    Success(T),
    Error(String),
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            FetchState::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Error(message) => Some(message.as_str()),
            _ => None,
        }
    }

    /// Inline status line for pending and failed states.
    pub fn status_line(&self) -> Option<String> {
        match self {
            FetchState::Loading => Some(LOADING_MESSAGE.to_string()),
            FetchState::Error(message) => Some(format!("Error: {message}")),
            FetchState::Idle | FetchState::Success(_) => None,
        }
    }

    /// The settled outcome; `None` while idle or loading.
    pub fn into_result(self) -> Option<Result<T, String>> {
        match self {
            FetchState::Success(data) => Some(Ok(data)),
            FetchState::Error(message) => Some(Err(message)),
            FetchState::Idle | FetchState::Loading => None,
        }
    }
}

/// Proof that a fetch was started; only the latest ticket may resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct FetchTicket {
    generation: u64,
}

/// Holds the state of a keyed query across refetches.
///
/// Starting a fetch for a new key drops whatever the previous key
/// produced, and a response carrying an outdated ticket is discarded.
#[derive(Debug)]
pub struct QueryHandle<T> {
    key: Option<QueryKey>,
    generation: u64,
    state: FetchState<T>,
}

impl<T> Default for QueryHandle<T> {
    fn default() -> Self {
        Self {
            key: None,
            generation: 0,
            state: FetchState::Idle,
        }
    }
}

impl<T> QueryHandle<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&self) -> Option<&QueryKey> {
        self.key.as_ref()
    }

    pub fn state(&self) -> &FetchState<T> {
        &self.state
    }

    pub fn begin(&mut self, key: QueryKey) -> FetchTicket {
        self.key = Some(key);
        self.generation += 1;
        self.state = FetchState::Loading;
        FetchTicket {
            generation: self.generation,
        }
    }

    /// Re-enter `Loading` for the current key. `None` if nothing was fetched yet.
    pub fn refetch(&mut self) -> Option<FetchTicket> {
        let key = self.key.clone()?;
        Some(self.begin(key))
    }

    /// Apply a result. Returns `false` (and changes nothing) for a stale ticket.
    pub fn resolve<E: Display>(&mut self, ticket: FetchTicket, result: Result<T, E>) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        self.state = match result {
            Ok(data) => FetchState::Success(data),
            Err(err) => FetchState::Error(err.to_string()),
        };
        true
    }

    /// Convenience for `begin`, await, `resolve`.
    pub async fn run<E, Fut>(&mut self, key: QueryKey, fetch: Fut) -> &FetchState<T>
    where
        E: Display,
        Fut: Future<Output = Result<T, E>>,
    {
        let ticket = self.begin(key);
        let result = fetch.await;
        self.resolve(ticket, result);
        &self.state
    }

    pub fn into_state(self) -> FetchState<T> {
        self.state
    }

    /// Return to `Idle`, e.g. when the consumer goes away.
    pub fn reset(&mut self) {
        self.key = None;
        self.generation += 1;
        self.state = FetchState::Idle;
    }
}
