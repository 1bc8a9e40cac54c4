//! Supersession of in-flight trip searches.
//!
//! A rider who changes origin or destination while a plan request is still
//! running must never see the older, slower answer. Each search session
//! therefore allows one outstanding request: starting a new one aborts the
//! previous one, and every result is checked against the latest sequence
//! number before it is handed back.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::future::{AbortHandle, AbortRegistration, Abortable};
use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::otp::OtpError;

/// Errors from a sequenced search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// A newer search in the same session started before this one finished
    #[error("superseded by a newer search")]
    Superseded,

    /// The planner request itself failed
    #[error(transparent)]
    Planner(#[from] OtpError),
}

/// Sequence number captured when a search starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn sequence(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
struct SequencerState {
    latest: u64,
    in_flight: Option<AbortHandle>,
}

/// Orders the searches of one session.
#[derive(Debug, Default)]
pub struct SearchSequencer {
    state: Mutex<SequencerState>,
}

impl SearchSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a search: take the next sequence number and abort whatever
    /// search was still in flight.
    pub fn begin(&self) -> (Ticket, AbortRegistration) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.latest += 1;
        if let Some(previous) = state.in_flight.take() {
            debug!(superseded_by = state.latest, "aborting in-flight search");
            previous.abort();
        }
        let (handle, registration) = AbortHandle::new_pair();
        state.in_flight = Some(handle);
        (Ticket(state.latest), registration)
    }

    /// Whether `ticket` belongs to the most recently started search.
    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.latest() == ticket.0
    }

    /// Sequence number of the most recently started search (0 before any).
    pub fn latest(&self) -> u64 {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .latest
    }

    /// Run `search` as the newest search of this session.
    ///
    /// Returns [`SearchError::Superseded`] if another search began before
    /// this one produced its result.
    pub async fn run<F, T>(&self, search: F) -> Result<T, SearchError>
    where
        F: Future<Output = Result<T, OtpError>>,
    {
        let (ticket, registration) = self.begin();
        let outcome = Abortable::new(search, registration).await;
        self.finish(ticket);

        match outcome {
            Ok(result) if self.is_latest(ticket) => result.map_err(SearchError::from),
            _ => {
                debug!(sequence = ticket.0, "discarding superseded search result");
                Err(SearchError::Superseded)
            }
        }
    }

    /// Drop the abort handle if it still belongs to `ticket`.
    fn finish(&self, ticket: Ticket) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.latest == ticket.0 {
            state.in_flight = None;
        }
    }
}

/// Configuration for per-session sequencers.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// A session forgotten after this long without a search.
    pub idle_timeout: Duration,

    /// Maximum number of sessions tracked at once.
    pub max_sessions: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(10 * 60),
            max_sessions: 10_000,
        }
    }
}

/// One [`SearchSequencer`] per client session.
#[derive(Clone)]
pub struct SessionSearches {
    sessions: MokaCache<String, Arc<SearchSequencer>>,
}

impl SessionSearches {
    pub fn new(config: &SessionConfig) -> Self {
        let sessions = MokaCache::builder()
            .time_to_idle(config.idle_timeout)
            .max_capacity(config.max_sessions)
            .build();
        Self { sessions }
    }

    /// The sequencer for `session`, created on first use.
    pub async fn sequencer(&self, session: &str) -> Arc<SearchSequencer> {
        self.sessions
            .get_with(session.to_string(), async { Arc::new(SearchSequencer::new()) })
            .await
    }
}

impl Default for SessionSearches {
    fn default() -> Self {
        Self::new(&SessionConfig::default())
    }
}
