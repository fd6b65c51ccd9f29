//! In-memory credential store keyed by opaque session ids.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use uuid::Uuid;

use crate::auth::credential::CredentialState;

/// How long an issued OAuth state value stays redeemable.
pub const STATE_TTL: Duration = Duration::from_secs(600);

/// Upper bound on outstanding OAuth state values.
pub const MAX_PENDING_STATES: usize = 10_000;

/// Thread-safe map of session id → credential, plus pending OAuth states.
#[derive(Clone)]
pub struct CredentialStore {
    sessions: Arc<DashMap<String, CredentialState>>,
    pending_states: Arc<DashMap<String, Instant>>,
    max_pending_states: usize,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::with_state_limit(MAX_PENDING_STATES)
    }
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state_limit(max_pending_states: usize) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            pending_states: Arc::new(DashMap::new()),
            max_pending_states,
        }
    }

    /// Store a credential under a new session id.
    pub fn insert(&self, credential: CredentialState) -> String {
        let session_id = Uuid::new_v4().to_string();
        self.sessions.insert(session_id.clone(), credential);
        session_id
    }

    pub fn get(&self, session_id: &str) -> Option<CredentialState> {
        self.sessions.get(session_id).map(|r| r.value().clone())
    }

    /// Replace the credential of an existing session. Returns false if unknown.
    pub fn update(&self, session_id: &str, credential: CredentialState) -> bool {
        match self.sessions.get_mut(session_id) {
            Some(mut entry) => {
                *entry = credential;
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, session_id: &str) -> Option<CredentialState> {
        self.sessions.remove(session_id).map(|(_, v)| v)
    }

    pub fn count(&self) -> usize {
        self.sessions.len()
    }

    /// Issue a single-use OAuth state value.
    ///
    /// Expired states are swept only once the limit is reached; `None` means
    /// the store is still full afterwards.
    pub fn issue_state(&self) -> Option<String> {
        if self.pending_states.len() >= self.max_pending_states {
            self.pending_states.retain(|_, issued| issued.elapsed() < STATE_TTL);
            if self.pending_states.len() >= self.max_pending_states {
                return None;
            }
        }
        let state = Uuid::new_v4().simple().to_string();
        self.pending_states.insert(state.clone(), Instant::now());
        Some(state)
    }

    pub fn pending_states(&self) -> usize {
        self.pending_states.len()
    }

    /// Redeem a state value. Succeeds at most once per issued state.
    pub fn consume_state(&self, state: &str) -> bool {
        match self.pending_states.remove(state) {
            Some((_, issued)) => issued.elapsed() < STATE_TTL,
            None => false,
        }
    }
}
