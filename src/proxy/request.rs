//! Inbound proxy request parameters.

use crate::proxy::error::ProxyError;

/// Listing size used when the caller does not specify one.
pub const DEFAULT_LIMIT: u32 = 25;

const MAX_SUBREDDIT_LEN: usize = 64;

/// Parameters of a "top posts" listing request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRequest {
    subreddit: String,
    limit: u32,
    after: Option<String>,
}

impl ProxyRequest {
    /// Validate and normalize request parameters.
    ///
    /// An empty `after` cursor is treated exactly like an absent one.
    pub fn new(
        subreddit: impl Into<String>,
        limit: Option<u32>,
        after: Option<String>,
    ) -> Result<Self, ProxyError> {
        let subreddit = subreddit.into();
        if subreddit.is_empty() || subreddit.len() > MAX_SUBREDDIT_LEN {
            return Err(ProxyError::InvalidRequest(format!(
                "subreddit must be 1 to {} characters",
                MAX_SUBREDDIT_LEN
            )));
        }
        // `+` joins subreddits into a multireddit.
        if !subreddit.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '+') {
            return Err(ProxyError::InvalidRequest(format!(
                "invalid subreddit name '{}'",
                subreddit
            )));
        }

        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        if limit == 0 {
            return Err(ProxyError::InvalidRequest("limit must be greater than 0".into()));
        }

        Ok(Self {
            subreddit,
            limit,
            after: after.filter(|a| !a.is_empty()),
        })
    }

    pub fn subreddit(&self) -> &str {
        &self.subreddit
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn after(&self) -> Option<&str> {
        self.after.as_deref()
    }
}
