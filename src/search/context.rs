//! Per-collection state handed to searchers and collectors.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::error::{HalberdError, Result};
use crate::search::pool::DocumentMatchPool;

/// State shared by every searcher of one collection.
#[derive(Debug)]
pub struct SearchContext {
    pub pool: DocumentMatchPool,
}

impl SearchContext {
    pub fn new(pool: DocumentMatchPool) -> Self {
        SearchContext { pool }
    }
}

/// Cancellation signal for a collection: an optional deadline plus a token
/// that can be cancelled from another thread.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use halberd::search::CollectContext;
///
/// let ctx = CollectContext::new().with_timeout(Duration::from_secs(5));
/// assert!(ctx.check().is_ok());
///
/// ctx.token().cancel();
/// assert!(ctx.check().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct CollectContext {
    deadline: Option<Instant>,
    token: CancellationToken,
}

impl Default for CollectContext {
    fn default() -> Self {
        CollectContext {
            deadline: None,
            token: CancellationToken::new(),
        }
    }
}

impl CollectContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop collecting once `timeout` has elapsed from now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Instant::now().checked_add(timeout);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Use an externally owned token.
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fail if the token was cancelled or the deadline has passed.
    pub fn check(&self) -> Result<()> {
        if self.token.is_cancelled() {
            return Err(HalberdError::cancelled("collection cancelled"));
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(HalberdError::DeadlineExceeded);
            }
        }
        Ok(())
    }
}
