//! Error types for the Halberd library.
//!
//! Every fallible operation in the crate returns [`Result`], whose error side
//! is the [`HalberdError`] enum. Construction failures of composite searchers,
//! pattern compilation failures, clause overflows, dictionary failures and
//! cancellation all surface through this one type.
//!
//! # Examples
//!
//! ```
//! use halberd::error::{HalberdError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(HalberdError::index("dictionary cursor closed"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Halberd operations.
#[derive(Error, Debug)]
pub enum HalberdError {
    /// I/O errors raised by index reader implementations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failures reported by the index reader, its postings cursors or its
    /// term dictionaries (other than normal end of iteration).
    #[error("Index error: {0}")]
    Index(String),

    /// A regular expression or wildcard pattern did not compile.
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Expanding a query would produce more clauses than allowed.
    #[error("TooManyClauses[{count} > maxClauseCount[{max}]]")]
    TooManyClauses { count: usize, max: usize },

    /// Mapping an internal document id to its external id failed.
    #[error("Failed to resolve external id for internal id {internal_id}: {reason}")]
    IdResolution { internal_id: u64, reason: String },

    /// Collection was cancelled through its cancellation token.
    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    /// Collection ran past its deadline.
    #[error("Deadline exceeded")]
    DeadlineExceeded,

    /// Configuration values are out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Query-level errors (missing field, invalid arguments).
    #[error("Query error: {0}")]
    Query(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Errors bubbled up from reader implementations built on anyhow.
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with HalberdError.
pub type Result<T> = std::result::Result<T, HalberdError>;

impl HalberdError {
    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        HalberdError::Index(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        HalberdError::Query(msg.into())
    }

    /// Create a new invalid pattern error.
    pub fn invalid_pattern<S: Into<String>>(pattern: S, source: regex::Error) -> Self {
        HalberdError::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Create a new clause overflow error.
    pub fn too_many_clauses(count: usize, max: usize) -> Self {
        HalberdError::TooManyClauses { count, max }
    }

    /// Create a new id resolution error.
    pub fn id_resolution<S: Into<String>>(internal_id: u64, reason: S) -> Self {
        HalberdError::IdResolution {
            internal_id,
            reason: reason.into(),
        }
    }

    /// Create a new cancelled error.
    pub fn cancelled<S: Into<String>>(msg: S) -> Self {
        HalberdError::Cancelled(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        HalberdError::InvalidConfig(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        HalberdError::Other(msg.into())
    }

    /// Whether this error means the collection was stopped early rather
    /// than failing.
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            HalberdError::Cancelled(_) | HalberdError::DeadlineExceeded
        )
    }
}
