//! Tunables for query expansion and result collection.
//!
//! A [`SearchConfig`] is built once and injected into collectors and
//! searcher constructors. Nothing in the crate reads process-wide mutable
//! state.

use serde::{Deserialize, Serialize};

use crate::error::{HalberdError, Result};

/// Default cap on the result window used to size preallocations.
pub const DEFAULT_PREALLOC_SIZE_SKIP_CAP: usize = 1000;

/// Default number of pulls between two cancellation checks.
pub const DEFAULT_CHECK_DONE_EVERY: u64 = 1024;

/// Default bits per level for numeric range decomposition.
pub const DEFAULT_NUMERIC_PRECISION_STEP: u32 = 4;

/// Configuration shared by searchers and collectors.
///
/// # Example
///
/// ```
/// use halberd::config::SearchConfig;
///
/// let config = SearchConfig::builder()
///     .max_clause_count(1024)
///     .check_done_every(256)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_clause_count, Some(1024));
/// assert_eq!(config.prealloc_size_skip_cap, 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Cap on `size + skip` when preallocating the result heap and the
    /// document match pool. Larger windows still work; they just grow on
    /// demand.
    pub prealloc_size_skip_cap: usize,

    /// The collector checks for cancellation before every pull whose index
    /// is a multiple of this value.
    pub check_done_every: u64,

    /// Upper bound on the number of clauses a pattern or range expansion may
    /// produce. `None` means unlimited.
    pub max_clause_count: Option<usize>,

    /// Bits per precision level for numeric range decomposition, used when a
    /// range does not carry its own step.
    pub numeric_precision_step: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            prealloc_size_skip_cap: DEFAULT_PREALLOC_SIZE_SKIP_CAP,
            check_done_every: DEFAULT_CHECK_DONE_EVERY,
            max_clause_count: None,
            numeric_precision_step: DEFAULT_NUMERIC_PRECISION_STEP,
        }
    }
}

impl SearchConfig {
    /// Create a new builder for SearchConfig.
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::new()
    }

    /// Load a configuration from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SearchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        if self.check_done_every == 0 {
            return Err(HalberdError::invalid_config(
                "check_done_every must be greater than zero",
            ));
        }
        validate_precision_step(self.numeric_precision_step)?;
        Ok(())
    }

    /// Whether `count` clauses would exceed the configured maximum.
    pub fn too_many_clauses(&self, count: usize) -> bool {
        matches!(self.max_clause_count, Some(max) if count > max)
    }

    /// Fail with [`HalberdError::TooManyClauses`] if `count` is over the limit.
    pub fn check_clause_count(&self, count: usize) -> Result<()> {
        match self.max_clause_count {
            Some(max) if count > max => Err(HalberdError::too_many_clauses(count, max)),
            _ => Ok(()),
        }
    }

    /// Backing size for a `size`/`skip` window: `min(size + skip, cap) + 1`.
    pub fn backing_size(&self, size: usize, skip: usize) -> usize {
        size.saturating_add(skip).min(self.prealloc_size_skip_cap) + 1
    }
}

/// Precision steps must split 64 bits into at least two levels.
pub(crate) fn validate_precision_step(step: u32) -> Result<()> {
    if step == 0 || step >= 64 {
        return Err(HalberdError::invalid_config(format!(
            "numeric precision step must be in 1..64, got {step}"
        )));
    }
    Ok(())
}

/// Builder for SearchConfig.
#[derive(Debug, Default)]
pub struct SearchConfigBuilder {
    prealloc_size_skip_cap: Option<usize>,
    check_done_every: Option<u64>,
    max_clause_count: Option<usize>,
    numeric_precision_step: Option<u32>,
}

impl SearchConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the preallocation cap for `size + skip`.
    /// Default: 1000
    pub fn prealloc_size_skip_cap(mut self, cap: usize) -> Self {
        self.prealloc_size_skip_cap = Some(cap);
        self
    }

    /// Set the cancellation check interval, in pulls.
    /// Default: 1024
    pub fn check_done_every(mut self, every: u64) -> Self {
        self.check_done_every = Some(every);
        self
    }

    /// Limit the number of clauses an expansion may produce.
    /// Default: unlimited
    pub fn max_clause_count(mut self, max: usize) -> Self {
        self.max_clause_count = Some(max);
        self
    }

    /// Set the default numeric precision step.
    /// Default: 4
    pub fn numeric_precision_step(mut self, step: u32) -> Self {
        self.numeric_precision_step = Some(step);
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<SearchConfig> {
        let mut config = SearchConfig::default();

        if let Some(cap) = self.prealloc_size_skip_cap {
            config.prealloc_size_skip_cap = cap;
        }
        if let Some(every) = self.check_done_every {
            config.check_done_every = every;
        }
        if self.max_clause_count.is_some() {
            config.max_clause_count = self.max_clause_count;
        }
        if let Some(step) = self.numeric_precision_step {
            config.numeric_precision_step = step;
        }

        config.validate()?;
        Ok(config)
    }
}
