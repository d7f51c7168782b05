//! Validation tuning knobs.

use chrono::{DateTime, Utc};

/// Options governing path construction and policy evaluation.
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Maximum number of certificates in a candidate path. Candidate
    /// paths that grow beyond this are discarded, not an error by
    /// themselves.
    pub max_path_depth: usize,

    /// Evaluation time for validity-window checks; `None` means the time
    /// of the call.
    pub evaluation_time: Option<DateTime<Utc>>,

    /// Legacy mode for stores without cross-certification: require exactly
    /// one certificate per subject identity along the path and fail with
    /// `AmbiguousChain` otherwise.
    pub unique_path: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            max_path_depth: 10,
            evaluation_time: None,
            unique_path: false,
        }
    }
}

impl ValidationOptions {
    /// Options with all defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum path depth.
    #[must_use]
    pub const fn with_max_path_depth(mut self, depth: usize) -> Self {
        self.max_path_depth = depth;
        self
    }

    /// Pin the evaluation time (useful for reproducible validation).
    #[must_use]
    pub fn with_evaluation_time(mut self, at: DateTime<Utc>) -> Self {
        self.evaluation_time = Some(at);
        self
    }

    /// Switch to unique-path legacy mode.
    #[must_use]
    pub const fn unique_path_only(mut self) -> Self {
        self.unique_path = true;
        self
    }
}
