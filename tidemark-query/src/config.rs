//! Engine configuration

use serde::{Deserialize, Serialize};

use crate::error::ResolverError;

/// Tunables for a [`crate::QueryEngine`].
///
/// Deserializable from a TOML table; missing keys take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Give up beyond this distance instead of searching the whole globe
    pub max_search_radius_km: Option<f64>,

    /// Fan batches out over the rayon pool
    pub parallel: bool,

    /// Batches smaller than this run on the calling thread
    pub parallel_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_search_radius_km: None,
            parallel: true,
            parallel_threshold: 64,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ResolverError> {
        match self.max_search_radius_km {
            Some(radius) if !(radius.is_finite() && radius > 0.0) => {
                Err(ResolverError::InvalidSearchRadius(radius))
            }
            _ => Ok(()),
        }
    }

    pub(crate) fn runs_in_parallel(&self, batch_len: usize) -> bool {
        self.parallel && batch_len >= self.parallel_threshold.max(1)
    }
}
