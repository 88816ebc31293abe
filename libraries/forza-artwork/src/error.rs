use crate::types::SearchStep;
use thiserror::Error;

/// Outcome of a failed search step
///
/// Never leaves the crate's public resolve path; each variant is logged and
/// the chain moves on to the next step.
#[derive(Error, Debug)]
pub enum ArtworkError {
    #[error("{step} search failed: {source}")]
    Search {
        step: SearchStep,
        #[source]
        source: forza_core::PlayerError,
    },

    #[error("{step} search timed out after {after_ms}ms")]
    Timeout { step: SearchStep, after_ms: u64 },

    #[error("{step} search returned no acceptable candidate")]
    NoMatch { step: SearchStep },
}

impl ArtworkError {
    /// Whether the step failed for lack of a token
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Search { source, .. } if source.is_auth())
    }
}

pub type Result<T> = std::result::Result<T, ArtworkError>;
