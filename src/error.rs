//! Error types for plan fetching and rendering

use thiserror::Error;

use crate::domain::{PlanId, PlanKind};

/// Boxed cause carried by decode and fetch failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure to produce a rendered plan
///
/// Rendering never yields a partial bitmap: any of these means no output.
#[derive(Error, Debug)]
pub enum PlanError {
    /// The bytes could not be decoded as the declared kind
    #[error("could not decode {kind} plan: {source}")]
    Decode {
        kind: PlanKind,
        #[source]
        source: BoxError,
    },

    /// The plan's bytes could not be retrieved
    #[error("could not fetch plan {id}: {source}")]
    Fetch {
        id: PlanId,
        #[source]
        source: BoxError,
    },

    /// The blocking decode task did not run to completion
    #[error("render task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl PlanError {
    pub fn decode(kind: PlanKind, source: impl Into<BoxError>) -> Self {
        Self::Decode {
            kind,
            source: source.into(),
        }
    }

    pub fn fetch(id: PlanId, source: impl Into<BoxError>) -> Self {
        Self::Fetch {
            id,
            source: source.into(),
        }
    }

    /// Check if this is a decode failure
    pub fn is_decode(&self) -> bool {
        matches!(self, PlanError::Decode { .. })
    }

    /// Check if this is a fetch failure
    pub fn is_fetch(&self) -> bool {
        matches!(self, PlanError::Fetch { .. })
    }
}
