//! Scene comparator capability
//!
//! The pipeline treats visual comparison as an injected capability: given
//! two assets and a rule, return zero or more findings. Implementations
//! must be side-effect-free from the pipeline's perspective and must
//! return findings referencing only the two supplied assets. Rule kinds a
//! comparator does not understand yield an empty result, never an error,
//! so the rule taxonomy stays open without pipeline changes.

pub mod mock;
pub mod vision;

use async_trait::async_trait;
use reelcheck_common::models::{Asset, Finding, Rule};
use thiserror::Error;

pub use mock::MockComparator;
pub use vision::VisionComparator;

/// Comparator failure split
#[derive(Debug, Error)]
pub enum CompareError {
    /// Transient failure: the tuple degrades to zero findings unless the
    /// rule is marked required
    #[error("Comparator unavailable: {0}")]
    Unavailable(String),

    /// Unrecoverable failure: aborts the whole job
    #[error("Comparator failure: {0}")]
    Fatal(String),
}

/// Capability interface for pairwise scene comparison
#[async_trait]
pub trait SceneComparator: Send + Sync {
    async fn compare(
        &self,
        asset_a: &Asset,
        asset_b: &Asset,
        rule: &Rule,
    ) -> Result<Vec<Finding>, CompareError>;
}
