//! Shared types for the ReelCheck continuity-review backend.
//!
//! Holds the domain model (projects, assets, rules, analysis jobs and
//! findings), the common error taxonomy, and configuration loading. The
//! HTTP service crate (`reelcheck-server`) builds on top of these.

pub mod config;
pub mod error;
pub mod models;

pub use error::{Error, Result};
