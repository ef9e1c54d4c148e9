//! Continuity analysis pipeline
//!
//! Orchestrates candidate selection, comparator dispatch, and issue
//! aggregation over immutable asset/rule snapshots. Collaborators (asset
//! catalog, rule set, job store) are trait objects so the pipeline runs
//! identically against SQLite and the in-memory fakes used in tests.

pub mod aggregator;
pub mod catalog;
pub mod job_store;
pub mod memory;
pub mod pipeline;
pub mod selector;

pub use aggregator::summarize;
pub use catalog::{AssetCatalog, RuleSet, SqliteCatalog, SqliteRuleSet};
pub use job_store::{JobStore, SqliteJobStore};
pub use pipeline::{AnalysisPipeline, PipelineError};
pub use selector::candidate_pairs;
