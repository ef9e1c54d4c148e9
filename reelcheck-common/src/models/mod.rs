//! Domain model for continuity review
//!
//! All types here are plain serde values. Persistence lives in the server
//! crate; nothing in this module touches the database directly.

pub mod asset;
pub mod finding;
pub mod job;
pub mod notification;
pub mod project;
pub mod rule;

pub use asset::{Asset, MediaKind, SceneInfo};
pub use finding::{AnalysisResult, AnalysisSummary, Finding, FindingKind, Severity, SeverityCounts};
pub use job::{AnalysisJob, AnalysisRequest, JobStatus};
pub use notification::Notification;
pub use project::Project;
pub use rule::{Rule, RuleKind, RulePriority, RuleScope};
