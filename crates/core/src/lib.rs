//! `talentflow-core`: domain foundation for the emulated hiring backend.
//!
//! This crate contains **pure domain** types (no async, no I/O): typed
//! identifiers, the six persisted entities, the error taxonomy shared by
//! every layer, and the page envelope returned by list queries.

pub mod assessment;
pub mod candidate;
pub mod error;
pub mod id;
pub mod job;
pub mod page;

pub use assessment::{
    Assessment, AssessmentData, NumericRange, Question, QuestionKind, QuestionRow, Section,
    ShowCondition, SubmitAck, Submission,
};
pub use candidate::{Candidate, Stage, TimelineEvent};
pub use error::{ApiError, ApiResult};
pub use id::{AssessmentId, CandidateId, JobId, SubmissionId, TimelineEventId};
pub use job::{slugify, unique_slug, Job, JobStatus, ReorderAck};
pub use page::Page;
