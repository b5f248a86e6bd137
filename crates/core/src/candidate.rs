//! Candidate entity and the append-only stage timeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{CandidateId, JobId, TimelineEventId};

/// Pipeline stage a candidate can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Applied,
    Screen,
    Tech,
    Offer,
    Hired,
    Rejected,
}

impl Stage {
    /// All stages in pipeline order. Used by seeders and board columns.
    pub const ALL: [Stage; 6] = [
        Stage::Applied,
        Stage::Screen,
        Stage::Tech,
        Stage::Offer,
        Stage::Hired,
        Stage::Rejected,
    ];
}

/// A candidate attached to a job.
///
/// `job_id` should reference an existing job, but referential integrity is
/// a caller responsibility; the storage layer does not enforce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub email: String,
    pub job_id: JobId,
    pub stage: Stage,
}

/// Immutable record of a candidate entering a stage.
///
/// Appended by the mutation service whenever a candidate's stage changes;
/// never updated or deleted afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub id: TimelineEventId,
    pub candidate_id: CandidateId,
    pub stage: Stage,
    pub date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Stage::Tech).unwrap(), "tech");
        assert_eq!(
            serde_json::from_value::<Stage>(serde_json::json!("rejected")).unwrap(),
            Stage::Rejected
        );
    }

    #[test]
    fn candidate_wire_shape_is_camel_case() {
        let c = Candidate {
            id: CandidateId::new(7),
            name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            job_id: JobId::new(2),
            stage: Stage::Screen,
        };
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["jobId"], 2);
        assert_eq!(v["stage"], "screen");
    }
}
