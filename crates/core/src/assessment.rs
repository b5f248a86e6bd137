//! Assessments, their question structure, and candidate submissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::id::{AssessmentId, JobId, SubmissionId};

/// A per-job assessment. At most one exists per `job_id`; a put replaces
/// the entire `data` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: AssessmentId,
    pub job_id: JobId,
    pub data: AssessmentData,
}

/// The full nested payload of an assessment: sections of questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentData {
    pub title: String,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub title: String,
    pub questions: Vec<Question>,
}

/// Question kind, matching the render layer's widget set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    Short,
    Long,
    Numeric,
    SingleChoice,
    MultiChoice,
    File,
}

/// Bounds for a numeric question.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: i64,
    pub max: i64,
}

/// Conditional display: show this question only when another question's
/// answer equals `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowCondition {
    pub depends_on: String,
    pub value: JsonValue,
}

/// A single question embedded in an assessment section.
///
/// `id` is a string key unique within the assessment (e.g. `"q3"`), not a
/// store-assigned identifier. `options` is populated for choice kinds and
/// `range` for numeric ones; the mutation service does not validate the
/// structure beyond what serde requires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub label: String,
    pub kind: QuestionKind,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<NumericRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ShowCondition>,
}

/// Normalized row in the `questions` collection: one embedded question
/// flattened out of `Assessment.data`, re-indexed on every assessment put.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRow {
    pub id: u64,
    pub job_id: JobId,
    pub key: String,
    pub section: String,
    pub label: String,
    pub kind: QuestionKind,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<NumericRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ShowCondition>,
}

/// A candidate's submitted answers. Append-only: repeat submissions for the
/// same job create new records rather than overwriting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: SubmissionId,
    pub job_id: JobId,
    pub answers: JsonValue,
    pub submitted_at: DateTime<Utc>,
}

/// Acknowledgement for a submitted assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitAck {
    pub ok: bool,
}
