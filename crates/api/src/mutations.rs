//! Mutation service: create/update/reorder operations and their
//! side effects (slug uniqueness, order renumbering, timeline appends,
//! question re-indexing).
//!
//! The service never catches its own errors and never injects failures;
//! the network wrapper in [`crate::backend`] sits in front of it.

use std::collections::BTreeSet;

use chrono::Utc;
use serde_json::Value as JsonValue;

use talentflow_core::{
    Assessment, AssessmentData, ApiError, ApiResult, Candidate, CandidateId, Job, JobId,
    JobStatus, QuestionRow, ReorderAck, Stage, SubmitAck, Submission, TimelineEvent,
    unique_slug,
};
use talentflow_store::{Collection, Store};

/// Payload for `create_job`.
#[derive(Debug, Clone, Default)]
pub struct CreateJob {
    pub title: String,
    pub status: Option<JobStatus>,
    pub tags: BTreeSet<String>,
    /// Caller-supplied display order; defaults to the end of the list.
    pub order: Option<u32>,
}

/// Partial update for a job. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateJob {
    pub title: Option<String>,
    pub status: Option<JobStatus>,
    pub tags: Option<BTreeSet<String>>,
}

/// Payload for `create_candidate`.
#[derive(Debug, Clone)]
pub struct CreateCandidate {
    pub name: String,
    pub email: String,
    pub job_id: JobId,
    pub stage: Option<Stage>,
}

/// Partial update for a candidate. A present `stage` always appends one
/// timeline event, even when it equals the current stage.
#[derive(Debug, Clone, Default)]
pub struct UpdateCandidate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub job_id: Option<JobId>,
    pub stage: Option<Stage>,
}

/// All write operations against the persistent store.
#[derive(Clone)]
pub struct MutationService {
    store: Store,
}

impl MutationService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Create a job, deriving a unique slug from the title and placing it
    /// at the end of the display order unless the payload says otherwise.
    pub async fn create_job(&self, payload: CreateJob) -> ApiResult<Job> {
        let title = payload.title.trim();
        if title.is_empty() {
            return Err(ApiError::validation("job title must not be blank"));
        }

        let jobs: Vec<Job> = self.store.scan_as(Collection::Jobs).await?;
        let slug = unique_slug(title, |candidate| jobs.iter().any(|j| j.slug == candidate));
        let order = payload.order.unwrap_or(jobs.len() as u32 + 1);

        let job = Job {
            id: JobId::new(0),
            title: title.to_string(),
            slug,
            status: payload.status.unwrap_or(JobStatus::Active),
            tags: payload.tags,
            order,
        };
        let id = self.store.add_value(Collection::Jobs, &job).await?;
        tracing::info!(job_id = id, slug = %job.slug, "created job");

        Ok(Job {
            id: JobId::new(id),
            ..job
        })
    }

    /// Apply a partial update. A title change re-derives the slug, with the
    /// record itself excluded from the collision check.
    pub async fn update_job(&self, id: JobId, payload: UpdateJob) -> ApiResult<Job> {
        // Existence check first so a blank patch still reports NotFound.
        let _current: Job = self.store.require_as(Collection::Jobs, id.value()).await?;

        let mut patch = serde_json::Map::new();
        if let Some(title) = payload.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(ApiError::validation("job title must not be blank"));
            }
            let jobs: Vec<Job> = self.store.scan_as(Collection::Jobs).await?;
            let slug = unique_slug(&title, |candidate| {
                jobs.iter().any(|j| j.id != id && j.slug == candidate)
            });
            patch.insert("title".into(), JsonValue::from(title));
            patch.insert("slug".into(), JsonValue::from(slug));
        }
        if let Some(status) = payload.status {
            patch.insert("status".into(), to_json(&status)?);
        }
        if let Some(tags) = payload.tags {
            patch.insert("tags".into(), to_json(&tags)?);
        }

        let updated = self
            .store
            .update(Collection::Jobs, id.value(), JsonValue::Object(patch))
            .await?;
        from_json(updated)
    }

    /// Move a job within the display order and renumber the whole
    /// collection to a contiguous `1..N`.
    ///
    /// `from_order` is verified against the job's actual stored order; a
    /// stale value fails with `Conflict` rather than silently reordering
    /// from the wrong position. A `to_order` past the end clamps to the
    /// last position.
    pub async fn reorder_job(
        &self,
        id: JobId,
        from_order: u32,
        to_order: u32,
    ) -> ApiResult<ReorderAck> {
        let mut jobs: Vec<Job> = self.store.scan_as(Collection::Jobs).await?;
        jobs.sort_by_key(|j| (j.order, j.id));

        let position = jobs
            .iter()
            .position(|j| j.id == id)
            .ok_or(ApiError::NotFound)?;
        let actual = jobs[position].order;
        if actual != from_order {
            return Err(ApiError::conflict(format!(
                "fromOrder {from_order} is stale: job {id} is at order {actual}"
            )));
        }

        let job = jobs.remove(position);
        let target = (to_order.max(1) as usize - 1).min(jobs.len());
        jobs.insert(target, job);

        for (index, job) in jobs.iter_mut().enumerate() {
            let want = index as u32 + 1;
            if job.order != want {
                job.order = want;
                self.store
                    .put_value(Collection::Jobs, job.id.value(), job)
                    .await?;
            }
        }
        tracing::info!(job_id = %id, from_order, to_order, "reordered job");

        Ok(ReorderAck {
            from_order,
            to_order,
        })
    }

    pub async fn create_candidate(&self, payload: CreateCandidate) -> ApiResult<Candidate> {
        let name = payload.name.trim();
        if name.is_empty() {
            return Err(ApiError::validation("candidate name must not be blank"));
        }

        let candidate = Candidate {
            id: CandidateId::new(0),
            name: name.to_string(),
            email: payload.email,
            job_id: payload.job_id,
            stage: payload.stage.unwrap_or(Stage::Applied),
        };
        let id = self
            .store
            .add_value(Collection::Candidates, &candidate)
            .await?;

        Ok(Candidate {
            id: CandidateId::new(id),
            ..candidate
        })
    }

    /// Apply a partial update to a candidate. When the patch carries a
    /// stage, one timeline event is appended unconditionally.
    pub async fn update_candidate(
        &self,
        id: CandidateId,
        payload: UpdateCandidate,
    ) -> ApiResult<Candidate> {
        let _current: Candidate = self
            .store
            .require_as(Collection::Candidates, id.value())
            .await?;

        let mut patch = serde_json::Map::new();
        if let Some(name) = payload.name {
            patch.insert("name".into(), JsonValue::from(name));
        }
        if let Some(email) = payload.email {
            patch.insert("email".into(), JsonValue::from(email));
        }
        if let Some(job_id) = payload.job_id {
            patch.insert("jobId".into(), to_json(&job_id)?);
        }
        if let Some(stage) = payload.stage {
            patch.insert("stage".into(), to_json(&stage)?);
        }

        let updated = self
            .store
            .update(Collection::Candidates, id.value(), JsonValue::Object(patch))
            .await?;
        let candidate: Candidate = from_json(updated)?;

        if let Some(stage) = payload.stage {
            self.append_timeline(id, stage).await?;
        }

        Ok(candidate)
    }

    /// Move a candidate to a stage, appending exactly one timeline event.
    pub async fn update_candidate_stage(
        &self,
        id: CandidateId,
        stage: Stage,
    ) -> ApiResult<Candidate> {
        let candidate = self
            .update_candidate(
                id,
                UpdateCandidate {
                    stage: Some(stage),
                    ..Default::default()
                },
            )
            .await?;
        tracing::info!(candidate_id = %id, stage = ?stage, "moved candidate");
        Ok(candidate)
    }

    /// Upsert the assessment for a job: create if absent, otherwise
    /// replace the entire `data` payload. The normalized `questions`
    /// collection is re-indexed from the new payload either way.
    pub async fn put_assessment(
        &self,
        job_id: JobId,
        data: AssessmentData,
    ) -> ApiResult<Assessment> {
        let existing: Vec<Assessment> = self
            .store
            .find_by_as(Collection::Assessments, "jobId", job_id)
            .await?;

        let assessment = match existing.into_iter().next() {
            Some(current) => {
                let replaced = Assessment {
                    id: current.id,
                    job_id,
                    data,
                };
                self.store
                    .put_value(Collection::Assessments, replaced.id.value(), &replaced)
                    .await?;
                replaced
            }
            None => {
                let mut created = Assessment {
                    id: 0u64.into(),
                    job_id,
                    data,
                };
                let id = self
                    .store
                    .add_value(Collection::Assessments, &created)
                    .await?;
                created.id = id.into();
                created
            }
        };

        self.reindex_questions(job_id, &assessment.data).await?;
        Ok(assessment)
    }

    /// Append a submission. Prior submissions for the same job are never
    /// overwritten; multiple submissions per job are legal.
    pub async fn submit_assessment(
        &self,
        job_id: JobId,
        answers: JsonValue,
    ) -> ApiResult<SubmitAck> {
        let submission = Submission {
            id: 0u64.into(),
            job_id,
            answers,
            submitted_at: Utc::now(),
        };
        let id = self
            .store
            .add_value(Collection::Submissions, &submission)
            .await?;
        tracing::info!(job_id = %job_id, submission_id = id, "recorded submission");

        Ok(SubmitAck { ok: true })
    }

    async fn append_timeline(
        &self,
        candidate_id: CandidateId,
        stage: Stage,
    ) -> ApiResult<TimelineEvent> {
        let event = TimelineEvent {
            id: 0u64.into(),
            candidate_id,
            stage,
            date: Utc::now(),
        };
        let id = self.store.add_value(Collection::Timelines, &event).await?;
        Ok(TimelineEvent {
            id: id.into(),
            ..event
        })
    }

    async fn reindex_questions(&self, job_id: JobId, data: &AssessmentData) -> ApiResult<()> {
        self.store
            .delete_by(Collection::Questions, "jobId", job_id)
            .await?;
        let rows = flatten_questions(job_id, data);
        if !rows.is_empty() {
            self.store
                .bulk_add_values(Collection::Questions, &rows)
                .await?;
        }
        Ok(())
    }
}

/// Flatten an assessment payload into normalized question rows.
pub(crate) fn flatten_questions(job_id: JobId, data: &AssessmentData) -> Vec<QuestionRow> {
    data.sections
        .iter()
        .flat_map(|section| {
            section.questions.iter().map(|q| QuestionRow {
                id: 0,
                job_id,
                key: q.id.clone(),
                section: section.title.clone(),
                label: q.label.clone(),
                kind: q.kind,
                required: q.required,
                options: q.options.clone(),
                range: q.range,
                condition: q.condition.clone(),
            })
        })
        .collect()
}

fn to_json<T: serde::Serialize>(value: &T) -> ApiResult<JsonValue> {
    serde_json::to_value(value).map_err(|e| ApiError::storage(e.to_string()))
}

fn from_json<T: serde::de::DeserializeOwned>(value: JsonValue) -> ApiResult<T> {
    serde_json::from_value(value).map_err(|e| ApiError::storage(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use talentflow_core::{NumericRange, Question, QuestionKind, Section};

    fn service() -> MutationService {
        MutationService::new(Store::in_memory())
    }

    async fn create_titled(svc: &MutationService, title: &str) -> Job {
        svc.create_job(CreateJob {
            title: title.into(),
            ..Default::default()
        })
        .await
        .unwrap()
    }

    fn sample_data() -> AssessmentData {
        AssessmentData {
            title: "Screening".into(),
            sections: vec![Section {
                title: "General".into(),
                questions: vec![
                    Question {
                        id: "q1".into(),
                        label: "Years of experience".into(),
                        kind: QuestionKind::Numeric,
                        required: true,
                        options: Vec::new(),
                        range: Some(NumericRange { min: 0, max: 50 }),
                        condition: None,
                    },
                    Question {
                        id: "q2".into(),
                        label: "Preferred stack".into(),
                        kind: QuestionKind::Short,
                        required: false,
                        options: Vec::new(),
                        range: None,
                        condition: None,
                    },
                ],
            }],
        }
    }

    #[tokio::test]
    async fn duplicate_titles_get_suffixed_slugs() {
        let svc = service();
        let first = create_titled(&svc, "Backend Engineer").await;
        let second = create_titled(&svc, "Backend Engineer").await;
        let third = create_titled(&svc, "Backend Engineer").await;

        assert_eq!(first.slug, "backend-engineer");
        assert_eq!(second.slug, "backend-engineer-1");
        assert_eq!(third.slug, "backend-engineer-2");
        assert_eq!((first.order, second.order, third.order), (1, 2, 3));
    }

    #[tokio::test]
    async fn blank_title_is_a_validation_error() {
        let svc = service();
        let err = svc
            .create_job(CreateJob {
                title: "   ".into(),
                ..Default::default()
            })
            .await;
        assert!(matches!(err, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn update_job_reslugs_excluding_itself() {
        let svc = service();
        let job = create_titled(&svc, "Backend Engineer").await;
        create_titled(&svc, "Data Engineer").await;

        // Same title again: the collision check must skip the job itself,
        // so the slug stays stable.
        let same = svc
            .update_job(
                job.id,
                UpdateJob {
                    title: Some("Backend Engineer".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(same.slug, "backend-engineer");

        let renamed = svc
            .update_job(
                job.id,
                UpdateJob {
                    title: Some("Data Engineer".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.slug, "data-engineer-1");
    }

    #[tokio::test]
    async fn update_job_missing_id_is_not_found() {
        let svc = service();
        let err = svc
            .update_job(JobId::new(42), UpdateJob::default())
            .await;
        assert_eq!(err, Err(ApiError::NotFound));
    }

    #[tokio::test]
    async fn reorder_renumbers_contiguously() {
        let svc = service();
        for i in 1..=10 {
            create_titled(&svc, &format!("Job {i}")).await;
        }

        let job5 = JobId::new(5);
        let ack = svc.reorder_job(job5, 5, 1).await.unwrap();
        assert_eq!(ack, ReorderAck { from_order: 5, to_order: 1 });

        let mut jobs: Vec<Job> = svc.store.scan_as(Collection::Jobs).await.unwrap();
        jobs.sort_by_key(|j| j.order);

        let ids: Vec<u64> = jobs.iter().map(|j| j.id.value()).collect();
        assert_eq!(ids, [5, 1, 2, 3, 4, 6, 7, 8, 9, 10]);
        let orders: Vec<u32> = jobs.iter().map(|j| j.order).collect();
        assert_eq!(orders, (1..=10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn reorder_with_stale_from_order_conflicts() {
        let svc = service();
        for i in 1..=3 {
            create_titled(&svc, &format!("Job {i}")).await;
        }

        let err = svc.reorder_job(JobId::new(2), 3, 1).await;
        assert!(matches!(err, Err(ApiError::Conflict(_))));

        // Nothing moved.
        let jobs: Vec<Job> = svc.store.scan_as(Collection::Jobs).await.unwrap();
        let orders: Vec<u32> = jobs.iter().map(|j| j.order).collect();
        assert_eq!(orders, [1, 2, 3]);
    }

    #[tokio::test]
    async fn reorder_unknown_job_is_not_found() {
        let svc = service();
        create_titled(&svc, "Only Job").await;
        assert_eq!(svc.reorder_job(JobId::new(9), 1, 1).await, Err(ApiError::NotFound));
    }

    #[tokio::test]
    async fn stage_update_appends_exactly_one_event() {
        let svc = service();
        let candidate = svc
            .create_candidate(CreateCandidate {
                name: "Ada Lovelace".into(),
                email: "ada@example.com".into(),
                job_id: JobId::new(1),
                stage: None,
            })
            .await
            .unwrap();
        assert_eq!(candidate.stage, Stage::Applied);

        let moved = svc
            .update_candidate_stage(candidate.id, Stage::Screen)
            .await
            .unwrap();
        assert_eq!(moved.stage, Stage::Screen);

        let events: Vec<TimelineEvent> = svc
            .store
            .find_by_as(Collection::Timelines, "candidateId", candidate.id)
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].stage, Stage::Screen);

        // Moving to the same stage still appends (the append is
        // unconditional by contract).
        svc.update_candidate_stage(candidate.id, Stage::Screen)
            .await
            .unwrap();
        let events: Vec<TimelineEvent> = svc
            .store
            .find_by_as(Collection::Timelines, "candidateId", candidate.id)
            .await
            .unwrap();
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn prior_timeline_events_are_never_mutated() {
        let svc = service();
        let candidate = svc
            .create_candidate(CreateCandidate {
                name: "Grace Hopper".into(),
                email: "grace@example.com".into(),
                job_id: JobId::new(1),
                stage: None,
            })
            .await
            .unwrap();

        svc.update_candidate_stage(candidate.id, Stage::Screen)
            .await
            .unwrap();
        let before: Vec<TimelineEvent> = svc
            .store
            .find_by_as(Collection::Timelines, "candidateId", candidate.id)
            .await
            .unwrap();

        svc.update_candidate_stage(candidate.id, Stage::Tech)
            .await
            .unwrap();
        let after: Vec<TimelineEvent> = svc
            .store
            .find_by_as(Collection::Timelines, "candidateId", candidate.id)
            .await
            .unwrap();

        assert_eq!(after.len(), 2);
        assert_eq!(after[0], before[0]);
    }

    #[tokio::test]
    async fn put_assessment_upserts_and_reindexes() {
        let svc = service();
        let job_id = JobId::new(3);

        let created = svc.put_assessment(job_id, sample_data()).await.unwrap();
        assert_eq!(created.job_id, job_id);

        let rows: Vec<QuestionRow> = svc
            .store
            .find_by_as(Collection::Questions, "jobId", job_id)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);

        // Replace with a one-question payload: same assessment id, fresh index.
        let mut smaller = sample_data();
        smaller.sections[0].questions.truncate(1);
        let replaced = svc.put_assessment(job_id, smaller).await.unwrap();
        assert_eq!(replaced.id, created.id);

        assert_eq!(
            svc.store.count(Collection::Assessments).await.unwrap(),
            1
        );
        let rows: Vec<QuestionRow> = svc
            .store
            .find_by_as(Collection::Questions, "jobId", job_id)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, "q1");
    }

    #[tokio::test]
    async fn submissions_append_and_never_overwrite() {
        let svc = service();
        let job_id = JobId::new(2);

        let ack = svc
            .submit_assessment(job_id, serde_json::json!({"q1": 4}))
            .await
            .unwrap();
        assert!(ack.ok);
        svc.submit_assessment(job_id, serde_json::json!({"q1": 5}))
            .await
            .unwrap();

        let submissions: Vec<Submission> = svc
            .store
            .find_by_as(Collection::Submissions, "jobId", job_id)
            .await
            .unwrap();
        assert_eq!(submissions.len(), 2);
        assert_ne!(submissions[0].answers, submissions[1].answers);
    }
}
