//! The emulated backend's request surface.
//!
//! Every operation seeds the store once if it is empty (race-free), then
//! passes through the network simulator before touching the store. This is
//! the boundary a real client would see; there is no ambient global state,
//! the backend owns its store instance.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tokio::sync::OnceCell;

use talentflow_core::{
    ApiError, ApiResult, Assessment, AssessmentData, Candidate, CandidateId, Job, JobId,
    JobStatus, Page, QuestionRow, ReorderAck, Stage, SubmitAck, Submission, TimelineEvent,
};
use talentflow_store::{Collection, Store};

use crate::mutations::{
    CreateCandidate, CreateJob, MutationService, UpdateCandidate, UpdateJob,
};
use crate::network::Network;
use crate::query::{self, ListParams};
use crate::seed::{FixtureSeeder, SeedProvider};

/// Parameters for `list_jobs`.
#[derive(Debug, Clone, Default)]
pub struct JobListParams {
    pub search: Option<String>,
    pub status: Option<JobStatus>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Parameters for `list_candidates`.
#[derive(Debug, Clone, Default)]
pub struct CandidateListParams {
    pub search: Option<String>,
    pub stage: Option<Stage>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// The emulated REST backend.
pub struct Backend {
    store: Store,
    network: Network,
    mutations: MutationService,
    seeder: Option<Arc<dyn SeedProvider>>,
    seeded: OnceCell<()>,
}

impl Backend {
    pub fn new(store: Store, network: Network, seeder: Arc<dyn SeedProvider>) -> Self {
        Self {
            mutations: MutationService::new(store.clone()),
            store,
            network,
            seeder: Some(seeder),
            seeded: OnceCell::new(),
        }
    }

    /// A backend that serves whatever the store already holds.
    pub fn without_seed(store: Store, network: Network) -> Self {
        Self {
            mutations: MutationService::new(store.clone()),
            store,
            network,
            seeder: None,
            seeded: OnceCell::new(),
        }
    }

    /// In-memory backend with the production-shaped network simulator and
    /// the default fixture dataset.
    pub fn in_memory() -> Self {
        Self::new(
            Store::in_memory(),
            Network::simulated(),
            Arc::new(FixtureSeeder::new()),
        )
    }

    /// Direct handle to the underlying store (diagnostics and tests; real
    /// clients go through the operations below).
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Seed-if-empty, at most once per backend lifetime. The `OnceCell`
    /// makes the check-then-seed sequence race-free even when several
    /// requests arrive before the first one finishes seeding.
    async fn ensure_seeded(&self) -> ApiResult<()> {
        self.seeded
            .get_or_try_init(|| async {
                let Some(seeder) = &self.seeder else {
                    return Ok(());
                };
                if self.store.count(Collection::Jobs).await? == 0 {
                    seeder.seed(&self.store).await?;
                }
                Ok::<(), ApiError>(())
            })
            .await?;
        Ok(())
    }

    // --- Jobs ---

    /// List jobs in display order, filtered and paged.
    pub async fn list_jobs(&self, params: JobListParams) -> ApiResult<Page<Job>> {
        self.ensure_seeded().await?;
        self.network.read_gate().await?;

        let mut jobs: Vec<Job> = self.store.scan_as(Collection::Jobs).await?;
        jobs.sort_by_key(|j| (j.order, j.id));

        let mut filters = Vec::new();
        if let Some(status) = params.status {
            filters.push(("status".to_string(), to_json(&status)?));
        }
        let list_params = ListParams {
            search: params.search,
            filters,
            page: params.page,
            page_size: params.page_size,
        };

        let rows = to_rows(&jobs)?;
        query::list(rows, &query::JOBS, &list_params).try_map(from_json)
    }

    pub async fn get_job(&self, id: JobId) -> ApiResult<Job> {
        self.ensure_seeded().await?;
        self.network.read_gate().await?;
        self.store
            .get_as(Collection::Jobs, id.value())
            .await?
            .ok_or(ApiError::NotFound)
    }

    /// All jobs in display order. The full-board read used by clients that
    /// reconcile after a reorder.
    pub async fn jobs_ordered(&self) -> ApiResult<Vec<Job>> {
        self.ensure_seeded().await?;
        self.network.read_gate().await?;
        let mut jobs: Vec<Job> = self.store.scan_as(Collection::Jobs).await?;
        jobs.sort_by_key(|j| (j.order, j.id));
        Ok(jobs)
    }

    pub async fn create_job(&self, payload: CreateJob) -> ApiResult<Job> {
        self.ensure_seeded().await?;
        self.network.write_gate().await?;
        self.mutations.create_job(payload).await
    }

    pub async fn update_job(&self, id: JobId, payload: UpdateJob) -> ApiResult<Job> {
        self.ensure_seeded().await?;
        self.network.write_gate().await?;
        self.mutations.update_job(id, payload).await
    }

    pub async fn reorder_job(
        &self,
        id: JobId,
        from_order: u32,
        to_order: u32,
    ) -> ApiResult<ReorderAck> {
        self.ensure_seeded().await?;
        self.network.write_gate().await?;
        self.mutations.reorder_job(id, from_order, to_order).await
    }

    // --- Candidates ---

    pub async fn list_candidates(&self, params: CandidateListParams) -> ApiResult<Page<Candidate>> {
        self.ensure_seeded().await?;
        self.network.read_gate().await?;

        let mut filters = Vec::new();
        if let Some(stage) = params.stage {
            filters.push(("stage".to_string(), to_json(&stage)?));
        }
        let list_params = ListParams {
            search: params.search,
            filters,
            page: params.page,
            page_size: params.page_size,
        };

        let rows = self.store.database().scan(Collection::Candidates).await?;
        query::list(rows, &query::CANDIDATES, &list_params).try_map(from_json)
    }

    pub async fn create_candidate(&self, payload: CreateCandidate) -> ApiResult<Candidate> {
        self.ensure_seeded().await?;
        self.network.write_gate().await?;
        self.mutations.create_candidate(payload).await
    }

    pub async fn update_candidate(
        &self,
        id: CandidateId,
        payload: UpdateCandidate,
    ) -> ApiResult<Candidate> {
        self.ensure_seeded().await?;
        self.network.write_gate().await?;
        self.mutations.update_candidate(id, payload).await
    }

    pub async fn update_candidate_stage(
        &self,
        id: CandidateId,
        stage: Stage,
    ) -> ApiResult<Candidate> {
        self.ensure_seeded().await?;
        self.network.write_gate().await?;
        self.mutations.update_candidate_stage(id, stage).await
    }

    /// A candidate's stage history, oldest first. Unknown candidates yield
    /// an empty sequence, not an error.
    pub async fn candidate_timeline(&self, id: CandidateId) -> ApiResult<Vec<TimelineEvent>> {
        self.ensure_seeded().await?;
        self.network.read_gate().await?;
        let mut events: Vec<TimelineEvent> = self
            .store
            .find_by_as(Collection::Timelines, "candidateId", id)
            .await?;
        events.sort_by_key(|e| (e.date, e.id));
        Ok(events)
    }

    // --- Assessments ---

    pub async fn get_assessment(&self, job_id: JobId) -> ApiResult<Option<Assessment>> {
        self.ensure_seeded().await?;
        self.network.read_gate().await?;
        let found: Vec<Assessment> = self
            .store
            .find_by_as(Collection::Assessments, "jobId", job_id)
            .await?;
        Ok(found.into_iter().next())
    }

    /// The normalized question rows for a job, flattened out of the
    /// assessment payload.
    pub async fn assessment_questions(&self, job_id: JobId) -> ApiResult<Vec<QuestionRow>> {
        self.ensure_seeded().await?;
        self.network.read_gate().await?;
        let mut rows: Vec<QuestionRow> = self
            .store
            .find_by_as(Collection::Questions, "jobId", job_id)
            .await?;
        rows.sort_by_key(|r| r.id);
        Ok(rows)
    }

    pub async fn put_assessment(
        &self,
        job_id: JobId,
        data: AssessmentData,
    ) -> ApiResult<Assessment> {
        self.ensure_seeded().await?;
        self.network.write_gate().await?;
        self.mutations.put_assessment(job_id, data).await
    }

    pub async fn submit_assessment(
        &self,
        job_id: JobId,
        answers: JsonValue,
    ) -> ApiResult<SubmitAck> {
        self.ensure_seeded().await?;
        self.network.write_gate().await?;
        self.mutations.submit_assessment(job_id, answers).await
    }

    pub async fn list_submissions(&self, job_id: JobId) -> ApiResult<Vec<Submission>> {
        self.ensure_seeded().await?;
        self.network.read_gate().await?;
        let mut submissions: Vec<Submission> = self
            .store
            .find_by_as(Collection::Submissions, "jobId", job_id)
            .await?;
        submissions.sort_by_key(|s| s.id);
        Ok(submissions)
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> ApiResult<JsonValue> {
    serde_json::to_value(value).map_err(|e| ApiError::storage(e.to_string()))
}

fn to_rows<T: serde::Serialize>(values: &[T]) -> ApiResult<Vec<JsonValue>> {
    values.iter().map(to_json).collect()
}

fn from_json<T: serde::de::DeserializeOwned>(value: JsonValue) -> ApiResult<T> {
    serde_json::from_value(value).map_err(|e| ApiError::storage(e.to_string()))
}
