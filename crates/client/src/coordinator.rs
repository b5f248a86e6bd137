//! Optimistic mutation coordinator.
//!
//! Every mutation follows the same lifecycle: reject if the target already
//! has a mutation in flight, snapshot the affected slice of the board,
//! apply the change locally, then confirm against the backend. A rejected
//! write restores the snapshot before the error reaches the caller, so the
//! local view never shows a state the backend refused.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use talentflow_api::Backend;
use talentflow_core::{ApiError, ApiResult, Candidate, CandidateId, Job, JobId, Stage};

use crate::board::BoardState;

/// The entity an in-flight mutation is pinned to. One mutation per target
/// at a time; a second one is rejected with [`ApiError::Busy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Job(JobId),
    Candidate(CandidateId),
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Job(id) => write!(f, "job {id}"),
            Target::Candidate(id) => write!(f, "candidate {id}"),
        }
    }
}

/// Where a mutation ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationPhase {
    Pending,
    Committed,
    RolledBack,
}

/// One entry in the coordinator's mutation log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub ticket: Uuid,
    pub target: Target,
    pub phase: MutationPhase,
}

/// A rejected mutation, reported after the local view has been repaired.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("mutation failed: {error}")]
pub struct MutationError {
    pub error: ApiError,
    /// Whether an optimistic local change was undone. `false` means the
    /// mutation never touched the local view (e.g. a busy rejection).
    pub rolled_back: bool,
}

/// Applies mutations optimistically against a local [`BoardState`] and
/// reconciles with the backend.
pub struct Coordinator {
    backend: std::sync::Arc<Backend>,
    state: RwLock<BoardState>,
    pending: Mutex<HashSet<Target>>,
    log: Mutex<Vec<MutationRecord>>,
}

impl Coordinator {
    pub fn new(backend: std::sync::Arc<Backend>) -> Self {
        Self {
            backend,
            state: RwLock::new(BoardState::default()),
            pending: Mutex::new(HashSet::new()),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Replace the local view with fresh reads from the backend.
    pub async fn refresh(&self) -> ApiResult<()> {
        let jobs = self.backend.jobs_ordered().await?;
        let candidates = self
            .backend
            .list_candidates(talentflow_api::CandidateListParams::default())
            .await?
            .items;

        let mut state = self.state.write().await;
        state.jobs = jobs;
        state.candidates = candidates;
        Ok(())
    }

    pub async fn jobs(&self) -> Vec<Job> {
        self.state.read().await.jobs.clone()
    }

    pub async fn candidates(&self) -> Vec<Candidate> {
        self.state.read().await.candidates.clone()
    }

    pub fn mutation_log(&self) -> Vec<MutationRecord> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Move a job to `to_order` (1-based) in the display order.
    ///
    /// The move is applied to the local view immediately; on confirmation
    /// the view is replaced with the backend's ordering, on rejection it is
    /// restored from the pre-move snapshot.
    pub async fn reorder_job(&self, id: JobId, to_order: u32) -> Result<(), MutationError> {
        let ticket = self.begin(Target::Job(id))?;

        let snapshot = {
            let mut state = self.state.write().await;
            let Some(position) = state.jobs.iter().position(|j| j.id == id) else {
                self.finish(ticket, Target::Job(id), MutationPhase::RolledBack);
                return Err(MutationError {
                    error: ApiError::NotFound,
                    rolled_back: false,
                });
            };
            let snapshot = state.jobs.clone();

            // Tentative local move, renumbered the way the backend will.
            let job = state.jobs.remove(position);
            let target = (to_order.max(1) as usize - 1).min(state.jobs.len());
            state.jobs.insert(target, job);
            for (index, job) in state.jobs.iter_mut().enumerate() {
                job.order = index as u32 + 1;
            }
            snapshot
        };
        let from_order = snapshot
            .iter()
            .find(|j| j.id == id)
            .map(|j| j.order)
            .unwrap_or(0);

        match self.backend.reorder_job(id, from_order, to_order).await {
            Ok(_ack) => {
                // Reconcile with the authoritative ordering.
                let confirmed = self.backend.jobs_ordered().await;
                if let Ok(jobs) = confirmed {
                    self.state.write().await.jobs = jobs;
                }
                self.finish(ticket, Target::Job(id), MutationPhase::Committed);
                Ok(())
            }
            Err(error) => {
                self.state.write().await.jobs = snapshot;
                self.finish(ticket, Target::Job(id), MutationPhase::RolledBack);
                tracing::warn!(job_id = %id, %error, "reorder rejected, view restored");
                Err(MutationError {
                    error,
                    rolled_back: true,
                })
            }
        }
    }

    /// Move a candidate to a stage, optimistically.
    pub async fn update_candidate_stage(
        &self,
        id: CandidateId,
        stage: Stage,
    ) -> Result<(), MutationError> {
        let ticket = self.begin(Target::Candidate(id))?;

        let snapshot = {
            let mut state = self.state.write().await;
            let Some(candidate) = state.candidates.iter_mut().find(|c| c.id == id) else {
                self.finish(ticket, Target::Candidate(id), MutationPhase::RolledBack);
                return Err(MutationError {
                    error: ApiError::NotFound,
                    rolled_back: false,
                });
            };
            let snapshot = candidate.clone();
            candidate.stage = stage;
            snapshot
        };

        match self.backend.update_candidate_stage(id, stage).await {
            Ok(confirmed) => {
                let mut state = self.state.write().await;
                if let Some(candidate) = state.candidates.iter_mut().find(|c| c.id == id) {
                    *candidate = confirmed;
                }
                self.finish(ticket, Target::Candidate(id), MutationPhase::Committed);
                Ok(())
            }
            Err(error) => {
                let mut state = self.state.write().await;
                if let Some(candidate) = state.candidates.iter_mut().find(|c| c.id == id) {
                    *candidate = snapshot;
                }
                drop(state);
                self.finish(ticket, Target::Candidate(id), MutationPhase::RolledBack);
                tracing::warn!(candidate_id = %id, %error, "stage move rejected, view restored");
                Err(MutationError {
                    error,
                    rolled_back: true,
                })
            }
        }
    }

    /// Claim the target and open a log entry, or reject with `Busy` when a
    /// mutation is already in flight for it.
    fn begin(&self, target: Target) -> Result<Uuid, MutationError> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if !pending.insert(target) {
            return Err(MutationError {
                error: ApiError::busy(format!("a mutation is already pending on {target}")),
                rolled_back: false,
            });
        }
        drop(pending);

        let ticket = Uuid::now_v7();
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(MutationRecord {
                ticket,
                target,
                phase: MutationPhase::Pending,
            });
        Ok(ticket)
    }

    /// Release the target and close out the log entry.
    fn finish(&self, ticket: Uuid, target: Target, phase: MutationPhase) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&target);
        let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(record) = log.iter_mut().find(|r| r.ticket == ticket) {
            record.phase = phase;
        }
    }
}
