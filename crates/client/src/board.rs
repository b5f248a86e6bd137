//! Local mirror of the backend's board.

use talentflow_core::{Candidate, CandidateId, Job, JobId};

/// The client's in-memory view: jobs in display order plus the loaded
/// candidate window. The coordinator mutates this view optimistically and
/// restores it from snapshots on rejected writes.
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    pub jobs: Vec<Job>,
    pub candidates: Vec<Candidate>,
}

impl BoardState {
    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn candidate(&self, id: CandidateId) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == id)
    }
}
