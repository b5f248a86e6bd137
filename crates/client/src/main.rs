//! Demo: drive the emulated backend through the optimistic coordinator.
//!
//! Runs against the production-shaped network simulator, so reorders take
//! real (injected) time and roughly one write in twelve is rejected and
//! rolled back. Run it a few times to see both outcomes.

use std::sync::Arc;

use talentflow_api::Backend;
use talentflow_client::Coordinator;
use talentflow_core::JobId;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    talentflow_observability::init();

    let backend = Arc::new(Backend::in_memory());
    let coordinator = Coordinator::new(backend);
    coordinator.refresh().await?;

    let jobs = coordinator.jobs().await;
    tracing::info!(total = jobs.len(), "board loaded");
    for job in jobs.iter().take(5) {
        tracing::info!(order = job.order, slug = %job.slug, status = ?job.status, "job");
    }

    let moved: JobId = jobs[4].id;
    tracing::info!(job_id = %moved, "moving job to the top");
    match coordinator.reorder_job(moved, 1).await {
        Ok(()) => {
            let jobs = coordinator.jobs().await;
            tracing::info!(top = %jobs[0].slug, "reorder confirmed");
        }
        Err(err) => {
            tracing::warn!(%err, rolled_back = err.rolled_back, "reorder rejected");
            let jobs = coordinator.jobs().await;
            tracing::info!(top = %jobs[0].slug, "board restored");
        }
    }

    for record in coordinator.mutation_log() {
        tracing::info!(ticket = %record.ticket, target = %record.target, phase = ?record.phase, "log");
    }
    Ok(())
}
