//! End-to-end tests for the optimistic coordinator: commit, rollback, and
//! busy rejection, all against deterministic network policies.

use std::sync::Arc;
use std::time::Duration;

use talentflow_api::{Backend, FixtureSeeder, Network, ScriptedPolicy};
use talentflow_client::{Coordinator, MutationPhase, Target};
use talentflow_core::{ApiError, JobId, Stage};
use talentflow_store::Store;

fn scripted(delay: Duration) -> (Arc<Backend>, Arc<ScriptedPolicy>) {
    let policy = Arc::new(ScriptedPolicy::with_delay(delay));
    let backend = Backend::new(
        Store::in_memory(),
        Network::new(policy.clone()),
        Arc::new(FixtureSeeder::small()),
    );
    (Arc::new(backend), policy)
}

async fn loaded_coordinator(backend: Arc<Backend>) -> Coordinator {
    let coordinator = Coordinator::new(backend);
    coordinator.refresh().await.unwrap();
    coordinator
}

#[tokio::test]
async fn confirmed_reorder_updates_the_local_view() {
    let (backend, _policy) = scripted(Duration::ZERO);
    let coordinator = loaded_coordinator(backend.clone()).await;

    let moved = coordinator.jobs().await[4].id;
    coordinator.reorder_job(moved, 1).await.unwrap();

    let jobs = coordinator.jobs().await;
    assert_eq!(jobs[0].id, moved);
    let orders: Vec<u32> = jobs.iter().map(|j| j.order).collect();
    assert_eq!(orders, (1..=25).collect::<Vec<_>>());

    // Local view agrees with the backend.
    let durable = backend.jobs_ordered().await.unwrap();
    assert_eq!(jobs, durable);

    let log = coordinator.mutation_log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].target, Target::Job(moved));
    assert_eq!(log[0].phase, MutationPhase::Committed);
}

#[tokio::test]
async fn rejected_reorder_restores_the_snapshot() {
    let (backend, policy) = scripted(Duration::ZERO);
    let coordinator = loaded_coordinator(backend.clone()).await;
    let before = coordinator.jobs().await;
    let moved = before[4].id;

    policy.push_outcome(true);
    let err = coordinator.reorder_job(moved, 1).await.unwrap_err();
    assert_eq!(err.error, ApiError::ServiceUnavailable);
    assert!(err.rolled_back);
    assert!(err.error.is_retryable());

    // Local view and durable state both show the pre-move ordering.
    assert_eq!(coordinator.jobs().await, before);
    assert_eq!(backend.jobs_ordered().await.unwrap(), before);

    let log = coordinator.mutation_log();
    assert_eq!(log[0].phase, MutationPhase::RolledBack);

    // The target is released; a retry goes through.
    coordinator.reorder_job(moved, 1).await.unwrap();
    assert_eq!(coordinator.jobs().await[0].id, moved);
}

#[tokio::test]
async fn rejected_stage_move_restores_candidate_and_timeline() {
    let (backend, policy) = scripted(Duration::ZERO);
    let coordinator = loaded_coordinator(backend.clone()).await;

    let candidate = coordinator.candidates().await[0].clone();
    let timeline_before = backend.candidate_timeline(candidate.id).await.unwrap();

    policy.push_outcome(true);
    let err = coordinator
        .update_candidate_stage(candidate.id, Stage::Hired)
        .await
        .unwrap_err();
    assert!(err.rolled_back);

    let local = coordinator.candidates().await;
    let restored = local.iter().find(|c| c.id == candidate.id).unwrap();
    assert_eq!(restored.stage, candidate.stage);
    assert_eq!(
        backend.candidate_timeline(candidate.id).await.unwrap(),
        timeline_before
    );
}

#[tokio::test]
async fn confirmed_stage_move_appends_one_timeline_event() {
    let (backend, _policy) = scripted(Duration::ZERO);
    let coordinator = loaded_coordinator(backend.clone()).await;

    let candidate = coordinator.candidates().await[0].clone();
    let before = backend.candidate_timeline(candidate.id).await.unwrap().len();

    coordinator
        .update_candidate_stage(candidate.id, Stage::Offer)
        .await
        .unwrap();

    let local = coordinator.candidates().await;
    assert_eq!(
        local.iter().find(|c| c.id == candidate.id).unwrap().stage,
        Stage::Offer
    );
    let timeline = backend.candidate_timeline(candidate.id).await.unwrap();
    assert_eq!(timeline.len(), before + 1);
    assert_eq!(timeline.last().unwrap().stage, Stage::Offer);
}

#[tokio::test]
async fn second_mutation_on_a_pending_target_is_busy() {
    let (backend, _policy) = scripted(Duration::from_millis(150));
    let coordinator = Arc::new(loaded_coordinator(backend).await);

    let moved = coordinator.jobs().await[2].id;
    let first = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.reorder_job(moved, 1).await })
    };
    tokio::time::sleep(Duration::from_millis(30)).await;

    let err = coordinator.reorder_job(moved, 5).await.unwrap_err();
    assert!(matches!(err.error, ApiError::Busy(_)));
    assert!(!err.rolled_back);

    first.await.unwrap().unwrap();
    assert_eq!(coordinator.jobs().await[0].id, moved);

    // A different job is not blocked while this one settles.
    let other = coordinator.jobs().await[10].id;
    coordinator.reorder_job(other, 2).await.unwrap();
}

#[tokio::test]
async fn unknown_targets_fail_without_touching_the_view() {
    let (backend, _policy) = scripted(Duration::ZERO);
    let coordinator = loaded_coordinator(backend).await;
    let before = coordinator.jobs().await;

    let err = coordinator.reorder_job(JobId::new(999), 1).await.unwrap_err();
    assert_eq!(err.error, ApiError::NotFound);
    assert!(!err.rolled_back);
    assert_eq!(coordinator.jobs().await, before);

    // The target was released even though the mutation never started.
    let err = coordinator.reorder_job(JobId::new(999), 1).await.unwrap_err();
    assert_eq!(err.error, ApiError::NotFound);
}
