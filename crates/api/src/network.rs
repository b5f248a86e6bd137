//! Network simulator: injected latency and write-failure injection.
//!
//! The [`NetworkPolicy`] capability decides how long an operation waits and
//! whether a write is failed; the [`Network`] wrapper applies the policy
//! around every backend operation. The failure draw happens **before** the
//! underlying write executes, so the store is provably unchanged whenever
//! `ServiceUnavailable` is returned.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::Rng;

use talentflow_core::{ApiError, ApiResult};

/// Whether an operation reads or writes the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Read,
    Write,
}

/// Injectable latency/failure capability.
///
/// Implementations must be cheap to call; both methods are consulted once
/// per operation.
pub trait NetworkPolicy: Send + Sync {
    fn delay(&self, op: OpKind) -> Duration;
    fn should_fail(&self, op: OpKind) -> bool;
}

/// Production-shaped policy: uniform random read latency, a fixed shorter
/// write latency, and randomized write failures. Latency is never zero;
/// it exists to force asynchronous-safe client design.
#[derive(Debug, Clone)]
pub struct SimulatedNetwork {
    read_min: Duration,
    read_max: Duration,
    write_delay: Duration,
    failure_rate: f64,
}

impl SimulatedNetwork {
    pub const DEFAULT_READ_MIN: Duration = Duration::from_millis(200);
    pub const DEFAULT_READ_MAX: Duration = Duration::from_millis(1200);
    pub const DEFAULT_WRITE_DELAY: Duration = Duration::from_millis(400);
    pub const DEFAULT_FAILURE_RATE: f64 = 0.08;

    pub fn new() -> Self {
        Self {
            read_min: Self::DEFAULT_READ_MIN,
            read_max: Self::DEFAULT_READ_MAX,
            write_delay: Self::DEFAULT_WRITE_DELAY,
            failure_rate: Self::DEFAULT_FAILURE_RATE,
        }
    }

    /// Override the write failure probability (clamped to `[0, 1]`).
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Override the read latency window.
    pub fn with_read_latency(mut self, min: Duration, max: Duration) -> Self {
        self.read_min = min.min(max);
        self.read_max = max.max(min);
        self
    }

    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = delay;
        self
    }
}

impl Default for SimulatedNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkPolicy for SimulatedNetwork {
    fn delay(&self, op: OpKind) -> Duration {
        let delay = match op {
            OpKind::Read => rand::thread_rng().gen_range(self.read_min..=self.read_max),
            OpKind::Write => self.write_delay,
        };
        delay.max(Duration::from_millis(1))
    }

    fn should_fail(&self, op: OpKind) -> bool {
        match op {
            OpKind::Read => false,
            OpKind::Write => rand::thread_rng().gen_range(0.0..1.0) < self.failure_rate,
        }
    }
}

/// Deterministic test policy: a fixed delay (zero is allowed here) and no
/// failures.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantPolicy {
    delay: Duration,
}

impl InstantPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

impl NetworkPolicy for InstantPolicy {
    fn delay(&self, _op: OpKind) -> Duration {
        self.delay
    }

    fn should_fail(&self, _op: OpKind) -> bool {
        false
    }
}

/// Deterministic test policy with a scripted queue of write outcomes.
///
/// Each write pops the next outcome (`true` = fail); an empty queue means
/// the write passes. Reads never fail.
#[derive(Debug, Default)]
pub struct ScriptedPolicy {
    delay: Duration,
    outcomes: Mutex<VecDeque<bool>>,
}

impl ScriptedPolicy {
    pub fn instant() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    /// Queue an outcome for a future write (`true` = inject a failure).
    pub fn push_outcome(&self, fail: bool) {
        if let Ok(mut outcomes) = self.outcomes.lock() {
            outcomes.push_back(fail);
        }
    }
}

impl NetworkPolicy for ScriptedPolicy {
    fn delay(&self, _op: OpKind) -> Duration {
        self.delay
    }

    fn should_fail(&self, op: OpKind) -> bool {
        if op == OpKind::Read {
            return false;
        }
        self.outcomes
            .lock()
            .ok()
            .and_then(|mut outcomes| outcomes.pop_front())
            .unwrap_or(false)
    }
}

/// Applies a [`NetworkPolicy`] around backend operations.
#[derive(Clone)]
pub struct Network {
    policy: Arc<dyn NetworkPolicy>,
}

impl Network {
    pub fn new(policy: Arc<dyn NetworkPolicy>) -> Self {
        Self { policy }
    }

    /// The default production-shaped simulator.
    pub fn simulated() -> Self {
        Self::new(Arc::new(SimulatedNetwork::new()))
    }

    /// Suspend for the read latency. The default policy never fails reads,
    /// but a policy is allowed to.
    pub async fn read_gate(&self) -> ApiResult<()> {
        tokio::time::sleep(self.policy.delay(OpKind::Read)).await;
        if self.policy.should_fail(OpKind::Read) {
            return Err(ApiError::ServiceUnavailable);
        }
        Ok(())
    }

    /// Suspend for the write latency, then draw the injected failure.
    ///
    /// An `Err` return happens before the underlying write runs; callers
    /// must gate the mutation behind this so injected failures leave the
    /// store untouched.
    pub async fn write_gate(&self) -> ApiResult<()> {
        tokio::time::sleep(self.policy.delay(OpKind::Write)).await;
        if self.policy.should_fail(OpKind::Write) {
            tracing::debug!("injected write failure");
            return Err(ApiError::ServiceUnavailable);
        }
        Ok(())
    }
}
