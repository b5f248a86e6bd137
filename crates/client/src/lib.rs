//! `talentflow-client`: the optimistic client layer.
//!
//! Holds a local [`board::BoardState`] mirror of the backend and a
//! [`coordinator::Coordinator`] that applies mutations to the mirror
//! first, confirms them against the backend, and rolls the mirror back
//! from a snapshot when the backend rejects the write.

pub mod board;
pub mod coordinator;

pub use board::BoardState;
pub use coordinator::{Coordinator, MutationError, MutationPhase, MutationRecord, Target};
