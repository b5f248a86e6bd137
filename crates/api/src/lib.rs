//! `talentflow-api`: the emulated REST backend.
//!
//! Everything a real hiring-tracker API would do, running in-process: a
//! [`Backend`] request surface over the persistent store, wrapped in a
//! network simulator that injects latency on every operation and transient
//! failures on writes, a query engine for paginated filtered lists, a
//! mutation service that owns slug uniqueness / order renumbering /
//! timeline side effects, and a seed provider that populates an empty
//! store exactly once.

pub mod backend;
pub mod mutations;
pub mod network;
pub mod query;
pub mod seed;

pub use backend::{Backend, CandidateListParams, JobListParams};
pub use mutations::{CreateCandidate, CreateJob, MutationService, UpdateCandidate, UpdateJob};
pub use network::{InstantPolicy, Network, NetworkPolicy, OpKind, ScriptedPolicy, SimulatedNetwork};
pub use seed::{FixtureSeeder, SeedProvider};
