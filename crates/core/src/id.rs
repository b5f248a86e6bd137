//! Typed record identifiers.
//!
//! Every persisted entity is keyed by a positive integer assigned by the
//! store on creation (auto-increment per collection, starting at 1). The
//! newtypes below keep ids from different collections from being mixed up
//! at compile time while serializing as the bare number on the wire.

use serde::{Deserialize, Serialize};

macro_rules! record_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub fn value(self) -> u64 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

record_id!(
    /// Job identifier.
    JobId
);
record_id!(
    /// Candidate identifier.
    CandidateId
);
record_id!(
    /// Timeline event identifier.
    TimelineEventId
);
record_id!(
    /// Assessment identifier (the store key; `job_id` acts as the logical key).
    AssessmentId
);
record_id!(
    /// Submission identifier.
    SubmissionId
);
