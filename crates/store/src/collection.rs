//! The six named collections.

/// A named set of records of one entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Jobs,
    Candidates,
    Timelines,
    Assessments,
    Questions,
    Submissions,
}

impl Collection {
    pub const ALL: [Collection; 6] = [
        Collection::Jobs,
        Collection::Candidates,
        Collection::Timelines,
        Collection::Assessments,
        Collection::Questions,
        Collection::Submissions,
    ];

    /// Stable storage name, used as the partition key in SQLite.
    pub fn name(self) -> &'static str {
        match self {
            Collection::Jobs => "jobs",
            Collection::Candidates => "candidates",
            Collection::Timelines => "timelines",
            Collection::Assessments => "assessments",
            Collection::Questions => "questions",
            Collection::Submissions => "submissions",
        }
    }
}

impl core::fmt::Display for Collection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
