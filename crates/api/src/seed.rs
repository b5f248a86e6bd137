//! Fixture seeding: populate an empty store once at startup.
//!
//! The backend treats the provider as opaque; [`FixtureSeeder`] is the
//! default dataset (25 jobs, 1000 candidates, 3 assessments) and tests are
//! free to shrink the counts or supply their own provider.

use async_trait::async_trait;
use rand::Rng;

use talentflow_core::{
    Assessment, AssessmentData, ApiResult, Candidate, CandidateId, Job, JobId, JobStatus,
    NumericRange, Question, QuestionKind, Section, ShowCondition, Stage, unique_slug,
};
use talentflow_store::{Collection, Store};

use crate::mutations::flatten_questions;

/// Populates the store with an initial dataset.
#[async_trait]
pub trait SeedProvider: Send + Sync {
    async fn seed(&self, store: &Store) -> ApiResult<()>;
}

const JOB_TITLES: [&str; 25] = [
    "Backend Engineer",
    "Frontend Engineer",
    "Full Stack Developer",
    "Data Scientist",
    "Data Engineer",
    "Machine Learning Engineer",
    "DevOps Engineer",
    "Site Reliability Engineer",
    "QA Engineer",
    "QA Lead",
    "Engineering Manager",
    "Product Manager",
    "Product Designer",
    "UX Researcher",
    "Technical Writer",
    "Security Engineer",
    "Platform Engineer",
    "Mobile Engineer",
    "iOS Developer",
    "Android Developer",
    "Database Administrator",
    "Solutions Architect",
    "Support Engineer",
    "Developer Advocate",
    "Engineering Intern",
];

const TAG_POOL: [&str; 7] = [
    "remote",
    "onsite",
    "hybrid",
    "full-time",
    "contract",
    "senior",
    "junior",
];

const FIRST_NAMES: [&str; 12] = [
    "Ada", "Alan", "Grace", "Edsger", "Barbara", "Donald", "Margaret", "Dennis", "Radia",
    "Ken", "Frances", "Tim",
];

const LAST_NAMES: [&str; 12] = [
    "Lovelace", "Turing", "Hopper", "Dijkstra", "Liskov", "Knuth", "Hamilton", "Ritchie",
    "Perlman", "Thompson", "Allen", "Berners-Lee",
];

/// Default random fixture dataset.
#[derive(Debug, Clone)]
pub struct FixtureSeeder {
    pub jobs: usize,
    pub candidates: usize,
    pub assessments: usize,
}

impl FixtureSeeder {
    pub fn new() -> Self {
        Self {
            jobs: 25,
            candidates: 1000,
            assessments: 3,
        }
    }

    /// A smaller dataset for tests and demos.
    pub fn small() -> Self {
        Self {
            jobs: 25,
            candidates: 50,
            assessments: 3,
        }
    }

    fn build_jobs(&self) -> Vec<Job> {
        let mut rng = rand::thread_rng();
        let mut slugs: Vec<String> = Vec::with_capacity(self.jobs);

        (0..self.jobs)
            .map(|i| {
                let title = JOB_TITLES[i % JOB_TITLES.len()];
                let slug = unique_slug(title, |s| slugs.iter().any(|taken| taken == s));
                slugs.push(slug.clone());

                let mut tags = std::collections::BTreeSet::new();
                tags.insert(TAG_POOL[rng.gen_range(0..TAG_POOL.len())].to_string());
                tags.insert(TAG_POOL[rng.gen_range(0..TAG_POOL.len())].to_string());

                Job {
                    id: JobId::new(0),
                    title: title.to_string(),
                    slug,
                    status: if rng.gen_range(0..5) == 0 {
                        JobStatus::Archived
                    } else {
                        JobStatus::Active
                    },
                    tags,
                    order: i as u32 + 1,
                }
            })
            .collect()
    }

    fn build_candidates(&self) -> Vec<Candidate> {
        let mut rng = rand::thread_rng();

        (0..self.candidates)
            .map(|i| {
                let first = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
                let last = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())];
                Candidate {
                    id: CandidateId::new(0),
                    name: format!("{first} {last}"),
                    email: format!(
                        "{}.{}{}@example.com",
                        first.to_lowercase(),
                        last.to_lowercase().replace('-', ""),
                        i + 1
                    ),
                    job_id: JobId::new(rng.gen_range(1..=self.jobs.max(1)) as u64),
                    stage: Stage::ALL[rng.gen_range(0..Stage::ALL.len())],
                }
            })
            .collect()
    }

    fn build_assessment_data(job_index: usize) -> AssessmentData {
        let kinds = [
            QuestionKind::Short,
            QuestionKind::Long,
            QuestionKind::Numeric,
            QuestionKind::SingleChoice,
            QuestionKind::MultiChoice,
            QuestionKind::File,
        ];

        let questions: Vec<Question> = (0..12)
            .map(|q| {
                let kind = kinds[q % kinds.len()];
                Question {
                    id: format!("q{}", q + 1),
                    label: format!("Question {} for assessment {}", q + 1, job_index),
                    kind,
                    required: q % 3 == 0,
                    options: match kind {
                        QuestionKind::SingleChoice | QuestionKind::MultiChoice => vec![
                            "Option A".to_string(),
                            "Option B".to_string(),
                            "Option C".to_string(),
                        ],
                        _ => Vec::new(),
                    },
                    range: (kind == QuestionKind::Numeric)
                        .then_some(NumericRange { min: 0, max: 100 }),
                    condition: (q == 11).then(|| ShowCondition {
                        depends_on: "q4".to_string(),
                        value: serde_json::json!("Option A"),
                    }),
                }
            })
            .collect();

        let (first_half, second_half) = {
            let mut all = questions;
            let tail = all.split_off(6);
            (all, tail)
        };

        AssessmentData {
            title: format!("Assessment {job_index}"),
            sections: vec![
                Section {
                    title: "General".to_string(),
                    questions: first_half,
                },
                Section {
                    title: "Role specific".to_string(),
                    questions: second_half,
                },
            ],
        }
    }
}

impl Default for FixtureSeeder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SeedProvider for FixtureSeeder {
    async fn seed(&self, store: &Store) -> ApiResult<()> {
        let jobs = self.build_jobs();
        store.bulk_add_values(Collection::Jobs, &jobs).await?;

        let candidates = self.build_candidates();
        store
            .bulk_add_values(Collection::Candidates, &candidates)
            .await?;

        for job_index in 1..=self.assessments.min(self.jobs) {
            let data = Self::build_assessment_data(job_index);
            let rows = flatten_questions(JobId::new(job_index as u64), &data);
            let assessment = Assessment {
                id: 0u64.into(),
                job_id: JobId::new(job_index as u64),
                data,
            };
            store
                .add_value(Collection::Assessments, &assessment)
                .await?;
            store.bulk_add_values(Collection::Questions, &rows).await?;
        }

        tracing::info!(
            jobs = self.jobs,
            candidates = self.candidates,
            assessments = self.assessments,
            "seeded empty store"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeds_the_configured_counts() {
        let store = Store::in_memory();
        FixtureSeeder::small().seed(&store).await.unwrap();

        assert_eq!(store.count(Collection::Jobs).await.unwrap(), 25);
        assert_eq!(store.count(Collection::Candidates).await.unwrap(), 50);
        assert_eq!(store.count(Collection::Assessments).await.unwrap(), 3);
        assert_eq!(store.count(Collection::Questions).await.unwrap(), 36);
    }

    #[tokio::test]
    async fn seeded_jobs_have_distinct_slugs_and_contiguous_orders() {
        let store = Store::in_memory();
        FixtureSeeder::small().seed(&store).await.unwrap();

        let jobs: Vec<Job> = store.scan_as(Collection::Jobs).await.unwrap();
        let mut slugs: Vec<_> = jobs.iter().map(|j| j.slug.clone()).collect();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), jobs.len());

        let mut orders: Vec<_> = jobs.iter().map(|j| j.order).collect();
        orders.sort();
        assert_eq!(orders, (1..=25).collect::<Vec<_>>());
    }
}
