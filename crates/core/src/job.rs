//! Job entity and slug derivation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::id::JobId;

/// Job lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Active,
    Archived,
}

/// A job opening in the hiring pipeline.
///
/// Invariants maintained by the mutation service:
/// - `slug` is unique across all jobs at every observable instant;
/// - `order` values form a contiguous `1..N` sequence immediately after a
///   reorder (dense-ish but not required to be contiguous otherwise).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub slug: String,
    pub status: JobStatus,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub order: u32,
}

/// Acknowledgement returned by a successful reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderAck {
    pub from_order: u32,
    pub to_order: u32,
}

/// Derive a URL-safe slug from a title: lowercased, with every run of
/// non-alphanumeric characters collapsed into a single interior hyphen.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_gap = false;
    for ch in title.chars() {
        if ch.is_alphanumeric() {
            if pending_gap && !slug.is_empty() {
                slug.push('-');
            }
            pending_gap = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_gap = true;
        }
    }
    slug
}

/// Pick a slug for `title` that `is_taken` does not already claim, appending
/// `-1`, `-2`, ... to the derived base until free.
pub fn unique_slug(title: &str, is_taken: impl Fn(&str) -> bool) -> String {
    let base = slugify(title);
    if !is_taken(&base) {
        return base;
    }
    let mut n = 1u32;
    loop {
        let candidate = format!("{base}-{n}");
        if !is_taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
