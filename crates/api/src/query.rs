//! Query engine: search, exact-match filters, page slicing.
//!
//! Operates on raw JSON rows so one implementation serves every
//! collection; the backend deserializes the sliced page into typed items.
//! The source rows are consumed by value; the engine never mutates the
//! stored collection.

use serde_json::Value as JsonValue;

use talentflow_core::Page;

/// Per-collection query configuration.
#[derive(Debug, Clone, Copy)]
pub struct CollectionShape {
    /// Text fields searched case-insensitively (substring match, OR'd).
    pub search_fields: &'static [&'static str],
    pub default_page_size: u32,
}

pub const JOBS: CollectionShape = CollectionShape {
    search_fields: &["title"],
    default_page_size: 10,
};

pub const CANDIDATES: CollectionShape = CollectionShape {
    search_fields: &["name", "email"],
    default_page_size: 50,
};

/// Generic list parameters after the backend has lowered its typed params.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub search: Option<String>,
    pub filters: Vec<(String, JsonValue)>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Run a list query: search, filter, count, slice.
///
/// `total` is the count after filtering; the slice is
/// `[(page-1)*pageSize, page*pageSize)` over the filtered rows in their
/// incoming order. Pages beyond the end yield empty `items` with the
/// correct `total`.
pub fn list(rows: Vec<JsonValue>, shape: &CollectionShape, params: &ListParams) -> Page<JsonValue> {
    let mut rows = rows;

    if let Some(search) = params.search.as_deref().filter(|s| !s.is_empty()) {
        let needle = search.to_lowercase();
        rows.retain(|row| {
            shape.search_fields.iter().any(|field| {
                row.get(*field)
                    .and_then(JsonValue::as_str)
                    .is_some_and(|text| text.to_lowercase().contains(&needle))
            })
        });
    }

    for (field, value) in &params.filters {
        rows.retain(|row| row.get(field.as_str()) == Some(value));
    }

    let total = rows.len() as u64;
    let page = params.page.unwrap_or(1).max(1);
    let page_size = params.page_size.unwrap_or(shape.default_page_size).max(1);

    let start = (page as usize - 1).saturating_mul(page_size as usize);
    let items = rows
        .into_iter()
        .skip(start)
        .take(page_size as usize)
        .collect();

    Page {
        items,
        total,
        page,
        page_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn jobs(n: usize) -> Vec<JsonValue> {
        (1..=n)
            .map(|i| {
                json!({
                    "id": i,
                    "title": format!("Job {i}"),
                    "status": if i % 2 == 0 { "archived" } else { "active" },
                })
            })
            .collect()
    }

    #[test]
    fn defaults_to_page_one_with_the_shape_size() {
        let page = list(jobs(25), &JOBS, &ListParams::default());
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.total, 25);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 10);
        assert_eq!(page.items[0]["id"], 1);
    }

    #[test]
    fn out_of_range_page_is_empty_with_correct_total() {
        let params = ListParams {
            page: Some(9),
            ..Default::default()
        };
        let page = list(jobs(25), &JOBS, &params);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 25);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let params = ListParams {
            search: Some("jOb 2".into()),
            ..Default::default()
        };
        let page = list(jobs(25), &JOBS, &params);
        // "Job 2" and "Job 20".."Job 25"
        assert_eq!(page.total, 7);
    }

    #[test]
    fn search_ors_across_candidate_fields() {
        let rows = vec![
            json!({"name": "Ada Lovelace", "email": "ada@example.com"}),
            json!({"name": "Grace Hopper", "email": "grace@ada-labs.io"}),
            json!({"name": "Alan Turing", "email": "alan@example.com"}),
        ];
        let params = ListParams {
            search: Some("ada".into()),
            ..Default::default()
        };
        let page = list(rows, &CANDIDATES, &params);
        assert_eq!(page.total, 2);
    }

    #[test]
    fn filters_are_exact_match_and_idempotent() {
        let params = ListParams {
            filters: vec![("status".into(), json!("active"))],
            page_size: Some(100),
            ..Default::default()
        };
        let first = list(jobs(25), &JOBS, &params);
        let second = list(jobs(25), &JOBS, &params);
        assert_eq!(first, second);
        assert_eq!(first.total, 13);
        assert!(first
            .items
            .iter()
            .all(|row| row["status"] == "active"));
    }

    #[test]
    fn slice_preserves_pre_slice_order() {
        let params = ListParams {
            page: Some(2),
            ..Default::default()
        };
        let page = list(jobs(25), &JOBS, &params);
        let ids: Vec<_> = page.items.iter().map(|r| r["id"].as_u64().unwrap()).collect();
        assert_eq!(ids, (11..=20).collect::<Vec<_>>());
    }
}
