//! Data access. Every function is generic over `ConnectionTrait` so callers can pass the pool
//! or an open `DatabaseTransaction`.

use sea_orm::{DbErr, SqlErr};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

pub mod add_on_categories;
pub mod add_ons;
pub mod admins;
pub mod agents;
pub mod conversations;
pub mod coupons;
pub mod customer_services;
pub mod customers;
pub mod employees;
pub mod packages;
pub mod quotes;
pub mod schedules;
pub mod services;
pub mod sms_crons;
pub mod timeslots;
pub mod vehicles;

const DEFAULT_PAGE_SIZE: u64 = 10;
const MAX_PAGE_SIZE: u64 = 100;

/// `current` is 1-based.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PageRequest {
    pub current: Option<u64>,
    pub page_size: Option<u64>,
}

impl PageRequest {
    pub fn new(current: u64, page_size: u64) -> Self {
        Self {
            current: Some(current),
            page_size: Some(page_size),
        }
    }

    pub fn current(&self) -> u64 {
        self.current.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// Zero-based index for `Paginator::fetch_page`.
    pub fn page_index(&self) -> u64 {
        self.current() - 1
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone)]
pub struct Paged<T> {
    pub rows: Vec<T>,
    pub count: u64,
}

/// `%term%` for LIKE filters; `None` when the term is blank.
pub fn like_pattern(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|term| !term.is_empty())
        .map(|term| format!("%{}%", term))
}

/// Splits a join-table sync into ids to remove and ids to add. Duplicates in `wanted` collapse.
pub fn diff_ids(existing: &[i32], wanted: &[i32]) -> (Vec<i32>, Vec<i32>) {
    let removed = existing
        .iter()
        .copied()
        .filter(|id| !wanted.contains(id))
        .collect();
    let mut added: Vec<i32> = Vec::new();
    for id in wanted {
        if !existing.contains(id) && !added.contains(id) {
            added.push(*id);
        }
    }
    (removed, added)
}

/// True when the write lost a race against a unique key.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_clamps_values() {
        let page = PageRequest {
            current: Some(0),
            page_size: Some(10_000),
        };
        assert_eq!(page.current(), 1);
        assert_eq!(page.page_index(), 0);
        assert_eq!(page.page_size(), MAX_PAGE_SIZE);
    }

    #[test]
    fn diff_ids_splits_removed_and_added() {
        let (removed, added) = diff_ids(&[1, 2, 3], &[2, 4, 4]);
        assert_eq!(removed, vec![1, 3]);
        assert_eq!(added, vec![4]);
    }

    #[test]
    fn like_pattern_skips_blank_terms() {
        assert_eq!(like_pattern(Some("  ")), None);
        assert_eq!(like_pattern(Some("jo")), Some("%jo%".to_string()));
    }
}
