//! Pagination parameters and the metadata returned alongside a page.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PER_PAGE: u64 = 20;
pub const MAX_PER_PAGE: u64 = 100;

/// Order of events by `created_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
  Ascending,
  /// Newest first.
  #[default]
  Descending,
}

impl SortOrder {
  /// `1` is ascending; anything else falls back to descending.
  pub fn from_direction(direction: i64) -> Self {
    if direction == 1 { Self::Ascending } else { Self::Descending }
  }

  pub fn direction(self) -> i64 {
    match self {
      Self::Ascending => 1,
      Self::Descending => -1,
    }
  }
}

/// A normalised page request. Construct with [`Pageable::new`] so the
/// defaults and bounds always hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pageable {
  pub page:     u64,
  pub per_page: u64,
  pub sort:     SortOrder,
}

impl Pageable {
  /// Missing or non-positive values fall back to page 1 / 20 per page.
  pub fn new(page: Option<i64>, per_page: Option<i64>, sort: Option<i64>) -> Self {
    let positive = |v: Option<i64>| v.filter(|n| *n > 0).map(|n| n.unsigned_abs());
    Self {
      page:     positive(page).unwrap_or(DEFAULT_PAGE),
      per_page: positive(per_page)
        .unwrap_or(DEFAULT_PER_PAGE)
        .min(MAX_PER_PAGE),
      sort:     sort.map(SortOrder::from_direction).unwrap_or_default(),
    }
  }

  /// Rows to skip before this page starts.
  pub fn offset(&self) -> u64 {
    (self.page - 1).saturating_mul(self.per_page)
  }
}

impl Default for Pageable {
  fn default() -> Self { Self::new(None, None, None) }
}

/// Pagination metadata. `prev` and `next` are `0` when no such page exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationData {
  pub total:      u64,
  pub page:       u64,
  pub per_page:   u64,
  pub prev:       u64,
  pub next:       u64,
  pub total_page: u64,
}

impl PaginationData {
  pub fn new(total: u64, pageable: &Pageable) -> Self {
    let total_page = total.div_ceil(pageable.per_page);
    let page = pageable.page;
    Self {
      total,
      page,
      per_page: pageable.per_page,
      prev: if page > 1 { page - 1 } else { 0 },
      next: if page < total_page { page + 1 } else { 0 },
      total_page,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_apply_when_absent_or_non_positive() {
    let p = Pageable::new(None, None, None);
    assert_eq!((p.page, p.per_page, p.sort), (1, 20, SortOrder::Descending));

    let p = Pageable::new(Some(0), Some(-5), Some(0));
    assert_eq!((p.page, p.per_page, p.sort), (1, 20, SortOrder::Descending));
  }

  #[test]
  fn sort_direction_is_selectable() {
    assert_eq!(Pageable::new(None, None, Some(1)).sort, SortOrder::Ascending);
    assert_eq!(Pageable::new(None, None, Some(-1)).sort, SortOrder::Descending);
  }

  #[test]
  fn per_page_is_capped() {
    assert_eq!(Pageable::new(None, Some(10_000), None).per_page, MAX_PER_PAGE);
  }

  #[test]
  fn offset_skips_previous_pages() {
    assert_eq!(Pageable::new(Some(3), Some(10), None).offset(), 20);
    assert_eq!(Pageable::default().offset(), 0);
  }

  #[test]
  fn metadata_for_middle_page() {
    let meta = PaginationData::new(25, &Pageable::new(Some(2), Some(10), None));
    assert_eq!(meta, PaginationData {
      total:      25,
      page:       2,
      per_page:   10,
      prev:       1,
      next:       3,
      total_page: 3,
    });
  }

  #[test]
  fn metadata_for_single_and_empty_pages() {
    let meta = PaginationData::new(2, &Pageable::new(Some(1), Some(10), None));
    assert_eq!((meta.prev, meta.next, meta.total_page), (0, 0, 1));

    let meta = PaginationData::new(0, &Pageable::default());
    assert_eq!((meta.prev, meta.next, meta.total_page), (0, 0, 0));
  }

  #[test]
  fn metadata_serialises_camel_case() {
    let meta = PaginationData::new(11, &Pageable::new(Some(1), Some(10), None));
    let json = serde_json::to_value(meta).unwrap();
    assert_eq!(json["perPage"], 10);
    assert_eq!(json["totalPage"], 2);
    assert_eq!(json["next"], 2);
  }
}
