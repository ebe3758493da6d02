use std::cmp::Ordering;

use crate::scoring::ScoredVehicle;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 200;

/// How the scored working set is ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Composite score ascending (most sustainable first)
    #[default]
    Composite,
    /// The table's own "Final Score" column, descending
    Precomputed,
}

/// A 1-based page request. Construction clamps out-of-range input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    page: usize,
    page_size: usize,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Paging {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Half-open index range `[(page-1)*size, page*size)`
    fn bounds(&self) -> (usize, usize) {
        let start = (self.page - 1).saturating_mul(self.page_size);
        (start, start.saturating_add(self.page_size))
    }
}

fn by_composite(a: &ScoredVehicle, b: &ScoredVehicle) -> Ordering {
    a.score.total_cmp(&b.score)
}

fn by_final_score(a: &ScoredVehicle, b: &ScoredVehicle) -> Ordering {
    match (a.record.final_score, b.record.final_score) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort in place; exact ties keep source row order.
pub fn sort_scored(scored: &mut [ScoredVehicle], mode: SortMode) {
    scored.sort_by(|a, b| {
        let primary = match mode {
            SortMode::Composite => by_composite(a, b),
            SortMode::Precomputed => by_final_score(a, b),
        };
        primary.then_with(|| a.record.row.cmp(&b.record.row))
    });
}

/// Slice out one page. Pages past the end are empty.
pub fn paginate<T>(items: Vec<T>, paging: Paging) -> Vec<T> {
    let (start, end) = paging.bounds();
    if start >= items.len() {
        return Vec::new();
    }
    let end = end.min(items.len());
    items.into_iter().skip(start).take(end - start).collect()
}
