use std::cmp::Ordering;

use crate::normalize::parse_date_time;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Per-table sort state with three-state cycling. Repeated activation of the
/// same column walks ascending -> descending -> none; in the "none" state the
/// column resets, so the next activation of any column starts at ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState<C: Copy + PartialEq> {
    column: Option<C>,
    direction: SortDirection,
}

impl<C: Copy + PartialEq> Default for SortState<C> {
    fn default() -> Self {
        Self {
            column: None,
            direction: SortDirection::Ascending,
        }
    }
}

impl<C: Copy + PartialEq> SortState<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active (column, direction) pair, or `None` when unsorted.
    pub fn active(&self) -> Option<(C, SortDirection)> {
        self.column.map(|c| (c, self.direction))
    }

    /// Advance the cycle for a column activation.
    pub fn cycle(&mut self, column: C) {
        match self.column {
            Some(current) if current == column => match self.direction {
                SortDirection::Ascending => self.direction = SortDirection::Descending,
                SortDirection::Descending => {
                    self.column = None;
                    self.direction = SortDirection::Ascending;
                }
            },
            _ => {
                self.column = Some(column);
                self.direction = SortDirection::Ascending;
            }
        }
    }

    pub fn reset(&mut self) {
        self.column = None;
        self.direction = SortDirection::Ascending;
    }
}

/// How a column's cell text is turned into a comparison key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Number,
    Date,
}

/// Comparable key for one cell. Numbers and dates that fail to parse default
/// to zero / epoch zero instead of erroring.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Text(String),
    Number(f64),
    Date(i64),
}

impl SortKey {
    pub fn from_cell(value: &str, kind: ColumnKind) -> Self {
        match kind {
            ColumnKind::Text => SortKey::Text(value.to_lowercase()),
            ColumnKind::Number => SortKey::Number(value.trim().parse::<f64>().unwrap_or(0.0)),
            ColumnKind::Date => SortKey::Date(
                parse_date_time(value).map_or(0, |dt| dt.and_utc().timestamp_millis()),
            ),
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (SortKey::Date(a), SortKey::Date(b)) => a.cmp(b),
            // Mixed kinds only happen on caller error; keep the input order.
            _ => Ordering::Equal,
        }
    }
}

/// Sort a copy of `rows` by the key extractor. `sort_by` is stable, so equal
/// keys preserve their prior relative order.
pub fn sort_rows<T: Clone>(
    rows: &[T],
    direction: SortDirection,
    key: impl Fn(&T) -> SortKey,
) -> Vec<T> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = key(a).compare(&key(b));
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    sorted
}

/// Apply the current sort state to `rows`: an ordered copy when a sort is
/// active, the original order otherwise.
pub fn apply_sort<T: Clone, C: Copy + PartialEq>(
    rows: &[T],
    state: &SortState<C>,
    key: impl Fn(&T, C) -> SortKey,
) -> Vec<T> {
    match state.active() {
        Some((column, direction)) => sort_rows(rows, direction, |row| key(row, column)),
        None => rows.to_vec(),
    }
}

/// Zero-based page window over `rows`. The end is clamped to the collection
/// length; a start past the end yields an empty slice, never an error.
pub fn paginate<T>(rows: &[T], page_index: usize, page_size: usize) -> &[T] {
    let start = page_index.saturating_mul(page_size);
    if start >= rows.len() {
        return &[];
    }
    let end = (start + page_size).min(rows.len());
    &rows[start..end]
}

/// Page count for a footer: at least 1 even for an empty collection.
pub fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    total.div_ceil(page_size).max(1)
}
