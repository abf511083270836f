//! FILENAME: core/engine/src/row_model.rs
//! PURPOSE: Read-only views over the raw rows: filtering, sort keys, sorting.
//! CONTEXT: The row model never mutates or reorders the source slice. Every
//! view is a list of indices into it, so selection can stay keyed by the
//! original position.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::column::{ColumnSpec, RenderTarget};
use crate::config::CurrencyConfig;
use crate::value::{DisplayValue, RawValue};

// ============================================================================
// SORT TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// The single sorted column, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    pub column_id: String,
    pub direction: SortDirection,
}

/// Comparable form of a cell.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Number(f64),
    /// Case-folded display text.
    Text(String),
    Missing,
}

impl SortKey {
    pub fn from_raw(raw: &RawValue) -> Self {
        let blank = match raw {
            RawValue::Null => true,
            RawValue::Text(s) => s.trim().is_empty(),
            RawValue::Number(_) => false,
        };
        if blank {
            return SortKey::Missing;
        }
        match crate::format::format_value(raw) {
            DisplayValue::Number(n) => SortKey::Number(n),
            DisplayValue::Text(s) => SortKey::Text(s.to_lowercase()),
        }
    }

    /// Numbers before text. Missing values are not ordered here; callers keep
    /// them last regardless of direction.
    fn compare_present(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

// ============================================================================
// ROW MODEL
// ============================================================================

/// Borrowed view of one dataset under the active columns.
pub struct RowModel<'a, R> {
    rows: &'a [R],
    columns: &'a [ColumnSpec<R>],
    currency: &'a CurrencyConfig,
}

impl<'a, R> RowModel<'a, R> {
    pub fn new(rows: &'a [R], columns: &'a [ColumnSpec<R>], currency: &'a CurrencyConfig) -> Self {
        RowModel {
            rows,
            columns,
            currency,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, column_id: &str) -> Option<&'a ColumnSpec<R>> {
        self.columns.iter().find(|c| c.id() == column_id)
    }

    pub fn sort_key(&self, index: usize, column: &ColumnSpec<R>) -> SortKey {
        SortKey::from_raw(&column.raw(&self.rows[index]))
    }

    /// Interactive rendered text, lower-cased for case-insensitive matching.
    pub fn filter_text(&self, index: usize, column: &ColumnSpec<R>) -> String {
        column
            .render(&self.rows[index], RenderTarget::Interactive, self.currency)
            .filter_text()
            .to_lowercase()
    }

    /// Indices of rows passing every column filter and the global search.
    ///
    /// `filters` maps column ids to needles; blank needles and filters on
    /// columns outside the active set are ignored. `searchable` lists the
    /// column ids the global search looks at.
    pub fn matching_indices(
        &self,
        filters: &BTreeMap<String, String>,
        global_search: &str,
        searchable: &[&str],
    ) -> Vec<usize> {
        let column_filters: Vec<(&ColumnSpec<R>, String)> = filters
            .iter()
            .filter(|(_, needle)| !needle.trim().is_empty())
            .filter_map(|(id, needle)| self.column(id).map(|c| (c, needle.trim().to_lowercase())))
            .collect();

        let global = global_search.trim().to_lowercase();
        let search_columns: Vec<&ColumnSpec<R>> = if global.is_empty() {
            Vec::new()
        } else {
            searchable.iter().filter_map(|id| self.column(id)).collect()
        };

        (0..self.rows.len())
            .filter(|&index| {
                column_filters
                    .iter()
                    .all(|(column, needle)| self.filter_text(index, column).contains(needle.as_str()))
            })
            .filter(|&index| {
                global.is_empty()
                    || search_columns
                        .iter()
                        .any(|column| self.filter_text(index, column).contains(global.as_str()))
            })
            .collect()
    }

    /// Stable sort of `indices`; missing values stay last in both directions.
    pub fn sorted(&self, indices: Vec<usize>, sort: Option<&SortState>) -> Vec<usize> {
        let Some(sort) = sort else {
            return indices;
        };
        let Some(column) = self.column(&sort.column_id) else {
            return indices;
        };

        let mut keyed: Vec<(usize, SortKey)> = indices
            .into_iter()
            .map(|index| (index, self.sort_key(index, column)))
            .collect();

        keyed.sort_by(|(_, a), (_, b)| match (a, b) {
            (SortKey::Missing, SortKey::Missing) => Ordering::Equal,
            (SortKey::Missing, _) => Ordering::Greater,
            (_, SortKey::Missing) => Ordering::Less,
            _ => match sort.direction {
                SortDirection::Ascending => a.compare_present(b),
                SortDirection::Descending => b.compare_present(a),
            },
        });

        keyed.into_iter().map(|(index, _)| index).collect()
    }

    /// Distinct display texts of a column with occurrence counts, most frequent first.
    pub fn distinct_values(&self, column: &ColumnSpec<R>) -> Vec<(String, usize)> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut order: Vec<String> = Vec::new();

        for row in self.rows {
            let text = column.render(row, RenderTarget::Interactive, self.currency).text;
            let count = counts.entry(text.clone()).or_insert(0);
            if *count == 0 {
                order.push(text);
            }
            *count += 1;
        }

        let mut values: Vec<(String, usize)> = order
            .into_iter()
            .map(|text| {
                let count = counts.get(&text).copied().unwrap_or(0);
                (text, count)
            })
            .collect();
        values.sort_by(|a, b| b.1.cmp(&a.1));
        values
    }
}
