//! FILENAME: core/engine/src/detail.rs
//! PURPOSE: Expandable detail cells.
//! CONTEXT: A column may bundle other (usually hidden) columns into a popover.
//! The popover lists each referenced column's header with the row's raw value.

use crate::column::ColumnSpec;
use crate::value::RawValue;

/// One line of a detail popover.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailEntry {
    pub label: String,
    pub value: RawValue,
}

/// Resolve `column`'s bundled references against the full schema for `row`.
/// References are looked up in the whole schema, so hidden columns work.
pub fn detail_entries<R>(schema: &[ColumnSpec<R>], column: &ColumnSpec<R>, row: &R) -> Vec<DetailEntry> {
    column
        .hidden_column_refs()
        .iter()
        .filter_map(|reference| schema.iter().find(|c| c.id() == reference))
        .map(|referenced| DetailEntry {
            label: referenced.header().to_string(),
            value: referenced.raw(row),
        })
        .collect()
}
