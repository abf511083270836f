//! FILENAME: core/engine/src/schema.rs
//! PURPOSE: Schema validation and active-column resolution.
//! CONTEXT: Resolution runs once per schema or dataset change. It drops hidden
//! columns and columns whose exclusion check fires for the current rows.

use std::collections::HashSet;

use log::debug;

use crate::column::ColumnSpec;
use crate::error::SchemaError;

/// Reject schemas that would produce inconsistent visibility or selection state.
pub fn validate_schema<R>(schema: &[ColumnSpec<R>]) -> Result<(), SchemaError> {
    let mut seen = HashSet::with_capacity(schema.len());

    for column in schema {
        if column.id().is_empty() {
            return Err(SchemaError::EmptyId {
                header: column.header().to_string(),
            });
        }
        if !seen.insert(column.id()) {
            return Err(SchemaError::DuplicateId(column.id().to_string()));
        }

        let visibility = column.visibility_default();
        if visibility.disabled && visibility.hidden {
            return Err(SchemaError::DisabledAndHidden(column.id().to_string()));
        }
        if visibility.disabled && visibility.deselected {
            return Err(SchemaError::DisabledAndDeselected(column.id().to_string()));
        }
    }

    for column in schema {
        for reference in column.hidden_column_refs() {
            if reference == column.id() {
                return Err(SchemaError::SelfDetailRef(column.id().to_string()));
            }
            if !seen.contains(reference.as_str()) {
                return Err(SchemaError::UnknownDetailRef {
                    column: column.id().to_string(),
                    reference: reference.clone(),
                });
            }
        }
    }

    Ok(())
}

/// The columns that take part in rendering and export for `rows`, in schema order.
pub fn resolve_active_columns<R>(
    schema: &[ColumnSpec<R>],
    rows: &[R],
) -> Result<Vec<ColumnSpec<R>>, SchemaError> {
    validate_schema(schema)?;

    let active: Vec<ColumnSpec<R>> = schema
        .iter()
        .filter(|column| !column.is_hidden())
        .filter(|column| {
            let excluded = column.is_excluded_for(rows);
            if excluded {
                debug!("column '{}' excluded for current dataset", column.id());
            }
            !excluded
        })
        .cloned()
        .collect();

    debug!(
        "resolved {} of {} columns for {} rows",
        active.len(),
        schema.len(),
        rows.len()
    );

    Ok(active)
}
