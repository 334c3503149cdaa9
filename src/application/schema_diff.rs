use std::collections::BTreeMap;

use crate::domain::change::{ColumnDescriptor, SchemaChange};

/// Column-level diff between two versions of one table definition.
///
/// Covers every column name in the union of both lists, in first-seen order:
/// old-list order first, then names introduced by the new list in their
/// new-list order. Comparison is exact per attribute (type, nullability,
/// default) — a column identical on both sides produces no entry, so a
/// self-diff yields an empty result.
pub fn diff_columns(old: &[ColumnDescriptor], new: &[ColumnDescriptor]) -> Vec<SchemaChange> {
    let new_index: BTreeMap<&str, &ColumnDescriptor> =
        new.iter().map(|c| (c.name.as_str(), c)).collect();
    let old_index: BTreeMap<&str, &ColumnDescriptor> =
        old.iter().map(|c| (c.name.as_str(), c)).collect();

    let mut changes = Vec::new();

    for old_col in old {
        match new_index.get(old_col.name.as_str()) {
            None => changes.push(SchemaChange::Removed {
                name: old_col.name.clone(),
                old: old_col.clone(),
            }),
            Some(new_col) if !old_col.same_shape(new_col) => {
                changes.push(SchemaChange::Modified {
                    name: old_col.name.clone(),
                    old: old_col.clone(),
                    new: (*new_col).clone(),
                });
            }
            Some(_) => {}
        }
    }

    for new_col in new {
        if !old_index.contains_key(new_col.name.as_str()) {
            changes.push(SchemaChange::Added {
                name: new_col.name.clone(),
                new: new_col.clone(),
            });
        }
    }

    changes
}
