use serde::{Deserialize, Serialize};

use crate::domain::change::{ChangeKind, DataChange, SchemaChange};

/// One table's full diff: every column change and every row change between
/// the two compared versions.
///
/// A `TableChange` with both lists empty carries no information and is never
/// materialised into a [`crate::ComparisonDocument`] — the assembly stage
/// counts it as unchanged instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableChange {
    pub name: String,
    #[serde(default)]
    pub schema: Vec<SchemaChange>,
    #[serde(default)]
    pub data: Vec<DataChange>,
}

impl TableChange {
    pub fn is_empty(&self) -> bool {
        self.schema.is_empty() && self.data.is_empty()
    }

    /// Total schema + data changes, used for section header labels.
    pub fn change_count(&self) -> usize {
        self.schema.len() + self.data.len()
    }

    /// Number of data changes of the given kind.
    pub fn data_count(&self, kind: ChangeKind) -> usize {
        self.data.iter().filter(|c| c.kind() == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::change::RowMap;
    use serde_json::json;

    #[test]
    fn empty_table_change_reports_empty() {
        let tc = TableChange {
            name: "t".to_string(),
            schema: vec![],
            data: vec![],
        };
        assert!(tc.is_empty());
        assert_eq!(tc.change_count(), 0);
    }

    #[test]
    fn kind_counts_partition_the_data_list() {
        let row: RowMap = [("id".to_string(), json!(1))].into();
        let tc = TableChange {
            name: "t".to_string(),
            schema: vec![],
            data: vec![
                DataChange::Added { new: row.clone() },
                DataChange::Removed { old: row.clone() },
                DataChange::Modified {
                    old: row.clone(),
                    new: [("id".to_string(), json!(2))].into(),
                },
            ],
        };
        let total = tc.data_count(ChangeKind::Added)
            + tc.data_count(ChangeKind::Removed)
            + tc.data_count(ChangeKind::Modified);
        assert_eq!(total, tc.data.len());
    }
}
