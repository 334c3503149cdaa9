use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Type alias for a database row represented as a sorted map of column name → JSON value.
pub type RowMap = BTreeMap<String, Value>;

// ─── Change kind ──────────────────────────────────────────────────────────────

/// Classification of a single change.
///
/// Derived from variant shape, never stored on the wire: an entry with only a
/// `new` side is `Added`, only an `old` side is `Removed`, both sides is
/// `Modified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
            ChangeKind::Modified => "modified",
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Column descriptor ────────────────────────────────────────────────────────

/// Immutable snapshot of one column's shape in one table version.
///
/// `default` holds the raw SQL default expression as reported by the engine
/// (`None` when the column declares no default).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub col_type: String,
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ColumnDescriptor {
    /// Attribute-level equality, ignoring the name (both sides of a schema
    /// change share it by construction).
    pub fn same_shape(&self, other: &ColumnDescriptor) -> bool {
        self.col_type == other.col_type
            && self.nullable == other.nullable
            && self.default == other.default
    }
}

// ─── Schema change ────────────────────────────────────────────────────────────

/// One column's delta between an old and a new table version.
///
/// Modelled as a tagged union so every consumer matches exhaustively; the
/// `{ name, old?, new? }` wire form is handled by [`SchemaChangeWire`] at the
/// serde boundary, which rejects entries carrying neither side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SchemaChangeWire", into = "SchemaChangeWire")]
pub enum SchemaChange {
    Added {
        name: String,
        new: ColumnDescriptor,
    },
    Removed {
        name: String,
        old: ColumnDescriptor,
    },
    Modified {
        name: String,
        old: ColumnDescriptor,
        new: ColumnDescriptor,
    },
}

impl SchemaChange {
    pub fn name(&self) -> &str {
        match self {
            SchemaChange::Added { name, .. }
            | SchemaChange::Removed { name, .. }
            | SchemaChange::Modified { name, .. } => name,
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            SchemaChange::Added { .. } => ChangeKind::Added,
            SchemaChange::Removed { .. } => ChangeKind::Removed,
            SchemaChange::Modified { .. } => ChangeKind::Modified,
        }
    }

    /// Old-version descriptor, absent for added columns.
    pub fn old(&self) -> Option<&ColumnDescriptor> {
        match self {
            SchemaChange::Added { .. } => None,
            SchemaChange::Removed { old, .. } | SchemaChange::Modified { old, .. } => Some(old),
        }
    }

    /// New-version descriptor, absent for removed columns.
    pub fn new(&self) -> Option<&ColumnDescriptor> {
        match self {
            SchemaChange::Removed { .. } => None,
            SchemaChange::Added { new, .. } | SchemaChange::Modified { new, .. } => Some(new),
        }
    }
}

/// Wire form of [`SchemaChange`]: presence/absence of `old`/`new` encodes the
/// kind. Column shape objects drop the redundant inner name.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SchemaChangeWire {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    old: Option<ColumnShapeWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    new: Option<ColumnShapeWire>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ColumnShapeWire {
    #[serde(rename = "type")]
    col_type: String,
    nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<Value>,
}

impl ColumnShapeWire {
    fn into_descriptor(self, name: &str) -> ColumnDescriptor {
        ColumnDescriptor {
            name: name.to_string(),
            col_type: self.col_type,
            nullable: self.nullable,
            default: self.default,
        }
    }

    fn from_descriptor(d: ColumnDescriptor) -> Self {
        ColumnShapeWire {
            col_type: d.col_type,
            nullable: d.nullable,
            default: d.default,
        }
    }
}

impl From<SchemaChange> for SchemaChangeWire {
    fn from(change: SchemaChange) -> Self {
        match change {
            SchemaChange::Added { name, new } => SchemaChangeWire {
                name,
                old: None,
                new: Some(ColumnShapeWire::from_descriptor(new)),
            },
            SchemaChange::Removed { name, old } => SchemaChangeWire {
                name,
                old: Some(ColumnShapeWire::from_descriptor(old)),
                new: None,
            },
            SchemaChange::Modified { name, old, new } => SchemaChangeWire {
                name,
                old: Some(ColumnShapeWire::from_descriptor(old)),
                new: Some(ColumnShapeWire::from_descriptor(new)),
            },
        }
    }
}

impl TryFrom<SchemaChangeWire> for SchemaChange {
    type Error = String;

    fn try_from(wire: SchemaChangeWire) -> Result<Self, Self::Error> {
        match (wire.old, wire.new) {
            (None, Some(new)) => Ok(SchemaChange::Added {
                new: new.into_descriptor(&wire.name),
                name: wire.name,
            }),
            (Some(old), None) => Ok(SchemaChange::Removed {
                old: old.into_descriptor(&wire.name),
                name: wire.name,
            }),
            (Some(old), Some(new)) => Ok(SchemaChange::Modified {
                old: old.into_descriptor(&wire.name),
                new: new.into_descriptor(&wire.name),
                name: wire.name,
            }),
            (None, None) => Err(format!(
                "schema change for column '{}' has neither old nor new side",
                wire.name
            )),
        }
    }
}

// ─── Data change ──────────────────────────────────────────────────────────────

/// One row's delta between an old and a new row set, keyed upstream by the
/// table's identity columns. The row is the unit of reporting: any differing
/// field makes the whole row `Modified`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "DataChangeWire", into = "DataChangeWire")]
pub enum DataChange {
    Added { new: RowMap },
    Removed { old: RowMap },
    Modified { old: RowMap, new: RowMap },
}

impl DataChange {
    pub fn kind(&self) -> ChangeKind {
        match self {
            DataChange::Added { .. } => ChangeKind::Added,
            DataChange::Removed { .. } => ChangeKind::Removed,
            DataChange::Modified { .. } => ChangeKind::Modified,
        }
    }

    pub fn old(&self) -> Option<&RowMap> {
        match self {
            DataChange::Added { .. } => None,
            DataChange::Removed { old } | DataChange::Modified { old, .. } => Some(old),
        }
    }

    pub fn new(&self) -> Option<&RowMap> {
        match self {
            DataChange::Removed { .. } => None,
            DataChange::Added { new } | DataChange::Modified { new, .. } => Some(new),
        }
    }

    /// Names of the fields whose values actually differ.
    ///
    /// Empty for `Added`/`Removed` (the whole row differs, not individual
    /// fields). For `Modified`, walks the union of both sides' field names
    /// with exact equality; a field present on only one side counts as
    /// differing.
    pub fn changed_fields(&self) -> Vec<&str> {
        match self {
            DataChange::Added { .. } | DataChange::Removed { .. } => Vec::new(),
            DataChange::Modified { old, new } => {
                let mut fields = Vec::new();
                for name in old.keys().chain(new.keys()) {
                    if fields.contains(&name.as_str()) {
                        continue;
                    }
                    if old.get(name) != new.get(name) {
                        fields.push(name.as_str());
                    }
                }
                fields
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DataChangeWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    old: Option<RowMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    new: Option<RowMap>,
}

impl From<DataChange> for DataChangeWire {
    fn from(change: DataChange) -> Self {
        match change {
            DataChange::Added { new } => DataChangeWire {
                old: None,
                new: Some(new),
            },
            DataChange::Removed { old } => DataChangeWire {
                old: Some(old),
                new: None,
            },
            DataChange::Modified { old, new } => DataChangeWire {
                old: Some(old),
                new: Some(new),
            },
        }
    }
}

impl TryFrom<DataChangeWire> for DataChange {
    type Error = String;

    fn try_from(wire: DataChangeWire) -> Result<Self, Self::Error> {
        match (wire.old, wire.new) {
            (None, Some(new)) => Ok(DataChange::Added { new }),
            (Some(old), None) => Ok(DataChange::Removed { old }),
            (Some(old), Some(new)) => Ok(DataChange::Modified { old, new }),
            (None, None) => Err("data change has neither old nor new row".to_string()),
        }
    }
}
