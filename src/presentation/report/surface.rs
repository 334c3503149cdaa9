//! The rendering-surface seam.
//!
//! The renderer mutates the presentation through [`Surface`] only, so the
//! windowing and section logic is testable without any real UI. A host (web
//! view, GUI toolkit) implements the trait over its own widget tree;
//! [`TreeSurface`] is the in-memory reference implementation used by tests
//! and the `render_report` example.

use std::collections::BTreeMap;

/// Handle to one surface node. Only valid for the surface that created it.
pub type NodeId = usize;

/// The four summary counter slots the host must expose by identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CounterSlot {
    TotalTables,
    TablesWithChanges,
    SchemaChanges,
    DataChanges,
}

/// Structural role of a node, so hosts can style without parsing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Per-table container holding a header and (once built) a panel.
    Section,
    /// Toggle target carrying the table label.
    Header,
    /// Lazily built content container of a section.
    Panel,
    SchemaTable,
    DataTable,
    Row,
    Cell,
    /// Height-only filler standing in for unmaterialised rows.
    Spacer,
    /// Inline error message replacing a failed section body.
    ErrorNote,
}

pub trait Surface {
    fn set_counter(&mut self, slot: CounterSlot, value: usize);

    /// Create a node under `parent`, or under the section container when
    /// `parent` is `None`.
    fn create(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId;

    fn set_text(&mut self, node: NodeId, text: &str);

    /// Attach a style tag ("added", "removed", "modified", "changed").
    fn set_tag(&mut self, node: NodeId, tag: &str);

    /// Spacer height in layout units.
    fn set_height(&mut self, node: NodeId, px: u64);

    fn set_visible(&mut self, node: NodeId, visible: bool);

    /// Drop all children of a node (used when a window is recomputed).
    fn clear_children(&mut self, node: NodeId);
}

// ─── TreeSurface ─────────────────────────────────────────────────────────────

/// One node of the in-memory tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub text: String,
    pub tag: String,
    pub height: u64,
    pub visible: bool,
}

/// In-memory [`Surface`] implementation: a flat arena of nodes plus the
/// counter slots. Detached nodes stay in the arena (ids remain stable) but
/// disappear from their parent's child list.
#[derive(Debug, Default)]
pub struct TreeSurface {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    counters: BTreeMap<CounterSlot, usize>,
}

impl TreeSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self, slot: CounterSlot) -> usize {
        self.counters.get(&slot).copied().unwrap_or(0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Top-level section nodes in creation order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    /// Depth-first search for descendants of `id` with the given kind.
    pub fn descendants_of_kind(&self, id: NodeId, kind: NodeKind) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[id].children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            if self.nodes[next].kind == kind {
                found.push(next);
            }
            stack.extend(self.nodes[next].children.iter().rev().copied());
        }
        found
    }
}

impl Surface for TreeSurface {
    fn set_counter(&mut self, slot: CounterSlot, value: usize) {
        self.counters.insert(slot, value);
    }

    fn create(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind,
            parent,
            children: Vec::new(),
            text: String::new(),
            tag: String::new(),
            height: 0,
            visible: true,
        });
        match parent {
            Some(p) => self.nodes[p].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        self.nodes[node].text = text.to_string();
    }

    fn set_tag(&mut self, node: NodeId, tag: &str) {
        self.nodes[node].tag = tag.to_string();
    }

    fn set_height(&mut self, node: NodeId, px: u64) {
        self.nodes[node].height = px;
    }

    fn set_visible(&mut self, node: NodeId, visible: bool) {
        self.nodes[node].visible = visible;
    }

    fn clear_children(&mut self, node: NodeId) {
        let children = std::mem::take(&mut self.nodes[node].children);
        for child in children {
            self.nodes[child].parent = None;
        }
    }
}
