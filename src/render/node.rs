//! The normalized accessibility-tree forest.
//!
//! The forest is a flat arena (`Vec<AxNode>`); children are listed by
//! index and the parent back-reference is also an index — a non-owning
//! handle, not an `Rc`/`Weak` pair. Traversal is an explicit work-stack,
//! never recursion, so a large SPA tree doesn't blow the call stack.

use std::collections::HashMap;

/// Index into `AxForest::nodes`. Stable for the lifetime of one forest.
pub type NodeId = usize;

/// A scalar AX property value: `level`, `checked`, `disabled`, …
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl PropertyValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// A single normalized accessibility node.
#[derive(Debug, Clone)]
pub struct AxNode {
    pub node_id: String,
    pub role: String,
    pub name: String,
    pub description: Option<String>,
    pub value: Option<String>,
    pub properties: HashMap<String, PropertyValue>,
    pub backend_dom_node_id: Option<i64>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

impl AxNode {
    pub fn new(node_id: impl Into<String>, role: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            role: role.into(),
            name: name.into(),
            description: None,
            value: None,
            properties: HashMap::new(),
            backend_dom_node_id: None,
            children: Vec::new(),
            parent: None,
        }
    }
}

/// The forest produced from a raw accessibility tree. Acyclic by
/// construction: nodes are appended once and children only ever reference
/// already-allocated or later-allocated indices, never an ancestor.
#[derive(Debug, Clone, Default)]
pub struct AxForest {
    nodes: Vec<AxNode>,
    roots: Vec<NodeId>,
}

impl AxForest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node and return its id. Caller wires up parent/children.
    pub fn push(&mut self, node: AxNode) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn set_roots(&mut self, roots: Vec<NodeId>) {
        self.roots = roots;
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn get(&self, id: NodeId) -> &AxNode {
        &self.nodes[id]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut AxNode {
        &mut self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Pre-order traversal via an explicit stack, no recursion.
    /// Children are pushed in reverse so they pop off in document order.
    pub fn iter_preorder(&self) -> PreorderIter<'_> {
        let mut stack: Vec<NodeId> = Vec::with_capacity(self.nodes.len());
        for &root in self.roots.iter().rev() {
            stack.push(root);
        }
        PreorderIter { forest: self, stack }
    }

    /// Walk from `id` up through `parent` links to the root, inclusive of
    /// `id` itself, yielding ancestors only (excludes `id`).
    pub fn ancestors(&self, id: NodeId) -> AncestorIter<'_> {
        AncestorIter {
            forest: self,
            current: self.nodes[id].parent,
        }
    }
}

pub struct PreorderIter<'a> {
    forest: &'a AxForest,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for PreorderIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        let node = self.forest.get(id);
        for &child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(id)
    }
}

pub struct AncestorIter<'a> {
    forest: &'a AxForest,
    current: Option<NodeId>,
}

impl<'a> Iterator for AncestorIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.current?;
        self.current = self.forest.get(id).parent;
        Some(id)
    }
}

/// Build a forest from the flat node array `Accessibility.getFullAXTree`
/// returns. Nodes marked `ignored` are dropped, along with any reference
/// to them from a parent's `childIds` — CDP still lists them there. Nodes
/// never referenced as somebody's child become forest roots.
pub fn build_forest(raw_nodes: &[serde_json::Value]) -> AxForest {
    let mut forest = AxForest::new();
    let mut index_by_cdp_id: HashMap<String, NodeId> = HashMap::new();
    let mut child_ids_by_cdp_id: HashMap<String, Vec<String>> = HashMap::new();

    for raw in raw_nodes {
        let ignored = raw.get("ignored").and_then(|v| v.as_bool()).unwrap_or(false);
        if ignored {
            continue;
        }
        let Some(cdp_node_id) = raw.get("nodeId").and_then(|v| v.as_str()) else {
            continue;
        };

        let role = raw
            .get("role")
            .and_then(|r| r.get("value"))
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let name = raw
            .get("name")
            .and_then(|n| n.get("value"))
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();

        let mut node = AxNode::new(cdp_node_id, role, name);
        node.description = raw
            .get("description")
            .and_then(|d| d.get("value"))
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(String::from);
        node.value = raw
            .get("value")
            .and_then(|v| v.get("value"))
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(String::from);
        node.backend_dom_node_id = raw.get("backendDOMNodeId").and_then(|v| v.as_i64());

        if let Some(props) = raw.get("properties").and_then(|p| p.as_array()) {
            for prop in props {
                let Some(prop_name) = prop.get("name").and_then(|n| n.as_str()) else {
                    continue;
                };
                let Some(prop_value) = prop.get("value").and_then(|v| v.get("value")) else {
                    continue;
                };
                let parsed = if let Some(b) = prop_value.as_bool() {
                    PropertyValue::Bool(b)
                } else if let Some(n) = prop_value.as_f64() {
                    PropertyValue::Number(n)
                } else if let Some(s) = prop_value.as_str() {
                    PropertyValue::Text(s.to_string())
                } else {
                    continue;
                };
                node.properties.insert(prop_name.to_string(), parsed);
            }
        }

        let child_ids: Vec<String> = raw
            .get("childIds")
            .and_then(|c| c.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_str().map(String::from)).collect())
            .unwrap_or_default();

        let id = forest.push(node);
        index_by_cdp_id.insert(cdp_node_id.to_string(), id);
        child_ids_by_cdp_id.insert(cdp_node_id.to_string(), child_ids);
    }

    let mut is_child: HashMap<NodeId, bool> = index_by_cdp_id.values().map(|&id| (id, false)).collect();

    for (cdp_id, child_cdp_ids) in &child_ids_by_cdp_id {
        let Some(&parent_idx) = index_by_cdp_id.get(cdp_id) else { continue };
        let mut children = Vec::new();
        for child_cdp_id in child_cdp_ids {
            if let Some(&child_idx) = index_by_cdp_id.get(child_cdp_id) {
                children.push(child_idx);
                forest.get_mut(child_idx).parent = Some(parent_idx);
                is_child.insert(child_idx, true);
            }
        }
        forest.get_mut(parent_idx).children = children;
    }

    let roots: Vec<NodeId> = (0..forest.len())
        .filter(|id| !is_child.get(id).copied().unwrap_or(false))
        .collect();
    forest.set_roots(roots);
    forest
}
