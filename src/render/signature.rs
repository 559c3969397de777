//! A structural fingerprint, pure function of forest topology and labels,
//! used to keep element ids stable across re-renders of the same logical
//! page.

use crate::render::node::{AxForest, NodeId};
use crate::render::roles::is_landmark_role;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DomPathSignature {
    pub nearest_landmark_role: Option<String>,
    pub nearest_landmark_label: Option<String>,
    pub nearest_labelled_container: Option<String>,
    pub sibling_index: usize,
}

/// Compute the signature of node `id` within `forest`.
pub fn compute_signature(forest: &AxForest, id: NodeId) -> DomPathSignature {
    let mut landmark: Option<NodeId> = None;
    let mut labelled_container: Option<String> = None;

    // Walk ancestors until the first landmark (or run off the root),
    // remembering the first non-empty name seen strictly between `id` and
    // the landmark.
    for ancestor in forest.ancestors(id) {
        let node = forest.get(ancestor);
        if is_landmark_role(&node.role) {
            landmark = Some(ancestor);
            break;
        }
        if labelled_container.is_none() && !node.name.is_empty() {
            labelled_container = Some(node.name.clone());
        }
    }

    let (nearest_landmark_role, nearest_landmark_label) = match landmark {
        Some(l) => {
            let node = forest.get(l);
            let label = if node.name.is_empty() {
                None
            } else {
                Some(node.name.clone())
            };
            (Some(node.role.clone()), label)
        }
        None => (None, None),
    };

    let sibling_index = sibling_index_among_same_role(forest, id);

    DomPathSignature {
        nearest_landmark_role,
        nearest_landmark_label,
        nearest_labelled_container: labelled_container,
        sibling_index,
    }
}

/// 0-based index of `id` among its parent's children that share its role;
/// 0 if `id` has no parent.
fn sibling_index_among_same_role(forest: &AxForest, id: NodeId) -> usize {
    let node = forest.get(id);
    let parent = match node.parent {
        Some(p) => p,
        None => return 0,
    };
    let role = &node.role;
    let mut index = 0usize;
    for &sibling in &forest.get(parent).children {
        if sibling == id {
            return index;
        }
        if forest.get(sibling).role == *role {
            index += 1;
        }
    }
    // Unreachable unless `id` isn't actually listed under `parent`.
    index
}
