//! Landmarks and headings: the coarse structural skeleton of a page,
//! always emitted regardless of detail level.

use crate::render::bounds::{Bounds, ZERO_BOUNDS};
use crate::render::id_generator::{ElementIdGenerator, IdKind};
use crate::render::node::{AxForest, NodeId};
use crate::render::roles::{is_heading_role, is_landmark_role};
use crate::render::signature::compute_signature;
use crate::render::types::{Heading, Landmark};
use std::collections::HashMap;

pub fn extract_landmarks(forest: &AxForest, bounds_by_backend: &HashMap<i64, Bounds>) -> Vec<Landmark> {
    forest
        .iter_preorder()
        .filter(|&id| is_landmark_role(&forest.get(id).role))
        .map(|id| {
            let node = forest.get(id);
            let bounds = node
                .backend_dom_node_id
                .and_then(|b| bounds_by_backend.get(&b).copied())
                .unwrap_or(ZERO_BOUNDS);
            Landmark {
                role: node.role.clone(),
                label: if node.name.is_empty() { None } else { Some(node.name.clone()) },
                bounds,
            }
        })
        .collect()
}

pub fn extract_headings(forest: &AxForest, id_gen: &mut ElementIdGenerator) -> Vec<Heading> {
    forest
        .iter_preorder()
        .filter(|&id| is_heading_role(&forest.get(id).role))
        .map(|id| heading_for(forest, id, id_gen))
        .collect()
}

/// Default heading level when `properties.level` is absent or outside 1..6.
const DEFAULT_HEADING_LEVEL: u8 = 2;

fn heading_for(forest: &AxForest, id: NodeId, id_gen: &mut ElementIdGenerator) -> Heading {
    let node = forest.get(id);
    let level = node
        .properties
        .get("level")
        .and_then(|v| v.as_f64())
        .map(|n| n as u8)
        .filter(|&l| (1..=6).contains(&l))
        .unwrap_or(DEFAULT_HEADING_LEVEL);
    let sig = compute_signature(forest, id);
    let heading_id = id_gen.generate_id(IdKind::Heading, &node.role, &node.name, &sig, node.backend_dom_node_id);
    Heading { level, text: node.name.clone(), id: heading_id }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::node::AxNode;

    fn fixture() -> AxForest {
        let mut forest = AxForest::new();
        let mut main = AxNode::new("1", "main", "Content area");
        main.backend_dom_node_id = Some(1);
        let main = forest.push(main);
        let mut h1 = AxNode::new("2", "heading", "Welcome");
        h1.properties.insert("level".into(), crate::render::node::PropertyValue::Number(1.0));
        let h1 = forest.push(h1);
        forest.get_mut(h1).parent = Some(main);
        forest.get_mut(main).children = vec![h1];
        forest.set_roots(vec![main]);
        forest
    }

    #[test]
    fn landmark_carries_role_label_and_bounds() {
        let forest = fixture();
        let mut bounds = HashMap::new();
        bounds.insert(1, Bounds { x: 0, y: 0, w: 800, h: 600 });
        let landmarks = extract_landmarks(&forest, &bounds);
        assert_eq!(landmarks.len(), 1);
        assert_eq!(landmarks[0].role, "main");
        assert_eq!(landmarks[0].label.as_deref(), Some("Content area"));
        assert_eq!(landmarks[0].bounds, Bounds { x: 0, y: 0, w: 800, h: 600 });
    }

    #[test]
    fn heading_captures_level_and_text() {
        let forest = fixture();
        let mut id_gen = ElementIdGenerator::new();
        let headings = extract_headings(&forest, &mut id_gen);
        assert_eq!(headings.len(), 1);
        assert_eq!(headings[0].level, 1);
        assert_eq!(headings[0].text, "Welcome");
        assert!(headings[0].id.starts_with("hdg-"));
    }
}
