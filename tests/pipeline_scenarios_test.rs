//! End-to-end scenarios against the renderer pipeline's pure extraction
//! stage and the snapshot store, built from hand-constructed fixtures —
//! no live CDP connection.

use charlotte_core::render::bounds::Bounds;
use charlotte_core::render::id_generator::ElementIdGenerator;
use charlotte_core::render::node::{build_forest, AxForest, AxNode};
use charlotte_core::render::pipeline::extract_from_forest;
use charlotte_core::render::spatial::{find_near, find_within, DEFAULT_NEAR_RADIUS};
use charlotte_core::render::types::{DetailLevel, ElementState, InteractiveElement, RenderOptions};
use charlotte_core::snapshot::SnapshotStore;
use std::collections::HashMap;

/// `<html><body><h1>Example Domain</h1><p>…</p><a href=…>More information…</a></body></html>`
fn example_dot_com_forest() -> AxForest {
    let raw = serde_json::json!([
        { "nodeId": "1", "role": { "value": "RootWebArea" }, "name": { "value": "Example Domain" }, "childIds": ["2", "3", "4"] },
        { "nodeId": "2", "role": { "value": "heading" }, "name": { "value": "Example Domain" },
          "properties": [{ "name": "level", "value": { "value": 1 } }] },
        { "nodeId": "3", "role": { "value": "paragraph" }, "name": { "value": "This domain is for use in examples." } },
        { "nodeId": "4", "role": { "value": "link" }, "name": { "value": "More information..." }, "backendDOMNodeId": 7 }
    ]);
    build_forest(raw.as_array().unwrap())
}

#[test]
fn s1_example_dot_com_minimal() {
    let forest = example_dot_com_forest();
    let bounds = HashMap::new();
    let options = RenderOptions { detail: Some(DetailLevel::Minimal), selector: None, include_styles: false };
    let mut id_gen = ElementIdGenerator::new();

    let rep = extract_from_forest(&forest, &bounds, &options, &mut id_gen);

    assert_eq!(rep.structure.headings.len(), 1);
    assert_eq!(rep.structure.headings[0].level, 1);
    assert_eq!(rep.structure.headings[0].text, "Example Domain");
    let heading_re = regex::Regex::new(r"^hdg-[0-9a-f]{4}$").unwrap();
    assert!(heading_re.is_match(&rep.structure.headings[0].id));

    assert_eq!(rep.interactive.len(), 1);
    assert_eq!(rep.interactive[0].element_type, "link");
    assert_eq!(rep.interactive[0].label, "More information...");

    assert!(rep.structure.content_summary.is_none());
    assert_eq!(rep.interactive_summary.as_ref().unwrap().total, 1);
}

#[test]
fn s2_stable_ids_across_rerender() {
    let forest = example_dot_com_forest();
    let bounds = HashMap::new();
    let options = RenderOptions::default();

    let mut first_gen = ElementIdGenerator::new();
    let first = extract_from_forest(&forest, &bounds, &options, &mut first_gen);
    let mut second_gen = ElementIdGenerator::new();
    let second = extract_from_forest(&forest, &bounds, &options, &mut second_gen);

    let first_ids: Vec<&str> = first.interactive.iter().map(|e| e.id.as_str()).collect();
    let second_ids: Vec<&str> = second.interactive.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(first_ids, second_ids);

    let first_heading_ids: Vec<&str> = first.structure.headings.iter().map(|h| h.id.as_str()).collect();
    let second_heading_ids: Vec<&str> = second.structure.headings.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(first_heading_ids, second_heading_ids);
}

#[test]
fn s3_collision_disambiguation() {
    let mut forest = AxForest::new();
    let mut a = AxNode::new("a", "button", "Submit");
    a.backend_dom_node_id = Some(1);
    let a = forest.push(a);
    let mut b = AxNode::new("b", "button", "Submit");
    b.backend_dom_node_id = Some(2);
    let b = forest.push(b);
    forest.set_roots(vec![a, b]);

    let bounds = HashMap::new();
    let mut id_gen = ElementIdGenerator::new();
    let rep = extract_from_forest(&forest, &bounds, &RenderOptions::default(), &mut id_gen);

    assert_eq!(rep.interactive.len(), 2);
    let first_id = &rep.interactive[0].id;
    let second_id = &rep.interactive[1].id;
    assert_ne!(first_id, second_id);
    assert!(second_id.starts_with(first_id.as_str()));
    assert_eq!(id_gen.resolve_id(first_id), Some(1));
    assert_eq!(id_gen.resolve_id(second_id), Some(2));
}

fn blank_rep() -> charlotte_core::render::types::PageRepresentation {
    extract_from_forest(&AxForest::new(), &HashMap::new(), &RenderOptions::default(), &mut ElementIdGenerator::new())
}

#[test]
fn s4_ring_buffer_fifo() {
    // depth clamps to the minimum of 5.
    let mut store = SnapshotStore::new(5);
    let mut last = None;
    for _ in 0..7 {
        last = Some(store.push(blank_rep()));
    }

    assert_eq!(store.size(), 5);
    assert_eq!(store.oldest_id(), Some(3));
    assert_eq!(store.latest_id(), Some(7));
    assert!(store.get(1).is_none());
    assert_eq!(store.get(7).unwrap().id, last.unwrap().id);
}

/// `<nav>` 3 links; `<main>` h1 + 2 paragraphs + nested `<nav>` 1 link.
fn landmark_scoped_forest() -> AxForest {
    let mut forest = AxForest::new();
    let outer_nav = forest.push(AxNode::new("n", "navigation", ""));
    let links: Vec<_> = ["A", "B", "C"].iter().map(|name| forest.push(AxNode::new(*name, "link", *name))).collect();
    for &l in &links {
        forest.get_mut(l).parent = Some(outer_nav);
    }
    forest.get_mut(outer_nav).children = links;

    let main = forest.push(AxNode::new("m", "main", ""));
    let h1 = forest.push(AxNode::new("h", "heading", "Title"));
    let p1 = forest.push(AxNode::new("p1", "paragraph", "One"));
    let p2 = forest.push(AxNode::new("p2", "paragraph", "Two"));
    let inner_nav = forest.push(AxNode::new("n2", "navigation", ""));
    let l4 = forest.push(AxNode::new("l4", "link", "D"));
    forest.get_mut(inner_nav).children = vec![l4];
    forest.get_mut(l4).parent = Some(inner_nav);
    forest.get_mut(inner_nav).parent = Some(main);
    forest.get_mut(main).children = vec![h1, p1, p2, inner_nav];
    for c in [h1, p1, p2] {
        forest.get_mut(c).parent = Some(main);
    }

    forest.set_roots(vec![outer_nav, main]);
    forest
}

#[test]
fn s5_landmark_scoped_summary_excludes_nested() {
    let forest = landmark_scoped_forest();
    let bounds = HashMap::new();
    let options = RenderOptions { detail: Some(DetailLevel::Summary), selector: None, include_styles: false };
    let mut id_gen = ElementIdGenerator::new();

    let rep = extract_from_forest(&forest, &bounds, &options, &mut id_gen);
    let summary = rep.structure.content_summary.unwrap();
    let parts: Vec<&str> = summary.split("; ").collect();
    assert_eq!(parts, vec!["navigation: 3 links", "main: 1 headings, 2 paragraphs", "navigation: 1 links"]);
}

fn positioned(id: &str, x: i64, y: i64, w: i64, h: i64) -> InteractiveElement {
    InteractiveElement {
        id: id.to_string(),
        element_type: "button".to_string(),
        label: id.to_string(),
        bounds: Some(Bounds { x, y, w, h }),
        state: ElementState::default(),
        href: None,
        placeholder: None,
        value: None,
        options: None,
    }
}

#[test]
fn s6_spatial_find_within_and_near() {
    let container = positioned("a", 0, 0, 300, 300);
    let inside = positioned("b", 10, 10, 50, 50);
    let straddling = positioned("c", 250, 250, 100, 100);
    let near_a = positioned("d", 320, 0, 10, 10);
    let far_from_a = positioned("e", 2000, 0, 10, 10);
    let elements = vec![container, inside, straddling, near_a, far_from_a];

    let within = find_within(&elements, "a");
    let within_ids: Vec<&str> = within.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(within_ids, vec!["b"]);

    let near = find_near(&elements, "a", DEFAULT_NEAR_RADIUS);
    let near_ids: Vec<&str> = near.iter().map(|e| e.id.as_str()).collect();
    assert!(near_ids.contains(&"d"));
    assert!(!near_ids.contains(&"e"));
    assert!(!near_ids.contains(&"a"));
}
