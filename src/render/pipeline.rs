//! Orchestrates the extraction steps into a single `render()` call: fetch
//! the AX tree, fetch bounds for the nodes that need them, run the
//! extractors against a fresh id generator, then publish that generator
//! atomically.

use crate::cdp::client::CdpClient;
use crate::config::Config;
use crate::error::{CharlotteError, Result};
use crate::render::bounds::{fetch_bounds, Bounds};
use crate::render::content::{extract_full_content, extract_summary};
use crate::render::id_generator::ElementIdGenerator;
use crate::render::interactive::extract_interactive;
use crate::render::node::{build_forest, AxForest, NodeId};
use crate::render::roles::{is_heading_role, is_interactive_role, is_landmark_role};
use crate::render::structure::{extract_headings, extract_landmarks};
use crate::render::types::{
    DetailLevel, InteractiveSummary, PageErrors, PageRepresentation, RenderOptions, Structure, Viewport,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

pub struct RendererPipeline {
    client: CdpClient,
    shared_ids: Arc<Mutex<ElementIdGenerator>>,
    layout_batch_size: usize,
}

impl RendererPipeline {
    pub fn new(client: CdpClient, shared_ids: Arc<Mutex<ElementIdGenerator>>, config: &Config) -> Self {
        Self { client, shared_ids, layout_batch_size: config.layout_batch_size }
    }

    /// Resolve an element id against the currently published generator.
    pub fn resolve_element(&self, id: &str) -> Option<i64> {
        self.shared_ids.lock().resolve_id(id)
    }

    /// Recovery path for an id that predates the latest render.
    pub fn find_similar(&self, id: &str, current_elements: &[String]) -> Option<String> {
        self.shared_ids.lock().find_similar(id, current_elements)
    }

    pub async fn render(&self, options: RenderOptions) -> Result<PageRepresentation> {
        let mut forest = build_forest(&self.client.get_full_ax_tree().await?);

        if let Some(selector) = &options.selector {
            prune_to_selector(&mut forest, &self.client, selector).await?;
        }

        let backend_ids = nodes_needing_bounds(&forest);
        let bounds = fetch_bounds(&self.client, &backend_ids, self.layout_batch_size).await?;

        let mut fresh_ids = ElementIdGenerator::new();
        let mut representation = extract_from_forest(&forest, &bounds, &options, &mut fresh_ids);

        representation.url = self.client.current_url().await.unwrap_or_default();
        representation.title = self.client.current_title().await.unwrap_or_default();
        representation.viewport = self
            .client
            .get_viewport()
            .await
            .unwrap_or(None)
            .map(|(width, height)| Viewport { width, height })
            .unwrap_or_default();

        // Atomic publish: either the old table or this one, never a mix.
        *self.shared_ids.lock() = fresh_ids;

        Ok(representation)
    }
}

/// Run the extraction stages against an already-built forest and bounds
/// map, without touching the CDP client. Used by benchmarking (a fixture
/// forest, no live browser) and by the pipeline's own `render`. `url`,
/// `title`, and `viewport` are left at their defaults; the caller fills
/// them in when it has a live page to ask.
pub fn extract_from_forest(
    forest: &AxForest,
    bounds: &HashMap<i64, Bounds>,
    options: &RenderOptions,
    id_gen: &mut ElementIdGenerator,
) -> PageRepresentation {
    let landmarks = extract_landmarks(forest, bounds);
    let headings = extract_headings(forest, id_gen);
    let (interactive, forms) = extract_interactive(forest, bounds, id_gen);

    let detail = options.detail.unwrap_or_default();
    let content_summary = if detail != DetailLevel::Minimal { extract_summary(forest) } else { None };
    let full_content = if detail == DetailLevel::Full { Some(extract_full_content(forest)) } else { None };
    let interactive_summary = if detail == DetailLevel::Minimal {
        Some(build_interactive_summary(forest, &interactive))
    } else {
        None
    };

    PageRepresentation {
        url: String::new(),
        title: String::new(),
        viewport: Viewport::default(),
        snapshot_id: 0,
        timestamp: String::new(),
        structure: Structure { landmarks, headings, content_summary, full_content },
        interactive,
        forms,
        interactive_summary,
        errors: PageErrors::default(),
    }
}

/// Backend ids of every landmark, heading, and interactive node — the set
/// the layout extractor needs bounds for.
fn nodes_needing_bounds(forest: &AxForest) -> Vec<i64> {
    forest
        .iter_preorder()
        .filter_map(|id| {
            let node = forest.get(id);
            let relevant =
                is_landmark_role(&node.role) || is_heading_role(&node.role) || is_interactive_role(&node.role);
            if relevant {
                node.backend_dom_node_id
            } else {
                None
            }
        })
        .collect()
}

async fn prune_to_selector(forest: &mut AxForest, client: &CdpClient, selector: &str) -> Result<()> {
    let Some(backend_id) = client.query_selector_backend_id(selector).await? else {
        return Err(CharlotteError::EvaluationError(format!("selector matched nothing: {}", selector)));
    };
    let matched = forest
        .iter_preorder()
        .find(|&id| forest.get(id).backend_dom_node_id == Some(backend_id));
    if let Some(id) = matched {
        forest.set_roots(vec![id]);
    }
    Ok(())
}

/// `total` plus a `"<role> (<label>)" | "<role>" | "(page root)"` keyed
/// breakdown by element type, for the `minimal` detail level.
fn build_interactive_summary(
    forest: &AxForest,
    interactive: &[crate::render::types::InteractiveElement],
) -> InteractiveSummary {
    let landmark_key_by_node = landmark_key_for_every_node(forest);

    // Interactive elements don't carry their source node id, but they were
    // produced by the same preorder walk in the same order, so zip them.
    let mut counts: HashMap<String, HashMap<String, usize>> = HashMap::new();
    let mut elements = interactive.iter();
    for id in forest.iter_preorder() {
        if !is_interactive_role(&forest.get(id).role) {
            continue;
        }
        let Some(element) = elements.next() else { break };
        let landmark_key = landmark_key_by_node
            .get(&id)
            .cloned()
            .unwrap_or_else(|| "(page root)".to_string());
        *counts.entry(landmark_key).or_default().entry(element.element_type.clone()).or_insert(0) += 1;
    }

    InteractiveSummary { total: interactive.len(), by_landmark: counts }
}

/// For every node, the landmark key of its nearest landmark ancestor (or
/// itself, if it is one), `"(page root)"` when none.
fn landmark_key_for_every_node(forest: &AxForest) -> HashMap<NodeId, String> {
    let mut keys = HashMap::new();
    for id in forest.iter_preorder() {
        let mut key = None;
        if is_landmark_role(&forest.get(id).role) {
            key = Some(landmark_key(forest, id));
        } else {
            for ancestor in forest.ancestors(id) {
                if is_landmark_role(&forest.get(ancestor).role) {
                    key = Some(landmark_key(forest, ancestor));
                    break;
                }
            }
        }
        keys.insert(id, key.unwrap_or_else(|| "(page root)".to_string()));
    }
    keys
}

fn landmark_key(forest: &AxForest, landmark_id: NodeId) -> String {
    let node = forest.get(landmark_id);
    if node.name.is_empty() {
        node.role.clone()
    } else {
        format!("{} ({})", node.role, node.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::node::AxNode;
    use crate::render::types::{ElementState, InteractiveElement};

    fn one_button_in_nav() -> AxForest {
        let mut forest = AxForest::new();
        let mut nav = AxNode::new("n", "navigation", "Primary");
        nav.backend_dom_node_id = Some(1);
        let nav = forest.push(nav);
        let mut btn = AxNode::new("b", "button", "Go");
        btn.backend_dom_node_id = Some(2);
        let btn = forest.push(btn);
        forest.get_mut(btn).parent = Some(nav);
        forest.get_mut(nav).children = vec![btn];
        forest.set_roots(vec![nav]);
        forest
    }

    #[test]
    fn nodes_needing_bounds_covers_landmarks_headings_interactive_only() {
        let forest = one_button_in_nav();
        let ids = nodes_needing_bounds(&forest);
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&1));
        assert!(ids.contains(&2));
    }

    #[test]
    fn interactive_summary_keys_by_labelled_landmark() {
        let forest = one_button_in_nav();
        let elements = vec![InteractiveElement {
            id: "btn-aaaa".to_string(),
            element_type: "button".to_string(),
            label: "Go".to_string(),
            bounds: None,
            state: ElementState::default(),
            href: None,
            placeholder: None,
            value: None,
            options: None,
        }];
        let summary = build_interactive_summary(&forest, &elements);
        assert_eq!(summary.total, 1);
        let nav_counts = summary.by_landmark.get("navigation (Primary)").unwrap();
        assert_eq!(nav_counts.get("button"), Some(&1));
    }
}
