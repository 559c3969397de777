//! Walks the forest, yielding `InteractiveElement`s for interactive nodes
//! and `FormRepresentation`s for `form` landmarks.

use crate::render::bounds::Bounds;
use crate::render::id_generator::{ElementIdGenerator, IdKind};
use crate::render::node::{AxForest, NodeId};
use crate::render::roles::{is_interactive_role, role_to_element_type, ElementType};
use crate::render::signature::compute_signature;
use crate::render::types::{ElementState, FormRepresentation, InteractiveElement};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

fn submit_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)submit|send|save|continue|ok").unwrap())
}

fn prop_bool(node: &crate::render::node::AxNode, key: &str) -> bool {
    node.properties
        .get(key)
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}

fn prop_str<'a>(node: &'a crate::render::node::AxNode, key: &str) -> Option<&'a str> {
    node.properties.get(key).and_then(|v| v.as_str())
}

/// Map a single interactive node to an `InteractiveElement`.
fn extract_element(
    forest: &AxForest,
    id: NodeId,
    bounds_by_backend: &HashMap<i64, Bounds>,
    id_gen: &mut ElementIdGenerator,
) -> InteractiveElement {
    let node = forest.get(id);
    let multiline = prop_bool(node, "multiline");
    let value_hint = prop_str(node, "valuetext").or_else(|| prop_str(node, "url"));
    let element_type = role_to_element_type(&node.role, multiline, value_hint);

    let sig = compute_signature(forest, id);
    let element_id = id_gen.generate_id(
        IdKind::Element(element_type),
        &node.role,
        &node.name,
        &sig,
        node.backend_dom_node_id,
    );

    let label = if !node.name.is_empty() {
        node.name.clone()
    } else if let Some(v) = &node.value {
        v.clone()
    } else {
        prop_str(node, "placeholder").unwrap_or_default().to_string()
    };

    let bounds = node
        .backend_dom_node_id
        .and_then(|backend| bounds_by_backend.get(&backend).copied());

    let state = ElementState {
        enabled: !prop_bool(node, "disabled"),
        visible: true,
        focused: prop_bool(node, "focused"),
        checked: prop_bool(node, "checked"),
        expanded: prop_bool(node, "expanded"),
        selected: prop_bool(node, "selected"),
        required: prop_bool(node, "required"),
        invalid: prop_bool(node, "invalid"),
    };

    let href = if element_type == ElementType::Link {
        prop_str(node, "url").map(String::from)
    } else {
        None
    };

    let placeholder = prop_str(node, "placeholder").map(String::from);

    let value = node.value.clone().or_else(|| prop_str(node, "valuetext").map(String::from));

    let options = if matches!(element_type, ElementType::Select) {
        let opts: Vec<String> = node
            .children
            .iter()
            .map(|&c| forest.get(c))
            .filter(|c| c.role == "option")
            .map(|c| c.name.clone())
            .collect();
        if opts.is_empty() {
            None
        } else {
            Some(opts)
        }
    } else {
        None
    };

    InteractiveElement {
        id: element_id,
        element_type: element_type.as_str().to_string(),
        label,
        bounds,
        state,
        href,
        placeholder,
        value,
        options,
    }
}

/// Walk the full forest in document order, producing the interactive
/// elements and the forms.
pub fn extract_interactive(
    forest: &AxForest,
    bounds_by_backend: &HashMap<i64, Bounds>,
    id_gen: &mut ElementIdGenerator,
) -> (Vec<InteractiveElement>, Vec<FormRepresentation>) {
    let mut interactive = Vec::new();
    let mut forms = Vec::new();

    for id in forest.iter_preorder() {
        let node = forest.get(id);

        if node.role == "form" {
            let (fields, submit) = collect_form_fields(forest, id, bounds_by_backend, id_gen, &mut interactive);
            let sig = compute_signature(forest, id);
            let form_id = id_gen.generate_id(
                crate::render::id_generator::IdKind::Form,
                &node.role,
                &node.name,
                &sig,
                node.backend_dom_node_id,
            );
            forms.push(FormRepresentation {
                id: form_id,
                action: prop_str(node, "url").map(String::from),
                method: prop_str(node, "method").map(String::from),
                fields,
                submit,
            });
            continue;
        }

        if is_interactive_role(&node.role) && !is_inside_form(forest, id) {
            interactive.push(extract_element(forest, id, bounds_by_backend, id_gen));
        }
    }

    (interactive, forms)
}

/// Whether `id` has a `form` ancestor — fields inside forms are emitted by
/// `collect_form_fields` instead, so the top-level walk must not double-count.
fn is_inside_form(forest: &AxForest, id: NodeId) -> bool {
    forest.ancestors(id).any(|a| forest.get(a).role == "form")
}

/// Walk the descendants of a `form` node, extracting interactive fields in
/// document order and pushing them into the shared `interactive` output.
/// Returns `(field_ids, submit_id)`.
fn collect_form_fields(
    forest: &AxForest,
    form_id: NodeId,
    bounds_by_backend: &HashMap<i64, Bounds>,
    id_gen: &mut ElementIdGenerator,
    interactive: &mut Vec<InteractiveElement>,
) -> (Vec<String>, Option<String>) {
    let mut fields = Vec::new();
    let mut buttons = Vec::new();

    // Explicit stack traversal scoped to the form subtree, document order.
    let mut stack: Vec<NodeId> = forest.get(form_id).children.iter().rev().copied().collect();
    while let Some(id) = stack.pop() {
        let node = forest.get(id);
        for &child in node.children.iter().rev() {
            stack.push(child);
        }
        if is_interactive_role(&node.role) {
            let element = extract_element(forest, id, bounds_by_backend, id_gen);
            if element.element_type == "button" {
                let is_submit_type = prop_str(node, "type") == Some("submit");
                buttons.push((element.id.clone(), element.label.clone(), is_submit_type));
            }
            fields.push(element.id.clone());
            interactive.push(element);
        }
    }

    // First descendant button whose label matches the submit regex or
    // whose `type` property is `submit`; else the last button; else none.
    let submit = buttons
        .iter()
        .find(|(_, label, is_submit_type)| submit_regex().is_match(label) || *is_submit_type)
        .or_else(|| buttons.last())
        .map(|(id, _, _)| id.clone());

    (fields, submit)
}
