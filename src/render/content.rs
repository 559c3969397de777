//! Landmark-scoped content summaries and full readable text.

use crate::render::node::{AxForest, NodeId};
use crate::render::roles::{is_content_role, is_landmark_role, is_static_text_role};

#[derive(Debug, Default, Clone)]
struct Counts {
    headings: usize,
    paragraphs: usize,
    links: usize,
    buttons: usize,
    inputs: usize,
    forms: usize,
    images: usize,
    lists: usize,
    tables: usize,
}

impl Counts {
    fn bump(&mut self, role: &str) {
        match role {
            "heading" => self.headings += 1,
            "paragraph" => self.paragraphs += 1,
            "link" => self.links += 1,
            "button" => self.buttons += 1,
            "textbox" | "searchbox" | "combobox" | "listbox" | "checkbox" | "radio" | "switch"
            | "slider" | "spinbutton" => self.inputs += 1,
            "form" => self.forms += 1,
            "image" | "img" => self.images += 1,
            "list" => self.lists += 1,
            "table" | "grid" => self.tables += 1,
            _ => {}
        }
    }

    fn render(&self) -> String {
        let parts = [
            (self.headings, "headings"),
            (self.paragraphs, "paragraphs"),
            (self.links, "links"),
            (self.buttons, "buttons"),
            (self.inputs, "inputs"),
            (self.forms, "forms"),
            (self.images, "images"),
            (self.lists, "lists"),
            (self.tables, "tables"),
        ];
        parts
            .iter()
            .filter(|(n, _)| *n > 0)
            .map(|(n, label)| format!("{} {}", n, label))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// For each landmark subtree, count descendants by category without
/// descending into nested landmarks — those get their own entry. Falls
/// back to counting at the page root if no landmarks exist. `None` when
/// there is nothing to report.
pub fn extract_summary(forest: &AxForest) -> Option<String> {
    let landmark_roots: Vec<NodeId> = forest
        .iter_preorder()
        .filter(|&id| is_landmark_role(&forest.get(id).role))
        .collect();

    let mut entries = Vec::new();

    if landmark_roots.is_empty() {
        for &root in forest.roots() {
            let counts = count_scoped(forest, root, true);
            entries.push(format!("page root: {}", counts.render()));
        }
    } else {
        for &landmark in &landmark_roots {
            let node = forest.get(landmark);
            let header = if node.name.is_empty() {
                node.role.clone()
            } else {
                format!("{} ({})", node.role, node.name)
            };
            let counts = count_scoped(forest, landmark, false);
            let rendered = counts.render();
            if rendered.is_empty() {
                continue;
            }
            entries.push(format!("{}: {}", header, rendered));
        }
    }

    if entries.is_empty() {
        None
    } else {
        Some(entries.join("; "))
    }
}

/// Count descendants of `root` (exclusive, unless `include_self_role` is
/// set for the no-landmark fallback) without crossing into nested
/// landmarks.
fn count_scoped(forest: &AxForest, root: NodeId, include_root_role: bool) -> Counts {
    let mut counts = Counts::default();
    let node = forest.get(root);
    if include_root_role {
        counts.bump(&node.role);
    }

    let mut stack: Vec<NodeId> = node.children.iter().rev().copied().collect();
    while let Some(id) = stack.pop() {
        let child = forest.get(id);
        if is_landmark_role(&child.role) {
            // Nested landmark gets its own entry — do not descend.
            continue;
        }
        counts.bump(&child.role);
        for &grandchild in child.children.iter().rev() {
            stack.push(grandchild);
        }
    }
    counts
}

/// Depth-first readable text: a content-role node with a non-empty name
/// emits that name and does not descend (its name already aggregates
/// descendant text, avoiding double emission); `StaticText`/`text` nodes
/// emit their name; everything else recurses.
pub fn extract_full_content(forest: &AxForest) -> String {
    let mut lines = Vec::new();
    for &root in forest.roots() {
        walk_full_content(forest, root, &mut lines);
    }
    lines.join("\n")
}

fn walk_full_content(forest: &AxForest, id: NodeId, out: &mut Vec<String>) {
    let node = forest.get(id);

    if is_content_role(&node.role) && !node.name.is_empty() {
        out.push(node.name.clone());
        return;
    }

    if is_static_text_role(&node.role) {
        if !node.name.is_empty() {
            out.push(node.name.clone());
        }
        return;
    }

    for &child in &node.children {
        walk_full_content(forest, child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::node::AxNode;

    /// nav(3 links); main(h1 + 2 paragraphs + nested nav(1 link))
    fn landmark_scoping_fixture() -> AxForest {
        let mut forest = AxForest::new();
        let outer_nav = forest.push(AxNode::new("n", "navigation", ""));
        let l1 = forest.push(AxNode::new("l1", "link", "A"));
        let l2 = forest.push(AxNode::new("l2", "link", "B"));
        let l3 = forest.push(AxNode::new("l3", "link", "C"));
        forest.get_mut(outer_nav).children = vec![l1, l2, l3];
        for l in [l1, l2, l3] {
            forest.get_mut(l).parent = Some(outer_nav);
        }

        let main = forest.push(AxNode::new("m", "main", ""));
        let h1 = forest.push(AxNode::new("h", "heading", "Title"));
        let p1 = forest.push(AxNode::new("p1", "paragraph", "One"));
        let p2 = forest.push(AxNode::new("p2", "paragraph", "Two"));
        let inner_nav = forest.push(AxNode::new("n2", "navigation", ""));
        let l4 = forest.push(AxNode::new("l4", "link", "D"));
        forest.get_mut(inner_nav).children = vec![l4];
        forest.get_mut(l4).parent = Some(inner_nav);
        forest.get_mut(main).children = vec![h1, p1, p2, inner_nav];
        for c in [h1, p1, p2, inner_nav] {
            forest.get_mut(c).parent = Some(main);
        }
        forest.get_mut(inner_nav).parent = Some(main);

        forest.set_roots(vec![outer_nav, main]);
        forest
    }

    #[test]
    fn summary_scopes_by_landmark_and_excludes_nested() {
        let forest = landmark_scoping_fixture();
        let summary = extract_summary(&forest).unwrap();
        let parts: Vec<&str> = summary.split("; ").collect();
        assert_eq!(parts, vec!["navigation: 3 links", "main: 1 headings, 2 paragraphs", "navigation: 1 links"]);
    }

    #[test]
    fn summary_absent_when_no_landmarks_and_no_content() {
        let forest = AxForest::new();
        assert_eq!(extract_summary(&forest), None);
    }

    #[test]
    fn full_content_skips_descent_under_content_role_with_name() {
        let mut forest = AxForest::new();
        let li = forest.push(AxNode::new("li", "listitem", "Buy milk"));
        let text = forest.push(AxNode::new("t", "StaticText", "Buy milk"));
        forest.get_mut(li).children = vec![text];
        forest.get_mut(text).parent = Some(li);
        forest.set_roots(vec![li]);

        let content = extract_full_content(&forest);
        assert_eq!(content, "Buy milk");
    }

    #[test]
    fn full_content_recurses_through_generic_containers() {
        let mut forest = AxForest::new();
        let generic = forest.push(AxNode::new("g", "generic", ""));
        let text = forest.push(AxNode::new("t", "StaticText", "Hello"));
        forest.get_mut(generic).children = vec![text];
        forest.get_mut(text).parent = Some(generic);
        forest.set_roots(vec![generic]);

        assert_eq!(extract_full_content(&forest), "Hello");
    }
}
