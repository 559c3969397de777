//! Spatial queries over a rendered page's interactive elements: `within`
//! and `near`, the one piece of the pipeline that reasons about bounds
//! rather than tree structure.

use crate::render::types::InteractiveElement;

/// Default radius for `find_near`, in CSS pixels.
pub const DEFAULT_NEAR_RADIUS: f64 = 200.0;

/// Elements (excluding the container itself) whose bounds are fully
/// contained in the container's, inclusive. Empty if the container id is
/// unknown or has no bounds.
pub fn find_within<'a>(elements: &'a [InteractiveElement], container_id: &str) -> Vec<&'a InteractiveElement> {
    let Some(container_bounds) = elements.iter().find(|e| e.id == container_id).and_then(|e| e.bounds) else {
        return Vec::new();
    };
    elements
        .iter()
        .filter(|e| e.id != container_id)
        .filter(|e| e.bounds.is_some_and(|b| b.contained_in(&container_bounds)))
        .collect()
}

/// Elements (excluding the anchor) within `radius` px of the anchor's
/// center, sorted ascending by center distance.
pub fn find_near<'a>(
    elements: &'a [InteractiveElement],
    anchor_id: &str,
    radius: f64,
) -> Vec<&'a InteractiveElement> {
    let Some(anchor_bounds) = elements.iter().find(|e| e.id == anchor_id).and_then(|e| e.bounds) else {
        return Vec::new();
    };
    let mut matches: Vec<(&InteractiveElement, f64)> = elements
        .iter()
        .filter(|e| e.id != anchor_id)
        .filter_map(|e| e.bounds.map(|b| (e, b.center_distance(&anchor_bounds))))
        .filter(|(_, distance)| *distance <= radius)
        .collect();
    matches.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());
    matches.into_iter().map(|(e, _)| e).collect()
}
