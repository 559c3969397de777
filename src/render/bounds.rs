//! Geometric bounds and the box-model fetch that populates them.

use crate::cdp::client::CdpClient;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

pub const ZERO_BOUNDS: Bounds = Bounds { x: 0, y: 0, w: 0, h: 0 };

impl Bounds {
    /// Whether `self` is fully contained within `other`, inclusive.
    pub fn contained_in(&self, other: &Bounds) -> bool {
        self.x >= other.x
            && self.y >= other.y
            && self.x + self.w <= other.x + other.w
            && self.y + self.h <= other.y + other.h
    }

    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.w as f64 / 2.0,
            self.y as f64 + self.h as f64 / 2.0,
        )
    }

    pub fn center_distance(&self, other: &Bounds) -> f64 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }
}

/// For a given batch of `backend_dom_node_id`s, request box-model quads via
/// `DOM.getBoxModel` and project to `Bounds`. Dispatches in parallel
/// batches of size `<= batch_size`; within a batch all requests are issued
/// concurrently and joined before the next batch.
///
/// Per-node failures are absorbed to `ZERO_BOUNDS`; a session-wide failure
/// (the client itself is unusable) propagates as `SessionError`.
pub async fn fetch_bounds(
    client: &CdpClient,
    backend_ids: &[i64],
    batch_size: usize,
) -> Result<HashMap<i64, Bounds>> {
    let mut out = HashMap::with_capacity(backend_ids.len());
    for chunk in backend_ids.chunks(batch_size.max(1)) {
        let futures = chunk.iter().map(|&id| async move {
            let bounds = fetch_one_box_model(client, id).await;
            (id, bounds)
        });
        let results = futures::future::join_all(futures).await;
        for (id, bounds) in results {
            out.insert(id, bounds);
        }
    }
    Ok(out)
}

async fn fetch_one_box_model(client: &CdpClient, backend_node_id: i64) -> Bounds {
    let result = match client
        .send_command(
            "DOM.getBoxModel",
            serde_json::json!({ "backendNodeId": backend_node_id }),
        )
        .await
    {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!("getBoxModel failed for node {}: {}", backend_node_id, e);
            return ZERO_BOUNDS;
        }
    };

    project_box_model(&result).unwrap_or(ZERO_BOUNDS)
}

/// Project the `content` quad (8 numbers: 4 corners × (x, y)) to a
/// min/max-rounded rectangle.
fn project_box_model(result: &serde_json::Value) -> Option<Bounds> {
    let quad = result
        .get("result")
        .or(Some(result))
        .and_then(|r| r.get("model"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_array())?;

    if quad.len() < 8 {
        return None;
    }
    let xs: Vec<f64> = (0..4).map(|i| quad[i * 2].as_f64().unwrap_or(0.0)).collect();
    let ys: Vec<f64> = (0..4)
        .map(|i| quad[i * 2 + 1].as_f64().unwrap_or(0.0))
        .collect();

    let min_x = xs.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_x = xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let min_y = ys.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_y = ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    Some(Bounds {
        x: min_x.round() as i64,
        y: min_y.round() as i64,
        w: (max_x - min_x).round() as i64,
        h: (max_y - min_y).round() as i64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: i64, y: i64, w: i64, h: i64) -> Bounds {
        Bounds { x, y, w, h }
    }

    #[test]
    fn contained_in_inclusive() {
        let outer = rect(0, 0, 100, 100);
        let inner = rect(10, 10, 90, 90);
        assert!(inner.contained_in(&outer));
        assert!(outer.contained_in(&outer));
        let outside = rect(50, 50, 60, 60);
        assert!(!outside.contained_in(&outer));
    }

    #[test]
    fn center_distance_is_euclidean() {
        let a = rect(0, 0, 10, 10); // center (5,5)
        let b = rect(0, 0, 10, 10).shifted(30, 40);
        assert!((a.center_distance(&b) - 50.0).abs() < 1e-9);
    }

    impl Bounds {
        fn shifted(self, dx: i64, dy: i64) -> Bounds {
            Bounds { x: self.x + dx, y: self.y + dy, w: self.w, h: self.h }
        }
    }

    #[test]
    fn project_box_model_rounds_min_max() {
        let value = serde_json::json!({
            "result": {
                "model": {
                    "content": [1.4, 1.4, 10.6, 1.4, 10.6, 5.6, 1.4, 5.6]
                }
            }
        });
        let bounds = project_box_model(&value).unwrap();
        assert_eq!(bounds, Bounds { x: 1, y: 1, w: 9, h: 4 });
    }
}
