//! Benchmark harness for the renderer pipeline's extraction stages,
//! against a fixture forest (no live browser). Not a statistical
//! benchmark suite, just wall-clock percentiles for a fixed workload.

use charlotte_core::render::id_generator::ElementIdGenerator;
use charlotte_core::render::node::{build_forest, AxForest};
use charlotte_core::render::pipeline::extract_from_forest;
use charlotte_core::render::types::RenderOptions;
use std::collections::HashMap;
use std::time::{Duration, Instant};

const ITERATIONS: usize = 200;

fn fixture_forest() -> AxForest {
    let raw = serde_json::json!([
        { "nodeId": "1", "role": { "value": "RootWebArea" }, "name": { "value": "Fixture" }, "childIds": ["2", "5"] },
        { "nodeId": "2", "role": { "value": "navigation" }, "name": { "value": "Primary" }, "backendDOMNodeId": 2, "childIds": ["3", "4"] },
        { "nodeId": "3", "role": { "value": "link" }, "name": { "value": "Home" }, "backendDOMNodeId": 3 },
        { "nodeId": "4", "role": { "value": "link" }, "name": { "value": "About" }, "backendDOMNodeId": 4 },
        { "nodeId": "5", "role": { "value": "main" }, "name": { "value": "Content" }, "backendDOMNodeId": 5, "childIds": ["6", "7"] },
        { "nodeId": "6", "role": { "value": "heading" }, "name": { "value": "Welcome" }, "properties": [{ "name": "level", "value": { "value": 1 } }] },
        { "nodeId": "7", "role": { "value": "button" }, "name": { "value": "Continue" }, "backendDOMNodeId": 7 }
    ]);
    build_forest(raw.as_array().unwrap())
}

fn percentile(sorted: &[Duration], pct: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let idx = ((sorted.len() - 1) as f64 * pct).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn main() {
    let forest = fixture_forest();
    let bounds: HashMap<i64, charlotte_core::render::bounds::Bounds> = HashMap::new();
    let options = RenderOptions::default();

    let mut samples = Vec::with_capacity(ITERATIONS);
    for _ in 0..ITERATIONS {
        let mut id_gen = ElementIdGenerator::new();
        let start = Instant::now();
        let _ = extract_from_forest(&forest, &bounds, &options, &mut id_gen);
        samples.push(start.elapsed());
    }

    samples.sort();
    println!("extract_from_forest over {} nodes, {} iterations", forest.len(), ITERATIONS);
    println!("p50: {:?}", percentile(&samples, 0.50));
    println!("p90: {:?}", percentile(&samples, 0.90));
    println!("p99: {:?}", percentile(&samples, 0.99));
}
