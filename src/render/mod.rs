//! The renderer pipeline: turns a raw CDP accessibility tree into the
//! page representation tool callers consume.

pub mod bounds;
pub mod content;
pub mod id_generator;
pub mod interactive;
pub mod node;
pub mod pipeline;
pub mod roles;
pub mod signature;
pub mod spatial;
pub mod structure;
pub mod types;

pub use id_generator::ElementIdGenerator;
pub use node::{AxForest, AxNode, NodeId};
pub use pipeline::RendererPipeline;
pub use types::{DetailLevel, PageRepresentation, RenderOptions};
