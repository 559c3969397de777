//! Wire types for the page representation. Field ordering is irrelevant;
//! array ordering is document order. Bit-stable modulo `timestamp` for
//! equal inputs.

use crate::render::bounds::Bounds;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailLevel {
    Minimal,
    Summary,
    Full,
}

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub detail: Option<DetailLevel>,
    pub selector: Option<String>,
    /// Advisory and reserved for future style extraction.
    pub include_styles: bool,
}

impl Default for DetailLevel {
    fn default() -> Self {
        DetailLevel::Summary
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 1280, height: 720 }
    }
}

/// The closed set of state flags.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ElementState {
    pub enabled: bool,
    pub visible: bool,
    pub focused: bool,
    pub checked: bool,
    pub expanded: bool,
    pub selected: bool,
    pub required: bool,
    pub invalid: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractiveElement {
    pub id: String,
    #[serde(rename = "type")]
    pub element_type: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    pub state: ElementState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormRepresentation {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    pub fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Landmark {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub bounds: Bounds,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
    pub id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InteractiveSummary {
    pub total: usize,
    pub by_landmark: HashMap<String, HashMap<String, usize>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Structure {
    pub landmarks: Vec<Landmark>,
    pub headings: Vec<Heading>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_content: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageErrors {
    pub console: Vec<String>,
    pub network: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRepresentation {
    pub url: String,
    pub title: String,
    pub viewport: Viewport,
    pub snapshot_id: u64,
    pub timestamp: String,
    pub structure: Structure,
    pub interactive: Vec<InteractiveElement>,
    pub forms: Vec<FormRepresentation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interactive_summary: Option<InteractiveSummary>,
    pub errors: PageErrors,
}
