//! MCP tool surface over the renderer pipeline: `render`, `resolve_element`,
//! `find_similar`, `snapshot_get`. Every non-core browser-control tool
//! (navigation, input, screenshots) is out of scope here by design — this
//! dispatcher only exposes the three pipeline operations and the snapshot
//! reader.

use crate::error::CharlotteError;
use crate::render::types::{DetailLevel, RenderOptions};
use crate::session::SessionRegistry;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::service::RequestContext;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, RoleServer, ServerHandler};
use std::sync::Arc;

/// Page id used when a tool call doesn't name one — matches the common
/// case of a single tracked page per server instance.
const DEFAULT_PAGE: &str = "default";

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct RenderParam {
    /// Which fields to populate: "minimal", "summary" (default), or "full".
    #[serde(default)]
    pub detail: Option<String>,
    /// CSS selector to scope the render to a subtree. Errors if nothing matches.
    #[serde(default)]
    pub selector: Option<String>,
    /// Reserved for future computed-style extraction; currently has no effect.
    #[serde(default)]
    pub include_styles: Option<bool>,
    /// Page to render, from a prior session. Defaults to the single tracked page.
    #[serde(default)]
    pub page_id: Option<String>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct ResolveElementParam {
    /// Element id from a prior render, e.g. "btn-a1b2".
    pub id: String,
    #[serde(default)]
    pub page_id: Option<String>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct FindSimilarParam {
    /// Element id that no longer resolves against the current page.
    pub id: String,
    /// Element ids from the most recent render, to search for a same-prefix match.
    pub current_elements: Vec<String>,
    #[serde(default)]
    pub page_id: Option<String>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct SnapshotGetParam {
    /// Snapshot id returned by a prior render.
    pub id: u64,
    #[serde(default)]
    pub page_id: Option<String>,
}

#[derive(Clone)]
pub struct CharlotteToolServer {
    registry: Arc<SessionRegistry>,
    tool_router: ToolRouter<Self>,
}

impl CharlotteToolServer {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry, tool_router: Self::tool_router() }
    }

    fn page_id(requested: Option<&str>) -> String {
        requested.unwrap_or(DEFAULT_PAGE).to_string()
    }

    fn text_result(value: &impl serde::Serialize) -> Result<CallToolResult, McpError> {
        let text = serde_json::to_string(value).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    fn error_result(err: CharlotteError) -> McpError {
        McpError::internal_error(err.to_envelope().to_string(), None)
    }

    fn page_not_tracked(page_id: &str) -> McpError {
        McpError::internal_error(format!("page '{}' is not tracked by this server", page_id), None)
    }
}

#[tool_router]
impl CharlotteToolServer {
    #[tool(description = "Render the current page into a compact, stable Page Representation: landmarks, headings, interactive elements, forms, and (depending on detail) a content summary or full text. Returns element ids usable with resolve_element. Call this first on any new page.")]
    async fn render(&self, Parameters(p): Parameters<RenderParam>) -> Result<CallToolResult, McpError> {
        let page_id = Self::page_id(p.page_id.as_deref());
        let session = self.registry.get(&page_id).ok_or_else(|| Self::page_not_tracked(&page_id))?;

        let detail = match p.detail.as_deref() {
            Some("minimal") => Some(DetailLevel::Minimal),
            Some("summary") => Some(DetailLevel::Summary),
            Some("full") => Some(DetailLevel::Full),
            Some(other) => {
                return Err(McpError::internal_error(format!("unknown detail level '{}'", other), None))
            }
            None => None,
        };
        let options = RenderOptions {
            detail,
            selector: p.selector,
            include_styles: p.include_styles.unwrap_or(false),
        };

        let representation = session.pipeline.render(options).await.map_err(Self::error_result)?;
        let snapshot = session.snapshots.lock().push(representation);
        Self::text_result(&snapshot.representation)
    }

    #[tool(description = "Resolve a stable element id from a prior render to the browser's backend DOM node id. Returns an error if the id is unknown to the most recently published render.")]
    async fn resolve_element(
        &self,
        Parameters(p): Parameters<ResolveElementParam>,
    ) -> Result<CallToolResult, McpError> {
        let page_id = Self::page_id(p.page_id.as_deref());
        let session = self.registry.get(&page_id).ok_or_else(|| Self::page_not_tracked(&page_id))?;

        match session.pipeline.resolve_element(&p.id) {
            Some(backend_id) => Self::text_result(&serde_json::json!({ "backend_dom_node_id": backend_id })),
            None => Err(Self::error_result(CharlotteError::ElementNotFound(p.id))),
        }
    }

    #[tool(description = "Recovery path for an element id that no longer resolves, likely because the page re-rendered. Pass the stale id and the current_elements list from the latest render; returns the one current element sharing its type prefix, if exactly one does.")]
    async fn find_similar(&self, Parameters(p): Parameters<FindSimilarParam>) -> Result<CallToolResult, McpError> {
        let page_id = Self::page_id(p.page_id.as_deref());
        let session = self.registry.get(&page_id).ok_or_else(|| Self::page_not_tracked(&page_id))?;

        match session.pipeline.find_similar(&p.id, &p.current_elements) {
            Some(candidate) => Self::text_result(&serde_json::json!({ "id": candidate })),
            None => Self::text_result(&serde_json::json!({ "id": serde_json::Value::Null })),
        }
    }

    #[tool(description = "Retrieve a previously returned Page Representation by its snapshot id. Errors with SNAPSHOT_EXPIRED if the id has been evicted from the ring buffer, or a not-found error if it was never assigned.")]
    async fn snapshot_get(&self, Parameters(p): Parameters<SnapshotGetParam>) -> Result<CallToolResult, McpError> {
        let page_id = Self::page_id(p.page_id.as_deref());
        let session = self.registry.get(&page_id).ok_or_else(|| Self::page_not_tracked(&page_id))?;

        let store = session.snapshots.lock();
        match store.get_or_expired(p.id) {
            Ok(Some(snapshot)) => Self::text_result(snapshot),
            Ok(None) => Err(McpError::internal_error(format!("no snapshot with id {}", p.id), None)),
            Err(e) => Err(Self::error_result(e)),
        }
    }
}

#[tool_handler]
impl ServerHandler for CharlotteToolServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "charlotte".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: Some("Charlotte Renderer Pipeline".into()),
                description: Some(
                    "Exposes a live browser's accessibility tree as a compact, stable Page Representation"
                        .into(),
                ),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "# Charlotte\n\
                 \n\
                 ## Workflow\n\
                 ```\n\
                 1. render            -> Page Representation with stable element ids\n\
                 2. resolve_element   -> backend DOM node id for an action tool to use\n\
                 3. find_similar      -> recover an id after a re-render\n\
                 4. snapshot_get      -> re-read a past render by its snapshot id\n\
                 ```\n\
                 Element ids are stable only against the most recently published render; \
                 if an id stops resolving after the page changes, re-render and use \
                 find_similar with the stale id."
                    .into(),
            ),
        }
    }

    async fn initialize(
        &self,
        _request: InitializeRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<InitializeResult, McpError> {
        Ok(self.get_info())
    }
}
