//! MCP tools for spike discovery and synthesis.
//!
//! Thin protocol shims over [`crate::ops`]: each tool re-resolves the
//! runtime limits, opens the catalog, delegates, and serializes the result.

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::schemars;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::Deserialize;
use serde_json::{Map, Value};
use spike_catalog::SpikeCatalog;

use crate::limits::{resolve, RuntimeLimits};
use crate::ops;

/// Spike MCP service.
#[derive(Clone)]
pub struct SpikeService {
    tool_router: ToolRouter<Self>,
}

impl SpikeService {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }

    /// Limits are re-read from the environment on every call; callers may
    /// change them between calls.
    fn open(&self) -> (SpikeCatalog, RuntimeLimits) {
        let limits = resolve();
        let catalog = SpikeCatalog::at(&limits.catalog_dir);
        (catalog, limits)
    }
}

impl Default for SpikeService {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_handler]
impl ServerHandler for SpikeService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some("Spike scaffolds for AI agents. Use 'discover' to search the spec universe, 'auto' to pick the best spike for a task, 'preview' to render files, 'validate' to check parameters, 'apply' for the final rendering, and 'explain' for metadata.".into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }
}

fn success<T: serde::Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(value).unwrap_or_default(),
    )]))
}

fn failure(err: anyhow::Error) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::error(vec![Content::text(format!(
        "Error: {err:#}"
    ))]))
}

// ============================================================================
// Tool Input Schemas
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DiscoverRequest {
    /// Free-text task description; omit to browse the universe in order.
    #[schemars(description = "Natural language task description")]
    pub query: Option<String>,

    /// Built-in pack narrowing the id space by attribute.
    #[schemars(description = "Pack name (frontend, api, data, secure-ops, testing, realtime)")]
    pub pack: Option<String>,

    /// Maximum results (default: 10).
    #[schemars(description = "Maximum number of results (1-100)")]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PreviewRequest {
    /// Spike id (catalog name or generated id).
    #[schemars(description = "Spike id, e.g. strike-nextjs-middleware-typed-ts")]
    pub id: String,

    /// Template parameters substituted into placeholders.
    #[schemars(description = "Placeholder parameters, e.g. {\"model\": \"User\"}")]
    pub params: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ApplyRequest {
    #[schemars(description = "Spike id, e.g. strike-nextjs-middleware-typed-ts")]
    pub id: String,

    #[schemars(description = "Placeholder parameters")]
    pub params: Option<Map<String, Value>>,

    /// Merge strategy echoed back to the caller: overwrite,
    /// three_way_merge or abort.
    #[schemars(description = "Apply strategy: overwrite | three_way_merge | abort")]
    pub strategy: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ValidateRequest {
    #[schemars(description = "Spike id to validate")]
    pub id: String,

    #[schemars(description = "Placeholder parameters")]
    pub params: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ExplainRequest {
    #[schemars(description = "Spike id to explain")]
    pub id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AutoRequest {
    /// Natural-language task, any language; `[alias: X]` markers honored.
    #[schemars(description = "Task description")]
    pub task: String,

    /// Carried unchanged into the suggested next-action parameters.
    #[schemars(description = "Constraints forwarded as template parameters")]
    pub constraints: Option<Map<String, Value>>,
}

// ============================================================================
// Tools
// ============================================================================

#[tool_router]
impl SpikeService {
    /// Ranked discovery across catalog and generated specs.
    #[tool(description = "Discover spike scaffolds by free-text query, optionally narrowed by a pack. Returns ranked {id, name, stack, tags, score}.")]
    pub async fn discover(
        &self,
        Parameters(request): Parameters<DiscoverRequest>,
    ) -> Result<CallToolResult, McpError> {
        let (catalog, limits) = self.open();
        let limit = request.limit.unwrap_or(10).clamp(1, 100);
        match ops::discover(
            &catalog,
            &limits,
            request.query.as_deref(),
            request.pack.as_deref(),
            limit,
        ) {
            Ok(items) => success(&items),
            Err(e) => failure(e),
        }
    }

    /// Render a spike without touching the target project.
    #[tool(description = "Preview a spike: render its file templates and patches with the given parameters. Nothing is written.")]
    pub async fn preview(
        &self,
        Parameters(request): Parameters<PreviewRequest>,
    ) -> Result<CallToolResult, McpError> {
        let (catalog, _) = self.open();
        match ops::preview(&catalog, &request.id, request.params.as_ref()) {
            Ok(result) => success(&result),
            Err(e) => failure(e),
        }
    }

    /// Same rendering as preview plus the echoed strategy; persistence is
    /// the caller's job.
    #[tool(description = "Produce the final rendering of a spike for application. The server never writes to the target project; the caller applies the files.")]
    pub async fn apply(
        &self,
        Parameters(request): Parameters<ApplyRequest>,
    ) -> Result<CallToolResult, McpError> {
        let (catalog, _) = self.open();
        match ops::apply(
            &catalog,
            &request.id,
            request.params.as_ref(),
            request.strategy.as_deref(),
        ) {
            Ok(result) => success(&result),
            Err(e) => failure(e),
        }
    }

    /// Structural checks only; generated code is never executed.
    #[tool(description = "Validate a spike against parameters: unresolved placeholders, duplicate or escaping paths. Structural only.")]
    pub async fn validate(
        &self,
        Parameters(request): Parameters<ValidateRequest>,
    ) -> Result<CallToolResult, McpError> {
        let (catalog, _) = self.open();
        match ops::validate(&catalog, &request.id, request.params.as_ref()) {
            Ok(result) => success(&result),
            Err(e) => failure(e),
        }
    }

    #[tool(description = "Human-readable metadata summary for one spike id.")]
    pub async fn explain(
        &self,
        Parameters(request): Parameters<ExplainRequest>,
    ) -> Result<CallToolResult, McpError> {
        let (catalog, _) = self.open();
        match ops::explain(&catalog, &request.id) {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(e) => failure(e),
        }
    }

    /// One-call selection for a task.
    #[tool(description = "Pick the single best spike for a task. Returns the selected id, a coverage score in [0.10, 1.00], runner-up candidates and suggested next actions.")]
    pub async fn auto(
        &self,
        Parameters(request): Parameters<AutoRequest>,
    ) -> Result<CallToolResult, McpError> {
        let (catalog, limits) = self.open();
        match ops::auto(
            &catalog,
            &limits,
            &request.task,
            request.constraints.as_ref(),
        ) {
            Ok(result) => success(&result),
            Err(e) => failure(e),
        }
    }
}
