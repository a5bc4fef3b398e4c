//! Spike MCP Server
//!
//! Serves spike scaffold discovery and synthesis to AI agents via MCP.
//!
//! ## Tools
//!
//! - `discover` - Ranked search across catalog and generated specs
//! - `auto` - Pick the single best spike for a free-text task
//! - `preview` / `apply` - Render files and patches (never persisted)
//! - `validate` - Structural checks for parameters and paths
//! - `explain` - Metadata summary for one id
//!
//! ## Usage
//!
//! Add to your MCP client configuration:
//! ```json
//! {
//!   "mcpServers": {
//!     "spikes": {
//!       "command": "spike-mcp"
//!     }
//!   }
//! }
//! ```

use anyhow::Result;
use rmcp::transport::stdio;
use rmcp::ServiceExt;

use spike_mcp::SpikeService;

#[tokio::main]
async fn main() -> Result<()> {
    // Configure logging to stderr only (stdout is for MCP protocol)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    log::info!("Starting Spike MCP server");

    let service = SpikeService::new();
    let server = service.serve(stdio()).await?;

    // Wait for shutdown
    server.waiting().await?;

    log::info!("Spike MCP server stopped");
    Ok(())
}
