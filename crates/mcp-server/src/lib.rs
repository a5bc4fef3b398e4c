//! Spike MCP server: tool surface, core operations and runtime limits.

pub mod limits;
pub mod ops;
pub mod tools;

pub use tools::SpikeService;
