use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub mod render;

pub use render::{placeholder_names, render_template, DEFAULT_PARAMS};

/// A reusable scaffold template: a named set of file templates plus
/// optional patches against an existing project.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct SpikeSpec {
    /// Unique key: either a catalog filename stem or a generated-grammar id.
    /// Catalog files may omit it; the store fills it from the filename.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordered technology labels, most significant first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stack: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileTemplate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patches: Vec<Patch>,
}

/// One file emitted by a spike. `template` may contain `{{ident}}`
/// placeholders; rendering is total and never fails.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct FileTemplate {
    /// Relative path inside the target project.
    pub path: String,
    pub template: String,
}

/// A diff the caller may apply to an existing file. The core only renders
/// the text; it never writes into the target project.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct Patch {
    pub path: String,
    pub diff: String,
}

/// Suggested follow-up tool call, surfaced to the client verbatim.
#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct ToolNextAction {
    pub tool: String,
    pub args: serde_json::Value,
    pub reason: String,
}

impl SpikeSpec {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
