//! Core operations behind the tool surface. Pure orchestration over the
//! catalog, generator, matcher and packs crates; the rmcp layer in
//! `tools.rs` only shuttles JSON in and out.

use std::collections::BTreeMap;

use anyhow::{bail, Context as AnyhowContext, Result};
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::{json, Map, Value};
use spike_catalog::SpikeCatalog;
use spike_generator::{generate_spike, is_generated_id};
use spike_matcher::{auto_select, rank, Candidate};
use spike_packs::PackMatcher;
use spike_protocol::{
    render::unresolved_placeholders, render_template, SpikeSpec, ToolNextAction,
};

use crate::limits::RuntimeLimits;

#[derive(Debug, Serialize, JsonSchema)]
pub struct DiscoverItem {
    pub id: String,
    pub name: String,
    pub stack: Vec<String>,
    pub tags: Vec<String>,
    pub score: f32,
}

impl From<Candidate> for DiscoverItem {
    fn from(c: Candidate) -> Self {
        Self {
            id: c.id,
            name: c.name,
            stack: c.stack,
            tags: c.tags,
            score: c.score,
        }
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct RenderedFile {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct RenderedPatch {
    pub path: String,
    pub diff: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct PreviewResult {
    pub id: String,
    pub name: String,
    pub files: Vec<RenderedFile>,
    pub patches: Vec<RenderedPatch>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ApplyResult {
    pub id: String,
    pub strategy: String,
    pub files: Vec<RenderedFile>,
    pub patches: Vec<RenderedPatch>,
    /// The core never writes into the target project.
    pub note: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ValidateResult {
    pub id: String,
    pub status: String,
    pub issues: Vec<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct AutoResult {
    pub selected: Option<DiscoverItem>,
    pub coverage_score: f32,
    pub candidates: Vec<DiscoverItem>,
    pub next_actions: Vec<ToolNextAction>,
}

/// Resolve an id against the catalog first, then the generated grammar.
pub fn resolve_spec(catalog: &SpikeCatalog, id: &str) -> Result<SpikeSpec> {
    match catalog.load_spec(id) {
        Ok(spec) => return Ok(spec),
        Err(e) if e.is_not_found() => {}
        Err(e) => return Err(e).with_context(|| format!("loading catalog spike '{id}'")),
    }
    if is_generated_id(id) {
        return generate_spike(id).with_context(|| format!("generating spike '{id}'"));
    }
    bail!("spike '{id}' not found: not in the catalog and not a generated id")
}

fn string_params(params: Option<&Map<String, Value>>) -> BTreeMap<String, String> {
    params
        .map(|map| {
            map.iter()
                .map(|(k, v)| {
                    let value = match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (k.clone(), value)
                })
                .collect()
        })
        .unwrap_or_default()
}

pub fn discover(
    catalog: &SpikeCatalog,
    limits: &RuntimeLimits,
    query: Option<&str>,
    pack: Option<&str>,
    limit: usize,
) -> Result<Vec<DiscoverItem>> {
    let matcher = match pack {
        Some(name) => Some(
            PackMatcher::for_name(name)
                .with_context(|| format!("unknown pack '{name}'"))?,
        ),
        None => None,
    };
    let accept = matcher.as_ref().map(|m| {
        move |id: &str| m.allows(id)
    });
    let accept_dyn: Option<&dyn Fn(&str) -> bool> =
        accept.as_ref().map(|f| f as &dyn Fn(&str) -> bool);

    let ranked = rank(query, catalog, &limits.selection, accept_dyn, limit);
    Ok(ranked.into_iter().map(DiscoverItem::from).collect())
}

fn render_spec(
    spec: &SpikeSpec,
    params: &BTreeMap<String, String>,
) -> (Vec<RenderedFile>, Vec<RenderedPatch>) {
    let files = spec
        .files
        .iter()
        .map(|f| RenderedFile {
            path: render_template(&f.path, params),
            content: render_template(&f.template, params),
        })
        .collect();
    let patches = spec
        .patches
        .iter()
        .map(|p| RenderedPatch {
            path: render_template(&p.path, params),
            diff: render_template(&p.diff, params),
        })
        .collect();
    (files, patches)
}

pub fn preview(
    catalog: &SpikeCatalog,
    id: &str,
    params: Option<&Map<String, Value>>,
) -> Result<PreviewResult> {
    let spec = resolve_spec(catalog, id)?;
    let params = string_params(params);
    let (files, patches) = render_spec(&spec, &params);
    Ok(PreviewResult {
        id: spec.id.clone(),
        name: spec.name.clone(),
        files,
        patches,
    })
}

pub fn apply(
    catalog: &SpikeCatalog,
    id: &str,
    params: Option<&Map<String, Value>>,
    strategy: Option<&str>,
) -> Result<ApplyResult> {
    let strategy = match strategy.unwrap_or("overwrite") {
        s @ ("overwrite" | "three_way_merge" | "abort") => s,
        other => bail!("unknown apply strategy '{other}'"),
    };
    let rendered = preview(catalog, id, params)?;
    Ok(ApplyResult {
        id: rendered.id,
        strategy: strategy.to_string(),
        files: rendered.files,
        patches: rendered.patches,
        note: "rendered only; nothing was written to the target project".to_string(),
    })
}

pub fn validate(
    catalog: &SpikeCatalog,
    id: &str,
    params: Option<&Map<String, Value>>,
) -> Result<ValidateResult> {
    let spec = resolve_spec(catalog, id)?;
    let params = string_params(params);
    let mut issues = Vec::new();

    if spec.files.is_empty() {
        issues.push("spike emits no files".to_string());
    }
    let mut seen_paths: Vec<&str> = Vec::new();
    for file in &spec.files {
        if file.path.trim().is_empty() {
            issues.push("file with empty path".to_string());
            continue;
        }
        if file.path.starts_with('/') || file.path.split('/').any(|seg| seg == "..") {
            issues.push(format!("path escapes the project root: {}", file.path));
        }
        if seen_paths.contains(&file.path.as_str()) {
            issues.push(format!("duplicate file path: {}", file.path));
        }
        seen_paths.push(&file.path);
        for missing in unresolved_placeholders(&file.path, &params) {
            issues.push(format!(
                "unresolved placeholder '{{{{{missing}}}}}' in path {}",
                file.path
            ));
        }
        for missing in unresolved_placeholders(&file.template, &params) {
            issues.push(format!(
                "unresolved placeholder '{{{{{missing}}}}}' in {}",
                file.path
            ));
        }
    }

    let status = if issues.is_empty() { "valid" } else { "invalid" };
    Ok(ValidateResult {
        id: spec.id,
        status: status.to_string(),
        issues,
    })
}

pub fn explain(catalog: &SpikeCatalog, id: &str) -> Result<String> {
    let spec = resolve_spec(catalog, id)?;
    let mut lines = vec![format!("# {} ({})", spec.name, spec.id)];
    if let Some(version) = &spec.version {
        lines.push(format!("version: {version}"));
    }
    if let Some(description) = &spec.description {
        lines.push(description.clone());
    }
    if !spec.stack.is_empty() {
        lines.push(format!("stack: {}", spec.stack.join(", ")));
    }
    if !spec.tags.is_empty() {
        lines.push(format!("tags: {}", spec.tags.join(", ")));
    }
    lines.push(format!(
        "files ({}):",
        spec.files.len()
    ));
    for file in &spec.files {
        lines.push(format!("  - {}", file.path));
    }
    if !spec.patches.is_empty() {
        lines.push(format!("patches ({}):", spec.patches.len()));
        for patch in &spec.patches {
            lines.push(format!("  - {}", patch.path));
        }
    }
    let mut placeholders: Vec<String> = Vec::new();
    for file in &spec.files {
        for name in spike_protocol::placeholder_names(&file.template) {
            if !placeholders.contains(&name) {
                placeholders.push(name);
            }
        }
    }
    if !placeholders.is_empty() {
        lines.push(format!("params: {}", placeholders.join(", ")));
    }
    Ok(lines.join("\n"))
}

pub fn auto(
    catalog: &SpikeCatalog,
    limits: &RuntimeLimits,
    task: &str,
    constraints: Option<&Map<String, Value>>,
) -> Result<AutoResult> {
    if task.trim().is_empty() {
        bail!("task must not be empty");
    }
    let selection = auto_select(task, catalog, &limits.selection);
    let selected = selection.best.map(DiscoverItem::from);

    let next_actions = selected
        .as_ref()
        .map(|best| {
            let params = constraints
                .cloned()
                .map(Value::Object)
                .unwrap_or_else(|| json!({}));
            vec![
                ToolNextAction {
                    tool: "preview".to_string(),
                    args: json!({ "id": best.id, "params": params.clone() }),
                    reason: "inspect the rendered files before applying".to_string(),
                },
                ToolNextAction {
                    tool: "validate".to_string(),
                    args: json!({ "id": best.id, "params": params }),
                    reason: "check for unresolved placeholders and path issues".to_string(),
                },
            ]
        })
        .unwrap_or_default();

    Ok(AutoResult {
        selected,
        coverage_score: selection.coverage_score,
        candidates: selection.top.into_iter().map(DiscoverItem::from).collect(),
        next_actions,
    })
}
