//! Total template rendering.
//!
//! Substitution order for every `{{ident}}` placeholder: caller-supplied
//! parameter, then [`DEFAULT_PARAMS`], then the literal placeholder text.
//! Rendering never fails.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").unwrap());

/// Documented fallbacks for common placeholders.
pub const DEFAULT_PARAMS: &[(&str, &str)] = &[
    ("app_name", "my-app"),
    ("name", "Example"),
    ("model", "Item"),
    ("port", "3000"),
    ("route", "/api/example"),
    ("table", "items"),
];

fn default_param(name: &str) -> Option<&'static str> {
    DEFAULT_PARAMS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| *value)
}

/// Substitute placeholders in `template` with `params`, falling back to
/// [`DEFAULT_PARAMS`] and then the literal placeholder.
pub fn render_template(template: &str, params: &BTreeMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            params
                .get(name)
                .map(String::as_str)
                .or_else(|| default_param(name))
                .map(str::to_string)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Distinct placeholder names in declaration order.
pub fn placeholder_names(template: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for caps in PLACEHOLDER.captures_iter(template) {
        let name = caps[1].to_string();
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}

/// Placeholders in `template` that neither `params` nor the defaults cover.
pub fn unresolved_placeholders(
    template: &str,
    params: &BTreeMap<String, String>,
) -> Vec<String> {
    placeholder_names(template)
        .into_iter()
        .filter(|name| !params.contains_key(name) && default_param(name).is_none())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn caller_params_win_over_defaults() {
        let out = render_template("model {{model}} on {{port}}", &params(&[("model", "User")]));
        assert_eq!(out, "model User on 3000");
    }

    #[test]
    fn unknown_placeholder_survives_literally() {
        let out = render_template("hello {{nobody_defines_this}}", &params(&[]));
        assert_eq!(out, "hello {{nobody_defines_this}}");
    }

    #[test]
    fn whitespace_inside_braces_tolerated() {
        let out = render_template("{{ name }} / {{name}}", &params(&[("name", "X")]));
        assert_eq!(out, "X / X");
    }

    #[test]
    fn placeholder_names_are_distinct_and_ordered() {
        let names = placeholder_names("{{b}} {{a}} {{b}}");
        assert_eq!(names, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn unresolved_excludes_params_and_defaults() {
        let left = unresolved_placeholders("{{model}} {{custom}}", &params(&[]));
        assert_eq!(left, vec!["custom".to_string()]);
        let left = unresolved_placeholders("{{custom}}", &params(&[("custom", "v")]));
        assert!(left.is_empty());
    }
}
