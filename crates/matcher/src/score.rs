//! Free-text scoring of a task against a spike spec.
//!
//! An alias table short-circuits keyword scoring: when the query names an
//! alias (bare token or `[alias: X]` marker) the aliased id scores
//! [`ALIAS_SCORE`], strictly above any keyword score, which is capped at 1.0.

use once_cell::sync::Lazy;
use regex::Regex;
use spike_protocol::SpikeSpec;

/// Dominant score for alias hits. Keyword scores never exceed 1.0.
pub const ALIAS_SCORE: f32 = 100.0;

/// Canonical short tokens mapped to one specific spike id.
pub const ALIASES: &[(&str, &str)] = &[
    ("auth-mw-ts", "strike-auth0-middleware-secure-ts"),
    ("elysia-worker-ts", "strike-bun-elysia-worker-typed-ts"),
    ("express-api-ts", "strike-express-route-typed-ts"),
    ("graphql-server-ts", "strike-apollo-graphql-server-typed-ts"),
    ("hono-route-ts", "strike-hono-route-typed-ts"),
    ("next-mw-ts", "strike-nextjs-middleware-typed-ts"),
    ("prisma-schema-ts", "strike-prisma-schema-typed-ts"),
    ("react-component-ts", "strike-react-component-typed-ts"),
    ("redis-cache-ts", "strike-redis-cache-typed-ts"),
    ("stripe-webhook-ts", "strike-stripe-webhook-typed-ts"),
];

static ALIAS_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[\s*alias\s*:\s*([A-Za-z0-9._@-]+)\s*\]").unwrap());

fn alias_id_for(token: &str) -> Option<&'static str> {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == token)
        .map(|(_, id)| *id)
}

/// Case-fold and tokenize. Punctuation becomes whitespace except the
/// id-significant `- _ . @`; mixed scripts survive as their own tokens.
pub fn normalize(text: &str) -> Vec<String> {
    let folded: String = text
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '@') {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                ' '
            }
        })
        .collect();
    folded.split_whitespace().map(str::to_string).collect()
}

/// The id an explicit alias in the query points at, if any. The bracketed
/// marker wins over bare tokens.
pub fn alias_target(query: &str) -> Option<&'static str> {
    if let Some(caps) = ALIAS_MARKER.captures(query) {
        let token = caps[1].to_lowercase();
        if let Some(id) = alias_id_for(&token) {
            return Some(id);
        }
    }
    normalize(query)
        .iter()
        .find_map(|token| alias_id_for(token))
}

/// Token-overlap score of `query` against the spec's metadata, in [0, 1]
/// unless an alias matches, in which case [`ALIAS_SCORE`].
pub fn score(query: &str, spec: &SpikeSpec) -> f32 {
    if let Some(target) = alias_target(query) {
        if target == spec.id {
            return ALIAS_SCORE;
        }
    }
    keyword_score(query, spec)
}

fn keyword_score(query: &str, spec: &SpikeSpec) -> f32 {
    let tokens = normalize(query);
    if tokens.is_empty() {
        return 0.0;
    }

    let name = spec.name.to_lowercase();
    let description = spec
        .description
        .as_deref()
        .map(str::to_lowercase)
        .unwrap_or_default();
    let stack: Vec<String> = spec.stack.iter().map(|s| s.to_lowercase()).collect();
    let tags: Vec<String> = spec.tags.iter().map(|t| t.to_lowercase()).collect();

    let mut credit = 0.0f32;
    for token in &tokens {
        let strong = name.contains(token)
            || stack.iter().any(|s| s.contains(token))
            || tags.iter().any(|t| t.contains(token));
        if strong {
            credit += 1.0;
        } else if description.contains(token) {
            credit += 0.5;
        }
    }
    credit / tokens.len() as f32
}

/// Reported confidence for an auto-selected best score: clamped to
/// [0.10, 1.00] and rounded to two decimals. The floor keeps a "some match
/// found" signal from reading as zero confidence.
pub fn coverage_score(best: f32) -> f32 {
    let clamped = best.clamp(0.10, 1.00);
    (clamped * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use spike_generator::generate_spike;

    #[test]
    fn normalize_folds_case_and_strips_punctuation() {
        assert_eq!(
            normalize("Create: a NEW Worker! (now)"),
            vec!["create", "a", "new", "worker", "now"]
        );
        // Hyphenated alias tokens survive tokenization.
        assert_eq!(normalize("use next-mw-ts"), vec!["use", "next-mw-ts"]);
    }

    #[test]
    fn normalize_keeps_mixed_scripts() {
        let tokens = normalize("Elysia の typed worker を TypeScript で作成");
        assert!(tokens.contains(&"elysia".to_string()));
        assert!(tokens.contains(&"typescript".to_string()));
        // Splitting is whitespace-only, so CJK runs survive unsegmented.
        assert!(tokens.contains(&"で作成".to_string()));
        assert!(tokens.contains(&"の".to_string()));
    }

    #[test]
    fn bracketed_alias_marker_is_detected_anywhere() {
        assert_eq!(
            alias_target("生成: [alias: prisma-schema-ts] で"),
            Some("strike-prisma-schema-typed-ts")
        );
        assert_eq!(
            alias_target("[ALIAS:  next-mw-ts ] refactor"),
            Some("strike-nextjs-middleware-typed-ts")
        );
        assert_eq!(alias_target("[alias: unknown-token]"), None);
    }

    #[test]
    fn alias_score_dominates_keyword_overlap() {
        let aliased = generate_spike("strike-nextjs-middleware-typed-ts").unwrap();
        let competitor = generate_spike("strike-express-middleware-typed-ts").unwrap();

        let query = "[alias: next-mw-ts] refactor middleware";
        let aliased_score = score(query, &aliased);
        let competitor_score = score(query, &competitor);
        assert_eq!(aliased_score, ALIAS_SCORE);
        assert!(competitor_score <= 1.0);
        assert!(aliased_score > competitor_score);
    }

    #[test]
    fn keyword_score_is_a_fraction_of_matched_tokens() {
        let spec = generate_spike("strike-redis-cache-typed-ts").unwrap();
        let full = score("redis cache", &spec);
        let half = score("redis pottery", &spec);
        assert_eq!(full, 1.0);
        assert_eq!(half, 0.5);
        assert_eq!(score("", &spec), 0.0);
    }

    #[test]
    fn coverage_is_floored_clamped_and_rounded() {
        assert_eq!(coverage_score(0.0), 0.10);
        assert_eq!(coverage_score(0.333), 0.33);
        assert_eq!(coverage_score(ALIAS_SCORE), 1.0);
    }
}
