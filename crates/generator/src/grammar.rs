//! The generated-id grammar and its boundedly-enumerable address space.
//!
//! `id = [prefix "-"] lib "-" pattern "-" style "-" lang` with prefix in
//! {`gen`, `strike`}. The full space is the cartesian product of the four
//! attribute sets, addressed by integer index via mixed-radix decomposition
//! so it is never materialized.

use std::collections::BTreeSet;

pub const GEN_PREFIX: &str = "gen";
pub const STRIKE_PREFIX: &str = "strike";

/// Libraries, frameworks and SDKs. Alphabetical; hyphenated entries allowed.
pub const LIBS: &[&str] = &[
    "angular",
    "ansible",
    "anthropic",
    "apollo",
    "astro",
    "auth0",
    "aws-lambda",
    "axum",
    "bun-elysia",
    "clerk",
    "cloudflare-workers",
    "deno-fresh",
    "django",
    "docker",
    "drizzle",
    "electron",
    "express",
    "fastapi",
    "fastify",
    "firebase",
    "flask",
    "gin",
    "github-actions",
    "graphql-yoga",
    "grpc",
    "hono",
    "kafka",
    "koa",
    "kubernetes",
    "langchain",
    "laravel",
    "mongodb",
    "mongoose",
    "mysql",
    "nats",
    "nestjs",
    "nextjs",
    "nuxt",
    "openai",
    "playwright",
    "postgres",
    "prisma",
    "pulumi",
    "qdrant",
    "rabbitmq",
    "rails",
    "react",
    "redis",
    "remix",
    "sequelize",
    "solid",
    "spring",
    "sqlite",
    "stripe",
    "supabase",
    "svelte",
    "tailwind",
    "terraform",
    "trpc",
    "vue",
];

/// Scaffold kinds.
pub const PATTERNS: &[&str] = &[
    "adapter",
    "cache",
    "client",
    "component",
    "config",
    "crud",
    "dnd",
    "docs",
    "example",
    "export",
    "graphql-client",
    "graphql-server",
    "hook",
    "listener",
    "middleware",
    "migration",
    "provider",
    "queue",
    "realtime",
    "replay",
    "route",
    "schema",
    "server",
    "service",
    "snapshot",
    "virtualize",
    "webhook",
    "worker",
];

/// Authoring styles.
pub const STYLES: &[&str] = &["advanced", "basic", "secure", "testing", "typed"];

/// Language tags.
pub const LANGS: &[&str] = &[
    "cs", "dart", "go", "java", "js", "kt", "php", "py", "rb", "rs", "swift", "ts",
];

/// Patterns that themselves contain a hyphen. Parsing prefers these over the
/// positional single-token pattern so `apollo-graphql-server-typed-ts` does
/// not misattribute `graphql` to the lib.
const HYPHENATED_PATTERNS: &[&str] = &["graphql-client", "graphql-server"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedIdComponents {
    pub prefix: Option<String>,
    pub lib: String,
    pub pattern: String,
    pub style: String,
    pub lang: String,
}

impl GeneratedIdComponents {
    pub fn is_strike(&self) -> bool {
        self.prefix.as_deref() == Some(STRIKE_PREFIX)
    }
}

fn is_id_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Parse an id into its components.
///
/// The three rightmost hyphen-delimited fields are pattern, style and lang;
/// everything before (minus an optional `gen-`/`strike-` prefix) is the lib,
/// which may itself contain hyphens. A two-token pattern is preferred only
/// when it is a known hyphenated pattern and a non-empty lib remains.
///
/// Permissive by design: shape-correct ids whose tokens fall outside the
/// known sets still parse, and generation routes them to the generic
/// fallback.
pub fn parse_generated_id(id: &str) -> Option<GeneratedIdComponents> {
    let mut tokens: Vec<&str> = id.split('-').collect();
    if !tokens.iter().all(|t| is_id_token(t)) {
        return None;
    }

    let prefix = match tokens.first() {
        Some(&t) if t == GEN_PREFIX || t == STRIKE_PREFIX => {
            tokens.remove(0);
            Some(t.to_string())
        }
        _ => None,
    };

    let n = tokens.len();
    if n < 4 {
        return None;
    }

    let lang = tokens[n - 1].to_string();
    let style = tokens[n - 2].to_string();

    let two_token = if n >= 5 {
        let joined = format!("{}-{}", tokens[n - 4], tokens[n - 3]);
        HYPHENATED_PATTERNS.contains(&joined.as_str()).then_some(joined)
    } else {
        None
    };

    let (pattern, lib_tokens) = match two_token {
        Some(joined) => (joined, &tokens[..n - 4]),
        None => (tokens[n - 3].to_string(), &tokens[..n - 3]),
    };

    Some(GeneratedIdComponents {
        prefix,
        lib: lib_tokens.join("-"),
        pattern,
        style,
        lang,
    })
}

/// True iff the id matches the grammar shape. Unknown component tokens are
/// accepted (permissive); only the shape is checked.
pub fn is_generated_id(id: &str) -> bool {
    parse_generated_id(id).is_some()
}

/// Size of the 4-tuple space. Exceeds 100,000 by construction.
pub fn total_space() -> usize {
    LIBS.len() * PATTERNS.len() * STYLES.len() * LANGS.len()
}

/// Decode the Nth tuple of the space, lib-major digit order. O(1); listing
/// the first L ids via repeated decode costs O(L) regardless of the total.
pub fn decode_index(index: usize) -> Option<GeneratedIdComponents> {
    if index >= total_space() {
        return None;
    }
    let mut n = index;
    let lang = LANGS[n % LANGS.len()];
    n /= LANGS.len();
    let style = STYLES[n % STYLES.len()];
    n /= STYLES.len();
    let pattern = PATTERNS[n % PATTERNS.len()];
    n /= PATTERNS.len();
    let lib = LIBS[n];

    Some(GeneratedIdComponents {
        prefix: Some(STRIKE_PREFIX.to_string()),
        lib: lib.to_string(),
        pattern: pattern.to_string(),
        style: style.to_string(),
        lang: lang.to_string(),
    })
}

/// Canonical branded rendering used by enumeration.
pub fn render_id(c: &GeneratedIdComponents) -> String {
    match &c.prefix {
        Some(prefix) => format!("{}-{}-{}-{}-{}", prefix, c.lib, c.pattern, c.style, c.lang),
        None => format!("{}-{}-{}-{}", c.lib, c.pattern, c.style, c.lang),
    }
}

/// Include-set filter over the four attributes. Empty set = include-all.
#[derive(Debug, Clone, Default)]
pub struct GeneratedIdFilter {
    pub libs: BTreeSet<String>,
    pub patterns: BTreeSet<String>,
    pub styles: BTreeSet<String>,
    pub langs: BTreeSet<String>,
}

fn retained<'a>(all: &'a [&'a str], include: &BTreeSet<String>) -> Vec<&'a str> {
    if include.is_empty() {
        all.to_vec()
    } else {
        all.iter()
            .copied()
            .filter(|v| include.contains(*v))
            .collect()
    }
}

/// First `limit` ids of the filtered space, in stable enumeration order.
/// Filtering narrows the attribute sets before truncation, so the result is
/// a deterministic prefix across identical calls.
pub fn list_generated_ids_filtered(filter: &GeneratedIdFilter, limit: usize) -> Vec<String> {
    let libs = retained(LIBS, &filter.libs);
    let patterns = retained(PATTERNS, &filter.patterns);
    let styles = retained(STYLES, &filter.styles);
    let langs = retained(LANGS, &filter.langs);

    let mut out = Vec::with_capacity(limit.min(1024));
    for lib in &libs {
        for pattern in &patterns {
            for style in &styles {
                for lang in &langs {
                    if out.len() >= limit {
                        return out;
                    }
                    out.push(format!("{STRIKE_PREFIX}-{lib}-{pattern}-{style}-{lang}"));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_plain_four_token_id() {
        let c = parse_generated_id("react-component-basic-ts").unwrap();
        assert_eq!(c.prefix, None);
        assert_eq!(c.lib, "react");
        assert_eq!(c.pattern, "component");
        assert_eq!(c.style, "basic");
        assert_eq!(c.lang, "ts");
    }

    #[test]
    fn parse_hyphenated_lib_with_prefix() {
        let c = parse_generated_id("strike-bun-elysia-worker-typed-ts").unwrap();
        assert!(c.is_strike());
        assert_eq!(c.lib, "bun-elysia");
        assert_eq!(c.pattern, "worker");
        assert_eq!(c.style, "typed");
        assert_eq!(c.lang, "ts");
    }

    #[test]
    fn parse_prefers_known_hyphenated_pattern() {
        let c = parse_generated_id("strike-apollo-graphql-server-typed-ts").unwrap();
        assert_eq!(c.lib, "apollo");
        assert_eq!(c.pattern, "graphql-server");
    }

    #[test]
    fn parse_keeps_positional_rule_for_unknown_joins() {
        // "worker" is not a hyphenated pattern, so the rightmost-token rule
        // applies and the lib absorbs the extra token.
        let c = parse_generated_id("gen-bun-elysia-worker-basic-js").unwrap();
        assert_eq!(c.prefix.as_deref(), Some("gen"));
        assert_eq!(c.lib, "bun-elysia");
        assert_eq!(c.pattern, "worker");
    }

    #[test]
    fn shape_correct_unknown_tokens_are_permissively_accepted() {
        assert!(is_generated_id("zig-teleport-quantum-xx"));
        let c = parse_generated_id("zig-teleport-quantum-xx").unwrap();
        assert_eq!(c.lib, "zig");
        assert_eq!(c.lang, "xx");
    }

    #[test]
    fn malformed_ids_are_rejected() {
        assert!(!is_generated_id(""));
        assert!(!is_generated_id("too-short-id"));
        assert!(!is_generated_id("strike-only-three-here"));
        assert!(!is_generated_id("bad--double-hyphen-basic-ts"));
        assert!(!is_generated_id("spaces are-not-tokens-basic-ts"));
        assert!(!is_generated_id("trailing-hyphen-basic-ts-"));
    }

    #[test]
    fn space_exceeds_one_hundred_thousand() {
        assert!(total_space() > 100_000);
    }

    #[test]
    fn decode_round_trips_through_parse() {
        for index in [0, 1, 777, 54_321, total_space() - 1] {
            let c = decode_index(index).unwrap();
            let id = render_id(&c);
            let parsed = parse_generated_id(&id).unwrap();
            assert_eq!(parsed, c, "index {index} / id {id}");
        }
        assert!(decode_index(total_space()).is_none());
    }

    #[test]
    fn decode_is_exhaustive_and_distinct_over_a_window() {
        let ids: BTreeSet<String> = (0..1000)
            .map(|i| render_id(&decode_index(i).unwrap()))
            .collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn filtered_listing_is_a_stable_bounded_prefix() {
        let mut filter = GeneratedIdFilter::default();
        filter.libs.insert("nextjs".to_string());
        filter.styles.insert("typed".to_string());
        filter.langs.insert("ts".to_string());

        let first = list_generated_ids_filtered(&filter, 10);
        let second = list_generated_ids_filtered(&filter, 10);
        assert_eq!(first, second);
        assert_eq!(first.len(), 10);
        assert!(first.iter().all(|id| id.starts_with("strike-nextjs-")));
        assert!(first.iter().all(|id| id.ends_with("-typed-ts")));

        let longer = list_generated_ids_filtered(&filter, 20);
        assert_eq!(&longer[..10], &first[..]);
    }

    #[test]
    fn unfiltered_listing_covers_the_whole_space() {
        let all = list_generated_ids_filtered(&GeneratedIdFilter::default(), usize::MAX);
        assert_eq!(all.len(), total_space());
        assert!(all.iter().any(|id| id.starts_with("strike-")));
    }
}
