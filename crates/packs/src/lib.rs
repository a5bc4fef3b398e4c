//! Declarative pack filter: named include/exclude filters narrowing the id
//! space by parsed attribute, with a literal-substring fallback for ids
//! that do not parse (hand-authored catalog names).

use regex::Regex;
use spike_generator::parse_generated_id;

/// Per-attribute value sets. Empty include slice means include-all.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttrSets {
    pub libs: &'static [&'static str],
    pub patterns: &'static [&'static str],
    pub styles: &'static [&'static str],
    pub langs: &'static [&'static str],
}

#[derive(Debug, Clone, Copy)]
pub struct PackDef {
    pub name: &'static str,
    pub description: &'static str,
    pub include: AttrSets,
    pub exclude: AttrSets,
    /// Raw gate applied to the full id before any parsing.
    pub id_regex: Option<&'static str>,
}

const EMPTY: AttrSets = AttrSets {
    libs: &[],
    patterns: &[],
    styles: &[],
    langs: &[],
};

/// Built-in packs. Closed registry, looked up by name.
pub const PACKS: &[PackDef] = &[
    PackDef {
        name: "frontend",
        description: "UI frameworks and view-layer scaffolds.",
        include: AttrSets {
            libs: &[
                "angular", "astro", "nextjs", "nuxt", "react", "remix", "solid", "svelte",
                "tailwind", "vue",
            ],
            ..EMPTY
        },
        exclude: EMPTY,
        id_regex: None,
    },
    PackDef {
        name: "api",
        description: "HTTP servers, routing and service scaffolds.",
        include: AttrSets {
            libs: &[
                "axum",
                "bun-elysia",
                "django",
                "express",
                "fastapi",
                "fastify",
                "flask",
                "gin",
                "hono",
                "koa",
                "laravel",
                "nestjs",
                "rails",
                "spring",
            ],
            patterns: &[
                "crud",
                "middleware",
                "route",
                "server",
                "service",
                "webhook",
            ],
            ..EMPTY
        },
        exclude: EMPTY,
        id_regex: None,
    },
    PackDef {
        name: "data",
        description: "Storage, ORM and schema scaffolds.",
        include: AttrSets {
            libs: &[
                "drizzle", "mongodb", "mongoose", "mysql", "postgres", "prisma", "qdrant",
                "redis", "sequelize", "sqlite",
            ],
            patterns: &["adapter", "cache", "crud", "migration", "schema"],
            ..EMPTY
        },
        exclude: EMPTY,
        id_regex: None,
    },
    PackDef {
        name: "secure-ops",
        description: "Branded security-hardened scaffolds only.",
        include: AttrSets {
            styles: &["secure"],
            ..EMPTY
        },
        exclude: AttrSets {
            patterns: &["docs", "example"],
            ..EMPTY
        },
        id_regex: Some("^strike-"),
    },
    PackDef {
        name: "testing",
        description: "Scaffolds that ship test skeletons.",
        include: AttrSets {
            styles: &["testing"],
            ..EMPTY
        },
        exclude: EMPTY,
        id_regex: None,
    },
    PackDef {
        name: "realtime",
        description: "Streaming, messaging and background-work scaffolds.",
        include: AttrSets {
            patterns: &["listener", "queue", "realtime", "replay", "worker"],
            ..EMPTY
        },
        exclude: EMPTY,
        id_regex: None,
    },
];

pub fn find_pack(name: &str) -> Option<&'static PackDef> {
    PACKS.iter().find(|pack| pack.name == name)
}

/// A pack with its raw-id regex compiled once, for per-id checks during
/// streaming enumeration.
pub struct PackMatcher {
    pack: &'static PackDef,
    id_regex: Option<Regex>,
}

impl PackMatcher {
    pub fn new(pack: &'static PackDef) -> Self {
        let id_regex = pack.id_regex.map(|raw| {
            // Registry patterns are static and known-good.
            Regex::new(raw).unwrap_or_else(|e| unreachable!("bad pack regex '{raw}': {e}"))
        });
        Self { pack, id_regex }
    }

    pub fn for_name(name: &str) -> Option<Self> {
        find_pack(name).map(Self::new)
    }

    pub fn name(&self) -> &'static str {
        self.pack.name
    }

    /// Whether the pack retains this id.
    ///
    /// Raw regex gate first; then attribute logic over the parsed id; ids
    /// that do not parse are kept only when the pack name is a literal
    /// substring of the id (conservative fallback for catalog entries).
    pub fn allows(&self, id: &str) -> bool {
        if let Some(re) = &self.id_regex {
            if !re.is_match(id) {
                return false;
            }
        }
        let Some(components) = parse_generated_id(id) else {
            return id.contains(self.pack.name);
        };

        let include = &self.pack.include;
        let exclude = &self.pack.exclude;
        within(&components.lib, include.libs, exclude.libs)
            && within(&components.pattern, include.patterns, exclude.patterns)
            && within(&components.style, include.styles, exclude.styles)
            && within(&components.lang, include.langs, exclude.langs)
    }
}

fn within(value: &str, include: &[&str], exclude: &[&str]) -> bool {
    (include.is_empty() || include.contains(&value)) && !exclude.contains(&value)
}

/// Filter a concrete id list through a pack. Idempotent.
pub fn filter_ids_by_pack<'a, I>(ids: I, pack: &'static PackDef) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let matcher = PackMatcher::new(pack);
    ids.into_iter()
        .filter(|id| matcher.allows(id))
        .map(str::to_string)
        .collect()
}
