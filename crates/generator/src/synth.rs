//! Spec synthesis: a finite dispatch table of per-library specializations
//! with a mandatory generic fallback.
//!
//! Every specialization is a pure, total function of the parsed components,
//! so enumeration over the space never aborts on one candidate.

use spike_protocol::{FileTemplate, Patch, SpikeSpec};

use crate::error::{GeneratorError, Result};
use crate::grammar::{parse_generated_id, GeneratedIdComponents};

type SpecializeFn = fn(&GeneratedIdComponents) -> (Vec<FileTemplate>, Vec<Patch>);

/// Closed dispatch table, keyed by lib. Order mirrors `LIBS`.
const SPECIALIZATIONS: &[(&str, SpecializeFn)] = &[
    ("apollo", apollo),
    ("auth0", auth0),
    ("bun-elysia", bun_elysia),
    ("express", node_http),
    ("fastify", node_http),
    ("hono", node_http),
    ("nextjs", nextjs),
    ("prisma", prisma),
    ("react", react),
    ("redis", redis),
    ("stripe", stripe),
];

/// Synthesize the full spec for a grammar-shaped id. Pure and deterministic;
/// fails only when the id does not match the grammar at all. Unknown libs
/// route to the generic fallback, which always emits at least one file.
pub fn generate_spike(id: &str) -> Result<SpikeSpec> {
    let components =
        parse_generated_id(id).ok_or_else(|| GeneratorError::InvalidId(id.to_string()))?;

    // Specialized bodies are node-idiom source; any other language takes
    // the generic shape, which adapts its comment idiom.
    let specialize = if is_node_lang(&components.lang) {
        SPECIALIZATIONS
            .iter()
            .find(|(lib, _)| *lib == components.lib)
            .map(|(_, f)| *f)
            .unwrap_or_else(|| {
                log::debug!("no specialization for lib '{}', using generic", components.lib);
                generic
            })
    } else {
        generic
    };

    let (mut files, patches) = specialize(&components);
    files.extend(style_extras(&components));

    let mut tags = vec!["generated".to_string()];
    if components.is_strike() {
        tags.push("strike".to_string());
    }
    tags.push(components.lib.clone());
    tags.push(components.pattern.clone());
    tags.push(components.style.clone());
    tags.push(components.lang.clone());
    let spelled = lang_name(&components.lang);
    if spelled != components.lang {
        tags.push(spelled.to_string());
    }

    Ok(SpikeSpec {
        id: id.to_string(),
        name: format!(
            "{} {} ({}, {})",
            components.lib, components.pattern, components.style, components.lang
        ),
        version: Some("1.0.0".to_string()),
        description: Some(format!(
            "Scaffold for integrating a {} {} into a {} project, {} style.",
            components.lib,
            components.pattern,
            lang_name(&components.lang),
            components.style
        )),
        stack: vec![components.lib.clone(), components.pattern.clone()],
        tags,
        files,
        patches,
    })
}

/// Source-file extension for a language tag. Unknown tags keep themselves
/// as the extension so generation stays total.
pub fn source_ext(lang: &str) -> &str {
    match lang {
        "py" => "py",
        "go" => "go",
        "rs" => "rs",
        "rb" => "rb",
        "php" => "php",
        "java" => "java",
        "kt" => "kt",
        "swift" => "swift",
        "cs" => "cs",
        "dart" => "dart",
        "js" => "js",
        "ts" => "ts",
        other => other,
    }
}

/// Spelled-out language name used in tags and descriptions.
pub fn lang_name(lang: &str) -> &str {
    match lang {
        "ts" => "typescript",
        "js" => "javascript",
        "py" => "python",
        "go" => "go",
        "rs" => "rust",
        "rb" => "ruby",
        "php" => "php",
        "java" => "java",
        "kt" => "kotlin",
        "swift" => "swift",
        "cs" => "csharp",
        "dart" => "dart",
        other => other,
    }
}

fn is_node_lang(lang: &str) -> bool {
    matches!(lang, "ts" | "js")
}

fn comment_line(lang: &str, text: &str) -> String {
    match lang {
        "py" | "rb" => format!("# {text}\n"),
        _ => format!("// {text}\n"),
    }
}

fn file(path: String, template: String) -> FileTemplate {
    FileTemplate { path, template }
}

/// Additional files driven by the authoring style, shared by every
/// specialization.
fn style_extras(c: &GeneratedIdComponents) -> Vec<FileTemplate> {
    let ext = source_ext(&c.lang);
    match c.style.as_str() {
        "advanced" => vec![file(
            format!("src/{}/{}_helpers.{ext}", c.lib, c.pattern),
            format!(
                "{}{}",
                comment_line(&c.lang, &format!("Helpers for the {} {}.", c.lib, c.pattern)),
                comment_line(&c.lang, "Extend with project-specific utilities.")
            ),
        )],
        "testing" => {
            let path = if c.lang == "py" {
                format!("tests/test_{}.py", c.pattern.replace('-', "_"))
            } else {
                format!("tests/{}.test.{ext}", c.pattern)
            };
            vec![file(
                path,
                format!(
                    "{}{}",
                    comment_line(&c.lang, &format!("Tests for the {} {}.", c.lib, c.pattern)),
                    comment_line(&c.lang, "Covers the happy path of {{name}}.")
                ),
            )]
        }
        "secure" => vec![
            file(
                format!("src/security/rate_limit.{ext}"),
                format!(
                    "{}{}",
                    comment_line(&c.lang, "Sliding-window rate limiter."),
                    comment_line(&c.lang, "Limit requests per {{port}} listener window.")
                ),
            ),
            file(
                format!("src/security/audit_log.{ext}"),
                comment_line(&c.lang, "Append-only audit trail for {{name}} events."),
            ),
        ],
        "typed" if is_node_lang(&c.lang) => vec![file(
            format!("src/types/{}.d.ts", c.pattern),
            "export interface {{model}}Shape {\n  id: string;\n}\n".to_string(),
        )],
        _ => Vec::new(),
    }
}

/// Fallback specialization: one source file in a predictable location.
fn generic(c: &GeneratedIdComponents) -> (Vec<FileTemplate>, Vec<Patch>) {
    let ext = source_ext(&c.lang);
    let body = format!(
        "{}{}",
        comment_line(
            &c.lang,
            &format!("{} {} scaffold ({} style).", c.lib, c.pattern, c.style)
        ),
        comment_line(&c.lang, "Entry point for {{name}}.")
    );
    (
        vec![file(
            format!("src/{}/{}.{ext}", c.lib, c.pattern.replace('-', "_")),
            body,
        )],
        Vec::new(),
    )
}

fn nextjs(c: &GeneratedIdComponents) -> (Vec<FileTemplate>, Vec<Patch>) {
    let ext = source_ext(&c.lang);
    match c.pattern.as_str() {
        "middleware" => (
            vec![file(
                format!("middleware.{ext}"),
                concat!(
                    "import { NextResponse } from 'next/server';\n",
                    "import type { NextRequest } from 'next/server';\n\n",
                    "export function middleware(request: NextRequest) {\n",
                    "  // {{name}}: guard matched routes before rendering.\n",
                    "  return NextResponse.next();\n",
                    "}\n\n",
                    "export const config = { matcher: '{{route}}' };\n",
                )
                .to_string(),
            )],
            vec![Patch {
                path: "next.config.js".to_string(),
                diff: concat!(
                    "--- next.config.js\n",
                    "+++ next.config.js\n",
                    "@@ module.exports @@\n",
                    "+  experimental: { instrumentationHook: true },\n",
                )
                .to_string(),
            }],
        ),
        "route" => (
            vec![file(
                format!("app/api/{{{{name}}}}/route.{ext}"),
                concat!(
                    "import { NextResponse } from 'next/server';\n\n",
                    "export async function GET() {\n",
                    "  return NextResponse.json({ ok: true, route: '{{route}}' });\n",
                    "}\n",
                )
                .to_string(),
            )],
            Vec::new(),
        ),
        "component" => (
            vec![file(
                component_path("components", &c.lang),
                concat!(
                    "export default function {{name}}() {\n",
                    "  return <section>{{name}}</section>;\n",
                    "}\n",
                )
                .to_string(),
            )],
            Vec::new(),
        ),
        _ => generic(c),
    }
}

fn react(c: &GeneratedIdComponents) -> (Vec<FileTemplate>, Vec<Patch>) {
    match c.pattern.as_str() {
        "component" | "dnd" | "virtualize" => (
            vec![file(
                component_path("src/components", &c.lang),
                concat!(
                    "import { useState } from 'react';\n\n",
                    "export function {{name}}() {\n",
                    "  const [ready, setReady] = useState(false);\n",
                    "  return <div onClick={() => setReady(!ready)}>{{name}}</div>;\n",
                    "}\n",
                )
                .to_string(),
            )],
            Vec::new(),
        ),
        "hook" => (
            vec![file(
                format!("src/hooks/use{{{{name}}}}.{}", source_ext(&c.lang)),
                concat!(
                    "import { useEffect, useState } from 'react';\n\n",
                    "export function use{{name}}() {\n",
                    "  const [value, setValue] = useState(null);\n",
                    "  useEffect(() => { /* subscribe {{name}} */ }, []);\n",
                    "  return value;\n",
                    "}\n",
                )
                .to_string(),
            )],
            Vec::new(),
        ),
        _ => generic(c),
    }
}

fn component_path(dir: &str, lang: &str) -> String {
    // JSX-flavored extension for component files.
    let ext = match lang {
        "ts" => "tsx",
        "js" => "jsx",
        other => source_ext(other),
    };
    format!("{dir}/{{{{name}}}}.{ext}")
}

fn bun_elysia(c: &GeneratedIdComponents) -> (Vec<FileTemplate>, Vec<Patch>) {
    let ext = source_ext(&c.lang);
    match c.pattern.as_str() {
        "worker" => (
            vec![file(
                format!("src/workers/{{{{name}}}}.{ext}"),
                concat!(
                    "import { Elysia } from 'elysia';\n\n",
                    "// Background worker wired into the Elysia app lifecycle.\n",
                    "export const {{name}}Worker = new Elysia({ name: '{{name}}' })\n",
                    "  .onStart(() => console.log('worker {{name}} up'))\n",
                    "  .decorate('runJob', async (payload: unknown) => {\n",
                    "    // process one {{model}} job\n",
                    "  });\n",
                )
                .to_string(),
            )],
            Vec::new(),
        ),
        "route" | "server" => (
            vec![file(
                format!("src/server.{ext}"),
                concat!(
                    "import { Elysia } from 'elysia';\n\n",
                    "new Elysia()\n",
                    "  .get('{{route}}', () => ({ ok: true }))\n",
                    "  .listen({{port}});\n",
                )
                .to_string(),
            )],
            Vec::new(),
        ),
        _ => generic(c),
    }
}

/// Shared shape for the classic Node HTTP frameworks (express/fastify/hono).
fn node_http(c: &GeneratedIdComponents) -> (Vec<FileTemplate>, Vec<Patch>) {
    let ext = source_ext(&c.lang);
    match c.pattern.as_str() {
        "route" => (
            vec![file(
                format!("src/routes/{{{{name}}}}.{ext}"),
                format!(
                    "// {} route handler for {{{{route}}}}.\nexport async function handler(req, res) {{\n  res.json({{ ok: true }});\n}}\n",
                    c.lib
                ),
            )],
            Vec::new(),
        ),
        "middleware" => (
            vec![file(
                format!("src/middleware/{{{{name}}}}.{ext}"),
                format!(
                    "// {} middleware; runs before every matched route.\nexport function {{{{name}}}}(req, res, next) {{\n  next();\n}}\n",
                    c.lib
                ),
            )],
            Vec::new(),
        ),
        "service" => (
            vec![file(
                format!("src/services/{{{{name}}}}.{ext}"),
                "export class {{name}}Service {\n  async find(id: string) {\n    return { id };\n  }\n}\n"
                    .to_string(),
            )],
            Vec::new(),
        ),
        _ => generic(c),
    }
}

fn prisma(c: &GeneratedIdComponents) -> (Vec<FileTemplate>, Vec<Patch>) {
    match c.pattern.as_str() {
        "schema" | "migration" | "crud" => (
            vec![
                file(
                    "prisma/schema.prisma".to_string(),
                    concat!(
                        "datasource db {\n  provider = \"postgresql\"\n  url = env(\"DATABASE_URL\")\n}\n\n",
                        "generator client {\n  provider = \"prisma-client-js\"\n}\n\n",
                        "model {{model}} {\n",
                        "  id        String   @id @default(cuid())\n",
                        "  createdAt DateTime @default(now())\n",
                        "}\n",
                    )
                    .to_string(),
                ),
                file(
                    format!("src/db/{{{{model}}}}.{}", source_ext(&c.lang)),
                    concat!(
                        "import { PrismaClient } from '@prisma/client';\n\n",
                        "const prisma = new PrismaClient();\n\n",
                        "export function find{{model}}(id: string) {\n",
                        "  return prisma.{{model}}.findUnique({ where: { id } });\n",
                        "}\n",
                    )
                    .to_string(),
                ),
            ],
            vec![Patch {
                path: ".env".to_string(),
                diff: concat!(
                    "--- .env\n",
                    "+++ .env\n",
                    "@@ @@\n",
                    "+DATABASE_URL=\"postgresql://localhost:5432/{{table}}\"\n",
                )
                .to_string(),
            }],
        ),
        _ => generic(c),
    }
}

fn redis(c: &GeneratedIdComponents) -> (Vec<FileTemplate>, Vec<Patch>) {
    let ext = source_ext(&c.lang);
    match c.pattern.as_str() {
        "cache" | "adapter" | "queue" => (
            vec![file(
                format!("src/cache/{{{{name}}}}.{ext}"),
                concat!(
                    "import { createClient } from 'redis';\n\n",
                    "const client = createClient();\n\n",
                    "export async function cached(key: string, ttlSecs: number, load: () => Promise<string>) {\n",
                    "  const hit = await client.get(key);\n",
                    "  if (hit !== null) return hit;\n",
                    "  const value = await load();\n",
                    "  await client.set(key, value, { EX: ttlSecs });\n",
                    "  return value;\n",
                    "}\n",
                )
                .to_string(),
            )],
            Vec::new(),
        ),
        _ => generic(c),
    }
}

fn stripe(c: &GeneratedIdComponents) -> (Vec<FileTemplate>, Vec<Patch>) {
    let ext = source_ext(&c.lang);
    match c.pattern.as_str() {
        "webhook" | "listener" => (
            vec![file(
                format!("src/webhooks/stripe.{ext}"),
                concat!(
                    "import Stripe from 'stripe';\n\n",
                    "const stripe = new Stripe(process.env.STRIPE_SECRET_KEY ?? '');\n\n",
                    "export async function handleWebhook(payload: Buffer, signature: string) {\n",
                    "  const event = stripe.webhooks.constructEvent(\n",
                    "    payload, signature, process.env.STRIPE_WEBHOOK_SECRET ?? '');\n",
                    "  // dispatch event.type for {{name}}\n",
                    "  return event;\n",
                    "}\n",
                )
                .to_string(),
            )],
            Vec::new(),
        ),
        _ => generic(c),
    }
}

fn apollo(c: &GeneratedIdComponents) -> (Vec<FileTemplate>, Vec<Patch>) {
    let ext = source_ext(&c.lang);
    match c.pattern.as_str() {
        "graphql-server" => (
            vec![
                file(
                    format!("src/graphql/server.{ext}"),
                    concat!(
                        "import { ApolloServer } from '@apollo/server';\n",
                        "import { typeDefs } from './schema';\n\n",
                        "export const server = new ApolloServer({\n",
                        "  typeDefs,\n",
                        "  resolvers: { Query: { {{name}}: () => null } },\n",
                        "});\n",
                    )
                    .to_string(),
                ),
                file(
                    format!("src/graphql/schema.{ext}"),
                    "export const typeDefs = `#graphql\n  type Query { {{name}}: {{model}} }\n  type {{model}} { id: ID! }\n`;\n"
                        .to_string(),
                ),
            ],
            Vec::new(),
        ),
        "graphql-client" => (
            vec![file(
                format!("src/graphql/client.{ext}"),
                concat!(
                    "import { ApolloClient, InMemoryCache } from '@apollo/client';\n\n",
                    "export const client = new ApolloClient({\n",
                    "  uri: '{{route}}',\n",
                    "  cache: new InMemoryCache(),\n",
                    "});\n",
                )
                .to_string(),
            )],
            Vec::new(),
        ),
        _ => generic(c),
    }
}

fn auth0(c: &GeneratedIdComponents) -> (Vec<FileTemplate>, Vec<Patch>) {
    let ext = source_ext(&c.lang);
    match c.pattern.as_str() {
        "middleware" | "adapter" => (
            vec![file(
                format!("src/auth/{{{{name}}}}.{ext}"),
                concat!(
                    "import { auth } from 'express-oauth2-jwt-bearer';\n\n",
                    "// Validates bearer tokens issued by the Auth0 tenant.\n",
                    "export const requireAuth = auth({\n",
                    "  audience: '{{route}}',\n",
                    "  issuerBaseURL: process.env.AUTH0_ISSUER_BASE_URL,\n",
                    "});\n",
                )
                .to_string(),
            )],
            Vec::new(),
        ),
        _ => generic(c),
    }
}
