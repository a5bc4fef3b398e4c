//! Process-wide tunables.
//!
//! Callers may change these between tool calls, so [`resolve`] re-reads the
//! environment at the start of every operation. Nothing here is cached.

use spike_matcher::SelectionLimits;
use std::path::PathBuf;

pub const ENV_LIST_LIMIT: &str = "SPIKE_LIST_LIMIT";
pub const ENV_MAX_GENERATED: &str = "SPIKE_MAX_GENERATED";
pub const ENV_SCAN_BATCH: &str = "SPIKE_SCAN_BATCH";
pub const ENV_AUTO_TOP: &str = "SPIKE_AUTO_TOP";
pub const ENV_CATALOG_DIR: &str = "SPIKE_CATALOG_DIR";

const DEFAULT_LIST_LIMIT: usize = 1000;
const DEFAULT_MAX_GENERATED: usize = 200_000;
const DEFAULT_SCAN_BATCH: usize = 2000;
const DEFAULT_AUTO_TOP: usize = 5;

const MAX_GENERATED_CEILING: usize = 1_000_000;
const MAX_AUTO_TOP: usize = 50;

#[derive(Debug, Clone)]
pub struct RuntimeLimits {
    pub selection: SelectionLimits,
    pub catalog_dir: PathBuf,
}

fn parse_limit(raw: Option<&str>, default_value: usize, max: usize) -> usize {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default_value)
        .clamp(1, max)
}

fn env_limit(key: &str, default_value: usize, max: usize) -> usize {
    let raw = std::env::var(key).ok();
    parse_limit(raw.as_deref(), default_value, max)
}

fn default_catalog_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".spike-forge")
        .join("catalog")
}

/// Snapshot of the tunables for one operation.
pub fn resolve() -> RuntimeLimits {
    let catalog_dir = std::env::var(ENV_CATALOG_DIR)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(default_catalog_dir);

    RuntimeLimits {
        selection: SelectionLimits {
            catalog_limit: env_limit(ENV_LIST_LIMIT, DEFAULT_LIST_LIMIT, MAX_GENERATED_CEILING),
            generated_limit: env_limit(
                ENV_MAX_GENERATED,
                DEFAULT_MAX_GENERATED,
                MAX_GENERATED_CEILING,
            ),
            batch_size: env_limit(ENV_SCAN_BATCH, DEFAULT_SCAN_BATCH, MAX_GENERATED_CEILING),
            top_n: env_limit(ENV_AUTO_TOP, DEFAULT_AUTO_TOP, MAX_AUTO_TOP),
        },
        catalog_dir,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_limit_defaults_and_clamps() {
        assert_eq!(parse_limit(None, 1000, 10_000), 1000);
        assert_eq!(parse_limit(Some(""), 1000, 10_000), 1000);
        assert_eq!(parse_limit(Some("   "), 1000, 10_000), 1000);
        assert_eq!(parse_limit(Some("abc"), 1000, 10_000), 1000);
        assert_eq!(parse_limit(Some("42"), 1000, 10_000), 42);
        assert_eq!(parse_limit(Some(" 42 "), 1000, 10_000), 42);
        assert_eq!(parse_limit(Some("0"), 1000, 10_000), 1);
        assert_eq!(parse_limit(Some("99999999"), 1000, 10_000), 10_000);
    }

    #[test]
    fn defaults_are_sane() {
        // No env manipulation here; other tests run in parallel.
        assert!(DEFAULT_MAX_GENERATED >= spike_generator::total_space());
        assert!(DEFAULT_SCAN_BATCH >= 1);
    }
}
