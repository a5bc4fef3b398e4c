//! Best-of-universe selection over catalog entries plus the generated id
//! space, bounded by caller-resolved limits.

use spike_catalog::SpikeCatalog;
use spike_generator::{decode_index, generate_spike, render_id, total_space};
use spike_protocol::SpikeSpec;

use crate::score::{coverage_score, score};

/// Enumeration bounds, resolved by the caller at the start of every
/// operation (never cached here).
#[derive(Debug, Clone, Copy)]
pub struct SelectionLimits {
    /// Cap on catalog listing size.
    pub catalog_limit: usize,
    /// Cap on generated-id enumeration.
    pub generated_limit: usize,
    /// Batch size for incremental scanning of the generated space.
    pub batch_size: usize,
    /// How many candidates are tracked for reporting.
    pub top_n: usize,
}

impl Default for SelectionLimits {
    fn default() -> Self {
        Self {
            catalog_limit: 1000,
            generated_limit: 200_000,
            batch_size: 2000,
            top_n: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub stack: Vec<String>,
    pub tags: Vec<String>,
    pub score: f32,
}

impl Candidate {
    fn from_spec(spec: &SpikeSpec, score: f32) -> Self {
        Self {
            id: spec.id.clone(),
            name: spec.name.clone(),
            stack: spec.stack.clone(),
            tags: spec.tags.clone(),
            score,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Selection {
    pub best: Option<Candidate>,
    /// Clamped to [0.10, 1.00], two decimals. Never exactly zero.
    pub coverage_score: f32,
    /// Up to `top_n` candidates, best first.
    pub top: Vec<Candidate>,
}

/// Walk every candidate spec in the combined universe: catalog entries
/// first (bounded), then the generated space in index batches. A catalog
/// entry that fails to load is logged and skipped; generation is total and
/// cannot fail for enumerated ids.
fn scan_universe(
    catalog: &SpikeCatalog,
    limits: &SelectionLimits,
    accept: Option<&dyn Fn(&str) -> bool>,
    mut visit: impl FnMut(&SpikeSpec) -> bool,
) {
    let names = match catalog.list(None) {
        Ok(names) => names,
        Err(e) => {
            log::warn!("catalog listing failed, scanning generated ids only: {e}");
            Vec::new()
        }
    };
    for name in names.into_iter().take(limits.catalog_limit) {
        if let Some(accept) = accept {
            if !accept(&name) {
                continue;
            }
        }
        match catalog.load_spec(&name) {
            Ok(spec) => {
                if !visit(&spec) {
                    return;
                }
            }
            Err(e) => log::warn!("skipping unreadable catalog entry '{name}': {e}"),
        }
    }

    let upper = limits.generated_limit.min(total_space());
    let batch = limits.batch_size.max(1);
    let mut start = 0;
    while start < upper {
        let end = (start + batch).min(upper);
        for index in start..end {
            let Some(components) = decode_index(index) else {
                return;
            };
            let id = render_id(&components);
            if let Some(accept) = accept {
                if !accept(&id) {
                    continue;
                }
            }
            let spec = match generate_spike(&id) {
                Ok(spec) => spec,
                Err(e) => {
                    // Unreachable for enumerated ids; specializations are total.
                    log::error!("generation failed for enumerated id '{id}': {e}");
                    continue;
                }
            };
            if !visit(&spec) {
                return;
            }
        }
        start = end;
    }
}

fn insert_ranked(top: &mut Vec<Candidate>, candidate: Candidate, cap: usize) {
    if cap == 0 {
        return;
    }
    let worth_tracking = top.len() < cap
        || top
            .last()
            .map(|last| candidate.score > last.score)
            .unwrap_or(true);
    if worth_tracking {
        top.push(candidate);
        top.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        top.truncate(cap);
    }
}

/// Score every candidate and pick the single best. Strictly-greater scores
/// replace the incumbent; equal scores break toward the lexicographically
/// smaller id.
pub fn auto_select(query: &str, catalog: &SpikeCatalog, limits: &SelectionLimits) -> Selection {
    let mut best: Option<Candidate> = None;
    let mut top: Vec<Candidate> = Vec::new();

    scan_universe(catalog, limits, None, |spec| {
        let value = score(query, spec);
        let replace = match &best {
            None => true,
            Some(current) => {
                value > current.score || (value == current.score && spec.id < current.id)
            }
        };
        if replace {
            best = Some(Candidate::from_spec(spec, value));
        }
        if value > 0.0 {
            insert_ranked(&mut top, Candidate::from_spec(spec, value), limits.top_n);
        }
        true
    });

    let coverage = coverage_score(best.as_ref().map(|b| b.score).unwrap_or(0.0));
    Selection {
        best,
        coverage_score: coverage,
        top,
    }
}

/// Ranked discovery. With a query, the top `limit` scored candidates; with
/// none, the first `limit` ids of the universe in enumeration order. The
/// optional `accept` predicate narrows the universe (pack filtering).
pub fn rank(
    query: Option<&str>,
    catalog: &SpikeCatalog,
    limits: &SelectionLimits,
    accept: Option<&dyn Fn(&str) -> bool>,
    limit: usize,
) -> Vec<Candidate> {
    if limit == 0 {
        return Vec::new();
    }
    let mut out: Vec<Candidate> = Vec::new();
    match query {
        Some(query) if !query.trim().is_empty() => {
            scan_universe(catalog, limits, accept, |spec| {
                let value = score(query, spec);
                if value > 0.0 {
                    insert_ranked(&mut out, Candidate::from_spec(spec, value), limit);
                }
                true
            });
        }
        _ => {
            scan_universe(catalog, limits, accept, |spec| {
                out.push(Candidate::from_spec(spec, 0.0));
                out.len() < limit
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use spike_catalog::SpikeCatalog;
    use tempfile::TempDir;

    fn small_limits() -> SelectionLimits {
        SelectionLimits {
            catalog_limit: 100,
            generated_limit: 5000,
            batch_size: 512,
            top_n: 5,
        }
    }

    #[test]
    fn catalog_entries_are_scanned_before_generated_ids() {
        let dir = TempDir::new().unwrap();
        let catalog = SpikeCatalog::at(dir.path());
        catalog
            .write(
                "team-auth",
                r#"{"name":"team auth","stack":["nextjs"],"tags":["auth","sso"]}"#,
            )
            .unwrap();

        let ranked = rank(None, &catalog, &small_limits(), None, 3);
        assert_eq!(ranked[0].id, "team-auth");
        assert_eq!(ranked.len(), 3);
    }

    #[test]
    fn auto_select_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let catalog = SpikeCatalog::at(dir.path());
        let limits = small_limits();
        let a = auto_select("angular adapter advanced", &catalog, &limits);
        let b = auto_select("angular adapter advanced", &catalog, &limits);
        assert_eq!(a.best, b.best);
        assert_eq!(a.top, b.top);
    }

    #[test]
    fn ties_break_toward_the_smaller_id() {
        let dir = TempDir::new().unwrap();
        let catalog = SpikeCatalog::at(dir.path());
        // Every candidate scores zero, so the tie-break alone decides: the
        // lexicographically smallest id in the scanned universe wins.
        let limits = SelectionLimits {
            generated_limit: 200,
            ..small_limits()
        };
        let selection = auto_select("zzz-no-overlap-zzz", &catalog, &limits);
        let best = selection.best.unwrap();
        let mut ids: Vec<String> = (0..200)
            .map(|i| spike_generator::render_id(&spike_generator::decode_index(i).unwrap()))
            .collect();
        ids.sort();
        assert_eq!(best.id, ids[0]);
    }

    #[test]
    fn coverage_floor_applies_to_zero_overlap() {
        let dir = TempDir::new().unwrap();
        let catalog = SpikeCatalog::at(dir.path());
        let selection = auto_select("žádná shoda vůbec", &catalog, &small_limits());
        assert!(selection.coverage_score >= 0.10);
        assert!(selection.coverage_score <= 1.00);
    }

    #[test]
    fn accept_predicate_narrows_the_universe() {
        let dir = TempDir::new().unwrap();
        let catalog = SpikeCatalog::at(dir.path());
        let accept = |id: &str| id.contains("-angular-");
        let ranked = rank(None, &catalog, &small_limits(), Some(&accept), 10);
        assert_eq!(ranked.len(), 10);
        assert!(ranked.iter().all(|c| c.id.contains("-angular-")));
    }

    #[test]
    fn zero_limit_yields_no_candidates() {
        let dir = TempDir::new().unwrap();
        let catalog = SpikeCatalog::at(dir.path());
        assert!(rank(None, &catalog, &small_limits(), None, 0).is_empty());
        assert!(rank(Some("react"), &catalog, &small_limits(), None, 0).is_empty());
    }

    #[test]
    fn top_list_is_bounded_and_sorted() {
        let dir = TempDir::new().unwrap();
        let catalog = SpikeCatalog::at(dir.path());
        let selection = auto_select("angular component", &catalog, &small_limits());
        assert!(selection.top.len() <= 5);
        for pair in selection.top.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }
}
