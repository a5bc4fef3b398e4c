//! Directory-backed spike catalog.
//!
//! Entries live at `<base_dir>/<sanitized-name>.<ext>` where extensions are
//! tried in configured order. The store deals in raw text; spec parsing is
//! layered on top in [`SpikeCatalog::load_spec`].

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use regex::RegexBuilder;
use spike_protocol::SpikeSpec;

use crate::error::{CatalogError, Result};

/// Path separators are encoded with this marker in filenames and decoded
/// back on listing.
const PATH_SEPARATOR_MARKER: &str = "__";

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub base_dir: PathBuf,
    /// Tried in order on read; the first entry is the write extension.
    pub supported_extensions: Vec<String>,
    pub max_file_size: u64,
    pub max_filename_length: usize,
}

impl CatalogConfig {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            supported_extensions: vec!["json".into(), "yaml".into(), "yml".into()],
            max_file_size: 1024 * 1024,
            max_filename_length: 255,
        }
    }

    fn primary_extension(&self) -> &str {
        self.supported_extensions
            .first()
            .map(String::as_str)
            .unwrap_or("json")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogStats {
    pub total: usize,
    pub per_extension: BTreeMap<String, usize>,
    pub last_modified_epoch_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct SpikeCatalog {
    config: CatalogConfig,
}

impl SpikeCatalog {
    pub fn new(config: CatalogConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Map a logical spike name to a safe filename stem.
    ///
    /// Path separators become `__` (reversed on listing); anything outside
    /// `[a-zA-Z0-9._@-]` becomes `_`. Empty input and over-long results are
    /// validation errors. Idempotent.
    pub fn sanitize(&self, name: &str) -> Result<String> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(CatalogError::validation(name, "name is empty"));
        }
        let mut out = String::with_capacity(trimmed.len());
        for ch in trimmed.chars() {
            match ch {
                '/' | '\\' => out.push_str(PATH_SEPARATOR_MARKER),
                c if c.is_ascii_alphanumeric() => out.push(c),
                '.' | '_' | '@' | '-' => out.push(ch),
                _ => out.push('_'),
            }
        }
        if out.len() > self.config.max_filename_length {
            return Err(CatalogError::validation(
                name,
                format!(
                    "sanitized name is {} chars, max is {}",
                    out.len(),
                    self.config.max_filename_length
                ),
            ));
        }
        Ok(out)
    }

    /// Idempotent recursive create of the base directory.
    pub fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config.base_dir)
            .map_err(|e| CatalogError::io(&self.config.base_dir, e))
    }

    fn candidate_path(&self, stem: &str, ext: &str) -> PathBuf {
        self.config.base_dir.join(format!("{stem}.{ext}"))
    }

    /// First extension whose file exists with non-empty content, together
    /// with the resolved path. Shared by read/exists/delete/extension_of.
    fn resolve(&self, name: &str) -> Result<Option<(PathBuf, String, String)>> {
        let stem = self.sanitize(name)?;
        for ext in &self.config.supported_extensions {
            let path = self.candidate_path(&stem, ext);
            let metadata = match std::fs::metadata(&path) {
                Ok(md) => md,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(CatalogError::io(&path, e)),
            };
            if metadata.len() > self.config.max_file_size {
                return Err(CatalogError::validation(
                    name,
                    format!(
                        "file {} is {} bytes, max is {}",
                        path.display(),
                        metadata.len(),
                        self.config.max_file_size
                    ),
                ));
            }
            let content = match std::fs::read_to_string(&path) {
                Ok(c) => c,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(CatalogError::io(&path, e)),
            };
            if content.is_empty() {
                log::debug!("skipping empty catalog file {}", path.display());
                continue;
            }
            return Ok(Some((path, ext.clone(), content)));
        }
        Ok(None)
    }

    pub fn read(&self, name: &str) -> Result<String> {
        match self.resolve(name)? {
            Some((_, _, content)) => Ok(content),
            None => Err(CatalogError::NotFound(name.to_string())),
        }
    }

    /// Persist `content` under the primary extension and return the path.
    pub fn write(&self, name: &str, content: &str) -> Result<PathBuf> {
        if content.len() as u64 > self.config.max_file_size {
            return Err(CatalogError::validation(
                name,
                format!(
                    "content is {} bytes, max is {}",
                    content.len(),
                    self.config.max_file_size
                ),
            ));
        }
        let stem = self.sanitize(name)?;
        self.ensure_dir()?;
        let path = self.candidate_path(&stem, self.config.primary_extension());
        std::fs::write(&path, content).map_err(|e| CatalogError::io(&path, e))?;
        log::debug!("wrote spike '{}' to {}", name, path.display());
        Ok(path)
    }

    /// Enumerate logical names: one directory scan, supported extensions
    /// only, `__` decoded back to `/`, lexicographic order, optional
    /// case-insensitive regex filter.
    pub fn list(&self, filter: Option<&str>) -> Result<Vec<String>> {
        let entries = match std::fs::read_dir(&self.config.base_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CatalogError::io(&self.config.base_dir, e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CatalogError::io(&self.config.base_dir, e))?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            let Some(stem) = self.strip_supported_extension(file_name) else {
                continue;
            };
            names.push(stem.replace(PATH_SEPARATOR_MARKER, "/"));
        }
        names.sort();

        if let Some(pattern) = filter {
            let re = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| {
                    CatalogError::validation(pattern, format!("invalid filter regex: {e}"))
                })?;
            names.retain(|name| re.is_match(name));
        }
        Ok(names)
    }

    fn strip_supported_extension<'a>(&self, file_name: &'a str) -> Option<&'a str> {
        self.config.supported_extensions.iter().find_map(|ext| {
            file_name
                .strip_suffix(ext.as_str())
                .and_then(|rest| rest.strip_suffix('.'))
                .filter(|stem| !stem.is_empty())
        })
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        match self.resolve(name)? {
            Some((path, _, _)) => {
                std::fs::remove_file(&path).map_err(|e| CatalogError::io(&path, e))
            }
            None => Err(CatalogError::NotFound(name.to_string())),
        }
    }

    pub fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.resolve(name)?.is_some())
    }

    pub fn extension_of(&self, name: &str) -> Result<String> {
        match self.resolve(name)? {
            Some((_, ext, _)) => Ok(ext),
            None => Err(CatalogError::NotFound(name.to_string())),
        }
    }

    /// Per-extension counts plus the directory mtime. A missing mtime is
    /// reported as absent, never as an error.
    pub fn stats(&self) -> Result<CatalogStats> {
        let mut per_extension: BTreeMap<String, usize> = self
            .config
            .supported_extensions
            .iter()
            .map(|ext| (ext.clone(), 0))
            .collect();
        let mut total = 0usize;

        match std::fs::read_dir(&self.config.base_dir) {
            Ok(entries) => {
                for entry in entries {
                    let entry = entry.map_err(|e| CatalogError::io(&self.config.base_dir, e))?;
                    let file_name = entry.file_name();
                    let Some(file_name) = file_name.to_str() else {
                        continue;
                    };
                    for ext in &self.config.supported_extensions {
                        if file_name.ends_with(&format!(".{ext}")) {
                            *per_extension.entry(ext.clone()).or_insert(0) += 1;
                            total += 1;
                            break;
                        }
                    }
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(CatalogError::io(&self.config.base_dir, e)),
        }

        let last_modified_epoch_secs = std::fs::metadata(&self.config.base_dir)
            .ok()
            .and_then(|md| md.modified().ok())
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs());

        Ok(CatalogStats {
            total,
            per_extension,
            last_modified_epoch_secs,
        })
    }

    /// Read and parse one catalog entry, filling `id`/`name` from the
    /// catalog name when the file omits them.
    pub fn load_spec(&self, name: &str) -> Result<SpikeSpec> {
        let (_, ext, content) = self
            .resolve(name)?
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))?;

        let mut spec: SpikeSpec = match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| CatalogError::Parse {
                name: name.to_string(),
                reason: e.to_string(),
            })?,
            _ => serde_json::from_str(&content).map_err(|e| CatalogError::Parse {
                name: name.to_string(),
                reason: e.to_string(),
            })?,
        };
        if spec.id.is_empty() {
            spec.id = name.to_string();
        }
        if spec.name.is_empty() {
            spec.name = name.to_string();
        }
        Ok(spec)
    }
}

impl SpikeCatalog {
    /// Convenience constructor used by handlers and tests.
    pub fn at(base_dir: impl AsRef<Path>) -> Self {
        Self::new(CatalogConfig::new(base_dir.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn catalog(dir: &TempDir) -> SpikeCatalog {
        SpikeCatalog::at(dir.path())
    }

    #[test]
    fn sanitize_replaces_separators_and_unsafe_chars() {
        let dir = TempDir::new().unwrap();
        let cat = catalog(&dir);
        assert_eq!(cat.sanitize("auth/jwt v2").unwrap(), "auth__jwt_v2");
        assert_eq!(cat.sanitize("a\\b").unwrap(), "a__b");
        assert_eq!(cat.sanitize("keep.-_@ok").unwrap(), "keep.-_@ok");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let cat = catalog(&dir);
        let once = cat.sanitize("nested/path with spaces!").unwrap();
        assert_eq!(cat.sanitize(&once).unwrap(), once);
    }

    #[test]
    fn sanitize_rejects_empty_and_overlong() {
        let dir = TempDir::new().unwrap();
        let cat = catalog(&dir);
        assert!(matches!(
            cat.sanitize("   "),
            Err(CatalogError::Validation { .. })
        ));
        let long = "x".repeat(300);
        assert!(matches!(
            cat.sanitize(&long),
            Err(CatalogError::Validation { .. })
        ));
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = TempDir::new().unwrap();
        let cat = catalog(&dir);
        let content = r#"{"name":"demo","files":[]}"#;
        let path = cat.write("demo", content).unwrap();
        assert!(path.ends_with("demo.json"));
        assert_eq!(cat.read("demo").unwrap(), content);
    }

    #[test]
    fn read_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let cat = catalog(&dir);
        let err = cat.read("ghost").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn empty_file_is_skipped_then_next_extension_tried() {
        let dir = TempDir::new().unwrap();
        let cat = catalog(&dir);
        cat.ensure_dir().unwrap();
        std::fs::write(dir.path().join("demo.json"), "").unwrap();
        std::fs::write(dir.path().join("demo.yaml"), "name: demo").unwrap();
        assert_eq!(cat.read("demo").unwrap(), "name: demo");
        assert_eq!(cat.extension_of("demo").unwrap(), "yaml");
    }

    #[test]
    fn all_empty_candidates_mean_not_found() {
        let dir = TempDir::new().unwrap();
        let cat = catalog(&dir);
        cat.ensure_dir().unwrap();
        std::fs::write(dir.path().join("demo.json"), "").unwrap();
        assert!(cat.read("demo").unwrap_err().is_not_found());
        assert!(!cat.exists("demo").unwrap());
    }

    #[test]
    fn oversized_content_rejected_on_write_and_read() {
        let dir = TempDir::new().unwrap();
        let mut config = CatalogConfig::new(dir.path());
        config.max_file_size = 16;
        let cat = SpikeCatalog::new(config);
        let err = cat.write("big", &"x".repeat(32)).unwrap_err();
        assert!(matches!(err, CatalogError::Validation { .. }));

        // A file that grew past the limit out of band fails on read too.
        std::fs::write(dir.path().join("grown.json"), "y".repeat(32)).unwrap();
        assert!(matches!(
            cat.read("grown"),
            Err(CatalogError::Validation { .. })
        ));
    }

    #[test]
    fn list_strips_extensions_decodes_separators_and_sorts() {
        let dir = TempDir::new().unwrap();
        let cat = catalog(&dir);
        cat.write("zeta", "z").unwrap();
        cat.write("auth/jwt", "a").unwrap();
        cat.write("alpha", "a").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let names = cat.list(None).unwrap();
        assert_eq!(names, vec!["alpha", "auth/jwt", "zeta"]);
    }

    #[test]
    fn list_filter_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let cat = catalog(&dir);
        cat.write("nextjs-auth", "a").unwrap();
        cat.write("redis-cache", "b").unwrap();
        let names = cat.list(Some("NEXT")).unwrap();
        assert_eq!(names, vec!["nextjs-auth"]);
    }

    #[test]
    fn list_invalid_regex_is_validation_error() {
        let dir = TempDir::new().unwrap();
        let cat = catalog(&dir);
        assert!(matches!(
            cat.list(Some("([")),
            Err(CatalogError::Validation { .. })
        ));
    }

    #[test]
    fn delete_then_exists_flips() {
        let dir = TempDir::new().unwrap();
        let cat = catalog(&dir);
        cat.write("gone-soon", "x").unwrap();
        assert!(cat.exists("gone-soon").unwrap());
        cat.delete("gone-soon").unwrap();
        assert!(!cat.exists("gone-soon").unwrap());
        assert!(cat.delete("gone-soon").unwrap_err().is_not_found());
    }

    #[test]
    fn stats_counts_per_extension() {
        let dir = TempDir::new().unwrap();
        let cat = catalog(&dir);
        cat.write("one", "1").unwrap();
        cat.write("two", "2").unwrap();
        std::fs::write(dir.path().join("three.yaml"), "name: three").unwrap();

        let stats = cat.stats().unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.per_extension.get("json"), Some(&2));
        assert_eq!(stats.per_extension.get("yaml"), Some(&1));
        assert!(stats.last_modified_epoch_secs.is_some());
    }

    #[test]
    fn stats_on_missing_directory_is_empty_not_error() {
        let dir = TempDir::new().unwrap();
        let cat = SpikeCatalog::at(dir.path().join("never-created"));
        let stats = cat.stats().unwrap();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.last_modified_epoch_secs, None);
    }

    #[test]
    fn load_spec_fills_id_and_name_from_catalog_name() {
        let dir = TempDir::new().unwrap();
        let cat = catalog(&dir);
        cat.write("custom-auth", r#"{"stack":["nextjs"],"tags":["auth"]}"#)
            .unwrap();
        let spec = cat.load_spec("custom-auth").unwrap();
        assert_eq!(spec.id, "custom-auth");
        assert_eq!(spec.name, "custom-auth");
        assert_eq!(spec.stack, vec!["nextjs"]);
    }

    #[test]
    fn load_spec_parses_yaml_by_extension() {
        let dir = TempDir::new().unwrap();
        let cat = catalog(&dir);
        cat.ensure_dir().unwrap();
        std::fs::write(
            dir.path().join("yml-entry.yaml"),
            "name: yaml spike\nstack: [redis]\n",
        )
        .unwrap();
        let spec = cat.load_spec("yml-entry").unwrap();
        assert_eq!(spec.name, "yaml spike");
        assert_eq!(spec.stack, vec!["redis"]);
    }

    #[test]
    fn load_spec_bad_json_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let cat = catalog(&dir);
        cat.write("broken", "{not json").unwrap();
        assert!(matches!(
            cat.load_spec("broken"),
            Err(CatalogError::Parse { .. })
        ));
    }
}
