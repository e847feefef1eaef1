//! Discovery scanner
//!
//! Walks the ordered content roots, parses every manifest file it finds and
//! resolves the resulting records against the asset catalog. The output is
//! always the complete record set for [`crate::registry::ModRegistry::rebuild`],
//! in discovery order: roots in the order given, files within a root in
//! file-name order.
//!
//! A manifest that fails to parse is left out of the record set and reported
//! in [`ScanOutput::errors`]; it never aborts the scan.
//!
//! Incremental scans reuse the previous parse of any file whose size and
//! modification time are unchanged. Resolution always reruns, since the
//! catalog may have changed between scans.

use crate::catalog::AssetCatalog;
use crate::config::Config;
use crate::manifest::{load_manifest, ManifestError, ModRecord};
use crate::project::{configured_roots, ContentRoot, ProjectLayout};
use crate::registry::ResolvedMod;
use crate::resolver::ResolutionStatus;
use crate::Result;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};
use walkdir::WalkDir;

/// How much work a scan may skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Re-read and re-parse every manifest.
    Full,
    /// Reuse parses of files whose size and mtime are unchanged.
    Incremental,
}

/// A manifest file that could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanErrorReport {
    pub source: PathBuf,
    pub error: ManifestError,
}

/// Everything one scan produced.
#[derive(Debug, Clone)]
pub struct ScanOutput {
    /// Valid records in discovery order, each with a fresh resolver pass
    pub mods: Vec<ResolvedMod>,
    /// Rejected manifest files, in discovery order
    pub errors: Vec<ScanErrorReport>,
    /// Manifest files visited
    pub files_seen: usize,
    /// Manifest files actually read and parsed this time
    pub files_parsed: usize,
    /// True when the catalog was still loading, so every record is Unresolved
    pub catalog_pending: bool,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl ScanOutput {
    pub fn count_status(&self, status: ResolutionStatus) -> usize {
        self.mods
            .iter()
            .filter(|m| m.resolution.status == status)
            .count()
    }
}

#[derive(Debug, Clone)]
struct CachedParse {
    modified: Option<SystemTime>,
    len: u64,
    result: std::result::Result<ModRecord, ManifestError>,
}

/// Finds, parses and resolves mod manifests under a set of content roots.
#[derive(Debug, Clone)]
pub struct DiscoveryScanner {
    roots: Vec<ContentRoot>,
    manifest_extension: String,
    cache: HashMap<PathBuf, CachedParse>,
}

impl DiscoveryScanner {
    /// Create a scanner over `roots`, in precedence order
    pub fn new(roots: Vec<ContentRoot>) -> Self {
        Self {
            roots,
            manifest_extension: "json".to_string(),
            cache: HashMap::new(),
        }
    }

    pub fn with_manifest_extension(mut self, extension: &str) -> Self {
        self.manifest_extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Create a scanner from configuration.
    ///
    /// With a project, roots are the project's, its enabled plugins' and the
    /// configured extras; without one, only the configured extras.
    pub fn from_config(config: &Config, project: Option<&ProjectLayout>) -> Result<Self> {
        let roots = match project {
            Some(layout) => layout.content_roots(&config.scan)?,
            None => configured_roots(&config.scan, None),
        };
        Ok(Self::new(roots).with_manifest_extension(&config.scan.manifest_extension))
    }

    pub fn roots(&self) -> &[ContentRoot] {
        &self.roots
    }

    /// Replace the content roots. Cached parses stay valid.
    pub fn set_roots(&mut self, roots: Vec<ContentRoot>) {
        self.roots = roots;
    }

    fn is_manifest(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(&self.manifest_extension))
            .unwrap_or(false)
    }

    /// Scan every root and resolve each valid record against `catalog`.
    pub fn scan<C: AssetCatalog + ?Sized>(&mut self, catalog: &C, mode: ScanMode) -> ScanOutput {
        let started_at = Utc::now();
        let timer = Instant::now();
        let catalog_pending = !catalog.is_ready();

        let mut mods = Vec::new();
        let mut errors = Vec::new();
        let mut visited: HashSet<PathBuf> = HashSet::new();
        let mut files_parsed = 0;

        if mode == ScanMode::Full {
            self.cache.clear();
        }

        let roots = self.roots.clone();
        for root in &roots {
            if !root.path.is_dir() {
                tracing::warn!(root = %root.path.display(), origin = %root.origin, "content root does not exist, skipping");
                continue;
            }

            tracing::debug!(root = %root.path.display(), origin = %root.origin, "scanning content root");

            for entry in WalkDir::new(&root.path).sort_by_file_name() {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        let source = e
                            .path()
                            .map(Path::to_path_buf)
                            .unwrap_or_else(|| root.path.clone());
                        tracing::warn!(path = %source.display(), error = %e, "unreadable entry under content root");
                        errors.push(ScanErrorReport {
                            source,
                            error: ManifestError::Unreadable(e.to_string()),
                        });
                        continue;
                    }
                };

                let path = entry.path();
                if !entry.file_type().is_file() || !self.is_manifest(path) {
                    continue;
                }
                if !visited.insert(path.to_path_buf()) {
                    // Reachable from more than one root; the first root wins
                    continue;
                }

                let (result, parsed) = self.parse_cached(path, entry.metadata().ok());
                if parsed {
                    files_parsed += 1;
                }

                match result {
                    Ok(record) => {
                        let resolved = ResolvedMod::resolve(record, catalog);
                        tracing::debug!(
                            identifier = %resolved.record.identifier,
                            source = %path.display(),
                            status = %resolved.resolution.status,
                            "discovered mod"
                        );
                        mods.push(resolved);
                    }
                    Err(error) => {
                        tracing::warn!(source = %path.display(), kind = error.kind(), error = %error, "rejected manifest");
                        errors.push(ScanErrorReport {
                            source: path.to_path_buf(),
                            error,
                        });
                    }
                }
            }
        }

        // Forget files that disappeared since the last scan
        self.cache.retain(|path, _| visited.contains(path));

        let output = ScanOutput {
            mods,
            errors,
            files_seen: visited.len(),
            files_parsed,
            catalog_pending,
            started_at,
            elapsed: timer.elapsed(),
        };

        tracing::info!(
            files = output.files_seen,
            parsed = output.files_parsed,
            mods = output.mods.len(),
            rejected = output.errors.len(),
            catalog_pending,
            "mod scan complete"
        );

        output
    }

    /// Parse `path`, reusing the cached result when the file is unchanged.
    /// Returns the result and whether the file was actually parsed.
    fn parse_cached(
        &mut self,
        path: &Path,
        metadata: Option<std::fs::Metadata>,
    ) -> (std::result::Result<ModRecord, ManifestError>, bool) {
        let modified = metadata.as_ref().and_then(|m| m.modified().ok());
        let len = metadata.as_ref().map(|m| m.len()).unwrap_or(0);

        if let Some(cached) = self.cache.get(path) {
            if modified.is_some() && cached.modified == modified && cached.len == len {
                return (cached.result.clone(), false);
            }
        }

        let result = load_manifest(path);
        self.cache.insert(
            path.to_path_buf(),
            CachedParse {
                modified,
                len,
                result: result.clone(),
            },
        );
        (result, true)
    }
}
