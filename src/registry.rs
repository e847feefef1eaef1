//! Process-wide mod registry
//!
//! The registry holds the current [`RegistrySnapshot`]: every discovered,
//! validated mod in discovery order plus the conflicts detected between them.
//! Snapshots are immutable once published. [`ModRegistry::rebuild`] builds a
//! complete new snapshot and installs it with a single atomic pointer swap,
//! so a reader always sees either the old or the new snapshot in full.
//!
//! The only mutation allowed on a published snapshot is the per-record
//! enabled flag, changed through [`ModRegistry::set_enabled`].
//!
//! # Examples
//!
//! ```
//! use whiskerwood_mods::catalog::InMemoryCatalog;
//! use whiskerwood_mods::manifest::{parse_manifest, AssetCategory};
//! use whiskerwood_mods::registry::{ModRegistry, ResolvedMod};
//!
//! let mut catalog = InMemoryCatalog::new();
//! catalog.insert("/Game/Mods/Sunfall/WBP_Banner", AssetCategory::Widget);
//!
//! let record = parse_manifest(
//!     r#"{"identifier":"sunfall_ui","version":"1.0",
//!         "assets":[{"path":"/Game/Mods/Sunfall/WBP_Banner","type":"Widget"}]}"#,
//!     "sunfall.json",
//! ).unwrap();
//!
//! let registry = ModRegistry::new();
//! registry.rebuild(vec![ResolvedMod::resolve(record, &catalog)]);
//!
//! assert_eq!(registry.list_enabled_resolved().len(), 1);
//! ```

use crate::catalog::AssetCatalog;
use crate::manifest::{AssetCategory, ModRecord};
use crate::resolver::{resolve, Resolution, ResolutionStatus};
use crate::{Error, Result};
use arc_swap::ArcSwap;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// A parsed record together with its latest resolver pass.
///
/// This is what the discovery scanner hands to [`ModRegistry::rebuild`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMod {
    pub record: ModRecord,
    pub resolution: Resolution,
}

impl ResolvedMod {
    pub fn resolve<C: AssetCatalog + ?Sized>(record: ModRecord, catalog: &C) -> Self {
        let resolution = resolve(&record, catalog);
        Self { record, resolution }
    }
}

/// A mod as installed in a registry snapshot.
///
/// Everything except the enabled flag is fixed for the lifetime of the
/// snapshot.
#[derive(Debug)]
pub struct RegisteredMod {
    record: ModRecord,
    resolution: Resolution,
    enabled: AtomicBool,
    active: bool,
}

impl RegisteredMod {
    pub fn record(&self) -> &ModRecord {
        &self.record
    }

    pub fn identifier(&self) -> &str {
        &self.record.identifier
    }

    pub fn source(&self) -> &Path {
        &self.record.source
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    pub fn status(&self) -> ResolutionStatus {
        self.resolution.status
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// True for the first-discovered record of its identifier.
    ///
    /// Consumers that need a single record per identifier use the active one.
    pub fn is_active(&self) -> bool {
        self.active
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }
}

/// Advisory conflict between discovered mods. Never blocks registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Conflict {
    /// Several manifests declare the same identifier. Sources are listed in
    /// discovery order; the first one is active.
    DuplicateIdentifier {
        identifier: String,
        sources: Vec<PathBuf>,
    },

    /// Two different mods claim the same asset under an exclusive category.
    /// Identifiers are sorted.
    OverlappingClaim {
        asset_path: String,
        category: AssetCategory,
        identifiers: [String; 2],
    },
}

impl Conflict {
    pub fn kind(&self) -> &'static str {
        match self {
            Conflict::DuplicateIdentifier { .. } => "DuplicateIdentifier",
            Conflict::OverlappingClaim { .. } => "OverlappingClaim",
        }
    }

    pub fn involves(&self, identifier: &str) -> bool {
        match self {
            Conflict::DuplicateIdentifier { identifier: id, .. } => id == identifier,
            Conflict::OverlappingClaim { identifiers, .. } => {
                identifiers.iter().any(|id| id == identifier)
            }
        }
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conflict::DuplicateIdentifier {
                identifier,
                sources,
            } => {
                let sources: Vec<String> =
                    sources.iter().map(|s| s.display().to_string()).collect();
                write!(
                    f,
                    "duplicate identifier '{}' declared by {}",
                    identifier,
                    sources.join(", ")
                )
            }
            Conflict::OverlappingClaim {
                asset_path,
                category,
                identifiers,
            } => write!(
                f,
                "{} asset '{}' claimed by both '{}' and '{}'",
                category, asset_path, identifiers[0], identifiers[1]
            ),
        }
    }
}

/// One complete, internally consistent registry state.
#[derive(Debug, Default)]
pub struct RegistrySnapshot {
    mods: Vec<Arc<RegisteredMod>>,
    by_identifier: HashMap<String, Vec<usize>>,
    conflicts: Vec<Conflict>,
    generation: u64,
}

impl RegistrySnapshot {
    /// All records in discovery order.
    pub fn mods(&self) -> &[Arc<RegisteredMod>] {
        &self.mods
    }

    /// Every record declaring `identifier`, in discovery order.
    pub fn get(&self, identifier: &str) -> Vec<Arc<RegisteredMod>> {
        self.by_identifier
            .get(identifier)
            .map(|indices| indices.iter().map(|&i| self.mods[i].clone()).collect())
            .unwrap_or_default()
    }

    /// The active (first-discovered) record for `identifier`.
    pub fn active(&self, identifier: &str) -> Option<Arc<RegisteredMod>> {
        self.by_identifier
            .get(identifier)
            .and_then(|indices| indices.first())
            .map(|&i| self.mods[i].clone())
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    /// Number of rebuilds that preceded this snapshot.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.mods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }

    /// Active, enabled, fully resolved records in discovery order.
    pub fn enabled_resolved(&self) -> Vec<Arc<RegisteredMod>> {
        self.mods
            .iter()
            .filter(|m| m.is_active() && m.is_enabled() && m.status() == ResolutionStatus::Resolved)
            .cloned()
            .collect()
    }
}

/// The live mod catalog shared by editor tooling and runtime queries.
pub struct ModRegistry {
    snapshot: ArcSwap<RegistrySnapshot>,
    write_lock: Mutex<()>,
    exclusive_categories: HashSet<AssetCategory>,
}

impl ModRegistry {
    /// Create an empty registry where only Widget assets are exclusive
    pub fn new() -> Self {
        Self::with_exclusive_categories([AssetCategory::Widget])
    }

    /// Create an empty registry with a custom set of exclusive asset categories
    pub fn with_exclusive_categories(categories: impl IntoIterator<Item = AssetCategory>) -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(RegistrySnapshot::default()),
            write_lock: Mutex::new(()),
            exclusive_categories: categories.into_iter().collect(),
        }
    }

    pub fn is_exclusive(&self, category: AssetCategory) -> bool {
        self.exclusive_categories.contains(&category)
    }

    /// Replace the whole record set with `mods`, in discovery order.
    ///
    /// Conflicts are recomputed from scratch. Enabled flags carry over for
    /// identifiers present in the previous snapshot; new identifiers start
    /// enabled.
    pub fn rebuild(&self, mods: Vec<ResolvedMod>) -> Arc<RegistrySnapshot> {
        self.rebuild_with_disabled(mods, &BTreeSet::new())
    }

    /// Like [`rebuild`](Self::rebuild), but every record whose identifier is
    /// in `disabled` is installed disabled. The flags are final before the
    /// snapshot becomes visible.
    pub fn rebuild_with_disabled(
        &self,
        mods: Vec<ResolvedMod>,
        disabled: &BTreeSet<String>,
    ) -> Arc<RegistrySnapshot> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let previous = self.snapshot.load_full();

        let mut by_identifier: HashMap<String, Vec<usize>> = HashMap::new();
        let mut registered = Vec::with_capacity(mods.len());

        for (index, resolved) in mods.into_iter().enumerate() {
            let identifier = resolved.record.identifier.clone();
            let enabled = !disabled.contains(&identifier)
                && previous
                    .active(&identifier)
                    .map(|m| m.is_enabled())
                    .unwrap_or(true);

            let slots = by_identifier.entry(identifier).or_default();
            let active = slots.is_empty();
            slots.push(index);

            registered.push(Arc::new(RegisteredMod {
                record: resolved.record,
                resolution: resolved.resolution,
                enabled: AtomicBool::new(enabled),
                active,
            }));
        }

        let conflicts = self.detect_conflicts(&registered);

        let snapshot = Arc::new(RegistrySnapshot {
            mods: registered,
            by_identifier,
            conflicts,
            generation: previous.generation + 1,
        });

        tracing::debug!(
            generation = snapshot.generation,
            mods = snapshot.len(),
            conflicts = snapshot.conflicts.len(),
            "installing registry snapshot"
        );

        self.snapshot.store(snapshot.clone());
        snapshot
    }

    /// Drop every record, as on module shutdown.
    pub fn clear(&self) {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let generation = self.snapshot.load().generation + 1;
        self.snapshot.store(Arc::new(RegistrySnapshot {
            generation,
            ..RegistrySnapshot::default()
        }));
    }

    /// The currently installed snapshot.
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.snapshot.load_full()
    }

    /// Every record declaring `identifier`, in discovery order.
    pub fn get(&self, identifier: &str) -> Vec<Arc<RegisteredMod>> {
        self.snapshot.load().get(identifier)
    }

    pub fn active(&self, identifier: &str) -> Option<Arc<RegisteredMod>> {
        self.snapshot.load().active(identifier)
    }

    pub fn list_all(&self) -> Vec<Arc<RegisteredMod>> {
        self.snapshot.load().mods.clone()
    }

    pub fn conflicts(&self) -> Vec<Conflict> {
        self.snapshot.load().conflicts.clone()
    }

    /// Runtime feed: active, enabled, Resolved records in discovery order.
    pub fn list_enabled_resolved(&self) -> Vec<Arc<RegisteredMod>> {
        self.snapshot.load().enabled_resolved()
    }

    /// Enable or disable every record declaring `identifier`.
    ///
    /// Returns the number of records changed.
    pub fn set_enabled(&self, identifier: &str, enabled: bool) -> Result<usize> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let snapshot = self.snapshot.load();
        let records = snapshot.get(identifier);

        if records.is_empty() {
            return Err(Error::ModNotFound(identifier.to_string()));
        }

        for record in &records {
            record.set_enabled(enabled);
        }

        tracing::info!(identifier, enabled, "mod enabled state changed");
        Ok(records.len())
    }

    fn detect_conflicts(&self, mods: &[Arc<RegisteredMod>]) -> Vec<Conflict> {
        let mut conflicts = Vec::new();

        // Duplicate identifiers, reported in first-seen order
        let mut seen: Vec<&str> = Vec::new();
        let mut sources: HashMap<&str, Vec<PathBuf>> = HashMap::new();
        for m in mods {
            let id = m.identifier();
            let entry = sources.entry(id).or_default();
            if entry.is_empty() {
                seen.push(id);
            }
            entry.push(m.source().to_path_buf());
        }
        for id in seen {
            if let Some(paths) = sources.remove(id) {
                if paths.len() > 1 {
                    conflicts.push(Conflict::DuplicateIdentifier {
                        identifier: id.to_string(),
                        sources: paths,
                    });
                }
            }
        }

        // Exclusive asset claims across different identifiers
        let mut claim_order: Vec<&str> = Vec::new();
        let mut claims: HashMap<&str, (AssetCategory, Vec<&str>)> = HashMap::new();
        for m in mods {
            for asset in &m.record().assets {
                if !self.is_exclusive(asset.category) {
                    continue;
                }
                let entry = claims.entry(asset.path.as_str()).or_insert_with(|| {
                    claim_order.push(asset.path.as_str());
                    (asset.category, Vec::new())
                });
                if !entry.1.contains(&m.identifier()) {
                    entry.1.push(m.identifier());
                }
            }
        }
        for path in claim_order {
            let Some((category, claimants)) = claims.get(path) else {
                continue;
            };
            for (i, first) in claimants.iter().enumerate() {
                for second in &claimants[i + 1..] {
                    let mut pair = [first.to_string(), second.to_string()];
                    pair.sort();
                    conflicts.push(Conflict::OverlappingClaim {
                        asset_path: path.to_string(),
                        category: *category,
                        identifiers: pair,
                    });
                }
            }
        }

        conflicts
    }
}

impl Default for ModRegistry {
    fn default() -> Self {
        Self::new()
    }
}
