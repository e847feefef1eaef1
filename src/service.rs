//! Editor and runtime facade over the scanner and registry
//!
//! [`ModService`] owns one [`DiscoveryScanner`] and one [`ModRegistry`].
//! Scans are serialized by a mutex around the scanner, so two rescans never
//! interleave; readers go straight to the registry and are never blocked by
//! a scan in progress. Snapshots are installed with the disabled set already
//! applied, so no reader sees a disabled identifier as enabled.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use whiskerwood_mods::catalog::InMemoryCatalog;
//! use whiskerwood_mods::scanner::{DiscoveryScanner, ScanMode};
//! use whiskerwood_mods::service::ModService;
//! use whiskerwood_mods::registry::ModRegistry;
//!
//! let service = ModService::new(
//!     DiscoveryScanner::new(Vec::new()),
//!     ModRegistry::new(),
//!     Arc::new(InMemoryCatalog::new()),
//! );
//! let summary = service.rescan(ScanMode::Full);
//! assert_eq!(summary.mods, 0);
//! assert!(service.list_enabled_resolved().is_empty());
//! ```

use crate::catalog::AssetCatalog;
use crate::config::Config;
use crate::project::ProjectLayout;
use crate::registry::{Conflict, ModRegistry, RegisteredMod};
use crate::resolver::{ReferenceResolution, ResolutionStatus};
use crate::scanner::{DiscoveryScanner, ScanErrorReport, ScanMode};
use crate::Result;
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Shared handle to the live asset catalog
pub type SharedCatalog = Arc<dyn AssetCatalog + Send + Sync>;

/// What the last completed scan saw.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Registry generation the scan installed
    pub generation: u64,
    pub files_seen: usize,
    pub files_parsed: usize,
    /// Valid records installed in the registry
    pub mods: usize,
    /// Rejected manifests, in discovery order
    pub errors: Vec<ScanErrorReport>,
    pub conflicts: usize,
    pub catalog_pending: bool,
    pub finished_at: Option<DateTime<Utc>>,
    pub elapsed: Duration,
}

/// Short status marker shown next to a mod in listings
pub fn status_badge(status: ResolutionStatus) -> &'static str {
    match status {
        ResolutionStatus::Resolved => "OK",
        ResolutionStatus::Missing => "MISSING",
        ResolutionStatus::TypeMismatch => "TYPE",
        ResolutionStatus::Unresolved => "PENDING",
    }
}

/// One row of the editor's mod list.
#[derive(Debug, Clone)]
pub struct ModListItem {
    pub identifier: String,
    pub display_name: String,
    pub version: String,
    pub source: PathBuf,
    pub status: ResolutionStatus,
    pub badge: &'static str,
    pub enabled: bool,
    /// False for later duplicates of an identifier
    pub active: bool,
    /// Involved in at least one conflict
    pub conflicted: bool,
    /// References that did not resolve
    pub failures: Vec<ReferenceResolution>,
}

impl ModListItem {
    fn from_registered(m: &RegisteredMod, conflicts: &[Conflict]) -> Self {
        let record = m.record();
        Self {
            identifier: record.identifier.clone(),
            display_name: record.display_name.clone(),
            version: record.version.clone(),
            source: record.source.clone(),
            status: m.status(),
            badge: status_badge(m.status()),
            enabled: m.is_enabled(),
            active: m.is_active(),
            conflicted: conflicts.iter().any(|c| c.involves(&record.identifier)),
            failures: m.resolution().failures().cloned().collect(),
        }
    }
}

/// The mod subsystem as the editor and the game see it.
pub struct ModService {
    scanner: Mutex<DiscoveryScanner>,
    registry: Arc<ModRegistry>,
    catalog: RwLock<SharedCatalog>,
    disabled: Mutex<BTreeSet<String>>,
    last_scan: ArcSwap<ScanSummary>,
}

impl ModService {
    pub fn new(scanner: DiscoveryScanner, registry: ModRegistry, catalog: SharedCatalog) -> Self {
        Self {
            scanner: Mutex::new(scanner),
            registry: Arc::new(registry),
            catalog: RwLock::new(catalog),
            disabled: Mutex::new(BTreeSet::new()),
            last_scan: ArcSwap::from_pointee(ScanSummary::default()),
        }
    }

    /// Build a service from configuration.
    ///
    /// Exclusive categories and persisted disabled identifiers come from the
    /// config; content roots from the project layout when one is given.
    pub fn from_config(
        config: &Config,
        project: Option<&ProjectLayout>,
        catalog: SharedCatalog,
    ) -> Result<Self> {
        let scanner = DiscoveryScanner::from_config(config, project)?;
        let registry =
            ModRegistry::with_exclusive_categories(config.registry.exclusive_categories.clone());
        let service = Self::new(scanner, registry, catalog);
        service.set_disabled(config.mods.disabled.iter().cloned());
        Ok(service)
    }

    pub fn registry(&self) -> &Arc<ModRegistry> {
        &self.registry
    }

    /// Swap in a new catalog, e.g. once the engine finishes loading it.
    /// Takes effect on the next rescan.
    pub fn set_catalog(&self, catalog: SharedCatalog) {
        *self.catalog.write().unwrap_or_else(|e| e.into_inner()) = catalog;
    }

    /// Identifiers that are disabled after every scan
    pub fn set_disabled(&self, identifiers: impl IntoIterator<Item = String>) {
        let mut disabled = self.disabled.lock().unwrap_or_else(|e| e.into_inner());
        *disabled = identifiers.into_iter().collect();
    }

    /// Scan, resolve and install a fresh registry snapshot.
    pub fn rescan(&self, mode: ScanMode) -> Arc<ScanSummary> {
        let mut scanner = self.scanner.lock().unwrap_or_else(|e| e.into_inner());
        let catalog = self
            .catalog
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        let output = scanner.scan(&*catalog, mode);
        let files_seen = output.files_seen;
        let files_parsed = output.files_parsed;
        let catalog_pending = output.catalog_pending;
        let elapsed = output.elapsed;
        let errors = output.errors;

        let snapshot = {
            let disabled = self.disabled.lock().unwrap_or_else(|e| e.into_inner());
            self.registry.rebuild_with_disabled(output.mods, &disabled)
        };

        let summary = Arc::new(ScanSummary {
            generation: snapshot.generation(),
            files_seen,
            files_parsed,
            mods: snapshot.len(),
            errors,
            conflicts: snapshot.conflicts().len(),
            catalog_pending,
            finished_at: Some(Utc::now()),
            elapsed,
        });
        self.last_scan.store(summary.clone());
        summary
    }

    /// Run [`rescan`](Self::rescan) on a worker thread.
    pub fn rescan_in_background(self: &Arc<Self>, mode: ScanMode) -> JoinHandle<Arc<ScanSummary>> {
        let service = Arc::clone(self);
        thread::spawn(move || service.rescan(mode))
    }

    /// Enable or disable a mod. The choice survives later rescans.
    ///
    /// Holds the disabled set for the whole update, so a concurrent rescan
    /// installs either the state before this call or the state after it.
    pub fn set_enabled(&self, identifier: &str, enabled: bool) -> Result<usize> {
        let mut disabled = self.disabled.lock().unwrap_or_else(|e| e.into_inner());
        let changed = self.registry.set_enabled(identifier, enabled)?;

        if enabled {
            disabled.remove(identifier);
        } else {
            disabled.insert(identifier.to_string());
        }
        Ok(changed)
    }

    /// Every record with its badge and conflict flag, in discovery order.
    pub fn mod_list(&self) -> Vec<ModListItem> {
        let snapshot = self.registry.snapshot();
        snapshot
            .mods()
            .iter()
            .map(|m| ModListItem::from_registered(m, snapshot.conflicts()))
            .collect()
    }

    /// Rejected manifests from the last completed scan
    pub fn scan_errors(&self) -> Vec<ScanErrorReport> {
        self.last_scan.load().errors.clone()
    }

    pub fn last_scan(&self) -> Arc<ScanSummary> {
        self.last_scan.load_full()
    }

    pub fn conflicts(&self) -> Vec<Conflict> {
        self.registry.conflicts()
    }

    /// Runtime feed for the game
    pub fn list_enabled_resolved(&self) -> Vec<Arc<RegisteredMod>> {
        self.registry.list_enabled_resolved()
    }
}
