//! Whiskerwood Mod Tools - mod discovery, validation and deployment for Whiskerwood
//!
//! Mods for Whiskerwood are described by small JSON manifests that live in the
//! content folders of the Whiskerwood SDK project and its plugins. This crate
//! turns those manifests into a live registry the editor tooling and the game
//! can query:
//!
//! - Strict manifest parsing with field-level diagnostics
//! - Asset reference resolution against a read-only asset catalog
//! - A registry that publishes immutable snapshots, so readers never see a
//!   half-finished rescan
//! - Duplicate identifier and overlapping asset claim detection
//! - Full and incremental discovery scans over ordered content roots
//! - Deployment of cooked chunk paks into the game's mods directory and
//!   Steam Workshop staging
//! - Following the game's log files while testing mods
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use whiskerwood_mods::catalog::InMemoryCatalog;
//! use whiskerwood_mods::project::ProjectLayout;
//! use whiskerwood_mods::scanner::ScanMode;
//! use whiskerwood_mods::{Config, ModService};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load()?;
//! let project = ProjectLayout::open("D:/WW/Whiskerwood-Project")?;
//! let catalog = InMemoryCatalog::load("asset-registry.json")?;
//!
//! let service = ModService::from_config(&config, Some(&project), Arc::new(catalog))?;
//! let summary = service.rescan(ScanMode::Full);
//! println!("{} mods, {} rejected", summary.mods, summary.errors.len());
//!
//! for m in service.list_enabled_resolved() {
//!     println!("{} {}", m.identifier(), m.record().version);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`manifest`] - Mod manifest schema, parser and canonical serialization
//! - [`catalog`] - Read-only asset catalog interface and in-memory catalog
//! - [`resolver`] - Resolve manifest asset references against the catalog
//! - [`registry`] - Snapshot-swapped registry and conflict detection
//! - [`scanner`] - Discover manifests under ordered content roots
//! - [`project`] - .uproject/.uplugin reading and content root discovery
//! - [`service`] - Editor and runtime facade over scanner and registry
//! - [`deploy`] - Copy cooked mods to the mods directory and Workshop staging
//! - [`platform`] - Platform detection and game directory defaults
//! - [`config`] - User configuration management
//! - [`logging`] - tracing subscriber setup for the CLI
//! - [`logwatch`] - Follow appended lines in the game's log files
//! - [`error`] - Error types and result handling

pub mod catalog;
pub mod config;
pub mod deploy;
pub mod error;
pub mod logging;
pub mod logwatch;
pub mod manifest;
pub mod platform;
pub mod project;
pub mod registry;
pub mod resolver;
pub mod scanner;
pub mod service;

pub use catalog::{AssetCatalog, CatalogType, InMemoryCatalog};
pub use config::Config;
pub use deploy::{Deployer, ModDescriptor, WhiskerwoodPaths};
pub use error::{Error, Result};
pub use manifest::{
    load_manifest, parse_manifest, AssetCategory, AssetReference, ManifestError, ModRecord,
};
pub use project::{ContentRoot, ProjectLayout, RootOrigin, UPlugin, UProject};
pub use registry::{Conflict, ModRegistry, RegisteredMod, RegistrySnapshot, ResolvedMod};
pub use resolver::{resolve, Resolution, ResolutionStatus};
pub use scanner::{DiscoveryScanner, ScanErrorReport, ScanMode, ScanOutput};
pub use service::{ModListItem, ModService, ScanSummary};
