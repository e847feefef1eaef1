pub mod config;
pub mod conflicts;
pub mod deploy;
pub mod list;
pub mod logs;
pub mod paths;
pub mod scan;
pub mod toggle;
pub mod validate;

use anyhow::{Context as _, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use whiskerwood_mods::config::expand_path;
use whiskerwood_mods::deploy::{Deployer, WhiskerwoodPaths};
use whiskerwood_mods::service::{ModService, ScanSummary, SharedCatalog};
use whiskerwood_mods::{Config, Error, InMemoryCatalog, ModRecord, ProjectLayout, ScanMode};

/// Options shared by every subcommand
#[derive(Debug, Clone, Default)]
pub struct GlobalOpts {
    pub project: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
}

/// Everything a command needs after config and project lookup
pub struct Context {
    pub config: Config,
    pub project_dir: PathBuf,
    pub project: Option<ProjectLayout>,
    pub catalog_loaded: bool,
    catalog: SharedCatalog,
}

impl Context {
    /// Load config, locate the project and load the asset catalog.
    ///
    /// Project directory precedence: `--project`, then
    /// `paths.project_directory`, then the current directory. A missing
    /// .uproject is only an error when the directory was given explicitly.
    pub fn load(opts: &GlobalOpts) -> Result<Self> {
        let config = Config::load()?;

        let configured = config.paths.project_directory.trim();
        let (project_dir, explicit) = match &opts.project {
            Some(dir) => (dir.clone(), true),
            None if !configured.is_empty() => (expand_path(configured), true),
            None => (env::current_dir()?, false),
        };

        let project = match ProjectLayout::open(&project_dir) {
            Ok(layout) => Some(layout),
            Err(e) if explicit => return Err(e.into()),
            Err(_) => None,
        };

        let (catalog, catalog_loaded): (SharedCatalog, bool) = match &opts.catalog {
            Some(path) => {
                let catalog = InMemoryCatalog::load(path).with_context(|| {
                    format!("Failed to load asset catalog from {}", path.display())
                })?;
                (Arc::new(catalog), true)
            }
            None => (Arc::new(InMemoryCatalog::loading()), false),
        };

        Ok(Self {
            config,
            project_dir,
            project,
            catalog_loaded,
            catalog,
        })
    }

    pub fn service(&self) -> Result<ModService> {
        Ok(ModService::from_config(
            &self.config,
            self.project.as_ref(),
            self.catalog.clone(),
        )?)
    }

    /// Build the service and run one full scan, with a spinner when `spinner` is set.
    pub fn scanned_service(&self, spinner: bool) -> Result<(ModService, Arc<ScanSummary>)> {
        let service = self.service()?;

        let pb = if spinner {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg}")?
                    .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
            );
            pb.enable_steady_tick(Duration::from_millis(80));
            pb.set_message("Scanning mod manifests...");
            Some(pb)
        } else {
            None
        };

        let summary = service.rescan(ScanMode::Full);

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        Ok((service, summary))
    }

    pub fn deployer(&self) -> Result<Deployer> {
        let paths = WhiskerwoodPaths::resolve(&self.config.paths, &self.project_dir)?;
        Ok(Deployer::new(paths, self.config.steam.app_id))
    }

    /// Print a note when mods were scanned without a catalog
    pub fn print_catalog_note(&self) {
        if !self.catalog_loaded {
            println!("Note: no asset catalog given (--catalog), asset references were not checked.");
        }
    }
}

/// Scan and return the active record for `identifier`
pub fn find_mod(ctx: &Context, identifier: &str) -> Result<ModRecord> {
    let (service, _) = ctx.scanned_service(false)?;
    service
        .registry()
        .active(identifier)
        .map(|m| m.record().clone())
        .ok_or_else(|| Error::ModNotFound(identifier.to_string()).into())
}

/// Shorten long paths for table output
pub fn display_path(path: &Path, max: usize) -> String {
    let s = path.display().to_string();
    let count = s.chars().count();
    if count <= max {
        s
    } else {
        let tail: String = s.chars().skip(count - (max - 3)).collect();
        format!("...{}", tail)
    }
}

pub fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
