//! Mod deployment to the local game install
//!
//! A cooked mod ships as one chunk pak (`pakchunk<N>-*.pak`, where `N` is the
//! manifest's `chunkId`). Deploying copies that pak into
//! `<mods>/<ModDirName>/<ModDirName>.pak` and writes a `.uplugin`-style
//! descriptor next to it, which is what the game reads at startup. A deployed
//! mod can then be staged for a Steam Workshop upload.
//!
//! # Examples
//!
//! ```no_run
//! use whiskerwood_mods::deploy::{Deployer, WhiskerwoodPaths};
//! use whiskerwood_mods::{Config, ModRecord};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load()?;
//! let paths = WhiskerwoodPaths::resolve(&config.paths, "D:/WW/Whiskerwood-Project")?;
//! let deployer = Deployer::new(paths, config.steam.app_id);
//!
//! let record = ModRecord::load("Content/Mods/Sunfall/sunfall.json")?;
//! let mod_dir = deployer.deploy(&record)?;
//! println!("Deployed to {}", mod_dir.display());
//! # Ok(())
//! # }
//! ```

use crate::config::{expand_path, PathsConfig};
use crate::manifest::ModRecord;
use crate::platform::{default_mods_directory, uat_platform_name};
use crate::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Every directory the deployment steps touch, with overrides applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WhiskerwoodPaths {
    /// Whiskerwood SDK project root
    pub project_dir: PathBuf,
    /// `<LOCALAPPDATA>/Whiskerwood/Saved/mods` unless overridden
    pub mods_dir: PathBuf,
    /// Game app data root, two levels above the mods directory
    pub app_data_dir: PathBuf,
    pub logs_dir: PathBuf,
    /// Root of the per-mod Workshop staging folders
    pub staging_dir: PathBuf,
    /// Directory of the first cooked chunk pak, if any has been built
    pub pak_dir: Option<PathBuf>,
    /// Where chunk paks are searched for: the configured pak directory, else
    /// the whole project
    pub pak_search_root: PathBuf,
    /// Human platform name ("Windows") used to prefer matching pak paths
    pub platform_name: String,
}

impl WhiskerwoodPaths {
    /// Resolve all directories from configuration.
    ///
    /// Empty settings are derived: app data from the mods directory, logs and
    /// staging from app data, the pak directory by searching the project.
    pub fn resolve<P: AsRef<Path>>(paths: &PathsConfig, project_dir: P) -> Result<Self> {
        let project_dir = project_dir.as_ref().to_path_buf();

        let mods_dir = match configured(&paths.mods_directory) {
            Some(dir) => dir,
            None => default_mods_directory().ok_or(Error::DirectoryUnknown("mods"))?,
        };

        let app_data_dir = match configured(&paths.app_data_directory) {
            Some(dir) => dir,
            None => mods_dir
                .parent()
                .and_then(Path::parent)
                .map(Path::to_path_buf)
                .ok_or(Error::DirectoryUnknown("app data"))?,
        };

        let logs_dir = configured(&paths.logs_directory)
            .unwrap_or_else(|| app_data_dir.join("Saved").join("Logs"));
        let staging_dir = configured(&paths.staging_directory)
            .unwrap_or_else(|| app_data_dir.join("WorkshopStaging"));

        let (pak_dir, pak_search_root) = match configured(&paths.pak_directory) {
            Some(dir) => (Some(dir.clone()), dir),
            None => (detect_pak_directory(&project_dir), project_dir.clone()),
        };

        Ok(Self {
            project_dir,
            mods_dir,
            app_data_dir,
            logs_dir,
            staging_dir,
            pak_dir,
            pak_search_root,
            platform_name: paths.platform_name.clone(),
        })
    }

    /// Unreal Automation Tool platform for the configured platform name
    pub fn uat_platform_name(&self) -> &'static str {
        uat_platform_name(&self.platform_name)
    }
}

fn configured(value: &str) -> Option<PathBuf> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(expand_path(value))
    }
}

/// Directory holding the first `pakchunk*-*.pak` found under `project_dir`.
pub fn detect_pak_directory(project_dir: &Path) -> Option<PathBuf> {
    let pattern = Regex::new(r"(?i)^pakchunk.*-.*\.pak$").ok()?;
    find_files(project_dir, &pattern)
        .into_iter()
        .next()
        .and_then(|pak| pak.parent().map(Path::to_path_buf))
}

fn find_files(root: &Path, pattern: &Regex) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.file_name()
                .to_str()
                .map(|name| pattern.is_match(name))
                .unwrap_or(false)
        })
        .map(|e| e.into_path())
        .collect()
}

/// The `.uplugin`-style descriptor the game reads for a deployed mod
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModDescriptor {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Description", default)]
    pub description: String,

    #[serde(rename = "Version")]
    pub version: String,

    #[serde(rename = "CreatedBy", default)]
    pub created_by: String,

    #[serde(rename = "SteamAppID", skip_serializing_if = "Option::is_none")]
    pub steam_app_id: Option<u32>,

    #[serde(rename = "SteamWorkshopId", skip_serializing_if = "Option::is_none")]
    pub steam_workshop_id: Option<String>,
}

impl ModDescriptor {
    /// Build the descriptor for `record`; a zero app ID is left out
    pub fn for_record(record: &ModRecord, steam_app_id: u32) -> Self {
        Self {
            name: record.display_name.clone(),
            description: record.description.clone().unwrap_or_default(),
            version: record.version.clone(),
            created_by: record.created_by.clone().unwrap_or_default(),
            steam_app_id: (steam_app_id > 0).then_some(steam_app_id),
            steam_workshop_id: record
                .steam_workshop_id
                .clone()
                .filter(|id| !id.is_empty()),
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Deployment status of one mod, as shown next to it in listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeployStatus {
    /// A cooked chunk pak for the mod exists
    pub has_source_pak: bool,
    /// The mod's pak is in the mods directory
    pub deployed: bool,
    /// Deployed and a Steam App ID is configured
    pub can_stage: bool,
}

/// Copies cooked mods into the game's mods directory and Workshop staging.
#[derive(Debug, Clone)]
pub struct Deployer {
    paths: WhiskerwoodPaths,
    steam_app_id: u32,
}

impl Deployer {
    pub fn new(paths: WhiskerwoodPaths, steam_app_id: u32) -> Self {
        Self {
            paths,
            steam_app_id,
        }
    }

    pub fn paths(&self) -> &WhiskerwoodPaths {
        &self.paths
    }

    /// `<mods>/<ModDirName>`
    ///
    /// Fails unless the directory name is one plain path component, so the
    /// result is always a direct child of the mods directory.
    pub fn mod_directory(&self, record: &ModRecord) -> Result<PathBuf> {
        let dir_name = record.dir_name();
        let mut components = Path::new(dir_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) if name == dir_name => {
                Ok(self.paths.mods_dir.join(name))
            }
            _ => Err(Error::UnsafeModDirectory(dir_name.to_string())),
        }
    }

    pub fn deployed_pak_path(&self, record: &ModRecord) -> Result<PathBuf> {
        Ok(self
            .mod_directory(record)?
            .join(format!("{}.pak", record.dir_name())))
    }

    pub fn descriptor_path(&self, record: &ModRecord) -> Result<PathBuf> {
        Ok(self
            .mod_directory(record)?
            .join(format!("{}.uplugin", record.dir_name())))
    }

    /// Write the deployed descriptor for `record` to `path`
    pub fn write_descriptor(&self, record: &ModRecord, path: &Path) -> Result<()> {
        ModDescriptor::for_record(record, self.steam_app_id).save(path)?;
        tracing::debug!(identifier = %record.identifier, path = %path.display(), "wrote mod descriptor");
        Ok(())
    }

    /// Locate the cooked chunk pak for `record`.
    ///
    /// Searches recursively for `pakchunk<N>-*.pak`; when several match, the
    /// first whose path contains the platform name wins, else the first found.
    pub fn find_source_pak(&self, record: &ModRecord) -> Result<PathBuf> {
        let chunk_id = record
            .chunk_id
            .ok_or_else(|| Error::NoChunkId(record.identifier.clone()))?;

        let pattern = Regex::new(&format!(r"(?i)^pakchunk{}-.*\.pak$", chunk_id))
            .map_err(|e| Error::Other(e.to_string()))?;

        let root = &self.paths.pak_search_root;
        tracing::debug!(root = %root.display(), chunk_id, "searching for chunk pak");

        let found = find_files(root, &pattern);
        let platform = self.paths.platform_name.as_str();

        let preferred = if platform.is_empty() {
            None
        } else {
            found
                .iter()
                .find(|p| p.to_string_lossy().contains(platform))
                .cloned()
        };

        preferred
            .or_else(|| found.into_iter().next())
            .ok_or_else(|| Error::PakNotFound {
                pattern: format!("pakchunk{}-*.pak", chunk_id),
                dir: root.display().to_string(),
            })
    }

    pub fn has_source_pak(&self, record: &ModRecord) -> bool {
        self.find_source_pak(record).is_ok()
    }

    /// Copy the mod's chunk pak into the mods directory and write its
    /// descriptor. Overwrites a previous deployment. Returns the mod directory.
    pub fn deploy(&self, record: &ModRecord) -> Result<PathBuf> {
        let source_pak = self.find_source_pak(record)?;
        let mod_dir = self.mod_directory(record)?;
        fs::create_dir_all(&mod_dir)?;

        let target_pak = self.deployed_pak_path(record)?;
        tracing::info!(
            identifier = %record.identifier,
            from = %source_pak.display(),
            to = %target_pak.display(),
            "copying mod pak"
        );
        fs::copy(&source_pak, &target_pak)?;

        self.write_descriptor(record, &self.descriptor_path(record)?)?;

        tracing::info!(identifier = %record.identifier, dir = %mod_dir.display(), "mod deployed");
        Ok(mod_dir)
    }

    /// True once the mod's pak sits in the mods directory
    pub fn is_deployed(&self, record: &ModRecord) -> bool {
        self.deployed_pak_path(record)
            .map(|pak| pak.is_file())
            .unwrap_or(false)
    }

    /// Delete the mod's directory from the mods directory
    pub fn remove(&self, record: &ModRecord) -> Result<()> {
        if !self.is_deployed(record) {
            return Err(Error::NotDeployed(record.identifier.clone()));
        }

        let mod_dir = self.mod_directory(record)?;
        fs::remove_dir_all(&mod_dir)?;
        tracing::info!(identifier = %record.identifier, dir = %mod_dir.display(), "removed deployed mod");
        Ok(())
    }

    /// Workshop staging needs a deployed mod and a Steam App ID
    pub fn can_stage_for_workshop(&self, record: &ModRecord) -> bool {
        self.is_deployed(record) && self.steam_app_id > 0
    }

    /// Copy a deployed mod's pak and descriptor into
    /// `<staging>/<ModDirName>`. Returns the staging directory.
    pub fn stage_for_workshop(&self, record: &ModRecord) -> Result<PathBuf> {
        if !self.is_deployed(record) {
            return Err(Error::NotDeployed(record.identifier.clone()));
        }
        if self.steam_app_id == 0 {
            return Err(Error::InvalidConfig(
                "Steam App ID is not set. Run: wwmods config set steam.app_id <id>".to_string(),
            ));
        }

        let dir_name = record.dir_name();
        let staging = self.paths.staging_dir.join(dir_name);
        fs::create_dir_all(&staging)?;

        fs::copy(
            self.deployed_pak_path(record)?,
            staging.join(format!("{}.pak", dir_name)),
        )?;

        let descriptor = self.descriptor_path(record)?;
        if descriptor.is_file() {
            fs::copy(&descriptor, staging.join(format!("{}.uplugin", dir_name)))?;
        } else {
            tracing::warn!(identifier = %record.identifier, "deployed mod has no descriptor, staging pak only");
        }

        tracing::info!(identifier = %record.identifier, dir = %staging.display(), "mod staged for workshop");
        Ok(staging)
    }

    pub fn status(&self, record: &ModRecord) -> DeployStatus {
        DeployStatus {
            has_source_pak: self.has_source_pak(record),
            deployed: self.is_deployed(record),
            can_stage: self.can_stage_for_workshop(record),
        }
    }
}
