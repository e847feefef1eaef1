//! Unreal project layout and content root discovery
//!
//! Mods live under the project's own content and under the content of every
//! enabled plugin. This module reads the `.uproject` and `.uplugin`
//! descriptors and produces the ordered list of content roots the discovery
//! scanner walks: the project first, then enabled plugins by name, then any
//! extra roots from configuration.
//!
//! # Examples
//!
//! ```no_run
//! use whiskerwood_mods::config::ScanConfig;
//! use whiskerwood_mods::project::ProjectLayout;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let layout = ProjectLayout::open("D:/WW/Whiskerwood-Project")?;
//! for root in layout.content_roots(&ScanConfig::default())? {
//!     println!("{} ({})", root.path.display(), root.origin);
//! }
//! # Ok(())
//! # }
//! ```

use crate::config::{expand_path, ScanConfig};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Unreal Engine project file (.uproject)
///
/// Only the fields the mod tools read are modelled; everything else in the
/// file is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UProject {
    #[serde(rename = "FileVersion", default)]
    pub file_version: i32,

    #[serde(rename = "EngineAssociation", default)]
    pub engine_association: String,

    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "Plugins", default, skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<UProjectPlugin>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UProjectPlugin {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Enabled")]
    pub enabled: bool,
}

impl UProject {
    /// Find .uproject file in the given directory
    pub fn find<P: AsRef<Path>>(dir: P) -> Result<PathBuf> {
        let dir = dir.as_ref();

        for entry in fs::read_dir(dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "skipping unreadable entry under Plugins"
                    );
                    continue;
                }
            };
            let path = entry.path();

            if path.extension().and_then(|s| s.to_str()) == Some("uproject") {
                return Ok(path);
            }
        }

        Err(Error::NoUProjectFile(dir.display().to_string()))
    }

    /// Load .uproject file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let uproject: UProject = serde_json::from_str(&content)?;
        Ok(uproject)
    }

    /// Explicit enable state the project gives a plugin, if it lists it.
    pub fn plugin_setting(&self, name: &str) -> Option<bool> {
        self.plugins
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .map(|p| p.enabled)
    }
}

/// The parts of a .uplugin descriptor that decide content discovery
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UPlugin {
    #[serde(rename = "FriendlyName", default)]
    pub friendly_name: String,

    #[serde(rename = "CanContainContent", skip_serializing_if = "Option::is_none")]
    pub can_contain_content: Option<bool>,

    #[serde(rename = "EnabledByDefault", skip_serializing_if = "Option::is_none")]
    pub enabled_by_default: Option<bool>,
}

impl UPlugin {
    /// Load .uplugin file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let uplugin: UPlugin = serde_json::from_str(&content)?;
        Ok(uplugin)
    }

    /// Get plugin name from filename
    pub fn name<P: AsRef<Path>>(path: P) -> Option<String> {
        path.as_ref()
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.to_string())
    }
}

/// A project plugin found under `Plugins/`.
#[derive(Debug, Clone)]
pub struct PluginInfo {
    pub name: String,
    pub dir: PathBuf,
    pub descriptor: UPlugin,
}

/// Where a content root came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootOrigin {
    Project,
    Plugin(String),
    Configured,
}

impl fmt::Display for RootOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RootOrigin::Project => f.write_str("project"),
            RootOrigin::Plugin(name) => write!(f, "plugin {}", name),
            RootOrigin::Configured => f.write_str("configured"),
        }
    }
}

/// A directory the discovery scanner walks for manifests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRoot {
    pub path: PathBuf,
    pub origin: RootOrigin,
}

impl ContentRoot {
    pub fn new<P: Into<PathBuf>>(path: P, origin: RootOrigin) -> Self {
        Self {
            path: path.into(),
            origin,
        }
    }
}

/// An opened Unreal project directory
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    pub project_dir: PathBuf,
    pub uproject_path: PathBuf,
    pub uproject: UProject,
}

impl ProjectLayout {
    /// Open the project whose .uproject lives directly in `dir`
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let project_dir = dir.as_ref().to_path_buf();
        let uproject_path = UProject::find(&project_dir)?;
        let uproject = UProject::load(&uproject_path)?;

        Ok(Self {
            project_dir,
            uproject_path,
            uproject,
        })
    }

    /// Project name from the .uproject filename
    pub fn name(&self) -> Option<String> {
        self.uproject_path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.to_string())
    }

    /// Every plugin under `Plugins/`, sorted by name.
    ///
    /// Plugins may sit in category folders (`Plugins/UI/MyPlugin/MyPlugin.uplugin`).
    pub fn plugins(&self) -> Result<Vec<PluginInfo>> {
        let plugins_dir = self.project_dir.join("Plugins");
        if !plugins_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut plugins = Vec::new();
        for entry in WalkDir::new(&plugins_dir).max_depth(3).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(
                        path = ?e.path().map(|p| p.display().to_string()),
                        error = %e,
                        "skipping unreadable entry under Plugins"
                    );
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|s| s.to_str()) != Some("uplugin")
            {
                continue;
            }

            let Some(name) = UPlugin::name(path) else {
                continue;
            };
            let descriptor = match UPlugin::load(path) {
                Ok(d) => d,
                Err(e) => {
                    tracing::warn!(plugin = %name, error = %e, "skipping unreadable plugin descriptor");
                    continue;
                }
            };
            let dir = path.parent().unwrap_or(&plugins_dir).to_path_buf();
            plugins.push(PluginInfo {
                name,
                dir,
                descriptor,
            });
        }

        plugins.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(plugins)
    }

    /// Plugins that are enabled for this project.
    ///
    /// The .uproject entry wins; otherwise the plugin's `EnabledByDefault`
    /// (default true) decides. Plugins that declare they cannot contain
    /// content are skipped.
    pub fn enabled_plugins(&self) -> Result<Vec<PluginInfo>> {
        Ok(self
            .plugins()?
            .into_iter()
            .filter(|p| {
                let enabled = self
                    .uproject
                    .plugin_setting(&p.name)
                    .or(p.descriptor.enabled_by_default)
                    .unwrap_or(true);
                enabled && p.descriptor.can_contain_content != Some(false)
            })
            .collect())
    }

    /// Ordered content roots: project, enabled plugins, then configured extras.
    ///
    /// Order decides which manifest wins when identifiers collide.
    pub fn content_roots(&self, scan: &ScanConfig) -> Result<Vec<ContentRoot>> {
        let mut roots = vec![ContentRoot::new(
            self.project_dir.join(&scan.mods_subdir),
            RootOrigin::Project,
        )];

        if scan.include_plugins {
            for plugin in self.enabled_plugins()? {
                roots.push(ContentRoot::new(
                    plugin.dir.join(&scan.mods_subdir),
                    RootOrigin::Plugin(plugin.name),
                ));
            }
        }

        roots.extend(configured_roots(scan, Some(&self.project_dir)));
        Ok(roots)
    }
}

/// Extra roots from configuration, relative paths resolved against `base`.
pub fn configured_roots(scan: &ScanConfig, base: Option<&Path>) -> Vec<ContentRoot> {
    scan.roots
        .iter()
        .map(|root| {
            let path = expand_path(root);
            let path = match base {
                Some(base) if path.is_relative() => base.join(path),
                _ => path,
            };
            ContentRoot::new(path, RootOrigin::Configured)
        })
        .collect()
}
