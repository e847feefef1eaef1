//! User configuration management
//!
//! Per-user settings for the mod tools, stored as TOML at
//! `~/.whiskerwood/config.toml`. Every directory setting may be left empty,
//! in which case the tools derive it (see [`crate::deploy::WhiskerwoodPaths`]).
//!
//! # Examples
//!
//! ```no_run
//! use whiskerwood_mods::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = Config::load()?;
//! println!("Manifest extension: {}", config.scan.manifest_extension);
//!
//! config.set_value("paths.project_directory", "D:/WW/Whiskerwood-Project")?;
//! config.save()?;
//! # Ok(())
//! # }
//! ```

use crate::manifest::AssetCategory;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Keys accepted by [`Config::set_value`].
pub const SETTABLE_KEYS: &[&str] = &[
    "paths.project_directory",
    "paths.mods_directory",
    "paths.app_data_directory",
    "paths.logs_directory",
    "paths.staging_directory",
    "paths.pak_directory",
    "paths.platform_name",
    "scan.roots",
    "scan.include_plugins",
    "scan.mods_subdir",
    "scan.manifest_extension",
    "registry.exclusive_categories",
    "steam.app_id",
    "logging.filter",
    "logwatch.interval_ms",
];

/// User configuration file (`~/.whiskerwood/config.toml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Directory overrides
    #[serde(default)]
    pub paths: PathsConfig,

    /// Discovery scanner settings
    #[serde(default)]
    pub scan: ScanConfig,

    /// Mod registry policy
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Steam Workshop settings
    #[serde(default)]
    pub steam: SteamConfig,

    /// Per-mod state kept between CLI runs
    #[serde(default)]
    pub mods: ModsConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Game log files followed by `wwmods logs`
    #[serde(default)]
    pub logwatch: LogWatchConfig,
}

/// Directory overrides. Empty strings mean "derive automatically".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Whiskerwood SDK project root (the directory holding the .uproject)
    #[serde(default)]
    pub project_directory: String,

    /// The game's `Saved/mods` directory
    #[serde(default)]
    pub mods_directory: String,

    /// Root of the game's local app data (`.../AppData/Local/Whiskerwood`)
    #[serde(default)]
    pub app_data_directory: String,

    /// The game's `Saved/Logs` directory
    #[serde(default)]
    pub logs_directory: String,

    /// Where mods are staged for Steam Workshop uploads
    #[serde(default)]
    pub staging_directory: String,

    /// Directory holding cooked `pakchunk*.pak` files
    #[serde(default)]
    pub pak_directory: String,

    /// Human-readable platform ("Windows", "Linux", ...)
    #[serde(default = "default_platform_name")]
    pub platform_name: String,
}

fn default_platform_name() -> String {
    "Windows".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            project_directory: String::new(),
            mods_directory: String::new(),
            app_data_directory: String::new(),
            logs_directory: String::new(),
            staging_directory: String::new(),
            pak_directory: String::new(),
            platform_name: default_platform_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Extra content roots scanned after the project and plugin roots
    #[serde(default)]
    pub roots: Vec<String>,

    /// Scan enabled plugins' content as well as the project's
    #[serde(default = "default_include_plugins")]
    pub include_plugins: bool,

    /// Subdirectory of each project/plugin root that holds mod manifests
    #[serde(default = "default_mods_subdir")]
    pub mods_subdir: String,

    /// File extension identifying manifest files (case-insensitive)
    #[serde(default = "default_manifest_extension")]
    pub manifest_extension: String,
}

fn default_include_plugins() -> bool {
    true
}

fn default_mods_subdir() -> String {
    "Content/Mods".to_string()
}

fn default_manifest_extension() -> String {
    "json".to_string()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            include_plugins: default_include_plugins(),
            mods_subdir: default_mods_subdir(),
            manifest_extension: default_manifest_extension(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Asset categories that only one mod may claim per asset path
    #[serde(default = "default_exclusive_categories")]
    pub exclusive_categories: Vec<AssetCategory>,
}

fn default_exclusive_categories() -> Vec<AssetCategory> {
    vec![AssetCategory::Widget]
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            exclusive_categories: default_exclusive_categories(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SteamConfig {
    /// Steam App ID written into deployed descriptors (0 disables it)
    #[serde(default = "default_steam_app_id")]
    pub app_id: u32,
}

fn default_steam_app_id() -> u32 {
    2489330
}

impl Default for SteamConfig {
    fn default() -> Self {
        Self {
            app_id: default_steam_app_id(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModsConfig {
    /// Identifiers to disable after every scan
    #[serde(default)]
    pub disabled: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// tracing filter directive; RUST_LOG takes precedence
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogWatchConfig {
    /// Milliseconds between polls while following
    #[serde(default = "default_logwatch_interval")]
    pub interval_ms: u64,

    /// Watched files; when empty the game's main log is watched
    #[serde(default)]
    pub watches: Vec<LogWatchEntry>,
}

fn default_logwatch_interval() -> u64 {
    1000
}

impl Default for LogWatchConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_logwatch_interval(),
            watches: Vec::new(),
        }
    }
}

/// One `[[logwatch.watches]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogWatchEntry {
    /// Stable key for this watch
    pub id: String,

    #[serde(default)]
    pub display_name: String,

    /// Log file; relative paths are taken from the logs directory
    pub path: String,

    #[serde(default = "default_watch_enabled")]
    pub enabled: bool,
}

fn default_watch_enabled() -> bool {
    true
}

/// Expand a leading `~` in a configured path.
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}

impl Config {
    /// Get the default config file path
    ///
    /// Uses WHISKERWOOD_CONFIG_DIR if set, otherwise ~/.whiskerwood/config.toml
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(config_dir) = std::env::var("WHISKERWOOD_CONFIG_DIR") {
            return Ok(PathBuf::from(config_dir).join("config.toml"));
        }

        let home = dirs::home_dir()
            .ok_or_else(|| Error::Other("Could not find home directory".to_string()))?;

        Ok(home.join(".whiskerwood").join("config.toml"))
    }

    /// Load config from the default location, or defaults if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path()?)
    }

    /// Load config from a specific file, or defaults if it doesn't exist
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(Self::default_path()?)
    }

    /// Save config to a specific file
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Set a value by dotted key (see [`SETTABLE_KEYS`]).
    ///
    /// List-valued keys take a comma-separated value; an empty value clears them.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "paths.project_directory" => self.paths.project_directory = value.to_string(),
            "paths.mods_directory" => self.paths.mods_directory = value.to_string(),
            "paths.app_data_directory" => self.paths.app_data_directory = value.to_string(),
            "paths.logs_directory" => self.paths.logs_directory = value.to_string(),
            "paths.staging_directory" => self.paths.staging_directory = value.to_string(),
            "paths.pak_directory" => self.paths.pak_directory = value.to_string(),
            "paths.platform_name" => self.paths.platform_name = value.to_string(),
            "scan.roots" => self.scan.roots = split_list(value),
            "scan.include_plugins" => {
                self.scan.include_plugins = value.parse::<bool>().map_err(|_| {
                    Error::InvalidConfig("Invalid boolean value. Use 'true' or 'false'".to_string())
                })?
            }
            "scan.mods_subdir" => self.scan.mods_subdir = value.to_string(),
            "scan.manifest_extension" => {
                let ext = value.trim_start_matches('.');
                if ext.is_empty() {
                    return Err(Error::InvalidConfig(
                        "Manifest extension cannot be empty".to_string(),
                    ));
                }
                self.scan.manifest_extension = ext.to_string();
            }
            "registry.exclusive_categories" => {
                self.registry.exclusive_categories = split_list(value)
                    .iter()
                    .map(|name| name.parse::<AssetCategory>())
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(Error::InvalidConfig)?;
            }
            "steam.app_id" => {
                self.steam.app_id = value.parse::<u32>().map_err(|_| {
                    Error::InvalidConfig(format!("Invalid Steam App ID: {}", value))
                })?
            }
            "logging.filter" => self.logging.filter = value.to_string(),
            "logwatch.interval_ms" => {
                self.logwatch.interval_ms = value
                    .parse::<u64>()
                    .ok()
                    .filter(|ms| *ms > 0)
                    .ok_or_else(|| {
                        Error::InvalidConfig(format!("Invalid poll interval: {}", value))
                    })?
            }
            _ => {
                return Err(Error::InvalidConfig(format!(
                    "Unknown key: {}\n\nAvailable keys:\n  {}",
                    key,
                    SETTABLE_KEYS.join("\n  ")
                )))
            }
        }
        Ok(())
    }

    /// Remember that a mod should stay disabled. Returns false if it already was.
    pub fn disable_mod(&mut self, identifier: &str) -> bool {
        if self.mods.disabled.iter().any(|id| id == identifier) {
            return false;
        }
        self.mods.disabled.push(identifier.to_string());
        true
    }

    /// Forget a disabled mod. Returns false if it was not disabled.
    pub fn enable_mod(&mut self, identifier: &str) -> bool {
        let before = self.mods.disabled.len();
        self.mods.disabled.retain(|id| id != identifier);
        before != self.mods.disabled.len()
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.scan.mods_subdir, "Content/Mods");
        assert_eq!(config.scan.manifest_extension, "json");
        assert!(config.scan.include_plugins);
        assert_eq!(config.registry.exclusive_categories, vec![AssetCategory::Widget]);
        assert_eq!(config.steam.app_id, 2489330);
        assert_eq!(config.paths.platform_name, "Windows");
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
[registry]
exclusive_categories = ["Widget", "DataTable"]

[mods]
disabled = ["sunfall_ui"]
"#,
        )
        .unwrap();

        assert_eq!(
            config.registry.exclusive_categories,
            vec![AssetCategory::Widget, AssetCategory::DataTable]
        );
        assert_eq!(config.mods.disabled, vec!["sunfall_ui".to_string()]);
        assert_eq!(config.scan.manifest_extension, "json");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set_value("scan.roots", "~/mods, /opt/extra").unwrap();
        config.set_value("steam.app_id", "0").unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.scan.roots, vec!["~/mods".to_string(), "/opt/extra".to_string()]);
        assert_eq!(loaded.steam.app_id, 0);
    }

    #[test]
    fn test_logwatch_section() {
        let config: Config = toml::from_str(
            r#"
[logwatch]
interval_ms = 250

[[logwatch.watches]]
id = "game"
display_name = "Whiskerwood"
path = "Whiskerwood.log"

[[logwatch.watches]]
id = "crash"
path = "/tmp/crash.log"
enabled = false
"#,
        )
        .unwrap();

        assert_eq!(config.logwatch.interval_ms, 250);
        assert_eq!(config.logwatch.watches.len(), 2);
        assert!(config.logwatch.watches[0].enabled);
        assert!(!config.logwatch.watches[1].enabled);
        assert_eq!(config.logwatch.watches[1].display_name, "");

        let mut config = Config::default();
        assert_eq!(config.logwatch.interval_ms, 1000);
        assert!(config.set_value("logwatch.interval_ms", "0").is_err());
        config.set_value("logwatch.interval_ms", "500").unwrap();
        assert_eq!(config.logwatch.interval_ms, 500);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_from(temp.path().join("missing.toml")).unwrap();
        assert!(config.mods.disabled.is_empty());
    }

    #[test]
    fn test_set_value_validation() {
        let mut config = Config::default();
        assert!(config.set_value("scan.include_plugins", "maybe").is_err());
        assert!(config.set_value("steam.app_id", "-1").is_err());
        assert!(config
            .set_value("registry.exclusive_categories", "Widget, Hologram")
            .is_err());
        assert!(config.set_value("nope.key", "1").is_err());

        config.set_value("scan.manifest_extension", ".modjson").unwrap();
        assert_eq!(config.scan.manifest_extension, "modjson");

        config
            .set_value("registry.exclusive_categories", "Texture,Widget")
            .unwrap();
        assert_eq!(
            config.registry.exclusive_categories,
            vec![AssetCategory::Texture, AssetCategory::Widget]
        );
    }

    #[test]
    fn test_disable_and_enable_mod() {
        let mut config = Config::default();
        assert!(config.disable_mod("a"));
        assert!(!config.disable_mod("a"));
        assert!(config.enable_mod("a"));
        assert!(!config.enable_mod("a"));
    }

    #[test]
    fn test_expand_path_tilde() {
        let expanded = expand_path("~/mods");
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert_eq!(expand_path("/abs/path"), PathBuf::from("/abs/path"));
    }
}
