//! Platform detection and game directory defaults
//!
//! # Examples
//!
//! ```
//! use whiskerwood_mods::platform::uat_platform_name;
//!
//! assert_eq!(uat_platform_name("Windows"), "Win64");
//! assert_eq!(uat_platform_name("LinuxArm64"), "Linux");
//! assert_eq!(uat_platform_name(""), "Win64");
//! ```

use std::env;
use std::fs;
use std::path::PathBuf;

/// Human-readable name of the platform the game is cooked for.
///
/// Returns "Windows" on Windows and on WSL, since mods built from WSL target
/// the Windows game install.
pub fn detect_platform() -> String {
    if is_wsl() {
        return "Windows".to_string();
    }

    match env::consts::OS {
        "windows" => "Windows".to_string(),
        "linux" => "Linux".to_string(),
        "macos" => "Mac".to_string(),
        other => other.to_string(),
    }
}

/// True when running under the Windows Subsystem for Linux
pub fn is_wsl() -> bool {
    env::var("WSL_DISTRO_NAME").is_ok()
        || fs::read_to_string("/proc/version")
            .map(|v| v.contains("microsoft") || v.contains("WSL"))
            .unwrap_or(false)
}

/// Map a human platform name to the Unreal Automation Tool platform.
///
/// Matching is a case-insensitive substring test; anything unrecognised
/// falls back to Win64.
pub fn uat_platform_name(human: &str) -> &'static str {
    let lower = human.to_lowercase();

    if lower.contains("win") {
        "Win64"
    } else if lower.contains("linux") {
        "Linux"
    } else if lower.contains("mac") {
        "Mac"
    } else {
        "Win64"
    }
}

/// The per-user local data directory (`%LOCALAPPDATA%` on Windows)
pub fn local_app_data_dir() -> Option<PathBuf> {
    if let Ok(dir) = env::var("LOCALAPPDATA") {
        if !dir.is_empty() {
            return Some(PathBuf::from(dir));
        }
    }
    dirs::data_local_dir()
}

/// Default game mods directory: `<LOCALAPPDATA>/Whiskerwood/Saved/mods`
pub fn default_mods_directory() -> Option<PathBuf> {
    local_app_data_dir().map(|dir| dir.join("Whiskerwood").join("Saved").join("mods"))
}
