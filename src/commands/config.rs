use anyhow::Result;
use whiskerwood_mods::config::SETTABLE_KEYS;
use whiskerwood_mods::Config;

pub fn run(action: &crate::ConfigAction) -> Result<()> {
    use crate::ConfigAction;

    match action {
        ConfigAction::Show => show_config(),
        ConfigAction::Set { key, value } => set_config(key, value),
        ConfigAction::Path => {
            println!("{}", Config::default_path()?.display());
            Ok(())
        }
    }
}

fn show_config() -> Result<()> {
    let config = Config::load()?;
    let config_path = Config::default_path()?;

    println!();
    println!("Whiskerwood Mod Tools configuration");
    println!("  📁 Config file: {}", config_path.display());
    println!();

    section("Paths");
    row("project_directory", or_auto(&config.paths.project_directory));
    row("mods_directory", or_auto(&config.paths.mods_directory));
    row("app_data_directory", or_auto(&config.paths.app_data_directory));
    row("logs_directory", or_auto(&config.paths.logs_directory));
    row("staging_directory", or_auto(&config.paths.staging_directory));
    row("pak_directory", or_auto(&config.paths.pak_directory));
    row("platform_name", config.paths.platform_name.clone());
    end_section();

    section("Scan");
    row("include_plugins", format_bool(config.scan.include_plugins));
    row("mods_subdir", config.scan.mods_subdir.clone());
    row("manifest_extension", config.scan.manifest_extension.clone());
    if config.scan.roots.is_empty() {
        row("roots", "(none)".to_string());
    } else {
        row("roots", config.scan.roots.join(", "));
    }
    end_section();

    section("Registry");
    let exclusive: Vec<String> = config
        .registry
        .exclusive_categories
        .iter()
        .map(|c| c.to_string())
        .collect();
    row("exclusive_categories", exclusive.join(", "));
    end_section();

    section("Steam");
    row(
        "app_id",
        if config.steam.app_id > 0 {
            config.steam.app_id.to_string()
        } else {
            "(not set)".to_string()
        },
    );
    end_section();

    section("Mods");
    if config.mods.disabled.is_empty() {
        row("disabled", "(none)".to_string());
    } else {
        row("disabled", config.mods.disabled.join(", "));
    }
    end_section();

    section("Logging");
    row("filter", config.logging.filter.clone());
    end_section();

    section("Log watch");
    row("interval_ms", config.logwatch.interval_ms.to_string());
    if config.logwatch.watches.is_empty() {
        row("watches", "(game log)".to_string());
    }
    for watch in &config.logwatch.watches {
        let state = if watch.enabled { "" } else { " (disabled)" };
        row(&watch.id, format!("{}{}", watch.path, state));
    }
    end_section();

    println!("💡 Modify settings:");
    println!("   wwmods config set <key> <value>");
    println!();
    println!("   Available keys:");
    for key in SETTABLE_KEYS {
        println!("     • {}", key);
    }
    println!();

    Ok(())
}

fn section(title: &str) {
    println!("┌─ {} ", title);
}

fn row(key: &str, value: String) {
    println!("│  {:<22} {}", key, value);
}

fn end_section() {
    println!("└─");
    println!();
}

fn or_auto(value: &str) -> String {
    if value.trim().is_empty() {
        "(auto)".to_string()
    } else {
        value.to_string()
    }
}

fn format_bool(value: bool) -> String {
    if value {
        "✅ enabled".to_string()
    } else {
        "❌ disabled".to_string()
    }
}

fn set_config(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?;

    println!();
    println!("⚙️  Updating configuration...");
    println!();

    config.set_value(key, value)?;
    println!("  ✓ {} = \"{}\"", key, value);

    config.save()?;
    println!();
    println!("✅ Configuration saved");
    println!();

    Ok(())
}
