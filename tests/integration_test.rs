
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use test_utils::{assert_file_exists, manifest, TestProject};

/// Helper to get the binary command, isolated to the project's config dir
fn wwmods_cmd(project: &TestProject) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_wwmods"));
    cmd.env("WHISKERWOOD_CONFIG_DIR", &project.config_dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .current_dir(&project.project_path);
    cmd
}

#[test]
fn test_help_lists_commands() {
    let project = TestProject::new();
    wwmods_cmd(&project)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("conflicts"));
}

#[test]
fn test_scan_reports_mods_and_rejections() {
    let project = TestProject::new();
    project.write_manifest("a.json", &manifest("a", "/Game/A", "Widget"));
    project.write_manifest("broken.json", "{ not json");
    let catalog = project.write_catalog(&[("/Game/A", "Widget")]);

    wwmods_cmd(&project)
        .arg("scan")
        .arg("--catalog")
        .arg(&catalog)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 1 mod in 2 manifest files"))
        .stdout(predicate::str::contains("Resolved:      1"))
        .stdout(predicate::str::contains("broken.json"))
        .stdout(predicate::str::contains("MalformedSyntax"));
}

#[test]
fn test_scan_without_catalog_leaves_mods_pending() {
    let project = TestProject::new();
    project.write_manifest("a.json", &manifest("a", "/Game/A", "Widget"));

    wwmods_cmd(&project)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("PENDING"))
        .stdout(predicate::str::contains("no asset catalog"));
}

#[test]
fn test_list_and_conflicts_for_duplicates() {
    let project = TestProject::new();
    project.write_manifest("a.json", &manifest("a", "/Game/A", "Widget"));
    project.write_manifest("b.json", &manifest("a", "/Game/B", "Widget"));
    let catalog = project.write_catalog(&[("/Game/A", "Widget"), ("/Game/B", "Texture")]);

    wwmods_cmd(&project)
        .args(["list", "--catalog"])
        .arg(&catalog)
        .assert()
        .success()
        .stdout(predicate::str::contains("OK"))
        .stdout(predicate::str::contains("TYPE"))
        .stdout(predicate::str::contains("(shadowed)"));

    wwmods_cmd(&project)
        .args(["conflicts", "--catalog"])
        .arg(&catalog)
        .assert()
        .success()
        .stdout(predicate::str::contains("Duplicate identifier 'a'"));

    wwmods_cmd(&project)
        .args(["list", "--runtime", "--catalog"])
        .arg(&catalog)
        .assert()
        .success()
        .stdout(predicate::str::contains("1. a @ 1.0.0"));
}

#[test]
fn test_validate_command() {
    let project = TestProject::new();
    let good = project.write_manifest("good.json", &manifest("good", "/Game/G", "Texture"));
    let bad = project.write_manifest("bad.json", &manifest("bad", "/Game/B", "Hologram"));

    wwmods_cmd(&project)
        .arg("validate")
        .arg(&good)
        .assert()
        .success()
        .stdout(predicate::str::contains("is a valid mod manifest"));

    wwmods_cmd(&project)
        .arg("validate")
        .arg(&bad)
        .assert()
        .failure()
        .stdout(predicate::str::contains("UnsupportedAssetType"))
        .stderr(predicate::str::contains("Error:"));

    let catalog = project.write_catalog(&[("/Game/G", "Widget")]);
    wwmods_cmd(&project)
        .arg("validate")
        .arg(&good)
        .arg("--catalog")
        .arg(&catalog)
        .assert()
        .failure()
        .stdout(predicate::str::contains("expected Texture, found Widget"));
}

#[test]
fn test_disable_persists_across_runs() {
    let project = TestProject::new();
    project.write_manifest("a.json", &manifest("a", "/Game/A", "Widget"));
    let catalog = project.write_catalog(&[("/Game/A", "Widget")]);

    wwmods_cmd(&project)
        .args(["disable", "a"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Disabled a"));
    let config = project.read_config();
    assert!(config.contains("[mods]"));
    assert!(config.contains("\"a\""));

    wwmods_cmd(&project)
        .args(["list", "--runtime", "--catalog"])
        .arg(&catalog)
        .assert()
        .success()
        .stdout(predicate::str::contains("No mods would be loaded"));

    wwmods_cmd(&project).args(["enable", "a"]).assert().success();
    wwmods_cmd(&project)
        .args(["list", "--runtime", "--catalog"])
        .arg(&catalog)
        .assert()
        .success()
        .stdout(predicate::str::contains("1. a @ 1.0.0"));
}

#[test]
fn test_enable_unknown_mod_fails() {
    let project = TestProject::new();
    wwmods_cmd(&project)
        .args(["enable", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Mod not found: ghost"));
}

#[test]
fn test_enable_clears_stale_disabled_entry() {
    let project = TestProject::new();
    project.write_config("[mods]\ndisabled = [\"retired_mod\"]\n");

    wwmods_cmd(&project)
        .args(["enable", "retired_mod"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed retired_mod from the disabled list"));
    assert!(!project.read_config().contains("retired_mod"));
}

#[test]
fn test_deploy_rejects_escaping_mod_dir_name() {
    let project = TestProject::new();
    project.write_manifest(
        "evil.json",
        r#"{"identifier":"evil","version":"1","modDirName":"..","chunkId":5,"assets":[]}"#,
    );

    wwmods_cmd(&project)
        .args(["scan"])
        .assert()
        .success()
        .stdout(predicate::str::contains("modDirName"));

    wwmods_cmd(&project)
        .args(["undeploy", "evil"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Mod not found: evil"));
}

#[test]
fn test_deploy_undeploy_and_stage() {
    let project = TestProject::new();
    project.write_manifest(
        "sunfall.json",
        r#"{"identifier":"sunfall","displayName":"Sunfall","version":"2.0",
            "modDirName":"SunfallUI","chunkId":12,"assets":[]}"#,
    );
    let pak_dir = project.project_path.join("Saved/StagedBuilds/Windows/Paks");
    fs::create_dir_all(&pak_dir).unwrap();
    fs::write(pak_dir.join("pakchunk12-Windows.pak"), "pak bytes").unwrap();

    project.write_config(&format!(
        "[paths]\nmods_directory = \"{}\"\n",
        project.game_mods_dir().display().to_string().replace('\\', "/")
    ));

    wwmods_cmd(&project)
        .args(["deploy", "sunfall"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deployed to"));

    let mod_dir = project.game_mods_dir().join("SunfallUI");
    assert_file_exists(&mod_dir.join("SunfallUI.pak"));
    let descriptor = fs::read_to_string(mod_dir.join("SunfallUI.uplugin")).unwrap();
    assert!(descriptor.contains("\"Name\": \"Sunfall\""));
    assert!(descriptor.contains("\"SteamAppID\": 2489330"));

    wwmods_cmd(&project)
        .args(["stage", "sunfall"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Staged sunfall"));
    assert_file_exists(
        &project
            .temp_dir
            .path()
            .join("Local/Whiskerwood/WorkshopStaging/SunfallUI/SunfallUI.pak"),
    );

    wwmods_cmd(&project).args(["undeploy", "sunfall"]).assert().success();
    assert!(!mod_dir.exists());

    wwmods_cmd(&project)
        .args(["undeploy", "sunfall"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not deployed"));
}

#[test]
fn test_deploy_without_chunk_id_fails() {
    let project = TestProject::new();
    project.write_manifest("a.json", &manifest("a", "/Game/A", "Widget"));
    project.write_config(&format!(
        "[paths]\nmods_directory = \"{}\"\n",
        project.game_mods_dir().display().to_string().replace('\\', "/")
    ));

    wwmods_cmd(&project)
        .args(["deploy", "a"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no chunkId"));
}

#[test]
fn test_config_set_and_show() {
    let project = TestProject::new();

    wwmods_cmd(&project)
        .args(["config", "set", "registry.exclusive_categories", "Widget, DataTable"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration saved"));

    wwmods_cmd(&project)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Widget, DataTable"));

    wwmods_cmd(&project)
        .args(["config", "set", "steam.app_id", "not-a-number"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid Steam App ID"));

    wwmods_cmd(&project)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_missing_explicit_project_fails() {
    let project = TestProject::new();
    let empty = project.temp_dir.path().join("empty");
    fs::create_dir_all(&empty).unwrap();

    wwmods_cmd(&project)
        .arg("scan")
        .arg("--project")
        .arg(&empty)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No .uproject file found"));
}

#[test]
fn test_paths_shows_directories_and_roots() {
    let project = TestProject::new();
    project.write_config(&format!(
        "[paths]\nmods_directory = \"{}\"\n",
        project.game_mods_dir().display().to_string().replace('\\', "/")
    ));

    wwmods_cmd(&project)
        .arg("paths")
        .assert()
        .success()
        .stdout(predicate::str::contains("Whiskerwood directories:"))
        .stdout(predicate::str::contains("Workshop staging"))
        .stdout(predicate::str::contains("none found"))
        .stdout(predicate::str::contains("Content roots:"));
}

#[test]
fn test_logs_lists_and_toggles_watches() {
    let project = TestProject::new();
    let logs = project.temp_dir.path().join("Logs");
    fs::create_dir_all(&logs).unwrap();
    fs::write(logs.join("Whiskerwood.log"), "LogInit: boot\n").unwrap();
    project.write_config(&format!(
        "[paths]\nmods_directory = \"{}\"\nlogs_directory = \"{}\"\n",
        project.game_mods_dir().display().to_string().replace('\\', "/"),
        logs.display().to_string().replace('\\', "/")
    ));

    wwmods_cmd(&project)
        .arg("logs")
        .assert()
        .success()
        .stdout(predicate::str::contains("game"))
        .stdout(predicate::str::contains("Whiskerwood.log"));

    wwmods_cmd(&project)
        .args(["logs", "--disable", "game"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Log watch 'game' disabled"))
        .stdout(predicate::str::contains("(disabled)"));
    let config = project.read_config();
    assert!(config.contains("[[logwatch.watches]]"));
    assert!(config.contains("enabled = false"));

    wwmods_cmd(&project)
        .args(["logs", "--follow"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No log watches are enabled"));

    wwmods_cmd(&project)
        .args(["logs", "--enable", "crash"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown log watch: crash"));
}

#[test]
fn test_completions() {
    let project = TestProject::new();
    wwmods_cmd(&project)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wwmods"));
}
