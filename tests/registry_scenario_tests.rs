//! End-to-end tests of scanning a project into the registry.


use std::path::PathBuf;
use std::sync::Arc;
use test_utils::{manifest, TestProject};
use whiskerwood_mods::{
    AssetCategory, Config, Conflict, InMemoryCatalog, ModService, ProjectLayout, ResolutionStatus,
    ScanMode,
};

fn service_for(project: &TestProject, catalog: InMemoryCatalog) -> ModService {
    let layout = ProjectLayout::open(&project.project_path).unwrap();
    ModService::from_config(&Config::default(), Some(&layout), Arc::new(catalog)).unwrap()
}

#[test]
fn test_duplicate_identifier_with_type_mismatch() {
    let project = TestProject::new();
    let a = project.write_manifest("a.json", &manifest("a", "/Game/Mods/A/WBP_Main", "Widget"));
    let b = project.write_manifest("b.json", &manifest("a", "/Game/Mods/B/WBP_Main", "Widget"));

    let mut catalog = InMemoryCatalog::new();
    catalog.insert("/Game/Mods/A/WBP_Main", AssetCategory::Widget);
    catalog.insert("/Game/Mods/B/WBP_Main", AssetCategory::Texture);

    let service = service_for(&project, catalog);
    let summary = service.rescan(ScanMode::Full);
    assert_eq!(summary.mods, 2);
    assert!(summary.errors.is_empty());

    let records = service.registry().get("a");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].source(), a.as_path());
    assert_eq!(records[0].status(), ResolutionStatus::Resolved);
    assert_eq!(records[1].source(), b.as_path());
    assert_eq!(records[1].status(), ResolutionStatus::TypeMismatch);

    assert_eq!(
        service.conflicts(),
        vec![Conflict::DuplicateIdentifier {
            identifier: "a".to_string(),
            sources: vec![a, b],
        }]
    );

    let runtime = service.list_enabled_resolved();
    assert_eq!(runtime.len(), 1);
    assert_eq!(runtime[0].status(), ResolutionStatus::Resolved);
}

#[test]
fn test_duplicate_reported_regardless_of_order() {
    let project = TestProject::new();
    project.write_manifest("z_first.json", &manifest("dup", "/Game/Z", "Texture"));
    project.write_manifest("a_second.json", &manifest("dup", "/Game/A", "Texture"));

    let service = service_for(&project, InMemoryCatalog::new());
    service.rescan(ScanMode::Full);

    let conflicts = service.conflicts();
    assert_eq!(conflicts.len(), 1);
    match &conflicts[0] {
        Conflict::DuplicateIdentifier { identifier, sources } => {
            assert_eq!(identifier, "dup");
            let names: Vec<String> = sources
                .iter()
                .map(|s| s.file_name().unwrap().to_string_lossy().to_string())
                .collect();
            assert_eq!(names, vec!["a_second.json", "z_first.json"]);
        }
        other => panic!("unexpected conflict {:?}", other),
    }
}

#[test]
fn test_project_content_precedes_plugins() {
    let project = TestProject::new();
    let plugin = project.create_plugin("SunfallPack");
    std::fs::write(
        plugin.join("Content/Mods/sunfall.json"),
        manifest("sunfall", "/SunfallPack/WBP_Banner", "Widget"),
    )
    .unwrap();
    project.write_manifest("nested/sunfall.json", &manifest("sunfall", "/Game/WBP_Banner", "Widget"));

    let service = service_for(&project, InMemoryCatalog::new());
    service.rescan(ScanMode::Full);

    let active = service.registry().active("sunfall").unwrap();
    assert_eq!(
        active.source(),
        project.mods_root().join("nested/sunfall.json").as_path()
    );
    assert_eq!(service.registry().get("sunfall").len(), 2);
}

#[test]
fn test_bad_manifests_do_not_abort_scan() {
    let project = TestProject::new();
    project.write_manifest("good.json", &manifest("good", "/Game/G", "Widget"));
    project.write_manifest("syntax.json", "{ \"identifier\": ");
    project.write_manifest("schema.json", r#"{"identifier":"s","version":"1","assets":[{"path":""}]}"#);
    project.write_manifest("unsupported.json", &manifest("u", "/Game/U", "Cubemap"));

    let service = service_for(&project, InMemoryCatalog::new());
    let summary = service.rescan(ScanMode::Full);

    assert_eq!(summary.mods, 1);
    let kinds: Vec<(&str, PathBuf)> = summary
        .errors
        .iter()
        .map(|e| (e.error.kind(), e.source.clone()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("SchemaViolation", project.mods_root().join("schema.json")),
            ("MalformedSyntax", project.mods_root().join("syntax.json")),
            ("UnsupportedAssetType", project.mods_root().join("unsupported.json")),
        ]
    );
}

#[test]
fn test_disable_then_rescan_stays_disabled() {
    let project = TestProject::new();
    project.write_manifest("a.json", &manifest("a", "/Game/A", "Widget"));

    let mut catalog = InMemoryCatalog::new();
    catalog.insert("/Game/A", AssetCategory::Widget);
    let service = service_for(&project, catalog);

    service.rescan(ScanMode::Full);
    service.set_enabled("a", false).unwrap();
    service.rescan(ScanMode::Full);

    assert!(service.list_enabled_resolved().is_empty());
    assert!(!service.mod_list()[0].enabled);
}
