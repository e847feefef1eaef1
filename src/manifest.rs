//! Mod manifest schema and parser
//!
//! A mod manifest is an author-supplied JSON document describing one mod's
//! identity and the engine assets it ships. This module turns manifest text
//! into a validated [`ModRecord`] or a [`ManifestError`] that names the
//! offending field.
//!
//! # Examples
//!
//! ```
//! use whiskerwood_mods::manifest::{parse_manifest, AssetCategory};
//!
//! let text = r#"{
//!     "identifier": "sunfall_ui",
//!     "version": "1.0",
//!     "assets": [{ "path": "/Game/Mods/Sunfall/WBP_Banner", "type": "Widget" }]
//! }"#;
//!
//! let record = parse_manifest(text, "Mods/sunfall.json").unwrap();
//! assert_eq!(record.identifier, "sunfall_ui");
//! assert_eq!(record.assets[0].category, AssetCategory::Widget);
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Longest identifier a manifest may declare.
pub const MAX_IDENTIFIER_LEN: usize = 128;

/// Closed set of asset categories a manifest may reference.
///
/// Category names are matched exactly (case-sensitive) against the `type`
/// field of each asset entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssetCategory {
    Widget,
    Texture,
    DataTable,
    Material,
    Sound,
    StaticMesh,
    Blueprint,
    DataAsset,
}

impl AssetCategory {
    pub const ALL: [AssetCategory; 8] = [
        AssetCategory::Widget,
        AssetCategory::Texture,
        AssetCategory::DataTable,
        AssetCategory::Material,
        AssetCategory::Sound,
        AssetCategory::StaticMesh,
        AssetCategory::Blueprint,
        AssetCategory::DataAsset,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetCategory::Widget => "Widget",
            AssetCategory::Texture => "Texture",
            AssetCategory::DataTable => "DataTable",
            AssetCategory::Material => "Material",
            AssetCategory::Sound => "Sound",
            AssetCategory::StaticMesh => "StaticMesh",
            AssetCategory::Blueprint => "Blueprint",
            AssetCategory::DataAsset => "DataAsset",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| {
            let names: Vec<&str> = Self::ALL.iter().map(|c| c.as_str()).collect();
            format!(
                "unknown asset category '{}' (expected one of: {})",
                s,
                names.join(", ")
            )
        })
    }
}

/// One asset a mod ships: an engine asset path plus the category the
/// author expects it to have.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetReference {
    pub path: String,

    #[serde(rename = "type")]
    pub category: AssetCategory,
}

/// Validated, canonical representation of one mod manifest.
///
/// Serializing a record produces a manifest document that parses back into
/// an identical record (the `source` path is not part of the document).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModRecord {
    /// Globally unique mod identifier
    pub identifier: String,

    /// Human-readable name; the identifier when the manifest omits it
    pub display_name: String,

    /// Free-form version string (e.g. "1.0.0")
    pub version: String,

    /// One-line description for listings and the deployed descriptor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Author name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    /// Folder name under the game's mods directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mod_dir_name: Option<String>,

    /// Steam Workshop "publishedfileid", once the mod has been published
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steam_workshop_id: Option<String>,

    /// Cook chunk holding this mod's content (`pakchunk<N>-*.pak`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_id: Option<u32>,

    /// Assets in manifest declaration order
    pub assets: Vec<AssetReference>,

    /// Manifest file this record was parsed from
    #[serde(skip)]
    pub source: PathBuf,
}

impl ModRecord {
    /// Folder name used for the mod under the mods directory.
    pub fn dir_name(&self) -> &str {
        self.mod_dir_name.as_deref().unwrap_or(&self.identifier)
    }

    /// Canonical manifest document for this record.
    pub fn to_manifest_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Canonical manifest document, pretty-printed.
    pub fn to_manifest_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load and validate a manifest file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        load_manifest(path).map_err(|source| Error::InvalidManifest {
            path: path.display().to_string(),
            source,
        })
    }

    /// Write this record as a manifest file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_manifest_string()?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Why a manifest was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ManifestError {
    /// The document is not valid JSON.
    #[error("malformed JSON at line {line}, column {column}: {message}")]
    MalformedSyntax {
        message: String,
        line: usize,
        column: usize,
    },

    /// A required field is missing, or a known field has the wrong type or value.
    #[error("schema violation at '{field}': {problem}")]
    SchemaViolation { field: String, problem: String },

    /// An asset `type` names a category outside [`AssetCategory`].
    #[error("unsupported asset type '{value}' at '{field}'")]
    UnsupportedAssetType { field: String, value: String },

    /// The manifest file could not be read.
    #[error("unable to read manifest: {0}")]
    Unreadable(String),
}

impl ManifestError {
    /// Short name of the error class, for status badges.
    pub fn kind(&self) -> &'static str {
        match self {
            ManifestError::MalformedSyntax { .. } => "MalformedSyntax",
            ManifestError::SchemaViolation { .. } => "SchemaViolation",
            ManifestError::UnsupportedAssetType { .. } => "UnsupportedAssetType",
            ManifestError::Unreadable(_) => "Unreadable",
        }
    }
}

/// Raw JSON tree of one candidate manifest, before schema validation.
#[derive(Debug, Clone)]
pub struct ManifestDocument {
    root: Map<String, Value>,
    source: PathBuf,
}

impl ManifestDocument {
    /// Parse manifest text into a JSON object tree.
    ///
    /// Fails with `MalformedSyntax` for invalid JSON and `SchemaViolation`
    /// when the top-level value is not an object.
    pub fn parse<P: AsRef<Path>>(text: &str, source: P) -> std::result::Result<Self, ManifestError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ManifestError::MalformedSyntax {
                message: e.to_string(),
                line: e.line(),
                column: e.column(),
            })?;

        match value {
            Value::Object(root) => Ok(Self {
                root,
                source: source.as_ref().to_path_buf(),
            }),
            other => Err(schema_violation(
                "(root)",
                format!("expected object, found {}", json_type_name(&other)),
            )),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Validate the document against the manifest schema.
    pub fn into_record(self) -> std::result::Result<ModRecord, ManifestError> {
        let obj = &self.root;

        let identifier = required_string(obj, "identifier", "identifier")?;
        if identifier.len() > MAX_IDENTIFIER_LEN {
            return Err(schema_violation(
                "identifier",
                format!("must be at most {} characters", MAX_IDENTIFIER_LEN),
            ));
        }
        if !is_valid_identifier(&identifier) {
            return Err(schema_violation(
                "identifier",
                "must start with a letter or digit and contain only letters, digits, '_', '-' or '.'",
            ));
        }

        let version = required_string(obj, "version", "version")?;
        let display_name =
            optional_string(obj, "displayName")?.unwrap_or_else(|| identifier.clone());

        let mod_dir_name = optional_string(obj, "modDirName")?;
        if let Some(dir) = &mod_dir_name {
            if !is_valid_identifier(dir) || dir.contains("..") {
                return Err(schema_violation(
                    "modDirName",
                    "must be a single directory name of letters, digits, '_', '-' or '.'",
                ));
            }
        }

        let assets = match obj.get("assets") {
            None => return Err(schema_violation("assets", "missing required field")),
            Some(Value::Array(entries)) => entries
                .iter()
                .enumerate()
                .map(|(index, entry)| parse_asset_entry(index, entry))
                .collect::<std::result::Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(schema_violation(
                    "assets",
                    format!("expected array, found {}", json_type_name(other)),
                ))
            }
        };

        Ok(ModRecord {
            identifier,
            display_name,
            version,
            description: optional_string(obj, "description")?,
            created_by: optional_string(obj, "createdBy")?,
            mod_dir_name,
            steam_workshop_id: optional_string(obj, "steamWorkshopId")?,
            chunk_id: optional_chunk_id(obj)?,
            assets,
            source: self.source,
        })
    }
}

/// Parse manifest text into a validated record.
///
/// Pure: performs no I/O and never consults the asset catalog.
pub fn parse_manifest<P: AsRef<Path>>(
    text: &str,
    source: P,
) -> std::result::Result<ModRecord, ManifestError> {
    ManifestDocument::parse(text, source)?.into_record()
}

/// Read a manifest file from disk and parse it.
pub fn load_manifest<P: AsRef<Path>>(path: P) -> std::result::Result<ModRecord, ManifestError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| ManifestError::Unreadable(e.to_string()))?;
    parse_manifest(&text, path)
}

fn parse_asset_entry(index: usize, entry: &Value) -> std::result::Result<AssetReference, ManifestError> {
    let field = format!("assets[{}]", index);
    let obj = match entry {
        Value::Object(obj) => obj,
        other => {
            return Err(schema_violation(
                &field,
                format!("expected object, found {}", json_type_name(other)),
            ))
        }
    };

    let path = required_string(obj, "path", &format!("{}.path", field))?;

    let type_field = format!("{}.type", field);
    let type_name = required_string(obj, "type", &type_field)?;
    let category = AssetCategory::from_name(&type_name).ok_or(
        ManifestError::UnsupportedAssetType {
            field: type_field,
            value: type_name.clone(),
        },
    )?;

    Ok(AssetReference { path, category })
}

fn required_string(
    obj: &Map<String, Value>,
    key: &str,
    field: &str,
) -> std::result::Result<String, ManifestError> {
    match obj.get(key) {
        None => Err(schema_violation(field, "missing required field")),
        Some(Value::String(s)) if s.trim().is_empty() => {
            Err(schema_violation(field, "must be a non-empty string"))
        }
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(schema_violation(
            field,
            format!("expected string, found {}", json_type_name(other)),
        )),
    }
}

/// Absent and `null` both mean "not set".
fn optional_string(
    obj: &Map<String, Value>,
    key: &str,
) -> std::result::Result<Option<String>, ManifestError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(schema_violation(
            key,
            format!("expected string, found {}", json_type_name(other)),
        )),
    }
}

fn optional_chunk_id(obj: &Map<String, Value>) -> std::result::Result<Option<u32>, ManifestError> {
    match obj.get("chunkId") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => match n.as_u64().and_then(|v| u32::try_from(v).ok()) {
            Some(id) if id > 0 => Ok(Some(id)),
            _ => Err(schema_violation("chunkId", "expected a positive integer")),
        },
        Some(other) => Err(schema_violation(
            "chunkId",
            format!("expected number, found {}", json_type_name(other)),
        )),
    }
}

fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphanumeric())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

fn schema_violation(field: &str, problem: impl Into<String>) -> ManifestError {
    ManifestError::SchemaViolation {
        field: field.to_string(),
        problem: problem.into(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUNFALL: &str = r#"{
        "identifier": "sunfall_ui",
        "version": "1.0",
        "assets": [
            { "path": "/Game/Mods/Sunfall/WBP_Banner", "type": "Widget" },
            { "path": "/Game/Mods/Sunfall/T_Banner", "type": "Texture" }
        ]
    }"#;

    fn expect_schema_field(text: &str) -> String {
        match parse_manifest(text, "test.json") {
            Err(ManifestError::SchemaViolation { field, .. }) => field,
            other => panic!("expected SchemaViolation, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_minimal_manifest() {
        let record = parse_manifest(SUNFALL, "Mods/sunfall.json").unwrap();
        assert_eq!(record.identifier, "sunfall_ui");
        assert_eq!(record.display_name, "sunfall_ui");
        assert_eq!(record.version, "1.0");
        assert_eq!(record.source, PathBuf::from("Mods/sunfall.json"));
        assert_eq!(record.assets.len(), 2);
        assert_eq!(record.assets[0].path, "/Game/Mods/Sunfall/WBP_Banner");
        assert_eq!(record.assets[0].category, AssetCategory::Widget);
        assert_eq!(record.assets[1].category, AssetCategory::Texture);
        assert_eq!(record.dir_name(), "sunfall_ui");
    }

    #[test]
    fn test_parse_optional_metadata() {
        let text = r#"{
            "identifier": "more-starter-whiskers",
            "displayName": "More Starter Whiskers",
            "version": "1.2.0",
            "description": "Start with extra whiskers",
            "createdBy": "Shenjima",
            "modDirName": "MoreStarterWhiskers",
            "steamWorkshopId": "9876543210",
            "chunkId": 21,
            "assets": []
        }"#;

        let record = parse_manifest(text, "m.json").unwrap();
        assert_eq!(record.display_name, "More Starter Whiskers");
        assert_eq!(record.created_by.as_deref(), Some("Shenjima"));
        assert_eq!(record.dir_name(), "MoreStarterWhiskers");
        assert_eq!(record.steam_workshop_id.as_deref(), Some("9876543210"));
        assert_eq!(record.chunk_id, Some(21));
        assert!(record.assets.is_empty());
    }

    #[test]
    fn test_unknown_top_level_fields_are_ignored() {
        let text = r#"{"identifier":"a","version":"1","assets":[],"futureField":{"x":1}}"#;
        assert!(parse_manifest(text, "a.json").is_ok());
    }

    #[test]
    fn test_malformed_syntax() {
        let err = parse_manifest("{\"identifier\": \"a\",", "a.json").unwrap_err();
        assert_eq!(err.kind(), "MalformedSyntax");
        if let ManifestError::MalformedSyntax { line, .. } = err {
            assert_eq!(line, 1);
        }
    }

    #[test]
    fn test_missing_identifier_is_schema_violation() {
        let field = expect_schema_field(r#"{"version":"1","assets":[]}"#);
        assert_eq!(field, "identifier");
    }

    #[test]
    fn test_missing_assets_is_schema_violation() {
        let field = expect_schema_field(r#"{"identifier":"a","version":"1"}"#);
        assert_eq!(field, "assets");
    }

    #[test]
    fn test_wrong_field_types() {
        assert_eq!(
            expect_schema_field(r#"{"identifier":7,"version":"1","assets":[]}"#),
            "identifier"
        );
        assert_eq!(
            expect_schema_field(r#"{"identifier":"a","version":"1","assets":{}}"#),
            "assets"
        );
        assert_eq!(
            expect_schema_field(r#"{"identifier":"a","version":"1","assets":[],"displayName":3}"#),
            "displayName"
        );
        assert_eq!(
            expect_schema_field(r#"{"identifier":"a","version":"1","assets":[],"chunkId":-4}"#),
            "chunkId"
        );
    }

    #[test]
    fn test_top_level_must_be_object() {
        assert_eq!(expect_schema_field("[1, 2, 3]"), "(root)");
    }

    #[test]
    fn test_empty_and_invalid_identifiers() {
        assert_eq!(
            expect_schema_field(r#"{"identifier":"  ","version":"1","assets":[]}"#),
            "identifier"
        );
        assert_eq!(
            expect_schema_field(r#"{"identifier":"has space","version":"1","assets":[]}"#),
            "identifier"
        );
        assert_eq!(
            expect_schema_field(r#"{"identifier":"_leading","version":"1","assets":[]}"#),
            "identifier"
        );

        let long = "a".repeat(MAX_IDENTIFIER_LEN + 1);
        let text = format!(r#"{{"identifier":"{}","version":"1","assets":[]}}"#, long);
        assert_eq!(expect_schema_field(&text), "identifier");
    }

    #[test]
    fn test_mod_dir_name_must_stay_one_directory() {
        for dir in ["..", "../Saved", "/etc", "C:\\\\Users", "a/b", "..hidden", ""] {
            let text = format!(
                r#"{{"identifier":"evil","modDirName":"{}","chunkId":5,"version":"1","assets":[]}}"#,
                dir
            );
            assert_eq!(expect_schema_field(&text), "modDirName", "accepted {:?}", dir);
        }

        let text = r#"{"identifier":"ok","modDirName":"Sunfall.UI-2","version":"1","assets":[]}"#;
        assert_eq!(parse_manifest(text, "ok.json").unwrap().dir_name(), "Sunfall.UI-2");
    }

    #[test]
    fn test_asset_field_paths_in_errors() {
        let text = r#"{"identifier":"a","version":"1","assets":[
            {"path":"/Game/A","type":"Widget"},
            {"path":"","type":"Widget"}
        ]}"#;
        assert_eq!(expect_schema_field(text), "assets[1].path");

        let text = r#"{"identifier":"a","version":"1","assets":[{"path":"/Game/A"}]}"#;
        assert_eq!(expect_schema_field(text), "assets[0].type");

        let text = r#"{"identifier":"a","version":"1","assets":["/Game/A"]}"#;
        assert_eq!(expect_schema_field(text), "assets[0]");
    }

    #[test]
    fn test_unsupported_asset_type() {
        let text = r#"{"identifier":"a","version":"1","assets":[{"path":"/Game/A","type":"Hologram"}]}"#;
        let err = parse_manifest(text, "a.json").unwrap_err();
        assert_eq!(
            err,
            ManifestError::UnsupportedAssetType {
                field: "assets[0].type".to_string(),
                value: "Hologram".to_string(),
            }
        );
    }

    #[test]
    fn test_asset_type_is_case_sensitive() {
        let text = r#"{"identifier":"a","version":"1","assets":[{"path":"/Game/A","type":"widget"}]}"#;
        let err = parse_manifest(text, "a.json").unwrap_err();
        assert_eq!(err.kind(), "UnsupportedAssetType");
    }

    #[test]
    fn test_serialize_then_parse_is_identity() {
        let text = r#"{
            "identifier": "sunfall_ui",
            "displayName": "Sunfall",
            "version": "2.0-beta",
            "createdBy": "Pip",
            "chunkId": 3,
            "assets": [
                { "path": "/Game/Mods/Sunfall/WBP_Banner", "type": "Widget" },
                { "path": "/Game/Mods/Sunfall/DT_Loot", "type": "DataTable" },
                { "path": "/Game/Mods/Sunfall/WBP_Banner", "type": "Widget" }
            ]
        }"#;

        let first = parse_manifest(text, "s.json").unwrap();
        let serialized = first.to_manifest_string().unwrap();
        let second = parse_manifest(&serialized, "s.json").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_category_names_round_trip() {
        for category in AssetCategory::ALL {
            assert_eq!(category.as_str().parse::<AssetCategory>(), Ok(category));
        }
        assert!("Hologram".parse::<AssetCategory>().is_err());
    }

    #[test]
    fn test_load_missing_file_is_unreadable() {
        let err = load_manifest("/definitely/not/here.json").unwrap_err();
        assert_eq!(err.kind(), "Unreadable");
    }
}
