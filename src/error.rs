use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Invalid manifest {path}: {source}")]
    InvalidManifest {
        path: String,
        #[source]
        source: crate::manifest::ManifestError,
    },

    #[error("Mod not found: {0}\n\n\
             Hint: Run 'wwmods scan' to refresh the registry, then 'wwmods list' to see\n\
             every discovered mod identifier.")]
    ModNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No .uproject file found in {0}\n\n\
             Hint: Point --project at the Whiskerwood SDK project root, or set\n\
             paths.project_directory:\n\
                wwmods config set paths.project_directory /path/to/Whiskerwood-Project")]
    NoUProjectFile(String),

    #[error("No pak matching '{pattern}' found under {dir}\n\n\
             Hint: Cook and package the project first so the chunk paks exist.\n\
             Check that the mod manifest declares the correct chunkId.")]
    PakNotFound { pattern: String, dir: String },

    #[error("Mod '{0}' has no chunkId\n\n\
             Hint: Add a positive \"chunkId\" to the mod manifest naming the cook chunk\n\
             that holds the mod's content (pakchunk<N>-*.pak).")]
    NoChunkId(String),

    #[error("Could not determine the {0} directory\n\n\
             Hint: Set it explicitly, e.g.:\n\
                wwmods config set paths.mods_directory /path/to/Whiskerwood/Saved/mods")]
    DirectoryUnknown(&'static str),

    #[error("Mod '{0}' is not deployed to the mods directory\n\n\
             Hint: Run 'wwmods deploy {0}' first.")]
    NotDeployed(String),

    #[error("Mod directory name '{0}' would leave the mods directory\n\n\
             Hint: Set \"modDirName\" in the mod manifest to a plain folder name.")]
    UnsafeModDirectory(String),

    #[error("{0}")]
    Other(String),
}
