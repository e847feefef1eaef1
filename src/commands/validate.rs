use super::GlobalOpts;
use anyhow::{bail, Result};
use whiskerwood_mods::resolver::ReferenceOutcome;
use whiskerwood_mods::{load_manifest, resolve, InMemoryCatalog};

pub fn run(opts: &GlobalOpts, file: &str) -> Result<()> {
    let record = match load_manifest(file) {
        Ok(record) => record,
        Err(e) => {
            println!("✗ {} is not a valid mod manifest", file);
            println!("  {}: {}", e.kind(), e);
            bail!("Manifest validation failed");
        }
    };

    println!("✓ {} is a valid mod manifest", file);
    println!();
    println!("  Identifier: {}", record.identifier);
    println!("  Name:       {}", record.display_name);
    println!("  Version:    {}", record.version);
    if let Some(chunk) = record.chunk_id {
        println!("  Chunk:      {}", chunk);
    }
    println!("  Assets:     {}", record.assets.len());

    let Some(catalog_path) = &opts.catalog else {
        return Ok(());
    };

    let catalog = InMemoryCatalog::load(catalog_path)?;
    let resolution = resolve(&record, &catalog);

    println!();
    println!("Asset references ({}):", resolution.status);
    for reference in &resolution.references {
        let line = match &reference.outcome {
            ReferenceOutcome::Resolved => format!("✓ {}", reference.path),
            ReferenceOutcome::Missing => format!("✗ {} (missing)", reference.path),
            ReferenceOutcome::TypeMismatch { expected, actual } => format!(
                "✗ {} (expected {}, found {})",
                reference.path,
                expected,
                actual.map(|a| a.to_string()).unwrap_or_else(|| "unsupported type".to_string())
            ),
        };
        println!("  {}", line);
    }

    if !resolution.is_resolved() {
        bail!("Manifest has unresolved asset references");
    }
    Ok(())
}
