use super::{display_path, plural, Context, GlobalOpts};
use anyhow::Result;
use whiskerwood_mods::Conflict;

pub fn run(opts: &GlobalOpts) -> Result<()> {
    let ctx = Context::load(opts)?;
    let (service, _) = ctx.scanned_service(false)?;

    let conflicts = service.conflicts();
    if conflicts.is_empty() {
        println!("✓ No conflicts between discovered mods.");
        return Ok(());
    }

    println!("⚠ {} conflict{} found:", conflicts.len(), plural(conflicts.len()));
    println!();

    for conflict in &conflicts {
        match conflict {
            Conflict::DuplicateIdentifier {
                identifier,
                sources,
            } => {
                println!("  Duplicate identifier '{}'", identifier);
                for (i, source) in sources.iter().enumerate() {
                    let marker = if i == 0 { "active" } else { "shadowed" };
                    println!("    - {} ({})", display_path(source, 70), marker);
                }
            }
            Conflict::OverlappingClaim {
                asset_path,
                category,
                identifiers,
            } => {
                println!("  {} '{}' claimed by:", category, asset_path);
                for identifier in identifiers {
                    println!("    - {}", identifier);
                }
            }
        }
        println!();
    }

    println!("Conflicts are advisory; every mod stays registered.");
    Ok(())
}
