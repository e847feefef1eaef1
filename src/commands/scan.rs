use super::{plural, Context, GlobalOpts};
use anyhow::Result;
use whiskerwood_mods::ResolutionStatus;

pub fn run(opts: &GlobalOpts) -> Result<()> {
    let ctx = Context::load(opts)?;

    match &ctx.project {
        Some(layout) => println!(
            "Scanning project {} ({})",
            layout.name().unwrap_or_default(),
            ctx.project_dir.display()
        ),
        None => println!(
            "No .uproject in {}; scanning configured roots only.",
            ctx.project_dir.display()
        ),
    }

    let (service, summary) = ctx.scanned_service(true)?;

    let items = service.mod_list();
    let count = |status: ResolutionStatus| items.iter().filter(|i| i.status == status).count();

    println!();
    println!(
        "Found {} mod{} in {} manifest file{} ({:.2}s)",
        summary.mods,
        plural(summary.mods),
        summary.files_seen,
        plural(summary.files_seen),
        summary.elapsed.as_secs_f64()
    );
    println!("  ✓ Resolved:      {}", count(ResolutionStatus::Resolved));
    println!("  ✗ Missing:       {}", count(ResolutionStatus::Missing));
    println!("  ✗ Type mismatch: {}", count(ResolutionStatus::TypeMismatch));
    if summary.catalog_pending {
        println!("  … Unresolved:    {}", count(ResolutionStatus::Unresolved));
    }

    if !summary.errors.is_empty() {
        println!();
        println!("Rejected manifests:");
        for report in &summary.errors {
            println!("  ✗ {}", report.source.display());
            println!("      {}: {}", report.error.kind(), report.error);
        }
    }

    if summary.conflicts > 0 {
        println!();
        println!(
            "⚠ {} conflict{} detected. Run 'wwmods conflicts' for details.",
            summary.conflicts,
            plural(summary.conflicts)
        );
    }

    if summary.catalog_pending {
        println!();
        ctx.print_catalog_note();
    }

    Ok(())
}
