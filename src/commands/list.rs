use super::{display_path, plural, Context, GlobalOpts};
use anyhow::Result;

pub fn run(opts: &GlobalOpts, runtime: bool) -> Result<()> {
    let ctx = Context::load(opts)?;
    let (service, _) = ctx.scanned_service(false)?;

    if runtime {
        return list_runtime(&ctx, &service);
    }

    let items = service.mod_list();
    if items.is_empty() {
        println!("No mods found.");
        println!();
        println!("Mod manifests are read from <project>/{} and enabled plugins.", ctx.config.scan.mods_subdir);
        return Ok(());
    }

    println!("{:<9} {:<28} {:<10} {:<8} SOURCE", "STATUS", "IDENTIFIER", "VERSION", "ENABLED");
    for item in &items {
        let mut flags = String::new();
        if !item.active {
            flags.push_str(" (shadowed)");
        }
        if item.conflicted {
            flags.push_str(" ⚠");
        }
        println!(
            "{:<9} {:<28} {:<10} {:<8} {}{}",
            item.badge,
            item.identifier,
            item.version,
            if item.enabled { "yes" } else { "no" },
            display_path(&item.source, 60),
            flags
        );
        for failure in &item.failures {
            println!("          {} {}", failure.outcome.status(), failure.path);
        }
    }

    println!();
    println!("Total: {} mod{}", items.len(), plural(items.len()));
    ctx.print_catalog_note();
    Ok(())
}

fn list_runtime(ctx: &Context, service: &whiskerwood_mods::ModService) -> Result<()> {
    let mods = service.list_enabled_resolved();
    if mods.is_empty() {
        println!("No mods would be loaded by the game.");
        ctx.print_catalog_note();
        return Ok(());
    }

    println!("Load order:");
    for (i, m) in mods.iter().enumerate() {
        println!("  {:>3}. {} @ {}", i + 1, m.identifier(), m.record().version);
    }
    Ok(())
}
