use super::{Context, GlobalOpts};
use anyhow::Result;
use std::path::Path;

pub fn run(opts: &GlobalOpts) -> Result<()> {
    let ctx = Context::load(opts)?;
    let deployer = ctx.deployer()?;
    let paths = deployer.paths();

    println!("Whiskerwood directories:");
    println!();
    show("Project", &paths.project_dir);
    show("Mods", &paths.mods_dir);
    show("App data", &paths.app_data_dir);
    show("Logs", &paths.logs_dir);
    show("Workshop staging", &paths.staging_dir);
    match &paths.pak_dir {
        Some(dir) => show("Cooked paks", dir),
        None => println!("  {:<18} (none found; cook the project first)", "Cooked paks"),
    }
    println!();
    println!(
        "  Platform: {} (UAT: {})",
        paths.platform_name,
        paths.uat_platform_name()
    );
    if ctx.config.steam.app_id > 0 {
        println!("  Steam App ID: {}", ctx.config.steam.app_id);
    } else {
        println!("  Steam App ID: not set");
    }

    if let Some(layout) = &ctx.project {
        println!();
        println!("Content roots:");
        for root in layout.content_roots(&ctx.config.scan)? {
            println!("  {} [{}]", root.path.display(), root.origin);
        }
    }

    Ok(())
}

fn show(label: &str, path: &Path) {
    let marker = if path.exists() { "✓" } else { "✗" };
    println!("  {:<18} {} {}", label, marker, path.display());
}
