use super::{find_mod, Context, GlobalOpts};
use anyhow::Result;

pub fn run(opts: &GlobalOpts, identifier: &str) -> Result<()> {
    let ctx = Context::load(opts)?;
    let record = find_mod(&ctx, identifier)?;
    let deployer = ctx.deployer()?;

    let source = deployer.find_source_pak(&record)?;
    println!("Deploying {} from {}", record.identifier, source.display());

    let mod_dir = deployer.deploy(&record)?;
    println!("✓ Deployed to {}", mod_dir.display());

    if deployer.can_stage_for_workshop(&record) {
        println!();
        println!("Stage for Steam Workshop with: wwmods stage {}", record.identifier);
    }
    Ok(())
}

pub fn run_undeploy(opts: &GlobalOpts, identifier: &str) -> Result<()> {
    let ctx = Context::load(opts)?;
    let record = find_mod(&ctx, identifier)?;
    let deployer = ctx.deployer()?;

    let mod_dir = deployer.mod_directory(&record)?;
    deployer.remove(&record)?;
    println!("✓ Removed {}", mod_dir.display());
    Ok(())
}

pub fn run_stage(opts: &GlobalOpts, identifier: &str) -> Result<()> {
    let ctx = Context::load(opts)?;
    let record = find_mod(&ctx, identifier)?;
    let deployer = ctx.deployer()?;

    let staging = deployer.stage_for_workshop(&record)?;
    println!("✓ Staged {} for Steam Workshop", record.identifier);
    println!("  {}", staging.display());
    Ok(())
}
