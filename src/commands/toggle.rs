use super::{Context, GlobalOpts};
use anyhow::Result;
use whiskerwood_mods::Error;

/// Enable or disable a mod and remember the choice in the config file
pub fn run(opts: &GlobalOpts, identifier: &str, enabled: bool) -> Result<()> {
    let mut ctx = Context::load(opts)?;
    let (service, _) = ctx.scanned_service(false)?;

    let records = match service.set_enabled(identifier, enabled) {
        Ok(records) => records,
        Err(Error::ModNotFound(_)) if enabled => {
            // Not discovered, but a stale entry may still sit in the config
            if !ctx.config.enable_mod(identifier) {
                return Err(Error::ModNotFound(identifier.to_string()).into());
            }
            ctx.config.save()?;
            println!("✓ Removed {} from the disabled list", identifier);
            println!("  (no manifest currently declares it)");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let changed = if enabled {
        ctx.config.enable_mod(identifier)
    } else {
        ctx.config.disable_mod(identifier)
    };
    if changed {
        ctx.config.save()?;
    }

    let verb = if enabled { "Enabled" } else { "Disabled" };
    if records > 1 {
        println!("✓ {} {} ({} manifests declare this identifier)", verb, identifier, records);
    } else {
        println!("✓ {} {}", verb, identifier);
    }

    if !changed {
        println!("  (it was already {})", if enabled { "enabled" } else { "disabled" });
    }

    Ok(())
}
