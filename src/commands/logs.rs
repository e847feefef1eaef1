use super::{Context, GlobalOpts};
use anyhow::Result;
use std::thread;
use whiskerwood_mods::logwatch::LogWatcher;
use whiskerwood_mods::Error;

/// List watched logs, toggle a watch, or follow new lines until interrupted
pub fn run(
    opts: &GlobalOpts,
    follow: bool,
    enable: Option<&str>,
    disable: Option<&str>,
) -> Result<()> {
    let mut ctx = Context::load(opts)?;
    let logs_dir = ctx.deployer()?.paths().logs_dir.clone();
    let mut watcher = LogWatcher::from_config(&ctx.config.logwatch, &logs_dir);

    let toggles = enable
        .map(|id| (id, true))
        .into_iter()
        .chain(disable.map(|id| (id, false)));
    for (id, enabled) in toggles {
        if !watcher.entries().iter().any(|e| e.id == id) {
            return Err(Error::InvalidConfig(format!("Unknown log watch: {}", id)).into());
        }

        let state = if enabled { "enabled" } else { "disabled" };
        if watcher.set_config_enabled(id, enabled) {
            ctx.config.logwatch.watches = watcher.entries().to_vec();
            ctx.config.save()?;
            println!("✓ Log watch '{}' {}", id, state);
        } else {
            println!("  Log watch '{}' was already {}", id, state);
        }
    }

    if !follow {
        println!("Watched logs ({}):", logs_dir.display());
        for entry in watcher.entries() {
            let path = watcher.resolve_path(entry);
            let marker = if path.is_file() { "✓" } else { "✗" };
            let state = if entry.enabled { "" } else { " (disabled)" };
            println!("  {} {:<12} {}{}", marker, entry.id, path.display(), state);
        }
        return Ok(());
    }

    let active = watcher.entries().iter().filter(|e| e.enabled).count();
    if active == 0 {
        anyhow::bail!("No log watches are enabled. Run: wwmods logs --enable <id>");
    }

    println!("Following {} log file(s), Ctrl-C to stop", active);
    watcher.scan_once();
    loop {
        thread::sleep(watcher.interval());
        for batch in watcher.scan_once() {
            for line in &batch.lines {
                println!("[{}] {}", batch.display_name, line);
            }
        }
    }
}
