use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::path::PathBuf;
use whiskerwood_mods::logging::init_logging;
use whiskerwood_mods::Config;

mod commands;

/// wwmods - Discover, validate and deploy Whiskerwood mods
#[derive(Parser)]
#[command(name = "wwmods")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Whiskerwood SDK project directory (defaults to paths.project_directory, then the current directory)
    #[arg(long, global = true)]
    project: Option<PathBuf>,

    /// Asset registry export used to check asset references
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Show debug logging from the mod tools
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan content roots for mod manifests and report what was found
    Scan,

    /// List discovered mods with their status
    List {
        /// Only mods the game would load (enabled, resolved, not shadowed)
        #[arg(long)]
        runtime: bool,
    },

    /// Validate a single mod manifest file
    Validate {
        /// Path to the manifest
        file: String,
    },

    /// Enable a mod
    Enable {
        /// Mod identifier
        identifier: String,
    },

    /// Disable a mod
    Disable {
        /// Mod identifier
        identifier: String,
    },

    /// Show duplicate identifiers and overlapping asset claims
    Conflicts,

    /// Copy a mod's cooked pak into the game's mods directory
    Deploy {
        /// Mod identifier
        identifier: String,
    },

    /// Remove a deployed mod from the game's mods directory
    Undeploy {
        /// Mod identifier
        identifier: String,
    },

    /// Copy a deployed mod into the Steam Workshop staging directory
    Stage {
        /// Mod identifier
        identifier: String,
    },

    /// Show the resolved Whiskerwood directories
    Paths,

    /// Show or follow the game's log files
    Logs {
        /// Print new lines as they are written, until interrupted
        #[arg(short, long)]
        follow: bool,

        /// Turn a log watch on
        #[arg(long, value_name = "ID")]
        enable: Option<String>,

        /// Turn a log watch off
        #[arg(long, value_name = "ID")]
        disable: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., paths.project_directory)
        key: String,
        /// Configuration value
        value: String,
    },

    /// Print the config file location
    Path,
}

fn main() {
    let cli = Cli::parse();

    if cli.global.verbose {
        init_logging(Some("whiskerwood_mods=debug"));
    } else {
        let filter = Config::load().ok().map(|c| c.logging.filter);
        init_logging(filter.as_deref());
    }

    let opts = commands::GlobalOpts {
        project: cli.global.project,
        catalog: cli.global.catalog,
    };

    let result = match cli.command {
        Commands::Scan => commands::scan::run(&opts),
        Commands::List { runtime } => commands::list::run(&opts, runtime),
        Commands::Validate { file } => commands::validate::run(&opts, &file),
        Commands::Enable { identifier } => commands::toggle::run(&opts, &identifier, true),
        Commands::Disable { identifier } => commands::toggle::run(&opts, &identifier, false),
        Commands::Conflicts => commands::conflicts::run(&opts),
        Commands::Deploy { identifier } => commands::deploy::run(&opts, &identifier),
        Commands::Undeploy { identifier } => commands::deploy::run_undeploy(&opts, &identifier),
        Commands::Stage { identifier } => commands::deploy::run_stage(&opts, &identifier),
        Commands::Paths => commands::paths::run(&opts),
        Commands::Logs {
            follow,
            enable,
            disable,
        } => commands::logs::run(&opts, follow, enable.as_deref(), disable.as_deref()),
        Commands::Config { action } => commands::config::run(&action),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "wwmods", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
