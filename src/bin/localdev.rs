//! `localdev` CLI binary.
//!
//! ```text
//! localdev legacy add foo prod
//! localdev legacy stop foo prod
//! localdev legacy rm foo prod
//! localdev legacy path foo prod
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use localdev::cli::cancel::Cancellation;
use localdev::console::commands::legacy::{
    add::AddCommand, config::ConfigCommand, path::PathCommand, ready::ReadyCommand,
    rm::RmCommand, start::StartCommand, stop::StopCommand, LegacyTarget,
};
use localdev::console::commands::CallableTrait;
use localdev::telemetry::{get_subscriber, init_subscriber};

#[derive(Parser, Debug)]
#[command(
    name = "localdev",
    version,
    about = "Run legacy Drupal and WordPress sites locally",
    long_about = "localdev — local copies of legacy Drupal and WordPress sites\n\n\
        Pulls the latest site archive from S3 using the app's databag in Vault,\n\
        unpacks it under ~/.localdev/legacy/<name>-<environment>, and runs it\n\
        with docker compose."
)]
struct Cli {
    /// Config file (default: ~/.localdev/config.yaml)
    #[arg(long, global = true, value_name = "FILE", env = "LOCALDEV_CONFIG")]
    config: Option<PathBuf>,
    /// Debug logging (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Legacy Drupal / WordPress apps
    Legacy {
        #[command(subcommand)]
        command: LegacyCommands,
    },
}

#[derive(Debug, Args)]
struct AppArgs {
    /// App name as used in its databag
    name: String,
    /// Environment inside the databag (e.g. prod)
    environment: String,
}

#[derive(Debug, Subcommand)]
enum LegacyCommands {
    /// Fetch, unpack, start and configure an app
    Add(AppArgs),
    /// Start the app's containers
    Start(AppArgs),
    /// Stop the app's containers
    Stop(AppArgs),
    /// Remove the app's containers
    Rm(AppArgs),
    /// Regenerate settings files for the running containers
    Config(AppArgs),
    /// Wait until the site answers and print its URL
    Ready(AppArgs),
    /// Print the app's working directory
    Path {
        #[command(flatten)]
        app: AppArgs,
        /// Relative to ~/.localdev
        #[arg(long)]
        relative: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    let subscriber = get_subscriber("localdev".into(), filter.into());
    init_subscriber(subscriber)?;

    let cancellation = Cancellation::new();
    watch_ctrl_c(cancellation.clone());

    let command = get_command(cli, cancellation);
    if let Err(err) = command.call() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
    Ok(())
}

/// Flip the cancellation flag on Ctrl-C; running stages stop at their next
/// check and child processes are killed.
fn watch_ctrl_c(cancellation: Cancellation) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                tracing::warn!("Ctrl-C handling unavailable: {}", e);
                return;
            }
        };

        runtime.block_on(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("Interrupted, stopping...");
                cancellation.cancel();
            }
        });
    });
}

fn get_command(cli: Cli, cancellation: Cancellation) -> Box<dyn CallableTrait> {
    let config = cli.config;
    let target = |app: AppArgs| {
        LegacyTarget::new(app.name, app.environment, config.clone(), cancellation.clone())
    };

    match cli.command {
        Commands::Legacy { command } => match command {
            LegacyCommands::Add(app) => Box::new(AddCommand::new(target(app))),
            LegacyCommands::Start(app) => Box::new(StartCommand::new(target(app))),
            LegacyCommands::Stop(app) => Box::new(StopCommand::new(target(app))),
            LegacyCommands::Rm(app) => Box::new(RmCommand::new(target(app))),
            LegacyCommands::Config(app) => Box::new(ConfigCommand::new(target(app))),
            LegacyCommands::Ready(app) => Box::new(ReadyCommand::new(target(app))),
            LegacyCommands::Path { app, relative } => {
                Box::new(PathCommand::new(target(app), relative))
            }
        },
    }
}
