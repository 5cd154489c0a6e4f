//! Orphan Reaper CLI - Clean up subprocesses left behind by earlier sessions
//!
//! A command-line host for the reconciler: sweep watched processes,
//! reclaim a single port, preview what a sweep would touch, and manage
//! the persisted watch configuration.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "orphan-reaper")]
#[command(author, version, about = "Clean up orphaned subprocesses and the ports they hold")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Log signal delivery and liveness probes
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Terminate every process matching a watched pattern or port
    Sweep {
        /// Extra command-line pattern to watch for this run
        #[arg(long = "pattern", value_name = "PATTERN")]
        patterns: Vec<String>,

        /// Extra TCP port to watch for this run
        #[arg(long = "port", value_name = "PORT")]
        ports: Vec<u16>,
    },

    /// Terminate whatever is listening on a port
    FreePort {
        /// Port number to free
        port: u16,
    },

    /// Show what a sweep would terminate, without terminating anything
    #[command(alias = "ls")]
    List {
        /// Extra command-line pattern to watch for this run
        #[arg(long = "pattern", value_name = "PATTERN")]
        patterns: Vec<String>,

        /// Extra TCP port to watch for this run
        #[arg(long = "port", value_name = "PORT")]
        ports: Vec<u16>,
    },

    /// Persist extra patterns or ports to watch
    Watch {
        #[command(subcommand)]
        action: WatchAction,
    },

    /// Show the effective configuration
    Config,
}

#[derive(Subcommand)]
enum WatchAction {
    /// Watch a command-line pattern
    Pattern { pattern: String },
    /// Watch a TCP port
    Port { port: u16 },
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "orphan_reaper_core=debug,orphan_reaper=debug"
    } else {
        "orphan_reaper_core=info,orphan_reaper=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Sweep { patterns, ports }) => {
            commands::sweep::run(&patterns, &ports, cli.json).await?;
        }
        Some(Commands::FreePort { port }) => {
            commands::free_port::run(port, cli.json).await?;
        }
        Some(Commands::List { patterns, ports }) => {
            commands::list::run(&patterns, &ports, cli.json).await?;
        }
        Some(Commands::Watch { action }) => match action {
            WatchAction::Pattern { pattern } => commands::watch::add_pattern(&pattern).await?,
            WatchAction::Port { port } => commands::watch::add_port(port).await?,
        },
        Some(Commands::Config) => {
            commands::config::show(cli.json).await?;
        }
        None => {
            // Default: preview what a sweep would touch
            commands::list::run(&[], &[], cli.json).await?;
        }
    }

    Ok(())
}
