// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands, their arguments and the global output flags.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tunnelfleet")]
#[command(about = "Load-balanced pool of VPN tunnel containers behind one proxy endpoint")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file (default: discovered in the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print final results
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print machine-readable JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate descriptors and start the tunnel pool and proxy
    Up,

    /// Stop and remove every service of the pool
    Down,

    /// List the pool's services
    List,

    /// Run a command with its traffic routed through the pool
    Run {
        /// Command and arguments to run
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Open a shell whose traffic is routed through the pool
    Interactive {
        /// Shell to start
        #[arg(long, default_value = "sh")]
        shell: String,
    },
}
