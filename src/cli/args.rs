//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Hierarchical service picker: check services, propagate selections, total the price
#[derive(Parser, Debug)]
#[command(name = "svcpick")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging (repeat for more: -d -d -d)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Catalog file (overrides config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath, env = "SVCPICK_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Extra config file
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show all services as a tree with the total
    Tree,

    /// Toggle services in order, showing each change
    Toggle {
        /// Service ids or titles
        #[arg(required = true, num_args = 1..)]
        services: Vec<String>,
    },

    /// Toggle services in order, print only the total
    Total {
        /// Service ids or titles
        services: Vec<String>,
    },

    /// Read commands from stdin (toggle, check, uncheck, clear, tree, total, quit)
    Interactive,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print effective configuration
    Show,
    /// Print global config path
    Path,
    /// Print a config template
    Template,
}
