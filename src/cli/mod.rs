//! CLI argument parsing

mod common;
mod context;

use clap::{Parser, Subcommand};

use crate::config::defaults;

pub use common::OutputFormat;
pub use context::{ContextNameArgs, IdentityArgs, IdentityField, ListArgs, ShowArgs, ViewArgs};

/// Switch between git identities
#[derive(Parser, Debug)]
#[command(name = "gitctx")]
#[command(version)]
#[command(about = "Manage named git identities and switch the active one", long_about = None)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, global = true, default_value = defaults::LOG_LEVEL)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// gitctx subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new context
    #[command(after_help = "EXAMPLES:\n  \
        gitctx create work --user-name \"Alice\" --user-email alice@example.com")]
    Create(IdentityArgs),

    /// Make a context active and point git at its identity
    Use(ContextNameArgs),

    /// Replace the identity stored in a context
    Update(IdentityArgs),

    /// Remove a context (switches to 'default' first if it is active)
    Delete(ContextNameArgs),

    /// Print the active context name
    Show(ShowArgs),

    /// Print all context names, one per line
    List(ListArgs),

    /// Display the registry contents
    View(ViewArgs),
}
