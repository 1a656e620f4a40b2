//! Context subcommand arguments

use clap::Parser;

use crate::cli::common::OutputFormat;

/// Arguments for 'create' and 'update'
#[derive(Parser, Debug)]
pub struct IdentityArgs {
    /// Context name
    pub context_name: String,
    /// Value for git user.name
    #[arg(long)]
    pub user_name: String,
    /// Value for git user.email
    #[arg(long)]
    pub user_email: String,
}

/// Arguments for commands that only take a context name
#[derive(Parser, Debug)]
pub struct ContextNameArgs {
    /// Context name
    pub context_name: String,
}

/// Arguments for 'show'
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
        gitctx show\n  \
        gitctx show --fields name --fields email")]
pub struct ShowArgs {
    /// Identity fields of the active context to print after its name
    /// (name, email); unknown fields are skipped
    #[arg(long)]
    pub fields: Vec<String>,
}

/// Arguments for 'list'
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Show a table with identities and the active marker
    #[arg(short, long)]
    pub wide: bool,
}

/// Arguments for 'view'
#[derive(Parser, Debug)]
pub struct ViewArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,
}

/// Identity fields known to `show --fields`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    /// git user.name
    Name,
    /// git user.email
    Email,
}

impl IdentityField {
    /// Look up a field by name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "name" => Some(IdentityField::Name),
            "email" => Some(IdentityField::Email),
            _ => None,
        }
    }
}

impl std::fmt::Display for IdentityField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentityField::Name => write!(f, "name"),
            IdentityField::Email => write!(f, "email"),
        }
    }
}
