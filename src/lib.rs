//! gitctx - switch between git identities
//!
//! Keeps a registry of named contexts (git user.name / user.email pairs) and
//! rewrites a small git config file, included from `~/.gitconfig`, whenever the
//! active context changes.
//!
//! # Example
//!
//! ```bash
//! # Register a work identity
//! gitctx create work --user-name "Alice" --user-email alice@example.com
//!
//! # Make git use it
//! gitctx use work
//!
//! # Which one is active?
//! gitctx show
//!
//! # All contexts
//! gitctx list
//! ```

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod fsio;
pub mod gitconfig;

pub use cli::{Cli, Command, IdentityField, OutputFormat};
pub use config::Settings;
pub use context::{
    initialize, run_context_command, ContextStore, FragmentWriter, IdentityFields,
    IdentityRecord, Registry,
};
pub use error::{GitCtxError, Result};
pub use gitconfig::GitConfigDocument;
