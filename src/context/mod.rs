//! Context management module
//!
//! Named contexts bundle a git identity (user.name, user.email). The registry
//! records every context and which one is active; the fragment file mirrors the
//! active identity and is included from ~/.gitconfig.

mod commands;
mod fragment;
mod init;
mod models;
mod store;

pub use commands::run_context_command;
pub use fragment::FragmentWriter;
pub use init::initialize;
pub use models::{IdentityFields, IdentityRecord, Registry};
pub use store::ContextStore;
