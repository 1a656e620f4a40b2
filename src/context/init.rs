//! First-run setup and ~/.gitconfig wiring

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::config::{defaults, git, same_path, Settings};
use crate::error::{GitCtxError, Result};
use crate::gitconfig::GitConfigDocument;

use super::models::{IdentityRecord, Registry};
use super::store::ContextStore;

/// Prepare the state directory, registry, fragment and global git config.
///
/// Safe to run on every invocation: the registry is only seeded once, and the
/// include directive is only added when missing.
pub fn initialize(settings: &Settings) -> Result<()> {
    fs::create_dir_all(&settings.state_dir).map_err(|e| {
        GitCtxError::Io(format!(
            "Failed to create {}: {}",
            settings.state_dir.display(),
            e
        ))
    })?;

    let global_path = resolve_symlink(&settings.global_config_path);
    let mut global = GitConfigDocument::load(&global_path)?;
    let global_user = global.entries(git::USER_SECTION);
    let store = ContextStore::new(settings);

    if !store.exists() {
        let record = IdentityRecord::from_entries(&global_user);
        info!(
            "Initializing {} with '{}' context",
            store.registry_path().display(),
            defaults::CONTEXT
        );
        let registry = Registry::with_default(record);
        store.sync_fragment(&registry)?;
        store.save(&registry)?;
    } else {
        let mut registry = store.load()?;
        let mut changed = registry.repair();
        let mut refresh = changed;

        if !global_user.is_empty() {
            warn!(
                "{} has a [user] section again, moving it into the '{}' context",
                global_path.display(),
                defaults::CONTEXT
            );
            registry.contexts.insert(
                defaults::CONTEXT.to_string(),
                IdentityRecord::from_entries(&global_user),
            );
            changed = true;
            refresh |= registry.active_context == defaults::CONTEXT;
        }

        if refresh {
            store.sync_fragment(&registry)?;
        }
        if changed {
            store.save(&registry)?;
        }
    }
    store.writer().touch()?;

    let mut global_changed = global.remove_section(git::USER_SECTION);
    global_changed |= ensure_include(&mut global, settings);
    if global_changed {
        debug!("Updating {}", global_path.display());
        global.save(&global_path)?;
    }

    Ok(())
}

/// Add `include.path = <fragment>` unless an equivalent entry exists.
/// Returns true if the document changed.
fn ensure_include(global: &mut GitConfigDocument, settings: &Settings) -> bool {
    let already = global
        .get_all(git::INCLUDE_SECTION, git::INCLUDE_PATH_KEY)
        .iter()
        .any(|p| same_path(&settings.expand_tilde(p), &settings.fragment_path));
    if already {
        debug!("Fragment already included from global git config");
        return false;
    }

    let fragment = settings.fragment_path.to_string_lossy();
    info!("Adding include.path = {} to global git config", fragment);
    global.add_value(git::INCLUDE_SECTION, git::INCLUDE_PATH_KEY, &fragment);
    true
}

// Dotfile managers often symlink ~/.gitconfig; write through to the target.
fn resolve_symlink(path: &Path) -> PathBuf {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}
