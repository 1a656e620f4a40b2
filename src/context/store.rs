//! Registry file I/O and context operations

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::config::{defaults, git, Settings};
use crate::error::{GitCtxError, Result};
use crate::fsio;

use super::fragment::FragmentWriter;
use super::models::{IdentityRecord, Registry};

/// Owns the JSON registry and keeps the fragment in step with it
pub struct ContextStore {
    registry_path: PathBuf,
    writer: FragmentWriter,
}

impl ContextStore {
    pub fn new(settings: &Settings) -> Self {
        Self {
            registry_path: settings.registry_path.clone(),
            writer: FragmentWriter::new(settings),
        }
    }

    pub fn registry_path(&self) -> &Path {
        &self.registry_path
    }

    pub fn writer(&self) -> &FragmentWriter {
        &self.writer
    }

    /// True once the registry file has been created
    pub fn exists(&self) -> bool {
        self.registry_path.exists()
    }

    /// Load the registry from disk. Errors on a missing file or corrupt JSON.
    pub fn load(&self) -> Result<Registry> {
        let content = fs::read_to_string(&self.registry_path).map_err(|e| {
            GitCtxError::Config(format!(
                "Failed to read registry {}: {}",
                self.registry_path.display(),
                e
            ))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            GitCtxError::Config(format!(
                "Failed to parse registry {}: {}",
                self.registry_path.display(),
                e
            ))
        })
    }

    /// Write the whole registry to disk
    pub fn save(&self, registry: &Registry) -> Result<()> {
        let json = serde_json::to_string_pretty(registry)?;
        fsio::write_atomic(&self.registry_path, &json, 0o644)
    }

    /// Mirror the active context's identity into the fragment
    pub fn sync_fragment(&self, registry: &Registry) -> Result<()> {
        let record = registry
            .active_record()
            .ok_or_else(|| GitCtxError::NotFound(registry.active_context.clone()))?;
        self.writer.write(git::USER_SECTION, &record.fields())
    }

    /// Persist `registry` and mirror its active identity into the fragment.
    ///
    /// The registry is serialized before the fragment is touched, and the
    /// fragment is restored from `previous` if the registry write fails.
    fn commit_with_fragment(&self, previous: &Registry, registry: &Registry) -> Result<()> {
        let json = serde_json::to_string_pretty(registry)?;
        self.sync_fragment(registry)?;
        if let Err(e) = fsio::write_atomic(&self.registry_path, &json, 0o644) {
            warn!("Registry write failed, restoring fragment: {}", e);
            if let Err(restore) = self.sync_fragment(previous) {
                warn!("Failed to restore fragment: {}", restore);
            }
            return Err(e);
        }
        Ok(())
    }

    /// Register a new context; the active context is left alone
    pub fn create(&self, name: &str, user_name: &str, user_email: &str) -> Result<()> {
        let mut registry = self.load()?;
        if registry.contexts.contains_key(name) {
            return Err(GitCtxError::AlreadyExists(name.to_string()));
        }
        registry
            .contexts
            .insert(name.to_string(), IdentityRecord::new(user_name, user_email));
        self.save(&registry)?;
        info!("Created context '{}'", name);
        Ok(())
    }

    /// Make `name` the active context and rewrite the fragment.
    /// Returns the updated registry.
    pub fn use_context(&self, name: &str) -> Result<Registry> {
        let mut registry = self.load()?;
        if !registry.contexts.contains_key(name) {
            return Err(GitCtxError::NotFound(name.to_string()));
        }
        let previous = registry.clone();
        registry.active_context = name.to_string();
        self.commit_with_fragment(&previous, &registry)?;
        info!("Switched to context '{}'", name);
        Ok(registry)
    }

    /// Replace the identity of `name`. Extra user.* keys are kept.
    /// Refreshes the fragment when `name` is active.
    pub fn update(&self, name: &str, user_name: &str, user_email: &str) -> Result<()> {
        let mut registry = self.load()?;
        let previous = registry.clone();
        let record = registry
            .contexts
            .get_mut(name)
            .ok_or_else(|| GitCtxError::NotFound(name.to_string()))?;
        record.user_name = user_name.to_string();
        record.user_email = user_email.to_string();

        if registry.active_context == name {
            debug!("Context '{}' is active, refreshing fragment", name);
            self.commit_with_fragment(&previous, &registry)?;
        } else {
            self.save(&registry)?;
        }
        info!("Updated context '{}'", name);
        Ok(())
    }

    /// Remove `name`, switching to "default" first if it is active
    pub fn delete(&self, name: &str) -> Result<()> {
        if name == defaults::CONTEXT {
            return Err(GitCtxError::ProtectedContext(name.to_string()));
        }
        let mut registry = self.load()?;
        if !registry.contexts.contains_key(name) {
            return Err(GitCtxError::NotFound(name.to_string()));
        }
        if registry.active_context == name {
            registry = self.use_context(defaults::CONTEXT)?;
        }
        registry.contexts.shift_remove(name);
        self.save(&registry)?;
        info!("Deleted context '{}'", name);
        Ok(())
    }

    /// Name of the active context
    pub fn show(&self) -> Result<String> {
        Ok(self.load()?.active_context)
    }

    /// All context names in insertion order
    pub fn list(&self) -> Result<Vec<String>> {
        Ok(self.load()?.names().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store(dir: &TempDir) -> ContextStore {
        let store = ContextStore::new(&Settings::with_home(dir.path()));
        store
            .save(&Registry::with_default(IdentityRecord::new(
                "Default User",
                "default@example.com",
            )))
            .unwrap();
        store
    }

    fn fragment_user(store: &ContextStore) -> Vec<(String, String)> {
        store.writer().read("user").unwrap()
    }

    #[test]
    fn test_load_missing_file_errors() {
        let dir = TempDir::new().unwrap();
        let store = ContextStore::new(&Settings::with_home(dir.path()));
        assert!(!store.exists());
        let err = store.load().unwrap_err().to_string();
        assert!(err.contains("Failed to read registry"));
    }

    #[test]
    fn test_load_corrupt_json_errors() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        fs::write(store.registry_path(), "not valid json!!!").unwrap();
        let err = store.load().unwrap_err().to_string();
        assert!(err.contains("Failed to parse registry"));
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        let mut registry = store.load().unwrap();
        registry
            .contexts
            .insert("work".to_string(), IdentityRecord::new("Alice", "alice@work.com"));
        registry
            .contexts
            .insert("oss".to_string(), IdentityRecord::new("alice", "alice@oss.org"));
        registry.active_context = "work".to_string();

        store.save(&registry).unwrap();
        assert_eq!(store.load().unwrap(), registry);
    }

    #[test]
    fn test_create_then_list_contains_once() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        store.create("work", "Alice", "alice@example.com").unwrap();

        let names = store.list().unwrap();
        assert_eq!(names.iter().filter(|n| *n == "work").count(), 1);
        assert_eq!(names, vec!["default", "work"]);
        assert_eq!(store.show().unwrap(), "default");
    }

    #[test]
    fn test_create_existing_fails_and_leaves_registry() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        store.create("work", "Alice", "alice@example.com").unwrap();
        let before = fs::read_to_string(store.registry_path()).unwrap();

        let err = store.create("work", "Mallory", "m@x").unwrap_err();
        assert!(matches!(err, GitCtxError::AlreadyExists(ref n) if n == "work"));
        assert_eq!(fs::read_to_string(store.registry_path()).unwrap(), before);
    }

    #[test]
    fn test_use_switches_and_writes_fragment() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        store.create("work", "Alice", "alice@example.com").unwrap();

        let registry = store.use_context("work").unwrap();
        assert_eq!(registry.active_context, "work");
        assert_eq!(store.show().unwrap(), "work");
        assert_eq!(
            fragment_user(&store),
            vec![
                ("name".to_string(), "Alice".to_string()),
                ("email".to_string(), "alice@example.com".to_string()),
            ]
        );
    }

    #[test]
    fn test_use_leaves_no_stale_keys() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        let mut registry = store.load().unwrap();
        let mut signed = IdentityRecord::new("Signer", "s@x");
        signed
            .extra
            .insert("signingkey".to_string(), vec!["KEY".to_string()]);
        registry.contexts.insert("signed".to_string(), signed);
        store.save(&registry).unwrap();
        store.create("plain", "Plain", "p@x").unwrap();

        store.use_context("signed").unwrap();
        assert_eq!(fragment_user(&store).len(), 3);
        store.use_context("plain").unwrap();
        assert_eq!(
            fragment_user(&store),
            vec![
                ("name".to_string(), "Plain".to_string()),
                ("email".to_string(), "p@x".to_string()),
            ]
        );
    }

    #[test]
    fn test_use_missing_leaves_files_unchanged() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        store.use_context("default").unwrap();
        let registry_before = fs::read_to_string(store.registry_path()).unwrap();
        let fragment_before = fs::read_to_string(store.writer().path()).unwrap();

        let err = store.use_context("nope").unwrap_err();
        assert!(matches!(err, GitCtxError::NotFound(_)));
        assert_eq!(
            fs::read_to_string(store.registry_path()).unwrap(),
            registry_before
        );
        assert_eq!(
            fs::read_to_string(store.writer().path()).unwrap(),
            fragment_before
        );
    }

    #[test]
    fn test_use_restores_fragment_when_registry_write_fails() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        store.create("work", "Alice", "alice@example.com").unwrap();
        store.use_context("default").unwrap();
        let fragment_before = fs::read_to_string(store.writer().path()).unwrap();

        // a directory where the temp file should go makes the registry write fail
        let blocker = store.registry_path().with_file_name("config.tmp");
        fs::create_dir(&blocker).unwrap();

        assert!(store.use_context("work").is_err());
        fs::remove_dir(&blocker).unwrap();

        assert_eq!(store.show().unwrap(), "default");
        assert_eq!(
            fs::read_to_string(store.writer().path()).unwrap(),
            fragment_before
        );
    }

    #[test]
    fn test_update_replaces_record() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        store.create("work", "Alice", "alice@example.com").unwrap();
        store.update("work", "Alice B", "alice@new.com").unwrap();

        let registry = store.load().unwrap();
        assert_eq!(
            registry.contexts["work"],
            IdentityRecord::new("Alice B", "alice@new.com")
        );
        // not active, so the fragment was never written
        assert!(!store.writer().path().exists());
    }

    #[test]
    fn test_update_active_refreshes_fragment() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        store.create("work", "Alice", "alice@example.com").unwrap();
        store.use_context("work").unwrap();
        store.update("work", "Alice B", "alice@new.com").unwrap();

        assert_eq!(
            fragment_user(&store),
            vec![
                ("name".to_string(), "Alice B".to_string()),
                ("email".to_string(), "alice@new.com".to_string()),
            ]
        );
    }

    #[test]
    fn test_update_missing_fails() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        let err = store.update("ghost", "a", "b").unwrap_err();
        assert!(matches!(err, GitCtxError::NotFound(_)));
    }

    #[test]
    fn test_delete_default_always_protected() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        assert!(matches!(
            store.delete("default").unwrap_err(),
            GitCtxError::ProtectedContext(_)
        ));

        store.create("work", "Alice", "alice@example.com").unwrap();
        store.use_context("work").unwrap();
        assert!(matches!(
            store.delete("default").unwrap_err(),
            GitCtxError::ProtectedContext(_)
        ));
        assert!(store.list().unwrap().contains(&"default".to_string()));
    }

    #[test]
    fn test_delete_active_reverts_to_default() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        store.create("work", "Alice", "alice@example.com").unwrap();
        store.use_context("work").unwrap();

        store.delete("work").unwrap();
        assert_eq!(store.show().unwrap(), "default");
        assert_eq!(store.list().unwrap(), vec!["default"]);
        assert_eq!(
            fragment_user(&store),
            vec![
                ("name".to_string(), "Default User".to_string()),
                ("email".to_string(), "default@example.com".to_string()),
            ]
        );
    }

    #[test]
    fn test_delete_inactive_preserves_active_and_order() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        store.create("a", "A", "a@x").unwrap();
        store.create("b", "B", "b@x").unwrap();
        store.create("c", "C", "c@x").unwrap();
        store.use_context("c").unwrap();

        store.delete("b").unwrap();
        assert_eq!(store.show().unwrap(), "c");
        assert_eq!(store.list().unwrap(), vec!["default", "a", "c"]);
    }

    #[test]
    fn test_delete_missing_fails() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        assert!(matches!(
            store.delete("ghost").unwrap_err(),
            GitCtxError::NotFound(_)
        ));
    }
}
