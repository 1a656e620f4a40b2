//! Git config fragment holding the active identity

use std::path::{Path, PathBuf};

use log::debug;

use crate::config::Settings;
use crate::error::Result;
use crate::gitconfig::GitConfigDocument;

use super::models::IdentityFields;

/// Rewrites the fragment file included from ~/.gitconfig
pub struct FragmentWriter {
    path: PathBuf,
}

impl FragmentWriter {
    pub fn new(settings: &Settings) -> Self {
        Self::with_path(settings.fragment_path.clone())
    }

    /// Create a writer for a custom fragment path (for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace `section` with `fields`, one `key = value` line per value.
    /// Any other sections in the file are kept.
    pub fn write(&self, section: &str, fields: &IdentityFields) -> Result<()> {
        let mut doc = GitConfigDocument::load(&self.path)?;
        doc.remove_section(section);
        for (key, values) in fields {
            for value in values {
                doc.add_value(section, key, value);
            }
        }
        debug!(
            "Writing [{}] with {} field(s) to {}",
            section,
            fields.len(),
            self.path.display()
        );
        doc.save(&self.path)
    }

    /// Current entries of `section`
    pub fn read(&self, section: &str) -> Result<Vec<(String, String)>> {
        Ok(GitConfigDocument::load(&self.path)?.entries(section))
    }

    /// Create an empty fragment if none exists yet
    pub fn touch(&self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        GitConfigDocument::default().save(&self.path)
    }
}
