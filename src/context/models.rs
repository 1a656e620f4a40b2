//! Registry data models

use indexmap::IndexMap;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::config::{defaults, git};

/// Git view of an identity: field name -> ordered values
pub type IdentityFields = IndexMap<String, Vec<String>>;

/// Top-level registry persisted as JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    /// Name of the context mirrored into the fragment
    #[serde(default)]
    pub active_context: String,
    /// Context name to identity, in insertion order
    #[serde(default)]
    pub contexts: IndexMap<String, IdentityRecord>,
}

impl Registry {
    /// Registry holding only the active "default" context
    pub fn with_default(record: IdentityRecord) -> Self {
        let mut contexts = IndexMap::new();
        contexts.insert(defaults::CONTEXT.to_string(), record);
        Self {
            active_context: defaults::CONTEXT.to_string(),
            contexts,
        }
    }

    /// Identity of the active context
    pub fn active_record(&self) -> Option<&IdentityRecord> {
        self.contexts.get(&self.active_context)
    }

    /// Context names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.contexts.keys().map(String::as_str)
    }

    /// Restore the "default exists" and "active is registered" invariants
    /// on a hand-edited registry. Returns true if anything changed.
    pub fn repair(&mut self) -> bool {
        let mut changed = false;
        if !self.contexts.contains_key(defaults::CONTEXT) {
            warn!("Registry has no '{}' context, adding an empty one", defaults::CONTEXT);
            self.contexts
                .insert(defaults::CONTEXT.to_string(), IdentityRecord::default());
            changed = true;
        }
        if !self.contexts.contains_key(&self.active_context) {
            warn!(
                "Active context '{}' is not registered, falling back to '{}'",
                self.active_context,
                defaults::CONTEXT
            );
            self.active_context = defaults::CONTEXT.to_string();
            changed = true;
        }
        changed
    }
}

/// Identity stored for one context
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// git user.name
    #[serde(default)]
    pub user_name: String,
    /// git user.email
    #[serde(default)]
    pub user_email: String,
    /// Any other user.* keys (signingkey, ...)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub extra: IdentityFields,
}

impl IdentityRecord {
    pub fn new(user_name: impl Into<String>, user_email: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            user_email: user_email.into(),
            extra: IndexMap::new(),
        }
    }

    /// Build a record from the entries of a git `[user]` section.
    ///
    /// git treats name/email as single-valued with the last one winning.
    pub fn from_entries(entries: &[(String, String)]) -> Self {
        let mut record = Self::default();
        for (key, value) in entries {
            match key.as_str() {
                git::NAME_KEY => record.user_name = value.clone(),
                git::EMAIL_KEY => record.user_email = value.clone(),
                _ => record
                    .extra
                    .entry(key.clone())
                    .or_default()
                    .push(value.clone()),
            }
        }
        record
    }

    /// Fields to write into the `[user]` section; empty values are left out
    pub fn fields(&self) -> IdentityFields {
        let mut fields = IdentityFields::new();
        if !self.user_name.is_empty() {
            fields.insert(git::NAME_KEY.to_string(), vec![self.user_name.clone()]);
        }
        if !self.user_email.is_empty() {
            fields.insert(git::EMAIL_KEY.to_string(), vec![self.user_email.clone()]);
        }
        for (key, values) in &self.extra {
            let values: Vec<String> = values.iter().filter(|v| !v.is_empty()).cloned().collect();
            if !values.is_empty() {
                fields.insert(key.clone(), values);
            }
        }
        fields
    }

    /// True when nothing would be written to git
    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }
}
