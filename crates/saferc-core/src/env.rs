//! Environment access
//!
//! Everything that reads or exports environment variables goes through
//! [`Environment`], so the process-wide table is only touched by the binary.

use std::collections::{BTreeMap, BTreeSet};

/// A key-value view of an environment
pub trait Environment {
    /// Look up a variable. Unset and non-unicode values are both `None`.
    fn get(&self, key: &str) -> Option<String>;

    /// Export a variable
    fn set(&mut self, key: &str, value: &str);

    /// Remove a variable
    fn remove(&mut self, key: &str);

    /// Look up a variable, treating an empty value as unset
    fn get_non_empty(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.is_empty())
    }
}

/// The real process environment
///
/// Changes are visible to this process and to any child spawned afterwards.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn set(&mut self, key: &str, value: &str) {
        std::env::set_var(key, value);
    }

    fn remove(&mut self, key: &str) {
        std::env::remove_var(key);
    }
}

/// An in-memory environment that remembers what was exported into it
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryEnv {
    vars: BTreeMap<String, String>,
    exported: BTreeSet<String>,
}

impl MemoryEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from the current process environment
    ///
    /// Seeded entries are not counted as exported.
    pub fn from_process() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Seed from arbitrary pairs
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            exported: BTreeSet::new(),
        }
    }

    /// Builder-style `set` for test setup
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }

    /// Entries written through [`Environment::set`], in key order
    pub fn exported(&self) -> impl Iterator<Item = (&str, &str)> {
        self.exported
            .iter()
            .filter_map(|k| self.vars.get_key_value(k))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// All entries, in key order
    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }
}

impl Environment for MemoryEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
        self.exported.insert(key.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.vars.remove(key);
        self.exported.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_env_tracks_exports() {
        let mut env = MemoryEnv::from_vars([("PATH", "/usr/bin")]);
        env.set("VAULT_ADDR", "https://vault.example");

        assert_eq!(env.get("PATH").as_deref(), Some("/usr/bin"));
        let exported: Vec<_> = env.exported().collect();
        assert_eq!(exported, vec![("VAULT_ADDR", "https://vault.example")]);
    }

    #[test]
    fn test_memory_env_remove() {
        let mut env = MemoryEnv::new();
        env.set("VAULT_TOKEN", "s.abc");
        env.remove("VAULT_TOKEN");

        assert_eq!(env.get("VAULT_TOKEN"), None);
        assert_eq!(env.exported().count(), 0);
    }

    #[test]
    fn test_get_non_empty() {
        let env = MemoryEnv::new().with("VAULT_TOKEN", "");
        assert_eq!(env.get("VAULT_TOKEN").as_deref(), Some(""));
        assert_eq!(env.get_non_empty("VAULT_TOKEN"), None);
    }
}
