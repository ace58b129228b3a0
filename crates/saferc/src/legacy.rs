//! Old-style config migration
//!
//! Before targets had their own records, `~/.saferc` kept one current target
//! plus three loose maps:
//!
//! ```yaml
//! Current: prod
//! Aliases:
//!   prod: https://vault.example
//! Targets:
//!   https://vault.example: s.token
//! SkipVerify:
//!   https://vault.example: true
//! ```
//!
//! Tokens and skip-verify flags are keyed by URL, not alias.

use crate::config::{Config, Vault, CONFIG_VERSION};
use serde::de::{Deserializer, Error as _};
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::{BTreeMap, HashMap};

/// The old single-current-target document
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct LegacyConfig {
    #[serde(rename = "Current", default)]
    pub current: String,

    /// URL -> token (null when no token was ever stored)
    #[serde(rename = "Targets", default, deserialize_with = "deserialize_tokens")]
    pub tokens: HashMap<String, Option<String>>,

    /// alias -> URL
    #[serde(rename = "Aliases", default)]
    pub aliases: BTreeMap<String, String>,

    /// URL -> skip TLS verification
    #[serde(rename = "SkipVerify", default)]
    pub skip_verify: HashMap<String, bool>,
}

impl LegacyConfig {
    /// Parse an old-style document
    pub fn parse(content: &str) -> serde_yaml::Result<Self> {
        serde_yaml::from_str(content)
    }

    /// Build the current document shape, one target per alias
    pub fn convert(&self) -> Config {
        let vaults = self
            .aliases
            .iter()
            .map(|(alias, url)| {
                let vault = Vault {
                    url: url.clone(),
                    token: self.tokens.get(url).cloned().flatten().unwrap_or_default(),
                    skip_verify: self.skip_verify.get(url).copied().unwrap_or(false),
                };
                (alias.clone(), vault)
            })
            .collect();

        Config {
            version: CONFIG_VERSION,
            current: self.current.clone(),
            vaults,
        }
    }
}

/// Token values must be strings or null; anything else is a decode error
fn deserialize_tokens<'de, D>(deserializer: D) -> Result<HashMap<String, Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<HashMap<String, Value>> = Option::deserialize(deserializer)?;

    raw.unwrap_or_default()
        .into_iter()
        .map(|(url, value)| match value {
            Value::Null => Ok((url, None)),
            Value::String(token) => Ok((url, Some(token))),
            other => Err(D::Error::custom(format!(
                "token for '{}' must be a string, found {}",
                url,
                value_kind(&other)
            ))),
        })
        .collect()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
