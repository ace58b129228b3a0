//! Target lookup and selection
//!
//! A target can be named by its alias or by its URL. Aliases win; URLs are
//! compared with one trailing `/` stripped from both sides, and a URL shared
//! by several aliases is ambiguous.

use crate::config::{Config, Vault};
use crate::error::{Error, Result};
use tracing::debug;

impl Config {
    /// Find the alias of the target named by `alias_or_url`
    ///
    /// `Ok(None)` means nothing matched. Two or more URL matches are an
    /// [`Error::Ambiguous`].
    pub fn locate(&self, alias_or_url: &str) -> Result<Option<&str>> {
        if let Some((alias, _)) = self.vaults.get_key_value(alias_or_url) {
            return Ok(Some(alias.as_str()));
        }

        let want = trim_slash(alias_or_url);
        let mut matches = self
            .vaults
            .iter()
            .filter(|(_, v)| trim_slash(&v.url) == want)
            .map(|(alias, _)| alias.as_str());

        match (matches.next(), matches.next()) {
            (None, _) => Ok(None),
            (Some(alias), None) => {
                debug!("'{}' matched target '{}' by url", alias_or_url, alias);
                Ok(Some(alias))
            }
            (Some(_), Some(_)) => Err(Error::Ambiguous(alias_or_url.to_string())),
        }
    }

    /// Find the target named by `alias_or_url`
    pub fn find(&self, alias_or_url: &str) -> Result<Option<&Vault>> {
        Ok(self.locate(alias_or_url)?.and_then(|alias| self.vaults.get(alias)))
    }

    /// Resolve `which`, or the current target when `which` is empty
    ///
    /// No current target is `Ok(None)`; a name that does not resolve is
    /// [`Error::TargetNotFound`].
    pub fn vault(&self, which: &str) -> Result<Option<&Vault>> {
        let which = if which.is_empty() {
            self.current.as_str()
        } else {
            which
        };
        if which.is_empty() {
            return Ok(None);
        }

        match self.find(which)? {
            Some(v) => Ok(Some(v)),
            None => Err(Error::TargetNotFound(which.to_string())),
        }
    }

    /// Make an existing target current, optionally forcing skip-verify on it
    pub fn set_current(&mut self, alias: &str, skip_verify: bool) -> Result<()> {
        let key = self
            .locate(alias)?
            .ok_or_else(|| Error::UnknownTarget(alias.to_string()))?
            .to_string();

        self.current = alias.to_string();
        if skip_verify {
            if let Some(v) = self.vaults.get_mut(&key) {
                v.skip_verify = true;
            }
        }
        Ok(())
    }

    /// Create or replace the target at `alias` and make it current
    ///
    /// Any previously stored token for `alias` is discarded.
    pub fn set_target(&mut self, alias: &str, url: &str, skip_verify: bool) {
        self.vaults.insert(
            alias.to_string(),
            Vault {
                url: url.to_string(),
                token: String::new(),
                skip_verify,
            },
        );
        self.current = alias.to_string();
    }

    /// Store `token` on the current target
    pub fn set_token(&mut self, token: &str) -> Result<()> {
        if self.current.is_empty() {
            return Err(Error::NoTargetSelected);
        }

        let key = match self.locate(&self.current) {
            Ok(Some(alias)) => alias.to_string(),
            _ => return Err(Error::UnknownTarget(self.current.clone())),
        };
        if let Some(v) = self.vaults.get_mut(&key) {
            v.token = token.to_string();
        }
        Ok(())
    }

    /// URL of the current target, or empty
    pub fn url(&self) -> &str {
        match self.vault("") {
            Ok(Some(v)) => &v.url,
            _ => "",
        }
    }

    /// Whether the current target verifies TLS; false when there is none
    pub fn verified(&self) -> bool {
        matches!(self.vault(""), Ok(Some(v)) if !v.skip_verify)
    }
}

fn trim_slash(s: &str) -> &str {
    s.strip_suffix('/').unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(targets: &[(&str, &str)]) -> Config {
        let mut config = Config::default();
        for (alias, url) in targets {
            config.vaults.insert(
                alias.to_string(),
                Vault {
                    url: url.to_string(),
                    token: format!("s.{}", alias),
                    skip_verify: false,
                },
            );
        }
        config
    }

    #[test]
    fn test_find_by_alias() {
        let config = config_with(&[("prod", "https://v.example/")]);
        let v = config.find("prod").unwrap().unwrap();
        assert_eq!(v.token, "s.prod");
    }

    #[test]
    fn test_find_by_url_ignores_trailing_slash() {
        let config = config_with(&[("prod", "https://v.example/")]);

        let v = config.find("https://v.example").unwrap().unwrap();
        assert_eq!(v.token, "s.prod");
        let v = config.find("https://v.example/").unwrap().unwrap();
        assert_eq!(v.token, "s.prod");
    }

    #[test]
    fn test_only_one_slash_is_stripped() {
        let config = config_with(&[("prod", "https://v.example//")]);
        assert!(config.find("https://v.example").unwrap().is_none());
        assert!(config.find("https://v.example/").unwrap().is_none());
        assert!(config.find("https://v.example//").unwrap().is_some());
    }

    #[test]
    fn test_alias_wins_over_url() {
        // "https://a" is both an alias and another target's url
        let config = config_with(&[("https://a", "https://elsewhere"), ("other", "https://a")]);
        let v = config.find("https://a").unwrap().unwrap();
        assert_eq!(v.token, "s.https://a");
    }

    #[test]
    fn test_shared_url_is_ambiguous() {
        let config = config_with(&[("one", "https://v.example/"), ("two", "https://v.example")]);
        let err = config.find("https://v.example").unwrap_err();
        assert!(matches!(err, Error::Ambiguous(ref s) if s == "https://v.example"));

        // aliases still work
        assert!(config.find("two").unwrap().is_some());
    }

    #[test]
    fn test_not_found() {
        let config = config_with(&[("prod", "https://v.example")]);
        assert!(config.find("https://other.example").unwrap().is_none());
        assert!(config.find("stage").unwrap().is_none());
    }

    #[test]
    fn test_vault_without_current() {
        let config = config_with(&[("prod", "https://v.example")]);
        assert!(config.vault("").unwrap().is_none());
    }

    #[test]
    fn test_vault_dangling_current() {
        let mut config = config_with(&[("prod", "https://v.example")]);
        config.current = "gone".into();
        let err = config.vault("").unwrap_err();
        assert!(matches!(err, Error::TargetNotFound(ref a) if a == "gone"));
    }

    #[test]
    fn test_vault_explicit_overrides_current() {
        let mut config = config_with(&[("prod", "https://p"), ("dev", "https://d")]);
        config.current = "prod".into();
        assert_eq!(config.vault("dev").unwrap().unwrap().url, "https://d");
        assert_eq!(config.vault("").unwrap().unwrap().url, "https://p");
    }

    #[test]
    fn test_set_current_unknown_leaves_current() {
        let mut config = config_with(&[("prod", "https://v.example")]);
        config.current = "prod".into();

        let err = config.set_current("missing", false).unwrap_err();
        assert!(matches!(err, Error::UnknownTarget(ref a) if a == "missing"));
        assert_eq!(config.current, "prod");
    }

    #[test]
    fn test_set_current_ambiguous_leaves_current() {
        let mut config = config_with(&[("one", "https://v/"), ("two", "https://v")]);
        assert!(config.set_current("https://v", false).is_err());
        assert_eq!(config.current(), None);
    }

    #[test]
    fn test_set_current_forces_skip_verify() {
        let mut config = config_with(&[("prod", "https://v.example")]);
        config.set_current("prod", true).unwrap();
        assert_eq!(config.current(), Some("prod"));
        assert!(config.vaults["prod"].skip_verify);

        // never turns it back off
        config.set_current("prod", false).unwrap();
        assert!(config.vaults["prod"].skip_verify);
    }

    #[test]
    fn test_set_current_by_url() {
        let mut config = config_with(&[("prod", "https://v.example/")]);
        config.set_current("https://v.example", true).unwrap();
        assert_eq!(config.current(), Some("https://v.example"));
        assert!(config.vaults["prod"].skip_verify);
        assert_eq!(config.url(), "https://v.example/");
    }

    #[test]
    fn test_set_target() {
        let mut config = config_with(&[("stage", "https://old")]);
        config.set_target("stage", "https://stage/", true);

        assert_eq!(config.url(), "https://stage/");
        assert!(!config.verified());
        assert_eq!(config.vaults["stage"].token, "");
    }

    #[test]
    fn test_set_target_allows_duplicate_urls() {
        let mut config = config_with(&[("one", "https://v")]);
        config.set_target("two", "https://v/", false);
        assert_eq!(config.current(), Some("two"));
        assert!(config.find("https://v").is_err());
    }

    #[test]
    fn test_set_token() {
        let mut config = config_with(&[("prod", "https://v")]);
        assert!(matches!(config.set_token("s.x"), Err(Error::NoTargetSelected)));

        config.current = "prod".into();
        config.set_token("s.new").unwrap();
        assert_eq!(config.vaults["prod"].token, "s.new");

        config.current = "gone".into();
        assert!(matches!(config.set_token("s.x"), Err(Error::UnknownTarget(_))));
    }

    #[test]
    fn test_url_and_verified_defaults() {
        let mut config = config_with(&[("prod", "https://v")]);
        assert_eq!(config.url(), "");
        assert!(!config.verified());

        config.current = "gone".into();
        assert_eq!(config.url(), "");
        assert!(!config.verified());

        config.current = "prod".into();
        assert_eq!(config.url(), "https://v");
        assert!(config.verified());
    }
}
