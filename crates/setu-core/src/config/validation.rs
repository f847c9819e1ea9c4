//! Configuration checks that collect every problem before reporting
//!
//! A misconfigured deployment usually has more than one thing wrong (a
//! missing API secret and a bad vault key, say). [`ConfigValidator`] records
//! each failed rule under its dotted path and folds them into one
//! [`SetuError::Config`] at the end.

use crate::errors::SetuError;
use std::fmt;

/// One failed rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssue {
    /// Absent or blank
    Missing {
        /// Dotted path, e.g. `durable_object.bucket`
        path: String,
    },
    /// Number outside `min..=max`
    OutOfRange {
        /// Dotted path
        path: String,
        /// Lowest accepted value
        min: u64,
        /// Highest accepted value
        max: u64,
        /// What the file said
        got: u64,
    },
    /// Not an http(s) URL
    NotAUrl {
        /// Dotted path
        path: String,
    },
    /// Section-specific rule
    Rule {
        /// Dotted path
        path: String,
        /// The rule that failed
        message: String,
    },
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { path } => write!(f, "{path} must be set"),
            Self::OutOfRange {
                path,
                min,
                max,
                got,
            } => write!(f, "{path} = {got} is outside {min}..={max}"),
            Self::NotAUrl { path } => write!(f, "{path} must start with http:// or https://"),
            Self::Rule { path, message } => write!(f, "{path}: {message}"),
        }
    }
}

impl std::error::Error for ConfigIssue {}

/// Accumulates issues across configuration sections
#[derive(Debug, Default)]
pub struct ConfigValidator {
    prefix: String,
    issues: Vec<ConfigIssue>,
}

impl ConfigValidator {
    /// Validator for the top level
    pub fn new() -> Self {
        Self::default()
    }

    /// Validator whose paths are nested under `name`
    pub fn section(&self, name: &str) -> Self {
        Self {
            prefix: self.path(name),
            issues: Vec::new(),
        }
    }

    /// `value` must be present and non-blank
    pub fn required(&mut self, key: &str, value: Option<&str>) -> &mut Self {
        if value.map_or(true, |v| v.trim().is_empty()) {
            let path = self.path(key);
            self.issues.push(ConfigIssue::Missing { path });
        }
        self
    }

    /// `value` must lie in `min..=max`
    pub fn range(&mut self, key: &str, value: u64, min: u64, max: u64) -> &mut Self {
        if !(min..=max).contains(&value) {
            let path = self.path(key);
            self.issues.push(ConfigIssue::OutOfRange {
                path,
                min,
                max,
                got: value,
            });
        }
        self
    }

    /// `value` must be an http(s) URL
    pub fn url(&mut self, key: &str, value: &str) -> &mut Self {
        if !(value.starts_with("http://") || value.starts_with("https://")) {
            let path = self.path(key);
            self.issues.push(ConfigIssue::NotAUrl { path });
        }
        self
    }

    /// Record `message` unless `holds`
    pub fn custom(&mut self, key: &str, holds: bool, message: &str) -> &mut Self {
        if !holds {
            let path = self.path(key);
            self.issues.push(ConfigIssue::Rule {
                path,
                message: message.to_string(),
            });
        }
        self
    }

    /// Take over the issues of a section validator
    pub fn absorb(&mut self, section: ConfigValidator) {
        self.issues.extend(section.issues);
    }

    /// Issues recorded so far
    pub fn issues(&self) -> &[ConfigIssue] {
        &self.issues
    }

    /// `Ok` when nothing was recorded, otherwise one config error listing all issues
    pub fn finish(self) -> Result<(), SetuError> {
        if self.issues.is_empty() {
            return Ok(());
        }
        let joined = self
            .issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(SetuError::config(joined))
    }

    fn path(&self, key: &str) -> String {
        match self.prefix.as_str() {
            "" => key.to_string(),
            prefix => format!("{prefix}.{key}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_paths_are_dotted() {
        let root = ConfigValidator::new();
        let mut durable = root.section("durable_object");
        durable
            .required("bucket", None)
            .range("timeout_ms", 0, 1, 10);

        assert_eq!(
            durable.issues(),
            &[
                ConfigIssue::Missing {
                    path: "durable_object.bucket".into()
                },
                ConfigIssue::OutOfRange {
                    path: "durable_object.timeout_ms".into(),
                    min: 1,
                    max: 10,
                    got: 0
                },
            ]
        );
    }

    #[test]
    fn test_finish_lists_every_issue() {
        let mut v = ConfigValidator::new();
        v.url("gateway_url", "ftp://x").required("api_key", Some("  "));
        let msg = v.finish().unwrap_err().to_string();
        assert!(msg.contains("gateway_url"));
        assert!(msg.contains("api_key"));
    }

    #[test]
    fn test_absorbed_sections_fail_the_root() {
        let mut root = ConfigValidator::new();
        let mut vault = root.section("local_vault");
        vault.custom("key_hex", false, "must be 64 hex characters");
        root.absorb(vault);
        assert_eq!(root.issues().len(), 1);
        assert!(root.finish().is_err());

        let mut clean = ConfigValidator::new();
        clean
            .url("u", "https://gateway.example")
            .required("k", Some("value"))
            .custom("c", true, "never");
        assert!(clean.finish().is_ok());
    }
}
