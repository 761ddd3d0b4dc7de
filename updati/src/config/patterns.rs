//! Repository name filtering.

use super::ConfigError;
use regex::Regex;

/// Matches repository names against a set of regular expressions.
///
/// An empty filter matches every repository.
#[derive(Debug, Clone, Default)]
pub struct RepoFilter {
    patterns: Vec<Regex>,
}

impl RepoFilter {
    /// Compiles `patterns`, skipping blank entries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] for the first pattern that fails to compile.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|p| p.as_ref().trim())
            .filter(|p| !p.is_empty())
            .map(|p| {
                Regex::new(p).map_err(|source| ConfigError::InvalidPattern {
                    pattern: p.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    /// Returns true if `name` matches any pattern, or if there are none.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.patterns.is_empty() || self.patterns.iter().any(|p| p.is_match(name))
    }
}

/// Splits a list given as one string on newlines and commas.
pub(crate) fn split_list(value: &str) -> Vec<String> {
    value
        .split(['\n', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
