use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::LinkError;

static HOST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"freepik\.com|flaticon\.com").expect("valid regex"));

/// Whether `input` mentions one of the supported source hosts.
pub fn is_supported_link(input: &str) -> bool {
    HOST_RE.is_match(input)
}

/// A trimmed link that passed [`SourceLink::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLink(String);

impl SourceLink {
    pub fn parse(input: &str) -> Result<Self, LinkError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(LinkError::Empty);
        }
        if !is_supported_link(trimmed) {
            return Err(LinkError::Unrecognized);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
