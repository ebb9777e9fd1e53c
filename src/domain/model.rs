use std::fmt;

use chrono::NaiveDateTime;

/// A file-type identifier such as `PSD` or `PNG`, always upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Format(String);

impl Format {
    /// Returns `None` for blank identifiers.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_uppercase()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the backend told us about a link: the formats it can deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    pub title: String,
    pub thumbnail: Option<String>,
    formats: Vec<Format>,
}

impl ResolvedFile {
    /// Builds a resolved file from raw format names, dropping blanks and
    /// duplicates. Returns `None` when no usable format remains.
    pub fn new<I, S>(title: String, thumbnail: Option<String>, formats: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<Format> = Vec::new();
        for format in formats.into_iter().filter_map(|f| Format::new(f.as_ref())) {
            if !unique.contains(&format) {
                unique.push(format);
            }
        }

        if unique.is_empty() {
            return None;
        }

        Some(Self {
            title,
            thumbnail,
            formats: unique,
        })
    }

    pub fn formats(&self) -> &[Format] {
        &self.formats
    }

    pub fn offers(&self, format: &Format) -> bool {
        self.formats.contains(format)
    }
}

/// One entry of the server-side download history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRecord {
    pub id: String,
    pub title: String,
    pub url: String,
    pub format: String,
    pub downloaded_at: Option<NaiveDateTime>,
    pub thumbnail: Option<String>,
}

/// Backend acknowledgement of a committed download.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DownloadAck {
    pub message: Option<String>,
}
