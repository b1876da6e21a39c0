//! Byte sources for the master payload and the candidate feed.
//!
//! The core never cares where bytes come from; it asks a [`PayloadSource`] to
//! open a reader and maps transport failures onto its own error taxonomy.

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use std::fmt;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const JSON_ACCEPT: &str = "application/json";
pub const CSV_ACCEPT: &str = "text/csv, text/plain;q=0.9, */*;q=0.5";

#[derive(Debug)]
pub enum SourceError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Read(std::io::Error),
    Csv(csv::Error),
    Http {
        url: String,
        source: reqwest::Error,
    },
    Status {
        url: String,
        status: u16,
    },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Io { path, source } => {
                write!(f, "unable to open {}: {}", path.display(), source)
            }
            SourceError::Read(err) => write!(f, "read failed: {}", err),
            SourceError::Csv(err) => write!(f, "unreadable row: {}", err),
            SourceError::Http { url, source } => write!(f, "request to {} failed: {}", url, source),
            SourceError::Status { url, status } => {
                write!(f, "request to {} returned HTTP {}", url, status)
            }
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Io { source, .. } => Some(source),
            SourceError::Read(err) => Some(err),
            SourceError::Csv(err) => Some(err),
            SourceError::Http { source, .. } => Some(source),
            SourceError::Status { .. } => None,
        }
    }
}

/// Anything that can hand the core a fresh byte stream.
pub trait PayloadSource {
    /// Human-readable origin used in logs and error messages.
    fn location(&self) -> &str;

    fn open(&self) -> Result<Box<dyn Read>, SourceError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Url(String),
    File(PathBuf),
}

impl SourceLocation {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::File(PathBuf::from(trimmed))
        }
    }
}

/// Builds the right source for `raw`: HTTP(S) URLs go through reqwest, anything else is a path.
pub fn open_source(
    raw: &str,
    accept: &'static str,
    timeout: Duration,
) -> Result<Box<dyn PayloadSource>, SourceError> {
    match SourceLocation::parse(raw) {
        SourceLocation::Url(url) => Ok(Box::new(HttpSource::new(url, accept, timeout)?)),
        SourceLocation::File(path) => Ok(Box::new(FileSource::new(path))),
    }
}

pub struct HttpSource {
    url: String,
    accept: &'static str,
    client: Client,
}

impl HttpSource {
    pub fn new(
        url: impl Into<String>,
        accept: &'static str,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let url = url.into();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| SourceError::Http {
                url: url.clone(),
                source,
            })?;

        Ok(Self {
            url,
            accept,
            client,
        })
    }
}

impl PayloadSource for HttpSource {
    fn location(&self) -> &str {
        &self.url
    }

    fn open(&self) -> Result<Box<dyn Read>, SourceError> {
        debug!(url = %self.url, "requesting payload");
        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, self.accept)
            .send()
            .map_err(|source| SourceError::Http {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        Ok(Box::new(response))
    }
}

pub struct FileSource {
    path: PathBuf,
    display: String,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let display = path.display().to_string();
        Self { path, display }
    }
}

impl PayloadSource for FileSource {
    fn location(&self) -> &str {
        &self.display
    }

    fn open(&self) -> Result<Box<dyn Read>, SourceError> {
        let file = std::fs::File::open(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(Box::new(std::io::BufReader::new(file)))
    }
}

/// Serves a fixed payload; used by alternate front ends and tests.
#[derive(Debug, Clone)]
pub struct InMemorySource {
    label: String,
    bytes: Vec<u8>,
}

impl InMemorySource {
    pub fn new(label: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            label: label.into(),
            bytes: bytes.into(),
        }
    }
}

impl PayloadSource for InMemorySource {
    fn location(&self) -> &str {
        &self.label
    }

    fn open(&self) -> Result<Box<dyn Read>, SourceError> {
        Ok(Box::new(Cursor::new(self.bytes.clone())))
    }
}
