use std::fmt;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SourceLocation – where a table comes from
// ---------------------------------------------------------------------------

/// A table source: a spreadsheet CSV export URL or a local snapshot file.
///
/// Serialized as a plain string; anything starting with `http://` or
/// `https://` is a URL, everything else a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SourceLocation {
    Url(String),
    File(PathBuf),
}

impl From<String> for SourceLocation {
    fn from(s: String) -> Self {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            SourceLocation::Url(trimmed.to_string())
        } else {
            SourceLocation::File(PathBuf::from(trimmed))
        }
    }
}

impl From<&str> for SourceLocation {
    fn from(s: &str) -> Self {
        SourceLocation::from(s.to_string())
    }
}

impl From<SourceLocation> for String {
    fn from(loc: SourceLocation) -> Self {
        loc.to_string()
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocation::Url(u) => write!(f, "{u}"),
            SourceLocation::File(p) => write!(f, "{}", p.display()),
        }
    }
}

// ---------------------------------------------------------------------------
// Retry policy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Zero behaves like one.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles after every failure.
    pub initial_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 500,
        }
    }
}

impl RetryPolicy {
    /// Delay after the `attempt`-th failure (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.initial_backoff_ms.saturating_mul(factor))
    }

    /// Run `op` until it succeeds or the attempts are exhausted, sleeping with
    /// exponential backoff in between. Returns the last error.
    pub fn run<T>(&self, what: &str, mut op: impl FnMut() -> Result<T>) -> Result<T> {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if attempt < attempts => {
                    let delay = self.backoff(attempt);
                    log::warn!("{what}: attempt {attempt}/{attempts} failed: {e:#}; retrying in {delay:?}");
                    thread::sleep(delay);
                }
                Err(e) => {
                    return Err(e.context(format!("{what}: giving up after {attempts} attempt(s)")))
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP fetcher
// ---------------------------------------------------------------------------

/// Blocking HTTP client for spreadsheet CSV exports.
pub struct Fetcher {
    client: Client,
    retry: RetryPolicy,
}

impl Fetcher {
    pub fn new(timeout: Duration, retry: RetryPolicy) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self { client, retry })
    }

    /// GET `url` and return the body, retrying per the policy.
    pub fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.retry.run(url, || self.fetch_once(url))
    }

    fn fetch_once(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self.client.get(url).send().context("sending request")?;
        let status = resp.status();
        if !status.is_success() {
            bail!("HTTP error: {status}");
        }
        let body = resp.bytes().context("reading response body")?.to_vec();
        if looks_like_html(&body) {
            bail!("response is an HTML page, not CSV (is the sheet published?)");
        }
        Ok(body)
    }
}

/// Google serves a login/error page with status 200 for private sheets.
fn looks_like_html(body: &[u8]) -> bool {
    let start = body
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(body.len());
    let head = &body[start..body.len().min(start + 15)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}
