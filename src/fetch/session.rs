use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{Context, Result};

/// Browser storage-state export holding the cookies of a signed-in session.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub cookies: Vec<SessionCookie>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: String,
    /// Unix seconds; `-1` or absent marks a session cookie.
    #[serde(default)]
    pub expires: Option<f64>,
}

impl SessionState {
    /// Read the session artifact. A missing file is not an error: it means no session exists.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(anyhow::Error::new(err)
                    .context(format!("Failed to read session file {}", path.display()))
                    .into());
            }
        };

        let state: SessionState = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse session file {}", path.display()))?;
        Ok(Some(state))
    }

    /// Build a `Cookie` header value for `host`, skipping cookies that have expired by `now`.
    pub fn cookie_header(&self, host: &str, now: DateTime<Utc>) -> Option<String> {
        let now_secs = now.timestamp() as f64;
        let pairs: Vec<String> = self
            .cookies
            .iter()
            .filter(|cookie| domain_matches(host, &cookie.domain))
            .filter(|cookie| match cookie.expires {
                Some(expires) if expires > 0.0 => expires > now_secs,
                _ => true,
            })
            .map(|cookie| format!("{}={}", cookie.name, cookie.value))
            .collect();

        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }
}

fn domain_matches(host: &str, domain: &str) -> bool {
    let domain = domain.trim_start_matches('.');
    if domain.is_empty() {
        return true;
    }
    host == domain || host.ends_with(&format!(".{domain}"))
}
