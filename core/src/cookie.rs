//! Cookie string parsing and the host cookie jar.
//!
//! `Document` models the two halves of `document.cookie`: reading returns
//! every visible cookie as `a=1; b=2`, writing stores exactly one cookie
//! described by a `Set-Cookie`-style string.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};

/// Return the percent-decoded value of the first cookie named `name`.
///
/// Pairs are separated by `;` and trimmed; the name must match exactly. A
/// value that does not decode is returned raw.
pub fn get_cookie(cookies: &str, name: &str) -> Option<String> {
    if cookies.is_empty() || name.is_empty() {
        return None;
    }
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(name)?.strip_prefix('='))
        .map(|raw| match urlencoding::decode(raw) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => raw.to_string(),
        })
}

/// Host cookie jar.
pub trait Document: Send + Sync {
    /// All cookies visible to the page, `name=value` joined by `"; "`.
    fn cookie(&self) -> String;

    /// Store one cookie from a `name=value; attr=...` string. A non-positive
    /// `max-age`, or with no `max-age` an `expires` in the past, deletes the
    /// cookie instead.
    fn set_cookie(&self, cookie: &str);
}

/// In-process `Document` for hosts without a real cookie jar, and for tests.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    cookies: Mutex<Vec<(String, String)>>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a `document.cookie`-style string such as `a=1; b=2`.
    pub fn with_cookies(cookies: &str) -> Self {
        let document = Self::new();
        for pair in cookies.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            document.set_cookie(pair);
        }
        document
    }
}

impl Document for MemoryDocument {
    fn cookie(&self) -> String {
        let cookies = self.cookies.lock().unwrap_or_else(PoisonError::into_inner);
        cookies
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn set_cookie(&self, cookie: &str) {
        let mut parts = cookie.split(';').map(str::trim);
        let Some((name, value)) = parts.next().and_then(|p| p.split_once('=')) else {
            return;
        };
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        let expired = is_expired(parts);

        let mut cookies = self.cookies.lock().unwrap_or_else(PoisonError::into_inner);
        let existing = cookies.iter().position(|(k, _)| k == name);
        match (existing, expired) {
            (Some(i), true) => {
                cookies.remove(i);
            }
            (Some(i), false) => cookies[i].1 = value.to_string(),
            (None, false) => cookies.push((name.to_string(), value.to_string())),
            (None, true) => {}
        }
    }
}

/// `Max-Age` wins over `Expires` when both are present.
fn is_expired<'a>(attrs: impl Iterator<Item = &'a str>) -> bool {
    let mut max_age = None;
    let mut expires = None;
    for attr in attrs {
        let Some((key, value)) = attr.split_once('=') else {
            continue;
        };
        let value = value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "max-age" => max_age = value.parse::<i64>().ok(),
            "expires" => expires = DateTime::parse_from_rfc2822(value).ok(),
            _ => {}
        }
    }
    match (max_age, expires) {
        (Some(secs), _) => secs <= 0,
        (None, Some(at)) => at.with_timezone(&Utc) <= Utc::now(),
        (None, None) => false,
    }
}
