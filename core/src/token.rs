//! Bearer credential storage.
//!
//! The access token may live in the `access_token` cookie (set by the
//! server) or in persistent storage under `token` (set after an API login).
//! The cookie wins when both exist.

use crate::cookie::{get_cookie, Document};
use crate::storage::Storage;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";
pub const TOKEN_KEY: &str = "token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

const EXPIRED: &str = "expires=Thu, 01 Jan 1970 00:00:00 GMT; path=/";

/// Borrowed view over the host's cookie jar and storage.
#[derive(Clone, Copy)]
pub struct TokenStore<'a> {
    document: &'a dyn Document,
    storage: &'a dyn Storage,
}

impl<'a> TokenStore<'a> {
    pub fn new(document: &'a dyn Document, storage: &'a dyn Storage) -> Self {
        Self { document, storage }
    }

    pub fn get_token(&self) -> Option<String> {
        get_cookie(&self.document.cookie(), ACCESS_TOKEN_COOKIE)
            .or_else(|| self.storage.get_item(TOKEN_KEY))
    }

    pub fn set_token(&self, token: &str) {
        self.storage.set_item(TOKEN_KEY, token);
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.storage.get_item(REFRESH_TOKEN_KEY)
    }

    pub fn set_refresh_token(&self, token: &str) {
        self.storage.set_item(REFRESH_TOKEN_KEY, token);
    }

    /// Drop the stored access token and expire both auth cookies.
    pub fn clear_token(&self) {
        self.storage.remove_item(TOKEN_KEY);
        for name in [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE] {
            self.document.set_cookie(&format!("{name}=; {EXPIRED}"));
        }
    }

    /// `clear_token` plus the stored refresh token.
    pub fn clear_all(&self) {
        self.clear_token();
        self.storage.remove_item(REFRESH_TOKEN_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookie::MemoryDocument;
    use crate::storage::MemoryStorage;

    #[test]
    fn set_then_get_without_cookie() {
        let (doc, storage) = (MemoryDocument::new(), MemoryStorage::new());
        let tokens = TokenStore::new(&doc, &storage);
        assert_eq!(tokens.get_token(), None);
        tokens.set_token("x");
        assert_eq!(tokens.get_token().as_deref(), Some("x"));
    }

    #[test]
    fn cookie_takes_precedence() {
        let doc = MemoryDocument::with_cookies("access_token=from-cookie");
        let storage = MemoryStorage::new();
        let tokens = TokenStore::new(&doc, &storage);
        tokens.set_token("from-storage");
        assert_eq!(tokens.get_token().as_deref(), Some("from-cookie"));
    }

    #[test]
    fn clear_removes_storage_and_cookies() {
        let doc = MemoryDocument::with_cookies("access_token=a; refresh_token=r; csrftoken=c");
        let storage = MemoryStorage::new();
        let tokens = TokenStore::new(&doc, &storage);
        tokens.set_token("x");
        tokens.set_refresh_token("y");

        tokens.clear_token();
        assert_eq!(tokens.get_token(), None);
        assert_eq!(doc.cookie(), "csrftoken=c");
        assert_eq!(tokens.refresh_token().as_deref(), Some("y"));

        tokens.clear_all();
        assert_eq!(tokens.refresh_token(), None);
    }
}
