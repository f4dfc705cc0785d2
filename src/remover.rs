//! Cookies that erase a session.
//!
//! Every cookie produced here has an empty value, keeps the configured path and domain so the
//! browser matches it to the original, drops `Max-Age`, and expires at the Unix epoch.

use tower_cookies::Cookie;

use crate::{chunk, config::TokenCookieConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieRemover {
    /// Only the bare `<name>` cookie.
    Single,
    /// `<name>.0 .. <name>.<max_chunk_count - 1>`; the chunk count used when writing is not
    /// known at removal time, so the whole configured range is expired.
    Multiple,
    /// Both of the above, so that a layout change between deploys leaves nothing behind.
    Combined,
}

impl CookieRemover {
    pub fn expire_cookies(&self, config: &TokenCookieConfig) -> Vec<Cookie<'static>> {
        match self {
            Self::Single => vec![config.removal_cookie(config.name().to_string())],
            Self::Multiple => expire_slots(config, 0),
            Self::Combined => {
                let mut cookies = Self::Single.expire_cookies(config);
                cookies.extend(Self::Multiple.expire_cookies(config));
                cookies
            }
        }
    }
}

/// Removal cookies for the chunk slots `from .. max_chunk_count`.
pub(crate) fn expire_slots(config: &TokenCookieConfig, from: usize) -> Vec<Cookie<'static>> {
    (from..config.max_chunk_count())
        .map(|ordinal| config.removal_cookie(chunk::chunk_name(config.name(), ordinal)))
        .collect()
}
