use std::borrow::Cow;

use time::{Duration, OffsetDateTime};
use tower_cookies::Cookie;

use crate::SameSite;

pub const DEFAULT_COOKIE_NAME: &str = "AuthToken";

/// Largest value written to one cookie in the multiple layout, leaving room for the name and
/// attributes under the usual 4096 byte browser limit.
pub const DEFAULT_MAX_CHUNK_BYTES: usize = 3800;

/// Number of `<name>.<n>` slots expired on removal.
pub const DEFAULT_MAX_CHUNK_COUNT: usize = 8;

/// How the envelope is laid out across cookies.
///
/// Not detectable from the cookies themselves: writer and reader must agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CookieLayout {
    /// One cookie named exactly the configured name.
    #[default]
    Single,
    /// `<name>.0`, `<name>.1`, ... each holding at most `max_chunk_bytes`.
    Multiple,
}

#[derive(Debug, Clone)]
pub struct TokenCookieConfig {
    pub(crate) name: Cow<'static, str>,
    pub(crate) layout: CookieLayout,
    pub(crate) max_chunk_bytes: usize,
    pub(crate) max_chunk_count: usize,
    pub(crate) http_only: bool,
    pub(crate) same_site: SameSite,
    pub(crate) secure: bool,
    pub(crate) path: Cow<'static, str>,
    pub(crate) domain: Option<Cow<'static, str>>,
    pub(crate) max_age: Option<Duration>,
    pub(crate) clear_on_decode_error: bool,
}

impl Default for TokenCookieConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_COOKIE_NAME.into(),
            layout: CookieLayout::Single,
            max_chunk_bytes: DEFAULT_MAX_CHUNK_BYTES,
            max_chunk_count: DEFAULT_MAX_CHUNK_COUNT,
            http_only: true,
            same_site: SameSite::Lax,
            secure: true,
            path: "/".into(),
            domain: None,
            max_age: None,
            clear_on_decode_error: true,
        }
    }
}

impl TokenCookieConfig {
    #[must_use]
    pub fn with_name<N: Into<Cow<'static, str>>>(mut self, name: N) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: CookieLayout) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_max_chunk_bytes(mut self, max_chunk_bytes: usize) -> Self {
        self.max_chunk_bytes = max_chunk_bytes.max(1);
        self
    }

    #[must_use]
    pub fn with_max_chunk_count(mut self, max_chunk_count: usize) -> Self {
        self.max_chunk_count = max_chunk_count;
        self
    }

    #[must_use]
    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    #[must_use]
    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }

    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    #[must_use]
    pub fn with_path<P: Into<Cow<'static, str>>>(mut self, path: P) -> Self {
        self.path = path.into();
        self
    }

    #[must_use]
    pub fn with_domain<D: Into<Cow<'static, str>>>(mut self, domain: D) -> Self {
        self.domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn without_domain(mut self) -> Self {
        self.domain = None;
        self
    }

    #[must_use]
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    #[must_use]
    pub fn without_max_age(mut self) -> Self {
        self.max_age = None;
        self
    }

    #[must_use]
    pub fn with_clear_on_decode_error(mut self, clear_on_decode_error: bool) -> Self {
        self.clear_on_decode_error = clear_on_decode_error;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layout(&self) -> CookieLayout {
        self.layout
    }

    pub fn max_chunk_bytes(&self) -> usize {
        self.max_chunk_bytes
    }

    pub fn max_chunk_count(&self) -> usize {
        self.max_chunk_count
    }

    pub(crate) fn build_cookie(&self, name: String, value: String) -> Cookie<'static> {
        let mut cookie_builder = self.attributes(Cookie::build((name, value)));
        if let Some(max_age) = self.max_age {
            cookie_builder = cookie_builder.max_age(max_age);
        }

        cookie_builder.build()
    }

    /// An empty cookie expiring at the Unix epoch, never carrying `Max-Age`.
    pub(crate) fn removal_cookie(&self, name: String) -> Cookie<'static> {
        self.attributes(Cookie::build((name, "")))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .build()
    }

    fn attributes(
        &self,
        cookie_builder: tower_cookies::cookie::CookieBuilder<'static>,
    ) -> tower_cookies::cookie::CookieBuilder<'static> {
        let mut cookie_builder = cookie_builder
            .http_only(self.http_only)
            .same_site(self.same_site)
            .secure(self.secure)
            .path(self.path.clone());

        if let Some(domain) = self.domain.clone() {
            cookie_builder = cookie_builder.domain(domain);
        }

        cookie_builder
    }
}
