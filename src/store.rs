use http::{HeaderMap, header::COOKIE};
use tower_cookies::{Cookie, Cookies, cookie::CookieJar};

/// The request/response cookies this crate reads from and writes to.
///
/// Reads see the cookies sent by the client; writes become `Set-Cookie` headers. The attributes
/// on an appended cookie (path, expiry, ...) are emitted as given.
pub trait HeaderStore {
    fn get(&self, name: &str) -> Option<String>;
    fn get_all(&self) -> Vec<(String, String)>;
    fn append(&mut self, cookie: Cookie<'static>);
}

/// Every `name=value` pair in the request's `Cookie` headers, in order, duplicates included.
///
/// A jar keeps one cookie per name, which would hide a repeated chunk. Unparseable pairs are
/// skipped.
pub(crate) fn request_cookies(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse_encoded)
        .filter_map(|cookie| cookie.ok())
        .map(|cookie| (cookie.name().to_string(), cookie.value().to_string()))
        .collect()
}

// Reads see one cookie per name; see `request_cookies` for the raw list.
impl HeaderStore for Cookies {
    fn get(&self, name: &str) -> Option<String> {
        Cookies::get(self, name).map(|cookie| cookie.value().to_string())
    }

    fn get_all(&self) -> Vec<(String, String)> {
        self.list()
            .into_iter()
            .map(|cookie| (cookie.name().to_string(), cookie.value().to_string()))
            .collect()
    }

    fn append(&mut self, cookie: Cookie<'static>) {
        self.add(cookie);
    }
}

impl HeaderStore for CookieJar {
    fn get(&self, name: &str) -> Option<String> {
        CookieJar::get(self, name).map(|cookie| cookie.value().to_string())
    }

    fn get_all(&self) -> Vec<(String, String)> {
        self.iter()
            .map(|cookie| (cookie.name().to_string(), cookie.value().to_string()))
            .collect()
    }

    fn append(&mut self, cookie: Cookie<'static>) {
        self.add(cookie);
    }
}
