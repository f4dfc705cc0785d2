#![allow(dead_code)]

// Shared helpers for integration tests.
//
// These helpers intentionally use `tower_cookies::Cookie` parsing/encoding to match what the
// middleware emits in `Set-Cookie` and what browsers send back in `Cookie`.
use std::convert::Infallible;

use axum::body::Body;
use http::{HeaderMap, Request, Response, header};
use http_body_util::BodyExt as _;
use time::OffsetDateTime;
use tower_cookies::Cookie;
use tower_token_cookies::{
    AuthSession, CookieLayout, RotatingCredential, TokenCookieConfig, TokenCookieLayer, TokenSet,
};

pub fn tokens() -> TokenSet {
    TokenSet::new("A", "B", "C")
}

pub fn credential(secrets: &[&str]) -> RotatingCredential {
    RotatingCredential::from_secrets(secrets).expect("credential builds successfully")
}

pub fn multiple(max_chunk_bytes: usize) -> TokenCookieConfig {
    TokenCookieConfig::default()
        .with_layout(CookieLayout::Multiple)
        .with_max_chunk_bytes(max_chunk_bytes)
}

pub async fn body_string(body: Body) -> String {
    // Collect an Axum body into a UTF-8 string for assertions.
    let bytes = body
        .collect()
        .await
        .expect("body collects successfully")
        .to_bytes();
    String::from_utf8_lossy(&bytes).into_owned()
}

pub async fn login_handler(req: Request<Body>) -> Result<Response<Body>, Infallible> {
    // Store the fixed token set in the session.
    let session = req
        .extensions()
        .get::<AuthSession>()
        .cloned()
        .expect("request includes AuthSession extension");

    session.set_tokens(tokens());

    Ok(Response::new(Body::empty()))
}

pub async fn noop_handler(_: Request<Body>) -> Result<Response<Body>, Infallible> {
    // Handler that does not access the session at all.
    Ok(Response::new(Body::empty()))
}

pub fn make_layer(config: TokenCookieConfig) -> TokenCookieLayer {
    TokenCookieLayer::new(credential(&["k1"])).with_config(config)
}

pub fn set_cookies(headers: &HeaderMap) -> Vec<Cookie<'static>> {
    // Parse every `Set-Cookie` header into a `Cookie` structure.
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| {
            let value = value.to_str().expect("set-cookie header is valid utf-8");
            Cookie::parse_encoded(value)
                .expect("set-cookie parses successfully")
                .into_owned()
        })
        .collect()
}

pub fn is_expired(cookie: &Cookie<'_>) -> bool {
    cookie.expires_datetime() == Some(OffsetDateTime::UNIX_EPOCH)
}

pub fn cookie_header_value(cookies: &[Cookie<'_>]) -> String {
    // What a browser would send back: every cookie that was not expired on arrival.
    cookies
        .iter()
        .filter(|cookie| !is_expired(cookie))
        .map(|cookie| format!("{}={}", cookie.name(), cookie.value()))
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn pairs(cookies: &[Cookie<'_>]) -> Vec<(String, String)> {
    cookies
        .iter()
        .filter(|cookie| !is_expired(cookie))
        .map(|cookie| (cookie.name().to_string(), cookie.value().to_string()))
        .collect()
}
