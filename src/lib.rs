//! Signed, size-bounded cookies carrying an identity token, a refresh token and a custom token.
//!
//! The three tokens are serialized into an HS256 JWT (`header.payload.signature`) and written
//! either as one cookie or, when they would not fit, as `<name>.0`, `<name>.1`, ... chunks. On
//! the way back in, the envelope is reassembled and verified against every key of a
//! [`RotatingCredential`], newest first, so signing keys can be rotated without logging anybody
//! out.
//!
//! # Layouts
//! The cookie layout ([`CookieLayout::Single`] or [`CookieLayout::Multiple`]) is a contract between
//! writer and reader: nothing on the wire says which one was used. Removal always expires both, so
//! switching layouts between deploys leaves no stale cookies behind.
//!
//! # Failures
//! Reading never returns partial tokens. [`CookieError::is_missing`] tells an unauthenticated
//! request apart from a corrupt or tampered one ([`CookieError::is_corrupt`]).

pub mod builder;
pub mod chunk;
mod config;
mod cookies;
pub mod credential;
mod error;
pub mod format;
pub mod layer;
pub mod parser;
pub mod remover;
mod store;

pub use tower_cookies::cookie::SameSite;

pub use crate::builder::CookieBuilder;
pub use crate::chunk::CookieChunk;
pub use crate::config::{
    CookieLayout, DEFAULT_COOKIE_NAME, DEFAULT_MAX_CHUNK_BYTES, DEFAULT_MAX_CHUNK_COUNT,
    TokenCookieConfig,
};
pub use crate::cookies::TokenCookies;
pub use crate::credential::{RotatingCredential, SigningKey};
pub use crate::error::{CookieError, Result};
pub use crate::format::{TokenCodec, TokenSet};
pub use crate::layer::{AuthSession, TokenCookieLayer};
pub use crate::parser::CookieParser;
pub use crate::remover::CookieRemover;
pub use crate::store::HeaderStore;
