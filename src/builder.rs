use crate::{
    chunk::{self, CookieChunk},
    config::{CookieLayout, TokenCookieConfig},
    error::Result,
    format::{TokenCodec, TokenSet},
};

/// Turns a [`TokenSet`] into the cookies that carry it.
#[derive(Debug, Clone)]
pub enum CookieBuilder {
    /// One cookie named exactly `name`.
    Single { codec: TokenCodec, name: String },
    /// `name.0 .. name.k-1`, each at most `max_chunk_bytes` long.
    Multiple {
        codec: TokenCodec,
        name: String,
        max_chunk_bytes: usize,
        /// Slots covered by removal; exceeding it only warns.
        max_chunk_count: usize,
    },
}

impl CookieBuilder {
    pub fn from_config(codec: TokenCodec, config: &TokenCookieConfig) -> Self {
        let name = config.name().to_string();
        match config.layout() {
            CookieLayout::Single => Self::Single { codec, name },
            CookieLayout::Multiple => Self::Multiple {
                codec,
                name,
                max_chunk_bytes: config.max_chunk_bytes(),
                max_chunk_count: config.max_chunk_count(),
            },
        }
    }

    pub fn layout(&self) -> CookieLayout {
        match self {
            Self::Single { .. } => CookieLayout::Single,
            Self::Multiple { .. } => CookieLayout::Multiple,
        }
    }

    pub fn build_cookies(&self, tokens: &TokenSet) -> Result<Vec<CookieChunk>> {
        match self {
            Self::Single { codec, name } => {
                Ok(vec![CookieChunk::new(name.clone(), codec.encode(tokens)?)])
            }
            Self::Multiple {
                codec,
                name,
                max_chunk_bytes,
                max_chunk_count,
            } => {
                let envelope = codec.encode(tokens)?;
                let chunks = chunk::chunk(&envelope, name, *max_chunk_bytes);
                if chunks.len() > *max_chunk_count {
                    tracing::warn!(
                        chunks = chunks.len(),
                        max_chunk_count = *max_chunk_count,
                        "token cookie needs more chunks than removal covers"
                    );
                }
                Ok(chunks)
            }
        }
    }
}
