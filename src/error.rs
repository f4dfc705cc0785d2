use thiserror::Error;

pub type Result<T> = std::result::Result<T, CookieError>;

/// Everything that can go wrong while writing or reading token cookies.
///
/// Callers normally treat every variant as "session invalid", but the variants stay distinct so
/// that an absent cookie can be told apart from a tampered one in logs and metrics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CookieError {
    #[error("no cookie named `{name}` is present")]
    CookieMissing { name: String },

    #[error("cookie chunk `{name}.{missing}` is missing")]
    IncompleteCookieChunks { name: String, missing: usize },

    #[error("cookie chunk name `{name}` does not end in a canonical numeric ordinal")]
    MalformedChunkName { name: String },

    #[error("cookie chunk `{name}` appears more than once")]
    DuplicateCookieChunk { name: String },

    #[error("no configured signing key verifies the cookie")]
    SignatureInvalid,

    #[error("cookie payload has the wrong shape: {reason}")]
    PayloadShapeInvalid { reason: String },

    #[error("at least one signing key is required")]
    NoSigningKeys,

    #[error("signing keys must not be empty")]
    EmptySigningKey,
}

impl CookieError {
    pub(crate) fn shape<E: std::fmt::Display>(err: E) -> Self {
        Self::PayloadShapeInvalid {
            reason: err.to_string(),
        }
    }

    /// The cookie simply is not there: the request is unauthenticated, not corrupt.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::CookieMissing { .. })
    }

    /// The cookie is present but cannot be trusted.
    pub fn is_corrupt(&self) -> bool {
        matches!(
            self,
            Self::IncompleteCookieChunks { .. }
                | Self::MalformedChunkName { .. }
                | Self::DuplicateCookieChunk { .. }
                | Self::SignatureInvalid
                | Self::PayloadShapeInvalid { .. }
        )
    }

    /// Stable label for log fields and metric tags.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CookieMissing { .. } => "cookie_missing",
            Self::IncompleteCookieChunks { .. } => "incomplete_cookie_chunks",
            Self::MalformedChunkName { .. } => "malformed_chunk_name",
            Self::DuplicateCookieChunk { .. } => "duplicate_cookie_chunk",
            Self::SignatureInvalid => "signature_invalid",
            Self::PayloadShapeInvalid { .. } => "payload_shape_invalid",
            Self::NoSigningKeys => "no_signing_keys",
            Self::EmptySigningKey => "empty_signing_key",
        }
    }
}
