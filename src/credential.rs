//! HS256 JWTs signed and verified against a ranked list of keys.
//!
//! The first key in a [`RotatingCredential`] signs every new envelope. Every key, including the
//! first, is tried in order when verifying. To rotate, put the new key in front and keep the old
//! one behind it until sessions signed with it have aged out, then drop it.

use std::{fmt, sync::Arc};

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::{CookieError, Result};

/// Length of an unpadded base64url HMAC-SHA256 signature.
pub(crate) const SIGNATURE_LEN: usize = 43;

/// One secret usable for signing and verification.
#[derive(Clone)]
pub struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(CookieError::EmptySigningKey);
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        })
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey").finish_non_exhaustive()
    }
}

/// Ranked signing keys, newest first.
///
/// Immutable once built; clones share the same key list.
#[derive(Debug, Clone)]
pub struct RotatingCredential {
    // Never empty.
    keys: Arc<[SigningKey]>,
}

impl RotatingCredential {
    pub fn new(keys: Vec<SigningKey>) -> Result<Self> {
        if keys.is_empty() {
            return Err(CookieError::NoSigningKeys);
        }

        Ok(Self { keys: keys.into() })
    }

    /// Build a credential from raw secrets, newest first.
    pub fn from_secrets<I, S>(secrets: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let keys = secrets
            .into_iter()
            .map(SigningKey::new)
            .collect::<Result<Vec<_>>>()?;
        Self::new(keys)
    }

    /// A new credential that signs with `newest` and still verifies with every current key.
    #[must_use]
    pub fn rotate(&self, newest: SigningKey) -> Self {
        let keys = std::iter::once(newest)
            .chain(self.keys.iter().cloned())
            .collect::<Vec<_>>();
        Self { keys: keys.into() }
    }

    /// Number of keys, active one included. Never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    fn active(&self) -> &SigningKey {
        &self.keys[0]
    }

    /// Sign `claims` with the active key and return the compact envelope.
    pub fn sign<T: Serialize>(&self, claims: &T) -> Result<String> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.active().encoding)
            .map_err(CookieError::shape)
    }

    /// Verify `envelope` against each key in rank order and deserialize its claims.
    ///
    /// The claims are only decoded once a key has verified the signature, so a payload that
    /// fails to decode after that is a shape error rather than a signature error.
    pub fn verify<T: DeserializeOwned>(&self, envelope: &str) -> Result<T> {
        jsonwebtoken::decode_header(envelope).map_err(|_| CookieError::SignatureInvalid)?;

        let validation = validation();
        for (rank, key) in self.keys.iter().enumerate() {
            let err = match jsonwebtoken::decode::<T>(envelope, &key.decoding, &validation) {
                Ok(data) => {
                    if rank > 0 {
                        tracing::debug!(rank, "envelope verified with a non-active signing key");
                    }
                    return Ok(data.claims);
                }
                Err(err) => err,
            };

            match err.kind() {
                ErrorKind::InvalidSignature => continue,
                // The signature segment is decoded before verification, the payload after.
                ErrorKind::Base64(_) if !signature_decodes(envelope) => {
                    return Err(CookieError::SignatureInvalid);
                }
                ErrorKind::Base64(_) | ErrorKind::Json(_) => return Err(CookieError::shape(err)),
                _ => return Err(CookieError::SignatureInvalid),
            }
        }

        Err(CookieError::SignatureInvalid)
    }
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.required_spec_claims.clear();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation
}

fn signature_decodes(envelope: &str) -> bool {
    envelope
        .rsplit_once('.')
        .is_some_and(|(_, signature)| URL_SAFE_NO_PAD.decode(signature).is_ok())
}

/// Whether `envelope` has all three segments and a full-length signature.
///
/// Says nothing about validity; it only detects truncation.
pub(crate) fn is_complete(envelope: &str) -> bool {
    let mut segments = envelope.split('.');
    matches!(
        (segments.next(), segments.next(), segments.next(), segments.next()),
        (Some(_), Some(_), Some(signature), None) if signature.len() == SIGNATURE_LEN
    )
}
