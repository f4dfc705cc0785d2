//! Helpers for encoding/decoding the token payload carried by the cookie.
//!
//! The payload is a JSON object with exactly `id_token`, `refresh_token` and `custom_token`,
//! wrapped in an envelope signed by a [`RotatingCredential`]. Anything else, including extra
//! keys, is refused in both directions so the wire format stays fixed.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    credential::RotatingCredential,
    error::{CookieError, Result},
};

/// The three tokens handed over by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenSet {
    id_token: String,
    refresh_token: String,
    custom_token: String,
}

impl TokenSet {
    pub fn new(
        id_token: impl Into<String>,
        refresh_token: impl Into<String>,
        custom_token: impl Into<String>,
    ) -> Self {
        Self {
            id_token: id_token.into(),
            refresh_token: refresh_token.into(),
            custom_token: custom_token.into(),
        }
    }

    pub fn id_token(&self) -> &str {
        &self.id_token
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub fn custom_token(&self) -> &str {
        &self.custom_token
    }

    /// `(id_token, refresh_token, custom_token)`
    pub fn into_parts(self) -> (String, String, String) {
        (self.id_token, self.refresh_token, self.custom_token)
    }
}

impl TryFrom<Value> for TokenSet {
    type Error = CookieError;

    /// Only a JSON object with exactly the three token fields converts. Derived struct decoding
    /// would also take a three-element array, so that is refused up front.
    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Self::try_from(fields),
            other => Err(CookieError::PayloadShapeInvalid {
                reason: format!("expected a JSON object, found {}", json_kind(&other)),
            }),
        }
    }
}

impl TryFrom<Map<String, Value>> for TokenSet {
    type Error = CookieError;

    fn try_from(fields: Map<String, Value>) -> Result<Self> {
        serde_json::from_value(Value::Object(fields)).map_err(CookieError::shape)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Signs token payloads into envelopes and verifies them back.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    credential: RotatingCredential,
}

impl TokenCodec {
    pub fn new(credential: RotatingCredential) -> Self {
        Self { credential }
    }

    pub fn credential(&self) -> &RotatingCredential {
        &self.credential
    }

    pub fn encode(&self, tokens: &TokenSet) -> Result<String> {
        self.credential.sign(tokens)
    }

    /// Encode an untyped payload, refusing anything that is not exactly a [`TokenSet`].
    pub fn encode_value(&self, value: Value) -> Result<String> {
        self.encode(&TokenSet::try_from(value)?)
    }

    pub fn decode(&self, envelope: &str) -> Result<TokenSet> {
        // Anything but an object fails here, before the typed decode sees it.
        let fields = self.credential.verify::<Map<String, Value>>(envelope)?;
        TokenSet::try_from(fields)
    }
}
