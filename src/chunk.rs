//! Splitting an envelope across `<name>.<ordinal>` cookies and putting it back together.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{CookieError, Result};

/// One cookie's worth of an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieChunk {
    pub name: String,
    pub value: String,
}

impl CookieChunk {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

pub fn chunk_name(base: &str, ordinal: usize) -> String {
    format!("{base}.{ordinal}")
}

/// Split `envelope` into contiguous slices of at most `max_chunk_bytes` bytes.
///
/// Slices never split a UTF-8 code point, so a slice can only exceed the limit when a single
/// character is wider than it. A limit of zero is treated as one.
pub fn chunk(envelope: &str, base: &str, max_chunk_bytes: usize) -> Vec<CookieChunk> {
    let max = max_chunk_bytes.max(1);
    let mut chunks = Vec::with_capacity(envelope.len().div_ceil(max));
    let mut rest = envelope;

    while !rest.is_empty() {
        let mut end = max.min(rest.len());
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        if end == 0 {
            end = rest.chars().next().map_or(rest.len(), char::len_utf8);
        }

        let (head, tail) = rest.split_at(end);
        chunks.push(CookieChunk::new(chunk_name(base, chunks.len()), head));
        rest = tail;
    }

    chunks
}

/// Only the form [`chunk_name`] writes: ASCII digits, no leading zero.
fn parse_ordinal(suffix: &str) -> Option<usize> {
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if suffix.len() > 1 && suffix.starts_with('0') {
        return None;
    }
    suffix.parse().ok()
}

/// Rebuild an envelope from the `base.<n>` cookies among `cookies`, in any order.
///
/// Only the contiguous run starting at ordinal 0 is used; anything after the first gap is
/// ignored. Cookies not named `base.<something>` are skipped.
pub fn reassemble<I, N, V>(cookies: I, base: &str) -> Result<String>
where
    I: IntoIterator<Item = (N, V)>,
    N: AsRef<str>,
    V: AsRef<str>,
{
    let prefix = format!("{base}.");
    let mut slots = BTreeMap::new();
    let mut duplicates = BTreeSet::new();

    for (name, value) in cookies {
        let name = name.as_ref();
        let Some(suffix) = name.strip_prefix(prefix.as_str()) else {
            continue;
        };
        let ordinal = parse_ordinal(suffix).ok_or_else(|| CookieError::MalformedChunkName {
            name: name.to_string(),
        })?;

        if slots.insert(ordinal, value.as_ref().to_string()).is_some() {
            duplicates.insert(ordinal);
        }
    }

    if slots.is_empty() {
        return Err(CookieError::CookieMissing {
            name: base.to_string(),
        });
    }

    let mut envelope = String::new();
    let mut ordinal = 0;
    while let Some(value) = slots.get(&ordinal) {
        if duplicates.contains(&ordinal) {
            return Err(CookieError::DuplicateCookieChunk {
                name: chunk_name(base, ordinal),
            });
        }
        envelope.push_str(value);
        ordinal += 1;
    }

    if ordinal == 0 {
        return Err(CookieError::IncompleteCookieChunks {
            name: base.to_string(),
            missing: 0,
        });
    }

    Ok(envelope)
}
