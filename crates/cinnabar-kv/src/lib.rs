//! # cinnabar-kv: single-line key–value metadata codec
//!
//! Encodes a flat sequence of alternating key/value strings as one line of
//! the form `k1:v1 k2:v2 …`, suitable for embedding in a record's meta
//! field, and decodes it back.
//!
//! # Line Format
//!
//! ```text
//! token     := key ':' value
//! key       := one or more chars, none of: space, tab, newline, ':', '"'
//! value     := ''                      (empty)
//!            | bare-text               (no space, tab, newline, '"')
//!            | '"' escaped-text '"'    (may contain literal spaces)
//! separator := exactly one space between tokens
//! ```
//!
//! Inside a quoted value, newline, tab, double quote and backslash are
//! written as `\n`, `\t`, `\"` and `\\`. Bare values are taken literally,
//! so a value that is merely a backslash round-trips without quoting.
//!
//! # Round-trip Law
//!
//! For every valid alternating sequence (keys satisfying the key
//! constraints, values arbitrary single-or-multi-line strings),
//! `decode(encode(kv)) == kv`.

use thiserror::Error;

/// Errors produced by [`encode`] and [`decode`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KvError {
    /// Key is empty or contains space, tab, newline, `:` or `"`.
    #[error(
        "invalid key {key:?}: keys must be non-empty and contain no space, tab, newline, colon, or double quote"
    )]
    InvalidKey { key: String },

    /// A token violates the quoting or spacing rules.
    #[error("malformed token at byte {at}: {reason}")]
    MalformedToken { at: usize, reason: &'static str },

    /// A key has no value: odd encode input, or a token without a colon.
    #[error("missing value for key {key:?}")]
    MissingValue { key: String },
}

/// Result alias for codec operations.
pub type Result<T> = std::result::Result<T, KvError>;

/// Returns true if `key` satisfies the key constraints.
fn key_is_valid(key: &str) -> bool {
    !key.is_empty() && !key.contains([' ', '\t', '\n', ':', '"'])
}

/// Returns true if `value` can be emitted bare, without quoting.
fn value_is_bare(value: &str) -> bool {
    !value.contains([' ', '\t', '\n', '"'])
}

/// Appends `value` to `out`, quoting and escaping when required.
fn push_value(out: &mut String, value: &str) {
    if value_is_bare(value) {
        out.push_str(value);
        return;
    }
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(ch),
        }
    }
    out.push('"');
}

/// Encodes a flat alternating key/value sequence into a single line.
///
/// # Errors
///
/// - [`KvError::MissingValue`] if `parts` has odd length
/// - [`KvError::InvalidKey`] if any key violates the key constraints
///
/// # Examples
///
/// ```
/// let line = cinnabar_kv::encode(&["k1", "v1", "k2", "v2"]).unwrap();
/// assert_eq!(line, "k1:v1 k2:v2");
/// ```
pub fn encode(parts: &[&str]) -> Result<String> {
    if parts.len() % 2 != 0 {
        let key = parts.last().copied().unwrap_or_default();
        return Err(KvError::MissingValue {
            key: key.to_string(),
        });
    }

    let mut out = String::new();
    for pair in parts.chunks_exact(2) {
        let (key, value) = (pair[0], pair[1]);
        if !key_is_valid(key) {
            return Err(KvError::InvalidKey {
                key: key.to_string(),
            });
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(key);
        out.push(':');
        push_value(&mut out, value);
    }
    Ok(out)
}

/// Decodes a line previously produced by [`encode`] into key/value pairs.
///
/// An empty input decodes to an empty vector.
///
/// # Errors
///
/// - [`KvError::MissingValue`] for a token without a colon
/// - [`KvError::InvalidKey`] for a key violating the key constraints
/// - [`KvError::MalformedToken`] for bad quoting, doubled separator spaces,
///   or a trailing separator
pub fn decode(line: &str) -> Result<Vec<(String, String)>> {
    let bytes = line.as_bytes();
    let mut pairs = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let (key, value, next) = decode_token(line, pos)?;
        pairs.push((key, value));
        pos = next;

        if pos == bytes.len() {
            break;
        }
        // Exactly one separator space between tokens.
        debug_assert_eq!(bytes[pos], b' ', "token must end at a separator");
        pos += 1;
        if pos == bytes.len() {
            return Err(KvError::MalformedToken {
                at: pos - 1,
                reason: "trailing space after last token",
            });
        }
        if bytes[pos] == b' ' {
            return Err(KvError::MalformedToken {
                at: pos,
                reason: "more than one space between tokens",
            });
        }
    }

    Ok(pairs)
}

/// Parses one `key:value` token starting at byte `start`.
///
/// Returns the pair and the byte position of the separator space (or end of
/// input) that terminated the token. All delimiters are ASCII, so byte
/// positions are always valid `str` boundaries.
fn decode_token(line: &str, start: usize) -> Result<(String, String, usize)> {
    let bytes = line.as_bytes();

    // Key: everything up to the first colon. Hitting a separator or the end
    // of input first means the token never had a value.
    let mut pos = start;
    while pos < bytes.len() && bytes[pos] != b':' && bytes[pos] != b' ' {
        pos += 1;
    }
    if pos == bytes.len() || bytes[pos] == b' ' {
        return Err(KvError::MissingValue {
            key: line[start..pos].to_string(),
        });
    }
    let key = &line[start..pos];
    if !key_is_valid(key) {
        return Err(KvError::InvalidKey {
            key: key.to_string(),
        });
    }
    pos += 1; // consume ':'

    // Empty value: token ends right after the colon.
    if pos == bytes.len() || bytes[pos] == b' ' {
        return Ok((key.to_string(), String::new(), pos));
    }

    if bytes[pos] == b'"' {
        let (value, end) = decode_quoted(line, pos)?;
        return Ok((key.to_string(), value, end));
    }

    // Bare value: literal up to the next separator or end of input.
    let value_start = pos;
    while pos < bytes.len() && bytes[pos] != b' ' {
        pos += 1;
    }
    Ok((key.to_string(), line[value_start..pos].to_string(), pos))
}

/// Parses a quoted value starting at the opening quote.
///
/// Returns the unescaped value and the byte position just past the closing
/// quote.
fn decode_quoted(line: &str, open: usize) -> Result<(String, usize)> {
    let bytes = line.as_bytes();
    let mut value = String::new();
    let mut pos = open + 1;

    loop {
        if pos == bytes.len() {
            return Err(KvError::MalformedToken {
                at: open,
                reason: "quoted value is missing its closing quote",
            });
        }
        match bytes[pos] {
            b'"' => {
                pos += 1;
                // The closing quote must end the token.
                if pos < bytes.len() && bytes[pos] != b' ' {
                    return Err(KvError::MalformedToken {
                        at: pos,
                        reason: "unexpected character after closing quote",
                    });
                }
                return Ok((value, pos));
            }
            b'\\' => {
                let escaped = bytes.get(pos + 1).ok_or(KvError::MalformedToken {
                    at: pos,
                    reason: "dangling escape at end of input",
                })?;
                match escaped {
                    b'n' => value.push('\n'),
                    b't' => value.push('\t'),
                    b'"' => value.push('"'),
                    b'\\' => value.push('\\'),
                    _ => {
                        return Err(KvError::MalformedToken {
                            at: pos,
                            reason: "unknown escape sequence",
                        });
                    }
                }
                pos += 2;
            }
            _ => {
                // Multi-byte UTF-8 continuation bytes never collide with the
                // ASCII delimiters above, so copy the whole char.
                let ch = line[pos..].chars().next().expect("in-bounds char");
                value.push(ch);
                pos += ch.len_utf8();
            }
        }
    }
}
