//! Text encodings understood by the crate.
//!
//! Bodies and form parameters are byte sequences on the wire; [`Charset`]
//! converts between them and Rust strings. UTF-8 is the default. ISO-8859-1
//! is supported because it is the historical default for form posts and
//! `text/*` bodies without an explicit charset.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// A text encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Charset {
    /// UTF-8 (default).
    #[default]
    Utf8,
    /// ISO-8859-1. Characters above U+00FF encode as `?`.
    Latin1,
}

impl Charset {
    /// Canonical name used in `Content-Type` parameters.
    pub fn name(self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Latin1 => "ISO-8859-1",
        }
    }

    /// Look up a charset by label, ignoring case.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(Charset::Utf8),
            "iso-8859-1" | "iso8859-1" | "iso_8859-1" | "latin1" | "l1" | "us-ascii" => {
                Some(Charset::Latin1)
            }
            _ => None,
        }
    }

    /// Encode text into bytes.
    pub fn encode(self, text: &str) -> Cow<'_, [u8]> {
        match self {
            Charset::Utf8 => Cow::Borrowed(text.as_bytes()),
            Charset::Latin1 if text.is_ascii() => Cow::Borrowed(text.as_bytes()),
            Charset::Latin1 => Cow::Owned(
                text.chars()
                    .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                    .collect(),
            ),
        }
    }

    /// Decode bytes into text. Invalid UTF-8 sequences become U+FFFD.
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Charset::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Charset::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label() {
        assert_eq!(Charset::from_label("UTF-8"), Some(Charset::Utf8));
        assert_eq!(Charset::from_label(" latin1 "), Some(Charset::Latin1));
        assert_eq!(Charset::from_label("shift_jis"), None);
    }

    #[test]
    fn test_latin1_encoding() {
        assert_eq!(Charset::Latin1.encode("café").as_ref(), b"caf\xe9");
        assert_eq!(Charset::Latin1.encode("€").as_ref(), b"?");
        assert_eq!(Charset::Latin1.decode(b"caf\xe9"), "café");
    }

    #[test]
    fn test_utf8_decoding_is_lossy() {
        assert_eq!(Charset::Utf8.decode("café".as_bytes()), "café");
        assert_eq!(Charset::Utf8.decode(b"a\xffb"), "a\u{fffd}b");
    }
}
