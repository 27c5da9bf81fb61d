//! Form parameters and the `application/x-www-form-urlencoded` codec.
//!
//! [`FormParameters`] is used for query strings on outbound requests, for
//! form bodies, and for the query of inbound requests. Keys are never
//! empty; values may be. A key whose value is empty counts as missing for
//! [`FormParameters::get`].
//!
//! # Wire format
//!
//! | Pairs | Encoded |
//! |-------|---------|
//! | `a=1`, `b=x y` | `a=1&b=x%20y` |
//! | `flag=""` | `flag` |
//!
//! Parsing accepts `+` as an encoded space.
//!
//! # Examples
//!
//! ```
//! use routewire::{Charset, FormParameters};
//!
//! let params = FormParameters::parse("?q=rust+lang&page=2", Charset::Utf8);
//! assert_eq!(params.get("q"), Some("rust lang"));
//! assert_eq!(params.get_or_default("size", "20"), "20");
//! assert_eq!(params.encode(Charset::Utf8), "q=rust%20lang&page=2");
//! ```

use crate::error::{Error, Result};
use crate::types::Charset;

/// Ordered collection of form parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormParameters {
    entries: Vec<(String, String)>,
}

impl FormParameters {
    /// The empty parameter set.
    pub const EMPTY: FormParameters = FormParameters { entries: Vec::new() };

    pub const fn empty() -> Self {
        Self::EMPTY
    }

    /// Build from pairs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] when a key is empty.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs
            .into_iter()
            .try_fold(Self::empty(), |params, (k, v)| params.with(k, v))
    }

    /// A new set with `(key, value)` appended.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(Error::InvalidParameter("parameter key is empty".to_string()));
        }
        self.entries.push((key, value.into()));
        Ok(self)
    }

    /// First value for `name`; an empty value counts as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }

    pub fn get_or_default<'a>(&'a self, name: &str, fallback: &'a str) -> &'a str {
        self.get(name).unwrap_or(fallback)
    }

    /// Whether a key is present at all, even with an empty value.
    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == name)
    }

    /// A new set with `other`'s pairs appended after these. Duplicates are
    /// kept.
    pub fn merge(&self, other: &FormParameters) -> Self {
        let mut entries = self.entries.clone();
        entries.extend(other.entries.iter().cloned());
        FormParameters { entries }
    }

    /// Encode as `key=value` pairs joined by `&`.
    pub fn encode(&self, charset: Charset) -> String {
        self.entries
            .iter()
            .map(|(key, value)| {
                let key = encode_component(key, charset);
                if value.is_empty() {
                    key
                } else {
                    format!("{}={}", key, encode_component(value, charset))
                }
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Parse a query string or form body.
    ///
    /// A leading `?` is ignored. Input without any `=` yields the empty set.
    /// Segments are split on the first `=`; segments with an empty key are
    /// skipped.
    pub fn parse(raw: &str, charset: Charset) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        if raw.is_empty() || !raw.contains('=') {
            return Self::empty();
        }

        let entries = raw
            .split('&')
            .filter(|segment| !segment.is_empty())
            .filter_map(|segment| {
                let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
                let key = decode_component(key, charset);
                if key.is_empty() {
                    None
                } else {
                    Some((key, decode_component(value, charset)))
                }
            })
            .collect();
        FormParameters { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn encode_component(text: &str, charset: Charset) -> String {
    urlencoding::encode_binary(&charset.encode(text)).into_owned()
}

fn decode_component(text: &str, charset: Charset) -> String {
    let spaced = text.replace('+', " ");
    charset.decode(&urlencoding::decode_binary(spaced.as_bytes()))
}
