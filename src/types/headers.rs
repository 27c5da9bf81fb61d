//! Immutable, ordered, case-insensitive header collection.
//!
//! A [`HeaderSet`] is built once, either incrementally by the request
//! builder or from wire pairs when a response arrives, and never mutated
//! afterwards. Every method that looks like a mutation returns a new set.
//!
//! # Invariants
//!
//! - Names are never empty.
//! - Values never contain CR or LF.
//! - Lookups compare names case-insensitively.
//! - Duplicate names are kept in insertion order; [`HeaderSet::get`] returns
//!   the first match, [`HeaderSet::get_all`] returns every match.
//!
//! # Examples
//!
//! ```
//! use routewire::HeaderSet;
//!
//! let headers = HeaderSet::new()
//!     .append("Accept", "text/html").unwrap()
//!     .append("accept", "application/json").unwrap();
//!
//! assert_eq!(headers.get("ACCEPT"), Some("text/html"));
//! assert_eq!(headers.get_all("Accept"), vec!["text/html", "application/json"]);
//!
//! let replaced = headers.replace("Accept", "*/*").unwrap();
//! assert_eq!(replaced.get_all("accept"), vec!["*/*"]);
//! // The original set is untouched.
//! assert_eq!(headers.len(), 2);
//! ```

use crate::error::Result;
use crate::protocol;
use http::header::{HeaderMap, HeaderName, HeaderValue};

/// Ordered sequence of header name/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: Vec<(String, String)>,
}

impl HeaderSet {
    /// An empty set.
    pub const fn new() -> Self {
        HeaderSet { entries: Vec::new() }
    }

    /// Build a set from explicit pairs, validating each one.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidHeader`] for the first invalid pair.
    pub fn from_pairs<I, N, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        let mut entries = Vec::new();
        for (name, value) in pairs {
            let (name, value) = (name.into(), value.into());
            Self::validate(&name, &value)?;
            entries.push((name, value));
        }
        Ok(HeaderSet { entries })
    }

    /// Build a set from a name→value map. Order follows the map's iteration
    /// order.
    pub fn from_map<'a, M>(map: M) -> Result<Self>
    where
        M: IntoIterator<Item = (&'a String, &'a String)>,
    {
        Self::from_pairs(map.into_iter().map(|(n, v)| (n.clone(), v.clone())))
    }

    /// Build a set from pairs received on the wire.
    ///
    /// Wire names may use token characters the builder rejects, so only the
    /// structural invariants are enforced: pairs with an empty name or a
    /// CR/LF in the value are dropped.
    pub fn from_wire<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let entries = pairs
            .into_iter()
            .filter(|(name, value)| {
                let keep = !name.is_empty() && !value.contains(['\r', '\n']);
                if !keep {
                    tracing::debug!(header = %name, "dropping malformed wire header");
                }
                keep
            })
            .collect();
        HeaderSet { entries }
    }

    /// Build a set from an `http::HeaderMap`, preserving per-name order.
    pub fn from_header_map(map: &HeaderMap) -> Self {
        Self::from_wire(map.iter().map(|(name, value)| {
            let value = match value.to_str() {
                Ok(v) => v.to_string(),
                Err(_) => String::from_utf8_lossy(value.as_bytes()).into_owned(),
            };
            (header_case(name.as_str()), value)
        }))
    }

    /// Check a pair against the builder rules.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidHeader`] when the name contains
    /// characters outside `[A-Za-z0-9-_.]` or the value contains CR/LF.
    pub fn validate(name: &str, value: &str) -> Result<()> {
        protocol::validate_header(name, value)
    }

    /// First value for `name`, compared case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `name`, in insertion order.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Names in insertion order, duplicates preserved.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Whether any entry has this name.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// A new set with `(name, value)` appended.
    pub fn append(&self, name: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let (name, value) = (name.into(), value.into());
        Self::validate(&name, &value)?;
        let mut entries = self.entries.clone();
        entries.push((name, value));
        Ok(HeaderSet { entries })
    }

    /// A new set with every `name` entry removed and `(name, value)`
    /// appended.
    pub fn replace(&self, name: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let (name, value) = (name.into(), value.into());
        Self::validate(&name, &value)?;
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .filter(|(n, _)| !n.eq_ignore_ascii_case(&name))
            .cloned()
            .collect();
        entries.push((name, value));
        Ok(HeaderSet { entries })
    }

    /// A new set without any `name` entries.
    pub fn remove(&self, name: &str) -> Self {
        HeaderSet {
            entries: self
                .entries
                .iter()
                .filter(|(n, _)| !n.eq_ignore_ascii_case(name))
                .cloned()
                .collect(),
        }
    }

    /// Layer `self` over `defaults`: every name present in `self` hides the
    /// same name in `defaults`. Defaults come first, in their own order.
    pub fn merge_over(&self, defaults: &HeaderSet) -> Self {
        let mut entries: Vec<_> = defaults
            .entries
            .iter()
            .filter(|(n, _)| !self.contains(n))
            .cloned()
            .collect();
        entries.extend(self.entries.iter().cloned());
        HeaderSet { entries }
    }

    /// Number of entries, duplicates included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Convert to an `http::HeaderMap`.
    ///
    /// Pairs `http` cannot represent (for example values with other control
    /// characters) are skipped with a warning.
    pub fn to_header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_bytes(value.as_bytes()),
            ) {
                (Ok(name), Ok(value)) => {
                    map.append(name, value);
                }
                _ => tracing::warn!(header = %name, "skipping header not representable in http::HeaderMap"),
            }
        }
        map
    }
}

impl<'a> IntoIterator for &'a HeaderSet {
    type Item = (&'a str, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// `content-type` → `Content-Type`, for readable wire-derived names.
fn header_case(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}
