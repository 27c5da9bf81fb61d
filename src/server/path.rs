//! Path templates and path matching.
//!
//! # Template syntax
//!
//! Templates are `/`-separated segments. A segment is either a literal or a
//! parameter; parameters can be written three ways:
//!
//! | Notation | Example | Name |
//! |----------|---------|------|
//! | braces | `{id}` | `id` |
//! | colon | `:id` | `id` |
//! | at-sign | `@id` | `id` |
//!
//! # Matching
//!
//! Both sides are split after dropping the query string and a trailing
//! slash. Two paths match when they have the same number of segments and
//! each pair of segments is literally equal or has a parameter on either
//! side. The same rule decides whether two templates are equivalent, so
//! `/a/{id}` and `/a/{other}` (and `/a/{id}` and `/a/b`) are equivalent.
//!
//! # Examples
//!
//! ```
//! use routewire::server::PathTemplate;
//!
//! let template = PathTemplate::parse("/users/{id}/posts/:post").unwrap();
//! assert!(template.matches_path("/users/42/posts/7/"));
//! assert!(!template.matches_path("/users/42"));
//!
//! let params = template.extract("/users/42/posts/7");
//! assert_eq!(params["id"], "42");
//! assert_eq!(params["post"], "7");
//! ```

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;

/// One segment of a template or path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must match the same text.
    Literal(String),
    /// Matches any single segment; carries the parameter name.
    Param(String),
}

impl Segment {
    /// Classify a raw segment.
    pub fn parse(raw: &str) -> Segment {
        match param_name(raw) {
            Some(name) => Segment::Param(name.to_string()),
            None => Segment::Literal(raw.to_string()),
        }
    }

    /// Literal equality, or a parameter on either side.
    pub fn matches(&self, other: &Segment) -> bool {
        match (self, other) {
            (Segment::Param(_), _) | (_, Segment::Param(_)) => true,
            (Segment::Literal(a), Segment::Literal(b)) => a == b,
        }
    }
}

fn param_name(raw: &str) -> Option<&str> {
    if let Some(inner) = raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
        return Some(inner);
    }
    raw.strip_prefix(':').or_else(|| raw.strip_prefix('@'))
}

/// Split a path into raw segments, dropping the query string, the leading
/// slash and a trailing slash. `/` and the empty path have no segments.
pub fn split_path(path: &str) -> Vec<&str> {
    let path = path.split_once('?').map_or(path, |(p, _)| p);
    let path = path.strip_suffix('/').unwrap_or(path);
    let path = path.strip_prefix('/').unwrap_or(path);
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('/').collect()
    }
}

/// A parsed route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parse a template.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRoute`] when the template does not start with
    /// `/`, a parameter has no name, or a name is used twice.
    pub fn parse(raw: &str) -> Result<Self> {
        if !raw.starts_with('/') {
            return Err(Error::InvalidRoute(format!("{:?} must start with '/'", raw)));
        }

        let mut seen = Vec::new();
        let mut segments = Vec::new();
        for part in split_path(raw) {
            let segment = Segment::parse(part);
            if let Segment::Param(name) = &segment {
                if name.is_empty() {
                    return Err(Error::InvalidRoute(format!("{:?} has an unnamed parameter", raw)));
                }
                if seen.contains(name) {
                    return Err(Error::InvalidRoute(format!("{:?} repeats parameter {:?}", raw, name)));
                }
                seen.push(name.clone());
            }
            segments.push(segment);
        }

        Ok(PathTemplate {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Names of the parameter segments, in order.
    pub fn param_names(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Param(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Whether an incoming path matches this template.
    pub fn matches_path(&self, path: &str) -> bool {
        let incoming: Vec<Segment> = split_path(path).into_iter().map(Segment::parse).collect();
        self.matches_segments(&incoming)
    }

    /// Whether already-classified segments match this template.
    pub fn matches_segments(&self, incoming: &[Segment]) -> bool {
        self.segments.len() == incoming.len()
            && self.segments.iter().zip(incoming).all(|(a, b)| a.matches(b))
    }

    /// Whether two templates would match the same paths under the
    /// segment rule.
    pub fn is_equivalent(&self, other: &PathTemplate) -> bool {
        self.matches_segments(&other.segments)
    }

    /// Values of this template's parameters in a matching path.
    ///
    /// Values are percent-decoded; a value that does not decode to UTF-8 is
    /// kept as received. Call only with a path that matches.
    pub fn extract(&self, path: &str) -> BTreeMap<String, String> {
        self.segments
            .iter()
            .zip(split_path(path))
            .filter_map(|(segment, value)| match segment {
                Segment::Param(name) => Some((name.clone(), decode_segment(value))),
                Segment::Literal(_) => None,
            })
            .collect()
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn decode_segment(value: &str) -> String {
    urlencoding::decode(value)
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("/users/42/"), vec!["users", "42"]);
        assert_eq!(split_path("/users/42?expand=true"), vec!["users", "42"]);
        assert!(split_path("/").is_empty());
        assert!(split_path("").is_empty());
    }

    #[test]
    fn test_param_notations() {
        assert_eq!(Segment::parse("{id}"), Segment::Param("id".into()));
        assert_eq!(Segment::parse(":id"), Segment::Param("id".into()));
        assert_eq!(Segment::parse("@id"), Segment::Param("id".into()));
        assert_eq!(Segment::parse("id"), Segment::Literal("id".into()));
        assert_eq!(Segment::parse("{id"), Segment::Literal("{id".into()));
    }

    #[test]
    fn test_parse_rejects_bad_templates() {
        assert!(matches!(PathTemplate::parse("users"), Err(Error::InvalidRoute(_))));
        assert!(matches!(PathTemplate::parse("/users/{}"), Err(Error::InvalidRoute(_))));
        assert!(matches!(PathTemplate::parse("/a/:x/b/{x}"), Err(Error::InvalidRoute(_))));
    }

    #[test]
    fn test_matching_requires_same_length() {
        let template = PathTemplate::parse("/users/{id}").unwrap();
        assert!(template.matches_path("/users/42"));
        assert!(template.matches_path("/users/42/"));
        assert!(!template.matches_path("/users"));
        assert!(!template.matches_path("/users/42/extra"));
        assert!(!template.matches_path("/accounts/42"));
    }

    #[test]
    fn test_root_template() {
        let root = PathTemplate::parse("/").unwrap();
        assert!(root.matches_path("/"));
        assert!(root.matches_path("/?page=1"));
        assert!(!root.matches_path("/x"));
    }

    #[test]
    fn test_equivalence_across_notations() {
        let a = PathTemplate::parse("/a/{id}").unwrap();
        assert!(a.is_equivalent(&PathTemplate::parse("/a/{other}").unwrap()));
        assert!(a.is_equivalent(&PathTemplate::parse("/a/:other").unwrap()));
        assert!(a.is_equivalent(&PathTemplate::parse("/a/@x/").unwrap()));
        assert!(a.is_equivalent(&PathTemplate::parse("/a/literal").unwrap()));
        assert!(!a.is_equivalent(&PathTemplate::parse("/b/{id}").unwrap()));
        assert!(!a.is_equivalent(&PathTemplate::parse("/a/{id}/c").unwrap()));
    }

    #[test]
    fn test_extract_decodes_values() {
        let template = PathTemplate::parse("/files/{name}/:rev").unwrap();
        let params = template.extract("/files/my%20doc.txt/3");
        assert_eq!(params.get("name").map(String::as_str), Some("my doc.txt"));
        assert_eq!(params.get("rev").map(String::as_str), Some("3"));
        assert_eq!(template.param_names(), vec!["name", "rev"]);
    }
}
