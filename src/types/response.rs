//! The response value shared by the client and the router.

use crate::error::{Error, Result};
use crate::protocol::{self, constants::headers, constants::media_types};
use crate::types::{Charset, HeaderSet};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;

/// An HTTP response.
///
/// Transports produce one per round-trip; handlers build one with the
/// `with_*` methods. The fields are read-only once the value leaves its
/// producer.
///
/// # Connection metadata
///
/// Transports record what they know about the connection in
/// [`Response::metadata`]:
///
/// | Key | Value |
/// |-----|-------|
/// | `transport` | `legacy` or `modern` |
/// | `http-version` | e.g. `HTTP/1.1`, `HTTP/2.0` |
/// | `remote-addr` | peer socket address, when known |
/// | `peer-certificate` | base64 DER of the server certificate, for TLS |
/// | `url` | final URL after redirects |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    headers: HeaderSet,
    body: Bytes,
    charset: Charset,
    metadata: BTreeMap<String, String>,
}

impl Response {
    /// An empty response with the given status.
    pub fn new(status: u16) -> Self {
        Response {
            status,
            headers: HeaderSet::new(),
            body: Bytes::new(),
            charset: Charset::default(),
            metadata: BTreeMap::new(),
        }
    }

    /// `200 OK` with no body.
    pub fn ok() -> Self {
        Self::new(200)
    }

    /// Assemble a response from received parts. The charset is taken from
    /// the `Content-Type` header when it names one.
    pub fn from_parts(status: u16, headers: HeaderSet, body: impl Into<Bytes>) -> Self {
        let charset = headers
            .get(headers::CONTENT_TYPE)
            .and_then(protocol::parse_charset)
            .unwrap_or_default();
        Response {
            status,
            headers,
            body: body.into(),
            charset,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Append a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        self.headers = self.headers.append(name, value)?;
        Ok(self)
    }

    /// Replace the whole header set.
    pub fn with_headers(mut self, headers: HeaderSet) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    /// Set a plain-text body encoded with the response charset.
    pub fn with_text(mut self, text: &str) -> Self {
        let content_type = protocol::content_type_with_charset("text/plain", self.charset);
        self.body = Bytes::from(self.charset.encode(text).into_owned());
        if let Ok(headers) = self.headers.replace(headers::CONTENT_TYPE, content_type) {
            self.headers = headers;
        }
        self
    }

    /// Serialize `value` as a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] when `value` cannot be serialized.
    pub fn with_json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self> {
        let body = serde_json::to_vec(value).map_err(|e| Error::Serialization(e.to_string()))?;
        self.body = Bytes::from(body);
        self.charset = Charset::Utf8;
        self.headers = self.headers.replace(headers::CONTENT_TYPE, media_types::JSON)?;
        Ok(self)
    }

    /// Record a piece of connection metadata.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    /// First value of a header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// Body decoded with the response charset.
    pub fn text(&self) -> String {
        self.charset.decode(&self.body)
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Canonical reason phrase for the status, if it has one.
    pub fn reason(&self) -> Option<&'static str> {
        http::StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
    }

    /// `Location` header, if present.
    pub fn location(&self) -> Option<&str> {
        self.headers.get(headers::LOCATION)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 301, 302, 303, 307 or 308.
    pub fn is_redirect(&self) -> bool {
        matches!(self.status, 301 | 302 | 303 | 307 | 308)
    }

    /// 4xx or 5xx.
    pub fn is_error(&self) -> bool {
        (400..600).contains(&self.status)
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_parts_detects_charset() {
        let headers = HeaderSet::from_pairs([("Content-Type", "text/plain; charset=ISO-8859-1")]).unwrap();
        let response = Response::from_parts(200, headers, Bytes::from_static(b"caf\xe9"));
        assert_eq!(response.charset(), Charset::Latin1);
        assert_eq!(response.text(), "café");
    }

    #[test]
    fn test_with_text_sets_content_type() {
        let response = Response::ok().with_text("hello");
        assert_eq!(response.header("content-type"), Some("text/plain; charset=UTF-8"));
        assert_eq!(response.body().as_ref(), b"hello");
    }

    #[test]
    fn test_json_round_trip() {
        let response = Response::new(201).with_json(&json!({"id": 7})).unwrap();
        assert_eq!(response.header("Content-Type"), Some("application/json"));
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["id"], 7);
    }

    #[test]
    fn test_status_classes() {
        assert!(Response::new(204).is_success());
        assert!(Response::new(308).is_redirect());
        assert!(!Response::new(304).is_redirect());
        assert!(Response::new(503).is_error());
        assert_eq!(Response::new(404).reason(), Some("Not Found"));
    }
}
