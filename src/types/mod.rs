//! Value types shared by the outbound client and the inbound router.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`HeaderSet`] | Immutable ordered headers with case-insensitive lookup |
//! | [`FormParameters`] | Ordered query/form parameters and their URL-encoded codec |
//! | [`Response`] | Status, headers, body, charset and connection metadata |
//! | [`Method`] | HTTP request method |
//! | [`Charset`] | Text encoding for bodies and form parameters |

mod charset;
mod form;
mod headers;
mod method;
mod response;

pub use charset::Charset;
pub use form::FormParameters;
pub use headers::HeaderSet;
pub use method::Method;
pub use response::Response;
