//! Protocol constants, header validation, and header-value codecs.

pub mod constants;
mod headers;

pub use headers::{
    content_type_with_charset, format_basic_auth, format_bearer_auth, parse_basic_auth,
    parse_charset, validate_header,
};
