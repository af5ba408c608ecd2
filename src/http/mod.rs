//! HTTP Module
//!
//! Message framing over raw byte streams and the text-level parsing the proxy
//! needs to route and cache a request.
//!
//! Framing treats the first `\r\n\r\n` as the end of a message, so request
//! bodies are not read. Responses are read until that terminator ends a read
//! or the origin closes the stream, whichever comes first.

pub mod framer;
pub mod parser;


pub use framer::{contains_terminator, send_message, MessageFramer, TERMINATOR};
pub use parser::{
    build_cache_key, build_revalidation_request, extract_host, extract_url, strip_response_code,
    RequestDescriptor,
};
