//! Key/value payload encoding.
//!
//! Both request directions carry the same wire shape: ordered `key=value`
//! pairs joined by `&`, with no trailing separator. A GET appends it to the
//! path as a query string; a POST sends it as a form-url-encoded body.

/// Content type declared on POST bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Encode ordered pairs as `k1=v1&k2=v2`.
///
/// Pair order is preserved; an empty slice encodes to an empty string.
pub fn encode_params(params: &[(&str, &str)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&")
}

/// Decode `k1=v1&k2=v2` back into ordered pairs.
///
/// A pair without `=` decodes to an empty value; empty segments are skipped.
pub fn decode_params(encoded: &str) -> Vec<(String, String)> {
    encoded
        .split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment.split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (segment.to_string(), String::new()),
        })
        .collect()
}
