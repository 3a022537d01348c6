//! `key=value` list decoding for query strings and the `Cookie` header.
//!
//! Neither format is percent-decoded, values are handed out as received.

use std::collections::HashMap;

/// Splits `pair` on its first `=`.
///
/// Pairs without `=`, or whose only `=` is the final character, carry no usable value and are
/// dropped.
fn split_pair(pair: &str) -> Option<(&str, &str)> {
    let idx = pair.find('=')?;
    if idx == pair.len() - 1 {
        return None;
    }
    Some((pair[..idx].trim(), pair[idx + 1..].trim()))
}

/// Decodes `a=1&b=2`. A repeated key keeps its last value.
pub fn parse_query(raw_query: &str) -> HashMap<String, String> {
    let parts = raw_query.split('&');
    let mut queries = HashMap::with_capacity(parts.clone().count());
    for (key, value) in parts.filter_map(split_pair) {
        queries.insert(key.to_owned(), value.to_owned());
    }
    queries
}

/// Decodes a single `Cookie` header value, `a=1; b=2`. Pairs are dropped by the same rules as
/// query pairs.
pub fn parse_cookies(header: &str) -> HashMap<String, String> {
    header
        .split(';')
        .filter_map(|cookie| split_pair(cookie.trim()))
        .map(|(name, value)| (name.to_owned(), value.to_owned()))
        .collect()
}
