//! Cookie header parsing.
//!
//! # Responsibilities
//! - Split a raw `Cookie` header into structured name/value pairs
//! - Tolerate missing `=`, stray whitespace, and empty fragments
//!
//! # Design Decisions
//! - Pairs without `=` or with an empty name are skipped, not errors
//! - Values keep their exact bytes apart from surrounding whitespace
//! - On duplicate names the first occurrence wins (browsers order the
//!   most specific cookie first)

/// Parse a raw `Cookie` header into ordered name/value pairs.
pub fn parse_cookie_header(raw: &str) -> Vec<(&str, &str)> {
    raw.split(';')
        .filter_map(|fragment| {
            let (name, value) = fragment.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name, value.trim()))
        })
        .collect()
}

/// Look up a cookie by name. First occurrence wins.
pub fn cookie_value<'a>(raw: &'a str, name: &str) -> Option<&'a str> {
    parse_cookie_header(raw)
        .into_iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| v)
}
