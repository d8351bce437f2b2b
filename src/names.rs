//! Name utilities
//!
//! Splitting of qualified names and the word-level normalization used when
//! comparing schema element names with data keys.

use once_cell::sync::Lazy;
use regex::Regex;

// Lower/digit followed by upper ("firstName"), or an acronym followed by a
// capitalized word ("INNNumber" -> "INN Number").
static CAMEL_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\p{Ll}|\d)(\p{Lu})|(\p{Lu})(\p{Lu}\p{Ll})").unwrap());

/// Check if a string is a valid NCName (non-colonized name)
pub fn is_valid_ncname(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(':')
        && name
            .chars()
            .next()
            .map(|c| c.is_alphabetic() || c == '_')
            .unwrap_or(false)
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
}

/// Split a QName into prefix and local name
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    if let Some((prefix, local)) = qname.split_once(':') {
        (Some(prefix), local)
    } else {
        (None, qname)
    }
}

/// Local part of a possibly prefixed name
pub fn local_part(qname: &str) -> &str {
    split_qname(qname).1
}

/// Normalize a name into lowercase words separated by single spaces.
///
/// Camel-case boundaries become word breaks and every character that is
/// neither a letter nor a digit acts as a separator, so `firstName`,
/// `first_name` and `FIRST-NAME` all normalize to `first name`. Digits stay
/// in their word: `c12` is `c12`.
pub fn normalize_name(name: &str) -> String {
    // The boundary pattern consumes two characters, so a run like "aBCd"
    // needs a second pass to catch the boundary that overlapped the first.
    let split = CAMEL_BOUNDARY.replace_all(name, break_boundary);
    let split = CAMEL_BOUNDARY.replace_all(&split, break_boundary);

    split
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

fn break_boundary(caps: &regex::Captures) -> String {
    match (caps.get(1), caps.get(2)) {
        (Some(a), Some(b)) => format!("{} {}", a.as_str(), b.as_str()),
        _ => format!("{} {}", &caps[3], &caps[4]),
    }
}
