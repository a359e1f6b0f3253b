//! Permissive link validation for link tiles.

#[cfg(test)]
#[path = "url_test.rs"]
mod url_test;

use std::sync::OnceLock;

use regex::Regex;

/// Optional scheme, optional `www.`, a dotted host, then an optional path/query.
const LINK_PATTERN: &str =
    r"^(https?://)?(www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b([-a-zA-Z0-9()@:%_+.~#?&/=]*)$";

fn link_regex() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| match Regex::new(LINK_PATTERN) {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::error!(error = %e, "link pattern failed to compile");
                None
            }
        })
        .as_ref()
}

/// Whether `link` is acceptable for a link tile. Empty input counts as valid.
pub fn is_valid_link(link: &str) -> bool {
    let trimmed = link.trim();
    if trimmed.is_empty() {
        return true;
    }
    link_regex().is_some_and(|re| re.is_match(trimmed))
}
