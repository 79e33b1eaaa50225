//! Splitting a block of share text into individual shares

use std::sync::LazyLock;

use regex::Regex;

/// One or more blank lines, where whitespace-only lines count as blank
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Splits `raw` into trimmed, non-empty shares separated by blank lines
///
/// A single share may span several lines as long as none of them is blank.
///
/// # Examples
///
/// ```rust
/// use safeparts_client::parse::parse_shares;
///
/// let shares = parse_shares("first share\n\n  \nsecond\nshare\n");
/// assert_eq!(shares, vec!["first share", "second\nshare"]);
/// ```
#[must_use]
pub fn parse_shares(raw: &str) -> Vec<String> {
    let normalized = raw.replace("\r\n", "\n");

    BLANK_LINES
        .split(&normalized)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
