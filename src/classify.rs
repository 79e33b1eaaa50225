//! Best-guess share encoding from raw text
//!
//! Users paste, type or scan share text without saying which encoding produced it. The
//! heuristic below looks only at token shapes, so it runs without the engine and never
//! fails: anything it cannot place is reported as `None`.

use crate::domain::Encoding;

/// Tokens at least this long look like binary-to-text output rather than words
const LONG_TOKEN: usize = 16;

/// A lone token this long is treated as base64url even without a hint character
const LONE_TOKEN: usize = 24;

/// Word shares are at least this many tokens
const MIN_WORDS: usize = 6;

/// Word shares have a median token length no longer than this
const MAX_WORD_LEN: usize = 12;

/// Guesses the encoding of `text`
///
/// Returns `None` when the text is blank or matches no encoding's shape.
///
/// # Examples
///
/// ```rust
/// use safeparts_client::classify::classify;
/// use safeparts_client::domain::Encoding;
///
/// assert_eq!(classify("share-a/share-b"), Some(Encoding::MnemoBip39));
/// assert_eq!(
///     classify("apple bread crane delta eagle frost"),
///     Some(Encoding::MnemoWords)
/// );
/// assert_eq!(classify("   "), None);
/// ```
#[must_use]
pub fn classify(text: &str) -> Option<Encoding> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    // mnemo-bip39 separates the phrases of one share with `/`
    if trimmed.contains('/') {
        return Some(Encoding::MnemoBip39);
    }

    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }

    let all_base64url = tokens.iter().all(|t| t.chars().all(is_base64url_char));
    let all_base58 = tokens.iter().all(|t| t.chars().all(is_base58_char));
    let all_lower = tokens.iter().all(|t| t.chars().all(|c| c.is_ascii_lowercase()));
    let has_base64_hint = tokens.iter().any(|t| t.chars().any(is_base64_hint));

    let mut lens: Vec<usize> = tokens.iter().map(|t| t.len()).collect();
    lens.sort_unstable();
    let median = lens[lens.len() / 2];

    if all_base64url
        && (has_base64_hint || median >= LONG_TOKEN || (tokens.len() == 1 && median >= LONE_TOKEN))
    {
        return Some(Encoding::Base64Url);
    }

    if all_base58 && median >= LONG_TOKEN {
        return Some(Encoding::Base58Check);
    }

    if all_lower && tokens.len() >= MIN_WORDS && median <= MAX_WORD_LEN {
        return Some(Encoding::MnemoWords);
    }

    None
}

fn is_base64url_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Base58 drops `0`, `O`, `I` and `l`
fn is_base58_char(c: char) -> bool {
    matches!(c, '1'..='9' | 'A'..='H' | 'J'..='N' | 'P'..='Z' | 'a'..='k' | 'm'..='z')
}

fn is_base64_hint(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '_'
}
