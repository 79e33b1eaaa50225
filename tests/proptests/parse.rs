//! Property tests for share text parsing

use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use safeparts_client::parse_shares;

/// A few single-line shares joined by random blank-line separators
#[derive(Clone, Debug)]
struct SeparatedShares {
    shares: Vec<String>,
    text: String,
}

impl Arbitrary for SeparatedShares {
    fn arbitrary(g: &mut Gen) -> Self {
        const SEPARATORS: &[&str] = &["\n\n", "\n \n", "\r\n\r\n", "\n\t\n\n", "\n\n\n\n"];
        let count = 1 + usize::arbitrary(g) % 6;
        let shares: Vec<String> = (0..count)
            .map(|i| format!("share{i} word{}", u16::arbitrary(g)))
            .collect();

        let mut text = String::new();
        for (i, share) in shares.iter().enumerate() {
            if i > 0 {
                text.push_str(g.choose(SEPARATORS).unwrap_or(&"\n\n"));
            }
            text.push_str(share);
        }
        SeparatedShares { shares, text }
    }
}

#[quickcheck]
fn prop_shares_are_trimmed_and_non_empty(text: String) -> bool {
    parse_shares(&text)
        .iter()
        .all(|s| !s.is_empty() && s.trim() == s)
}

#[quickcheck]
fn prop_no_share_contains_a_blank_line(text: String) -> bool {
    parse_shares(&text).iter().all(|s| {
        let normalized = s.replace("\r\n", "\n");
        let lines: Vec<&str> = normalized.split('\n').collect();
        lines.iter().all(|line| !line.trim().is_empty())
    })
}

#[quickcheck]
fn prop_separators_recover_every_share(input: SeparatedShares) -> bool {
    parse_shares(&input.text) == input.shares
}

#[quickcheck]
fn prop_parsing_is_idempotent(input: SeparatedShares) -> bool {
    let once = parse_shares(&input.text);
    parse_shares(&once.join("\n\n")) == once
}
