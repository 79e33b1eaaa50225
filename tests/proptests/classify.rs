//! Property tests for encoding detection

use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use safeparts_client::classify;
use safeparts_client::domain::Encoding;

/// Text built from the characters share encodings are made of
#[derive(Clone, Debug)]
struct ShareLikeText(String);

impl Arbitrary for ShareLikeText {
    fn arbitrary(g: &mut Gen) -> Self {
        const ALPHABET: &[char] = &[
            'a', 'b', 'k', 'l', 'z', 'A', 'I', 'O', 'Z', '0', '1', '9', '-', '_', '/', ' ',
            ' ', '\n', '\t',
        ];
        let len = usize::arbitrary(g) % 80;
        let text = (0..len)
            .map(|_| *g.choose(ALPHABET).unwrap_or(&' '))
            .collect();
        ShareLikeText(text)
    }
}

/// Six to twenty lowercase words of at most eight letters
#[derive(Clone, Debug)]
struct WordShare(String);

impl Arbitrary for WordShare {
    fn arbitrary(g: &mut Gen) -> Self {
        let count = 6 + usize::arbitrary(g) % 15;
        let words: Vec<String> = (0..count)
            .map(|_| {
                let len = 1 + usize::arbitrary(g) % 8;
                (0..len)
                    .map(|_| char::from(b'a' + u8::arbitrary(g) % 26))
                    .collect()
            })
            .collect();
        WordShare(words.join(" "))
    }
}

#[quickcheck]
fn prop_classify_is_total_and_deterministic(text: String) -> bool {
    classify(&text) == classify(&text)
}

#[quickcheck]
fn prop_slash_always_means_bip39(text: ShareLikeText) -> bool {
    let detected = classify(&text.0);
    if text.0.contains('/') {
        detected == Some(Encoding::MnemoBip39)
    } else {
        detected != Some(Encoding::MnemoBip39)
    }
}

#[quickcheck]
fn prop_surrounding_whitespace_is_ignored(text: ShareLikeText) -> bool {
    classify(&text.0) == classify(&format!("  \n{}\n\t ", text.0))
}

#[quickcheck]
fn prop_blank_text_is_unknown(spaces: Vec<bool>) -> bool {
    let blank: String = spaces.iter().map(|&nl| if nl { '\n' } else { ' ' }).collect();
    classify(&blank).is_none()
}

#[quickcheck]
fn prop_lowercase_word_lists_are_mnemo_words(share: WordShare) -> bool {
    classify(&share.0) == Some(Encoding::MnemoWords)
}
