//! Word encoding used by the in-process engine
//!
//! Shares produced by [`super::LocalEngine`] are written as a marker word followed by
//! words from the English BIP39 list, 11 bits per word. The words carry a small frame:
//!
//! ```text
//! k (1) || set tag (4) || length (2) || share bytes || crc32 (4)
//! ```
//!
//! - `k` is the threshold, so a single share is enough to learn how many are needed
//! - the set tag is random per split and tells shares of different splits apart
//! - the CRC-32 covers every preceding byte of the frame
//!
//! # Examples
//!
//! ```rust
//! use safeparts_client::engine::codec::{decode_share, encode_share, SHARE_MARKER};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let encoded = encode_share(3, [1, 2, 3, 4], &[0x01, 0xAA, 0xBB])?;
//! assert!(encoded.starts_with(SHARE_MARKER));
//!
//! let frame = decode_share(&encoded)?;
//! assert_eq!(frame.k, 3);
//! assert_eq!(frame.set_tag, [1, 2, 3, 4]);
//! assert_eq!(*frame.share, vec![0x01, 0xAA, 0xBB]);
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result, anyhow, bail};
use bip39::Language;
use crc::{CRC_32_ISO_HDLC, Crc};
use zeroize::Zeroizing;

/// CRC32 algorithm for share integrity checking
const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// First word of every share written by the local engine
pub const SHARE_MARKER: &str = "safeparts";

/// Message used when the checksum does not match
pub const INTEGRITY_MESSAGE: &str = "integrity check failed";

const BITS_PER_WORD: usize = 11;
const HEADER_LEN: usize = 1 + 4 + 2;
const CRC_LEN: usize = 4;

/// Decoded contents of one share
#[derive(Debug, Clone, PartialEq)]
pub struct ShareFrame {
    /// Threshold recorded at split time
    pub k: u8,
    /// Random tag shared by every share of one split
    pub set_tag: [u8; 4],
    /// Raw Shamir share (x coordinate followed by the y values)
    pub share: Zeroizing<Vec<u8>>,
}

/// Writes one share as marker word plus data words
///
/// # Errors
/// Returns an error if `k` is below 2 or the share is larger than 65535 bytes
pub fn encode_share(k: u8, set_tag: [u8; 4], share: &[u8]) -> Result<String> {
    if k < 2 {
        bail!("threshold must be at least 2 (got {k})");
    }
    let length = u16::try_from(share.len())
        .map_err(|_| anyhow!("share too large: {} bytes (max 65535)", share.len()))?;

    let mut frame = Zeroizing::new(Vec::with_capacity(HEADER_LEN + share.len() + CRC_LEN));
    frame.push(k);
    frame.extend_from_slice(&set_tag);
    frame.extend_from_slice(&length.to_be_bytes());
    frame.extend_from_slice(share);
    let checksum = CRC32.checksum(&frame);
    frame.extend_from_slice(&checksum.to_be_bytes());

    let mut words = vec![SHARE_MARKER];
    words.extend(bytes_to_words(&frame));
    Ok(words.join(" "))
}

/// Reads one share written by [`encode_share`]
///
/// Words are matched case-insensitively and may be separated by any whitespace.
///
/// # Errors
/// Returns an error if the marker is missing, a word is not in the list, the frame is
/// truncated, or the checksum does not match (reported as `integrity check failed`)
pub fn decode_share(text: &str) -> Result<ShareFrame> {
    let words: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();

    let Some((marker, data_words)) = words.split_first() else {
        bail!("empty share");
    };
    if marker != SHARE_MARKER {
        bail!("not a safeparts share: expected '{SHARE_MARKER}', got '{marker}'");
    }

    let mut frame = words_to_bytes(data_words)?;

    // Bit alignment can leave one whole padding byte in front; k is never zero.
    if frame.first() == Some(&0) {
        frame.remove(0);
    }

    if frame.len() < HEADER_LEN + CRC_LEN {
        bail!("share too short: {} bytes", frame.len());
    }

    let (body, crc_bytes) = frame.split_at(frame.len() - CRC_LEN);
    let stored = u32::from_be_bytes(
        crc_bytes
            .try_into()
            .context("checksum field is not 4 bytes")?,
    );
    if CRC32.checksum(body) != stored {
        bail!(INTEGRITY_MESSAGE);
    }

    let k = body[0];
    let mut set_tag = [0u8; 4];
    set_tag.copy_from_slice(&body[1..5]);
    let length = usize::from(u16::from_be_bytes([body[5], body[6]]));
    let share = &body[HEADER_LEN..];
    if share.len() != length {
        bail!(
            "share length mismatch: header says {length}, found {}",
            share.len()
        );
    }

    Ok(ShareFrame {
        k,
        set_tag,
        share: Zeroizing::new(share.to_vec()),
    })
}

/// Packs bytes into 11-bit word indices, left-padding with zero bits
fn bytes_to_words(data: &[u8]) -> Vec<&'static str> {
    let list = Language::English.word_list();
    let bit_count = data.len() * 8;
    let padding = (BITS_PER_WORD - bit_count % BITS_PER_WORD) % BITS_PER_WORD;

    let mut words = Vec::with_capacity((bit_count + padding) / BITS_PER_WORD);
    let mut buffer: usize = 0;
    let mut filled = padding;

    for &byte in data {
        for bit_pos in (0..8).rev() {
            buffer = (buffer << 1) | usize::from((byte >> bit_pos) & 1);
            filled += 1;
            if filled == BITS_PER_WORD {
                words.push(list[buffer]);
                buffer = 0;
                filled = 0;
            }
        }
    }

    words
}

/// Unpacks word indices into whole bytes, dropping the leading partial byte of padding
fn words_to_bytes(words: &[String]) -> Result<Zeroizing<Vec<u8>>> {
    let total_bits = words.len() * BITS_PER_WORD;
    let skip = total_bits % 8;

    let mut out = Zeroizing::new(Vec::with_capacity(total_bits / 8));
    let mut buffer: u16 = 0;
    let mut filled = 0;
    let mut seen = 0;

    for word in words {
        let index = Language::English
            .find_word(word)
            .ok_or_else(|| anyhow!("unknown word in share: '{word}'"))?;

        for bit_pos in (0..BITS_PER_WORD).rev() {
            let bit = (index >> bit_pos) & 1;
            seen += 1;
            if seen <= skip {
                continue;
            }
            buffer = (buffer << 1) | bit;
            filled += 1;
            if filled == 8 {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "buffer holds exactly 8 bits here"
                )]
                out.push(buffer as u8);
                buffer = 0;
                filled = 0;
            }
        }
    }

    Ok(out)
}
