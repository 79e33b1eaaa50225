//! In-process engine backed by `blahaj`
//!
//! Used by the command-line front-end and by tests. It only speaks `mnemo-words` (see
//! [`super::codec`]) and has no passphrase support, but it reports failures with the
//! same message shapes as the native and WASM engines so the rest of the crate cannot
//! tell the difference.

use std::collections::HashSet;

use anyhow::{Context, Result, anyhow, bail};
use blahaj::{Share, Sharks};
use tracing::debug;
use zeroize::Zeroizing;

use super::codec::{self, ShareFrame};
use super::{Engine, ShareInfo};
use crate::domain::Encoding;
use crate::error::EngineError;
use crate::text;

/// Engine that splits and combines in the current process
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalEngine;

impl LocalEngine {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn check_request(encoding: Encoding, passphrase: Option<&str>) -> Result<()> {
        if encoding != Encoding::MnemoWords {
            bail!("unsupported encoding: {encoding}");
        }
        if passphrase.is_some_and(|p| !p.is_empty()) {
            bail!("passphrase encryption is not available in the local engine");
        }
        Ok(())
    }

    /// Splits raw secret bytes into encoded shares
    ///
    /// # Errors
    /// Returns an error if `k`/`n` are out of range, the secret is empty, or randomness
    /// is unavailable
    pub fn split_bytes(&self, secret: &[u8], k: u8, n: u8) -> Result<Vec<String>> {
        if k < 2 || n < k {
            bail!("invalid parameters: require 2 <= k <= n <= 255, got k={k}, n={n}");
        }
        if secret.is_empty() {
            bail!("secret must not be empty");
        }

        let mut set_tag = [0u8; 4];
        getrandom::getrandom(&mut set_tag).map_err(|e| anyhow!("no randomness available: {e}"))?;

        let sharks = Sharks(k);
        let dealer = sharks.dealer(secret);
        dealer
            .take(usize::from(n))
            .map(|share| {
                let bytes = Zeroizing::new(Vec::from(&share));
                codec::encode_share(k, set_tag, &bytes)
            })
            .collect()
    }

    /// Recovers raw secret bytes from encoded shares
    ///
    /// # Errors
    /// Returns an error if a share cannot be read, the shares disagree on their split,
    /// or fewer than `k` distinct shares were given
    pub fn combine_to_bytes(&self, shares: &[String]) -> Result<Zeroizing<Vec<u8>>> {
        let frames = shares
            .iter()
            .enumerate()
            .map(|(idx, s)| {
                codec::decode_share(s).map_err(|e| anyhow!("share #{}: {e:#}", idx + 1))
            })
            .collect::<Result<Vec<ShareFrame>>>()?;

        let Some(first) = frames.first() else {
            bail!("No shares provided");
        };
        let (k, set_tag) = (first.k, first.set_tag);
        if frames.iter().any(|f| f.k != k || f.set_tag != set_tag) {
            bail!("shares are from different sets");
        }

        // Pasting the same share twice must not count towards the threshold
        let mut seen_x = HashSet::new();
        let mut distinct = Vec::with_capacity(frames.len());
        for frame in &frames {
            let x = frame.share.first().copied().context("share has no x coordinate")?;
            if seen_x.insert(x) {
                let share = Share::try_from(frame.share.as_slice())
                    .map_err(|e| anyhow!("invalid share data: {e:?}"))?;
                distinct.push(share);
            }
        }
        if distinct.len() < usize::from(k) {
            bail!("need {k} shares, got {}", distinct.len());
        }

        let sharks = Sharks(k);
        let secret = sharks
            .recover(&distinct)
            .map_err(|e| anyhow!("combine failed: {e:?}"))?;
        Ok(Zeroizing::new(secret))
    }
}

impl Engine for LocalEngine {
    fn supported_encodings(&self) -> Vec<Encoding> {
        vec![Encoding::MnemoWords]
    }

    async fn split_secret(
        &self,
        secret_b64: &str,
        k: u8,
        n: u8,
        encoding: Encoding,
        passphrase: Option<&str>,
    ) -> Result<Vec<String>, EngineError> {
        Self::check_request(encoding, passphrase)?;
        let secret = text::base64_to_bytes(secret_b64)?;
        let shares = self.split_bytes(&secret, k, n)?;
        debug!(k, n, "local engine split secret");
        Ok(shares)
    }

    async fn combine_shares(
        &self,
        shares: &[String],
        encoding: Encoding,
        passphrase: Option<&str>,
    ) -> Result<String, EngineError> {
        Self::check_request(encoding, passphrase)?;
        let secret = self.combine_to_bytes(shares)?;
        debug!(shares = shares.len(), "local engine combined shares");
        Ok(text::bytes_to_base64(&secret))
    }

    async fn inspect_share(
        &self,
        share: &str,
        encoding: Encoding,
    ) -> Result<ShareInfo, EngineError> {
        Self::check_request(encoding, None)?;
        let frame = codec::decode_share(share)?;
        Ok(ShareInfo { k: frame.k })
    }
}
