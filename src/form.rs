//! Split and combine interactions, independent of any rendering surface
//!
//! A host screen owns one [`SplitForm`] or [`CombineForm`], forwards user input to it,
//! and renders from its accessors. Engine calls come in two flavours: a one-shot async
//! method (`split`, `combine`, `on_paste`) for hosts that simply await, and a
//! `start_*`/`finish_*` pair for hosts that dispatch the engine call themselves and
//! keep handling input while it is pending.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;
use zeroize::{Zeroize, Zeroizing};

use crate::classify::classify;
use crate::collection::{BoxId, ShareCollection};
use crate::config::ClientConfig;
use crate::domain::{Encoding, SplitConfig, Threshold};
use crate::engine::Engine;
use crate::error::{EngineError, ErrorKind};
use crate::orchestrator::{OperationState, Orchestrator, combine_ready, split_ready};
use crate::probe::{ProbeStart, ProbeTicket, ThresholdProbe};
use crate::text;

fn optional_passphrase(passphrase: &str) -> Option<String> {
    (!passphrase.is_empty()).then(|| passphrase.to_string())
}

/// Everything the engine needs for one combine call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombineRequest {
    pub shares: Vec<String>,
    pub encoding: Encoding,
    pub passphrase: Option<String>,
}

/// Combine interaction: share boxes, encoding choice, passphrase and result
#[derive(Debug)]
pub struct CombineForm {
    config: ClientConfig,
    collection: ShareCollection,
    encoding: Encoding,
    encoding_flash: bool,
    passphrase: Zeroizing<String>,
    probe: ThresholdProbe,
    orchestrator: Orchestrator<Zeroizing<Vec<u8>>>,
    seen_scans: HashSet<String>,
    scans_added: usize,
}

impl CombineForm {
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            encoding: config.default_encoding,
            config,
            collection: ShareCollection::new(),
            encoding_flash: false,
            passphrase: Zeroizing::new(String::new()),
            probe: ThresholdProbe::new(),
            orchestrator: Orchestrator::new(),
            seen_scans: HashSet::new(),
            scans_added: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn collection(&self) -> &ShareCollection {
        &self.collection
    }

    #[must_use]
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Explicit choice from the encoding selector
    pub fn set_encoding(&mut self, encoding: Encoding) {
        self.encoding = encoding;
    }

    /// Whether the encoding selector should show its "changed" highlight
    #[must_use]
    pub fn encoding_flashing(&self) -> bool {
        self.encoding_flash
    }

    /// Ends the transient highlights of new boxes and the encoding selector
    pub fn clear_highlights(&mut self) {
        self.encoding_flash = false;
        self.collection.clear_flash();
    }

    pub fn set_passphrase(&mut self, passphrase: &str) {
        self.passphrase = Zeroizing::new(passphrase.to_string());
    }

    /// Ordinary typing into a box; does not probe
    pub fn set_box_text(&mut self, id: BoxId, text: &str) -> bool {
        self.collection.set_box_text(id, text)
    }

    pub fn add_box(&mut self) -> BoxId {
        self.collection.add_box()
    }

    pub fn remove_box(&mut self, id: BoxId) -> bool {
        self.collection.remove_box(id)
    }

    /// Pastes `text` into a box and starts a threshold probe
    ///
    /// The returned ticket, if any, is to be looked up with [`ThresholdProbe::inspect`]
    /// and handed back through [`CombineForm::finish_probe`].
    pub fn paste(&mut self, id: BoxId, text: &str) -> ProbeStart {
        self.collection.set_box_text(id, text);
        self.start_probe()
    }

    /// Adds imported text (file, QR scan) to the first blank box and probes
    pub fn import(&mut self, text: &str) -> ProbeStart {
        self.collection.append_text(text);
        self.start_probe()
    }

    /// Opens a scanning session, forgetting the values seen by the previous one
    pub fn begin_scan(&mut self) {
        for mut seen in self.seen_scans.drain() {
            seen.zeroize();
        }
        self.scans_added = 0;
    }

    /// Imports one scanned value unless this session has already seen it
    ///
    /// Scanners report the same code many times while it stays in view, so repeats
    /// and blank reads return `None` and leave the boxes alone.
    pub fn scan(&mut self, value: &str) -> Option<ProbeStart> {
        let value = value.trim();
        if value.is_empty() || self.seen_scans.contains(value) {
            return None;
        }
        let start = self.import(value);
        self.seen_scans.insert(value.to_string());
        self.scans_added += 1;
        debug!(added = self.scans_added, "imported scanned share");
        Some(start)
    }

    /// Distinct values imported since [`CombineForm::begin_scan`]
    #[must_use]
    pub fn scans_added(&self) -> usize {
        self.scans_added
    }

    fn start_probe(&mut self) -> ProbeStart {
        let start = self.probe.begin(&self.collection, &mut self.encoding);
        if start.switched_to.is_some() && self.config.highlights() {
            self.encoding_flash = true;
        }
        start
    }

    /// Applies the outcome of a probe started by [`CombineForm::paste`]
    pub fn finish_probe(
        &mut self,
        ticket: &ProbeTicket,
        threshold: Option<Threshold>,
    ) -> Vec<BoxId> {
        let flash = self.config.highlights();
        self.probe.resolve(ticket, threshold, &mut self.collection, flash)
    }

    /// Paste followed by an awaited probe
    pub async fn on_paste<E: Engine>(&mut self, engine: &E, id: BoxId, text: &str) -> Vec<BoxId> {
        let Some(ticket) = self.paste(id, text).ticket else {
            return Vec::new();
        };
        let threshold = ThresholdProbe::inspect(engine, &ticket).await;
        self.finish_probe(&ticket, threshold)
    }

    /// The explicit "auto-detect" button: classify everything entered so far
    pub fn auto_detect(&mut self) -> Option<Encoding> {
        let joined = self
            .collection
            .boxes()
            .iter()
            .map(|b| b.raw_text())
            .collect::<Vec<_>>()
            .join("\n\n");
        let detected = classify(&joined)?;
        self.encoding = detected;
        Some(detected)
    }

    #[must_use]
    pub fn can_combine(&self) -> bool {
        self.orchestrator.can_submit(combine_ready(&self.collection))
    }

    #[must_use]
    pub fn state(&self) -> &OperationState<Zeroizing<Vec<u8>>> {
        self.orchestrator.state()
    }

    #[must_use]
    pub fn error(&self) -> Option<&ErrorKind> {
        self.orchestrator.error()
    }

    /// Recovered secret as text, once a combine has succeeded
    #[must_use]
    pub fn secret_text(&self) -> Option<String> {
        self.orchestrator
            .payload()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Enters `Busy` and snapshots the request
    ///
    /// Returns `None`, changing nothing, while a combine is already running or when no
    /// box holds a share.
    pub fn start_combine(&mut self) -> Option<CombineRequest> {
        if !combine_ready(&self.collection) || !self.orchestrator.begin() {
            return None;
        }
        Some(CombineRequest {
            shares: self.collection.flatten_shares(),
            encoding: self.encoding,
            passphrase: optional_passphrase(&self.passphrase),
        })
    }

    /// Records the engine's answer to a request from [`CombineForm::start_combine`]
    pub fn finish_combine(&mut self, result: Result<String, EngineError>) {
        let decoded = result.and_then(|b64| text::base64_to_bytes(&b64).map_err(EngineError::from));
        match decoded {
            Ok(secret) => {
                self.orchestrator
                    .succeed(Zeroizing::new(secret), Some(&mut self.collection));
            }
            Err(err) => {
                self.orchestrator.fail(&err, Some(&mut self.collection));
            }
        }
    }

    /// Runs one combine attempt against `engine`
    pub async fn combine<E: Engine>(&mut self, engine: &E) {
        let Some(request) = self.start_combine() else {
            return;
        };
        let result = engine
            .combine_shares(&request.shares, request.encoding, request.passphrase.as_deref())
            .await;
        self.finish_combine(result);
    }
}

/// Everything the engine needs for one split call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitRequest {
    pub secret_b64: String,
    pub k: u8,
    pub n: u8,
    pub encoding: Encoding,
    pub passphrase: Option<String>,
}

/// Split interaction: secret, parameters, encoding, passphrase and resulting shares
#[derive(Debug)]
pub struct SplitForm {
    secret: Zeroizing<String>,
    k: u32,
    n: u32,
    encoding: Encoding,
    passphrase: Zeroizing<String>,
    orchestrator: Orchestrator<Vec<String>>,
}

impl SplitForm {
    /// Threshold offered when the form opens
    pub const DEFAULT_K: u32 = 2;

    /// Share count offered when the form opens
    pub const DEFAULT_N: u32 = 3;

    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            secret: Zeroizing::new(String::new()),
            k: Self::DEFAULT_K,
            n: Self::DEFAULT_N,
            encoding: config.default_encoding,
            passphrase: Zeroizing::new(String::new()),
            orchestrator: Orchestrator::new(),
        }
    }

    pub fn set_secret(&mut self, secret: &str) {
        self.secret = Zeroizing::new(secret.to_string());
    }

    /// Stores K and N, pulled into `2 <= k <= n <= 255`
    pub fn set_parameters(&mut self, k: u32, n: u32) {
        let config = SplitConfig::clamped(k, n);
        self.k = u32::from(*config.threshold());
        self.n = u32::from(*config.share_count());
    }

    /// Current `(k, n)` after clamping
    #[must_use]
    pub fn parameters(&self) -> (u32, u32) {
        (self.k, self.n)
    }

    pub fn set_encoding(&mut self, encoding: Encoding) {
        self.encoding = encoding;
    }

    #[must_use]
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn set_passphrase(&mut self, passphrase: &str) {
        self.passphrase = Zeroizing::new(passphrase.to_string());
    }

    #[must_use]
    pub fn can_split(&self) -> bool {
        self.orchestrator
            .can_submit(split_ready(&self.secret, self.k, self.n))
    }

    #[must_use]
    pub fn state(&self) -> &OperationState<Vec<String>> {
        self.orchestrator.state()
    }

    #[must_use]
    pub fn error(&self) -> Option<&ErrorKind> {
        self.orchestrator.error()
    }

    /// Shares produced by the last successful split
    #[must_use]
    pub fn shares(&self) -> Option<&[String]> {
        self.orchestrator.payload().map(Vec::as_slice)
    }

    /// Enters `Busy` and snapshots the request
    ///
    /// Returns `None`, changing nothing, while a split is running or when the inputs
    /// are not valid.
    pub fn start_split(&mut self) -> Option<SplitRequest> {
        if !split_ready(&self.secret, self.k, self.n) {
            return None;
        }
        let k = u8::try_from(self.k).ok()?;
        let n = u8::try_from(self.n).ok()?;
        if !self.orchestrator.begin() {
            return None;
        }
        Some(SplitRequest {
            secret_b64: text::utf8_to_base64(&self.secret),
            k,
            n,
            encoding: self.encoding,
            passphrase: optional_passphrase(&self.passphrase),
        })
    }

    /// Records the engine's answer to a request from [`SplitForm::start_split`]
    pub fn finish_split(&mut self, result: Result<Vec<String>, EngineError>) {
        match result {
            Ok(shares) => {
                self.orchestrator.succeed(shares, None);
            }
            Err(err) => {
                self.orchestrator.fail(&err, None);
            }
        }
    }

    /// Runs one split attempt against `engine`
    pub async fn split<E: Engine>(&mut self, engine: &E) {
        let Some(request) = self.start_split() else {
            return;
        };
        let result = engine
            .split_secret(
                &request.secret_b64,
                request.k,
                request.n,
                request.encoding,
                request.passphrase.as_deref(),
            )
            .await;
        self.finish_split(result);
    }
}
