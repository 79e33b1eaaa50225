//! Growing the share boxes to the threshold recorded in a pasted share
//!
//! A paste into any box starts a probe. The probe reclassifies the first non-blank box,
//! then asks the engine for the threshold K of that box's first share and grows the
//! collection to K boxes. The engine call is asynchronous, so a probe is split in
//! three steps that a host can interleave with other edits:
//!
//! 1. [`ThresholdProbe::begin`] classifies and issues a [`ProbeTicket`]
//! 2. [`ThresholdProbe::inspect`] awaits the engine
//! 3. [`ThresholdProbe::resolve`] applies the result
//!
//! Every ticket carries a generation number. Only the ticket of the most recent probe
//! may change the collection; older ones are dropped on resolution. Growth itself is
//! count based, so boxes the user added or removed meanwhile are taken into account.
//!
//! Probing is best effort. An engine without `inspect_share`, a failed lookup or an
//! implausible threshold ends the probe quietly.

use tracing::debug;

use crate::classify::classify;
use crate::collection::{BoxId, ShareCollection};
use crate::domain::{Encoding, Threshold};
use crate::engine::Engine;

/// Handle for one in-flight probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTicket {
    generation: u64,
    source: BoxId,
    share: String,
    encoding: Encoding,
}

impl ProbeTicket {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Share text to hand to the engine
    #[must_use]
    pub fn share(&self) -> &str {
        &self.share
    }

    /// Box the probed share was taken from
    #[must_use]
    pub fn source(&self) -> BoxId {
        self.source
    }

    /// Encoding the share will be inspected under
    #[must_use]
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }
}

/// Synchronous part of a probe
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeStart {
    /// Set when classification switched the selected encoding
    pub switched_to: Option<Encoding>,
    /// Present when there is a share to inspect
    pub ticket: Option<ProbeTicket>,
}

/// Generation counter shared by all probes of one combine form
#[derive(Debug, Clone, Default)]
pub struct ThresholdProbe {
    generation: u64,
}

impl ThresholdProbe {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation of the most recently issued ticket
    #[must_use]
    pub fn latest(&self) -> u64 {
        self.generation
    }

    /// Reclassifies the first non-blank box and prepares a threshold lookup
    ///
    /// `selected` is switched when the classifier finds a different concrete encoding.
    /// Any ticket issued earlier becomes stale.
    pub fn begin(&mut self, collection: &ShareCollection, selected: &mut Encoding) -> ProbeStart {
        let Some(share_box) = collection.first_non_empty() else {
            return ProbeStart::default();
        };

        let mut start = ProbeStart::default();
        match classify(share_box.raw_text()) {
            Some(detected) if detected != *selected => {
                debug!(from = %selected, to = %detected, "switched share encoding");
                *selected = detected;
                start.switched_to = Some(detected);
            }
            _ => {}
        }

        let Some(share) = share_box.shares().into_iter().next() else {
            return start;
        };

        self.generation += 1;
        debug!(generation = self.generation, source = %share_box.id(), "started threshold probe");
        start.ticket = Some(ProbeTicket {
            generation: self.generation,
            source: share_box.id(),
            share,
            encoding: *selected,
        });
        start
    }

    /// Asks the engine for the threshold of the ticket's share
    ///
    /// Returns `None` instead of an error whenever no usable threshold comes back.
    pub async fn inspect<E: Engine>(engine: &E, ticket: &ProbeTicket) -> Option<Threshold> {
        match engine.inspect_share(&ticket.share, ticket.encoding).await {
            Ok(info) => {
                let threshold = Threshold::from_hint(u32::from(info.k));
                if threshold.is_none() {
                    debug!(generation = ticket.generation, k = info.k, "ignoring implausible threshold");
                }
                threshold
            }
            Err(err) => {
                debug!(generation = ticket.generation, %err, "threshold probe failed");
                None
            }
        }
    }

    /// Applies a finished probe to the current collection
    ///
    /// Returns the ids of the boxes added. Nothing changes when the ticket is stale, no
    /// threshold was found, or the collection already has enough boxes.
    pub fn resolve(
        &self,
        ticket: &ProbeTicket,
        threshold: Option<Threshold>,
        collection: &mut ShareCollection,
        flash: bool,
    ) -> Vec<BoxId> {
        if ticket.generation != self.generation {
            debug!(
                generation = ticket.generation,
                latest = self.generation,
                "discarding stale threshold probe"
            );
            return Vec::new();
        }
        match threshold {
            Some(k) => collection.grow_to(usize::from(*k), flash),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;
    use crate::engine::ShareInfo;
    use crate::error::EngineError;

    /// Engine stub that only answers `inspect_share`
    struct FixedThreshold(Result<u8, &'static str>);

    impl Engine for FixedThreshold {
        fn supported_encodings(&self) -> Vec<Encoding> {
            Encoding::ALL.to_vec()
        }

        async fn split_secret(
            &self,
            _secret_b64: &str,
            _k: u8,
            _n: u8,
            _encoding: Encoding,
            _passphrase: Option<&str>,
        ) -> Result<Vec<String>, EngineError> {
            Err(EngineError::new("not used"))
        }

        async fn combine_shares(
            &self,
            _shares: &[String],
            _encoding: Encoding,
            _passphrase: Option<&str>,
        ) -> Result<String, EngineError> {
            Err(EngineError::new("not used"))
        }

        async fn inspect_share(
            &self,
            _share: &str,
            _encoding: Encoding,
        ) -> Result<ShareInfo, EngineError> {
            self.0.map(|k| ShareInfo { k }).map_err(EngineError::new)
        }
    }

    /// Engine stub that keeps the default `inspect_share`
    struct SplitCombineOnly;

    impl Engine for SplitCombineOnly {
        fn supported_encodings(&self) -> Vec<Encoding> {
            vec![Encoding::MnemoWords]
        }

        async fn split_secret(
            &self,
            _secret_b64: &str,
            _k: u8,
            _n: u8,
            _encoding: Encoding,
            _passphrase: Option<&str>,
        ) -> Result<Vec<String>, EngineError> {
            Err(EngineError::new("not used"))
        }

        async fn combine_shares(
            &self,
            _shares: &[String],
            _encoding: Encoding,
            _passphrase: Option<&str>,
        ) -> Result<String, EngineError> {
            Err(EngineError::new("not used"))
        }
    }

    const WORDS: &str = "apple bread crane delta eagle frost";

    fn filled_collection() -> ShareCollection {
        let mut collection = ShareCollection::new();
        let first = collection.boxes()[0].id();
        collection.set_box_text(first, WORDS);
        collection
    }

    #[test]
    fn test_begin_on_blank_collection_is_noop() {
        let mut probe = ThresholdProbe::new();
        let mut encoding = Encoding::Base64Url;
        let start = probe.begin(&ShareCollection::new(), &mut encoding);
        assert_eq!(start, ProbeStart::default());
        assert_eq!(encoding, Encoding::Base64Url);
        assert_eq!(probe.latest(), 0);
    }

    #[test]
    fn test_begin_switches_encoding() {
        let mut probe = ThresholdProbe::new();
        let mut encoding = Encoding::Base64Url;
        let start = probe.begin(&filled_collection(), &mut encoding);
        assert_eq!(start.switched_to, Some(Encoding::MnemoWords));
        assert_eq!(encoding, Encoding::MnemoWords);
        let ticket = start.ticket.unwrap();
        assert_eq!(ticket.encoding(), Encoding::MnemoWords);
        assert_eq!(ticket.generation(), 1);
    }

    #[test]
    fn test_unknown_text_keeps_encoding() {
        let mut collection = ShareCollection::new();
        let second = collection.boxes()[1].id();
        collection.set_box_text(second, "??");

        let mut probe = ThresholdProbe::new();
        let mut encoding = Encoding::Base58Check;
        let start = probe.begin(&collection, &mut encoding);
        assert_eq!(start.switched_to, None);
        assert_eq!(encoding, Encoding::Base58Check);
        assert_eq!(start.ticket.unwrap().source(), second);
    }

    #[test]
    fn test_probe_grows_to_threshold() {
        let mut collection = filled_collection();
        let mut probe = ThresholdProbe::new();
        let mut encoding = Encoding::MnemoWords;
        let ticket = probe.begin(&collection, &mut encoding).ticket.unwrap();

        let k = block_on(ThresholdProbe::inspect(&FixedThreshold(Ok(4)), &ticket));
        let added = probe.resolve(&ticket, k, &mut collection, true);
        assert_eq!(added.len(), 2);
        assert_eq!(collection.len(), 4);
        assert!(added.iter().all(|id| collection.is_flashing(*id)));
    }

    #[test]
    fn test_failures_and_implausible_values_are_silent() {
        let collection = filled_collection();
        let mut probe = ThresholdProbe::new();
        let mut encoding = Encoding::MnemoWords;
        let ticket = probe.begin(&collection, &mut encoding).ticket.unwrap();

        assert_eq!(block_on(ThresholdProbe::inspect(&FixedThreshold(Err("boom")), &ticket)), None);
        assert_eq!(block_on(ThresholdProbe::inspect(&FixedThreshold(Ok(1)), &ticket)), None);
        assert_eq!(block_on(ThresholdProbe::inspect(&FixedThreshold(Ok(0)), &ticket)), None);
    }

    #[test]
    fn test_overriding_inspect_share_is_enough_to_grow() {
        let mut collection = filled_collection();
        let mut probe = ThresholdProbe::new();
        let mut encoding = Encoding::MnemoWords;
        let ticket = probe.begin(&collection, &mut encoding).ticket.unwrap();

        let k = block_on(ThresholdProbe::inspect(&FixedThreshold(Ok(3)), &ticket));
        assert_eq!(k.map(|k| *k), Some(3));
        assert_eq!(probe.resolve(&ticket, k, &mut collection, false).len(), 1);
    }

    #[test]
    fn test_engine_without_inspect_share_is_silent() {
        let mut collection = filled_collection();
        let mut probe = ThresholdProbe::new();
        let mut encoding = Encoding::MnemoWords;
        let ticket = probe.begin(&collection, &mut encoding).ticket.unwrap();

        let k = block_on(ThresholdProbe::inspect(&SplitCombineOnly, &ticket));
        assert_eq!(k, None);
        assert!(probe.resolve(&ticket, k, &mut collection, true).is_empty());
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let mut collection = filled_collection();
        let mut probe = ThresholdProbe::new();
        let mut encoding = Encoding::MnemoWords;

        let stale = probe.begin(&collection, &mut encoding).ticket.unwrap();
        let fresh = probe.begin(&collection, &mut encoding).ticket.unwrap();

        assert!(probe.resolve(&stale, Threshold::from_hint(6), &mut collection, true).is_empty());
        assert_eq!(collection.len(), 2);

        probe.resolve(&fresh, Threshold::from_hint(3), &mut collection, true);
        assert_eq!(collection.len(), 3);
    }

    #[test]
    fn test_growth_counts_boxes_added_meanwhile() {
        let mut collection = filled_collection();
        let mut probe = ThresholdProbe::new();
        let mut encoding = Encoding::MnemoWords;
        let ticket = probe.begin(&collection, &mut encoding).ticket.unwrap();

        collection.add_box();
        collection.add_box();
        assert!(probe.resolve(&ticket, Threshold::from_hint(4), &mut collection, true).is_empty());
        assert_eq!(collection.len(), 4);
    }
}
