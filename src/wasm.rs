//! WASM bindings for the web form
//!
//! The web front-end keeps its own engine module. These bindings give it the same
//! classification, parsing and error mapping the other front-ends use, plus the split
//! and combine forms themselves, so box growth, probe reconciliation, error attribution
//! and the busy guard run the same code as everywhere else. Results are returned as
//! JSON strings.
//!
//! The forms never call the engine. A host calls `paste`/`start_combine`/`start_split`,
//! runs the engine call the returned JSON describes, and reports back through
//! `finish_probe`/`finish_combine`/`finish_split`.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::classify::classify;
use crate::collection::BoxId;
use crate::config::ClientConfig;
use crate::domain::{Encoding, Threshold};
use crate::error::{EngineError, ErrorKind, translate};
use crate::form::{CombineForm, SplitForm};
use crate::orchestrator::OperationState;
use crate::parse::parse_shares;
use crate::probe::{ProbeStart, ProbeTicket};

/// Initialize panic hook for better error messages in the browser console
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Use wee_alloc as the global allocator for smaller WASM binary size
#[cfg(target_arch = "wasm32")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Translated engine error (for JSON serialization)
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranslatedError {
    /// One of `not-enough-shares`, `passphrase-required`, `integrity-failed`,
    /// `inconsistent-share-set`, `decrypt-failed`, `unrecognized`
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub need: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub got: Option<u32>,
    /// Display text; the raw engine message for unrecognized errors
    pub message: String,
}

impl From<ErrorKind> for TranslatedError {
    fn from(kind: ErrorKind) -> Self {
        let (tag, need, got) = match &kind {
            ErrorKind::NotEnoughShares { need, got } => ("not-enough-shares", Some(*need), Some(*got)),
            ErrorKind::PassphraseRequired => ("passphrase-required", None, None),
            ErrorKind::IntegrityFailed => ("integrity-failed", None, None),
            ErrorKind::InconsistentShareSet => ("inconsistent-share-set", None, None),
            ErrorKind::DecryptFailed => ("decrypt-failed", None, None),
            ErrorKind::Unrecognized(_) => ("unrecognized", None, None),
        };
        Self {
            kind: tag.to_string(),
            need,
            got,
            message: kind.to_string(),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization failed: {e}")))
}

fn parse_encoding(name: &str) -> Result<Encoding, JsValue> {
    name.parse()
        .map_err(|e: anyhow::Error| JsValue::from_str(&e.to_string()))
}

fn parse_config(config_json: &str) -> Result<ClientConfig, JsValue> {
    if config_json.trim().is_empty() {
        return Ok(ClientConfig::default());
    }
    serde_json::from_str(config_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid config: {e}")))
}

fn status<T>(state: &OperationState<T>) -> &'static str {
    match state {
        OperationState::Idle => "idle",
        OperationState::Busy => "busy",
        OperationState::Succeeded(_) => "succeeded",
        OperationState::Failed { .. } => "failed",
    }
}

/// Share the host should hand to the engine's `inspect_share`
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProbeRequest {
    pub generation: u64,
    pub share: String,
    pub encoding: Encoding,
}

/// Outcome of a paste or scan
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PasteResult {
    /// Encoding the selector switched to, if any
    pub switched_to: Option<Encoding>,
    pub probe: Option<ProbeRequest>,
}

impl From<&ProbeStart> for PasteResult {
    fn from(start: &ProbeStart) -> Self {
        Self {
            switched_to: start.switched_to,
            probe: start.ticket.as_ref().map(|ticket| ProbeRequest {
                generation: ticket.generation(),
                share: ticket.share().to_string(),
                encoding: ticket.encoding(),
            }),
        }
    }
}

/// One share box as the web form renders it
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoxView {
    /// Stable key for rendering
    pub id: String,
    pub text: String,
    pub shares: usize,
    pub invalid: bool,
    pub flashing: bool,
}

/// Render state of a combine form
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CombineView {
    pub boxes: Vec<BoxView>,
    pub encoding: Encoding,
    pub encoding_flashing: bool,
    pub status: String,
    pub can_combine: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<TranslatedError>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub secret: Option<String>,
    pub scans_added: usize,
}

/// Render state of a split form
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SplitView {
    pub k: u32,
    pub n: u32,
    pub encoding: Encoding,
    pub status: String,
    pub can_split: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<TranslatedError>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub shares: Option<Vec<String>>,
}

/// Combine form driven from JavaScript
///
/// Boxes are addressed by their display index.
///
/// # Example (JavaScript)
/// ```javascript
/// const form = new WasmCombineForm("");
/// const pasted = JSON.parse(form.paste(0, text));
/// if (pasted.probe) {
///     const k = await inspectShare(pasted.probe.share, pasted.probe.encoding).then(i => i.k, () => undefined);
///     form.finish_probe(pasted.probe.generation, k);
/// }
/// const request = form.start_combine();
/// if (request) {
///     const { shares, encoding, passphrase } = JSON.parse(request);
///     combineShares(shares, encoding, passphrase).then(
///         b64 => form.finish_combine(true, b64),
///         err => form.finish_combine(false, String(err)),
///     ).finally(() => render(JSON.parse(form.view())));
/// }
/// ```
#[wasm_bindgen]
pub struct WasmCombineForm {
    form: CombineForm,
    pending: Option<ProbeTicket>,
}

impl WasmCombineForm {
    fn box_at(&self, index: usize) -> Option<BoxId> {
        self.form.collection().boxes().get(index).map(|b| b.id())
    }

    fn track(&mut self, start: &ProbeStart) -> Result<String, JsValue> {
        if let Some(ticket) = &start.ticket {
            self.pending = Some(ticket.clone());
        }
        to_json(&PasteResult::from(start))
    }
}

#[wasm_bindgen]
impl WasmCombineForm {
    /// Creates a form from a JSON `ClientConfig`; an empty string uses the defaults
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WasmCombineForm, JsValue> {
        Ok(Self {
            form: CombineForm::new(parse_config(config_json)?),
            pending: None,
        })
    }

    /// Ordinary typing into a box; returns `false` for an unknown index
    pub fn set_box_text(&mut self, index: usize, text: &str) -> bool {
        match self.box_at(index) {
            Some(id) => self.form.set_box_text(id, text),
            None => false,
        }
    }

    /// Appends an empty box and returns its index
    pub fn add_box(&mut self) -> usize {
        self.form.add_box();
        self.form.collection().len() - 1
    }

    pub fn remove_box(&mut self, index: usize) -> bool {
        match self.box_at(index) {
            Some(id) => self.form.remove_box(id),
            None => false,
        }
    }

    pub fn set_encoding(&mut self, encoding: &str) -> Result<(), JsValue> {
        self.form.set_encoding(parse_encoding(encoding)?);
        Ok(())
    }

    pub fn set_passphrase(&mut self, passphrase: &str) {
        self.form.set_passphrase(passphrase);
    }

    pub fn clear_highlights(&mut self) {
        self.form.clear_highlights();
    }

    /// Classifies all boxes; returns the detected wire name, if any
    pub fn auto_detect(&mut self) -> Option<String> {
        self.form.auto_detect().map(|e| e.as_str().to_string())
    }

    /// Pastes into a box and returns a JSON `PasteResult`
    pub fn paste(&mut self, index: usize, text: &str) -> Result<String, JsValue> {
        let Some(id) = self.box_at(index) else {
            return Err(JsValue::from_str(&format!("no share box at index {index}")));
        };
        let start = self.form.paste(id, text);
        self.track(&start)
    }

    /// Opens a scanning session
    pub fn begin_scan(&mut self) {
        self.form.begin_scan();
    }

    /// Imports a scanned value; `None` when this session already saw it
    pub fn scan(&mut self, value: &str) -> Result<Option<String>, JsValue> {
        match self.form.scan(value) {
            Some(start) => self.track(&start).map(Some),
            None => Ok(None),
        }
    }

    /// Applies the engine's answer to a probe
    ///
    /// `k` is `undefined` when the lookup failed. Returns the number of boxes added;
    /// answers for anything but the latest probe add nothing.
    pub fn finish_probe(&mut self, generation: u32, k: Option<u32>) -> usize {
        let generation = u64::from(generation);
        let Some(ticket) = self.pending.take_if(|t| t.generation() == generation) else {
            return 0;
        };
        self.form
            .finish_probe(&ticket, k.and_then(Threshold::from_hint))
            .len()
    }

    pub fn can_combine(&self) -> bool {
        self.form.can_combine()
    }

    /// Enters `Busy` and returns the JSON `CombineRequest`, or `None` when refused
    pub fn start_combine(&mut self) -> Result<Option<String>, JsValue> {
        self.form
            .start_combine()
            .map(|request| to_json(&request))
            .transpose()
    }

    /// Reports the engine's answer: the base64 secret, or the error message
    pub fn finish_combine(&mut self, ok: bool, payload_or_message: &str) {
        let result = if ok {
            Ok(payload_or_message.to_string())
        } else {
            Err(EngineError::new(payload_or_message))
        };
        self.form.finish_combine(result);
    }

    /// JSON `CombineView` of the whole form
    pub fn view(&self) -> Result<String, JsValue> {
        let collection = self.form.collection();
        let boxes = collection
            .boxes()
            .iter()
            .map(|b| BoxView {
                id: b.id().to_string(),
                text: b.raw_text().to_string(),
                shares: b.shares().len(),
                invalid: collection.is_invalid(b.id()),
                flashing: collection.is_flashing(b.id()),
            })
            .collect();
        to_json(&CombineView {
            boxes,
            encoding: self.form.encoding(),
            encoding_flashing: self.form.encoding_flashing(),
            status: status(self.form.state()).to_string(),
            can_combine: self.form.can_combine(),
            error: self.form.error().cloned().map(TranslatedError::from),
            secret: self.form.secret_text(),
            scans_added: self.form.scans_added(),
        })
    }
}

/// Split form driven from JavaScript
#[wasm_bindgen]
pub struct WasmSplitForm {
    form: SplitForm,
}

#[wasm_bindgen]
impl WasmSplitForm {
    /// Creates a form from a JSON `ClientConfig`; an empty string uses the defaults
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WasmSplitForm, JsValue> {
        Ok(Self {
            form: SplitForm::new(&parse_config(config_json)?),
        })
    }

    pub fn set_secret(&mut self, secret: &str) {
        self.form.set_secret(secret);
    }

    /// Stores K and N after clamping them into range
    pub fn set_parameters(&mut self, k: u32, n: u32) {
        self.form.set_parameters(k, n);
    }

    pub fn set_encoding(&mut self, encoding: &str) -> Result<(), JsValue> {
        self.form.set_encoding(parse_encoding(encoding)?);
        Ok(())
    }

    pub fn set_passphrase(&mut self, passphrase: &str) {
        self.form.set_passphrase(passphrase);
    }

    pub fn can_split(&self) -> bool {
        self.form.can_split()
    }

    /// Enters `Busy` and returns the JSON `SplitRequest`, or `None` when refused
    pub fn start_split(&mut self) -> Result<Option<String>, JsValue> {
        self.form
            .start_split()
            .map(|request| to_json(&request))
            .transpose()
    }

    /// Reports the engine's answer: a JSON array of shares, or the error message
    pub fn finish_split(&mut self, ok: bool, payload_or_message: &str) {
        let result = if ok {
            serde_json::from_str::<Vec<String>>(payload_or_message)
                .map_err(|e| EngineError::new(format!("invalid share list: {e}")))
        } else {
            Err(EngineError::new(payload_or_message))
        };
        self.form.finish_split(result);
    }

    /// JSON `SplitView` of the whole form
    pub fn view(&self) -> Result<String, JsValue> {
        let (k, n) = self.form.parameters();
        to_json(&SplitView {
            k,
            n,
            encoding: self.form.encoding(),
            status: status(self.form.state()).to_string(),
            can_split: self.form.can_split(),
            error: self.form.error().cloned().map(TranslatedError::from),
            shares: self.form.shares().map(<[String]>::to_vec),
        })
    }
}

/// Guess the encoding of pasted share text
///
/// # Returns
/// JSON string: the encoding's wire name, or `null` when unknown
///
/// # Example (JavaScript)
/// ```javascript
/// const encoding = JSON.parse(wasm_detect_encoding(textarea.value));
/// if (encoding !== null) select.value = encoding;
/// ```
#[wasm_bindgen]
pub fn wasm_detect_encoding(text: &str) -> Result<String, JsValue> {
    to_json(&classify(text))
}

/// Split a box's text into shares on blank lines
///
/// # Returns
/// JSON array of share strings
#[wasm_bindgen]
pub fn wasm_parse_shares(text: &str) -> Result<String, JsValue> {
    to_json(&parse_shares(text))
}

/// Map an engine error message to a structured error
///
/// # Example (JavaScript)
/// ```javascript
/// try { combine_shares(shares, encoding) } catch (e) {
///     const err = JSON.parse(wasm_translate_error(String(e)));
///     if (err.kind === "not-enough-shares") highlightEmptyBoxes(err.need - err.got);
/// }
/// ```
#[wasm_bindgen]
pub fn wasm_translate_error(message: &str) -> Result<String, JsValue> {
    to_json(&TranslatedError::from(translate(message)))
}

/// Wire names of every encoding, in selector order
#[wasm_bindgen]
pub fn wasm_supported_encodings() -> Result<String, JsValue> {
    to_json(&Encoding::ALL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wasm_detect_encoding() {
        assert_eq!(wasm_detect_encoding("a/b").unwrap(), "\"mnemo-bip39\"");
        assert_eq!(wasm_detect_encoding("  ").unwrap(), "null");
    }

    #[test]
    fn test_wasm_parse_shares() {
        let json = wasm_parse_shares("one\n\n two \n\n").unwrap();
        let shares: Vec<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(shares, vec!["one", "two"]);
    }

    #[test]
    fn test_wasm_translate_error_not_enough_shares() {
        let json = wasm_translate_error("need at least k shares: need 3, got 2").unwrap();
        let err: TranslatedError = serde_json::from_str(&json).unwrap();
        assert_eq!(err.kind, "not-enough-shares");
        assert_eq!(err.need, Some(3));
        assert_eq!(err.got, Some(2));
    }

    #[test]
    fn test_wasm_translate_error_keeps_raw_message() {
        let json = wasm_translate_error("engine exploded").unwrap();
        let err: TranslatedError = serde_json::from_str(&json).unwrap();
        assert_eq!(err.kind, "unrecognized");
        assert_eq!(err.message, "engine exploded");
        assert!(!json.contains("need"));
    }

    #[test]
    fn test_wasm_supported_encodings() {
        let json = wasm_supported_encodings().unwrap();
        assert_eq!(
            json,
            r#"["mnemo-words","mnemo-bip39","base58check","base64url"]"#
        );
    }

    const WORDS: &str = "apple bread crane delta eagle frost";

    fn combine_view(form: &WasmCombineForm) -> CombineView {
        serde_json::from_str(&form.view().unwrap()).unwrap()
    }

    fn paste(form: &mut WasmCombineForm, index: usize, text: &str) -> PasteResult {
        serde_json::from_str(&form.paste(index, text).unwrap()).unwrap()
    }

    #[test]
    fn test_combine_form_grows_from_probe_answer() {
        let mut form = WasmCombineForm::new("").unwrap();
        let pasted = paste(&mut form, 0, WORDS);
        let request = pasted.probe.unwrap();
        assert_eq!(request.share, WORDS);
        assert_eq!(request.encoding, Encoding::MnemoWords);

        let generation = u32::try_from(request.generation).unwrap();
        assert_eq!(form.finish_probe(generation, Some(4)), 2);

        let view = combine_view(&form);
        assert_eq!(view.boxes.len(), 4);
        assert_eq!(view.boxes[0].shares, 1);
        assert!(view.boxes[2].flashing && view.boxes[3].flashing);
        assert_eq!(view.status, "idle");
        assert!(view.can_combine);
    }

    #[test]
    fn test_combine_form_ignores_late_probe_answers() {
        let mut form = WasmCombineForm::new("").unwrap();
        let older = paste(&mut form, 0, WORDS).probe.unwrap().generation;
        let newer = paste(&mut form, 1, "grape honey igloo jelly kiwi lemon")
            .probe
            .unwrap()
            .generation;

        assert_eq!(form.finish_probe(u32::try_from(older).unwrap(), Some(6)), 0);
        assert_eq!(form.finish_probe(u32::try_from(newer).unwrap(), Some(3)), 1);
        assert_eq!(form.finish_probe(u32::try_from(newer).unwrap(), Some(5)), 0);
        assert_eq!(combine_view(&form).boxes.len(), 3);
    }

    #[test]
    fn test_combine_form_busy_guard_and_attribution() {
        let mut form = WasmCombineForm::new("").unwrap();
        assert_eq!(form.add_box(), 2);
        assert!(form.set_box_text(0, WORDS));
        assert!(!form.set_box_text(9, WORDS));

        let request: serde_json::Value =
            serde_json::from_str(&form.start_combine().unwrap().unwrap()).unwrap();
        assert_eq!(request["shares"][0], WORDS);
        assert_eq!(request["encoding"], "mnemo-words");
        assert_eq!(form.start_combine().unwrap(), None);
        assert_eq!(combine_view(&form).status, "busy");

        form.finish_combine(false, "need 3 shares, got 1");
        let view = combine_view(&form);
        assert_eq!(view.status, "failed");
        let error = view.error.unwrap();
        assert_eq!(error.kind, "not-enough-shares");
        assert_eq!((error.need, error.got), (Some(3), Some(1)));
        let flags: Vec<bool> = view.boxes.iter().map(|b| b.invalid).collect();
        assert_eq!(flags, vec![false, true, true]);
        assert_eq!(view.boxes[0].text, WORDS);

        form.start_combine().unwrap().unwrap();
        form.finish_combine(true, "c2VjcmV0");
        let view = combine_view(&form);
        assert_eq!(view.secret.as_deref(), Some("secret"));
        assert!(view.boxes.iter().all(|b| !b.invalid));
    }

    #[test]
    fn test_combine_form_scan_session() {
        let mut form = WasmCombineForm::new(r#"{"reduced_motion":true}"#).unwrap();
        form.begin_scan();
        assert!(form.scan(WORDS).unwrap().is_some());
        assert_eq!(form.scan(WORDS).unwrap(), None);

        let view = combine_view(&form);
        assert_eq!(view.scans_added, 1);
        assert_eq!(view.boxes.len(), 2);
        assert!(!view.encoding_flashing);
    }

    #[test]
    fn test_split_form_round_trip() {
        let mut form = WasmSplitForm::new("").unwrap();
        form.set_parameters(5, 3);
        form.set_secret("hello safeparts");
        assert!(form.can_split());

        let request: serde_json::Value =
            serde_json::from_str(&form.start_split().unwrap().unwrap()).unwrap();
        assert_eq!(request["secret_b64"], "aGVsbG8gc2FmZXBhcnRz");
        assert_eq!((request["k"].as_u64(), request["n"].as_u64()), (Some(3), Some(3)));
        assert_eq!(form.start_split().unwrap(), None);

        form.finish_split(true, r#"["one","two","three"]"#);
        let view: SplitView = serde_json::from_str(&form.view().unwrap()).unwrap();
        assert_eq!(view.status, "succeeded");
        assert_eq!((view.k, view.n), (3, 3));
        assert_eq!(view.shares.unwrap(), vec!["one", "two", "three"]);
    }

    #[test]
    fn test_split_form_reports_engine_failure() {
        let mut form = WasmSplitForm::new("").unwrap();
        form.set_secret("s");
        form.start_split().unwrap().unwrap();
        form.finish_split(false, "passphrase required");

        let view: SplitView = serde_json::from_str(&form.view().unwrap()).unwrap();
        assert_eq!(view.error.unwrap().kind, "passphrase-required");
        assert!(view.shares.is_none());
    }
}
