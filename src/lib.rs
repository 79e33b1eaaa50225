//! Client-side protocol for collecting and classifying secret shares
//!
//! The secret-sharing engine itself sits behind [`engine::Engine`]; this crate holds the
//! logic every front-end shares: guessing share encodings, splitting pasted text into
//! shares, growing the share boxes to the threshold found in a share, and mapping
//! engine failures back onto the boxes the user has to fix.

pub mod classify;
#[cfg(feature = "cli")]
pub mod cli;
pub mod collection;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod form;
pub mod orchestrator;
pub mod parse;
pub mod probe;
pub mod text;
pub mod wasm;

pub use classify::classify;
pub use collection::{BoxId, ShareBox, ShareCollection};
pub use config::ClientConfig;
pub use domain::Encoding;
pub use engine::{Engine, LocalEngine, ShareInfo};
pub use error::{EngineError, ErrorKind, translate};
pub use form::{CombineForm, SplitForm};
pub use orchestrator::{OperationState, Orchestrator};
pub use parse::parse_shares;
pub use probe::{ProbeTicket, ThresholdProbe};
