//! Contract of the external secret-sharing engine
//!
//! The splitting mathematics, share encodings and passphrase encryption all live behind
//! [`Engine`]. A host picks exactly one adapter at startup (native module, WASM module,
//! or the in-process [`local::LocalEngine`]) and hands it to the forms; nothing in the
//! protocol core branches on which adapter it got.

pub mod codec;
pub mod local;

use serde::{Deserialize, Serialize};

use crate::domain::Encoding;
use crate::error::EngineError;

pub use local::LocalEngine;

/// Metadata the engine can read from a single share
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareInfo {
    /// Shares required to reconstruct, as recorded in the share
    pub k: u8,
}

/// Asynchronous secret-sharing engine
///
/// Calls are awaited without timeout or retry. Failures carry the engine's raw message,
/// which [`crate::error::translate`] turns into something the user can act on.
#[allow(async_fn_in_trait)]
pub trait Engine {
    /// Encodings this engine can produce and read
    fn supported_encodings(&self) -> Vec<Encoding>;

    /// Splits a base64 secret into `n` shares, any `k` of which recover it
    async fn split_secret(
        &self,
        secret_b64: &str,
        k: u8,
        n: u8,
        encoding: Encoding,
        passphrase: Option<&str>,
    ) -> Result<Vec<String>, EngineError>;

    /// Recovers the base64 secret from a set of shares
    async fn combine_shares(
        &self,
        shares: &[String],
        encoding: Encoding,
        passphrase: Option<&str>,
    ) -> Result<String, EngineError>;

    /// Reads the threshold recorded in one share
    ///
    /// Optional capability; engines without it keep this default, and callers treat
    /// the error like any other failed lookup.
    async fn inspect_share(
        &self,
        share: &str,
        encoding: Encoding,
    ) -> Result<ShareInfo, EngineError> {
        let _ = (share, encoding);
        Err(EngineError::new("inspect_share is not supported by this engine"))
    }
}
