//! Share encodings understood by the engine

use std::fmt;
use std::str::FromStr;

use anyhow::{Error, bail};
use serde::{Deserialize, Serialize};

/// Textual representation the engine applies to shares
///
/// The wire names (`mnemo-words`, `mnemo-bip39`, `base58check`, `base64url`) are shared
/// with the engine and with serialized form state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Encoding {
    /// Plain lowercase word list
    #[default]
    #[serde(rename = "mnemo-words")]
    MnemoWords,
    /// BIP39 phrases separated by `/`
    #[serde(rename = "mnemo-bip39")]
    MnemoBip39,
    /// Base58 with checksum
    #[serde(rename = "base58check")]
    Base58Check,
    /// URL-safe base64
    #[serde(rename = "base64url")]
    Base64Url,
}

impl Encoding {
    /// Every encoding, in the order they are offered to the user
    pub const ALL: [Encoding; 4] = [
        Encoding::MnemoWords,
        Encoding::MnemoBip39,
        Encoding::Base58Check,
        Encoding::Base64Url,
    ];

    /// Wire name of this encoding
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Encoding::MnemoWords => "mnemo-words",
            Encoding::MnemoBip39 => "mnemo-bip39",
            Encoding::Base58Check => "base58check",
            Encoding::Base64Url => "base64url",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Encoding::ALL.into_iter().find(|e| e.as_str() == s) {
            Some(encoding) => Ok(encoding),
            None => bail!("unknown encoding: {s}"),
        }
    }
}
