//! Client configuration passed explicitly into forms
//!
//! Hosts (mobile screens, web forms, the CLI) build one [`ClientConfig`] at startup and
//! thread it through the forms they create. It can be supplied as JSON.

use serde::{Deserialize, Serialize};

use crate::domain::Encoding;

/// Languages written right to left
const RTL_LANGUAGES: [&str; 4] = ["ar", "fa", "he", "ur"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// BCP-47 language tag, e.g. `en` or `ar-EG`
    pub locale: String,
    /// Encoding selected when a form opens
    pub default_encoding: Encoding,
    /// Suppresses transient highlights of new boxes and encoding switches
    pub reduced_motion: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            locale: "en".to_string(),
            default_encoding: Encoding::default(),
            reduced_motion: false,
        }
    }
}

impl ClientConfig {
    /// Whether the locale's script runs right to left
    #[must_use]
    pub fn is_rtl(&self) -> bool {
        let language = self
            .locale
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        RTL_LANGUAGES.contains(&language.as_str())
    }

    /// Whether newly added boxes and switched encodings should flash
    #[must_use]
    pub fn highlights(&self) -> bool {
        !self.reduced_motion
    }
}
