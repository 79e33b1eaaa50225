//! Domain types for the share-collection protocol
//!
//! This module contains validated newtypes and configuration shared by the split and
//! combine flows:
//! - [`Encoding`] - Textual representation applied to shares by the engine
//! - [`Threshold`] - Minimum shares required for reconstruction (2..=255)
//! - [`ShareCount`] - Total number of shares to create (2..=255)
//! - [`SplitConfig`] - Validated threshold and share count pair

mod config;
mod encoding;
mod share_count;
mod threshold;

pub use config::SplitConfig;
pub use encoding::Encoding;
pub use share_count::ShareCount;
pub use threshold::Threshold;
