//! `ShareCount` newtype for Shamir Secret Sharing

use anyhow::{Result, bail};

/// Number of shares to create (2..=255)
///
/// A split always yields at least as many shares as its threshold, and the
/// smallest threshold is 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ShareCount(u8);

impl ShareCount {
    /// Minimum valid share count
    pub const MIN: u8 = 2;

    /// Maximum valid share count
    pub const MAX: u8 = u8::MAX;

    /// Creates a new share count
    ///
    /// # Errors
    /// Returns an error if count is below 2
    ///
    /// # Examples
    ///
    /// ```rust
    /// use safeparts_client::domain::ShareCount;
    ///
    /// let count = ShareCount::new(5).unwrap();
    /// assert_eq!(*count, 5);
    ///
    /// let max_count = ShareCount::new(ShareCount::MAX).unwrap();
    /// assert_eq!(*max_count, 255);
    ///
    /// assert!(ShareCount::new(0).is_err());
    /// assert!(ShareCount::new(1).is_err());
    /// ```
    pub fn new(value: u8) -> Result<Self> {
        if value < Self::MIN {
            bail!("Share count must be at least {} (got {value})", Self::MIN);
        }
        Ok(Self(value))
    }

    /// Raises values below [`ShareCount::MIN`] to it
    pub(crate) fn saturating(value: u8) -> Self {
        Self(value.max(Self::MIN))
    }
}

impl std::ops::Deref for ShareCount {
    type Target = u8;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
