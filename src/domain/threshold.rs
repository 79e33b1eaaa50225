//! Threshold newtype for Shamir Secret Sharing

use anyhow::Result;

/// Threshold for Shamir Secret Sharing (2..=255)
///
/// Invariant: threshold >= 2 (enforced at construction)
/// A threshold of 1 lets any single share recover the whole secret, so the engine never
/// produces one. A value below 2 reported for an existing share is treated as implausible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Threshold(u8);

impl Threshold {
    /// Smallest meaningful threshold
    pub const MIN: u8 = 2;

    /// Creates a new threshold, returning an error if value < 2
    ///
    /// # Errors
    /// Returns an error if the threshold is less than 2
    ///
    /// # Examples
    ///
    /// ```rust
    /// use safeparts_client::domain::Threshold;
    ///
    /// let threshold = Threshold::new(3).unwrap();
    /// assert_eq!(*threshold, 3);
    ///
    /// assert!(Threshold::new(1).is_err());
    /// assert!(Threshold::new(0).is_err());
    /// ```
    pub fn new(value: u8) -> Result<Self> {
        if value < Self::MIN {
            anyhow::bail!("Threshold must be at least 2 (got {value})");
        }
        Ok(Self(value))
    }

    /// Raises values below [`Threshold::MIN`] to it
    pub(crate) fn saturating(value: u8) -> Self {
        Self(value.max(Self::MIN))
    }

    /// Interprets an engine-reported threshold, discarding implausible values
    ///
    /// Returns `None` for anything outside 2..=255.
    #[must_use]
    pub fn from_hint(value: u32) -> Option<Self> {
        u8::try_from(value).ok().and_then(|k| Self::new(k).ok())
    }
}

impl std::ops::Deref for Threshold {
    type Target = u8;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for Threshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
