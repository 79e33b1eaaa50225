//! Configuration validation for a split request

use anyhow::{Context, Result, bail};

use super::{ShareCount, Threshold};

/// Validated pair of threshold and share count
///
/// Enforces `2 <= threshold <= share_count <= 255`, the precondition for enabling the
/// split action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitConfig {
    threshold: Threshold,
    share_count: ShareCount,
}

impl SplitConfig {
    /// Creates a new split configuration
    ///
    /// # Errors
    /// Returns an error if threshold exceeds share count
    ///
    /// # Examples
    ///
    /// ```rust
    /// use safeparts_client::domain::{SplitConfig, Threshold, ShareCount};
    ///
    /// let config = SplitConfig::new(
    ///     Threshold::new(3).unwrap(),
    ///     ShareCount::new(5).unwrap()
    /// ).unwrap();
    ///
    /// assert_eq!(*config.threshold(), 3);
    /// assert_eq!(*config.share_count(), 5);
    ///
    /// let result = SplitConfig::new(
    ///     Threshold::new(5).unwrap(),
    ///     ShareCount::new(3).unwrap()
    /// );
    /// assert!(result.is_err());
    /// ```
    pub fn new(threshold: Threshold, share_count: ShareCount) -> Result<Self> {
        if *threshold > *share_count {
            bail!(
                "Threshold {} cannot exceed share count {}",
                *threshold,
                *share_count
            );
        }
        Ok(Self {
            threshold,
            share_count,
        })
    }

    /// Validates unconstrained numeric input, as typed into a form field
    ///
    /// # Errors
    /// Returns an error if either value is out of range or `k > n`
    pub fn from_raw(k: u32, n: u32) -> Result<Self> {
        let k = u8::try_from(k).with_context(|| format!("Threshold {k} exceeds 255"))?;
        let n = u8::try_from(n).with_context(|| format!("Share count {n} exceeds 255"))?;
        Self::new(Threshold::new(k)?, ShareCount::new(n)?)
    }

    /// Pulls unconstrained input into range, as a form does on every edit
    ///
    /// The share count is kept in `2..=255` first, then the threshold in
    /// `2..=share_count`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use safeparts_client::domain::SplitConfig;
    ///
    /// let config = SplitConfig::clamped(5, 3);
    /// assert_eq!((*config.threshold(), *config.share_count()), (3, 3));
    /// ```
    #[must_use]
    pub fn clamped(k: u32, n: u32) -> Self {
        let share_count = ShareCount::saturating(u8::try_from(n).unwrap_or(u8::MAX));
        let k = u8::try_from(k).unwrap_or(u8::MAX).min(*share_count);
        Self {
            threshold: Threshold::saturating(k),
            share_count,
        }
    }

    /// Gets the threshold value
    #[must_use]
    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Gets the share count value
    #[must_use]
    pub fn share_count(&self) -> ShareCount {
        self.share_count
    }
}
