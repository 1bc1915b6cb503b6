//! Claim confidence on the 1–10 scale

/// Confidence assumed when the inference service reports none
pub const DEFAULT_CONFIDENCE: u8 = 5;

/// Lowest valid confidence
pub const MIN_CONFIDENCE: u8 = 1;

/// Highest valid confidence
pub const MAX_CONFIDENCE: u8 = 10;

/// A confidence value guaranteed to lie in [1, 10]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Confidence(u8);

impl Confidence {
    /// Clamp a reported value into range, using the default when absent
    ///
    /// # Examples
    ///
    /// ```
    /// use vigil_domain::Confidence;
    ///
    /// assert_eq!(Confidence::from_reported(None).value(), 5);
    /// assert_eq!(Confidence::from_reported(Some(42)).value(), 10);
    /// assert_eq!(Confidence::from_reported(Some(-3)).value(), 1);
    /// ```
    pub fn from_reported(reported: Option<i32>) -> Self {
        match reported {
            Some(v) => Self(v.clamp(MIN_CONFIDENCE as i32, MAX_CONFIDENCE as i32) as u8),
            None => Self(DEFAULT_CONFIDENCE),
        }
    }

    /// The clamped value
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Prior probability that the claimed goal is real: c / 10
    pub fn prior(&self) -> f64 {
        f64::from(self.0) / f64::from(MAX_CONFIDENCE)
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self(DEFAULT_CONFIDENCE)
    }
}
