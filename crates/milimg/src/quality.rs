//! Quality parameter and the bitrate rule derived from it.

use std::fmt;

use crate::error::{MilimgError, Result};

/// Codec quantization control in `0..=63`.
///
/// Lower values mean higher fidelity, in the style of an AV1 quantizer index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quality(u8);

impl Quality {
    /// Best quality, and the default.
    pub const BEST: Quality = Quality(0);
    /// Worst accepted quality.
    pub const WORST: Quality = Quality(63);

    /// Validates a raw quality value.
    pub fn new(value: i32) -> Result<Self> {
        if !(0..=i32::from(Self::WORST.0)).contains(&value) {
            return Err(MilimgError::invalid_argument(format!(
                "quality must be in 0..=63, got {value}"
            )));
        }
        Ok(Quality(value as u8))
    }

    /// The raw value.
    pub fn get(self) -> u8 {
        self.0
    }

    /// Target bitrate for the given budget: `floor(budget / (quality + 1))`.
    pub fn bitrate(self, budget: u64) -> u64 {
        budget / (u64::from(self.0) + 1)
    }
}

impl TryFrom<i32> for Quality {
    type Error = MilimgError;

    fn try_from(value: i32) -> Result<Self> {
        Quality::new(value)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
#[cfg_attr(all(coverage_nightly, test), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_quality_bounds() {
        assert_eq!(Quality::new(0).unwrap(), Quality::BEST);
        assert_eq!(Quality::new(63).unwrap(), Quality::WORST);
        assert!(Quality::new(-1).unwrap_err().is_invalid_argument());
        assert!(Quality::new(64).unwrap_err().is_invalid_argument());
        assert!(Quality::try_from(i32::MIN).is_err());
        assert_eq!(Quality::default(), Quality::BEST);
    }

    #[test]
    fn test_quality_bitrate() {
        let budget = 10_000_000;
        assert_eq!(Quality::BEST.bitrate(budget), 10_000_000);
        assert_eq!(Quality::new(1).unwrap().bitrate(budget), 5_000_000);
        assert_eq!(Quality::new(2).unwrap().bitrate(budget), 3_333_333);
        assert_eq!(Quality::WORST.bitrate(budget), 156_250);
    }

    #[test]
    fn test_quality_bitrate_decreases() {
        let rates: Vec<u64> = (0..=63)
            .map(|q| Quality::new(q).unwrap().bitrate(10_000_000))
            .collect();
        assert!(rates.windows(2).all(|pair| pair[0] > pair[1]));
    }
}
