//! Host-defined width constants for text and integer tiers.

use serde::Deserialize;

use crate::types::SizeTier;

/// Size limits a host exposes for tiered types.
///
/// The accumulator only ever looks these values up; it never derives them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SizeLimits {
    pub text_tiny: u64,
    pub text_regular: u64,
    pub text_medium: u64,
    pub text_long: u64,
    pub int_tiny: u64,
    pub int_small: u64,
    pub int_medium: u64,
    pub int_regular: u64,
    pub int_big: u64,
}

impl SizeLimits {
    /// MySQL adapter constants.
    pub const MYSQL: Self = Self {
        text_tiny: 255,
        text_regular: 65_535,
        text_medium: 16_777_215,
        text_long: 4_294_967_295,
        int_tiny: 255,
        int_small: 65_535,
        int_medium: 16_777_215,
        int_regular: 4_294_967_295,
        int_big: 18_446_744_073_709_551_615,
    };

    /// Limit for a tier.
    pub const fn get(&self, tier: SizeTier) -> u64 {
        match tier {
            SizeTier::TextTiny => self.text_tiny,
            SizeTier::TextMedium => self.text_medium,
            SizeTier::TextLong => self.text_long,
            SizeTier::IntTiny => self.int_tiny,
            SizeTier::IntSmall => self.int_small,
            SizeTier::IntMedium => self.int_medium,
            SizeTier::IntBig => self.int_big,
        }
    }
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self::MYSQL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mysql_tiers() {
        let limits = SizeLimits::MYSQL;
        assert_eq!(limits.get(SizeTier::TextTiny), 255);
        assert_eq!(limits.get(SizeTier::TextLong), 4_294_967_295);
        assert_eq!(limits.get(SizeTier::IntMedium), 16_777_215);
        assert_eq!(limits.get(SizeTier::IntBig), u64::MAX);
    }
}
