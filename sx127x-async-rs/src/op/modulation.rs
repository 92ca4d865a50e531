//! LoRa modulation parameters.

/// LoRa spreading factor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum SpreadingFactor {
    /// Spreading Factor 6. Requires the alternate detection settings.
    SF6 = 6,
    /// Spreading Factor 7.
    SF7 = 7,
    /// Spreading Factor 8.
    SF8 = 8,
    /// Spreading Factor 9.
    SF9 = 9,
    /// Spreading Factor 10.
    SF10 = 10,
    /// Spreading Factor 11.
    SF11 = 11,
    /// Spreading Factor 12.
    SF12 = 12,
}

/// Error returned when converting an out-of-range spreading factor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InvalidSpreadingFactor(pub u8);

impl TryFrom<u8> for SpreadingFactor {
    type Error = InvalidSpreadingFactor;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            6 => Ok(Self::SF6),
            7 => Ok(Self::SF7),
            8 => Ok(Self::SF8),
            9 => Ok(Self::SF9),
            10 => Ok(Self::SF10),
            11 => Ok(Self::SF11),
            12 => Ok(Self::SF12),
            other => Err(InvalidSpreadingFactor(other)),
        }
    }
}

impl SpreadingFactor {
    /// Value for `RegDetectOptimize`.
    pub const fn detection_optimize(self) -> u8 {
        match self {
            Self::SF6 => 0xC5,
            _ => 0xC3,
        }
    }

    /// Value for `RegDetectionThreshold`.
    pub const fn detection_threshold(self) -> u8 {
        match self {
            Self::SF6 => 0x0C,
            _ => 0x0A,
        }
    }
}

/// LoRa signal bandwidth. The discriminant is the `RegModemConfig1` index.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Bandwidth {
    /// 7.8 kHz
    BW7_8 = 0,
    /// 10.4 kHz
    BW10_4 = 1,
    /// 15.6 kHz
    BW15_6 = 2,
    /// 20.8 kHz
    BW20_8 = 3,
    /// 31.25 kHz
    BW31_25 = 4,
    /// 41.7 kHz
    BW41_7 = 5,
    /// 62.5 kHz
    BW62_5 = 6,
    /// 125 kHz
    BW125 = 7,
    /// 250 kHz
    BW250 = 8,
    /// 500 kHz
    BW500 = 9,
}

impl Bandwidth {
    const TABLE: [(u32, Bandwidth); 9] = [
        (7_800, Self::BW7_8),
        (10_400, Self::BW10_4),
        (15_600, Self::BW15_6),
        (20_800, Self::BW20_8),
        (31_250, Self::BW31_25),
        (41_700, Self::BW41_7),
        (62_500, Self::BW62_5),
        (125_000, Self::BW125),
        (250_000, Self::BW250),
    ];

    /// Picks the narrowest bandwidth that is at least `hz` wide.
    ///
    /// Requests above 250 kHz select the widest setting, 500 kHz.
    pub fn from_hz(hz: u32) -> Self {
        Self::TABLE
            .iter()
            .find(|(width, _)| hz <= *width)
            .map(|(_, bw)| *bw)
            .unwrap_or(Self::BW500)
    }

    /// Nominal bandwidth in Hz.
    pub fn hz(self) -> u32 {
        match self {
            Self::BW500 => 500_000,
            bw => Self::TABLE[bw as usize].0,
        }
    }
}

/// LoRa coding rate `4/denominator`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum CodingRate {
    /// 4/5
    CR4_5 = 0x01,
    /// 4/6
    CR4_6 = 0x02,
    /// 4/7
    CR4_7 = 0x03,
    /// 4/8
    CR4_8 = 0x04,
}

impl CodingRate {
    /// Builds a coding rate from its denominator, clamped to 5..=8.
    pub fn from_denominator(denominator: u8) -> Self {
        match denominator {
            0..=5 => Self::CR4_5,
            6 => Self::CR4_6,
            7 => Self::CR4_7,
            _ => Self::CR4_8,
        }
    }

    /// The denominator of the rate.
    pub const fn denominator(self) -> u8 {
        self as u8 + 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spreading_factor_range() {
        for sf in 6..=12u8 {
            assert_eq!(SpreadingFactor::try_from(sf).map(|sf| sf as u8), Ok(sf));
        }
        assert_eq!(
            SpreadingFactor::try_from(5),
            Err(InvalidSpreadingFactor(5))
        );
        assert_eq!(
            SpreadingFactor::try_from(13),
            Err(InvalidSpreadingFactor(13))
        );
    }

    #[test]
    fn sf6_uses_alternate_detection_pair() {
        assert_eq!(SpreadingFactor::SF6.detection_optimize(), 0xC5);
        assert_eq!(SpreadingFactor::SF6.detection_threshold(), 0x0C);
        assert_eq!(SpreadingFactor::SF12.detection_optimize(), 0xC3);
        assert_eq!(SpreadingFactor::SF7.detection_threshold(), 0x0A);
    }

    #[test]
    fn bandwidth_rounds_up_to_table_entry() {
        assert_eq!(Bandwidth::from_hz(0), Bandwidth::BW7_8);
        assert_eq!(Bandwidth::from_hz(7_800), Bandwidth::BW7_8);
        assert_eq!(Bandwidth::from_hz(7_801), Bandwidth::BW10_4);
        assert_eq!(Bandwidth::from_hz(20_000), Bandwidth::BW20_8);
        assert_eq!(Bandwidth::from_hz(125_000), Bandwidth::BW125);
        assert_eq!(Bandwidth::from_hz(250_000), Bandwidth::BW250);
    }

    #[test]
    fn bandwidth_above_table_is_widest() {
        assert_eq!(Bandwidth::from_hz(250_001), Bandwidth::BW500);
        assert_eq!(Bandwidth::from_hz(u32::MAX), Bandwidth::BW500);
        assert_eq!(Bandwidth::BW500 as u8, 9);
    }

    #[test]
    fn bandwidth_hz_matches_index() {
        assert_eq!(Bandwidth::BW41_7.hz(), 41_700);
        assert_eq!(Bandwidth::BW500.hz(), 500_000);
        assert_eq!(Bandwidth::from_hz(Bandwidth::BW62_5.hz()), Bandwidth::BW62_5);
    }

    #[test]
    fn coding_rate_clamps() {
        assert_eq!(CodingRate::from_denominator(0), CodingRate::CR4_5);
        assert_eq!(CodingRate::from_denominator(6), CodingRate::CR4_6);
        assert_eq!(CodingRate::from_denominator(8), CodingRate::CR4_8);
        assert_eq!(CodingRate::from_denominator(200), CodingRate::CR4_8);
        assert_eq!(CodingRate::CR4_7.denominator(), 7);
    }
}
