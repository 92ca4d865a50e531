//! Power amplifier (PA) output selection and power encoding.

/// `RegPaConfig` bit 7: route the output through the PA_BOOST pin.
const PA_SELECT_BOOST: u8 = 0x80;
/// `RegPaConfig` bits 6:4 on the RFO path: maximum power setting.
const RFO_MAX_POWER: u8 = 0x70;

/// The physical RF output the transmitter drives.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PaOutput {
    /// RFO pin, 0 to 14 dBm.
    Rfo,
    /// PA_BOOST pin, 2 to 17 dBm.
    #[default]
    PaBoost,
}

/// A `RegPaConfig` value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PaConfig {
    inner: u8,
}

impl From<PaConfig> for u8 {
    fn from(val: PaConfig) -> Self {
        val.inner
    }
}

impl PaConfig {
    /// Encodes an output power for `output`, clamping it to the pin's range.
    pub fn new(output: PaOutput, level_dbm: i8) -> Self {
        let inner = match output {
            PaOutput::Rfo => RFO_MAX_POWER | level_dbm.clamp(0, 14) as u8,
            PaOutput::PaBoost => PA_SELECT_BOOST | (level_dbm.clamp(2, 17) - 2) as u8,
        };
        Self { inner }
    }

    /// Output power in dBm as encoded.
    pub fn power_dbm(self) -> i8 {
        if self.inner & PA_SELECT_BOOST != 0 {
            (self.inner & 0x0F) as i8 + 2
        } else {
            (self.inner & 0x0F) as i8
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boost_path_clamps_to_2_17() {
        assert_eq!(u8::from(PaConfig::new(PaOutput::PaBoost, 24)), 0x8F);
        assert_eq!(u8::from(PaConfig::new(PaOutput::PaBoost, 17)), 0x8F);
        assert_eq!(u8::from(PaConfig::new(PaOutput::PaBoost, 10)), 0x88);
        assert_eq!(u8::from(PaConfig::new(PaOutput::PaBoost, 0)), 0x80);
        assert_eq!(u8::from(PaConfig::new(PaOutput::PaBoost, -20)), 0x80);
    }

    #[test]
    fn rfo_path_clamps_to_0_14() {
        assert_eq!(u8::from(PaConfig::new(PaOutput::Rfo, 20)), 0x7E);
        assert_eq!(u8::from(PaConfig::new(PaOutput::Rfo, 5)), 0x75);
        assert_eq!(u8::from(PaConfig::new(PaOutput::Rfo, -3)), 0x70);
    }

    #[test]
    fn power_decodes_back() {
        assert_eq!(PaConfig::new(PaOutput::PaBoost, 24).power_dbm(), 17);
        assert_eq!(PaConfig::new(PaOutput::Rfo, 9).power_dbm(), 9);
        assert_eq!(PaOutput::default(), PaOutput::PaBoost);
    }
}
