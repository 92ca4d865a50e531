//! Operating modes.

use crate::reg::OP_MODE_LONG_RANGE;

/// Operating mode, `RegOpMode` bits 2:0.
///
/// The driver keeps the device in LoRa mode, so every write of the mode register also
/// carries [`OP_MODE_LONG_RANGE`].
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Sleep. FIFO not accessible; the only mode where LoRa/FSK may be switched.
    Sleep = 0x00,
    /// Standby.
    Standby = 0x01,
    /// Transmit the FIFO content, then fall back to standby.
    Tx = 0x03,
    /// Receive continuously until told otherwise.
    RxContinuous = 0x05,
}

impl Mode {
    /// Raw value written to `RegOpMode`.
    pub const fn op_mode_bits(self) -> u8 {
        OP_MODE_LONG_RANGE | self as u8
    }
}
