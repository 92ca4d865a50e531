//! Wrapper for modem configuration parameters.

use super::op::PaOutput;

/// Configuration parameters used to initialize the SX127x modem.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Carrier frequency in MHz. Also selects the RSSI offset (see [`crate::op::rssi_dbm`]).
    pub frequency: f64,
    /// Requested signal bandwidth in Hz, rounded up to the next supported setting.
    pub bandwidth: u32,
    /// Spreading factor, 6 to 12.
    pub spreading_factor: u8,
    /// Coding rate denominator, clamped to 5..=8.
    pub coding_rate: u8,
    /// Preamble length in symbols.
    pub preamble_length: u16,
    /// Payload CRC generation and check.
    pub crc: bool,
    /// Output power in dBm, clamped to the range of `pa_output`.
    pub tx_power: i8,
    /// RF output pin the PA drives.
    pub pa_output: PaOutput,
    /// Sync word. Must match on both ends of the link.
    pub sync_word: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frequency: 915.0,
            bandwidth: 250_000,
            spreading_factor: 10,
            coding_rate: 8,
            preamble_length: 4,
            crc: false,
            tx_power: 24,
            pa_output: PaOutput::PaBoost,
            sync_word: 0x12,
        }
    }
}
