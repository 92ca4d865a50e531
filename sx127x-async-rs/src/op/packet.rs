//! Packet buffers and received-signal metrics.

/// Largest packet the FIFO can hold.
pub const MAX_PKT_LENGTH: usize = 255;

/// FIFO base address used for transmission.
pub const TX_BASE_ADDR: u8 = 0x00;

/// FIFO base address used for reception.
pub const RX_BASE_ADDR: u8 = 0x00;

/// Largest payload `send` accepts with the transmit base in use.
pub const MAX_PAYLOAD_LEN: usize = MAX_PKT_LENGTH - TX_BASE_ADDR as usize;

/// A received packet, drained from the FIFO.
pub type Packet = heapless::Vec<u8, MAX_PKT_LENGTH>;

/// Lowest carrier frequency served by the high-frequency RF port.
pub const HF_PORT_MIN_MHZ: f64 = 779.0;

/// Converts a raw `RegPktRssiValue` to dBm.
///
/// The offset depends on which RF port serves `frequency_mhz`.
pub fn rssi_dbm(raw: u8, frequency_mhz: f64) -> i16 {
    if frequency_mhz >= HF_PORT_MIN_MHZ {
        raw as i16 - 157
    } else {
        raw as i16 - 164
    }
}

/// Converts a raw `RegPktSnrValue` (two's complement, quarter dB) to dB.
pub fn snr_db(raw: u8) -> f32 {
    raw as i8 as f32 * 0.25
}
