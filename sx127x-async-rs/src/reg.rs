//! SX127x register map for LoRa mode.
//!
//! Addresses are 7 bits wide. On the bus, bit 7 of the address byte selects the
//! direction: clear for a read, set for a write.

/// Named SX127x registers (LoRa page).
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Register {
    /// FIFO read/write access. Each access advances `FifoAddrPtr`.
    Fifo = 0x00,
    /// Operating mode and LoRa/FSK selection.
    OpMode = 0x01,
    /// RF carrier frequency, bits 23:16.
    FrfMsb = 0x06,
    /// RF carrier frequency, bits 15:8.
    FrfMid = 0x07,
    /// RF carrier frequency, bits 7:0.
    FrfLsb = 0x08,
    /// PA selection and output power control.
    PaConfig = 0x09,
    /// LNA gain and boost.
    Lna = 0x0C,
    /// SPI interface address pointer into the FIFO.
    FifoAddrPtr = 0x0D,
    /// Write base address in FIFO for TX.
    FifoTxBaseAddr = 0x0E,
    /// Read base address in FIFO for RX.
    FifoRxBaseAddr = 0x0F,
    /// Start address of the last packet received.
    FifoRxCurrentAddr = 0x10,
    /// IRQ flags, write 1 to clear.
    IrqFlags = 0x12,
    /// Number of payload bytes of the last packet received.
    RxNbBytes = 0x13,
    /// RSSI of the last packet received.
    PktRssiValue = 0x1A,
    /// SNR of the last packet received, two's complement in 0.25 dB steps.
    PktSnrValue = 0x1B,
    /// Bandwidth, coding rate, header mode.
    ModemConfig1 = 0x1D,
    /// Spreading factor, continuous TX, CRC on, RX timeout MSB.
    ModemConfig2 = 0x1E,
    /// Preamble length, bits 15:8.
    PreambleMsb = 0x20,
    /// Preamble length, bits 7:0.
    PreambleLsb = 0x21,
    /// Payload length for TX in explicit header mode.
    PayloadLength = 0x22,
    /// Low data rate optimize, AGC auto.
    ModemConfig3 = 0x26,
    /// LoRa detection optimize.
    DetectionOptimize = 0x31,
    /// LoRa detection threshold.
    DetectionThreshold = 0x37,
    /// LoRa sync word.
    SyncWord = 0x39,
    /// Mapping of DIO0..DIO3.
    DioMapping1 = 0x40,
    /// Silicon revision.
    Version = 0x42,
}

impl Register {
    /// The 7-bit register address.
    pub const fn addr(self) -> u8 {
        self as u8
    }

    /// Address byte for a read access (bit 7 clear).
    pub const fn read_addr(self) -> u8 {
        self as u8 & 0x7F
    }

    /// Address byte for a write access (bit 7 set).
    pub const fn write_addr(self) -> u8 {
        self as u8 | 0x80
    }
}

/// Value of [`Register::Version`] on a supported chip.
pub const SX127X_VERSION: u8 = 0x12;

/// `RegOpMode` bit 7: LoRa (long range) mode.
pub const OP_MODE_LONG_RANGE: u8 = 0x80;

/// `RegModemConfig3` bit 2: automatic gain control on.
pub const MODEM_CONFIG_3_AGC_AUTO_ON: u8 = 0x04;

/// A bit field within a single register.
///
/// The field owns exactly the bits set in `mask`; everything else in the register
/// belongs to other settings and must survive a write to this field.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Field {
    /// Register holding the field.
    pub reg: Register,
    /// Bits owned by the field.
    pub mask: u8,
    /// Position of the field's least significant bit.
    pub shift: u8,
}

impl Field {
    /// Replaces the field inside `current` with `value`, leaving foreign bits untouched.
    pub const fn encode(self, current: u8, value: u8) -> u8 {
        (current & !self.mask) | ((value << self.shift) & self.mask)
    }

    /// Extracts the field from a raw register value.
    pub const fn decode(self, raw: u8) -> u8 {
        (raw & self.mask) >> self.shift
    }
}

/// `RegModemConfig1` bits 7:4: signal bandwidth index.
pub const BANDWIDTH: Field = Field {
    reg: Register::ModemConfig1,
    mask: 0xF0,
    shift: 4,
};

/// `RegModemConfig1` bits 3:1: coding rate, `denominator - 4`.
pub const CODING_RATE: Field = Field {
    reg: Register::ModemConfig1,
    mask: 0x0E,
    shift: 1,
};

/// `RegModemConfig2` bits 7:4: spreading factor.
pub const SPREADING_FACTOR: Field = Field {
    reg: Register::ModemConfig2,
    mask: 0xF0,
    shift: 4,
};

/// `RegModemConfig2` bit 2: payload CRC generation and check.
pub const RX_PAYLOAD_CRC_ON: Field = Field {
    reg: Register::ModemConfig2,
    mask: 0x04,
    shift: 2,
};

/// `RegLna` bits 1:0: high-frequency LNA current boost.
pub const LNA_BOOST_HF: Field = Field {
    reg: Register::Lna,
    mask: 0x03,
    shift: 0,
};
