//! Interrupt (IRQ) flag decoding and DIO0 routing.

/// Individual bits of `RegIrqFlags`.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IrqFlag {
    /// Channel activity detected.
    CadDetected = 1 << 0,
    /// FHSS change channel.
    FhssChangeChannel = 1 << 1,
    /// Channel Activity Detection (CAD) done.
    CadDone = 1 << 2,
    /// Transmit operation done.
    TxDone = 1 << 3,
    /// Valid header received.
    ValidHeader = 1 << 4,
    /// Payload CRC error.
    PayloadCrcError = 1 << 5,
    /// Receive operation done.
    RxDone = 1 << 6,
    /// Receive timeout.
    RxTimeout = 1 << 7,
}

/// The interrupt flags read from the device.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub struct IrqFlags {
    inner: u8,
}

impl From<u8> for IrqFlags {
    fn from(flags: u8) -> Self {
        Self { inner: flags }
    }
}

impl From<IrqFlags> for u8 {
    fn from(val: IrqFlags) -> Self {
        val.inner
    }
}

impl core::fmt::Debug for IrqFlags {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IrqFlags")
            .field("rx_timeout", &self.rx_timeout())
            .field("rx_done", &self.rx_done())
            .field("crc_err", &self.crc_err())
            .field("valid_header", &self.valid_header())
            .field("tx_done", &self.tx_done())
            .field("cad_done", &self.cad_done())
            .field("cad_detected", &self.cad_detected())
            .finish()
    }
}

impl IrqFlags {
    /// Creates an empty flag set.
    pub const fn none() -> Self {
        Self { inner: 0 }
    }

    /// Adds a flag to the set.
    pub const fn combine(self, flag: IrqFlag) -> Self {
        Self {
            inner: self.inner | flag as u8,
        }
    }

    /// Returns `true` if `flag` is set.
    pub const fn contains(self, flag: IrqFlag) -> bool {
        (self.inner & flag as u8) > 0
    }

    /// Returns `true` if no flag is set.
    pub const fn is_empty(self) -> bool {
        self.inner == 0
    }

    /// Returns `true` if the `TxDone` interrupt is active.
    pub const fn tx_done(self) -> bool {
        self.contains(IrqFlag::TxDone)
    }

    /// Returns `true` if the `RxDone` interrupt is active.
    pub const fn rx_done(self) -> bool {
        self.contains(IrqFlag::RxDone)
    }

    /// Returns `true` if the `PayloadCrcError` interrupt is active.
    pub const fn crc_err(self) -> bool {
        self.contains(IrqFlag::PayloadCrcError)
    }

    /// Returns `true` if the `ValidHeader` interrupt is active.
    pub const fn valid_header(self) -> bool {
        self.contains(IrqFlag::ValidHeader)
    }

    /// Returns `true` if the `RxTimeout` interrupt is active.
    pub const fn rx_timeout(self) -> bool {
        self.contains(IrqFlag::RxTimeout)
    }

    /// Returns `true` if the `CadDone` interrupt is active.
    pub const fn cad_done(self) -> bool {
        self.contains(IrqFlag::CadDone)
    }

    /// Returns `true` if the `CadDetected` interrupt is active.
    pub const fn cad_detected(self) -> bool {
        self.contains(IrqFlag::CadDetected)
    }
}

/// Event routed to the DIO0 pin, `RegDioMapping1` bits 7:6.
///
/// The driver owns the whole register; DIO1..DIO3 stay on mapping 00.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Dio0Mapping {
    /// DIO0 rises on `RxDone`.
    RxDone = 0x00,
    /// DIO0 rises on `TxDone`.
    TxDone = 0x40,
}
