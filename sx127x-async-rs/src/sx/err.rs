//! Error types for the SX127x driver.

use core::fmt::{self, Debug};

/// An error related to SPI communication.
pub enum SpiError<TSPIERR> {
    /// An error occurred during a `write` operation.
    Write(TSPIERR),
    /// An error occurred during a `transfer` operation.
    Transfer(TSPIERR),
}

impl<TSPIERR: Debug> Debug for SpiError<TSPIERR> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Write(err) => write!(f, "Write({err:?})"),
            Self::Transfer(err) => write!(f, "Transfer({err:?})"),
        }
    }
}

impl<TSPIERR: PartialEq> PartialEq for SpiError<TSPIERR> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Write(a), Self::Write(b)) => a == b,
            (Self::Transfer(a), Self::Transfer(b)) => a == b,
            _ => false,
        }
    }
}

/// The main error type for the SX127x driver.
pub enum SxError<TSPIERR> {
    /// An SPI-related error.
    Spi(SpiError<TSPIERR>),
    /// The version register did not hold the expected chip revision.
    InvalidVersion(u8),
    /// Spreading factor outside 6..=12.
    InvalidSpreadingFactor(u8),
    /// Payload does not fit in the FIFO.
    PayloadTooLarge {
        /// Length of the rejected payload.
        len: usize,
        /// Largest accepted payload.
        max: usize,
    },
}

impl<TSPIERR: Debug> Debug for SxError<TSPIERR> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spi(err) => write!(f, "Spi({err:?})"),
            Self::InvalidVersion(version) => write!(f, "InvalidVersion({version:#04x})"),
            Self::InvalidSpreadingFactor(sf) => write!(f, "InvalidSpreadingFactor({sf})"),
            Self::PayloadTooLarge { len, max } => {
                write!(f, "PayloadTooLarge {{ len: {len}, max: {max} }}")
            }
        }
    }
}

impl<TSPIERR: PartialEq> PartialEq for SxError<TSPIERR> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Spi(a), Self::Spi(b)) => a == b,
            (Self::InvalidVersion(a), Self::InvalidVersion(b)) => a == b,
            (Self::InvalidSpreadingFactor(a), Self::InvalidSpreadingFactor(b)) => a == b,
            (
                Self::PayloadTooLarge { len: a, max: x },
                Self::PayloadTooLarge { len: b, max: y },
            ) => a == b && x == y,
            _ => false,
        }
    }
}

impl<TSPIERR> From<SpiError<TSPIERR>> for SxError<TSPIERR> {
    fn from(spi_err: SpiError<TSPIERR>) -> Self {
        SxError::Spi(spi_err)
    }
}

impl<TSPIERR> From<crate::op::InvalidSpreadingFactor> for SxError<TSPIERR> {
    fn from(err: crate::op::InvalidSpreadingFactor) -> Self {
        SxError::InvalidSpreadingFactor(err.0)
    }
}
