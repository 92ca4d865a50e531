//! A shared SPI bus implementation using `RwLock` for exclusive access.
//!
//! This module provides `RwLockDevice`, a wrapper that allows multiple chip drivers to
//! share a single `SpiBus` instance. Each `RwLockDevice` owns its own Chip Select (CS)
//! pin, so every transaction is framed by asserting CS low and releasing it high.

use embassy_sync::{blocking_mutex::raw::RawMutex, rwlock::RwLock};

use alloc::rc::Rc;
use core::fmt::Debug;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{Error, ErrorKind};
use embedded_hal::spi::{ErrorType, Operation};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::spi::{SpiBus, SpiDevice};

/// A `RwLock`-based shared bus [`SpiDevice`] implementation.
///
/// The `RwLock` is only ever taken for writing, which gives each transaction
/// exclusive use of the bus for its whole duration.
pub struct RwLockDevice<M: RawMutex, BUS, CS, D> {
    bus: Rc<RwLock<M, BUS>>,
    cs: CS,
    delay: D,
}

impl<M: RawMutex, BUS, CS, D> RwLockDevice<M, BUS, CS, D>
where
    CS: OutputPin,
{
    /// Creates a new `RwLockDevice`.
    ///
    /// The chip select is driven high (inactive) before the device is handed out.
    ///
    /// # Arguments
    ///
    /// * `bus` - An `Rc<RwLock<...>>` wrapped SPI bus instance.
    /// * `cs` - The Chip Select output pin for this device.
    /// * `delay` - A delay provider that implements `DelayNs`.
    #[inline]
    pub fn new(
        bus: Rc<RwLock<M, BUS>>,
        mut cs: CS,
        delay: D,
    ) -> Result<Self, CS::Error> {
        cs.set_high()?;
        Ok(Self { bus, cs, delay })
    }
}

impl<M: RawMutex, BUS, CS, D> ErrorType for RwLockDevice<M, BUS, CS, D>
where
    BUS: ErrorType,
    CS: OutputPin,
{
    type Error = DeviceError<BUS::Error, CS::Error>;
}

impl<M, BUS, CS, D> SpiDevice<u8> for RwLockDevice<M, BUS, CS, D>
where
    M: RawMutex,
    BUS: SpiBus<u8>,
    CS: OutputPin,
    D: DelayNs,
{
    /// Performs an SPI transaction.
    ///
    /// Acquires a write lock on the shared SPI bus, asserts Chip Select, executes the
    /// provided operations, then de-asserts Chip Select.
    #[inline]
    async fn transaction(
        &mut self,
        operations: &mut [Operation<'_, u8>],
    ) -> Result<(), Self::Error> {
        let bus = &mut *self.bus.write().await;

        let result = transaction(operations, bus, &mut self.delay, &mut self.cs).await;

        if let Err(err) = &result {
            log::warn!("Error communicating with the device: {err:?}");
        }

        result
    }
}

/// Performs one chip-select framed transaction against the bus.
///
/// CS is released and the bus flushed even when an operation fails.
#[inline]
pub async fn transaction<Word, BUS, CS, D>(
    operations: &mut [Operation<'_, Word>],
    bus: &mut BUS,
    delay: &mut D,
    cs: &mut CS,
) -> Result<(), DeviceError<BUS::Error, CS::Error>>
where
    BUS: SpiBus<Word> + ErrorType,
    CS: OutputPin,
    D: DelayNs,
    Word: Copy + 'static,
{
    cs.set_low().map_err(DeviceError::Cs)?;

    let mut op_res = Ok(());
    for op in operations {
        if let Err(err) = process_op::<BUS, D, Word>(bus, delay, op).await {
            log::warn!("Error communicating with the SPI device.");
            op_res = Err(err);
            break;
        }
    }

    let flush_res = bus.flush().await;
    let cs_res = cs.set_high();

    op_res.map_err(DeviceError::Spi)?;
    flush_res.map_err(DeviceError::Spi)?;
    cs_res.map_err(DeviceError::Cs)?;

    Ok(())
}

/// An error type for `RwLockDevice` operations.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum DeviceError<BUS, CS> {
    /// An inner SPI bus operation failed.
    Spi(BUS),
    /// Asserting or deasserting the CS pin failed.
    Cs(CS),
}

impl<BUS, CS> Error for DeviceError<BUS, CS>
where
    BUS: Error + Debug,
    CS: Debug,
{
    #[inline]
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Spi(e) => e.kind(),
            Self::Cs(_) => ErrorKind::ChipSelectFault,
        }
    }
}

/// Processes a single SPI operation.
async fn process_op<BUS: SpiBus<Word> + ErrorType, D: DelayNs, Word: Copy + 'static>(
    bus: &mut BUS,
    delay: &mut D,
    op: &mut Operation<'_, Word>,
) -> Result<(), <BUS as ErrorType>::Error> {
    match op {
        Operation::Read(buf) => bus.read(buf).await,
        Operation::Write(buf) => bus.write(buf).await,
        Operation::Transfer(read, write) => bus.transfer(read, write).await,
        Operation::TransferInPlace(buf) => bus.transfer_in_place(buf).await,
        Operation::DelayNs(ns) => {
            bus.flush().await?;
            delay.delay_ns(*ns).await;
            Ok(())
        }
    }
}
