//! The core LoRa radio driver implementation.

use core::convert::Infallible;
use core::fmt::{self, Debug};
use core::future::Future;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::{with_timeout, Duration, TimeoutError};
use embedded_hal_async::digital::Wait;
use embedded_hal_async::spi::SpiDevice;
use sx127x_async::conf::Config;
use sx127x_async::op::*;
use sx127x_async::SxError;
use sx127x_async::SX127x as Device;

/// Configuration for the LoRa radio.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoraConfig {
    /// Modem parameters applied at construction.
    pub modem: Config,
    /// How long `send` waits for the transmission to complete. `None` waits forever.
    pub tx_timeout: Option<Duration>,
    /// How long `recv` waits for a packet. `None` waits forever.
    pub rx_timeout: Option<Duration>,
}

/// Errors returned by [`LoraRadio`].
pub enum LoraError<SPIERR, PINERR> {
    /// The chip driver failed, or rejected an argument.
    Device(SxError<SPIERR>),
    /// Waiting on the DIO0 line failed.
    Pin(PINERR),
    /// A deadline from [`LoraConfig`] expired.
    Timeout,
}

impl<SPIERR: Debug, PINERR: Debug> Debug for LoraError<SPIERR, PINERR> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device(err) => write!(f, "Device({err:?})"),
            Self::Pin(err) => write!(f, "Pin({err:?})"),
            Self::Timeout => write!(f, "Timeout"),
        }
    }
}

impl<SPIERR, PINERR> From<SxError<SPIERR>> for LoraError<SPIERR, PINERR> {
    fn from(err: SxError<SPIERR>) -> Self {
        LoraError::Device(err)
    }
}

/// The error type of a [`LoraRadio`] built on `SPI` and `DIO0`.
pub type RadioError<SPI, DIO0> = LoraError<
    <SPI as embedded_hal_async::spi::ErrorType>::Error,
    <DIO0 as embedded_hal::digital::ErrorType>::Error,
>;

/// Awaits `fut`, giving up after `deadline` if one is set.
async fn until<F: Future>(deadline: Option<Duration>, fut: F) -> Result<F::Output, TimeoutError> {
    match deadline {
        Some(deadline) => with_timeout(deadline, fut).await,
        None => Ok(fut.await),
    }
}

/// A high-level interface for an SX127x LoRa radio.
///
/// All methods take `&self`, so one task can drive [`LoraRadio::run`] while others
/// call [`LoraRadio::send`] and [`LoraRadio::recv`] on the same handle. Register access
/// is serialized by a device lock that is never held across a wait for the interrupt.
pub struct LoraRadio<M: RawMutex, SPI, DIO0> {
    device: Mutex<M, Device<SPI>>,
    dio0: Mutex<M, DIO0>,
    send_lock: Mutex<M, ()>,
    recv_lock: Mutex<M, ()>,
    tx_done: Signal<M, ()>,
    // Holds at most one packet; a newer one replaces it.
    rx_done: Signal<M, Packet>,
    tx_timeout: Option<Duration>,
    rx_timeout: Option<Duration>,
}

impl<M, SPI, DIO0> LoraRadio<M, SPI, DIO0>
where
    M: RawMutex,
    SPI: SpiDevice,
    DIO0: Wait,
{
    /// Creates a new `LoraRadio`, probing and configuring the chip.
    ///
    /// The radio is left in continuous receive with DIO0 routed to `RxDone`.
    ///
    /// # Arguments
    ///
    /// * `lora_spi` - The SPI device for communicating with the LoRa module.
    /// * `dio0` - The DIO0 interrupt input pin.
    /// * `config` - Modem parameters and deadlines.
    pub async fn new(
        lora_spi: SPI,
        dio0: DIO0,
        config: &LoraConfig,
    ) -> Result<Self, RadioError<SPI, DIO0>> {
        let mut device = Device::new(lora_spi);
        device.init(&config.modem).await.map_err(|err| {
            log::warn!("Error initializing device: {err:?}");
            err
        })?;
        log::debug!("lora::new radio ready at {} MHz", device.frequency());

        Ok(Self {
            device: Mutex::new(device),
            dio0: Mutex::new(dio0),
            send_lock: Mutex::new(()),
            recv_lock: Mutex::new(()),
            tx_done: Signal::new(),
            rx_done: Signal::new(),
            tx_timeout: config.tx_timeout,
            rx_timeout: config.rx_timeout,
        })
    }

    /// Sends a data packet and waits until the radio reports it transmitted.
    ///
    /// Only one `send` runs at a time; later callers queue on the send lock. On a
    /// deadline the radio is put back into receive and [`LoraError::Timeout`] returned.
    ///
    /// # Arguments
    ///
    /// * `data` - The payload, at most [`MAX_PAYLOAD_LEN`] bytes.
    pub async fn send(&self, data: &[u8]) -> Result<(), RadioError<SPI, DIO0>> {
        let _send = self.send_lock.lock().await;
        {
            let mut device = self.device.lock().await;
            self.tx_done.reset();
            device.start_transmit(data).await.map_err(|err| {
                log::warn!("Error sending lora message: {err:?}");
                err
            })?;
        }
        log::trace!("lora::send waiting for tx done");

        if until(self.tx_timeout, self.tx_done.wait()).await.is_err() {
            log::warn!("lora::send timed out, returning to rx");
            self.device.lock().await.enter_receive().await?;
            return Err(LoraError::Timeout);
        }
        log::trace!("lora::send done");
        Ok(())
    }

    /// Waits for the next packet.
    ///
    /// A packet that arrived while nobody was waiting is returned immediately; each
    /// packet is returned at most once.
    pub async fn recv(&self) -> Result<Packet, RadioError<SPI, DIO0>> {
        let _recv = self.recv_lock.lock().await;
        log::trace!("lora::recv waiting for message");

        let packet = until(self.rx_timeout, self.rx_done.wait())
            .await
            .map_err(|_| {
                log::debug!("lora::recv timed out");
                LoraError::Timeout
            })?;
        log::trace!("lora::recv got {} bytes", packet.len());
        Ok(packet)
    }

    /// Services one DIO0 rising edge.
    ///
    /// Called by [`LoraRadio::run`]; a platform interrupt handler may call it directly
    /// instead.
    pub async fn handle_interrupt(&self) -> Result<(), RadioError<SPI, DIO0>> {
        let event = self
            .device
            .lock()
            .await
            .service_irq()
            .await
            .map_err(|err| {
                log::warn!("Error servicing interrupt: {err:?}");
                err
            })?;

        if event.tx_done() {
            self.tx_done.signal(());
        }
        if let Some(packet) = event.packet {
            log::trace!("lora::handle_interrupt packet of {} bytes", packet.len());
            self.rx_done.signal(packet);
        }
        Ok(())
    }

    /// Waits for DIO0 rising edges forever, servicing each one.
    ///
    /// Bus errors while servicing are logged and the loop continues. Only a failure of
    /// the DIO0 pin itself ends it.
    pub async fn run(&self) -> Result<Infallible, RadioError<SPI, DIO0>> {
        let mut dio0 = self.dio0.lock().await;
        loop {
            dio0.wait_for_rising_edge().await.map_err(|err| {
                log::warn!("Error waiting for dio0: {err:?}");
                LoraError::Pin(err)
            })?;
            // Already logged by `handle_interrupt`.
            let _ = self.handle_interrupt().await;
        }
    }

    /// The operating mode last written to the chip.
    pub async fn mode(&self) -> Mode {
        self.device.lock().await.mode()
    }

    /// The configured carrier frequency in MHz.
    pub async fn frequency(&self) -> f64 {
        self.device.lock().await.frequency()
    }

    /// RSSI of the last packet received, in dBm.
    pub async fn get_rssi(&self) -> Result<i16, RadioError<SPI, DIO0>> {
        Ok(self.device.lock().await.get_rssi().await?)
    }

    /// SNR of the last packet received, in dB.
    pub async fn get_snr(&self) -> Result<f32, RadioError<SPI, DIO0>> {
        Ok(self.device.lock().await.get_snr().await?)
    }

    /// Sets the carrier frequency in MHz.
    pub async fn set_frequency(&self, frequency_mhz: f64) -> Result<(), RadioError<SPI, DIO0>> {
        Ok(self.device.lock().await.set_frequency(frequency_mhz).await?)
    }

    /// Sets the spreading factor, 6 to 12.
    pub async fn set_spreading_factor(
        &self,
        spreading_factor: u8,
    ) -> Result<(), RadioError<SPI, DIO0>> {
        Ok(self
            .device
            .lock()
            .await
            .set_spreading_factor(spreading_factor)
            .await?)
    }

    /// Sets the signal bandwidth, returning the setting chosen.
    pub async fn set_bandwidth(
        &self,
        bandwidth_hz: u32,
    ) -> Result<Bandwidth, RadioError<SPI, DIO0>> {
        Ok(self.device.lock().await.set_bandwidth(bandwidth_hz).await?)
    }

    /// Sets the coding rate `4/denominator`.
    pub async fn set_coding_rate(&self, denominator: u8) -> Result<(), RadioError<SPI, DIO0>> {
        Ok(self.device.lock().await.set_coding_rate(denominator).await?)
    }

    /// Sets the preamble length in symbols.
    pub async fn set_preamble_length(&self, symbols: u16) -> Result<(), RadioError<SPI, DIO0>> {
        Ok(self.device.lock().await.set_preamble_length(symbols).await?)
    }

    /// Enables or disables the payload CRC.
    pub async fn set_crc(&self, enabled: bool) -> Result<(), RadioError<SPI, DIO0>> {
        Ok(self.device.lock().await.set_crc(enabled).await?)
    }

    /// Sets the sync word.
    pub async fn set_sync_word(&self, sync_word: u8) -> Result<(), RadioError<SPI, DIO0>> {
        Ok(self.device.lock().await.set_sync_word(sync_word).await?)
    }

    /// Sets the output power on the given PA output.
    pub async fn set_tx_power(
        &self,
        level_dbm: i8,
        output: PaOutput,
    ) -> Result<(), RadioError<SPI, DIO0>> {
        Ok(self
            .device
            .lock()
            .await
            .set_tx_power(level_dbm, output)
            .await?)
    }
}
