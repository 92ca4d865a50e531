//! The core implementation of the SX127x driver.

pub(crate) mod err;

use embedded_hal_async::spi::SpiDevice;

use crate::conf::Config;
use crate::op::*;
use crate::reg::*;

pub use self::err::{SpiError, SxError};

/// Resolution of the frequency synthesizer in Hz (32 MHz / 2^19).
pub const FREQ_STEP_HZ: f64 = 61.035_156_25;

/// Calculates the 24-bit `RegFrf` word for a carrier frequency in MHz.
///
/// The result is rounded to the nearest synthesizer step. An exact half step rounds up,
/// not to even; no carrier a radio would use lands on one.
///
/// # Example
///
/// `calc_frf(915.0) == 0xE4_C000`
pub fn calc_frf(frequency_mhz: f64) -> u32 {
    (frequency_mhz * 1_000_000.0 / FREQ_STEP_HZ + 0.5) as u32
}

/// The outcome of one interrupt service pass.
#[derive(Debug)]
pub struct IrqEvent {
    /// Flags read, and cleared, at the start of the pass.
    pub flags: IrqFlags,
    /// The packet drained from the FIFO, if one arrived with a valid CRC.
    pub packet: Option<Packet>,
}

impl IrqEvent {
    /// Returns `true` if a transmission completed during this pass.
    pub fn tx_done(&self) -> bool {
        self.flags.tx_done()
    }
}

/// A wrapper around a Semtech SX1276/77/78/79 LoRa modem.
///
/// The driver tracks the operating mode it last wrote; [`SX127x::set_mode`] is the only
/// path that writes `RegOpMode`, so [`SX127x::mode`] always reflects the hardware.
pub struct SX127x<TSPI> {
    spi: TSPI,
    mode: Mode,
    frequency: f64,
}

impl<TSPI, TSPIERR> SX127x<TSPI>
where
    TSPI: SpiDevice<Error = TSPIERR>,
{
    /// Creates a new `SX127x` driver instance.
    ///
    /// No bus traffic happens until [`SX127x::init`].
    ///
    /// # Arguments
    ///
    /// * `spi` - An asynchronous SPI device; its chip select frames every register access.
    pub fn new(spi: TSPI) -> Self {
        Self {
            spi,
            mode: Mode::Sleep,
            frequency: Config::default().frequency,
        }
    }

    /// Releases the underlying SPI device.
    pub fn release(self) -> TSPI {
        self.spi
    }

    /// Probes and configures the modem, leaving it in continuous receive.
    ///
    /// Fails with [`SxError::InvalidVersion`] before touching any other register if the
    /// chip does not answer with the expected silicon revision.
    pub async fn init(&mut self, conf: &Config) -> Result<(), SxError<TSPIERR>> {
        log::trace!("sx127x::init start");
        SpreadingFactor::try_from(conf.spreading_factor)?;

        let version = self.version().await?;
        if version != SX127X_VERSION {
            log::warn!("sx127x::init unexpected version {version:#04x}");
            return Err(SxError::InvalidVersion(version));
        }

        self.set_mode(Mode::Sleep).await?;
        log::trace!("sx127x::init sleep, lora mode");

        self.set_frequency(conf.frequency).await?;
        self.set_bandwidth(conf.bandwidth).await?;
        self.set_spreading_factor(conf.spreading_factor).await?;
        self.set_coding_rate(conf.coding_rate).await?;
        self.set_preamble_length(conf.preamble_length).await?;
        self.set_crc(conf.crc).await?;
        log::trace!("sx127x::init modem configured");

        self.modify_field(LNA_BOOST_HF, 0x03).await?;
        self.write_register(Register::ModemConfig3, MODEM_CONFIG_3_AGC_AUTO_ON)
            .await?;
        self.set_tx_power(conf.tx_power, conf.pa_output).await?;
        self.set_sync_word(conf.sync_word).await?;

        self.write_register(Register::FifoTxBaseAddr, TX_BASE_ADDR)
            .await?;
        self.write_register(Register::FifoRxBaseAddr, RX_BASE_ADDR)
            .await?;
        log::trace!("sx127x::init fifo base addresses set");

        self.enter_receive().await?;
        log::trace!("sx127x::init done");
        Ok(())
    }

    /// Reads the silicon revision.
    pub async fn version(&mut self) -> Result<u8, SxError<TSPIERR>> {
        self.read_register(Register::Version).await
    }

    /// The operating mode last written to the device.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The configured carrier frequency in MHz.
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Reads one register in a single chip-select framed transaction.
    pub async fn read_register(&mut self, register: Register) -> Result<u8, SxError<TSPIERR>> {
        let mut buf = [register.read_addr(), 0x00];
        self.spi
            .transfer_in_place(&mut buf)
            .await
            .map_err(SpiError::Transfer)?;
        Ok(buf[1])
    }

    /// Writes one register in a single chip-select framed transaction.
    async fn write_register(
        &mut self,
        register: Register,
        value: u8,
    ) -> Result<(), SxError<TSPIERR>> {
        self.spi
            .write(&[register.write_addr(), value])
            .await
            .map_err(SpiError::Write)
            .map_err(Into::into)
    }

    /// Read-modify-write of a single bit field.
    async fn modify_field(&mut self, field: Field, value: u8) -> Result<(), SxError<TSPIERR>> {
        let current = self.read_register(field.reg).await?;
        self.write_register(field.reg, field.encode(current, value))
            .await
    }

    /// Puts the device in `mode`, keeping LoRa mode selected.
    pub async fn set_mode(&mut self, mode: Mode) -> Result<(), SxError<TSPIERR>> {
        self.write_register(Register::OpMode, mode.op_mode_bits())
            .await?;
        log::debug!("sx127x::set_mode {:?} -> {mode:?}", self.mode);
        self.mode = mode;
        Ok(())
    }

    /// Selects the event that raises DIO0.
    pub async fn set_dio0_mapping(
        &mut self,
        mapping: Dio0Mapping,
    ) -> Result<(), SxError<TSPIERR>> {
        self.write_register(Register::DioMapping1, mapping as u8)
            .await
    }

    /// Sets the carrier frequency in MHz.
    ///
    /// The frequency word is written MSB, MID, LSB; the chip latches it on the LSB write.
    pub async fn set_frequency(&mut self, frequency_mhz: f64) -> Result<(), SxError<TSPIERR>> {
        self.frequency = frequency_mhz;
        let frf = calc_frf(frequency_mhz);
        self.write_register(Register::FrfMsb, (frf >> 16) as u8)
            .await?;
        self.write_register(Register::FrfMid, (frf >> 8) as u8)
            .await?;
        self.write_register(Register::FrfLsb, frf as u8).await
    }

    /// Sets the spreading factor, 6 to 12.
    ///
    /// Out-of-range values are rejected before any register is touched.
    pub async fn set_spreading_factor(
        &mut self,
        spreading_factor: u8,
    ) -> Result<(), SxError<TSPIERR>> {
        let sf = SpreadingFactor::try_from(spreading_factor)?;
        self.write_register(Register::DetectionOptimize, sf.detection_optimize())
            .await?;
        self.write_register(Register::DetectionThreshold, sf.detection_threshold())
            .await?;
        self.modify_field(SPREADING_FACTOR, sf as u8).await
    }

    /// Sets the signal bandwidth to the narrowest setting at least `bandwidth_hz` wide.
    pub async fn set_bandwidth(
        &mut self,
        bandwidth_hz: u32,
    ) -> Result<Bandwidth, SxError<TSPIERR>> {
        let bw = Bandwidth::from_hz(bandwidth_hz);
        self.modify_field(BANDWIDTH, bw as u8).await?;
        Ok(bw)
    }

    /// Sets the coding rate `4/denominator`, clamping the denominator to 5..=8.
    pub async fn set_coding_rate(&mut self, denominator: u8) -> Result<(), SxError<TSPIERR>> {
        let cr = CodingRate::from_denominator(denominator);
        self.modify_field(CODING_RATE, cr as u8).await
    }

    /// Sets the preamble length in symbols.
    pub async fn set_preamble_length(&mut self, symbols: u16) -> Result<(), SxError<TSPIERR>> {
        let [msb, lsb] = symbols.to_be_bytes();
        self.write_register(Register::PreambleMsb, msb).await?;
        self.write_register(Register::PreambleLsb, lsb).await
    }

    /// Enables or disables the payload CRC.
    pub async fn set_crc(&mut self, enabled: bool) -> Result<(), SxError<TSPIERR>> {
        self.modify_field(RX_PAYLOAD_CRC_ON, enabled as u8).await
    }

    /// Sets the LoRa sync word.
    ///
    /// Packets carrying another sync word are filtered by the chip and never raise an
    /// interrupt.
    pub async fn set_sync_word(&mut self, sync_word: u8) -> Result<(), SxError<TSPIERR>> {
        self.write_register(Register::SyncWord, sync_word).await
    }

    /// Sets the output power, clamped to the range of `output`.
    pub async fn set_tx_power(
        &mut self,
        level_dbm: i8,
        output: PaOutput,
    ) -> Result<(), SxError<TSPIERR>> {
        let pa_config = PaConfig::new(output, level_dbm);
        self.write_register(Register::PaConfig, pa_config.into())
            .await
    }

    /// RSSI of the last packet received, in dBm.
    pub async fn get_rssi(&mut self) -> Result<i16, SxError<TSPIERR>> {
        let raw = self.read_register(Register::PktRssiValue).await?;
        Ok(rssi_dbm(raw, self.frequency))
    }

    /// SNR of the last packet received, in dB.
    pub async fn get_snr(&mut self) -> Result<f32, SxError<TSPIERR>> {
        let raw = self.read_register(Register::PktSnrValue).await?;
        Ok(snr_db(raw))
    }

    /// Routes `RxDone` to DIO0 and starts continuous receive.
    pub async fn enter_receive(&mut self) -> Result<(), SxError<TSPIERR>> {
        self.set_dio0_mapping(Dio0Mapping::RxDone).await?;
        self.set_mode(Mode::RxContinuous).await
    }

    /// Loads `payload` into the FIFO and starts transmitting.
    ///
    /// DIO0 is routed to `TxDone`; the caller waits for that edge. Oversized payloads are
    /// rejected before any register is touched.
    pub async fn start_transmit(&mut self, payload: &[u8]) -> Result<(), SxError<TSPIERR>> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(SxError::PayloadTooLarge {
                len: payload.len(),
                max: MAX_PAYLOAD_LEN,
            });
        }
        log::trace!("sx127x::start_transmit {} bytes", payload.len());

        self.set_mode(Mode::Standby).await?;
        self.set_dio0_mapping(Dio0Mapping::TxDone).await?;
        self.write_register(Register::FifoAddrPtr, TX_BASE_ADDR)
            .await?;
        for byte in payload {
            self.write_register(Register::Fifo, *byte).await?;
        }
        self.write_register(Register::PayloadLength, payload.len() as u8)
            .await?;
        self.set_mode(Mode::Tx).await
    }

    /// Reads `RegIrqFlags` and clears every flag it reported.
    pub async fn take_irq_flags(&mut self) -> Result<IrqFlags, SxError<TSPIERR>> {
        let flags = self.read_register(Register::IrqFlags).await?;
        self.write_register(Register::IrqFlags, flags).await?;
        Ok(flags.into())
    }

    /// Services one DIO0 edge.
    ///
    /// A completed transmission switches the device back to continuous receive. A
    /// received packet is drained from the FIFO unless its CRC failed, in which case it
    /// is dropped without reading the FIFO.
    pub async fn service_irq(&mut self) -> Result<IrqEvent, SxError<TSPIERR>> {
        let flags = self.take_irq_flags().await?;
        log::trace!("sx127x::service_irq flags: {flags:?}");

        if flags.tx_done() {
            self.enter_receive().await?;
        }

        let packet = if flags.rx_done() && flags.crc_err() {
            log::debug!("sx127x::service_irq dropping packet with CRC error");
            None
        } else if flags.rx_done() {
            Some(self.read_packet().await?)
        } else {
            None
        };

        Ok(IrqEvent { flags, packet })
    }

    /// Drains the last received packet from the FIFO.
    async fn read_packet(&mut self) -> Result<Packet, SxError<TSPIERR>> {
        let addr = self.read_register(Register::FifoRxCurrentAddr).await?;
        self.write_register(Register::FifoAddrPtr, addr).await?;
        let len = self.read_register(Register::RxNbBytes).await?;
        log::trace!("sx127x::read_packet addr={addr:#04x}, len={len}");

        let mut packet = Packet::new();
        for _ in 0..len {
            let byte = self.read_register(Register::Fifo).await?;
            // `len` is a u8, so the packet never exceeds its capacity.
            let _ = packet.push(byte);
        }
        Ok(packet)
    }
}
