//! Byte-level SX127x simulator wired up behind a shared SPI bus.

#![allow(dead_code)]

use std::cell::{Ref, RefCell, RefMut};
use std::convert::Infallible;
use std::rc::Rc;
use std::vec::Vec;

use embassy_futures::{block_on, yield_now};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::rwlock::RwLock;
use embassy_sync::signal::Signal;
use embedded_bus_async::spi::RwLockDevice;
use embedded_hal::digital::{ErrorType as PinErrorType, OutputPin};
use embedded_hal::spi::ErrorType as SpiErrorType;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::digital::Wait;
use embedded_hal_async::spi::SpiBus;
use lora_radio_async::lora::{LoraConfig, LoraRadio, RadioError};
use sx127x_async::reg::{Register, SX127X_VERSION};

pub const MODE_STANDBY: u8 = 0x81;
pub const MODE_TX: u8 = 0x83;
pub const MODE_RX_CONTINUOUS: u8 = 0x85;

/// FIFO offset where the simulated modem stores received packets.
pub const RX_PACKET_ADDR: u8 = 0x80;

pub type SimDevice = RwLockDevice<NoopRawMutex, SimBus, SimCs, NoDelay>;
pub type Radio = LoraRadio<NoopRawMutex, SimDevice, SimDio0>;
pub type Error = RadioError<SimDevice, SimDio0>;

/// Register file of the simulated chip.
pub struct Chip {
    regs: [u8; 128],
    pub fifo: [u8; 256],
    selected: bool,
    addr: Option<u8>,
    /// Number of chip-select framed transactions seen.
    pub transactions: usize,
    pub writes: Vec<(u8, u8)>,
    pub reads: Vec<u8>,
}

impl Chip {
    fn new(version: u8) -> Self {
        let mut regs = [0u8; 128];
        regs[Register::Version.addr() as usize] = version;
        Self {
            regs,
            fifo: [0u8; 256],
            selected: false,
            addr: None,
            transactions: 0,
            writes: Vec::new(),
            reads: Vec::new(),
        }
    }

    pub fn reg(&self, register: Register) -> u8 {
        self.regs[register.addr() as usize]
    }

    pub fn set_reg(&mut self, register: Register, value: u8) {
        self.regs[register.addr() as usize] = value;
    }

    pub fn writes_to(&self, register: Register) -> Vec<u8> {
        self.writes
            .iter()
            .filter(|(addr, _)| *addr == register.addr())
            .map(|(_, value)| *value)
            .collect()
    }

    pub fn clear_log(&mut self) {
        self.transactions = 0;
        self.writes.clear();
        self.reads.clear();
    }

    fn select(&mut self) {
        assert!(!self.selected, "chip select asserted twice");
        self.selected = true;
        self.addr = None;
        self.transactions += 1;
    }

    fn deselect(&mut self) {
        self.selected = false;
    }

    fn exchange(&mut self, byte: u8) -> u8 {
        assert!(self.selected, "bus traffic without chip select");
        match self.addr {
            None => {
                self.addr = Some(byte);
                0
            }
            Some(addr) if addr & 0x80 != 0 => {
                self.store(addr & 0x7F, byte);
                0
            }
            Some(addr) => self.load(addr),
        }
    }

    fn store(&mut self, addr: u8, value: u8) {
        self.writes.push((addr, value));
        if addr == Register::Fifo.addr() {
            let ptr = self.reg(Register::FifoAddrPtr);
            self.fifo[ptr as usize] = value;
            self.set_reg(Register::FifoAddrPtr, ptr.wrapping_add(1));
        } else if addr == Register::IrqFlags.addr() {
            self.regs[addr as usize] &= !value;
        } else {
            self.regs[addr as usize] = value;
        }
    }

    fn load(&mut self, addr: u8) -> u8 {
        self.reads.push(addr);
        if addr == Register::Fifo.addr() {
            let ptr = self.reg(Register::FifoAddrPtr);
            self.set_reg(Register::FifoAddrPtr, ptr.wrapping_add(1));
            self.fifo[ptr as usize]
        } else {
            self.regs[addr as usize]
        }
    }
}

pub struct SimBus {
    chip: Rc<RefCell<Chip>>,
}

impl SpiErrorType for SimBus {
    type Error = Infallible;
}

impl SpiBus<u8> for SimBus {
    async fn read(&mut self, words: &mut [u8]) -> Result<(), Infallible> {
        let mut chip = self.chip.borrow_mut();
        for word in words {
            *word = chip.exchange(0);
        }
        Ok(())
    }

    async fn write(&mut self, words: &[u8]) -> Result<(), Infallible> {
        let mut chip = self.chip.borrow_mut();
        for word in words {
            chip.exchange(*word);
        }
        Ok(())
    }

    async fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Infallible> {
        let mut chip = self.chip.borrow_mut();
        for i in 0..read.len().max(write.len()) {
            let byte = chip.exchange(write.get(i).copied().unwrap_or(0));
            if let Some(slot) = read.get_mut(i) {
                *slot = byte;
            }
        }
        Ok(())
    }

    async fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Infallible> {
        let mut chip = self.chip.borrow_mut();
        for word in words {
            *word = chip.exchange(*word);
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

pub struct SimCs {
    chip: Rc<RefCell<Chip>>,
}

impl PinErrorType for SimCs {
    type Error = Infallible;
}

impl OutputPin for SimCs {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.chip.borrow_mut().select();
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.chip.borrow_mut().deselect();
        Ok(())
    }
}

pub struct NoDelay;

impl DelayNs for NoDelay {
    async fn delay_ns(&mut self, _ns: u32) {}
}

/// DIO0 line; every [`Sim::pulse`] is one rising edge.
pub struct SimDio0 {
    edge: Rc<Signal<NoopRawMutex, ()>>,
}

impl PinErrorType for SimDio0 {
    type Error = Infallible;
}

impl Wait for SimDio0 {
    async fn wait_for_high(&mut self) -> Result<(), Infallible> {
        self.edge.wait().await;
        Ok(())
    }

    async fn wait_for_low(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    async fn wait_for_rising_edge(&mut self) -> Result<(), Infallible> {
        self.edge.wait().await;
        Ok(())
    }

    async fn wait_for_falling_edge(&mut self) -> Result<(), Infallible> {
        core::future::pending().await
    }

    async fn wait_for_any_edge(&mut self) -> Result<(), Infallible> {
        self.edge.wait().await;
        Ok(())
    }
}

/// Test-side handle on the simulated chip and its DIO0 line.
pub struct Sim {
    chip: Rc<RefCell<Chip>>,
    edge: Rc<Signal<NoopRawMutex, ()>>,
}

impl Sim {
    pub fn chip(&self) -> Ref<'_, Chip> {
        self.chip.borrow()
    }

    pub fn chip_mut(&self) -> RefMut<'_, Chip> {
        self.chip.borrow_mut()
    }

    pub fn clear_log(&self) {
        self.chip.borrow_mut().clear_log();
    }

    /// Places a received packet in the FIFO and raises `RxDone`.
    pub fn deliver(&self, payload: &[u8], crc_ok: bool) {
        let mut chip = self.chip.borrow_mut();
        assert_eq!(chip.reg(Register::OpMode), MODE_RX_CONTINUOUS);
        let start = RX_PACKET_ADDR as usize;
        chip.fifo[start..start + payload.len()].copy_from_slice(payload);
        chip.set_reg(Register::FifoRxCurrentAddr, RX_PACKET_ADDR);
        chip.set_reg(Register::RxNbBytes, payload.len() as u8);
        let mut flags = chip.reg(Register::IrqFlags) | 0x40;
        if !crc_ok {
            flags |= 0x20;
        }
        chip.set_reg(Register::IrqFlags, flags);
    }

    /// Raises `TxDone` for the armed transmission.
    pub fn finish_tx(&self) {
        let mut chip = self.chip.borrow_mut();
        assert_eq!(chip.reg(Register::OpMode), MODE_TX);
        let flags = chip.reg(Register::IrqFlags) | 0x08;
        chip.set_reg(Register::IrqFlags, flags);
    }

    /// Drives one rising edge on DIO0.
    pub fn pulse(&self) {
        self.edge.signal(());
    }

    /// Yields until the chip's `RegOpMode` holds `op_mode`.
    pub async fn wait_for_mode(&self, op_mode: u8) {
        while self.chip.borrow().reg(Register::OpMode) != op_mode {
            yield_now().await;
        }
    }
}

pub fn try_setup(version: u8, config: &LoraConfig) -> (Result<Radio, Error>, Sim) {
    let chip = Rc::new(RefCell::new(Chip::new(version)));
    let edge = Rc::new(Signal::new());

    let bus = Rc::new(RwLock::new(SimBus { chip: chip.clone() }));
    let cs = SimCs { chip: chip.clone() };
    let device = RwLockDevice::new(bus, cs, NoDelay).unwrap();
    let dio0 = SimDio0 { edge: edge.clone() };

    let radio = block_on(LoraRadio::new(device, dio0, config));
    (radio, Sim { chip, edge })
}

/// Builds an initialized radio with an empty traffic log.
pub fn setup(config: &LoraConfig) -> (Radio, Sim) {
    let (radio, sim) = try_setup(SX127X_VERSION, config);
    let radio = radio.unwrap();
    sim.clear_log();
    (radio, sim)
}
