//! An asynchronous, `no_std` driver for the Semtech SX127x family of LoRa transceivers.
//!
//! This crate provides a low-level async driver for the SX1276, SX1277, SX1278 and
//! SX1279 in LoRa mode. It is built upon `embedded-hal-async` traits; every register
//! access is one chip-select framed [`SpiDevice`](embedded_hal_async::spi::SpiDevice)
//! transaction.
//!
//! The main entry point is the `SX127x` struct. It owns the register-level protocol
//! (configuration, FIFO handling and interrupt servicing) but no concurrency; the
//! `lora-radio-async` crate layers an awaitable send/receive API on top of it.

#![cfg_attr(not(test), no_std)]

pub mod conf;
pub mod op;
pub mod reg;

mod sx;
pub use sx::*;
