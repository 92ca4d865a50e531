//! An asynchronous, `no_std` send/receive layer for SX127x LoRa radios.
//!
//! This crate provides a `LoraRadio` struct that wraps the `sx127x_async` chip driver
//! and turns the DIO0 interrupt line into awaitable `send` and `recv` calls. It is
//! designed to sit on a shared SPI bus, such as the one provided by the
//! `embedded-bus-async` crate.
//!
//! # Usage
//!
//! ```ignore
//! use alloc::rc::Rc;
//! use embassy_futures::join::join;
//! use embassy_sync::blocking_mutex::raw::NoopRawMutex;
//! use embassy_sync::rwlock::RwLock;
//! use embassy_time::Delay;
//! use embedded_bus_async::spi::RwLockDevice;
//! use lora_radio_async::lora::{LoraConfig, LoraRadio};
//!
//! // `spi`, `lora_cs` and `lora_dio0` come from the board's HAL.
//! let spi_bus = Rc::new(RwLock::new(spi));
//! let lora_spi = RwLockDevice::new(spi_bus, lora_cs, Delay).unwrap();
//!
//! let lora: LoraRadio<NoopRawMutex, _, _> =
//!     LoraRadio::new(lora_spi, lora_dio0, &LoraConfig::default()).await.unwrap();
//!
//! // `run` services DIO0 while the application talks to the radio.
//! join(lora.run(), async {
//!     lora.send(b"Hello LoRa!").await.unwrap();
//!     let reply = lora.recv().await.unwrap();
//!     log::info!("got {} bytes, rssi {:?}", reply.len(), lora.get_rssi().await);
//! })
//! .await;
//! ```

#![no_std]
#![deny(missing_docs)]

/// The LoRa radio driver.
pub mod lora;
