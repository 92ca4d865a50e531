//! Typed operation parameters and their register encodings.

pub mod irq;
pub mod modulation;
pub mod pa;
pub mod packet;
pub mod rxtx;

pub use irq::*;
pub use modulation::*;
pub use pa::*;
pub use packet::*;
pub use rxtx::*;
