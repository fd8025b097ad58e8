//! [I2cBus](crate::I2cBus) backends.
//!
//! - [RawI2cBus] talks to the Raspberry Pi BSC controller through `/dev/mem`.
//! - [HalI2cBus] wraps any `embedded-hal` I2C implementation, for everything else.

mod hal;
mod raw;

pub use hal::*;
pub use raw::*;
