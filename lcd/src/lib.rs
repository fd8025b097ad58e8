pub mod delay;
pub mod i2c;
pub mod lcd;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt::Debug;
use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum BusError {
    #[error("no acknowledge from device at address {address:#04x}")]
    Nack { address: u8 },
    #[error("bus transfer timed out")]
    Timeout,
    #[error("invalid argument")]
    InvalidArgument,
    #[error("IO error: {0}")]
    Io(std::io::ErrorKind),
    #[error("error: {0}")]
    Other(String),
}

impl From<std::io::Error> for BusError {
    fn from(err: std::io::Error) -> Self {
        BusError::Io(err.kind())
    }
}

pub type BusResult<T> = Result<T, BusError>;

/// A write-only I2C bus, as seen by the display drivers.
///
/// The drivers never read back from the bus, so this is the only capability they need.
pub trait I2cBus: Debug {
    /// Writes `bytes` to the device at the 7-bit `address` in a single transaction.
    ///
    /// # Errors
    /// - `BusError::Nack` if no device acknowledged the address.
    /// - Any other [BusError] the backend runs into.
    fn write(&mut self, address: u8, bytes: &[u8]) -> BusResult<()>;
}

impl<T: I2cBus + ?Sized> I2cBus for &mut T {
    fn write(&mut self, address: u8, bytes: &[u8]) -> BusResult<()> {
        (**self).write(address, bytes)
    }
}

/// Blocking millisecond delay.
///
/// A delay always runs to completion, there's no way to cancel it.
pub trait Delay: Debug {
    /// Suspends the calling thread for at least `millis` milliseconds.
    fn sleep_ms(&mut self, millis: u32);
}

impl<T: Delay + ?Sized> Delay for &mut T {
    fn sleep_ms(&mut self, millis: u32) {
        (**self).sleep_ms(millis)
    }
}
