use crate::{BusError, BusResult, Delay, I2cBus};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error, ErrorKind, I2c, NoAcknowledgeSource};
use std::fmt::{Debug, Formatter};

/// Adapts any `embedded-hal` 1.0 [I2c] implementation into an [I2cBus].
pub struct HalI2cBus<T> {
    inner: T,
}

impl<T: I2c> HalI2cBus<T> {
    pub fn new(inner: T) -> Self {
        HalI2cBus { inner }
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> Debug for HalI2cBus<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "HalI2cBus<{}>", std::any::type_name::<T>())
    }
}

impl<T: I2c> I2cBus for HalI2cBus<T> {
    fn write(&mut self, address: u8, bytes: &[u8]) -> BusResult<()> {
        self.inner
            .write(address, bytes)
            .map_err(|err| match err.kind() {
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
                | ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown) => {
                    BusError::Nack { address }
                }
                kind => BusError::Other(format!("{:?}", kind)),
            })
    }
}

/// Adapts any `embedded-hal` 1.0 [DelayNs] implementation into a [Delay].
pub struct HalDelay<T> {
    inner: T,
}

impl<T: DelayNs> HalDelay<T> {
    pub fn new(inner: T) -> Self {
        HalDelay { inner }
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> Debug for HalDelay<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "HalDelay<{}>", std::any::type_name::<T>())
    }
}

impl<T: DelayNs> Delay for HalDelay<T> {
    fn sleep_ms(&mut self, millis: u32) {
        self.inner.delay_ms(millis);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorType, Operation};

    #[derive(Default)]
    struct FakeI2c {
        written: Vec<(u8, Vec<u8>)>,
        error: Option<ErrorKind>,
    }

    impl ErrorType for FakeI2c {
        type Error = ErrorKind;
    }

    impl I2c for FakeI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if let Some(kind) = self.error {
                return Err(kind);
            }
            for operation in operations {
                if let Operation::Write(bytes) = operation {
                    self.written.push((address, bytes.to_vec()));
                }
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeDelay {
        total_ns: u64,
    }

    impl DelayNs for FakeDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += ns as u64;
        }
    }

    #[test]
    fn forwards_writes() {
        let mut bus = HalI2cBus::new(FakeI2c::default());
        bus.write(0x27, &[0x0C, 0x08]).unwrap();
        assert_eq!(bus.into_inner().written, vec![(0x27, vec![0x0C, 0x08])]);
    }

    #[test]
    fn address_nack_maps_to_nack() {
        let mut bus = HalI2cBus::new(FakeI2c {
            error: Some(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)),
            ..Default::default()
        });
        assert_eq!(bus.write(0x3F, &[0x00]), Err(BusError::Nack { address: 0x3F }));
    }

    #[test]
    fn other_errors_keep_their_kind() {
        let mut bus = HalI2cBus::new(FakeI2c {
            error: Some(ErrorKind::ArbitrationLoss),
            ..Default::default()
        });
        assert_eq!(
            bus.write(0x27, &[0x00]),
            Err(BusError::Other("ArbitrationLoss".to_string()))
        );
    }

    #[test]
    fn delay_is_forwarded_in_milliseconds() {
        let mut delay = HalDelay::new(FakeDelay::default());
        delay.sleep_ms(5);
        delay.sleep_ms(1);
        assert_eq!(delay.into_inner().total_ns, 6_000_000);
    }
}
