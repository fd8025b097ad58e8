//! Fakes for the bus and delay capabilities, used by the unit tests.

use crate::{BusError, BusResult, Delay, I2cBus};

/// Records every write. Can be armed to fail once a number of writes went through.
#[derive(Debug, Default)]
pub struct RecordingBus {
    pub writes: Vec<(u8, Vec<u8>)>,
    pub fail_after: Option<usize>,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_after(writes: usize) -> Self {
        RecordingBus {
            writes: Vec::new(),
            fail_after: Some(writes),
        }
    }

    /// All written bytes, flattened, ignoring the address.
    pub fn bytes(&self) -> Vec<u8> {
        self.writes.iter().flat_map(|(_, bytes)| bytes.iter().copied()).collect()
    }

    pub fn clear(&mut self) {
        self.writes.clear();
    }
}

impl I2cBus for RecordingBus {
    fn write(&mut self, address: u8, bytes: &[u8]) -> BusResult<()> {
        if let Some(limit) = self.fail_after {
            if self.writes.len() >= limit {
                return Err(BusError::Nack { address });
            }
        }
        self.writes.push((address, bytes.to_vec()));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub delays: Vec<u32>,
}

impl RecordingDelay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Delay for RecordingDelay {
    fn sleep_ms(&mut self, millis: u32) {
        self.delays.push(millis);
    }
}
