use crate::{BusError, BusResult, I2cBus};
use log::trace;
use memmap2::{MmapOptions, MmapRaw};
use std::fmt::{Debug, Formatter};
use std::fs::OpenOptions;
use std::time::{Duration, Instant};

/// I2C bus driving the BSC1 controller of the Raspberry Pi directly through its memory-mapped registers.
///
/// Pins 2 (SDA1) and 3 (SCL1) have to already be switched to their ALT0 function, which is what
/// the kernel does when `dtparam=i2c_arm=on` is set. The clock divider is left as configured.
pub struct RawI2cBus {
    mmap: MmapRaw,
    pub timeout: Duration,
}

impl RawI2cBus {
    // 0x7e804000
    // pub const BSC1_BASE: u64 = 0xFE804000;
    pub const BSC1_BASE: u64 = 0x3F804000;
    // pub const BSC1_BASE: u64 = 0x20804000;

    // Register offsets, in words
    const REG_C: usize = 0x00 / 4;
    const REG_S: usize = 0x04 / 4;
    const REG_DLEN: usize = 0x08 / 4;
    const REG_A: usize = 0x0C / 4;
    const REG_FIFO: usize = 0x10 / 4;

    const C_I2CEN: u32 = 1 << 15;
    const C_ST: u32 = 1 << 7;
    const C_CLEAR: u32 = 0b11 << 4;

    const S_DONE: u32 = 1 << 1;
    const S_TXD: u32 = 1 << 4;
    const S_ERR: u32 = 1 << 8;
    const S_CLKT: u32 = 1 << 9;

    const MAX_TRANSFER: usize = 0xFFFF;

    fn create(path: &str, base: u64) -> BusResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)?;

        let mmap = MmapOptions::new()
            .offset(base)
            .len(4096)
            .map_raw(&file)?;

        Ok(RawI2cBus {
            mmap,
            timeout: Duration::from_millis(100),
        })
    }

    pub fn new_mem() -> BusResult<Self> {
        Self::create("/dev/mem", Self::BSC1_BASE)
    }

    /// Maps the controller from any device or file, at the given physical base address.
    ///
    /// Useful for boards where the peripherals live elsewhere (`0xFE804000` on the Pi 4).
    pub fn new_at(path: &str, base: u64) -> BusResult<Self> {
        Self::create(path, base)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn read_reg(&self, reg: usize) -> u32 {
        let mmap = self.mmap.as_ptr() as *const u32;
        unsafe { mmap.add(reg).read_volatile() }
    }

    fn write_reg(&self, reg: usize, value: u32) {
        let mmap = self.mmap.as_mut_ptr() as *mut u32;
        unsafe { mmap.add(reg).write_volatile(value) };
    }
}

impl Debug for RawI2cBus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "RawI2cBus({:?})", self.mmap.as_ptr().addr())
    }
}

impl I2cBus for RawI2cBus {
    fn write(&mut self, address: u8, bytes: &[u8]) -> BusResult<()> {
        if address > 0x7F || bytes.len() > Self::MAX_TRANSFER {
            return Err(BusError::InvalidArgument);
        }

        trace!("BSC write to {:#04x}: {:02x?}", address, bytes);

        // Clear the status flags (write 1 to clear) and the FIFO
        self.write_reg(Self::REG_S, Self::S_CLKT | Self::S_ERR | Self::S_DONE);
        self.write_reg(Self::REG_C, Self::C_CLEAR);

        self.write_reg(Self::REG_A, address as u32);
        self.write_reg(Self::REG_DLEN, bytes.len() as u32);
        self.write_reg(Self::REG_C, Self::C_I2CEN | Self::C_ST);

        let started = Instant::now();
        let mut remaining = bytes.iter();
        let mut next = remaining.next();

        loop {
            let status = self.read_reg(Self::REG_S);

            if status & Self::S_ERR != 0 {
                self.write_reg(Self::REG_S, Self::S_ERR | Self::S_DONE);
                return Err(BusError::Nack { address });
            }
            if status & Self::S_CLKT != 0 {
                self.write_reg(Self::REG_S, Self::S_CLKT | Self::S_DONE);
                return Err(BusError::Timeout);
            }
            if status & Self::S_DONE != 0 {
                self.write_reg(Self::REG_S, Self::S_DONE);
                return Ok(());
            }

            // Keep the FIFO fed while it has room
            if status & Self::S_TXD != 0 {
                if let Some(&byte) = next {
                    self.write_reg(Self::REG_FIFO, byte as u32);
                    next = remaining.next();
                    continue;
                }
            }

            if started.elapsed() > self.timeout {
                self.write_reg(Self::REG_C, Self::C_CLEAR);
                return Err(BusError::Timeout);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::path::PathBuf;

    fn register_file(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("i2c_lcd_{}_{}", name, std::process::id()));
        let file = File::create(&path).unwrap();
        file.set_len(4096).unwrap();
        path
    }

    #[test]
    fn rejects_ten_bit_address() {
        let path = register_file("ten_bit");
        let mut bus = RawI2cBus::new_at(path.to_str().unwrap(), 0).unwrap();
        assert_eq!(bus.write(0x80, &[0x00]), Err(BusError::InvalidArgument));
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn times_out_when_controller_never_finishes() {
        let path = register_file("timeout");
        let mut bus = RawI2cBus::new_at(path.to_str().unwrap(), 0)
            .unwrap()
            .with_timeout(Duration::from_millis(10));

        assert_eq!(bus.write(0x27, &[0x08]), Err(BusError::Timeout));

        // Address and length registers were programmed before the transfer started
        assert_eq!(bus.read_reg(RawI2cBus::REG_A), 0x27);
        assert_eq!(bus.read_reg(RawI2cBus::REG_DLEN), 1);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn missing_device_file_is_io_error() {
        let result = RawI2cBus::new_at("/nonexistent/i2c_lcd_mem", 0);
        assert!(matches!(result, Err(BusError::Io(std::io::ErrorKind::NotFound))));
    }
}
