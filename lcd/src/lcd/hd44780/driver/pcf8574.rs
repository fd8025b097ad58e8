use crate::lcd::hd44780::command::{LONG_COMMAND_DELAY_MS, is_long_command};
use crate::lcd::hd44780::driver::HD44780Driver;
use crate::{BusResult, Delay, I2cBus};
use log::trace;

/// HD44780 driver through a PCF8574 I2C port expander, as found on the common LCD backpacks.
///
/// Expander bits:
///
/// | Bit   | Mask                         | LCD pin          |
/// |-------|------------------------------|------------------|
/// | 0     | [MASK_RS](Self::MASK_RS)     | RS               |
/// | 1     | [MASK_RW](Self::MASK_RW)     | RW (always low)  |
/// | 2     | [MASK_E](Self::MASK_E)       | E                |
/// | 3     | [MASK_BACKLIGHT](Self::MASK_BACKLIGHT) | backlight |
/// | 4 - 7 |                              | DB4 - DB7        |
///
/// Every nibble costs two bus writes, one with E high and one with E low. The controller latches
/// the data on the falling edge. The backlight bit is part of every single byte written, otherwise
/// the backlight would go off on each transfer.
#[derive(Debug)]
pub struct Pcf8574HD44780Driver<B: I2cBus, D: Delay> {
    bus: B,
    delay: D,
    address: u8,
    backlight: bool,
}

impl<B: I2cBus, D: Delay> Pcf8574HD44780Driver<B, D> {
    pub const MASK_RS: u8 = 0b0001;
    pub const MASK_RW: u8 = 0b0010;
    pub const MASK_E: u8 = 0b0100;
    pub const MASK_BACKLIGHT: u8 = 0b1000;

    /// Creates the driver. Nothing is written to the bus until the first transfer.
    ///
    /// The backlight starts off.
    pub fn new(bus: B, delay: D, address: u8) -> Self {
        Pcf8574HD44780Driver {
            bus,
            delay,
            address,
            backlight: false,
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn is_backlight_on(&self) -> bool {
        self.backlight
    }

    fn backlight_bit(&self) -> u8 {
        if self.backlight { Self::MASK_BACKLIGHT } else { 0 }
    }

    /// Turns the backlight on or off, immediately.
    ///
    /// Writes the backlight bit alone, with every LCD line low.
    pub fn set_backlight(&mut self, on: bool) -> BusResult<()> {
        self.backlight = on;
        let byte = self.backlight_bit();
        trace!("Backlight: {}", on);
        self.bus.write(self.address, &[byte])
    }

    /// Writes a byte as is, without pulsing E or adding the backlight bit.
    pub fn write_raw(&mut self, byte: u8) -> BusResult<()> {
        trace!("Writing raw: {:08b}", byte);
        self.bus.write(self.address, &[byte])
    }

    pub fn sleep_ms(&mut self, millis: u32) {
        self.delay.sleep_ms(millis);
    }

    /// Writes the packed nibble and control bits, pulsing E.
    fn send_byte(&mut self, packed: u8) -> BusResult<()> {
        let backlight = self.backlight_bit();
        trace!("Writing: {:08b}", packed | backlight);
        self.bus.write(self.address, &[packed | Self::MASK_E | backlight])?;
        self.bus.write(self.address, &[packed | backlight])?;
        Ok(())
    }

    fn send(&mut self, data: u8, rs: bool) -> BusResult<()> {
        trace!("Sending data: {:08b}, RS: {}", data, rs);

        let rs = if rs { Self::MASK_RS } else { 0 };
        let high_nibble = data & 0xF0;
        let low_nibble = (data << 4) & 0xF0;

        self.send_byte(high_nibble | rs)?;
        self.send_byte(low_nibble | rs)?;
        Ok(())
    }

    /// Gives the bus and the delay back.
    pub fn release(self) -> (B, D) {
        (self.bus, self.delay)
    }

    #[cfg(test)]
    pub(crate) fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }
}

impl<B: I2cBus, D: Delay> HD44780Driver for Pcf8574HD44780Driver<B, D> {
    fn send_command(&mut self, command: u8) -> BusResult<()> {
        self.send(command, false)?;
        if is_long_command(command) {
            self.delay.sleep_ms(LONG_COMMAND_DELAY_MS);
        }
        Ok(())
    }

    fn send_data(&mut self, data: u8) -> BusResult<()> {
        self.send(data, true)
    }

    fn send_init_nibble(&mut self, nibble: u8) -> BusResult<()> {
        trace!("Sending init nibble: {:04b}", nibble >> 4);
        self.send_byte(nibble & 0xF0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BusError;
    use crate::lcd::hd44780::command::*;
    use crate::testing::{RecordingBus, RecordingDelay};

    type Driver = Pcf8574HD44780Driver<RecordingBus, RecordingDelay>;

    fn driver() -> Driver {
        Pcf8574HD44780Driver::new(RecordingBus::new(), RecordingDelay::new(), 0x27)
    }

    #[test]
    fn command_is_two_enable_pulses_high_nibble_first() {
        let mut lcd = driver();
        lcd.send_command(0x28).unwrap();

        let (bus, delay) = lcd.release();
        assert_eq!(bus.bytes(), vec![0x24, 0x20, 0x84, 0x80]);
        assert!(bus.writes.iter().all(|(address, bytes)| *address == 0x27 && bytes.len() == 1));
        assert!(bus.bytes().iter().all(|byte| byte & Driver::MASK_RW == 0));
        assert!(delay.delays.is_empty());
    }

    #[test]
    fn data_sets_register_select() {
        let mut lcd = driver();
        lcd.send_data(b'H').unwrap();

        let (bus, _) = lcd.release();
        // 'H' = 0x48
        assert_eq!(bus.bytes(), vec![0x45, 0x41, 0x85, 0x81]);
    }

    #[test]
    fn init_nibble_sends_high_nibble_only() {
        let mut lcd = driver();
        lcd.send_init_nibble(RESET | 0x0F).unwrap();

        let (bus, _) = lcd.release();
        assert_eq!(bus.bytes(), vec![0x34, 0x30]);
    }

    #[test]
    fn clear_and_home_wait_afterwards() {
        let mut lcd = driver();
        lcd.clear_display().unwrap();
        lcd.return_home().unwrap();
        lcd.set_entry_mode(CursorDirection::Right, false).unwrap();

        let (bus, delay) = lcd.release();
        assert_eq!(delay.delays, vec![5, 5]);
        assert_eq!(bus.writes.len(), 12);
    }

    #[test]
    fn backlight_bit_is_kept_on_every_byte() {
        let mut lcd = driver();
        lcd.set_backlight(true).unwrap();
        lcd.send_command(DISPLAY_CONTROL | DisplayFlags::DISPLAY.bits()).unwrap();
        lcd.send_data(b'A').unwrap();
        lcd.send_init_nibble(RESET).unwrap();

        let (bus, _) = lcd.release();
        let bytes = bus.bytes();
        assert_eq!(bytes[0], 0x08);
        assert!(bytes.iter().all(|byte| byte & 0x08 != 0));
    }

    #[test]
    fn backlight_off_clears_bit() {
        let mut lcd = driver();
        lcd.set_backlight(true).unwrap();
        lcd.set_backlight(false).unwrap();
        lcd.send_data(b'A').unwrap();
        assert!(!lcd.is_backlight_on());

        let (bus, _) = lcd.release();
        assert_eq!(bus.bytes(), vec![0x08, 0x00, 0x45, 0x41, 0x15, 0x11]);
    }

    #[test]
    fn instructions_encode_their_flags() {
        let mut lcd = driver();
        lcd.function_set(true, Font::Dots5x8).unwrap();
        lcd.cursor_shift(true, CursorDirection::Left).unwrap();
        lcd.set_display_control(DisplayFlags::DISPLAY | DisplayFlags::BLINK).unwrap();

        let (bus, _) = lcd.release();
        let bytes = bus.bytes();
        // Second byte of each pulse carries the nibble without E
        let nibbles: Vec<u8> = bytes.iter().skip(1).step_by(2).map(|byte| byte >> 4).collect();
        assert_eq!(nibbles, vec![0x2, 0x8, 0x1, 0x8, 0x0, 0xD]);
    }

    #[test]
    fn ddram_address_out_of_range_is_rejected() {
        let mut lcd = driver();
        assert_eq!(lcd.set_ddram_address(0x80), Err(BusError::InvalidArgument));
        lcd.set_ddram_address(0x54).unwrap();
        let (bus, _) = lcd.release();
        assert_eq!(bus.bytes(), vec![0xD4, 0xD0, 0x44, 0x40]);
    }

    #[test]
    fn bus_failure_stops_transfer() {
        let mut lcd = Pcf8574HD44780Driver::new(
            RecordingBus::failing_after(1),
            RecordingDelay::new(),
            0x27,
        );
        assert_eq!(lcd.send_data(b'A'), Err(BusError::Nack { address: 0x27 }));

        let (bus, _) = lcd.release();
        assert_eq!(bus.writes.len(), 1);
    }
}
