use crate::lcd::hd44780::command::*;
use crate::lcd::hd44780::driver::{HD44780Driver, Pcf8574HD44780Driver};
use crate::{BusResult, Delay, I2cBus};
use log::{debug, warn};
use std::fmt;

/// Character LCD behind a PCF8574 backpack, with a tracked cursor.
///
/// The controller can't be read back through the expander, so the cursor position, the display
/// flags and the backlight state are all kept here and never queried from the hardware.
///
/// The geometry isn't validated, the controller has no way to tell whether a given combination
/// makes sense. Positions are clamped to it instead.
///
/// Not safe to share between threads without a lock, every operation mutates the session.
#[derive(Debug)]
pub struct Lcd<B: I2cBus, D: Delay> {
    driver: Pcf8574HD44780Driver<B, D>,
    rows: u8,
    columns: u8,
    display: DisplayFlags,
    x: u8,
    y: u8,
}

impl<B: I2cBus, D: Delay> Lcd<B, D> {
    /// Connects to the display at `address` and runs the initialization by instruction from the
    /// HD44780 datasheet.
    ///
    /// Leaves the display on, the cursor hidden, the backlight on and the cursor at (0, 0).
    ///
    /// # Errors
    /// Any [BusError](crate::BusError) from the bus. There is no recovery: the controller may be
    /// in any state afterwards, and the whole construction has to be retried.
    pub fn new(bus: B, delay: D, address: u8, rows: u8, columns: u8, font: Font) -> BusResult<Self> {
        let mut lcd = Lcd {
            driver: Pcf8574HD44780Driver::new(bus, delay, address),
            rows,
            columns,
            display: DisplayFlags::NONE,
            x: 0,
            y: 0,
        };
        lcd.init(font)?;
        Ok(lcd)
    }

    fn init(&mut self, font: Font) -> BusResult<()> {
        debug!("Initializing {}x{} LCD at {:#04x}", self.columns, self.rows, self.driver.address());

        // Let the expander outputs and the controller settle after power on
        self.driver.write_raw(0x00)?;
        self.driver.sleep_ms(50);

        // Synchronize, whatever mode the controller was in
        self.driver.send_init_nibble(RESET)?;
        self.driver.sleep_ms(5);
        self.driver.send_init_nibble(RESET)?;
        self.driver.sleep_ms(1);
        self.driver.send_init_nibble(RESET)?;
        self.driver.sleep_ms(1);
        debug!("Controller in 8-bit mode");

        self.driver.send_init_nibble(FUNCTION_SET)?;
        debug!("Controller in 4-bit mode");

        // Lines and font are fixed from here on
        self.driver.function_set(self.rows != 1, font)?;
        self.driver.set_display_control(self.display)?;
        self.driver.clear_display()?;
        self.driver.set_entry_mode(CursorDirection::Right, false)?;

        self.display_on()?;
        self.backlight_on()?;
        debug!("LCD initialized");
        Ok(())
    }

    pub fn address(&self) -> u8 {
        self.driver.address()
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn columns(&self) -> u8 {
        self.columns
    }

    pub fn display_flags(&self) -> DisplayFlags {
        self.display
    }

    pub fn is_backlight_on(&self) -> bool {
        self.driver.is_backlight_on()
    }

    /// Where the next character will be written, as `(column, row)`.
    ///
    /// After filling the last column of a row, this is already the start of the next row, even
    /// though the controller is only repositioned when the next character comes.
    pub fn cursor(&self) -> (u8, u8) {
        if self.x >= self.columns {
            (0, self.next_row())
        } else {
            (self.x, self.y)
        }
    }

    fn next_row(&self) -> u8 {
        if self.y + 1 >= self.rows { 0 } else { self.y + 1 }
    }

    fn update_display_control(&mut self) -> BusResult<()> {
        self.driver.set_display_control(self.display)
    }

    /// Clears the display and moves the cursor to the top left.
    pub fn clear(&mut self) -> BusResult<()> {
        self.driver.clear_display()?;
        self.driver.return_home()?;
        self.x = 0;
        self.y = 0;
        Ok(())
    }

    /// Moves the cursor to the top left, keeping the contents.
    pub fn home(&mut self) -> BusResult<()> {
        self.driver.return_home()?;
        self.x = 0;
        self.y = 0;
        Ok(())
    }

    /// Turns on (unblanks) the display.
    pub fn display_on(&mut self) -> BusResult<()> {
        self.display.insert(DisplayFlags::DISPLAY);
        self.update_display_control()
    }

    /// Turns off (blanks) the display. The contents are kept.
    pub fn display_off(&mut self) -> BusResult<()> {
        self.display.remove(DisplayFlags::DISPLAY);
        self.update_display_control()
    }

    /// Makes the cursor visible.
    pub fn cursor_on(&mut self) -> BusResult<()> {
        self.display.insert(DisplayFlags::CURSOR);
        self.update_display_control()
    }

    /// Hides the cursor. Also stops it blinking.
    pub fn cursor_off(&mut self) -> BusResult<()> {
        self.display.remove(DisplayFlags::CURSOR | DisplayFlags::BLINK);
        self.update_display_control()
    }

    /// Makes the cursor blink, which also makes it visible.
    pub fn blink(&mut self) -> BusResult<()> {
        self.display.insert(DisplayFlags::BLINK | DisplayFlags::CURSOR);
        self.update_display_control()
    }

    /// Makes the cursor solid, which also makes it visible.
    pub fn solid(&mut self) -> BusResult<()> {
        self.display.remove(DisplayFlags::BLINK);
        self.display.insert(DisplayFlags::CURSOR);
        self.update_display_control()
    }

    pub fn backlight_on(&mut self) -> BusResult<()> {
        self.driver.set_backlight(true)
    }

    pub fn backlight_off(&mut self) -> BusResult<()> {
        self.driver.set_backlight(false)
    }

    /// Moves the cursor to column `x` of row `y`, (0, 0) being the top left.
    ///
    /// Out of range positions are clamped to the last column and row.
    pub fn move_to(&mut self, x: u8, y: u8) -> BusResult<()> {
        self.x = x.min(self.columns.saturating_sub(1));
        self.y = y.min(self.rows.saturating_sub(1));
        let address = row_address(self.x, self.y) & 0b01111111;
        self.driver.set_ddram_address(address)
    }

    /// Writes a character and advances the cursor.
    ///
    /// Past the last column, writing continues on the next row, and past the last row on the
    /// first one. `'\n'` moves to the start of the next row without writing anything.
    ///
    /// Characters outside of the 8-bit range the controller ROM covers are written as `?`.
    pub fn put_char(&mut self, ch: char) -> BusResult<()> {
        if self.x >= self.columns || ch == '\n' {
            let row = self.next_row();
            self.move_to(0, row)?;
        }
        if ch != '\n' {
            let code = match u8::try_from(ch) {
                Ok(code) => code,
                Err(_) => {
                    warn!("Character out of range: {}", ch);
                    b'?'
                }
            };
            self.driver.send_data(code)?;
            self.x += 1;
        }
        Ok(())
    }

    /// Writes every character of `s`, in order, see [Self::put_char].
    pub fn put_string(&mut self, s: &str) -> BusResult<()> {
        for ch in s.chars() {
            self.put_char(ch)?;
        }
        Ok(())
    }

    /// Gives the bus and the delay back. The display keeps showing what it showed.
    pub fn release(self) -> (B, D) {
        self.driver.release()
    }
}

impl<B: I2cBus, D: Delay> fmt::Write for Lcd<B, D> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.put_string(s).map_err(|_| fmt::Error)
    }
}
