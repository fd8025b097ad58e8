mod pcf8574;

use crate::lcd::hd44780::command::*;
use crate::{BusError, BusResult};
pub use pcf8574::*;
use std::fmt::Debug;

/// Write-only HD44780 controller interface in 4-bit mode.
///
/// Implementations provide the three raw transfers, the instructions are built on top of them.
pub trait HD44780Driver: Debug {
    /// Clears the display and sets the cursor to the home position.
    fn clear_display(&mut self) -> BusResult<()> {
        self.send_command(CLEAR_DISPLAY)
    }

    /// Sets the cursor to the home position, and undoes any display shift.
    fn return_home(&mut self) -> BusResult<()> {
        self.send_command(RETURN_HOME)
    }

    /// Sets the display to the specified entry mode.
    fn set_entry_mode(&mut self, cursor_direction: CursorDirection, shift: bool) -> BusResult<()> {
        let mut command = ENTRY_MODE_SET;
        if cursor_direction == CursorDirection::Right {
            command |= ENTRY_LEFT;
        }
        if shift {
            command |= ENTRY_SHIFT_INCREMENT;
        }
        self.send_command(command)
    }

    /// Sets the display on/off, cursor on/off, and blinking on/off all at once.
    fn set_display_control(&mut self, flags: DisplayFlags) -> BusResult<()> {
        self.send_command(DISPLAY_CONTROL | flags.bits())
    }

    /// Moves the cursor or shifts the display.
    fn cursor_shift(&mut self, display_shift: bool, direction: CursorDirection) -> BusResult<()> {
        let mut command = CURSOR_SHIFT;
        if display_shift {
            command |= DISPLAY_MOVE;
        }
        if direction == CursorDirection::Right {
            command |= MOVE_RIGHT;
        }
        self.send_command(command)
    }

    /// Sets line count and font. The data length is always 4 bits.
    ///
    /// Only effective once after the reset sequence.
    fn function_set(&mut self, two_lines: bool, font: Font) -> BusResult<()> {
        let mut command = FUNCTION_SET | font.bits();
        if two_lines {
            command |= TWO_LINES;
        }
        self.send_command(command)
    }

    /// Sets the DDRAM address.
    fn set_ddram_address(&mut self, address: u8) -> BusResult<()> {
        if address > 0b01111111 {
            return Err(BusError::InvalidArgument);
        }
        self.send_command(SET_DDRAM_ADDR | address)
    }

    // Low-level transfers
    // These are used by the instructions above and by the display session.

    /// Sends a command to the controller, high nibble first, with RS low.
    ///
    /// Waits after [clear](CLEAR_DISPLAY) and [home](RETURN_HOME), see [is_long_command].
    fn send_command(&mut self, command: u8) -> BusResult<()>;

    /// Sends data to the controller, high nibble first, with RS high.
    fn send_data(&mut self, data: u8) -> BusResult<()>;

    /// Sends only the high nibble of `nibble`, with RS low.
    ///
    /// Used during the reset sequence, while the controller may still be in 8-bit mode.
    fn send_init_nibble(&mut self, nibble: u8) -> BusResult<()>;
}
