//! HD44780 instruction set.
//!
//! Only the write-only instructions are listed, reading the busy flag or the RAM is not supported
//! over the expander.

use std::ops::{BitOr, BitOrAssign};

pub const CLEAR_DISPLAY: u8 = 0b00000001;
pub const RETURN_HOME: u8 = 0b00000010;
pub const ENTRY_MODE_SET: u8 = 0b00000100;
pub const DISPLAY_CONTROL: u8 = 0b00001000;
pub const CURSOR_SHIFT: u8 = 0b00010000;
pub const FUNCTION_SET: u8 = 0b00100000;
pub const SET_DDRAM_ADDR: u8 = 0b10000000;

// Entry mode set
pub const ENTRY_LEFT: u8 = 0b00000010;
pub const ENTRY_SHIFT_INCREMENT: u8 = 0b00000001;

// Cursor or display shift
pub const DISPLAY_MOVE: u8 = 0b00001000;
pub const MOVE_RIGHT: u8 = 0b00000100;

// Function set
pub const MODE_8BIT: u8 = 0b00010000;
pub const TWO_LINES: u8 = 0b00001000;
pub const FONT_5X10: u8 = 0b00000100;

/// Function set with 8-bit interface, used for the reset sequence.
pub const RESET: u8 = FUNCTION_SET | MODE_8BIT;

/// Commands that take far longer than the usual ~40 us: clear display and return home.
///
/// Worst case for both is 4.1 ms, so the driver waits [LONG_COMMAND_DELAY_MS] after them.
pub const fn is_long_command(command: u8) -> bool {
    command <= RETURN_HOME | CLEAR_DISPLAY
}

pub const LONG_COMMAND_DELAY_MS: u32 = 5;

/// DDRAM offset of each row, indexed by `row & 0b11`.
///
/// The second line starts at `0x40`. On 4-line modules the third and fourth rows are the
/// continuation of the first and second, hence the extra `0x14` (20 columns).
pub const fn row_address(column: u8, row: u8) -> u8 {
    let mut address = column;
    if row & 1 != 0 {
        address = address.wrapping_add(0x40);
    }
    if row & 2 != 0 {
        address = address.wrapping_add(0x14);
    }
    address
}

/// Character font, selected once by the function set instruction.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum Font {
    #[default]
    Dots5x8,
    /// Only available in 1-line mode.
    Dots5x10,
}

impl Font {
    pub fn bits(self) -> u8 {
        match self {
            Font::Dots5x8 => 0,
            Font::Dots5x10 => FONT_5X10,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CursorDirection {
    /// Moves the cursor to the left after writing data.
    Left,
    /// Moves the cursor to the right after writing data.
    Right,
}

/// Bits of the display control instruction.
///
/// The display session keeps one of these and sends it whole with every toggle, so turning one
/// feature on or off never disturbs the others.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct DisplayFlags(u8);

impl DisplayFlags {
    pub const NONE: DisplayFlags = DisplayFlags(0);
    pub const BLINK: DisplayFlags = DisplayFlags(0b001);
    pub const CURSOR: DisplayFlags = DisplayFlags(0b010);
    pub const DISPLAY: DisplayFlags = DisplayFlags(0b100);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: DisplayFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: DisplayFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: DisplayFlags) {
        self.0 &= !other.0;
    }
}

impl std::fmt::Debug for DisplayFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplayFlags")
            .field("display", &self.contains(Self::DISPLAY))
            .field("cursor", &self.contains(Self::CURSOR))
            .field("blink", &self.contains(Self::BLINK))
            .finish()
    }
}

impl BitOr for DisplayFlags {
    type Output = DisplayFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        DisplayFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for DisplayFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_offsets_match_controller_layout() {
        assert_eq!(row_address(0, 0), 0x00);
        assert_eq!(row_address(0, 1), 0x40);
        assert_eq!(row_address(0, 2), 0x14);
        assert_eq!(row_address(0, 3), 0x54);
        assert_eq!(row_address(19, 3), 0x67);
    }

    #[test]
    fn only_clear_and_home_are_long() {
        assert!(is_long_command(CLEAR_DISPLAY));
        assert!(is_long_command(RETURN_HOME));
        assert!(!is_long_command(ENTRY_MODE_SET | ENTRY_LEFT));
        assert!(!is_long_command(SET_DDRAM_ADDR));
    }

    #[test]
    fn flags_insert_and_remove_own_bits_only() {
        let mut flags = DisplayFlags::DISPLAY | DisplayFlags::BLINK;
        flags.insert(DisplayFlags::CURSOR);
        assert_eq!(flags.bits(), 0b111);
        flags.remove(DisplayFlags::BLINK);
        assert_eq!(flags.bits(), 0b110);
        assert!(flags.contains(DisplayFlags::DISPLAY | DisplayFlags::CURSOR));
        assert!(!flags.contains(DisplayFlags::BLINK));
    }
}
