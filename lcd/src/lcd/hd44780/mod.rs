//! HD44780 character LCD, connected through an I2C port expander and driven in 4-bit mode.
//!
//! [display::Lcd] is the high level API: it initializes the controller, tracks the cursor over
//! the character grid and wraps lines. It's built on [driver::HD44780Driver], which encodes
//! instructions and characters into nibble transfers, and [driver::Pcf8574HD44780Driver], which
//! turns those into expander writes.
//!
//! ```no_run
//! use i2c_lcd::delay::ThreadDelay;
//! use i2c_lcd::i2c::RawI2cBus;
//! use i2c_lcd::lcd::hd44780::command::Font;
//! use i2c_lcd::lcd::hd44780::display::Lcd;
//!
//! let bus = RawI2cBus::new_mem()?;
//! let mut lcd = Lcd::new(bus, ThreadDelay::new(), 0x27, 2, 16, Font::Dots5x8)?;
//! lcd.put_string("Hello\nworld")?;
//! # Ok::<(), i2c_lcd::BusError>(())
//! ```

pub mod command;
pub mod display;
pub mod driver;
