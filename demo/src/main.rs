mod config;

use crate::config::Config;
use dotenv::dotenv;
use i2c_lcd::delay::ThreadDelay;
use i2c_lcd::i2c::RawI2cBus;
use i2c_lcd::lcd::hd44780::display::Lcd;
use log::{debug, info};
use std::fmt::Write;
use std::thread::sleep;
use std::time::Duration;
use sysinfo::System;

fn main() -> eyre::Result<()> {
    dotenv().ok();
    pretty_env_logger::init();

    const UNKNOWN_STR: &str = "???";

    let host_name = System::host_name();
    info!("Hello, {}!", host_name.as_deref().unwrap_or(UNKNOWN_STR));

    debug!("Trying to load config...");
    let mut config = if let Some(config) = Config::try_load()? {
        info!("Config loaded.");
        config
    } else {
        info!("Config not found. Using default");
        let config = Config::default();
        config.save()?;
        info!("Default config saved.");
        config
    };
    config.apply_env()?;

    info!(
        "LCD @ {:#04x}, {}x{}, I2C controller {} @ {:#x}",
        config.address, config.columns, config.rows, config.device, config.base
    );

    debug!("Initializing I2C bus...");
    let bus = RawI2cBus::new_at(&config.device, config.base)?;
    debug!("{:?} initialized.", bus);

    debug!("Initializing LCD...");
    let mut lcd = Lcd::new(
        bus,
        ThreadDelay::new(),
        config.address,
        config.rows,
        config.columns,
        config.font(),
    )?;
    debug!("{:?} initialized.", lcd);

    let step = Duration::from_millis(config.step_millis);

    info!("Cursor blink");
    lcd.blink()?;
    sleep(step);

    info!("Print alphabet");
    for ch in 'A'..='Z' {
        lcd.put_char(ch)?;
        sleep(Duration::from_millis(100));
    }
    sleep(step);

    info!("Display off");
    lcd.display_off()?;
    sleep(step);

    info!("Cursor solid");
    lcd.solid()?;
    sleep(step);

    info!("Display on (cursor now solid)");
    lcd.display_on()?;
    sleep(step);

    info!("Cursor off");
    lcd.cursor_off()?;
    sleep(step);

    info!("Cursor on");
    lcd.cursor_on()?;
    sleep(step);

    info!("Print 0 to 9");
    for ch in '0'..='9' {
        lcd.put_char(ch)?;
    }
    sleep(step);

    info!("Print string HELLO");
    lcd.put_string("HELLO")?;
    sleep(step);

    info!("Backlight off");
    lcd.backlight_off()?;
    sleep(step);

    info!("Clear and cursor off");
    lcd.clear()?;
    lcd.cursor_off()?;

    info!("Backlight on");
    lcd.backlight_on()?;
    sleep(step);

    info!("Print host name");
    write!(lcd, "{}", host_name.as_deref().unwrap_or(UNKNOWN_STR))?;
    sleep(step);

    info!("Print Ready bottom right");
    lcd.move_to(lcd.columns().saturating_sub(5), lcd.rows().saturating_sub(1))?;
    lcd.put_string("Ready")?;
    sleep(step);

    info!("Move cursor outside display");
    lcd.blink()?;
    lcd.move_to(100, 100)?;
    info!("Cursor clamped to {:?}", lcd.cursor());

    Ok(())
}
