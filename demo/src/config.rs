use std::env::var_os;
use std::ffi::OsStr;
use std::path::Path;
use dotenv::var;
use i2c_lcd::i2c::RawI2cBus;
use i2c_lcd::lcd::hd44780::command::Font;
use serde::{Serialize, Deserialize};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    /// 7-bit address of the expander. Usually 0x27, or 0x3F for the PCF8574A.
    pub address: u8,
    pub rows: u8,
    pub columns: u8,
    /// 5x10 dots font, only honored by 1-line displays.
    pub large_font: bool,
    /// Device to map the I2C controller from.
    pub device: String,
    /// Physical address of the I2C controller.
    pub base: u64,
    /// Pause between the demo steps.
    pub step_millis: u64,
}

impl Config {
    /// Loads the config file named by `CONFIG_FILE`, `lcd.json` by default.
    ///
    /// Returns `Ok(None)` only when the file doesn't exist. An unreadable or malformed file is an
    /// error, so it never gets replaced by the default config.
    pub fn try_load() -> eyre::Result<Option<Self>> {
        let config_str = var_os("CONFIG_FILE");
        let config_str: &OsStr = config_str.as_deref().unwrap_or(OsStr::new("lcd.json"));
        Self::try_load_from(Path::new(config_str))
    }

    pub fn try_load_from(config_path: &Path) -> eyre::Result<Option<Self>> {
        if !config_path.exists() {
            return Ok(None);
        }
        let file = std::fs::File::open(config_path)?;
        let reader = std::io::BufReader::new(file);
        let config = serde_json::from_reader(reader)
            .map_err(|e| eyre::eyre!("Invalid config file {}: {}", config_path.display(), e))?;
        Ok(Some(config))
    }

    pub fn save(&self) -> std::io::Result<()> {
        let config_str = var("CONFIG_FILE").unwrap_or_else(|_| "lcd.json".to_string());
        self.save_to(Path::new(&config_str))
    }

    pub fn save_to(&self, config_path: &Path) -> std::io::Result<()> {
        let file = std::fs::File::create(config_path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Overrides the geometry and address with the `I2C_LCD_*` environment variables, if set.
    pub fn apply_env(&mut self) -> eyre::Result<()> {
        if let Ok(address) = var("I2C_LCD_ADDRESS") {
            self.address = parse_address(&address)?;
        }
        if let Ok(rows) = var("I2C_LCD_ROWS") {
            self.rows = rows.trim().parse()?;
        }
        if let Ok(columns) = var("I2C_LCD_COLUMNS") {
            self.columns = columns.trim().parse()?;
        }
        Ok(())
    }

    pub fn font(&self) -> Font {
        if self.large_font { Font::Dots5x10 } else { Font::Dots5x8 }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            address: 0x27,
            rows: 2,
            columns: 16,
            large_font: false,
            device: "/dev/mem".to_string(),
            base: RawI2cBus::BSC1_BASE,
            step_millis: 5000,
        }
    }
}

/// Parses a 7-bit address, in decimal or `0x` prefixed hex.
pub fn parse_address(s: &str) -> eyre::Result<u8> {
    let s = s.trim();
    let address = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16)?,
        None => s.parse()?,
    };
    if address > 0x7F {
        return Err(eyre::eyre!("Address {:#04x} doesn't fit in 7 bits", address));
    }
    Ok(address)
}
