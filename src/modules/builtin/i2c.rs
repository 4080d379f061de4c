use anyhow::Result;

use super::{open_device, resolve_port};
use crate::error::ConsoleError;
use crate::modules::{Module, ModuleContext, ModuleInfo, OptionSet};

/// Bus frequencies the probe can drive
const FREQUENCIES: &[(&str, u32)] = &[("50k", 50_000), ("100k", 100_000), ("400k", 400_000), ("1m", 1_000_000)];

/// First and last non-reserved 7-bit addresses
const FIRST_ADDRESS: u8 = 0x08;
const LAST_ADDRESS: u8 = 0x77;

/// Prepare an I2C bus scan: validate the bus frequency and open the probe
pub struct I2cScan {
    options: OptionSet,
}

impl I2cScan {
    #[must_use]
    pub fn new() -> Self {
        Self {
            options: OptionSet::new()
                .with("port", None, false, "Probe serial device (defaults to HYDRABUS.port)")
                .with("frequency", Some("100k"), true, "Bus frequency: 50k, 100k, 400k or 1m"),
        }
    }

    pub fn parse_frequency(value: &str) -> Result<u32, ConsoleError> {
        FREQUENCIES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(value))
            .map(|(_, hz)| *hz)
            .ok_or_else(|| ConsoleError::InvalidValue {
                option: "frequency".to_string(),
                value: value.to_string(),
            })
    }
}

impl Default for I2cScan {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for I2cScan {
    fn info(&self) -> ModuleInfo {
        ModuleInfo {
            name: "scan",
            description: "Open the probe and validate I2C scan settings",
            author: "hbf-console",
        }
    }

    fn options(&self) -> &OptionSet {
        &self.options
    }

    fn options_mut(&mut self) -> &mut OptionSet {
        &mut self.options
    }

    fn run(&mut self, ctx: &mut ModuleContext<'_>, _args: &[&str]) -> Result<()> {
        let hz = Self::parse_frequency(ctx.option(&self.options, "frequency").unwrap_or_default())?;
        let port = resolve_port(ctx, &self.options).ok_or_else(|| ConsoleError::MissingOption(vec!["port".to_string()]))?;

        let _device = open_device(&port)?;
        ctx.logger.info(format!("Device {port} opened"));
        ctx.logger.user(format!(
            "Bus frequency {hz} Hz validated, scan range 0x{FIRST_ADDRESS:02x}-0x{LAST_ADDRESS:02x}"
        ));
        Ok(())
    }
}
