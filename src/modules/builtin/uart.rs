use anyhow::Result;

use super::{open_device, resolve_port};
use crate::error::ConsoleError;
use crate::modules::{Module, ModuleContext, ModuleInfo, OptionSet};

const DEFAULT_RATES: &str = "9600,19200,38400,57600,115200";

/// Validate a list of candidate UART baudrates against the probe device
pub struct UartBaudrates {
    options: OptionSet,
}

impl UartBaudrates {
    #[must_use]
    pub fn new() -> Self {
        Self {
            options: OptionSet::new()
                .with("port", None, false, "Probe serial device (defaults to HYDRABUS.port)")
                .with("baudrates", Some(DEFAULT_RATES), true, "Comma separated candidate baudrates"),
        }
    }

    /// Parse a comma separated rate list, rejecting zero and non-numeric entries
    pub fn parse_rates(list: &str) -> Result<Vec<u32>, ConsoleError> {
        let invalid = || ConsoleError::InvalidValue {
            option: "baudrates".to_string(),
            value: list.to_string(),
        };

        let rates = list
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(|r| r.parse::<u32>().ok().filter(|r| *r > 0))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(invalid)?;

        if rates.is_empty() {
            return Err(invalid());
        }
        Ok(rates)
    }
}

impl Default for UartBaudrates {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for UartBaudrates {
    fn info(&self) -> ModuleInfo {
        ModuleInfo {
            name: "baudrates",
            description: "Open the probe and validate candidate UART baudrates",
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
        let rates = Self::parse_rates(ctx.option(&self.options, "baudrates").unwrap_or_default())?;
        let port = resolve_port(ctx, &self.options).ok_or_else(|| ConsoleError::MissingOption(vec!["port".to_string()]))?;

        let _device = open_device(&port)?;
        let listed: Vec<String> = rates.iter().map(u32::to_string).collect();
        ctx.logger.info(format!("Device {port} opened"));
        ctx.logger.user(format!("{} candidate rates validated: {}", rates.len(), listed.join(", ")));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rates() {
        assert_eq!(UartBaudrates::parse_rates("9600, 115200").unwrap(), vec![9600, 115200]);
        assert!(UartBaudrates::parse_rates("9600,fast").is_err());
        assert!(UartBaudrates::parse_rates("0").is_err());
        assert!(UartBaudrates::parse_rates(" , ").is_err());
    }

    #[test]
    fn test_default_options() {
        let module = UartBaudrates::new();
        assert_eq!(module.options().value("baudrates"), Some(DEFAULT_RATES));
        assert_eq!(module.options().names().collect::<Vec<_>>(), vec!["port", "baudrates"]);
    }
}
