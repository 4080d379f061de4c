//! Probe modules shipped with the console, registered into the
//! `hbfmodules` namespace.

mod i2c;
mod uart;

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};

use super::registry::{ModuleFactory, PluginUnit};
use super::{Module, ModuleContext, OptionSet};
use crate::config::HYDRABUS_SECTION;
use crate::error::RegistryError;

pub use i2c::I2cScan;
pub use uart::UartBaudrates;

fn load_uart_baudrates() -> Result<ModuleFactory, RegistryError> {
    Ok(|| Box::new(UartBaudrates::new()) as Box<dyn Module>)
}

fn load_i2c_scan() -> Result<ModuleFactory, RegistryError> {
    Ok(|| Box::new(I2cScan::new()) as Box<dyn Module>)
}

/// Every unit of the built-in namespace
pub fn units() -> Vec<PluginUnit> {
    vec![
        PluginUnit {
            location: "hbfmodules.uart.baudrates",
            load: load_uart_baudrates,
        },
        PluginUnit {
            location: "hbfmodules.i2c.scan",
            load: load_i2c_scan,
        },
    ]
}

/// Serial device for a module: its own `port` option, a global `port`, or
/// the configured probe port
fn resolve_port(ctx: &ModuleContext<'_>, options: &OptionSet) -> Option<String> {
    ctx.option(options, "port")
        .or_else(|| ctx.config.get(HYDRABUS_SECTION, "port"))
        .map(str::to_string)
}

/// Open the probe's serial device for reading and writing
fn open_device(port: &str) -> Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .open(port)
        .with_context(|| format!("Failed to open serial device {port}"))
}
