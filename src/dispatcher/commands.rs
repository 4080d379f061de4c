//! Built-in command handlers

use anyhow::{Context, Result};
use tracing::debug;

use super::COMMANDS;
use crate::console::Console;
use crate::error::ConsoleError;

pub(super) fn help(console: &mut Console, _args: &[&str]) -> Result<()> {
    let rows: Vec<Vec<&str>> = COMMANDS.iter().map(|c| vec![c.name, c.description]).collect();

    let logger = console.logger_mut();
    logger.print("");
    logger.print("Core Commands");
    logger.print("=============");
    logger.print_table(&["Command", "Description"], &rows);
    Ok(())
}

pub(super) fn use_module(console: &mut Console, args: &[&str]) -> Result<()> {
    let Some(path) = args.first() else {
        console.session_mut().deactivate();
        return Ok(());
    };

    let (registry, session) = console.registry_and_session();
    let descriptor = registry
        .find(path)
        .ok_or_else(|| ConsoleError::UnknownModule((*path).to_string()))?;
    session.activate(descriptor);
    debug!(path = %path, "Module activated");
    Ok(())
}

pub(super) fn back(console: &mut Console, _args: &[&str]) -> Result<()> {
    console.session_mut().deactivate();
    Ok(())
}

pub(super) fn show(console: &mut Console, args: &[&str]) -> Result<()> {
    const USAGE: &str = "show <options|global|config|modules>";

    match args.first().copied() {
        Some("options") => show_options(console),
        Some("global") => {
            let rows: Vec<Vec<String>> = console
                .session()
                .globals()
                .iter()
                .map(|(k, v)| vec![k.clone(), v.clone()])
                .collect();
            console.logger_mut().print_table(&["Name", "Value"], &rows);
            Ok(())
        }
        Some("config") => {
            let sections: Vec<(String, Vec<Vec<String>>)> = console
                .config()
                .sections()
                .map(|(name, keys)| {
                    let rows = keys.iter().map(|(k, v)| vec![k.clone(), v.clone()]).collect();
                    (name.to_string(), rows)
                })
                .collect();
            let origin = match console.config().path() {
                Some(path) => format!("Configuration file: {}", path.display()),
                None => "Configuration is not backed by a file".to_string(),
            };
            let logger = console.logger_mut();
            logger.print(origin);
            for (name, rows) in sections {
                logger.print(format!("[{name}]"));
                logger.print_table(&["Key", "Value"], &rows);
                logger.print("");
            }
            Ok(())
        }
        Some("modules") => {
            let rows: Vec<Vec<String>> = console
                .registry()
                .descriptors()
                .iter()
                .map(|d| vec![d.path().to_string(), d.instantiate().info().description.to_string()])
                .collect();
            console.logger_mut().print_table(&["Path", "Description"], &rows);
            Ok(())
        }
        Some(other) => Err(ConsoleError::InvalidValue {
            option: "show".to_string(),
            value: other.to_string(),
        }
        .into()),
        None => Err(ConsoleError::MissingArgument(USAGE).into()),
    }
}

fn show_options(console: &mut Console) -> Result<()> {
    let active = console.session().active().ok_or(ConsoleError::NoModuleSelected)?;
    let info = active.module.info();
    let header = format!("{} [{}] by {}: {}", info.name, active.path, info.author, info.description);
    let rows: Vec<Vec<String>> = active
        .module
        .options()
        .iter()
        .map(|o| {
            vec![
                o.name.clone(),
                o.value.clone().unwrap_or_default(),
                if o.required { "yes" } else { "no" }.to_string(),
                o.description.clone(),
            ]
        })
        .collect();

    let logger = console.logger_mut();
    logger.print(header);
    logger.print_table(&["Name", "Value", "Required", "Description"], &rows);
    Ok(())
}

/// `<name> <value...>`, the value being the remaining words joined by one space
fn name_and_value<'a>(args: &[&'a str], usage: &'static str) -> Result<(&'a str, String), ConsoleError> {
    match args {
        [name, value @ ..] if !value.is_empty() => Ok((*name, value.join(" "))),
        _ => Err(ConsoleError::MissingArgument(usage)),
    }
}

pub(super) fn set(console: &mut Console, args: &[&str]) -> Result<()> {
    let (name, value) = name_and_value(args, "set <option> <value>")?;
    let active = console.session_mut().active_mut().ok_or(ConsoleError::NoModuleSelected)?;
    active.module.options_mut().set(name, &value)?;
    console.logger_mut().info(format!("{name} => {value}"));
    Ok(())
}

pub(super) fn unset(console: &mut Console, args: &[&str]) -> Result<()> {
    let name = args.first().ok_or(ConsoleError::MissingArgument("unset <option>"))?;
    let active = console.session_mut().active_mut().ok_or(ConsoleError::NoModuleSelected)?;
    active.module.options_mut().unset(name)?;
    console.logger_mut().info(format!("Unset {name}"));
    Ok(())
}

pub(super) fn setg(console: &mut Console, args: &[&str]) -> Result<()> {
    let (name, value) = name_and_value(args, "setg <option> <value>")?;
    console.session_mut().set_global(name, &value);
    console.logger_mut().info(format!("{name} => {value}"));
    Ok(())
}

pub(super) fn unsetg(console: &mut Console, args: &[&str]) -> Result<()> {
    let name = args.first().ok_or(ConsoleError::MissingArgument("unsetg <option>"))?;
    if !console.session_mut().unset_global(name) {
        return Err(ConsoleError::UnknownOption((*name).to_string()).into());
    }
    console.logger_mut().info(format!("Unset global {name}"));
    Ok(())
}

pub(super) fn setc(console: &mut Console, args: &[&str]) -> Result<()> {
    const USAGE: &str = "setc <section> <key> <value>";

    let [section, rest @ ..] = args else {
        return Err(ConsoleError::MissingArgument(USAGE).into());
    };
    let (key, value) = name_and_value(rest, USAGE)?;

    // The live store only changes once the file has been written
    let mut updated = console.config().clone();
    updated.set(section, key, &value)?;
    updated.save().context("Configuration could not be saved, value not applied")?;
    *console.config_mut() = updated;
    console.logger_mut().info(format!("{section}.{key} => {value}"));
    Ok(())
}

pub(super) fn run(console: &mut Console, args: &[&str]) -> Result<()> {
    console
        .with_active_module(|module, ctx| {
            ctx.require(module.options())?;
            module.run(ctx, args)
        })
        .unwrap_or_else(|| Err(ConsoleError::NoModuleSelected.into()))
}

pub(super) fn exit(console: &mut Console, _args: &[&str]) -> Result<()> {
    console.session_mut().request_exit();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_and_value_joins_rest() {
        let (name, value) = name_and_value(&["banner", "hello", "world"], "x").unwrap();
        assert_eq!(name, "banner");
        assert_eq!(value, "hello world");
        assert!(name_and_value(&["banner"], "x").is_err());
        assert!(name_and_value(&[], "x").is_err());
    }
}
