//! Input line resolution.
//!
//! A line is split on whitespace; the first word is resolved against the
//! built-in command table by exact, case-sensitive match. Anything else goes
//! to the active module, or is reported as an unknown command. Failures are
//! logged here and never escape to the read loop.

mod commands;

use anyhow::Result;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use tracing::debug;

use crate::console::Console;
use crate::error::ConsoleError;

/// Built-in command handler
pub type Handler = fn(&mut Console, &[&str]) -> Result<()>;

/// Built-in command descriptor
pub struct Command {
    pub name: &'static str,
    pub description: &'static str,
    /// Argument hints offered by completion
    pub arguments: &'static [&'static str],
    pub handler: Handler,
}

/// All built-in commands
pub static COMMANDS: &[Command] = &[
    Command {
        name: "help",
        description: "Display the core commands",
        arguments: &[],
        handler: commands::help,
    },
    Command {
        name: "use",
        description: "Select a module by path, or return to the top level without one",
        arguments: &[],
        handler: commands::use_module,
    },
    Command {
        name: "back",
        description: "Leave the current module",
        arguments: &[],
        handler: commands::back,
    },
    Command {
        name: "show",
        description: "Show module options, global options, configuration or modules",
        arguments: &["options", "global", "config", "modules"],
        handler: commands::show,
    },
    Command {
        name: "set",
        description: "Set an option of the current module",
        arguments: &[],
        handler: commands::set,
    },
    Command {
        name: "unset",
        description: "Clear an option of the current module",
        arguments: &[],
        handler: commands::unset,
    },
    Command {
        name: "setg",
        description: "Set a global option, visible to every module",
        arguments: &[],
        handler: commands::setg,
    },
    Command {
        name: "unsetg",
        description: "Remove a global option",
        arguments: &[],
        handler: commands::unsetg,
    },
    Command {
        name: "setc",
        description: "Set a configuration value and save it",
        arguments: &[],
        handler: commands::setc,
    },
    Command {
        name: "run",
        description: "Run the current module",
        arguments: &[],
        handler: commands::run,
    },
    Command {
        name: "exit",
        description: "Exit the console",
        arguments: &[],
        handler: commands::exit,
    },
];

/// Find a built-in command by exact name
#[must_use]
pub fn find_command(name: &str) -> Option<&'static Command> {
    COMMANDS.iter().find(|c| c.name == name)
}

/// Closest built-in name to a mistyped word, for hints only
#[must_use]
pub fn suggest(name: &str) -> Option<&'static str> {
    let matcher = SkimMatcherV2::default();
    COMMANDS
        .iter()
        .filter_map(|cmd| {
            let score = matcher
                .fuzzy_match(cmd.name, name)
                .max(matcher.fuzzy_match(name, cmd.name))?;
            Some((score, cmd.name))
        })
        .max_by_key(|(score, _)| *score)
        .map(|(_, name)| name)
}

/// Resolve and execute one raw input line
pub fn handle(console: &mut Console, line: &str) {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return;
    };
    let args: Vec<&str> = words.collect();

    let result = match find_command(name) {
        Some(cmd) => {
            debug!(command = cmd.name, ?args, "Dispatching built-in");
            (cmd.handler)(console, &args)
        }
        None => console
            .with_active_module(|module, ctx| module.handle_input(ctx, line))
            .unwrap_or_else(|| Err(ConsoleError::UnknownCommand(name.to_string()).into())),
    };

    if let Err(e) = result {
        console.logger_mut().error(format!("{e:#}"));
        if matches!(e.downcast_ref::<ConsoleError>(), Some(ConsoleError::UnknownCommand(_))) {
            if let Some(hint) = suggest(name) {
                console.logger_mut().info(format!("Did you mean '{hint}'?"));
            }
        }
    }

    console.refresh();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_command_names_unique() {
        let names: HashSet<_> = COMMANDS.iter().map(|c| c.name).collect();
        assert_eq!(names.len(), COMMANDS.len());
    }

    #[test]
    fn test_find_command_is_exact() {
        assert!(find_command("setg").is_some());
        assert!(find_command("SETG").is_none());
        assert!(find_command("se").is_none());
    }

    #[test]
    fn test_suggest() {
        assert_eq!(suggest("sett"), Some("set"));
        assert_eq!(suggest("zzzz"), None);
    }
}
