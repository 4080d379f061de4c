//! Module capability contract.
//!
//! A module is a selectable probe operation. It declares an ordered list of
//! options and an entry point; the registry and dispatcher never look past
//! this trait.

pub mod builtin;
pub mod registry;

use anyhow::Result;

use crate::config::ConfigStore;
use crate::error::ConsoleError;
use crate::logger::Logger;
use crate::session::GlobalOptions;

pub use registry::{BuiltinPlugins, ModuleDescriptor, ModuleFactory, ModuleRegistry, PluginSource, PluginUnit};

/// Descriptive metadata shown by `show options`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub author: &'static str,
}

/// A named, optionally required module setting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOption {
    pub name: String,
    pub value: Option<String>,
    pub required: bool,
    pub description: String,
}

/// Ordered set of declared options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet {
    options: Vec<ModuleOption>,
}

impl OptionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an option
    #[must_use]
    pub fn with(mut self, name: &str, default: Option<&str>, required: bool, description: &str) -> Self {
        self.options.push(ModuleOption {
            name: name.to_string(),
            value: default.map(str::to_string),
            required,
            description: description.to_string(),
        });
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ModuleOption> {
        self.options.iter().find(|o| o.name == name)
    }

    /// Value of `name`, treating an empty string as unset
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(|o| o.value.as_deref())
            .filter(|v| !v.is_empty())
    }

    pub fn set(&mut self, name: &str, value: &str) -> Result<(), ConsoleError> {
        let option = self.find_mut(name)?;
        option.value = Some(value.to_string());
        Ok(())
    }

    pub fn unset(&mut self, name: &str) -> Result<(), ConsoleError> {
        let option = self.find_mut(name)?;
        option.value = None;
        Ok(())
    }

    fn find_mut(&mut self, name: &str) -> Result<&mut ModuleOption, ConsoleError> {
        self.options
            .iter_mut()
            .find(|o| o.name == name)
            .ok_or_else(|| ConsoleError::UnknownOption(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModuleOption> {
        self.options.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|o| o.name.as_str())
    }
}

/// What a running module may see of the console
pub struct ModuleContext<'a> {
    pub globals: &'a GlobalOptions,
    pub config: &'a ConfigStore,
    pub logger: &'a mut Logger,
}

impl ModuleContext<'_> {
    /// Module value of `name`, falling back to the global option of the same name
    #[must_use]
    pub fn option<'o>(&'o self, options: &'o OptionSet, name: &str) -> Option<&'o str> {
        options
            .value(name)
            .or_else(|| self.globals.get(name).map(String::as_str))
            .filter(|v| !v.is_empty())
    }

    /// Check that every required option resolves to a value
    pub fn require(&self, options: &OptionSet) -> Result<(), ConsoleError> {
        let missing: Vec<String> = options
            .iter()
            .filter(|o| o.required && self.option(options, &o.name).is_none())
            .map(|o| o.name.clone())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConsoleError::MissingOption(missing))
        }
    }
}

/// Capability contract every selectable module implements
pub trait Module {
    fn info(&self) -> ModuleInfo;

    fn options(&self) -> &OptionSet;

    fn options_mut(&mut self) -> &mut OptionSet;

    /// Execute the module; required options have already been checked
    fn run(&mut self, ctx: &mut ModuleContext<'_>, args: &[&str]) -> Result<()>;

    /// Input that matched no built-in command while this module is active
    fn handle_input(&mut self, _ctx: &mut ModuleContext<'_>, line: &str) -> Result<()> {
        let name = line.split_whitespace().next().unwrap_or_default();
        Err(ConsoleError::UnknownCommand(name.to_string()).into())
    }
}
