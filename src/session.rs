//! Session state machine and prompt rendering.
//!
//! The session owns the global options and at most one active module. It has
//! two states, [`SessionState::NoModule`] and [`SessionState::ModuleActive`];
//! the prompt is derived from the state alone.

use crossterm::style::ContentStyle;
use std::collections::BTreeMap;

use crate::colors::parse_style;
use crate::config::{ConfigStore, THEME_SECTION};
use crate::modules::{Module, ModuleDescriptor};

/// Session-wide option values, surviving module switches
pub type GlobalOptions = BTreeMap<String, String>;

/// Module currently selected with `use`
pub struct ActiveModule {
    pub path: String,
    pub module: Box<dyn Module>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    NoModule,
    ModuleActive(String),
}

#[derive(Default)]
pub struct Session {
    active: Option<ActiveModule>,
    globals: GlobalOptions,
    exit_requested: bool,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        match &self.active {
            Some(active) => SessionState::ModuleActive(active.path.clone()),
            None => SessionState::NoModule,
        }
    }

    /// Instantiate `descriptor` and make it the only active module
    pub fn activate(&mut self, descriptor: &ModuleDescriptor) {
        self.active = Some(ActiveModule {
            path: descriptor.path().to_string(),
            module: descriptor.instantiate(),
        });
    }

    /// Return to the top-level context, dropping the active module
    pub fn deactivate(&mut self) {
        self.active = None;
    }

    #[must_use]
    pub fn active(&self) -> Option<&ActiveModule> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut ActiveModule> {
        self.active.as_mut()
    }

    /// Active module and globals borrowed together, for building a module context
    pub fn split_active(&mut self) -> Option<(&mut ActiveModule, &GlobalOptions)> {
        let active = self.active.as_mut()?;
        Some((active, &self.globals))
    }

    #[must_use]
    pub fn globals(&self) -> &GlobalOptions {
        &self.globals
    }

    pub fn set_global(&mut self, name: &str, value: &str) {
        self.globals.insert(name.to_string(), value.to_string());
    }

    /// Remove a global option, returning whether it existed
    pub fn unset_global(&mut self, name: &str) -> bool {
        self.globals.remove(name).is_some()
    }

    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    #[must_use]
    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }
}

/// Prompt styles read from the theme section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptTheme {
    pub base: ContentStyle,
    pub category: ContentStyle,
    pub module: ContentStyle,
    pub pound: ContentStyle,
}

impl PromptTheme {
    #[must_use]
    pub fn from_config(config: &ConfigStore) -> Self {
        let style = |key: &str| parse_style(config.get(THEME_SECTION, key).unwrap_or_default());
        Self {
            base: style("base"),
            category: style("category"),
            module: style("module"),
            pound: style("pound"),
        }
    }
}

/// Prompt segments for one session state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub category: String,
    pub module: String,
}

impl Prompt {
    const BASE: &'static str = "[hbf] ";
    const POUND: &'static str = "> ";

    #[must_use]
    pub fn render(state: &SessionState) -> Self {
        match state {
            SessionState::NoModule => Self {
                category: String::new(),
                module: String::new(),
            },
            SessionState::ModuleActive(path) => {
                let (category, module) = path.split_once('/').unwrap_or((path.as_str(), ""));
                Self {
                    category: category.to_string(),
                    module: if module.is_empty() {
                        String::new()
                    } else {
                        format!("({module})")
                    },
                }
            }
        }
    }

    /// Uncoloured prompt, as the line editor measures it
    #[must_use]
    pub fn plain(&self) -> String {
        format!("{}{}{}{}", Self::BASE, self.category, self.module, Self::POUND)
    }

    #[must_use]
    pub fn styled(&self, theme: &PromptTheme) -> String {
        let mut out = theme.base.apply(Self::BASE).to_string();
        if !self.category.is_empty() {
            out.push_str(&theme.category.apply(self.category.as_str()).to_string());
        }
        if !self.module.is_empty() {
            out.push_str(&theme.module.apply(self.module.as_str()).to_string());
        }
        out.push_str(&theme.pound.apply(Self::POUND).to_string());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::builtin::UartBaudrates;

    fn descriptor(path: &str) -> ModuleDescriptor {
        ModuleDescriptor::new(path, || Box::new(UartBaudrates::new()) as Box<dyn Module>)
    }

    #[test]
    fn test_prompt_no_module() {
        let prompt = Prompt::render(&SessionState::NoModule);
        assert_eq!(prompt.plain(), "[hbf] > ");
    }

    #[test]
    fn test_prompt_module_active() {
        let prompt = Prompt::render(&SessionState::ModuleActive("uart/baudrates".to_string()));
        assert_eq!(prompt.category, "uart");
        assert_eq!(prompt.module, "(baudrates)");
        assert_eq!(prompt.plain(), "[hbf] uart(baudrates)> ");
    }

    #[test]
    fn test_prompt_deep_path() {
        let prompt = Prompt::render(&SessionState::ModuleActive("spi/flash/dump".to_string()));
        assert_eq!(prompt.plain(), "[hbf] spi(flash/dump)> ");
    }

    #[test]
    fn test_styled_prompt_contains_segments() {
        let theme = PromptTheme::from_config(&ConfigStore::with_defaults());
        let styled = Prompt::render(&SessionState::ModuleActive("i2c/scan".to_string())).styled(&theme);
        assert!(styled.contains("[hbf] "));
        assert!(styled.contains("(scan)"));
    }

    #[test]
    fn test_activate_replaces_previous() {
        let mut session = Session::new();
        session.activate(&descriptor("uart/baudrates"));
        session.activate(&descriptor("i2c/scan"));
        assert_eq!(session.state(), SessionState::ModuleActive("i2c/scan".to_string()));

        session.deactivate();
        assert_eq!(session.state(), SessionState::NoModule);
    }

    #[test]
    fn test_globals_survive_module_switch() {
        let mut session = Session::new();
        session.set_global("port", "/dev/ttyUSB1");
        session.activate(&descriptor("uart/baudrates"));
        session.deactivate();
        assert_eq!(session.globals().get("port").map(String::as_str), Some("/dev/ttyUSB1"));
        assert!(session.unset_global("port"));
        assert!(!session.unset_global("port"));
    }
}
