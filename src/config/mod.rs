use anyhow::{Context, Result};
use serde::Serialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ConsoleError;

/// Connection settings for the probe
pub const HYDRABUS_SECTION: &str = "HYDRABUS";
/// Serial terminal behaviour
pub const MINITERM_SECTION: &str = "MINITERM";
/// Prompt styling
pub const THEME_SECTION: &str = "THEME";

pub type Section = BTreeMap<String, String>;

/// Section → key → value configuration store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigStore {
    #[serde(flatten)]
    sections: BTreeMap<String, Section>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl ConfigStore {
    /// Store populated with the default sections, not backed by any file
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut store = Self::default();

        store.insert_section(
            HYDRABUS_SECTION,
            &[
                ("port", "/dev/ttyACM0"),
                ("baudrate", "115200"),
                ("read_timeout", "1"),
            ],
        );
        store.insert_section(
            MINITERM_SECTION,
            &[
                ("parity", "N"),
                ("xonxoff", "False"),
                ("echo", "False"),
                ("filters", "default"),
                ("raw", "False"),
                ("quiet", "False"),
                ("exit_char", "29"),
                ("menu_char", "20"),
                ("serial_port_encoding", "UTF-8"),
                ("eol", "CR"),
            ],
        );
        store.insert_section(
            THEME_SECTION,
            &[
                ("user_input", ""),
                ("base", "#3399ff"),
                ("pound", "#3399ff"),
                ("module", "#ff0000 bold"),
                ("category", "#ffffff"),
            ],
        );

        store
    }

    fn insert_section(&mut self, name: &str, entries: &[(&str, &str)]) {
        let section = entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        self.sections.insert(name.to_string(), section);
    }

    /// Load configuration from default location, creating it on first run
    pub fn load_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Self::load_or_create(config_path)
    }

    /// Load `path`, writing the default configuration there first if it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.is_file() {
            debug!("Creating default configuration at {}", path.display());
            let mut store = Self::with_defaults();
            store.path = Some(path.to_path_buf());
            store.save()?;
            return Ok(store);
        }

        Self::load_from_file(path)
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).context("Failed to read config file")?;
        let mut store = Self::from_yaml(&contents)?;
        store.path = Some(path.as_ref().to_path_buf());
        Ok(store)
    }

    /// Parse a YAML document of sections; scalar values are kept as strings
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let raw: BTreeMap<String, Option<BTreeMap<String, Value>>> =
            serde_yaml::from_str(contents).context("Failed to parse config file")?;

        let mut sections = BTreeMap::new();
        for (name, entries) in raw {
            let mut section = Section::new();
            for (key, value) in entries.unwrap_or_default() {
                let value = scalar_to_string(&value)
                    .with_context(|| format!("Value of {name}.{key} is not a scalar"))?;
                section.insert(key, value);
            }
            sections.insert(name, section);
        }

        Ok(Self {
            sections,
            path: None,
        })
    }

    /// Serialize the store back to YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config")
    }

    /// Write the store to its backing file, if it has one
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let contents = self.to_yaml()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get default configuration path
    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::default_dir()?.join("hbf.yaml"))
    }

    /// Per-user data directory (`~/.hbf`)
    pub fn default_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home.join(".hbf"))
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections.get(section)?.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    /// Iterate sections in name order
    pub fn sections(&self) -> impl Iterator<Item = (&str, &Section)> {
        self.sections.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Set `section.key`; the section must already exist, keys may be new
    pub fn set(&mut self, section: &str, key: &str, value: &str) -> Result<(), ConsoleError> {
        let entries = self
            .sections
            .get_mut(section)
            .ok_or_else(|| ConsoleError::UnknownSection(section.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sections() {
        let config = ConfigStore::with_defaults();
        assert_eq!(config.get(HYDRABUS_SECTION, "port"), Some("/dev/ttyACM0"));
        assert_eq!(config.get(THEME_SECTION, "module"), Some("#ff0000 bold"));
        assert_eq!(config.section(THEME_SECTION).map(Section::len), Some(5));
        assert_eq!(config.sections().count(), 3);
    }

    #[test]
    fn test_config_deserialization() {
        let yaml = r#"
HYDRABUS:
  port: /dev/ttyUSB0
  baudrate: 115200
  read_timeout: 1
MINITERM:
  echo: false
EMPTY:
"#;
        let config = ConfigStore::from_yaml(yaml).unwrap();
        assert_eq!(config.get(HYDRABUS_SECTION, "baudrate"), Some("115200"));
        assert_eq!(config.get(MINITERM_SECTION, "echo"), Some("False"));
        assert_eq!(config.section("EMPTY").map(Section::len), Some(0));
    }

    #[test]
    fn test_nested_value_rejected() {
        let yaml = "HYDRABUS:\n  port:\n    - a\n";
        assert!(ConfigStore::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_set_unknown_section() {
        let mut config = ConfigStore::with_defaults();
        let before = config.clone();
        let err = config.set("NOPE", "port", "x").unwrap_err();
        assert!(matches!(err, ConsoleError::UnknownSection(_)));
        assert_eq!(config, before);
    }
}
