//! Operator-facing error taxonomy.
//!
//! Every variant renders as a single human-readable line; the dispatcher logs
//! it and the read loop carries on.

use std::path::PathBuf;

/// Recoverable console errors
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Unknown module: {0}")]
    UnknownModule(String),

    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("Unknown configuration section: {0}")]
    UnknownSection(String),

    #[error("No module selected, run 'use <module>' first")]
    NoModuleSelected,

    #[error("Missing argument, usage: {0}")]
    MissingArgument(&'static str),

    #[error("Required option(s) not set: {}", .0.join(", "))]
    MissingOption(Vec<String>),

    #[error("Invalid value '{value}' for option '{option}'")]
    InvalidValue { option: String, value: String },

    #[error("File '{}' does not exist or it is not a file", .0.display())]
    ScriptNotFound(PathBuf),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Failures raised while loading a single plugin unit
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Error dynamically import package \"{0}\"...")]
    ImportFailed(String),

    #[error("Plugin unit \"{unit}\" is outside the \"{namespace}\" namespace")]
    OutsideNamespace { unit: String, namespace: String },

    #[error("Module path \"{0}\" is already registered")]
    DuplicatePath(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_option_lists_names() {
        let err = ConsoleError::MissingOption(vec!["port".to_string(), "speed".to_string()]);
        assert_eq!(err.to_string(), "Required option(s) not set: port, speed");
    }

    #[test]
    fn test_registry_error_is_transparent() {
        let err: ConsoleError = RegistryError::DuplicatePath("uart/scan".to_string()).into();
        assert_eq!(err.to_string(), "Module path \"uart/scan\" is already registered");
    }
}
