//! hbf-console - interactive console for hardware-probe modules
//!
//! This library provides the pieces of the `hbf` console: module discovery,
//! command dispatch, contextual completion and the session loop.
//!
//! # Modules
//!
//! - [`modules`]: Module contract, plugin registry and built-in probe modules
//! - [`dispatcher`]: Built-in command table and line resolution
//! - [`completion`]: Completion tree and line-editor helper
//! - [`session`]: Session state machine, global options and prompt rendering
//! - [`console`]: Console context, input sources and the read loop
//! - [`config`]: Persisted section/key/value configuration
//! - [`logger`]: Operator-facing messages and tables
//! - [`colors`]: Theme strings to terminal styles

pub mod colors;
pub mod completion;
pub mod config;
pub mod console;
pub mod dispatcher;
pub mod error;
pub mod logger;
pub mod modules;
pub mod session;

pub use console::{Console, RunOutcome};
pub use error::ConsoleError;
