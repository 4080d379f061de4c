//! Console context and read–dispatch loop.
//!
//! [`Console`] is the single context object handed to every command handler.
//! It owns the configuration, the session and the logger, and keeps the
//! completion tree and prompt theme in step with them. Lines come from a
//! [`LineSource`]: the interactive line editor or a pre-recorded script.

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::completion::{CompletionTree, ConsoleHelper};
use crate::config::ConfigStore;
use crate::dispatcher::{self, COMMANDS};
use crate::error::ConsoleError;
use crate::logger::Logger;
use crate::modules::{Module, ModuleContext, ModuleRegistry};
use crate::session::{Prompt, PromptTheme, Session, SessionState};

/// Guidance given when the operator interrupts a read
pub const INTERRUPT_HINT: &str = "Please use 'exit' command or ctrl+D key to properly quit the framework";

/// Result of waiting for the next line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// The current line was abandoned (ctrl+C)
    Interrupted,
    /// End of input (ctrl+D)
    Eof,
    /// A script ran out of lines
    Exhausted,
    Failed(String),
}

/// How a run of the loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// `exit`, end of input, or a source that can no longer be read
    Exited,
    /// The script source ran out without `exit`
    Exhausted,
}

/// Where input lines come from
pub trait LineSource {
    fn read_line(&mut self, prompt: &Prompt, theme: &PromptTheme, tree: &CompletionTree) -> ReadOutcome;

    /// Whether accepted lines should be echoed after the prompt
    fn echoes(&self) -> bool {
        false
    }
}

/// Terminal input through rustyline, with completion and history
pub struct InteractiveSource {
    editor: Editor<ConsoleHelper, DefaultHistory>,
    history_path: Option<PathBuf>,
}

impl InteractiveSource {
    pub fn new(history_path: Option<PathBuf>) -> Result<Self> {
        let mut editor = Editor::new().context("Failed to initialize line editor")?;
        editor.set_helper(Some(ConsoleHelper::new()));

        if let Some(path) = &history_path {
            if let Err(e) = editor.load_history(path) {
                debug!("No history loaded from {}: {e}", path.display());
            }
        }

        Ok(Self { editor, history_path })
    }
}

impl LineSource for InteractiveSource {
    fn read_line(&mut self, prompt: &Prompt, theme: &PromptTheme, tree: &CompletionTree) -> ReadOutcome {
        let plain = prompt.plain();
        if let Some(helper) = self.editor.helper_mut() {
            helper.set_tree(tree.clone());
            helper.set_prompt(plain.clone(), prompt.styled(theme));
        }

        match self.editor.readline(&plain) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                ReadOutcome::Line(line)
            }
            Err(ReadlineError::Interrupted) => ReadOutcome::Interrupted,
            Err(ReadlineError::Eof) => ReadOutcome::Eof,
            Err(e) => ReadOutcome::Failed(e.to_string()),
        }
    }
}

impl Drop for InteractiveSource {
    fn drop(&mut self) {
        let Some(path) = &self.history_path else {
            return;
        };
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Err(e) = self.editor.save_history(path) {
            warn!("Failed to save history to {}: {e}", path.display());
        }
    }
}

/// Pre-recorded commands replayed in order
pub struct ScriptSource {
    lines: std::vec::IntoIter<String>,
}

impl ScriptSource {
    /// Read a script of newline separated commands
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConsoleError::ScriptNotFound(path.to_path_buf()).into());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        Ok(Self::from_lines(contents.lines()))
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        Self {
            lines: lines.into_iter(),
        }
    }
}

impl LineSource for ScriptSource {
    fn read_line(&mut self, _prompt: &Prompt, _theme: &PromptTheme, _tree: &CompletionTree) -> ReadOutcome {
        match self.lines.next() {
            Some(line) => ReadOutcome::Line(line.trim().to_string()),
            None => ReadOutcome::Exhausted,
        }
    }

    fn echoes(&self) -> bool {
        true
    }
}

/// Console context shared by the dispatcher and the read loop
pub struct Console {
    registry: ModuleRegistry,
    config: ConfigStore,
    session: Session,
    logger: Logger,
    theme: PromptTheme,
    completion: CompletionTree,
}

impl Console {
    #[must_use]
    pub fn new(registry: ModuleRegistry, config: ConfigStore, logger: Logger) -> Self {
        let mut console = Self {
            registry,
            config,
            session: Session::new(),
            logger,
            theme: PromptTheme::default(),
            completion: CompletionTree::default(),
        };
        console.refresh();
        console
    }

    /// Re-derive the completion tree and prompt theme from the current state
    pub fn refresh(&mut self) {
        let active_options = self.session.active().map(|a| a.module.options());
        self.completion = CompletionTree::build(
            COMMANDS,
            &self.registry,
            &self.config,
            active_options,
            self.session.globals(),
        );
        self.theme = PromptTheme::from_config(&self.config);
    }

    /// Resolve and execute one line
    pub fn handle(&mut self, line: &str) {
        dispatcher::handle(self, line);
    }

    /// Read, dispatch and re-prompt until the source ends or `exit` is run
    pub fn run(&mut self, source: &mut dyn LineSource) -> RunOutcome {
        loop {
            let prompt = self.prompt();
            match source.read_line(&prompt, &self.theme, &self.completion) {
                ReadOutcome::Line(line) => {
                    if source.echoes() {
                        self.logger.print(format!("{}{}", prompt.plain(), line));
                    }
                    self.handle(&line);
                    if self.session.exit_requested() {
                        return RunOutcome::Exited;
                    }
                }
                ReadOutcome::Interrupted => self.logger.info(INTERRUPT_HINT),
                ReadOutcome::Eof => return RunOutcome::Exited,
                ReadOutcome::Exhausted => return RunOutcome::Exhausted,
                ReadOutcome::Failed(e) => {
                    self.logger.error(format!("Failed to read input: {e}"));
                    return RunOutcome::Exited;
                }
            }
        }
    }

    /// Call `f` with the active module and a context over the rest of the
    /// console; `None` when no module is selected
    pub fn with_active_module<R>(&mut self, f: impl FnOnce(&mut dyn Module, &mut ModuleContext<'_>) -> R) -> Option<R> {
        let (active, globals) = self.session.split_active()?;
        let mut ctx = ModuleContext {
            globals,
            config: &self.config,
            logger: &mut self.logger,
        };
        Some(f(active.module.as_mut(), &mut ctx))
    }

    #[must_use]
    pub fn prompt(&self) -> Prompt {
        Prompt::render(&self.session.state())
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    #[must_use]
    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Registry and session borrowed together, for `use`
    pub fn registry_and_session(&mut self) -> (&ModuleRegistry, &mut Session) {
        (&self.registry, &mut self.session)
    }

    #[must_use]
    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ConfigStore {
        &mut self.config
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    #[must_use]
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn logger_mut(&mut self) -> &mut Logger {
        &mut self.logger
    }

    #[must_use]
    pub fn completion(&self) -> &CompletionTree {
        &self.completion
    }

    #[must_use]
    pub fn theme(&self) -> &PromptTheme {
        &self.theme
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::Severity;
    use crate::modules::registry::{BuiltinPlugins, DEFAULT_NAMESPACE};

    fn console() -> Console {
        let mut logger = Logger::capture();
        let registry = ModuleRegistry::discover(DEFAULT_NAMESPACE, &BuiltinPlugins, &mut logger);
        Console::new(registry, ConfigStore::with_defaults(), logger)
    }

    /// Source yielding scripted outcomes, for exercising interrupt handling
    struct Scripted(Vec<ReadOutcome>);

    impl LineSource for Scripted {
        fn read_line(&mut self, _: &Prompt, _: &PromptTheme, _: &CompletionTree) -> ReadOutcome {
            if self.0.is_empty() {
                ReadOutcome::Eof
            } else {
                self.0.remove(0)
            }
        }
    }

    #[test]
    fn test_interrupt_reprompts() {
        let mut console = console();
        let mut source = Scripted(vec![
            ReadOutcome::Interrupted,
            ReadOutcome::Line("setg port /dev/ttyUSB0".to_string()),
        ]);

        assert_eq!(console.run(&mut source), RunOutcome::Exited);
        assert!(console.logger().contains(Severity::Info, INTERRUPT_HINT));
        assert!(console.session().globals().contains_key("port"));
    }

    #[test]
    fn test_read_failure_ends_like_eof() {
        let mut console = console();
        let mut source = Scripted(vec![
            ReadOutcome::Failed("broken pipe".to_string()),
            ReadOutcome::Line("setg port /dev/ttyUSB0".to_string()),
        ]);
        assert_eq!(console.run(&mut source), RunOutcome::Exited);
        assert!(!console.session().globals().contains_key("port"));
        assert!(console.logger().contains(Severity::Error, "broken pipe"));
    }

    #[test]
    fn test_script_echoes_prompt() {
        let mut console = console();
        let mut source = ScriptSource::from_lines(["use i2c/scan", "back"]);

        assert_eq!(console.run(&mut source), RunOutcome::Exhausted);
        let lines = console.logger().lines();
        assert!(lines.iter().any(|l| l == "[hbf] > use i2c/scan"));
        assert!(lines.iter().any(|l| l == "[hbf] i2c(scan)> back"));
        assert_eq!(console.state(), SessionState::NoModule);
    }

    #[test]
    fn test_missing_script() {
        let err = ScriptSource::open("/nonexistent/hbf/script.txt").err().unwrap();
        assert!(matches!(err.downcast_ref::<ConsoleError>(), Some(ConsoleError::ScriptNotFound(_))));
    }
}
