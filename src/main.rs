use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use hbf_console::config::ConfigStore;
use hbf_console::console::{InteractiveSource, ScriptSource};
use hbf_console::logger::Logger;
use hbf_console::modules::registry::{BuiltinPlugins, DEFAULT_NAMESPACE};
use hbf_console::modules::ModuleRegistry;
use hbf_console::{Console, RunOutcome};

/// hbf - interactive console for hardware-probe modules
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Script of newline separated commands to replay before the prompt
    script: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Diagnostics go to stderr so they never mix with console output
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set global default subscriber")?;

    let config = if let Some(config_path) = args.config {
        ConfigStore::load_or_create(config_path)?
    } else {
        ConfigStore::load_default()?
    };

    debug!(path = ?config.path(), "Configuration loaded");

    let mut logger = Logger::stdout();
    let registry = ModuleRegistry::discover(DEFAULT_NAMESPACE, &BuiltinPlugins, &mut logger);
    let mut console = Console::new(registry, config, logger);

    if let Some(script) = args.script {
        match ScriptSource::open(&script) {
            Ok(mut source) => {
                if console.run(&mut source) == RunOutcome::Exited {
                    return Ok(());
                }
            }
            Err(e) => console.logger_mut().error(format!("{e:#}")),
        }
    }

    let history = ConfigStore::default_dir().ok().map(|dir| dir.join("history.txt"));
    let mut source = InteractiveSource::new(history)?;
    console.run(&mut source);
    Ok(())
}
