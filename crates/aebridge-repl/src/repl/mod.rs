//! REPL (Read-Eval-Print Loop) over a bridge session
//!
//! This module wraps a [`Session`] with console conveniences:
//! - dot-commands (.help, .quit, .raw, ...)
//! - timing and quiet output
//! - pluggable output through [`ReplNotifier`]

use std::{sync::Arc, time::Instant};

use aebridge_core::{BridgeConfig, ItemLike, RemoteCollection, Session};
use anyhow::{Context, Result};
use tracing::debug;

pub mod commands;
pub mod notifier;

pub use commands::ReplCommand;
pub use notifier::{BufferNotifier, DefaultNotifier, ReplNotifier};

/// Interactive console evaluating ExtendScript lines in the host
pub struct Repl {
    session: Arc<Session>,
    notifier: Box<dyn ReplNotifier>,
    running: bool,
    /// Suppress timing info
    quiet: bool,
    /// Print generated source before sending it
    debug: bool,
}

impl Repl {
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            notifier: Box::new(DefaultNotifier::new()),
            running: true,
            quiet: false,
            debug: false,
        }
    }

    /// Connect to the endpoint described by `config`
    pub fn connect(config: BridgeConfig) -> Result<Self> {
        let address = config.address();
        let session = Session::connect(config)
            .with_context(|| format!("connecting to host endpoint at {address}"))?;
        Ok(Self::new(session))
    }

    pub fn set_notifier(&mut self, notifier: Box<dyn ReplNotifier>) {
        self.notifier = notifier;
    }

    pub fn notifier(&self) -> &dyn ReplNotifier {
        self.notifier.as_ref()
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn set_quiet(&mut self, quiet: bool) {
        self.quiet = quiet;
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Parse REPL input into a command
    pub fn parse_input(&self, input: &str) -> Result<ReplCommand> {
        commands::parse_command(input)
    }

    /// Handle a REPL command
    pub fn handle_command(&mut self, command: ReplCommand) -> Result<String> {
        match command {
            ReplCommand::Help => Ok(help_text()),
            ReplCommand::Quit => {
                self.running = false;
                Ok("Goodbye!".to_string())
            }
            ReplCommand::Ping => {
                self.session.check_live()?;
                Ok(format!(
                    "Host endpoint at {} is reachable",
                    self.session.config().address()
                ))
            }
            ReplCommand::Raw(code) => {
                let (output, duration) = self.timed(|session| session.eval_script(&code))?;
                Ok(notifier::format_result(&output, duration, self.quiet))
            }
            ReplCommand::App => self.describe_app(),
            ReplCommand::Items => self.list_items(),
            ReplCommand::Quiet => {
                self.quiet = !self.quiet;
                Ok(format!("Quiet mode: {}", if self.quiet { "on" } else { "off" }))
            }
            ReplCommand::Debug => {
                self.debug = !self.debug;
                Ok(format!("Debug mode: {}", if self.debug { "on" } else { "off" }))
            }
        }
    }

    /// Evaluate one line in the host and return the rendered result with timing
    pub fn execute(&mut self, line: &str) -> Result<(String, u64)> {
        if self.debug {
            self.notifier
                .on_output(&format!("-- {}", aebridge_core::session::registration_script(line)));
        }
        self.timed(|session| session.evaluate(line))
    }

    /// Handle one line of input, reporting through the notifier
    pub fn process_line(&mut self, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            return;
        }

        if trimmed.starts_with('.') {
            match self
                .parse_input(trimmed)
                .and_then(|command| self.handle_command(command))
            {
                Ok(output) => self.notifier.on_output(&output),
                Err(e) => self.notifier.on_error(&format!("Error: {e:#}")),
            }
            return;
        }

        match self.execute(trimmed) {
            Ok((output, duration)) => self.notifier.on_result(&output, duration, self.quiet),
            Err(e) => self.notifier.on_error(&format!("Error: {e:#}")),
        }
    }

    /// Run a script of console lines until it ends or issues `.quit`
    pub fn run_script(&mut self, source: &str) {
        for line in source.lines() {
            if !self.running {
                break;
            }
            self.process_line(line);
        }
    }

    fn timed<T: std::fmt::Display>(
        &self,
        eval: impl FnOnce(&Arc<Session>) -> aebridge_core::Result<T>,
    ) -> Result<(String, u64)> {
        let start = Instant::now();
        let value = eval(&self.session)?;
        let duration = start.elapsed().as_millis() as u64;
        debug!(duration_ms = duration, "evaluated");
        Ok((value.to_string(), duration))
    }

    fn describe_app(&self) -> Result<String> {
        let app = self.session.application()?;
        Ok(format!(
            "After Effects {} ({}), language {}",
            app.version()?,
            app.build_name()?,
            app.language()?
        ))
    }

    fn list_items(&self) -> Result<String> {
        let project = self.session.application()?.project()?;
        let count = project.num_items()?;
        if count == 0 {
            return Ok("Project is empty".to_string());
        }

        let mut lines = Vec::with_capacity(count + 1);
        lines.push(format!("{count} item(s):"));
        for (position, item) in project.items()?.iter().enumerate() {
            let item = item?;
            lines.push(format!(
                "  {}. {} [{}]",
                position + 1,
                item.name()?,
                item.type_name()?
            ));
        }
        Ok(lines.join("\n"))
    }

    /// Farewell message, unless quiet
    pub fn show_exit_stats(&self) {
        if !self.quiet {
            self.notifier.on_output("\nSession closed.");
        }
    }
}

fn help_text() -> String {
    [
        "Lines are evaluated in After Effects; objects print as <Type id>.",
        "",
        "Commands:",
        "  .help, .h       Show this help",
        "  .quit, .q       Exit",
        "  .ping           Check that the host endpoint is reachable",
        "  .raw <code>     Send code without registering the result",
        "  .app            Describe the application",
        "  .items          List the items of the open project",
        "  .quiet          Toggle timing output",
        "  .debug          Toggle printing of generated source",
    ]
    .join("\n")
}
