//! Output notification system for the REPL
//!
//! Lets the console print to the terminal while tests capture output instead.

use std::sync::Arc;

use parking_lot::Mutex;

/// Trait for handling REPL output notifications
pub trait ReplNotifier: Send + Sync {
    /// Handle regular output
    fn on_output(&self, content: &str);

    /// Handle error output
    fn on_error(&self, content: &str);

    /// Handle an evaluation result with timing information
    fn on_result(&self, output: &str, duration_ms: u64, quiet: bool);
}

/// Default console-based notifier
#[derive(Default)]
pub struct DefaultNotifier;

impl DefaultNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl ReplNotifier for DefaultNotifier {
    fn on_output(&self, content: &str) {
        if !content.is_empty() {
            println!("{content}");
        }
    }

    fn on_error(&self, content: &str) {
        eprintln!("{content}");
    }

    fn on_result(&self, output: &str, duration_ms: u64, quiet: bool) {
        println!("{}", format_result(output, duration_ms, quiet));
    }
}

/// Result line as printed by the console
pub fn format_result(output: &str, duration_ms: u64, quiet: bool) -> String {
    let output = if output.is_empty() { "null" } else { output };
    if quiet {
        output.to_string()
    } else {
        format!("=> {output} ({duration_ms}ms)")
    }
}

/// Notifier that records everything, for scripted sessions and tests
#[derive(Clone, Default)]
pub struct BufferNotifier {
    lines: Arc<Mutex<Vec<String>>>,
}

impl BufferNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything printed so far, errors prefixed with `!`
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl ReplNotifier for BufferNotifier {
    fn on_output(&self, content: &str) {
        if !content.is_empty() {
            self.lines.lock().push(content.to_string());
        }
    }

    fn on_error(&self, content: &str) {
        self.lines.lock().push(format!("!{content}"));
    }

    fn on_result(&self, output: &str, duration_ms: u64, quiet: bool) {
        self.lines.lock().push(format_result(output, duration_ms, quiet));
    }
}
