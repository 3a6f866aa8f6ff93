//! REPL command parsing and definitions
//!
//! Dot-commands (.help, .quit, ...) are handled by the console itself;
//! every other line goes to the host.

use anyhow::{anyhow, Result};

/// Available REPL commands
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    /// Show help information
    Help,
    /// Exit the REPL
    Quit,
    /// Probe the host endpoint
    Ping,
    /// Send code as-is, without registering the result
    Raw(String),
    /// Describe the application
    App,
    /// List the items of the open project
    Items,
    /// Toggle quiet mode
    Quiet,
    /// Toggle debug mode
    Debug,
}

/// Parse a command string into a ReplCommand
pub fn parse_command(input: &str) -> Result<ReplCommand> {
    let trimmed = input.trim();

    let Some(body) = trimmed.strip_prefix('.') else {
        return Err(anyhow!("Commands must start with '.'"));
    };

    let (name, rest) = match body.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (body, ""),
    };

    if name.is_empty() {
        return Err(anyhow!("Empty command"));
    }

    match name {
        "help" | "h" => Ok(ReplCommand::Help),
        "quit" | "q" | "exit" => Ok(ReplCommand::Quit),
        "ping" => Ok(ReplCommand::Ping),
        "raw" => {
            if rest.is_empty() {
                return Err(anyhow!("Usage: .raw <code>"));
            }
            Ok(ReplCommand::Raw(rest.to_string()))
        }
        "app" => Ok(ReplCommand::App),
        "items" => Ok(ReplCommand::Items),
        "quiet" => Ok(ReplCommand::Quiet),
        "debug" => Ok(ReplCommand::Debug),
        _ => Err(anyhow!("Unknown command: .{name}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_help() {
        assert_eq!(parse_command(".help").unwrap(), ReplCommand::Help);
        assert_eq!(parse_command(".h").unwrap(), ReplCommand::Help);
    }

    #[test]
    fn test_parse_quit() {
        assert_eq!(parse_command(".quit").unwrap(), ReplCommand::Quit);
        assert_eq!(parse_command(".q").unwrap(), ReplCommand::Quit);
        assert_eq!(parse_command(".exit").unwrap(), ReplCommand::Quit);
    }

    #[test]
    fn test_parse_raw_keeps_code_intact() {
        assert_eq!(
            parse_command(".raw  app.project.numItems;  app.version;").unwrap(),
            ReplCommand::Raw("app.project.numItems;  app.version;".to_string())
        );
    }

    #[test]
    fn test_parse_invalid_command() {
        assert!(parse_command(".invalid").is_err());
        assert!(parse_command("help").is_err()); // Missing dot
        assert!(parse_command(".raw").is_err()); // Missing code
        assert!(parse_command(".").is_err());
    }
}
