//! aebridge REPL - interactive ExtendScript console for After Effects
//!
//! This crate provides the console behind the `aebridge-repl` binary: command
//! parsing, line evaluation through a bridge session and pluggable output.

pub mod repl;

pub use repl::{BufferNotifier, DefaultNotifier, Repl, ReplCommand, ReplNotifier};
