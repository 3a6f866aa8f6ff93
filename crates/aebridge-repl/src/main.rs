use std::{
    fs,
    io::{self, IsTerminal},
    time::Duration,
};

use aebridge_core::{config::DEFAULT_HOST, init_tracing, BridgeConfig};
use anyhow::{Context, Result};
use clap::{Arg, Command};
use rustyline::{error::ReadlineError, DefaultEditor};

use aebridge_repl::Repl;

fn main() -> Result<()> {
    init_tracing();

    let matches = Command::new("aebridge-repl")
        .version(aebridge_core::VERSION)
        .about("Interactive ExtendScript console for After Effects")
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Address of the panel endpoint")
                .default_value(DEFAULT_HOST),
        )
        .arg(
            Arg::new("port")
                .long("port")
                .value_name("PORT")
                .help("Port of the panel endpoint")
                .value_parser(clap::value_parser!(u16))
                .default_value("2000"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("SECS")
                .help("Give up on an evaluation after this many seconds")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("file")
                .value_name("FILE")
                .help("Run a script of console lines instead of reading the terminal")
                .index(1),
        )
        .get_matches();

    let mut config = BridgeConfig::default();
    if let Some(host) = matches.get_one::<String>("host") {
        config.host = host.clone();
    }
    if let Some(port) = matches.get_one::<u16>("port") {
        config.port = *port;
    }
    config.request_timeout = matches
        .get_one::<u64>("timeout")
        .map(|secs| Duration::from_secs(*secs));
    let input_file = matches.get_one::<String>("file").cloned();

    let mut repl = Repl::connect(config)?;

    if let Some(path) = input_file {
        let source = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
        repl.run_script(&source);
        return Ok(());
    }

    println!("aebridge REPL v{}", aebridge_core::VERSION);
    println!("Type .help for help, .quit to exit");
    println!();

    run_interactive(&mut repl)
}

fn run_interactive(repl: &mut Repl) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let is_interactive = io::stdin().is_terminal();

    while repl.is_running() {
        match rl.readline("ae> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                rl.add_history_entry(line.as_str())?;
                if !is_interactive {
                    println!("ae> {line}");
                }
                repl.process_line(&line);
            }
            Err(ReadlineError::Interrupted) => {
                println!("Use .quit to exit");
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }
    }

    repl.show_exit_stats();
    Ok(())
}
