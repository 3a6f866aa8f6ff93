use std::fs;

use aebridge_core::BridgeConfig;
use aebridge_host::{spawn_ephemeral, RunningHost};
use aebridge_repl::repl::{BufferNotifier, Repl, ReplCommand};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn repl() -> (RunningHost, Repl, BufferNotifier) {
    let host = spawn_ephemeral().unwrap();
    let mut repl = Repl::connect(BridgeConfig::new("127.0.0.1", host.port())).unwrap();
    let notifier = BufferNotifier::new();
    repl.set_notifier(Box::new(notifier.clone()));
    (host, repl, notifier)
}

#[test]
fn test_evaluate_lines() {
    let (_host, mut repl, _) = repl();

    let (output, _duration) = repl.execute("app.version;").unwrap();
    assert_eq!(output, "\"24.0.0\"");

    let (output, _duration) = repl.execute("app.project;").unwrap();
    assert!(output.starts_with("<Project p"), "{output}");
}

#[test]
fn test_commands() {
    let (_host, mut repl, _) = repl();

    let pong = repl.handle_command(ReplCommand::Ping).unwrap();
    assert!(pong.contains("reachable"));

    let app = repl.handle_command(ReplCommand::App).unwrap();
    assert!(app.starts_with("After Effects 24.0.0"), "{app}");

    assert_eq!(
        repl.handle_command(ReplCommand::Items).unwrap(),
        "Project is empty"
    );

    repl.set_quiet(true);
    assert_eq!(
        repl.handle_command(ReplCommand::Raw("app.project.numItems;".to_string()))
            .unwrap(),
        "0"
    );

    repl.handle_command(ReplCommand::Quit).unwrap();
    assert!(!repl.is_running());
}

#[test]
fn test_script_file() {
    let (_host, mut repl, notifier) = repl();
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("demo.jsx");
    fs::write(
        &script,
        "// open the demo project\n\
         .quiet\n\
         app.open(File(\"/projects/demo.aep\"));\n\
         .items\n\
         app.nope();\n\
         .quit\n\
         app.version;\n",
    )
    .unwrap();

    repl.run_script(&fs::read_to_string(&script).unwrap());

    let lines = notifier.lines();
    assert_eq!(lines[0], "Quiet mode: on");
    assert!(lines[1].starts_with("<Project p"), "{}", lines[1]);
    assert!(lines[2].starts_with("4 item(s):"), "{}", lines[2]);
    assert!(lines[2].contains("Main [Composition]"), "{}", lines[2]);
    assert!(lines[3].starts_with("!Error:"), "{}", lines[3]);
    assert_eq!(lines[4], "Goodbye!");
    // Nothing runs after .quit
    assert_eq!(lines.len(), 5);
}
