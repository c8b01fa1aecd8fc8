use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::write;
use tempfile::{tempdir, NamedTempFile};

use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{layer::Context, Layer, Registry};

#[test]
fn help_lists_run_subcommand() {
    let mut cmd = Command::cargo_bin("text-reorg").expect("Binary exists");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"));
}

#[test]
fn run_without_roots_fails_with_message() {
    let logs = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("text-reorg").expect("Binary exists");
    cmd.arg("run")
        .arg("--log-dir")
        .arg(logs.path())
        .env_remove("TEXT_REORG_INPUT")
        .env_remove("TEXT_REORG_OUTPUT")
        .env("API_KEY", "unused");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("input root"));
}

#[test]
fn run_writes_a_timestamped_log_file() {
    let logs = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("text-reorg").expect("Binary exists");
    cmd.arg("run")
        .arg("--log-dir")
        .arg(logs.path())
        .env_remove("TEXT_REORG_INPUT")
        .env_remove("TEXT_REORG_OUTPUT");
    cmd.assert().failure();

    let names: Vec<String> = std::fs::read_dir(logs.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 1, "expected one log file, got {names:?}");
    assert!(names[0].starts_with("text-reorg_") && names[0].ends_with(".log"));
}

#[test]
fn run_rejects_invalid_config_file() {
    let logs = tempdir().unwrap();
    let config = NamedTempFile::new().unwrap();
    write(config.path(), b"traversal: [:::").unwrap();

    let mut cmd = Command::cargo_bin("text-reorg").expect("Binary exists");
    cmd.arg("run")
        .arg("--config")
        .arg(config.path())
        .arg("--log-dir")
        .arg(logs.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("YAML"));
}

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        self.events.lock().unwrap().push(format!("{:?}", event));
    }
}

#[tokio::test]
async fn emits_trace_initialised_event() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    use text_reorg::cli::{run, Cli, Commands, RunArgs};

    let cli = Cli {
        command: Commands::Run(RunArgs {
            config: Some(std::path::PathBuf::from("dummy.yaml")),
            ..Default::default()
        }),
    };

    let _ = run(cli).await;

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}
