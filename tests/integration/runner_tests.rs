//! Integration tests for running rules

use std::fs;
use std::io;

use baby::audit::Identity;
use baby::{
    Always, AuditLogger, Bindings, CommandExecutor, ExitReport, Outcome, Resolution, Rule,
    RuleStore, Runner,
};
use serde_json::Value;
use tempfile::{tempdir, TempDir};

/// Counts executions without spawning anything
#[derive(Default)]
struct Counting {
    commands: Vec<String>,
}

impl CommandExecutor for Counting {
    fn execute(&mut self, command: &str) -> io::Result<ExitReport> {
        self.commands.push(command.to_string());
        Ok(ExitReport::success())
    }
}

fn store_with(rules: &[(&str, &str)]) -> (TempDir, RuleStore) {
    let dir = tempdir().unwrap();
    let store = RuleStore::open(dir.path().join("baby.conf")).unwrap();
    for (name, command) in rules {
        store
            .create(Rule::new(*name, *command), &mut Always(Resolution::Keep))
            .unwrap();
    }
    (dir, store)
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn no_prompt(label: &str) -> io::Result<String> {
    panic!("unexpected prompt for '{}'", label)
}

fn audit_lines(path: &std::path::Path) -> Vec<Value> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_missing_rule_runs_nothing() {
    let (_dir, store) = store_with(&[]);
    let mut audit = AuditLogger::default();
    let mut exec = Counting::default();

    let report = Runner::new(&store, &mut exec, &mut audit)
        .run(&names(&["missing"]), &Bindings::new(), &mut no_prompt)
        .unwrap();

    assert_eq!(report.outcome("missing"), Some(&Outcome::NotFound));
    assert!(!report.has_failures());
    assert!(exec.commands.is_empty());
}

#[test]
fn test_command_without_placeholders_runs_verbatim() {
    let command = r#"echo "%b ('x') b%" && printf 'b%(x)%b'"#;
    let (_dir, store) = store_with(&[("raw", command)]);
    let mut audit = AuditLogger::default();
    let mut exec = Counting::default();

    Runner::new(&store, &mut exec, &mut audit)
        .run(&names(&["raw"]), &Bindings::new(), &mut no_prompt)
        .unwrap();

    assert_eq!(exec.commands, vec![command]);
}

#[test]
fn test_each_unbound_occurrence_is_prompted() {
    let (_dir, store) = store_with(&[("twice", "echo b%('x')%b b%('x')%b b%('y')%b")]);
    let mut audit = AuditLogger::default();
    let mut exec = Counting::default();
    let bindings: Bindings = [("y", "bound")].into_iter().collect();

    let mut asked = Vec::new();
    let mut values = |label: &str| -> io::Result<String> {
        asked.push(label.to_string());
        Ok(format!("v{}", asked.len()))
    };

    Runner::new(&store, &mut exec, &mut audit)
        .run(&names(&["twice"]), &bindings, &mut values)
        .unwrap();

    assert_eq!(asked, vec!["x", "x"]);
    assert_eq!(exec.commands, vec!["echo v1 v2 bound"]);
}

#[test]
fn test_audit_records_every_execution() {
    let (dir, store) = store_with(&[("hello", "echo b%('who')%b")]);
    let audit_path = dir.path().join("audit.jsonl");
    let mut audit = AuditLogger::new(Some(audit_path.as_path())).with_identity(Identity {
        actor: "tester".to_string(),
        source_address: "local".to_string(),
    });
    let mut exec = Counting::default();
    let bindings: Bindings = [("who", "secret-value")].into_iter().collect();

    Runner::new(&store, &mut exec, &mut audit)
        .run(&names(&["hello", "nope"]), &bindings, &mut no_prompt)
        .unwrap();
    drop(audit);

    let events = audit_lines(&audit_path);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["event_kind"], "command_succeeded");
    assert_eq!(events[0]["actor"], "tester");
    assert_eq!(events[0]["details"]["rule"], "hello");
    assert_eq!(events[1]["event_kind"], "rule_not_found");

    // Bound values stay out of the log
    assert!(!fs::read_to_string(&audit_path)
        .unwrap()
        .contains("secret-value"));
}

#[cfg(unix)]
mod shell {
    use super::*;
    use baby::ShellExecutor;

    fn sh() -> ShellExecutor {
        ShellExecutor::new("sh", vec!["-c".to_string()])
    }

    #[test]
    fn test_shell_runs_expanded_command() {
        let dir = tempdir().unwrap();
        let marker = dir.path().join("marker.txt");
        let (_store_dir, store) = store_with(&[("touch", "echo b%('word')%b > b%('file')%b")]);
        let mut audit = AuditLogger::default();

        let bindings: Bindings = [
            ("word", "hello".to_string()),
            ("file", marker.display().to_string()),
        ]
        .into_iter()
        .collect();

        let report = Runner::new(&store, sh(), &mut audit)
            .run(&names(&["touch"]), &bindings, &mut no_prompt)
            .unwrap();

        assert!(matches!(report.outcome("touch"), Some(Outcome::Succeeded { .. })));
        assert_eq!(fs::read_to_string(&marker).unwrap(), "hello\n");
    }

    #[test]
    fn test_failing_command_continues_batch() {
        let (_dir, store) = store_with(&[("fail", "exit 4"), ("ok", "true")]);
        let mut audit = AuditLogger::default();

        let report = Runner::new(&store, sh(), &mut audit)
            .run(&names(&["fail", "ok"]), &Bindings::new(), &mut no_prompt)
            .unwrap();

        match report.outcome("fail") {
            Some(Outcome::Failed { reason, .. }) => assert_eq!(reason, "exit status 4"),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(matches!(report.outcome("ok"), Some(Outcome::Succeeded { .. })));
        assert!(report.has_failures());
    }

    #[test]
    fn test_cli_announces_command_on_stdout() {
        let dir = tempdir().unwrap();
        let store_path = dir.path().join("baby.conf");
        fs::write(&store_path, "hi = echo from-rule\n").unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(
            &config_path,
            "[runner]\nshell = \"sh\"\n\n[audit]\nenabled = false\n",
        )
        .unwrap();

        let output = std::process::Command::new(env!("CARGO_BIN_EXE_baby"))
            .arg("hi")
            .env("BABY_STORE", &store_path)
            .env("BABY_CONFIG", &config_path)
            .output()
            .unwrap();

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert_eq!(stdout, "Executing: echo from-rule\nfrom-rule\n");
        assert!(!String::from_utf8_lossy(&output.stderr).contains("Executing:"));
    }
}
