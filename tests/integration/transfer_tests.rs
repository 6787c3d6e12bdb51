//! Integration tests for importing and exporting rule blocks

use std::fs;

use baby::config::TransferConfig;
use baby::export;
use baby::parser::block;
use baby::{Always, ImportMerger, ImportSource, Outcome, Resolution, Rule, RuleStore};
use tempfile::{tempdir, TempDir};

fn new_store() -> (TempDir, RuleStore) {
    let dir = tempdir().unwrap();
    let store = RuleStore::open(dir.path().join("baby.conf")).unwrap();
    (dir, store)
}

fn overwrite() -> Always {
    Always(Resolution::Overwrite)
}

const BLOCK: &str = "#shared rules
b:ping = ping 8.8.8.8:b
b:up = sudo apt update &amp;&amp; sudo apt upgrade -y:b
b:greet = echo \\u00a1hola!:b
";

// ============================================================================
// Extraction
// ============================================================================

#[test]
fn test_extract_single_entry() {
    let extracted = block::extract("b:ping = ping 8.8.8.8:b");
    assert_eq!(extracted.rules, vec![Rule::new("ping", "ping 8.8.8.8")]);
    assert!(extracted.rejected.is_empty());
}

#[test]
fn test_extract_decodes_entities_and_unicode() {
    let extracted = block::extract(BLOCK);
    assert_eq!(
        extracted.rules,
        vec![
            Rule::new("ping", "ping 8.8.8.8"),
            Rule::new("up", "sudo apt update && sudo apt upgrade -y"),
            Rule::new("greet", "echo ¡hola!"),
        ]
    );
}

#[test]
fn test_extract_finds_entries_inside_prose() {
    let text = "Try b:a1 = echo one:b and also b:a2 = echo two:b today.\n# b:hidden = nope:b\n";
    let names: Vec<String> = block::extract(text)
        .rules
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["a1", "a2"]);
}

// ============================================================================
// Import
// ============================================================================

#[test]
fn test_import_into_empty_store() {
    let (_dir, store) = new_store();
    let report = ImportMerger::new(&store)
        .import_text(BLOCK, &mut overwrite())
        .unwrap();

    assert_eq!(report.count(|o| *o == Outcome::Added), 3);
    assert_eq!(
        store.get("up").unwrap().command,
        "sudo apt update && sudo apt upgrade -y"
    );
}

#[test]
fn test_import_twice_is_idempotent() {
    let (_dir, store) = new_store();
    store
        .create(Rule::new("ping", "ping 1.1.1.1"), &mut overwrite())
        .unwrap();

    let merger = ImportMerger::new(&store);
    merger.import_text(BLOCK, &mut overwrite()).unwrap();
    let once = store.list().unwrap();

    let report = merger.import_text(BLOCK, &mut overwrite()).unwrap();
    assert_eq!(store.list().unwrap(), once);
    assert_eq!(report.count(|o| *o == Outcome::Unchanged), 3);
}

#[test]
fn test_import_keeps_existing_order_and_appends() {
    let (_dir, store) = new_store();
    store.create(Rule::new("zz", "true"), &mut overwrite()).unwrap();
    store
        .create(Rule::new("ping", "ping 1.1.1.1"), &mut overwrite())
        .unwrap();

    ImportMerger::new(&store)
        .import_text(BLOCK, &mut overwrite())
        .unwrap();

    let names: Vec<String> = store.list().unwrap().into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["zz", "ping", "up", "greet"]);
}

#[test]
fn test_import_declined_conflict_is_skipped() {
    let (_dir, store) = new_store();
    store
        .create(Rule::new("ping", "ping 1.1.1.1"), &mut overwrite())
        .unwrap();

    let report = ImportMerger::new(&store)
        .import_text(BLOCK, &mut Always(Resolution::Keep))
        .unwrap();

    assert_eq!(report.outcome("ping"), Some(&Outcome::Skipped));
    assert_eq!(store.get("ping").unwrap().command, "ping 1.1.1.1");
}

#[test]
fn test_import_reports_rejected_entries() {
    let (_dir, store) = new_store();
    let text = "b:-l = ls:b\nb:ok = true:b\nb:bad = echo \\ud800:b\nb:empty =   :b\n";

    let report = ImportMerger::new(&store)
        .import_text(text, &mut overwrite())
        .unwrap();

    assert_eq!(report.outcome("ok"), Some(&Outcome::Added));
    for name in ["-l", "bad", "empty"] {
        assert!(
            matches!(report.outcome(name), Some(Outcome::Rejected { .. })),
            "expected '{}' to be rejected",
            name
        );
    }
    assert_eq!(store.list().unwrap(), vec![Rule::new("ok", "true")]);
}

#[test]
fn test_import_from_file_source() {
    let (dir, store) = new_store();
    let path = dir.path().join("shared.txt");
    fs::write(&path, BLOCK).unwrap();

    let source = ImportSource::parse(path.to_str().unwrap());
    let text = source.read(&TransferConfig::default()).unwrap();
    ImportMerger::new(&store)
        .import_text(&text, &mut overwrite())
        .unwrap();

    assert_eq!(store.list().unwrap().len(), 3);
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn test_export_then_import_reproduces_rules() {
    let (dir, source_store) = new_store();
    let rules = vec![
        Rule::new("tricky", r#"echo "<a & b>" :b done \u0041 ü"#),
        Rule::new("multi", "echo one\necho two"),
        Rule::new("emoji", "echo 🚀"),
    ];
    for rule in &rules {
        source_store.create(rule.clone(), &mut overwrite()).unwrap();
    }

    let selection = export::select(&source_store, &[]).unwrap();
    let text = block::render(&selection.rules, Some("backup"));
    let path = export::write_to_dir(dir.path(), "baby-rules.txt", &text).unwrap();

    let target_dir = tempdir().unwrap();
    let target = RuleStore::open(target_dir.path().join("baby.conf")).unwrap();
    let contents = fs::read_to_string(path).unwrap();
    ImportMerger::new(&target)
        .import_text(&contents, &mut overwrite())
        .unwrap();

    assert_eq!(target.list().unwrap(), rules);
}

#[test]
fn test_exported_file_has_one_line_per_rule() {
    let (dir, store) = new_store();
    store
        .create(Rule::new("multi", "echo a\necho b"), &mut overwrite())
        .unwrap();
    store.create(Rule::new("one", "true"), &mut overwrite()).unwrap();

    let selection = export::select(&store, &[]).unwrap();
    let text = block::render(&selection.rules, Some("two\nlines"));
    let path = export::write_to_dir(dir.path(), "out.txt", &text).unwrap();

    let written = fs::read_to_string(path).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines[0], "#two lines");
    assert_eq!(lines.len(), 3);
    assert!(lines[1..].iter().all(|l| l.starts_with("b:") && l.ends_with(":b")));
}
