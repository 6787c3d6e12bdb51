//! Integration tests for the rule store

use std::fs;
use std::thread;

use baby::{Always, Error, Outcome, Resolution, Rule, RuleStore};
use tempfile::{tempdir, TempDir};

fn new_store() -> (TempDir, RuleStore) {
    let dir = tempdir().unwrap();
    let store = RuleStore::open(dir.path().join("baby.conf")).unwrap();
    (dir, store)
}

fn keep() -> Always {
    Always(Resolution::Keep)
}

// ============================================================================
// CRUD
// ============================================================================

#[test]
fn test_create_then_list() {
    let (_dir, store) = new_store();
    store
        .create(Rule::new("update", "apt update -y"), &mut keep())
        .unwrap();

    let rules = store.list().unwrap();
    assert_eq!(rules, vec![Rule::new("update", "apt update -y")]);
}

#[test]
fn test_declined_overwrite_keeps_existing() {
    let (_dir, store) = new_store();
    store.create(Rule::new("x", "echo hi"), &mut keep()).unwrap();

    let result = store.create(Rule::new("x", "echo bye"), &mut keep());
    assert!(matches!(result, Err(Error::Conflict(name)) if name == "x"));
    assert_eq!(store.get("x").unwrap().command, "echo hi");
}

#[test]
fn test_approved_overwrite_keeps_position() {
    let (_dir, store) = new_store();
    store.create(Rule::new("a1", "one"), &mut keep()).unwrap();
    store.create(Rule::new("b1", "two"), &mut keep()).unwrap();

    let outcome = store
        .create(Rule::new("a1", "uno"), &mut Always(Resolution::Overwrite))
        .unwrap();
    assert_eq!(outcome, Outcome::Updated);
    assert_eq!(
        store.list().unwrap(),
        vec![Rule::new("a1", "uno"), Rule::new("b1", "two")]
    );
}

#[test]
fn test_resolver_sees_both_commands() {
    let (_dir, store) = new_store();
    store.create(Rule::new("x", "old"), &mut keep()).unwrap();

    let mut seen = Vec::new();
    let mut resolver = |c: &baby::Conflict<'_>| {
        seen.push((c.existing.to_string(), c.incoming.to_string()));
        Resolution::Overwrite
    };
    store.create(Rule::new("x", "new"), &mut resolver).unwrap();

    assert_eq!(seen, vec![("old".to_string(), "new".to_string())]);
}

#[test]
fn test_reserved_and_invalid_names_rejected() {
    let (_dir, store) = new_store();

    for name in ["-l", "a", "-LN", "--help"] {
        assert!(matches!(
            store.create(Rule::new(name, "true"), &mut keep()),
            Err(Error::Reserved(_))
        ));
    }
    for name in ["", "has space", "x=y", "-dash"] {
        assert!(matches!(
            store.create(Rule::new(name, "true"), &mut keep()),
            Err(Error::InvalidRule { .. })
        ));
    }
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn test_delete_keeps_order() {
    let (_dir, store) = new_store();
    for (name, command) in [("a1", "1"), ("b1", "2"), ("c1", "3")] {
        store.create(Rule::new(name, command), &mut keep()).unwrap();
    }

    store.delete("b1").unwrap();
    assert!(matches!(store.delete("b1"), Err(Error::NotFound(_))));
    assert_eq!(
        store.list().unwrap(),
        vec![Rule::new("a1", "1"), Rule::new("c1", "3")]
    );
}

#[test]
fn test_delete_all_then_list_is_empty() {
    let (_dir, store) = new_store();
    store.create(Rule::new("a1", "1"), &mut keep()).unwrap();
    store.create(Rule::new("b1", "2"), &mut keep()).unwrap();

    store.delete_all().unwrap();
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn test_update_changes_command_only() {
    let (_dir, store) = new_store();
    store.create(Rule::new("a1", "1"), &mut keep()).unwrap();
    store.create(Rule::new("b1", "2"), &mut keep()).unwrap();

    store.update(Rule::new("a1", "one")).unwrap();
    assert_eq!(store.list().unwrap()[0], Rule::new("a1", "one"));
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_round_trip_preserves_commands_and_order() {
    let (dir, store) = new_store();
    let rules = vec![
        Rule::new("quotes", r#"echo "it's" 'here'"#),
        Rule::new("multi", "echo one\necho two"),
        Rule::new("slashes", r"printf 'a\tb\\n'"),
        Rule::new("tabs", "printf\t'x'\r"),
        Rule::new("unicode", "echo héllo 🚀"),
        Rule::new("equals", "env A=1 B = 2 run"),
    ];
    for rule in &rules {
        store.create(rule.clone(), &mut keep()).unwrap();
    }

    let reopened = RuleStore::open(dir.path().join("baby.conf")).unwrap();
    assert_eq!(reopened.list().unwrap(), rules);

    // One physical line per rule
    let text = fs::read_to_string(reopened.path()).unwrap();
    assert_eq!(text.lines().count(), rules.len());
}

#[test]
fn test_unknown_lines_survive_rewrites() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("baby.conf");
    fs::write(&path, "# my aliases\n\nup = apt update\n").unwrap();
    let store = RuleStore::open(&path).unwrap();

    store.create(Rule::new("ls", "ls -la"), &mut keep()).unwrap();
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "# my aliases\n\nup = apt update\nls = ls -la\n"
    );
}

#[test]
fn test_no_duplicate_names_after_mixed_operations() {
    let (_dir, store) = new_store();
    let mut overwrite = Always(Resolution::Overwrite);

    store.create(Rule::new("x", "1"), &mut overwrite).unwrap();
    store.create(Rule::new("y", "2"), &mut overwrite).unwrap();
    store.create(Rule::new("x", "3"), &mut overwrite).unwrap();
    store.update(Rule::new("y", "4")).unwrap();
    store.create(Rule::new("x", "5"), &mut overwrite).unwrap();

    let names: Vec<String> = store.list().unwrap().into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["x", "y"]);
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_concurrent_rewrites_never_interleave() {
    const WRITERS: usize = 4;
    const RULES: usize = 40;

    let (_dir, store) = new_store();

    let handles: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let store = store.clone();
            thread::spawn(move || {
                for _ in 0..10 {
                    store
                        .transact(|doc| {
                            doc.clear();
                            for i in 0..RULES {
                                doc.push(Rule::new(
                                    format!("w{}_{}", writer, i),
                                    format!("echo writer {} rule {}", writer, i),
                                ));
                            }
                            Ok(())
                        })
                        .unwrap();
                }
            })
        })
        .collect();

    // Lock-free reader sees either nothing yet or one writer's whole set
    let reader = {
        let store = store.clone();
        thread::spawn(move || {
            for _ in 0..50 {
                let rules = store.list().unwrap();
                if rules.is_empty() {
                    continue;
                }
                assert_eq!(rules.len(), RULES);
                let prefix = rules[0].name.split('_').next().unwrap().to_string();
                assert!(rules.iter().all(|r| r.name.starts_with(&format!("{}_", prefix))));
            }
        })
    };

    for handle in handles {
        handle.join().unwrap();
    }
    reader.join().unwrap();

    let rules = store.list().unwrap();
    assert_eq!(rules.len(), RULES);
    let writer = rules[0].name.split('_').next().unwrap().to_string();
    for (i, rule) in rules.iter().enumerate() {
        assert_eq!(rule.name, format!("{}_{}", writer, i));
    }
}

#[test]
fn test_concurrent_creates_keep_every_rule() {
    let (_dir, store) = new_store();

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = store.clone();
            thread::spawn(move || {
                for i in 0..10 {
                    store
                        .create(
                            Rule::new(format!("t{}_{}", t, i), "true"),
                            &mut Always(Resolution::Keep),
                        )
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.list().unwrap().len(), 80);
}
