//! baby - personal command-alias manager
//!
//! Store long shell commands under short names and run them by name.
//!
//! # Usage
//!
//! ```bash
//! # Create a rule, then run it
//! baby -n update 'sudo apt update -y'
//! baby update
//!
//! # Fill placeholders from the command line
//! baby -n login "ssh b%('user')%b@b%('host')%b"
//! baby login -b=user:alice -b=host:example.org
//! ```

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use serde_json::json;
use tracing_subscriber::EnvFilter;

use baby::{
    audit::{AuditLogger, EventKind},
    config::Config,
    error::{Error, Result},
    executor::ShellExecutor,
    export,
    merge::ImportMerger,
    output::{Outcome, Report},
    parser::placeholder::{Bindings, BINDING_PREFIX},
    prompt::Terminal,
    rules::Rule,
    runner::Runner,
    source::ImportSource,
    store::RuleStore,
};

/// Environment variable holding the diagnostic log filter
const LOG_ENV: &str = "BABY_LOG";

/// Print version information
fn print_version() {
    println!("baby {}", env!("CARGO_PKG_VERSION"));
}

/// Print help message
fn print_help() {
    println!(
        r#"baby - personal command-alias manager

USAGE:
    baby <option>
    baby <name> [<name>...] [-b=<label>:<value>...]

OPTIONS:
    -l                      List stored rules
    -n <name> '<command>'   Create a new rule
    -r <name> [<name>...]   Delete existing rules
    -r a                    Delete all rules
    -c <name> '<command>'   Update the command of a rule
    -ln <name>              Show the contents of a specific rule
    -i <url or path>        Import rules from a URL or file
    -e                      Export rules to a text file
    -h, --help              Show this help
    -v, --version           Show the program version

PLACEHOLDERS:
    Write b%('label')%b inside a command to be asked for the value when the
    rule runs, or pass it up front with -b=label:value.

ENVIRONMENT:
    BABY_CONFIG             Path to config file
    BABY_STORE              Path to the rule file
    BABY_LOG                Diagnostic log filter (default: warn)

EXAMPLES:
    Create a new rule: baby -n update 'sudo apt update -y'
    The next time just run: baby update

For further help go to https://github.com/manuwarfare/baby"#
    );
}

/// What the invocation asks for
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Help,
    Version,
    List,
    Show(String),
    New { name: String, command: String },
    Change { name: String, command: String },
    Remove(Vec<String>),
    RemoveAll,
    Import(String),
    Export,
    Run { names: Vec<String>, bindings: Vec<String> },
    /// Known option used the wrong way
    Usage(&'static str),
    Unknown(String),
}

/// Parse command line arguments
struct Args {
    command: Command,
}

impl Args {
    fn parse() -> Self {
        Self::from_vec(env::args().skip(1).collect())
    }

    fn from_vec(args: Vec<String>) -> Self {
        let rest = args.get(1..).unwrap_or_default();

        let command = match args.first().map(String::as_str) {
            None | Some("-h") | Some("--help") => Command::Help,
            Some("-v") | Some("--version") => Command::Version,
            Some("-l") => Command::List,
            Some("-n") => match rest {
                [name, command @ ..] if !command.is_empty() => Command::New {
                    name: name.clone(),
                    command: command.join(" "),
                },
                _ => Command::Usage("Incorrect usage of -n. It should be: baby -n <name> '<command>'"),
            },
            Some("-c") => match rest {
                [name, command @ ..] if !command.is_empty() => Command::Change {
                    name: name.clone(),
                    command: command.join(" "),
                },
                _ => Command::Usage("Incorrect usage of -c. It should be: baby -c <name> '<command>'"),
            },
            Some("-r") => match rest {
                [] => Command::Usage(
                    "Incorrect usage of -r. It should be: baby -r <name> [<name>...] or baby -r a",
                ),
                [all] if all == "a" => Command::RemoveAll,
                names => Command::Remove(names.to_vec()),
            },
            Some("-ln") => match rest {
                [name] => Command::Show(name.clone()),
                _ => Command::Usage("Incorrect usage of -ln. It should be: baby -ln <name>"),
            },
            Some("-i") => match rest {
                [source] => Command::Import(source.clone()),
                _ => Command::Usage("Incorrect usage of -i. It should be: baby -i <url or file path>"),
            },
            Some("-e") => Command::Export,
            Some(_) => Self::parse_run(&args),
        };

        Args { command }
    }

    /// Rule names mixed with `-b=label:value` bindings
    fn parse_run(args: &[String]) -> Command {
        let mut names = Vec::new();
        let mut bindings = Vec::new();

        for arg in args {
            if arg.starts_with(BINDING_PREFIX) {
                bindings.push(arg.clone());
            } else if arg.starts_with('-') {
                return Command::Unknown(arg.clone());
            } else {
                names.push(arg.clone());
            }
        }

        if names.is_empty() {
            return Command::Usage("No rules found to execute.");
        }
        Command::Run { names, bindings }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    // Handle help, version and usage problems before touching the store
    match &args.command {
        Command::Help => {
            print_help();
            return ExitCode::SUCCESS;
        }
        Command::Version => {
            print_version();
            return ExitCode::SUCCESS;
        }
        Command::Usage(message) => {
            println!("Error: {}", message);
            return ExitCode::SUCCESS;
        }
        Command::Unknown(option) => {
            tracing::debug!(%option, "unrecognized option");
            println!("Unrecognized option. Use baby -h to see the available options.");
            return ExitCode::SUCCESS;
        }
        _ => {}
    }

    match execute(args.command) {
        Ok(code) => code,
        Err(e) if e.is_fatal() => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            println!("Error: {}", e);
            ExitCode::SUCCESS
        }
    }
}

/// Load configuration, open the store and dispatch
fn execute(command: Command) -> Result<ExitCode> {
    let config = Config::load()?;
    let store = RuleStore::open(config.store_path())?;
    let audit_path = config.audit_path();
    let mut audit = AuditLogger::new(audit_path.as_deref());
    let mut terminal = Terminal::stdio();

    tracing::debug!(store = %store.path().display(), ?command, "dispatching");

    match command {
        Command::List => {
            let rules = store.list()?;
            if rules.is_empty() {
                println!("No rules have been created in Baby yet.");
            }
            for rule in rules {
                println!("{} = {}", rule.name, rule.command);
            }
        }

        Command::Show(name) => match store.get(&name) {
            Ok(rule) => println!("{} = {}", rule.name, rule.command),
            Err(Error::NotFound(_)) => println!("Rule '{}' does not exist.", name),
            Err(e) => return Err(e),
        },

        Command::New { name, command } => {
            let rule = Rule::new(name.as_str(), command.as_str());
            match store.create(rule, &mut terminal) {
                Ok(outcome) => {
                    let kind = if outcome == Outcome::Updated {
                        EventKind::RuleUpdated
                    } else {
                        EventKind::RuleCreated
                    };
                    audit.record(kind, json!({ "rule": name, "command": command }));
                    println!("{}", outcome.message(&name));
                }
                Err(Error::Conflict(_)) => println!("Operation cancelled."),
                Err(e) => return Err(e),
            }
        }

        Command::Change { name, command } => {
            store.update(Rule::new(name.as_str(), command.as_str()))?;
            audit.record(
                EventKind::RuleUpdated,
                json!({ "rule": name, "command": command }),
            );
            println!("{}", Outcome::Updated.message(&name));
        }

        Command::Remove(names) => {
            let mut report = Report::new();
            for name in names {
                let outcome = match store.delete(&name) {
                    Ok(()) => {
                        audit.record(EventKind::RuleDeleted, json!({ "rule": name }));
                        Outcome::Deleted
                    }
                    Err(Error::NotFound(_)) => Outcome::NotFound,
                    Err(e) => return Err(e),
                };
                report.push(name, outcome);
            }
            print!("{}", report);
        }

        Command::RemoveAll => {
            let confirmed = terminal
                .confirm("Are you sure you want to delete all rules? (y/n): ")
                .map_err(|e| Error::io("Failed to read confirmation", e))?;
            if confirmed {
                let count = store.list()?.len();
                store.delete_all()?;
                audit.record(EventKind::RulesCleared, json!({ "count": count }));
                println!("All rules have been successfully deleted.");
            } else {
                println!("Operation cancelled.");
            }
        }

        Command::Import(arg) => {
            let source = ImportSource::parse(&arg);
            let text = source.read(&config.transfer)?;
            let report = ImportMerger::new(&store).import_text(&text, &mut terminal)?;

            if report.is_empty() {
                println!("No rules found in {}.", source);
            }
            print!("{}", report);

            audit.record(
                EventKind::RulesImported,
                json!({
                    "source": source.to_string(),
                    "added": report.count(|o| *o == Outcome::Added),
                    "updated": report.count(|o| *o == Outcome::Updated),
                    "skipped": report.count(|o| *o == Outcome::Skipped),
                    "rejected": report.count(|o| matches!(o, Outcome::Rejected { .. })),
                }),
            );
        }

        Command::Export => {
            let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
            println!("Exporting rules in progress... Press ctrl+c to quit");
            println!("You can export rules in bulk, e.g., <rule1> <rule2>");

            let exported = export::interactive(
                &store,
                &mut terminal,
                &config.transfer.export_file_name,
                &home,
            )?;
            if let Some(exported) = exported {
                audit.record(
                    EventKind::RulesExported,
                    json!({
                        "path": exported.path.display().to_string(),
                        "count": exported.count,
                    }),
                );
                println!("Rules successfully exported to: {}", exported.path.display());
            }
        }

        Command::Run { names, bindings } => {
            let mut values = Bindings::new();
            for arg in &bindings {
                values.add_arg(arg)?;
            }

            let executor =
                ShellExecutor::new(config.runner.shell.clone(), config.runner.shell_args.clone());
            let report = Runner::new(&store, executor, &mut audit)
                .announce(true)
                .run(&names, &values, &mut terminal)?;

            for (name, outcome) in report.items() {
                if outcome.is_error() {
                    eprintln!("{}", outcome.message(name));
                }
            }
            if report.has_failures() {
                return Ok(ExitCode::FAILURE);
            }
        }

        Command::Help | Command::Version | Command::Usage(_) | Command::Unknown(_) => {}
    }

    Ok(ExitCode::SUCCESS)
}
