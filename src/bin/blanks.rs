//! Command-line interface for blanks
//! Replays choice scripts against the built-in Python-subset grammar.
//!
//! Usage:
//!   blanks run `<script>` [--format `<format>`] [--only-chosen]  - Render the program a script builds
//!   blanks alternatives `<script>`                               - List what may come next
//!   blanks hints `<script>`                                      - Quick hints at the next identifier
//!   blanks list-formats                                        - List output formats

use blanks::config::Loader;
use blanks::formats::FormatRegistry;
use blanks::grammar::python::python_subset;
use blanks::{BlanksConfig, Session};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn script_arg() -> Arg {
    Arg::new("script")
        .help("Path to the choice script")
        .required(true)
        .index(1)
}

fn main() {
    let matches = Command::new("blanks")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Build programs by choosing among the terminals a grammar allows next")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("TOML file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .help("Tracing filter, e.g. 'debug' or 'blanks=trace' (defaults to RUST_LOG, then 'warn')"),
        )
        .subcommand(
            Command::new("run")
                .about("Apply a script and print the result")
                .arg(script_arg())
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format (e.g., 'source', 'treeviz', 'dot')")
                        .default_value("source"),
                )
                .arg(
                    Arg::new("only-chosen")
                        .long("only-chosen")
                        .action(ArgAction::SetTrue)
                        .help("Limit graph formats to realized content"),
                ),
        )
        .subcommand(
            Command::new("alternatives")
                .about("Apply a script and list the alternatives at the cursor")
                .arg(script_arg()),
        )
        .subcommand(
            Command::new("hints")
                .about("Apply a script and list quick hints for the next identifier")
                .arg(script_arg()),
        )
        .subcommand(Command::new("list-formats").about("List available output formats"))
        .get_matches();

    init_logging(&matches);
    let config = load_config(&matches);

    match matches.subcommand() {
        Some(("run", run_matches)) => {
            let format = run_matches
                .get_one::<String>("format")
                .map(String::as_str)
                .unwrap_or("source");
            let only_chosen = run_matches.get_flag("only-chosen");
            handle_run_command(run_matches, config, format, only_chosen);
        }
        Some(("alternatives", alt_matches)) => handle_alternatives_command(alt_matches, config),
        Some(("hints", hint_matches)) => handle_hints_command(hint_matches, config),
        Some(("list-formats", _)) => handle_list_formats_command(),
        _ => unreachable!(),
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

fn init_logging(matches: &ArgMatches) {
    let filter = match matches.get_one::<String>("log-level") {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|e| fail(e)),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(matches: &ArgMatches) -> BlanksConfig {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    loader.build().unwrap_or_else(|e| fail(e))
}

/// Session over the Python grammar with the script already applied
fn replay(matches: &ArgMatches, config: BlanksConfig) -> Session {
    let path = matches
        .get_one::<String>("script")
        .unwrap_or_else(|| fail("missing script path"));
    let source = std::fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("reading {path}: {e}")));
    let grammar = python_subset().unwrap_or_else(|e| fail(e));
    let mut session = Session::with_config(Arc::new(grammar), config).unwrap_or_else(|e| fail(e));
    session.run_script(&source).unwrap_or_else(|e| fail(e));
    session
}

fn handle_run_command(matches: &ArgMatches, config: BlanksConfig, format: &str, only_chosen: bool) {
    let session = replay(matches, config);
    let registry = FormatRegistry::with_scope(only_chosen);
    let output = registry
        .serialize(session.tree(), format)
        .unwrap_or_else(|e| fail(e));
    println!("{output}");
}

fn handle_alternatives_command(matches: &ArgMatches, config: BlanksConfig) {
    let mut session = replay(matches, config);
    let alternatives = session.display_alternatives().unwrap_or_else(|e| fail(e));
    let tree = session.tree();
    for (index, leaf) in alternatives.iter().enumerate() {
        let value = match tree.hook(*leaf) {
            Some(hook) if hook.needs_input() => "  (needs value)",
            _ => "",
        };
        println!(
            "{index:>3}  {:<12} {}{value}",
            tree.display_text(*leaf),
            tree.tag(*leaf).tag
        );
    }
}

fn handle_hints_command(matches: &ArgMatches, config: BlanksConfig) {
    let mut session = replay(matches, config);
    let hints = session.hints().unwrap_or_else(|e| fail(e));
    for hint in hints {
        println!("{:<12} {}", hint.text, hint.tag.tag);
    }
}

fn handle_list_formats_command() {
    let registry = FormatRegistry::default();
    println!("Available formats:\n");
    for name in registry.list_formats() {
        let description = registry.get(&name).map(|f| f.description()).unwrap_or("");
        println!("  {name}");
        println!("    {description}");
    }
}
