/// mee - interactive console with context-sensitive completion
use mee::completion::SuggestionCategory;
use mee::logging::init_logger;
use mee::repl::{ConsoleConfig, ConsoleHelper};
use mee::{DocTarget, RegistryScope, Resolver, Scope};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use std::env;
use std::path::PathBuf;
use std::process;
use tracing::{debug, warn};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_usage() {
    eprintln!("mee v{}", VERSION);
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    mee [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    -h, --help                Print this help message");
    eprintln!("    -v, --version             Print version information");
    eprintln!("    -c, --config <FILE>       Read configuration from FILE");
    eprintln!("    --log-level <LEVEL>       Log filter (overrides RUST_LOG)");
    eprintln!("    -e, --eval <EXPR>         Evaluate EXPR and print the result");
    eprintln!("    --complete <FRAGMENT>     Print completions for FRAGMENT");
    eprintln!();
    eprintln!("Without -e or --complete an interactive console is started.");
    eprintln!();
    eprintln!("EXAMPLES:");
    eprintln!("    mee");
    eprintln!("    mee --complete 'Math::P'");
    eprintln!("    mee -e '[1, 2].class'");
}

fn print_version() {
    println!("mee {}", VERSION);
}

fn print_console_help() {
    println!("Commands:");
    println!("    :doc <fragment>     Show the documentation target of a fragment");
    println!("    :names [category]   List names visible in the scope");
    println!("    :help               Show this message");
    println!("    exit, quit          Leave the console");
    println!();
    println!("Press Tab to complete.");
}

struct Options {
    config: Option<PathBuf>,
    log_level: Option<String>,
    eval: Option<String>,
    complete: Option<String>,
}

fn parse_args() -> Result<Options, String> {
    let args: Vec<String> = env::args().collect();

    let mut config = None;
    let mut log_level = None;
    let mut eval = None;
    let mut complete = None;
    let mut i = 1;

    let value_of = |i: &mut usize, flag: &str| -> Result<String, String> {
        *i += 1;
        args.get(*i)
            .cloned()
            .ok_or_else(|| format!("Missing value after {}", flag))
    };

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                process::exit(0);
            }
            flag @ ("-c" | "--config") => {
                config = Some(PathBuf::from(value_of(&mut i, flag)?));
            }
            flag @ "--log-level" => {
                log_level = Some(value_of(&mut i, flag)?);
            }
            flag @ ("-e" | "--eval") => {
                eval = Some(value_of(&mut i, flag)?);
            }
            flag @ "--complete" => {
                complete = Some(value_of(&mut i, flag)?);
            }
            arg => {
                return Err(format!("Unknown argument: {}", arg));
            }
        }
        i += 1;
    }

    Ok(Options {
        config,
        log_level,
        eval,
        complete,
    })
}

fn build_scope(config: &ConsoleConfig) -> RegistryScope {
    let mut scope = RegistryScope::new();
    config.apply(&mut scope);
    scope
}

fn format_doc_target(target: &DocTarget) -> String {
    match target {
        DocTarget::Single(name) => name.clone(),
        DocTarget::Ambiguous(names) => format!("one of: {}", names.join(", ")),
    }
}

fn list_names<S: Scope>(resolver: &Resolver<S>, category: Option<&str>) -> Result<(), String> {
    let category = category
        .map(|c| c.parse::<SuggestionCategory>())
        .transpose()?;
    let catalog = resolver.initial_suggestions();

    for (name, tags) in catalog.iter() {
        match category {
            Some(wanted) if !tags.contains(&wanted) => {}
            _ => {
                let tags: Vec<&str> = tags.iter().map(|t| t.tag()).collect();
                println!("{:<32} {}", name, tags.join(", "));
            }
        }
    }
    Ok(())
}

/// Handle a `:`-prefixed console command. Returns `false` when `line` is
/// not a command (a symbol literal such as `:foo` is evaluated instead).
fn run_command<S: Scope>(resolver: &Resolver<S>, line: &str) -> bool {
    let (command, arg) = match line.split_once(char::is_whitespace) {
        Some((command, arg)) => (command, Some(arg.trim()).filter(|a| !a.is_empty())),
        None => (line, None),
    };

    match command {
        ":doc" => match arg.and_then(|fragment| resolver.doc_target(fragment)) {
            Some(target) => println!("{}", format_doc_target(&target)),
            None => println!("No documentation target"),
        },
        ":names" => {
            if let Err(e) = list_names(resolver, arg) {
                eprintln!("Error: {}", e);
            }
        }
        ":help" => print_console_help(),
        _ => return false,
    }
    true
}

fn run_console(config: &ConsoleConfig, scope: RegistryScope) -> Result<(), String> {
    let editor_config = Config::builder()
        .max_history_size(config.console.history_size)
        .map_err(|e| format!("Invalid history size: {}", e))?
        .auto_add_history(true)
        .build();

    let helper = ConsoleHelper::new(scope, config.completion_options())?;
    let mut editor: Editor<ConsoleHelper, DefaultHistory> =
        Editor::with_config(editor_config).map_err(|e| format!("Failed to start console: {}", e))?;
    editor.set_helper(Some(helper));

    let history_path = config.history_path();
    if let Some(path) = &history_path {
        if let Err(e) = editor.load_history(path) {
            debug!(target: "mee::repl", path = %path.display(), error = %e, "No history loaded");
        }
    }

    println!("mee v{}", VERSION);
    println!("Type :help for commands, 'exit' or 'quit' to leave.\n");

    loop {
        match editor.readline(&config.console.prompt) {
            Ok(line) => {
                let input = line.trim();
                if input == "exit" || input == "quit" {
                    break;
                }
                if input.is_empty() {
                    continue;
                }

                let Some(helper) = editor.helper_mut() else {
                    break;
                };
                helper.add_to_history(input.to_string());

                let resolver = helper.resolver();
                if input.starts_with(':') && run_command(resolver, input) {
                    continue;
                }
                match resolver.evaluate_inspect(input) {
                    Ok(output) => println!("=> {}", output),
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(format!("Console error: {}", e)),
        }
    }

    if let Some(path) = &history_path {
        if let Err(e) = editor.save_history(path) {
            warn!(target: "mee::repl", path = %path.display(), error = %e, "Failed to save history");
        }
    }
    Ok(())
}

fn main() {
    let options = match parse_args() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    let config = ConsoleConfig::load(options.config.as_deref());
    let level = options.log_level.clone().or_else(|| {
        config
            .as_ref()
            .ok()
            .and_then(|c| c.logging.level.clone())
    });
    init_logger(level.as_deref());

    let config = config.unwrap_or_else(|e| {
        warn!(target: "mee::repl", error = %e, "Using default configuration");
        ConsoleConfig::default()
    });
    let scope = build_scope(&config);

    if options.eval.is_some() || options.complete.is_some() {
        let resolver = match Resolver::with_options(scope, config.completion_options()) {
            Ok(resolver) => resolver,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        };

        if let Some(expr) = &options.eval {
            match resolver.evaluate(expr) {
                Ok(output) => println!("{}", output),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    process::exit(1);
                }
            }
        }
        if let Some(fragment) = &options.complete {
            for completion in resolver.complete(fragment) {
                println!("{}", completion);
            }
        }
        return;
    }

    if let Err(e) = run_console(&config, scope) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
