//! Command-line interface for semdom
//! This binary runs markup documents through declarative processing stacks.
//!
//! Usage:
//!   semdom process `<path>` --stack `<stack.yaml>` [--variant `<name>`] [--tag k=v] [--output markup|json]
//!   semdom list-plugins                            - List registered analyzers and processors

use clap::{Arg, ArgAction, Command};

use semdom::semdom::engine::DomProcessor;
use semdom::semdom::stack::StackConfig;
use semdom::semdom::tags;
use serde_json::Value;

fn main() {
    let matches = Command::new("semdom")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for processing markup through semantic analyzer/processor stacks")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("process")
                .about("Process a markup file through a stack")
                .arg(
                    Arg::new("path")
                        .help("Path to the markup file (use '-' for stdin)")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("stack")
                        .long("stack")
                        .short('s')
                        .help("Path to a YAML stack configuration")
                        .required(true),
                )
                .arg(
                    Arg::new("variant")
                        .long("variant")
                        .help("Processor variant to run")
                        .default_value("default"),
                )
                .arg(
                    Arg::new("tag")
                        .long("tag")
                        .short('t')
                        .help("Seed tag for the root context, as key=value (repeatable)")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output format: 'markup' (processed document) or 'json' (full result)")
                        .default_value("markup"),
                ),
        )
        .subcommand(Command::new("list-plugins").about("List registered analyzers and processors"))
        .get_matches();

    match matches.subcommand() {
        Some(("process", process_matches)) => {
            let path = process_matches.get_one::<String>("path").unwrap();
            let stack = process_matches.get_one::<String>("stack").unwrap();
            let variant = process_matches.get_one::<String>("variant").unwrap();
            let output = process_matches.get_one::<String>("output").unwrap();
            let seed_tags: Vec<&String> = process_matches
                .get_many::<String>("tag")
                .map(|values| values.collect())
                .unwrap_or_default();
            handle_process_command(path, stack, variant, &seed_tags, output);
        }
        Some(("list-plugins", _)) => {
            handle_list_plugins_command();
        }
        _ => unreachable!(),
    }
}

/// Handle the process command
fn handle_process_command(
    path: &str,
    stack_path: &str,
    variant: &str,
    seed_tags: &[&String],
    output: &str,
) {
    let markup = read_input(path).unwrap_or_else(|e| {
        eprintln!("Error reading input: {}", e);
        std::process::exit(1);
    });

    let stack_yaml = std::fs::read_to_string(stack_path).unwrap_or_else(|e| {
        eprintln!("Error reading stack file: {}", e);
        std::process::exit(1);
    });
    let stack: StackConfig = serde_yaml::from_str(&stack_yaml).unwrap_or_else(|e| {
        eprintln!("Error parsing stack file: {}", e);
        std::process::exit(1);
    });

    let seed = parse_seed_tags(seed_tags).unwrap_or_else(|tag| {
        eprintln!("Invalid --tag '{}': expected key=value", tag);
        std::process::exit(1);
    });

    let engine = DomProcessor::new();
    let result = engine
        .process(&markup, &stack, variant, seed)
        .unwrap_or_else(|e| {
            eprintln!("Processing error: {}", e);
            std::process::exit(1);
        });

    match output {
        "json" => {
            let rendered = serde_json::to_string_pretty(result.to_mapping())
                .expect("result mapping serializes");
            println!("{}", rendered);
        }
        _ => {
            let markup = result
                .get("markup")
                .and_then(Value::as_str)
                .unwrap_or_default();
            print!("{}", markup);
        }
    }
}

/// Handle the list-plugins command
fn handle_list_plugins_command() {
    let engine = DomProcessor::new();
    println!("Analyzers:");
    for id in engine.registry().analyzer_ids() {
        println!("  {}", id);
    }
    println!("\nProcessors:");
    for id in engine.registry().processor_ids() {
        println!("  {}", id);
    }
}

fn read_input(path: &str) -> std::io::Result<String> {
    if path == "-" {
        let mut buffer = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer)?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(path)
    }
}

/// Parse repeated `key=value` arguments into a seed mapping. Dotted keys
/// are set as literal top-level keys.
fn parse_seed_tags<'a>(pairs: &[&'a String]) -> Result<Value, &'a String> {
    let mut seed = tags::empty();
    for pair in pairs {
        let (key, value) = pair.split_once('=').ok_or(*pair)?;
        if key.is_empty() {
            return Err(*pair);
        }
        tags::set(&mut seed, key, Value::String(value.to_string()));
    }
    Ok(seed)
}
