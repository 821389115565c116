//! `phpdoc-reflect`: dump the documentation tags of PHP declarations with
//! their resolved types.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use phpdoc_reflect::source::Workspace;
use phpdoc_reflect::{Config, Declaration, Reflector, TagCollection};

#[derive(Parser)]
#[command(name = "phpdoc-reflect")]
#[command(about = "Extract PHPDoc tags and resolve their types")]
#[command(version)]
struct Cli {
    /// PHP files to inspect
    #[arg(value_name = "FILES", required = true)]
    files: Vec<PathBuf>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log filter (overrides the configured level; `RUST_LOG` wins over both)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

/// One dumped declaration.
#[derive(Serialize)]
struct Entry {
    construct: String,
    tags: TagCollection,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(cli.log_level.as_deref().unwrap_or(config.log_level.as_str()));

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut workspace = Workspace::new();
    for path in &cli.files {
        workspace.add_file(path)?;
    }
    let workspace = Arc::new(workspace);
    let reflector =
        Reflector::from_config(config, workspace.class_index())?.with_provider(workspace.clone());

    let mut entries = Vec::new();
    for file in workspace.files() {
        for class in &file.classes {
            push_entry(&reflector, class.declaration(), &mut entries)?;
            for method in &class.methods {
                push_entry(&reflector, class.method_declaration(method), &mut entries)?;
            }
            for property in &class.properties {
                push_entry(&reflector, class.property_declaration(property), &mut entries)?;
            }
        }
        for function in &file.functions {
            push_entry(&reflector, function.declaration(&file.path), &mut entries)?;
        }
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for entry in &entries {
            print_entry(entry);
        }
    }
    Ok(())
}

fn push_entry(
    reflector: &Reflector,
    decl: Declaration,
    entries: &mut Vec<Entry>,
) -> Result<(), phpdoc_reflect::TypeError> {
    if decl.doc_comment.is_none() {
        return Ok(());
    }
    let comment = reflector.comment(&decl)?;
    entries.push(Entry {
        construct: decl.construct.unwrap_or(decl.scope_id),
        tags: comment.into_tags(),
    });
    Ok(())
}

fn print_entry(entry: &Entry) {
    println!("{}", entry.construct);
    for line in entry.tags.to_string().lines() {
        println!("  {}", line);
    }
}
