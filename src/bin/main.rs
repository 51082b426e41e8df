//! MOSDEX CLI - Resolve and translate query-defined tables
//!
//! Usage:
//!   mosdex [--config <file>] order <file.json>
//!   mosdex deps <file.json> [--dot]
//!   mosdex sql <file.json> --table <name>
//!   mosdex schema <file.json> --table <name>
//!   mosdex plan <file.json>
//!   mosdex check <file.json>
//!
//! Examples:
//!   mosdex order shipping.json
//!   mosdex deps shipping.json --dot | dot -Tsvg > deps.svg
//!   mosdex sql shipping.json --table flow

use clap::{Parser, Subcommand};
use mosdex::config::Settings;
use mosdex::engine;
use mosdex::model::{load_file, Document};
use mosdex::sql::translate_with;
use mosdex::{Limits, MosdexError, MosdexResult, TableResolver};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mosdex")]
#[command(about = "MOSDEX - Dependency ordering and SQL translation for MOSDEX tables")]
#[command(version)]
struct Cli {
    /// Path to a settings file (defaults to MOSDEX_CONFIG, ./mosdex.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the execution order of the document's tables
    Order {
        /// Path to the MOSDEX document
        file: PathBuf,
    },

    /// Print the tables each query depends on
    Deps {
        /// Path to the MOSDEX document
        file: PathBuf,

        /// Emit the dependency graph in Graphviz DOT format
        #[arg(long)]
        dot: bool,
    },

    /// Translate one table's query to SQL
    Sql {
        /// Path to the MOSDEX document
        file: PathBuf,

        /// Name of the table to translate
        #[arg(short, long)]
        table: String,
    },

    /// Print the schema of one table
    Schema {
        /// Path to the MOSDEX document
        file: PathBuf,

        /// Name of the table
        #[arg(short, long)]
        table: String,
    },

    /// Translate every query table in execution order
    Plan {
        /// Path to the MOSDEX document
        file: PathBuf,
    },

    /// Load and resolve a document, reporting any cycles
    Check {
        /// Path to the MOSDEX document
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let limits = settings.limits();
    let result = match cli.command {
        Commands::Order { file } => cmd_order(file, &limits),
        Commands::Deps { file, dot } => cmd_deps(file, dot, &limits),
        Commands::Sql { file, table } => cmd_sql(file, &table, &limits),
        Commands::Schema { file, table } => cmd_schema(file, &table),
        Commands::Plan { file } => cmd_plan(file, &limits),
        Commands::Check { file } => cmd_check(file, &limits),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load(file: &Path) -> MosdexResult<Document> {
    load_file(file).map_err(|e| match e {
        MosdexError::Io(io) => MosdexError::Io(std::io::Error::new(
            io.kind(),
            format!("reading '{}': {}", file.display(), io),
        )),
        other => other,
    })
}

fn cmd_order(file: PathBuf, limits: &Limits) -> MosdexResult<()> {
    let document = load(&file)?;
    for name in engine::resolution_order(&document.tables, limits)? {
        println!("{}", name);
    }
    Ok(())
}

fn cmd_deps(file: PathBuf, dot: bool, limits: &Limits) -> MosdexResult<()> {
    let document = load(&file)?;
    let mut resolver = TableResolver::new(document.tables.tables())?.with_limits(*limits);
    resolver.find_dependencies()?;

    if dot {
        print!("{}", resolver.dependency_graph().to_dot());
        return Ok(());
    }

    for (table, deps) in resolver.table_dependencies() {
        let deps: Vec<&str> = deps.iter().map(String::as_str).collect();
        println!("{}: {}", table, deps.join(", "));
    }
    Ok(())
}

fn cmd_sql(file: PathBuf, table: &str, limits: &Limits) -> MosdexResult<()> {
    let document = load(&file)?;
    let query = document
        .tables
        .require(table)?
        .query()
        .ok_or_else(|| MosdexError::format(format!("table '{}' has no QUERY", table)))?;

    println!("{}", translate_with(query, limits)?);
    Ok(())
}

fn cmd_schema(file: PathBuf, table: &str) -> MosdexResult<()> {
    let document = load(&file)?;
    let schema = document
        .tables
        .require(table)?
        .schema()
        .ok_or_else(|| MosdexError::format(format!("table '{}' has no SCHEMA", table)))?;

    for (name, field_type) in schema.fields() {
        println!("{}: {}", name, field_type);
    }
    Ok(())
}

fn cmd_plan(file: PathBuf, limits: &Limits) -> MosdexResult<()> {
    let document = load(&file)?;
    for statement in engine::plan(&document.tables, limits)? {
        println!("-- {} [{}]", statement.table, statement.schema);
        println!("{}", statement.sql);
        println!();
    }
    Ok(())
}

fn cmd_check(file: PathBuf, limits: &Limits) -> MosdexResult<()> {
    let document = load(&file)?;
    let mut resolver = TableResolver::new(document.tables.tables())?.with_limits(*limits);
    resolver.find_dependencies()?;

    let cycles = resolver.dependency_graph().cycles();
    if !cycles.is_empty() {
        eprintln!("Dependency cycles:");
        for cycle in &cycles {
            eprintln!("  - {}", cycle.join(", "));
        }
    }
    resolver.resolve_dependencies()?;

    println!(
        "OK: {} is valid ({} tables)",
        file.display(),
        document.tables.len()
    );
    Ok(())
}
