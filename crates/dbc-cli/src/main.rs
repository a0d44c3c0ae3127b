//! Contract checker CLI.
//!
//! Provides the `dbc` binary. `check` validates the contract blocks of a
//! JSON program description; `contracts` lists the recognized contracts
//! without validating them.
//!
//! Exit codes: 0 = clean, 1 = diagnostics with errors, 2 = invalid input,
//! 3 = I/O error.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};

use dbc_check::{
    contracts_of_function, function_by_name, invariants_of_type, validate_function, CheckError,
    CheckOptions, ContractStatement, Diagnostic, Severity,
};
use dbc_core::surface::ProgramSource;
use dbc_core::{CoreError, FunctionId, Program, SemanticModel};

/// Code Contracts checker.
#[derive(Parser)]
#[command(name = "dbc", about = "Recognize and validate contract blocks")]
struct Cli {
    /// Log more (-v debug, -vv trace). Overrides DBC_LOG.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate contract blocks.
    Check {
        /// Program description (JSON).
        program: PathBuf,

        /// Options file (JSON); omitted fields keep their defaults.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format (default: DBC_FORMAT, then text).
        #[arg(long, value_enum)]
        format: Option<Format>,

        /// Only validate this function (`Name`, `Type.Name` or full name).
        #[arg(long)]
        function: Option<String>,
    },
    /// List recognized contracts.
    Contracts {
        /// Program description (JSON).
        program: PathBuf,

        /// Only list contracts of this function.
        #[arg(long, conflicts_with = "type_name")]
        function: Option<String>,

        /// List the invariants of this type.
        #[arg(long = "type")]
        type_name: Option<String>,

        /// Output format (default: DBC_FORMAT, then text).
        #[arg(long, value_enum)]
        format: Option<Format>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid program description '{}': {reason}", path.display())]
    InvalidProgram { path: PathBuf, reason: String },

    #[error("invalid DBC_FORMAT value '{value}', expected text or json")]
    InvalidFormat { value: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Check(#[from] CheckError),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Io { .. } => 3,
            _ => 2,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check {
            program,
            config,
            format,
            function,
        } => run_check(&program, config.as_deref(), format, function.as_deref()),
        Commands::Contracts {
            program,
            function,
            type_name,
            format,
        } => run_contracts(&program, function.as_deref(), type_name.as_deref(), format),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

/// Logs go to stderr so that JSON output on stdout stays parseable.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => std::env::var("DBC_LOG")
            .ok()
            .and_then(|value| value.parse::<LevelFilter>().ok())
            .unwrap_or(LevelFilter::WARN),
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_format(flag: Option<Format>) -> Result<Format, CliError> {
    if let Some(format) = flag {
        return Ok(format);
    }
    match std::env::var("DBC_FORMAT") {
        Ok(value) => parse_format(&value),
        Err(_) => Ok(Format::Text),
    }
}

fn parse_format(value: &str) -> Result<Format, CliError> {
    <Format as ValueEnum>::from_str(value.trim(), true).map_err(|_| CliError::InvalidFormat {
        value: value.to_string(),
    })
}

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn load_program(path: &Path) -> Result<Program, CliError> {
    let text = read_file(path)?;
    let source: ProgramSource =
        serde_json::from_str(&text).map_err(|e| CliError::InvalidProgram {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    let program = source.into_program()?;
    info!(
        path = %path.display(),
        functions = program.function_ids().len(),
        "loaded program"
    );
    Ok(program)
}

fn selected_functions(program: &Program, name: Option<&str>) -> Result<Vec<FunctionId>, CliError> {
    match name {
        Some(name) => Ok(vec![function_by_name(program, name)?]),
        None => Ok(program.function_ids()),
    }
}

fn qualified_name(program: &Program, id: FunctionId) -> String {
    program
        .function(id)
        .map(|f| f.qualified_name())
        .unwrap_or_else(|| format!("FunctionId({})", id.0))
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct CheckReport<'a> {
    errors: usize,
    warnings: usize,
    advisories: usize,
    diagnostics: Vec<ReportedDiagnostic<'a>>,
}

#[derive(Serialize)]
struct ReportedDiagnostic<'a> {
    function_name: String,
    severity: Severity,
    code: &'static str,
    message: String,
    statement: String,
    #[serde(flatten)]
    diagnostic: &'a Diagnostic,
}

fn run_check(
    program_path: &Path,
    config: Option<&Path>,
    format: Option<Format>,
    function: Option<&str>,
) -> Result<i32, CliError> {
    let format = resolve_format(format)?;
    let options = match config {
        Some(path) => CheckOptions::from_json(&read_file(path)?)?,
        None => CheckOptions::default(),
    };
    debug!(?options, "check options");

    let program = load_program(program_path)?;
    let mut diagnostics = Vec::new();
    for id in selected_functions(&program, function)? {
        diagnostics.extend(validate_function(&program, id, &options)?);
    }

    let count = |severity: Severity| diagnostics.iter().filter(|d| d.severity() == severity).count();
    let errors = count(Severity::Error);
    let warnings = count(Severity::Warning);
    let advisories = count(Severity::Advisory);
    info!(errors, warnings, advisories, "check finished");

    match format {
        Format::Text => {
            for diagnostic in &diagnostics {
                println!(
                    "{}: {}\n    {}",
                    qualified_name(&program, diagnostic.function),
                    diagnostic,
                    program.tree().render(diagnostic.statement.node)
                );
            }
            println!(
                "{} error(s), {} warning(s), {} advisory note(s)",
                errors, warnings, advisories
            );
        }
        Format::Json => {
            let report = CheckReport {
                errors,
                warnings,
                advisories,
                diagnostics: diagnostics
                    .iter()
                    .map(|d| ReportedDiagnostic {
                        function_name: qualified_name(&program, d.function),
                        severity: d.severity(),
                        code: d.result.code().unwrap_or_default(),
                        message: d.result.message(),
                        statement: program.tree().render(d.statement.node),
                        diagnostic: d,
                    })
                    .collect(),
            };
            print_json(&report);
        }
    }

    Ok(if errors > 0 { 1 } else { 0 })
}

// ---------------------------------------------------------------------------
// contracts
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ListedContract {
    function: String,
    label: String,
    source: String,
    contract: ContractStatement,
}

fn run_contracts(
    program_path: &Path,
    function: Option<&str>,
    type_name: Option<&str>,
    format: Option<Format>,
) -> Result<i32, CliError> {
    let format = resolve_format(format)?;
    let program = load_program(program_path)?;

    let mut listed = Vec::new();
    let mut push = |function: String, contract: ContractStatement| {
        listed.push(ListedContract {
            function,
            label: contract.label(),
            source: program.tree().render(contract.statement),
            contract,
        });
    };
    match type_name {
        Some(type_name) => {
            for contract in invariants_of_type(&program, type_name)? {
                let owner = program
                    .enclosing_function(contract.statement)
                    .map(|id| qualified_name(&program, id))
                    .unwrap_or_else(|| type_name.to_string());
                push(owner, contract);
            }
        }
        None => {
            for id in selected_functions(&program, function)? {
                let name = qualified_name(&program, id);
                for contract in contracts_of_function(&program, id)? {
                    push(name.clone(), contract);
                }
            }
        }
    }
    info!(contracts = listed.len(), "listed contracts");

    match format {
        Format::Text => {
            for item in &listed {
                println!("{}: {}\n    {}", item.function, item.label, item.source);
            }
        }
        Format::Json => print_json(&listed),
    }
    Ok(0)
}

fn print_json<T: Serialize>(value: &T) {
    let json = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize output: {}\"}}", e));
    println!("{}", json);
}
