//! Binary entry point for the declscan CLI.
//!
//! ## Usage
//!
//! ```bash
//! # List packages of the module rooted at the current directory
//! declscan packages
//!
//! # Look up a method, by package name or import path
//! declscan --root ~/src/app method store Cache Get
//!
//! # Parse a type expression
//! declscan type 'map[string][]*pkg.Item'
//! ```
//!
//! Every command prints one JSON response to stdout. Logs go to stderr.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use declscan::cli::{
    open_project, run_dump, run_function, run_interface, run_member, run_method, run_packages,
    run_struct, run_type,
};
use declscan_core::error::{DeclscanError, OutputErrorCode};
use declscan_core::output::{emit_response, ErrorResponse, OkResponse};
use declscan_go::model::Project;

// ============================================================================
// CLI Structure
// ============================================================================

/// Scan Go sources for declarations.
///
/// Output is JSON on stdout; the exit code reflects the error category.
#[derive(Parser, Debug)]
#[command(name = "declscan", version, about = "Scan Go sources for declarations")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Module root directory (default: current directory).
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Log line format on stderr.
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,

    /// Only scan sources matching this glob (repeatable).
    #[arg(long, global = true)]
    include: Vec<String>,

    /// Skip sources matching this glob (repeatable).
    #[arg(long, global = true)]
    exclude: Vec<String>,

    /// Include `_test.go` files.
    #[arg(long, global = true)]
    tests: bool,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Log line format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    /// One JSON object per event.
    Json,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// List packages of the module.
    Packages,
    /// Show a struct with its members and methods.
    Struct {
        /// Import path, relative directory or package name.
        package: String,
        name: String,
    },
    /// Show an interface.
    Interface { package: String, name: String },
    /// Show a free function.
    Function { package: String, name: String },
    /// Show a method of a struct.
    Method {
        package: String,
        #[arg(value_name = "TYPE")]
        type_name: String,
        name: String,
    },
    /// Show one member of a struct.
    Member {
        package: String,
        #[arg(value_name = "STRUCT")]
        struct_name: String,
        name: String,
    },
    /// Parse a type expression.
    Type {
        /// Type text, e.g. `map[string][]int`.
        text: String,
    },
    /// Resolve every declaration of a package and dump it.
    Dump { package: String },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Packages => "packages",
            Command::Struct { .. } => "struct",
            Command::Interface { .. } => "interface",
            Command::Function { .. } => "function",
            Command::Method { .. } => "method",
            Command::Member { .. } => "member",
            Command::Type { .. } => "type",
            Command::Dump { .. } => "dump",
        }
    }
}

// ============================================================================
// Main
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level, cli.global.log_format);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);

            // Errors go to stdout as JSON, like successes
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel, format: LogFormat) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), DeclscanError> {
    let command = cli.command.name();
    match cli.command {
        Command::Type { text } => emit(command, run_type(&text)?),
        Command::Packages => emit(command, run_packages(&load(&cli.global)?)),
        Command::Struct { package, name } => {
            emit(command, run_struct(&load(&cli.global)?, &package, &name)?)
        }
        Command::Interface { package, name } => {
            emit(command, run_interface(&load(&cli.global)?, &package, &name)?)
        }
        Command::Function { package, name } => {
            emit(command, run_function(&load(&cli.global)?, &package, &name)?)
        }
        Command::Method {
            package,
            type_name,
            name,
        } => emit(
            command,
            run_method(&load(&cli.global)?, &package, &type_name, &name)?,
        ),
        Command::Member {
            package,
            struct_name,
            name,
        } => emit(
            command,
            run_member(&load(&cli.global)?, &package, &struct_name, &name)?,
        ),
        Command::Dump { package } => emit(command, run_dump(&load(&cli.global)?, &package)?),
    }
}

fn load(global: &GlobalArgs) -> Result<Project, DeclscanError> {
    let root = match &global.root {
        Some(root) => root.clone(),
        None => std::env::current_dir()
            .map_err(|e| DeclscanError::internal(format!("cannot read current directory: {e}")))?,
    };
    open_project(&root, &global.include, &global.exclude, global.tests)
}

fn emit<T: Serialize>(command: &str, payload: T) -> Result<(), DeclscanError> {
    let response = OkResponse::new(command, payload);
    emit_response(&response, &mut io::stdout())
        .map_err(|e| DeclscanError::internal(format!("failed to write output: {e}")))?;
    let _ = io::stdout().flush();
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod cli_parsing {
        use super::*;

        #[test]
        fn log_format_defaults_to_text() {
            let cli = Cli::try_parse_from(["declscan", "packages"]).unwrap();
            assert_eq!(cli.global.log_format, LogFormat::Text);
        }

        #[test]
        fn log_format_json_is_global() {
            let cli =
                Cli::try_parse_from(["declscan", "type", "[]int", "--log-format", "json"]).unwrap();
            assert_eq!(cli.global.log_format, LogFormat::Json);
            assert!(matches!(cli.command, Command::Type { ref text } if text == "[]int"));
        }

        #[test]
        fn unknown_log_format_is_rejected() {
            assert!(Cli::try_parse_from(["declscan", "--log-format", "xml", "packages"]).is_err());
        }
    }
}
