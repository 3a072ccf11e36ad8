//! Binary entry point for the testsmith CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Generate feature methods and print the merged test class
//! testsmith generate --snapshot classes.json --class com.example.Calculator --method "add(int, int)"
//!
//! # Merge into an existing test class and keep the result
//! testsmith generate --snapshot classes.json --class com.example.Calculator \
//!     --method add --target CalculatorTest.json --out CalculatorTest.json --format json
//!
//! # Dump the extracted model
//! testsmith inspect --snapshot classes.json --class com.example.Calculator
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use testsmith::cli::{load_config, run_generate, run_inspect, TargetPaths};
use testsmith_core::error::{OutputErrorCode, TestsmithError};
use testsmith_core::output::{emit_response, ErrorResponse};

// ============================================================================
// CLI Structure
// ============================================================================

/// Spock specification generator.
///
/// Reads a class snapshot, extracts its semantic model and generates
/// parameterized feature methods for the selected methods.
#[derive(Parser, Debug)]
#[command(name = "testsmith", version, about = "Spock specification generator")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Configuration file (default: .testsmith/config.toml under --project).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Project root to look up .testsmith/config.toml in.
    #[arg(long, global = true)]
    project: Option<PathBuf>,

    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,
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

/// Output format for the generate command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum GenerateFormat {
    /// Groovy source of the merged test class (default).
    #[default]
    Source,
    /// Full JSON response.
    Json,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Generate feature methods for selected methods of a class.
    Generate {
        /// Class snapshot (JSON).
        #[arg(long)]
        snapshot: PathBuf,
        /// Qualified name of the class under test.
        #[arg(long)]
        class: String,
        /// Method to test; repeatable. `name(params)` display strings are accepted.
        #[arg(long = "method", required = true)]
        methods: Vec<String>,
        /// Existing test class to merge into (JSON).
        #[arg(long)]
        target: Option<PathBuf>,
        /// Write the merged test class here (JSON).
        #[arg(long)]
        out: Option<PathBuf>,
        /// Output format.
        #[arg(long, value_enum, default_value = "source")]
        format: GenerateFormat,
    },
    /// Print the extracted model of a class.
    Inspect {
        /// Class snapshot (JSON).
        #[arg(long)]
        snapshot: PathBuf,
        /// Qualified name of the class.
        #[arg(long)]
        class: String,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);

            // Errors go to stdout as JSON, like every other response.
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), TestsmithError> {
    let config = load_config(cli.global.config.as_deref(), cli.global.project.as_deref())?;
    match cli.command {
        Command::Generate {
            snapshot,
            class,
            methods,
            target,
            out,
            format,
        } => {
            let paths = TargetPaths {
                existing: target.as_deref(),
                output: out.as_deref(),
            };
            let response = run_generate(&snapshot, &class, &methods, paths, &config)?;
            match format {
                GenerateFormat::Json => emit(&response),
                GenerateFormat::Source => {
                    let mut stdout = io::stdout();
                    write!(stdout, "{}", response.source.as_deref().unwrap_or_default())
                        .map_err(|e| TestsmithError::internal(e.to_string()))?;
                    let _ = stdout.flush();
                    Ok(())
                }
            }
        }
        Command::Inspect { snapshot, class } => {
            let response = run_inspect(&snapshot, &class, &config)?;
            emit(&response)
        }
    }
}

fn emit<T: serde::Serialize>(response: &T) -> Result<(), TestsmithError> {
    emit_response(response, &mut io::stdout()).map_err(|e| TestsmithError::internal(e.to_string()))?;
    let _ = io::stdout().flush();
    Ok(())
}
