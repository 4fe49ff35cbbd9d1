//! CLI command definitions, routing, and tracing setup.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use serde_json::Value;
use tracing::info;

use tubesieve_compiler::compile_all;
use tubesieve_core::{FilterEngine, FilterScope};
use tubesieve_shared::{CompiledConfig, RawConfig, init_config, load_config, load_config_from};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// TubeSieve — remove unwanted items from content-listing payloads.
#[derive(Parser)]
#[command(
    name = "tubesieve",
    version,
    about = "Filter content-listing JSON payloads against declarative rules.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Filter a JSON payload and print the result.
    Filter {
        /// Payload file (reads stdin when omitted or `-`).
        input: Option<PathBuf>,

        /// Raw rules file (JSON or TOML). Defaults to ~/.tubesieve/rules.toml.
        #[arg(long, conflicts_with = "compiled", env = "TUBESIEVE_RULES")]
        rules: Option<PathBuf>,

        /// Pre-compiled config (output of `tubesieve compile`).
        #[arg(long)]
        compiled: Option<PathBuf>,

        /// Rule table to classify against: main, guide, comments, player, main+comments.
        #[arg(short, long, default_value = "main")]
        scope: FilterScope,

        /// Pretty-print the output.
        #[arg(long)]
        pretty: bool,
    },

    /// Compile a rules file and print the compiled config.
    Compile {
        /// Raw rules file (JSON or TOML). Defaults to ~/.tubesieve/rules.toml.
        #[arg(long, env = "TUBESIEVE_RULES")]
        rules: Option<PathBuf>,

        /// Pretty-print the output.
        #[arg(long)]
        pretty: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write an empty rules file to ~/.tubesieve/rules.toml.
    Init,
    /// Show the resolved raw rules.
    Show {
        /// Raw rules file (JSON or TOML).
        #[arg(long, env = "TUBESIEVE_RULES")]
        rules: Option<PathBuf>,
    },
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs always go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "tubesieve=info",
        1 => "tubesieve=debug",
        _ => "tubesieve=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Filter {
            input,
            rules,
            compiled,
            scope,
            pretty,
        } => cmd_filter(input.as_deref(), rules.as_deref(), compiled.as_deref(), scope, pretty),
        Command::Compile { rules, pretty } => cmd_compile(rules.as_deref(), pretty),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show { rules } => cmd_config_show(rules.as_deref()),
        },
    }
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

fn cmd_filter(
    input: Option<&Path>,
    rules: Option<&Path>,
    compiled: Option<&Path>,
    scope: FilterScope,
    pretty: bool,
) -> Result<()> {
    let config = match compiled {
        Some(path) => read_compiled(path)?,
        None => compile_all(&read_rules(rules)?),
    };
    let engine = FilterEngine::new(config);

    let payload = read_input(input)?;
    let mut doc: Value = serde_json::from_str(&payload).wrap_err("payload is not valid JSON")?;

    let report = engine.filter(&mut doc, scope);
    if report.nothing_to_filter {
        info!("no active filters, payload passed through");
    } else {
        info!(removed = report.removed, %scope, "payload filtered");
    }

    write_json(&doc, pretty)
}

fn cmd_compile(rules: Option<&Path>, pretty: bool) -> Result<()> {
    let raw = read_rules(rules)?;
    let compiled = compile_all(&raw);
    if !compiled.has_active_filters() {
        info!("compiled config has no active filters");
    }
    write_json(&compiled, pretty)
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Created rules file at {}", path.display());
    Ok(())
}

fn cmd_config_show(rules: Option<&Path>) -> Result<()> {
    let raw = read_rules(rules)?;
    write_json(&raw, true)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_rules(path: Option<&Path>) -> Result<RawConfig> {
    let raw = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(raw)
}

fn read_compiled(path: &Path) -> Result<CompiledConfig> {
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .map_err(|e| eyre!("{} is not a compiled config: {e}", path.display()))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display())),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .wrap_err("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn write_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let mut out = std::io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, value)?;
    } else {
        serde_json::to_writer(&mut out, value)?;
    }
    writeln!(out)?;
    Ok(())
}
