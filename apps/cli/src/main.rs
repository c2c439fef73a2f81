use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use wasmjs_cli::{commands, logging};

#[derive(Parser, Debug)]
#[clap(name = "wasmjs-gen")]
#[clap(about = "Generate WASM host wrappers and TypeScript clients from service schemas")]
#[clap(version)]
struct Cli {
    /// Log level when RUST_LOG is not set
    #[clap(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON lines
    #[clap(long, global = true)]
    json_logs: bool,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read a framed request from stdin and write a framed response to stdout (default)
    Plugin,

    /// Generate files from a JSON request into a directory
    Generate {
        /// Path to a JSON generation request
        #[clap(short, long)]
        request: PathBuf,

        /// Output directory
        #[clap(short, long)]
        out: PathBuf,

        /// Override the request's parameter string
        #[clap(short, long)]
        parameter: Option<String>,
    },

    /// Print the file plans for a JSON request
    Plan {
        /// Path to a JSON generation request
        #[clap(short, long)]
        request: PathBuf,

        /// Override the request's parameter string
        #[clap(short, long)]
        parameter: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(&cli.log_level, cli.json_logs) {
        eprintln!("wasmjs-gen: failed to initialize logging: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(cli.command.unwrap_or(Command::Plugin)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Generation failed");
            eprintln!("wasmjs-gen: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Plugin => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            let files = commands::run_plugin(&mut stdin.lock(), &mut stdout.lock())?;
            tracing::info!(files, "Plugin response written");
        }
        Command::Generate {
            request,
            out,
            parameter,
        } => {
            let request = commands::load_request(&request, parameter.as_deref())?;
            commands::generate_to_dir(&request, &out)?;
        }
        Command::Plan { request, parameter } => {
            let request = commands::load_request(&request, parameter.as_deref())?;
            let json = commands::plan_json(&request)?;
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    Ok(())
}
