use std::error::Error;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use clap_stdin::FileOrStdin;
use tracing_subscriber::EnvFilter;

use pasmips::evaluator::EvaluatorConfig;
use pasmips::machine::MachineConfig;

#[derive(Parser)]
#[command(version, about = "Compile or interpret a small Pascal-like language")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile to MIPS assembly
    Compile {
        /// Source file, or `-` for stdin
        #[arg(default_value = "-")]
        input: FileOrStdin,
        /// Write the assembly here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run with the tree-walking interpreter
    Run {
        #[arg(default_value = "-")]
        input: FileOrStdin,
        /// Deepest allowed procedure call nesting
        #[arg(long, default_value_t = EvaluatorConfig::default().max_depth)]
        max_depth: usize,
    },
    /// Compile, then execute the assembly on the built-in simulator
    Simulate {
        #[arg(default_value = "-")]
        input: FileOrStdin,
        #[arg(long, default_value_t = MachineConfig::default().max_steps)]
        max_steps: usize,
    },
}

/// `RUST_LOG` overrides the default `warn` filter. Logs go to stderr so they
/// never mix with program output.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Command::Compile { input, output } => {
            let assembly = pasmips::compile(&input.contents()?)?;
            // Rendered in full before anything is written, so a failed
            // compilation never leaves a partial file behind.
            match output {
                Some(path) => fs::write(path, assembly.to_string())?,
                None => print!("{assembly}"),
            }
        }
        Command::Run { input, max_depth } => {
            let stdout = io::stdout();
            pasmips::interpret_with(
                &input.contents()?,
                &mut stdout.lock(),
                EvaluatorConfig { max_depth },
            )?;
        }
        Command::Simulate { input, max_steps } => {
            let assembly = pasmips::compile(&input.contents()?)?;
            let output = pasmips::simulate(&assembly, MachineConfig { max_steps })?;
            print!("{output}");
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    init_logging();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
