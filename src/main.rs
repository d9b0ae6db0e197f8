// cwalk: tree-walking interpreter for a small subset of C

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use crossterm::style::Stylize;
use crossterm::tty::IsTty;
use tracing_subscriber::EnvFilter;

use cwalk::config::InterpreterConfig;
use cwalk::console::Console;
use cwalk::interpreter::constants::{DEFAULT_HEAP_LIMIT, DEFAULT_MAX_CALL_DEPTH};
use cwalk::{interpret, Error};

#[derive(Debug, Parser)]
#[command(name = "cwalk", version, about = "Run a C program by walking its syntax tree")]
struct Cli {
    /// C source file to run
    file: PathBuf,

    /// Maximum bytes of live heap memory
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_HEAP_LIMIT)]
    heap_limit: usize,

    /// Maximum call depth
    #[arg(long = "max-depth", value_name = "N", default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_depth: usize,

    /// Do not print a prompt before reading input
    #[arg(long)]
    no_prompt: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn config(&self) -> InterpreterConfig {
        let config = InterpreterConfig::default()
            .with_heap_limit(self.heap_limit)
            .with_max_call_depth(self.max_depth);
        if self.no_prompt {
            config.without_prompt()
        } else {
            config
        }
    }
}

/// Logs go to stderr so program output on stdout stays clean
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = if verbose > 0 {
        EnvFilter::new(default_level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn report(err: &Error) {
    let label = if io::stderr().is_tty() {
        "error:".red().bold().to_string()
    } else {
        "error:".to_string()
    };
    eprintln!("{} {}", label, err);

    if let Error::Runtime { backtrace, .. } = err {
        for frame in backtrace {
            eprintln!("  at {}", frame);
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let source = match fs::read_to_string(&cli.file) {
        Ok(source) => source,
        Err(err) => {
            report(&Error::from(err));
            return ExitCode::FAILURE;
        }
    };

    match interpret(&source, cli.config(), Console::stdio()) {
        Ok(value) => {
            tracing::debug!(value, "main returned");
            ExitCode::SUCCESS
        }
        Err(err) => {
            report(&err);
            ExitCode::from(err.exit_code())
        }
    }
}
