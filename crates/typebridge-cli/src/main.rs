use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};

mod commands;
mod config;
mod error;
mod io;

use commands::{handle_generate, GenerateOptions};

#[derive(Parser, Debug)]
#[command(name = "typebridge")]
#[command(about = "Generate native bindings from a type-checked interface description", long_about = None)]
struct Args {
    /// Source files whose modules are bound, as named in the program
    #[arg(value_name = "FILES", required = true)]
    files: Vec<String>,

    /// JSON dump of the checked program
    #[arg(long, value_name = "PATH")]
    program: Option<PathBuf>,

    /// Config file (defaults to typebridge.toml when present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Write the symbol walk trace to stderr
    #[arg(long)]
    trace: bool,

    /// Replace symbols that cannot be bound with a comment instead of failing
    #[arg(long)]
    keep_going: bool,

    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .format_timestamp(None)
        .init();

    let options = GenerateOptions {
        files: args.files,
        program: args.program,
        config: args.config,
        output: args.output,
        trace: args.trace,
        keep_going: args.keep_going,
    };

    match handle_generate(options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            ExitCode::FAILURE
        }
    }
}
