use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, LevelFilter};

use rum::error::RumError;
use rum::{image, Vm};

/// Run a Universal Machine (UM-32) program image.
#[derive(Parser, Debug)]
#[command(name = "rum", version, about)]
struct Args {
    /// Path to the program image (a stream of big-endian 32-bit words).
    program: PathBuf,

    /// Increase log verbosity (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease log verbosity (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count)]
    quiet: u8,
}

fn log_level(verbose: u8, quiet: u8) -> LevelFilter {
    const LEVELS: [LevelFilter; 6] = [
        LevelFilter::Off,
        LevelFilter::Error,
        LevelFilter::Warn,
        LevelFilter::Info,
        LevelFilter::Debug,
        LevelFilter::Trace,
    ];
    let base = 2_i8; // LevelFilter::Warn
    let index = (base + verbose as i8 - quiet as i8).clamp(0, 5);
    LEVELS[index as usize]
}

fn run(args: Args) -> Result<(), RumError> {
    let program = image::load(&args.program)?;
    let mut vm = Vm::new(program);
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut input = stdin.lock();
    let mut output = BufWriter::new(stdout.lock());
    vm.run(&mut input, &mut output)
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::new().filter_level(log_level(args.verbose, args.quiet)).init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
