use std::io;
use std::path::PathBuf;
use std::process;

use tree_lox as lox;

use clap::Parser as ClapParser;

use lox::lox::{Lox, EX_USAGE};

/// Tree-walking interpreter for the Lox language.
///
/// With a script path, runs the script; without one, starts an interactive
/// prompt.
#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a Lox script.
    script: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Cli = Cli::try_parse().unwrap_or_else(|error| {
        // Pass --help/--version output through; anything else (extra
        // arguments, unknown flags) is a usage error.
        if error.kind() == clap::error::ErrorKind::DisplayHelp
            || error.kind() == clap::error::ErrorKind::DisplayVersion
        {
            let _ = error.print();
            process::exit(0);
        }

        let _ = error.print();
        process::exit(EX_USAGE);
    });

    let mut stdout: io::Stdout = io::stdout();
    let mut lox: Lox = Lox::with_stdout(&mut stdout);

    let code: i32 = match args.script {
        Some(path) => lox.run_file(&path),

        None => lox.run_prompt(),
    };

    process::exit(code);
}
