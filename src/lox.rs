//! Process-facing driver: wires the scanner, parser, resolver, and
//! interpreter together, reports diagnostics to the output sink, and tracks
//! the error flags that become the process exit status.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use log::info;

use crate::ast::Stmt;
use crate::error::LoxError;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;
use crate::token::Token;

// Standard sysexits values.
pub const EX_OK: i32 = 0;
pub const EX_USAGE: i32 = 64;
pub const EX_DATAERR: i32 = 65;
pub const EX_NOINPUT: i32 = 66;
pub const EX_SOFTWARE: i32 = 70;
pub const EX_IOERR: i32 = 74;

pub struct Lox<'a> {
    interpreter: Interpreter<'a>,
    had_error: bool,
    had_runtime_error: bool,
    next_expr_id: usize,
    stdout_sink: bool,
}

impl<'a> Lox<'a> {
    /// A fresh interpreter writing program output and diagnostics to `output`.
    pub fn new(output: &'a mut dyn Write) -> Self {
        Lox {
            interpreter: Interpreter::new(output),
            had_error: false,
            had_runtime_error: false,
            next_expr_id: 0,
            stdout_sink: false,
        }
    }

    /// A driver whose sink is the process standard output. Only a driver
    /// built this way may start the interactive prompt.
    pub fn with_stdout(output: &'a mut io::Stdout) -> Self {
        let mut lox: Lox<'a> = Lox::new(output);
        lox.stdout_sink = true;

        lox
    }

    /// True if a syntax or resolution error has been reported.
    pub fn had_error(&self) -> bool {
        self.had_error
    }

    /// True if a runtime error has been reported.
    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    /// Execute a script file and map the error flags to an exit code.
    pub fn run_file(&mut self, path: &Path) -> i32 {
        let source: Vec<u8> = match fs::read(path) {
            Ok(bytes) => bytes,

            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                eprintln!("Error: Unable to open file: {}", path.display());
                return EX_NOINPUT;
            }

            Err(_) => {
                eprintln!("Error: Failed to read from file: {}", path.display());
                return EX_IOERR;
            }
        };

        self.run(&source);

        if self.had_error {
            return EX_DATAERR;
        }
        if self.had_runtime_error {
            return EX_SOFTWARE;
        }

        EX_OK
    }

    /// Interactive prompt: read a line, run it, reset the static-error flag
    /// so one mistake doesn't poison the session, loop until EOF. The REPL
    /// requires the standard-output sink (see [`Lox::with_stdout`]); any
    /// other sink is a usage error.
    pub fn run_prompt(&mut self) -> i32 {
        if !self.stdout_sink {
            eprintln!("Error: The Lox REPL must be run with the standard output stream.");
            return EX_USAGE;
        }

        let stdin = io::stdin();
        let mut handle = stdin.lock();
        let mut line: String = String::new();

        loop {
            let _ = write!(self.interpreter.output(), "> ");
            let _ = self.interpreter.output().flush();

            line.clear();
            match handle.read_line(&mut line) {
                Ok(0) => break,

                Ok(_) => {
                    self.run(line.as_bytes());
                    self.had_error = false;
                }

                Err(error) => {
                    eprintln!("Error: Failed to read from prompt: {}", error);
                    return EX_IOERR;
                }
            }
        }

        EX_OK
    }

    /// Run a source buffer through the whole pipeline. Each stage reports
    /// its diagnostics; any static error suppresses the later stages.
    pub fn run(&mut self, source: &[u8]) {
        info!("Running {} bytes of source", source.len());

        let scanner: Scanner = Scanner::new(source);
        let mut tokens: Vec<Token> = Vec::new();
        for result in scanner {
            match result {
                Ok(token) => tokens.push(token),

                Err(error) => self.report(&error),
            }
        }
        if self.had_error {
            return;
        }

        // Node ids stay unique across repeated runs (the REPL case) so an
        // old binding-depth entry can never alias a new expression.
        let mut parser: Parser = Parser::starting_at(tokens, self.next_expr_id);
        let statements: Vec<Stmt> = parser.parse();
        self.next_expr_id = parser.next_expr_id();

        let parse_errors: Vec<LoxError> = parser.take_errors();
        for error in &parse_errors {
            self.report(error);
        }
        if self.had_error {
            return;
        }

        let resolve_errors: Vec<LoxError> =
            Resolver::new(&mut self.interpreter).resolve(&statements);
        for error in &resolve_errors {
            self.report(error);
        }
        if self.had_error {
            return;
        }

        if let Err(error) = self.interpreter.interpret(&statements) {
            self.report(&error);
        }
    }

    /// Write a diagnostic to the output sink and raise the matching flag.
    fn report(&mut self, error: &LoxError) {
        let _ = writeln!(self.interpreter.output(), "{}", error);

        if error.is_static() {
            self.had_error = true;
        } else {
            self.had_runtime_error = true;
        }
    }
}
