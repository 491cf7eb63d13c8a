//! Centralised error hierarchy for the Lox interpreter.
//!
//! All subsystems (scanner, parser, resolver, runtime, CLI) convert their
//! failure modes into one of the variants defined here. The `Display`
//! strings are the observable diagnostic formats, which the end-to-end test
//! corpus compares byte for byte, so they must not change shape.
//!
//! The module does not print diagnostics itself; the driver in [`crate::lox`]
//! writes them to the output sink and tracks the process-level error flags.

use std::io;

use log::info;
use thiserror::Error;

use crate::token::{Token, TokenType};

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human-readable description.
        message: String,

        /// 1-based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error, anchored at a token.
    #[error("[line {line}] Error{location}: {message}")]
    Parse {
        message: String,
        /// Pre-rendered token context: ` at 'lexeme'` or ` at end`.
        location: String,
        line: usize,
    },

    /// Static-analysis (resolver) error, anchored at a token.
    #[error("[line {line}] Error{location}: {message}")]
    Resolve {
        message: String,
        location: String,
        line: usize,
    },

    /// Runtime evaluation error. Two diagnostic lines: the message, then the
    /// line of the offending token.
    #[error("RuntimeError: {message}\n[line {line}]")]
    Runtime { message: String, line: usize },

    /// Wrapper around `std::io::Error` (transparent). Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),
}

fn token_location(token: &Token) -> String {
    if token.token_type == TokenType::EOF {
        " at end".to_string()
    } else {
        format!(" at '{}'", token.lexeme)
    }
}

impl LoxError {
    /// Helper constructor for the scanner.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        LoxError::Lex { message, line }
    }

    /// Helper constructor for the parser.
    pub fn parse<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!(
            "Creating Parse error: line={}, at={:?}, msg={}",
            token.line, token.lexeme, message
        );

        LoxError::Parse {
            message,
            location: token_location(token),
            line: token.line,
        }
    }

    /// Helper constructor for the resolver.
    pub fn resolve<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!(
            "Creating Resolve error: line={}, at={:?}, msg={}",
            token.line, token.lexeme, message
        );

        LoxError::Resolve {
            message,
            location: token_location(token),
            line: token.line,
        }
    }

    /// Helper constructor for the interpreter.
    pub fn runtime<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!(
            "Creating Runtime error: line={}, msg={}",
            token.line, message
        );

        LoxError::Runtime {
            message,
            line: token.line,
        }
    }

    /// True for scanner, parser, and resolver errors; these suppress
    /// execution and map to the data-error exit code.
    pub fn is_static(&self) -> bool {
        matches!(
            self,
            LoxError::Lex { .. } | LoxError::Parse { .. } | LoxError::Resolve { .. }
        )
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;
