//! riddle - a small dynamically-typed scripting language for programming puzzles
//!
//! This library provides the core components for lexing, parsing, and
//! evaluating riddle programs: a regex-driven tokenizer, a recursive-descent
//! parser, and a tree-walking evaluator over a lexically-scoped frame chain.

pub mod ast;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod runtime;

pub use interpreter::{run_program, RunError, Scope, Value};

/// Interpreter release tag, reported by the command-line front end.
pub const VERSION: &str = "0.1.0";
