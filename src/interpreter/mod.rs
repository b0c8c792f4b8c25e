mod error;
mod eval;
mod scope;
mod value;

pub use error::{EvalResult, Interrupt, RuntimeError};
pub use eval::{unref, unwrap};
pub use scope::Scope;
pub use value::{format_number, Function, NativeFn, NativeFunction, Slot, Value};

use log::debug;
use thiserror::Error;

use crate::lexer::Token;
use crate::parser::{parse, ParseError, ParseState};
use crate::runtime;

/// Failure of a whole program run: either the source never parsed, or
/// evaluation aborted.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("\n{filename}:{error}")]
    Parse { filename: String, error: ParseError },

    #[error(transparent)]
    Eval(#[from] Interrupt),
}

/// Run a program from source: scan, parse, inject the runtime into a fresh
/// root frame, evaluate. Returns the program's value together with the
/// root scope (which `import` turns into a module dict).
pub fn run_program(filename: &str, source: &str) -> Result<(Value, Scope), RunError> {
    let tokens = Token::scan(source).map_err(|error| RunError::Parse {
        filename: filename.to_string(),
        error,
    })?;
    debug!("lexed {} tokens from {filename}", tokens.len());

    let mut state = ParseState::new(tokens);
    let program = parse(&mut state).map_err(|error| RunError::Parse {
        filename: filename.to_string(),
        error,
    })?;
    debug!("parsed {} top-level statements", program.statements.len());

    let scope = Scope::root(filename);
    runtime::inject(&scope);

    let value = program.eval(&scope)?;
    Ok((value, scope))
}
