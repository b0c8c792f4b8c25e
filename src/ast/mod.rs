//! # Abstract Syntax Tree
//!
//! Tree representation of parsed riddle programs, mirroring the grammar the
//! parser implements. A program is a flat list of statements; statements
//! contain expressions; expressions form a precedence tower from
//! [`expression::Assignment`] down to [`expression::Primary`].
//!
//! Every node records the [`lachs::Span`] it was parsed from so the
//! evaluator can point diagnostics at source positions.
//!
//! ## Related Modules
//!
//! - [`crate::parser`] - Produces these nodes from the token stream
//! - [`crate::interpreter`] - Walks these nodes to evaluate a program

pub mod expression;
pub mod statement;

pub use expression::*;
pub use statement::*;

/// A complete riddle program: the statements of one source file.
#[derive(Debug, Clone)]
pub struct Program {
    pub statements: Vec<Statement>,
}
