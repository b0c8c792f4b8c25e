use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::ast::Statement;

use super::error::{EvalResult, RuntimeError};
use super::scope::Scope;

/// An assignable storage slot inside a list, dict, or variable-like
/// position. References alias slots, so a write through one reference is
/// visible through every other.
pub type Slot = Rc<RefCell<Value>>;

/// Signature shared by every native function: the calling frame, the
/// call-site position string, and the evaluated arguments.
pub type NativeFn = fn(&Scope, &str, Vec<Value>) -> EvalResult;

/// Runtime value representation.
///
/// `Identifier` and `Reference` never surface as program-level values;
/// they only exist while an expression is being evaluated and are
/// normalized away by [`unref`]/[`unwrap`] at every value-consuming site.
///
/// [`unref`]: super::eval::unref
/// [`unwrap`]: super::eval::unwrap
#[derive(Debug, Clone)]
pub enum Value {
    Undefined,
    Bool(bool),
    Number(f64),
    Str(Rc<Vec<u8>>),
    List(Rc<RefCell<Vec<Slot>>>),
    Dict(Rc<RefCell<HashMap<String, Slot>>>),
    Function(Rc<Function>),
    Native(NativeFunction),
    /// A not-yet-resolved name, produced by a bare identifier primary
    Identifier(String),
    /// An assignable slot, produced by indexing and property access
    Reference(Slot),
}

/// A user function value: parameter names, body, and the frame captured
/// where the `func` literal was evaluated. Calls run in a child of that
/// frame, never of the caller's.
pub struct Function {
    /// Declaration site, `filename:line:column`
    pub site: String,
    pub parameters: Vec<String>,
    pub scope: Scope,
    pub body: Vec<Statement>,
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The captured scope may be cyclic through this very value.
        f.debug_struct("Function")
            .field("site", &self.site)
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// A host-provided function injected into the root frame. Called with the
/// same protocol as user functions.
#[derive(Debug, Clone)]
pub struct NativeFunction {
    pub name: &'static str,
    pub exec: NativeFn,
}

impl Value {
    /// Wrap raw bytes as a string value.
    pub fn string(bytes: impl Into<Vec<u8>>) -> Value {
        Value::Str(Rc::new(bytes.into()))
    }

    /// Wrap a plain value in a fresh slot.
    pub fn slot(value: Value) -> Slot {
        Rc::new(RefCell::new(value))
    }

    /// The name `type()` reports for this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Dict(_) => "dict",
            Value::Function(_) => "function",
            Value::Native(_) => "function",
            Value::Identifier(_) => "identifier",
            Value::Reference(_) => "reference",
        }
    }

    /// Per-variant equality. Numbers, strings, bools, and `undefined`
    /// compare structurally; functions, lists, dicts, and references are
    /// never equal to anything; natives are equal when they share a name.
    /// Comparing an unresolved identifier is an error.
    pub fn equals(&self, other: &Value) -> Result<bool, RuntimeError> {
        if let Value::Identifier(name) = self {
            return Err(RuntimeError::UncomparableIdentifier { name: name.clone() });
        }
        let other = match other {
            Value::Reference(slot) => slot.borrow().clone(),
            other => other.clone(),
        };
        Ok(match (self, &other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Native(a), Value::Native(b)) => a.name == b.name,
            _ => false,
        })
    }
}

/// Shortest decimal representation that round-trips, no exponent form for
/// the magnitudes puzzle programs produce. Also used to stringify numeric
/// dict indexes.
pub fn format_number(n: f64) -> String {
    format!("{n}")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Number(value) => write!(f, "{}", format_number(*value)),
            Value::Str(bytes) => write!(f, "{}", String::from_utf8_lossy(bytes)),
            Value::List(items) => {
                let items = items
                    .borrow()
                    .iter()
                    .map(|slot| slot.borrow().to_string())
                    .collect::<Vec<_>>();
                write!(f, "[{}]", items.join(", "))
            }
            Value::Dict(entries) => {
                let entries = entries
                    .borrow()
                    .iter()
                    .map(|(key, slot)| format!("\"{}\": {}", key, slot.borrow()))
                    .collect::<Vec<_>>();
                write!(f, "{{{}}}", entries.join(", "))
            }
            Value::Function(function) => {
                write!(f, "function ({})", function.parameters.join(","))
            }
            Value::Native(native) => write!(f, "{} function", native.name),
            Value::Identifier(name) => write!(f, "{name}"),
            Value::Reference(_) => write!(f, "reference"),
        }
    }
}
