//! # Runtime library
//!
//! The native functions injected into the root frame before a program
//! runs. They live in the same value domain as user functions and follow
//! the same call protocol: (calling frame, call-site position, evaluated
//! arguments) in, value or error out.
//!
//! A note on function naming: the `do_` prefix keeps names like `type`,
//! `append`, and `str` from colliding with the host language.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;

use crate::interpreter::{
    format_number, run_program, unwrap, EvalResult, NativeFn, NativeFunction, RuntimeError,
    Scope, Value,
};

const NATIVES: [(&str, NativeFn); 18] = [
    ("import", do_import),
    ("keys", do_keys),
    ("values", do_values),
    ("delete", do_delete),
    ("len", do_len),
    ("append", do_append),
    ("prepend", do_prepend),
    ("pop", do_pop),
    ("popat", do_popat),
    ("prepop", do_prepop),
    ("assert", do_assert),
    ("log", do_log),
    ("time", do_time),
    ("type", do_type),
    ("str", do_str),
    ("num", do_num),
    ("floor", do_floor),
    ("read_lines", do_read_lines),
];

/// Bind every native function in the given (root) frame.
pub fn inject(scope: &Scope) {
    debug!("injecting {} runtime natives", NATIVES.len());
    for (name, exec) in NATIVES {
        scope.declare(name, Value::Native(NativeFunction { name, exec }));
    }
}

fn check_arity(
    scope: &Scope,
    position: &str,
    name: &str,
    wanted: usize,
    args: &[Value],
) -> Result<(), RuntimeError> {
    if args.len() != wanted {
        return Err(RuntimeError::arity(
            scope,
            position,
            format!(
                "{name}: incorrect number of arguments, wanted: {wanted}, got: {}",
                args.len()
            ),
        ));
    }
    Ok(())
}

/// Run another source file to completion and hand back its root frame as a
/// dict of bindings (native functions included).
pub fn do_import(scope: &Scope, position: &str, args: Vec<Value>) -> EvalResult {
    check_arity(scope, position, "import", 1, &args)?;
    let path = match &args[0] {
        Value::Str(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        other => {
            return Err(RuntimeError::type_error(
                scope,
                position,
                format!(
                    "import: the single argument should be a string, got: {}",
                    other.type_name()
                ),
            )
            .into())
        }
    };
    let source = std::fs::read_to_string(&path).map_err(|error| {
        RuntimeError::runtime(
            scope,
            position,
            format!("import: while reading {path}: {error}"),
        )
    })?;
    let (_, module_scope) = run_program(&path, &source).map_err(|error| {
        RuntimeError::runtime(scope, position, format!("import: {path}: {error}"))
    })?;
    let dict = module_scope
        .bindings()
        .into_iter()
        .map(|(name, value)| (name, Value::slot(value)))
        .collect::<HashMap<_, _>>();
    Ok(Value::Dict(Rc::new(RefCell::new(dict))))
}

pub fn do_keys(scope: &Scope, position: &str, args: Vec<Value>) -> EvalResult {
    check_arity(scope, position, "keys", 1, &args)?;
    match &args[0] {
        Value::Dict(entries) => {
            let keys = entries
                .borrow()
                .keys()
                .map(|key| Value::slot(Value::string(key.as_bytes().to_vec())))
                .collect::<Vec<_>>();
            Ok(Value::List(Rc::new(RefCell::new(keys))))
        }
        other => Err(RuntimeError::type_error(
            scope,
            position,
            format!(
                "keys: the single argument should be a dictionary, got: {}",
                other.type_name()
            ),
        )
        .into()),
    }
}

pub fn do_values(scope: &Scope, position: &str, args: Vec<Value>) -> EvalResult {
    check_arity(scope, position, "values", 1, &args)?;
    match &args[0] {
        Value::Dict(entries) => {
            // Copies, not aliases, of the stored values
            let values = entries
                .borrow()
                .values()
                .map(|slot| Value::slot(slot.borrow().clone()))
                .collect::<Vec<_>>();
            Ok(Value::List(Rc::new(RefCell::new(values))))
        }
        other => Err(RuntimeError::type_error(
            scope,
            position,
            format!(
                "values: the single argument should be a dictionary, got: {}",
                other.type_name()
            ),
        )
        .into()),
    }
}

pub fn do_delete(scope: &Scope, position: &str, args: Vec<Value>) -> EvalResult {
    check_arity(scope, position, "delete", 2, &args)?;
    match &args[0] {
        Value::Dict(entries) => match &args[1] {
            Value::Str(key) => {
                entries
                    .borrow_mut()
                    .remove(&String::from_utf8_lossy(key).into_owned());
                Ok(Value::Undefined)
            }
            other => Err(RuntimeError::type_error(
                scope,
                position,
                format!(
                    "delete: the 2nd argument should be a string, got: {}",
                    other.type_name()
                ),
            )
            .into()),
        },
        other => Err(RuntimeError::type_error(
            scope,
            position,
            format!(
                "delete: the 1st argument should be a dictionary, got: {}",
                other.type_name()
            ),
        )
        .into()),
    }
}

pub fn do_len(scope: &Scope, position: &str, args: Vec<Value>) -> EvalResult {
    check_arity(scope, position, "len", 1, &args)?;
    match &args[0] {
        Value::Identifier(_) => {
            let resolved = unwrap(args[0].clone(), scope)?;
            do_len(scope, position, vec![resolved])
        }
        Value::Str(bytes) => Ok(Value::Number(bytes.len() as f64)),
        Value::List(items) => Ok(Value::Number(items.borrow().len() as f64)),
        other => Err(RuntimeError::type_error(
            scope,
            position,
            format!(
                "len: the single argument should be a variable, string, or list, got: {}",
                other.type_name()
            ),
        )
        .into()),
    }
}

pub fn do_append(scope: &Scope, position: &str, mut args: Vec<Value>) -> EvalResult {
    check_arity(scope, position, "append", 2, &args)?;
    let item = args.pop().unwrap();
    match &args[0] {
        Value::List(items) => {
            // The appended value can be of any type
            items.borrow_mut().push(Value::slot(item));
            Ok(Value::Undefined)
        }
        other => Err(RuntimeError::type_error(
            scope,
            position,
            format!(
                "append: the 1st argument should be a list, got: {}",
                other.type_name()
            ),
        )
        .into()),
    }
}

pub fn do_prepend(scope: &Scope, position: &str, mut args: Vec<Value>) -> EvalResult {
    check_arity(scope, position, "prepend", 2, &args)?;
    let item = args.pop().unwrap();
    match &args[0] {
        Value::List(items) => {
            items.borrow_mut().insert(0, Value::slot(item));
            Ok(Value::Undefined)
        }
        other => Err(RuntimeError::type_error(
            scope,
            position,
            format!(
                "prepend: the 1st argument should be a list, got: {}",
                other.type_name()
            ),
        )
        .into()),
    }
}

pub fn do_pop(scope: &Scope, position: &str, args: Vec<Value>) -> EvalResult {
    check_arity(scope, position, "pop", 1, &args)?;
    match &args[0] {
        Value::List(items) => {
            let slot = items.borrow_mut().pop().ok_or_else(|| {
                RuntimeError::index(scope, position, "pop: called on an empty list")
            })?;
            let value = slot.borrow().clone();
            Ok(value)
        }
        other => Err(RuntimeError::type_error(
            scope,
            position,
            format!(
                "pop: the single argument should be a list, got: {}",
                other.type_name()
            ),
        )
        .into()),
    }
}

pub fn do_popat(scope: &Scope, position: &str, args: Vec<Value>) -> EvalResult {
    check_arity(scope, position, "popat", 2, &args)?;
    match &args[0] {
        Value::List(items) => {
            if items.borrow().is_empty() {
                return Err(RuntimeError::index(
                    scope,
                    position,
                    "popat: called on an empty list",
                )
                .into());
            }
            let index = match &args[1] {
                // The index is floored
                Value::Number(n) => n.trunc() as i64,
                other => {
                    return Err(RuntimeError::type_error(
                        scope,
                        position,
                        format!(
                            "popat: the 2nd argument should be a number, got: {}",
                            other.type_name()
                        ),
                    )
                    .into())
                }
            };
            let mut items = items.borrow_mut();
            if index < 0 || index as usize >= items.len() {
                return Err(RuntimeError::index(
                    scope,
                    position,
                    format!("list index out of bounds: {index}"),
                )
                .into());
            }
            let slot = items.remove(index as usize);
            let value = slot.borrow().clone();
            Ok(value)
        }
        other => Err(RuntimeError::type_error(
            scope,
            position,
            format!(
                "popat: the 1st argument should be a list, got: {}",
                other.type_name()
            ),
        )
        .into()),
    }
}

pub fn do_prepop(scope: &Scope, position: &str, args: Vec<Value>) -> EvalResult {
    check_arity(scope, position, "prepop", 1, &args)?;
    match &args[0] {
        Value::List(items) => {
            if items.borrow().is_empty() {
                return Err(RuntimeError::index(
                    scope,
                    position,
                    "prepop: called on an empty list",
                )
                .into());
            }
            let slot = items.borrow_mut().remove(0);
            let value = slot.borrow().clone();
            Ok(value)
        }
        other => Err(RuntimeError::type_error(
            scope,
            position,
            format!(
                "prepop: the single argument should be a list, got: {}",
                other.type_name()
            ),
        )
        .into()),
    }
}

pub fn do_assert(scope: &Scope, position: &str, args: Vec<Value>) -> EvalResult {
    check_arity(scope, position, "assert", 2, &args)?;
    let equal = args[0].equals(&args[1])?;
    if !equal {
        return Err(RuntimeError::runtime(
            scope,
            position,
            format!("assert failed: {} == {}", args[0], args[1]),
        )
        .into());
    }
    Ok(Value::Undefined)
}

pub fn do_log(scope: &Scope, position: &str, args: Vec<Value>) -> EvalResult {
    if args.is_empty() {
        return Err(RuntimeError::arity(
            scope,
            position,
            format!(
                "log: incorrect number of arguments, wanted: at least 1, got: {}",
                args.len()
            ),
        )
        .into());
    }
    let line = args
        .iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    println!("{line}");
    Ok(Value::Undefined)
}

pub fn do_time(scope: &Scope, position: &str, args: Vec<Value>) -> EvalResult {
    check_arity(scope, position, "time", 0, &args)?;
    let elapsed = SystemTime::now().duration_since(UNIX_EPOCH).map_err(|error| {
        RuntimeError::runtime(scope, position, format!("time: {error}"))
    })?;
    Ok(Value::Number(elapsed.as_millis() as f64))
}

pub fn do_type(scope: &Scope, position: &str, args: Vec<Value>) -> EvalResult {
    check_arity(scope, position, "type", 1, &args)?;
    Ok(Value::string(args[0].type_name().as_bytes().to_vec()))
}

pub fn do_str(scope: &Scope, position: &str, args: Vec<Value>) -> EvalResult {
    check_arity(scope, position, "str", 1, &args)?;
    match &args[0] {
        Value::Str(_) => Ok(args[0].clone()),
        Value::Number(n) => Ok(Value::string(format_number(*n).into_bytes())),
        Value::Bool(b) => Ok(Value::string(b.to_string().into_bytes())),
        other => Err(RuntimeError::type_error(
            scope,
            position,
            format!(
                "str: expects a single argument of type string, number, or bool, got: {}",
                other.type_name()
            ),
        )
        .into()),
    }
}

pub fn do_num(scope: &Scope, position: &str, args: Vec<Value>) -> EvalResult {
    check_arity(scope, position, "num", 1, &args)?;
    match &args[0] {
        Value::Str(bytes) => {
            let text = String::from_utf8_lossy(bytes).into_owned();
            let parsed = text.parse::<f64>().map_err(|_| {
                RuntimeError::type_error(
                    scope,
                    position,
                    format!("num: couldn't convert {text} to number"),
                )
            })?;
            Ok(Value::Number(parsed))
        }
        other => Err(RuntimeError::type_error(
            scope,
            position,
            format!(
                "num: expects a single argument of type string, got: {}",
                other.type_name()
            ),
        )
        .into()),
    }
}

pub fn do_floor(scope: &Scope, position: &str, args: Vec<Value>) -> EvalResult {
    check_arity(scope, position, "floor", 1, &args)?;
    match &args[0] {
        Value::Number(n) => Ok(Value::Number(n.trunc())),
        other => Err(RuntimeError::type_error(
            scope,
            position,
            format!(
                "floor: expects a single argument of type number, got: {}",
                other.type_name()
            ),
        )
        .into()),
    }
}

/// Stream every line of a file to the given callback, in order. The file
/// handle is dropped before this returns, error paths included.
pub fn do_read_lines(scope: &Scope, position: &str, args: Vec<Value>) -> EvalResult {
    check_arity(scope, position, "read_lines", 2, &args)?;
    let path = match &args[0] {
        Value::Str(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        other => {
            return Err(RuntimeError::type_error(
                scope,
                position,
                format!(
                    "read_lines: expects the 1st argument to be a filepath, got: {}",
                    other.type_name()
                ),
            )
            .into())
        }
    };
    let callback = match &args[1] {
        Value::Function(function) => function.clone(),
        other => {
            return Err(RuntimeError::type_error(
                scope,
                position,
                format!(
                    "read_lines: expects the 2nd argument to be a function, got: {}",
                    other.type_name()
                ),
            )
            .into())
        }
    };

    let file = File::open(&path).map_err(|error| {
        RuntimeError::runtime(
            scope,
            position,
            format!("read_lines: while reading {path}: {error}"),
        )
    })?;
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|error| {
            RuntimeError::runtime(
                scope,
                position,
                format!("read_lines: while reading {path}: {error}"),
            )
        })?;
        callback
            .exec(&callback.site, vec![Value::string(line.into_bytes())])
            .map_err(|error| {
                RuntimeError::runtime(
                    scope,
                    position,
                    format!("read_lines: while reading {path}: {error}"),
                )
            })?;
    }
    Ok(Value::Undefined)
}
