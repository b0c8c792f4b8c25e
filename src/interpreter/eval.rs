use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{
    Addition, AdditionOp, Assignment, Call, CallChain, ChainOp, Comparison, ComparisonOp,
    DictKey, DictLiteral, Equality, EqualityOp, Expr, ForStatement, FuncLiteral, IfStatement,
    ListLiteral, LogicAnd, LogicOr, Multiplication, MultiplicationOp, Primary, Program,
    Statement, SubExpression, Unary, UnaryOp, WhileStatement,
};
use crate::runtime;

use super::error::{EvalResult, Interrupt, RuntimeError};
use super::scope::Scope;
use super::value::{format_number, Function, Value};

/// Replace a reference with the value it points at; other values pass
/// through untouched.
pub fn unref(value: Value) -> Value {
    match value {
        Value::Reference(slot) => slot.borrow().clone(),
        other => other,
    }
}

/// Normalize a transient value: resolve an identifier against the scope,
/// dereference a reference. Every value-consuming site goes through this.
pub fn unwrap(value: Value, scope: &Scope) -> Result<Value, RuntimeError> {
    match value {
        Value::Identifier(name) => {
            scope.get(&name).ok_or(RuntimeError::Undeclared { name })
        }
        other => Ok(unref(other)),
    }
}

impl Program {
    /// Evaluate the whole program. Its value is the value of the last
    /// statement, normalized to a plain value.
    pub fn eval(&self, scope: &Scope) -> EvalResult {
        let value = eval_block(scope, &self.statements)?;
        Ok(unwrap(value, scope)?)
    }
}

/// Evaluate statements in order, yielding the last statement's value
/// (`undefined` for an empty block).
fn eval_block(scope: &Scope, statements: &[Statement]) -> EvalResult {
    let mut result = Value::Undefined;
    for statement in statements {
        result = statement.eval(scope)?;
    }
    Ok(result)
}

/// Evaluate call arguments left to right, normalizing each one.
fn eval_exprs(scope: &Scope, exprs: &[Expr]) -> Result<Vec<Value>, Interrupt> {
    let mut values = Vec::with_capacity(exprs.len());
    for expr in exprs {
        values.push(unwrap(expr.eval(scope)?, scope)?);
    }
    Ok(values)
}

impl Statement {
    pub fn eval(&self, scope: &Scope) -> EvalResult {
        match self {
            Statement::If(statement) => statement.eval(scope),
            Statement::For(statement) => statement.eval(scope),
            Statement::While(statement) => statement.eval(scope),
            Statement::Return(statement) => {
                let value = match &statement.expr {
                    Some(expr) => expr.eval(scope)?,
                    None => Value::Undefined,
                };
                // Escapes to the nearest enclosing function call
                Err(Interrupt::Return(value))
            }
            Statement::Break(statement) => Err(Interrupt::Break {
                position: scope.site(&statement.position),
            }),
            Statement::Continue(statement) => Err(Interrupt::Continue {
                position: scope.site(&statement.position),
            }),
            Statement::Expr(statement) => statement.expr.eval(scope),
        }
    }
}

impl IfStatement {
    fn eval(&self, scope: &Scope) -> EvalResult {
        let child = scope.child(format!("{}: if statement", scope.site(&self.position)));
        let condition = unwrap(self.condition.eval(&child)?, &child)?;
        match condition {
            Value::Bool(true) => eval_block(&child, &self.then_block),
            Value::Bool(false) => match &self.else_block {
                Some(block) => eval_block(&child, block),
                None => Ok(Value::Undefined),
            },
            _ => Err(RuntimeError::type_error(
                &child,
                child.site(&self.condition.position),
                "conditional should evaluate to true or false",
            )
            .into()),
        }
    }
}

impl ForStatement {
    fn eval(&self, scope: &Scope) -> EvalResult {
        let loop_scope = scope.child(format!("{}: for loop", scope.site(&self.position)));
        if let Some(init) = &self.init {
            init.eval(&loop_scope)?;
        }
        eval_loop(
            &loop_scope,
            self.condition.as_ref(),
            &self.block,
            self.post.as_ref(),
        )
    }
}

impl WhileStatement {
    fn eval(&self, scope: &Scope) -> EvalResult {
        let loop_scope = scope.child(format!("{}: while loop", scope.site(&self.position)));
        eval_loop(&loop_scope, self.condition.as_ref(), &self.block, None)
    }
}

/// Shared loop driver: condition (absent means `true`), body, optional
/// post expression. `continue` skips to the post step, `break` terminates
/// the loop with `undefined`; a `return` keeps propagating.
fn eval_loop(
    loop_scope: &Scope,
    condition: Option<&Expr>,
    block: &[Statement],
    post: Option<&Expr>,
) -> EvalResult {
    loop {
        let condition_value = match condition {
            Some(expr) => unwrap(expr.eval(loop_scope)?, loop_scope)?,
            None => Value::Bool(true),
        };
        match condition_value {
            Value::Bool(false) => return Ok(Value::Undefined),
            Value::Bool(true) => {
                for statement in block {
                    match statement.eval(loop_scope) {
                        Ok(_) => {}
                        Err(Interrupt::Continue { .. }) => break,
                        Err(Interrupt::Break { .. }) => return Ok(Value::Undefined),
                        Err(other) => return Err(other),
                    }
                }
                if let Some(expr) = post {
                    expr.eval(loop_scope)?;
                }
            }
            other => {
                let position = condition
                    .map(|expr| loop_scope.site(&expr.position))
                    .unwrap_or_default();
                return Err(RuntimeError::type_error(
                    loop_scope,
                    position,
                    format!(
                        "loop condition expression should evaluate to a boolean, found: {}",
                        other.type_name()
                    ),
                )
                .into());
            }
        }
    }
}

impl Expr {
    pub fn eval(&self, scope: &Scope) -> EvalResult {
        self.assignment.eval(scope)
    }
}

impl Assignment {
    fn eval(&self, scope: &Scope) -> EvalResult {
        let left = self.target.eval(scope)?;

        let value_expr = match &self.value {
            Some(expr) => expr,
            // No `=`: the expression's own value, dereferenced
            None => {
                return match left {
                    Value::Reference(slot) => Ok(slot.borrow().clone()),
                    other => Ok(other),
                }
            }
        };

        let right = match value_expr.eval(scope)? {
            Value::Identifier(name) => {
                scope.get(&name).ok_or(RuntimeError::Undeclared { name })?
            }
            other => other,
        };

        if let Value::Reference(slot) = &left {
            *slot.borrow_mut() = right.clone();
            return Ok(right);
        }
        if let Value::Identifier(name) = &left {
            if self.is_let {
                scope.declare(name, right.clone());
            } else {
                if scope.get(name).is_none() {
                    return Err(RuntimeError::name(
                        scope,
                        scope.site(&self.position),
                        format!("can't assign to unknown variable: {name}"),
                    )
                    .into());
                }
                scope.set(name, right.clone());
            }
            return Ok(right);
        }
        Err(RuntimeError::runtime(
            scope,
            scope.site(&self.position),
            format!("can't assign to non-variable: {left}"),
        )
        .into())
    }
}

impl LogicOr {
    fn eval(&self, scope: &Scope) -> EvalResult {
        let left = self.left.eval(scope)?;
        let next = match &self.rest {
            Some(next) => next,
            None => return Ok(left),
        };
        let right = next.eval(scope)?;
        let left = unwrap(left, scope)?;
        let right = unwrap(right, scope)?;
        match (&left, &right) {
            (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(*a || *b)),
            _ => Err(RuntimeError::type_error(
                scope,
                scope.site(&self.position),
                format!("only bools can be compared with 'or', found: {left} and {right}"),
            )
            .into()),
        }
    }
}

impl LogicAnd {
    fn eval(&self, scope: &Scope) -> EvalResult {
        let left = self.left.eval(scope)?;
        let next = match &self.rest {
            Some(next) => next,
            None => return Ok(left),
        };
        let right = next.eval(scope)?;
        let left = unwrap(left, scope)?;
        let right = unwrap(right, scope)?;
        match (&left, &right) {
            (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(*a && *b)),
            _ => Err(RuntimeError::type_error(
                scope,
                scope.site(&self.position),
                format!("only bools can be compared with 'and', found: {left} and {right}"),
            )
            .into()),
        }
    }
}

impl Equality {
    fn eval(&self, scope: &Scope) -> EvalResult {
        let left = self.left.eval(scope)?;
        let (op, next) = match &self.rest {
            Some(rest) => rest,
            None => return Ok(left),
        };
        let right = next.eval(scope)?;
        let left = unwrap(left, scope)?;
        let right = unwrap(right, scope)?;
        // Dicts, lists, and functions are never equal
        let result = left.equals(&right)?;
        match op {
            EqualityOp::Equal => Ok(Value::Bool(result)),
            EqualityOp::NotEqual => Ok(Value::Bool(!result)),
        }
    }
}

impl Comparison {
    fn eval(&self, scope: &Scope) -> EvalResult {
        let left = self.left.eval(scope)?;
        let (op, next) = match &self.rest {
            Some(rest) => rest,
            None => return Ok(left),
        };
        let right = next.eval(scope)?;
        let left = unwrap(left, scope)?;
        let right = unwrap(right, scope)?;
        match (&left, &right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(match op {
                ComparisonOp::Less => a < b,
                ComparisonOp::LessEqual => a <= b,
                ComparisonOp::Greater => a > b,
                ComparisonOp::GreaterEqual => a >= b,
            })),
            _ => Err(RuntimeError::type_error(
                scope,
                scope.site(&self.position),
                format!(
                    "only numbers can be compared with {}, found: {left} and {right}",
                    op.as_str()
                ),
            )
            .into()),
        }
    }
}

impl Addition {
    fn eval(&self, scope: &Scope) -> EvalResult {
        let left = self.left.eval(scope)?;
        let (op, next) = match &self.rest {
            Some(rest) => rest,
            None => return Ok(left),
        };
        let right = next.eval(scope)?;
        let left = unwrap(left, scope)?;
        let right = unwrap(right, scope)?;
        match (op, &left, &right) {
            (AdditionOp::Plus, Value::Str(a), Value::Str(b)) => {
                let mut bytes = a.as_ref().clone();
                bytes.extend_from_slice(b);
                Ok(Value::string(bytes))
            }
            (AdditionOp::Plus, Value::Number(a), Value::Number(b)) => {
                Ok(Value::Number(a + b))
            }
            (AdditionOp::Minus, Value::Number(a), Value::Number(b)) => {
                Ok(Value::Number(a - b))
            }
            (AdditionOp::Plus, ..) => Err(RuntimeError::type_error(
                scope,
                scope.site(&self.position),
                format!(
                    "'+' can only be used between [string, string], [number, number], not: [{left}, {right}]"
                ),
            )
            .into()),
            (AdditionOp::Minus, ..) => Err(RuntimeError::type_error(
                scope,
                scope.site(&self.position),
                format!("'-' can only be used between [number, number], not: [{left}, {right}]"),
            )
            .into()),
        }
    }
}

impl Multiplication {
    fn eval(&self, scope: &Scope) -> EvalResult {
        let left = self.left.eval(scope)?;
        let (op, next) = match &self.rest {
            Some(rest) => rest,
            None => return Ok(left),
        };
        let right = next.eval(scope)?;
        let left = unwrap(left, scope)?;
        let right = unwrap(right, scope)?;
        let (a, b) = match (&left, &right) {
            (Value::Number(a), Value::Number(b)) => (*a, *b),
            _ => {
                return Err(RuntimeError::type_error(
                    scope,
                    scope.site(&self.position),
                    format!(
                        "'{}' can only be used between [number, number], not: [{left}, {right}]",
                        op.as_str()
                    ),
                )
                .into())
            }
        };
        match op {
            MultiplicationOp::Star => Ok(Value::Number(a * b)),
            MultiplicationOp::Slash => Ok(Value::Number(a / b)),
            MultiplicationOp::Percent => {
                // '%' rounds both operands to the nearest integer and takes
                // the integer remainder
                let divisor = b.round();
                if divisor == 0.0 {
                    return Err(RuntimeError::runtime(
                        scope,
                        scope.site(&self.position),
                        format!("'%' with a divisor that rounds to zero: {}", format_number(b)),
                    )
                    .into());
                }
                Ok(Value::Number(((a.round() as i64) % (divisor as i64)) as f64))
            }
        }
    }
}

impl Unary {
    fn eval(&self, scope: &Scope) -> EvalResult {
        match self {
            Unary::Primary(primary) => primary.eval(scope),
            Unary::Op {
                op,
                operand,
                position,
            } => {
                let value = unwrap(operand.eval(scope)?, scope)?;
                match (op, &value) {
                    (UnaryOp::Bang, Value::Bool(b)) => Ok(Value::Bool(!b)),
                    (UnaryOp::Minus, Value::Number(n)) => Ok(Value::Number(-n)),
                    (UnaryOp::Bang, _) => Err(RuntimeError::type_error(
                        scope,
                        scope.site(position),
                        format!("expected bool after '!', found: {value}"),
                    )
                    .into()),
                    (UnaryOp::Minus, _) => Err(RuntimeError::type_error(
                        scope,
                        scope.site(position),
                        format!("expected number after '-', found: {value}"),
                    )
                    .into()),
                }
            }
        }
    }
}

impl Primary {
    fn eval(&self, scope: &Scope) -> EvalResult {
        match self {
            Primary::Func(literal) => literal.eval(scope),
            Primary::List(literal) => literal.eval(scope),
            Primary::Dict(literal) => literal.eval(scope),
            Primary::Call(call) => call.eval(scope),
            Primary::SubExpression(sub) => sub.eval(scope),
            Primary::Number(literal) => Ok(Value::Number(literal.value)),
            Primary::Str(literal) => {
                // The token still carries its quote marks
                let bytes = literal.value.as_bytes();
                Ok(Value::string(bytes[1..bytes.len() - 1].to_vec()))
            }
            Primary::Bool(literal) => Ok(Value::Bool(literal.value)),
            Primary::Undefined(_) => Ok(Value::Undefined),
            Primary::Ident(ident) => Ok(Value::Identifier(ident.value.clone())),
        }
    }
}

impl FuncLiteral {
    fn eval(&self, scope: &Scope) -> EvalResult {
        let site = scope.site(&self.position);
        // The closure frame is fixed here: every call becomes a child of
        // it, never of the caller's frame.
        let closure = scope.child(format!("{site}: function declared"));
        Ok(Value::Function(Rc::new(Function {
            site,
            parameters: self.params.iter().map(|p| p.value.clone()).collect(),
            scope: closure,
            body: self.block.clone(),
        })))
    }
}

impl Function {
    /// Call this function: bind parameters in a fresh child of the
    /// captured frame, run the body, catch `return`. A body that falls off
    /// the end yields `undefined`.
    pub fn exec(&self, position: &str, args: Vec<Value>) -> EvalResult {
        let call_scope = self.scope.child(format!("{position}: function call"));
        if args.len() != self.parameters.len() {
            return Err(RuntimeError::arity(
                &call_scope,
                position,
                format!(
                    "incorrect number of arguments, wanted: {}, got: {}",
                    self.parameters.len(),
                    args.len()
                ),
            )
            .into());
        }
        for (parameter, arg) in self.parameters.iter().zip(args) {
            call_scope.declare(parameter, arg);
        }
        for statement in &self.body {
            match statement.eval(&call_scope) {
                Ok(_) => {}
                Err(Interrupt::Return(value)) => {
                    return Ok(unwrap(value, &call_scope)?);
                }
                Err(other) => return Err(other),
            }
        }
        Ok(Value::Undefined)
    }
}

impl ListLiteral {
    fn eval(&self, scope: &Scope) -> EvalResult {
        let mut items = Vec::with_capacity(self.items.len());
        for expr in &self.items {
            let value = unwrap(expr.eval(scope)?, scope)?;
            items.push(Value::slot(value));
        }
        Ok(Value::List(Rc::new(RefCell::new(items))))
    }
}

impl DictLiteral {
    fn eval(&self, scope: &Scope) -> EvalResult {
        let mut entries = HashMap::new();
        for entry in &self.entries {
            let key = match &entry.key {
                DictKey::Expr(expr) => {
                    let value = unwrap(expr.eval(scope)?, scope)?;
                    match value {
                        Value::Str(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                        // A non-string key stays empty and fails below
                        _ => String::new(),
                    }
                }
                DictKey::Literal(name) => name.value.clone(),
            };
            let value = unwrap(entry.value.eval(scope)?, scope)?;
            if key.is_empty() {
                return Err(RuntimeError::runtime(
                    scope,
                    scope.site(&self.position),
                    "can't set empty string as dictionary key",
                )
                .into());
            }
            entries.insert(key, Value::slot(value));
        }
        Ok(Value::Dict(Rc::new(RefCell::new(entries))))
    }
}

impl Call {
    fn eval(&self, scope: &Scope) -> EvalResult {
        let seed = scope.get(&self.ident.value).ok_or(RuntimeError::Undeclared {
            name: self.ident.value.clone(),
        })?;
        eval_call_chain(scope, seed, &self.chain)
    }
}

impl SubExpression {
    fn eval(&self, scope: &Scope) -> EvalResult {
        let value = self.expr.eval(scope)?;
        match &self.chain {
            Some(chain) => eval_call_chain(scope, value, chain),
            None => Ok(value),
        }
    }
}

/// Walk a postfix chain: argument tuples, indexes, and property accesses,
/// dereferencing at every hop. Indexing a dict auto-vivifies missing keys
/// so `d["k"] = v` can create them; list properties dispatch the built-in
/// list methods.
fn eval_call_chain(scope: &Scope, mut value: Value, chain: &CallChain) -> EvalResult {
    let mut current = Some(chain);
    while let Some(link) = current {
        value = unref(value);
        let mut consumed_next = false;
        match &link.op {
            ChainOp::Index(expr) => {
                let index = unwrap(expr.eval(scope)?, scope)?;
                value = match value {
                    Value::Dict(dict) => {
                        // Numeric dict indexes are stringified
                        let key = match index {
                            Value::Number(n) => format_number(n),
                            Value::Str(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                            other => {
                                return Err(RuntimeError::type_error(
                                    scope,
                                    scope.site(&link.position),
                                    format!(
                                        "dictionaries can only be accessed by string: got '{}' of type {}",
                                        other,
                                        other.type_name()
                                    ),
                                )
                                .into())
                            }
                        };
                        let slot = dict
                            .borrow_mut()
                            .entry(key)
                            .or_insert_with(|| Value::slot(Value::Undefined))
                            .clone();
                        Value::Reference(slot)
                    }
                    Value::List(list) => {
                        let number = match index {
                            Value::Number(n) => n,
                            other => {
                                return Err(RuntimeError::type_error(
                                    scope,
                                    scope.site(&link.position),
                                    format!(
                                        "lists can only be accessed by number: got '{}' of type {}",
                                        other,
                                        other.type_name()
                                    ),
                                )
                                .into())
                            }
                        };
                        let index = number.trunc() as i64;
                        let items = list.borrow();
                        if index < 0 || index as usize >= items.len() {
                            return Err(RuntimeError::index(
                                scope,
                                scope.site(&expr.position),
                                format!("list index out of bounds: {index}"),
                            )
                            .into());
                        }
                        Value::Reference(items[index as usize].clone())
                    }
                    Value::Str(bytes) => {
                        let number = match index {
                            Value::Number(n) => n,
                            other => {
                                return Err(RuntimeError::type_error(
                                    scope,
                                    scope.site(&link.position),
                                    format!(
                                        "strings can only be accessed by number: got '{}' of type {}",
                                        other,
                                        other.type_name()
                                    ),
                                )
                                .into())
                            }
                        };
                        let index = number.trunc() as i64;
                        if index < 0 || index as usize >= bytes.len() {
                            return Err(RuntimeError::index(
                                scope,
                                scope.site(&expr.position),
                                format!("string index out of bounds: {index}"),
                            )
                            .into());
                        }
                        // Strings are value-like: the single-byte result
                        // lives in a fresh slot, so writing through it does
                        // not mutate the source string
                        Value::Reference(Value::slot(Value::string(vec![
                            bytes[index as usize],
                        ])))
                    }
                    other => {
                        return Err(RuntimeError::type_error(
                            scope,
                            scope.site(&link.position),
                            format!(
                                "only lists, dicts, and strings can be indexed, found: {}",
                                other.type_name()
                            ),
                        )
                        .into())
                    }
                };
            }
            ChainOp::Property(name) => {
                value = match value {
                    Value::Dict(dict) => {
                        let slot = dict
                            .borrow_mut()
                            .entry(name.value.clone())
                            .or_insert_with(|| Value::slot(Value::Undefined))
                            .clone();
                        Value::Reference(slot)
                    }
                    Value::List(list) => {
                        // List properties are method calls: the next link
                        // must be an argument tuple, and the list rides
                        // along as the implicit first argument
                        let args_link = link.next.as_deref().and_then(|next| match &next.op {
                            ChainOp::Args(exprs) => Some((next, exprs)),
                            _ => None,
                        });
                        match args_link {
                            Some((next, exprs)) => {
                                let mut args = eval_exprs(scope, exprs)?;
                                args.insert(0, Value::List(list));
                                let position = scope.site(&link.position);
                                let result = match name.value.as_str() {
                                    "append" => runtime::do_append(scope, &position, args)?,
                                    "prepend" => runtime::do_prepend(scope, &position, args)?,
                                    "pop" => runtime::do_pop(scope, &position, args)?,
                                    "prepop" => runtime::do_prepop(scope, &position, args)?,
                                    "popat" => runtime::do_popat(scope, &position, args)?,
                                    other => {
                                        return Err(RuntimeError::type_error(
                                            scope,
                                            scope.site(&next.position),
                                            format!("unknown list function: {other}"),
                                        )
                                        .into())
                                    }
                                };
                                // The argument tuple was just consumed
                                consumed_next = true;
                                result
                            }
                            None => {
                                return Err(RuntimeError::type_error(
                                    scope,
                                    scope.site(&link.position),
                                    format!("unknown list property: {}", name.value),
                                )
                                .into())
                            }
                        }
                    }
                    other => {
                        return Err(RuntimeError::type_error(
                            scope,
                            scope.site(&link.position),
                            format!(
                                "can't access property '{}' of {}",
                                name.value,
                                other.type_name()
                            ),
                        )
                        .into())
                    }
                };
            }
            ChainOp::Args(exprs) => {
                let args = eval_exprs(scope, exprs)?;
                let position = scope.site(&link.position);
                value = match &value {
                    Value::Function(function) => function.exec(&position, args)?,
                    Value::Native(native) => (native.exec)(scope, &position, args)?,
                    _ => {
                        return Err(RuntimeError::type_error(
                            scope,
                            position,
                            "only functions can be called",
                        )
                        .into())
                    }
                };
            }
        }
        current = if consumed_next {
            link.next.as_deref().and_then(|next| next.next.as_deref())
        } else {
            link.next.as_deref()
        };
    }
    Ok(value)
}
