use crate::ast::{
    Addition, AdditionOp, Assignment, BoolLiteral, BreakStatement, Call, CallChain, ChainOp,
    Comparison, ComparisonOp, ContinueStatement, DictEntry, DictKey, DictLiteral, Equality,
    EqualityOp, Expr, ExprStatement, ForStatement, FuncLiteral, Ident, IfStatement, ListLiteral,
    LogicAnd, LogicOr, Multiplication, MultiplicationOp, NumberLiteral, Primary, Program,
    ReturnStatement, Statement, StringLiteral, SubExpression, Unary, UnaryOp, UndefinedLiteral,
    WhileStatement,
};
use crate::lexer::Token;

use super::{ParseError, ParseResult, ParseState};

/// Consume a token matching `predicate`, or fail with an error that names
/// what the grammar wanted. Failures feed the deepest-failure tracking.
fn expect(
    state: &mut ParseState,
    predicate: fn(&Token) -> bool,
    what: &str,
) -> ParseResult<Token> {
    match state.peek() {
        Some(token) if predicate(token) => Ok(state.take().unwrap()),
        Some(token) => {
            let error = ParseError::wanting(what).but_found(token);
            state.remember(error.clone());
            Err(error)
        }
        None => {
            let error = ParseError::wanting(what).but_found_end();
            state.remember(error.clone());
            Err(error)
        }
    }
}

fn ident(state: &mut ParseState) -> ParseResult<Ident> {
    let token = expect(state, |t| matches!(t, Token::Ident(_)), "identifier")?;
    match token {
        Token::Ident(inner) => Ok(Ident {
            value: inner.value,
            position: inner.position,
        }),
        _ => unreachable!(),
    }
}

/// program := statement*
pub fn parse(state: &mut ParseState) -> ParseResult<Program> {
    let mut statements = Vec::new();
    while !state.at_end() {
        match statement(state) {
            Ok(parsed) => statements.push(parsed),
            Err(error) => {
                // The deepest failure usually says more than the failed
                // top-level alternative.
                let deepest = state.deepest_error().cloned();
                return Err(deepest.unwrap_or(error));
            }
        }
    }
    Ok(Program { statements })
}

/// statement := if | for | while | return | "break" | "continue" | expr ";"
fn statement(state: &mut ParseState) -> ParseResult<Statement> {
    match state.peek() {
        Some(Token::If(_)) => if_statement(state).map(Statement::If),
        Some(Token::For(_)) => for_statement(state).map(Statement::For),
        Some(Token::While(_)) => while_statement(state).map(Statement::While),
        Some(Token::Return(_)) => return_statement(state).map(Statement::Return),
        Some(Token::Break(_)) => {
            let position = state.take().unwrap().pos();
            Ok(Statement::Break(BreakStatement { position }))
        }
        Some(Token::Continue(_)) => {
            let position = state.take().unwrap().pos();
            Ok(Statement::Continue(ContinueStatement { position }))
        }
        _ => {
            let position = state.here();
            let expr = expression(state)?;
            expect(state, |t| matches!(t, Token::Semicolon(_)), "';'")?;
            Ok(Statement::Expr(ExprStatement { expr, position }))
        }
    }
}

/// block := "{" statement* "}"
fn block(state: &mut ParseState) -> ParseResult<Vec<Statement>> {
    expect(state, |t| matches!(t, Token::LBrace(_)), "'{'")?;
    let mut statements = Vec::new();
    loop {
        if matches!(state.peek(), Some(Token::RBrace(_))) {
            state.take();
            return Ok(statements);
        }
        if state.at_end() {
            let error = ParseError::wanting("'}'").but_found_end();
            state.remember(error.clone());
            return Err(error);
        }
        statements.push(statement(state)?);
    }
}

/// if := "if" "(" expr ")" block ("else" block)?
fn if_statement(state: &mut ParseState) -> ParseResult<IfStatement> {
    let position = state.here();
    expect(state, |t| matches!(t, Token::If(_)), "'if'")?;
    expect(state, |t| matches!(t, Token::LParen(_)), "'('")?;
    let condition = expression(state)?;
    expect(state, |t| matches!(t, Token::RParen(_)), "')'")?;
    let then_block = block(state)?;
    let else_block = if matches!(state.peek(), Some(Token::Else(_))) {
        state.take();
        Some(block(state)?)
    } else {
        None
    };
    Ok(IfStatement {
        condition,
        then_block,
        else_block,
        position,
    })
}

/// for := "for" "(" expr? ";" expr? ";" expr? ")" block
fn for_statement(state: &mut ParseState) -> ParseResult<ForStatement> {
    let position = state.here();
    expect(state, |t| matches!(t, Token::For(_)), "'for'")?;
    expect(state, |t| matches!(t, Token::LParen(_)), "'('")?;
    let init = if matches!(state.peek(), Some(Token::Semicolon(_))) {
        None
    } else {
        Some(expression(state)?)
    };
    expect(state, |t| matches!(t, Token::Semicolon(_)), "';'")?;
    let condition = if matches!(state.peek(), Some(Token::Semicolon(_))) {
        None
    } else {
        Some(expression(state)?)
    };
    expect(state, |t| matches!(t, Token::Semicolon(_)), "';'")?;
    let post = if matches!(state.peek(), Some(Token::RParen(_))) {
        None
    } else {
        Some(expression(state)?)
    };
    expect(state, |t| matches!(t, Token::RParen(_)), "')'")?;
    let block = block(state)?;
    Ok(ForStatement {
        init,
        condition,
        post,
        block,
        position,
    })
}

/// while := "while" "(" expr? ")" block
fn while_statement(state: &mut ParseState) -> ParseResult<WhileStatement> {
    let position = state.here();
    expect(state, |t| matches!(t, Token::While(_)), "'while'")?;
    expect(state, |t| matches!(t, Token::LParen(_)), "'('")?;
    let condition = if matches!(state.peek(), Some(Token::RParen(_))) {
        None
    } else {
        Some(expression(state)?)
    };
    expect(state, |t| matches!(t, Token::RParen(_)), "')'")?;
    let block = block(state)?;
    Ok(WhileStatement {
        condition,
        block,
        position,
    })
}

/// return := "return" expr?
///
/// Whether an expression follows is decided by attempting to parse one and
/// rolling back, the same way an optional alternative backtracks.
fn return_statement(state: &mut ParseState) -> ParseResult<ReturnStatement> {
    let position = state.here();
    expect(state, |t| matches!(t, Token::Return(_)), "'return'")?;
    let at = state.checkpoint();
    let expr = match expression(state) {
        Ok(expr) => Some(expr),
        Err(_) => {
            state.rewind(at);
            None
        }
    };
    Ok(ReturnStatement { expr, position })
}

/// expr := assignment
pub fn expression(state: &mut ParseState) -> ParseResult<Expr> {
    let position = state.here();
    let assignment = assignment(state)?;
    Ok(Expr {
        assignment,
        position,
    })
}

/// assignment := "let"? logic_or ("=" logic_or)?
fn assignment(state: &mut ParseState) -> ParseResult<Assignment> {
    let position = state.here();
    let is_let = if matches!(state.peek(), Some(Token::Let(_))) {
        state.take();
        true
    } else {
        false
    };
    let target = logic_or(state)?;
    let value = if matches!(state.peek(), Some(Token::Equals(_))) {
        state.take();
        Some(logic_or(state)?)
    } else {
        None
    };
    Ok(Assignment {
        is_let,
        target,
        value,
        position,
    })
}

/// logic_or := logic_and ("or" logic_or)?
fn logic_or(state: &mut ParseState) -> ParseResult<LogicOr> {
    let position = state.here();
    let left = logic_and(state)?;
    let rest = if matches!(state.peek(), Some(Token::Or(_))) {
        state.take();
        Some(Box::new(logic_or(state)?))
    } else {
        None
    };
    Ok(LogicOr {
        left,
        rest,
        position,
    })
}

/// logic_and := equality ("and" logic_and)?
fn logic_and(state: &mut ParseState) -> ParseResult<LogicAnd> {
    let position = state.here();
    let left = equality(state)?;
    let rest = if matches!(state.peek(), Some(Token::And(_))) {
        state.take();
        Some(Box::new(logic_and(state)?))
    } else {
        None
    };
    Ok(LogicAnd {
        left,
        rest,
        position,
    })
}

/// equality := comparison (("==" | "!=") equality)?
fn equality(state: &mut ParseState) -> ParseResult<Equality> {
    let position = state.here();
    let left = comparison(state)?;
    let op = match state.peek() {
        Some(Token::DoubleEquals(_)) => Some(EqualityOp::Equal),
        Some(Token::NotEquals(_)) => Some(EqualityOp::NotEqual),
        _ => None,
    };
    let rest = match op {
        Some(op) => {
            state.take();
            Some((op, Box::new(equality(state)?)))
        }
        None => None,
    };
    Ok(Equality {
        left,
        rest,
        position,
    })
}

/// comparison := addition ((">" | ">=" | "<" | "<=") comparison)?
fn comparison(state: &mut ParseState) -> ParseResult<Comparison> {
    let position = state.here();
    let left = addition(state)?;
    let op = match state.peek() {
        Some(Token::Less(_)) => Some(ComparisonOp::Less),
        Some(Token::LessEquals(_)) => Some(ComparisonOp::LessEqual),
        Some(Token::Greater(_)) => Some(ComparisonOp::Greater),
        Some(Token::GreaterEquals(_)) => Some(ComparisonOp::GreaterEqual),
        _ => None,
    };
    let rest = match op {
        Some(op) => {
            state.take();
            Some((op, Box::new(comparison(state)?)))
        }
        None => None,
    };
    Ok(Comparison {
        left,
        rest,
        position,
    })
}

/// addition := multiplication (("+" | "-") addition)?
fn addition(state: &mut ParseState) -> ParseResult<Addition> {
    let position = state.here();
    let left = multiplication(state)?;
    let op = match state.peek() {
        Some(Token::Plus(_)) => Some(AdditionOp::Plus),
        Some(Token::Minus(_)) => Some(AdditionOp::Minus),
        _ => None,
    };
    let rest = match op {
        Some(op) => {
            state.take();
            Some((op, Box::new(addition(state)?)))
        }
        None => None,
    };
    Ok(Addition {
        left,
        rest,
        position,
    })
}

/// multiplication := unary (("*" | "/" | "%") multiplication)?
fn multiplication(state: &mut ParseState) -> ParseResult<Multiplication> {
    let position = state.here();
    let left = unary(state)?;
    let op = match state.peek() {
        Some(Token::Star(_)) => Some(MultiplicationOp::Star),
        Some(Token::Slash(_)) => Some(MultiplicationOp::Slash),
        Some(Token::Percent(_)) => Some(MultiplicationOp::Percent),
        _ => None,
    };
    let rest = match op {
        Some(op) => {
            state.take();
            Some((op, Box::new(multiplication(state)?)))
        }
        None => None,
    };
    Ok(Multiplication {
        left,
        rest,
        position,
    })
}

/// unary := ("!" | "-") unary | primary
fn unary(state: &mut ParseState) -> ParseResult<Unary> {
    let op = match state.peek() {
        Some(Token::Bang(_)) => Some(UnaryOp::Bang),
        Some(Token::Minus(_)) => Some(UnaryOp::Minus),
        _ => None,
    };
    match op {
        Some(op) => {
            let position = state.here();
            state.take();
            let operand = Box::new(unary(state)?);
            Ok(Unary::Op {
                op,
                operand,
                position,
            })
        }
        None => Ok(Unary::Primary(primary(state)?)),
    }
}

/// primary := func_literal | list_literal | dict_literal | call
///          | "(" expr ")" call_chain? | number | string
///          | "true" | "false" | "undefined" | ident
fn primary(state: &mut ParseState) -> ParseResult<Primary> {
    match state.peek() {
        Some(Token::Func(_)) => func_literal(state).map(Primary::Func),
        Some(Token::LBracket(_)) => list_literal(state).map(Primary::List),
        Some(Token::LBrace(_)) => dict_literal(state).map(Primary::Dict),
        Some(Token::LParen(_)) => sub_expression(state).map(Primary::SubExpression),
        Some(Token::Number(_)) => {
            let token = state.take().unwrap();
            let Token::Number(inner) = token else {
                unreachable!()
            };
            let value = inner.value.parse::<f64>().map_err(|_| {
                let error = ParseError::message(format!("invalid number literal '{}'", inner.value))
                    .located(inner.position.clone());
                state.remember(error.clone());
                error
            })?;
            Ok(Primary::Number(NumberLiteral {
                value,
                position: inner.position,
            }))
        }
        Some(Token::StringLiteral(_)) => {
            let token = state.take().unwrap();
            let Token::StringLiteral(inner) = token else {
                unreachable!()
            };
            Ok(Primary::Str(StringLiteral {
                value: inner.value,
                position: inner.position,
            }))
        }
        Some(Token::True(_)) => {
            let position = state.take().unwrap().pos();
            Ok(Primary::Bool(BoolLiteral {
                value: true,
                position,
            }))
        }
        Some(Token::False(_)) => {
            let position = state.take().unwrap().pos();
            Ok(Primary::Bool(BoolLiteral {
                value: false,
                position,
            }))
        }
        Some(Token::Undefined(_)) => {
            let position = state.take().unwrap().pos();
            Ok(Primary::Undefined(UndefinedLiteral { position }))
        }
        Some(Token::Ident(_)) => {
            let name = ident(state)?;
            // A postfix operator turns a bare identifier into a call chain.
            if chain_starts(state) {
                let position = name.position.clone();
                let chain = call_chain(state)?;
                Ok(Primary::Call(Call {
                    ident: name,
                    chain,
                    position,
                }))
            } else {
                Ok(Primary::Ident(name))
            }
        }
        Some(token) => {
            let error = ParseError::wanting("expression").but_found(token);
            state.remember(error.clone());
            Err(error)
        }
        None => {
            let error = ParseError::wanting("expression").but_found_end();
            state.remember(error.clone());
            Err(error)
        }
    }
}

fn chain_starts(state: &ParseState) -> bool {
    matches!(
        state.peek(),
        Some(Token::LParen(_)) | Some(Token::LBracket(_)) | Some(Token::Dot(_))
    )
}

/// sub_expression := "(" expr ")" call_chain?
fn sub_expression(state: &mut ParseState) -> ParseResult<SubExpression> {
    let position = state.here();
    expect(state, |t| matches!(t, Token::LParen(_)), "'('")?;
    let expr = Box::new(expression(state)?);
    expect(state, |t| matches!(t, Token::RParen(_)), "')'")?;
    let chain = if chain_starts(state) {
        Some(call_chain(state)?)
    } else {
        None
    };
    Ok(SubExpression {
        expr,
        chain,
        position,
    })
}

/// call_chain := ("(" (expr ("," expr)*)? ")" | "[" expr "]" | "." ident) call_chain?
fn call_chain(state: &mut ParseState) -> ParseResult<CallChain> {
    let position = state.here();
    let op = match state.peek() {
        Some(Token::LParen(_)) => {
            state.take();
            let args = if matches!(state.peek(), Some(Token::RParen(_))) {
                vec![]
            } else {
                call_args(state)?
            };
            expect(state, |t| matches!(t, Token::RParen(_)), "')'")?;
            ChainOp::Args(args)
        }
        Some(Token::LBracket(_)) => {
            state.take();
            let index = Box::new(expression(state)?);
            expect(state, |t| matches!(t, Token::RBracket(_)), "']'")?;
            ChainOp::Index(index)
        }
        Some(Token::Dot(_)) => {
            state.take();
            ChainOp::Property(ident(state)?)
        }
        _ => unreachable!("call_chain entered without a postfix token"),
    };
    let next = if chain_starts(state) {
        Some(Box::new(call_chain(state)?))
    } else {
        None
    };
    Ok(CallChain { op, next, position })
}

/// call_args := expr ("," expr)*
fn call_args(state: &mut ParseState) -> ParseResult<Vec<Expr>> {
    let mut args = vec![expression(state)?];
    while matches!(state.peek(), Some(Token::Comma(_))) {
        state.take();
        args.push(expression(state)?);
    }
    Ok(args)
}

/// func_literal := "func" "(" (ident ("," ident)*)? ")" block
fn func_literal(state: &mut ParseState) -> ParseResult<FuncLiteral> {
    let position = state.here();
    expect(state, |t| matches!(t, Token::Func(_)), "'func'")?;
    expect(state, |t| matches!(t, Token::LParen(_)), "'('")?;
    let mut params = Vec::new();
    if matches!(state.peek(), Some(Token::Ident(_))) {
        params.push(ident(state)?);
        while matches!(state.peek(), Some(Token::Comma(_))) {
            state.take();
            params.push(ident(state)?);
        }
    }
    expect(state, |t| matches!(t, Token::RParen(_)), "')'")?;
    let block = block(state)?;
    Ok(FuncLiteral {
        params,
        block,
        position,
    })
}

/// list_literal := "[" (expr ("," expr)*)? "]"
fn list_literal(state: &mut ParseState) -> ParseResult<ListLiteral> {
    let position = state.here();
    expect(state, |t| matches!(t, Token::LBracket(_)), "'['")?;
    let mut items = Vec::new();
    if !matches!(state.peek(), Some(Token::RBracket(_))) {
        items.push(expression(state)?);
        while matches!(state.peek(), Some(Token::Comma(_))) {
            state.take();
            items.push(expression(state)?);
        }
    }
    expect(state, |t| matches!(t, Token::RBracket(_)), "']'")?;
    Ok(ListLiteral { items, position })
}

/// dict_literal := "{" (dict_entry ("," dict_entry)*)? "}"
fn dict_literal(state: &mut ParseState) -> ParseResult<DictLiteral> {
    let position = state.here();
    expect(state, |t| matches!(t, Token::LBrace(_)), "'{'")?;
    let mut entries = Vec::new();
    if !matches!(state.peek(), Some(Token::RBrace(_))) {
        entries.push(dict_entry(state)?);
        while matches!(state.peek(), Some(Token::Comma(_))) {
            state.take();
            entries.push(dict_entry(state)?);
        }
    }
    expect(state, |t| matches!(t, Token::RBrace(_)), "'}'")?;
    Ok(DictLiteral { entries, position })
}

/// dict_entry := (expr | "'" ident "'") ":" expr
fn dict_entry(state: &mut ParseState) -> ParseResult<DictEntry> {
    let position = state.here();
    let key = if matches!(state.peek(), Some(Token::SingleQuote(_))) {
        state.take();
        let name = ident(state)?;
        expect(state, |t| matches!(t, Token::SingleQuote(_)), "'''")?;
        DictKey::Literal(name)
    } else {
        DictKey::Expr(Box::new(expression(state)?))
    };
    expect(state, |t| matches!(t, Token::Colon(_)), "':'")?;
    let value = expression(state)?;
    Ok(DictEntry {
        key,
        value,
        position,
    })
}
