use riddle::ast::{
    Addition, ChainOp, DictKey, Primary, Program, Statement, Unary,
};
use riddle::lexer::Token;
use riddle::parser::{parse, ParseState};

fn parse_source(input: &str) -> Program {
    let tokens = Token::scan(input).expect("lexing failed");
    let mut state = ParseState::new(tokens);
    match parse(&mut state) {
        Ok(program) => program,
        Err(error) => panic!("parsing failed: {error}"),
    }
}

fn parse_error(input: &str) -> String {
    let tokens = Token::scan(input).expect("lexing failed");
    let mut state = ParseState::new(tokens);
    match parse(&mut state) {
        Ok(_) => panic!("expected a parse error"),
        Err(error) => error.to_string(),
    }
}

/// Dig the Addition level out of a lone expression statement.
fn addition_of(program: &Program) -> &Addition {
    let Statement::Expr(statement) = &program.statements[0] else {
        panic!("expected expression statement");
    };
    &statement.expr.assignment.target.left.left.left.left
}

fn primary_of(program: &Program) -> &Primary {
    let addition = addition_of(program);
    match &addition.left.left {
        Unary::Primary(primary) => primary,
        Unary::Op { .. } => panic!("expected a primary, found unary op"),
    }
}

#[test]
fn parse_empty_program() {
    let program = parse_source("");
    assert!(program.statements.is_empty());
}

#[test]
fn parse_expression_statement_requires_semicolon() {
    parse_error("1 + 2");
}

#[test]
fn parse_number_literal() {
    let program = parse_source("3.5;");
    if let Primary::Number(literal) = primary_of(&program) {
        assert_eq!(literal.value, 3.5);
    } else {
        panic!("expected number literal");
    }
}

#[test]
fn parse_string_literal_keeps_quotes() {
    let program = parse_source(r#""hi";"#);
    if let Primary::Str(literal) = primary_of(&program) {
        assert_eq!(literal.value, r#""hi""#);
    } else {
        panic!("expected string literal");
    }
}

#[test]
fn parse_bare_identifier() {
    let program = parse_source("x;");
    if let Primary::Ident(ident) = primary_of(&program) {
        assert_eq!(ident.value, "x");
    } else {
        panic!("expected identifier");
    }
}

#[test]
fn parse_identifier_with_args_is_a_call() {
    let program = parse_source("x();");
    let Primary::Call(call) = primary_of(&program) else {
        panic!("expected call");
    };
    assert_eq!(call.ident.value, "x");
    assert!(matches!(&call.chain.op, ChainOp::Args(args) if args.is_empty()));
    assert!(call.chain.next.is_none());
}

#[test]
fn parse_multiplication_binds_tighter_than_addition() {
    let program = parse_source("1 + 2 * 3;");
    let addition = addition_of(&program);
    // Left side of the '+' is the lone multiplication operand 1
    assert!(addition.left.rest.is_none());
    let (_, next) = addition.rest.as_ref().expect("expected '+' tail");
    // Right side carries 2 * 3
    assert!(next.left.rest.is_some());
}

#[test]
fn parse_chained_operators_nest_to_the_right() {
    let program = parse_source("1 - 2 - 3;");
    let addition = addition_of(&program);
    let (_, next) = addition.rest.as_ref().expect("expected '-' tail");
    assert!(next.rest.is_some());
}

#[test]
fn parse_call_chain_links() {
    let program = parse_source("f(1)[0].x;");
    let Primary::Call(call) = primary_of(&program) else {
        panic!("expected call");
    };
    assert!(matches!(&call.chain.op, ChainOp::Args(args) if args.len() == 1));
    let second = call.chain.next.as_deref().expect("expected index link");
    assert!(matches!(&second.op, ChainOp::Index(_)));
    let third = second.next.as_deref().expect("expected property link");
    assert!(matches!(&third.op, ChainOp::Property(p) if p.value == "x"));
    assert!(third.next.is_none());
}

#[test]
fn parse_subexpression_with_chain() {
    let program = parse_source("(f)(1);");
    let Primary::SubExpression(sub) = primary_of(&program) else {
        panic!("expected subexpression");
    };
    let chain = sub.chain.as_ref().expect("expected chain");
    assert!(matches!(&chain.op, ChainOp::Args(args) if args.len() == 1));
}

#[test]
fn parse_func_literal() {
    let program = parse_source("let f = func (a, b) { return a };");
    let Statement::Expr(statement) = &program.statements[0] else {
        panic!("expected expression statement");
    };
    let assignment = &statement.expr.assignment;
    assert!(assignment.is_let);
    assert!(assignment.value.is_some());
}

#[test]
fn parse_list_literal() {
    let program = parse_source("[1, 2, 3];");
    let Primary::List(list) = primary_of(&program) else {
        panic!("expected list literal");
    };
    assert_eq!(list.items.len(), 3);
}

#[test]
fn parse_dict_key_forms() {
    let program = parse_source("{'a': 1, k: 2};");
    let Primary::Dict(dict) = primary_of(&program) else {
        panic!("expected dict literal");
    };
    assert_eq!(dict.entries.len(), 2);
    assert!(matches!(&dict.entries[0].key, DictKey::Literal(i) if i.value == "a"));
    assert!(matches!(&dict.entries[1].key, DictKey::Expr(_)));
}

#[test]
fn parse_if_else() {
    let program = parse_source("if (true) { 1; } else { 2; }");
    let Statement::If(statement) = &program.statements[0] else {
        panic!("expected if statement");
    };
    assert_eq!(statement.then_block.len(), 1);
    assert_eq!(statement.else_block.as_ref().unwrap().len(), 1);
}

#[test]
fn parse_for_with_empty_header() {
    let program = parse_source("for (;;) { break }");
    let Statement::For(statement) = &program.statements[0] else {
        panic!("expected for statement");
    };
    assert!(statement.init.is_none());
    assert!(statement.condition.is_none());
    assert!(statement.post.is_none());
    assert_eq!(statement.block.len(), 1);
}

#[test]
fn parse_for_with_full_header() {
    let program = parse_source("for (let i = 0; i < 10; i = i + 1) {}");
    let Statement::For(statement) = &program.statements[0] else {
        panic!("expected for statement");
    };
    assert!(statement.init.is_some());
    assert!(statement.condition.is_some());
    assert!(statement.post.is_some());
}

#[test]
fn parse_while_without_condition() {
    let program = parse_source("while () { break }");
    let Statement::While(statement) = &program.statements[0] else {
        panic!("expected while statement");
    };
    assert!(statement.condition.is_none());
}

#[test]
fn parse_return_with_and_without_expression() {
    let program = parse_source("(func () { return })();");
    // Statements other than expression statements take no semicolon, so a
    // bare top-level return is also fine
    let program2 = parse_source("return 1 + 2");
    assert_eq!(program.statements.len(), 1);
    let Statement::Return(statement) = &program2.statements[0] else {
        panic!("expected return statement");
    };
    assert!(statement.expr.is_some());
}

#[test]
fn parse_unclosed_paren_fails() {
    let message = parse_error("(1 + 2;");
    assert!(message.contains("wanted"), "got: {message}");
}

#[test]
fn parse_error_reports_the_deepest_failure() {
    // The failure is at the missing ')' after the condition, not at 'if'
    let message = parse_error("if (true { 1; }");
    assert!(message.contains("')'"), "got: {message}");
}
