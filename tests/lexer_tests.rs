use riddle::lexer::Token;

#[test]
fn lex_keywords() {
    let tokens = Token::scan("if else for while return break continue let func").unwrap();
    assert_eq!(tokens.len(), 9);
    assert!(matches!(tokens[0], Token::If(_)));
    assert!(matches!(tokens[1], Token::Else(_)));
    assert!(matches!(tokens[2], Token::For(_)));
    assert!(matches!(tokens[3], Token::While(_)));
    assert!(matches!(tokens[4], Token::Return(_)));
    assert!(matches!(tokens[5], Token::Break(_)));
    assert!(matches!(tokens[6], Token::Continue(_)));
    assert!(matches!(tokens[7], Token::Let(_)));
    assert!(matches!(tokens[8], Token::Func(_)));
}

#[test]
fn lex_literal_keywords() {
    let tokens = Token::scan("true false undefined and or").unwrap();
    assert_eq!(tokens.len(), 5);
    assert!(matches!(tokens[0], Token::True(_)));
    assert!(matches!(tokens[1], Token::False(_)));
    assert!(matches!(tokens[2], Token::Undefined(_)));
    assert!(matches!(tokens[3], Token::And(_)));
    assert!(matches!(tokens[4], Token::Or(_)));
}

#[test]
fn lex_identifiers() {
    let tokens = Token::scan("foo _bar baz42").unwrap();
    assert_eq!(tokens.len(), 3);
    assert!(matches!(&tokens[0], Token::Ident(i) if i.value == "foo"));
    assert!(matches!(&tokens[1], Token::Ident(i) if i.value == "_bar"));
    assert!(matches!(&tokens[2], Token::Ident(i) if i.value == "baz42"));
}

#[test]
fn lex_keyword_prefixed_identifiers() {
    // Longest match keeps these whole instead of splitting a keyword off
    let tokens = Token::scan("iffy forks lettuce andor").unwrap();
    assert_eq!(tokens.len(), 4);
    assert!(matches!(&tokens[0], Token::Ident(i) if i.value == "iffy"));
    assert!(matches!(&tokens[1], Token::Ident(i) if i.value == "forks"));
    assert!(matches!(&tokens[2], Token::Ident(i) if i.value == "lettuce"));
    assert!(matches!(&tokens[3], Token::Ident(i) if i.value == "andor"));
}

#[test]
fn lex_numbers() {
    let tokens = Token::scan("42 3.14 .5 0").unwrap();
    assert_eq!(tokens.len(), 4);
    assert!(matches!(&tokens[0], Token::Number(n) if n.value == "42"));
    assert!(matches!(&tokens[1], Token::Number(n) if n.value == "3.14"));
    assert!(matches!(&tokens[2], Token::Number(n) if n.value == ".5"));
    assert!(matches!(&tokens[3], Token::Number(n) if n.value == "0"));
}

#[test]
fn lex_strings_keep_their_quotes() {
    let tokens = Token::scan(r#""hello" "" "a b""#).unwrap();
    assert_eq!(tokens.len(), 3);
    assert!(matches!(&tokens[0], Token::StringLiteral(s) if s.value == r#""hello""#));
    assert!(matches!(&tokens[1], Token::StringLiteral(s) if s.value == r#""""#));
    assert!(matches!(&tokens[2], Token::StringLiteral(s) if s.value == r#""a b""#));
}

#[test]
fn lex_multi_char_operators() {
    let tokens = Token::scan("== != <= >= = < >").unwrap();
    assert_eq!(tokens.len(), 7);
    assert!(matches!(tokens[0], Token::DoubleEquals(_)));
    assert!(matches!(tokens[1], Token::NotEquals(_)));
    assert!(matches!(tokens[2], Token::LessEquals(_)));
    assert!(matches!(tokens[3], Token::GreaterEquals(_)));
    assert!(matches!(tokens[4], Token::Equals(_)));
    assert!(matches!(tokens[5], Token::Less(_)));
    assert!(matches!(tokens[6], Token::Greater(_)));
}

#[test]
fn lex_punctuation() {
    let tokens = Token::scan("( ) [ ] { } , ; : . ' + - * / % !").unwrap();
    assert_eq!(tokens.len(), 17);
    assert!(matches!(tokens[0], Token::LParen(_)));
    assert!(matches!(tokens[1], Token::RParen(_)));
    assert!(matches!(tokens[2], Token::LBracket(_)));
    assert!(matches!(tokens[3], Token::RBracket(_)));
    assert!(matches!(tokens[4], Token::LBrace(_)));
    assert!(matches!(tokens[5], Token::RBrace(_)));
    assert!(matches!(tokens[6], Token::Comma(_)));
    assert!(matches!(tokens[7], Token::Semicolon(_)));
    assert!(matches!(tokens[8], Token::Colon(_)));
    assert!(matches!(tokens[9], Token::Dot(_)));
    assert!(matches!(tokens[10], Token::SingleQuote(_)));
    assert!(matches!(tokens[11], Token::Plus(_)));
    assert!(matches!(tokens[12], Token::Minus(_)));
    assert!(matches!(tokens[13], Token::Star(_)));
    assert!(matches!(tokens[14], Token::Slash(_)));
    assert!(matches!(tokens[15], Token::Percent(_)));
    assert!(matches!(tokens[16], Token::Bang(_)));
}

#[test]
fn lex_line_comments_are_dropped() {
    let tokens = Token::scan("1 // a comment\n2").unwrap();
    assert_eq!(tokens.len(), 2);
    assert!(matches!(&tokens[0], Token::Number(n) if n.value == "1"));
    assert!(matches!(&tokens[1], Token::Number(n) if n.value == "2"));
}

#[test]
fn lex_block_comments_are_dropped() {
    let tokens = Token::scan("1 /* not * a / token */ 2").unwrap();
    assert_eq!(tokens.len(), 2);
    assert!(matches!(&tokens[0], Token::Number(n) if n.value == "1"));
    assert!(matches!(&tokens[1], Token::Number(n) if n.value == "2"));
}

#[test]
fn lex_call_chain_snippet() {
    let tokens = Token::scan("l.append(1);").unwrap();
    assert_eq!(tokens.len(), 7);
    assert!(matches!(&tokens[0], Token::Ident(i) if i.value == "l"));
    assert!(matches!(tokens[1], Token::Dot(_)));
    assert!(matches!(&tokens[2], Token::Ident(i) if i.value == "append"));
    assert!(matches!(tokens[3], Token::LParen(_)));
    assert!(matches!(&tokens[4], Token::Number(n) if n.value == "1"));
    assert!(matches!(tokens[5], Token::RParen(_)));
    assert!(matches!(tokens[6], Token::Semicolon(_)));
}
