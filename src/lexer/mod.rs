use lachs::Span;

use crate::parser::ParseError;

#[lachs::token]
pub enum Token {
    #[terminal("if")]
    If,
    #[terminal("else")]
    Else,
    #[terminal("for")]
    For,
    #[terminal("while")]
    While,
    #[terminal("return")]
    Return,
    #[terminal("break")]
    Break,
    #[terminal("continue")]
    Continue,
    #[terminal("let")]
    Let,
    #[terminal("func")]
    Func,
    #[terminal("true")]
    True,
    #[terminal("false")]
    False,
    #[terminal("undefined")]
    Undefined,
    #[terminal("and")]
    And,
    #[terminal("or")]
    Or,
    #[literal("//[^\n]*")]
    LineComment,
    #[literal(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,
    #[literal(r"([0-9]*\.)?[0-9]+")]
    Number,
    #[literal(r#""[^"]*""#)]
    StringLiteral,
    #[literal("[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
    #[terminal("==")]
    DoubleEquals,
    #[terminal("!=")]
    NotEquals,
    #[terminal("<=")]
    LessEquals,
    #[terminal(">=")]
    GreaterEquals,
    #[terminal("=")]
    Equals,
    #[terminal("<")]
    Less,
    #[terminal(">")]
    Greater,
    #[terminal("+")]
    Plus,
    #[terminal("-")]
    Minus,
    #[terminal("*")]
    Star,
    #[terminal("/")]
    Slash,
    #[terminal("%")]
    Percent,
    #[terminal("!")]
    Bang,
    #[terminal("(")]
    LParen,
    #[terminal(")")]
    RParen,
    #[terminal("[")]
    LBracket,
    #[terminal("]")]
    RBracket,
    #[terminal("{")]
    LBrace,
    #[terminal("}")]
    RBrace,
    #[terminal(",")]
    Comma,
    #[terminal(";")]
    Semicolon,
    #[terminal(":")]
    Colon,
    #[terminal(".")]
    Dot,
    #[terminal("'")]
    SingleQuote,
}

impl Token {
    /// Tokenize a source string, dropping comment trivia.
    ///
    /// Comments are ordinary tokens as far as the generated lexer is
    /// concerned; the parser never wants to see them.
    pub fn scan(source: &str) -> Result<Vec<Token>, ParseError> {
        let mut tokens =
            Token::lex(source).map_err(|error| ParseError::message(error.to_string()))?;
        tokens.retain(|token| {
            !matches!(token, Token::LineComment(_) | Token::BlockComment(_))
        });
        Ok(tokens)
    }

    pub fn pos(&self) -> Span {
        match self {
            Token::If(inner) => inner.position.clone(),
            Token::Else(inner) => inner.position.clone(),
            Token::For(inner) => inner.position.clone(),
            Token::While(inner) => inner.position.clone(),
            Token::Return(inner) => inner.position.clone(),
            Token::Break(inner) => inner.position.clone(),
            Token::Continue(inner) => inner.position.clone(),
            Token::Let(inner) => inner.position.clone(),
            Token::Func(inner) => inner.position.clone(),
            Token::True(inner) => inner.position.clone(),
            Token::False(inner) => inner.position.clone(),
            Token::Undefined(inner) => inner.position.clone(),
            Token::And(inner) => inner.position.clone(),
            Token::Or(inner) => inner.position.clone(),
            Token::LineComment(inner) => inner.position.clone(),
            Token::BlockComment(inner) => inner.position.clone(),
            Token::Number(inner) => inner.position.clone(),
            Token::StringLiteral(inner) => inner.position.clone(),
            Token::Ident(inner) => inner.position.clone(),
            Token::DoubleEquals(inner) => inner.position.clone(),
            Token::NotEquals(inner) => inner.position.clone(),
            Token::LessEquals(inner) => inner.position.clone(),
            Token::GreaterEquals(inner) => inner.position.clone(),
            Token::Equals(inner) => inner.position.clone(),
            Token::Less(inner) => inner.position.clone(),
            Token::Greater(inner) => inner.position.clone(),
            Token::Plus(inner) => inner.position.clone(),
            Token::Minus(inner) => inner.position.clone(),
            Token::Star(inner) => inner.position.clone(),
            Token::Slash(inner) => inner.position.clone(),
            Token::Percent(inner) => inner.position.clone(),
            Token::Bang(inner) => inner.position.clone(),
            Token::LParen(inner) => inner.position.clone(),
            Token::RParen(inner) => inner.position.clone(),
            Token::LBracket(inner) => inner.position.clone(),
            Token::RBracket(inner) => inner.position.clone(),
            Token::LBrace(inner) => inner.position.clone(),
            Token::RBrace(inner) => inner.position.clone(),
            Token::Comma(inner) => inner.position.clone(),
            Token::Semicolon(inner) => inner.position.clone(),
            Token::Colon(inner) => inner.position.clone(),
            Token::Dot(inner) => inner.position.clone(),
            Token::SingleQuote(inner) => inner.position.clone(),
        }
    }

    /// Returns a human-readable description of the token
    pub fn describe(&self) -> String {
        match self {
            Token::If(_) => "'if'".to_string(),
            Token::Else(_) => "'else'".to_string(),
            Token::For(_) => "'for'".to_string(),
            Token::While(_) => "'while'".to_string(),
            Token::Return(_) => "'return'".to_string(),
            Token::Break(_) => "'break'".to_string(),
            Token::Continue(_) => "'continue'".to_string(),
            Token::Let(_) => "'let'".to_string(),
            Token::Func(_) => "'func'".to_string(),
            Token::True(_) => "'true'".to_string(),
            Token::False(_) => "'false'".to_string(),
            Token::Undefined(_) => "'undefined'".to_string(),
            Token::And(_) => "'and'".to_string(),
            Token::Or(_) => "'or'".to_string(),
            Token::LineComment(_) => "comment".to_string(),
            Token::BlockComment(_) => "comment".to_string(),
            Token::Number(inner) => format!("number '{}'", inner.value),
            Token::StringLiteral(inner) => format!("string {}", inner.value),
            Token::Ident(inner) => format!("identifier '{}'", inner.value),
            Token::DoubleEquals(_) => "'=='".to_string(),
            Token::NotEquals(_) => "'!='".to_string(),
            Token::LessEquals(_) => "'<='".to_string(),
            Token::GreaterEquals(_) => "'>='".to_string(),
            Token::Equals(_) => "'='".to_string(),
            Token::Less(_) => "'<'".to_string(),
            Token::Greater(_) => "'>'".to_string(),
            Token::Plus(_) => "'+'".to_string(),
            Token::Minus(_) => "'-'".to_string(),
            Token::Star(_) => "'*'".to_string(),
            Token::Slash(_) => "'/'".to_string(),
            Token::Percent(_) => "'%'".to_string(),
            Token::Bang(_) => "'!'".to_string(),
            Token::LParen(_) => "'('".to_string(),
            Token::RParen(_) => "')'".to_string(),
            Token::LBracket(_) => "'['".to_string(),
            Token::RBracket(_) => "']'".to_string(),
            Token::LBrace(_) => "'{'".to_string(),
            Token::RBrace(_) => "'}'".to_string(),
            Token::Comma(_) => "','".to_string(),
            Token::Semicolon(_) => "';'".to_string(),
            Token::Colon(_) => "':'".to_string(),
            Token::Dot(_) => "'.'".to_string(),
            Token::SingleQuote(_) => "'''".to_string(),
        }
    }
}
