//! Lexer for placeholder bodies using logos

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token {
    #[token(".")]
    Dot,
    #[token(";")]
    Semicolon,
    #[token("|")]
    Pipe,
    #[token("=")]
    Equals,
    #[token(":")]
    Colon,

    // Whitespace is significant inside literals and formatter params
    #[regex(r"[ \t\r\n]+", |lex| lex.slice().to_string())]
    Space(String),

    #[regex(r"[^.;|=: \t\r\n]+", |lex| lex.slice().to_string())]
    Word(String),
}

/// Lex a placeholder body into tokens with spans
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    Token::lexer(input)
        .spanned()
        .filter_map(|(tok, span)| tok.ok().map(|t| (t, span)))
}
