//! Placeholder body parser using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::error::ParseError;
use crate::expression::ast::*;
use crate::expression::lexer::Token;

/// Parse the text between `{{` and `}}`
///
/// Error spans are relative to `input`.
pub fn parse_placeholder(input: &str) -> Result<Placeholder, Vec<ParseError>> {
    let len = input.len();

    let token_iter = crate::expression::lexer::lex(input).map(|(tok, span)| (tok, span.into()));

    let token_stream = Stream::from_iter(token_iter)
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    placeholder_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

fn placeholder_parser<'a, I>() -> impl Parser<'a, I, Placeholder, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let space = select! { Token::Space(_) => () }.repeated();

    let path = select! { Token::Word(w) => w }
        .separated_by(just(Token::Dot))
        .at_least(1)
        .collect::<Vec<String>>()
        .map(DataPath::new)
        .padded_by(space.clone());

    // Free text: everything except the formatter pipe
    let text_piece = select! {
        Token::Word(w) => w,
        Token::Space(s) => s,
        Token::Dot => ".".to_string(),
        Token::Colon => ":".to_string(),
        Token::Equals => "=".to_string(),
        Token::Semicolon => ";".to_string(),
    };

    let literal = text_piece
        .clone()
        .repeated()
        .collect::<Vec<String>>()
        .map(|parts| parts.concat().trim().to_string());

    let condition = path
        .clone()
        .then_ignore(just(Token::Equals).or(just(Token::Colon)))
        .then(literal)
        .map(|(property, literal)| Condition { property, literal });

    let conditional = path
        .clone()
        .then_ignore(just(Token::Semicolon))
        .then(path.clone())
        .then_ignore(just(Token::Semicolon))
        .then(condition)
        .map(|((array, result), condition)| {
            Lookup::Conditional(ConditionalLookup {
                array,
                result,
                condition,
            })
        });

    // Conditional first: both start with a path
    let lookup = choice((conditional, path.map(Lookup::Path)));

    let formatter = just(Token::Pipe)
        .ignore_then(
            text_piece
                .repeated()
                .at_least(1)
                .collect::<Vec<String>>(),
        )
        .try_map(|parts, span| {
            let spec = parts.concat().trim().to_string();
            if spec.is_empty() {
                Err(Rich::custom(span, "empty formatter name"))
            } else {
                Ok(spec)
            }
        });

    lookup
        .then(formatter.or_not())
        .then_ignore(end())
        .map(|(lookup, formatter)| Placeholder { lookup, formatter })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> DataPath {
        DataPath::parse(s)
    }

    #[test]
    fn test_simple_path() {
        let p = parse_placeholder("venta.total").expect("Should parse");
        assert_eq!(p.lookup, Lookup::Path(path("venta.total")));
        assert_eq!(p.formatter, None);
    }

    #[test]
    fn test_padded_path_with_formatter() {
        let p = parse_placeholder("  venta.total | currency:usd ").expect("Should parse");
        assert_eq!(p.lookup, Lookup::Path(path("venta.total")));
        assert_eq!(p.formatter.as_deref(), Some("currency:usd"));
    }

    #[test]
    fn test_conditional_equals() {
        let p = parse_placeholder("items;v;code=B").expect("Should parse");
        assert_eq!(
            p.lookup,
            Lookup::Conditional(ConditionalLookup {
                array: path("items"),
                result: path("v"),
                condition: Condition {
                    property: path("code"),
                    literal: "B".to_string(),
                },
            })
        );
    }

    #[test]
    fn test_conditional_colon_with_dotted_literal() {
        let p = parse_placeholder("pagos;monto;tipo.clave: 1.5 MXN|number:2").expect("Should parse");
        match p.lookup {
            Lookup::Conditional(c) => {
                assert_eq!(c.condition.property, path("tipo.clave"));
                assert_eq!(c.condition.literal, "1.5 MXN");
            }
            other => panic!("expected conditional, got {:?}", other),
        }
        assert_eq!(p.formatter.as_deref(), Some("number:2"));
    }

    #[test]
    fn test_datetime_formatter_param() {
        let p = parse_placeholder("fecha|datetime:dd/mm/yyyy hh:mm").expect("Should parse");
        assert_eq!(p.formatter.as_deref(), Some("datetime:dd/mm/yyyy hh:mm"));
    }

    #[test]
    fn test_malformed_bodies() {
        for body in ["", "   ", "a..b", "a.", "a b", "a;b", "a;b;c", "a|", "a| ", "|upper"] {
            assert!(
                parse_placeholder(body).is_err(),
                "expected '{}' to be rejected",
                body
            );
        }
    }
}
