// Expression parser for plot source text

pub mod ast;
pub mod expression;
pub mod lexer;

// Public API re-exports
pub use ast::{Expr, Literal, LiteralKind, MemberProperty, Program, Property};

use crate::error::{ConvertError, Result};
use expression::{at_end, expression, statement_end};
use lexer::trivia;

fn offset_of(source: &str, remaining: &str) -> usize {
    source.len() - remaining.len()
}

fn syntax_error(source: &str, err: nom::Err<nom::error::Error<&str>>) -> ConvertError {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let offset = offset_of(source, e.input);
            let message = match e.input.chars().next() {
                Some(c) => format!("Unexpected token '{}'", c),
                None => "Unexpected end of input".to_string(),
            };
            ConvertError::syntax(offset, message)
        }
        nom::Err::Incomplete(_) => ConvertError::syntax(source.len(), "Unexpected end of input"),
    }
}

// Statements without `;` must be separated by a line break
fn ends_line(input: &str, rest: &str) -> bool {
    let consumed = &input[..input.len() - rest.len()];
    consumed[consumed.trim_end().len()..].contains('\n')
}

/// Parse source text as a program of expression statements
pub fn parse_program(source: &str) -> Result<Program> {
    let (mut input, _) = trivia(source).map_err(|e| syntax_error(source, e))?;
    let mut body = Vec::new();

    while !at_end(input) {
        let (after_expr, expr) = expression(input).map_err(|e| syntax_error(source, e))?;
        let (rest, _) = statement_end(after_expr).map_err(|e| syntax_error(source, e))?;
        let terminated = rest.len() < after_expr.len() || at_end(rest) || ends_line(input, rest);
        if rest.len() == input.len() || !terminated {
            return Err(syntax_error(
                source,
                nom::Err::Error(nom::error::Error::new(rest, nom::error::ErrorKind::Verify)),
            ));
        }
        body.push(expr);
        input = rest;
    }

    Ok(Program { body })
}

/// Parse the expression starting at `offset`, ignoring whatever follows it
pub fn parse_expression_at(source: &str, offset: usize) -> Result<Expr> {
    let start = source
        .get(offset..)
        .ok_or_else(|| ConvertError::syntax(offset, "Offset out of range"))?;
    let (_, expr) = expression(start).map_err(|e| syntax_error(source, e))?;
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_program_single_statement() {
        let program = parse_program("Plot.plot({ marks: [] })").unwrap();
        assert_eq!(program.body.len(), 1);
        assert!(program.body[0].is_call());
    }

    #[test]
    fn test_parse_program_trailing_whitespace_and_semicolon() {
        let program = parse_program("\n  Plot.frame().plot();\n  // done\n").unwrap();
        assert_eq!(program.body.len(), 1);
    }

    #[test]
    fn test_parse_program_multiple_statements() {
        let program = parse_program("a; b\nc").unwrap();
        assert_eq!(program.body.len(), 3);
    }

    #[test]
    fn test_parse_program_empty() {
        let program = parse_program("   ").unwrap();
        assert!(program.body.is_empty());
    }

    #[test]
    fn test_parse_program_syntax_error_offset() {
        let err = parse_program("Plot.plot({ x: })").unwrap_err();
        match err {
            ConvertError::Syntax { offset, message } => {
                assert_eq!(offset, 15);
                assert_eq!(message, "Unexpected token '}'");
            }
            other => panic!("Expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_syntax_error_inside_nested_arguments() {
        let offset_of_error = |source: &str| match parse_program(source) {
            Err(ConvertError::Syntax { offset, .. }) => offset,
            other => panic!("Expected syntax error for {:?}, got {:?}", source, other),
        };
        assert_eq!(offset_of_error("Plot.lineY(aapl, {x: 'Date', y: }).plot()"), 32);
        assert_eq!(offset_of_error("Plot.plot({ marks: [Plot.dot(d, {x: 1 +})] })"), 39);
        assert_eq!(offset_of_error("Plot.plot({ x: 1_000 })"), 16);
    }

    #[test]
    fn test_unterminated_call_reports_end_of_input() {
        match parse_program("Plot.plot({").unwrap_err() {
            ConvertError::Syntax { offset, message } => {
                assert_eq!(offset, 11);
                assert_eq!(message, "Unexpected end of input");
            }
            other => panic!("Expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_program_rejects_stray_tokens() {
        assert!(parse_program("Plot.plot() )").is_err());
        assert!(parse_program("a = 1").is_err());
    }

    #[test]
    fn test_parse_program_requires_separator_on_same_line() {
        match parse_program("a b").unwrap_err() {
            ConvertError::Syntax { offset, message } => {
                assert_eq!(offset, 2);
                assert_eq!(message, "Unexpected token 'b'");
            }
            other => panic!("Expected syntax error, got {:?}", other),
        }
        assert_eq!(parse_program("a // note\nb").unwrap().body.len(), 2);
    }

    #[test]
    fn test_parse_expression_at_ignores_tail() {
        let expr = parse_expression_at("'Date' trailing", 0).unwrap();
        assert_eq!(expr, Expr::Literal(Literal::new(LiteralKind::String, "'Date'")));
    }

    #[test]
    fn test_parse_expression_at_offset() {
        let expr = parse_expression_at("x = aapl", 4).unwrap();
        assert_eq!(expr, Expr::Identifier("aapl".to_string()));
        assert!(parse_expression_at("abc", 10).is_err());
    }
}
