// Token-level parsers shared by the expression grammar

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_until, take_while, take_while1},
    character::complete::{anychar, char, multispace1, one_of, satisfy},
    combinator::{cut, not, opt, recognize, value, verify},
    error::{Error, ErrorKind},
    multi::many0_count,
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

/// Words that can never be used as a bare identifier reference
const RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "export", "extends", "false", "finally", "for", "function", "if", "import",
    "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw", "true",
    "try", "typeof", "var", "void", "while", "with", "yield", "let", "static", "enum", "await",
];

pub fn is_reserved(word: &str) -> bool {
    RESERVED.contains(&word)
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn line_comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(tag("//"), take_while(|c| c != '\n')))(input)
}

fn block_comment(input: &str) -> IResult<&str, &str> {
    recognize(tuple((tag("/*"), take_until("*/"), tag("*/"))))(input)
}

/// Skip whitespace and comments
pub fn trivia(input: &str) -> IResult<&str, ()> {
    value((), many0_count(alt((multispace1, line_comment, block_comment))))(input)
}

/// Wrap a parser so that surrounding whitespace and comments are ignored
pub fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(trivia, inner, trivia)
}

/// Any identifier-shaped word, reserved or not (valid after a `.`)
pub fn identifier_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(satisfy(is_ident_start), take_while(is_ident_continue)))(input)
}

/// An identifier usable as a reference: letters, digits, `_` and `$`, not a keyword
pub fn identifier(input: &str) -> IResult<&str, String> {
    let (input, name) = verify(identifier_name, |s: &str| !is_reserved(s))(input)?;
    Ok((input, name.to_string()))
}

/// Match a keyword that is not the prefix of a longer identifier
pub fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(tag(word), not(satisfy(is_ident_continue)))
}

fn digits(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_digit()),
        take_while(|c: char| c.is_ascii_digit()),
    ))(input)
}

/// Parse a numeric literal, returning its raw spelling
/// Format: 42, 3.14, .5, 1e-3, 0xff, 0b101, 0o17, 10n
pub fn number_literal(input: &str) -> IResult<&str, &str> {
    let radix = recognize(tuple((
        char('0'),
        one_of("xXoObB"),
        take_while1(|c: char| c.is_ascii_hexdigit()),
    )));
    let exponent = recognize(tuple((one_of("eE"), opt(one_of("+-")), digits)));
    let mantissa = alt((
        recognize(pair(digits, opt(pair(char('.'), opt(digits))))),
        recognize(pair(char('.'), digits)),
    ));
    let decimal = recognize(pair(mantissa, opt(exponent)));

    // Digits running straight into a name can never be valid
    terminated(
        recognize(pair(alt((radix, decimal)), opt(char('n')))),
        cut(not(satisfy(is_ident_continue))),
    )(input)
}

fn escape(input: &str) -> IResult<&str, &str> {
    recognize(pair(char('\\'), anychar))(input)
}

fn double_quoted(input: &str) -> IResult<&str, &str> {
    recognize(delimited(
        char('"'),
        many0_count(alt((is_not("\"\\\n"), escape))),
        char('"'),
    ))(input)
}

fn single_quoted(input: &str) -> IResult<&str, &str> {
    recognize(delimited(
        char('\''),
        many0_count(alt((is_not("'\\\n"), escape))),
        char('\''),
    ))(input)
}

/// Parse a quoted string literal, returning its raw spelling including quotes
pub fn string_literal(input: &str) -> IResult<&str, &str> {
    alt((double_quoted, single_quoted))(input)
}

fn unterminated(input: &str) -> nom::Err<Error<&str>> {
    nom::Err::Error(Error::new(input, ErrorKind::Eof))
}

/// Parse a regular expression literal, returning its raw spelling including flags
pub fn regex_literal(input: &str) -> IResult<&str, &str> {
    let (mut rest, _) = terminated(char('/'), not(one_of("/*")))(input)?;
    let mut in_class = false;
    loop {
        let c = rest.chars().next().ok_or_else(|| unterminated(rest))?;
        match c {
            '\n' | '\r' => return Err(unterminated(rest)),
            '\\' => {
                let (after, _) = escape(rest).map_err(|_| unterminated(rest))?;
                rest = after;
                continue;
            }
            '[' => in_class = true,
            ']' => in_class = false,
            '/' if !in_class => {
                let (after, _) = take_while(is_ident_continue)(&rest[1..])?;
                let consumed = input.len() - after.len();
                return Ok((after, &input[..consumed]));
            }
            _ => {}
        }
        rest = &rest[c.len_utf8()..];
    }
}

/// Parse a template literal, returning its raw spelling including backticks
pub fn template_literal(input: &str) -> IResult<&str, &str> {
    let (mut rest, _) = char('`')(input)?;
    loop {
        if let Some(after) = rest.strip_prefix('`') {
            let consumed = input.len() - after.len();
            return Ok((after, &input[..consumed]));
        }
        if let Some(after) = rest.strip_prefix("${") {
            let (after, _) = balanced_tail(after)?;
            rest = after;
            continue;
        }
        let (after, _) = alt((escape, recognize(anychar)))(rest).map_err(|_| unterminated(rest))?;
        rest = after;
    }
}

fn balanced_tail(input: &str) -> IResult<&str, &str> {
    balanced_until(input, '}')
}

/// Consume source up to and including the `close` bracket of an already-opened pair.
/// Nested brackets, strings, templates and comments are skipped as units.
fn balanced_until(input: &str, close: char) -> IResult<&str, &str> {
    let mut depth = 0usize;
    let mut rest = input;
    loop {
        let c = rest.chars().next().ok_or_else(|| unterminated(rest))?;
        match c {
            '"' | '\'' => {
                let (after, _) = string_literal(rest)?;
                rest = after;
                continue;
            }
            '`' => {
                let (after, _) = template_literal(rest)?;
                rest = after;
                continue;
            }
            '/' if rest.starts_with("//") || rest.starts_with("/*") => {
                let (after, _) = alt((line_comment, block_comment))(rest)?;
                rest = after;
                continue;
            }
            '{' | '(' | '[' => depth += 1,
            '}' | ')' | ']' if depth == 0 => {
                if c != close {
                    return Err(nom::Err::Error(Error::new(rest, ErrorKind::Char)));
                }
                let after = &rest[1..];
                return Ok((after, &input[..input.len() - after.len()]));
            }
            '}' | ')' | ']' => depth -= 1,
            _ => {}
        }
        rest = &rest[c.len_utf8()..];
    }
}

/// Parse a brace-delimited block, returning it verbatim
pub fn block(input: &str) -> IResult<&str, &str> {
    recognize(preceded(char('{'), balanced_tail))(input)
}

/// Parse a parenthesized parameter list, returning it verbatim
pub fn parameter_list(input: &str) -> IResult<&str, &str> {
    recognize(preceded(char('('), |rest| balanced_until(rest, ')')))(input)
}
