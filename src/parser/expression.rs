// Expression grammar: precedence climbing over nom combinators

use super::ast::{
    ArrowBody, ArrowParams, Expr, Literal, LiteralKind, MemberProperty, Property, PropertyKey,
};
use super::lexer::{
    block, identifier, identifier_name, keyword, number_literal, parameter_list, regex_literal,
    string_literal, template_literal, trivia, ws,
};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, satisfy},
    combinator::{cut, map, not, opt, value},
    multi::separated_list0,
    sequence::{pair, preceded, separated_pair, terminated, tuple},
    IResult,
};

/// Binary and logical operators, longest spelling first
const BINARY_OPERATORS: &[&str] = &[
    "instanceof", ">>>", "===", "!==", "**", "??", "||", "&&", "==", "!=", "<=", ">=", "<<", ">>",
    "in", "|", "^", "&", "<", ">", "+", "-", "*", "/", "%",
];

/// Binding power of a binary operator (higher binds tighter)
pub fn precedence(operator: &str) -> u8 {
    match operator {
        "??" => 1,
        "||" => 2,
        "&&" => 3,
        "|" => 4,
        "^" => 5,
        "&" => 6,
        "==" | "!=" | "===" | "!==" => 7,
        "<" | ">" | "<=" | ">=" | "in" | "instanceof" => 8,
        "<<" | ">>" | ">>>" => 9,
        "+" | "-" => 10,
        "*" | "/" | "%" => 11,
        "**" => 12,
        _ => 0,
    }
}

/// Parse a full expression (assignment level: arrow function or conditional)
pub fn expression(input: &str) -> IResult<&str, Expr> {
    alt((arrow_function, conditional))(input)
}

fn arrow_params(input: &str) -> IResult<&str, ArrowParams> {
    alt((
        map(ws(identifier), |name| ArrowParams::Names(vec![name])),
        map(
            preceded(
                ws(char('(')),
                terminated(
                    terminated(
                        separated_list0(ws(char(',')), ws(identifier)),
                        opt(ws(char(','))),
                    ),
                    ws(char(')')),
                ),
            ),
            ArrowParams::Names,
        ),
        map(ws(parameter_list), |raw| ArrowParams::Pattern(raw.to_string())),
    ))(input)
}

/// Parameters, `=>` and body; everything after the arrow is committed
fn arrow_tail(input: &str) -> IResult<&str, (ArrowParams, ArrowBody)> {
    let (input, params) = arrow_params(input)?;
    let (input, _) = ws(tag("=>"))(input)?;
    let (input, body) = cut(alt((
        map(ws(block), |raw| ArrowBody::Block(raw.to_string())),
        map(expression, |expr| ArrowBody::Expression(Box::new(expr))),
    )))(input)?;

    Ok((input, (params, body)))
}

fn arrow_function(input: &str) -> IResult<&str, Expr> {
    alt((
        map(preceded(ws(keyword("async")), arrow_tail), |(params, body)| {
            Expr::Arrow {
                is_async: true,
                params,
                body,
            }
        }),
        // `async` alone is still a valid parameter name
        map(arrow_tail, |(params, body)| Expr::Arrow {
            is_async: false,
            params,
            body,
        }),
    ))(input)
}

fn function_expression(input: &str) -> IResult<&str, Expr> {
    let (input, is_async) = map(opt(ws(keyword("async"))), |word| word.is_some())(input)?;
    let (input, _) = ws(keyword("function"))(input)?;
    let (input, (generator, name, params, body)) = cut(tuple((
        map(opt(ws(char('*'))), |star| star.is_some()),
        opt(ws(identifier)),
        ws(parameter_list),
        ws(block),
    )))(input)?;

    Ok((
        input,
        Expr::Function {
            is_async,
            generator,
            name,
            params: params.to_string(),
            body: body.to_string(),
        },
    ))
}

/// `?` that starts a conditional, not `??` or `?.`
fn question_mark(input: &str) -> IResult<&str, char> {
    terminated(char('?'), not(alt((char('?'), char('.')))))(input)
}

fn conditional(input: &str) -> IResult<&str, Expr> {
    let (input, test) = binary(input, 1)?;
    let (input, branches) = opt(preceded(
        ws(question_mark),
        cut(separated_pair(expression, ws(char(':')), expression)),
    ))(input)?;

    match branches {
        Some((consequent, alternate)) => Ok((
            input,
            Expr::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            },
        )),
        None => Ok((input, test)),
    }
}

fn binary_operator(input: &str) -> IResult<&str, &'static str> {
    for &op in BINARY_OPERATORS {
        let matched = if op.chars().all(char::is_alphabetic) {
            keyword(op)(input).is_ok()
        } else {
            input.starts_with(op) && !is_assignment(&input[op.len()..], op)
        };
        if matched {
            return Ok((&input[op.len()..], op));
        }
    }
    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Tag,
    )))
}

/// `+=`, `**=`, `??=`... are assignments, which the grammar does not support
fn is_assignment(rest: &str, op: &str) -> bool {
    rest.starts_with('=') && !matches!(op, "==" | "!=" | "===" | "!==" | "<=" | ">=")
}

/// Past a committed token a recoverable error becomes a failure
fn committed<T>(result: IResult<&str, T>) -> IResult<&str, T> {
    result.map_err(|e| match e {
        nom::Err::Error(e) => nom::Err::Failure(e),
        other => other,
    })
}

/// Precedence climbing: parse operands joined by operators binding at least `min_prec`
fn binary(input: &str, min_prec: u8) -> IResult<&str, Expr> {
    let (mut input, mut left) = unary(input)?;
    loop {
        let Ok((rest, operator)) = preceded(trivia, binary_operator)(input) else {
            break;
        };
        let prec = precedence(operator);
        if prec < min_prec {
            break;
        }
        // `**` is right-associative
        let next_min = if operator == "**" { prec } else { prec + 1 };
        let (rest, right) = committed(binary(rest, next_min))?;
        left = Expr::Binary {
            operator: operator.to_string(),
            left: Box::new(left),
            right: Box::new(right),
        };
        input = rest;
    }
    Ok((input, left))
}

fn unary_operator(input: &str) -> IResult<&str, &str> {
    alt((
        keyword("typeof"),
        keyword("void"),
        keyword("delete"),
        keyword("await"),
        terminated(tag("!"), not(char('='))),
        terminated(tag("~"), not(char('='))),
        terminated(tag("-"), not(alt((char('-'), char('='))))),
        terminated(tag("+"), not(alt((char('+'), char('='))))),
    ))(input)
}

fn unary(input: &str) -> IResult<&str, Expr> {
    alt((
        map(
            pair(ws(unary_operator), cut(unary)),
            |(operator, argument)| Expr::Unary {
                operator: operator.to_string(),
                argument: Box::new(argument),
            },
        ),
        postfix,
    ))(input)
}

fn arguments(input: &str) -> IResult<&str, Vec<Expr>> {
    preceded(
        ws(char('(')),
        cut(terminated(
            terminated(
                separated_list0(ws(char(',')), spread_or_expression),
                opt(ws(char(','))),
            ),
            ws(char(')')),
        )),
    )(input)
}

fn spread_or_expression(input: &str) -> IResult<&str, Expr> {
    alt((
        map(preceded(ws(tag("...")), cut(expression)), |expr| {
            Expr::Spread(Box::new(expr))
        }),
        ws(expression),
    ))(input)
}

enum Suffix {
    Name(String, bool),
    Computed(Expr, bool),
    Call(Vec<Expr>, bool),
}

fn optional_chain(input: &str) -> IResult<&str, &str> {
    terminated(tag("?."), not(satisfy(|c| c.is_ascii_digit())))(input)
}

fn computed_member(input: &str) -> IResult<&str, Expr> {
    preceded(ws(char('[')), cut(terminated(expression, ws(char(']')))))(input)
}

fn suffix(input: &str) -> IResult<&str, Suffix> {
    alt((
        preceded(
            ws(optional_chain),
            cut(alt((
                map(ws(identifier_name), |name| Suffix::Name(name.to_string(), true)),
                map(computed_member, |expr| Suffix::Computed(expr, true)),
                map(arguments, |args| Suffix::Call(args, true)),
            ))),
        ),
        map(
            preceded(ws(terminated(char('.'), not(char('.')))), cut(ws(identifier_name))),
            |name| Suffix::Name(name.to_string(), false),
        ),
        map(computed_member, |expr| Suffix::Computed(expr, false)),
        map(arguments, |args| Suffix::Call(args, false)),
    ))(input)
}

fn apply_suffix(expr: Expr, suffix: Suffix) -> Expr {
    match suffix {
        Suffix::Name(name, optional) => Expr::Member {
            object: Box::new(expr),
            property: MemberProperty::Name(name),
            optional,
        },
        Suffix::Computed(property, optional) => Expr::Member {
            object: Box::new(expr),
            property: MemberProperty::Computed(Box::new(property)),
            optional,
        },
        Suffix::Call(arguments, optional) => Expr::Call {
            callee: Box::new(expr),
            arguments,
            optional,
        },
    }
}

/// Next suffix, `None` when the input does not continue with one.
/// Errors past a committed `.`, `[` or `(` are passed through.
fn next_suffix(input: &str) -> IResult<&str, Option<Suffix>> {
    match suffix(input) {
        Ok((rest, s)) => Ok((rest, Some(s))),
        Err(nom::Err::Error(_)) => Ok((input, None)),
        Err(e) => Err(e),
    }
}

/// Primary expression followed by any member accesses and calls
fn postfix(input: &str) -> IResult<&str, Expr> {
    let (mut input, mut expr) = ws(primary)(input)?;
    while let (rest, Some(s)) = next_suffix(input)? {
        expr = apply_suffix(expr, s);
        input = rest;
    }
    Ok((input, expr))
}

fn new_expression(input: &str) -> IResult<&str, Expr> {
    let (input, _) = ws(keyword("new"))(input)?;
    let (mut input, mut callee) = cut(ws(primary))(input)?;
    // Member accesses bind to the constructor; the first argument list ends it
    while let (rest, Some(s)) = next_suffix(input)? {
        match s {
            Suffix::Call(arguments, _) => {
                return Ok((
                    rest,
                    Expr::New {
                        callee: Box::new(callee),
                        arguments,
                    },
                ))
            }
            other => {
                callee = apply_suffix(callee, other);
                input = rest;
            }
        }
    }
    Ok((
        input,
        Expr::New {
            callee: Box::new(callee),
            arguments: Vec::new(),
        },
    ))
}

fn literal(input: &str) -> IResult<&str, Literal> {
    alt((
        map(number_literal, |raw| {
            let kind = if raw.ends_with('n') {
                LiteralKind::BigInt
            } else {
                LiteralKind::Number
            };
            Literal::new(kind, raw)
        }),
        map(string_literal, |raw| Literal::new(LiteralKind::String, raw)),
        map(alt((keyword("true"), keyword("false"))), |raw| {
            Literal::new(LiteralKind::Boolean, raw)
        }),
        map(keyword("null"), |raw| Literal::new(LiteralKind::Null, raw)),
    ))(input)
}

fn array(input: &str) -> IResult<&str, Expr> {
    let (mut input, _) = ws(char('['))(input)?;
    let mut elements = Vec::new();
    loop {
        if let Ok((rest, _)) = ws(char(']'))(input) {
            return Ok((rest, Expr::Array(elements)));
        }
        // A comma with nothing before it leaves a hole
        if let Ok((rest, _)) = ws(char(','))(input) {
            elements.push(None);
            input = rest;
            continue;
        }
        let (rest, element) = cut(spread_or_expression)(input)?;
        elements.push(Some(element));
        let (rest, separator) = cut(ws(alt((char(','), char(']')))))(rest)?;
        if separator == ']' {
            return Ok((rest, Expr::Array(elements)));
        }
        input = rest;
    }
}

fn property_key(input: &str) -> IResult<&str, PropertyKey> {
    alt((
        map(literal, PropertyKey::Literal),
        map(identifier_name, |name| PropertyKey::Identifier(name.to_string())),
        map(computed_member, |expr| PropertyKey::Computed(Box::new(expr))),
    ))(input)
}

fn property(input: &str) -> IResult<&str, Property> {
    if let Ok((input, _)) = ws(tag("..."))(input) {
        let (input, spread) = cut(expression)(input)?;
        return Ok((input, Property::Spread(spread)));
    }

    let (input, key) = ws(property_key)(input)?;
    let (input, value) = opt(preceded(ws(char(':')), cut(expression)))(input)?;

    match (key, value) {
        (key, Some(value)) => Ok((
            input,
            Property::KeyValue {
                key,
                value,
                shorthand: false,
            },
        )),
        (PropertyKey::Identifier(name), None) => Ok((
            input,
            Property::KeyValue {
                key: PropertyKey::Identifier(name.clone()),
                value: Expr::Identifier(name),
                shorthand: true,
            },
        )),
        (_, None) => Err(nom::Err::Failure(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        ))),
    }
}

fn object(input: &str) -> IResult<&str, Expr> {
    map(
        preceded(
            ws(char('{')),
            cut(terminated(
                terminated(separated_list0(ws(char(',')), property), opt(ws(char(',')))),
                ws(char('}')),
            )),
        ),
        Expr::Object,
    )(input)
}

fn parenthesized(input: &str) -> IResult<&str, Expr> {
    preceded(ws(char('(')), cut(terminated(expression, ws(char(')')))))(input)
}

fn primary(input: &str) -> IResult<&str, Expr> {
    alt((
        map(literal, Expr::Literal),
        map(regex_literal, |raw| {
            Expr::Literal(Literal::new(LiteralKind::Regex, raw))
        }),
        map(template_literal, |raw| Expr::Template(raw.to_string())),
        new_expression,
        function_expression,
        map(keyword("this"), |_| Expr::This),
        map(identifier, Expr::Identifier),
        array,
        object,
        parenthesized,
    ))(input)
}

/// True when nothing but whitespace and comments remain
pub fn at_end(input: &str) -> bool {
    matches!(trivia(input), Ok((rest, _)) if rest.is_empty())
}

/// Optional statement terminator
pub fn statement_end(input: &str) -> IResult<&str, ()> {
    value((), opt(ws(char(';'))))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Expr {
        let (rest, expr) = expression(src).unwrap();
        assert!(at_end(rest), "unparsed input: {:?}", rest);
        expr
    }

    fn ident(name: &str) -> Expr {
        Expr::Identifier(name.to_string())
    }

    #[test]
    fn test_parse_identifier_and_literals() {
        assert_eq!(parse("aapl"), ident("aapl"));
        assert_eq!(
            parse("'Date'"),
            Expr::Literal(Literal::new(LiteralKind::String, "'Date'"))
        );
        assert_eq!(parse("60"), Expr::Literal(Literal::new(LiteralKind::Number, "60")));
        assert_eq!(parse("null"), Expr::Literal(Literal::new(LiteralKind::Null, "null")));
        assert_eq!(
            parse("true"),
            Expr::Literal(Literal::new(LiteralKind::Boolean, "true"))
        );
    }

    #[test]
    fn test_parse_member_call_chain() {
        let expr = parse("Plot.lineY(aapl, {x: 'Date'}).plot()");
        match expr {
            Expr::Call { callee, arguments, .. } => {
                assert!(arguments.is_empty());
                assert_eq!(callee.member_name(), Some("plot"));
                let receiver = callee.member_object().unwrap();
                assert!(receiver.is_call());
            }
            other => panic!("Expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_precedence() {
        let expr = parse("a + b * c");
        match expr {
            Expr::Binary { operator, right, .. } => {
                assert_eq!(operator, "+");
                assert!(matches!(*right, Expr::Binary { ref operator, .. } if operator == "*"));
            }
            other => panic!("Expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_left_associative() {
        let expr = parse("a - b - c");
        match expr {
            Expr::Binary { left, right, .. } => {
                assert!(matches!(*left, Expr::Binary { .. }));
                assert_eq!(*right, ident("c"));
            }
            other => panic!("Expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_exponent_right_associative() {
        let expr = parse("a ** b ** c");
        match expr {
            Expr::Binary { left, right, .. } => {
                assert_eq!(*left, ident("a"));
                assert!(matches!(*right, Expr::Binary { .. }));
            }
            other => panic!("Expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_arrow_functions() {
        assert!(matches!(
            parse("(d) => d.Close"),
            Expr::Arrow { params: ArrowParams::Names(ref names), .. } if names == &["d"]
        ));
        assert!(matches!(parse("d => d.Close"), Expr::Arrow { is_async: false, .. }));
        assert!(matches!(
            parse("(a, b) => a - b"),
            Expr::Arrow { params: ArrowParams::Names(ref names), .. } if names.len() == 2
        ));
        assert!(matches!(
            parse("() => { return 1; }"),
            Expr::Arrow { body: ArrowBody::Block(_), .. }
        ));
    }

    #[test]
    fn test_parse_conditional() {
        let expr = parse(r#"d.gender === "M" ? 1 : -1"#);
        match expr {
            Expr::Conditional { alternate, .. } => {
                assert!(matches!(*alternate, Expr::Unary { ref operator, .. } if operator == "-"));
            }
            other => panic!("Expected conditional, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_nullish_is_not_conditional() {
        assert!(matches!(parse("a ?? b"), Expr::Binary { ref operator, .. } if operator == "??"));
        assert!(matches!(parse("a?.b"), Expr::Member { optional: true, .. }));
    }

    #[test]
    fn test_parse_object_forms() {
        let expr = parse("{x, 'y': 1, [k]: 2, ...rest, z: 3,}");
        match expr {
            Expr::Object(props) => {
                assert_eq!(props.len(), 5);
                assert!(matches!(props[0], Property::KeyValue { shorthand: true, .. }));
                assert_eq!(props[1].key_name(), Some("y".to_string()));
                assert_eq!(props[2].key_name(), None);
                assert!(matches!(props[3], Property::Spread(_)));
            }
            other => panic!("Expected object, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_keyword_property_names() {
        let expr = parse("{default: 1, in: 2}");
        match expr {
            Expr::Object(props) => assert_eq!(props[1].key_name(), Some("in".to_string())),
            other => panic!("Expected object, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_array_with_spread() {
        let expr = parse("[0, ...xs]");
        match expr {
            Expr::Array(items) => assert!(matches!(items[1], Some(Expr::Spread(_)))),
            other => panic!("Expected array, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_new_expression() {
        let expr = parse("new Date(2020, 1).getTime()");
        match expr {
            Expr::Call { callee, .. } => {
                assert!(matches!(callee.member_object(), Some(Expr::New { .. })));
            }
            other => panic!("Expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_in_operator_requires_boundary() {
        assert!(matches!(parse("a in b"), Expr::Binary { ref operator, .. } if operator == "in"));
        let (rest, _) = expression("a inset").unwrap();
        assert_eq!(rest.trim(), "inset");
    }

    #[test]
    fn test_assignment_is_not_an_operator() {
        let (rest, expr) = expression("a = 1").unwrap();
        assert_eq!(expr, ident("a"));
        assert_eq!(rest.trim(), "= 1");
    }

    #[test]
    fn test_parse_arrow_parameter_patterns() {
        assert_eq!(
            parse("({a}) => a"),
            Expr::Arrow {
                is_async: false,
                params: ArrowParams::Pattern("({a})".to_string()),
                body: ArrowBody::Expression(Box::new(ident("a"))),
            }
        );
        assert!(matches!(
            parse("(d, i = 0) => d + i"),
            Expr::Arrow { params: ArrowParams::Pattern(ref raw), .. } if raw == "(d, i = 0)"
        ));
        assert!(matches!(
            parse("([x, y]) => x * y"),
            Expr::Arrow { params: ArrowParams::Pattern(_), .. }
        ));
    }

    #[test]
    fn test_parse_async_arrows() {
        assert!(matches!(
            parse("async d => await fetch(d)"),
            Expr::Arrow { is_async: true, body: ArrowBody::Expression(ref body), .. }
                if matches!(**body, Expr::Unary { ref operator, .. } if operator == "await")
        ));
        assert!(matches!(parse("async (a, b) => a"), Expr::Arrow { is_async: true, .. }));
        // `async` is still an ordinary name
        assert!(matches!(parse("async => 1"), Expr::Arrow { is_async: false, .. }));
        assert!(matches!(parse("async(x)"), Expr::Call { .. }));
    }

    #[test]
    fn test_parse_function_expression() {
        assert_eq!(
            parse("function (d) { return d.x; }"),
            Expr::Function {
                is_async: false,
                generator: false,
                name: None,
                params: "(d)".to_string(),
                body: "{ return d.x; }".to_string(),
            }
        );
        assert!(matches!(
            parse("async function named(a, b = 2) {}"),
            Expr::Function { is_async: true, name: Some(ref name), ref params, .. }
                if name == "named" && params == "(a, b = 2)"
        ));
        assert!(matches!(parse("function* () {}"), Expr::Function { generator: true, .. }));
    }

    #[test]
    fn test_parse_regex_literal() {
        let expr = parse(r#"d.name.replace(/x/g, "")"#);
        match expr {
            Expr::Call { arguments, .. } => assert_eq!(
                arguments[0],
                Expr::Literal(Literal::new(LiteralKind::Regex, "/x/g"))
            ),
            other => panic!("Expected call, got {:?}", other),
        }
        // After an operand `/` divides
        assert!(matches!(parse("a / b / c"), Expr::Binary { ref operator, .. } if operator == "/"));
    }

    #[test]
    fn test_parse_array_holes() {
        let one = || Some(Expr::Literal(Literal::new(LiteralKind::Number, "1")));
        let two = || Some(Expr::Literal(Literal::new(LiteralKind::Number, "2")));
        assert_eq!(parse("[1,,2]"), Expr::Array(vec![one(), None, two()]));
        assert_eq!(parse("[1,]"), Expr::Array(vec![one()]));
        assert_eq!(parse("[1,,]"), Expr::Array(vec![one(), None]));
        assert_eq!(parse("[,]"), Expr::Array(vec![None]));
        assert_eq!(parse("[]"), Expr::Array(vec![]));
    }

    #[test]
    fn test_parse_this() {
        assert_eq!(parse("this"), Expr::This);
        assert!(matches!(parse("this.x"), Expr::Member { .. }));
    }

    #[test]
    fn test_parse_unbalanced_fails() {
        assert!(matches!(expression("Plot.plot("), Err(nom::Err::Failure(_))));
        assert!(expression(")").is_err());
    }

    #[test]
    fn test_failure_points_at_offending_token() {
        let cases = [
            ("{ x: }", "}"),
            ("f(a, {y: })", "})"),
            ("1 + }", "}"),
            ("a.[b]", "[b]"),
            ("[1 2]", "2]"),
            ("-", ""),
        ];
        for (src, remaining) in cases {
            match expression(src) {
                Err(nom::Err::Failure(e)) => assert_eq!(e.input, remaining, "source: {}", src),
                other => panic!("Expected failure for {:?}, got {:?}", src, other),
            }
        }
    }
}
