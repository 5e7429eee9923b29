// Source text generation for parsed expressions

use crate::parser::ast::{ArrowBody, ArrowParams, Expr, MemberProperty, Property, PropertyKey};
use crate::parser::expression::precedence;

const INDENT: &str = "  ";

// Binding strength of each expression form, used to decide where parentheses go.
// Binary operators occupy BINARY_BASE + their operator precedence.
const PREC_ARROW: u8 = 1;
const PREC_CONDITIONAL: u8 = 2;
const BINARY_BASE: u8 = 10;
const PREC_UNARY: u8 = 30;
const PREC_POSTFIX: u8 = 40;
const PREC_PRIMARY: u8 = 50;

fn expr_precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Arrow { .. } | Expr::Spread(_) => PREC_ARROW,
        Expr::Conditional { .. } => PREC_CONDITIONAL,
        Expr::Binary { operator, .. } => BINARY_BASE + precedence(operator),
        Expr::Unary { .. } => PREC_UNARY,
        Expr::Member { .. } | Expr::Call { .. } | Expr::New { .. } => PREC_POSTFIX,
        Expr::Literal(_)
        | Expr::Identifier(_)
        | Expr::This
        | Expr::Function { .. }
        | Expr::Template(_)
        | Expr::Array(_)
        | Expr::Object(_) => PREC_PRIMARY,
    }
}

/// Generate canonical source text for an expression
pub fn to_source_text(expr: &Expr) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr, 0);
    out
}

fn write_parenthesized(out: &mut String, expr: &Expr, depth: usize, wrap: bool) {
    if wrap {
        out.push('(');
        write_expr(out, expr, depth);
        out.push(')');
    } else {
        write_expr(out, expr, depth);
    }
}

fn write_list(out: &mut String, items: &[Expr], depth: usize) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_expr(out, item, depth);
    }
}

fn write_expr(out: &mut String, expr: &Expr, depth: usize) {
    match expr {
        Expr::Literal(lit) => out.push_str(&lit.raw),
        Expr::Identifier(name) => out.push_str(name),
        Expr::This => out.push_str("this"),
        Expr::Template(raw) => out.push_str(raw),
        Expr::Array(items) => write_array(out, items, depth),
        Expr::Object(props) => write_object(out, props, depth),
        Expr::Arrow {
            is_async,
            params,
            body,
        } => {
            if *is_async {
                out.push_str("async ");
            }
            match params {
                ArrowParams::Names(names) => match names.as_slice() {
                    [single] => out.push_str(single),
                    _ => {
                        out.push('(');
                        out.push_str(&names.join(", "));
                        out.push(')');
                    }
                },
                ArrowParams::Pattern(raw) => out.push_str(raw),
            }
            out.push_str(" => ");
            match body {
                ArrowBody::Block(raw) => out.push_str(raw),
                ArrowBody::Expression(body) => {
                    let wrap = matches!(**body, Expr::Object(_));
                    write_parenthesized(out, body, depth, wrap);
                }
            }
        }
        Expr::Function {
            is_async,
            generator,
            name,
            params,
            body,
        } => {
            if *is_async {
                out.push_str("async ");
            }
            out.push_str("function ");
            if *generator {
                out.push('*');
            }
            if let Some(name) = name {
                out.push_str(name);
            }
            out.push_str(params);
            out.push(' ');
            out.push_str(body);
        }
        Expr::Member {
            object,
            property,
            optional,
        } => {
            write_parenthesized(out, object, depth, expr_precedence(object) < PREC_POSTFIX);
            match property {
                MemberProperty::Name(name) => {
                    out.push_str(if *optional { "?." } else { "." });
                    out.push_str(name);
                }
                MemberProperty::Computed(property) => {
                    if *optional {
                        out.push_str("?.");
                    }
                    out.push('[');
                    write_expr(out, property, depth);
                    out.push(']');
                }
            }
        }
        Expr::Call {
            callee,
            arguments,
            optional,
        } => {
            write_parenthesized(out, callee, depth, expr_precedence(callee) < PREC_POSTFIX);
            if *optional {
                out.push_str("?.");
            }
            out.push('(');
            write_list(out, arguments, depth);
            out.push(')');
        }
        Expr::New { callee, arguments } => {
            out.push_str("new ");
            // A call inside the constructor position must keep its parentheses
            let wrap = expr_precedence(callee) < PREC_POSTFIX || contains_call(callee);
            write_parenthesized(out, callee, depth, wrap);
            out.push('(');
            write_list(out, arguments, depth);
            out.push(')');
        }
        Expr::Unary { operator, argument } => {
            out.push_str(operator);
            if operator.chars().all(char::is_alphabetic) {
                out.push(' ');
            }
            // `- -x` and `+ +x` would otherwise merge into `--x` / `++x`
            let merges = matches!(&**argument, Expr::Unary { operator: inner, .. }
                if (operator == "-" || operator == "+") && inner.starts_with(operator.as_str()));
            write_parenthesized(
                out,
                argument,
                depth,
                merges || expr_precedence(argument) < PREC_UNARY,
            );
        }
        Expr::Binary {
            operator,
            left,
            right,
        } => {
            let prec = BINARY_BASE + precedence(operator);
            let right_assoc = operator == "**";
            let left_prec = expr_precedence(left);
            let right_prec = expr_precedence(right);
            // The exponent operator cannot take a bare unary expression on its left
            let wrap_left = left_prec < prec
                || (left_prec == prec && right_assoc)
                || (right_assoc && left_prec == PREC_UNARY);
            let wrap_right = right_prec < prec || (right_prec == prec && !right_assoc);
            write_parenthesized(out, left, depth, wrap_left);
            out.push(' ');
            out.push_str(operator);
            out.push(' ');
            write_parenthesized(out, right, depth, wrap_right);
        }
        Expr::Conditional {
            test,
            consequent,
            alternate,
        } => {
            write_parenthesized(out, test, depth, expr_precedence(test) <= PREC_CONDITIONAL);
            out.push_str(" ? ");
            write_expr(out, consequent, depth);
            out.push_str(" : ");
            write_expr(out, alternate, depth);
        }
        Expr::Spread(argument) => {
            out.push_str("...");
            write_expr(out, argument, depth);
        }
    }
}

// A trailing hole needs its own comma: `[1, ,]` has two elements
fn write_array(out: &mut String, items: &[Option<Expr>], depth: usize) {
    out.push('[');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        if let Some(item) = item {
            write_expr(out, item, depth);
        }
    }
    if matches!(items.last(), Some(None)) {
        out.push(',');
    }
    out.push(']');
}

fn contains_call(expr: &Expr) -> bool {
    match expr {
        Expr::Call { .. } => true,
        Expr::Member { object, .. } => contains_call(object),
        _ => false,
    }
}

fn write_object(out: &mut String, props: &[Property], depth: usize) {
    if props.is_empty() {
        out.push_str("{}");
        return;
    }
    let inner = INDENT.repeat(depth + 1);
    out.push('{');
    for (i, prop) in props.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push('\n');
        out.push_str(&inner);
        write_property(out, prop, depth + 1);
    }
    out.push('\n');
    out.push_str(&INDENT.repeat(depth));
    out.push('}');
}

fn write_property(out: &mut String, prop: &Property, depth: usize) {
    match prop {
        Property::Spread(argument) => {
            out.push_str("...");
            write_expr(out, argument, depth);
        }
        Property::KeyValue {
            key,
            value,
            shorthand,
        } => {
            if *shorthand {
                write_expr(out, value, depth);
                return;
            }
            match key {
                PropertyKey::Identifier(name) => out.push_str(name),
                PropertyKey::Literal(lit) => out.push_str(&lit.raw),
                PropertyKey::Computed(key) => {
                    out.push('[');
                    write_expr(out, key, depth);
                    out.push(']');
                }
            }
            out.push_str(": ");
            write_expr(out, value, depth);
        }
    }
}
