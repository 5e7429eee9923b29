// Markup emitter: serialize the intermediate representation as component markup

use crate::error::{ConvertError, Result};
use crate::ir::{Mark, PlotIr, Transform};
use crate::parser::ast::{Expr, LiteralKind};
use crate::parser::parse_expression_at;
use crate::ConvertOptions;

/// How an attribute value is written in markup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueForm {
    /// `name={fragment}`
    Embedded,
    /// `name=fragment`
    Bare,
}

/// Decide how a source fragment is written as an attribute value
pub fn classify(fragment: &str) -> Result<ValueForm> {
    let parsed = parse_expression_at(fragment, 0)?;
    let form = match parsed {
        Expr::Object(_) | Expr::Identifier(_) | Expr::Array(_) | Expr::Arrow { .. } => {
            ValueForm::Embedded
        }
        Expr::Literal(lit) if lit.kind == LiteralKind::Number => ValueForm::Embedded,
        // Strings, booleans, null and regexes keep their source spelling verbatim,
        // as does anything else (`this`, function expressions, member accesses, calls...)
        _ => ValueForm::Bare,
    };
    Ok(form)
}

/// Format one `key=value` attribute
pub fn format_prop(key: &str, value: &str) -> Result<String> {
    Ok(match classify(value)? {
        ValueForm::Embedded => format!("{}={{{}}}", key, value),
        ValueForm::Bare => format!("{}={}", key, value),
    })
}

fn json_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// `{...binX({data: olympians, "x":"weight"}, {y: "count"} )}`
fn format_transform(mark: &Mark, transform: &Transform) -> Result<String> {
    let data = mark.options.get("data").ok_or_else(|| {
        ConvertError::shape(format!("mark `{}` has a transform but no data", mark.name))
    })?;

    let opts = transform
        .mark_options
        .iter()
        .map(|(key, value)| format!("{}:{}", json_string(key), json_string(value)))
        .collect::<Vec<_>>()
        .join(",");

    let mark_options = if opts.is_empty() {
        format!("{{data: {}}}", data)
    } else {
        format!("{{data: {}, {}}}", data, opts)
    };

    Ok(match &transform.transform_options {
        Some(transform_options) => format!(
            "{{...{}({}, {} )}}",
            transform.name, mark_options, transform_options
        ),
        None => format!("{{...{}({} )}}", transform.name, mark_options),
    })
}

/// Format the attribute list of a mark element
pub fn format_mark(mark: &Mark) -> Result<String> {
    if let Some(transform) = &mark.transform {
        return format_transform(mark, transform);
    }

    let attrs = mark
        .options
        .iter()
        .map(|(key, value)| format_prop(key, value))
        .collect::<Result<Vec<_>>>()?;
    Ok(attrs.join(" "))
}

fn capitalize_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Render the full markup block: root element, one child per mark, closing tag
pub fn emit(ir: &PlotIr, options: &ConvertOptions) -> Result<String> {
    let plot_attrs = ir
        .plot_options
        .iter()
        .map(|(key, value)| format_prop(key, value))
        .collect::<Result<Vec<_>>>()?
        .join(" ")
        .replace('\n', "");

    let mut output = String::new();
    output.push_str(&format!("<{} {} >\n", options.root, plot_attrs));

    for mark in &ir.marks {
        output.push_str(&format!(
            "{}<{} {} />\n",
            options.indent,
            capitalize_first(&mark.name),
            format_mark(mark)?
        ));
    }

    output.push_str(&format!("</{}>\n", options.root));
    Ok(output)
}
