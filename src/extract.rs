// Mark/options extractor: build the intermediate representation

use crate::codegen::to_source_text;
use crate::error::{ConvertError, Result};
use crate::ir::{Mark, OptionMap, PlotIr, Transform};
use crate::parser::ast::{Expr, Property};
use crate::recognize::PlotShape;

/// Build the plot options and mark list for a recognized plot expression.
///
/// Marks written as a call chain come first, last-written mark leading.
/// Marks listed under `marks_key` follow in the order they were written.
pub fn extract(shape: &PlotShape<'_>, marks_key: &str) -> Result<PlotIr> {
    let mut ir = PlotIr::default();

    if let PlotShape::Chained { chain, .. } = shape {
        ir.marks.extend(extract_chain(chain)?);
    }

    for prop in shape.config().unwrap_or_default() {
        let key = property_name(prop)?;
        if key == marks_key {
            let elements = match prop.value() {
                Expr::Array(elements) => elements,
                _ => {
                    return Err(ConvertError::shape(format!(
                        "`{}` must be an array of mark calls",
                        marks_key
                    )))
                }
            };
            for element in elements {
                let element = element.as_ref().ok_or_else(|| {
                    ConvertError::shape(format!("`{}` has an empty slot", marks_key))
                })?;
                ir.marks.push(extract_mark(element)?);
            }
        } else {
            ir.plot_options.insert(key, to_source_text(prop.value()));
        }
    }

    Ok(ir)
}

/// Walk a mark chain from its last call back to the namespace.
///
/// `Plot.a(..).b(..).c(..)` yields `[c, b, a]`.
pub fn extract_chain(call: &Expr) -> Result<Vec<Mark>> {
    let mut marks = Vec::new();
    let mut current = call;
    loop {
        marks.push(extract_mark(current)?);
        match previous_mark_call(current) {
            Some(previous) => current = previous,
            None => break,
        }
    }
    Ok(marks)
}

/// The mark call this one was chained onto, if any
fn previous_mark_call(call: &Expr) -> Option<&Expr> {
    let Expr::Call { callee, .. } = call else {
        return None;
    };
    match callee.member_object()? {
        previous @ Expr::Call {
            callee: previous_callee,
            ..
        } if previous_callee.member_name().is_some() => Some(previous),
        _ => None,
    }
}

fn constructor_name(callee: &Expr, what: &str) -> Result<String> {
    callee.member_name().map(str::to_string).ok_or_else(|| {
        ConvertError::shape(format!(
            "{} must be called as a namespace method such as `Plot.name(...)`",
            what
        ))
    })
}

fn property_name(prop: &Property) -> Result<String> {
    prop.key_name().ok_or_else(|| {
        ConvertError::shape("computed and spread properties are not supported in plot options")
    })
}

/// Extract a single mark from a mark-constructor call
pub fn extract_mark(call: &Expr) -> Result<Mark> {
    let (callee, arguments) = match call {
        Expr::Call {
            callee, arguments, ..
        } => (callee, arguments),
        other => {
            return Err(ConvertError::shape(format!(
                "expected a mark call, found `{}`",
                to_source_text(other)
            )))
        }
    };

    let mut mark = Mark::new(constructor_name(callee, "a mark")?);

    // `Plot.frame()` has no arguments at all
    if let Some(data) = arguments.first() {
        mark.options.insert("data", to_source_text(data));
    }

    match arguments.get(1) {
        None => {}
        Some(Expr::Object(props)) => {
            for prop in props {
                mark.options
                    .insert(property_name(prop)?, to_source_text(prop.value()));
            }
        }
        Some(transform @ Expr::Call { .. }) => {
            mark.transform = Some(extract_transform(transform)?);
        }
        Some(other) => {
            return Err(ConvertError::shape(format!(
                "mark `{}` options must be an object literal or a transform call, found `{}`",
                mark.name,
                to_source_text(other)
            )))
        }
    }

    Ok(mark)
}

fn extract_transform(call: &Expr) -> Result<Transform> {
    let Expr::Call {
        callee, arguments, ..
    } = call
    else {
        return Err(ConvertError::shape("expected a transform call"));
    };

    let name = constructor_name(callee, "a transform")?;

    let transform_options = match arguments.first() {
        None => None,
        Some(options @ Expr::Object(_)) => Some(to_source_text(options)),
        Some(other) => {
            return Err(ConvertError::shape(format!(
                "transform `{}` options must be an object literal, found `{}`",
                name,
                to_source_text(other)
            )))
        }
    };

    let mut mark_options = OptionMap::new();
    match arguments.get(1) {
        None => {}
        Some(Expr::Object(props)) => {
            for prop in props {
                let value = to_source_text(prop.value());
                mark_options.insert(property_name(prop)?, strip_quotes(&value));
            }
        }
        Some(other) => {
            return Err(ConvertError::shape(format!(
                "transform `{}` mark options must be an object literal, found `{}`",
                name,
                to_source_text(other)
            )))
        }
    }

    Ok(Transform {
        name,
        transform_options,
        mark_options,
    })
}

/// Drop the first and last character of a generated fragment.
///
/// Precondition: `fragment` is a double-quoted string literal such as `"weight"`,
/// so the result is its bare contents. Other fragments (numbers, expressions,
/// single-quoted strings) come out truncated; the emitter re-quotes whatever
/// is stored here.
pub fn strip_quotes(fragment: &str) -> String {
    let mut chars = fragment.chars();
    chars.next();
    chars.next_back();
    chars.as_str().to_string()
}
