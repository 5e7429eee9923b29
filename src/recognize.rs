// Grammar recognizer: classify the top-level plot expression

use crate::error::{ConvertError, Result};
use crate::parser::ast::{Expr, Program, Property};

/// The two top-level forms a plot expression may take
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlotShape<'a> {
    /// `Plot.plot(options?)`
    Direct {
        config: Option<&'a [Property]>,
    },
    /// `Plot.mark1(...).mark2(...).plot(options?)`
    ///
    /// `chain` is the last mark call written, i.e. the receiver of the
    /// configuration call.
    Chained {
        chain: &'a Expr,
        config: Option<&'a [Property]>,
    },
}

impl<'a> PlotShape<'a> {
    pub fn config(&self) -> Option<&'a [Property]> {
        match self {
            PlotShape::Direct { config } | PlotShape::Chained { config, .. } => *config,
        }
    }
}

/// Locate the configuration call and mark chain of a parsed program
pub fn recognize(program: &Program) -> Result<PlotShape<'_>> {
    let statement = match program.body.as_slice() {
        [statement] => statement,
        [] => return Err(ConvertError::shape("expected a plot expression, found nothing")),
        _ => {
            return Err(ConvertError::shape(format!(
                "expected a single plot expression, found {} statements",
                program.body.len()
            )))
        }
    };

    let (callee, arguments) = match statement {
        Expr::Call {
            callee, arguments, ..
        } => (callee.as_ref(), arguments.as_slice()),
        _ => return Err(ConvertError::shape("the plot expression must be a call")),
    };

    let receiver = match callee {
        Expr::Member { object, .. } if callee.member_name().is_some() => object.as_ref(),
        _ => {
            return Err(ConvertError::shape(
                "the configuration call must be a method call such as `Plot.plot(...)`",
            ))
        }
    };

    let config = match arguments {
        [] => None,
        [Expr::Object(props)] => Some(props.as_slice()),
        [_] => {
            return Err(ConvertError::shape(
                "the configuration argument must be an object literal",
            ))
        }
        _ => {
            return Err(ConvertError::shape(
                "the configuration call takes at most one argument",
            ))
        }
    };

    match receiver {
        Expr::Call { .. } => Ok(PlotShape::Chained {
            chain: receiver,
            config,
        }),
        Expr::Identifier(_) => Ok(PlotShape::Direct { config }),
        _ => Err(ConvertError::shape(
            "the configuration call must be made on the plot namespace or a mark chain",
        )),
    }
}
