// Error taxonomy for the conversion pipeline

use thiserror::Error;

/// Failure raised while converting a plot expression
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    /// The source text is not valid in the supported expression grammar
    #[error("SyntaxError: {message} (at offset {offset})")]
    Syntax { offset: usize, message: String },

    /// The expression parsed but does not have a shape the converter understands
    #[error("unsupported plot expression: {0}")]
    Shape(String),
}

impl ConvertError {
    pub fn syntax(offset: usize, message: impl Into<String>) -> Self {
        ConvertError::Syntax {
            offset,
            message: message.into(),
        }
    }

    pub fn shape(message: impl Into<String>) -> Self {
        ConvertError::Shape(message.into())
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
