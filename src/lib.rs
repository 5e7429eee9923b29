// Library exports for plot2svelte

pub mod codegen;
pub mod emit;
pub mod error;
pub mod extract;
pub mod ir;
pub mod parser;
pub mod recognize;

pub use error::{ConvertError, Result};
pub use ir::{Mark, OptionMap, PlotIr, Transform};

use serde::Deserialize;

/// Output settings for a conversion
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConvertOptions {
    /// Name of the root container element
    #[serde(default = "default_root")]
    pub root: String,
    /// Prefix written before each mark element
    #[serde(default = "default_indent")]
    pub indent: String,
    /// Configuration property holding the mark array
    #[serde(default = "default_marks_key")]
    pub marks_key: String,
}

fn default_root() -> String { "Plot".to_string() }
fn default_indent() -> String { "  ".to_string() }
fn default_marks_key() -> String { "marks".to_string() }

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            root: default_root(),
            indent: default_indent(),
            marks_key: default_marks_key(),
        }
    }
}

/// Parse a plot expression into its plot options and mark list
pub fn parse_plot_string(source: &str, options: &ConvertOptions) -> Result<PlotIr> {
    let program = parser::parse_program(source)?;
    let shape = recognize::recognize(&program)?;
    extract::extract(&shape, &options.marks_key)
}

/// Convert a plot expression to markup using the given options
pub fn convert_with_options(source: &str, options: &ConvertOptions) -> Result<String> {
    let ir = parse_plot_string(source, options)?;
    emit::emit(&ir, options)
}

/// Convert a plot expression to markup with the default `<Plot>` root
pub fn convert_to_svelte(source: &str) -> Result<String> {
    convert_with_options(source, &ConvertOptions::default())
}
