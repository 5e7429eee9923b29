use anyhow::{Context, Result};
use clap::Parser;
use plot2svelte::{emit, parse_plot_string, ConvertOptions};
use std::io::{self, Read, Write};

#[derive(Parser, Debug)]
#[command(name = "plot2svelte")]
#[command(about = "Convert Observable Plot expressions into Svelte component markup", long_about = None)]
struct Args {
    /// Plot expression (e.g., 'Plot.lineY(aapl, {x: "Date", y: "Close"}).plot()'); read from stdin when omitted
    expression: Option<String>,

    /// Conversion options as JSON (e.g., '{"root": "Plot", "indent": "  "}')
    #[arg(long)]
    options: Option<String>,

    /// Root element name (overrides --options)
    #[arg(long)]
    root: Option<String>,

    /// Print the extracted plot options and marks as JSON instead of markup
    #[arg(long)]
    emit_ir: bool,

    /// Print diagnostics to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn load_options(args: &Args) -> Result<ConvertOptions> {
    let mut options = match &args.options {
        Some(json) => serde_json::from_str(json).context("Failed to parse --options JSON")?,
        None => ConvertOptions::default(),
    };
    if let Some(root) = &args.root {
        options.root = root.clone();
    }
    Ok(options)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let options = load_options(&args)?;

    let source = match &args.expression {
        Some(expression) => expression.clone(),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read plot expression from stdin")?;
            buffer
        }
    };

    if source.trim().is_empty() {
        eprintln!("Warning: empty plot expression");
    }

    let ir = parse_plot_string(&source, &options).context("Failed to convert plot expression")?;
    if args.verbose {
        eprintln!("Read {} byte(s) of input", source.len());
        eprintln!(
            "Extracted {} plot option(s), {} mark(s)",
            ir.plot_options.len(),
            ir.marks.len()
        );
    }

    let output = if args.emit_ir {
        serde_json::to_string_pretty(&ir).context("Failed to serialize plot IR")?
    } else {
        emit::emit(&ir, &options).context("Failed to render markup")?
    };

    // Write markup to stdout
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", output).context("Failed to write output to stdout")?;
    handle.flush().context("Failed to flush stdout")?;

    Ok(())
}
