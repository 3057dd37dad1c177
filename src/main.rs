mod error;
mod render;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::error::ErrorCode;
use crate::render::{Format, Request, What, run_render};

#[derive(Parser)]
#[command(version, about = "Reconstruct board, copper and part geometry from a PCB document", long_about = None)]
struct Cli {
    /// Board document (JSON)
    #[arg(value_name = "BOARD")]
    input: PathBuf,

    /// Compose configuration (YAML or JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// What to compose
    #[arg(long, value_enum, default_value_t = What::Pcb)]
    what: What,

    /// Shape kind: path, face or solid
    #[arg(long, value_name = "KIND")]
    kind: Option<String>,

    /// Layer index or name (defaults to the front copper)
    #[arg(long, value_name = "ID")]
    layer: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Summary)]
    format: Format,

    /// Output file (stdout when omitted)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() {
                ErrorCode::Usage as i32
            } else {
                0
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };
    init_tracing(cli.verbose);

    let req = Request {
        input: cli.input,
        config: cli.config,
        what: cli.what,
        kind: cli.kind,
        layer: cli.layer,
        format: cli.format,
        output: cli.output,
    };
    if let Err(err) = run_render(req) {
        eprintln!("Error: {err}");
        std::process::exit(err.code as i32);
    }
}
