//! RSRC Compiler Driver
//!
//! Reads one source file, translates it and writes RSRC assembly to stdout
//! or to the file given with `--output`.

use clap::{Parser, ValueEnum};
use log::{debug, info};
use rsrcc_codegen::emit::{DEFAULT_ORIGIN, DEFAULT_STACK_TOP};
use rsrcc_codegen::{TargetConfig, TextSink};
use rsrcc_common::CompilerError;
use rsrcc_frontend::Frontend;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "rsrcc")]
#[command(about = "Compiler for a small imperative language targeting the RSRC architecture")]
#[command(version = "0.1.0")]
struct Cli {
    /// Source file
    source: PathBuf,

    /// Output assembly file, stdout when absent
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Address of the first instruction (`.org`)
    #[arg(long, default_value_t = DEFAULT_ORIGIN)]
    origin: u32,

    /// Initial stack pointer, a non-negative word
    #[arg(long, default_value_t = DEFAULT_STACK_TOP, value_parser = clap::value_parser!(i32).range(0..))]
    stack_top: i32,

    /// How diagnostics are printed
    #[arg(long, value_enum, default_value_t = ErrorFormat::Human)]
    error_format: ErrorFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ErrorFormat {
    Human,
    Json,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let source = match fs::read_to_string(&cli.source) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Couldn't open file {}", cli.source.display());
            process::exit(1);
        }
    };

    let config = TargetConfig {
        origin: cli.origin,
        stack_top: cli.stack_top,
    };
    debug!("target origin {} stack top {}", config.origin, config.stack_top);

    if let Err(e) = compile_file(&cli, &source, &config) {
        report(&e, cli.error_format);
        process::exit(1);
    }
}

fn compile_file(cli: &Cli, source: &str, config: &TargetConfig) -> Result<(), CompilerError> {
    let filename = cli.source.display().to_string();
    info!("Compiling {}", filename);

    match &cli.output {
        Some(path) => {
            let file = File::create(path)?;
            compile_into(source, &filename, config, BufWriter::new(file))?;
            info!("Assembly written to {}", path.display());
            Ok(())
        }
        None => compile_into(source, &filename, config, io::stdout().lock()),
    }
}

/// Stream the translation into `out`. Whatever was emitted before a
/// translation error stays in the output.
fn compile_into<W: Write>(source: &str, filename: &str, config: &TargetConfig, out: W) -> Result<(), CompilerError> {
    let mut sink = TextSink::new(out);
    let translated = Frontend::compile(source, filename, config, &mut sink);
    let lines = sink.lines();
    let flushed = sink.finish();

    // A translation error takes precedence over a write error.
    translated?;
    flushed?;
    debug!("{} lines of assembly", lines);
    Ok(())
}

fn report(err: &CompilerError, format: ErrorFormat) {
    match format {
        ErrorFormat::Human => eprintln!("error: {}", err),
        ErrorFormat::Json => match serde_json::to_string(err) {
            Ok(json) => eprintln!("{}", json),
            Err(_) => eprintln!("error: {}", err),
        },
    }
}
