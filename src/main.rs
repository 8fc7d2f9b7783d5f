use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context;
use clap::Parser;
use predict_parser::report;

/// Scans, parses and checks a source file, then writes the sets, the parse table, the
/// parse trace, the symbol table and the diagnostics to the output directory.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Source file to compile.
    input: PathBuf,

    /// Directory the reports are written to.
    #[arg(short, long, default_value = "output")]
    out_dir: PathBuf,

    /// Do not record the step-by-step parse trace.
    #[arg(long)]
    no_trace: bool,

    /// Log verbosity, repeat for more.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let compilation = predict::compile(&source, !args.no_trace)?;

    for diagnostic in compilation.diagnostics.iter() {
        eprintln!("{diagnostic}");
    }

    write_reports(&args.out_dir, &compilation)?;

    match compilation.succeeded() {
        true => {
            println!("{}: accepted", args.input.display());
            Ok(ExitCode::SUCCESS)
        }
        false => {
            println!(
                "{}: rejected with {} diagnostic(s)",
                args.input.display(),
                compilation.diagnostics.len()
            );
            Ok(ExitCode::FAILURE)
        }
    }
}

fn write_reports(out_dir: &Path, compilation: &predict::Compilation) -> anyhow::Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let grammar = compilation.engine.grammar();
    let reports = [
        ("tokens.csv", report::tokens(&compilation.tokens)),
        (
            "first_follow.txt",
            report::first_follow(grammar, compilation.engine.sets()),
        ),
        (
            "parse_table.md",
            report::parse_table(grammar, compilation.engine.table()),
        ),
        (
            "parsing_stages.md",
            report::trace(grammar, &compilation.parse.trace),
        ),
        ("symbol_table.csv", report::symbols(&compilation.symbols)),
        ("errors.txt", report::diagnostics(&compilation.diagnostics)),
    ];

    for (name, contents) in reports {
        let path = out_dir.join(name);
        fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "report written");
    }

    Ok(())
}
