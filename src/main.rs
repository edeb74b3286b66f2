//! SPconverter - Batch Audio Normalizer

use anyhow::Context;
use clap::Parser;
use std::process;
use std::time::Instant;
use spconverter::{init_logging, Args, BatchWalker, ConversionEngine, ConverterConfig};

fn main() {
    let start = Instant::now();
    let args = Args::parse();
    init_logging(args.verbose);

    let code = match run(args) {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };

    println!("Execution Time: {} microseconds", start.elapsed().as_micros());
    process::exit(code);
}

/// Returns whether every file was copied or converted.
fn run(args: Args) -> anyhow::Result<bool> {
    if args.verbose {
        println!("{}", spconverter::get_library_info());
        println!();
    }

    if !args.input.exists() {
        anyhow::bail!("{} does not exist.", args.input.display());
    }

    let config = ConverterConfig::from_args(&args).context("invalid options")?;
    let engine = ConversionEngine::from_config(&config);
    let walker = BatchWalker::new(&config, &engine);

    let report = if args.input.is_dir() {
        walker.run(&args.input)
    } else {
        walker.run_single(&args.input)
    }
    .with_context(|| format!("cannot convert {}", args.input.display()))?;

    println!("{}", report);
    for (task, error) in report.failures() {
        eprintln!("Failed: {}: {}", task.source.display(), error);
    }

    Ok(!report.has_failures())
}
