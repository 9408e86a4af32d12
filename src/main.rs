use std::fs::File;
use std::io::BufReader;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use gcode_estimator::analyze_reader;
use gcode_estimator::config::{Args, PrinterConfig};
use gcode_estimator::report;

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = PrinterConfig::from_args(&args)?;

    let file = File::open(&args.file)
        .with_context(|| format!("failed to open {}", args.file.display()))?;
    let file_size = file
        .metadata()
        .with_context(|| format!("failed to stat {}", args.file.display()))?
        .len();

    let started = Instant::now();
    let result = analyze_reader(BufReader::new(file), &config, file_size)?;
    let elapsed = started.elapsed();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", report::render(&result));
    }

    // Wall-clock analysis duration, distinct from the simulated print time
    info!("analyzed {} in {:.2?}", args.file.display(), elapsed);

    Ok(())
}
