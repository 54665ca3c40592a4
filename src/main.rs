mod display;
mod extract;
mod ifdpacker;
mod iflash;
mod image_tags;
mod paths;
mod report;
mod sevenzip;
mod signature;

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use extract::Extractor;
use report::ExtractionReport;
use sevenzip::SevenZip;

/// Extract Insyde iFlash / iFdPacker BIOS update images
#[derive(Parser)]
#[command(
    name = "ifdparse",
    about = "Extract the component images embedded in Insyde iFlash/iFdPacker BIOS update images",
    version
)]
struct Cli {
    /// BIOS update image to scan
    input: PathBuf,

    /// Directory extracted images are written into
    /// (defaults to <input>_extracted next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print a JSON report of every extracted file
    #[arg(long)]
    json: bool,

    /// 7-Zip executable used for SFX decompression
    #[arg(long, value_name = "PATH")]
    seven_zip: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let buffer = fs::read(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;

    if !extract::check_format(&buffer) {
        bail!(
            "{}: not an Insyde iFlash/iFdPacker update image",
            cli.input.display()
        );
    }

    let extract_path = cli
        .output
        .clone()
        .unwrap_or_else(|| paths::extract_folder(&cli.input));

    let decompressor = match cli.seven_zip {
        Some(executable) => SevenZip::with_executable(executable),
        None => SevenZip::new(),
    };

    let ok = Extractor::new(decompressor)
        .process(&buffer, &extract_path)
        .with_context(|| format!("extracting into {}", extract_path.display()))?;

    let extraction_report = ExtractionReport::collect(&extract_path)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&extraction_report)?);
    } else {
        println!();
        println!(
            "{} file(s) extracted to {}",
            extraction_report.files.len(),
            extract_path.display()
        );
        for file in &extraction_report.files {
            println!("  {} ({})", file.name, file.size_display);
        }
    }

    if !ok {
        bail!("extraction completed with failures");
    }

    Ok(())
}
