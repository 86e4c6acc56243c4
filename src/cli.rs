//
// cli.rs
// img2dcm
//
// Defines the CLI surface with Clap and dispatches user-selected commands to the corresponding modules.
//
// Thales Matheus Mendonça Santos - December 2025

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::convert::{self, ConversionConfig};
use crate::verify;

/// Command-line interface glue code: defines the available verbs and dispatches to modules.
#[derive(Parser)]
#[command(name = "img2dcm")]
#[command(about = "Conversor de imagens raster para DICOM em Rust", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a directory tree of images into mirrored DICOM files
    Convert {
        /// Root of the source image tree
        #[arg(short, long)]
        input: PathBuf,
        /// Root the mirrored .dcm tree is written under
        #[arg(short, long)]
        output: PathBuf,
        #[arg(short, long, value_enum, default_value_t = IdentifierMode::Series)]
        mode: IdentifierMode,
        /// Write the run summary as JSON to this path
        #[arg(long)]
        summary: Option<PathBuf>,
    },
    /// Check an emitted DICOM file for the mandatory attribute set
    Verify { file: PathBuf },
}

/// How Study/Series identifiers are assigned across a run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum IdentifierMode {
    /// One study per run, one series per folder, slices in numeric order
    Series,
    /// Independent study and series per image, no ordering attributes
    Flat,
}

pub fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Parse the raw CLI arguments once and dispatch to a subcommand handler.
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            output,
            mode,
            summary,
        } => {
            let config = ConversionConfig {
                input_dir: input,
                output_dir: output,
                mode,
            };
            let report = convert::run_conversion(&config)?;
            println!(
                "Convertidos: {} | Falhas: {} | Total: {}",
                report.converted, report.failed, report.total
            );
            if let Some(path) = summary {
                let json = serde_json::to_string_pretty(&report)?;
                std::fs::write(&path, json)?;
                println!("Resumo salvo em: {:?}", path);
            }
        }
        Commands::Verify { file } => verify::check_file(&file)?,
    }

    Ok(())
}
