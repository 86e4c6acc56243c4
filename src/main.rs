//
// main.rs
// img2dcm
//
// Entry point that hands execution straight to the CLI layer.
//
// Thales Matheus Mendonça Santos - December 2025

use img2dcm::cli;

fn main() -> anyhow::Result<()> {
    cli::run()
}
