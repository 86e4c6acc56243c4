//
// lib.rs
// img2dcm
//
// Exposes the crate's modules and re-exports the conversion entry points for both binary and library consumers.
//
// Thales Matheus Mendonça Santos - December 2025

// Public surface of the library: each module mirrors a CLI verb or shared utility.
pub mod cli;
pub mod convert;
pub mod dataset;
pub mod error;
pub mod models;
pub mod ordering;
pub mod pixels;
pub mod uid;
pub mod verify;

pub use cli::{run as run_cli, Cli, Commands, IdentifierMode};
pub use convert::{run_conversion, ConversionConfig};
pub use error::ConvertError;
