//
// models.rs
// img2dcm
//
// Defines serializable data structures for per-file outcomes, run summaries, and verification reports.
//
// Thales Matheus Mendonça Santos - December 2025

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Result of one file's conversion attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutcome {
    pub source: PathBuf,
    pub output: Option<PathBuf>,
    pub error: Option<String>,
}

impl FileOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate of a whole conversion run. Callers assert on these counts
/// instead of scraping log output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub converted: usize,
    pub failed: usize,
    pub outcomes: Vec<FileOutcome>,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: Vec<FileOutcome>) -> Self {
        let converted = outcomes.iter().filter(|o| o.succeeded()).count();
        Self {
            total: outcomes.len(),
            converted,
            failed: outcomes.len() - converted,
            outcomes,
        }
    }
}

/// Report produced by reopening an emitted DICOM file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub valid: bool,
    pub missing_tags: Vec<String>,
    pub rows: Option<u16>,
    pub columns: Option<u16>,
    pub samples_per_pixel: Option<u16>,
    pub photometric_interpretation: Option<String>,
    pub bits_allocated: Option<u16>,
    pub bits_stored: Option<u16>,
    pub high_bit: Option<u16>,
    pub stats: Option<PixelStatistics>,
}

/// Basic statistics over the decoded pixel values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PixelStatistics {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    pub total_pixels: usize,
}
