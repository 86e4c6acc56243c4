//
// convert.rs
// img2dcm
//
// Walks an input tree, plans identifiers and slice order per folder, and converts every supported raster image into a mirrored DICOM file.
//
// Thales Matheus Mendonça Santos - December 2025

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use tracing::{error, info};
use walkdir::WalkDir;

use crate::cli::IdentifierMode;
use crate::dataset::{self, InstanceIdentity, SliceOrdering};
use crate::error::ConvertError;
use crate::models::{FileOutcome, RunSummary};
use crate::ordering;
use crate::pixels;
use crate::uid;

/// Extensions accepted for conversion, compared case-insensitively.
const SUPPORTED_EXTENSIONS: [&str; 5] = ["png", "bmp", "jpg", "jpeg", "tiff"];

/// Caller-facing configuration of one conversion run.
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub mode: IdentifierMode,
}

/// Identifier state for one run: the run-wide study UID and the lazy
/// folder → series UID map. Owned by the planner, never module state.
struct RunContext {
    mode: IdentifierMode,
    study_uid: String,
    series_by_folder: BTreeMap<PathBuf, String>,
}

impl RunContext {
    fn new(mode: IdentifierMode) -> Self {
        Self {
            mode,
            study_uid: uid::new_uid(),
            series_by_folder: BTreeMap::new(),
        }
    }

    fn identity_for(&mut self, folder: &Path, index_in_folder: u32) -> InstanceIdentity {
        match self.mode {
            IdentifierMode::Series => {
                let series = self
                    .series_by_folder
                    .entry(folder.to_path_buf())
                    .or_insert_with(uid::new_uid)
                    .clone();
                InstanceIdentity {
                    sop_instance_uid: uid::new_uid(),
                    study_instance_uid: self.study_uid.clone(),
                    series_instance_uid: series,
                    ordering: Some(SliceOrdering::from_index(index_in_folder)),
                }
            }
            IdentifierMode::Flat => InstanceIdentity {
                sop_instance_uid: uid::new_uid(),
                study_instance_uid: uid::new_uid(),
                series_instance_uid: uid::new_uid(),
                ordering: None,
            },
        }
    }
}

/// One fully-resolved unit of work. Every identifier, instance number,
/// and path is fixed here, before the parallel phase starts.
struct ConversionTask {
    source: PathBuf,
    output: PathBuf,
    patient_name: String,
    identity: InstanceIdentity,
}

/// Convert every supported image under `input_dir` into a `.dcm` file
/// under the mirrored path in `output_dir`.
pub fn run_conversion(config: &ConversionConfig) -> Result<RunSummary> {
    if !config.input_dir.is_dir() {
        bail!("Input directory not found: {:?}", config.input_dir);
    }
    // The output root is the only fatal filesystem failure: without it no
    // file can be produced at all.
    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create output root {:?}", config.output_dir))?;

    let tasks = plan_run(config);
    info!("Encontrados {} arquivos para converter.", tasks.len());

    let outcomes: Vec<FileOutcome> = tasks
        .par_iter()
        .map(|task| match convert_file(task) {
            Ok(()) => {
                info!(
                    source = %task.source.display(),
                    output = %task.output.display(),
                    "converted"
                );
                FileOutcome {
                    source: task.source.clone(),
                    output: Some(task.output.clone()),
                    error: None,
                }
            }
            Err(e) => {
                error!(source = %task.source.display(), "{e}");
                FileOutcome {
                    source: task.source.clone(),
                    output: None,
                    error: Some(e.to_string()),
                }
            }
        })
        .collect();

    Ok(RunSummary::from_outcomes(outcomes))
}

/// Group convertible files by folder, fix slice order, and assign all
/// identifiers sequentially.
fn plan_run(config: &ConversionConfig) -> Vec<ConversionTask> {
    let mut by_folder: BTreeMap<PathBuf, Vec<String>> = BTreeMap::new();

    for entry in WalkDir::new(&config.input_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !is_supported(name) {
            continue;
        }
        let folder = entry
            .path()
            .parent()
            .unwrap_or(&config.input_dir)
            .to_path_buf();
        by_folder.entry(folder).or_default().push(name.to_string());
    }

    let mut ctx = RunContext::new(config.mode);
    let mut tasks = Vec::new();

    for (folder, mut names) in by_folder {
        names.sort_by(|a, b| ordering::slice_order(a, b));

        let relative = folder
            .strip_prefix(&config.input_dir)
            .unwrap_or(Path::new(""));
        let out_folder = config.output_dir.join(relative);
        // The immediate containing folder doubles as the patient/series
        // discriminator, as in the source trees this tool is pointed at.
        let patient_name = folder
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();

        for (index, name) in names.iter().enumerate() {
            let stem = Path::new(name)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(name);
            let identity = ctx.identity_for(&folder, index as u32 + 1);
            tasks.push(ConversionTask {
                source: folder.join(name),
                output: out_folder.join(format!("{stem}.dcm")),
                patient_name: patient_name.clone(),
                identity,
            });
        }
    }

    tasks
}

fn convert_file(task: &ConversionTask) -> Result<(), ConvertError> {
    let decoded = image::open(&task.source)?;
    let pixels = pixels::normalize(decoded)?;

    // create_dir_all is idempotent and race-free, so mirrored folders can
    // be created lazily from the parallel phase.
    if let Some(parent) = task.output.parent() {
        fs::create_dir_all(parent)?;
    }

    dataset::write_dicom(&task.output, &pixels, &task.patient_name, &task.identity)
}

fn is_supported(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| ext.eq_ignore_ascii_case(s))
        })
}
