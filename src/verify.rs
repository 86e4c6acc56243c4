//
// verify.rs
// img2dcm
//
// Reopens an emitted DICOM file, checks the mandatory attribute set and its invariants, and reports pixel statistics.
//
// Thales Matheus Mendonça Santos - December 2025

use std::path::Path;

use anyhow::{Context, Result};
use dicom::core::Tag;
use dicom::object::{open_file, DefaultDicomObject};
use dicom::pixeldata::PixelDecoder;
use ndarray::ArrayD;

use crate::models::{PixelStatistics, VerificationReport};

/// Tags every emitted instance must carry, with display names for the
/// missing-tag report.
const REQUIRED_TAGS: [(Tag, &str); 12] = [
    (Tag(0x0008, 0x0016), "SOPClassUID"),
    (Tag(0x0008, 0x0018), "SOPInstanceUID"),
    (Tag(0x0010, 0x0010), "PatientName"),
    (Tag(0x0020, 0x000D), "StudyInstanceUID"),
    (Tag(0x0020, 0x000E), "SeriesInstanceUID"),
    (Tag(0x0028, 0x0002), "SamplesPerPixel"),
    (Tag(0x0028, 0x0004), "PhotometricInterpretation"),
    (Tag(0x0028, 0x0010), "Rows"),
    (Tag(0x0028, 0x0011), "Columns"),
    (Tag(0x0028, 0x0100), "BitsAllocated"),
    (Tag(0x0028, 0x0101), "BitsStored"),
    (Tag(0x7FE0, 0x0010), "PixelData"),
];

/// Validate an emitted file and print a human-readable summary.
pub fn check_file(path: &Path) -> Result<()> {
    let report = inspect_file(path)?;

    if report.valid {
        println!("Arquivo válido: {}", path.display());
    } else {
        println!("Arquivo inválido: {}", path.display());
        for tag in &report.missing_tags {
            println!("  Atributo ausente: {}", tag);
        }
    }

    if let (Some(rows), Some(columns)) = (report.rows, report.columns) {
        println!("  Dimensões: {} x {}", rows, columns);
    }
    if let Some(pi) = &report.photometric_interpretation {
        println!(
            "  Photometric: {} | Samples per Pixel: {}",
            pi,
            report.samples_per_pixel.unwrap_or_default()
        );
    }
    if let (Some(allocated), Some(stored), Some(high)) =
        (report.bits_allocated, report.bits_stored, report.high_bit)
    {
        println!("  Bits: {}/{}/{}", allocated, stored, high);
    }
    if let Some(stats) = &report.stats {
        println!(
            "  Pixels: {} | Min: {:.2} | Max: {:.2} | Média: {:.2}",
            stats.total_pixels, stats.min, stats.max, stats.mean
        );
    }

    Ok(())
}

/// Reopen an emitted file and assemble the verification report.
pub fn inspect_file(path: &Path) -> Result<VerificationReport> {
    let obj: DefaultDicomObject = open_file(path).context("Falha ao abrir arquivo DICOM")?;

    let mut missing = Vec::new();
    for (tag, name) in REQUIRED_TAGS {
        if obj.element(tag).is_err() {
            missing.push(name.to_string());
        }
    }

    let rows = element_u16(&obj, Tag(0x0028, 0x0010));
    let columns = element_u16(&obj, Tag(0x0028, 0x0011));
    let samples_per_pixel = element_u16(&obj, Tag(0x0028, 0x0002));
    let bits_allocated = element_u16(&obj, Tag(0x0028, 0x0100));
    let bits_stored = element_u16(&obj, Tag(0x0028, 0x0101));
    let high_bit = element_u16(&obj, Tag(0x0028, 0x0102));
    let photometric_interpretation = element_str(&obj, Tag(0x0028, 0x0004));

    // Depth invariant: bits stored fills the allocation and the high bit
    // sits just below it (8/8/7 or 16/16/15).
    let depth_ok = matches!(
        (bits_allocated, bits_stored, high_bit),
        (Some(a), Some(s), Some(h)) if a == s && u32::from(h) + 1 == u32::from(s) && (a == 8 || a == 16)
    );
    // Samples must agree with the photometric interpretation.
    let photometric_ok = matches!(
        (samples_per_pixel, photometric_interpretation.as_deref()),
        (Some(1), Some("MONOCHROME2")) | (Some(3), Some("RGB"))
    );

    let stats = pixel_stats(&obj);
    let valid = missing.is_empty() && depth_ok && photometric_ok && stats.is_some();

    Ok(VerificationReport {
        valid,
        missing_tags: missing,
        rows,
        columns,
        samples_per_pixel,
        photometric_interpretation,
        bits_allocated,
        bits_stored,
        high_bit,
        stats,
    })
}

/// Decode the pixel data and fold basic statistics over it.
fn pixel_stats(obj: &DefaultDicomObject) -> Option<PixelStatistics> {
    let decoded = obj.decode_pixel_data().ok()?;

    // The converter only ever emits unsigned 8- or 16-bit samples.
    let values: ArrayD<f32> = if decoded.bits_allocated() > 8 {
        decoded.to_ndarray::<u16>().ok()?.mapv(|v| v as f32).into_dyn()
    } else {
        decoded.to_ndarray::<u8>().ok()?.mapv(|v| v as f32).into_dyn()
    };

    if values.is_empty() {
        return None;
    }

    let min = values.iter().fold(f32::INFINITY, |a, &b| a.min(b));
    let max = values.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    let mean = values.iter().sum::<f32>() / values.len() as f32;

    Some(PixelStatistics {
        min,
        max,
        mean,
        total_pixels: values.len(),
    })
}

fn element_u16(obj: &DefaultDicomObject, tag: Tag) -> Option<u16> {
    obj.element(tag).ok().and_then(|e| e.value().to_int().ok())
}

fn element_str(obj: &DefaultDicomObject, tag: Tag) -> Option<String> {
    obj.element(tag)
        .ok()
        .and_then(|e| e.to_str().ok())
        .map(|s| s.trim_end_matches([' ', '\0']).to_string())
}
