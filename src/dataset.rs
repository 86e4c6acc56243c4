//
// dataset.rs
// img2dcm
//
// Builds the single-frame DICOM dataset for one normalized raster and writes it as explicit VR little endian.
//
// Thales Matheus Mendonça Santos - December 2025

use std::path::Path;

use chrono::Local;
use dicom::core::{DataElement, PrimitiveValue, Tag, VR};
use dicom::dictionary_std::StandardDataDictionary;
use dicom::object::{FileDicomObject, FileMetaTableBuilder, InMemDicomObject};
use dicom::transfer_syntax::entries::EXPLICIT_VR_LITTLE_ENDIAN;
use dicom_core::dicom_value;

use crate::error::ConvertError;
use crate::pixels::NormalizedPixels;

/// SOP class assigned to every emitted instance (CT Image Storage), which
/// is how the converted slices are consumed downstream.
pub const CT_IMAGE_STORAGE: &str = "1.2.840.10008.5.1.4.1.1.2";

/// Arbitrary spacing in millimetres between consecutive slices; gives
/// viewers a consistent z axis for 3D reconstruction.
const SLICE_SPACING_MM: f64 = 1.5;

/// Identifiers assigned to one instance before encoding.
#[derive(Debug, Clone)]
pub struct InstanceIdentity {
    pub sop_instance_uid: String,
    pub study_instance_uid: String,
    pub series_instance_uid: String,
    pub ordering: Option<SliceOrdering>,
}

/// Ordering attributes for one slice of a series.
#[derive(Debug, Clone, Copy)]
pub struct SliceOrdering {
    pub instance_number: u32,
    pub slice_location: f64,
    pub position_z: f64,
}

impl SliceOrdering {
    /// Ordering attributes for the n-th convertible file of a folder,
    /// with n starting at 1.
    pub fn from_index(instance_number: u32) -> Self {
        Self {
            instance_number,
            slice_location: f64::from(instance_number),
            position_z: f64::from(instance_number) * SLICE_SPACING_MM,
        }
    }
}

/// Populate the mandatory and identity attribute sets for one image and
/// write the dataset to `output`.
pub fn write_dicom(
    output: &Path,
    pixels: &NormalizedPixels,
    patient_name: &str,
    identity: &InstanceIdentity,
) -> Result<(), ConvertError> {
    let rows = dimension(pixels.height)?;
    let columns = dimension(pixels.width)?;

    let now = Local::now();
    let date = now.format("%Y%m%d").to_string();
    let time = now.format("%H%M%S").to_string();

    let mut obj = InMemDicomObject::new_empty_with_dict(StandardDataDictionary);

    obj.put(DataElement::new(
        Tag(0x0008, 0x0016),
        VR::UI,
        PrimitiveValue::from(CT_IMAGE_STORAGE),
    )); // SOP Class UID
    obj.put(DataElement::new(
        Tag(0x0008, 0x0018),
        VR::UI,
        PrimitiveValue::from(identity.sop_instance_uid.as_str()),
    )); // SOP Instance UID
    obj.put(DataElement::new(
        Tag(0x0008, 0x0020),
        VR::DA,
        PrimitiveValue::from(date.as_str()),
    )); // Study Date
    obj.put(DataElement::new(
        Tag(0x0008, 0x0023),
        VR::DA,
        PrimitiveValue::from(date.as_str()),
    )); // Content Date
    obj.put(DataElement::new(
        Tag(0x0008, 0x0033),
        VR::TM,
        PrimitiveValue::from(time.as_str()),
    )); // Content Time
    obj.put(DataElement::new(
        Tag(0x0008, 0x0060),
        VR::CS,
        PrimitiveValue::from("CT"),
    )); // Modality
    obj.put(DataElement::new(
        Tag(0x0010, 0x0010),
        VR::PN,
        PrimitiveValue::from(patient_name),
    )); // Patient Name
    obj.put(DataElement::new(
        Tag(0x0020, 0x000D),
        VR::UI,
        PrimitiveValue::from(identity.study_instance_uid.as_str()),
    )); // Study Instance UID
    obj.put(DataElement::new(
        Tag(0x0020, 0x000E),
        VR::UI,
        PrimitiveValue::from(identity.series_instance_uid.as_str()),
    )); // Series Instance UID

    if let Some(order) = &identity.ordering {
        obj.put(DataElement::new(
            Tag(0x0020, 0x0013),
            VR::IS,
            PrimitiveValue::from(order.instance_number.to_string()),
        )); // Instance Number
        let position_z = format!("{}", order.position_z);
        obj.put(DataElement::new(
            Tag(0x0020, 0x0032),
            VR::DS,
            dicom_value!(Strs, ["0", "0", position_z.as_str()]),
        )); // Image Position (Patient)
        obj.put(DataElement::new(
            Tag(0x0020, 0x1041),
            VR::DS,
            PrimitiveValue::from(format!("{}", order.slice_location)),
        )); // Slice Location
    }

    obj.put(DataElement::new(
        Tag(0x0028, 0x0002),
        VR::US,
        PrimitiveValue::from(pixels.samples_per_pixel()),
    )); // Samples per Pixel
    obj.put(DataElement::new(
        Tag(0x0028, 0x0004),
        VR::CS,
        PrimitiveValue::from(pixels.photometric_interpretation()),
    )); // Photometric Interpretation
    obj.put(DataElement::new(
        Tag(0x0028, 0x0006),
        VR::US,
        PrimitiveValue::from(0_u16),
    )); // Planar Configuration
    obj.put(DataElement::new(
        Tag(0x0028, 0x0008),
        VR::IS,
        PrimitiveValue::from("1"),
    )); // Number of Frames
    obj.put(DataElement::new(
        Tag(0x0028, 0x0010),
        VR::US,
        PrimitiveValue::from(rows),
    )); // Rows
    obj.put(DataElement::new(
        Tag(0x0028, 0x0011),
        VR::US,
        PrimitiveValue::from(columns),
    )); // Columns
    obj.put(DataElement::new(
        Tag(0x0028, 0x0100),
        VR::US,
        PrimitiveValue::from(pixels.bits_allocated()),
    )); // Bits Allocated
    obj.put(DataElement::new(
        Tag(0x0028, 0x0101),
        VR::US,
        PrimitiveValue::from(pixels.bits_stored()),
    )); // Bits Stored
    obj.put(DataElement::new(
        Tag(0x0028, 0x0102),
        VR::US,
        PrimitiveValue::from(pixels.high_bit()),
    )); // High Bit
    obj.put(DataElement::new(
        Tag(0x0028, 0x0103),
        VR::US,
        PrimitiveValue::from(0_u16),
    )); // Pixel Representation

    // 16-bit samples go out as OW, everything else as OB.
    let vr = if pixels.bits_allocated() > 8 {
        VR::OW
    } else {
        VR::OB
    };
    obj.put(DataElement::new(
        Tag(0x7FE0, 0x0010),
        vr,
        PrimitiveValue::from(pixels.to_pixel_bytes()),
    )); // Pixel Data

    let file_meta = FileMetaTableBuilder::new()
        .transfer_syntax(EXPLICIT_VR_LITTLE_ENDIAN.uid())
        .media_storage_sop_class_uid(CT_IMAGE_STORAGE)
        .media_storage_sop_instance_uid(identity.sop_instance_uid.as_str())
        .build()
        .map_err(|e| ConvertError::Encode(e.to_string()))?;

    let mut file_obj = FileDicomObject::new_empty_with_dict_and_meta(StandardDataDictionary, file_meta);
    for elem in obj {
        file_obj.put(elem);
    }

    file_obj
        .write_to_file(output)
        .map_err(|e| ConvertError::Encode(e.to_string()))?;

    Ok(())
}

fn dimension(value: u32) -> Result<u16, ConvertError> {
    u16::try_from(value).map_err(|_| {
        ConvertError::Encode(format!(
            "image dimension {} exceeds the DICOM limit of 65535",
            value
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixels::PixelBuffer;
    use dicom::object::open_file;
    use tempfile::tempdir;

    fn identity_with(ordering: Option<SliceOrdering>) -> InstanceIdentity {
        InstanceIdentity {
            sop_instance_uid: crate::uid::new_uid(),
            study_instance_uid: crate::uid::new_uid(),
            series_instance_uid: crate::uid::new_uid(),
            ordering,
        }
    }

    fn element_str(obj: &dicom::object::DefaultDicomObject, tag: Tag) -> String {
        obj.element(tag)
            .expect("element present")
            .to_str()
            .expect("string value")
            .trim_end_matches([' ', '\0'])
            .to_string()
    }

    #[test]
    fn eight_bit_grayscale_dataset_is_consistent() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("gray.dcm");
        let pixels = NormalizedPixels {
            width: 2,
            height: 2,
            buffer: PixelBuffer::Gray8(vec![0, 64, 128, 255]),
        };

        write_dicom(&path, &pixels, "FolderA", &identity_with(None)).expect("write");

        let obj = open_file(&path).expect("reopen");
        assert_eq!(element_str(&obj, Tag(0x0028, 0x0004)), "MONOCHROME2");
        assert_eq!(element_str(&obj, Tag(0x0010, 0x0010)), "FolderA");

        let rows: u16 = obj
            .element(Tag(0x0028, 0x0010))
            .unwrap()
            .value()
            .to_int()
            .unwrap();
        let bits: u16 = obj
            .element(Tag(0x0028, 0x0100))
            .unwrap()
            .value()
            .to_int()
            .unwrap();
        let high_bit: u16 = obj
            .element(Tag(0x0028, 0x0102))
            .unwrap()
            .value()
            .to_int()
            .unwrap();
        assert_eq!(rows, 2);
        assert_eq!(bits, 8);
        assert_eq!(high_bit, 7);

        let stored = obj
            .element(Tag(0x7FE0, 0x0010))
            .unwrap()
            .to_bytes()
            .unwrap()
            .into_owned();
        assert_eq!(stored, vec![0, 64, 128, 255]);

        // No ordering attributes outside series mode.
        assert!(obj.element(Tag(0x0020, 0x0013)).is_err());
        assert!(obj.element(Tag(0x0020, 0x1041)).is_err());
    }

    #[test]
    fn sixteen_bit_samples_are_little_endian_words() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("deep.dcm");
        let pixels = NormalizedPixels {
            width: 2,
            height: 1,
            buffer: PixelBuffer::Gray16(vec![0x0102, 0xFFEE]),
        };

        write_dicom(&path, &pixels, "CT1", &identity_with(None)).expect("write");

        let obj = open_file(&path).expect("reopen");
        let bits: u16 = obj
            .element(Tag(0x0028, 0x0100))
            .unwrap()
            .value()
            .to_int()
            .unwrap();
        let high_bit: u16 = obj
            .element(Tag(0x0028, 0x0102))
            .unwrap()
            .value()
            .to_int()
            .unwrap();
        assert_eq!(bits, 16);
        assert_eq!(high_bit, 15);

        let stored = obj
            .element(Tag(0x7FE0, 0x0010))
            .unwrap()
            .to_bytes()
            .unwrap()
            .into_owned();
        assert_eq!(stored, vec![0x02, 0x01, 0xEE, 0xFF]);
    }

    #[test]
    fn ordering_attributes_follow_the_instance_number() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("slice.dcm");
        let pixels = NormalizedPixels {
            width: 1,
            height: 1,
            buffer: PixelBuffer::Gray8(vec![42]),
        };

        write_dicom(
            &path,
            &pixels,
            "serieA",
            &identity_with(Some(SliceOrdering::from_index(3))),
        )
        .expect("write");

        let obj = open_file(&path).expect("reopen");
        let instance: i32 = obj
            .element(Tag(0x0020, 0x0013))
            .unwrap()
            .value()
            .to_int()
            .unwrap();
        let location: f64 = obj
            .element(Tag(0x0020, 0x1041))
            .unwrap()
            .value()
            .to_float64()
            .unwrap();
        let position = obj
            .element(Tag(0x0020, 0x0032))
            .unwrap()
            .value()
            .to_multi_float64()
            .unwrap();

        assert_eq!(instance, 3);
        assert!((location - 3.0).abs() < f64::EPSILON);
        assert_eq!(position.len(), 3);
        assert!((position[2] - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn oversized_dimensions_are_rejected_before_writing() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("huge.dcm");
        let pixels = NormalizedPixels {
            width: 70_000,
            height: 1,
            buffer: PixelBuffer::Gray8(vec![0; 70_000]),
        };

        let err = write_dicom(&path, &pixels, "X", &identity_with(None)).unwrap_err();
        assert!(matches!(err, ConvertError::Encode(_)));
        assert!(!path.exists());
    }
}
