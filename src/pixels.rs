//
// pixels.rs
// img2dcm
//
// Reduces decoded raster images to the pixel layouts a DICOM dataset can carry and derives the photometric attributes from them.
//
// Thales Matheus Mendonça Santos - December 2025

use image::DynamicImage;

use crate::error::ConvertError;

/// Pixel samples after mode normalization. Only these three layouts are
/// ever written into a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PixelBuffer {
    Gray8(Vec<u8>),
    Gray16(Vec<u16>),
    Rgb8(Vec<u8>),
}

/// A decoded raster reduced to a DICOM-representable form.
#[derive(Debug, Clone)]
pub struct NormalizedPixels {
    pub width: u32,
    pub height: u32,
    pub buffer: PixelBuffer,
}

/// Map the source pixel mode onto a storage class.
///
/// Indexed palettes are already expanded to RGB(A) by the decoders, and
/// CMYK JPEGs arrive as RGB, so both land on the color branch. 16-bit
/// grayscale keeps its native depth; alpha channels are dropped.
pub fn normalize(decoded: DynamicImage) -> Result<NormalizedPixels, ConvertError> {
    use image::ColorType::*;

    let (width, height) = (decoded.width(), decoded.height());
    let buffer = match decoded.color() {
        L8 | La8 => PixelBuffer::Gray8(decoded.to_luma8().into_raw()),
        L16 | La16 => PixelBuffer::Gray16(decoded.to_luma16().into_raw()),
        // 16-bit color has no mapping of its own here; it is stored as 8-bit RGB.
        Rgb8 | Rgba8 | Rgb16 | Rgba16 => PixelBuffer::Rgb8(decoded.to_rgb8().into_raw()),
        other => return Err(ConvertError::UnsupportedMode(other)),
    };

    Ok(NormalizedPixels {
        width,
        height,
        buffer,
    })
}

impl NormalizedPixels {
    pub fn photometric_interpretation(&self) -> &'static str {
        match self.buffer {
            PixelBuffer::Rgb8(_) => "RGB",
            _ => "MONOCHROME2",
        }
    }

    pub fn samples_per_pixel(&self) -> u16 {
        match self.buffer {
            PixelBuffer::Rgb8(_) => 3,
            _ => 1,
        }
    }

    pub fn bits_allocated(&self) -> u16 {
        match self.buffer {
            PixelBuffer::Gray16(_) => 16,
            _ => 8,
        }
    }

    pub fn bits_stored(&self) -> u16 {
        self.bits_allocated()
    }

    pub fn high_bit(&self) -> u16 {
        self.bits_stored() - 1
    }

    /// Samples in the byte order Pixel Data carries: 16-bit words as
    /// unsigned little-endian.
    pub fn to_pixel_bytes(&self) -> Vec<u8> {
        match &self.buffer {
            PixelBuffer::Gray8(samples) | PixelBuffer::Rgb8(samples) => samples.clone(),
            PixelBuffer::Gray16(words) => {
                words.iter().flat_map(|v| v.to_le_bytes()).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, LumaA, Rgb, Rgba, RgbaImage};

    #[test]
    fn plain_grayscale_passes_through() {
        let img = GrayImage::from_raw(2, 2, vec![0, 64, 128, 255]).unwrap();
        let pixels = normalize(DynamicImage::ImageLuma8(img)).unwrap();

        assert_eq!(pixels.buffer, PixelBuffer::Gray8(vec![0, 64, 128, 255]));
        assert_eq!(pixels.photometric_interpretation(), "MONOCHROME2");
        assert_eq!(pixels.samples_per_pixel(), 1);
        assert_eq!(pixels.bits_allocated(), 8);
        assert_eq!(pixels.high_bit(), 7);
    }

    #[test]
    fn sixteen_bit_grayscale_keeps_its_depth() {
        let img = image::ImageBuffer::<Luma<u16>, _>::from_raw(2, 1, vec![7, 65535]).unwrap();
        let pixels = normalize(DynamicImage::ImageLuma16(img)).unwrap();

        assert_eq!(pixels.buffer, PixelBuffer::Gray16(vec![7, 65535]));
        assert_eq!(pixels.bits_allocated(), 16);
        assert_eq!(pixels.bits_stored(), 16);
        assert_eq!(pixels.high_bit(), 15);
        assert_eq!(pixels.to_pixel_bytes(), vec![7, 0, 0xFF, 0xFF]);
    }

    #[test]
    fn alpha_channels_are_dropped() {
        let rgba = RgbaImage::from_pixel(1, 1, Rgba([10, 20, 30, 200]));
        let pixels = normalize(DynamicImage::ImageRgba8(rgba)).unwrap();
        assert_eq!(pixels.buffer, PixelBuffer::Rgb8(vec![10, 20, 30]));
        assert_eq!(pixels.photometric_interpretation(), "RGB");
        assert_eq!(pixels.samples_per_pixel(), 3);

        let gray_alpha =
            image::ImageBuffer::<LumaA<u8>, _>::from_raw(1, 1, vec![77, 128]).unwrap();
        let pixels = normalize(DynamicImage::ImageLumaA8(gray_alpha)).unwrap();
        assert_eq!(pixels.buffer, PixelBuffer::Gray8(vec![77]));
    }

    #[test]
    fn rgb_keeps_interleaved_sample_order() {
        let rgb = image::RgbImage::from_pixel(2, 1, Rgb([1, 2, 3]));
        let pixels = normalize(DynamicImage::ImageRgb8(rgb)).unwrap();
        assert_eq!(pixels.to_pixel_bytes(), vec![1, 2, 3, 1, 2, 3]);
    }

    #[test]
    fn float_modes_are_rejected() {
        let img = image::Rgb32FImage::from_pixel(1, 1, Rgb([0.0, 0.5, 1.0]));
        let err = normalize(DynamicImage::ImageRgb32F(img)).unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedMode(_)));
    }
}
