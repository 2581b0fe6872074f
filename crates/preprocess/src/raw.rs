use crate::error::NormalizeError;
use bytes::Bytes;
use common::span;
use image::{ImageFormat, ImageReader, RgbImage};
use std::io::Cursor;

/// User-supplied image bytes with the MIME type the uploader declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    bytes: Bytes,
    mime_type: String,
}

impl RawImage {
    pub fn new(bytes: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether the declared type is an `image/*` type.
    pub fn is_image_mime(&self) -> bool {
        self.mime_type
            .trim()
            .to_ascii_lowercase()
            .starts_with("image/")
    }
}

/// Decode to 8-bit RGB, dropping any alpha channel.
///
/// The container format is sniffed from the bytes first; the declared MIME
/// type is only used when sniffing is inconclusive, since browsers routinely
/// mislabel uploads.
pub fn decode_rgb(raw: &RawImage) -> Result<RgbImage, NormalizeError> {
    let _s = span!("decode");

    if raw.is_empty() {
        return Err(NormalizeError::Decode("image payload is empty".into()));
    }

    let mut reader = ImageReader::new(Cursor::new(raw.bytes().as_ref()))
        .with_guessed_format()
        .map_err(|e| NormalizeError::Decode(e.to_string()))?;

    if reader.format().is_none() {
        match ImageFormat::from_mime_type(raw.mime_type()) {
            Some(format) => reader.set_format(format),
            None => {
                return Err(NormalizeError::Decode(format!(
                    "unsupported image format ({})",
                    raw.mime_type()
                )));
            }
        }
    }

    let image = reader
        .decode()
        .map_err(|e| NormalizeError::Decode(e.to_string()))?;

    tracing::trace!(
        width = image.width(),
        height = image.height(),
        color = ?image.color(),
        "Decoded image"
    );

    Ok(image.to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{encode, solid_png};
    use image::{DynamicImage, Rgba, RgbaImage};

    #[test]
    fn decodes_png_regardless_of_declared_type() {
        let raw = RawImage::new(solid_png(3, 2, [1, 2, 3]), "image/jpeg");

        let rgb = decode_rgb(&raw).unwrap();

        assert_eq!(rgb.dimensions(), (3, 2));
        assert_eq!(rgb.get_pixel(2, 1).0, [1, 2, 3]);
    }

    #[test]
    fn alpha_channel_is_discarded() {
        let rgba = RgbaImage::from_pixel(2, 2, Rgba([200, 100, 50, 0]));
        let raw = RawImage::new(
            encode(DynamicImage::ImageRgba8(rgba), ImageFormat::Png),
            "image/png",
        );

        let rgb = decode_rgb(&raw).unwrap();

        assert_eq!(rgb.get_pixel(0, 0).0, [200, 100, 50]);
    }

    #[test]
    fn empty_payload_is_a_decode_error() {
        let raw = RawImage::new(Vec::<u8>::new(), "image/png");
        assert_eq!(
            decode_rgb(&raw),
            Err(NormalizeError::Decode("image payload is empty".into()))
        );
    }

    #[test]
    fn unknown_bytes_with_unknown_mime_are_rejected() {
        let raw = RawImage::new(b"plain text, not pixels".to_vec(), "text/plain");

        let err = decode_rgb(&raw).unwrap_err();

        assert!(matches!(err, NormalizeError::Decode(_)));
        assert!(err.to_string().contains("text/plain"));
    }

    #[test]
    fn truncated_png_is_a_decode_error() {
        let mut bytes = solid_png(16, 16, [9, 9, 9]);
        bytes.truncate(bytes.len() / 2);
        let raw = RawImage::new(bytes, "image/png");

        assert!(matches!(decode_rgb(&raw), Err(NormalizeError::Decode(_))));
    }

    #[test]
    fn image_mime_detection() {
        assert!(RawImage::new(vec![1u8], "Image/PNG").is_image_mime());
        assert!(!RawImage::new(vec![1u8], "application/pdf").is_image_mime());
    }
}
