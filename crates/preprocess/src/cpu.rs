use crate::config::DEFAULT_INPUT_SIZE;
use crate::error::NormalizeError;
use crate::raw::{RawImage, decode_rgb};
use common::span;
use fast_image_resize::{
    FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer,
    images::{Image, ImageRef},
};
use ndarray::Array4;

/// Decodes, force-resizes to `size`×`size` and scales samples to [0, 1].
///
/// Aspect ratio is not preserved and no mean/std normalization is applied:
/// the model was trained on plain `/255` RGB at a fixed square resolution.
#[derive(Debug, Clone, Copy)]
pub struct TensorNormalizer {
    size: u32,
}

impl TensorNormalizer {
    pub fn new(size: u32) -> Self {
        Self { size }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Decode `raw` and produce a `[1, size, size, 3]` tensor.
    pub fn normalize(&self, raw: &RawImage) -> Result<Array4<f32>, NormalizeError> {
        let _s = span!("normalize_tensor");

        let rgb = decode_rgb(raw)?;
        let (width, height) = rgb.dimensions();
        self.normalize_rgb(rgb.as_raw(), width, height)
    }

    /// Normalize already-decoded RGB pixels (HWC, 3 bytes per pixel).
    pub fn normalize_rgb(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Array4<f32>, NormalizeError> {
        let resized = self.resize(pixels, width, height)?;
        self.to_tensor(&resized)
    }

    fn resize(&self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, NormalizeError> {
        let _s = span!("resize");

        if self.size == 0 {
            return Err(NormalizeError::Render("target size must be non-zero".into()));
        }
        if width == 0 || height == 0 {
            return Err(NormalizeError::Render(format!(
                "source image has no pixels ({}x{})",
                width, height
            )));
        }

        let expected = (width as usize) * (height as usize) * 3;
        if pixels.len() != expected {
            return Err(NormalizeError::Render(format!(
                "buffer size mismatch: expected {} bytes for {}x{} RGB, got {}",
                expected,
                width,
                height,
                pixels.len()
            )));
        }

        let src = ImageRef::new(width, height, pixels, PixelType::U8x3)
            .map_err(|e| NormalizeError::Render(e.to_string()))?;
        let mut dst = Image::new(self.size, self.size, PixelType::U8x3);

        Resizer::new()
            .resize(
                &src,
                &mut dst,
                &ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear)),
            )
            .map_err(|e| NormalizeError::Render(e.to_string()))?;

        Ok(dst.into_vec())
    }

    fn to_tensor(&self, rgb: &[u8]) -> Result<Array4<f32>, NormalizeError> {
        let _s = span!("to_tensor");

        let side = self.size as usize;
        // HWC byte order already matches the channel-last tensor layout.
        let samples: Vec<f32> = rgb.iter().map(|&v| f32::from(v) / 255.0).collect();

        Array4::from_shape_vec((1, side, side, 3), samples)
            .map_err(|e| NormalizeError::Render(e.to_string()))
    }
}

impl Default for TensorNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_SIZE)
    }
}
