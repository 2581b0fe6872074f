//! Image normalization: turns an uploaded image into the input a
//! classification backend expects.
//!
//! Backends declare which representation they consume through [`InputKind`]:
//! a fixed `[1, S, S, 3]` float tensor for locally executed models, or a
//! base64 data URI for services that decode images themselves.

pub mod config;
pub mod cpu;
pub mod encoded;
pub mod error;
pub mod raw;

use ndarray::Array4;

pub use config::DEFAULT_INPUT_SIZE;
pub use cpu::TensorNormalizer;
pub use encoded::{decode_data_uri, to_data_uri};
pub use error::NormalizeError;
pub use raw::{RawImage, decode_rgb};

/// Input representation a backend consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Channel-last `[1, size, size, 3]` tensor with samples in [0, 1]
    Tensor { size: u32 },
    /// `data:<mime>;base64,<payload>` string, resized (if at all) remotely
    EncodedDataUri,
}

/// Normalized image, ready for a backend call.
#[derive(Debug, Clone)]
pub enum PreparedInput {
    Tensor(Array4<f32>),
    Encoded(String),
}

impl PreparedInput {
    pub fn kind(&self) -> &'static str {
        match self {
            PreparedInput::Tensor(_) => "tensor",
            PreparedInput::Encoded(_) => "encoded",
        }
    }
}

/// Produce the representation `kind` asks for.
pub fn normalize(raw: &RawImage, kind: InputKind) -> Result<PreparedInput, NormalizeError> {
    match kind {
        InputKind::Tensor { size } => TensorNormalizer::new(size)
            .normalize(raw)
            .map(PreparedInput::Tensor),
        InputKind::EncodedDataUri => to_data_uri(raw).map(PreparedInput::Encoded),
    }
}
