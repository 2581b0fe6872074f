use crate::output::NamedOutput;
use ndarray::ArrayView4;

#[cfg(feature = "ort-backend")]
pub mod ort;

/// A loaded model that can run one forward pass at a time.
pub trait InferenceBackend: Send + 'static {
    /// Run the model on a `[1, S, S, 3]` tensor, returning every output in
    /// session order.
    fn infer(&mut self, input: ArrayView4<'_, f32>) -> anyhow::Result<Vec<NamedOutput>>;
}
