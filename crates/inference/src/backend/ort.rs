use super::InferenceBackend;
use crate::config::ExecutionProvider;
use crate::output::NamedOutput;
use ndarray::ArrayView4;
use ort::{
    session::{Session, builder::GraphOptimizationLevel},
    value::TensorRef,
};

pub struct OrtBackend {
    session: Session,
}

impl OrtBackend {
    /// Load model with specified execution provider
    pub fn load_model_with_provider(
        path: &str,
        provider: ExecutionProvider,
    ) -> anyhow::Result<Self> {
        // Initialize ORT environment (idempotent)
        let _ = ort::init().commit();

        let mut builder = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(ort::Error::<()>::from)?
            .with_intra_threads(4)
            .map_err(ort::Error::<()>::from)?;

        match provider {
            ExecutionProvider::Cuda => {
                tracing::info!("Initializing ONNX Runtime with CUDA execution provider");
                builder = builder.with_execution_providers([
                    ort::ep::CUDA::default()
                        .with_device_id(0)
                        .build()
                        .error_on_failure(),
                ])
                .map_err(ort::Error::<()>::from)?;
            }
            ExecutionProvider::Cpu => {
                tracing::info!("Initializing ONNX Runtime with CPU execution provider");
            }
        }

        let session = builder.commit_from_file(path)?;

        tracing::info!(path, "Model loaded");
        Ok(Self { session })
    }
}

impl InferenceBackend for OrtBackend {
    fn infer(&mut self, input: ArrayView4<'_, f32>) -> anyhow::Result<Vec<NamedOutput>> {
        // The classifier has a single image input; bind it positionally so
        // exported graphs with arbitrary input names work unchanged.
        let outputs = self
            .session
            .run(ort::inputs![TensorRef::from_array_view(input)?])?;

        let mut named = Vec::with_capacity(outputs.len());
        for (name, value) in outputs.iter() {
            let array = value.try_extract_array::<f32>()?;
            named.push(NamedOutput {
                name: name.to_string(),
                values: array.iter().copied().collect(),
            });
        }

        Ok(named)
    }
}
