pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod interpret;
pub mod output;
pub mod wire;

// Re-export commonly used types for convenience
pub use backend::InferenceBackend;
pub use client::{EmbeddedClient, InferenceClient, Readiness, RemoteClient};
pub use config::{BackendKind, ExecutionProvider, InferenceConfig};
pub use error::InferenceError;
pub use interpret::{AnalysisResult, Label, ScoreSemantics, ai_probability, interpret};
pub use output::{NamedOutput, RawOutput};

#[cfg(feature = "ort-backend")]
pub use client::BackendClient;
