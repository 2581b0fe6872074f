//! HTTP prediction service: `POST /api/predict` with a base64 image, answered
//! with synthetic/real probabilities from the locally loaded model.

pub mod config;
pub mod predict;
pub mod routes;

pub use predict::{PredictError, Predictor};
pub use routes::router;
