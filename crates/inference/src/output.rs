use crate::error::InferenceError;
use crate::wire::PredictResponse;

/// One named output array from a locally executed model.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedOutput {
    pub name: String,
    pub values: Vec<f32>,
}

/// Backend output before interpretation. Only shape is validated here.
#[derive(Debug, Clone, PartialEq)]
pub enum RawOutput {
    /// Model outputs in session order
    Tensors(Vec<NamedOutput>),
    /// Prediction service response fields
    Probabilities {
        ai_probability: Option<f32>,
        human_probability: Option<f32>,
    },
}

impl RawOutput {
    /// Requires at least one output whose array is non-empty in first position.
    pub fn from_tensors(outputs: Vec<NamedOutput>) -> Result<Self, InferenceError> {
        match outputs.first() {
            None => Err(InferenceError::EmptyOutput("model produced no outputs".into())),
            Some(first) if first.values.is_empty() => Err(InferenceError::EmptyOutput(format!(
                "output '{}' has no elements",
                first.name
            ))),
            Some(_) => Ok(RawOutput::Tensors(outputs)),
        }
    }

    /// Requires `ai_probability`; `human_probability` is informational.
    pub fn from_prediction(response: PredictResponse) -> Result<Self, InferenceError> {
        if response.ai_probability.is_none() {
            return Err(InferenceError::EmptyOutput(
                "response has no ai_probability".into(),
            ));
        }

        Ok(RawOutput::Probabilities {
            ai_probability: response.ai_probability,
            human_probability: response.human_probability,
        })
    }
}
