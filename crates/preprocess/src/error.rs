use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("could not decode image: {0}")]
    Decode(String),

    #[error("could not prepare image surface: {0}")]
    Render(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_formatting() {
        assert_eq!(
            NormalizeError::Decode("truncated PNG".into()).to_string(),
            "could not decode image: truncated PNG"
        );
        assert_eq!(
            NormalizeError::Render("zero-sized source".into()).to_string(),
            "could not prepare image surface: zero-sized source"
        );
    }
}
