use inference::AnalysisResult;
use preprocess::RawImage;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPhase {
    Idle,
    Preparing,
    Inferring,
    Succeeded,
    Failed,
}

impl ScanPhase {
    /// Whether a scan is in flight (and the progress indicator running).
    pub fn is_active(&self) -> bool {
        matches!(self, ScanPhase::Preparing | ScanPhase::Inferring)
    }
}

/// The image currently on display. Only its metadata is serialized; the
/// bytes are served separately.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImagePreview {
    pub mime_type: String,
    pub size_bytes: usize,
    #[serde(skip)]
    raw: RawImage,
}

impl ImagePreview {
    pub fn new(raw: RawImage) -> Self {
        Self {
            mime_type: raw.mime_type().to_string(),
            size_bytes: raw.len(),
            raw,
        }
    }

    pub fn raw(&self) -> &RawImage {
        &self.raw
    }
}

/// Everything the presentation layer renders for the current session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanSnapshot {
    pub session_id: u64,
    pub phase: ScanPhase,
    /// Cosmetic percentage in [0, 100]
    pub progress: f32,
    pub results: Option<[AnalysisResult; 2]>,
    pub error: Option<String>,
    pub image: Option<ImagePreview>,
}

impl ScanSnapshot {
    pub fn idle(session_id: u64) -> Self {
        Self {
            session_id,
            phase: ScanPhase::Idle,
            progress: 0.0,
            results: None,
            error: None,
            image: None,
        }
    }

    pub(crate) fn preparing(session_id: u64, raw: RawImage) -> Self {
        Self {
            session_id,
            phase: ScanPhase::Preparing,
            progress: 0.0,
            results: None,
            error: None,
            image: Some(ImagePreview::new(raw)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn snapshot_serializes_image_metadata_only() {
        let snapshot = ScanSnapshot::preparing(3, RawImage::new(vec![1u8; 42], "image/png"));

        let value = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(
            value,
            json!({
                "session_id": 3,
                "phase": "preparing",
                "progress": 0.0,
                "results": null,
                "error": null,
                "image": { "mime_type": "image/png", "size_bytes": 42 }
            })
        );
    }

    #[test]
    fn only_in_flight_phases_are_active() {
        assert!(ScanPhase::Preparing.is_active());
        assert!(ScanPhase::Inferring.is_active());
        assert!(!ScanPhase::Idle.is_active());
        assert!(!ScanPhase::Succeeded.is_active());
        assert!(!ScanPhase::Failed.is_active());
    }
}
