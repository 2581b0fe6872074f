use crate::error::InferenceError;
use crate::output::RawOutput;
use common::span_debug;
use serde::Serialize;

/// How a backend's scalar should be read.
///
/// The bundled model was trained on `ai/noai` folders, so its sigmoid is the
/// probability of *not* being synthetic; the prediction service already
/// reports the synthetic probability directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreSemantics {
    AiProbability,
    NotAiProbability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Label {
    #[serde(rename = "AI Generated")]
    AiGenerated,
    #[serde(rename = "Likely Real")]
    LikelyReal,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::AiGenerated => "AI Generated",
            Label::LikelyReal => "Likely Real",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Label::AiGenerated => "#10b981",
            Label::LikelyReal => "#cbd5e1",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub label: Label,
    /// Percentage in [0, 100], one decimal
    pub confidence: f32,
    pub color: &'static str,
}

impl AnalysisResult {
    fn new(label: Label, probability: f32) -> Self {
        Self {
            label,
            confidence: to_percent(probability),
            color: label.color(),
        }
    }
}

/// Turn raw backend output into two labeled results, highest confidence
/// first. Equal confidences keep "AI Generated" first.
///
/// Out-of-range scores are clamped, never rejected. Only an absent (or NaN)
/// scalar is an error.
pub fn interpret(
    output: &RawOutput,
    semantics: ScoreSemantics,
) -> Result<[AnalysisResult; 2], InferenceError> {
    let _s = span_debug!("interpret");

    let ai = ai_probability(output, semantics)?;
    let human = 1.0 - ai;

    let mut results = [
        AnalysisResult::new(Label::AiGenerated, ai),
        AnalysisResult::new(Label::LikelyReal, human),
    ];
    // slice::sort_by is stable
    results.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    tracing::debug!(
        ai_probability = ai,
        ai_confidence = results
            .iter()
            .find(|r| r.label == Label::AiGenerated)
            .map(|r| r.confidence),
        "Interpreted backend output"
    );

    Ok(results)
}

/// Synthetic probability in [0, 1] carried by `output`.
pub fn ai_probability(output: &RawOutput, semantics: ScoreSemantics) -> Result<f32, InferenceError> {
    let score = extract_score(output)?.clamp(0.0, 1.0);
    Ok(match semantics {
        ScoreSemantics::AiProbability => score,
        ScoreSemantics::NotAiProbability => 1.0 - score,
    })
}

fn extract_score(output: &RawOutput) -> Result<f32, InferenceError> {
    let (value, slot) = match output {
        RawOutput::Tensors(outputs) => (
            outputs.first().and_then(|o| o.values.first()).copied(),
            "first element of the first model output",
        ),
        RawOutput::Probabilities { ai_probability, .. } => (*ai_probability, "ai_probability"),
    };

    value
        .filter(|v| !v.is_nan())
        .ok_or_else(|| InferenceError::MissingField(slot.to_string()))
}

fn to_percent(probability: f32) -> f32 {
    ((f64::from(probability) * 1000.0).round() / 10.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::NamedOutput;

    fn remote(ai: f32) -> RawOutput {
        RawOutput::Probabilities {
            ai_probability: Some(ai),
            human_probability: Some(1.0 - ai),
        }
    }

    fn tensor(score: f32) -> RawOutput {
        RawOutput::Tensors(vec![NamedOutput {
            name: "dense".into(),
            values: vec![score],
        }])
    }

    fn confidences(results: &[AnalysisResult; 2]) -> [(Label, f32); 2] {
        [
            (results[0].label, results[0].confidence),
            (results[1].label, results[1].confidence),
        ]
    }

    #[test]
    fn remote_probability_is_read_directly() {
        let results = interpret(&remote(0.87), ScoreSemantics::AiProbability).unwrap();

        assert_eq!(
            confidences(&results),
            [(Label::AiGenerated, 87.0), (Label::LikelyReal, 13.0)]
        );
    }

    #[test]
    fn embedded_score_is_inverted() {
        let results = interpret(&tensor(0.2), ScoreSemantics::NotAiProbability).unwrap();

        assert_eq!(
            confidences(&results),
            [(Label::AiGenerated, 80.0), (Label::LikelyReal, 20.0)]
        );
    }

    #[test]
    fn higher_human_confidence_sorts_first() {
        let results = interpret(&remote(0.1), ScoreSemantics::AiProbability).unwrap();

        assert_eq!(results[0].label, Label::LikelyReal);
        assert_eq!(results[0].confidence, 90.0);
        assert_eq!(results[1].confidence, 10.0);
    }

    #[test]
    fn ties_keep_declaration_order() {
        for semantics in [ScoreSemantics::AiProbability, ScoreSemantics::NotAiProbability] {
            let results = interpret(&remote(0.5), semantics).unwrap();
            assert_eq!(
                confidences(&results),
                [(Label::AiGenerated, 50.0), (Label::LikelyReal, 50.0)]
            );
        }
    }

    #[test]
    fn confidences_sum_to_one_hundred() {
        for i in 0..=1000 {
            let p = i as f32 / 1000.0;
            for semantics in [ScoreSemantics::AiProbability, ScoreSemantics::NotAiProbability] {
                let results = interpret(&remote(p), semantics).unwrap();
                let sum = results[0].confidence + results[1].confidence;
                assert!((sum - 100.0).abs() <= 0.1 + 1e-4, "p={} sum={}", p, sum);
                assert!(results[0].confidence >= results[1].confidence);
            }
        }
    }

    #[test]
    fn drifting_scores_are_clamped() {
        let high = interpret(&remote(1.7), ScoreSemantics::AiProbability).unwrap();
        assert_eq!(
            confidences(&high),
            [(Label::AiGenerated, 100.0), (Label::LikelyReal, 0.0)]
        );

        let low = interpret(&remote(-0.3), ScoreSemantics::AiProbability).unwrap();
        assert_eq!(
            confidences(&low),
            [(Label::LikelyReal, 100.0), (Label::AiGenerated, 0.0)]
        );

        let inverted = interpret(&tensor(-0.3), ScoreSemantics::NotAiProbability).unwrap();
        assert_eq!(inverted[0].label, Label::AiGenerated);
        assert_eq!(inverted[0].confidence, 100.0);

        let infinite = interpret(&tensor(f32::INFINITY), ScoreSemantics::NotAiProbability).unwrap();
        assert!(infinite.iter().all(|r| (0.0..=100.0).contains(&r.confidence)));
    }

    #[test]
    fn labels_carry_fixed_colors() {
        let results = interpret(&remote(0.6), ScoreSemantics::AiProbability).unwrap();

        for r in results {
            assert_eq!(r.color, r.label.color());
        }
        assert_eq!(Label::AiGenerated.color(), "#10b981");
        assert_eq!(Label::LikelyReal.color(), "#cbd5e1");
    }

    #[test]
    fn missing_scalar_is_reported() {
        let absent = RawOutput::Probabilities {
            ai_probability: None,
            human_probability: Some(0.4),
        };
        assert_eq!(
            interpret(&absent, ScoreSemantics::AiProbability),
            Err(InferenceError::MissingField("ai_probability".into()))
        );

        assert!(matches!(
            interpret(&RawOutput::Tensors(vec![]), ScoreSemantics::NotAiProbability),
            Err(InferenceError::MissingField(_))
        ));
        assert!(matches!(
            interpret(&tensor(f32::NAN), ScoreSemantics::NotAiProbability),
            Err(InferenceError::MissingField(_))
        ));
    }

    #[test]
    fn results_serialize_with_display_labels() {
        let results = interpret(&remote(0.87), ScoreSemantics::AiProbability).unwrap();

        let json = serde_json::to_value(results).unwrap();

        assert_eq!(json[0]["label"], "AI Generated");
        assert_eq!(json[0]["confidence"], 87.0);
        assert_eq!(json[1]["label"], "Likely Real");
        assert_eq!(json[1]["color"], "#cbd5e1");
    }
}
