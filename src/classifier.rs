//! Contract for the digit classifier that consumes normalized glyphs.
//!
//! Any model (SVM, CNN, ...) plugs in by implementing `DigitClassifier`;
//! segmentation never depends on which one is used.

use crate::error::SegmentError;
use crate::segmentation::{NormalizedGlyph, SegmentationResult};

pub const NUM_CLASSES: usize = 10;

/// Predicted digit, with the score vector when the model exposes one
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: u8,
    pub probabilities: Option<Vec<f32>>,
}

impl Prediction {
    /// Pick the highest-scoring class; the first maximum wins ties.
    pub fn from_scores(scores: &[f32]) -> Result<Self, SegmentError> {
        if scores.len() != NUM_CLASSES {
            return Err(SegmentError::Classifier(format!(
                "expected {} scores, got {}",
                NUM_CLASSES,
                scores.len()
            )));
        }
        if scores.iter().any(|s| s.is_nan()) {
            return Err(SegmentError::Classifier("score vector contains NaN".to_string()));
        }

        let mut label = 0;
        for (i, &score) in scores.iter().enumerate() {
            if score > scores[label] {
                label = i;
            }
        }

        Ok(Self {
            label: label as u8,
            probabilities: Some(scores.to_vec()),
        })
    }

    pub fn confidence(&self) -> Option<f32> {
        self.probabilities
            .as_ref()
            .map(|p| p[self.label as usize])
    }
}

/// Trait that every digit classifier must implement
pub trait DigitClassifier: Send + Sync {
    /// Returns the classifier identifier (e.g., "svm-rbf", "cnn")
    fn name(&self) -> &str;

    /// Classify one canonical glyph
    fn classify(&self, glyph: &NormalizedGlyph) -> Result<Prediction, SegmentError>;

    /// Classify a batch; the default runs `classify` in order
    fn classify_batch(&self, glyphs: &[NormalizedGlyph]) -> Result<Vec<Prediction>, SegmentError> {
        glyphs.iter().map(|g| self.classify(g)).collect()
    }
}

/// Labels for every glyph of a segmentation result, in reading order.
pub fn classify_result(
    classifier: &dyn DigitClassifier,
    result: &SegmentationResult,
) -> Result<Vec<u8>, SegmentError> {
    let predictions = classifier.classify_batch(&result.glyphs)?;
    tracing::debug!(
        "{} classified {} glyphs",
        classifier.name(),
        predictions.len()
    );
    Ok(predictions.into_iter().map(|p| p.label).collect())
}
