//! Sentiment probe for candidate messages.
//!
//! Maps text to a polarity in `[-1, 1]` and a coarse label shown next to
//! the message. The label bands are deliberately asymmetric:
//!
//! | polarity        | label    |
//! |-----------------|----------|
//! | `> 0.3`         | Positive |
//! | `< -0.1`        | Negative |
//! | otherwise       | Neutral  |
//!
//! The polarity itself comes from a [`PolarityScorer`]; [`LexiconScorer`]
//! is the built-in one.

pub mod lexicon;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use lexicon::LexiconScorer;

/// Lower bound (exclusive) of the Positive band.
pub const POSITIVE_THRESHOLD: f64 = 0.3;

/// Upper bound (exclusive) of the Negative band.
pub const NEGATIVE_THRESHOLD: f64 = -0.1;

/// Source of polarity scores.
pub trait PolarityScorer: Send + Sync + fmt::Debug {
    /// Polarity of `text` in `[-1, 1]`.
    fn polarity(&self, text: &str) -> f64;
}

/// Coarse sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Label for a polarity value.
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > POSITIVE_THRESHOLD {
            SentimentLabel::Positive
        } else if polarity < NEGATIVE_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "😊",
            SentimentLabel::Negative => "😟",
            SentimentLabel::Neutral => "😐",
        }
    }

    /// Color hint for presentation layers.
    pub fn color(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "green",
            SentimentLabel::Negative => "red",
            SentimentLabel::Neutral => "gray",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
        };
        write!(f, "{} {}", name, self.emoji())
    }
}

/// Output of the sentiment probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    /// Polarity rounded to two decimals.
    pub polarity: f64,
    pub label: SentimentLabel,
    /// Color hint (`green`, `red`, `gray`).
    pub display_hint: String,
}

impl SentimentResult {
    /// Build a result from a raw polarity.
    ///
    /// The label is decided on the unrounded value, so 0.304 is Positive
    /// even though it displays as 0.3.
    pub fn from_polarity(polarity: f64) -> Self {
        let polarity = if polarity.is_finite() {
            polarity.clamp(-1.0, 1.0)
        } else {
            0.0
        };
        let label = SentimentLabel::from_polarity(polarity);
        Self {
            // `+ 0.0` folds -0.0 into 0.0
            polarity: (polarity * 100.0).round() / 100.0 + 0.0,
            label,
            display_hint: label.color().to_string(),
        }
    }

    /// One-line annotation, e.g. `Positive 😊 (polarity: 0.5)`.
    ///
    /// Whole values keep their decimal point (`0.0`, `1.0`).
    pub fn annotation(&self) -> String {
        format!("{} (polarity: {:?})", self.label, self.polarity)
    }
}

/// Score `text` with `scorer`.
pub fn analyze_with(scorer: &dyn PolarityScorer, text: &str) -> SentimentResult {
    if text.trim().is_empty() {
        return SentimentResult::from_polarity(0.0);
    }
    SentimentResult::from_polarity(scorer.polarity(text))
}

/// Score `text` with the built-in lexicon.
pub fn analyze_sentiment(text: &str) -> SentimentResult {
    analyze_with(&LexiconScorer, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Fixed(f64);

    impl PolarityScorer for Fixed {
        fn polarity(&self, _text: &str) -> f64 {
            self.0
        }
    }

    #[test]
    fn test_label_bands() {
        assert_eq!(SentimentLabel::from_polarity(0.31), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_polarity(-0.15), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::from_polarity(0.0), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_polarity(0.3), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_polarity(-0.1), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_polarity(0.2), SentimentLabel::Neutral);
    }

    #[test]
    fn test_result_rounds_and_hints() {
        let result = analyze_with(&Fixed(0.31), "anything");
        assert_eq!(result.label, SentimentLabel::Positive);
        assert_eq!(result.display_hint, "green");

        let result = analyze_with(&Fixed(-0.14999), "anything");
        assert_eq!(result.polarity, -0.15);
        assert_eq!(result.label, SentimentLabel::Negative);
        assert_eq!(result.display_hint, "red");

        let result = SentimentResult::from_polarity(0.666);
        assert_eq!(result.polarity, 0.67);
    }

    #[test]
    fn test_empty_input_is_neutral() {
        let result = analyze_with(&Fixed(0.9), "   ");
        assert_eq!(result.polarity, 0.0);
        assert_eq!(result.label, SentimentLabel::Neutral);
        assert_eq!(analyze_sentiment("").label, SentimentLabel::Neutral);
    }

    #[test]
    fn test_out_of_range_scores_are_clamped() {
        assert_eq!(SentimentResult::from_polarity(3.0).polarity, 1.0);
        assert_eq!(SentimentResult::from_polarity(f64::NAN).polarity, 0.0);
    }

    #[test]
    fn test_annotation() {
        let result = SentimentResult::from_polarity(0.5);
        assert_eq!(result.annotation(), "Positive 😊 (polarity: 0.5)");
        let result = SentimentResult::from_polarity(0.0);
        assert_eq!(result.annotation(), "Neutral 😐 (polarity: 0.0)");
        let result = SentimentResult::from_polarity(-0.001);
        assert_eq!(result.annotation(), "Neutral 😐 (polarity: 0.0)");
        let result = SentimentResult::from_polarity(1.0);
        assert_eq!(result.annotation(), "Positive 😊 (polarity: 1.0)");
        let result = SentimentResult::from_polarity(-0.456);
        assert_eq!(result.annotation(), "Negative 😟 (polarity: -0.46)");
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(SentimentResult::from_polarity(-0.7)).unwrap();
        assert_eq!(json["label"], "Negative");
        assert_eq!(json["polarity"], -0.7);
        assert_eq!(json["display_hint"], "red");
    }
}
