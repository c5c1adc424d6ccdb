//! Lexicon polarity scorer.
//!
//! Each opinion word carries a polarity. A directly preceding intensifier
//! scales it and a negation within the two preceding tokens flips and
//! dampens it (factor `-0.5`). The message polarity is the mean over the
//! opinion words found, so text without any opinion word scores `0.0`.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use super::PolarityScorer;

/// Multiplier applied to a negated opinion word.
const NEGATION_FACTOR: f64 = -0.5;

/// How many tokens back a negation still applies.
const NEGATION_WINDOW: usize = 2;

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z']+").expect("valid token regex"));

static OPINION_WORDS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        // positive
        ("good", 0.7),
        ("great", 0.8),
        ("excellent", 1.0),
        ("amazing", 0.6),
        ("awesome", 1.0),
        ("wonderful", 1.0),
        ("fantastic", 0.4),
        ("perfect", 1.0),
        ("best", 1.0),
        ("better", 0.5),
        ("nice", 0.6),
        ("love", 0.5),
        ("loved", 0.7),
        ("enjoy", 0.4),
        ("enjoyed", 0.4),
        ("happy", 0.8),
        ("glad", 0.5),
        ("excited", 0.4),
        ("exciting", 0.3),
        ("passionate", 0.5),
        ("interesting", 0.5),
        ("fun", 0.3),
        ("confident", 0.5),
        ("strong", 0.4),
        ("solid", 0.3),
        ("skilled", 0.5),
        ("successful", 0.75),
        ("proud", 0.8),
        ("thanks", 0.2),
        ("thank", 0.2),
        ("helpful", 0.4),
        ("eager", 0.3),
        ("comfortable", 0.4),
        ("experienced", 0.4),
        // negative
        ("bad", -0.7),
        ("worse", -0.4),
        ("worst", -1.0),
        ("terrible", -1.0),
        ("awful", -1.0),
        ("horrible", -1.0),
        ("poor", -0.4),
        ("hate", -0.8),
        ("hated", -0.9),
        ("dislike", -0.5),
        ("boring", -1.0),
        ("bored", -0.5),
        ("sad", -0.5),
        ("unhappy", -0.6),
        ("angry", -0.5),
        ("annoyed", -0.4),
        ("annoying", -0.8),
        ("frustrated", -0.7),
        ("frustrating", -0.7),
        ("stressed", -0.5),
        ("stressful", -0.5),
        ("nervous", -0.3),
        ("worried", -0.4),
        ("difficult", -0.5),
        ("hard", -0.3),
        ("weak", -0.4),
        ("wrong", -0.5),
        ("confused", -0.4),
        ("confusing", -0.4),
        ("tired", -0.4),
        ("useless", -0.5),
        ("disappointed", -0.75),
        ("disappointing", -0.6),
        ("unfortunately", -0.5),
    ])
});

static INTENSIFIERS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("very", 1.3),
        ("really", 1.2),
        ("extremely", 1.5),
        ("super", 1.4),
        ("so", 1.2),
        ("quite", 1.1),
        ("incredibly", 1.5),
        ("truly", 1.2),
        ("absolutely", 1.5),
        ("pretty", 1.1),
        ("somewhat", 0.7),
        ("slightly", 0.6),
        ("kinda", 0.8),
    ])
});

fn is_negation(token: &str) -> bool {
    matches!(
        token,
        "not" | "no" | "never" | "nothing" | "hardly" | "barely" | "neither" | "nor" | "cannot"
    ) || token.ends_with("n't")
}

/// Scorer backed by the built-in word lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconScorer;

impl LexiconScorer {
    fn score_tokens(tokens: &[&str]) -> Option<f64> {
        let mut scores = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            let Some(&base) = OPINION_WORDS.get(token) else {
                continue;
            };

            let mut score = base;
            let mut window_start = i.saturating_sub(NEGATION_WINDOW);
            if i > 0 {
                if let Some(&factor) = INTENSIFIERS.get(tokens[i - 1]) {
                    score *= factor;
                    // "not very good": look past the intensifier for the negation
                    window_start = window_start.saturating_sub(1);
                }
            }
            if tokens[window_start..i].iter().any(|t| is_negation(t)) {
                score *= NEGATION_FACTOR;
            }
            scores.push(score.clamp(-1.0, 1.0));
        }

        if scores.is_empty() {
            None
        } else {
            Some(scores.iter().sum::<f64>() / scores.len() as f64)
        }
    }
}

impl PolarityScorer for LexiconScorer {
    fn polarity(&self, text: &str) -> f64 {
        let lowered = text.to_lowercase().replace('’', "'");
        let tokens: Vec<&str> = TOKEN.find_iter(&lowered).map(|m| m.as_str()).collect();
        Self::score_tokens(&tokens)
            .map(|score| score.clamp(-1.0, 1.0))
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::{analyze_sentiment, SentimentLabel};

    fn polarity(text: &str) -> f64 {
        LexiconScorer.polarity(text)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_plain_opinion_words() {
        assert!(approx(polarity("I love Rust"), 0.5));
        assert!(approx(polarity("That sounds GREAT!"), 0.8));
        assert!(approx(polarity("The commute was terrible"), -1.0));
    }

    #[test]
    fn test_no_opinion_words_is_zero() {
        assert_eq!(polarity("My name is Ada Lovelace"), 0.0);
        assert_eq!(polarity("ada@example.com, +1 555 0100"), 0.0);
    }

    #[test]
    fn test_intensifier_scales() {
        assert!(approx(polarity("very good"), 0.91));
        assert!(approx(polarity("extremely excellent"), 1.0));
        assert!(approx(polarity("slightly bad"), -0.42));
    }

    #[test]
    fn test_negation_flips_and_dampens() {
        assert!(approx(polarity("this is not great"), -0.4));
        assert!(approx(polarity("I don't hate it"), 0.4));
        assert!(approx(polarity("not very good"), -0.455));
        assert!(approx(polarity("I don’t like bad code"), 0.35));
    }

    #[test]
    fn test_mean_over_opinion_words() {
        assert!(approx(polarity("good but bad"), 0.0));
        assert!(approx(polarity("great team, boring project"), -0.1));
    }

    #[test]
    fn test_labels_through_analyzer() {
        assert_eq!(
            analyze_sentiment("I'm really excited about this role, it's great").label,
            SentimentLabel::Positive
        );
        assert_eq!(
            analyze_sentiment("Honestly the last job was awful").label,
            SentimentLabel::Negative
        );
        assert_eq!(
            analyze_sentiment("I have 5 years of experience").label,
            SentimentLabel::Neutral
        );
    }
}
