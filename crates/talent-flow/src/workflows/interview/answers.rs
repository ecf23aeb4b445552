use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::workflows::recruiting::scoring::round2;

use super::domain::QuestionCategory;

const RELEVANCE_WEIGHT: f64 = 0.40;
const COMPLETENESS_WEIGHT: f64 = 0.30;
const KEYWORD_WEIGHT: f64 = 0.30;

const TECHNICAL_TERMS: [&str; 9] = [
    "project",
    "team",
    "development",
    "management",
    "analysis",
    "implementation",
    "design",
    "testing",
    "deployment",
];

const POSITIVE_MARKERS: [&str; 3] = ["yes", "excited", "interested"];

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b\w+\b").expect("word pattern is valid"))
}

fn digit_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+").expect("digit pattern is valid"))
}

fn category_keywords(category: QuestionCategory) -> &'static [&'static str] {
    match category {
        QuestionCategory::Introduction => {
            &["experience", "background", "education", "skills", "career"]
        }
        QuestionCategory::Experience => {
            &["years", "worked", "project", "team", "role", "responsibility"]
        }
        QuestionCategory::Skills => {
            &["proficient", "expert", "knowledge", "familiar", "technology"]
        }
        QuestionCategory::Availability => &["start", "notice", "available", "join", "immediately"],
        QuestionCategory::Salary => {
            &["expectation", "range", "compensation", "package", "negotiable"]
        }
        QuestionCategory::General => &[],
    }
}

fn min_words(category: QuestionCategory) -> usize {
    match category {
        QuestionCategory::Introduction => 20,
        QuestionCategory::Experience => 15,
        QuestionCategory::Skills => 10,
        QuestionCategory::Availability | QuestionCategory::Salary => 5,
        QuestionCategory::General => 10,
    }
}

/// Tone read off simple lexical markers; feeds the session sentiment ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Neutral,
}

impl Sentiment {
    pub const fn is_positive(self) -> bool {
        matches!(self, Sentiment::Positive)
    }
}

/// Which of the category's expected keywords the answer actually used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordMatches {
    pub matched: Vec<String>,
    pub expected: Vec<String>,
    pub score: f64,
    pub match_rate: f64,
}

/// Surface-level observations attached to each evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerAnnotations {
    pub word_count: usize,
    pub has_numbers: bool,
    pub has_technical_terms: bool,
    pub sentiment: Sentiment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-answer quality verdict, all components on a 0-100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerEvaluation {
    pub answer_score: f64,
    pub relevance_score: f64,
    pub completeness_score: f64,
    pub keyword_matches: KeywordMatches,
    pub confidence_score: f64,
    pub annotations: AnswerAnnotations,
}

/// Heuristic scorer for a single question/answer pair.
///
/// The final score blends relevance (40%), completeness (30%), and keyword
/// coverage (30%). Confidence is reported separately and never feeds the
/// blended score.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnswerEvaluator;

impl AnswerEvaluator {
    pub fn evaluate(
        &self,
        question: &str,
        answer: &str,
        category: QuestionCategory,
    ) -> AnswerEvaluation {
        if answer.trim().is_empty() {
            return AnswerEvaluation {
                answer_score: 0.0,
                relevance_score: 0.0,
                completeness_score: 0.0,
                keyword_matches: KeywordMatches {
                    matched: Vec::new(),
                    expected: Vec::new(),
                    score: 0.0,
                    match_rate: 0.0,
                },
                confidence_score: 0.0,
                annotations: AnswerAnnotations {
                    word_count: 0,
                    has_numbers: false,
                    has_technical_terms: false,
                    sentiment: Sentiment::Neutral,
                    error: Some("Empty answer".to_string()),
                },
            };
        }

        let relevance = self.relevance(answer, category, question);
        let completeness = self.completeness(answer, category);
        let keywords = self.keyword_matches(answer, category);

        let answer_score = relevance * RELEVANCE_WEIGHT
            + completeness * COMPLETENESS_WEIGHT
            + keywords.score * KEYWORD_WEIGHT;
        let confidence = self.confidence(answer);

        let answer_lower = answer.to_lowercase();
        let annotations = AnswerAnnotations {
            word_count: answer.split_whitespace().count(),
            has_numbers: digit_pattern().is_match(answer),
            has_technical_terms: has_technical_terms(&answer_lower),
            sentiment: if POSITIVE_MARKERS
                .iter()
                .any(|marker| answer_lower.contains(marker))
            {
                Sentiment::Positive
            } else {
                Sentiment::Neutral
            },
            error: None,
        };

        AnswerEvaluation {
            answer_score: round2(answer_score),
            relevance_score: round2(relevance),
            completeness_score: round2(completeness),
            keyword_matches: keywords,
            confidence_score: round2(confidence),
            annotations,
        }
    }

    /// Category keyword coverage blended with lexical overlap against the
    /// question itself. Categories without a keyword list score a flat 70.
    fn relevance(&self, answer: &str, category: QuestionCategory, question: &str) -> f64 {
        let expected = category_keywords(category);
        if expected.is_empty() {
            return 70.0;
        }

        let answer_lower = answer.to_lowercase();
        let matches = expected
            .iter()
            .filter(|keyword| answer_lower.contains(*keyword))
            .count();

        let question_words: HashSet<String> = word_pattern()
            .find_iter(&question.to_lowercase())
            .map(|word| word.as_str().to_string())
            .filter(|word| word.len() > 3)
            .collect();
        let answer_words: HashSet<String> = word_pattern()
            .find_iter(&answer_lower)
            .map(|word| word.as_str().to_string())
            .collect();
        let overlap = question_words.intersection(&answer_words).count();

        let keyword_score = matches as f64 / expected.len() as f64 * 100.0;
        let overlap_score =
            (overlap as f64 / question_words.len().max(1) as f64 * 100.0).min(100.0);

        keyword_score * 0.6 + overlap_score * 0.4
    }

    fn completeness(&self, answer: &str, category: QuestionCategory) -> f64 {
        let word_count = answer.split_whitespace().count();
        let floor = min_words(category);
        if word_count >= floor * 2 {
            100.0
        } else if word_count >= floor {
            80.0
        } else if word_count as f64 >= floor as f64 * 0.5 {
            60.0
        } else {
            40.0
        }
    }

    fn keyword_matches(&self, answer: &str, category: QuestionCategory) -> KeywordMatches {
        let expected = category_keywords(category);
        let answer_lower = answer.to_lowercase();
        let matched: Vec<String> = expected
            .iter()
            .filter(|keyword| answer_lower.contains(*keyword))
            .map(|keyword| keyword.to_string())
            .collect();

        let (score, match_rate) = if expected.is_empty() {
            (50.0, 0.0)
        } else {
            (
                matched.len() as f64 / expected.len() as f64 * 100.0,
                round2(matched.len() as f64 / expected.len() as f64),
            )
        };

        KeywordMatches {
            matched,
            expected: expected.iter().map(|keyword| keyword.to_string()).collect(),
            score,
            match_rate,
        }
    }

    /// Base 50 plus bonuses for length, punctuation structure, concrete
    /// numbers, and professional vocabulary, capped at 100.
    fn confidence(&self, answer: &str) -> f64 {
        let mut score: f64 = 50.0;
        let word_count = answer.split_whitespace().count();
        if word_count > 30 {
            score += 20.0;
        } else if word_count > 15 {
            score += 10.0;
        }
        if answer.contains('.') || answer.contains(',') {
            score += 10.0;
        }
        if digit_pattern().is_match(answer) {
            score += 10.0;
        }
        if has_technical_terms(&answer.to_lowercase()) {
            score += 10.0;
        }
        score.min(100.0)
    }
}

fn has_technical_terms(answer_lower: &str) -> bool {
    TECHNICAL_TERMS.iter().any(|term| answer_lower.contains(term))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluator() -> AnswerEvaluator {
        AnswerEvaluator
    }

    #[test]
    fn empty_answer_scores_zero_everywhere() {
        let evaluation = evaluator().evaluate(
            "Tell me about yourself and your background.",
            "   ",
            QuestionCategory::Introduction,
        );
        assert_eq!(evaluation.answer_score, 0.0);
        assert_eq!(evaluation.relevance_score, 0.0);
        assert_eq!(evaluation.completeness_score, 0.0);
        assert_eq!(evaluation.confidence_score, 0.0);
        assert_eq!(evaluation.annotations.word_count, 0);
        assert_eq!(
            evaluation.annotations.error.as_deref(),
            Some("Empty answer")
        );
    }

    #[test]
    fn long_structured_answer_maxes_completeness_and_confidence() {
        // 40 words, numbers, punctuation, and a professional term.
        let answer = "I led a project for 4 years, building data pipelines and review \
                      tooling for a large retail client, coordinating three engineers, \
                      planning quarterly roadmaps, handling incident response, and \
                      presenting results to leadership every month without fail overall.";
        let evaluation = evaluator().evaluate("Anything to add?", answer, QuestionCategory::General);
        assert_eq!(evaluation.completeness_score, 100.0);
        assert!(evaluation.confidence_score >= 80.0);
        assert!(evaluation.annotations.has_numbers);
        assert!(evaluation.annotations.has_technical_terms);
    }

    #[test]
    fn general_category_falls_back_to_flat_relevance() {
        let evaluation = evaluator().evaluate(
            "Anything else you want to mention?",
            "Nothing else to add right now thanks",
            QuestionCategory::General,
        );
        assert_eq!(evaluation.relevance_score, 70.0);
        assert_eq!(evaluation.keyword_matches.score, 50.0);
        assert_eq!(evaluation.keyword_matches.match_rate, 0.0);
        assert!(evaluation.keyword_matches.expected.is_empty());
    }

    #[test]
    fn salary_keywords_lift_the_keyword_component() {
        let evaluation = evaluator().evaluate(
            "What are your salary expectations?",
            "My expectation is a range around ninety thousand, negotiable for the right package",
            QuestionCategory::Salary,
        );
        assert_eq!(evaluation.keyword_matches.matched.len(), 4);
        assert_eq!(evaluation.keyword_matches.score, 80.0);
        assert_eq!(evaluation.keyword_matches.match_rate, 0.8);
    }

    #[test]
    fn short_answer_lands_in_the_lowest_completeness_band() {
        let evaluation = evaluator().evaluate(
            "Tell me about yourself and your background.",
            "I am a developer",
            QuestionCategory::Introduction,
        );
        // 4 words against a floor of 20.
        assert_eq!(evaluation.completeness_score, 40.0);
    }

    #[test]
    fn positive_markers_set_positive_sentiment() {
        let evaluation = evaluator().evaluate(
            "When can you start if selected?",
            "Yes, I am excited to join immediately",
            QuestionCategory::Availability,
        );
        assert_eq!(evaluation.annotations.sentiment, Sentiment::Positive);
        assert!(evaluation.annotations.sentiment.is_positive());
    }

    #[test]
    fn neutral_answer_stays_neutral() {
        let evaluation = evaluator().evaluate(
            "When can you start if selected?",
            "Two weeks notice is required",
            QuestionCategory::Availability,
        );
        assert_eq!(evaluation.annotations.sentiment, Sentiment::Neutral);
    }
}
