use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::workflows::recruiting::scoring::round2;

use super::domain::{ConversationTurn, QuestionCategory, SessionId};

/// Weight applied to a category's average when folding into the overall
/// score. Unlisted categories carry the general weight.
pub const fn category_weight(category: QuestionCategory) -> f64 {
    match category {
        QuestionCategory::Introduction => 0.10,
        QuestionCategory::Experience => 0.30,
        QuestionCategory::Skills => 0.35,
        QuestionCategory::Availability => 0.15,
        QuestionCategory::Salary => 0.10,
        QuestionCategory::General => 0.10,
    }
}

/// Scoring a session with no recorded turns is meaningless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("No answers found")]
pub struct NoAnswersError;

/// Per-category aggregate over the session's turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub average_score: f64,
    pub question_count: usize,
    pub answered_count: usize,
}

/// Session-level verdict stored on the interview record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewScoreSummary {
    pub session_id: SessionId,
    pub overall_score: f64,
    pub category_scores: BTreeMap<QuestionCategory, CategoryScore>,
    pub total_questions: usize,
    pub answered_questions: usize,
}

/// Folds evaluated turns into category averages and one weighted overall
/// score. Weights are applied as-is; a session that never reached the
/// heavier categories simply scores lower.
#[derive(Debug, Clone, Copy, Default)]
pub struct InterviewScorer;

impl InterviewScorer {
    pub fn score(
        &self,
        session_id: &SessionId,
        turns: &[ConversationTurn],
    ) -> Result<InterviewScoreSummary, NoAnswersError> {
        if turns.is_empty() {
            return Err(NoAnswersError);
        }

        let mut buckets: BTreeMap<QuestionCategory, (Vec<f64>, usize)> = BTreeMap::new();
        for turn in turns {
            let bucket = buckets.entry(turn.category).or_default();
            if let Some(evaluation) = &turn.evaluation {
                bucket.0.push(evaluation.answer_score);
            }
            bucket.1 += 1;
        }

        let mut category_scores = BTreeMap::new();
        let mut overall = 0.0;
        for (category, (scores, count)) in buckets {
            let average = if scores.is_empty() {
                0.0
            } else {
                round2(scores.iter().sum::<f64>() / scores.len() as f64)
            };
            overall += average * category_weight(category);
            category_scores.insert(
                category,
                CategoryScore {
                    average_score: average,
                    question_count: count,
                    answered_count: scores.len(),
                },
            );
        }

        Ok(InterviewScoreSummary {
            session_id: session_id.clone(),
            overall_score: round2(overall),
            category_scores,
            total_questions: turns.len(),
            answered_questions: turns
                .iter()
                .filter(|turn| !turn.answer.is_empty())
                .count(),
        })
    }
}

/// Clamps a raw value into `[min, max]` and rescales it to 0-100.
pub fn normalize_score(raw: f64, min: f64, max: f64) -> f64 {
    if raw < min {
        return 0.0;
    }
    if raw > max {
        return 100.0;
    }
    (raw - min) / (max - min) * 100.0
}
