use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::RepositoryError;
use crate::workflows::recruiting::JobId;

use super::domain::{FlowScope, FlowState, QuestionCategory, QuestionCondition, QuestionTemplate};
use super::store::QuestionFlowRepository;

fn experience_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(\d+)\s*(?:years?|yrs?)").expect("experience pattern is valid")
    })
}

/// A question the engine wants spoken next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptedQuestion {
    pub text: String,
    pub category: QuestionCategory,
    pub follow_up: bool,
}

/// Outcome of asking the engine for the next step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowStep {
    Ask(PromptedQuestion),
    Complete,
}

/// Branching question flow driver.
///
/// The engine is stateless; all progress lives in the [`FlowState`] record so
/// a call can resume mid-interview after a process restart. Conditions are
/// evaluated against the answers gathered so far, and each template may fire
/// at most one keyword-triggered follow-up.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuestionFlowEngine;

impl QuestionFlowEngine {
    /// Baseline five-question interview used when no flow is configured.
    pub fn built_in() -> Vec<QuestionTemplate> {
        vec![
            QuestionTemplate {
                order: 1,
                category: QuestionCategory::Introduction,
                text: "Tell me about yourself and your background.".to_string(),
                condition: None,
                follow_up_triggers: Vec::new(),
            },
            QuestionTemplate {
                order: 2,
                category: QuestionCategory::Experience,
                text: "How many years of professional experience do you have?".to_string(),
                condition: None,
                follow_up_triggers: Vec::new(),
            },
            QuestionTemplate {
                order: 3,
                category: QuestionCategory::Skills,
                text: "What are your key technical skills?".to_string(),
                condition: None,
                follow_up_triggers: Vec::new(),
            },
            QuestionTemplate {
                order: 4,
                category: QuestionCategory::Availability,
                text: "When can you start if selected?".to_string(),
                condition: None,
                follow_up_triggers: Vec::new(),
            },
            QuestionTemplate {
                order: 5,
                category: QuestionCategory::Salary,
                text: "What are your salary expectations?".to_string(),
                condition: None,
                follow_up_triggers: Vec::new(),
            },
        ]
    }

    /// Resolves the flow for a job: job-specific, then the shared default,
    /// then the built-in baseline.
    pub fn resolve<R>(&self, repository: &R, job_id: &JobId) -> Result<Vec<QuestionTemplate>, RepositoryError>
    where
        R: QuestionFlowRepository + ?Sized,
    {
        if let Some(flow) = repository.flow(&FlowScope::Job(job_id.clone()))? {
            if !flow.is_empty() {
                return Ok(flow);
            }
        }
        if let Some(flow) = repository.flow(&FlowScope::Default)? {
            if !flow.is_empty() {
                return Ok(flow);
            }
        }
        Ok(Self::built_in())
    }

    /// Stores the latest answer at the current position. Overwrites when a
    /// follow-up answer replaces the main one for the same question.
    pub fn record_answer(&self, state: &mut FlowState, answer: &str) {
        state.answers.insert(state.current_index, answer.to_string());
    }

    /// The only place the cursor moves forward past an asked question.
    pub fn advance(&self, state: &mut FlowState) {
        state.current_index += 1;
    }

    /// Picks the next question, skipping templates whose conditions fail and
    /// emitting a follow-up when the previous answer names a trigger keyword.
    ///
    /// A skipped question clears `previous_answer` before re-evaluating, so a
    /// follow-up never fires against the template that replaced a skip.
    pub fn next_question(
        &self,
        flow: &[QuestionTemplate],
        state: &mut FlowState,
        previous_answer: Option<&str>,
    ) -> FlowStep {
        let mut answer = previous_answer;
        loop {
            if state.current_index >= flow.len() {
                return FlowStep::Complete;
            }
            let template = &flow[state.current_index];

            if !self.conditions_met(template, &state.answers) {
                state.current_index += 1;
                answer = None;
                continue;
            }

            if let Some(text) = answer {
                if !state.follow_up_used.contains(&state.current_index) {
                    if let Some(prompt) = follow_up_for(template, text) {
                        state.follow_up_used.insert(state.current_index);
                        return FlowStep::Ask(PromptedQuestion {
                            text: prompt,
                            category: template.category,
                            follow_up: true,
                        });
                    }
                }
            }

            state.completed_categories.insert(template.category);
            return FlowStep::Ask(PromptedQuestion {
                text: template.text.clone(),
                category: template.category,
                follow_up: false,
            });
        }
    }

    fn conditions_met(&self, template: &QuestionTemplate, answers: &BTreeMap<usize, String>) -> bool {
        match &template.condition {
            None => true,
            Some(QuestionCondition::MinExperience { years }) => {
                extract_experience_years(answers) >= *years
            }
            Some(QuestionCondition::RequiresSkill { skill }) => {
                let needle = skill.to_lowercase();
                answers
                    .values()
                    .any(|answer| answer.to_lowercase().contains(&needle))
            }
        }
    }
}

/// First "N years" mention across the answers so far, zero when nobody has
/// said one yet.
fn extract_experience_years(answers: &BTreeMap<usize, String>) -> u32 {
    for answer in answers.values() {
        if let Some(captures) = experience_pattern().captures(&answer.to_lowercase()) {
            if let Ok(years) = captures[1].parse::<u32>() {
                return years;
            }
        }
    }
    0
}

fn follow_up_for(template: &QuestionTemplate, answer: &str) -> Option<String> {
    let answer_lower = answer.to_lowercase();
    for keyword in &template.follow_up_triggers {
        if answer_lower.contains(&keyword.to_lowercase()) {
            return Some(format!(
                "You mentioned {keyword}. Can you tell me more about your experience with it?"
            ));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::interview::domain::SessionId;

    fn state() -> FlowState {
        FlowState::new(SessionId("sess-1".to_string()))
    }

    fn template(order: u32, category: QuestionCategory, text: &str) -> QuestionTemplate {
        QuestionTemplate {
            order,
            category,
            text: text.to_string(),
            condition: None,
            follow_up_triggers: Vec::new(),
        }
    }

    #[test]
    fn built_in_flow_walks_five_categories_in_order() {
        let engine = QuestionFlowEngine;
        let flow = QuestionFlowEngine::built_in();
        let mut state = state();
        let mut categories = Vec::new();

        loop {
            match engine.next_question(&flow, &mut state, None) {
                FlowStep::Ask(question) => {
                    categories.push(question.category);
                    engine.record_answer(&mut state, "fine");
                    engine.advance(&mut state);
                }
                FlowStep::Complete => break,
            }
        }

        assert_eq!(
            categories,
            vec![
                QuestionCategory::Introduction,
                QuestionCategory::Experience,
                QuestionCategory::Skills,
                QuestionCategory::Availability,
                QuestionCategory::Salary,
            ]
        );
    }

    #[test]
    fn min_experience_condition_skips_juniors() {
        let engine = QuestionFlowEngine;
        let mut senior_only = template(2, QuestionCategory::Experience, "Describe a system you led.");
        senior_only.condition = Some(QuestionCondition::MinExperience { years: 5 });
        let flow = vec![
            template(1, QuestionCategory::Introduction, "Introduce yourself."),
            senior_only,
            template(3, QuestionCategory::Skills, "Key skills?"),
        ];

        let mut state = state();
        engine.record_answer(&mut state, "I have 2 years of experience");
        engine.advance(&mut state);

        match engine.next_question(&flow, &mut state, None) {
            FlowStep::Ask(question) => assert_eq!(question.category, QuestionCategory::Skills),
            FlowStep::Complete => panic!("flow should continue past the skip"),
        }
        assert_eq!(state.current_index, 2);
    }

    #[test]
    fn senior_answer_unlocks_the_conditional_question() {
        let engine = QuestionFlowEngine;
        let mut senior_only = template(2, QuestionCategory::Experience, "Describe a system you led.");
        senior_only.condition = Some(QuestionCondition::MinExperience { years: 5 });
        let flow = vec![
            template(1, QuestionCategory::Introduction, "Introduce yourself."),
            senior_only,
        ];

        let mut state = state();
        engine.record_answer(&mut state, "roughly 7 yrs in backend teams");
        engine.advance(&mut state);

        match engine.next_question(&flow, &mut state, None) {
            FlowStep::Ask(question) => {
                assert_eq!(question.text, "Describe a system you led.");
            }
            FlowStep::Complete => panic!("condition should pass at seven years"),
        }
    }

    #[test]
    fn requires_skill_condition_matches_case_insensitively() {
        let engine = QuestionFlowEngine;
        let mut rust_question = template(2, QuestionCategory::Skills, "Which Rust crates?");
        rust_question.condition = Some(QuestionCondition::RequiresSkill {
            skill: "rust".to_string(),
        });
        let flow = vec![
            template(1, QuestionCategory::Skills, "Key skills?"),
            rust_question,
        ];

        let mut state = state();
        engine.record_answer(&mut state, "Mostly Rust and SQL");
        engine.advance(&mut state);

        match engine.next_question(&flow, &mut state, None) {
            FlowStep::Ask(question) => assert_eq!(question.text, "Which Rust crates?"),
            FlowStep::Complete => panic!("skill mention should unlock the question"),
        }
    }

    #[test]
    fn follow_up_fires_once_per_question() {
        let engine = QuestionFlowEngine;
        let mut skills = template(1, QuestionCategory::Skills, "Key skills?");
        skills.follow_up_triggers = vec!["kubernetes".to_string()];
        let flow = vec![skills];

        let mut state = state();
        match engine.next_question(&flow, &mut state, None) {
            FlowStep::Ask(question) => assert!(!question.follow_up),
            FlowStep::Complete => panic!("main question expected"),
        }
        engine.record_answer(&mut state, "I run Kubernetes clusters");

        let step = engine.next_question(&flow, &mut state, Some("I run Kubernetes clusters"));
        match step {
            FlowStep::Ask(question) => {
                assert!(question.follow_up);
                assert_eq!(
                    question.text,
                    "You mentioned kubernetes. Can you tell me more about your experience with it?"
                );
            }
            FlowStep::Complete => panic!("follow-up expected"),
        }

        // The answer to the follow-up mentions the keyword again; the prompt
        // must not repeat.
        engine.record_answer(&mut state, "More kubernetes detail");
        let step = engine.next_question(&flow, &mut state, Some("More kubernetes detail"));
        match step {
            FlowStep::Ask(question) => assert!(!question.follow_up),
            FlowStep::Complete => panic!("main question should repeat, not complete"),
        }
    }

    #[test]
    fn cursor_past_the_end_completes_the_flow() {
        let engine = QuestionFlowEngine;
        let flow = vec![template(1, QuestionCategory::Introduction, "Introduce yourself.")];
        let mut state = state();
        state.current_index = 1;
        assert_eq!(engine.next_question(&flow, &mut state, None), FlowStep::Complete);
    }

    #[test]
    fn unanswered_flow_defaults_to_zero_years() {
        assert_eq!(extract_experience_years(&BTreeMap::new()), 0);
        let mut answers = BTreeMap::new();
        answers.insert(0, "no numbers here".to_string());
        assert_eq!(extract_experience_years(&answers), 0);
        answers.insert(1, "about 12 years across roles".to_string());
        assert_eq!(extract_experience_years(&answers), 12);
    }
}
