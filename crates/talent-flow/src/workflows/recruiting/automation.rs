use serde::Serialize;

use super::domain::{ApplicationStatus, AutomationSettings};

/// Outcome of evaluating one application against a job's automation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AutomationDecision {
    Disabled,
    NotPending,
    Shortlist,
    Reject,
    Unchanged,
}

impl AutomationDecision {
    pub const fn reason(self) -> &'static str {
        match self {
            AutomationDecision::Disabled => "automation disabled",
            AutomationDecision::NotPending => "application not pending",
            AutomationDecision::Shortlist => "auto_shortlisted",
            AutomationDecision::Reject => "auto_rejected",
            AutomationDecision::Unchanged => "unchanged",
        }
    }
}

/// Tally emitted by a bulk automation pass over one job's pending pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AutomationRunSummary {
    pub total: usize,
    pub shortlisted: usize,
    pub rejected: usize,
    pub unchanged: usize,
}

impl AutomationRunSummary {
    pub fn record(&mut self, decision: AutomationDecision) {
        self.total += 1;
        match decision {
            AutomationDecision::Shortlist => self.shortlisted += 1,
            AutomationDecision::Reject => self.rejected += 1,
            AutomationDecision::Unchanged
            | AutomationDecision::Disabled
            | AutomationDecision::NotPending => self.unchanged += 1,
        }
    }
}

/// Dry-run view of a bulk pass, including the thresholds in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AutomationPreview {
    pub would_shortlist: usize,
    pub would_reject: usize,
    pub would_remain_pending: usize,
    pub shortlist_threshold: u8,
    pub reject_threshold: u8,
}

/// Applies per-job thresholds to scored applications.
///
/// `decide` is the single comparison site; both the mutating pass and the
/// preview are built on it so the two can never disagree for the same inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutomationEngine;

impl AutomationEngine {
    pub fn decide(
        &self,
        settings: &AutomationSettings,
        status: ApplicationStatus,
        match_score: f64,
    ) -> AutomationDecision {
        if !settings.enabled {
            return AutomationDecision::Disabled;
        }
        if status != ApplicationStatus::Pending {
            return AutomationDecision::NotPending;
        }
        if match_score >= settings.shortlist_threshold as f64 {
            AutomationDecision::Shortlist
        } else if match_score < settings.reject_threshold as f64 {
            AutomationDecision::Reject
        } else {
            AutomationDecision::Unchanged
        }
    }

    pub fn preview<I>(&self, settings: &AutomationSettings, pending_scores: I) -> AutomationPreview
    where
        I: IntoIterator<Item = f64>,
    {
        let mut preview = AutomationPreview {
            would_shortlist: 0,
            would_reject: 0,
            would_remain_pending: 0,
            shortlist_threshold: settings.shortlist_threshold,
            reject_threshold: settings.reject_threshold,
        };

        for score in pending_scores {
            match self.decide(settings, ApplicationStatus::Pending, score) {
                AutomationDecision::Shortlist => preview.would_shortlist += 1,
                AutomationDecision::Reject => preview.would_reject += 1,
                _ => preview.would_remain_pending += 1,
            }
        }

        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(enabled: bool) -> AutomationSettings {
        AutomationSettings {
            enabled,
            shortlist_threshold: 80,
            reject_threshold: 30,
        }
    }

    #[test]
    fn disabled_job_is_untouched() {
        let decision =
            AutomationEngine.decide(&settings(false), ApplicationStatus::Pending, 95.0);
        assert_eq!(decision, AutomationDecision::Disabled);
        assert_eq!(decision.reason(), "automation disabled");
    }

    #[test]
    fn only_pending_applications_are_considered() {
        let decision =
            AutomationEngine.decide(&settings(true), ApplicationStatus::Shortlisted, 95.0);
        assert_eq!(decision, AutomationDecision::NotPending);
    }

    #[test]
    fn threshold_bands_split_the_pipeline() {
        let rules = settings(true);
        let cases = [
            (85.0, AutomationDecision::Shortlist),
            (80.0, AutomationDecision::Shortlist),
            (50.0, AutomationDecision::Unchanged),
            (30.0, AutomationDecision::Unchanged),
            (20.0, AutomationDecision::Reject),
        ];
        for (score, expected) in cases {
            assert_eq!(
                AutomationEngine.decide(&rules, ApplicationStatus::Pending, score),
                expected,
                "score {score}"
            );
        }
    }

    #[test]
    fn preview_and_decide_agree() {
        let rules = settings(true);
        let scores = [85.0, 20.0, 50.0, 80.0, 29.9];
        let preview = AutomationEngine.preview(&rules, scores);
        assert_eq!(preview.would_shortlist, 2);
        assert_eq!(preview.would_reject, 2);
        assert_eq!(preview.would_remain_pending, 1);
        assert_eq!(preview.shortlist_threshold, 80);
        assert_eq!(preview.reject_threshold, 30);

        let mut summary = AutomationRunSummary::default();
        for score in scores {
            summary.record(AutomationEngine.decide(&rules, ApplicationStatus::Pending, score));
        }
        assert_eq!(summary.shortlisted, preview.would_shortlist);
        assert_eq!(summary.rejected, preview.would_reject);
        assert_eq!(summary.unchanged, preview.would_remain_pending);
        assert_eq!(summary.total, scores.len());
    }
}
