use serde::Serialize;

/// Blend weights applied when an interview score is available.
const ATS_WEIGHT: f64 = 0.4;
const INTERVIEW_WEIGHT: f64 = 0.6;

/// Hiring recommendation tier derived from the combined score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub decision: &'static str,
    pub priority: &'static str,
    pub next_step: &'static str,
}

/// Combined score plus the weights that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverallRating {
    pub score: f64,
    pub rating: &'static str,
    pub ats_weight: u8,
    pub interview_weight: u8,
}

/// Blends the ATS total with the interview overall. A missing or zero
/// interview score leaves the ATS total untouched rather than dragging the
/// candidate down.
pub fn combined_score(ats_total: f64, interview_overall: Option<f64>) -> f64 {
    match interview_overall {
        Some(score) if score > 0.0 => ats_total * ATS_WEIGHT + score * INTERVIEW_WEIGHT,
        _ => ats_total,
    }
}

pub fn recommend(combined: f64) -> Recommendation {
    if combined >= 80.0 {
        Recommendation {
            decision: "Strong Hire",
            priority: "High",
            next_step: "Schedule in-person interview immediately",
        }
    } else if combined >= 70.0 {
        Recommendation {
            decision: "Hire",
            priority: "Medium",
            next_step: "Proceed with technical assessment",
        }
    } else if combined >= 60.0 {
        Recommendation {
            decision: "Consider",
            priority: "Low",
            next_step: "Review with hiring manager",
        }
    } else {
        Recommendation {
            decision: "Reject",
            priority: "N/A",
            next_step: "Send rejection email",
        }
    }
}

pub fn rating_label(combined: f64) -> &'static str {
    if combined >= 85.0 {
        "Excellent"
    } else if combined >= 75.0 {
        "Good"
    } else if combined >= 65.0 {
        "Average"
    } else {
        "Below Average"
    }
}

pub fn overall_rating(ats_total: f64, interview_overall: Option<f64>) -> OverallRating {
    let blended = matches!(interview_overall, Some(score) if score > 0.0);
    let combined = combined_score(ats_total, interview_overall);
    OverallRating {
        score: round1(combined),
        rating: rating_label(combined),
        ats_weight: if blended { 40 } else { 100 },
        interview_weight: if blended { 60 } else { 0 },
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_score_blends_when_interview_present() {
        assert_eq!(combined_score(80.0, Some(90.0)), 80.0 * 0.4 + 90.0 * 0.6);
    }

    #[test]
    fn combined_score_falls_back_to_ats() {
        assert_eq!(combined_score(72.0, None), 72.0);
        assert_eq!(combined_score(72.0, Some(0.0)), 72.0);
    }

    #[test]
    fn recommendation_tiers() {
        assert_eq!(recommend(80.0).decision, "Strong Hire");
        assert_eq!(recommend(80.0).priority, "High");
        assert_eq!(recommend(79.9).decision, "Hire");
        assert_eq!(recommend(70.0).next_step, "Proceed with technical assessment");
        assert_eq!(recommend(60.0).decision, "Consider");
        assert_eq!(recommend(59.9).decision, "Reject");
        assert_eq!(recommend(59.9).priority, "N/A");
    }

    #[test]
    fn rating_bands() {
        assert_eq!(rating_label(85.0), "Excellent");
        assert_eq!(rating_label(84.9), "Good");
        assert_eq!(rating_label(74.9), "Average");
        assert_eq!(rating_label(64.9), "Below Average");
    }

    #[test]
    fn overall_rating_reports_weights() {
        let blended = overall_rating(80.0, Some(90.0));
        assert_eq!(blended.score, 86.0);
        assert_eq!(blended.rating, "Excellent");
        assert_eq!(blended.ats_weight, 40);
        assert_eq!(blended.interview_weight, 60);

        let ats_only = overall_rating(66.64, None);
        assert_eq!(ats_only.score, 66.6);
        assert_eq!(ats_only.rating, "Average");
        assert_eq!(ats_only.ats_weight, 100);
        assert_eq!(ats_only.interview_weight, 0);
    }
}
