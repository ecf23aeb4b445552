use super::domain::ApplicationStatus;

/// Raised when a requested status change is not in the allow-list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot transition application from {} to {}", from.label(), to.label())]
pub struct InvalidTransition {
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
}

/// Targets reachable from `from` in a single transition.
pub const fn allowed_targets(from: ApplicationStatus) -> &'static [ApplicationStatus] {
    match from {
        ApplicationStatus::Pending => {
            &[ApplicationStatus::Shortlisted, ApplicationStatus::Rejected]
        }
        ApplicationStatus::Shortlisted => &[
            ApplicationStatus::InterviewScheduled,
            ApplicationStatus::Rejected,
        ],
        ApplicationStatus::InterviewScheduled => {
            &[ApplicationStatus::Reviewed, ApplicationStatus::Rejected]
        }
        ApplicationStatus::Reviewed => &[
            ApplicationStatus::Accepted,
            ApplicationStatus::Rejected,
            ApplicationStatus::Selected,
        ],
        ApplicationStatus::Accepted => &[ApplicationStatus::Selected],
        ApplicationStatus::Rejected | ApplicationStatus::Selected => &[],
    }
}

pub const fn is_terminal(status: ApplicationStatus) -> bool {
    allowed_targets(status).is_empty()
}

/// Validates a single-step transition against the allow-list.
pub fn ensure_transition(
    from: ApplicationStatus,
    to: ApplicationStatus,
) -> Result<(), InvalidTransition> {
    if allowed_targets(from).contains(&to) {
        Ok(())
    } else {
        Err(InvalidTransition { from, to })
    }
}
