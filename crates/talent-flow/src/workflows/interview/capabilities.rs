use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::domain::{CallId, ReminderId, ReminderStage, ScheduleId, SessionId};

/// Trait describing the outbound voice channel used during AI calls.
///
/// Implementations speak the question to the candidate and return the
/// transcribed answer. A failure here is reported to the orchestrator, which
/// decides whether the call as a whole survives.
pub trait VoiceGateway: Send + Sync {
    fn ask(&self, session_id: &SessionId, question: &str) -> Result<String, CapabilityError>;
}

/// Notification payload delivered to one recipient for one reminder stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderMessage {
    pub schedule_id: ScheduleId,
    pub stage: ReminderStage,
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Trait describing outbound notification hooks (e-mail or SMS adapters).
pub trait Notifier: Send + Sync {
    fn send(&self, message: &ReminderMessage) -> Result<(), CapabilityError>;
}

/// A unit of deferred work handed to the background queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduledTask {
    ExecuteCall { queue_id: CallId, eta: NaiveDateTime },
    SendReminder {
        reminder_id: ReminderId,
        eta: NaiveDateTime,
    },
}

/// Trait describing the dispatch side of the work queue.
pub trait TaskDispatcher: Send + Sync {
    fn dispatch(&self, task: ScheduledTask) -> Result<(), CapabilityError>;
}

/// External capability failure.
#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("capability transport unavailable: {0}")]
    Transport(String),
}
