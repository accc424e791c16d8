use crate::{
    lead::ActivityType,
    types::{LeadId, Timestamp},
};
use serde::{Deserialize, Serialize};

/// Outward commands the engine may suggest.
/// The engine never executes these; the record store applies them and the
/// next snapshot reflects the result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum RecordStoreCommand {
    RecordActivity {
        lead_id:       LeadId,
        activity_type: ActivityType,
    },
    ScheduleFollowUp {
        lead_id:       LeadId,
        days_from_now: u32,
    },
}

impl RecordStoreCommand {
    pub fn lead_id(&self) -> &str {
        match self {
            Self::RecordActivity { lead_id, .. } | Self::ScheduleFollowUp { lead_id, .. } => lead_id,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::RecordActivity { activity_type, .. } => format!("Log {activity_type}"),
            Self::ScheduleFollowUp { days_from_now: 1, .. } => "Follow up tomorrow".into(),
            Self::ScheduleFollowUp { days_from_now, .. } => format!("Follow up in {days_from_now} days"),
        }
    }
}

/// A command handed to the record store, stamped with an id and the
/// reference time it was issued against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueuedCommand {
    pub command_id: String,
    pub issued_at:  Timestamp,
    pub command:    RecordStoreCommand,
}

impl QueuedCommand {
    pub fn new(command: RecordStoreCommand, issued_at: Timestamp) -> Self {
        Self {
            command_id: uuid::Uuid::new_v4().to_string(),
            issued_at,
            command,
        }
    }
}
