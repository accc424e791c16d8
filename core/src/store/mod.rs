//! SQLite reference record store.
//!
//! RULE: Only the store talks to the database.
//! Analyzers never see a connection; they get a `PipelineSnapshot`.
//! Commands suggested by the engine are applied here and show up in the
//! next snapshot.

use crate::{
    command::RecordStoreCommand,
    error::{IntelError, IntelResult},
    lead::{ActivityLog, ActivityType},
    snapshot::PipelineSnapshot,
    types::{ActivityId, Timestamp},
};
use chrono::{DateTime, Duration, Utc};
use rusqlite::Connection;

mod activity;
mod lead;

pub struct LeadStore {
    conn: Connection,
}

impl LeadStore {
    pub fn open(path: &str) -> IntelResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only for real files; :memory: ignores it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> IntelResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> IntelResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_leads.sql"))?;
        Ok(())
    }

    // ── Snapshot ───────────────────────────────────────────────

    /// Everything currently in the store, pinned to `now`.
    pub fn load_snapshot(&self, now: Timestamp) -> IntelResult<PipelineSnapshot> {
        let leads = self.leads()?;
        let activities = self.activities()?;
        log::debug!(
            "store: loaded snapshot with {} leads, {} activities",
            leads.len(),
            activities.len(),
        );
        Ok(PipelineSnapshot::new(leads, activities, now))
    }

    // ── Commands ───────────────────────────────────────────────

    /// Fulfil an outward command. Returns the id of the activity written.
    ///
    /// `RecordActivity` logs an activity at `now`. `ScheduleFollowUp` logs a
    /// note at `now` whose follow-up is due `days_from_now` days later.
    pub fn apply_command(&self, command: &RecordStoreCommand, now: Timestamp) -> IntelResult<ActivityId> {
        let lead_id = command.lead_id();
        if !self.lead_exists(lead_id)? {
            return Err(IntelError::LeadNotFound { lead_id: lead_id.to_string() });
        }

        let activity = match command {
            RecordStoreCommand::RecordActivity { lead_id, activity_type } => ActivityLog {
                id:                  uuid::Uuid::new_v4().to_string(),
                lead_id:             lead_id.clone(),
                activity_type:       activity_type.clone(),
                created_at:          now,
                follow_up_date:      None,
                follow_up_completed: false,
            },
            RecordStoreCommand::ScheduleFollowUp { days_from_now: 0, .. } => {
                return Err(IntelError::InvalidCommand {
                    reason: "follow-up must be at least one day out".into(),
                });
            }
            RecordStoreCommand::ScheduleFollowUp { lead_id, days_from_now } => ActivityLog {
                id:                  uuid::Uuid::new_v4().to_string(),
                lead_id:             lead_id.clone(),
                activity_type:       ActivityType::Note,
                created_at:          now,
                follow_up_date:      Some(now + Duration::days(i64::from(*days_from_now))),
                follow_up_completed: false,
            },
        };

        self.insert_activity(&activity)?;
        log::info!("store: applied {} for {lead_id} as {}", command.label(), activity.id);
        Ok(activity.id)
    }
}

fn to_sql_ts(ts: Timestamp) -> String {
    ts.to_rfc3339()
}

fn from_sql_ts(idx: usize, raw: String) -> rusqlite::Result<Timestamp> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}
