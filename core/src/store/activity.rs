use super::{from_sql_ts, to_sql_ts, LeadStore};
use crate::{
    error::{IntelError, IntelResult},
    lead::{ActivityLog, ActivityType},
};
use rusqlite::params;

impl LeadStore {
    // ── Activity log ───────────────────────────────────────────

    pub fn insert_activity(&self, activity: &ActivityLog) -> IntelResult<()> {
        self.conn.execute(
            "INSERT INTO activity_log (
                id, lead_id, activity_type, created_at, follow_up_date, follow_up_completed
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                activity.id,
                activity.lead_id,
                activity.activity_type.as_str(),
                to_sql_ts(activity.created_at),
                activity.follow_up_date.map(to_sql_ts),
                activity.follow_up_completed,
            ],
        )?;
        Ok(())
    }

    /// All activities, chronological per lead.
    pub fn activities(&self) -> IntelResult<Vec<ActivityLog>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, lead_id, activity_type, created_at, follow_up_date, follow_up_completed
             FROM activity_log ORDER BY lead_id ASC, created_at ASC, rowid ASC",
        )?;
        let activities = stmt
            .query_map([], |row| {
                let follow_up: Option<String> = row.get(4)?;
                Ok(ActivityLog {
                    id:                  row.get(0)?,
                    lead_id:             row.get(1)?,
                    activity_type:       ActivityType::from(row.get::<_, String>(2)?),
                    created_at:          from_sql_ts(3, row.get(3)?)?,
                    follow_up_date:      follow_up.map(|raw| from_sql_ts(4, raw)).transpose()?,
                    follow_up_completed: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(activities)
    }

    pub fn activity_count(&self, lead_id: &str) -> IntelResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM activity_log WHERE lead_id = ?1",
            params![lead_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Mark a scheduled follow-up as done.
    pub fn complete_follow_up(&self, activity_id: &str) -> IntelResult<()> {
        let changed = self.conn.execute(
            "UPDATE activity_log SET follow_up_completed = 1
             WHERE id = ?1 AND follow_up_date IS NOT NULL",
            params![activity_id],
        )?;
        if changed == 0 {
            return Err(IntelError::InvalidCommand {
                reason: format!("activity '{activity_id}' has no follow-up to complete"),
            });
        }
        Ok(())
    }
}
