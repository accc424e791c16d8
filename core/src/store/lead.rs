use super::{from_sql_ts, to_sql_ts, LeadStore};
use crate::{
    error::IntelResult,
    lead::{Lead, LeadStatus, QualificationLevel},
};
use rusqlite::{params, OptionalExtension};
use std::str::FromStr;

impl LeadStore {
    // ── Leads ──────────────────────────────────────────────────

    pub fn insert_lead(&self, lead: &Lead) -> IntelResult<()> {
        self.conn.execute(
            "INSERT INTO lead (
                id, name, company, status, qualification_level,
                employee_count, industry, company_revenue, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                lead.id,
                lead.name,
                lead.company,
                lead.status.map(|s| s.as_str()),
                lead.qualification_level.map(|q| q.as_str()),
                lead.employee_count,
                lead.industry,
                lead.company_revenue,
                to_sql_ts(lead.created_at),
            ],
        )?;
        Ok(())
    }

    /// Overwrite a lead's pipeline stage. Used by the runner and tests to
    /// move leads through the pipeline between snapshots.
    pub fn update_lead_status(&self, lead_id: &str, status: LeadStatus) -> IntelResult<bool> {
        let changed = self.conn.execute(
            "UPDATE lead SET status = ?2 WHERE id = ?1",
            params![lead_id, status.as_str()],
        )?;
        Ok(changed > 0)
    }

    pub fn lead_exists(&self, lead_id: &str) -> IntelResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row("SELECT 1 FROM lead WHERE id = ?1", params![lead_id], |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    }

    pub fn lead_count(&self) -> IntelResult<i64> {
        let count = self.conn.query_row("SELECT COUNT(*) FROM lead", [], |row| row.get(0))?;
        Ok(count)
    }

    /// All leads in insertion order. Unrecognised status or qualification
    /// values load as `None`.
    pub fn leads(&self) -> IntelResult<Vec<Lead>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, company, status, qualification_level,
                    employee_count, industry, company_revenue, created_at
             FROM lead ORDER BY rowid ASC",
        )?;
        let leads = stmt
            .query_map([], |row| {
                let id: String = row.get(0)?;
                let status: Option<String> = row.get(3)?;
                let qualification: Option<String> = row.get(4)?;
                Ok(Lead {
                    status:              recognise::<LeadStatus>(&id, "status", status),
                    qualification_level: recognise::<QualificationLevel>(&id, "qualification_level", qualification),
                    name:                row.get(1)?,
                    company:             row.get(2)?,
                    employee_count:      row.get(5)?,
                    industry:            row.get(6)?,
                    company_revenue:     row.get(7)?,
                    created_at:          from_sql_ts(8, row.get(8)?)?,
                    id,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(leads)
    }
}

fn recognise<T: FromStr>(lead_id: &str, column: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("store: lead {lead_id} has unrecognised {column} '{raw}', excluding it");
            None
        }
    }
}
