#![allow(dead_code)]

use chrono::{Duration, TimeZone, Utc};
use leadintel_core::{
    lead::{ActivityLog, ActivityType, Lead, LeadStatus, QualificationLevel},
    types::Timestamp,
};

/// Fixed reference time shared by every integration test.
pub fn now() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn days_ago(days: f64) -> Timestamp {
    now() - Duration::milliseconds((days * 86_400_000.0).round() as i64)
}

pub struct LeadBuilder {
    lead: Lead,
}

impl LeadBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            lead: Lead {
                id:                  id.into(),
                name:                format!("Contact {id}"),
                company:             format!("Company {id}"),
                status:              Some(LeadStatus::New),
                qualification_level: Some(QualificationLevel::Warm),
                employee_count:      None,
                industry:            None,
                company_revenue:     None,
                created_at:          days_ago(20.0),
            },
        }
    }

    pub fn status(mut self, status: LeadStatus) -> Self {
        self.lead.status = Some(status);
        self
    }

    pub fn unknown_status(mut self) -> Self {
        self.lead.status = None;
        self
    }

    pub fn qualification(mut self, level: QualificationLevel) -> Self {
        self.lead.qualification_level = Some(level);
        self
    }

    pub fn hot(self) -> Self {
        self.qualification(QualificationLevel::Hot)
    }

    pub fn created_days_ago(mut self, days: f64) -> Self {
        self.lead.created_at = days_ago(days);
        self
    }

    pub fn employees(mut self, count: i64) -> Self {
        self.lead.employee_count = Some(count);
        self
    }

    pub fn industry(mut self, industry: &str) -> Self {
        self.lead.industry = Some(industry.into());
        self
    }

    pub fn revenue(mut self, revenue: &str) -> Self {
        self.lead.company_revenue = Some(revenue.into());
        self
    }

    pub fn build(self) -> Lead {
        self.lead
    }
}

pub fn lead(id: &str) -> LeadBuilder {
    LeadBuilder::new(id)
}

/// An activity `days` before `now`. Ids are derived from the inputs, so
/// callers must not log two identical activities for the same lead.
pub fn activity(lead_id: &str, kind: &str, days: f64) -> ActivityLog {
    ActivityLog {
        id:                  format!("{lead_id}-{kind}-{}", (days * 1000.0).round() as i64),
        lead_id:             lead_id.into(),
        activity_type:       ActivityType::from(kind),
        created_at:          days_ago(days),
        follow_up_date:      None,
        follow_up_completed: false,
    }
}

/// An activity at `created_days` ago with a follow-up due `due_days` ago
/// (negative for a future due date).
pub fn follow_up(lead_id: &str, created_days: f64, due_days: f64, completed: bool) -> ActivityLog {
    ActivityLog {
        follow_up_date:      Some(days_ago(due_days)),
        follow_up_completed: completed,
        ..activity(lead_id, "note", created_days)
    }
}

/// An activity relative to the lead's creation rather than `now`.
pub fn activity_after_creation(lead: &Lead, kind: &str, hours: i64) -> ActivityLog {
    let created_at = lead.created_at + Duration::hours(hours);
    ActivityLog {
        id:                  format!("{}-{kind}-h{hours}", lead.id),
        lead_id:             lead.id.clone(),
        activity_type:       ActivityType::from(kind),
        created_at,
        follow_up_date:      None,
        follow_up_completed: false,
    }
}
