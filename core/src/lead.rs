//! Lead and activity records as supplied by the record store.
//!
//! RULE: The engine never mutates these. Status and qualification are
//! closed sets; any other value deserializes to `None` and drops out of
//! bucketed analysis instead of failing the pass.

use crate::types::{ActivityId, LeadId, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

// ── Closed enums ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Proposal,
    Won,
    Lost,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New       => "new",
            Self::Contacted => "contacted",
            Self::Qualified => "qualified",
            Self::Proposal  => "proposal",
            Self::Won       => "won",
            Self::Lost      => "lost",
        }
    }

    /// Won and lost leads are closed; everything else is still in play.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl FromStr for LeadStatus {
    type Err = UnrecognizedValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new"       => Ok(Self::New),
            "contacted" => Ok(Self::Contacted),
            "qualified" => Ok(Self::Qualified),
            "proposal"  => Ok(Self::Proposal),
            "won"       => Ok(Self::Won),
            "lost"      => Ok(Self::Lost),
            other       => Err(UnrecognizedValue(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum QualificationLevel {
    Hot,
    Warm,
    Cold,
}

impl QualificationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hot  => "hot",
            Self::Warm => "warm",
            Self::Cold => "cold",
        }
    }
}

impl FromStr for QualificationLevel {
    type Err = UnrecognizedValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hot"  => Ok(Self::Hot),
            "warm" => Ok(Self::Warm),
            "cold" => Ok(Self::Cold),
            other  => Err(UnrecognizedValue(other.to_string())),
        }
    }
}

/// Activity types are open-ended upstream; the engine only needs to
/// recognise calls and emails, everything else is carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityType {
    Call,
    Email,
    Meeting,
    Note,
    Other(String),
}

impl ActivityType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Call         => "call",
            Self::Email        => "email",
            Self::Meeting      => "meeting",
            Self::Note         => "note",
            Self::Other(value) => value,
        }
    }

    /// Direct outreach: the channels that count as "contacting" a lead.
    pub fn is_outreach(&self) -> bool {
        matches!(self, Self::Call | Self::Email)
    }
}

impl From<String> for ActivityType {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "call"    => Self::Call,
            "email"   => Self::Email,
            "meeting" => Self::Meeting,
            "note"    => Self::Note,
            other     => Self::Other(other.to_string()),
        }
    }
}

impl From<&str> for ActivityType {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<ActivityType> for String {
    fn from(kind: ActivityType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnrecognizedValue(pub String);

impl fmt::Display for UnrecognizedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized value '{}'", self.0)
    }
}

impl std::error::Error for UnrecognizedValue {}

// ── Records ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lead {
    pub id:                  LeadId,
    #[serde(default)]
    pub name:                String,
    #[serde(default)]
    pub company:             String,
    #[serde(default, deserialize_with = "lenient_enum")]
    pub status:              Option<LeadStatus>,
    #[serde(default, deserialize_with = "lenient_enum")]
    pub qualification_level: Option<QualificationLevel>,
    #[serde(default)]
    pub employee_count:      Option<i64>,
    #[serde(default)]
    pub industry:            Option<String>,
    #[serde(default)]
    pub company_revenue:     Option<String>,
    pub created_at:          Timestamp,
}

impl Lead {
    pub fn is_won(&self) -> bool {
        self.status == Some(LeadStatus::Won)
    }

    /// Recognised status that is neither won nor lost.
    pub fn is_open(&self) -> bool {
        self.status.is_some_and(|s| !s.is_terminal())
    }

    pub fn is_hot(&self) -> bool {
        self.qualification_level == Some(QualificationLevel::Hot)
    }

    /// Label used in reasoning and example lists.
    pub fn display_name(&self) -> String {
        match (self.name.is_empty(), self.company.is_empty()) {
            (false, false) => format!("{} ({})", self.name, self.company),
            (false, true)  => self.name.clone(),
            (true, false)  => self.company.clone(),
            (true, true)   => self.id.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityLog {
    pub id:                  ActivityId,
    pub lead_id:             LeadId,
    pub activity_type:       ActivityType,
    pub created_at:          Timestamp,
    #[serde(default)]
    pub follow_up_date:      Option<Timestamp>,
    #[serde(default)]
    pub follow_up_completed: bool,
}

impl ActivityLog {
    /// A follow-up that was scheduled, not completed, and whose date is before `now`.
    pub fn overdue_follow_up(&self, now: Timestamp) -> Option<Timestamp> {
        match self.follow_up_date {
            Some(due) if !self.follow_up_completed && due < now => Some(due),
            _ => None,
        }
    }
}

/// Maps any string that is not a member of `T` to `None`.
fn lenient_enum<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_status_deserializes_to_none() {
        let json = r#"{"id":"l1","status":"archived","qualification_level":"HOT",
                       "created_at":"2024-01-01T00:00:00Z"}"#;
        let lead: Lead = serde_json::from_str(json).unwrap();
        assert_eq!(lead.status, None);
        assert_eq!(lead.qualification_level, Some(QualificationLevel::Hot));
        assert!(!lead.is_open());
    }

    #[test]
    fn activity_type_keeps_unknown_values() {
        let kind = ActivityType::from("LinkedIn");
        assert_eq!(kind, ActivityType::Other("linkedin".into()));
        assert!(!kind.is_outreach());
        assert!(ActivityType::from(" Email ").is_outreach());
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let json = r#"{"id":"lead-9","created_at":"2024-01-01T00:00:00Z"}"#;
        let lead: Lead = serde_json::from_str(json).unwrap();
        assert_eq!(lead.display_name(), "lead-9");
    }
}
