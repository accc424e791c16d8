//! Shared primitive types used across the engine.

use chrono::{DateTime, Utc};

/// A stable, unique identifier for a lead.
pub type LeadId = String;

/// A stable, unique identifier for an activity log entry.
pub type ActivityId = String;

/// Every timestamp the engine sees is UTC.
pub type Timestamp = DateTime<Utc>;
