//! Pipeline snapshots: the full input to one engine pass.
//!
//! A snapshot is everything the record store hands over at one point in
//! time: the leads, their activity logs, and the reference `now`. Every
//! analyzer is a function of a snapshot and nothing else.

use crate::{
    error::IntelResult,
    lead::{ActivityLog, Lead},
    types::Timestamp,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineSnapshot {
    pub now:        Timestamp,
    pub leads:      Vec<Lead>,
    #[serde(default)]
    pub activities: Vec<ActivityLog>,
}

impl PipelineSnapshot {
    pub fn new(leads: Vec<Lead>, activities: Vec<ActivityLog>, now: Timestamp) -> Self {
        Self { now, leads, activities }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> IntelResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn to_json_file(&self, path: impl AsRef<Path>) -> IntelResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn index(&self) -> ActivityIndex<'_> {
        ActivityIndex::build(&self.leads, &self.activities)
    }
}

/// Activities grouped by lead, each group in chronological order.
///
/// Activities pointing at a lead that is not in the snapshot are dropped.
/// Equal timestamps keep their input order.
pub struct ActivityIndex<'a> {
    by_lead:  HashMap<&'a str, Vec<&'a ActivityLog>>,
    orphaned: usize,
}

impl<'a> ActivityIndex<'a> {
    pub fn build(leads: &'a [Lead], activities: &'a [ActivityLog]) -> Self {
        let mut by_lead: HashMap<&'a str, Vec<&'a ActivityLog>> = leads
            .iter()
            .map(|lead| (lead.id.as_str(), Vec::new()))
            .collect();

        let mut orphaned = 0;
        for activity in activities {
            match by_lead.get_mut(activity.lead_id.as_str()) {
                Some(group) => group.push(activity),
                None => orphaned += 1,
            }
        }

        for group in by_lead.values_mut() {
            group.sort_by_key(|a| a.created_at);
        }

        if orphaned > 0 {
            log::warn!("index: dropped {orphaned} activities with unknown lead ids");
        }

        Self { by_lead, orphaned }
    }

    /// Chronological activities for `lead_id`; empty when the lead has none.
    pub fn for_lead(&self, lead_id: &str) -> &[&'a ActivityLog] {
        self.by_lead.get(lead_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Activities that referenced no known lead.
    pub fn orphaned(&self) -> usize {
        self.orphaned
    }
}
