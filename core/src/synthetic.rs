//! Synthetic pipeline generation: a seeded lead/activity population.
//!
//! Used by the runner's `--synthetic` mode and by tests that need a
//! realistic population without a record store. Same seed, lead count and
//! `now` always produce the same snapshot.
//!
//! Leads that engage early and across channels are more likely to be
//! generated as won, so the pattern miner has something to find.

use crate::{
    lead::{ActivityLog, ActivityType, Lead, LeadStatus, QualificationLevel},
    name_generator::NameGenerator,
    rng::{RngBank, SeededRng, StreamSlot},
    snapshot::PipelineSnapshot,
    types::Timestamp,
};
use chrono::Duration;

const QUALIFICATION_WEIGHTS: [f64; 3] = [0.25, 0.45, 0.30];
const ACTIVITY_TYPES: [&str; 5] = ["call", "email", "meeting", "note", "linkedin"];
const ACTIVITY_TYPE_WEIGHTS: [f64; 5] = [0.35, 0.35, 0.12, 0.13, 0.05];

#[derive(Debug, Clone)]
pub struct SyntheticPipeline {
    pub seed:         u64,
    pub lead_count:   usize,
    /// Leads are created up to this many days before `now`.
    pub history_days: i64,
}

impl SyntheticPipeline {
    pub fn new(seed: u64, lead_count: usize) -> Self {
        Self { seed, lead_count, history_days: 120 }
    }

    pub fn with_history_days(mut self, days: i64) -> Self {
        self.history_days = days.max(1);
        self
    }

    pub fn generate(&self, now: Timestamp) -> PipelineSnapshot {
        let bank = RngBank::new(self.seed);
        let mut lead_rng = bank.for_stream(StreamSlot::Leads);
        let mut activity_rng = bank.for_stream(StreamSlot::Activities);
        let mut outcome_rng = bank.for_stream(StreamSlot::Outcomes);
        let mut name_rng = bank.for_stream(StreamSlot::Names);

        let mut leads = Vec::with_capacity(self.lead_count);
        let mut activities = Vec::new();

        for i in 0..self.lead_count {
            let mut lead = self.generate_lead(i, now, &mut lead_rng, &mut name_rng);
            let lead_activities = generate_activities(&lead, now, &mut activity_rng);
            lead.status = Some(decide_status(&lead, &lead_activities, now, &mut outcome_rng));
            leads.push(lead);
            activities.extend(lead_activities);
        }

        log::debug!(
            "synthetic: seed={} streams [{}, {}, {}, {}] generated {} leads, {} activities",
            self.seed,
            lead_rng.name,
            activity_rng.name,
            outcome_rng.name,
            name_rng.name,
            leads.len(),
            activities.len(),
        );
        PipelineSnapshot::new(leads, activities, now)
    }

    fn generate_lead(
        &self,
        i: usize,
        now: Timestamp,
        rng: &mut SeededRng,
        names: &mut SeededRng,
    ) -> Lead {
        let age_hours = rng.range_inclusive(0, self.history_days * 24);
        let qualification = match rng.weighted_index(&QUALIFICATION_WEIGHTS) {
            0 => QualificationLevel::Hot,
            1 => QualificationLevel::Warm,
            _ => QualificationLevel::Cold,
        };

        let employee_count = rng.chance(0.8).then(|| match rng.next_u64_below(4) {
            0 => rng.range_inclusive(5, 49),
            1 => rng.range_inclusive(50, 199),
            2 => rng.range_inclusive(200, 999),
            _ => rng.range_inclusive(1000, 20_000),
        });

        let company_revenue = if rng.chance(0.6) {
            Some(format_revenue(rng))
        } else if rng.chance(0.25) {
            Some("undisclosed".to_string())
        } else {
            None
        };

        Lead {
            id:                  format!("lead-{i:04}"),
            name:                NameGenerator::contact_name(names),
            company:             NameGenerator::company_name(names),
            status:              None,
            qualification_level: Some(qualification),
            employee_count,
            industry:            rng.chance(0.85).then(|| NameGenerator::industry(names).to_string()),
            company_revenue,
            created_at:          now - Duration::hours(age_hours),
        }
    }
}

fn format_revenue(rng: &mut SeededRng) -> String {
    match rng.next_u64_below(3) {
        0 => format!("${}K", rng.range_inclusive(200, 950)),
        1 => format!("${}.{}M", rng.range_inclusive(1, 80), rng.range_inclusive(0, 9)),
        _ => format!("${}B", rng.range_inclusive(1, 3)),
    }
}

fn generate_activities(lead: &Lead, now: Timestamp, rng: &mut SeededRng) -> Vec<ActivityLog> {
    let span_hours = (now - lead.created_at).num_hours().max(0);
    let propensity = match lead.qualification_level {
        Some(QualificationLevel::Hot) => 8,
        Some(QualificationLevel::Warm) => 6,
        _ => 4,
    };
    let count = rng.range_inclusive(0, propensity) as usize;

    let mut offsets: Vec<i64> = (0..count).map(|_| rng.range_inclusive(0, span_hours)).collect();
    offsets.sort_unstable();

    offsets
        .into_iter()
        .enumerate()
        .map(|(k, offset)| {
            let created_at = lead.created_at + Duration::hours(offset);
            let kind = ACTIVITY_TYPES[rng.weighted_index(&ACTIVITY_TYPE_WEIGHTS)];
            let follow_up_date = rng
                .chance(0.2)
                .then(|| created_at + Duration::days(rng.range_inclusive(1, 7)));
            let follow_up_completed = match follow_up_date {
                Some(due) if due < now => rng.chance(0.7),
                _ => false,
            };
            ActivityLog {
                id: format!("{}-act-{k:02}", lead.id),
                lead_id: lead.id.clone(),
                activity_type: ActivityType::from(kind),
                created_at,
                follow_up_date,
                follow_up_completed,
            }
        })
        .collect()
}

/// Older leads are resolved to won or lost; younger ones sit at a stage
/// matching how much they have been worked.
fn decide_status(
    lead: &Lead,
    activities: &[ActivityLog],
    now: Timestamp,
    rng: &mut SeededRng,
) -> LeadStatus {
    let age_days = (now - lead.created_at).num_days();
    let early_touches = activities
        .iter()
        .filter(|a| a.created_at - lead.created_at <= Duration::days(7))
        .count();
    let channels = activities
        .iter()
        .map(|a| a.activity_type.as_str())
        .collect::<std::collections::HashSet<_>>()
        .len();

    if age_days > 45 && rng.chance(0.7) {
        let mut win_chance: f64 = 0.12;
        if early_touches >= 3 {
            win_chance += 0.30;
        }
        if channels >= 3 {
            win_chance += 0.15;
        }
        if lead.qualification_level == Some(QualificationLevel::Hot) {
            win_chance += 0.05;
        }
        return if rng.chance(win_chance.min(0.9)) {
            LeadStatus::Won
        } else {
            LeadStatus::Lost
        };
    }

    match activities.len() {
        0 => LeadStatus::New,
        1 | 2 => LeadStatus::Contacted,
        3 | 4 => LeadStatus::Qualified,
        _ => LeadStatus::Proposal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn same_seed_same_snapshot() {
        let a = SyntheticPipeline::new(42, 60).generate(now());
        let b = SyntheticPipeline::new(42, 60).generate(now());
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_differ() {
        let a = SyntheticPipeline::new(1, 30).generate(now());
        let b = SyntheticPipeline::new(2, 30).generate(now());
        assert_ne!(a.leads, b.leads);
    }

    #[test]
    fn activities_reference_generated_leads_and_never_postdate_now() {
        let snap = SyntheticPipeline::new(7, 80).generate(now());
        assert_eq!(snap.leads.len(), 80);
        assert_eq!(snap.index().orphaned(), 0);
        for a in &snap.activities {
            assert!(a.created_at <= now(), "activity {} after now", a.id);
        }
        for l in &snap.leads {
            assert!(l.status.is_some(), "lead {} has no status", l.id);
        }
    }
}
