//! Momentum tracking: per-lead engagement velocity and temperature.
//!
//! Each lead's score is the sum of four independently bounded parts:
//!   1. Volume   (±40): activities in the last 14 days
//!   2. Cadence  (±30): mean gap between consecutive activities
//!   3. Trend    (±20): this week vs the week before
//!   4. Recency  (±10): whole days since the last activity
//!
//! The total therefore always sits in [-100, 100]. Every contribution is
//! written to the lead's reasoning list together with the inputs that
//! produced it.

use crate::{
    clock::{age_days, days_between, whole_days_since},
    config::MomentumConfig,
    lead::{ActivityLog, Lead},
    snapshot::{ActivityIndex, PipelineSnapshot},
    types::{LeadId, Timestamp},
};
use serde::{Deserialize, Serialize};

const RECENT_WINDOW_DAYS: f64 = 14.0;
const WEEK_DAYS: f64 = 7.0;
const NO_ACTIVITY_SCORE: i32 = -80;

// ── Public types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Momentum {
    Accelerating,
    Steady,
    Slowing,
    Stalled,
}

impl Momentum {
    pub fn from_score(score: i32) -> Self {
        if score >= 40 {
            Self::Accelerating
        } else if score >= 0 {
            Self::Steady
        } else if score >= -40 {
            Self::Slowing
        } else {
            Self::Stalled
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Flat,
    Down,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Temperature {
    Hot,
    Warm,
    Cooling,
    Cold,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Velocity {
    /// Activities no older than 14 days.
    pub recent_activities:        usize,
    /// Activities no older than 7 days.
    pub very_recent_activities:   usize,
    /// Activities older than 7 and no older than 14 days.
    pub previous_week_activities: usize,
    pub average_interval_days:    f64,
    pub days_since_last_activity: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeadMomentum {
    pub lead_id:          LeadId,
    pub lead_name:        String,
    pub company:          String,
    pub momentum:         Momentum,
    pub score:            i32,
    pub trend:            Trend,
    pub temperature:      Temperature,
    pub velocity:         Velocity,
    pub days_until_stale: i64,
    pub next_action:      String,
    pub reasoning:        Vec<String>,
}

// ── Tracker ──────────────────────────────────────────────────────────────────

pub struct MomentumTracker {
    config: MomentumConfig,
}

impl MomentumTracker {
    pub fn new(config: MomentumConfig) -> Self {
        Self { config }
    }

    pub fn name(&self) -> &'static str { "momentum" }

    pub fn analyze(&self, snapshot: &PipelineSnapshot) -> Vec<LeadMomentum> {
        self.compute(&snapshot.leads, &snapshot.index(), snapshot.now)
    }

    pub fn compute(
        &self,
        leads: &[Lead],
        index: &ActivityIndex<'_>,
        now: Timestamp,
    ) -> Vec<LeadMomentum> {
        let mut out: Vec<LeadMomentum> = leads
            .iter()
            .map(|lead| self.score_lead(lead, index.for_lead(&lead.id), now))
            .collect();

        // Stable: equal scores keep input order.
        out.sort_by(|a, b| b.score.cmp(&a.score));

        log::debug!(
            "momentum: scored {} leads ({} stalled)",
            out.len(),
            out.iter().filter(|m| m.momentum == Momentum::Stalled).count(),
        );
        out
    }

    fn score_lead(&self, lead: &Lead, activities: &[&ActivityLog], now: Timestamp) -> LeadMomentum {
        let days_since_created = whole_days_since(lead.created_at, now);

        let Some(last) = activities.last() else {
            return LeadMomentum {
                lead_id:          lead.id.clone(),
                lead_name:        lead.name.clone(),
                company:          lead.company.clone(),
                momentum:         Momentum::Stalled,
                score:            NO_ACTIVITY_SCORE,
                trend:            Trend::Flat,
                temperature:      Temperature::Cold,
                velocity:         Velocity {
                    recent_activities:        0,
                    very_recent_activities:   0,
                    previous_week_activities: 0,
                    average_interval_days:    0.0,
                    days_since_last_activity: None,
                },
                days_until_stale: (self.config.new_lead_grace_days - days_since_created).max(0),
                next_action:      "Make first contact: no engagement recorded yet".into(),
                reasoning:        vec![
                    "No activities recorded for this lead".into(),
                    format!("Lead created {days_since_created} days ago"),
                ],
            };
        };

        let mut reasoning = Vec::with_capacity(4);

        let ages: Vec<f64> = activities.iter().map(|a| age_days(a.created_at, now)).collect();
        let recent = ages.iter().filter(|&&d| d <= RECENT_WINDOW_DAYS).count();
        let very_recent = ages.iter().filter(|&&d| d <= WEEK_DAYS).count();
        let previous_week = ages
            .iter()
            .filter(|&&d| d > WEEK_DAYS && d <= RECENT_WINDOW_DAYS)
            .count();
        let average_interval = average_interval_days(activities);
        let days_since_last = whole_days_since(last.created_at, now);

        let volume = volume_points(recent);
        reasoning.push(format!("{recent} activities in the last 14 days ({volume:+})"));

        let cadence = cadence_points(average_interval);
        reasoning.push(format!(
            "Average interval between activities {average_interval:.1} days ({cadence:+})"
        ));

        let (trend, trend_delta) = trend_points(very_recent, previous_week);
        reasoning.push(match trend {
            Trend::Up => format!(
                "Activity trending up: {very_recent} this week vs {previous_week} the week before ({trend_delta:+})"
            ),
            Trend::Down => format!(
                "Activity trending down: {very_recent} this week vs {previous_week} the week before ({trend_delta:+})"
            ),
            Trend::Flat => format!(
                "Activity flat: {very_recent} this week vs {previous_week} the week before (+0)"
            ),
        });

        let recency = recency_points(days_since_last);
        reasoning.push(format!("Last activity {days_since_last} days ago ({recency:+})"));

        let score = volume + cadence + trend_delta + recency;
        let momentum = Momentum::from_score(score);
        let temperature = temperature_for(score, recent, days_since_last);

        LeadMomentum {
            lead_id: lead.id.clone(),
            lead_name: lead.name.clone(),
            company: lead.company.clone(),
            momentum,
            score,
            trend,
            temperature,
            velocity: Velocity {
                recent_activities:        recent,
                very_recent_activities:   very_recent,
                previous_week_activities: previous_week,
                average_interval_days:    average_interval,
                days_since_last_activity: Some(days_since_last),
            },
            days_until_stale: (self.config.stale_window_days - days_since_last).max(0),
            next_action: next_action(days_since_last, momentum),
            reasoning,
        }
    }
}

/// Mean of consecutive gaps in fractional days; 0 with fewer than two activities.
pub fn average_interval_days(activities: &[&ActivityLog]) -> f64 {
    if activities.len() < 2 {
        return 0.0;
    }
    let total: f64 = activities
        .windows(2)
        .map(|pair| days_between(pair[0].created_at, pair[1].created_at))
        .sum();
    total / (activities.len() - 1) as f64
}

fn volume_points(recent: usize) -> i32 {
    match recent {
        0 => -40,
        1 => -10,
        2 | 3 => 20,
        _ => 40,
    }
}

fn cadence_points(average_interval: f64) -> i32 {
    if average_interval <= 3.0 {
        30
    } else if average_interval <= 7.0 {
        15
    } else if average_interval <= 14.0 {
        -10
    } else {
        -30
    }
}

fn trend_points(very_recent: usize, previous_week: usize) -> (Trend, i32) {
    use std::cmp::Ordering;
    match very_recent.cmp(&previous_week) {
        Ordering::Greater => (Trend::Up, 20),
        Ordering::Less    => (Trend::Down, -20),
        Ordering::Equal   => (Trend::Flat, 0),
    }
}

fn recency_points(days_since_last: i64) -> i32 {
    match days_since_last {
        d if d <= 1 => 10,
        d if d <= 3 => 5,
        d if d <= 7 => -5,
        _ => -10,
    }
}

fn temperature_for(score: i32, recent: usize, days_since_last: i64) -> Temperature {
    if score >= 40 || (recent >= 3 && days_since_last <= 3) {
        Temperature::Hot
    } else if score >= 0 || recent >= 2 {
        Temperature::Warm
    } else if score >= -40 || recent >= 1 {
        Temperature::Cooling
    } else {
        Temperature::Cold
    }
}

fn next_action(days_since_last: i64, momentum: Momentum) -> String {
    if days_since_last > 14 {
        format!("Urgent: re-engage now, {days_since_last} days without contact")
    } else if days_since_last > 7 {
        "Follow up within 24 hours before the lead goes cold".into()
    } else {
        match momentum {
            Momentum::Accelerating => "Advance the deal: schedule a meeting or send a proposal".into(),
            Momentum::Steady => "Maintain the current touch cadence".into(),
            Momentum::Slowing | Momentum::Stalled => "Increase contact frequency".into(),
        }
    }
}

/// Score every lead in `leads` against `activities` at `now` with default settings.
pub fn compute_momentum(
    leads: &[Lead],
    activities: &[ActivityLog],
    now: Timestamp,
) -> Vec<LeadMomentum> {
    let index = ActivityIndex::build(leads, activities);
    MomentumTracker::new(MomentumConfig::default()).compute(leads, &index, now)
}
