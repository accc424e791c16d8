//! Revenue forecasting: per-lead win probability rolled into 30/60/90-day bands.
//!
//! For every open lead:
//!   1. Estimate deal value (shared valuation formula)
//!   2. Compute win probability from stage, qualification, engagement,
//!      recency and stagnation, clamped to [0.05, 0.95]
//!   3. Estimate days to close from stage, engagement and lead age
//!
//! Periods are cumulative: a deal closing in 20 days counts toward all
//! three. Conservative and optimistic probabilities are clamped per lead
//! before summing, never on the aggregate.

use crate::{
    clock::{whole_days_since, within_days},
    config::{ForecastConfig, ValuationConfig},
    lead::{ActivityLog, Lead, LeadStatus, QualificationLevel},
    snapshot::{ActivityIndex, PipelineSnapshot},
    types::{LeadId, Timestamp},
    valuation::{estimate_deal_value, ValueSource},
};
use serde::{Deserialize, Serialize};

pub const MIN_PROBABILITY: f64 = 0.05;
pub const MAX_PROBABILITY: f64 = 0.95;

const SURE_DEAL_PROBABILITY: f64 = 0.70;
const RISK_DEAL_PROBABILITY: f64 = 0.40;

// ── Public types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DealForecast {
    pub lead_id:          LeadId,
    pub lead_name:        String,
    pub company:          String,
    pub status:           LeadStatus,
    pub estimated_value:  f64,
    pub value_source:     ValueSource,
    pub win_probability:  f64,
    pub expected_revenue: f64,
    pub days_to_close:    i64,
    pub reasoning:        Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastPeriod {
    pub days:                 i64,
    pub label:                String,
    pub expected_revenue:     f64,
    pub conservative_revenue: f64,
    pub optimistic_revenue:   f64,
    pub deal_count:           usize,
    /// Contributing deals, highest expected revenue first.
    pub deals:                Vec<DealForecast>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastInsights {
    /// Optimistic minus expected over the longest period.
    pub growth_potential: f64,
    /// Expected minus conservative over the longest period.
    pub downside_risk:    f64,
    /// Deals in the longest period with probability above 0.70.
    pub sure_deals:       Vec<LeadId>,
    /// Deals in the longest period with probability below 0.40.
    pub risk_deals:       Vec<LeadId>,
}

// ── Forecaster ───────────────────────────────────────────────────────────────

pub struct RevenueForecaster {
    config:    ForecastConfig,
    valuation: ValuationConfig,
}

impl RevenueForecaster {
    pub fn new(config: ForecastConfig, valuation: ValuationConfig) -> Self {
        Self { config, valuation }
    }

    pub fn name(&self) -> &'static str { "forecast" }

    pub fn analyze(&self, snapshot: &PipelineSnapshot) -> [ForecastPeriod; 3] {
        self.forecast(&snapshot.leads, &snapshot.index(), snapshot.now)
    }

    pub fn forecast(
        &self,
        leads: &[Lead],
        index: &ActivityIndex<'_>,
        now: Timestamp,
    ) -> [ForecastPeriod; 3] {
        let deals: Vec<DealForecast> = leads
            .iter()
            .filter_map(|lead| self.project_deal(lead, index.for_lead(&lead.id), now))
            .collect();

        let periods = self.config.horizons_days.map(|days| self.aggregate(days, &deals));

        log::debug!(
            "forecast: {} open deals, {}-day expected {:.0}",
            deals.len(),
            periods[2].days,
            periods[2].expected_revenue,
        );
        periods
    }

    /// Projection for one lead, or `None` when the lead is closed or its
    /// status is unrecognised.
    pub fn project_deal(
        &self,
        lead: &Lead,
        activities: &[&ActivityLog],
        now: Timestamp,
    ) -> Option<DealForecast> {
        let status = lead.status.filter(|s| !s.is_terminal())?;
        let mut reasoning = Vec::new();

        let value = estimate_deal_value(lead, &self.valuation);
        reasoning.push(match value.source {
            ValueSource::CompanyRevenue => format!(
                "Deal value ${:.0} from company revenue {}",
                value.amount,
                lead.company_revenue.as_deref().unwrap_or_default(),
            ),
            ValueSource::QualificationTier => format!(
                "Deal value ${:.0} from {} qualification tier",
                value.amount,
                lead.qualification_level.map_or("unqualified", |q| q.as_str()),
            ),
        });

        let age = whole_days_since(lead.created_at, now);
        let activity_count = activities.len();
        let has_recent = activities.iter().any(|a| within_days(a.created_at, now, 7.0));

        let base = stage_base_rate(status);
        let multiplier = qualification_multiplier(lead.qualification_level);
        let engagement = engagement_boost(activity_count);
        let recency = if has_recent { 0.10 } else { 0.0 };
        let stagnation = stagnation_penalty(age);

        let raw = base * multiplier + engagement + recency + stagnation;
        let probability = raw.clamp(MIN_PROBABILITY, MAX_PROBABILITY);

        reasoning.push(format!(
            "Stage {} base rate {:.0}% x {:.1} qualification multiplier",
            status.as_str(),
            base * 100.0,
            multiplier,
        ));
        if engagement > 0.0 {
            reasoning.push(format!("{activity_count} activities (+{:.0}%)", engagement * 100.0));
        }
        if has_recent {
            reasoning.push("Activity in the last 7 days (+10%)".into());
        }
        if stagnation < 0.0 {
            reasoning.push(format!("Lead is {age} days old ({:.0}%)", stagnation * 100.0));
        }
        reasoning.push(format!("Win probability {:.0}%", probability * 100.0));

        let days_to_close = estimate_days_to_close(status, activity_count, age);
        reasoning.push(format!("Expected to close in about {days_to_close} days"));

        Some(DealForecast {
            lead_id: lead.id.clone(),
            lead_name: lead.name.clone(),
            company: lead.company.clone(),
            status,
            estimated_value: value.amount,
            value_source: value.source,
            win_probability: probability,
            expected_revenue: value.amount * probability,
            days_to_close,
            reasoning,
        })
    }

    fn aggregate(&self, days: i64, deals: &[DealForecast]) -> ForecastPeriod {
        let mut included: Vec<DealForecast> = deals
            .iter()
            .filter(|d| d.days_to_close <= days)
            .cloned()
            .collect();

        // Stable: equal expected revenue keeps input order.
        included.sort_by(|a, b| b.expected_revenue.total_cmp(&a.expected_revenue));

        let mut expected = 0.0;
        let mut conservative = 0.0;
        let mut optimistic = 0.0;
        for deal in &included {
            expected += deal.expected_revenue;
            conservative += deal.estimated_value
                * (deal.win_probability * self.config.conservative_factor).max(MIN_PROBABILITY);
            optimistic += deal.estimated_value
                * (deal.win_probability * self.config.optimistic_factor).min(MAX_PROBABILITY);
        }

        ForecastPeriod {
            days,
            label: format!("{days} days"),
            expected_revenue: expected,
            conservative_revenue: conservative,
            optimistic_revenue: optimistic,
            deal_count: included.len(),
            deals: included,
        }
    }
}

pub fn stage_base_rate(status: LeadStatus) -> f64 {
    match status {
        LeadStatus::New       => 0.15,
        LeadStatus::Contacted => 0.35,
        LeadStatus::Qualified => 0.60,
        LeadStatus::Proposal  => 0.75,
        LeadStatus::Won       => 1.0,
        LeadStatus::Lost      => 0.0,
    }
}

/// Unrecognised qualification is neutral.
pub fn qualification_multiplier(level: Option<QualificationLevel>) -> f64 {
    match level {
        Some(QualificationLevel::Hot)  => 1.4,
        Some(QualificationLevel::Warm) | None => 1.0,
        Some(QualificationLevel::Cold) => 0.7,
    }
}

fn engagement_boost(activity_count: usize) -> f64 {
    match activity_count {
        0 => 0.0,
        1 | 2 => 0.05,
        3 | 4 => 0.10,
        _ => 0.15,
    }
}

fn stagnation_penalty(age_days: i64) -> f64 {
    if age_days > 60 {
        -0.15
    } else if age_days >= 30 {
        -0.10
    } else {
        0.0
    }
}

pub fn estimate_days_to_close(status: LeadStatus, activity_count: usize, age_days: i64) -> i64 {
    let base: f64 = match status {
        LeadStatus::New       => 45.0,
        LeadStatus::Contacted => 35.0,
        LeadStatus::Qualified => 25.0,
        LeadStatus::Proposal  => 15.0,
        LeadStatus::Won | LeadStatus::Lost => 0.0,
    };
    let engagement = if activity_count >= 5 {
        0.8
    } else if activity_count >= 3 {
        0.9
    } else {
        1.0
    };
    let age = if age_days > 60 {
        1.3
    } else if age_days < 14 {
        1.1
    } else {
        1.0
    };
    (base * engagement * age).round() as i64
}

/// Derived figures over the longest period.
pub fn forecast_insights(periods: &[ForecastPeriod; 3]) -> ForecastInsights {
    let longest = &periods[2];
    ForecastInsights {
        growth_potential: longest.optimistic_revenue - longest.expected_revenue,
        downside_risk:    longest.expected_revenue - longest.conservative_revenue,
        sure_deals:       longest
            .deals
            .iter()
            .filter(|d| d.win_probability > SURE_DEAL_PROBABILITY)
            .map(|d| d.lead_id.clone())
            .collect(),
        risk_deals:       longest
            .deals
            .iter()
            .filter(|d| d.win_probability < RISK_DEAL_PROBABILITY)
            .map(|d| d.lead_id.clone())
            .collect(),
    }
}

/// Forecast `leads` against `activities` at `now` with default settings.
pub fn forecast_revenue(
    leads: &[Lead],
    activities: &[ActivityLog],
    now: Timestamp,
) -> [ForecastPeriod; 3] {
    let index = ActivityIndex::build(leads, activities);
    RevenueForecaster::new(ForecastConfig::default(), ValuationConfig::default())
        .forecast(leads, &index, now)
}
