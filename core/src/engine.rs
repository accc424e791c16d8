//! The intelligence engine: runs all four analyzers over one snapshot.
//!
//! EXECUTION ORDER (fixed, documented):
//!   1. Momentum
//!   2. Patterns
//!   3. Forecast
//!   4. Actions
//!
//! RULES:
//!   - Every analyzer reads the same snapshot and nothing else.
//!   - No analyzer consumes another analyzer's output.
//!   - The engine holds configuration only; no state survives a run.
//!   - The dismissed-action set belongs to the caller.

use crate::{
    actions::{ActionPrioritizer, DismissedActions, SmartAction},
    config::IntelConfig,
    forecast::{forecast_insights, ForecastInsights, ForecastPeriod, RevenueForecaster},
    momentum::{LeadMomentum, MomentumTracker},
    patterns::{Pattern, PatternMiner},
    snapshot::PipelineSnapshot,
    types::Timestamp,
};
use serde::{Deserialize, Serialize};

/// Everything one pass produces.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntelReport {
    pub generated_at: Timestamp,
    pub momentum:     Vec<LeadMomentum>,
    pub patterns:     Vec<Pattern>,
    pub forecast:     [ForecastPeriod; 3],
    pub insights:     ForecastInsights,
    pub actions:      Vec<SmartAction>,
}

pub struct IntelEngine {
    momentum: MomentumTracker,
    patterns: PatternMiner,
    forecast: RevenueForecaster,
    actions:  ActionPrioritizer,
}

impl IntelEngine {
    pub fn new(config: IntelConfig) -> Self {
        Self {
            momentum: MomentumTracker::new(config.momentum),
            patterns: PatternMiner::new(config.patterns),
            forecast: RevenueForecaster::new(config.forecast, config.valuation.clone()),
            actions:  ActionPrioritizer::new(config.actions, config.valuation),
        }
    }

    /// Run every analyzer against `snapshot`.
    pub fn run(&self, snapshot: &PipelineSnapshot, dismissed: &DismissedActions) -> IntelReport {
        let index = snapshot.index();
        let leads = &snapshot.leads;
        let now = snapshot.now;

        let momentum = self.momentum.compute(leads, &index, now);
        let patterns = self.patterns.detect(leads, &index, now);
        let forecast = self.forecast.forecast(leads, &index, now);
        let insights = forecast_insights(&forecast);
        let actions = self.actions.prioritize(leads, &index, now, dismissed);

        log::info!(
            "engine: {} leads -> {} {}, {} {}, {} {} at {now}",
            leads.len(),
            momentum.len(),
            self.momentum.name(),
            patterns.len(),
            self.patterns.name(),
            actions.len(),
            self.actions.name(),
        );
        log::debug!(
            "engine: {} 90-day expected {:.0}",
            self.forecast.name(),
            forecast[2].expected_revenue,
        );

        IntelReport {
            generated_at: now,
            momentum,
            patterns,
            forecast,
            insights,
            actions,
        }
    }
}

impl Default for IntelEngine {
    fn default() -> Self {
        Self::new(IntelConfig::default())
    }
}
