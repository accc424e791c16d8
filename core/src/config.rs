use serde::{Deserialize, Serialize};

// ── Momentum ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MomentumConfig {
    /// Days without activity before an engaged lead is considered stale.
    pub stale_window_days:   i64,
    /// Days a brand-new, untouched lead has before it is stale.
    pub new_lead_grace_days: i64,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            stale_window_days:   14,
            new_lead_grace_days: 7,
        }
    }
}

// ── Patterns ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PatternConfig {
    /// Below this population no findings are produced at all.
    pub min_population: usize,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self { min_population: 5 }
    }
}

// ── Valuation ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ValuationConfig {
    /// Share of stated company revenue used as a deal-size proxy.
    pub revenue_proxy_factor: f64,
    pub hot_tier:             f64,
    pub warm_tier:            f64,
    pub cold_tier:            f64,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            revenue_proxy_factor: 0.01,
            hot_tier:             50_000.0,
            warm_tier:            30_000.0,
            cold_tier:            10_000.0,
        }
    }
}

// ── Forecast ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ForecastConfig {
    pub conservative_factor: f64,
    pub optimistic_factor:   f64,
    /// Cumulative projection windows, shortest first.
    pub horizons_days:       [i64; 3],
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            conservative_factor: 0.7,
            optimistic_factor:   1.3,
            horizons_days:       [30, 60, 90],
        }
    }
}

// ── Actions ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ActionConfig {
    pub queue_limit:          usize,
    pub high_value_threshold: f64,
    pub dormant_days:         f64,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            queue_limit:          10,
            high_value_threshold: 40_000.0,
            dormant_days:         7.0,
        }
    }
}

// ── Root ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IntelConfig {
    pub momentum:  MomentumConfig,
    pub patterns:  PatternConfig,
    pub valuation: ValuationConfig,
    pub forecast:  ForecastConfig,
    pub actions:   ActionConfig,
}

impl IntelConfig {
    /// Load from a JSON file. Missing sections and fields keep their defaults.
    /// In tests, use IntelConfig::default().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: IntelConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        log::debug!("config: loaded {path}");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: IntelConfig =
            serde_json::from_str(r#"{"actions":{"queue_limit":5}}"#).unwrap();
        assert_eq!(config.actions.queue_limit, 5);
        assert_eq!(config.actions.high_value_threshold, 40_000.0);
        assert_eq!(config.forecast.horizons_days, [30, 60, 90]);
        assert_eq!(config.valuation.revenue_proxy_factor, 0.01);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = IntelConfig::load("/nonexistent/intel.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/intel.json"));
    }
}
