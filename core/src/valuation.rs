//! Deal-value estimation shared by the forecaster and the action queue.
//!
//! RULE: There is exactly one value formula. Both consumers call
//! `estimate_deal_value`; neither re-derives it.

use crate::{
    config::ValuationConfig,
    lead::{Lead, QualificationLevel},
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    /// Derived from the lead's stated company revenue.
    CompanyRevenue,
    /// Flat tier chosen by qualification level.
    QualificationTier,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DealValue {
    pub amount: f64,
    pub source: ValueSource,
}

fn revenue_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(\d+(?:\.\d+)?)([kmb])?$").expect("static revenue pattern"))
}

/// Parse free-text revenue such as `"$2.5M"`, `"750k"` or `"1,200,000"`
/// into a plain number. Returns `None` for anything else.
pub fn parse_company_revenue(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();

    let caps = revenue_pattern().captures(&cleaned)?;
    let number: f64 = caps.get(1)?.as_str().parse().ok()?;
    let scale = match caps.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
        Some(suffix) if suffix == "k" => 1e3,
        Some(suffix) if suffix == "m" => 1e6,
        Some(suffix) if suffix == "b" => 1e9,
        _ => 1.0,
    };
    Some(number * scale)
}

/// Flat fallback value for a qualification level. Unrecognised levels use the cold tier.
pub fn tier_value(level: Option<QualificationLevel>, config: &ValuationConfig) -> f64 {
    match level {
        Some(QualificationLevel::Hot)  => config.hot_tier,
        Some(QualificationLevel::Warm) => config.warm_tier,
        Some(QualificationLevel::Cold) | None => config.cold_tier,
    }
}

pub fn estimate_deal_value(lead: &Lead, config: &ValuationConfig) -> DealValue {
    match lead.company_revenue.as_deref().and_then(parse_company_revenue) {
        Some(revenue) => DealValue {
            amount: revenue * config.revenue_proxy_factor,
            source: ValueSource::CompanyRevenue,
        },
        None => DealValue {
            amount: tier_value(lead.qualification_level, config),
            source: ValueSource::QualificationTier,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn lead_with(revenue: Option<&str>, level: Option<QualificationLevel>) -> Lead {
        Lead {
            id:                  "l1".into(),
            name:                "Ada".into(),
            company:             "Acme".into(),
            status:              None,
            qualification_level: level,
            employee_count:      None,
            industry:            None,
            company_revenue:     revenue.map(str::to_string),
            created_at:          Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn parses_suffixes_case_insensitively() {
        assert_eq!(parse_company_revenue("$2.5M"), Some(2_500_000.0));
        assert_eq!(parse_company_revenue("750k"), Some(750_000.0));
        assert_eq!(parse_company_revenue("$1B"), Some(1_000_000_000.0));
        assert_eq!(parse_company_revenue("1,200,000"), Some(1_200_000.0));
        assert_eq!(parse_company_revenue(" $ 3 m "), Some(3_000_000.0));
    }

    #[test]
    fn rejects_free_text() {
        assert_eq!(parse_company_revenue("about ten million"), None);
        assert_eq!(parse_company_revenue("$2.5MM"), None);
        assert_eq!(parse_company_revenue(""), None);
    }

    #[test]
    fn revenue_scaled_by_proxy_factor() {
        let config = ValuationConfig::default();
        let value = estimate_deal_value(&lead_with(Some("$2.5M"), None), &config);
        assert!((value.amount - 25_000.0).abs() < 1e-6, "got {}", value.amount);
        assert_eq!(value.source, ValueSource::CompanyRevenue);
    }

    #[test]
    fn unparseable_revenue_falls_back_to_tier() {
        let config = ValuationConfig::default();
        let hot = estimate_deal_value(&lead_with(Some("n/a"), Some(QualificationLevel::Hot)), &config);
        assert_eq!(hot.amount, 50_000.0);
        assert_eq!(hot.source, ValueSource::QualificationTier);

        let warm = estimate_deal_value(&lead_with(None, Some(QualificationLevel::Warm)), &config);
        assert_eq!(warm.amount, 30_000.0);

        let unknown = estimate_deal_value(&lead_with(None, None), &config);
        assert_eq!(unknown.amount, 10_000.0);
    }
}
