//! Action prioritization: a ranked queue of recommended next steps.
//!
//! RULES (evaluated per lead, in this order, every pass):
//!   1. Critical: overdue follow-up
//!   2. High    : hot lead with an engagement spike
//!   3. High    : hot lead never called or emailed
//!   4. Medium  : contacted hot lead gone quiet
//!   5. Medium  : high-value lead gone dormant
//!
//! Rule 5 only fires for a lead when rules 1–4 produced nothing for it in
//! the same pass, so the order above is behaviour and must not change.
//!
//! The dismissed set is owned by the caller. The prioritizer reads it and
//! never stores it.

use crate::{
    clock::{age_days, whole_days_since, within_days},
    command::RecordStoreCommand,
    config::{ActionConfig, ValuationConfig},
    lead::{ActivityLog, ActivityType, Lead, LeadStatus},
    snapshot::{ActivityIndex, PipelineSnapshot},
    types::{LeadId, Timestamp},
    valuation::estimate_deal_value,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const SPIKE_WINDOW_DAYS: f64 = 2.0;
const STALLED_MIN_AGE_DAYS: i64 = 5;
const STALLED_QUIET_DAYS: f64 = 3.0;

// ── Public types ─────────────────────────────────────────────────────────────

/// Declaration order is ranking order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActionPriority {
    Critical,
    High,
    Medium,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    OverdueFollowUp,
    EngagementSpike,
    FirstContact,
    StalledHotLead,
    DormantHighValue,
}

impl ActionKind {
    pub fn priority(&self) -> ActionPriority {
        match self {
            Self::OverdueFollowUp => ActionPriority::Critical,
            Self::EngagementSpike | Self::FirstContact => ActionPriority::High,
            Self::StalledHotLead | Self::DormantHighValue => ActionPriority::Medium,
        }
    }

    /// Prefix of the action id; with the lead id it makes the id stable
    /// across recomputations so dismissals survive a refresh.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::OverdueFollowUp  => "overdue-follow-up",
            Self::EngagementSpike  => "engagement-spike",
            Self::FirstContact     => "first-contact",
            Self::StalledHotLead   => "stalled-hot",
            Self::DormantHighValue => "dormant-high-value",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SmartAction {
    pub id:              String,
    pub lead_id:         LeadId,
    pub lead_name:       String,
    pub company:         String,
    pub kind:            ActionKind,
    pub priority:        ActionPriority,
    pub title:           String,
    pub urgency:         String,
    pub estimated_value: f64,
    pub reasoning:       Vec<String>,
    /// Quick actions the presentation layer may offer for this item.
    pub quick_actions:   Vec<RecordStoreCommand>,
}

/// Action ids the user has dismissed or acted on.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DismissedActions {
    ids: BTreeSet<String>,
}

impl DismissedActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the id was already dismissed.
    pub fn dismiss(&mut self, action_id: impl Into<String>) -> bool {
        self.ids.insert(action_id.into())
    }

    pub fn with(mut self, action_id: impl Into<String>) -> Self {
        self.dismiss(action_id);
        self
    }

    pub fn restore(&mut self, action_id: &str) -> bool {
        self.ids.remove(action_id)
    }

    pub fn contains(&self, action_id: &str) -> bool {
        self.ids.contains(action_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for DismissedActions {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self { ids: iter.into_iter().map(Into::into).collect() }
    }
}

// ── Prioritizer ──────────────────────────────────────────────────────────────

pub struct ActionPrioritizer {
    config:    ActionConfig,
    valuation: ValuationConfig,
}

impl ActionPrioritizer {
    pub fn new(config: ActionConfig, valuation: ValuationConfig) -> Self {
        Self { config, valuation }
    }

    pub fn name(&self) -> &'static str { "actions" }

    pub fn analyze(&self, snapshot: &PipelineSnapshot, dismissed: &DismissedActions) -> Vec<SmartAction> {
        self.prioritize(&snapshot.leads, &snapshot.index(), snapshot.now, dismissed)
    }

    /// Ranked, filtered, truncated queue.
    pub fn prioritize(
        &self,
        leads: &[Lead],
        index: &ActivityIndex<'_>,
        now: Timestamp,
        dismissed: &DismissedActions,
    ) -> Vec<SmartAction> {
        let mut queue = self.candidates(leads, index, now);
        let generated = queue.len();

        // Stable: equal priority and value keep rule/lead order.
        queue.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then(b.estimated_value.total_cmp(&a.estimated_value))
        });
        queue.retain(|action| !dismissed.contains(&action.id));
        queue.truncate(self.config.queue_limit);

        log::debug!(
            "actions: {generated} candidates, {} dismissed, {} queued",
            dismissed.len(),
            queue.len(),
        );
        queue
    }

    /// Every action the rules produce, unranked, in lead order then rule order.
    pub fn candidates(&self, leads: &[Lead], index: &ActivityIndex<'_>, now: Timestamp) -> Vec<SmartAction> {
        let mut out = Vec::new();
        for lead in leads {
            self.evaluate_lead(lead, index.for_lead(&lead.id), now, &mut out);
        }
        out
    }

    fn evaluate_lead(
        &self,
        lead: &Lead,
        activities: &[&ActivityLog],
        now: Timestamp,
        out: &mut Vec<SmartAction>,
    ) {
        let value = estimate_deal_value(lead, &self.valuation).amount;
        let before = out.len();

        // 1. Overdue follow-up
        let most_overdue = activities
            .iter()
            .filter_map(|a| a.overdue_follow_up(now).map(|due| (due, *a)))
            .min_by_key(|(due, _)| *due);
        if let Some((due, activity)) = most_overdue {
            let overdue_days = whole_days_since(due, now);
            let pending = activities.iter().filter(|a| a.overdue_follow_up(now).is_some()).count();
            let mut reasoning = vec![
                format!(
                    "Follow-up from {} on {} was due {}",
                    activity.activity_type,
                    activity.created_at.format("%Y-%m-%d"),
                    due.format("%Y-%m-%d"),
                ),
            ];
            if pending > 1 {
                reasoning.push(format!("{pending} follow-ups are overdue for this lead"));
            }
            out.push(self.action(
                lead,
                ActionKind::OverdueFollowUp,
                format!("Overdue follow-up with {}", lead.display_name()),
                if overdue_days == 0 {
                    "Follow-up due earlier today".into()
                } else {
                    format!("Follow-up {} overdue", days_phrase(overdue_days))
                },
                value,
                reasoning,
                vec![record(lead, ActivityType::Call), follow_up(lead, 1)],
            ));
        }

        // 2. Hot engagement spike
        let last_48h = activities
            .iter()
            .filter(|a| within_days(a.created_at, now, SPIKE_WINDOW_DAYS))
            .count();
        if lead.is_hot() && last_48h >= 2 {
            out.push(self.action(
                lead,
                ActionKind::EngagementSpike,
                format!("Engagement spike from {}", lead.display_name()),
                format!("{last_48h} activities in the last 48 hours"),
                value,
                vec![
                    "Qualified hot".into(),
                    format!("{last_48h} activities logged in the last 48 hours"),
                ],
                vec![record(lead, ActivityType::Call), follow_up(lead, 1)],
            ));
        }

        // 3. Hot, never contacted
        if lead.is_hot() && !activities.iter().any(|a| a.activity_type.is_outreach()) {
            out.push(self.action(
                lead,
                ActionKind::FirstContact,
                format!("Make first contact with {}", lead.display_name()),
                format!(
                    "Hot lead created {} ago with no call or email",
                    days_phrase(whole_days_since(lead.created_at, now)),
                ),
                value,
                vec![
                    "Qualified hot".into(),
                    "No call or email activity recorded".into(),
                ],
                vec![record(lead, ActivityType::Call), record(lead, ActivityType::Email)],
            ));
        }

        // 4. Stalled hot lead
        let lead_age = whole_days_since(lead.created_at, now);
        let quiet = !activities
            .iter()
            .any(|a| within_days(a.created_at, now, STALLED_QUIET_DAYS));
        if lead.status == Some(LeadStatus::Contacted)
            && lead.is_hot()
            && lead_age > STALLED_MIN_AGE_DAYS
            && quiet
        {
            out.push(self.action(
                lead,
                ActionKind::StalledHotLead,
                format!("Re-engage {}", lead.display_name()),
                "Contacted hot lead with no activity in 3 days".into(),
                value,
                vec![
                    "Status contacted, qualified hot".into(),
                    format!("Lead is {} old", days_phrase(lead_age)),
                    "No activity in the last 3 days".into(),
                ],
                vec![record(lead, ActivityType::Call), follow_up(lead, 2)],
            ));
        }

        // 5. High-value dormant, only when nothing above fired for this lead
        if out.len() == before
            && value > self.config.high_value_threshold
            && lead.is_open()
            && !activities
                .iter()
                .any(|a| age_days(a.created_at, now) < self.config.dormant_days)
        {
            let dormancy = match activities.last() {
                Some(last) => format!(
                    "No activity in {}",
                    days_phrase(whole_days_since(last.created_at, now)),
                ),
                None => "No activity recorded yet".into(),
            };
            out.push(self.action(
                lead,
                ActionKind::DormantHighValue,
                format!("High-value lead going dormant: {}", lead.display_name()),
                dormancy.clone(),
                value,
                vec![format!("Estimated deal value ${value:.0}"), dormancy],
                vec![record(lead, ActivityType::Email), follow_up(lead, 3)],
            ));
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn action(
        &self,
        lead: &Lead,
        kind: ActionKind,
        title: String,
        urgency: String,
        estimated_value: f64,
        reasoning: Vec<String>,
        quick_actions: Vec<RecordStoreCommand>,
    ) -> SmartAction {
        SmartAction {
            id: format!("{}-{}", kind.id_prefix(), lead.id),
            lead_id: lead.id.clone(),
            lead_name: lead.name.clone(),
            company: lead.company.clone(),
            kind,
            priority: kind.priority(),
            title,
            urgency,
            estimated_value,
            reasoning,
            quick_actions,
        }
    }
}

fn record(lead: &Lead, activity_type: ActivityType) -> RecordStoreCommand {
    RecordStoreCommand::RecordActivity {
        lead_id: lead.id.clone(),
        activity_type,
    }
}

fn follow_up(lead: &Lead, days_from_now: u32) -> RecordStoreCommand {
    RecordStoreCommand::ScheduleFollowUp {
        lead_id: lead.id.clone(),
        days_from_now,
    }
}

fn days_phrase(days: i64) -> String {
    if days == 1 {
        "1 day".into()
    } else {
        format!("{days} days")
    }
}

/// Rank the action queue for `leads` at `now` with default settings.
pub fn prioritize_actions(
    leads: &[Lead],
    activities: &[ActivityLog],
    now: Timestamp,
    dismissed: &DismissedActions,
) -> Vec<SmartAction> {
    let index = ActivityIndex::build(leads, activities);
    ActionPrioritizer::new(ActionConfig::default(), ValuationConfig::default())
        .prioritize(leads, &index, now, dismissed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_order_is_critical_high_medium() {
        assert!(ActionPriority::Critical < ActionPriority::High);
        assert!(ActionPriority::High < ActionPriority::Medium);
    }

    #[test]
    fn dismissed_set_is_plain_caller_state() {
        let mut dismissed: DismissedActions = ["first-contact-l1"].into_iter().collect();
        assert!(dismissed.contains("first-contact-l1"));
        assert!(!dismissed.dismiss("first-contact-l1"));
        assert!(dismissed.dismiss("stalled-hot-l2"));
        assert_eq!(dismissed.len(), 2);
        assert!(dismissed.restore("stalled-hot-l2"));
        assert!(!dismissed.contains("stalled-hot-l2"));
    }

    #[test]
    fn days_phrase_pluralises() {
        assert_eq!(days_phrase(1), "1 day");
        assert_eq!(days_phrase(3), "3 days");
    }
}
