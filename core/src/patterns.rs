//! Pattern mining: population-level correlations with win outcome.
//!
//! This miner:
//!   1. Gates on population size (small samples produce nothing)
//!   2. Runs seven independent detectors, each carving out a subgroup
//!   3. Compares subgroup win rate against the overall win rate
//!   4. Emits winning, insight and risk findings with bounded confidence
//!
//! Detectors never read each other's results. Output order is
//! winning → insight → risk, then confidence descending.

use crate::{
    clock::{age_days, days_between, within_hours_after},
    config::PatternConfig,
    lead::{ActivityLog, Lead, LeadStatus},
    snapshot::{ActivityIndex, PipelineSnapshot},
    types::{LeadId, Timestamp},
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

const MIN_SUBGROUP: usize = 5;
const MAX_EXAMPLES: usize = 3;

// ── Public types ─────────────────────────────────────────────────────────────

/// Declaration order is ranking order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Winning,
    Insight,
    Risk,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatternExample {
    pub lead_id: LeadId,
    pub name:    String,
    pub company: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pattern {
    pub id:                String,
    pub kind:              PatternKind,
    pub title:             String,
    pub description:       String,
    pub impact:            String,
    pub recommendation:    String,
    /// Percent, bounded by the detector's ceiling.
    pub confidence:        u32,
    pub subgroup_size:     usize,
    pub subgroup_win_rate: f64,
    pub overall_win_rate:  f64,
    /// Open leads the finding applies to: outside the subgroup for behavioural
    /// wins, inside the segment for size-band and industry findings.
    pub affected_leads:    usize,
    pub examples:          Vec<PatternExample>,
}

/// `min(ceiling, base + per_lead × n)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfidenceRule {
    pub base:     u32,
    pub per_lead: u32,
    pub ceiling:  u32,
}

impl ConfidenceRule {
    pub const fn new(base: u32, per_lead: u32, ceiling: u32) -> Self {
        Self { base, per_lead, ceiling }
    }

    pub fn score(&self, subgroup_size: usize) -> u32 {
        let grown = (self.per_lead as u64)
            .saturating_mul(subgroup_size as u64)
            .saturating_add(self.base as u64);
        grown.min(self.ceiling as u64) as u32
    }
}

pub const EARLY_ENGAGEMENT_CONFIDENCE: ConfidenceRule = ConfidenceRule::new(50, 2, 90);
pub const HOT_STALLING_CONFIDENCE: ConfidenceRule     = ConfidenceRule::new(60, 5, 85);
pub const SWEET_SPOT_CONFIDENCE: ConfidenceRule       = ConfidenceRule::new(45, 2, 85);
pub const MULTI_CHANNEL_CONFIDENCE: ConfidenceRule    = ConfidenceRule::new(50, 2, 88);
pub const SPEED_TO_CONTACT_CONFIDENCE: ConfidenceRule = ConfidenceRule::new(55, 2, 90);
pub const TOP_INDUSTRY_CONFIDENCE: ConfidenceRule     = ConfidenceRule::new(50, 3, 85);
pub const WEAK_INDUSTRY_CONFIDENCE: ConfidenceRule    = ConfidenceRule::new(50, 3, 80);
pub const QUALIFICATION_CONFIDENCE: ConfidenceRule    = ConfidenceRule::new(60, 2, 95);

/// Company-size bands used by the sweet-spot detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeBand {
    Small,
    Mid,
    Large,
    Enterprise,
}

impl EmployeeBand {
    pub const ALL: [EmployeeBand; 4] = [Self::Small, Self::Mid, Self::Large, Self::Enterprise];

    pub fn for_count(employees: i64) -> Option<Self> {
        match employees {
            n if n < 0    => None,
            n if n < 50   => Some(Self::Small),
            n if n < 200  => Some(Self::Mid),
            n if n < 1000 => Some(Self::Large),
            _             => Some(Self::Enterprise),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Small      => "under 50 employees",
            Self::Mid        => "50-199 employees",
            Self::Large      => "200-999 employees",
            Self::Enterprise => "1000+ employees",
        }
    }
}

// ── Miner ────────────────────────────────────────────────────────────────────

/// The population every detector works over.
struct Population<'a> {
    leads:        &'a [Lead],
    index:        &'a ActivityIndex<'a>,
    now:          Timestamp,
    overall_rate: f64,
}

impl<'a> Population<'a> {
    fn activities(&self, lead: &Lead) -> &[&'a ActivityLog] {
        self.index.for_lead(&lead.id)
    }

    fn open_count(&self, filter: impl Fn(&Lead) -> bool) -> usize {
        self.leads.iter().filter(|&l| l.is_open() && filter(l)).count()
    }
}

pub struct PatternMiner {
    config: PatternConfig,
}

impl PatternMiner {
    pub fn new(config: PatternConfig) -> Self {
        Self { config }
    }

    pub fn name(&self) -> &'static str { "patterns" }

    pub fn analyze(&self, snapshot: &PipelineSnapshot) -> Vec<Pattern> {
        self.detect(&snapshot.leads, &snapshot.index(), snapshot.now)
    }

    pub fn detect(&self, leads: &[Lead], index: &ActivityIndex<'_>, now: Timestamp) -> Vec<Pattern> {
        if leads.len() < self.config.min_population {
            log::debug!(
                "patterns: population {} below minimum {}, skipping",
                leads.len(),
                self.config.min_population,
            );
            return Vec::new();
        }

        let all: Vec<&Lead> = leads.iter().collect();
        let pop = Population {
            leads,
            index,
            now,
            overall_rate: win_rate(&all),
        };

        let mut found: Vec<Pattern> = Vec::new();
        found.extend(early_engagement(&pop));
        found.extend(hot_lead_stalling(&pop));
        found.extend(firmographic_sweet_spot(&pop));
        found.extend(multi_channel(&pop));
        found.extend(speed_to_contact(&pop));
        found.extend(industry_performance(&pop));
        found.extend(qualification_accuracy(&pop));

        found.sort_by(|a, b| a.kind.cmp(&b.kind).then(b.confidence.cmp(&a.confidence)));

        log::debug!(
            "patterns: {} findings over {} leads (overall win rate {:.2})",
            found.len(),
            leads.len(),
            pop.overall_rate,
        );
        found
    }
}

// ── Detectors ────────────────────────────────────────────────────────────────

/// 1. Three or more touches inside the first week.
fn early_engagement(pop: &Population<'_>) -> Option<Pattern> {
    let is_member = |lead: &Lead| {
        pop.activities(lead)
            .iter()
            .filter(|a| {
                let offset = days_between(lead.created_at, a.created_at);
                (0.0..=7.0).contains(&offset)
            })
            .count()
            >= 3
    };

    let subgroup: Vec<&Lead> = pop.leads.iter().filter(|&l| is_member(l)).collect();
    let rate = win_rate(&subgroup);
    if subgroup.len() < MIN_SUBGROUP || rate <= pop.overall_rate * 1.5 {
        return None;
    }

    Some(Pattern {
        id:                "early-engagement".into(),
        kind:              PatternKind::Winning,
        title:             "Early engagement drives wins".into(),
        description:       format!(
            "Leads with 3+ activities in their first 7 days win {} of the time vs {} overall",
            pct(rate),
            pct(pop.overall_rate),
        ),
        impact:            format!("{} across {} leads", lift_phrase(rate, pop.overall_rate), subgroup.len()),
        recommendation:    "Front-load outreach: schedule at least 3 touches in every new lead's first week".into(),
        confidence:        EARLY_ENGAGEMENT_CONFIDENCE.score(subgroup.len()),
        subgroup_size:     subgroup.len(),
        subgroup_win_rate: rate,
        overall_win_rate:  pop.overall_rate,
        affected_leads:    pop.open_count(|l| !is_member(l)),
        examples:          winners(&subgroup),
    })
}

/// 2. Hot, still open, and quiet for more than two weeks.
fn hot_lead_stalling(pop: &Population<'_>) -> Option<Pattern> {
    let at_risk: Vec<&Lead> = pop
        .leads
        .iter()
        .filter(|l| l.is_hot() && l.is_open())
        .filter(|l| match pop.activities(l).last() {
            None => true,
            Some(last) => age_days(last.created_at, pop.now) > 14.0,
        })
        .collect();

    if at_risk.len() < 2 {
        return None;
    }

    Some(Pattern {
        id:                "hot-lead-stalling".into(),
        kind:              PatternKind::Risk,
        title:             "Hot leads are stalling".into(),
        description:       format!(
            "{} hot leads have had no activity in over 14 days",
            at_risk.len(),
        ),
        impact:            "Hot leads that go quiet rarely convert; this is the most exposed part of the pipeline".into(),
        recommendation:    "Re-engage every stalled hot lead this week, starting with a call".into(),
        confidence:        HOT_STALLING_CONFIDENCE.score(at_risk.len()),
        subgroup_size:     at_risk.len(),
        subgroup_win_rate: win_rate(&at_risk),
        overall_win_rate:  pop.overall_rate,
        affected_leads:    at_risk.len(),
        examples:          examples(at_risk.iter().copied()),
    })
}

/// 3. Company-size band with the best win rate.
fn firmographic_sweet_spot(pop: &Population<'_>) -> Option<Pattern> {
    let in_band = |lead: &Lead, band: EmployeeBand| {
        lead.employee_count.and_then(EmployeeBand::for_count) == Some(band)
    };

    let mut best: Option<(EmployeeBand, Vec<&Lead>, f64)> = None;
    for band in EmployeeBand::ALL {
        let members: Vec<&Lead> = pop.leads.iter().filter(|&l| in_band(l, band)).collect();
        if members.len() < 3 {
            continue;
        }
        let rate = win_rate(&members);
        if best.as_ref().map_or(true, |(_, _, best_rate)| rate > *best_rate) {
            best = Some((band, members, rate));
        }
    }

    let (band, members, rate) = best?;
    if members.len() < MIN_SUBGROUP || rate <= pop.overall_rate * 1.3 {
        return None;
    }

    Some(Pattern {
        id:                "firmographic-sweet-spot".into(),
        kind:              PatternKind::Winning,
        title:             format!("Sweet spot: companies with {}", band.label()),
        description:       format!(
            "Companies with {} win {} of the time vs {} overall",
            band.label(),
            pct(rate),
            pct(pop.overall_rate),
        ),
        impact:            format!("{} across {} leads", lift_phrase(rate, pop.overall_rate), members.len()),
        recommendation:    format!("Prioritise prospecting and open leads at companies with {}", band.label()),
        confidence:        SWEET_SPOT_CONFIDENCE.score(members.len()),
        subgroup_size:     members.len(),
        subgroup_win_rate: rate,
        overall_win_rate:  pop.overall_rate,
        affected_leads:    pop.open_count(|l| in_band(l, band)),
        examples:          winners(&members),
    })
}

/// 4. Contacted through three or more distinct channels.
fn multi_channel(pop: &Population<'_>) -> Option<Pattern> {
    let is_member = |lead: &Lead| {
        let channels: HashSet<&str> = pop
            .activities(lead)
            .iter()
            .map(|a| a.activity_type.as_str())
            .collect();
        channels.len() >= 3
    };

    let subgroup: Vec<&Lead> = pop.leads.iter().filter(|&l| is_member(l)).collect();
    let rate = win_rate(&subgroup);
    if subgroup.len() < MIN_SUBGROUP || rate <= pop.overall_rate * 1.4 {
        return None;
    }

    Some(Pattern {
        id:                "multi-channel".into(),
        kind:              PatternKind::Winning,
        title:             "Multi-channel outreach converts".into(),
        description:       format!(
            "Leads reached through 3+ channels win {} of the time vs {} overall",
            pct(rate),
            pct(pop.overall_rate),
        ),
        impact:            format!("{} across {} leads", lift_phrase(rate, pop.overall_rate), subgroup.len()),
        recommendation:    "Mix calls, emails and meetings instead of repeating a single channel".into(),
        confidence:        MULTI_CHANNEL_CONFIDENCE.score(subgroup.len()),
        subgroup_size:     subgroup.len(),
        subgroup_win_rate: rate,
        overall_win_rate:  pop.overall_rate,
        affected_leads:    pop.open_count(|l| !is_member(l)),
        examples:          winners(&subgroup),
    })
}

/// 5. First call or email within 48 hours of the lead being created.
fn speed_to_contact(pop: &Population<'_>) -> Option<Pattern> {
    let is_member = |lead: &Lead| {
        pop.activities(lead)
            .iter()
            .find(|a| a.activity_type.is_outreach())
            .is_some_and(|first| within_hours_after(lead.created_at, first.created_at, 48))
    };

    let subgroup: Vec<&Lead> = pop.leads.iter().filter(|&l| is_member(l)).collect();
    let rate = win_rate(&subgroup);
    if subgroup.len() < MIN_SUBGROUP || rate <= pop.overall_rate * 1.3 {
        return None;
    }

    Some(Pattern {
        id:                "speed-to-contact".into(),
        kind:              PatternKind::Winning,
        title:             "Fast first contact wins deals".into(),
        description:       format!(
            "Leads first called or emailed within 48 hours win {} of the time vs {} overall",
            pct(rate),
            pct(pop.overall_rate),
        ),
        impact:            format!("{} across {} leads", lift_phrase(rate, pop.overall_rate), subgroup.len()),
        recommendation:    "Call or email every new lead within 48 hours of creation".into(),
        confidence:        SPEED_TO_CONTACT_CONFIDENCE.score(subgroup.len()),
        subgroup_size:     subgroup.len(),
        subgroup_win_rate: rate,
        overall_win_rate:  pop.overall_rate,
        affected_leads:    pop.open_count(|l| !is_member(l)),
        examples:          winners(&subgroup),
    })
}

/// 6. Best and worst industries. May emit zero, one or two findings.
fn industry_performance(pop: &Population<'_>) -> Vec<Pattern> {
    let groups = group_by_industry(pop.leads);
    let eligible: Vec<(&str, &Vec<&Lead>, f64)> = groups
        .iter()
        .filter(|(_, members)| members.len() >= MIN_SUBGROUP)
        .map(|(label, members)| (label.as_str(), members, win_rate(members)))
        .collect();

    let mut out = Vec::new();

    let best = eligible.iter().fold(None, |acc: Option<&(&str, &Vec<&Lead>, f64)>, g| match acc {
        Some(b) if g.2 <= b.2 => Some(b),
        _ => Some(g),
    });
    if let Some(&(label, members, rate)) = best {
        if rate > pop.overall_rate * 1.5 {
            out.push(Pattern {
                id:                "top-industry".into(),
                kind:              PatternKind::Winning,
                title:             format!("{label} is the strongest industry"),
                description:       format!(
                    "{label} leads win {} of the time vs {} overall",
                    pct(rate),
                    pct(pop.overall_rate),
                ),
                impact:            format!("{} across {} leads", lift_phrase(rate, pop.overall_rate), members.len()),
                recommendation:    format!("Double down on {label}: prioritise its open leads and source more like them"),
                confidence:        TOP_INDUSTRY_CONFIDENCE.score(members.len()),
                subgroup_size:     members.len(),
                subgroup_win_rate: rate,
                overall_win_rate:  pop.overall_rate,
                affected_leads:    members.iter().filter(|l| l.is_open()).count(),
                examples:          winners(members),
            });
        }
    }

    let worst = eligible.iter().fold(None, |acc: Option<&(&str, &Vec<&Lead>, f64)>, g| match acc {
        Some(w) if g.2 >= w.2 => Some(w),
        _ => Some(g),
    });
    if let Some(&(label, members, rate)) = worst {
        if rate < pop.overall_rate * 0.5 {
            let open: Vec<&Lead> = members.iter().copied().filter(|l| l.is_open()).collect();
            out.push(Pattern {
                id:                "weak-industry".into(),
                kind:              PatternKind::Risk,
                title:             format!("{label} is underperforming"),
                description:       format!(
                    "{label} leads win only {} of the time vs {} overall",
                    pct(rate),
                    pct(pop.overall_rate),
                ),
                impact:            format!("{} open {label} leads are unlikely to convert at current rates", open.len()),
                recommendation:    format!("Requalify {label} leads before investing more selling time"),
                confidence:        WEAK_INDUSTRY_CONFIDENCE.score(members.len()),
                subgroup_size:     members.len(),
                subgroup_win_rate: rate,
                overall_win_rate:  pop.overall_rate,
                affected_leads:    open.len(),
                examples:          examples(open.iter().copied()),
            });
        }
    }

    out
}

/// 7. Hot leads that do not win often enough to deserve the label.
fn qualification_accuracy(pop: &Population<'_>) -> Option<Pattern> {
    let hot: Vec<&Lead> = pop.leads.iter().filter(|l| l.is_hot()).collect();
    if hot.len() < 10 {
        return None;
    }
    let rate = win_rate(&hot);
    if rate >= 0.30 {
        return None;
    }

    let lost = hot.iter().copied().filter(|l| l.status == Some(LeadStatus::Lost));
    Some(Pattern {
        id:                "qualification-accuracy".into(),
        kind:              PatternKind::Insight,
        title:             "Hot qualification may be too loose".into(),
        description:       format!(
            "Only {} of {} hot leads have been won",
            pct(rate),
            hot.len(),
        ),
        impact:            "Selling time is spread across leads that are labelled hot but convert like warm ones".into(),
        recommendation:    "Tighten the criteria for marking a lead hot and review recent hot losses".into(),
        confidence:        QUALIFICATION_CONFIDENCE.score(hot.len()),
        subgroup_size:     hot.len(),
        subgroup_win_rate: rate,
        overall_win_rate:  pop.overall_rate,
        affected_leads:    pop.open_count(Lead::is_hot),
        examples:          examples(lost),
    })
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn win_rate(leads: &[&Lead]) -> f64 {
    if leads.is_empty() {
        return 0.0;
    }
    leads.iter().filter(|l| l.is_won()).count() as f64 / leads.len() as f64
}

/// Industry groups in order of first appearance. Matching ignores case and
/// surrounding whitespace; the first spelling seen is used as the label.
fn group_by_industry(leads: &[Lead]) -> Vec<(String, Vec<&Lead>)> {
    let mut groups: Vec<(String, Vec<&Lead>)> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();

    for lead in leads {
        let Some(raw) = lead.industry.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            continue;
        };
        let key = raw.to_lowercase();
        let slot = *slots.entry(key).or_insert_with(|| {
            groups.push((raw.to_string(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(lead);
    }
    groups
}

fn examples<'a>(leads: impl Iterator<Item = &'a Lead>) -> Vec<PatternExample> {
    leads
        .take(MAX_EXAMPLES)
        .map(|l| PatternExample {
            lead_id: l.id.clone(),
            name:    l.name.clone(),
            company: l.company.clone(),
        })
        .collect()
}

fn winners(subgroup: &[&Lead]) -> Vec<PatternExample> {
    examples(subgroup.iter().copied().filter(|l| l.is_won()))
}

fn pct(rate: f64) -> String {
    format!("{:.0}%", rate * 100.0)
}

fn lift_phrase(rate: f64, overall: f64) -> String {
    if overall > 0.0 {
        format!("{:.1}x the overall win rate", rate / overall)
    } else {
        format!("{} win rate where the pipeline overall has no wins", pct(rate))
    }
}

/// Run every detector over `leads` and `activities` at `now` with default settings.
pub fn detect_patterns(leads: &[Lead], activities: &[ActivityLog], now: Timestamp) -> Vec<Pattern> {
    let index = ActivityIndex::build(leads, activities);
    PatternMiner::new(PatternConfig::default()).detect(leads, &index, now)
}
