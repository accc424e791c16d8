mod common;

use common::{activity_after_creation, lead, now};
use leadintel_core::{
    detect_patterns,
    lead::{ActivityLog, Lead, LeadStatus},
    patterns::{Pattern, PatternKind},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn find<'a>(patterns: &'a [Pattern], id: &str) -> Option<&'a Pattern> {
    patterns.iter().find(|p| p.id == id)
}

/// `count` leads with the given status, ids `prefix-0..`.
fn batch(prefix: &str, count: usize, status: LeadStatus) -> Vec<Lead> {
    (0..count)
        .map(|i| lead(&format!("{prefix}-{i}")).status(status).created_days_ago(60.0).build())
        .collect()
}

/// Three calls inside the first week, none inside the first 48 hours.
fn early_touches(lead: &Lead) -> Vec<ActivityLog> {
    [50, 70, 100]
        .into_iter()
        .map(|h| activity_after_creation(lead, "call", h))
        .collect()
}

fn hot_stalled(prefix: &str, count: usize) -> Vec<Lead> {
    (0..count)
        .map(|i| {
            lead(&format!("{prefix}-{i}"))
                .hot()
                .status(LeadStatus::Contacted)
                .created_days_ago(30.0)
                .build()
        })
        .collect()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn population_of_four_yields_nothing() {
    let leads = hot_stalled("h", 4);

    let patterns = detect_patterns(&leads, &[], now());

    assert!(patterns.is_empty(), "expected no patterns, got {patterns:?}");
}

#[test]
fn population_of_five_is_enough() {
    let mut leads = hot_stalled("h", 2);
    leads.extend(batch("x", 3, LeadStatus::Lost));

    let patterns = detect_patterns(&leads, &[], now());

    let stalling = find(&patterns, "hot-lead-stalling").expect("stalling pattern");
    assert_eq!(stalling.kind, PatternKind::Risk);
    assert_eq!(stalling.affected_leads, 2);
    assert_eq!(stalling.confidence, 70, "60 + 5 x 2");
}

#[test]
fn hot_stalling_confidence_is_capped() {
    let leads = hot_stalled("h", 40);

    let patterns = detect_patterns(&leads, &[], now());

    let stalling = find(&patterns, "hot-lead-stalling").expect("stalling pattern");
    assert_eq!(stalling.confidence, 85);
    assert_eq!(stalling.examples.len(), 3, "examples are capped at three");
}

#[test]
fn early_engagement_is_detected() {
    let mut engaged = batch("e", 4, LeadStatus::Won);
    engaged.extend(batch("e-open", 1, LeadStatus::Proposal));
    let mut others = batch("o-won", 2, LeadStatus::Won);
    others.extend(batch("o-lost", 5, LeadStatus::Lost));
    others.extend(batch("o-open", 8, LeadStatus::Contacted));

    let activities: Vec<ActivityLog> = engaged.iter().flat_map(early_touches).collect();
    let leads: Vec<Lead> = engaged.into_iter().chain(others).collect();

    let patterns = detect_patterns(&leads, &activities, now());

    let early = find(&patterns, "early-engagement").expect("early engagement pattern");
    assert_eq!(early.kind, PatternKind::Winning);
    assert_eq!(early.subgroup_size, 5);
    assert!((early.subgroup_win_rate - 0.8).abs() < 1e-9, "rate {}", early.subgroup_win_rate);
    assert!((early.overall_win_rate - 0.3).abs() < 1e-9, "overall {}", early.overall_win_rate);
    assert_eq!(early.confidence, 60, "50 + 2 x 5");
    assert_eq!(early.affected_leads, 8, "open leads outside the subgroup");
    assert_eq!(early.examples.len(), 3);
    assert!(early.description.contains("80%"), "description: {}", early.description);

    assert!(find(&patterns, "speed-to-contact").is_none(), "no touch landed inside 48 hours");
    assert!(find(&patterns, "multi-channel").is_none(), "every touch was a call");
}

#[test]
fn early_engagement_needs_a_clear_lift() {
    // Subgroup wins 2 of 5 against an overall 6 of 20: 0.40 <= 1.5 x 0.30.
    let mut engaged = batch("e", 2, LeadStatus::Won);
    engaged.extend(batch("e-lost", 3, LeadStatus::Lost));
    let mut others = batch("o-won", 4, LeadStatus::Won);
    others.extend(batch("o-lost", 11, LeadStatus::Lost));

    let activities: Vec<ActivityLog> = engaged.iter().flat_map(early_touches).collect();
    let leads: Vec<Lead> = engaged.into_iter().chain(others).collect();

    let patterns = detect_patterns(&leads, &activities, now());

    assert!(find(&patterns, "early-engagement").is_none(), "got {patterns:?}");
}

/// Call, meeting and note, all logged after the first week.
fn three_channels(lead: &Lead) -> Vec<ActivityLog> {
    [("call", 200), ("meeting", 300), ("note", 400)]
        .into_iter()
        .map(|(kind, h)| activity_after_creation(lead, kind, h))
        .collect()
}

#[test]
fn multi_channel_outreach_is_detected() {
    let reached = batch("m", 5, LeadStatus::Won);
    let mut others = batch("o-lost", 10, LeadStatus::Lost);
    others.extend(batch("o-open", 5, LeadStatus::Contacted));

    let activities: Vec<ActivityLog> = reached.iter().flat_map(three_channels).collect();
    let leads: Vec<Lead> = reached.into_iter().chain(others).collect();

    let patterns = detect_patterns(&leads, &activities, now());

    let multi = find(&patterns, "multi-channel").expect("multi-channel pattern");
    assert_eq!(multi.kind, PatternKind::Winning);
    assert_eq!(multi.subgroup_size, 5);
    assert!((multi.overall_win_rate - 0.25).abs() < 1e-9, "overall {}", multi.overall_win_rate);
    assert_eq!(multi.confidence, 60, "50 + 2 x 5");
    assert_eq!(multi.affected_leads, 5, "open leads reached through fewer channels");
    assert!(find(&patterns, "early-engagement").is_none(), "touches came after the first week");
    assert!(find(&patterns, "speed-to-contact").is_none(), "first call came after 48 hours");
}

#[test]
fn multi_channel_needs_a_clear_lift() {
    // Subgroup wins 2 of 5 against an overall 6 of 20: 0.40 <= 1.4 x 0.30.
    let mut reached = batch("m", 2, LeadStatus::Won);
    reached.extend(batch("m-lost", 3, LeadStatus::Lost));
    let mut others = batch("o-won", 4, LeadStatus::Won);
    others.extend(batch("o-lost", 11, LeadStatus::Lost));

    let activities: Vec<ActivityLog> = reached.iter().flat_map(three_channels).collect();
    let leads: Vec<Lead> = reached.into_iter().chain(others).collect();

    let patterns = detect_patterns(&leads, &activities, now());

    assert!(find(&patterns, "multi-channel").is_none(), "got {patterns:?}");
}

#[test]
fn fast_first_contact_is_detected() {
    let fast = batch("f", 5, LeadStatus::Won);
    let mut others = batch("o-lost", 10, LeadStatus::Lost);
    others.extend(batch("o-open", 5, LeadStatus::Contacted));

    let activities: Vec<ActivityLog> = fast
        .iter()
        .map(|l| activity_after_creation(l, "email", 47))
        .collect();
    let leads: Vec<Lead> = fast.into_iter().chain(others).collect();

    let patterns = detect_patterns(&leads, &activities, now());

    let speed = find(&patterns, "speed-to-contact").expect("speed-to-contact pattern");
    assert_eq!(speed.kind, PatternKind::Winning);
    assert_eq!(speed.subgroup_size, 5);
    assert!((speed.subgroup_win_rate - 1.0).abs() < 1e-9, "rate {}", speed.subgroup_win_rate);
    assert_eq!(speed.confidence, 65, "55 + 2 x 5");
    assert_eq!(speed.affected_leads, 5);
}

#[test]
fn notes_and_late_outreach_are_not_fast_contact() {
    let slow = batch("s", 5, LeadStatus::Won);
    let mut others = batch("o-lost", 10, LeadStatus::Lost);
    others.extend(batch("o-open", 5, LeadStatus::Contacted));

    // A note lands inside 48 hours, but the first email is at 49.
    let activities: Vec<ActivityLog> = slow
        .iter()
        .flat_map(|l| {
            [
                activity_after_creation(l, "note", 1),
                activity_after_creation(l, "email", 49),
            ]
        })
        .collect();
    let leads: Vec<Lead> = slow.into_iter().chain(others).collect();

    let patterns = detect_patterns(&leads, &activities, now());

    assert!(find(&patterns, "speed-to-contact").is_none(), "got {patterns:?}");
}

#[test]
fn company_size_sweet_spot() {
    let mut leads: Vec<Lead> = (0..5)
        .map(|i| {
            let status = if i < 4 { LeadStatus::Won } else { LeadStatus::Qualified };
            lead(&format!("mid-{i}")).status(status).employees(120).build()
        })
        .collect();
    leads.extend((0..15).map(|i| {
        let status = if i < 2 { LeadStatus::Won } else { LeadStatus::Lost };
        lead(&format!("small-{i}")).status(status).employees(20).build()
    }));

    let patterns = detect_patterns(&leads, &[], now());

    let spot = find(&patterns, "firmographic-sweet-spot").expect("sweet spot pattern");
    assert!(spot.title.contains("50-199"), "title: {}", spot.title);
    assert_eq!(spot.subgroup_size, 5);
    assert_eq!(spot.affected_leads, 1);
    assert_eq!(spot.confidence, 55, "45 + 2 x 5");
}

#[test]
fn small_best_band_is_not_reported() {
    // The 50-199 band wins every time but has only 4 leads.
    let mut leads: Vec<Lead> = (0..4)
        .map(|i| lead(&format!("mid-{i}")).status(LeadStatus::Won).employees(120).build())
        .collect();
    leads.extend((0..16).map(|i| {
        let status = if i < 2 { LeadStatus::Won } else { LeadStatus::Lost };
        lead(&format!("small-{i}")).status(status).employees(20).build()
    }));

    let patterns = detect_patterns(&leads, &[], now());

    assert!(find(&patterns, "firmographic-sweet-spot").is_none(), "got {patterns:?}");
}

#[test]
fn industries_group_case_insensitively() {
    let spellings = ["Software", "software", " SOFTWARE ", "Software", "software"];
    let mut leads: Vec<Lead> = spellings
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let status = if i < 4 { LeadStatus::Won } else { LeadStatus::Lost };
            lead(&format!("sw-{i}")).status(status).industry(name).build()
        })
        .collect();
    leads.extend((0..5).map(|i| {
        let status = if i < 3 { LeadStatus::Lost } else { LeadStatus::Contacted };
        lead(&format!("rt-{i}")).status(status).industry("Retail").build()
    }));
    leads.extend((0..10).map(|i| {
        let status = if i < 2 { LeadStatus::Won } else { LeadStatus::Lost };
        lead(&format!("none-{i}")).status(status).build()
    }));

    let patterns = detect_patterns(&leads, &[], now());

    let top = find(&patterns, "top-industry").expect("top industry pattern");
    assert_eq!(top.kind, PatternKind::Winning);
    assert_eq!(top.subgroup_size, 5, "all spellings form one group");
    assert!(top.title.starts_with("Software"), "label is first spelling seen: {}", top.title);

    let weak = find(&patterns, "weak-industry").expect("weak industry pattern");
    assert_eq!(weak.kind, PatternKind::Risk);
    assert_eq!(weak.affected_leads, 2, "open retail leads");
    assert_eq!(weak.confidence, 65, "50 + 3 x 5");
}

#[test]
fn loose_hot_qualification_is_an_insight() {
    let leads: Vec<Lead> = (0..10)
        .map(|i| {
            let status = if i < 2 { LeadStatus::Won } else { LeadStatus::Lost };
            lead(&format!("hot-{i}")).hot().status(status).build()
        })
        .collect();

    let patterns = detect_patterns(&leads, &[], now());

    assert_eq!(patterns.len(), 1, "got {patterns:?}");
    let insight = &patterns[0];
    assert_eq!(insight.id, "qualification-accuracy");
    assert_eq!(insight.kind, PatternKind::Insight);
    assert_eq!(insight.confidence, 80, "60 + 2 x 10");
    assert_eq!(insight.affected_leads, 0);
    assert!(
        insight.examples.iter().all(|e| e.lead_id.starts_with("hot-") && e.lead_id != "hot-0" && e.lead_id != "hot-1"),
        "examples should be lost hot leads: {:?}",
        insight.examples
    );
}

#[test]
fn output_is_ranked_by_kind_then_confidence() {
    let mut engaged = batch("e", 4, LeadStatus::Won);
    engaged.extend(batch("e-open", 1, LeadStatus::Proposal));
    let mut others = batch("o-won", 2, LeadStatus::Won);
    others.extend(batch("o-lost", 5, LeadStatus::Lost));
    others.extend(hot_stalled("h", 3));

    let activities: Vec<ActivityLog> = engaged.iter().flat_map(early_touches).collect();
    let leads: Vec<Lead> = engaged.into_iter().chain(others).collect();

    let patterns = detect_patterns(&leads, &activities, now());

    assert!(patterns.len() >= 2, "expected winning and risk findings, got {patterns:?}");
    for pair in patterns.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(
            a.kind < b.kind || (a.kind == b.kind && a.confidence >= b.confidence),
            "{} ({:?} {}) ranked before {} ({:?} {})",
            a.id, a.kind, a.confidence, b.id, b.kind, b.confidence
        );
    }
    for p in &patterns {
        assert!(p.confidence <= 95, "{} confidence {}", p.id, p.confidence);
    }
}

#[test]
fn detection_is_idempotent() {
    let mut leads = hot_stalled("h", 3);
    leads.extend(batch("w", 4, LeadStatus::Won));
    let activities: Vec<ActivityLog> = leads.iter().take(2).flat_map(early_touches).collect();

    let first = detect_patterns(&leads, &activities, now());
    let second = detect_patterns(&leads, &activities, now());

    assert_eq!(first, second);
}
