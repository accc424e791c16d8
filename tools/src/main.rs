//! intel-runner: headless front end for the lead intelligence engine.
//!
//! Usage:
//!   intel-runner --synthetic --seed 12345 --leads 200 --history-days 180
//!   intel-runner --db pipeline.db --now 2024-06-01T12:00:00Z
//!   intel-runner --db pipeline.db --synthetic --seed 7     (seed the db first)
//!   intel-runner --snapshot pipeline.json --config intel.json
//!   intel-runner --db pipeline.db --ipc-mode

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use leadintel_core::{
    actions::DismissedActions,
    command::{QueuedCommand, RecordStoreCommand},
    config::IntelConfig,
    engine::{IntelEngine, IntelReport},
    snapshot::PipelineSnapshot,
    store::LeadStore,
    synthetic::SyntheticPipeline,
    types::Timestamp,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetReport,
    Dismiss { action_id: String },
    Restore { action_id: String },
    Command { command: RecordStoreCommand },
    Quit,
}

/// Where snapshots come from for this run.
enum Source {
    Store(LeadStore),
    Fixed(PipelineSnapshot),
}

impl Source {
    fn snapshot(&self, now: Timestamp) -> Result<PipelineSnapshot> {
        match self {
            Source::Store(store) => Ok(store.load_snapshot(now)?),
            Source::Fixed(snapshot) => Ok(PipelineSnapshot { now, ..snapshot.clone() }),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let lead_count = parse_arg(&args, "--leads", 150usize);
    let history_days = parse_arg(&args, "--history-days", 120i64);
    let synthetic = has_flag(&args, "--synthetic");
    let ipc_mode = has_flag(&args, "--ipc-mode");
    let db = string_arg(&args, "--db");
    let snapshot_path = string_arg(&args, "--snapshot");
    let export_path = string_arg(&args, "--export");

    // The one place the wall clock is read.
    let now: Timestamp = match string_arg(&args, "--now") {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("--now must be RFC3339, got {raw}"))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let config = match string_arg(&args, "--config") {
        Some(path) => IntelConfig::load(path)?,
        None => IntelConfig::default(),
    };

    let generator = SyntheticPipeline::new(seed, lead_count).with_history_days(history_days);
    let source = build_source(db, snapshot_path, synthetic.then_some(&generator), now)?;

    if let Some(path) = export_path {
        source.snapshot(now)?.to_json_file(path)?;
        log::info!("Snapshot exported to {path}");
    }

    let engine = IntelEngine::new(config);

    if ipc_mode {
        run_ipc_loop(&engine, &source, now)?;
    } else {
        println!("Lead Intelligence -- intel-runner");
        println!("  now:       {now}");
        println!("  source:    {}", describe(db, snapshot_path, synthetic, seed));
        println!();
        let snapshot = source.snapshot(now)?;
        let report = engine.run(&snapshot, &DismissedActions::new());
        print_summary(&snapshot, &report);
    }

    Ok(())
}

fn build_source(
    db: Option<&str>,
    snapshot_path: Option<&str>,
    synthetic: Option<&SyntheticPipeline>,
    now: Timestamp,
) -> Result<Source> {
    match (db, snapshot_path) {
        (Some(_), Some(_)) => bail!("--db and --snapshot are mutually exclusive"),
        (Some(path), None) => {
            let store = LeadStore::open(path)?;
            store.migrate()?;
            if let Some(generator) = synthetic {
                if store.lead_count()? > 0 {
                    bail!("refusing to seed {path}: it already contains leads");
                }
                let generated = generator.generate(now);
                for lead in &generated.leads {
                    store.insert_lead(lead)?;
                }
                for activity in &generated.activities {
                    store.insert_activity(activity)?;
                }
                log::info!("Seeded {path} with {} synthetic leads", generated.leads.len());
            }
            Ok(Source::Store(store))
        }
        (None, Some(path)) => Ok(Source::Fixed(
            PipelineSnapshot::from_json_file(path).with_context(|| format!("Cannot load {path}"))?,
        )),
        (None, None) => match synthetic {
            Some(generator) => Ok(Source::Fixed(generator.generate(now))),
            None => bail!("one of --db, --snapshot or --synthetic is required"),
        },
    }
}

fn run_ipc_loop(engine: &IntelEngine, source: &Source, now: Timestamp) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();
    let mut dismissed = DismissedActions::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetReport => {}
            IpcCommand::Dismiss { action_id } => {
                dismissed.dismiss(action_id);
            }
            IpcCommand::Restore { action_id } => {
                dismissed.restore(&action_id);
            }
            IpcCommand::Command { command } => {
                let Source::Store(store) = source else {
                    write_error(&mut stdout, "commands need a --db record store")?;
                    continue;
                };
                let queued = QueuedCommand::new(command, now);
                match store.apply_command(&queued.command, now) {
                    Ok(activity_id) => log::info!(
                        "Command {} applied as activity {activity_id}",
                        queued.command_id,
                    ),
                    Err(e) => {
                        write_error(&mut stdout, &e.to_string())?;
                        continue;
                    }
                }
            }
        }

        let report = engine.run(&source.snapshot(now)?, &dismissed);
        writeln!(stdout, "{}", serde_json::to_string(&report)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn write_error(stdout: &mut io::Stdout, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(stdout, "{}", err_json)?;
    stdout.flush()?;
    Ok(())
}

fn print_summary(snapshot: &PipelineSnapshot, report: &IntelReport) {
    println!("=== PIPELINE ===");
    println!("  leads:          {}", snapshot.leads.len());
    println!("  activities:     {}", snapshot.activities.len());
    println!("  open leads:     {}", snapshot.leads.iter().filter(|l| l.is_open()).count());

    println!();
    println!("=== MOMENTUM (top 5) ===");
    for m in report.momentum.iter().take(5) {
        println!(
            "  {:>4} {:<13} {:<8} {} -- {}",
            m.score,
            format!("{:?}", m.momentum),
            format!("{:?}", m.temperature),
            m.lead_name,
            m.next_action,
        );
    }

    println!();
    println!("=== PATTERNS ===");
    if report.patterns.is_empty() {
        println!("  (No patterns detected)");
    }
    for p in &report.patterns {
        println!("  [{:?} {}%] {}: {}", p.kind, p.confidence, p.title, p.description);
    }

    println!();
    println!("=== FORECAST ===");
    for period in &report.forecast {
        println!(
            "  {:<8} | Expected: ${:.0} | Range: ${:.0} - ${:.0} | Deals: {}",
            period.label,
            period.expected_revenue,
            period.conservative_revenue,
            period.optimistic_revenue,
            period.deal_count,
        );
    }
    println!(
        "  Growth potential ${:.0}, downside risk ${:.0}, {} sure / {} at-risk deals",
        report.insights.growth_potential,
        report.insights.downside_risk,
        report.insights.sure_deals.len(),
        report.insights.risk_deals.len(),
    );

    println!();
    println!("=== ACTION QUEUE ===");
    if report.actions.is_empty() {
        println!("  (Nothing to do)");
    }
    for a in &report.actions {
        println!("  {:<8} ${:>8.0}  {} ({})", format!("{:?}", a.priority), a.estimated_value, a.title, a.urgency);
    }
}

fn describe(db: Option<&str>, snapshot: Option<&str>, synthetic: bool, seed: u64) -> String {
    match (db, snapshot) {
        (Some(path), _) => format!("store {path}"),
        (None, Some(path)) => format!("snapshot {path}"),
        (None, None) if synthetic => format!("synthetic (seed {seed})"),
        (None, None) => "none".to_string(),
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}
