use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use roster_dispatch::core::collaborators::{
    Collaborators, FacilityRegistry, Ledger, NotificationKind, NotificationLog,
};
use roster_dispatch::core::ecs::{DispatchEvent, DispatchIntent};
use roster_dispatch::core::engine::{DispatchEngine, EngineConfig};
use roster_dispatch::core::world::Session;
use roster_dispatch::data::Catalogs;
use roster_dispatch::simulation::rng::DEFAULT_SEED;
use roster_dispatch::simulation::time::{DayClock, SECONDS_PER_HOUR};
use roster_dispatch::world::{JsonSaveFile, SaveDb, SaveRepository};

const COMMANDS: &str = "Commands: roster | activities | dispatch <agent> <activity> | cancel <agent> | rest <agent> <secs> | tick [secs] | status <agent> | tasks | suitable <agent> <activity> | stats | unlock <facility> <level> | save | load | quit";

struct Options {
    data_dir: Option<PathBuf>,
    save_path: PathBuf,
    db_path: Option<PathBuf>,
    seed: u64,
}

fn main() {
    println!("Initializing Roster Dispatch (Debug)...");
    let options = parse_options(env::args().collect());

    let catalogs = match &options.data_dir {
        Some(dir) => match Catalogs::load_from_dir(dir) {
            Ok(catalogs) => catalogs,
            Err(err) => {
                eprintln!("Failed to load data from {}: {}", dir.display(), err);
                std::process::exit(1);
            }
        },
        None => match Catalogs::builtin() {
            Ok(catalogs) => catalogs,
            Err(err) => {
                eprintln!("Bundled data is invalid: {}", err);
                std::process::exit(1);
            }
        },
    };

    let mut repo: Box<dyn SaveRepository> = match &options.db_path {
        Some(path) => match SaveDb::open(path) {
            Ok(db) => Box::new(db),
            Err(err) => {
                eprintln!("Failed to open save DB: {}", err);
                std::process::exit(1);
            }
        },
        None => Box::new(JsonSaveFile::new(&options.save_path)),
    };

    let facilities = starting_facilities();
    let ledger = Ledger::default();
    let notifications = NotificationLog::default();
    let clock = DayClock::default();
    let collaborators = Collaborators::default()
        .with_facilities(facilities.clone())
        .with_rewards(ledger.clone())
        .with_notifier(notifications.clone())
        .with_clock(clock.clone());
    let config = EngineConfig {
        seed: options.seed,
        ..EngineConfig::default()
    };
    let engine = DispatchEngine::new(catalogs, collaborators, config);
    let mut session = Session::from_engine(engine, clock);

    print_roster(&session);
    println!("{}", COMMANDS);
    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let cmd = parts.next().unwrap_or("").to_lowercase();

        match cmd.as_str() {
            "quit" | "exit" => break,
            "help" => println!("{}", COMMANDS),
            "roster" => print_roster(&session),
            "activities" => print_activities(&session),
            "dispatch" => {
                if let (Some(agent_id), Some(activity_type)) = (parts.next(), parts.next()) {
                    let intent = DispatchIntent::Dispatch {
                        agent_id: agent_id.to_string(),
                        activity_type: activity_type.to_string(),
                    };
                    run_tick(&mut session, vec![intent], 0.0);
                } else {
                    println!("Usage: dispatch <agent> <activity>");
                }
            }
            "cancel" => {
                if let Some(agent_id) = parts.next() {
                    let intent = DispatchIntent::Cancel {
                        agent_id: agent_id.to_string(),
                    };
                    run_tick(&mut session, vec![intent], 0.0);
                } else {
                    println!("Usage: cancel <agent>");
                }
            }
            "rest" => {
                let agent_id = parts.next();
                let seconds = parts.next().and_then(|v| v.parse::<f64>().ok());
                if let (Some(agent_id), Some(duration_seconds)) = (agent_id, seconds) {
                    let intent = DispatchIntent::Rest {
                        agent_id: agent_id.to_string(),
                        duration_seconds,
                    };
                    run_tick(&mut session, vec![intent], 0.0);
                } else {
                    println!("Usage: rest <agent> <secs>");
                }
            }
            "tick" => {
                let seconds = parts
                    .next()
                    .and_then(|v| v.parse::<f64>().ok())
                    .unwrap_or(SECONDS_PER_HOUR);
                run_tick(&mut session, Vec::new(), seconds);
            }
            "status" => {
                if let Some(agent_id) = parts.next() {
                    print_status(&session, agent_id);
                } else {
                    println!("Usage: status <agent>");
                }
            }
            "tasks" => print_tasks(&session),
            "suitable" => {
                if let (Some(agent_id), Some(activity_type)) = (parts.next(), parts.next()) {
                    print_suitability(&session, agent_id, activity_type);
                } else {
                    println!("Usage: suitable <agent> <activity>");
                }
            }
            "stats" => print_stats(&session, &ledger),
            "unlock" => {
                let facility_id = parts.next();
                let level = parts.next().and_then(|v| v.parse::<u32>().ok());
                if let (Some(facility_id), Some(level)) = (facility_id, level) {
                    facilities.unlock(facility_id, &facility_display_name(facility_id), level);
                    println!("{} is now level {}", facility_display_name(facility_id), level);
                } else {
                    println!("Usage: unlock <facility> <level>");
                }
            }
            "save" => {
                let data = session.engine().save_data();
                match repo.save(&data) {
                    Ok(()) => println!(
                        "Saved {} agents, {} tasks",
                        data.agents.len(),
                        data.assignments.len()
                    ),
                    Err(err) => println!("Save failed: {}", err),
                }
            }
            "load" => match repo.load() {
                Ok(Some(data)) => match session.engine_mut().load_save_data(data) {
                    Ok(()) => println!("Loaded save."),
                    Err(err) => println!("Load failed: {}", err),
                },
                Ok(None) => println!("No save found."),
                Err(err) => println!("Load failed: {}", err),
            },
            _ => println!("Unknown command: {}", cmd),
        }

        print_notifications(&notifications);
    }
}

fn parse_options(args: Vec<String>) -> Options {
    let mut iter = args.iter();
    let mut options = Options {
        data_dir: None,
        save_path: PathBuf::from("./dispatch_save.json"),
        db_path: None,
        seed: DEFAULT_SEED,
    };
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--data" => {
                if let Some(value) = iter.next() {
                    options.data_dir = Some(PathBuf::from(value));
                }
            }
            "--save" => {
                if let Some(value) = iter.next() {
                    options.save_path = PathBuf::from(value);
                }
            }
            "--db" => {
                if let Some(value) = iter.next() {
                    options.db_path = Some(PathBuf::from(value));
                }
            }
            "--seed" => {
                if let Some(value) = iter.next() {
                    match value.parse::<u64>() {
                        Ok(seed) => options.seed = seed,
                        Err(_) => eprintln!("Ignoring invalid seed: {}", value),
                    }
                }
            }
            _ => {}
        }
    }
    options
}

/// Training hall and workshop start below the level their activities need.
fn starting_facilities() -> FacilityRegistry {
    let facilities = FacilityRegistry::default();
    for (facility_id, level) in [
        ("kitchen", 1),
        ("laundry_room", 1),
        ("dining_hall", 1),
        ("garden", 1),
        ("training_hall", 1),
        ("workshop", 1),
    ] {
        facilities.unlock(facility_id, &facility_display_name(facility_id), level);
    }
    facilities
}

fn facility_display_name(facility_id: &str) -> String {
    facility_id
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn run_tick(session: &mut Session, intents: Vec<DispatchIntent>, seconds: f64) {
    let report = session.tick(intents, seconds);
    for event in &report.events {
        print_event(event);
    }
    if seconds > 0.0 {
        println!(
            "{} | active tasks: {}",
            report.time_str, report.active_assignments
        );
    }
}

fn print_event(event: &DispatchEvent) {
    match event {
        DispatchEvent::Started(task) => println!(
            "Started #{} {} -> {} (speed x{:.2}, quality {:.2}, success {:.0}%)",
            task.id,
            task.agent_id,
            task.activity_type,
            task.efficiency.speed_multiplier,
            task.efficiency.quality_rating,
            task.efficiency.success_probability * 100.0
        ),
        DispatchEvent::Cancelled(task) => println!(
            "Cancelled #{} {} ({:.0}% done)",
            task.id,
            task.activity_type,
            task.progress * 100.0
        ),
        DispatchEvent::Rested { agent_id, fatigue } => {
            println!("{} rested, fatigue now {:.0}%", agent_id, fatigue * 100.0)
        }
        DispatchEvent::Rejected { error, .. } => println!("Rejected: {}", error),
        DispatchEvent::Completed(outcome) => {
            println!(
                "{} {} {}: gold {:+}, reputation {:+}, satisfaction {:+}, exp +{}",
                outcome.agent_id,
                if outcome.success { "finished" } else { "failed" },
                outcome.activity_type,
                outcome.reward.gold,
                outcome.reward.reputation_delta,
                outcome.reward.satisfaction_delta,
                outcome.experience_gained
            );
            if outcome.leveled_up() {
                println!("  skill {} -> {}", outcome.skill_before, outcome.skill_after);
            }
        }
    }
}

fn print_roster(session: &Session) {
    let engine = session.engine();
    let roster = &engine.catalogs().roster;
    println!("Roster ({}):", roster.ids().len());
    for agent_id in roster.ids() {
        let busy = engine
            .current_task(agent_id)
            .map(|task| format!(" [{}]", task.activity_type))
            .unwrap_or_default();
        println!("  {} ({}){}", agent_id, roster.name(agent_id), busy);
    }
}

fn print_activities(session: &Session) {
    for activity in session.engine().catalogs().activities.sorted() {
        let facility = activity
            .facility_requirement()
            .map(|(id, level)| format!(" needs {} L{}", id, level))
            .unwrap_or_default();
        println!(
            "  {:<10} {:<12} {:?} {:.0}s{}",
            activity.activity_type,
            activity.display_name,
            activity.category,
            activity.nominal_duration,
            facility
        );
    }
}

fn print_status(session: &Session, agent_id: &str) {
    let status = session.engine().character_status(agent_id);
    println!(
        "{} ({}) fatigue={:.0}% mood={:.0} ({})",
        status.display_name, status.agent_id, status.fatigue_percent, status.mood, status.mood_band
    );
    if status.skills.is_empty() {
        println!("  skills: none");
    }
    for (activity_type, skill) in &status.skills {
        println!("  {}: L{} ({:.1} exp)", activity_type, skill.level, skill.experience);
    }
    match &status.current_task {
        Some(task) => println!(
            "  working: {} {:.0}% ({:.0}s left)",
            task.display_name,
            task.progress * 100.0,
            task.remaining_seconds
        ),
        None => println!("  idle"),
    }
    for entry in status.recent_history.iter().take(5) {
        println!(
            "  day {}: {} {}",
            entry.completed_at,
            entry.activity_type,
            if entry.success { "ok" } else { "failed" }
        );
    }
}

fn print_tasks(session: &Session) {
    let tasks = session.engine().all_assignments();
    if tasks.is_empty() {
        println!("No active tasks.");
        return;
    }
    for task in tasks {
        println!(
            "  #{} {} -> {} {:.0}% ({:.0}s left)",
            task.id,
            task.agent_id,
            task.activity_type,
            task.progress * 100.0,
            task.remaining_seconds()
        );
    }
}

fn print_suitability(session: &Session, agent_id: &str, activity_type: &str) {
    let result = session.engine().is_suitable(agent_id, activity_type);
    println!("Suitable: {}", if result.suitable { "yes" } else { "no" });
    for reason in &result.reasons {
        println!("  reason: {}", reason);
    }
    for warning in &result.warnings {
        println!("  warning: {}", warning);
    }
}

fn print_stats(session: &Session, ledger: &Ledger) {
    let stats = session.engine().statistics();
    let rate = stats
        .success_rate()
        .map(|rate| format!("{:.0}%", rate * 100.0))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "Tasks: total={} success={} failed={} cancelled={} rate={} exp={:.1}",
        stats.total_tasks,
        stats.successful_tasks,
        stats.failed_tasks,
        stats.cancelled_tasks,
        rate,
        stats.total_experience_gained
    );
    let totals = ledger.totals();
    println!(
        "Ledger: gold={} reputation={} rewards={}",
        totals.gold, totals.reputation, totals.rewards_applied
    );
    println!("Time: {}", session.time());
}

fn print_notifications(log: &NotificationLog) {
    for note in log.drain() {
        let tag = match note.kind {
            NotificationKind::Info => "info",
            NotificationKind::Success => "ok",
            NotificationKind::Warning => "warn",
        };
        println!("  [{}] {}: {}", tag, note.title, note.message);
    }
}
