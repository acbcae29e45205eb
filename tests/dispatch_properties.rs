use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use roster_dispatch::core::collaborators::Collaborators;
use roster_dispatch::core::engine::{DispatchEngine, EngineConfig};
use roster_dispatch::core::serialization::SaveData;
use roster_dispatch::simulation::agents::DEFAULT_HISTORY_CAPACITY;
use roster_dispatch::world::{SaveDb, SaveRepository};

const AGENTS: [&str; 6] = ["aya", "bram", "cleo", "dario", "emi", "walk_in"];
const ACTIVITIES: [&str; 9] = [
    "cooking",
    "cleaning",
    "laundry",
    "serving",
    "shopping",
    "gardening",
    "training",
    "crafting",
    "juggling",
];

#[derive(Debug, Clone)]
enum Op {
    Dispatch { agent: usize, activity: usize },
    Advance(f64),
    Cancel(usize),
    Rest { agent: usize, seconds: f64 },
    ReloadJson,
    ReloadSqlite,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..AGENTS.len(), 0..ACTIVITIES.len())
            .prop_map(|(agent, activity)| Op::Dispatch { agent, activity }),
        4 => (0.0_f64..7200.0).prop_map(Op::Advance),
        1 => (0..AGENTS.len()).prop_map(Op::Cancel),
        1 => (0..AGENTS.len(), 0.0_f64..7200.0)
            .prop_map(|(agent, seconds)| Op::Rest { agent, seconds }),
        1 => Just(Op::ReloadJson),
        1 => Just(Op::ReloadSqlite),
    ]
}

fn apply(engine: &mut DispatchEngine, op: &Op) {
    match op {
        Op::Dispatch { agent, activity } => {
            let _ = engine.dispatch(AGENTS[*agent], ACTIVITIES[*activity]);
        }
        Op::Advance(seconds) => {
            engine.advance(*seconds);
        }
        Op::Cancel(agent) => {
            let _ = engine.cancel(AGENTS[*agent]);
        }
        Op::Rest { agent, seconds } => {
            engine.rest(AGENTS[*agent], *seconds);
        }
        Op::ReloadJson => {
            let json = serde_json::to_string(&engine.save_data()).unwrap();
            let data: SaveData = serde_json::from_str(&json).unwrap();
            engine.load_save_data(data).unwrap();
        }
        Op::ReloadSqlite => {
            let mut db = SaveDb::open_in_memory().unwrap();
            db.save(&engine.save_data()).unwrap();
            engine.load_save_data(db.load().unwrap().unwrap()).unwrap();
        }
    }
}

/// Checks the engine-wide invariants and records the skill levels seen so far.
fn check_invariants(
    engine: &DispatchEngine,
    seen_skills: &mut HashMap<(String, String), u8>,
) -> Result<(), TestCaseError> {
    let mut busy = HashSet::new();
    for task in engine.all_assignments() {
        prop_assert!(busy.insert(task.agent_id.clone()), "{} assigned twice", task.agent_id);
        prop_assert_eq!(engine.current_task(&task.agent_id).map(|t| t.id), Some(task.id));
        prop_assert!((0.0..=1.0).contains(&task.progress));
    }

    for agent_id in AGENTS {
        let Some(agent) = engine.agent(agent_id) else {
            continue;
        };
        prop_assert!((0.0..=1.0).contains(&agent.fatigue), "fatigue {}", agent.fatigue);
        prop_assert!((0.0..=100.0).contains(&agent.mood), "mood {}", agent.mood);
        prop_assert!(agent.history.len() <= DEFAULT_HISTORY_CAPACITY);
        prop_assert!(
            engine.character_status(agent_id).recent_history.len() <= DEFAULT_HISTORY_CAPACITY
        );

        for (activity, &level) in &agent.skill_by_activity {
            let previous = seen_skills
                .entry((agent_id.to_string(), activity.clone()))
                .or_insert(level);
            prop_assert!(level >= *previous, "{} {} fell to {}", agent_id, activity, level);
            *previous = level;
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn invariants_hold_across_random_sessions(
        seed in any::<u64>(),
        ops in prop::collection::vec(op(), 1..150),
    ) {
        let mut engine = DispatchEngine::with_builtin_data(
            Collaborators::default(),
            EngineConfig { seed, ..EngineConfig::default() },
        );
        let mut seen_skills = HashMap::new();
        for op in &ops {
            apply(&mut engine, op);
            check_invariants(&engine, &mut seen_skills)?;
        }
    }

    #[test]
    fn long_careers_keep_history_bounded(
        seed in any::<u64>(),
        rounds in 21_usize..60,
    ) {
        let mut engine = DispatchEngine::with_builtin_data(
            Collaborators::default(),
            EngineConfig { seed, ..EngineConfig::default() },
        );
        let mut seen_skills = HashMap::new();
        for round in 0..rounds {
            engine.dispatch("emi", "cleaning").unwrap();
            engine.advance(7200.0);
            if round % 10 == 0 {
                apply(&mut engine, &Op::ReloadSqlite);
            }
            check_invariants(&engine, &mut seen_skills)?;
        }
        let history = &engine.agent("emi").unwrap().history;
        prop_assert_eq!(history.len(), DEFAULT_HISTORY_CAPACITY);
        prop_assert_eq!(engine.statistics().total_tasks, rounds as u64);
    }
}
