use roster_dispatch::core::collaborators::{
    Collaborators, FacilityRegistry, Ledger, NotificationLog,
};
use roster_dispatch::core::engine::{DispatchEngine, EngineConfig};
use roster_dispatch::simulation::rng::FixedRoll;
use roster_dispatch::world::{SaveDb, SaveRepository};
use roster_dispatch::DispatchError;

fn engine_with_rolls(rolls: FixedRoll) -> DispatchEngine {
    DispatchEngine::with_builtin_data(Collaborators::default(), EngineConfig::default())
        .with_roll_source(rolls)
}

#[test]
fn master_cook_snapshot_and_payout() {
    let ledger = Ledger::default();
    let mut engine = DispatchEngine::with_builtin_data(
        Collaborators::default().with_rewards(ledger.clone()),
        EngineConfig::default(),
    )
    .with_roll_source(FixedRoll::constant(0.0));
    engine
        .agent_mut("aya")
        .skill_by_activity
        .insert("cooking".to_string(), 5);

    let task = engine.dispatch("aya", "cooking").unwrap();
    assert_eq!(task.efficiency.speed_multiplier, 5.0);
    assert_eq!(task.efficiency.quality_rating, 5.0);
    assert!((task.efficiency.success_probability - 0.9).abs() < 1e-12);

    // 1800 nominal seconds at 5x speed.
    assert!(engine.advance(359.0).is_empty());
    let outcomes = engine.advance(10.0);
    assert_eq!(outcomes.len(), 1);
    let outcome = &outcomes[0];
    assert!(outcome.success);
    assert_eq!(outcome.reward.gold, 83);
    assert_eq!(outcome.reward.reputation_delta, 16);
    assert_eq!(outcome.reward.satisfaction_delta, 33);
    assert_eq!(outcome.experience_gained, 10.0);
    assert!((outcome.fatigue - 0.35).abs() < 1e-12);
    assert_eq!(outcome.mood, 98.0);

    let totals = ledger.totals();
    assert_eq!(totals.gold, 83);
    assert_eq!(totals.reputation, 16);
}

#[test]
fn exhausted_master_is_slowed_but_not_floored() {
    let mut engine = engine_with_rolls(FixedRoll::constant(0.0));
    {
        let aya = engine.agent_mut("aya");
        aya.skill_by_activity.insert("cooking".to_string(), 5);
        aya.fatigue = 1.0;
    }
    let task = engine.dispatch("aya", "cooking").unwrap();
    assert!((task.efficiency.fatigue_penalty - 0.3).abs() < 1e-12);
    assert!((task.efficiency.speed_multiplier - 3.5).abs() < 1e-12);
}

#[test]
fn novice_failure_on_disliked_chore() {
    let mut engine = engine_with_rolls(FixedRoll::constant(0.99));
    let task = engine.dispatch("aya", "cleaning").unwrap();
    assert!((task.efficiency.success_probability - 0.58).abs() < 1e-12);

    let outcomes = engine.advance(1200.0);
    let outcome = &outcomes[0];
    assert!(!outcome.success);
    assert_eq!(outcome.reward.gold, 0);
    assert_eq!(outcome.reward.reputation_delta, -5);
    assert_eq!(outcome.reward.satisfaction_delta, -10);
    assert_eq!(outcome.experience_gained, 7.5);
    assert_eq!(outcome.mood, 90.0);
    assert!((outcome.fatigue - 0.5).abs() < 1e-12);

    let status = engine.character_status("aya");
    assert_eq!(status.skills["cleaning"].experience, 7.5);
    assert!(!status.recent_history[0].success);
    assert_eq!(engine.statistics().failed_tasks, 1);
}

#[test]
fn second_dispatch_is_rejected_until_cancelled() {
    let mut engine = engine_with_rolls(FixedRoll::constant(0.0));
    let first = engine.dispatch("bram", "training").unwrap();
    let err = engine.dispatch("bram", "shopping").unwrap_err();
    assert_eq!(
        err,
        DispatchError::AlreadyAssigned {
            agent_id: "bram".to_string(),
            activity_type: "training".to_string(),
        }
    );
    assert_eq!(engine.current_task("bram").unwrap().id, first.id);

    engine.cancel("bram").unwrap();
    assert!(engine.dispatch("bram", "shopping").is_ok());
    assert_eq!(engine.statistics().cancelled_tasks, 1);
    assert_eq!(engine.statistics().total_tasks, 0);
}

#[test]
fn rest_clamps_to_zero() {
    let mut engine = engine_with_rolls(FixedRoll::constant(0.0));
    engine.agent_mut("emi").fatigue = 0.5;
    assert_eq!(engine.rest("emi", 1800.0), 0.0);
    assert_eq!(engine.character_status("emi").fatigue, 0.0);
}

#[test]
fn facility_gate_follows_registry() {
    let facilities = FacilityRegistry::default();
    facilities.unlock("training_hall", "Training Hall", 1);
    let notifications = NotificationLog::default();
    let mut engine = DispatchEngine::with_builtin_data(
        Collaborators::default()
            .with_facilities(facilities.clone())
            .with_notifier(notifications.clone()),
        EngineConfig::default(),
    );

    let err = engine.dispatch("bram", "training").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Training Hall must be level 2 (currently level 1)"
    );
    assert!(engine.agent("bram").is_none());
    assert!(notifications.is_empty());

    facilities.unlock("training_hall", "Training Hall", 2);
    engine.dispatch("bram", "training").unwrap();
    assert_eq!(notifications.len(), 1);
}

#[test]
fn unsuitable_when_exhausted() {
    let mut engine = engine_with_rolls(FixedRoll::constant(0.0));
    engine.agent_mut("cleo").fatigue = 0.95;
    engine.agent_mut("cleo").mood = 15.0;
    let verdict = engine.is_suitable("cleo", "training");
    assert!(!verdict.suitable);
    assert_eq!(verdict.reasons.len(), 1);
    assert_eq!(verdict.warnings.len(), 2);
}

#[test]
fn one_advance_resolves_every_finished_task() {
    let mut engine = engine_with_rolls(FixedRoll::constant(0.0));
    engine.dispatch("emi", "cleaning").unwrap();
    engine.dispatch("dario", "shopping").unwrap();
    engine.dispatch("cleo", "serving").unwrap();

    let outcomes = engine.advance(3600.0);
    let agents: Vec<_> = outcomes.iter().map(|o| o.agent_id.as_str()).collect();
    assert_eq!(agents, vec!["cleo", "dario", "emi"]);
    assert!(engine.all_assignments().is_empty());
    assert_eq!(engine.statistics().total_tasks, 3);
}

#[test]
fn sqlite_save_restores_an_engine() {
    let mut engine = engine_with_rolls(FixedRoll::constant(0.0));
    engine.dispatch("aya", "gardening").unwrap();
    engine.advance(2700.0);
    engine.dispatch("aya", "cooking").unwrap();
    engine.advance(900.0);

    let mut db = SaveDb::open_in_memory().unwrap();
    db.save(&engine.save_data()).unwrap();

    let mut restored = engine_with_rolls(FixedRoll::constant(0.0));
    restored.load_save_data(db.load().unwrap().unwrap()).unwrap();

    assert_eq!(
        restored.character_status("aya"),
        engine.character_status("aya")
    );
    assert_eq!(restored.statistics(), engine.statistics());

    // The restored engine continues the same task to completion.
    let finished = restored.advance(1800.0);
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].activity_type, "cooking");
    assert!(restored.dispatch("aya", "cooking").unwrap().id > 2);
}

#[test]
fn corrupted_save_is_refused_and_engine_keeps_running() {
    let mut engine = engine_with_rolls(FixedRoll::constant(0.0));
    let raw = r#"{"agents": {"aya": {"id": "aya", "display_name": "Aya", "fatigue": 0.0,
        "mood": 100.0, "skill_by_activity": {"cleaning": 9},
        "experience_by_activity": {"cleaning": -500.0}}}}"#;
    let data = serde_json::from_str(raw).unwrap();
    assert!(engine.load_save_data(data).is_err());

    let task = engine.dispatch("aya", "cleaning").unwrap();
    assert_eq!(task.efficiency.base_skill, 1.0);
    assert_eq!(engine.agent("aya").unwrap().experience("cleaning"), 0.0);
}

#[test]
fn save_with_negative_speed_cannot_drive_progress_backwards() {
    let mut engine = engine_with_rolls(FixedRoll::constant(0.0));
    engine.dispatch("aya", "cooking").unwrap();
    let mut data = engine.save_data();
    data.assignments
        .get_mut("aya")
        .unwrap()
        .efficiency
        .speed_multiplier = -2.0;

    let mut restored = engine_with_rolls(FixedRoll::constant(0.0));
    assert!(restored.load_save_data(data).is_err());
    assert!(restored.all_assignments().is_empty());
    restored.advance(1e6);
    assert!(restored.all_assignments().is_empty());

    engine.advance(1e6);
    assert!(engine.current_task("aya").is_none());
}
