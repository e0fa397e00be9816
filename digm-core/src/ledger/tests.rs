use super::*;
use crate::types::Timeframe;

fn test_ledger() -> Ledger {
    Ledger::new(RewardsConfig::default(), FocusConfig::default())
}

fn day(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn new_goal(title: &str) -> NewGoal {
    NewGoal {
        title: title.to_string(),
        due_date: day("2025-12-31"),
        timeframe: Timeframe::ThreeMonth,
        specific: None,
        measurable: None,
        achievable: None,
        relevant: None,
        time_bound: None,
    }
}

fn new_task(title: &str) -> NewTask {
    NewTask {
        title: title.to_string(),
        is_high_impact: false,
        goal_id: None,
        xp_reward: None,
    }
}

fn goal_with_tasks(ledger: &mut Ledger, title: &str, task_count: usize) -> (String, Vec<String>) {
    let tasks: Vec<NewTask> = (0..task_count)
        .map(|i| new_task(&format!("{} task {}", title, i)))
        .collect();
    let goal = ledger.add_goal(new_goal(title), tasks).unwrap();
    (goal.id.clone(), goal.task_ids.clone())
}

#[test]
fn test_completing_task_awards_reward_and_marks_done() {
    let mut ledger = test_ledger();
    let task = ledger
        .add_task(NewTask {
            title: "write outline".to_string(),
            is_high_impact: true,
            goal_id: None,
            xp_reward: None,
        })
        .unwrap();

    let change = ledger.update_task_status(&task.id, TaskStatus::Done).unwrap();
    assert_eq!(change.xp_awarded, 15);
    assert!(change.task.is_completed);
    assert!(change.task.completed_at.is_some());
    assert_eq!(ledger.profile().xp, 15);
}

#[test]
fn test_xp_is_one_directional() {
    let mut ledger = test_ledger();
    let task = ledger
        .add_task(NewTask {
            xp_reward: Some(15),
            ..new_task("ship the draft")
        })
        .unwrap();

    // complete -> 15
    ledger.update_task_status(&task.id, TaskStatus::Done).unwrap();
    assert_eq!(ledger.profile().xp, 15);

    // revert -> unchanged, completion state cleared
    let change = ledger.update_task_status(&task.id, TaskStatus::Open).unwrap();
    assert_eq!(ledger.profile().xp, 15);
    assert_eq!(change.xp_awarded, 0);
    assert!(!change.task.is_completed);
    assert!(change.task.completed_at.is_none());

    // re-complete -> 30
    ledger.update_task_status(&task.id, TaskStatus::Done).unwrap();
    assert_eq!(ledger.profile().xp, 30);
}

#[test]
fn test_same_status_update_is_noop() {
    let mut ledger = test_ledger();
    let (goal_id, task_ids) = goal_with_tasks(&mut ledger, "Run 5k", 2);

    let change = ledger
        .update_task_status(&task_ids[0], TaskStatus::Open)
        .unwrap();
    assert_eq!(change.xp_awarded, 0);
    assert!(change.goal_progress.is_none());
    assert_eq!(ledger.profile().xp, 0);
    assert!(ledger.drain_events().is_empty());

    // Also a no-op when already done
    ledger.update_task_status(&task_ids[0], TaskStatus::Done).unwrap();
    let xp_after = ledger.profile().xp;
    let change = ledger
        .update_task_status(&task_ids[0], TaskStatus::Done)
        .unwrap();
    assert_eq!(change.xp_awarded, 0);
    assert!(change.goal_progress.is_none());
    assert_eq!(ledger.profile().xp, xp_after);
    assert_eq!(ledger.goal(&goal_id).unwrap().progress, 50);
}

#[test]
fn test_goal_progress_derivation() {
    let mut ledger = test_ledger();
    let (goal_id, task_ids) = goal_with_tasks(&mut ledger, "Write book", 4);
    assert_eq!(ledger.goal(&goal_id).unwrap().progress, 0);

    let change = ledger
        .update_task_status(&task_ids[0], TaskStatus::Done)
        .unwrap();
    assert_eq!(change.goal_progress.as_ref().unwrap().progress, 25);
    assert_eq!(ledger.goal(&goal_id).unwrap().progress, 25);

    ledger.update_task_status(&task_ids[1], TaskStatus::Done).unwrap();
    assert_eq!(ledger.goal(&goal_id).unwrap().progress, 50);

    // Thirds round to nearest
    let (goal_id, task_ids) = goal_with_tasks(&mut ledger, "Thirds", 3);
    ledger.update_task_status(&task_ids[0], TaskStatus::Done).unwrap();
    assert_eq!(ledger.goal(&goal_id).unwrap().progress, 33);
    ledger.update_task_status(&task_ids[1], TaskStatus::Done).unwrap();
    assert_eq!(ledger.goal(&goal_id).unwrap().progress, 67);
}

#[test]
fn test_goal_completion_bonus_fires_once_and_rearms() {
    let mut ledger = test_ledger();
    let (goal_id, task_ids) = goal_with_tasks(&mut ledger, "Launch site", 2);

    ledger.update_task_status(&task_ids[0], TaskStatus::Done).unwrap();
    let change = ledger
        .update_task_status(&task_ids[1], TaskStatus::Done)
        .unwrap();

    // 2 standard tasks (5 each) + 100 bonus
    assert!(change.goal_progress.as_ref().unwrap().completed);
    assert_eq!(ledger.profile().xp, 110);
    let events = ledger.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, EngineEvent::GoalCompleted { goal_id: id, .. } if *id == goal_id)));

    // Editing the goal while it stays at 100 does not re-fire
    ledger
        .update_goal(&goal_id, GoalPatch {
            title: Some("Launch the site".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(ledger.profile().xp, 110);
    assert!(ledger.drain_events().is_empty());

    // A new incomplete task drops progress below 100 and re-arms the event
    let task = ledger
        .add_task(NewTask {
            goal_id: Some(goal_id.clone()),
            ..new_task("polish")
        })
        .unwrap();
    assert_eq!(ledger.goal(&goal_id).unwrap().progress, 67);

    let change = ledger.update_task_status(&task.id, TaskStatus::Done).unwrap();
    assert!(change.goal_progress.as_ref().unwrap().completed);
    // +5 for the task, +100 for the second completion
    assert_eq!(ledger.profile().xp, 215);
    let events = ledger.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, EngineEvent::GoalCompleted { .. })));
}

#[test]
fn test_goal_completion_unpins_the_goal() {
    let mut ledger = test_ledger();
    let (goal_id, task_ids) = goal_with_tasks(&mut ledger, "Clear inbox", 1);
    ledger.toggle_pin(&goal_id).unwrap();
    assert_eq!(ledger.pinned_goal_ids(), &[goal_id.clone()]);

    ledger.update_task_status(&task_ids[0], TaskStatus::Done).unwrap();
    assert!(ledger.pinned_goal_ids().is_empty());
}

#[test]
fn test_completion_and_level_up_both_signal() {
    let mut ledger = test_ledger();
    let (_, task_ids) = goal_with_tasks(&mut ledger, "Big push", 1);

    // Task (5) + goal bonus (100) crosses the level-2 boundary at 51
    ledger.update_task_status(&task_ids[0], TaskStatus::Done).unwrap();
    let events = ledger.drain_events();
    assert!(events.iter().any(|e| matches!(e, EngineEvent::GoalCompleted { .. })));
    assert!(events.iter().any(|e| matches!(e, EngineEvent::LevelUp { level: 3 })));
    assert_eq!(ledger.profile().level, 3);

    // Events are consumed-once
    assert!(ledger.drain_events().is_empty());
}

#[test]
fn test_add_goal_without_tasks_creates_kickoff_task() {
    let mut ledger = test_ledger();
    let goal = ledger.add_goal(new_goal("Learn piano"), vec![]).unwrap();

    assert_eq!(goal.task_ids.len(), 1);
    let task = ledger.task(&goal.task_ids[0]).unwrap();
    assert_eq!(task.title, "Complete Learn piano");
    assert!(task.is_high_impact);
    assert_eq!(task.xp_reward, 15);
    assert_eq!(task.goal_id.as_deref(), Some(goal.id.as_str()));
    assert_eq!(goal.progress, 0);
}

#[test]
fn test_add_goal_rejects_empty_title() {
    let mut ledger = test_ledger();
    let err = ledger.add_goal(new_goal("  "), vec![]).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(ledger.goals().is_empty());
    assert!(ledger.tasks().is_empty());
}

#[test]
fn test_add_goal_rejects_bad_task_without_partial_state() {
    let mut ledger = test_ledger();
    let err = ledger
        .add_goal(
            new_goal("Valid goal"),
            vec![new_task("fine"), new_task("   ")],
        )
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    // Nothing was inserted, not even the valid pieces
    assert!(ledger.goals().is_empty());
    assert!(ledger.tasks().is_empty());
}

#[test]
fn test_add_task_rejects_unknown_goal_reference() {
    let mut ledger = test_ledger();
    let err = ledger
        .add_task(NewTask {
            goal_id: Some("no-such-goal".to_string()),
            ..new_task("stranded")
        })
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(ledger.tasks().is_empty());
}

#[test]
fn test_unknown_ids_report_not_found() {
    let mut ledger = test_ledger();
    assert!(matches!(
        ledger.update_task_status("nope", TaskStatus::Done),
        Err(Error::TaskNotFound(_))
    ));
    assert!(matches!(
        ledger.delete_task("nope"),
        Err(Error::TaskNotFound(_))
    ));
    assert!(matches!(
        ledger.delete_goal("nope"),
        Err(Error::GoalNotFound(_))
    ));
    assert!(matches!(
        ledger.toggle_pin("nope"),
        Err(Error::GoalNotFound(_))
    ));
    assert!(matches!(
        ledger.update_goal("nope", GoalPatch::default()),
        Err(Error::GoalNotFound(_))
    ));
}

#[test]
fn test_delete_goal_cascades() {
    let mut ledger = test_ledger();
    let (goal_id, task_ids) = goal_with_tasks(&mut ledger, "Doomed", 3);
    let keeper = ledger.add_task(new_task("unrelated")).unwrap();
    ledger.toggle_pin(&goal_id).unwrap();

    ledger.delete_goal(&goal_id).unwrap();

    assert!(ledger.goal(&goal_id).is_none());
    for id in &task_ids {
        assert!(ledger.task(id).is_none());
    }
    assert!(ledger.task(&keeper.id).is_some());
    assert!(ledger.pinned_goal_ids().is_empty());
}

#[test]
fn test_delete_task_recomputes_progress() {
    let mut ledger = test_ledger();
    let (goal_id, task_ids) = goal_with_tasks(&mut ledger, "Trim down", 2);
    ledger.update_task_status(&task_ids[0], TaskStatus::Done).unwrap();
    assert_eq!(ledger.goal(&goal_id).unwrap().progress, 50);

    // Removing the only open task leaves 1/1 done: a completion transition
    ledger.delete_task(&task_ids[1]).unwrap();
    let goal = ledger.goal(&goal_id).unwrap();
    assert_eq!(goal.progress, 100);
    assert_eq!(goal.task_ids, vec![task_ids[0].clone()]);
    assert!(ledger
        .drain_events()
        .iter()
        .any(|e| matches!(e, EngineEvent::GoalCompleted { .. })));
}

#[test]
fn test_goal_with_no_tasks_has_zero_progress() {
    let mut ledger = test_ledger();
    let (goal_id, task_ids) = goal_with_tasks(&mut ledger, "Emptied", 1);
    ledger.delete_task(&task_ids[0]).unwrap();
    assert_eq!(ledger.goal(&goal_id).unwrap().progress, 0);
}

#[test]
fn test_pin_eviction_is_fifo() {
    let mut ledger = test_ledger();
    let mut ids = Vec::new();
    for name in ["A", "B", "C", "D"] {
        let (id, _) = goal_with_tasks(&mut ledger, name, 1);
        ids.push(id);
    }

    for id in &ids[..3] {
        ledger.toggle_pin(id).unwrap();
    }
    assert_eq!(ledger.pinned_goal_ids(), &ids[..3]);

    // Pinning D evicts A, the earliest pin
    ledger.toggle_pin(&ids[3]).unwrap();
    assert_eq!(ledger.pinned_goal_ids(), &ids[1..4]);
}

#[test]
fn test_journal_entry_awards_fixed_xp_once() {
    let mut ledger = test_ledger();
    let entry = ledger
        .add_journal_entry(NewJournalEntry {
            date: day("2025-03-10"),
            content: "Good day".to_string(),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(entry.xp_earned, 10);
    assert_eq!(ledger.profile().xp, 10);

    // Edits change text but never XP
    let updated = ledger
        .update_journal_entry(&entry.id, JournalPatch {
            content: Some("Great day, actually".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(updated.content, "Great day, actually");
    assert_eq!(updated.xp_earned, 10);
    assert_eq!(ledger.profile().xp, 10);
}

#[test]
fn test_journal_entries_newest_first() {
    let mut ledger = test_ledger();
    ledger
        .add_journal_entry(NewJournalEntry {
            date: day("2025-03-10"),
            ..Default::default()
        })
        .unwrap();
    let second = ledger
        .add_journal_entry(NewJournalEntry {
            date: day("2025-03-11"),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(ledger.journal_entries()[0].id, second.id);
}

#[test]
fn test_streak_continuation_awards_bonus() {
    let mut ledger = test_ledger();

    let change = ledger.check_daily_streak(day("2025-03-10")).unwrap();
    assert_eq!(change, StreakChange::Reset);
    assert_eq!(ledger.profile().streak, 1);
    assert_eq!(ledger.profile().xp, 0);

    let change = ledger.check_daily_streak(day("2025-03-11")).unwrap();
    assert_eq!(change, StreakChange::Continued);
    assert_eq!(ledger.profile().streak, 2);
    assert_eq!(ledger.profile().xp, 3);

    // Same-day recheck changes nothing
    let change = ledger.check_daily_streak(day("2025-03-11")).unwrap();
    assert_eq!(change, StreakChange::SameDay);
    assert_eq!(ledger.profile().streak, 2);
    assert_eq!(ledger.profile().xp, 3);

    // A gap resets with no bonus
    let change = ledger.check_daily_streak(day("2025-03-14")).unwrap();
    assert_eq!(change, StreakChange::Reset);
    assert_eq!(ledger.profile().streak, 1);
    assert_eq!(ledger.profile().xp, 3);
}

#[test]
fn test_update_vision() {
    let mut ledger = test_ledger();
    ledger.update_vision("Build things that matter");
    assert_eq!(ledger.profile().vision, "Build things that matter");
}

#[test]
fn test_snapshot_round_trip() {
    let mut ledger = test_ledger();
    let (goal_id, task_ids) = goal_with_tasks(&mut ledger, "Persisted", 2);
    ledger.update_task_status(&task_ids[0], TaskStatus::Done).unwrap();
    ledger.toggle_pin(&goal_id).unwrap();
    ledger.update_vision("vision");

    let snapshot = ledger.snapshot();
    let restored = Ledger::from_snapshot(
        snapshot,
        RewardsConfig::default(),
        FocusConfig::default(),
    );

    assert_eq!(restored.profile(), ledger.profile());
    assert_eq!(restored.goals(), ledger.goals());
    assert_eq!(restored.tasks(), ledger.tasks());
    assert_eq!(restored.pinned_goal_ids(), ledger.pinned_goal_ids());
}

#[test]
fn test_from_snapshot_repairs_stale_level() {
    let snapshot = Snapshot {
        profile: UserProfile {
            xp: 300,
            level: 1,
            ..Default::default()
        },
        ..Default::default()
    };
    let ledger = Ledger::from_snapshot(
        snapshot,
        RewardsConfig::default(),
        FocusConfig::default(),
    );
    assert_eq!(ledger.profile().level, 4);
}
