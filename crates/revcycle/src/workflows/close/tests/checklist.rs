use super::common::*;
use crate::workflows::close::checklist::SYSTEM_ACTOR;
use crate::workflows::close::domain::{CloseError, SignOffRecord};
use crate::workflows::close::store::CloseStore;
use crate::workflows::close::template::AutoCheckSignal;

#[test]
fn load_items_returns_sorted_checklist() {
    let (engine, store, _feed) = build_engine();
    seed_period(&store, sample_key());

    let items = engine.load_items(sample_key()).expect("items load");

    assert!(!items.is_empty());
    assert!(items
        .windows(2)
        .all(|pair| pair[0].template.sort_order <= pair[1].template.sort_order));
    assert_eq!(items[0].template.name, "Submit outstanding claims");
}

#[test]
fn load_items_fails_for_unknown_period() {
    let (engine, _store, _feed) = build_engine();

    match engine.load_items(sample_key()) {
        Err(CloseError::PeriodNotFound(key)) => assert_eq!(key, sample_key()),
        other => panic!("expected period not found, got {other:?}"),
    }
}

#[test]
fn auto_checks_complete_satisfied_items_as_system() {
    let (engine, store, _feed) = build_engine();
    seed_period(&store, sample_key());

    let run = engine
        .apply_auto_checks(sample_key(), noon(14))
        .expect("auto checks run");

    assert_eq!(
        run.newly_completed,
        vec![
            "Submit outstanding claims",
            "Resolve denied claims",
            "Reconcile posted payments"
        ]
    );
    assert!(run.unknown_signals.is_empty());

    for item in engine.load_items(sample_key()).expect("items load") {
        if item.is_auto() {
            assert!(item.is_completed);
            assert_eq!(item.completed_by.as_deref(), Some(SYSTEM_ACTOR));
            assert_eq!(item.completed_at, Some(noon(14)));
        } else {
            assert!(!item.is_completed);
        }
    }
}

#[test]
fn auto_checks_are_idempotent() {
    let (engine, store, _feed) = build_engine();
    seed_period(&store, sample_key());

    engine
        .apply_auto_checks(sample_key(), noon(14))
        .expect("first run");
    let first_state = engine.load_items(sample_key()).expect("items load");

    let second = engine
        .apply_auto_checks(sample_key(), noon(15))
        .expect("second run");

    assert!(second.newly_completed.is_empty());
    let second_state = engine.load_items(sample_key()).expect("items load");
    assert_eq!(first_state, second_state, "second pass changed nothing");
}

#[test]
fn auto_checks_never_revert_a_completed_item() {
    let (engine, store, feed) = build_engine();
    seed_period(&store, sample_key());

    engine
        .apply_auto_checks(sample_key(), noon(14))
        .expect("first run");

    // New unsubmitted claims appear after the item was satisfied.
    feed.set_count(AutoCheckSignal::UnsubmittedClaims, 7);
    engine
        .apply_auto_checks(sample_key(), noon(16))
        .expect("second run");

    let items = engine.load_items(sample_key()).expect("items load");
    let claims = items
        .iter()
        .find(|item| item.template.name == "Submit outstanding claims")
        .expect("claims item present");
    assert!(claims.is_completed);
    assert_eq!(claims.completed_at, Some(noon(14)));
}

#[test]
fn unknown_verdicts_leave_items_untouched_and_are_reported() {
    let (engine, store, feed) = build_engine();
    seed_period(&store, sample_key());
    feed.fail_count(AutoCheckSignal::UnresolvedDenials);

    let run = engine
        .apply_auto_checks(sample_key(), noon(14))
        .expect("auto checks run");

    assert_eq!(run.unknown_signals, vec![AutoCheckSignal::UnresolvedDenials]);
    assert!(!run.newly_completed.contains(&"Resolve denied claims"));

    let items = engine.load_items(sample_key()).expect("items load");
    let denials = items
        .iter()
        .find(|item| item.template.name == "Resolve denied claims")
        .expect("denials item present");
    assert!(!denials.is_completed, "unknown must not complete the item");
}

#[test]
fn auto_checks_are_a_no_op_on_closed_periods() {
    let (engine, store, _feed) = build_engine();
    seed_period(&store, sample_key());
    close_directly(&store);

    let run = engine
        .apply_auto_checks(sample_key(), noon(31))
        .expect("auto checks run");

    assert!(run.newly_completed.is_empty());
    assert!(engine
        .load_items(sample_key())
        .expect("items load")
        .iter()
        .all(|item| !item.is_completed));
}

#[test]
fn toggle_manual_stamps_and_clears_completion() {
    let (engine, store, _feed) = build_engine();
    seed_period(&store, sample_key());

    let completed = engine
        .toggle_manual(sample_key(), "Review A/R aging", true, "m.ruiz", noon(18))
        .expect("toggle on");
    assert!(completed.is_completed);
    assert_eq!(completed.completed_by.as_deref(), Some("m.ruiz"));
    assert_eq!(completed.completed_at, Some(noon(18)));

    let cleared = engine
        .toggle_manual(sample_key(), "Review A/R aging", false, "m.ruiz", noon(19))
        .expect("toggle off");
    assert!(!cleared.is_completed);
    assert!(cleared.completed_at.is_none());
    assert!(cleared.completed_by.is_none());
}

#[test]
fn toggle_manual_refuses_auto_managed_items() {
    let (engine, store, _feed) = build_engine();
    seed_period(&store, sample_key());

    match engine.toggle_manual(
        sample_key(),
        "Submit outstanding claims",
        true,
        "m.ruiz",
        noon(18),
    ) {
        Err(CloseError::ItemIsAutoManaged { name }) => {
            assert_eq!(name, "Submit outstanding claims")
        }
        other => panic!("expected auto managed error, got {other:?}"),
    }
}

#[test]
fn toggle_manual_refuses_unknown_items_and_closed_periods() {
    let (engine, store, _feed) = build_engine();
    seed_period(&store, sample_key());

    match engine.toggle_manual(sample_key(), "Water the plants", true, "m.ruiz", noon(18)) {
        Err(CloseError::ItemNotFound { name, .. }) => assert_eq!(name, "Water the plants"),
        other => panic!("expected item not found, got {other:?}"),
    }

    close_directly(&store);
    match engine.toggle_manual(sample_key(), "Review A/R aging", true, "m.ruiz", noon(31)) {
        Err(CloseError::PeriodClosed(key)) => assert_eq!(key, sample_key()),
        other => panic!("expected period closed, got {other:?}"),
    }
}

#[test]
fn artifact_completion_is_idempotent() {
    let (engine, store, _feed) = build_engine();
    seed_period(&store, sample_key());

    engine
        .mark_completed_by_artifact(sample_key(), "Download reports", "reports-bot", noon(20))
        .expect("first mark");
    engine
        .mark_completed_by_artifact(sample_key(), "Download reports", "someone-else", noon(21))
        .expect("second mark is a no-op");

    let items = engine.load_items(sample_key()).expect("items load");
    let reports = items
        .iter()
        .find(|item| item.template.name == "Download reports")
        .expect("reports item present");
    assert_eq!(reports.completed_by.as_deref(), Some("reports-bot"));
    assert_eq!(reports.completed_at, Some(noon(20)));
}

#[test]
fn artifact_completion_respects_the_period_lock() {
    let (engine, store, _feed) = build_engine();
    seed_period(&store, sample_key());
    close_directly(&store);

    match engine.mark_completed_by_artifact(sample_key(), "Download reports", "bot", noon(31)) {
        Err(CloseError::PeriodClosed(key)) => assert_eq!(key, sample_key()),
        other => panic!("expected period closed, got {other:?}"),
    }
}

#[test]
fn gate_is_never_vacuously_true() {
    let (engine, store, _feed) = build_engine();
    seed_period(&store, sample_key());

    assert!(!engine
        .is_gate_satisfied(sample_key())
        .expect("gate evaluates"));

    store.wipe_checklist(sample_key());
    assert!(
        !engine
            .is_gate_satisfied(sample_key())
            .expect("gate evaluates"),
        "an empty checklist must not satisfy the gate"
    );
}

#[test]
fn gate_flips_once_every_item_is_complete() {
    let (engine, store, _feed) = build_engine();
    seed_period(&store, sample_key());

    engine
        .apply_auto_checks(sample_key(), noon(14))
        .expect("auto checks run");
    assert!(!engine
        .is_gate_satisfied(sample_key())
        .expect("gate evaluates"));
    assert_eq!(
        engine
            .incomplete_items(sample_key())
            .expect("incomplete listed"),
        vec![
            "Review A/R aging".to_string(),
            "Download reports".to_string(),
            "Management sign-off review".to_string()
        ]
    );

    for name in ["Review A/R aging", "Download reports", "Management sign-off review"] {
        engine
            .toggle_manual(sample_key(), name, true, "m.ruiz", noon(20))
            .expect("manual toggle");
    }

    assert!(engine
        .is_gate_satisfied(sample_key())
        .expect("gate evaluates"));
    assert!(engine
        .incomplete_items(sample_key())
        .expect("incomplete listed")
        .is_empty());
}

/// Flip the period to Closed through the store, bypassing the gate, so
/// engine behavior against Closed periods can be exercised in isolation.
fn close_directly(store: &std::sync::Arc<MemoryCloseStore>) {
    store
        .finalize_close(
            sample_key(),
            noon(31).date(),
            SignOffRecord {
                period: sample_key(),
                signed_by: "test-closer".to_string(),
                signed_at: noon(31),
                notes: None,
            },
        )
        .expect("period closes");
}
