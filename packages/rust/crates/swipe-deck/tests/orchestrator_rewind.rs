#![allow(missing_docs)]

mod support;

use std::sync::Arc;

use swipe_deck::{
    CandidateId, DeckEvent, DecisionKind, GestureResponse, IgnoreReason, InteractionPhase,
    MemoryDecisionClient, RewindResponse, SwipeError, SwipeOrchestrator,
};

use support::{GatedClient, WAIT, candidates, drain, ids, loaded, test_config, topics};

async fn pass_current(orchestrator: &Arc<SwipeOrchestrator>) {
    orchestrator
        .submit_decision(DecisionKind::Pass)
        .into_pending()
        .expect("pass should be accepted")
        .settle()
        .await
        .expect("pass should commit");
}

#[tokio::test]
async fn rewind_restores_passed_candidate_at_original_index() {
    let client = Arc::new(MemoryDecisionClient::new(candidates(&["a", "b"])));
    let orchestrator = loaded(client.clone(), test_config()).await;

    pass_current(&orchestrator).await;
    let after_pass = orchestrator.snapshot();
    assert_eq!(after_pass.cursor, 1);
    assert_eq!(ids(&after_pass.visible), vec!["b"]);

    let mut rx = orchestrator.subscribe();
    let pending = orchestrator
        .request_rewind()
        .into_pending()
        .expect("rewind should be accepted");
    assert_eq!(pending.candidate_id().as_str(), "a");
    let restored = tokio::time::timeout(WAIT, pending.settle())
        .await
        .expect("rewind should settle")
        .expect("rewind should apply");
    assert_eq!(restored, CandidateId::from("a"));

    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.cursor, 0);
    assert_eq!(ids(&snapshot.visible), vec!["a", "b"]);
    assert!(!snapshot.can_rewind);
    assert!(client.recorded().is_empty());

    let events = drain(&mut rx);
    assert_eq!(topics(&events), vec!["rewind/applied", "deck/changed"]);
    assert_eq!(orchestrator.metrics().rewinds_applied, 1);
}

#[tokio::test]
async fn rewind_with_empty_slot_is_a_no_op() {
    let client = Arc::new(MemoryDecisionClient::new(candidates(&["a", "b"])));
    let orchestrator = loaded(client, test_config()).await;

    assert!(matches!(
        orchestrator.request_rewind(),
        RewindResponse::NothingToRewind
    ));

    pass_current(&orchestrator).await;
    orchestrator
        .request_rewind()
        .into_pending()
        .expect("first rewind should be accepted")
        .settle()
        .await
        .expect("first rewind should apply");

    let before = orchestrator.snapshot();
    let mut rx = orchestrator.subscribe();
    assert!(matches!(
        orchestrator.request_rewind(),
        RewindResponse::NothingToRewind
    ));
    assert_eq!(orchestrator.snapshot(), before);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn rewound_candidate_can_be_decided_again() {
    let client = Arc::new(MemoryDecisionClient::new(candidates(&["a", "b", "c"])));
    let orchestrator = loaded(client.clone(), test_config()).await;

    pass_current(&orchestrator).await;
    orchestrator
        .request_rewind()
        .into_pending()
        .expect("rewind should be accepted")
        .settle()
        .await
        .expect("rewind should apply");

    orchestrator
        .submit_decision(DecisionKind::Like)
        .into_pending()
        .expect("like should be accepted")
        .settle()
        .await
        .expect("like should commit");

    assert_eq!(orchestrator.snapshot().cursor, 1);
    assert_eq!(
        client.recorded().get(&CandidateId::from("a")),
        Some(&DecisionKind::Like)
    );
}

#[tokio::test]
async fn refused_rewind_keeps_deck_and_slot() {
    let client = Arc::new(
        MemoryDecisionClient::new(candidates(&["a", "b"])).with_failing_delete("a"),
    );
    let orchestrator = loaded(client.clone(), test_config()).await;
    pass_current(&orchestrator).await;
    let before = orchestrator.snapshot();
    let mut rx = orchestrator.subscribe();

    let error = orchestrator
        .request_rewind()
        .into_pending()
        .expect("rewind should be accepted")
        .settle()
        .await
        .expect_err("backend refuses the delete");
    assert!(matches!(
        &error,
        SwipeError::RewindFailed { candidate_id, .. } if candidate_id.as_str() == "a"
    ));
    assert!(error.is_retryable());

    assert_eq!(orchestrator.snapshot(), before);
    assert!(orchestrator.can_rewind());
    let events = drain(&mut rx);
    assert!(matches!(
        events.as_slice(),
        [event] if matches!(&event.event, DeckEvent::RewindError { candidate_id, .. } if candidate_id.as_str() == "a")
    ));

    client.heal_delete(&CandidateId::from("a"));
    orchestrator
        .request_rewind()
        .into_pending()
        .expect("retry should be accepted")
        .settle()
        .await
        .expect("retry should apply");
    assert_eq!(orchestrator.snapshot().cursor, 0);
    let metrics = orchestrator.metrics();
    assert_eq!(metrics.rewinds_failed, 1);
    assert_eq!(metrics.rewinds_applied, 1);
}

#[tokio::test]
async fn decisions_are_ignored_while_rewinding() {
    let client = GatedClient::deletes(candidates(&["a", "b"]));
    let orchestrator = loaded(client.clone(), test_config()).await;
    pass_current(&orchestrator).await;

    let pending = orchestrator
        .request_rewind()
        .into_pending()
        .expect("rewind should be accepted");
    let during = orchestrator.snapshot();
    assert_eq!(during.phase, InteractionPhase::Rewinding);
    assert!(!during.can_rewind);
    assert!(!orchestrator.can_rewind());

    assert!(matches!(
        orchestrator.submit_decision(DecisionKind::Like),
        GestureResponse::Ignored(IgnoreReason::Busy)
    ));
    assert!(matches!(
        orchestrator.request_rewind(),
        RewindResponse::Ignored(IgnoreReason::Busy)
    ));
    assert_eq!(orchestrator.snapshot().cursor, 1);

    client.release_one();
    tokio::time::timeout(WAIT, pending.settle())
        .await
        .expect("rewind should settle")
        .expect("rewind should apply");
    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.cursor, 0);
    assert_eq!(snapshot.phase, InteractionPhase::Idle);
}

#[tokio::test]
async fn rewind_is_unavailable_while_committing() {
    let client = GatedClient::records(candidates(&["a", "b", "c"]));
    let orchestrator = loaded(client.clone(), test_config()).await;

    let first = orchestrator
        .submit_decision(DecisionKind::Pass)
        .into_pending()
        .expect("pass should be accepted");
    client.release_one();
    first.settle().await.expect("pass should commit");
    assert!(orchestrator.can_rewind());

    let second = orchestrator
        .submit_decision(DecisionKind::Pass)
        .into_pending()
        .expect("second pass should be accepted");
    assert!(!orchestrator.can_rewind());
    assert!(matches!(
        orchestrator.request_rewind(),
        RewindResponse::Ignored(IgnoreReason::Busy)
    ));

    client.release_one();
    second.settle().await.expect("second pass should commit");
    let slot_candidate = orchestrator
        .request_rewind()
        .into_pending()
        .expect("rewind should be accepted")
        .settle()
        .await
        .expect("rewind should apply");
    assert_eq!(slot_candidate.as_str(), "b");
}

#[tokio::test]
async fn failed_decision_keeps_previous_pass_rewindable() {
    let client = Arc::new(
        MemoryDecisionClient::new(candidates(&["a", "b"])).with_failing_record("b", u32::MAX),
    );
    let orchestrator = loaded(client, test_config()).await;

    pass_current(&orchestrator).await;
    let error = orchestrator
        .submit_decision(DecisionKind::Like)
        .into_pending()
        .expect("like should be accepted")
        .settle()
        .await
        .expect_err("like on b never records");
    assert!(matches!(error, SwipeError::DecisionRecordFailed { .. }));

    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.cursor, 1);
    assert_eq!(ids(&snapshot.visible), vec!["b"]);
    assert!(orchestrator.can_rewind());

    let restored = orchestrator
        .request_rewind()
        .into_pending()
        .expect("rewind should be accepted")
        .settle()
        .await
        .expect("rewind should apply");
    assert_eq!(restored, CandidateId::from("a"));
    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.cursor, 0);
    assert_eq!(ids(&snapshot.visible), vec!["a", "b"]);
}

#[tokio::test]
async fn rewind_landing_after_reset_is_reported_without_touching_new_deck() {
    let client = GatedClient::deletes(candidates(&["a", "b"]));
    let orchestrator = loaded(client.clone(), test_config()).await;
    pass_current(&orchestrator).await;

    let pending = orchestrator
        .request_rewind()
        .into_pending()
        .expect("rewind should be accepted");
    orchestrator.reset();
    orchestrator
        .load_more()
        .await
        .expect("reload should succeed");
    let mut rx = orchestrator.subscribe();

    client.release_one();
    let restored = tokio::time::timeout(WAIT, pending.settle())
        .await
        .expect("rewind should settle")
        .expect("backend delete succeeded");
    assert_eq!(restored, CandidateId::from("a"));
    assert!(client.inner.recorded().is_empty());

    let events = drain(&mut rx);
    assert_eq!(topics(&events), vec!["rewind/applied"]);
    assert_eq!(
        events[0].event,
        DeckEvent::RewindApplied {
            candidate_id: CandidateId::from("a")
        }
    );
    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.cursor, 0);
    assert_eq!(ids(&snapshot.visible), vec!["b"]);
    assert!(!snapshot.can_rewind);
    assert_eq!(snapshot.phase, InteractionPhase::Idle);
}
