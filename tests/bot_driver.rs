mod common;

use std::time::Duration;

use assert_matches::assert_matches;
use common::{harness, Event};
use typestorm::bot::DeactivateReason;
use typestorm::error::BotRejected;
use typestorm::session::{CharOutcome, InputSource, Mode};
use typestorm::Transition;

#[tokio::test]
async fn bot_types_the_passage_without_mistakes() {
    for passage in ["the quick brown fox", "a", "naïve café ✓", "x y  z"] {
        let mut h = harness(passage);
        h.orch.activate_bot().await.unwrap();
        assert_eq!(h.orch.session().input_source(), InputSource::Bot);

        h.advance(Duration::from_secs(10));

        let ended = h.ended();
        assert_eq!(ended.len(), 1, "passage {passage:?}");
        assert_eq!(ended[0].mistake_count, 0);
        assert_eq!(ended[0].correct_count, h.orch.session().len());
        assert!(h
            .orch
            .session()
            .outcomes()
            .iter()
            .all(|o| *o == CharOutcome::Correct));
        assert!(!h.orch.is_bot_running());
        assert_eq!(h.orch.pending_tasks(), 0);
    }
}

#[tokio::test]
async fn bot_steps_once_per_interval() {
    let mut h = harness("abcdefghijklmnopqrst");
    h.orch.activate_bot().await.unwrap();

    h.advance(Duration::from_millis(120));
    assert_eq!(h.orch.session().cursor(), 2);

    h.advance(Duration::from_secs(2));
    let results = h.orch.results().unwrap();

    // 20 keystrokes at 50ms each
    assert_eq!(results.elapsed_seconds, 1.0);
    assert_eq!(results.net_wpm, 240);
    assert_eq!(results.accuracy_percent, 100);
}

#[tokio::test]
async fn human_keys_are_refused_while_bot_types() {
    let mut h = harness("hello");
    h.orch.activate_bot().await.unwrap();
    h.advance(Duration::from_millis(50));

    assert_eq!(h.type_str("zz"), vec![Transition::Rejected; 2]);
    assert_eq!(h.backspace(), Transition::Rejected);
    assert_eq!(h.orch.session().cursor(), 1);
    assert_eq!(h.orch.session().mistake_count(), 0);
}

#[tokio::test]
async fn activation_refused_while_human_types() {
    let mut h = harness("hello");
    h.orch.reset(false).await;
    h.type_str("h");

    assert_matches!(h.orch.activate_bot().await, Err(BotRejected::SessionActive));
    assert_eq!(h.orch.session().cursor(), 1);
    assert_eq!(h.orch.session().input_source(), InputSource::Human);
}

#[tokio::test]
async fn activation_refused_during_countdown() {
    let mut h = harness("hello");
    h.orch.reset(true).await;

    assert_matches!(
        h.orch.activate_bot().await,
        Err(BotRejected::CountdownInProgress)
    );
    assert!(h.orch.is_countdown_running());
}

#[tokio::test]
async fn second_activation_is_refused() {
    let mut h = harness("hello");
    h.orch.activate_bot().await.unwrap();

    assert_matches!(
        h.orch.activate_bot().await,
        Err(BotRejected::AlreadyRunning)
    );
}

#[tokio::test]
async fn activation_allowed_after_a_finished_session() {
    let mut h = harness("ab");
    h.orch.reset(false).await;
    h.type_str("ab");
    assert_eq!(h.orch.session().mode(), Mode::Ended);

    h.orch.activate_bot().await.unwrap();
    assert_eq!(h.orch.session().mode(), Mode::Active);
    assert_eq!(h.orch.session().cursor(), 0);
}

#[tokio::test]
async fn stopping_hands_the_session_back() {
    let mut h = harness("hello");
    h.orch.activate_bot().await.unwrap();
    h.advance(Duration::from_millis(150));
    assert_eq!(h.orch.session().cursor(), 3);
    h.clear_events();

    assert!(h.orch.deactivate_bot(DeactivateReason::Stopped));
    assert!(!h.orch.deactivate_bot(DeactivateReason::Stopped));
    assert_eq!(h.orch.session().input_source(), InputSource::Human);
    assert!(h
        .events
        .borrow()
        .contains(&Event::HumanInput(true)));

    // no stray bot step after the stop
    h.advance(Duration::from_secs(1));
    assert_eq!(h.orch.session().cursor(), 3);

    assert_eq!(h.type_str("lo").last(), Some(&Transition::Completed));
    assert_eq!(h.ended().len(), 1);
}

#[tokio::test]
async fn reset_cancels_a_running_bot() {
    let mut h = harness("hello");
    h.orch.activate_bot().await.unwrap();
    h.advance(Duration::from_millis(100));

    h.orch.reset(false).await;
    assert!(!h.orch.is_bot_running());
    assert_eq!(h.orch.pending_tasks(), 0);
    assert_eq!(h.orch.session().input_source(), InputSource::Human);

    h.advance(Duration::from_secs(1));
    assert_eq!(h.orch.session().cursor(), 0);
    assert_eq!(h.orch.session().mode(), Mode::Idle);
}

#[tokio::test]
async fn end_stops_the_bot_and_reports_once() {
    let mut h = harness("hello world");
    h.orch.activate_bot().await.unwrap();
    h.advance(Duration::from_millis(200));

    assert!(h.orch.end());
    assert!(!h.orch.is_bot_running());
    assert!(!h.orch.end());

    h.advance(Duration::from_secs(2));
    assert_eq!(h.ended().len(), 1);
    assert_eq!(h.ended()[0].typed_count, 4);
}
