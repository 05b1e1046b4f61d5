use crate::TestGame;

use mathbrawl::model::client_message::ClientMessage;
use mathbrawl::model::run_state::Phase;
use mathbrawl::model::server_message::Outcome;

#[tokio::test(start_paused = true)]
async fn pause_stops_ticks_and_resume_continues_from_where_it_left_off() {
    let mut game = TestGame::start();
    let _ = game.start_run().await;

    let remaining = game.expect_tick().await;
    assert_eq!(remaining, 14);

    game.send(ClientMessage::Pause);
    let tip = game.expect_paused().await;
    assert!(!tip.is_empty());
    let snapshot = game.expect_snapshot().await;
    assert_eq!(snapshot.phase, Phase::Paused);
    assert_eq!(snapshot.time_remaining, 14);

    // No ticks are delivered while paused, and none are owed afterwards.
    game.expect_silence().await;

    game.send(ClientMessage::Resume);
    game.expect_resumed().await;
    let snapshot = game.expect_snapshot().await;
    assert_eq!(snapshot.phase, Phase::AwaitingAnswer);
    assert_eq!(snapshot.time_remaining, 14);

    let remaining = game.expect_tick().await;
    assert_eq!(remaining, 13);
}

#[tokio::test(start_paused = true)]
async fn submissions_are_dropped_while_paused() {
    let mut game = TestGame::start();
    let (prompt, _) = game.start_run().await;

    game.send(ClientMessage::Pause);
    game.expect_paused().await;
    let _ = game.expect_snapshot().await;

    // Answering while paused does nothing at all.
    game.submit(game.correct_answer(&prompt));
    game.expect_silence().await;

    game.send(ClientMessage::Resume);
    game.expect_resumed().await;
    let _ = game.expect_snapshot().await;

    // The question is still live and can be answered now.
    game.submit(game.correct_answer(&prompt));
    let (outcome, _, _, _) = game.expect_resolution().await;
    assert_eq!(outcome, Outcome::Correct);
}

#[tokio::test(start_paused = true)]
async fn pause_is_ignored_outside_the_question_loop() {
    let mut game = TestGame::start();

    // Nothing to pause in the menu.
    game.send(ClientMessage::Pause);
    game.expect_silence().await;

    // A run still starts normally afterwards.
    let _ = game.start_run().await;
}

#[tokio::test(start_paused = true)]
async fn resume_is_ignored_when_not_paused() {
    let mut game = TestGame::start();
    let _ = game.start_run().await;

    game.send(ClientMessage::Resume);
    // The countdown keeps running untouched.
    let remaining = game.expect_tick().await;
    assert_eq!(remaining, 14);
}
