use crate::TestGame;

use mathbrawl::model::client_message::ClientMessage;
use mathbrawl::model::run_state::Phase;
use mathbrawl::model::server_message::Outcome;

#[tokio::test(start_paused = true)]
async fn full_run_to_boss_defeat() {
    let mut game = TestGame::start();
    let (mut prompt, _) = game.start_run().await;

    // Four hits of 25 bring the boss from 100 to 0. Answers are submitted
    // instantly, so every one earns the rapid bonus; the third completes a
    // streak.
    let mut expected_boss_hp = 100;
    for round in 1..=4u32 {
        let ((outcome, points, rapid, streak), snapshot) = game.answer_correctly(&prompt).await;
        expected_boss_hp -= 25;

        assert_eq!(outcome, Outcome::Correct);
        assert!(rapid, "instant answer should be rapid on round {round}");
        assert_eq!(streak, round % 3 == 0);
        assert_eq!(points, if round % 3 == 0 { 17 } else { 12 });
        assert_eq!(snapshot.boss_hp, expected_boss_hp);
        assert_eq!(snapshot.phase, Phase::Resolving);

        if round < 4 {
            let (next_prompt, _) = game.expect_question().await;
            let snapshot = game.expect_snapshot().await;
            assert_eq!(snapshot.phase, Phase::AwaitingAnswer);
            prompt = next_prompt;
        }
    }

    let report = game.expect_run_ended().await;
    assert!(report.completed);
    // 12 + 12 + 17 + 12 points, plus the completion bonus, once.
    assert_eq!(report.final_score, 63);
    assert_eq!(report.normalized_score, 100);
    assert_eq!(report.questions_presented, 4);
    assert_eq!(report.questions_correct, 4);
    assert_eq!(report.questions_incorrect, 0);

    let snapshot = game.expect_snapshot().await;
    assert_eq!(snapshot.phase, Phase::Ended);

    let stats = game.wait_for_stats().await;
    assert_eq!(stats.normalized_score, 100);
    assert_eq!(stats.time_spent_seconds, report.time_spent_seconds);
}

#[tokio::test(start_paused = true)]
async fn restart_begins_a_fresh_run() {
    let mut game = TestGame::new(
        mathbrawl::config::GameConfig {
            player_attack: 100,
            ..Default::default()
        },
        crate::question_set(),
    );

    let (prompt, _) = game.start_run().await;
    game.answer_correctly(&prompt).await;
    let report = game.expect_run_ended().await;
    assert!(report.completed);
    let _ = game.expect_snapshot().await;

    // A fresh run starts from zero: full pools, empty score.
    let (_, _) = game.start_run().await;
    let game_snapshot = {
        game.send(ClientMessage::Pause);
        game.expect_paused().await;
        game.expect_snapshot().await
    };
    assert_eq!(game_snapshot.score, 0);
    assert_eq!(game_snapshot.boss_hp, 100);
    assert_eq!(game_snapshot.questions_presented, 1);
}

#[tokio::test(start_paused = true)]
async fn go_home_returns_to_menu() {
    let mut game = TestGame::new(
        mathbrawl::config::GameConfig {
            player_attack: 100,
            ..Default::default()
        },
        crate::question_set(),
    );

    let (prompt, _) = game.start_run().await;
    game.answer_correctly(&prompt).await;
    game.expect_run_ended().await;
    let _ = game.expect_snapshot().await;

    game.send(ClientMessage::GoHome);
    let snapshot = game.expect_snapshot().await;
    assert_eq!(snapshot.phase, Phase::Menu);
    assert_eq!(snapshot.player_hp, 100);
    assert_eq!(snapshot.boss_hp, 100);
    assert_eq!(snapshot.score, 0);
    assert_eq!(snapshot.questions_presented, 0);
}

#[tokio::test(start_paused = true)]
async fn start_refused_when_source_has_no_questions() {
    let mut game = TestGame::with_questions(vec![]);

    game.send(ClientMessage::StartRun);
    let message = game.expect_error().await;
    assert!(
        message.contains("no questions"),
        "error should name the problem, got: {message}"
    );

    // Still in the menu: in-run intents are dropped.
    game.send(ClientMessage::Pause);
    game.submit(42);
    game.expect_silence().await;
}

#[tokio::test(start_paused = true)]
async fn start_refused_when_a_question_is_malformed() {
    let bad = mathbrawl::bank::Question {
        prompt: "2 + 2".to_string(),
        correct_answer: 4,
        options: vec![4],
    };
    let mut game = TestGame::with_questions(vec![bad]);

    game.send(ClientMessage::StartRun);
    let message = game.expect_error().await;
    assert!(
        message.contains("options"),
        "error should name the problem, got: {message}"
    );
}

#[tokio::test(start_paused = true)]
async fn start_run_is_ignored_mid_run() {
    let mut game = TestGame::start();
    let _ = game.start_run().await;

    game.send(ClientMessage::StartRun);
    // The run keeps going: the next event is still the question timer.
    let remaining = game.expect_tick().await;
    assert_eq!(remaining, 14);
}
