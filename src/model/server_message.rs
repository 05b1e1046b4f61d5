use log::{error, info};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

use crate::model::run_state::Phase;

/// How the active question was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    Correct,
    Incorrect,
    TimedOut,
}

/// Everything the presentation layer needs to draw one frame of the game.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub phase: Phase,
    pub player_hp: u32,
    pub boss_hp: u32,
    pub max_hp: u32,
    pub score: u32,
    pub time_remaining: i32,
    pub consecutive_correct: u32,
    pub questions_presented: u32,
    pub questions_correct: u32,
    pub questions_incorrect: u32,
}

/// Final summary delivered when a run reaches the end screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub completed: bool,
    pub final_score: u32,
    pub normalized_score: u32,
    pub questions_presented: u32,
    pub questions_correct: u32,
    pub questions_incorrect: u32,
    pub time_spent_seconds: u64,
}

/// Events a game session emits toward the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    Snapshot { state: StateSnapshot },

    #[serde(rename_all = "camelCase")]
    CountdownStep { label: String },

    /// A fresh question. Options arrive pre-shuffled; the correct answer is
    /// only revealed in the resolution event.
    #[serde(rename_all = "camelCase")]
    Question {
        prompt: String,
        options: Vec<i64>,
        seconds: u32,
    },

    #[serde(rename_all = "camelCase")]
    TimerTick { seconds_remaining: u32 },

    #[serde(rename_all = "camelCase")]
    Resolution {
        outcome: Outcome,
        points_earned: u32,
        rapid: bool,
        streak: bool,
        correct_answer: i64,
    },

    #[serde(rename_all = "camelCase")]
    Taunt { text: String },

    #[serde(rename_all = "camelCase")]
    Paused { tip: String },

    Resumed,

    #[serde(rename_all = "camelCase")]
    RunEnded { report: RunReport },

    /// Transient, non-fatal status line (stats upload problems and the like).
    #[serde(rename_all = "camelCase")]
    Notice { message: String },

    #[serde(rename_all = "camelCase")]
    Error { message: String },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }
}

/// Push an event to the presentation side, logging instead of failing when
/// the receiver is gone (the session is tearing down).
pub fn send_msg(tx: &UnboundedSender<ServerMessage>, msg: ServerMessage) {
    info!("Sending server message: {msg:?}");
    if let Err(e) = tx.send(msg) {
        error!("Sending server message through channel failed: {e}");
    }
}
