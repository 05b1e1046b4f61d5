use serde::{Deserialize, Serialize};

/// Intents the presentation layer can send into a game session. Anything
/// arriving in the wrong phase is dropped by the controller, never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum ClientMessage {
    /// Begin a fresh run. Legal from the menu and from the end screen.
    StartRun,

    /// Answer the active question with one of its options.
    #[serde(rename_all = "camelCase")]
    SubmitAnswer { option: i64 },

    Pause,
    Resume,

    /// Back to the menu from the end screen.
    GoHome,
}
