//! Quiz-battle game backend: the player fights a boss by answering
//! arithmetic questions against a countdown. The game state machine lives in
//! [`controller`]; [`server`] exposes it to clients over WebSockets.

pub mod bank;
pub mod combat;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod sample;
pub mod score;
pub mod server;
pub mod source;
pub mod stats;
pub mod timer;
