//! Role flows and terminal front end for the Bingo/Raffle game client.

pub mod board;
pub mod config;
pub mod error;
pub mod host;
pub mod player;
pub mod telemetry;
pub mod terminal;
