pub mod app;
pub mod board_watch;
pub mod cli;
pub mod error;
pub mod host_console;
pub mod player_console;
pub mod settings;
