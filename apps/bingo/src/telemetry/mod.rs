//! Process-wide diagnostics for the `bingo` binary.

pub mod logging;
