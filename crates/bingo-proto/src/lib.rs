//! Wire entities exchanged with the Bingo/Raffle game backend.
//!
//! Field names mirror the backend's camelCase JSON. The backend is authoritative
//! for every value here; decoding is deliberately forgiving where its output is
//! known to vary (numbers sent as strings, `""` standing in for "no value").

mod board;
mod game;
mod lenient;
mod session;

pub use board::{BoardSnapshot, GameDescriptor, Winner, DEFAULT_NUMBER_MAX, DEFAULT_NUMBER_MIN};
pub use game::{GameConfig, GameType, WinPattern};
pub use session::{
    CardCell, CardPayload, CardResponse, ClaimRequest, DrawResponse, GameRef, JoinRequest,
    JoinResponse, StartResponse,
};
