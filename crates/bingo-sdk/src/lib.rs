//! Asynchronous client for the Bingo/Raffle game backend.
//!
//! Resolves the backend base URL, issues typed commands and queries over
//! HTTP, and runs change-detection poll loops over the board snapshot. The
//! role flows in the `bingo` app are written against the traits in [`api`]
//! so they can be driven by fakes in tests.

pub mod api;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod poller;
pub mod preferences;
pub mod transport;

pub use api::{BoardSource, HostApi, PlayerApi};
pub use client::{BingoClient, COMMAND_CONTENT_TYPE};
pub use endpoint::{BackendEndpoint, BaseUrlResolver, BaseUrlStrategy};
pub use error::ClientError;
pub use poller::{
    resolve_poll_interval, start_polling, BoardPoller, MarkerGate, PollHandle,
    DEFAULT_POLL_INTERVAL_SECS, MIN_POLL_INTERVAL_SECS,
};
pub use preferences::{
    FilePreferences, MemoryPreferences, PreferenceError, PreferenceStore, API_BASE_URL_KEY,
    BOARD_REFRESH_SEC_KEY,
};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
