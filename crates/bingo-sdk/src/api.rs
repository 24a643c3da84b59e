//! Backend seams used by the role flows. [`crate::BingoClient`] implements all of
//! them; tests substitute in-memory fakes.

use async_trait::async_trait;
use bingo_proto::{
    BoardSnapshot, CardResponse, ClaimRequest, DrawResponse, GameConfig, JoinRequest,
    JoinResponse, StartResponse,
};
use serde_json::Value;

use crate::error::ClientError;

#[async_trait]
pub trait BoardSource: Send + Sync {
    async fn fetch_board(&self, game_id: &str) -> Result<BoardSnapshot, ClientError>;
}

#[async_trait]
pub trait HostApi: BoardSource {
    async fn start(&self, config: &GameConfig) -> Result<StartResponse, ClientError>;
    async fn draw(&self, game_id: &str) -> Result<DrawResponse, ClientError>;
    async fn undo(&self, game_id: &str) -> Result<Value, ClientError>;
    async fn end(&self, game_id: &str) -> Result<Value, ClientError>;
    async fn reset(&self, game_id: &str) -> Result<Value, ClientError>;
}

#[async_trait]
pub trait PlayerApi: Send + Sync {
    async fn join(&self, request: &JoinRequest) -> Result<JoinResponse, ClientError>;
    async fn fetch_card(
        &self,
        game_id: &str,
        participant_id: &str,
    ) -> Result<CardResponse, ClientError>;
    async fn claim(&self, request: &ClaimRequest) -> Result<Value, ClientError>;
}
