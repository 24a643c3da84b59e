use std::sync::Arc;

use async_trait::async_trait;
use bingo_proto::{
    BoardSnapshot, CardResponse, ClaimRequest, DrawResponse, GameConfig, GameRef, JoinRequest,
    JoinResponse, StartResponse,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::api::{BoardSource, HostApi, PlayerApi};
use crate::endpoint::BackendEndpoint;
use crate::error::ClientError;
use crate::transport::{HttpTransport, ReqwestTransport};

/// Content type sent with every command. The backend reads the raw body and
/// does not accept a JSON content type, so this must not change.
pub const COMMAND_CONTENT_TYPE: &str = "text/plain;charset=utf-8";

pub const START_PATH: &str = "/api/start";
pub const DRAW_PATH: &str = "/api/draw";
pub const UNDO_PATH: &str = "/api/undo";
pub const END_PATH: &str = "/api/end";
pub const RESET_PATH: &str = "/api/reset";
pub const JOIN_PATH: &str = "/api/join";
pub const CARD_PATH: &str = "/api/card";
pub const CLAIM_PATH: &str = "/api/claim";
pub const BOARD_PATH: &str = "/api/board";

/// Typed command/query client for the game backend.
#[derive(Clone)]
pub struct BingoClient {
    endpoint: BackendEndpoint,
    transport: Arc<dyn HttpTransport>,
}

impl BingoClient {
    pub fn new(endpoint: BackendEndpoint) -> Result<Self, ClientError> {
        Ok(Self::with_transport(
            endpoint,
            Arc::new(ReqwestTransport::new()?),
        ))
    }

    pub fn with_transport(endpoint: BackendEndpoint, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            endpoint,
            transport,
        }
    }

    pub fn endpoint(&self) -> &BackendEndpoint {
        &self.endpoint
    }

    /// GET `base_url + path` and decode the JSON body.
    pub async fn query(&self, path: &str) -> Result<Value, ClientError> {
        let base = self.endpoint.ensure_configured()?;
        let url = format!("{base}{path}");
        debug!(target: "bingo::client", %url, "query");
        let response = self.transport.get(&url).await?;
        if !response.is_success() {
            return Err(ClientError::Http {
                status: response.status,
                body: None,
            });
        }
        let body = response
            .body
            .ok_or_else(|| ClientError::Decode("response body could not be read".into()))?;
        serde_json::from_str(&body).map_err(|err| ClientError::Decode(err.to_string()))
    }

    /// POST `payload` (or `{}` when omitted) to `base_url + path`.
    ///
    /// A success response whose body is empty or not JSON yields an empty object.
    pub async fn command(&self, path: &str, payload: Option<Value>) -> Result<Value, ClientError> {
        let base = self.endpoint.ensure_configured()?;
        let url = format!("{base}{path}");
        let payload = payload.unwrap_or_else(|| Value::Object(Map::new()));
        let body =
            serde_json::to_string(&payload).map_err(|err| ClientError::Encode(err.to_string()))?;
        debug!(target: "bingo::client", %url, "command");
        let response = self
            .transport
            .post(&url, COMMAND_CONTENT_TYPE, body)
            .await?;
        if !response.is_success() {
            return Err(ClientError::Http {
                status: response.status,
                body: response.body,
            });
        }
        match response
            .body
            .as_deref()
            .map(serde_json::from_str::<Value>)
        {
            Some(Ok(value)) => Ok(value),
            _ => {
                debug!(
                    target: "bingo::client",
                    %url,
                    "command succeeded without a json body"
                );
                Ok(Value::Object(Map::new()))
            }
        }
    }

    async fn command_with<P: Serialize>(
        &self,
        path: &str,
        payload: &P,
    ) -> Result<Value, ClientError> {
        let payload =
            serde_json::to_value(payload).map_err(|err| ClientError::Encode(err.to_string()))?;
        self.command(path, Some(payload)).await
    }

    pub async fn start(&self, config: &GameConfig) -> Result<StartResponse, ClientError> {
        let value = self.command_with(START_PATH, config).await?;
        decode_reply(value, "start")
    }

    pub async fn draw(&self, game_id: &str) -> Result<DrawResponse, ClientError> {
        let value = self.command_with(DRAW_PATH, &GameRef::new(game_id)).await?;
        decode_reply(value, "draw")
    }

    pub async fn undo(&self, game_id: &str) -> Result<Value, ClientError> {
        self.command_with(UNDO_PATH, &GameRef::new(game_id)).await
    }

    pub async fn end(&self, game_id: &str) -> Result<Value, ClientError> {
        self.command_with(END_PATH, &GameRef::new(game_id)).await
    }

    pub async fn reset(&self, game_id: &str) -> Result<Value, ClientError> {
        self.command_with(RESET_PATH, &GameRef::new(game_id)).await
    }

    pub async fn join(&self, request: &JoinRequest) -> Result<JoinResponse, ClientError> {
        let value = self.command_with(JOIN_PATH, request).await?;
        decode_reply(value, "join")
    }

    pub async fn fetch_card(
        &self,
        game_id: &str,
        participant_id: &str,
    ) -> Result<CardResponse, ClientError> {
        let path = format!(
            "{CARD_PATH}?gameId={}&participantId={}",
            urlencoding::encode(game_id),
            urlencoding::encode(participant_id)
        );
        let value = self.query(&path).await?;
        decode_query(value)
    }

    pub async fn claim(&self, request: &ClaimRequest) -> Result<Value, ClientError> {
        self.command_with(CLAIM_PATH, request).await
    }

    pub async fn fetch_board(&self, game_id: &str) -> Result<BoardSnapshot, ClientError> {
        let path = format!("{BOARD_PATH}?gameId={}", urlencoding::encode(game_id));
        let value = self.query(&path).await?;
        decode_query(value)
    }
}

fn decode_reply<T: DeserializeOwned>(value: Value, operation: &str) -> Result<T, ClientError> {
    serde_json::from_value(value)
        .map_err(|err| ClientError::InvalidResponse(format!("{operation} reply: {err}")))
}

fn decode_query<T: DeserializeOwned>(value: Value) -> Result<T, ClientError> {
    serde_json::from_value(value).map_err(|err| ClientError::Decode(err.to_string()))
}

#[async_trait]
impl BoardSource for BingoClient {
    async fn fetch_board(&self, game_id: &str) -> Result<BoardSnapshot, ClientError> {
        BingoClient::fetch_board(self, game_id).await
    }
}

#[async_trait]
impl HostApi for BingoClient {
    async fn start(&self, config: &GameConfig) -> Result<StartResponse, ClientError> {
        BingoClient::start(self, config).await
    }

    async fn draw(&self, game_id: &str) -> Result<DrawResponse, ClientError> {
        BingoClient::draw(self, game_id).await
    }

    async fn undo(&self, game_id: &str) -> Result<Value, ClientError> {
        BingoClient::undo(self, game_id).await
    }

    async fn end(&self, game_id: &str) -> Result<Value, ClientError> {
        BingoClient::end(self, game_id).await
    }

    async fn reset(&self, game_id: &str) -> Result<Value, ClientError> {
        BingoClient::reset(self, game_id).await
    }
}

#[async_trait]
impl PlayerApi for BingoClient {
    async fn join(&self, request: &JoinRequest) -> Result<JoinResponse, ClientError> {
        BingoClient::join(self, request).await
    }

    async fn fetch_card(
        &self,
        game_id: &str,
        participant_id: &str,
    ) -> Result<CardResponse, ClientError> {
        BingoClient::fetch_card(self, game_id, participant_id).await
    }

    async fn claim(&self, request: &ClaimRequest) -> Result<Value, ClientError> {
        BingoClient::claim(self, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpResponse;
    use serde_json::json;
    use std::collections::VecDeque;
    use tokio::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Recorded {
        Get {
            url: String,
        },
        Post {
            url: String,
            content_type: String,
            body: String,
        },
    }

    #[derive(Default)]
    struct MockTransport {
        replies: Mutex<VecDeque<Result<HttpResponse, ClientError>>>,
        seen: Mutex<Vec<Recorded>>,
    }

    impl MockTransport {
        fn replying(replies: Vec<Result<HttpResponse, ClientError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
            })
        }

        async fn seen(&self) -> Vec<Recorded> {
            self.seen.lock().await.clone()
        }

        async fn next(&self) -> Result<HttpResponse, ClientError> {
            self.replies
                .lock()
                .await
                .pop_front()
                .unwrap_or_else(|| Ok(HttpResponse::new(200, "{}")))
        }
    }

    #[async_trait]
    impl HttpTransport for MockTransport {
        async fn get(&self, url: &str) -> Result<HttpResponse, ClientError> {
            self.seen.lock().await.push(Recorded::Get { url: url.into() });
            self.next().await
        }

        async fn post(
            &self,
            url: &str,
            content_type: &str,
            body: String,
        ) -> Result<HttpResponse, ClientError> {
            self.seen.lock().await.push(Recorded::Post {
                url: url.into(),
                content_type: content_type.into(),
                body,
            });
            self.next().await
        }
    }

    const BASE: &str = "https://script.example.com/macros/s/abc/exec";

    fn client(transport: Arc<MockTransport>) -> BingoClient {
        BingoClient::with_transport(BackendEndpoint::new(BASE), transport)
    }

    #[test_timeout::tokio_timeout_test]
    async fn unconfigured_endpoint_fails_before_any_request() {
        let transport = MockTransport::replying(vec![]);
        let client = BingoClient::with_transport(BackendEndpoint::unset(), transport.clone());

        assert!(matches!(
            client.query("/api/board").await,
            Err(ClientError::Config)
        ));
        assert!(matches!(
            client.command("/api/draw", None).await,
            Err(ClientError::Config)
        ));
        assert!(transport.seen().await.is_empty());
    }

    #[test_timeout::tokio_timeout_test]
    async fn query_prefixes_base_url_once() {
        let transport =
            MockTransport::replying(vec![Ok(HttpResponse::new(200, r#"{"data":"test"}"#))]);
        let value = client(transport.clone()).query("/test").await.unwrap();

        assert_eq!(value, json!({"data": "test"}));
        assert_eq!(
            transport.seen().await,
            vec![Recorded::Get {
                url: format!("{BASE}/test")
            }]
        );
    }

    #[test_timeout::tokio_timeout_test]
    async fn query_failure_carries_status_only() {
        let transport = MockTransport::replying(vec![Ok(HttpResponse::new(404, "missing"))]);
        let err = client(transport).query("/test").await.unwrap_err();
        assert!(matches!(err, ClientError::Http { status: 404, body: None }));
        assert_eq!(err.to_string(), "HTTP 404");
    }

    #[test_timeout::tokio_timeout_test]
    async fn query_with_invalid_json_is_a_decode_error() {
        let transport = MockTransport::replying(vec![Ok(HttpResponse::new(200, "<html>"))]);
        let err = client(transport).query("/test").await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test_timeout::tokio_timeout_test]
    async fn command_sends_exact_payload_as_plain_text() {
        let transport =
            MockTransport::replying(vec![Ok(HttpResponse::new(200, r#"{"success":true}"#))]);
        let payload = json!({"name": "test", "nested": {"n": [1, 2]}});
        let value = client(transport.clone())
            .command("/test", Some(payload.clone()))
            .await
            .unwrap();

        assert_eq!(value, json!({"success": true}));
        assert_eq!(
            transport.seen().await,
            vec![Recorded::Post {
                url: format!("{BASE}/test"),
                content_type: "text/plain;charset=utf-8".into(),
                body: serde_json::to_string(&payload).unwrap(),
            }]
        );
    }

    #[test_timeout::tokio_timeout_test]
    async fn omitted_payload_is_an_empty_object() {
        let transport = MockTransport::replying(vec![]);
        client(transport.clone())
            .command("/test", None)
            .await
            .unwrap();
        match &transport.seen().await[0] {
            Recorded::Post { body, .. } => assert_eq!(body, "{}"),
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test_timeout::tokio_timeout_test]
    async fn command_failure_includes_body_text() {
        let transport =
            MockTransport::replying(vec![Ok(HttpResponse::new(500, "Internal Server Error"))]);
        let err = client(transport)
            .command("/test", Some(json!({})))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "HTTP 500\nInternal Server Error");
    }

    #[test_timeout::tokio_timeout_test]
    async fn command_failure_with_unreadable_body_reports_status() {
        let transport = MockTransport::replying(vec![Ok(HttpResponse {
            status: 502,
            body: None,
        })]);
        let err = client(transport)
            .command("/test", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Http { status: 502, body: None }));
        assert_eq!(err.to_string(), "HTTP 502");
    }

    #[test_timeout::tokio_timeout_test]
    async fn command_success_with_unparsable_body_is_empty_object() {
        let transport = MockTransport::replying(vec![
            Ok(HttpResponse::new(200, "Invalid JSON")),
            Ok(HttpResponse::new(200, "")),
            Ok(HttpResponse {
                status: 204,
                body: None,
            }),
        ]);
        let client = client(transport);
        for _ in 0..3 {
            let value = client.command("/test", None).await.unwrap();
            assert_eq!(value, json!({}));
        }
    }

    #[test_timeout::tokio_timeout_test]
    async fn network_failures_propagate() {
        let transport =
            MockTransport::replying(vec![Err(ClientError::Network("connection refused".into()))]);
        let err = client(transport).query("/api/board").await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }

    #[test_timeout::tokio_timeout_test]
    async fn host_bindings_use_fixed_paths_and_game_ref_payload() {
        let transport = MockTransport::replying(vec![]);
        let client = client(transport.clone());
        client.undo("123").await.unwrap();
        client.end("123").await.unwrap();
        client.reset("123").await.unwrap();

        let posts: Vec<(String, String)> = transport
            .seen()
            .await
            .into_iter()
            .map(|recorded| match recorded {
                Recorded::Post { url, body, .. } => (url, body),
                other => panic!("unexpected request {other:?}"),
            })
            .collect();
        assert_eq!(
            posts,
            vec![
                (format!("{BASE}/api/undo"), r#"{"gameId":"123"}"#.to_string()),
                (format!("{BASE}/api/end"), r#"{"gameId":"123"}"#.to_string()),
                (format!("{BASE}/api/reset"), r#"{"gameId":"123"}"#.to_string()),
            ]
        );
    }

    #[test_timeout::tokio_timeout_test]
    async fn start_requires_game_id_in_reply() {
        let transport = MockTransport::replying(vec![
            Ok(HttpResponse::new(200, r#"{"gameId":"G_1"}"#)),
            Ok(HttpResponse::new(200, "")),
        ]);
        let client = client(transport);
        let started = client.start(&GameConfig::default()).await.unwrap();
        assert_eq!(started.game_id.as_deref(), Some("G_1"));

        let empty = client.start(&GameConfig::default()).await.unwrap();
        assert_eq!(empty.game_id, None);
    }

    #[test_timeout::tokio_timeout_test]
    async fn draw_decodes_value_and_called_list() {
        let transport = MockTransport::replying(vec![Ok(HttpResponse::new(
            200,
            r#"{"value":42,"called":[7,42]}"#,
        ))]);
        let drawn = client(transport).draw("G_1").await.unwrap();
        assert_eq!(drawn.value, Some(42));
        assert_eq!(drawn.called, Some(vec![7, 42]));
    }

    #[test_timeout::tokio_timeout_test]
    async fn query_parameters_are_percent_encoded() {
        let transport = MockTransport::replying(vec![
            Ok(HttpResponse::new(200, "[[1]]")),
            Ok(HttpResponse::new(200, "{}")),
        ]);
        let client = client(transport.clone());
        client.fetch_card("game 123", "player@456").await.unwrap();
        client.fetch_board("game 123").await.unwrap();

        assert_eq!(
            transport.seen().await,
            vec![
                Recorded::Get {
                    url: format!(
                        "{BASE}/api/card?gameId=game%20123&participantId=player%40456"
                    )
                },
                Recorded::Get {
                    url: format!("{BASE}/api/board?gameId=game%20123")
                },
            ]
        );
    }

    #[test_timeout::tokio_timeout_test]
    async fn board_with_wrong_shape_is_a_decode_error() {
        let transport = MockTransport::replying(vec![Ok(HttpResponse::new(200, r#""not a board""#))]);
        let err = client(transport).fetch_board("G_1").await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }
}
