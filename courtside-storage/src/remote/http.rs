//! REST client for the remote player service.
//!
//! Endpoints, relative to the configured base URL:
//!
//! | operation   | request                 |
//! |-------------|-------------------------|
//! | `get_all`   | `GET /players`          |
//! | `get_by_id` | `GET /players/{id}`     |
//! | `save`      | `POST /players`         |
//! | `update`    | `PUT /players/{id}`     |
//! | `delete`    | `DELETE /players/{id}`  |

use super::{RemoteResult, RemoteStore, RemoteStoreError};
use async_trait::async_trait;
use chrono::Utc;
use courtside_core::{Player, PlayerId, RemoteConfig, NEW_ID};
use reqwest::StatusCode;

const PLAYERS_PATH: &str = "/players";

/// [`RemoteStore`] over HTTP/JSON.
///
/// Holds one `reqwest::Client` built from [`RemoteConfig`]; clone the store
/// to share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRemoteStore {
    pub fn new(config: &RemoteConfig) -> RemoteResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Self::with_client(client, &config.base_url)
    }

    /// Use a pre-built client, e.g. one shared with other services.
    pub fn with_client(client: reqwest::Client, base_url: &str) -> RemoteResult<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(RemoteStoreError::Config("base_url must not be empty".to_string()));
        }
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}{}", self.base_url, PLAYERS_PATH)
    }

    fn item_url(&self, id: PlayerId) -> String {
        format!("{}{}/{}", self.base_url, PLAYERS_PATH, id)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> RemoteResult<T> {
        let response = Self::check_status(response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn check_status(response: reqwest::Response) -> RemoteResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await?;
            Err(RemoteStoreError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn get_all(&self) -> RemoteResult<Vec<Player>> {
        let response = self.client.get(self.collection_url()).send().await?;
        let players: Vec<Player> = Self::parse_response(response).await?;
        tracing::debug!(count = players.len(), "Fetched players from remote");
        Ok(players)
    }

    async fn get_by_id(&self, id: PlayerId) -> RemoteResult<Option<Player>> {
        let response = self.client.get(self.item_url(id)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(player_id = id, "Remote has no such player");
            return Ok(None);
        }
        Self::parse_response(response).await.map(Some)
    }

    async fn save(&self, player: &Player) -> RemoteResult<Player> {
        let now = Utc::now();
        let mut body = player.clone().with_id(NEW_ID);
        body.created_at = now;
        body.updated_at = now;

        let response = self
            .client
            .post(self.collection_url())
            .json(&body)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn update(&self, id: PlayerId, player: &Player) -> RemoteResult<Player> {
        let mut body = player.clone().with_id(id);
        body.touch();

        let response = self
            .client
            .put(self.item_url(id))
            .json(&body)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn delete(&self, id: PlayerId) -> RemoteResult<()> {
        let response = self.client.delete(self.item_url(id)).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }
}
