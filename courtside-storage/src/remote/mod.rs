//! Authoritative remote source of players.

pub mod http;

pub use http::HttpRemoteStore;

use async_trait::async_trait;
use courtside_core::{Player, PlayerId};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum RemoteStoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Unexpected response: HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Config error: {0}")]
    Config(String),
}

pub type RemoteResult<T> = Result<T, RemoteStoreError>;

/// Remote store contract.
///
/// The remote assigns ids: `save` returns the canonical copy including the
/// id it chose. `get_by_id` reports an unknown id as `Ok(None)`, never as an
/// error. Timeouts are the implementation's concern.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn get_all(&self) -> RemoteResult<Vec<Player>>;

    async fn get_by_id(&self, id: PlayerId) -> RemoteResult<Option<Player>>;

    async fn save(&self, player: &Player) -> RemoteResult<Player>;

    async fn update(&self, id: PlayerId, player: &Player) -> RemoteResult<Player>;

    async fn delete(&self, id: PlayerId) -> RemoteResult<()>;
}

#[async_trait]
impl<T: RemoteStore + ?Sized> RemoteStore for Arc<T> {
    async fn get_all(&self) -> RemoteResult<Vec<Player>> {
        (**self).get_all().await
    }

    async fn get_by_id(&self, id: PlayerId) -> RemoteResult<Option<Player>> {
        (**self).get_by_id(id).await
    }

    async fn save(&self, player: &Player) -> RemoteResult<Player> {
        (**self).save(player).await
    }

    async fn update(&self, id: PlayerId, player: &Player) -> RemoteResult<Player> {
        (**self).update(id, player).await
    }

    async fn delete(&self, id: PlayerId) -> RemoteResult<()> {
        (**self).delete(id).await
    }
}
