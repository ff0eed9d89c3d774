use dongdong_protocol::RoomCreated;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// The two HTTP round-trips made before a socket is opened.
#[derive(Debug, Clone)]
pub struct LobbyClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl LobbyClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// `POST /room/new`
    pub async fn create_room(&self) -> Result<String> {
        let url = self.config.create_room_url()?;
        let created: RoomCreated = self
            .http
            .post(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if created.room_id.is_empty() {
            return Err(ClientError::MissingRoomId);
        }
        info!(room = %created.room_id, "room created");
        Ok(created.room_id)
    }

    /// `GET /room/exists/{room}`. Any non-2xx answer means the room is absent.
    pub async fn room_exists(&self, room_id: &str) -> Result<bool> {
        let url = self.config.room_exists_url(room_id)?;
        let status = self.http.get(url).send().await?.status();
        debug!(room = room_id, %status, "room probe");
        Ok(status.is_success())
    }
}
