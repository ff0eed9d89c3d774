use url::Url;

use crate::error::{ClientError, Result};
use crate::view::Layout;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

/// Where the lobby HTTP service and the game socket live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base: Url,
    pub ws_base: Url,
    pub layout: Layout,
}

impl ClientConfig {
    /// Socket base defaults to the API host with `http`→`ws`, `https`→`wss`.
    pub fn new(api_base: &str, ws_base: Option<&str>) -> Result<Self> {
        let api_base = parse_base(api_base)?;
        let ws_base = match ws_base {
            Some(ws) => ws_from(parse_base(ws)?)?,
            None => ws_from(api_base.clone())?,
        };
        Ok(Self {
            api_base,
            ws_base,
            layout: Layout::Wide,
        })
    }

    pub fn local() -> Result<Self> {
        Self::new(DEFAULT_API_BASE, None)
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// `{ws_base}/ws/{room}/{player}`
    pub fn ws_endpoint(&self, room_id: &str, player_name: &str) -> Result<Url> {
        join_segments(&self.ws_base, &["ws", room_id, player_name])
    }

    pub fn create_room_url(&self) -> Result<Url> {
        join_segments(&self.api_base, &["room", "new"])
    }

    pub fn room_exists_url(&self, room_id: &str) -> Result<Url> {
        join_segments(&self.api_base, &["room", "exists", room_id])
    }
}

fn parse_base(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    // "localhost:8000" would otherwise parse with "localhost" as the scheme.
    if raw.contains("://") {
        Ok(Url::parse(raw)?)
    } else {
        Ok(Url::parse(&format!("http://{raw}"))?)
    }
}

fn ws_from(mut url: Url) -> Result<Url> {
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(ClientError::UnsupportedScheme(other.to_string())),
    };
    url.set_scheme(scheme)
        .map_err(|_| ClientError::UnsupportedScheme(scheme.to_string()))?;
    Ok(url)
}

fn join_segments(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ClientError::NotABase(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_socket_base_from_api() {
        let cfg = ClientConfig::new("https://games.example.org", None).unwrap();
        assert_eq!(cfg.ws_base.as_str(), "wss://games.example.org/");

        let cfg = ClientConfig::new("localhost:8000", None).unwrap();
        assert_eq!(cfg.api_base.as_str(), "http://localhost:8000/");
        assert_eq!(cfg.ws_base.as_str(), "ws://localhost:8000/");
    }

    #[test]
    fn explicit_socket_base_wins() {
        let cfg = ClientConfig::new("http://localhost:8000", Some("http://sockets:9000")).unwrap();
        assert_eq!(cfg.ws_base.as_str(), "ws://sockets:9000/");
    }

    #[test]
    fn rejects_foreign_schemes() {
        assert!(matches!(
            ClientConfig::new("ftp://example.org", None),
            Err(ClientError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn endpoints() {
        let cfg = ClientConfig::local().unwrap();
        assert_eq!(
            cfg.ws_endpoint("0420", "Alice").unwrap().as_str(),
            "ws://127.0.0.1:8000/ws/0420/Alice"
        );
        assert_eq!(
            cfg.ws_endpoint("0420", "Mary Jane").unwrap().as_str(),
            "ws://127.0.0.1:8000/ws/0420/Mary%20Jane"
        );
        assert_eq!(
            cfg.create_room_url().unwrap().as_str(),
            "http://127.0.0.1:8000/room/new"
        );
        assert_eq!(
            cfg.room_exists_url("0420").unwrap().as_str(),
            "http://127.0.0.1:8000/room/exists/0420"
        );
    }

    #[test]
    fn base_with_prefix_path() {
        let cfg = ClientConfig::new("http://host/api/", None).unwrap();
        assert_eq!(
            cfg.create_room_url().unwrap().as_str(),
            "http://host/api/room/new"
        );
    }
}
