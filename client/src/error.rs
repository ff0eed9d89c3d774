use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not connected to a room")]
    NotConnected,
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("unsupported url scheme `{0}`")]
    UnsupportedScheme(String),
    #[error("url `{0}` cannot carry a path")]
    NotABase(String),
    #[error("room service: {0}")]
    Http(#[from] reqwest::Error),
    #[error("room service returned no room id")]
    MissingRoomId,
}

pub type Result<T> = std::result::Result<T, ClientError>;
