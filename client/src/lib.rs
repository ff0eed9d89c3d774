//! Client side of the Dong Dong trick-taking game: keeps a mirror of the
//! server's snapshot, decides what the player may do right now, and talks to
//! the server over one WebSocket per session.

pub mod app;
pub mod config;
pub mod error;
pub mod lobby;
pub mod messages;
pub mod store;
pub mod timers;
pub mod view;
pub mod ws;

pub use app::Controller;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use lobby::LobbyClient;
pub use messages::Intent;
pub use store::{Session, StateStore};
pub use view::{Layout, View, ViewModel};
pub use ws::{ConnectionEvent, ConnectionManager, Envelope};
