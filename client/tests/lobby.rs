use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use dongdong_client::{ClientConfig, ClientError, LobbyClient};
use serde_json::json;
use tokio::net::TcpListener;

async fn spawn_room_service() -> String {
    let app = Router::new()
        .route("/room/new", post(|| async { Json(json!({"room_id": "0420"})) }))
        .route(
            "/room/exists/:room_id",
            get(|Path(room_id): Path<String>| async move {
                if room_id == "0420" {
                    (StatusCode::OK, Json(json!({"exists": true})))
                } else {
                    (StatusCode::NOT_FOUND, Json(json!({"detail": "Room not found"})))
                }
            }),
        );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn creates_and_probes_rooms() {
    let base = spawn_room_service().await;
    let lobby = LobbyClient::new(ClientConfig::new(&base, None).unwrap());

    assert_eq!(lobby.create_room().await.unwrap(), "0420");
    assert!(lobby.room_exists("0420").await.unwrap());
    assert!(!lobby.room_exists("9999").await.unwrap());
}

#[tokio::test]
async fn unreachable_service_is_an_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let lobby = LobbyClient::new(ClientConfig::new(&format!("http://{addr}"), None).unwrap());
    assert!(matches!(lobby.room_exists("0420").await, Err(ClientError::Http(_))));
    assert!(matches!(lobby.create_room().await, Err(ClientError::Http(_))));
}
