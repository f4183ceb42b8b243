//! End-to-end session runs against a mock iBroadcast server.

use ibcast_client::{ClientConfig, ClientError, IbcastClient, Session, SessionState};
use ibcast_core::{MatchPolicy, PlaylistId};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_PATH: &str = "/s/JSON/status";

async fn mock_service() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(body_partial_json(json!({ "mode": "status", "email_address": "me@example.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": { "id": 42, "token": "tok" }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(body_partial_json(json!({ "mode": "library", "token": "tok" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": true,
            "library": {
                "tracks": {
                    "map": { "track": 0, "title": 2, "album_id": 5, "path": 12 },
                    "1": [1, 0, "A", 0, 0, 0, 0, 0, 0, 0, 0, 0, "Music/Rock"],
                    "2": [2, 0, "B", 0, 0, 0, 0, 0, 0, 0, 0, 0, "Music/Rock/Live"],
                    "3": [1, 0, "C", 0, 0, 0, 0, 0, 0, 0, 0, 0, "Music/Jazz"],
                    "4": [1, 0, "X", 0, 0, 50, 0, 0, 0, 0, 0, 0, "Comp/One"],
                    "5": [2, 0, "Y", 0, 0, 50, 0, 0, 0, 0, 0, 0, "Comp/One"],
                    "6": [1, 0, "Z", 0, 0, 60, 0, 0, 0, 0, 0, 0, "Comp/Two"]
                },
                "albums": {
                    "map": { "name": 0, "tracks": 1 },
                    "50": ["Sampler Vol.1", [4, 5]],
                    "60": ["Best Of", [6]]
                }
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(body_partial_json(json!({ "mode": "logout" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": true })))
        .mount(&server)
        .await;

    server
}

fn session(server: &MockServer) -> Session<IbcastClient> {
    let config = ClientConfig::new(
        format!("{}{}", server.uri(), API_PATH),
        format!("{}/upload", server.uri()),
    );
    Session::new(IbcastClient::new(config).unwrap(), MatchPolicy::default())
}

#[tokio::test]
async fn test_folder_and_album_selection_become_one_playlist() {
    let server = mock_service().await;

    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(body_partial_json(json!({
            "mode": "createplaylist",
            "name": "Mixed",
            "make_public": true,
            "tracks": ["1", "2", "4", "5"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": true,
            "playlist_id": 900
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session(&server);
    session.login("me@example.com", "secret").await.unwrap();

    let snapshot = session.load_library().await.unwrap();
    assert_eq!(snapshot.track_count(), 6);
    assert_eq!(snapshot.album_count(), 2);

    assert_eq!(session.select_folder("Music/Rock").unwrap(), 2);
    assert_eq!(session.select_folder("Music/Ro").unwrap(), 0);
    assert_eq!(session.select_albums("Sampler*").unwrap(), 2);
    assert_eq!(session.select_albums("Sampler*").unwrap(), 0);

    let id = session.submit("Mixed", "", true).await.unwrap();
    assert_eq!(id, PlaylistId::new("900"));
    assert_eq!(session.state(), SessionState::Submitted);

    session.logout().await.unwrap();
    assert!(!session.service().is_authenticated().await);
}

#[tokio::test]
async fn test_nothing_matched_sends_no_playlist() {
    let server = mock_service().await;

    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(body_partial_json(json!({ "mode": "createplaylist" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": true })))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = session(&server);
    session.login("me@example.com", "secret").await.unwrap();
    session.load_library().await.unwrap();
    session.select_albums("Greatest*").unwrap();

    let err = session.submit("Empty", "", false).await.unwrap_err();
    assert!(matches!(err, ClientError::EmptySelection));
    assert_eq!(session.state(), SessionState::Selecting);

    session.logout().await.unwrap();
    assert_eq!(session.state(), SessionState::Aborted);
}
