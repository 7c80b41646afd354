//! End-to-end tests: a real `ScreenerApp` against a `mockito` API server.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use mockito::{Matcher, Server, ServerGuard};
use screener::prelude::*;
use screener::session::{MemoryStorage, Storage, TokenStore};
use screener::transport::ReqwestTransport;

// =========================================================================
// Helpers
// =========================================================================

fn jwt(payload: &str) -> String {
    format!(
        "{}.{}.sig",
        URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(payload.as_bytes())
    )
}

fn alice_access() -> String {
    jwt(r#"{"token_type":"access","user_id":1,"username":"alice","jti":"one"}"#)
}

fn pair_body(access: &str, refresh: &str) -> String {
    serde_json::json!({ "access": access, "refresh": refresh }).to_string()
}

fn config_for(server: &ServerGuard) -> ClientConfig {
    ClientConfig {
        base_url: server.url(),
        ..ClientConfig::default()
    }
}

fn app_with(
    server: &ServerGuard,
    storage: MemoryStorage,
) -> ScreenerApp<MemoryStorage, ReqwestTransport> {
    let config = config_for(server);
    let api = ApiClient::from_config(&config).unwrap();
    ScreenerApp::builder().config(config).build_with(storage, api)
}

async fn mock_login_ok(server: &mut ServerGuard) -> mockito::Mock {
    server
        .mock("POST", "/api/token/")
        .match_body(Matcher::Json(serde_json::json!({
            "username": "alice",
            "password": "s3cret"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(pair_body(&alice_access(), "refresh-1"))
        .create_async()
        .await
}

const MARKET_BODY: &str = r#"{
    "market_breadth": {
        "is_entry": true,
        "SEFI": {"value": 42.5, "short": false, "long": true},
        "ADR": {"value": 1.1, "short": false, "long": false},
        "strategies": {"good_SEFI_oversold": true}
    },
    "entries": {
        "AAPL": {"rsi": {"status": true, "values": {"rsi": 28.1}}, "macd": {"status": true}},
        "MSFT": {"rsi": {"status": true}, "macd": {"status": false}},
        "TSLA": {"rsi": {"status": false}}
    },
    "plotting": {"SEFI": [1, 2, 3]}
}"#;

// =========================================================================
// Login / logout
// =========================================================================

#[tokio::test]
async fn test_login_success_authenticates_persists_and_goes_home() {
    let mut server = Server::new_async().await;
    let mock = mock_login_ok(&mut server).await;
    let storage = MemoryStorage::new();
    let mut app = app_with(&server, storage.clone());

    app.login("alice", "s3cret").await.unwrap();

    mock.assert_async().await;
    let snapshot = app.snapshot().await;
    assert_eq!(snapshot.state, SessionState::Authenticated);
    assert_eq!(
        snapshot.user.and_then(|u| u.username),
        Some("alice".to_string())
    );
    assert_eq!(
        TokenStore::new(storage).load(),
        Some(TokenPair::new(alice_access(), "refresh-1"))
    );
    assert_eq!(app.current_route(), Route::Landing);
    assert!(app.take_alerts().is_empty());
}

#[tokio::test]
async fn test_login_wrong_password_alerts_and_changes_nothing() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/token/")
        .with_status(401)
        .with_body(r#"{"detail":"No active account found with the given credentials"}"#)
        .create_async()
        .await;
    let storage = MemoryStorage::new();
    let mut app = app_with(&server, storage.clone());

    let err = app.login("bob", "wrong").await.unwrap_err();

    mock.assert_async().await;
    assert!(matches!(
        err,
        ScreenerError::Session(screener::session::SessionError::LoginRejected { status: 401 })
    ));
    assert_eq!(app.snapshot().await.state, SessionState::Anonymous);
    assert!(storage.is_empty());
    assert_eq!(app.take_alerts(), vec!["Something Went Wrong"]);
    assert!(app.effects().history().is_empty());
}

#[tokio::test]
async fn test_login_server_down_alerts() {
    let config = ClientConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        ..ClientConfig::default()
    };
    let api = ApiClient::from_config(&config).unwrap();
    let mut app = ScreenerApp::builder()
        .config(config)
        .build_with(MemoryStorage::new(), api);

    let result = app.login("alice", "s3cret").await;

    assert!(result.is_err());
    assert_eq!(app.take_alerts(), vec!["Something Went Wrong"]);
}

#[tokio::test]
async fn test_logout_clears_storage_and_goes_to_login() {
    let mut server = Server::new_async().await;
    mock_login_ok(&mut server).await;
    let storage = MemoryStorage::new();
    let mut app = app_with(&server, storage.clone());
    app.login("alice", "s3cret").await.unwrap();

    app.logout().await;

    assert_eq!(app.snapshot().await.state, SessionState::Anonymous);
    assert_eq!(storage.get_item("authTokens").unwrap(), None);
    assert_eq!(app.current_route(), Route::Login);
    assert!(app.market().is_none());
}

// =========================================================================
// Routing + market data
// =========================================================================

#[tokio::test]
async fn test_navigate_application_anonymous_redirects_without_fetch() {
    let mut server = Server::new_async().await;
    let market = server
        .mock("GET", "/api/market-data/general")
        .expect(0)
        .create_async()
        .await;
    let mut app = app_with(&server, MemoryStorage::new());

    let resolution = app.navigate("/application").await.unwrap();

    market.assert_async().await;
    assert!(resolution.redirected());
    assert_eq!(app.current_route(), Route::Landing);
    assert!(app.render().await.unwrap().starts_with("Portfolio Management"));
}

#[tokio::test]
async fn test_navigate_application_logged_in_fetches_with_bearer() {
    let mut server = Server::new_async().await;
    mock_login_ok(&mut server).await;
    let market = server
        .mock("GET", "/api/market-data/general")
        .match_header("authorization", format!("Bearer {}", alice_access()).as_str())
        .with_status(200)
        .with_body(MARKET_BODY)
        .create_async()
        .await;
    let mut app = app_with(&server, MemoryStorage::new());
    app.login("alice", "s3cret").await.unwrap();

    let resolution = app.navigate("/application").await.unwrap();

    market.assert_async().await;
    assert!(!resolution.redirected());
    let stats = MarketStats::from_snapshot(app.market().unwrap());
    assert_eq!(stats.entries, 3);
    assert_eq!(stats.multiple_indicators, 1);
    assert_eq!(stats.single_indicator, 1);

    let screen = app.render().await.unwrap();
    assert!(screen.contains("Signed in as alice"));
    assert!(screen.contains("Market breadth (entry)"));
}

#[tokio::test]
async fn test_market_failure_keeps_previous_data() {
    let mut server = Server::new_async().await;
    mock_login_ok(&mut server).await;
    let ok = server
        .mock("GET", "/api/market-data/general")
        .with_status(200)
        .with_body(MARKET_BODY)
        .expect(1)
        .create_async()
        .await;
    let mut app = app_with(&server, MemoryStorage::new());
    app.login("alice", "s3cret").await.unwrap();
    app.navigate("/application").await.unwrap();
    ok.assert_async().await;
    let before = app.market().cloned();

    ok.remove_async().await;
    server
        .mock("GET", "/api/market-data/general")
        .with_status(500)
        .with_body("<html>oops</html>")
        .create_async()
        .await;

    assert!(!app.load_market_data().await);
    assert_eq!(app.market().cloned(), before);
}

#[tokio::test]
async fn test_navigate_unknown_path_is_router_error() {
    let server = Server::new_async().await;
    let mut app = app_with(&server, MemoryStorage::new());

    let err = app.navigate("/admin").await.unwrap_err();

    assert!(matches!(err, ScreenerError::Router(_)));
}

// =========================================================================
// Refresh
// =========================================================================

#[tokio::test]
async fn test_refresh_now_replaces_access_and_keeps_refresh() {
    let mut server = Server::new_async().await;
    mock_login_ok(&mut server).await;
    let new_access = jwt(r#"{"user_id":1,"username":"alice","jti":"two"}"#);
    let refresh = server
        .mock("POST", "/api/token/refresh/")
        .match_body(Matcher::Json(serde_json::json!({ "refresh": "refresh-1" })))
        .with_status(200)
        .with_body(serde_json::json!({ "access": new_access }).to_string())
        .create_async()
        .await;
    let storage = MemoryStorage::new();
    let mut app = app_with(&server, storage.clone());
    app.login("alice", "s3cret").await.unwrap();

    app.refresh_now().await.unwrap();

    refresh.assert_async().await;
    let expected = TokenPair::new(new_access, "refresh-1");
    assert_eq!(app.snapshot().await.tokens, Some(expected.clone()));
    assert_eq!(TokenStore::new(storage).load(), Some(expected));
}

#[tokio::test]
async fn test_refresh_now_rejected_ends_session() {
    let mut server = Server::new_async().await;
    mock_login_ok(&mut server).await;
    server
        .mock("POST", "/api/token/refresh/")
        .with_status(401)
        .create_async()
        .await;
    let storage = MemoryStorage::new();
    let mut app = app_with(&server, storage.clone());
    app.login("alice", "s3cret").await.unwrap();

    assert!(app.refresh_now().await.is_err());

    assert_eq!(app.snapshot().await.state, SessionState::Anonymous);
    assert!(storage.is_empty());
    assert_eq!(app.current_route(), Route::Login);
}

#[tokio::test]
async fn test_spawn_refresh_task_disabled_by_default() {
    let server = Server::new_async().await;
    let app = app_with(&server, MemoryStorage::new());

    assert!(app.spawn_refresh_task().is_none());
}

#[tokio::test]
async fn test_spawn_refresh_task_stops_cleanly() {
    let server = Server::new_async().await;
    let config = ClientConfig {
        refresh: RefreshConfig::every(240),
        ..config_for(&server)
    };
    let api = ApiClient::from_config(&config).unwrap();
    let app = ScreenerApp::builder()
        .config(config)
        .build_with(MemoryStorage::new(), api);

    let task = app.spawn_refresh_task().unwrap();
    let metrics = task.stop().await;

    assert_eq!(metrics.total_attempts, 0);
}

// =========================================================================
// Persistence across restarts + action handler
// =========================================================================

#[tokio::test]
async fn test_session_file_survives_restart() {
    let mut server = Server::new_async().await;
    mock_login_ok(&mut server).await;
    let dir = tempfile::tempdir().unwrap();
    let config = ClientConfig {
        storage_path: dir.path().join("session.json"),
        ..config_for(&server)
    };

    let mut first = ScreenerApp::builder().config(config.clone()).build().unwrap();
    first.login("alice", "s3cret").await.unwrap();
    drop(first);

    let second = ScreenerApp::builder().config(config).build().unwrap();
    let snapshot = second.snapshot().await;

    assert_eq!(snapshot.state, SessionState::Authenticated);
    assert_eq!(snapshot.user.map(|u| u.display_name()), Some("alice".to_string()));
}

#[tokio::test]
async fn test_handle_action_open_protected_explains_redirect() {
    let server = Server::new_async().await;
    let mut app = app_with(&server, MemoryStorage::new());

    let text = handle_action(
        &mut app,
        Action::Open {
            path: "/application".into(),
        },
    )
    .await
    .unwrap();

    assert!(text.starts_with("/application requires login, showing / instead."));
}

#[tokio::test]
async fn test_handle_action_whoami_and_refresh_when_anonymous() {
    let server = Server::new_async().await;
    let mut app = app_with(&server, MemoryStorage::new());

    assert_eq!(
        handle_action(&mut app, Action::Whoami).await.unwrap(),
        "Not logged in."
    );
    assert_eq!(
        handle_action(&mut app, Action::Refresh).await.unwrap(),
        "Not logged in."
    );
}

#[tokio::test]
async fn test_handle_action_login_then_whoami() {
    let mut server = Server::new_async().await;
    mock_login_ok(&mut server).await;
    let mut app = app_with(&server, MemoryStorage::new());

    let screen = handle_action(
        &mut app,
        Action::Login {
            username: "alice".into(),
            password: "s3cret".into(),
        },
    )
    .await
    .unwrap();
    let whoami = handle_action(&mut app, Action::Whoami).await.unwrap();

    assert!(screen.contains("Logged in as alice"));
    assert!(whoami.starts_with("Logged in as alice\nuser id: 1"));
}
