//! Integration tests for the reqwest transport.
//!
//! Each test starts a `mockito` HTTP server on a random local port and
//! checks what actually goes over the wire.

#[cfg(feature = "reqwest")]
mod reqwest_transport {
    use mockito::Matcher;
    use screener_transport::{
        HttpTransport, ReqwestTransport, TransportConfig, TransportError,
    };

    fn transport_for(server: &mockito::ServerGuard) -> ReqwestTransport {
        ReqwestTransport::new(&server.url(), TransportConfig::default())
            .expect("transport should build")
    }

    #[tokio::test]
    async fn test_post_json_sends_body_and_content_type() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/token/")
            .match_header("content-type", "application/json")
            .match_body(Matcher::JsonString(
                r#"{"username":"bob","password":"pw"}"#.into(),
            ))
            .with_status(200)
            .with_body(r#"{"access":"a","refresh":"r"}"#)
            .create_async()
            .await;

        let transport = transport_for(&server);
        let response = transport
            .post_json(
                "/api/token/",
                br#"{"username":"bob","password":"pw"}"#.to_vec(),
                None,
            )
            .await
            .expect("request should complete");

        mock.assert_async().await;
        assert!(response.is_ok());
        assert_eq!(response.body, br#"{"access":"a","refresh":"r"}"#.to_vec());
    }

    #[tokio::test]
    async fn test_get_attaches_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/market-data/general")
            .match_header("authorization", "Bearer abc.def.ghi")
            .with_status(200)
            .with_body(r#"{"entries":false}"#)
            .create_async()
            .await;

        let transport = transport_for(&server);
        let response = transport
            .get("/api/market-data/general", Some("abc.def.ghi"))
            .await
            .expect("request should complete");

        mock.assert_async().await;
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn test_get_without_bearer_sends_no_authorization() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/market-data/general")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let transport = transport_for(&server);
        transport
            .get("/api/market-data/general", None)
            .await
            .expect("request should complete");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_200_status_is_returned_not_raised() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/token/")
            .with_status(401)
            .with_body(r#"{"detail":"No active account found"}"#)
            .create_async()
            .await;

        let transport = transport_for(&server);
        let response = transport
            .post_json("/api/token/", b"{}".to_vec(), None)
            .await
            .expect("a 401 is still a completed exchange");

        assert_eq!(response.status, 401);
        assert!(!response.is_ok());
    }

    #[tokio::test]
    async fn test_connection_refused_is_request_failed() {
        // Port 1 on loopback is reserved and nothing listens there.
        let transport =
            ReqwestTransport::new("http://127.0.0.1:1", TransportConfig::default())
                .expect("transport should build");

        let result = transport.get("/api/market-data/general", None).await;

        match result {
            Err(TransportError::RequestFailed { path, .. }) => {
                assert_eq!(path, "/api/market-data/general");
            }
            other => panic!("expected RequestFailed, got {other:?}"),
        }
    }
}
