use assert_json_diff::assert_json_eq;
use onelogin_client::{ApiError, Collection, HttpClient, OneLoginApi};
use onelogin_config::ProviderConfig;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup() -> (MockServer, HttpClient) {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/oauth2/v2/token"))
        .and(header_exists("authorization"))
        .and(body_json(json!({"grant_type": "client_credentials"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-123",
            "expires_in": 36000,
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = ProviderConfig::new("test-id", "test-secret").with_url(mock_server.uri());
    let client = HttpClient::new(&config).expect("client should build");
    (mock_server, client)
}

#[tokio::test]
async fn get_sends_bearer_token_and_caches_it() {
    let (mock_server, client) = setup().await;

    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty(), "token is fetched lazily");

    Mock::given(method("GET"))
        .and(path("/api/2/roles/42"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42, "name": "admins"})))
        .expect(2)
        .mount(&mock_server)
        .await;

    let first = client.get(&Collection::Roles, "42").await.unwrap().unwrap();
    assert_json_eq!(first, json!({"id": 42, "name": "admins"}));

    // second call reuses the cached token; the token mock expects one call
    let second = client.get(&Collection::Roles, "42").await.unwrap();
    assert!(second.is_some());
}

#[tokio::test]
async fn get_maps_404_to_none() {
    let (mock_server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/2/users/9"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&mock_server)
        .await;

    assert!(client.get(&Collection::Users, "9").await.unwrap().is_none());
}

#[tokio::test]
async fn error_status_carries_body_verbatim() {
    let (mock_server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/2/roles"))
        .respond_with(ResponseTemplate::new(422).set_body_string("name is required"))
        .mount(&mock_server)
        .await;

    let err = client
        .create(&Collection::Roles, &json!({}))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "status: 422, body: name is required");
}

#[tokio::test]
async fn create_failure_with_id_is_partial_success() {
    let (mock_server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/2/apps"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "id": 77,
            "name": "wiki",
            "message": "parameters could not be saved"
        })))
        .mount(&mock_server)
        .await;

    let err = client
        .create(&Collection::Apps, &json!({"name": "wiki"}))
        .await
        .unwrap_err();
    match &err {
        ApiError::PartialSuccess { resource, .. } => assert_eq!(resource["id"], 77),
        other => panic!("expected partial success, got {other:?}"),
    }
}

#[tokio::test]
async fn update_of_missing_object_returns_null() {
    let (mock_server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/2/apps/5/rules/6"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let rules = Collection::AppRules {
        app_id: "5".to_string(),
    };
    let resp = client.update(&rules, "6", &json!({"name": "r"})).await.unwrap();
    assert!(resp.is_null());
}

#[tokio::test]
async fn v1_envelope_is_unwrapped() {
    let (mock_server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/1/groups/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": {"error": false, "code": 200},
            "data": [{"id": 3, "name": "Engineering", "reference": null}]
        })))
        .mount(&mock_server)
        .await;

    let group = client.get(&Collection::Groups, "3").await.unwrap().unwrap();
    assert_json_eq!(group, json!({"id": 3, "name": "Engineering", "reference": null}));
}

#[tokio::test]
async fn remove_sends_body_with_delete() {
    let (mock_server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/2/roles/8/users"))
        .and(body_json(json!([1, 2])))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let role_users = Collection::RoleUsers {
        role_id: "8".to_string(),
    };
    client.remove(&role_users, &json!([1, 2])).await.unwrap();
}

#[tokio::test]
async fn token_failure_is_auth_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/oauth2/v2/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid client"))
        .mount(&mock_server)
        .await;

    let config = ProviderConfig::new("bad", "creds").with_url(mock_server.uri());
    let client = HttpClient::new(&config).unwrap();
    let err = client.get(&Collection::Users, "1").await.unwrap_err();
    assert!(matches!(err, ApiError::Auth(_)));
    assert!(err.to_string().contains("invalid client"));
}

#[tokio::test]
async fn list_sends_query_parameters() {
    let (mock_server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/2/users"))
        .and(query_param("username", "timmy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 12, "username": "timmy"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let query = [("username".to_string(), "timmy".to_string())];
    let users = client.list(&Collection::Users, &query).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["id"], 12);
}

/// Reads one request off the socket: headers plus any declared body.
async fn read_request(socket: &mut tokio::net::TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(end) = text.find("\r\n\r\n") {
            let declared = text[..end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= end + 4 + declared {
                return;
            }
        }
    }
}

#[tokio::test]
async fn truncated_error_body_is_reported() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let token = r#"{"access_token":"tok-123","expires_in":3600}"#;
        let responses = [
            format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{token}",
                token.len()
            ),
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 100\r\nConnection: close\r\n\r\nupstream".to_string(),
        ];
        for response in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        }
    });

    let config = ProviderConfig::new("test-id", "test-secret").with_url(format!("http://{addr}"));
    let client = HttpClient::new(&config).unwrap();
    let err = client.get(&Collection::Roles, "1").await.unwrap_err();
    // an unreadable body is an error of its own, never an empty status body
    assert!(matches!(err, ApiError::Decode(_)), "got {err:?}");
}
