#![allow(clippy::unwrap_used)]
// Integration tests for `LockClient` using wiremock.

use chrono::NaiveDate;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use keysync_api::lock::models::{CodeForm, TimeOfDay};
use keysync_api::{Error, LockClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, LockClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = LockClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

async fn logged_in() -> (MockServer, LockClient) {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/login_check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "jwt-abc" })))
        .mount(&server)
        .await;
    let secret = SecretString::from("pw".to_string());
    client.login("owner@example.com", &secret).await.unwrap();
    (server, client)
}

fn form() -> CodeForm {
    CodeForm {
        name: "Jane Doe".into(),
        code: "1234".into(),
        date_start: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        date_end: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        time_start: TimeOfDay { hour: 15, minute: 0 },
        time_end: TimeOfDay { hour: 12, minute: 0 },
        active: true,
        description: "Smoobu#42".into(),
    }
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_login_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/login_check"))
        .and(body_string_contains("_username=owner%40example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "jwt-abc" })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(!client.is_logged_in());
    let secret = SecretString::from("pw".to_string());
    client.login("owner@example.com", &secret).await.unwrap();
    assert!(client.is_logged_in());
}

#[tokio::test]
async fn test_login_failure() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/login_check"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": 401, "message": "Invalid credentials."
        })))
        .mount(&server)
        .await;

    let secret = SecretString::from("wrong".to_string());
    let result = client.login("owner@example.com", &secret).await;

    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
    assert!(!client.is_logged_in());
}

#[tokio::test]
async fn test_login_without_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/login_check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let secret = SecretString::from("pw".to_string());
    let result = client.login("owner@example.com", &secret).await;

    assert!(matches!(result, Err(Error::Authentication { .. })));
}

#[tokio::test]
async fn test_calls_require_login() {
    let (_server, client) = setup().await;

    let result = client.list_codes(3723).await;

    assert!(matches!(result, Err(Error::NotLoggedIn)));
}

// ── Code tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_codes() {
    let (server, client) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/fr/api/v2/partage/all/serrure/3723"))
        .and(query_param("_format", "json"))
        .and(header("Authorization", "Bearer jwt-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "data": {
                "partages_accessoire": [
                    {
                        "id": 683_237,
                        "nom": "Jane Doe",
                        "code": "1234",
                        "date_debut": "2025-03-10",
                        "date_fin": "2025-03-14",
                        "actif": true,
                        "description": "Smoobu#42"
                    },
                    {
                        "id": 683_240,
                        "nom": "Cleaner",
                        "code": 9876,
                        "actif": 0
                    }
                ]
            }
        })))
        .mount(&server)
        .await;

    let codes = client.list_codes(3723).await.unwrap();

    assert_eq!(codes.len(), 2);
    assert_eq!(codes[0].id, 683_237);
    assert_eq!(codes[0].name.as_deref(), Some("Jane Doe"));
    assert_eq!(codes[0].description.as_deref(), Some("Smoobu#42"));
    assert!(codes[0].active);
    assert_eq!(codes[1].code.as_deref(), Some("9876"));
    assert!(!codes[1].active);
    assert!(codes[1].date_end.is_none());
}

#[tokio::test]
async fn test_list_codes_empty_data() {
    let (server, client) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/fr/api/v2/partage/all/serrure/3733"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": 200 })))
        .mount(&server)
        .await;

    let codes = client.list_codes(3733).await.unwrap();

    assert!(codes.is_empty());
}

#[tokio::test]
async fn test_create_code_sends_full_form() {
    let (server, client) = logged_in().await;

    Mock::given(method("POST"))
        .and(path("/fr/api/v2/partage/create/3723/accessoire/SLORUV6s"))
        .and(body_string_contains("partage_accessoire%5Bcode%5D=1234"))
        .and(body_string_contains("partage_accessoire%5Bdate_debut%5D=2025-03-10"))
        .and(body_string_contains("partage_accessoire%5Bdescription%5D=Smoobu%2342"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "data": { "id": 700_001, "code": "1234" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = client.create_code(3723, "SLORUV6s", &form()).await.unwrap();

    assert_eq!(created.id, 700_001);
    assert_eq!(created.code.as_deref(), Some("1234"));
}

#[tokio::test]
async fn test_update_code_rejected_inside_envelope() {
    let (server, client) = logged_in().await;

    Mock::given(method("POST"))
        .and(path("/fr/api/v2/partage/accessoire/update/683237"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 400,
            "message": "Code already used on this lock"
        })))
        .mount(&server)
        .await;

    let result = client.update_code(683_237, &form()).await;

    match result {
        Err(Error::LockApi {
            status,
            ref message,
        }) => {
            assert_eq!(status, 400);
            assert!(message.contains("already used"), "got: {message}");
        }
        other => panic!("expected LockApi error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_update_code_success() {
    let (server, client) = logged_in().await;

    Mock::given(method("POST"))
        .and(path("/fr/api/v2/partage/accessoire/update/683237"))
        .and(body_string_contains("partage_accessoire%5Bactif%5D=1"))
        .and(body_string_contains("partage_accessoire%5Bheure_fin%5D%5Bhour%5D=12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": 200 })))
        .expect(1)
        .mount(&server)
        .await;

    client.update_code(683_237, &form()).await.unwrap();
}

#[tokio::test]
async fn test_delete_code() {
    let (server, client) = logged_in().await;

    Mock::given(method("POST"))
        .and(path("/fr/api/v2/partage/accessoire/delete/683237"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": 200 })))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_code(683_237).await.unwrap();
}

#[tokio::test]
async fn test_session_expired() {
    let (server, client) = logged_in().await;

    Mock::given(method("POST"))
        .and(path("/fr/api/v2/partage/accessoire/delete/1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.delete_code(1).await.unwrap_err();

    assert!(
        matches!(err, Error::Authentication { .. }),
        "got: {err:?}"
    );
}
