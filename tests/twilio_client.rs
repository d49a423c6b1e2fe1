// tests/twilio_client.rs
use std::path::Path;

use chrono::Utc;
use serde_json::json;
use wiremock::matchers::{basic_auth, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use home_search::config::Secrets;
use home_search::error::Error;
use home_search::listing::Listing;
use home_search::notify::{notify_listings, notify_new_listings, Messenger, TwilioClient};

const MESSAGES: &str = "/2010-04-01/Accounts/AC123/Messages.json";

fn secrets() -> Secrets {
    Secrets {
        twilio_account_sid: Some("AC123".into()),
        twilio_auth_token: Some("secret".into()),
        whatsapp_to: Some("+447700900000".into()),
        ..Secrets::default()
    }
}

fn listing(id: &str) -> Listing {
    Listing {
        id: id.into(),
        url: format!("https://www.rightmove.co.uk/properties/{id}"),
        price: "£700,000".into(),
        address: "1 Oak Road".into(),
        bedrooms: Some(4),
        bathrooms: None,
        property_type: "Detached".into(),
        description: String::new(),
        agent: String::new(),
        added_date: String::new(),
        images: vec![],
        area: "Barnet".into(),
        scraped_at: Utc::now(),
        source: "rightmove".into(),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn sends_form_with_whatsapp_addresses() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MESSAGES))
        .and(basic_auth("AC123", "secret"))
        .and(body_string_contains("From=whatsapp%3A%2B14155238886"))
        .and(body_string_contains("To=whatsapp%3A%2B447700900000"))
        .and(body_string_contains("Body=Test%3A+London+Home+Search+working%21"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "sid": "SM42", "status": "queued" })))
        .expect(1)
        .mount(&server)
        .await;

    let base = server.uri();
    let sid = tokio::task::spawn_blocking(move || {
        let client = TwilioClient::with_base(&base, &secrets()).unwrap();
        client.send("Test: London Home Search working!")
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(sid, "SM42");
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_send_carries_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MESSAGES))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"code":20003}"#))
        .mount(&server)
        .await;

    let base = server.uri();
    let err = tokio::task::spawn_blocking(move || {
        let client = TwilioClient::with_base(&base, &secrets()).unwrap();
        notify_listings(&client, &[listing("1")], None)
    })
    .await
    .unwrap()
    .unwrap_err();

    match err {
        Error::Status { service, status, body } => {
            assert_eq!(service, "Twilio");
            assert_eq!(status, 401);
            assert!(body.contains("20003"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn notify_from_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MESSAGES))
        .and(body_string_contains("New+Property"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "sid": "SM1" })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let one = dir.path().join("one.json");
    let none = dir.path().join("none.json");
    std::fs::write(&one, serde_json::to_vec(&[listing("1")]).unwrap()).unwrap();
    std::fs::write(&none, "[]").unwrap();

    let base = server.uri();
    let (sent, empty, missing) = tokio::task::spawn_blocking(move || {
        let client = TwilioClient::with_base(&base, &secrets()).unwrap();
        (
            notify_new_listings(&client, &one, None).unwrap(),
            notify_new_listings(&client, &none, None).unwrap(),
            notify_new_listings(&client, Path::new("/nonexistent/x.json"), None).unwrap(),
        )
    })
    .await
    .unwrap();

    assert!(sent);
    assert!(empty);
    assert!(!missing);
}

#[test]
fn missing_credentials_are_config_errors() {
    let mut s = secrets();
    s.whatsapp_to = None;
    match TwilioClient::from_secrets(&s) {
        Err(Error::Config { message }) => assert!(message.contains("WHATSAPP_TO")),
        Err(other) => panic!("unexpected error {other:?}"),
        Ok(_) => panic!("client built without a recipient"),
    }
}
