mod common;

use common::{http, message, slash, APPLICATION_ID, INTERACTION_ID, TOKEN};
use cordial::types::CreateMessage;
use cordial::{Error, InteractionResponder};
use serde_json::Value;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn callback_path() -> String {
    format!("/interactions/{INTERACTION_ID}/{TOKEN}/callback")
}

#[tokio::test]
async fn responds_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(callback_path()))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let responder = InteractionResponder::new(http(&server), &slash("ping"));
    responder.send_ephemeral("pong").await.unwrap();
    assert!(responder.is_done());
    assert!(matches!(
        responder.send_ephemeral("again").await,
        Err(Error::InteractionResponded)
    ));

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["type"], 4);
    assert_eq!(body["data"]["content"], "pong");
    assert_eq!(body["data"]["flags"], 64);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn failed_response_can_be_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(callback_path()))
        .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"code": 50035, "message": "Invalid Form Body"}"#))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(callback_path()))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let responder = InteractionResponder::new(http(&server), &slash("ping"));
    let err = responder.defer(false, true).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert!(!responder.is_done());
    responder.defer(false, true).await.unwrap();
}

#[tokio::test]
async fn followups_use_the_webhook_without_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/webhooks/{APPLICATION_ID}/{TOKEN}")))
        .and(query_param("wait", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(message("42")))
        .expect(1)
        .mount(&server)
        .await;

    let responder = InteractionResponder::new(http(&server), &slash("ping"));
    let sent = responder
        .followup(&CreateMessage::new().content("later"))
        .await
        .unwrap();
    assert_eq!(sent.id.get(), 42);

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}
