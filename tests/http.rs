mod common;

use common::{entitlement, http, http_with, message, user};
use cordial::error::HttpError;
use cordial::types::{fetch_payments, CreateMessage, EntitlementQuery, Id, PaymentStatus};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn sends_bot_token_and_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .and(header("authorization", "Bot test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user("80351110224678912")))
        .expect(1)
        .mount(&server)
        .await;

    let me = http(&server).current_user().await.unwrap();
    assert_eq!(me.id, Id::new(80351110224678912));

    let requests = server.received_requests().await.unwrap();
    let agent = requests[0]
        .headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(agent.starts_with("DiscordBot ("), "{agent}");
}

#[tokio::test]
async fn error_statuses_are_classified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/channels/10/messages"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({"code": 50013, "message": "Missing Permissions"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/channels/10/messages/11"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"code": 10008, "message": "Unknown Message"})),
        )
        .mount(&server)
        .await;

    let client = http(&server);
    let err = client
        .create_message(Id::new(10), &CreateMessage::new().content("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, HttpError::Forbidden { .. }));
    assert_eq!(err.code(), Some(50013));

    let err = client.message(Id::new(10), Id::new(11)).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.code(), Some(10008));
}

#[tokio::test]
async fn retries_after_429() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels/10/messages/11"))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_json(json!({"message": "You are being rate limited.", "retry_after": 0.01, "global": false})),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/channels/10/messages/11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(message("11")))
        .mount(&server)
        .await;

    let msg = http(&server).message(Id::new(10), Id::new(11)).await.unwrap();
    assert_eq!(msg.id, Id::new(11));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn gives_up_when_429_persists() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(json!({"retry_after": 0.01, "global": true})),
        )
        .mount(&server)
        .await;

    let err = http_with(&server, |c| c.with_max_retries(1))
        .current_user()
        .await
        .unwrap_err();
    assert!(matches!(err, HttpError::RateLimited { global: true, .. }));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn only_gets_are_retried_on_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user("1")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/channels/10/messages"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = http(&server);
    assert!(client.current_user().await.is_ok());
    let err = client
        .create_message(Id::new(10), &CreateMessage::new().content("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, HttpError::Server { status: 500, .. }));
}

#[tokio::test]
async fn entitlements_page_backwards_until_the_limit() {
    let server = MockServer::start().await;
    let first: Vec<_> = (1000..1100).map(entitlement).collect();
    let second: Vec<_> = (900..910).map(entitlement).collect();
    Mock::given(method("GET"))
        .and(path("/applications/77/entitlements"))
        .and(query_param("limit", "100"))
        .and(query_param("user_id", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(first))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/applications/77/entitlements"))
        .and(query_param("limit", "50"))
        .and(query_param("before", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(second))
        .expect(1)
        .mount(&server)
        .await;

    let query = EntitlementQuery::new().user(Id::new(5)).limit(150);
    let owned = http(&server).entitlements(Id::new(77), &query).await.unwrap();
    assert_eq!(owned.len(), 110);
    assert_eq!(owned.last().map(|e| e.id), Some(Id::new(909)));
}

#[tokio::test]
async fn consume_entitlement_expects_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/applications/77/entitlements/88/consume"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    http(&server)
        .consume_entitlement(Id::new(77), Id::new(88))
        .await
        .unwrap();
}

#[tokio::test]
async fn entitlements_page_forward_from_after() {
    let server = MockServer::start().await;
    let page: Vec<_> = (501..=503).map(entitlement).collect();
    Mock::given(method("GET"))
        .and(path("/applications/77/entitlements"))
        .and(query_param("after", "500"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page))
        .expect(1)
        .mount(&server)
        .await;

    let query = EntitlementQuery::new().after(Id::new(500));
    let owned = http(&server).entitlements(Id::new(77), &query).await.unwrap();
    assert_eq!(owned.len(), 3);
}

#[tokio::test]
async fn payment_limit_is_clamped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/@me/billing/payments"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "1093226011227390464",
            "amount": 999,
            "currency": "usd",
            "status": 1
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let payments = fetch_payments(&http(&server), Some(200)).await.unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].status, PaymentStatus::Completed);
    assert_eq!(payments[0].display_amount(), "9.99 USD");
}

#[tokio::test]
async fn guild_is_fetched_with_counts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/guilds/290926798626357999"))
        .and(query_param("with_counts", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "290926798626357999",
            "name": "Test Guild",
            "icon": null,
            "approximate_member_count": 12,
            "roles": [],
            "features": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let guild = http(&server).guild(Id::new(290926798626357999)).await.unwrap();
    assert_eq!(guild.name, "Test Guild");
    assert_eq!(guild.approximate_member_count, Some(12));
}
