//! Admin command handlers driven end to end against a mock Bot API

mod helpers;

use helpers::*;
use serde_json::json;
use teloxide::types::Message;
use teloxide::Bot;
use wiremock::{
    matchers::{any, body_partial_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

use StarlyBot::handlers::commands::{admin, broadcast};
use StarlyBot::services::auth::NO_RIGHTS_TEXT;
use StarlyBot::services::Cohort;

const OUTSIDER_ID: i64 = 777;

fn bot(server: &MockServer) -> Bot {
    Bot::new("12345:test_token").set_api_url(server.uri().parse().expect("Valid mock url"))
}

/// A private-chat command message as Telegram delivers it
fn command_message(from_id: i64, text: &str) -> Message {
    let value = json!({
        "message_id": 10,
        "date": 1640995200,
        "from": {
            "id": from_id,
            "is_bot": false,
            "first_name": "Sender"
        },
        "chat": {
            "id": from_id,
            "first_name": "Sender",
            "type": "private"
        },
        "text": text
    });
    serde_json::from_str(&value.to_string()).expect("Valid message json")
}

fn sent_message(chat_id: i64) -> serde_json::Value {
    json!({
        "ok": true,
        "result": {
            "message_id": 11,
            "date": 1640995200,
            "chat": { "id": chat_id, "first_name": "Sender", "type": "private" },
            "text": "ok"
        }
    })
}

#[tokio::test]
async fn test_non_admin_ban_changes_nothing_and_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(sent_message(OUTSIDER_ID)))
        .expect(0)
        .mount(&server)
        .await;
    let ctx = TestContext::new();
    ctx.seed_user(12345, None).await;

    admin::handle_ban(
        bot(&server),
        command_message(OUTSIDER_ID, "/ban 12345"),
        ctx.services.clone(),
        "12345".to_string(),
    )
    .await
    .unwrap();

    let user = ctx.users.get(12345).await.unwrap();
    assert!(!user.is_banned);
    assert!(user.banned_features.is_empty());
    assert!(ctx.messenger.sent().await.is_empty());
}

#[tokio::test]
async fn test_admin_ban_is_applied_and_confirmed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot12345:test_token/SendMessage"))
        .and(body_partial_json(json!({ "chat_id": ADMIN_ID })))
        .respond_with(ResponseTemplate::new(200).set_body_json(sent_message(ADMIN_ID)))
        .expect(1)
        .mount(&server)
        .await;
    let ctx = TestContext::new();
    ctx.seed_user(12345, None).await;

    admin::handle_ban(
        bot(&server),
        command_message(ADMIN_ID, "/ban 12345"),
        ctx.services.clone(),
        "12345".to_string(),
    )
    .await
    .unwrap();

    assert!(ctx.users.get(12345).await.unwrap().is_banned);
    assert_eq!(ctx.messenger.sent_to(12345).await.len(), 1);
}

#[tokio::test]
async fn test_non_admin_broadcast_is_refused_explicitly() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot12345:test_token/SendMessage"))
        .and(body_partial_json(json!({ "chat_id": OUTSIDER_ID, "text": NO_RIGHTS_TEXT })))
        .respond_with(ResponseTemplate::new(200).set_body_json(sent_message(OUTSIDER_ID)))
        .expect(1)
        .mount(&server)
        .await;
    let ctx = TestContext::new();
    ctx.seed_user(1, None).await;
    ctx.seed_user(2, None).await;

    broadcast::handle_cohort(
        bot(&server),
        command_message(OUTSIDER_ID, "/broadcast_all Привет"),
        ctx.services.clone(),
        "Привет".to_string(),
        Cohort::Subscribers,
    )
    .await
    .unwrap();

    assert!(ctx.messenger.sent().await.is_empty());
}
