// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::http::StatusCode;
use chrono::Utc;
use scriptmint::infrastructure::services::webhook_signature::{
    WebhookSignatureVerifier, SIGNATURE_HEADER, TIMESTAMP_HEADER,
};
use serde_json::{json, Value};

use super::helpers::{create_test_app, open_account, StubGenerator, TEST_WEBHOOK_SECRET};

#[tokio::test]
async fn test_health_and_version() {
    let app = create_test_app(StubGenerator::ok("unused")).await;

    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "OK");

    let response = app.server.get("/v1/version").await;
    assert_eq!(response.text(), env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_create_account_with_referral_code() {
    let app = create_test_app(StubGenerator::ok("unused")).await;
    let referrer = open_account(&app.services, "Referrer", 0).await;

    let code: Value = app
        .server
        .get("/v1/referrals/code")
        .add_header("X-Account-Id", referrer.id.to_string())
        .await
        .json();
    let code = code["code"].as_str().unwrap().to_string();

    let response = app
        .server
        .post("/v1/accounts")
        .json(&json!({
            "email": "newbie@example.com",
            "name": "Newbie",
            "referral_code": code
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["account"]["credits"], 3);
    assert_eq!(body["referral_applied"], true);

    let stats: Value = app
        .server
        .get("/v1/referrals/stats")
        .add_header("X-Account-Id", referrer.id.to_string())
        .await
        .json();
    assert_eq!(stats["stats"]["total_referrals"], 1);
    assert_eq!(stats["stats"]["pending_rewards"], 1);
}

#[tokio::test]
async fn test_generate_and_read_credits() {
    let app = create_test_app(StubGenerator::ok("Here is your script.")).await;
    let account = open_account(&app.services, "Creator", 2).await;

    let response = app
        .server
        .post("/v1/generate")
        .add_header("X-Account-Id", account.id.to_string())
        .json(&json!({ "topic": "Morning routines" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["script"], "Here is your script.");
    assert_eq!(body["credits_remaining"], 1);

    let credits: Value = app
        .server
        .get("/v1/credits")
        .add_header("X-Account-Id", account.id.to_string())
        .await
        .json();
    assert_eq!(credits["credits"], 1);
    assert_eq!(credits["plan"], "free");
    assert_eq!(credits["history"][0]["kind"], "usage");
}

#[tokio::test]
async fn test_insufficient_credits_is_412() {
    let app = create_test_app(StubGenerator::ok("unused")).await;
    let account = open_account(&app.services, "Broke", 0).await;

    let response = app
        .server
        .post("/v1/generate")
        .add_header("X-Account-Id", account.id.to_string())
        .json(&json!({ "topic": "Morning routines" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::PRECONDITION_FAILED);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "INSUFFICIENT_CREDITS");
}

#[tokio::test]
async fn test_generation_failure_is_502() {
    let app = create_test_app(StubGenerator::failing("model exploded")).await;
    let account = open_account(&app.services, "Creator", 1).await;

    let response = app
        .server
        .post("/v1/generate")
        .add_header("X-Account-Id", account.id.to_string())
        .json(&json!({ "topic": "Morning routines" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
    assert!(!response.text().contains("model exploded"));
}

#[tokio::test]
async fn test_missing_account_header_is_400() {
    let app = create_test_app(StubGenerator::ok("unused")).await;

    let response = app.server.get("/v1/credits").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = app
        .server
        .get("/v1/credits")
        .add_header("X-Account-Id", "not-a-uuid")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_payment_webhook_signature() {
    let app = create_test_app(StubGenerator::ok("unused")).await;
    let account = open_account(&app.services, "Buyer", 0).await;

    let body = json!({
        "accountId": account.id,
        "amountCents": 1000,
        "creditsGranted": 10,
        "sessionId": "cs_http_1"
    })
    .to_string();
    let timestamp = Utc::now().timestamp();
    let signature = WebhookSignatureVerifier::new(TEST_WEBHOOK_SECRET, 300)
        .sign(timestamp, body.as_bytes())
        .unwrap();

    // 篡改后的负载
    let tampered = body.replace("10,", "1000,");
    let response = app
        .server
        .post("/v1/webhooks/payment")
        .add_header(TIMESTAMP_HEADER, timestamp.to_string())
        .add_header(SIGNATURE_HEADER, signature.clone())
        .text(tampered)
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = app
        .server
        .post("/v1/webhooks/payment")
        .add_header(TIMESTAMP_HEADER, timestamp.to_string())
        .add_header(SIGNATURE_HEADER, signature)
        .text(body)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let outcome: Value = response.json();
    assert_eq!(outcome["status"], "credits_purchased");
    assert_eq!(outcome["balance_after"], 10);
}

#[tokio::test]
async fn test_catalog_invalidate() {
    let app = create_test_app(StubGenerator::ok("unused")).await;

    let response = app.server.post("/v1/admin/catalog/invalidate").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["success"], true);
}
