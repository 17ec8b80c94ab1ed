// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use scriptmint::application::dto::generation_request::GenerateScriptRequestDto;
use scriptmint::application::use_cases::generate_script::GenerateScriptError;
use scriptmint::domain::models::credits::LedgerEntryKind;
use scriptmint::domain::services::credit_ledger::LedgerError;
use scriptmint::infrastructure::database::entities::generation_logs;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use super::helpers::{open_account, seed_affiliate, setup_services, StubGenerator};

fn request(topic: &str, request_id: Option<&str>) -> GenerateScriptRequestDto {
    GenerateScriptRequestDto {
        topic: topic.to_string(),
        target_audience: Some("new podcasters".to_string()),
        tone: Some("friendly".to_string()),
        request_id: request_id.map(str::to_string),
    }
}

#[tokio::test]
async fn test_successful_generation_debits_and_links() {
    let generator = StubGenerator::ok("Start with a decent microphone. A microphone matters.");
    let (db, services) = setup_services(generator.clone()).await;
    seed_affiliate(&db, "Rode PodMic", "microphone", "https://aff.example/podmic", true).await;
    let account = open_account(&services, "Creator", 3).await;

    let response = services
        .generate_script
        .execute(account.id, request("Podcast gear", None))
        .await
        .unwrap();

    assert!(response.success);
    assert_eq!(response.credits_used, 1);
    assert_eq!(response.credits_remaining, 2);
    assert_eq!(response.links_inserted, 1);
    assert_eq!(
        response.script,
        "Start with a decent [Rode PodMic](https://aff.example/podmic). A microphone matters."
    );

    let logs = generation_logs::Entity::find()
        .filter(generation_logs::Column::AccountId.eq(account.id))
        .all(db.as_ref())
        .await
        .unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, "success");
    assert_eq!(logs[0].affiliate_links_inserted, 1);
    assert_eq!(logs[0].credits_used, 1);
}

#[tokio::test]
async fn test_failed_generation_refunds() {
    let (db, services) = setup_services(StubGenerator::failing("upstream unavailable")).await;
    let account = open_account(&services, "Creator", 3).await;

    let err = services
        .generate_script
        .execute(account.id, request("Podcast gear", None))
        .await
        .unwrap_err();
    assert!(matches!(err, GenerateScriptError::Generation(_)));

    let balance = services.ledger.get_balance(account.id, None).await.unwrap();
    assert_eq!(balance.credits, 3);
    let kinds: Vec<_> = balance.history.iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![LedgerEntryKind::Usage, LedgerEntryKind::Refund]);

    let logs = generation_logs::Entity::find()
        .filter(generation_logs::Column::AccountId.eq(account.id))
        .all(db.as_ref())
        .await
        .unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, "failed");
    assert!(logs[0].error_message.is_some());
}

#[tokio::test]
async fn test_empty_output_counts_as_failure() {
    let (_db, services) = setup_services(StubGenerator::ok("   ")).await;
    let account = open_account(&services, "Creator", 1).await;

    let err = services
        .generate_script
        .execute(account.id, request("Podcast gear", None))
        .await
        .unwrap_err();
    assert!(matches!(err, GenerateScriptError::Generation(_)));

    let balance = services.ledger.get_balance(account.id, None).await.unwrap();
    assert_eq!(balance.credits, 1);
}

#[tokio::test]
async fn test_insufficient_credits_skips_generation() {
    let generator = StubGenerator::ok("never produced");
    let (_db, services) = setup_services(generator.clone()).await;
    let account = open_account(&services, "Broke", 0).await;

    let err = services
        .generate_script
        .execute(account.id, request("Podcast gear", None))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GenerateScriptError::Ledger(LedgerError::InsufficientCredits { .. })
    ));
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_request_id_retry_is_charged_once() {
    let generator = StubGenerator::ok("A short script.");
    let (_db, services) = setup_services(generator.clone()).await;
    let account = open_account(&services, "Creator", 3).await;

    let first = services
        .generate_script
        .execute(account.id, request("Podcast gear", Some("req-1")))
        .await
        .unwrap();
    let retry = services
        .generate_script
        .execute(account.id, request("Podcast gear", Some("req-1")))
        .await
        .unwrap();

    assert_eq!(first.credits_remaining, 2);
    assert_eq!(retry.credits_remaining, 2);
    assert_eq!(generator.calls(), 2);

    let balance = services.ledger.get_balance(account.id, None).await.unwrap();
    assert_eq!(balance.credits, 2);
    assert_eq!(balance.history.len(), 1);
}

#[tokio::test]
async fn test_retry_after_refund_is_charged_again() {
    let generator = StubGenerator::fails_then_ok(2, "A short script.");
    let (_db, services) = setup_services(generator.clone()).await;
    let account = open_account(&services, "Creator", 3).await;
    let use_case = &services.generate_script;

    for _ in 0..2 {
        let err = use_case
            .execute(account.id, request("Podcast gear", Some("req-7")))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateScriptError::Generation(_)));
    }
    let after_failures = services.ledger.current_credits(account.id).await.unwrap();
    assert_eq!(after_failures, 3);

    let success = use_case
        .execute(account.id, request("Podcast gear", Some("req-7")))
        .await
        .unwrap();
    assert_eq!(success.credits_used, 1);
    assert_eq!(success.credits_remaining, 2);

    // 成功之后再用同一ID重试不再扣费，返回的是当前余额
    let replay = use_case
        .execute(account.id, request("Podcast gear", Some("req-7")))
        .await
        .unwrap();
    assert_eq!(replay.credits_remaining, 2);
    assert_eq!(generator.calls(), 4);

    let balance = services.ledger.get_balance(account.id, None).await.unwrap();
    assert_eq!(balance.credits, 2);
    let kinds: Vec<_> = balance.history.iter().map(|e| (e.kind, e.amount)).collect();
    assert_eq!(
        kinds,
        vec![
            (LedgerEntryKind::Usage, -1),
            (LedgerEntryKind::Refund, 1),
            (LedgerEntryKind::Usage, -1),
            (LedgerEntryKind::Refund, 1),
            (LedgerEntryKind::Usage, -1),
        ]
    );
}

#[tokio::test]
async fn test_replayed_request_reports_live_balance() {
    let generator = StubGenerator::ok("A short script.");
    let (_db, services) = setup_services(generator).await;
    let account = open_account(&services, "Creator", 3).await;

    services
        .generate_script
        .execute(account.id, request("Podcast gear", Some("req-8")))
        .await
        .unwrap();
    services
        .generate_script
        .execute(account.id, request("Other topic", None))
        .await
        .unwrap();

    let replay = services
        .generate_script
        .execute(account.id, request("Podcast gear", Some("req-8")))
        .await
        .unwrap();
    assert_eq!(replay.credits_remaining, 1);
}

#[tokio::test]
async fn test_invalid_topic_rejected_before_debit() {
    let (_db, services) = setup_services(StubGenerator::ok("unused")).await;
    let account = open_account(&services, "Creator", 3).await;

    let err = services
        .generate_script
        .execute(account.id, request("ab", None))
        .await
        .unwrap_err();
    assert!(matches!(err, GenerateScriptError::Validation(_)));

    let balance = services.ledger.get_balance(account.id, None).await.unwrap();
    assert_eq!(balance.credits, 3);
}
