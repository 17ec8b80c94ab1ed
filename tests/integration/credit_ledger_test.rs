// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use futures::future::join_all;
use scriptmint::domain::models::account::Plan;
use scriptmint::domain::models::credits::LedgerEntryKind;
use scriptmint::domain::repositories::account_repository::AccountRepository;
use scriptmint::domain::repositories::credits_repository::LedgerRequest;
use scriptmint::domain::services::credit_ledger::LedgerError;
use scriptmint::infrastructure::repositories::account_repo_impl::AccountRepositoryImpl;
use uuid::Uuid;

use super::helpers::{open_account, services_on, setup_file_db, setup_services, StubGenerator};

fn usage(account_id: Uuid, amount: i64) -> LedgerRequest {
    LedgerRequest::new(account_id, amount, LedgerEntryKind::Usage, "Script generation")
}

/// 并发扣费不会超扣
///
/// 余额 5，20 个扣费请求分布在多个线程和多个数据库连接上，恰好 5 个成功
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_debits_never_overdraw() {
    let (_dir, db) = setup_file_db(8).await;
    let services = services_on(db, StubGenerator::ok("unused"));
    let account = open_account(&services, "Racer", 5).await;

    let attempts = (0..20).map(|_| {
        let ledger = services.ledger.clone();
        tokio::spawn(async move { ledger.try_debit(usage(account.id, 1)).await })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    let rejected = results
        .iter()
        .filter(|r| matches!(r, Err(LedgerError::InsufficientCredits { .. })))
        .count();
    assert_eq!(succeeded, 5);
    assert_eq!(rejected, 15);

    let balance = services.ledger.get_balance(account.id, None).await.unwrap();
    assert_eq!(balance.credits, 0);
    assert_eq!(balance.history.len(), 5);
    assert!(balance.history.iter().all(|e| e.kind == LedgerEntryKind::Usage));
}

#[tokio::test]
async fn test_history_chains_balances() {
    let (_db, services) = setup_services(StubGenerator::ok("unused")).await;
    let account = open_account(&services, "Chain", 2).await;
    let ledger = &services.ledger;

    ledger
        .credit(LedgerRequest::new(account.id, 10, LedgerEntryKind::Purchase, "Purchased 10 credits"))
        .await
        .unwrap();
    ledger.try_debit(usage(account.id, 3)).await.unwrap();
    ledger
        .credit(LedgerRequest::new(account.id, 2, LedgerEntryKind::Refund, "Refund"))
        .await
        .unwrap();

    let balance = ledger.get_balance(account.id, None).await.unwrap();
    assert_eq!(balance.credits, 11);

    let mut expected_before = 2;
    for entry in &balance.history {
        assert_eq!(entry.balance_before, expected_before);
        // 扣费流水的金额为负
        assert_eq!(entry.amount < 0, entry.kind == LedgerEntryKind::Usage);
        assert_eq!(entry.balance_after, entry.balance_before + entry.amount);
        expected_before = entry.balance_after;
    }
    assert_eq!(expected_before, balance.credits);
}

#[tokio::test]
async fn test_insufficient_credits_leaves_balance_untouched() {
    let (_db, services) = setup_services(StubGenerator::ok("unused")).await;
    let account = open_account(&services, "Broke", 1).await;

    let err = services
        .ledger
        .try_debit(usage(account.id, 2))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        LedgerError::InsufficientCredits {
            available: 1,
            required: 2
        }
    );

    let balance = services.ledger.get_balance(account.id, None).await.unwrap();
    assert_eq!(balance.credits, 1);
    assert!(balance.history.is_empty());
}

#[tokio::test]
async fn test_repeated_idempotency_key_debits_once() {
    let (_db, services) = setup_services(StubGenerator::ok("unused")).await;
    let account = open_account(&services, "Retry", 5).await;

    let attempts = (0..5).map(|_| {
        let ledger = services.ledger.clone();
        let request = usage(account.id, 2).with_idempotency_key("generation:retry-1");
        async move { ledger.try_debit(request).await }
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    assert_eq!(results.iter().filter(|c| !c.replayed).count(), 1);
    assert!(results.iter().all(|c| c.balance_after == 3));

    let balance = services.ledger.get_balance(account.id, None).await.unwrap();
    assert_eq!(balance.credits, 3);
    assert_eq!(balance.history.len(), 1);
}

#[tokio::test]
async fn test_unlimited_plan_is_never_debited() {
    let (db, services) = setup_services(StubGenerator::ok("unused")).await;
    let account = open_account(&services, "Agency", 0).await;
    AccountRepositoryImpl::new(db)
        .update_plan(account.id, Plan::Unlimited)
        .await
        .unwrap();

    for _ in 0..3 {
        let change = services
            .ledger
            .try_debit(usage(account.id, 1))
            .await
            .unwrap();
        assert_eq!(change.charged(), 0);
        assert!(change.entry_id.is_none());
    }

    let balance = services.ledger.get_balance(account.id, None).await.unwrap();
    assert_eq!(balance.credits, 0);
    assert_eq!(balance.plan, Plan::Unlimited);
    assert!(balance.history.is_empty());
}

#[tokio::test]
async fn test_refund_is_idempotent() {
    let (_db, services) = setup_services(StubGenerator::ok("unused")).await;
    let account = open_account(&services, "Refund", 3).await;
    let ledger = &services.ledger;

    let debit = ledger.try_debit(usage(account.id, 1)).await.unwrap();
    let key = format!("refund:{}", debit.entry_id.unwrap());

    let first = ledger.refund(account.id, 1, "Refund", key.clone()).await.unwrap();
    let second = ledger.refund(account.id, 1, "Refund", key).await.unwrap();
    assert!(!first.replayed);
    assert!(second.replayed);
    assert_eq!(second.balance_after, 3);

    let balance = ledger.get_balance(account.id, None).await.unwrap();
    assert_eq!(balance.credits, 3);
    let kinds: Vec<_> = balance.history.iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![LedgerEntryKind::Usage, LedgerEntryKind::Refund]);
}

#[tokio::test]
async fn test_rejects_invalid_amount_and_unknown_account() {
    let (_db, services) = setup_services(StubGenerator::ok("unused")).await;
    let account = open_account(&services, "Edge", 3).await;

    assert_eq!(
        services.ledger.try_debit(usage(account.id, 0)).await.unwrap_err(),
        LedgerError::InvalidAmount(0)
    );

    let missing = Uuid::new_v4();
    assert_eq!(
        services.ledger.try_debit(usage(missing, 1)).await.unwrap_err(),
        LedgerError::AccountNotFound(missing)
    );
    assert_eq!(
        services.ledger.get_balance(missing, None).await.unwrap_err(),
        LedgerError::AccountNotFound(missing)
    );
}

#[tokio::test]
async fn test_history_limit_keeps_latest_entries() {
    let (_db, services) = setup_services(StubGenerator::ok("unused")).await;
    let account = open_account(&services, "Busy", 10).await;

    for _ in 0..4 {
        services.ledger.try_debit(usage(account.id, 1)).await.unwrap();
    }

    let balance = services.ledger.get_balance(account.id, Some(2)).await.unwrap();
    assert_eq!(balance.history.len(), 2);
    assert_eq!(balance.history[0].balance_after, 7);
    assert_eq!(balance.history[1].balance_after, 6);
}
