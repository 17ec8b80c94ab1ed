// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use futures::future::join_all;
use scriptmint::domain::models::credits::LedgerEntryKind;
use scriptmint::domain::models::referral::ReferralRewardOutcome;
use scriptmint::domain::services::referral_service::ReferralError;

use super::helpers::{open_account, setup_services, StubGenerator};

#[tokio::test]
async fn test_referral_code_is_stable() {
    let (_db, services) = setup_services(StubGenerator::ok("unused")).await;
    let alice = open_account(&services, "Alice", 3).await;

    let first = services
        .referrals
        .get_or_create_referral_code(alice.id)
        .await
        .unwrap();
    let second = services
        .referrals
        .get_or_create_referral_code(alice.id)
        .await
        .unwrap();

    assert!(first.starts_with("ALIC"));
    assert_eq!(first.len(), 10);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_reward_granted_exactly_once() {
    let (_db, services) = setup_services(StubGenerator::ok("unused")).await;
    let referrer = open_account(&services, "Referrer", 0).await;
    let referee = open_account(&services, "Referee", 3).await;

    let code = services
        .referrals
        .get_or_create_referral_code(referrer.id)
        .await
        .unwrap();
    // 推荐码大小写不敏感
    services
        .referrals
        .apply_referral_code(referee.id, &code.to_lowercase())
        .await
        .unwrap();

    let attempts = (0..5).map(|_| {
        let referrals = services.referrals.clone();
        async move { referrals.evaluate(referee.id).await }
    });
    let outcomes: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    let rewarded = outcomes
        .iter()
        .filter(|o| matches!(o, ReferralRewardOutcome::Rewarded { .. }))
        .count();
    assert_eq!(rewarded, 1);
    assert!(outcomes.iter().all(|o| matches!(
        o,
        ReferralRewardOutcome::Rewarded { .. } | ReferralRewardOutcome::AlreadyClaimed
    )));

    let balance = services.ledger.get_balance(referrer.id, None).await.unwrap();
    assert_eq!(balance.credits, 5);
    assert_eq!(balance.history.len(), 1);
    assert_eq!(balance.history[0].kind, LedgerEntryKind::Purchase);
    assert!(balance.history[0].description.starts_with("Referral bonus"));

    let stats = services.referrals.stats(referrer.id).await.unwrap();
    assert_eq!(stats.total_referrals, 1);
    assert_eq!(stats.successful_referrals, 1);
    assert_eq!(stats.total_credits_earned, 5);
    assert_eq!(stats.pending_rewards, 0);
}

#[tokio::test]
async fn test_evaluate_without_referral() {
    let (_db, services) = setup_services(StubGenerator::ok("unused")).await;
    let loner = open_account(&services, "Loner", 3).await;

    assert_eq!(
        services.referrals.evaluate(loner.id).await.unwrap(),
        ReferralRewardOutcome::NoReferral
    );
}

#[tokio::test]
async fn test_self_referral_rejected() {
    let (_db, services) = setup_services(StubGenerator::ok("unused")).await;
    let alice = open_account(&services, "Alice", 3).await;
    let code = services
        .referrals
        .get_or_create_referral_code(alice.id)
        .await
        .unwrap();

    let err = services
        .referrals
        .apply_referral_code(alice.id, &code)
        .await
        .unwrap_err();
    assert!(matches!(err, ReferralError::SelfReferral));
}

#[tokio::test]
async fn test_second_referral_code_rejected() {
    let (_db, services) = setup_services(StubGenerator::ok("unused")).await;
    let first = open_account(&services, "First", 0).await;
    let second = open_account(&services, "Second", 0).await;
    let referee = open_account(&services, "Referee", 3).await;

    let first_code = services.referrals.get_or_create_referral_code(first.id).await.unwrap();
    let second_code = services.referrals.get_or_create_referral_code(second.id).await.unwrap();

    services
        .referrals
        .apply_referral_code(referee.id, &first_code)
        .await
        .unwrap();
    let err = services
        .referrals
        .apply_referral_code(referee.id, &second_code)
        .await
        .unwrap_err();
    assert!(matches!(err, ReferralError::AlreadyReferred));

    assert_eq!(services.referrals.list_referrals(first.id).await.unwrap().len(), 1);
    assert!(services.referrals.list_referrals(second.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_code_rejected() {
    let (_db, services) = setup_services(StubGenerator::ok("unused")).await;
    let referee = open_account(&services, "Referee", 3).await;

    let err = services
        .referrals
        .apply_referral_code(referee.id, "NOPE000000")
        .await
        .unwrap_err();
    assert!(matches!(err, ReferralError::InvalidReferralCode));
}
