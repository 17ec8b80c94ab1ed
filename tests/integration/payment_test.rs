// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use scriptmint::application::dto::payment_event::PaymentCompletedEvent;
use scriptmint::application::use_cases::handle_payment::PaymentOutcome;
use scriptmint::domain::models::account::Plan;
use scriptmint::domain::models::credits::LedgerEntryKind;
use scriptmint::domain::models::referral::ReferralRewardOutcome;
use scriptmint::domain::repositories::credits_repository::LedgerRequest;
use uuid::Uuid;

use super::helpers::{open_account, setup_services, StubGenerator};

fn purchase(account_id: Uuid, credits: i64, session_id: &str) -> PaymentCompletedEvent {
    PaymentCompletedEvent {
        account_id: Some(account_id),
        account_email: None,
        amount_cents: credits * 100,
        credits_granted: credits,
        session_id: session_id.to_string(),
        is_subscription: false,
        plan_id: None,
    }
}

#[tokio::test]
async fn test_purchase_credits_once_per_session() {
    let (_db, services) = setup_services(StubGenerator::ok("unused")).await;
    let account = open_account(&services, "Buyer", 3).await;

    let first = services
        .handle_payment
        .execute(purchase(account.id, 10, "cs_test_1"))
        .await
        .unwrap();
    let second = services
        .handle_payment
        .execute(purchase(account.id, 10, "cs_test_1"))
        .await
        .unwrap();

    match (first, second) {
        (
            PaymentOutcome::CreditsPurchased {
                balance_after: first_balance,
                replayed: false,
                ..
            },
            PaymentOutcome::CreditsPurchased {
                balance_after: second_balance,
                replayed: true,
                ..
            },
        ) => {
            assert_eq!(first_balance, 13);
            assert_eq!(second_balance, 13);
        }
        other => panic!("unexpected outcomes: {:?}", other),
    }

    let balance = services.ledger.get_balance(account.id, None).await.unwrap();
    assert_eq!(balance.credits, 13);
    assert_eq!(balance.history.len(), 1);
    assert_eq!(balance.history[0].kind, LedgerEntryKind::Purchase);
}

#[tokio::test]
async fn test_first_purchase_rewards_referrer_once() {
    let (_db, services) = setup_services(StubGenerator::ok("unused")).await;
    let referrer = open_account(&services, "Referrer", 0).await;
    let referee = open_account(&services, "Referee", 3).await;
    let code = services
        .referrals
        .get_or_create_referral_code(referrer.id)
        .await
        .unwrap();
    services
        .referrals
        .apply_referral_code(referee.id, &code)
        .await
        .unwrap();

    let first = services
        .handle_payment
        .execute(purchase(referee.id, 10, "cs_first"))
        .await
        .unwrap();
    let second = services
        .handle_payment
        .execute(purchase(referee.id, 10, "cs_second"))
        .await
        .unwrap();

    assert!(matches!(
        first,
        PaymentOutcome::CreditsPurchased {
            referral: Some(ReferralRewardOutcome::Rewarded { credits: 5, .. }),
            ..
        }
    ));
    assert!(matches!(
        second,
        PaymentOutcome::CreditsPurchased {
            referral: Some(ReferralRewardOutcome::AlreadyClaimed),
            ..
        }
    ));

    let referrer_balance = services.ledger.get_balance(referrer.id, None).await.unwrap();
    assert_eq!(referrer_balance.credits, 5);
}

#[tokio::test]
async fn test_agency_subscription_stops_metering() {
    let (_db, services) = setup_services(StubGenerator::ok("unused")).await;
    let account = open_account(&services, "Agency", 0).await;

    let outcome = services
        .handle_payment
        .execute(PaymentCompletedEvent {
            account_id: None,
            account_email: account.email.clone(),
            amount_cents: 9900,
            credits_granted: 0,
            session_id: "cs_sub_1".to_string(),
            is_subscription: true,
            plan_id: Some("agency".to_string()),
        })
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        PaymentOutcome::SubscriptionActivated {
            plan: Plan::Unlimited,
            ..
        }
    ));

    let change = services
        .ledger
        .try_debit(LedgerRequest::new(
            account.id,
            1,
            LedgerEntryKind::Usage,
            "Script generation",
        ))
        .await
        .unwrap();
    assert_eq!(change.charged(), 0);
}

#[tokio::test]
async fn test_unknown_account_is_ignored() {
    let (_db, services) = setup_services(StubGenerator::ok("unused")).await;

    let outcome = services
        .handle_payment
        .execute(PaymentCompletedEvent {
            account_id: Some(Uuid::new_v4()),
            account_email: Some("nobody@example.com".to_string()),
            amount_cents: 500,
            credits_granted: 5,
            session_id: "cs_orphan".to_string(),
            is_subscription: false,
            plan_id: None,
        })
        .await
        .unwrap();

    assert!(matches!(outcome, PaymentOutcome::Ignored { .. }));
}
