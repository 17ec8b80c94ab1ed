// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    routing::{get, post},
    Extension, Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::application::use_cases::generate_script::GenerateScriptUseCase;
use crate::application::use_cases::handle_payment::HandlePaymentUseCase;
use crate::config::settings::Settings;
use crate::domain::services::affiliate_catalog::AffiliateCatalog;
use crate::domain::services::credit_ledger::CreditLedger;
use crate::domain::services::match_engine::MatchEngine;
use crate::domain::services::referral_service::ReferralService;
use crate::domain::services::text_generator::TextGenerator;
use crate::infrastructure::repositories::{
    account_repo_impl::AccountRepositoryImpl, affiliate_repo_impl::AffiliateRepositoryImpl,
    credits_repo_impl::CreditsRepositoryImpl, generation_log_repo_impl::GenerationLogRepositoryImpl,
    referral_repo_impl::ReferralRepositoryImpl,
};
use crate::infrastructure::services::webhook_signature::WebhookSignatureVerifier;
use crate::presentation::handlers::{
    account_handler, catalog_handler, credits_handler, generation_handler, payment_handler,
    referral_handler,
};

/// 路由依赖的服务集合，每个服务以 `Extension` 注入
#[derive(Clone)]
pub struct AppServices {
    pub settings: Arc<Settings>,
    pub ledger: Arc<CreditLedger>,
    pub catalog: Arc<AffiliateCatalog>,
    pub referrals: Arc<ReferralService>,
    pub generate_script: Arc<GenerateScriptUseCase>,
    pub handle_payment: Arc<HandlePaymentUseCase>,
    pub webhook_verifier: Arc<WebhookSignatureVerifier>,
}

impl AppServices {
    /// 基于数据库连接装配所有服务
    pub fn build(
        settings: Arc<Settings>,
        db: Arc<DatabaseConnection>,
        text_generator: Arc<dyn TextGenerator>,
    ) -> Self {
        let account_repo = Arc::new(AccountRepositoryImpl::new(db.clone()));
        let credits_repo = Arc::new(CreditsRepositoryImpl::new(db.clone()));
        let affiliate_repo = Arc::new(AffiliateRepositoryImpl::new(db.clone()));
        let referral_repo = Arc::new(ReferralRepositoryImpl::new(db.clone()));
        let generation_logs = Arc::new(GenerationLogRepositoryImpl::new(db));

        let ledger = Arc::new(CreditLedger::new(
            credits_repo,
            account_repo.clone(),
            settings.ledger.store_timeout(),
        ));
        let catalog = Arc::new(AffiliateCatalog::new(
            affiliate_repo,
            settings.catalog.ttl(),
            settings.catalog.fetch_timeout(),
        ));
        let referrals = Arc::new(ReferralService::new(
            referral_repo,
            account_repo.clone(),
            ledger.clone(),
            settings.referral.reward_credits,
        ));
        let generate_script = Arc::new(GenerateScriptUseCase::new(
            ledger.clone(),
            Arc::new(MatchEngine::new(catalog.clone())),
            text_generator,
            generation_logs,
            settings.ledger.generation_cost,
            settings.generation.timeout(),
        ));
        let handle_payment = Arc::new(HandlePaymentUseCase::new(
            ledger.clone(),
            account_repo,
            referrals.clone(),
        ));
        let webhook_verifier = Arc::new(WebhookSignatureVerifier::new(
            settings.webhook.secret.clone(),
            settings.webhook.tolerance_seconds,
        ));

        Self {
            settings,
            ledger,
            catalog,
            referrals,
            generate_script,
            handle_payment,
            webhook_verifier,
        }
    }
}

/// 创建应用路由
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes(services: AppServices) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version))
        .route("/v1/accounts", post(account_handler::create_account))
        .route(
            "/v1/webhooks/payment",
            post(payment_handler::payment_completed),
        );

    // 需要 X-Account-Id 的接口
    let account_routes = Router::new()
        .route("/v1/generate", post(generation_handler::generate_script))
        .route("/v1/credits", get(credits_handler::get_credits))
        .route("/v1/referrals", get(referral_handler::list_referrals))
        .route("/v1/referrals/code", get(referral_handler::get_referral_code))
        .route(
            "/v1/referrals/apply",
            post(referral_handler::apply_referral_code),
        )
        .route("/v1/referrals/stats", get(referral_handler::referral_stats));

    let admin_routes = Router::new().route(
        "/v1/admin/catalog/invalidate",
        post(catalog_handler::invalidate_catalog),
    );

    Router::new()
        .merge(public_routes)
        .merge(account_routes)
        .merge(admin_routes)
        .layer(Extension(services.settings))
        .layer(Extension(services.ledger))
        .layer(Extension(services.catalog))
        .layer(Extension(services.referrals))
        .layer(Extension(services.generate_script))
        .layer(Extension(services.handle_payment))
        .layer(Extension(services.webhook_verifier))
        .layer(TraceLayer::new_for_http())
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
