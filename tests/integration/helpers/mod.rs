// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use scriptmint::config::settings::{DatabaseSettings, Settings};
use scriptmint::domain::models::account::Account;
use scriptmint::domain::services::text_generator::{
    GenerationError, GenerationPrompt, TextGenerator,
};
use scriptmint::infrastructure::database::connection;
use scriptmint::infrastructure::database::entities::affiliate_entries;
use scriptmint::presentation::routes::{self, AppServices};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

pub const TEST_WEBHOOK_SECRET: &str = "test-webhook-secret";

/// 每个测试独立的内存数据库，已执行迁移
pub async fn setup_db() -> Arc<DatabaseConnection> {
    let settings = DatabaseSettings {
        url: "sqlite::memory:".to_string(),
        max_connections: Some(1),
        min_connections: Some(1),
        connect_timeout: Some(10),
        idle_timeout: None,
        run_migrations: true,
    };
    let db = connection::create_pool(&settings)
        .await
        .expect("Failed to connect to in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    Arc::new(db)
}

/// 临时文件数据库，连接池内的多个连接可以真正并发写入
///
/// 返回的 `TempDir` 需要在测试结束前保持存活。
pub async fn setup_file_db(max_connections: u32) -> (TempDir, Arc<DatabaseConnection>) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let settings = DatabaseSettings {
        url: format!("sqlite://{}?mode=rwc", dir.path().join("ledger.db").display()),
        max_connections: Some(max_connections),
        min_connections: Some(1),
        connect_timeout: Some(10),
        idle_timeout: None,
        run_migrations: true,
    };
    let db = connection::create_pool(&settings)
        .await
        .expect("Failed to open file database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    (dir, Arc::new(db))
}

pub fn test_settings() -> Settings {
    let mut settings = Settings::new().expect("Failed to load settings");
    settings.database.url = "sqlite::memory:".to_string();
    settings.ledger.generation_cost = 1;
    settings.ledger.signup_credits = 3;
    settings.referral.reward_credits = 5;
    settings.webhook.secret = TEST_WEBHOOK_SECRET.to_string();
    settings.webhook.tolerance_seconds = 300;
    settings.generation.timeout_seconds = 5;
    settings
}

/// 可控的文本生成器
pub struct StubGenerator {
    response: Result<String, GenerationError>,
    /// 前 N 次调用返回失败，之后返回 `response`
    failures_before_success: usize,
    calls: AtomicUsize,
}

impl StubGenerator {
    pub fn ok(text: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(text.to_string()),
            failures_before_success: 0,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn fails_then_ok(failures: usize, text: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(text.to_string()),
            failures_before_success: failures,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Err(GenerationError::Failed(message.to_string())),
            failures_before_success: 0,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, _prompt: &GenerationPrompt) -> Result<String, GenerationError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures_before_success {
            return Err(GenerationError::Failed("upstream unavailable".to_string()));
        }
        self.response.clone()
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub db: Arc<DatabaseConnection>,
    pub services: AppServices,
    pub generator: Arc<StubGenerator>,
}

pub async fn create_test_app(generator: Arc<StubGenerator>) -> TestApp {
    let db = setup_db().await;
    let settings = Arc::new(test_settings());
    let services = AppServices::build(settings, db.clone(), generator.clone());
    let server = TestServer::new(routes::routes(services.clone()))
        .expect("Failed to start test server");

    TestApp {
        server,
        db,
        services,
        generator,
    }
}

/// 直接通过账本开户
pub async fn open_account(services: &AppServices, name: &str, credits: i64) -> Account {
    services
        .ledger
        .open_account(
            Some(format!("{}-{}@example.com", name.to_lowercase(), Uuid::new_v4())),
            Some(name.to_string()),
            credits,
        )
        .await
        .expect("Failed to open account")
}

pub async fn seed_affiliate(
    db: &DatabaseConnection,
    product_name: &str,
    keywords: &str,
    link_target: &str,
    active: bool,
) -> Uuid {
    let id = Uuid::new_v4();
    let now = Utc::now().fixed_offset();
    affiliate_entries::ActiveModel {
        id: Set(id),
        product_name: Set(product_name.to_string()),
        keywords: Set(keywords.to_string()),
        link_target: Set(link_target.to_string()),
        category: Set(None),
        active: Set(active),
        position: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to seed affiliate entry");
    id
}

/// 不启动 HTTP 服务，只装配服务层
pub async fn setup_services(generator: Arc<StubGenerator>) -> (Arc<DatabaseConnection>, AppServices) {
    let db = setup_db().await;
    let services = services_on(db.clone(), generator);
    (db, services)
}

pub fn services_on(db: Arc<DatabaseConnection>, generator: Arc<StubGenerator>) -> AppServices {
    AppServices::build(Arc::new(test_settings()), db, generator)
}
