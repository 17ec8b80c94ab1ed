// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含数据库、服务器、积分账本、联盟目录、推荐、LLM、Webhook 和指标等配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 服务器配置
    pub server: ServerSettings,
    /// 积分账本配置
    pub ledger: LedgerSettings,
    /// 联盟商品目录配置
    pub catalog: CatalogSettings,
    /// 推荐奖励配置
    pub referral: ReferralSettings,
    /// 生成流程配置
    pub generation: GenerationSettings,
    /// LLM 配置
    pub llm: LlmSettings,
    /// Webhook 配置
    pub webhook: WebhookSettings,
    /// 指标导出配置
    pub metrics: MetricsSettings,
}

/// 数据库配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
    /// 启动时是否执行迁移
    pub run_migrations: bool,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 积分账本配置
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerSettings {
    /// 每次生成消耗的积分
    pub generation_cost: i64,
    /// 新账户赠送积分
    pub signup_credits: i64,
    /// 存储调用超时（毫秒）
    pub store_timeout_ms: u64,
}

/// 联盟商品目录配置
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    /// 缓存有效期（秒）
    pub ttl_seconds: u64,
    /// 拉取超时（毫秒）
    pub fetch_timeout_ms: u64,
}

/// 推荐奖励配置
#[derive(Debug, Clone, Deserialize)]
pub struct ReferralSettings {
    /// 每次成功推荐奖励的积分
    pub reward_credits: i64,
}

/// 生成流程配置
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationSettings {
    /// 整个生成调用的超时（秒），超时按生成失败处理并退款
    pub timeout_seconds: u64,
}

/// LLM 配置
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base_url: String,
    /// 单次生成超时（秒）
    pub timeout_seconds: u64,
}

/// Webhook配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookSettings {
    /// Webhook签名密钥
    pub secret: String,
    /// 时间戳允许的偏差（秒）
    pub tolerance_seconds: i64,
}

/// 指标导出配置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    pub enabled: bool,
    pub listen_addr: String,
}

impl LedgerSettings {
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

impl CatalogSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

impl GenerationSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl LlmSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载默认值、`config/default`、`config/{APP_ENVIRONMENT}` 和
    /// `SCRIPTMINT__` 前缀的环境变量，后者覆盖前者
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("SCRIPTMINT").separator("__"))
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            // Start with default settings
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            // Default DB pool settings
            .set_default("database.url", "sqlite://scriptmint.db?mode=rwc")?
            .set_default("database.max_connections", 20)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            .set_default("database.run_migrations", true)?
            // Default ledger settings
            .set_default("ledger.generation_cost", 1)?
            .set_default("ledger.signup_credits", 3)?
            .set_default("ledger.store_timeout_ms", 5000)?
            // Default catalog settings
            .set_default("catalog.ttl_seconds", 3600)?
            .set_default("catalog.fetch_timeout_ms", 3000)?
            // Default referral settings
            .set_default("referral.reward_credits", 5)?
            .set_default("generation.timeout_seconds", 90)?
            // Default LLM settings
            .set_default("llm.model", "gpt-4o-mini")?
            .set_default("llm.api_base_url", "https://api.openai.com/v1")?
            .set_default("llm.timeout_seconds", 60)?
            // Default Webhook settings
            .set_default("webhook.secret", "your-secret-key")?
            .set_default("webhook.tolerance_seconds", 300)?
            // Default metrics settings
            .set_default("metrics.enabled", true)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
