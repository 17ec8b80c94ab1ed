// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::counter;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::{timeout, Instant};
use tracing::{debug, info, warn};

use crate::domain::models::affiliate::AffiliateEntry;
use crate::domain::repositories::affiliate_repository::AffiliateRepository;
use crate::utils::keyword_matcher::KeywordPattern;

/// 默认缓存有效期：一小时
pub const DEFAULT_CATALOG_TTL: Duration = Duration::from_secs(3600);

#[derive(Error, Debug, Clone)]
pub enum CatalogError {
    #[error("Affiliate catalog unavailable: {0}")]
    Unavailable(String),
}

/// 目录中的一个条目及其预编译的关键词模式
#[derive(Debug, Clone)]
pub struct CatalogItem {
    pub entry: AffiliateEntry,
    patterns: Vec<KeywordPattern>,
}

impl CatalogItem {
    pub fn new(entry: AffiliateEntry) -> Self {
        let patterns = KeywordPattern::compile_all(&entry.keywords);
        Self { entry, patterns }
    }

    pub fn patterns(&self) -> &[KeywordPattern] {
        &self.patterns
    }
}

/// 目录快照
///
/// 只包含启用的条目；刷新时整体替换，读者不会看到部分更新的状态。
#[derive(Debug)]
pub struct CatalogSnapshot {
    items: Vec<CatalogItem>,
    fetched_at: Instant,
}

impl CatalogSnapshot {
    pub fn new(entries: Vec<AffiliateEntry>) -> Self {
        let items = entries
            .into_iter()
            .filter(|entry| entry.active)
            .map(CatalogItem::new)
            .collect();
        Self {
            items,
            fetched_at: Instant::now(),
        }
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

/// 联盟商品目录服务
///
/// 进程内唯一的共享状态。快照指针放在 `parking_lot::RwLock` 中，读者只在锁内
/// 克隆一个 `Arc`；刷新由异步互斥锁串行化，并在拿到锁后再次检查新鲜度，
/// 避免并发调用者重复拉取。
pub struct AffiliateCatalog {
    repository: Arc<dyn AffiliateRepository>,
    ttl: Duration,
    fetch_timeout: Duration,
    snapshot: RwLock<Option<Arc<CatalogSnapshot>>>,
    /// 每次失效加一；刷新期间发生过失效时，拉取结果不写回缓存
    epoch: AtomicU64,
    refresh_gate: Mutex<()>,
}

impl AffiliateCatalog {
    pub fn new(
        repository: Arc<dyn AffiliateRepository>,
        ttl: Duration,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            ttl,
            fetch_timeout,
            snapshot: RwLock::new(None),
            epoch: AtomicU64::new(0),
            refresh_gate: Mutex::new(()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 获取启用的商品目录
    ///
    /// 缓存未过期时直接返回；否则从仓库拉取。拉取失败或超时返回
    /// `CatalogError::Unavailable`，不会返回过期数据。
    pub async fn get_active_entries(&self) -> Result<Arc<CatalogSnapshot>, CatalogError> {
        if let Some(snapshot) = self.fresh_snapshot() {
            counter!("catalog_cache_hits_total").increment(1);
            return Ok(snapshot);
        }

        let _gate = self.refresh_gate.lock().await;
        if let Some(snapshot) = self.fresh_snapshot() {
            counter!("catalog_cache_hits_total").increment(1);
            return Ok(snapshot);
        }

        let epoch = self.epoch.load(Ordering::Acquire);
        let entries = match timeout(self.fetch_timeout, self.repository.find_active()).await {
            Ok(Ok(entries)) => entries,
            Ok(Err(e)) => {
                counter!("catalog_refresh_failures_total").increment(1);
                warn!("Failed to load affiliate catalog: {}", e);
                return Err(CatalogError::Unavailable(e.to_string()));
            }
            Err(_) => {
                counter!("catalog_refresh_failures_total").increment(1);
                warn!(
                    "Loading affiliate catalog timed out after {:?}",
                    self.fetch_timeout
                );
                return Err(CatalogError::Unavailable(format!(
                    "fetch timed out after {:?}",
                    self.fetch_timeout
                )));
            }
        };

        let snapshot = Arc::new(CatalogSnapshot::new(entries));
        if self.epoch.load(Ordering::Acquire) == epoch {
            *self.snapshot.write() = Some(Arc::clone(&snapshot));
        }
        counter!("catalog_refreshes_total").increment(1);
        debug!(entries = snapshot.items.len(), "Affiliate catalog refreshed");

        Ok(snapshot)
    }

    /// 丢弃缓存，下一次读取会重新拉取
    pub fn invalidate(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
        *self.snapshot.write() = None;
        info!("Affiliate catalog cache invalidated");
    }

    fn fresh_snapshot(&self) -> Option<Arc<CatalogSnapshot>> {
        self.snapshot
            .read()
            .as_ref()
            .filter(|snapshot| snapshot.is_fresh(self.ttl))
            .cloned()
    }
}

#[cfg(test)]
#[path = "affiliate_catalog_test.rs"]
mod tests;
