// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::describe_counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

use crate::config::settings::MetricsSettings;

/// 初始化指标系统
///
/// 安装 Prometheus 导出器并注册业务指标说明。地址无效或端口被占用时只记录警告，
/// 不影响服务启动。
pub fn init_metrics(settings: &MetricsSettings) {
    if !settings.enabled {
        info!("Metrics exporter disabled");
        return;
    }

    let addr: SocketAddr = match settings.listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Invalid metrics address {}: {}", settings.listen_addr, e);
            return;
        }
    };

    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!("Failed to install Prometheus recorder: {}. This might happen if the port is already in use.", e);
        return;
    }

    describe_metrics();
    info!("Metrics exporter listening on {}", addr);
}

fn describe_metrics() {
    describe_counter!("credits_debited_total", "Total credits debited for usage");
    describe_counter!(
        "credits_credited_total",
        "Total credits added, labelled by entry kind"
    );
    describe_counter!(
        "credits_insufficient_total",
        "Debits rejected because of insufficient credits"
    );
    describe_counter!(
        "ledger_store_timeouts_total",
        "Ledger store calls that exceeded the timeout"
    );
    describe_counter!("catalog_refreshes_total", "Affiliate catalog refreshes");
    describe_counter!(
        "catalog_cache_hits_total",
        "Affiliate catalog reads served from cache"
    );
    describe_counter!(
        "catalog_refresh_failures_total",
        "Affiliate catalog refreshes that failed or timed out"
    );
    describe_counter!(
        "affiliate_links_inserted_total",
        "Affiliate links inserted into generated scripts"
    );
    describe_counter!("generations_total", "Script generations by status");
    describe_counter!(
        "generation_refund_failures_total",
        "Refunds that could not be written after a failed generation"
    );
    describe_counter!("referral_rewards_total", "Referral rewards granted");
}
