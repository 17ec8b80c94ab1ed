// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{Extension, Json};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::domain::services::affiliate_catalog::AffiliateCatalog;

/// 使联盟商品缓存失效，下一次匹配会重新拉取
pub async fn invalidate_catalog(
    Extension(catalog): Extension<Arc<AffiliateCatalog>>,
) -> Json<Value> {
    catalog.invalidate();
    info!("Affiliate catalog invalidated via admin endpoint");
    Json(json!({ "success": true }))
}
