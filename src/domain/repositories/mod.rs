// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 该模块定义了领域层的仓库接口，遵循依赖倒置原则。
/// 仓库接口定义了数据持久化的抽象契约，具体实现由基础设施层提供。
///
/// 包含的仓库接口：
/// - 账户仓库（account_repository）：账户、套餐和推荐码
/// - 积分仓库（credits_repository）：原子扣费、入账和流水
/// - 联盟商品仓库（affiliate_repository）：读取启用的商品目录
/// - 推荐仓库（referral_repository）：推荐关系和奖励状态
/// - 生成记录仓库（generation_log_repository）：脚本生成日志
pub mod account_repository;
pub mod affiliate_repository;
pub mod credits_repository;
pub mod generation_log_repository;
pub mod referral_repository;

use sea_orm::{DbErr, SqlErr, UpdateResult};
use thiserror::Error;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
    /// 唯一约束冲突
    #[error("Record already exists")]
    AlreadyExists,
}

/// 条件更新的结果
///
/// 存储层的条件更新只报告命中的行数，调用方据此判断更新是否生效。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionalUpdateResult {
    pub matched_count: u64,
}

impl ConditionalUpdateResult {
    pub fn applied(&self) -> bool {
        self.matched_count > 0
    }
}

impl From<UpdateResult> for ConditionalUpdateResult {
    fn from(result: UpdateResult) -> Self {
        Self {
            matched_count: result.rows_affected,
        }
    }
}

/// 判断数据库错误是否为唯一约束冲突
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
