// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::generation_request::{
    GenerateScriptRequestDto, GenerateScriptResponseDto,
};
use crate::domain::models::credits::{BalanceChange, LedgerEntryKind};
use crate::domain::models::generation::{GenerationLog, GenerationStatus};
use crate::domain::repositories::credits_repository::LedgerRequest;
use crate::domain::repositories::generation_log_repository::GenerationLogRepository;
use crate::domain::services::credit_ledger::{CreditLedger, LedgerError};
use crate::domain::services::link_injector::LinkInjector;
use crate::domain::services::match_engine::MatchEngine;
use crate::domain::services::text_generator::{GenerationError, GenerationPrompt, TextGenerator};

/// 每次生成默认消耗的积分
pub const DEFAULT_GENERATION_COST: i64 = 1;

#[derive(Error, Debug)]
pub enum GenerateScriptError {
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("Script generation failed: {0}")]
    Generation(#[from] GenerationError),
}

/// 脚本生成用例
///
/// 扣费 → 生成 → 联盟链接注入 → 记录。生成失败时退还本次扣除的积分；
/// 联盟链接注入失败只会让本次结果不带链接，不影响请求。
pub struct GenerateScriptUseCase {
    ledger: Arc<CreditLedger>,
    match_engine: Arc<MatchEngine>,
    text_generator: Arc<dyn TextGenerator>,
    generation_logs: Arc<dyn GenerationLogRepository>,
    cost: i64,
    generation_timeout: Duration,
}

impl GenerateScriptUseCase {
    pub fn new(
        ledger: Arc<CreditLedger>,
        match_engine: Arc<MatchEngine>,
        text_generator: Arc<dyn TextGenerator>,
        generation_logs: Arc<dyn GenerationLogRepository>,
        cost: i64,
        generation_timeout: Duration,
    ) -> Self {
        Self {
            ledger,
            match_engine,
            text_generator,
            generation_logs,
            cost,
            generation_timeout,
        }
    }

    pub async fn execute(
        &self,
        account_id: Uuid,
        request: GenerateScriptRequestDto,
    ) -> Result<GenerateScriptResponseDto, GenerateScriptError> {
        request
            .validate()
            .map_err(|e| GenerateScriptError::Validation(e.to_string()))?;

        let generation_id = Uuid::new_v4();
        let change = self.charge(account_id, &request).await?;

        let prompt = GenerationPrompt {
            topic: request.topic.clone(),
            target_audience: request.target_audience.clone(),
            tone: request.tone.clone(),
        };

        let generated = match self.generate(&prompt).await {
            Ok(text) => text,
            Err(err) => {
                warn!(account_id = %account_id, generation_id = %generation_id, "Generation failed: {}", err);
                self.compensate(account_id, &change).await;

                let mut log = self.log_for(generation_id, account_id, &request, GenerationStatus::Failed);
                log.error_message = Some(err.to_string());
                self.record(log).await;

                counter!("generations_total", "status" => "failed").increment(1);
                return Err(err.into());
            }
        };

        let (script, links_inserted) = self.enrich(generated).await;

        let mut log = self.log_for(generation_id, account_id, &request, GenerationStatus::Success);
        log.generated_script = Some(script.clone());
        log.affiliate_links_inserted = links_inserted as i32;
        log.credits_used = if change.replayed { 0 } else { change.charged() };
        self.record(log).await;

        counter!("generations_total", "status" => "success").increment(1);
        info!(
            account_id = %account_id,
            generation_id = %generation_id,
            links_inserted,
            "Script generated"
        );

        let credits_remaining = if change.replayed {
            self.live_balance(account_id, change.balance_after).await
        } else {
            change.balance_after
        };

        Ok(GenerateScriptResponseDto {
            success: true,
            generation_id,
            script,
            credits_used: change.charged(),
            credits_remaining,
            links_inserted,
        })
    }

    /// 扣费
    ///
    /// 带 `request_id` 时以它为幂等键。已被退款的扣费不再重放，
    /// 改用下一个尝试序号的键重新扣费。
    async fn charge(
        &self,
        account_id: Uuid,
        request: &GenerateScriptRequestDto,
    ) -> Result<BalanceChange, LedgerError> {
        let debit = LedgerRequest::new(
            account_id,
            self.cost,
            LedgerEntryKind::Usage,
            format!("Script generation: {}", request.topic),
        );
        let Some(request_id) = &request.request_id else {
            return self.ledger.try_debit(debit).await;
        };

        let mut attempt = 0u32;
        loop {
            let key = generation_key(account_id, request_id, attempt);
            let change = self
                .ledger
                .try_debit(debit.clone().with_idempotency_key(key))
                .await?;

            match change.entry_id {
                Some(entry_id) if change.replayed => {
                    if self.ledger.find_entry(&refund_key(entry_id)).await?.is_none() {
                        return Ok(change);
                    }
                    info!(
                        account_id = %account_id,
                        entry_id,
                        attempt,
                        "Previous attempt was refunded, charging again"
                    );
                    attempt += 1;
                }
                _ => return Ok(change),
            }
        }
    }

    async fn live_balance(&self, account_id: Uuid, fallback: i64) -> i64 {
        match self.ledger.current_credits(account_id).await {
            Ok(credits) => credits,
            Err(e) => {
                warn!(account_id = %account_id, "Failed to read balance: {}", e);
                fallback
            }
        }
    }

    async fn generate(&self, prompt: &GenerationPrompt) -> Result<String, GenerationError> {
        match timeout(self.generation_timeout, self.text_generator.generate(prompt)).await {
            Ok(Ok(text)) if text.trim().is_empty() => {
                Err(GenerationError::Failed("empty response".to_string()))
            }
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout(self.generation_timeout)),
        }
    }

    /// 联盟链接注入，任何目录错误都退化为不插入链接
    async fn enrich(&self, text: String) -> (String, usize) {
        match self.match_engine.find_matches(&text).await {
            Ok(matches) if matches.is_empty() => (text, 0),
            Ok(matches) => {
                let result = LinkInjector::apply(&text, &matches);
                (result.updated_text, result.inserted_count)
            }
            Err(e) => {
                warn!("Skipping affiliate enrichment: {}", e);
                (text, 0)
            }
        }
    }

    /// 退还本次扣费；重放的扣费不退，避免退还之前成功请求的费用
    async fn compensate(&self, account_id: Uuid, change: &BalanceChange) {
        let (Some(entry_id), false) = (change.entry_id, change.replayed) else {
            return;
        };
        let amount = change.charged();
        if amount == 0 {
            return;
        }

        if let Err(e) = self
            .ledger
            .refund(
                account_id,
                amount,
                "Refund: script generation failed",
                refund_key(entry_id),
            )
            .await
        {
            counter!("generation_refund_failures_total").increment(1);
            error!(account_id = %account_id, entry_id, "Failed to refund credits: {}", e);
        }
    }

    fn log_for(
        &self,
        generation_id: Uuid,
        account_id: Uuid,
        request: &GenerateScriptRequestDto,
        status: GenerationStatus,
    ) -> GenerationLog {
        let mut log = GenerationLog::new(generation_id, account_id, request.topic.clone(), status);
        log.target_audience = request.target_audience.clone();
        log.tone = request.tone.clone();
        log
    }

    async fn record(&self, log: GenerationLog) {
        if let Err(e) = self.generation_logs.create(&log).await {
            warn!(generation_id = %log.id, "Failed to write generation log: {}", e);
        }
    }
}

/// 第 0 次尝试沿用客户端给出的ID，之后的尝试追加序号
fn generation_key(account_id: Uuid, request_id: &str, attempt: u32) -> String {
    match attempt {
        0 => format!("generation:{account_id}:{request_id}"),
        n => format!("generation:{account_id}:{request_id}#retry-{n}"),
    }
}

fn refund_key(entry_id: i32) -> String {
    format!("refund:{entry_id}")
}
