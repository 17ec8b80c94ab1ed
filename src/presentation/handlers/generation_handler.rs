// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{Extension, Json};
use std::sync::Arc;

use crate::application::dto::generation_request::{
    GenerateScriptRequestDto, GenerateScriptResponseDto,
};
use crate::application::use_cases::generate_script::GenerateScriptUseCase;
use crate::presentation::errors::AppError;
use crate::presentation::extractors::account_id::AccountId;

pub async fn generate_script(
    Extension(use_case): Extension<Arc<GenerateScriptUseCase>>,
    AccountId(account_id): AccountId,
    Json(payload): Json<GenerateScriptRequestDto>,
) -> Result<Json<GenerateScriptResponseDto>, AppError> {
    let response = use_case.execute(account_id, payload).await?;
    Ok(Json(response))
}
