use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::errors::TransLearnError;
use crate::models::ErrorCode;

// 统一的API响应结构
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "api.ts")]
pub struct ApiResponse<T: TS> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T: TS> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Success as i32,
            message: message.into(),
            data: Some(data),
            timestamp: chrono::Utc::now(),
        }
    }
}

impl ApiResponse<()> {
    pub fn success_empty(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Success as i32,
            message: message.into(),
            data: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error_empty(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data: None,
            timestamp: chrono::Utc::now(),
        }
    }
}

/// 将业务错误转换为 HTTP 响应
///
/// `not_found_code` 用于区分“作业不存在”与“提交不存在”等资源缺失。
pub fn error_response(
    err: &TransLearnError,
    not_found_code: ErrorCode,
    context: &str,
) -> HttpResponse {
    let code = ErrorCode::from_error(err, not_found_code);
    match err {
        TransLearnError::NotFound(msg) => {
            HttpResponse::NotFound().json(ApiResponse::error_empty(code, msg.as_str()))
        }
        TransLearnError::Validation(msg) => {
            HttpResponse::BadRequest().json(ApiResponse::error_empty(code, msg.as_str()))
        }
        TransLearnError::Conflict(msg) => {
            HttpResponse::Conflict().json(ApiResponse::error_empty(code, msg.as_str()))
        }
        _ => HttpResponse::InternalServerError().json(ApiResponse::error_empty(
            code,
            format!("{context}: {err}"),
        )),
    }
}
