pub mod assignments;
pub mod common;
pub mod submissions;

pub use common::pagination::{PaginatedResponse, PaginationInfo, PaginationQuery};
pub use common::response::ApiResponse;

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用请求错误
    BadRequest = 1000,
    ValidationFailed = 1001,
    Unauthorized = 1002,
    NotFound = 1004,
    Conflict = 1009,

    // 作业相关
    AssignmentNotFound = 3000,
    AssignmentCreationFailed = 3001,
    AssignmentUpdateFailed = 3002,
    AssignmentDeleteFailed = 3003,

    // 提交相关
    SubmissionNotFound = 4000,
    GradeFailed = 4002,

    InternalServerError = 5000,
}

impl ErrorCode {
    /// 根据存储层/业务层错误选择对应错误码
    pub fn from_error(err: &crate::errors::TransLearnError, fallback: ErrorCode) -> Self {
        use crate::errors::TransLearnError;
        match err {
            TransLearnError::Validation(_) => ErrorCode::ValidationFailed,
            TransLearnError::Conflict(_) => ErrorCode::Conflict,
            TransLearnError::NotFound(_) => fallback,
            _ => ErrorCode::InternalServerError,
        }
    }
}
