use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AssignmentService;
use crate::models::assignments::requests::CreateAssignmentRequest;
use crate::models::common::response::error_response;
use crate::models::{ApiResponse, ErrorCode};

pub async fn create_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    created_by: i64,
    mut req: CreateAssignmentRequest,
) -> ActixResult<HttpResponse> {
    req.title = req.title.trim().to_string();
    if req.title.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            "作业标题不能为空",
        )));
    }
    if req.class_id <= 0 {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            "班级 ID 无效",
        )));
    }
    if req.questions.iter().any(|q| q.prompt_text.trim().is_empty()) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            "题目内容不能为空",
        )));
    }

    let storage = service.get_storage(request);

    match storage.create_assignment(created_by, req).await {
        Ok(assignment) => {
            info!(
                "教师 {} 在班级 {} 创建作业 {}",
                created_by, assignment.class_id, assignment.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(assignment, "作业创建成功")))
        }
        Err(e) => Ok(error_response(
            &e,
            ErrorCode::AssignmentCreationFailed,
            "创建作业失败",
        )),
    }
}
