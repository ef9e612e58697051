use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AssignmentService;
use crate::models::assignments::requests::UpdateAssignmentRequest;
use crate::models::common::response::error_response;
use crate::models::{ApiResponse, ErrorCode};

pub async fn update_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_id: i64,
    mut req: UpdateAssignmentRequest,
) -> ActixResult<HttpResponse> {
    if let Some(title) = req.title.as_mut() {
        *title = title.trim().to_string();
        if title.is_empty() {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::ValidationFailed,
                "作业标题不能为空",
            )));
        }
    }
    let has_blank_prompt = req
        .questions
        .as_ref()
        .is_some_and(|qs| qs.iter().any(|q| q.prompt_text.trim().is_empty()));
    if has_blank_prompt {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            "题目内容不能为空",
        )));
    }

    let storage = service.get_storage(request);

    match storage.update_assignment(assignment_id, req).await {
        Ok(Some(assignment)) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(assignment, "作业更新成功")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::AssignmentNotFound,
            "作业不存在",
        ))),
        Err(e) => Ok(error_response(
            &e,
            ErrorCode::AssignmentUpdateFailed,
            "更新作业失败",
        )),
    }
}
