use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AssignmentService;
use crate::models::assignments::entities::PublicAssignment;
use crate::models::common::response::error_response;
use crate::models::{ApiResponse, ErrorCode};

pub async fn get_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_assignment_by_id(assignment_id).await {
        // 详情对学生开放，不返回参考答案
        Ok(Some(assignment)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            PublicAssignment::from(assignment),
            "查询成功",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::AssignmentNotFound,
            "作业不存在",
        ))),
        Err(e) => Ok(error_response(
            &e,
            ErrorCode::AssignmentNotFound,
            "查询作业失败",
        )),
    }
}
