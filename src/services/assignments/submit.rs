use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AssignmentService;
use crate::models::common::response::error_response;
use crate::models::submissions::requests::SubmitAssignmentRequest;
use crate::models::{ApiResponse, ErrorCode};

pub async fn submit_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_id: i64,
    student_id: i64,
    req: SubmitAssignmentRequest,
) -> ActixResult<HttpResponse> {
    let pipeline = service.get_pipeline(request);

    match pipeline
        .submit_assignment(assignment_id, student_id, req.answers)
        .await
    {
        Ok(submission) => Ok(HttpResponse::Ok().json(ApiResponse::success(submission, "提交成功"))),
        Err(e) => Ok(error_response(&e, ErrorCode::AssignmentNotFound, "提交失败")),
    }
}
