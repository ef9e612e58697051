use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SubmissionService;
use crate::errors::TransLearnError;
use crate::models::common::response::error_response;
use crate::models::submissions::requests::GradeSubmissionRequest;
use crate::models::{ApiResponse, ErrorCode};

pub async fn grade_submission(
    service: &SubmissionService,
    request: &HttpRequest,
    submission_id: i64,
    req: GradeSubmissionRequest,
) -> ActixResult<HttpResponse> {
    let pipeline = service.get_pipeline(request);

    match pipeline.grade_submission(submission_id, req).await {
        Ok(submission) => Ok(HttpResponse::Ok().json(ApiResponse::success(submission, "批改成功"))),
        Err(e @ TransLearnError::NotFound(_)) => Ok(error_response(
            &e,
            ErrorCode::SubmissionNotFound,
            "批改失败",
        )),
        Err(e) => Ok(error_response(&e, ErrorCode::GradeFailed, "批改失败")),
    }
}
