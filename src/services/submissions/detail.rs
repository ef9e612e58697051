use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SubmissionService;
use crate::models::common::response::error_response;
use crate::models::{ApiResponse, ErrorCode};

pub async fn get_submission(
    service: &SubmissionService,
    request: &HttpRequest,
    submission_id: i64,
) -> ActixResult<HttpResponse> {
    let pipeline = service.get_pipeline(request);

    match pipeline.get_submission(submission_id).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(ApiResponse::success(detail, "查询成功"))),
        Err(e) => Ok(error_response(&e, ErrorCode::SubmissionNotFound, "查询提交失败")),
    }
}

pub async fn get_submission_review(
    service: &SubmissionService,
    request: &HttpRequest,
    submission_id: i64,
) -> ActixResult<HttpResponse> {
    let pipeline = service.get_pipeline(request);

    match pipeline.get_submission_review(submission_id).await {
        Ok(review) => Ok(HttpResponse::Ok().json(ApiResponse::success(review, "查询成功"))),
        Err(e) => Ok(error_response(&e, ErrorCode::SubmissionNotFound, "查询提交失败")),
    }
}
