use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AssignmentService;
use crate::models::common::response::error_response;
use crate::models::submissions::responses::SubmissionListResponse;
use crate::models::{ApiResponse, ErrorCode};

/// 列出作业的全部提交
pub async fn list_submissions(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_assignment_by_id(assignment_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::AssignmentNotFound,
                "作业不存在",
            )));
        }
        Err(e) => {
            return Ok(error_response(
                &e,
                ErrorCode::AssignmentNotFound,
                "查询作业失败",
            ));
        }
    }

    match storage.list_submissions_by_assignment(assignment_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            SubmissionListResponse { items },
            "查询成功",
        ))),
        Err(e) => Ok(error_response(
            &e,
            ErrorCode::SubmissionNotFound,
            "查询提交列表失败",
        )),
    }
}

/// 当前学生的提交，未提交时 data 为空
pub async fn get_my_submission(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_id: i64,
    student_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage
        .get_submission_by_assignment_and_student(assignment_id, student_id)
        .await
    {
        Ok(Some(submission)) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(submission, "查询成功")))
        }
        Ok(None) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty("尚未提交"))),
        Err(e) => Ok(error_response(
            &e,
            ErrorCode::SubmissionNotFound,
            "查询提交失败",
        )),
    }
}
