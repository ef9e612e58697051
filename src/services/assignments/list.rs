use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AssignmentService;
use crate::models::assignments::requests::ClassAssignmentListParams;
use crate::models::common::response::error_response;
use crate::models::{ApiResponse, ErrorCode};

// 每页最多 50 条
const MAX_PAGE_SIZE: i64 = 50;

pub async fn list_class_assignments(
    service: &AssignmentService,
    request: &HttpRequest,
    class_id: i64,
    student_id: i64,
    query: ClassAssignmentListParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let (page, size) = query.pagination.normalized(MAX_PAGE_SIZE);

    match storage
        .list_class_assignments_for_student(class_id, student_id, page, size)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response, "查询成功"))),
        Err(e) => Ok(error_response(&e, ErrorCode::NotFound, "查询作业列表失败")),
    }
}
