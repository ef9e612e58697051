use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::models::assignments::requests::{
    ClassAssignmentListParams, CreateAssignmentRequest, UpdateAssignmentRequest,
};
use crate::models::submissions::requests::SubmitAssignmentRequest;
use crate::services::AssignmentService;
use crate::utils::{CallerId, SafeClassIdI64, SafeIDI64};

// 懒加载的全局 AssignmentService 实例
static ASSIGNMENT_SERVICE: Lazy<AssignmentService> = Lazy::new(AssignmentService::new_lazy);

// 创建作业
pub async fn create_assignment(
    req: HttpRequest,
    caller: CallerId,
    body: web::Json<CreateAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .create_assignment(&req, caller.0, body.into_inner())
        .await
}

// 获取作业详情（不含参考答案）
pub async fn get_assignment(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.get_assignment(&req, path.0).await
}

// 更新作业
pub async fn update_assignment(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<UpdateAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .update_assignment(&req, path.0, body.into_inner())
        .await
}

// 删除作业
pub async fn delete_assignment(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.delete_assignment(&req, path.0).await
}

// 学生提交作业
pub async fn submit_assignment(
    req: HttpRequest,
    path: SafeIDI64,
    caller: CallerId,
    body: web::Json<SubmitAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .submit_assignment(&req, path.0, caller.0, body.into_inner())
        .await
}

// 作业的全部提交
pub async fn list_submissions(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.list_submissions(&req, path.0).await
}

// 我的提交
pub async fn get_my_submission(
    req: HttpRequest,
    path: SafeIDI64,
    caller: CallerId,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .get_my_submission(&req, path.0, caller.0)
        .await
}

// 班级作业列表（附带我的提交状态）
pub async fn list_class_assignments(
    req: HttpRequest,
    path: SafeClassIdI64,
    caller: CallerId,
    query: web::Query<ClassAssignmentListParams>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .list_class_assignments(&req, path.0, caller.0, query.into_inner())
        .await
}

// 配置路由
pub fn configure_assignments_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/assignments")
            .service(web::resource("").route(web::post().to(create_assignment)))
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_assignment))
                    .route(web::put().to(update_assignment))
                    .route(web::delete().to(delete_assignment)),
            )
            .service(web::resource("/{id}/submit").route(web::post().to(submit_assignment)))
            .service(web::resource("/{id}/submissions").route(web::get().to(list_submissions)))
            .service(
                web::resource("/{id}/submissions/my").route(web::get().to(get_my_submission)),
            ),
    )
    .service(
        web::resource("/api/v1/classes/{class_id}/assignments")
            .route(web::get().to(list_class_assignments)),
    );
}
