pub mod create;
pub mod delete;
pub mod detail;
pub mod list;
pub mod submissions;
pub mod submit;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::grading::GradingPipeline;
use crate::models::assignments::requests::{
    ClassAssignmentListParams, CreateAssignmentRequest, UpdateAssignmentRequest,
};
use crate::models::submissions::requests::SubmitAssignmentRequest;
use crate::storage::Storage;

pub struct AssignmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl AssignmentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub(crate) fn get_pipeline(&self, request: &HttpRequest) -> GradingPipeline {
        request
            .app_data::<actix_web::web::Data<GradingPipeline>>()
            .expect("GradingPipeline not found in app data")
            .get_ref()
            .clone()
    }

    pub async fn create_assignment(
        &self,
        request: &HttpRequest,
        created_by: i64,
        req: CreateAssignmentRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_assignment(self, request, created_by, req).await
    }

    pub async fn get_assignment(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_assignment(self, request, assignment_id).await
    }

    pub async fn update_assignment(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
        req: UpdateAssignmentRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_assignment(self, request, assignment_id, req).await
    }

    pub async fn delete_assignment(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_assignment(self, request, assignment_id).await
    }

    pub async fn list_class_assignments(
        &self,
        request: &HttpRequest,
        class_id: i64,
        student_id: i64,
        query: ClassAssignmentListParams,
    ) -> ActixResult<HttpResponse> {
        list::list_class_assignments(self, request, class_id, student_id, query).await
    }

    /// 学生提交作业
    pub async fn submit_assignment(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
        student_id: i64,
        req: SubmitAssignmentRequest,
    ) -> ActixResult<HttpResponse> {
        submit::submit_assignment(self, request, assignment_id, student_id, req).await
    }

    /// 作业下的全部提交
    pub async fn list_submissions(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        submissions::list_submissions(self, request, assignment_id).await
    }

    /// 当前学生在作业下的提交
    pub async fn get_my_submission(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
        student_id: i64,
    ) -> ActixResult<HttpResponse> {
        submissions::get_my_submission(self, request, assignment_id, student_id).await
    }
}
