pub mod detail;
pub mod grade;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::grading::GradingPipeline;
use crate::models::submissions::requests::GradeSubmissionRequest;

pub struct SubmissionService;

impl SubmissionService {
    pub fn new_lazy() -> Self {
        Self
    }

    pub(crate) fn get_pipeline(&self, request: &HttpRequest) -> GradingPipeline {
        request
            .app_data::<actix_web::web::Data<GradingPipeline>>()
            .expect("GradingPipeline not found in app data")
            .get_ref()
            .clone()
    }

    /// 获取提交详情（不含参考答案）
    pub async fn get_submission(
        &self,
        request: &HttpRequest,
        submission_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_submission(self, request, submission_id).await
    }

    /// 获取提交详情（含参考答案，供批改）
    pub async fn get_submission_review(
        &self,
        request: &HttpRequest,
        submission_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_submission_review(self, request, submission_id).await
    }

    /// 教师批改
    pub async fn grade_submission(
        &self,
        request: &HttpRequest,
        submission_id: i64,
        req: GradeSubmissionRequest,
    ) -> ActixResult<HttpResponse> {
        grade::grade_submission(self, request, submission_id, req).await
    }
}
