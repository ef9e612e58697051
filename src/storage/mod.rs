use std::sync::Arc;

use crate::models::{
    PaginatedResponse,
    assignments::{
        entities::Assignment,
        requests::{CreateAssignmentRequest, UpdateAssignmentRequest},
        responses::ClassAssignmentItem,
    },
    submissions::entities::{AnswerItem, Submission, SubmissionStatus},
};

use crate::errors::Result;

pub mod sea_orm_storage;

/// 批改后需要整体写回的提交字段
#[derive(Debug, Clone)]
pub struct GradedSubmission {
    pub answers: Vec<AnswerItem>,
    pub total_score: Option<i32>,
    pub comment: Option<String>,
    pub status: SubmissionStatus,
}

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 作业管理方法
    // 创建作业
    async fn create_assignment(
        &self,
        created_by: i64,
        req: CreateAssignmentRequest,
    ) -> Result<Assignment>;
    // 通过ID获取作业（含参考答案）
    async fn get_assignment_by_id(&self, assignment_id: i64) -> Result<Option<Assignment>>;
    // 更新作业信息
    async fn update_assignment(
        &self,
        assignment_id: i64,
        update: UpdateAssignmentRequest,
    ) -> Result<Option<Assignment>>;
    // 删除作业（级联删除提交，单事务）
    async fn delete_assignment(&self, assignment_id: i64) -> Result<bool>;
    // 分页列出班级作业，并附带指定学生的提交状态
    async fn list_class_assignments_for_student(
        &self,
        class_id: i64,
        student_id: i64,
        page: u64,
        size: u64,
    ) -> Result<PaginatedResponse<ClassAssignmentItem>>;

    /// 提交管理方法
    // 提交时按 (作业, 学生) 原子插入或整体覆盖 answers / total_score / status
    async fn upsert_submission(
        &self,
        assignment_id: i64,
        student_id: i64,
        answers: Vec<AnswerItem>,
        total_score: Option<i32>,
        status: SubmissionStatus,
    ) -> Result<Submission>;
    // 获取学生在某作业下的提交
    async fn get_submission_by_assignment_and_student(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<Submission>>;
    // 通过ID获取提交
    async fn get_submission_by_id(&self, submission_id: i64) -> Result<Option<Submission>>;
    // 列出某作业的全部提交
    async fn list_submissions_by_assignment(&self, assignment_id: i64) -> Result<Vec<Submission>>;
    // 写回批改结果（单次更新）
    async fn update_submission_grade(
        &self,
        submission_id: i64,
        graded: GradedSubmission,
    ) -> Result<Option<Submission>>;
    // 删除某作业的全部提交，返回删除条数
    async fn delete_submissions_by_assignment(&self, assignment_id: i64) -> Result<u64>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
