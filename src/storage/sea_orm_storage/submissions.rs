//! 提交存储操作

use super::SeaOrmStorage;
use crate::entity::submissions::{ActiveModel, Column, Entity as Submissions};
use crate::errors::{Result, TransLearnError};
use crate::models::submissions::entities::{AnswerItem, Submission, SubmissionStatus};
use crate::storage::GradedSubmission;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
};

impl SeaOrmStorage {
    /// 提交作业：按 (assignment_id, student_id) 插入或整体覆盖
    ///
    /// 覆盖只涉及 answers / total_score / status，教师评语保留。
    pub async fn upsert_submission_impl(
        &self,
        assignment_id: i64,
        student_id: i64,
        answers: Vec<AnswerItem>,
        total_score: Option<i32>,
        status: SubmissionStatus,
    ) -> Result<Submission> {
        let now = chrono::Utc::now().timestamp();
        let answers_json = serde_json::to_string(&answers)?;

        let model = ActiveModel {
            assignment_id: Set(assignment_id),
            student_id: Set(student_id),
            status: Set(status.to_string()),
            answers: Set(answers_json.clone()),
            total_score: Set(total_score),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let on_conflict = OnConflict::columns([Column::AssignmentId, Column::StudentId])
            .update_columns([
                Column::Answers,
                Column::TotalScore,
                Column::Status,
                Column::UpdatedAt,
            ])
            .to_owned();

        let inserted = Submissions::insert(model)
            .on_conflict(on_conflict)
            .exec_without_returning(&self.db)
            .await;

        if let Err(e) = inserted {
            match e.sql_err() {
                // 并发插入撞上唯一索引，按覆盖处理
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    tracing::debug!(
                        "提交唯一约束冲突，转为覆盖: assignment={}, student={}",
                        assignment_id,
                        student_id
                    );
                    self.overwrite_submission(
                        assignment_id,
                        student_id,
                        answers_json,
                        total_score,
                        status,
                        now,
                    )
                    .await?;
                }
                _ => {
                    return Err(TransLearnError::database_operation(format!(
                        "保存提交失败: {e}"
                    )));
                }
            }
        }

        self.get_submission_by_assignment_and_student_impl(assignment_id, student_id)
            .await?
            .ok_or_else(|| TransLearnError::database_operation("保存提交后未能读取到提交记录"))
    }

    async fn overwrite_submission(
        &self,
        assignment_id: i64,
        student_id: i64,
        answers_json: String,
        total_score: Option<i32>,
        status: SubmissionStatus,
        now: i64,
    ) -> Result<()> {
        let result = Submissions::update_many()
            .col_expr(Column::Answers, Expr::value(answers_json))
            .col_expr(Column::TotalScore, Expr::value(total_score))
            .col_expr(Column::Status, Expr::value(status.to_string()))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::AssignmentId.eq(assignment_id))
            .filter(Column::StudentId.eq(student_id))
            .exec(&self.db)
            .await
            .map_err(|e| TransLearnError::database_operation(format!("覆盖提交失败: {e}")))?;

        if result.rows_affected == 0 {
            return Err(TransLearnError::conflict(format!(
                "提交冲突无法解决: assignment={assignment_id}, student={student_id}"
            )));
        }
        Ok(())
    }

    /// 获取学生在某作业下的提交
    pub async fn get_submission_by_assignment_and_student_impl(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<Submission>> {
        let result = Submissions::find()
            .filter(Column::AssignmentId.eq(assignment_id))
            .filter(Column::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(|e| TransLearnError::database_operation(format!("查询提交失败: {e}")))?;

        result.map(|m| m.into_submission()).transpose()
    }

    /// 通过 ID 获取提交
    pub async fn get_submission_by_id_impl(
        &self,
        submission_id: i64,
    ) -> Result<Option<Submission>> {
        let result = Submissions::find_by_id(submission_id)
            .one(&self.db)
            .await
            .map_err(|e| TransLearnError::database_operation(format!("查询提交失败: {e}")))?;

        result.map(|m| m.into_submission()).transpose()
    }

    /// 列出某作业的全部提交（最近更新的在前）
    pub async fn list_submissions_by_assignment_impl(
        &self,
        assignment_id: i64,
    ) -> Result<Vec<Submission>> {
        let results = Submissions::find()
            .filter(Column::AssignmentId.eq(assignment_id))
            .order_by_desc(Column::UpdatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| TransLearnError::database_operation(format!("查询提交列表失败: {e}")))?;

        results.into_iter().map(|m| m.into_submission()).collect()
    }

    /// 写回批改结果
    pub async fn update_submission_grade_impl(
        &self,
        submission_id: i64,
        graded: GradedSubmission,
    ) -> Result<Option<Submission>> {
        let existing = Submissions::find_by_id(submission_id)
            .one(&self.db)
            .await
            .map_err(|e| TransLearnError::database_operation(format!("查询提交失败: {e}")))?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        model.answers = Set(serde_json::to_string(&graded.answers)?);
        model.total_score = Set(graded.total_score);
        model.comment = Set(graded.comment);
        model.status = Set(graded.status.to_string());
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| TransLearnError::database_operation(format!("更新批改结果失败: {e}")))?;

        result.into_submission().map(Some)
    }

    /// 删除某作业的全部提交
    pub async fn delete_submissions_by_assignment_impl(&self, assignment_id: i64) -> Result<u64> {
        let result = Submissions::delete_many()
            .filter(Column::AssignmentId.eq(assignment_id))
            .exec(&self.db)
            .await
            .map_err(|e| TransLearnError::database_operation(format!("删除提交失败: {e}")))?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assignments::{entities::QuestionKind, requests::CreateAssignmentRequest};
    use crate::storage::Storage;

    async fn setup() -> (SeaOrmStorage, i64) {
        let storage = SeaOrmStorage::in_memory().await;
        let assignment = storage
            .create_assignment(
                1,
                CreateAssignmentRequest {
                    class_id: 1,
                    title: "作业".into(),
                    kind: QuestionKind::ZhEn,
                    questions: vec![],
                    due_at: None,
                    retry_limit: None,
                    allow_view_ref: None,
                },
            )
            .await
            .unwrap();
        (storage, assignment.id)
    }

    fn item(index: u32, text: &str, score: Option<f64>) -> AnswerItem {
        AnswerItem {
            index,
            text: Some(text.into()),
            score,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_resubmission_replaces_single_row() {
        let (storage, assignment_id) = setup().await;

        let first = storage
            .upsert_submission(
                assignment_id,
                42,
                vec![item(0, "first", Some(60.0)), item(1, "x", None)],
                Some(60),
                SubmissionStatus::Graded,
            )
            .await
            .unwrap();

        let second = storage
            .upsert_submission(
                assignment_id,
                42,
                vec![item(0, "second", None)],
                None,
                SubmissionStatus::Submitted,
            )
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.answers, vec![item(0, "second", None)]);
        assert_eq!(second.total_score, None);
        assert_eq!(second.status, SubmissionStatus::Submitted);

        let all = storage
            .list_submissions_by_assignment(assignment_id)
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_resubmission_keeps_grader_comment() {
        let (storage, assignment_id) = setup().await;
        let submission = storage
            .upsert_submission(assignment_id, 42, vec![], None, SubmissionStatus::Submitted)
            .await
            .unwrap();

        storage
            .update_submission_grade(
                submission.id,
                GradedSubmission {
                    answers: vec![item(0, "a", Some(90.0))],
                    total_score: Some(90),
                    comment: Some("很好".into()),
                    status: SubmissionStatus::Graded,
                },
            )
            .await
            .unwrap()
            .unwrap();

        let resubmitted = storage
            .upsert_submission(assignment_id, 42, vec![], None, SubmissionStatus::Submitted)
            .await
            .unwrap();
        assert_eq!(resubmitted.comment.as_deref(), Some("很好"));
        assert_eq!(resubmitted.status, SubmissionStatus::Submitted);
    }

    #[tokio::test]
    async fn test_concurrent_submits_produce_one_row() {
        let (storage, assignment_id) = setup().await;

        let (a, b) = tokio::join!(
            storage.upsert_submission(
                assignment_id,
                42,
                vec![item(0, "a", None)],
                None,
                SubmissionStatus::Submitted
            ),
            storage.upsert_submission(
                assignment_id,
                42,
                vec![item(0, "b", None)],
                None,
                SubmissionStatus::Submitted
            ),
        );
        assert_eq!(a.unwrap().id, b.unwrap().id);

        let all = storage
            .list_submissions_by_assignment(assignment_id)
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_overwrite_replaces_existing_row() {
        let (storage, assignment_id) = setup().await;
        let original = storage
            .upsert_submission(
                assignment_id,
                42,
                vec![item(0, "first", Some(60.0))],
                Some(60),
                SubmissionStatus::Graded,
            )
            .await
            .unwrap();

        let answers = vec![item(0, "second", None), item(1, "more", None)];
        storage
            .overwrite_submission(
                assignment_id,
                42,
                serde_json::to_string(&answers).unwrap(),
                None,
                SubmissionStatus::Submitted,
                original.updated_at.timestamp() + 10,
            )
            .await
            .unwrap();

        let current = storage
            .get_submission_by_assignment_and_student(assignment_id, 42)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.id, original.id);
        assert_eq!(current.answers, answers);
        assert_eq!(current.total_score, None);
        assert_eq!(current.status, SubmissionStatus::Submitted);
        assert!(current.updated_at > original.updated_at);
    }

    #[tokio::test]
    async fn test_overwrite_without_row_is_conflict() {
        let (storage, assignment_id) = setup().await;
        let result = storage
            .overwrite_submission(
                assignment_id,
                42,
                "[]".into(),
                None,
                SubmissionStatus::Submitted,
                chrono::Utc::now().timestamp(),
            )
            .await;
        assert!(matches!(result, Err(TransLearnError::Conflict(_))));
        assert!(
            storage
                .get_submission_by_assignment_and_student(assignment_id, 42)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_submits_on_pooled_file_db() {
        use sea_orm::{ConnectOptions, Database};
        use std::sync::Arc;

        let path = std::env::temp_dir().join(format!(
            "translearn-submit-{}-{}.db",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let mut opt = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
        opt.max_connections(4).sqlx_logging(false);
        let db = Database::connect(opt).await.unwrap();
        let storage = Arc::new(SeaOrmStorage::from_connection(db).await.unwrap());

        let assignment = storage
            .create_assignment(
                1,
                CreateAssignmentRequest {
                    class_id: 1,
                    title: "并发".into(),
                    kind: QuestionKind::ZhEn,
                    questions: vec![],
                    due_at: None,
                    retry_limit: None,
                    allow_view_ref: None,
                },
            )
            .await
            .unwrap();
        let assignment_id = assignment.id;

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let storage = storage.clone();
                tokio::spawn(async move {
                    storage
                        .upsert_submission(
                            assignment_id,
                            42,
                            vec![item(0, &format!("attempt {n}"), None)],
                            None,
                            SubmissionStatus::Submitted,
                        )
                        .await
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().id);
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);

        let all = storage
            .list_submissions_by_assignment(assignment_id)
            .await
            .unwrap();
        assert_eq!(all.len(), 1);

        drop(storage);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_lookups_and_delete() {
        let (storage, assignment_id) = setup().await;
        storage
            .upsert_submission(assignment_id, 1, vec![], None, SubmissionStatus::Submitted)
            .await
            .unwrap();
        let mine = storage
            .upsert_submission(assignment_id, 2, vec![], None, SubmissionStatus::Submitted)
            .await
            .unwrap();

        let found = storage
            .get_submission_by_assignment_and_student(assignment_id, 2)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, mine.id);
        assert!(
            storage
                .get_submission_by_assignment_and_student(assignment_id, 3)
                .await
                .unwrap()
                .is_none()
        );

        assert_eq!(
            storage
                .delete_submissions_by_assignment(assignment_id)
                .await
                .unwrap(),
            2
        );
        assert!(storage.get_submission_by_id(mine.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_grade_on_missing_submission() {
        let (storage, _) = setup().await;
        let result = storage
            .update_submission_grade(
                404,
                GradedSubmission {
                    answers: vec![],
                    total_score: None,
                    comment: None,
                    status: SubmissionStatus::Graded,
                },
            )
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
