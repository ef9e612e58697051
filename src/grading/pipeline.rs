//! 提交与批改流程
//!
//! 先计算出完整的新状态，再对存储做一次写入。

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::info;

use super::aggregator::Aggregator;
use super::merge::{CurrentGrade, merge_grade, validate_patches};
use crate::errors::{Result, TransLearnError};
use crate::models::assignments::entities::{Assignment, PublicAssignment};
use crate::models::submissions::{
    entities::{RawAnswer, Submission},
    requests::GradeSubmissionRequest,
    responses::{SubmissionDetail, SubmissionReview},
};
use crate::storage::{GradedSubmission, Storage};

#[derive(Clone)]
pub struct GradingPipeline {
    storage: Arc<dyn Storage>,
    aggregator: Aggregator,
    // 同一提交的批改串行执行
    grade_locks: Arc<DashMap<i64, Arc<Mutex<()>>>>,
}

impl GradingPipeline {
    pub fn new(storage: Arc<dyn Storage>, aggregator: Aggregator) -> Self {
        Self {
            storage,
            aggregator,
            grade_locks: Arc::new(DashMap::new()),
        }
    }

    /// 学生提交作业：逐题初评后按 (作业, 学生) 覆盖保存
    pub async fn submit_assignment(
        &self,
        assignment_id: i64,
        student_id: i64,
        answers: Vec<RawAnswer>,
    ) -> Result<Submission> {
        let assignment = self.require_assignment(assignment_id).await?;

        let result = self.aggregator.aggregate(&assignment.questions, answers).await;

        let submission = self
            .storage
            .upsert_submission(
                assignment_id,
                student_id,
                result.answers,
                result.total_score,
                result.status,
            )
            .await?;

        info!(
            "学生 {} 提交作业 {}，状态 {}，总分 {:?}",
            student_id, assignment_id, submission.status, submission.total_score
        );
        Ok(submission)
    }

    /// 教师批改：读取、合并、写回
    pub async fn grade_submission(
        &self,
        submission_id: i64,
        req: GradeSubmissionRequest,
    ) -> Result<Submission> {
        // 写入前先拒绝非法分数
        validate_patches(&req.answers)?;

        let lock = self
            .grade_locks
            .entry(submission_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let result = {
            let _guard = lock.lock().await;
            self.grade_locked(submission_id, req).await
        };

        drop(lock);
        self.grade_locks
            .remove_if(&submission_id, |_, l| Arc::strong_count(l) == 1);

        result
    }

    async fn grade_locked(
        &self,
        submission_id: i64,
        req: GradeSubmissionRequest,
    ) -> Result<Submission> {
        let existing = self.require_submission(submission_id).await?;

        let outcome = merge_grade(
            CurrentGrade {
                answers: &existing.answers,
                total_score: existing.total_score,
                comment: existing.comment.as_deref(),
            },
            &req.answers,
            req.total_score,
            req.comment,
        )?;

        let updated = self
            .storage
            .update_submission_grade(
                submission_id,
                GradedSubmission {
                    answers: outcome.answers,
                    total_score: outcome.total_score,
                    comment: outcome.comment,
                    status: outcome.status,
                },
            )
            .await?
            .ok_or_else(|| TransLearnError::not_found(format!("提交不存在: {submission_id}")))?;

        info!(
            "提交 {} 已批改，总分 {:?}",
            submission_id, updated.total_score
        );
        Ok(updated)
    }

    /// 提交详情（不含参考答案）
    pub async fn get_submission(&self, submission_id: i64) -> Result<SubmissionDetail> {
        let (submission, assignment) = self.submission_with_assignment(submission_id).await?;
        Ok(SubmissionDetail {
            submission,
            assignment: PublicAssignment::from(assignment),
        })
    }

    /// 提交详情（含参考答案）
    pub async fn get_submission_review(&self, submission_id: i64) -> Result<SubmissionReview> {
        let (submission, assignment) = self.submission_with_assignment(submission_id).await?;
        Ok(SubmissionReview {
            submission,
            assignment,
        })
    }

    async fn submission_with_assignment(
        &self,
        submission_id: i64,
    ) -> Result<(Submission, Assignment)> {
        let submission = self.require_submission(submission_id).await?;
        let assignment = self.require_assignment(submission.assignment_id).await?;
        Ok((submission, assignment))
    }

    async fn require_submission(&self, submission_id: i64) -> Result<Submission> {
        self.storage
            .get_submission_by_id(submission_id)
            .await?
            .ok_or_else(|| TransLearnError::not_found(format!("提交不存在: {submission_id}")))
    }

    async fn require_assignment(&self, assignment_id: i64) -> Result<Assignment> {
        self.storage
            .get_assignment_by_id(assignment_id)
            .await?
            .ok_or_else(|| TransLearnError::not_found(format!("作业不存在: {assignment_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::evaluator::Evaluator;
    use crate::grading::scorer::Scorer;
    use crate::models::assignments::entities::{Question, QuestionKind, TranslationDirection};
    use crate::models::assignments::requests::CreateAssignmentRequest;
    use crate::models::submissions::entities::SubmissionStatus;
    use crate::models::submissions::requests::GradePatch;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FixedScorer {
        score: f64,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Scorer for FixedScorer {
        async fn score(
            &self,
            _direction: TranslationDirection,
            _reference: &str,
            _student: &str,
        ) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!(r#"{{"score": {}, "feedback": "auto"}}"#, self.score))
        }
    }

    fn question(kind: QuestionKind, reference: Option<&str>) -> Question {
        Question {
            kind,
            prompt_text: "题目".into(),
            reference_answer: reference.map(String::from),
            difficulty: None,
            topic: None,
            knowledge_tags: vec![],
        }
    }

    async fn setup(questions: Vec<Question>) -> (GradingPipeline, Arc<dyn Storage>, i64, Arc<FixedScorer>) {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::in_memory().await);
        let assignment = storage
            .create_assignment(
                1,
                CreateAssignmentRequest {
                    class_id: 1,
                    title: "作业".into(),
                    kind: QuestionKind::ZhEn,
                    questions,
                    due_at: None,
                    retry_limit: None,
                    allow_view_ref: Some(false),
                },
            )
            .await
            .unwrap();

        let scorer = Arc::new(FixedScorer {
            score: 80.0,
            calls: AtomicUsize::new(0),
        });
        let evaluator = Evaluator::new(scorer.clone(), Duration::from_secs(5));
        let pipeline = GradingPipeline::new(storage.clone(), Aggregator::new(evaluator, 1));
        (pipeline, storage, assignment.id, scorer)
    }

    fn text(s: &str) -> RawAnswer {
        RawAnswer {
            text: Some(s.into()),
            audio_url: None,
        }
    }

    #[tokio::test]
    async fn test_submit_scores_and_persists() {
        let (pipeline, storage, assignment_id, scorer) = setup(vec![
            question(QuestionKind::ZhEn, Some("I like reading")),
            question(QuestionKind::Read, None),
        ])
        .await;

        let submission = pipeline
            .submit_assignment(
                assignment_id,
                42,
                vec![
                    text("I love reading"),
                    RawAnswer {
                        text: None,
                        audio_url: Some("/r.mp3".into()),
                    },
                ],
            )
            .await
            .unwrap();

        assert_eq!(submission.status, SubmissionStatus::Graded);
        assert_eq!(submission.total_score, Some(80));
        assert_eq!(scorer.calls.load(Ordering::SeqCst), 1);

        let stored = storage
            .get_submission_by_assignment_and_student(assignment_id, 42)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.answers, submission.answers);
    }

    #[tokio::test]
    async fn test_submit_to_missing_assignment_is_not_found() {
        let (pipeline, _, _, _) = setup(vec![]).await;
        let err = pipeline
            .submit_assignment(999, 42, vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, TransLearnError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_resubmit_replaces_previous_submission() {
        let (pipeline, storage, assignment_id, _) =
            setup(vec![question(QuestionKind::ZhEn, Some("ref"))]).await;

        let first = pipeline
            .submit_assignment(assignment_id, 42, vec![text("first")])
            .await
            .unwrap();
        let second = pipeline
            .submit_assignment(assignment_id, 42, vec![])
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert!(second.answers.is_empty());
        assert_eq!(second.status, SubmissionStatus::Submitted);
        assert_eq!(
            storage
                .list_submissions_by_assignment(assignment_id)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_grade_merges_and_marks_graded() {
        let (pipeline, _, assignment_id, _) = setup(vec![
            question(QuestionKind::Read, None),
            question(QuestionKind::Read, None),
        ])
        .await;
        let submission = pipeline
            .submit_assignment(
                assignment_id,
                42,
                vec![RawAnswer {
                    text: None,
                    audio_url: Some("/r.mp3".into()),
                }],
            )
            .await
            .unwrap();
        assert_eq!(submission.status, SubmissionStatus::Submitted);

        let graded = pipeline
            .grade_submission(
                submission.id,
                GradeSubmissionRequest {
                    answers: vec![
                        GradePatch {
                            index: 0,
                            score: Some(70.0),
                            feedback: Some("clear".into()),
                        },
                        GradePatch {
                            index: 1,
                            score: Some(50.0),
                            feedback: None,
                        },
                    ],
                    total_score: None,
                    comment: Some("继续努力".into()),
                },
            )
            .await
            .unwrap();

        assert_eq!(graded.status, SubmissionStatus::Graded);
        assert_eq!(graded.total_score, Some(60));
        assert_eq!(graded.comment.as_deref(), Some("继续努力"));
        assert_eq!(graded.answers.len(), 2);
        assert_eq!(graded.answers[0].audio_url.as_deref(), Some("/r.mp3"));
        assert_eq!(graded.answers[1].text, None);
    }

    #[tokio::test]
    async fn test_invalid_grade_leaves_submission_untouched() {
        let (pipeline, storage, assignment_id, _) =
            setup(vec![question(QuestionKind::ZhEn, Some("ref"))]).await;
        let submission = pipeline
            .submit_assignment(assignment_id, 42, vec![text("a")])
            .await
            .unwrap();

        let err = pipeline
            .grade_submission(
                submission.id,
                GradeSubmissionRequest {
                    answers: vec![GradePatch {
                        index: 0,
                        score: Some(150.0),
                        feedback: None,
                    }],
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TransLearnError::Validation(_)));

        let stored = storage
            .get_submission_by_id(submission.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.answers, submission.answers);
        assert_eq!(stored.status, submission.status);

        let missing = pipeline
            .grade_submission(404, GradeSubmissionRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(missing, TransLearnError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_concurrent_grades_do_not_lose_patches() {
        let (pipeline, _, assignment_id, _) = setup(vec![
            question(QuestionKind::Read, None),
            question(QuestionKind::Read, None),
        ])
        .await;
        let submission = pipeline
            .submit_assignment(assignment_id, 42, vec![])
            .await
            .unwrap();

        let grade = |index: u32| {
            let pipeline = pipeline.clone();
            let id = submission.id;
            async move {
                pipeline
                    .grade_submission(
                        id,
                        GradeSubmissionRequest {
                            answers: vec![GradePatch {
                                index,
                                score: Some(90.0),
                                feedback: None,
                            }],
                            ..Default::default()
                        },
                    )
                    .await
            }
        };
        let (a, b) = tokio::join!(grade(0), grade(1));
        a.unwrap();
        b.unwrap();

        let detail = pipeline.get_submission(submission.id).await.unwrap();
        let mut indices: Vec<u32> = detail.submission.answers.iter().map(|a| a.index).collect();
        indices.sort();
        assert_eq!(indices, vec![0, 1]);
        assert!(pipeline.grade_locks.is_empty());
    }

    #[tokio::test]
    async fn test_projections_differ_only_in_reference() {
        let (pipeline, _, assignment_id, _) =
            setup(vec![question(QuestionKind::EnZh, Some("我喜欢读书"))]).await;
        let submission = pipeline
            .submit_assignment(assignment_id, 42, vec![text("我爱读书")])
            .await
            .unwrap();

        let detail = pipeline.get_submission(submission.id).await.unwrap();
        let json = serde_json::to_string(&detail).unwrap();
        assert!(!json.contains("reference_answer"));

        let review = pipeline.get_submission_review(submission.id).await.unwrap();
        assert_eq!(
            review.assignment.questions[0].reference(),
            Some("我喜欢读书")
        );
        assert_eq!(review.submission.id, detail.submission.id);
    }
}
