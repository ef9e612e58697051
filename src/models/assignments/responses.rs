use crate::models::assignments::entities::QuestionKind;
use crate::models::submissions::entities::SubmissionStatus;
use serde::Serialize;
use ts_rs::TS;

/// 班级作业列表项（带当前学生的提交状态）
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct ClassAssignmentItem {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub due_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    // 未提交时为 pending
    pub status: SubmissionStatus,
    pub my_score: Option<i32>,
}
