use serde::Deserialize;
use ts_rs::TS;

use crate::models::submissions::entities::RawAnswer;

/// 学生提交作业请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct SubmitAssignmentRequest {
    #[serde(default)]
    pub answers: Vec<RawAnswer>,
}

/// 教师对单题的批注
#[derive(Debug, Clone, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct GradePatch {
    pub index: u32,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub feedback: Option<String>,
}

/// 教师批改请求
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct GradeSubmissionRequest {
    #[serde(default)]
    pub answers: Vec<GradePatch>,
    pub total_score: Option<f64>,
    pub comment: Option<String>,
}
