use serde::Serialize;
use ts_rs::TS;

use crate::models::assignments::entities::{Assignment, PublicAssignment};
use crate::models::submissions::entities::Submission;

/// 提交详情（不含参考答案）
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct SubmissionDetail {
    pub submission: Submission,
    pub assignment: PublicAssignment,
}

/// 提交详情（含参考答案，供批改者对照）
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct SubmissionReview {
    pub submission: Submission,
    pub assignment: Assignment,
}

/// 作业提交列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct SubmissionListResponse {
    pub items: Vec<Submission>,
}
