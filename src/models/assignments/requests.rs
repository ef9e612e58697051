use crate::models::assignments::entities::{Question, QuestionKind};
use crate::models::common::pagination::PaginationQuery;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use ts_rs::TS;

/// 创建作业请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct CreateAssignmentRequest {
    pub class_id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(default)]
    pub questions: Vec<Question>,
    pub due_at: Option<DateTime<Utc>>, // ISO 8601 格式，如 "2026-01-24T12:00:00Z"
    pub retry_limit: Option<i32>, // 缺省为 1
    pub allow_view_ref: Option<bool>,
}

/// 更新作业请求（仅更新提供的字段）
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct UpdateAssignmentRequest {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<QuestionKind>,
    pub questions: Option<Vec<Question>>,
    // 缺省不修改，显式 null 清除截止时间
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[ts(optional)]
    pub due_at: Option<Option<DateTime<Utc>>>,
    pub retry_limit: Option<i32>,
    pub allow_view_ref: Option<bool>,
}

// 区分字段缺省（None）与显式 null（Some(None)）
fn deserialize_nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// 班级作业列表查询参数（HTTP 请求）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct ClassAssignmentListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_due_at_absent_vs_null() {
        let absent: UpdateAssignmentRequest = serde_json::from_str(r#"{"title":"t"}"#).unwrap();
        assert_eq!(absent.due_at, None);

        let cleared: UpdateAssignmentRequest = serde_json::from_str(r#"{"due_at":null}"#).unwrap();
        assert_eq!(cleared.due_at, Some(None));

        let set: UpdateAssignmentRequest =
            serde_json::from_str(r#"{"due_at":"2026-01-24T12:00:00Z"}"#).unwrap();
        assert_eq!(
            set.due_at.flatten().map(|dt| dt.timestamp()),
            Some(1_769_256_000)
        );
    }
}
