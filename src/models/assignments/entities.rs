use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 题目类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "assignment.ts")]
pub enum QuestionKind {
    #[serde(rename = "zh-en")]
    ZhEn, // 中译英
    #[serde(rename = "en-zh")]
    EnZh, // 英译中
    #[serde(rename = "read")]
    Read, // 朗读（仅人工批改）
}

impl QuestionKind {
    /// 翻译题返回翻译方向，朗读题返回 None
    pub fn direction(&self) -> Option<TranslationDirection> {
        match self {
            QuestionKind::ZhEn => Some(TranslationDirection::ZhEn),
            QuestionKind::EnZh => Some(TranslationDirection::EnZh),
            QuestionKind::Read => None,
        }
    }
}

impl std::fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuestionKind::ZhEn => write!(f, "zh-en"),
            QuestionKind::EnZh => write!(f, "en-zh"),
            QuestionKind::Read => write!(f, "read"),
        }
    }
}

impl std::str::FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zh-en" => Ok(QuestionKind::ZhEn),
            "en-zh" => Ok(QuestionKind::EnZh),
            "read" => Ok(QuestionKind::Read),
            _ => Err(format!("Invalid question type: {s}")),
        }
    }
}

// 翻译方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationDirection {
    ZhEn,
    EnZh,
}

impl std::fmt::Display for TranslationDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslationDirection::ZhEn => write!(f, "zh-en"),
            TranslationDirection::EnZh => write!(f, "en-zh"),
        }
    }
}

// 题目
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct Question {
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub prompt_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default)]
    pub knowledge_tags: Vec<String>,
}

impl Question {
    /// 非空的参考答案
    pub fn reference(&self) -> Option<&str> {
        self.reference_answer
            .as_deref()
            .filter(|r| !r.trim().is_empty())
    }
}

// 不含参考答案的题目视图（学生可见）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct PublicQuestion {
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub prompt_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default)]
    pub knowledge_tags: Vec<String>,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        Self {
            kind: q.kind,
            prompt_text: q.prompt_text,
            difficulty: q.difficulty,
            topic: q.topic,
            knowledge_tags: q.knowledge_tags,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct Assignment {
    // 唯一 ID
    pub id: i64,
    // 关联的班级 ID
    pub class_id: i64,
    // 创建者（教师）ID
    pub created_by: i64,
    // 作业标题
    pub title: String,
    // 作业类型
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    // 有序题目列表，含参考答案
    pub questions: Vec<Question>,
    // 截止时间
    pub due_at: Option<chrono::DateTime<chrono::Utc>>,
    // 允许提交次数，至少为 1（仅记录，不限制重新提交）
    pub retry_limit: i32,
    // 是否允许学生查看参考答案
    pub allow_view_ref: bool,
    // 作业创建时间
    pub created_at: chrono::DateTime<chrono::Utc>,
    // 作业更新时间
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 隐藏参考答案后的作业视图
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct PublicAssignment {
    pub id: i64,
    pub class_id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub questions: Vec<PublicQuestion>,
    pub due_at: Option<chrono::DateTime<chrono::Utc>>,
    pub retry_limit: i32,
    pub allow_view_ref: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Assignment> for PublicAssignment {
    fn from(a: Assignment) -> Self {
        Self {
            id: a.id,
            class_id: a.class_id,
            title: a.title,
            kind: a.kind,
            questions: a.questions.into_iter().map(PublicQuestion::from).collect(),
            due_at: a.due_at,
            retry_limit: a.retry_limit,
            allow_view_ref: a.allow_view_ref,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_kind_wire_names() {
        let q: Question =
            serde_json::from_str(r#"{"type":"en-zh","prompt_text":"Hello"}"#).unwrap();
        assert_eq!(q.kind, QuestionKind::EnZh);
        assert_eq!(q.kind.direction(), Some(TranslationDirection::EnZh));
        assert_eq!(QuestionKind::Read.direction(), None);
        assert_eq!("zh-en".parse::<QuestionKind>(), Ok(QuestionKind::ZhEn));
    }

    #[test]
    fn test_blank_reference_is_absent() {
        let q = Question {
            kind: QuestionKind::ZhEn,
            prompt_text: "你好".into(),
            reference_answer: Some("   ".into()),
            difficulty: None,
            topic: None,
            knowledge_tags: vec![],
        };
        assert_eq!(q.reference(), None);
    }

    #[test]
    fn test_public_question_drops_reference() {
        let q = Question {
            kind: QuestionKind::ZhEn,
            prompt_text: "你好".into(),
            reference_answer: Some("Hello".into()),
            difficulty: Some("easy".into()),
            topic: None,
            knowledge_tags: vec!["greeting".into()],
        };
        let json = serde_json::to_value(PublicQuestion::from(q)).unwrap();
        assert!(json.get("reference_answer").is_none());
        assert_eq!(json["type"], "zh-en");
    }
}
