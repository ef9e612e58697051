//! 作业实体

use sea_orm::entity::prelude::*;

use crate::errors::TransLearnError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "assignments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub class_id: i64,
    pub created_by: i64,
    pub title: String,
    pub kind: String,
    #[sea_orm(column_type = "Text")]
    pub questions: String,
    pub due_at: Option<i64>,
    pub retry_limit: i32,
    pub allow_view_ref: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::submissions::Entity")]
    Submissions,
}

impl Related<super::submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submissions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_assignment(self) -> crate::errors::Result<crate::models::assignments::entities::Assignment> {
        use crate::models::assignments::entities::{Assignment, Question, QuestionKind};
        use chrono::{DateTime, Utc};

        let kind = self
            .kind
            .parse::<QuestionKind>()
            .map_err(TransLearnError::serialization)?;
        let questions: Vec<Question> = serde_json::from_str(&self.questions)?;

        Ok(Assignment {
            id: self.id,
            class_id: self.class_id,
            created_by: self.created_by,
            title: self.title,
            kind,
            questions,
            due_at: self
                .due_at
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            retry_limit: self.retry_limit,
            allow_view_ref: self.allow_view_ref,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        })
    }
}
