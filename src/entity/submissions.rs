//! 提交实体

use sea_orm::entity::prelude::*;

use crate::errors::TransLearnError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub assignment_id: i64,
    pub student_id: i64,
    pub status: String,
    #[sea_orm(column_type = "Text")]
    pub answers: String,
    pub total_score: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub comment: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assignments::Entity",
        from = "Column::AssignmentId",
        to = "super::assignments::Column::Id",
        on_delete = "Cascade"
    )]
    Assignment,
}

impl Related<super::assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_submission(self) -> crate::errors::Result<crate::models::submissions::entities::Submission> {
        use crate::models::submissions::entities::{AnswerItem, Submission, SubmissionStatus};
        use chrono::{DateTime, Utc};

        let status = self
            .status
            .parse::<SubmissionStatus>()
            .map_err(TransLearnError::serialization)?;
        let answers: Vec<AnswerItem> = serde_json::from_str(&self.answers)?;

        Ok(Submission {
            id: self.id,
            assignment_id: self.assignment_id,
            student_id: self.student_id,
            status,
            answers,
            total_score: self.total_score,
            comment: self.comment,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        })
    }
}
