//! 作业存储操作

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::assignments::{ActiveModel, Column, Entity as Assignments};
use crate::entity::submissions::{Column as SubmissionColumn, Entity as Submissions};
use crate::errors::{Result, TransLearnError};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    assignments::{
        entities::Assignment,
        requests::{CreateAssignmentRequest, UpdateAssignmentRequest},
        responses::ClassAssignmentItem,
    },
    submissions::entities::SubmissionStatus,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建作业
    pub async fn create_assignment_impl(
        &self,
        created_by: i64,
        req: CreateAssignmentRequest,
    ) -> Result<Assignment> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            class_id: Set(req.class_id),
            created_by: Set(created_by),
            title: Set(req.title),
            kind: Set(req.kind.to_string()),
            questions: Set(serde_json::to_string(&req.questions)?),
            due_at: Set(req.due_at.map(|dt| dt.timestamp())),
            retry_limit: Set(req.retry_limit.unwrap_or(1).max(1)),
            allow_view_ref: Set(req.allow_view_ref.unwrap_or(false)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| TransLearnError::database_operation(format!("创建作业失败: {e}")))?;

        result.into_assignment()
    }

    /// 通过 ID 获取作业
    pub async fn get_assignment_by_id_impl(&self, assignment_id: i64) -> Result<Option<Assignment>> {
        let result = Assignments::find_by_id(assignment_id)
            .one(&self.db)
            .await
            .map_err(|e| TransLearnError::database_operation(format!("查询作业失败: {e}")))?;

        result.map(|m| m.into_assignment()).transpose()
    }

    /// 更新作业（仅更新提供的字段）
    pub async fn update_assignment_impl(
        &self,
        assignment_id: i64,
        update: UpdateAssignmentRequest,
    ) -> Result<Option<Assignment>> {
        let existing = Assignments::find_by_id(assignment_id)
            .one(&self.db)
            .await
            .map_err(|e| TransLearnError::database_operation(format!("查询作业失败: {e}")))?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();

        if let Some(title) = update.title {
            model.title = Set(title);
        }
        if let Some(kind) = update.kind {
            model.kind = Set(kind.to_string());
        }
        if let Some(questions) = update.questions {
            model.questions = Set(serde_json::to_string(&questions)?);
        }
        if let Some(due_at) = update.due_at {
            model.due_at = Set(due_at.map(|dt| dt.timestamp()));
        }
        if let Some(retry_limit) = update.retry_limit {
            model.retry_limit = Set(retry_limit.max(1));
        }
        if let Some(allow_view_ref) = update.allow_view_ref {
            model.allow_view_ref = Set(allow_view_ref);
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| TransLearnError::database_operation(format!("更新作业失败: {e}")))?;

        result.into_assignment().map(Some)
    }

    /// 删除作业，同一事务内先删除其全部提交
    pub async fn delete_assignment_impl(&self, assignment_id: i64) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| TransLearnError::database_operation(format!("开启事务失败: {e}")))?;

        let removed = Submissions::delete_many()
            .filter(SubmissionColumn::AssignmentId.eq(assignment_id))
            .exec(&txn)
            .await
            .map_err(|e| TransLearnError::database_operation(format!("删除作业提交失败: {e}")))?;

        let result = Assignments::delete_by_id(assignment_id)
            .exec(&txn)
            .await
            .map_err(|e| TransLearnError::database_operation(format!("删除作业失败: {e}")))?;

        if result.rows_affected == 0 {
            // 作业不存在，回滚
            txn.rollback()
                .await
                .map_err(|e| TransLearnError::database_operation(format!("回滚事务失败: {e}")))?;
            return Ok(false);
        }

        txn.commit()
            .await
            .map_err(|e| TransLearnError::database_operation(format!("提交事务失败: {e}")))?;

        tracing::debug!(
            "作业 {} 已删除，级联删除提交 {} 条",
            assignment_id,
            removed.rows_affected
        );
        Ok(true)
    }

    /// 分页列出班级作业，附带学生自己的提交状态（无提交即 pending）
    pub async fn list_class_assignments_for_student_impl(
        &self,
        class_id: i64,
        student_id: i64,
        page: u64,
        size: u64,
    ) -> Result<PaginatedResponse<ClassAssignmentItem>> {
        let page = page.max(1);
        let size = size.max(1);

        let select = Assignments::find()
            .filter(Column::ClassId.eq(class_id))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id);

        // 分页查询
        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| TransLearnError::database_operation(format!("查询作业总数失败: {e}")))?;

        let assignments = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| TransLearnError::database_operation(format!("查询作业列表失败: {e}")))?;

        // 批量查询该学生在本页作业下的提交
        let assignment_ids: Vec<i64> = assignments.iter().map(|a| a.id).collect();
        let submissions = if assignment_ids.is_empty() {
            Vec::new()
        } else {
            Submissions::find()
                .filter(SubmissionColumn::AssignmentId.is_in(assignment_ids))
                .filter(SubmissionColumn::StudentId.eq(student_id))
                .all(&self.db)
                .await
                .map_err(|e| {
                    TransLearnError::database_operation(format!("查询学生提交失败: {e}"))
                })?
        };

        let mut submission_map: HashMap<i64, (SubmissionStatus, Option<i32>)> = HashMap::new();
        for s in submissions {
            let status = s
                .status
                .parse::<SubmissionStatus>()
                .map_err(TransLearnError::serialization)?;
            submission_map.insert(s.assignment_id, (status, s.total_score));
        }

        let mut items = Vec::with_capacity(assignments.len());
        for model in assignments {
            let assignment = model.into_assignment()?;
            let (status, my_score) = submission_map
                .remove(&assignment.id)
                .unwrap_or((SubmissionStatus::Pending, None));

            items.push(ClassAssignmentItem {
                id: assignment.id,
                title: assignment.title,
                kind: assignment.kind,
                due_at: assignment.due_at,
                created_at: assignment.created_at,
                status,
                my_score,
            });
        }

        Ok(PaginatedResponse {
            items,
            pagination: PaginationInfo::new(page, size, total),
        })
    }
}
