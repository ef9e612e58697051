//! 教师批改合并
//!
//! 以题目下标为键，将教师批注叠加到已有答案上。

use std::collections::{BTreeMap, HashSet};

use super::aggregator::mean_score;
use crate::errors::{Result, TransLearnError};
use crate::models::submissions::entities::{AnswerItem, SubmissionStatus};
use crate::models::submissions::requests::GradePatch;

/// 合并后的完整提交状态
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub answers: Vec<AnswerItem>,
    pub total_score: Option<i32>,
    pub comment: Option<String>,
    pub status: SubmissionStatus,
}

/// 当前已保存的批改相关字段
#[derive(Debug, Clone, Copy)]
pub struct CurrentGrade<'a> {
    pub answers: &'a [AnswerItem],
    pub total_score: Option<i32>,
    pub comment: Option<&'a str>,
}

/// 单题分数必须是 [0, 100] 内的有限数字，不做截断
pub fn validate_patches(patches: &[GradePatch]) -> Result<()> {
    for patch in patches {
        let Some(score) = patch.score else {
            continue;
        };
        if !score.is_finite() || !(0.0..=100.0).contains(&score) {
            return Err(TransLearnError::validation(format!(
                "第 {} 题分数 {score} 超出范围 [0, 100]",
                patch.index
            )));
        }
    }
    Ok(())
}

/// 总分截断到 [0, 100] 后四舍五入
pub fn normalize_total(total: f64) -> Result<i32> {
    if !total.is_finite() {
        return Err(TransLearnError::validation("总分必须是有限数字"));
    }
    Ok(total.clamp(0.0, 100.0).round() as i32)
}

pub fn merge_grade(
    current: CurrentGrade<'_>,
    patches: &[GradePatch],
    explicit_total: Option<f64>,
    explicit_comment: Option<String>,
) -> Result<MergeOutcome> {
    validate_patches(patches)?;
    let explicit_total = explicit_total.map(normalize_total).transpose()?;

    // 同一下标出现多次时后者覆盖前者
    let lookup: BTreeMap<u32, &GradePatch> = patches.iter().map(|p| (p.index, p)).collect();

    let mut seen = HashSet::with_capacity(current.answers.len());
    let mut answers: Vec<AnswerItem> = current
        .answers
        .iter()
        .map(|item| {
            seen.insert(item.index);
            let mut merged = item.clone();
            if let Some(patch) = lookup.get(&item.index) {
                if let Some(score) = patch.score {
                    merged.score = Some(score);
                }
                if let Some(feedback) = &patch.feedback {
                    merged.feedback = Some(feedback.clone());
                }
            }
            merged
        })
        .collect();

    // 学生未作答但教师给分的题目，追加在末尾
    for (index, patch) in lookup {
        if seen.contains(&index) {
            continue;
        }
        answers.push(AnswerItem {
            index,
            text: None,
            audio_url: None,
            score: patch.score,
            feedback: patch.feedback.clone(),
        });
    }

    let total_score = explicit_total
        .or_else(|| mean_score(&answers))
        .or(current.total_score);

    let comment = explicit_comment.or_else(|| current.comment.map(String::from));

    Ok(MergeOutcome {
        answers,
        total_score,
        comment,
        status: SubmissionStatus::Graded,
    })
}
