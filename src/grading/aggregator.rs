//! 提交汇总：逐题初评并计算总分与状态

use futures_util::{StreamExt, stream};

use super::evaluator::Evaluator;
use crate::models::assignments::entities::Question;
use crate::models::submissions::entities::{AnswerItem, RawAnswer, SubmissionStatus};

/// 汇总结果
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult {
    pub answers: Vec<AnswerItem>,
    pub total_score: Option<i32>,
    pub status: SubmissionStatus,
}

/// 所有有分数的题目的平均分，四舍五入；没有任何分数时为 None
pub fn mean_score(answers: &[AnswerItem]) -> Option<i32> {
    let scores: Vec<f64> = answers.iter().filter_map(|a| a.score).collect();
    if scores.is_empty() {
        return None;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    Some(mean.round() as i32)
}

#[derive(Clone)]
pub struct Aggregator {
    evaluator: Evaluator,
    concurrency: usize,
}

impl Aggregator {
    pub fn new(evaluator: Evaluator, concurrency: usize) -> Self {
        Self {
            evaluator,
            concurrency: concurrency.max(1),
        }
    }

    /// 按位置将答案对应到题目；多出的答案直接丢弃
    ///
    /// 输出顺序始终与答案位置一致，与并发度无关。
    pub async fn aggregate(&self, questions: &[Question], answers: Vec<RawAnswer>) -> AggregateResult {
        let evaluator = &self.evaluator;
        let items: Vec<AnswerItem> = stream::iter(questions.iter().zip(answers).enumerate())
            .map(|(index, (question, answer))| async move {
                let evaluation = evaluator.evaluate_question(question, &answer).await;
                AnswerItem {
                    index: index as u32,
                    text: answer.text,
                    audio_url: answer.audio_url,
                    score: evaluation.score,
                    feedback: evaluation.feedback,
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let total_score = mean_score(&items);
        let status = if total_score.is_some() {
            SubmissionStatus::Graded
        } else {
            SubmissionStatus::Submitted
        };

        AggregateResult {
            answers: items,
            total_score,
            status,
        }
    }
}
