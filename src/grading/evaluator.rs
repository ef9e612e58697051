//! 译文自动初评
//!
//! 评分协作方的任何失败（网络、超时、输出无法解析、分数非法）都在这里兜底，
//! 不会向上传播。

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use super::scorer::{ChatCompletionScorer, DisabledScorer, Scorer};
use crate::config::ScoringConfig;
use crate::errors::{Result, TransLearnError};
use crate::models::assignments::entities::{Question, TranslationDirection};
use crate::models::submissions::entities::RawAnswer;

/// 无参考答案时的反馈
pub const NO_REFERENCE_FEEDBACK: &str = "no reference, skipped";
/// 自动初评失败时的反馈
pub const FALLBACK_FEEDBACK: &str = "auto-evaluation failed, pending manual review";

/// 单题初评结果，朗读题两项均为 None
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    pub score: Option<f64>,
    pub feedback: Option<String>,
}

impl Evaluation {
    fn skipped() -> Self {
        Self {
            score: None,
            feedback: Some(NO_REFERENCE_FEEDBACK.to_string()),
        }
    }

    fn failed() -> Self {
        Self {
            score: None,
            feedback: Some(FALLBACK_FEEDBACK.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct Evaluator {
    scorer: Arc<dyn Scorer>,
    timeout: Duration,
}

impl Evaluator {
    pub fn new(scorer: Arc<dyn Scorer>, timeout: Duration) -> Self {
        Self { scorer, timeout }
    }

    /// 按配置创建；未配置 API Key 时所有翻译题都转人工批改
    pub fn from_config(config: &ScoringConfig) -> Result<Self> {
        let scorer: Arc<dyn Scorer> = if config.api_key.trim().is_empty() {
            warn!("未配置评分服务 API Key，翻译题将全部等待人工批改");
            Arc::new(DisabledScorer)
        } else {
            Arc::new(ChatCompletionScorer::new(config)?)
        };
        Ok(Self::new(scorer, Duration::from_millis(config.timeout_ms)))
    }

    /// 对单份译文评分
    pub async fn evaluate(
        &self,
        student: &str,
        reference: Option<&str>,
        direction: TranslationDirection,
    ) -> Evaluation {
        let Some(reference) = reference.filter(|r| !r.trim().is_empty()) else {
            return Evaluation::skipped();
        };

        let raw = match tokio::time::timeout(
            self.timeout,
            self.scorer.score(direction, reference, student),
        )
        .await
        {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                warn!("自动初评调用失败: {}", e);
                return Evaluation::failed();
            }
            Err(_) => {
                warn!("自动初评超时 ({:?})", self.timeout);
                return Evaluation::failed();
            }
        };

        match parse_score(&raw) {
            Ok((score, feedback)) => {
                debug!("自动初评完成: score={}", score);
                Evaluation {
                    score: Some(score),
                    feedback: Some(feedback),
                }
            }
            Err(e) => {
                warn!("自动初评结果无法解析: {}", e);
                Evaluation::failed()
            }
        }
    }

    /// 按题型决定评分或跳过：翻译题评分，朗读题不产生分数和反馈
    pub async fn evaluate_question(&self, question: &Question, answer: &RawAnswer) -> Evaluation {
        match question.kind.direction() {
            Some(direction) => {
                let text = answer.text.as_deref().unwrap_or_default();
                self.evaluate(text, question.reference(), direction).await
            }
            None => Evaluation::default(),
        }
    }
}

/// 解析模型输出，返回 (score, feedback)
///
/// 接受裸 JSON 对象或包在 Markdown 代码块里的 JSON；
/// score 必须是 [0, 100] 内的有限数字。feedback 不是字符串时回退为原始输出。
pub fn parse_score(raw: &str) -> Result<(f64, String)> {
    let body = extract_json_object(raw)
        .ok_or_else(|| TransLearnError::scoring("评分输出中没有 JSON 对象"))?;
    let value: Value = serde_json::from_str(body)
        .map_err(|e| TransLearnError::scoring(format!("评分输出不是合法 JSON: {e}")))?;

    let score = value
        .get("score")
        .and_then(Value::as_f64)
        .ok_or_else(|| TransLearnError::scoring("评分输出缺少数字 score 字段"))?;
    if !score.is_finite() || !(0.0..=100.0).contains(&score) {
        return Err(TransLearnError::scoring(format!("评分超出范围: {score}")));
    }

    let feedback = match value.get("feedback") {
        Some(Value::String(s)) => s.clone(),
        _ => raw.to_string(),
    };

    Ok((score, feedback))
}

fn extract_json_object(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();

    // ```json ... ```
    let unfenced = match trimmed.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.split_once('\n').map_or("", |(_, body)| body);
            rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
        }
        None => trimmed,
    };

    if unfenced.starts_with('{') && unfenced.ends_with('}') {
        return Some(unfenced);
    }

    let start = unfenced.find('{')?;
    let end = unfenced.rfind('}')?;
    (start < end).then(|| &unfenced[start..=end])
}
