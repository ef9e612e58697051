//! AI 评分协作方
//!
//! 只负责一次 chat/completions 调用并返回模型输出的原始文本，
//! 解析与失败兜底由 [`super::evaluator::Evaluator`] 完成。

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ScoringConfig;
use crate::errors::{Result, TransLearnError};
use crate::models::assignments::entities::TranslationDirection;

#[async_trait::async_trait]
pub trait Scorer: Send + Sync {
    /// 对一份译文打分，返回模型输出的原始文本（期望为 JSON）
    async fn score(
        &self,
        direction: TranslationDirection,
        reference: &str,
        student: &str,
    ) -> Result<String>;
}

/// 评分系统提示词
pub fn system_prompt(direction: TranslationDirection) -> String {
    format!(
        "You are a strict translation evaluator. Compare the student's translation with the reference \
         and give a JSON object with fields: {{score: number 0-100, feedback: string}}. \
         Consider accuracy, fidelity, grammar, fluency. Direction: {direction}. Answer ONLY pure JSON."
    )
}

pub fn user_prompt(reference: &str, student: &str) -> String {
    format!("Reference:\n{reference}\n\nStudent:\n{student}")
}

/// OpenAI 兼容的 chat/completions 评分实现
#[derive(Clone)]
pub struct ChatCompletionScorer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl ChatCompletionScorer {
    pub fn new(config: &ScoringConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait::async_trait]
impl Scorer for ChatCompletionScorer {
    async fn score(
        &self,
        direction: TranslationDirection,
        reference: &str,
        student: &str,
    ) -> Result<String> {
        let req = ChatCompletionRequest {
            model: &self.model,
            stream: false,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt(direction),
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt(reference, student),
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let res = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&req)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(TransLearnError::scoring(format!(
                "评分服务返回 HTTP {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let body: ChatCompletionResponse = res.json().await?;
        if let Some(usage) = &body.usage {
            debug!(
                prompt_tokens = ?usage.prompt_tokens,
                completion_tokens = ?usage.completion_tokens,
                "评分调用用量"
            );
        }

        Ok(body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

/// 未配置 API Key 时使用：所有翻译题直接进入人工批改
pub struct DisabledScorer;

#[async_trait::async_trait]
impl Scorer for DisabledScorer {
    async fn score(
        &self,
        _direction: TranslationDirection,
        _reference: &str,
        _student: &str,
    ) -> Result<String> {
        Err(TransLearnError::scoring("评分服务未配置"))
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    stream: bool,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResp,
}

#[derive(Deserialize)]
struct ChatMessageResp {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: Option<u32>,
    #[serde(default)]
    completion_tokens: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_carry_direction_and_texts() {
        let sys = system_prompt(TranslationDirection::EnZh);
        assert!(sys.contains("Direction: en-zh"));
        assert!(sys.contains("accuracy, fidelity, grammar, fluency"));

        let user = user_prompt("I like reading", "I love read");
        assert_eq!(user, "Reference:\nI like reading\n\nStudent:\nI love read");
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let config = ScoringConfig {
            base_url: "https://example.com/v4/".into(),
            api_key: "k".into(),
            model: "m".into(),
            temperature: 0.2,
            max_tokens: 512,
            timeout_ms: 1000,
            concurrency: 1,
        };
        let scorer = ChatCompletionScorer::new(&config).unwrap();
        assert_eq!(scorer.endpoint, "https://example.com/v4/chat/completions");
    }

    #[tokio::test]
    async fn test_disabled_scorer_always_fails() {
        let result = DisabledScorer
            .score(TranslationDirection::ZhEn, "a", "b")
            .await;
        assert!(matches!(result, Err(TransLearnError::Scoring(_))));
    }
}
