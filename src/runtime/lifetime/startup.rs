use crate::config::AppConfig;
use crate::grading::{Aggregator, Evaluator, GradingPipeline};
use crate::storage::Storage;
use std::sync::Arc;
use tracing::warn;

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub pipeline: GradingPipeline,
}

/// 构建提交与批改流程
fn create_pipeline(storage: Arc<dyn Storage>, config: &AppConfig) -> GradingPipeline {
    let evaluator =
        Evaluator::from_config(&config.scoring).expect("Failed to create scoring client");

    if config.scoring_enabled() {
        warn!(
            "Auto-evaluation enabled: model {}, timeout {} ms, concurrency {}",
            config.scoring.model, config.scoring.timeout_ms, config.scoring.concurrency
        );
    }

    GradingPipeline::new(
        storage,
        Aggregator::new(evaluator, config.scoring.concurrency),
    )
}

/// 准备服务器启动的上下文
/// 包括存储与提交/批改流程
pub async fn prepare_server_startup() -> StartupContext {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let config = AppConfig::get();

    let storage = crate::storage::create_storage()
        .await
        .expect("Failed to create storage backend");
    warn!("Storage backend initialized and migrations completed");

    let pipeline = create_pipeline(storage.clone(), config);
    warn!("Grading pipeline initialized");

    StartupContext { storage, pipeline }
}
