use crate::config::ViewerConfig;
use crate::metrics::RequestMetrics;
use anyhow::Context;
use logread::{LogPipeline, PathGuard};
use std::sync::Arc;
use tracing::info;

/// Shared application state (thread-safe, read-only after startup)
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ViewerConfig>,
    pub pipeline: Arc<LogPipeline>,
    pub metrics: RequestMetrics,
}

impl AppState {
    pub fn new(config: ViewerConfig) -> anyhow::Result<Self> {
        let guard = PathGuard::new(&config.logs.root_dir)
            .context("Failed to resolve log root")?;

        let pipeline = LogPipeline::new(guard)
            .with_strategy(config.logs.tail_strategy)
            .with_max_lines(config.logs.max_lines);

        info!(
            "Log root: {} (tail strategy: {}, max lines: {})",
            pipeline.guard().root().display(),
            config.logs.tail_strategy.as_str(),
            pipeline.max_lines()
        );

        Ok(Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            metrics: RequestMetrics::new(),
        })
    }
}
