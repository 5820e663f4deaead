//! 日志初始化
//!
//! `RUST_LOG` 优先，未设置时使用配置中的级别；rdkafka 通过 `log` crate 输出的日志经
//! `tracing-log` 桥接到同一个 subscriber

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt};

use crate::config::LoggingConfig;
use crate::error::{ErrorCode, Result, ResultExt};

/// 构建日志过滤器
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// 初始化全局 tracing subscriber，只能调用一次
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    tracing_log::LogTracer::init().with_code(
        ErrorCode::ConfigurationError,
        "failed to install log-to-tracing bridge",
    )?;

    let registry = tracing_subscriber::registry().with(env_filter(config));

    let installed = if config.format == "json" {
        tracing::subscriber::set_global_default(
            registry.with(fmt::layer().json().with_target(true)),
        )
    } else {
        tracing::subscriber::set_global_default(registry.with(fmt::layer().with_target(true)))
    };

    installed.with_code(ErrorCode::ConfigurationError, "failed to install tracing subscriber")
}
