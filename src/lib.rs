//! RVG Kafka
//!
//! 两个最小进程共享的库：
//! - provider：声明 topic，启动时发送一条固定消息
//! - consumer：以固定 group 订阅 topic，逐条记录收到的消息

pub mod config;
pub mod error;
pub mod kafka;
pub mod runtime;
pub mod telemetry;
pub mod types;

// Re-exports
pub use config::AppConfig;
pub use error::{ErrorBuilder, ErrorCategory, ErrorCode, Result, RvgError};
pub use runtime::{RuntimeConfig, ServiceRuntime};
pub use types::{CONSUMER_GROUP_ID, HELLO_MESSAGE, TOPIC_NAME};

// Kafka re-exports
pub use kafka::{InboundMessage, LoggingHandler, MessageHandler, TopicSpec};
#[cfg(feature = "kafka")]
pub use kafka::{KafkaPublisher, KafkaSubscriber, TopicBootstrapper, subscribe};
