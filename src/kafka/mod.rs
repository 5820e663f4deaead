//! Kafka 工具模块
//!
//! 提供 topic 声明、生产者与消费者的构建和订阅逻辑
//!
//! 与 rdkafka 交互的部分需要启用 `kafka` feature 才能使用

pub mod admin_config;
pub mod consumer_config;
pub mod handler;
pub mod message;
pub mod producer_config;
pub mod topic;

#[cfg(feature = "kafka")]
pub mod admin;
#[cfg(feature = "kafka")]
pub mod consumer_builder;
#[cfg(feature = "kafka")]
pub mod producer_builder;
#[cfg(feature = "kafka")]
pub mod publisher;
#[cfg(feature = "kafka")]
pub mod subscriber;

pub use admin_config::KafkaAdminConfig;
pub use consumer_config::KafkaConsumerConfig;
pub use handler::{FnHandler, LoggingHandler, MessageHandler, handler_fn};
pub use message::InboundMessage;
pub use producer_config::KafkaProducerConfig;
pub use topic::{TopicDescription, TopicOutcome, TopicSpec};

#[cfg(feature = "kafka")]
pub use admin::{TopicBootstrapper, build_admin_client};
#[cfg(feature = "kafka")]
pub use consumer_builder::build_kafka_consumer;
#[cfg(feature = "kafka")]
pub use producer_builder::build_kafka_producer;
#[cfg(feature = "kafka")]
pub use publisher::KafkaPublisher;
#[cfg(feature = "kafka")]
pub use subscriber::{KafkaSubscriber, subscribe};
