//! 应用配置
//!
//! 配置来自 `config/application.toml`（文件不存在时全部使用默认值），
//! broker 地址可以通过 `KAFKA_BOOTSTRAP_SERVERS` 环境变量覆盖

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RvgError};
use crate::kafka::topic::TopicSpec;
use crate::runtime::RuntimeConfig;
use crate::types::{
    CONSUMER_GROUP_ID, DEFAULT_BOOTSTRAP_SERVERS, TOPIC_MAX_MESSAGE_BYTES, TOPIC_NAME,
    TOPIC_PARTITIONS, TOPIC_REPLICATION_FACTOR, TOPIC_RETENTION_MS, TOPIC_SEGMENT_BYTES,
    parse_bootstrap_servers,
};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config/application.toml";

/// 覆盖 broker 地址的环境变量
pub const BOOTSTRAP_SERVERS_ENV: &str = "KAFKA_BOOTSTRAP_SERVERS";

/// 配置来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigOrigin {
    /// 读取的配置文件，`None` 表示全部使用默认值
    pub file: Option<PathBuf>,
    /// broker 地址是否来自 `KAFKA_BOOTSTRAP_SERVERS`
    pub bootstrap_from_env: bool,
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(path) => write!(f, "file {}", path.display())?,
            None => write!(f, "built-in defaults")?,
        }
        if self.bootstrap_from_env {
            write!(f, ", bootstrap servers from {}", BOOTSTRAP_SERVERS_ENV)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub kafka: KafkaConfig,
    pub topic: TopicConfig,
    pub producer: ProducerConfig,
    pub consumer: ConsumerConfig,
    pub logging: LoggingConfig,
    pub runtime: RuntimeSection,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KafkaConfig {
    /// `host:port[,host:port...]`
    pub bootstrap_servers: String,
    /// Admin 操作（建 topic、扩分区）超时
    pub admin_operation_timeout_ms: u64,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            bootstrap_servers: DEFAULT_BOOTSTRAP_SERVERS.to_string(),
            admin_operation_timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TopicConfig {
    pub name: String,
    pub partitions: i32,
    pub replication_factor: i32,
    pub cleanup_policy: String,
    pub retention_ms: u64,
    pub segment_bytes: u64,
    pub max_message_bytes: u64,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            name: TOPIC_NAME.to_string(),
            partitions: TOPIC_PARTITIONS,
            replication_factor: TOPIC_REPLICATION_FACTOR,
            cleanup_policy: "delete".to_string(),
            retention_ms: TOPIC_RETENTION_MS,
            segment_bytes: TOPIC_SEGMENT_BYTES,
            max_message_bytes: TOPIC_MAX_MESSAGE_BYTES,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProducerConfig {
    pub message_timeout_ms: u64,
    pub enable_idempotence: bool,
    pub compression_type: String,
    pub linger_ms: u64,
    /// 关闭时等待未发送消息的最长时间，必须小于 `runtime.shutdown_timeout_ms`
    pub flush_timeout_ms: u64,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            message_timeout_ms: 120_000,
            enable_idempotence: true,
            compression_type: "none".to_string(),
            linger_ms: 5,
            flush_timeout_ms: 4_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConsumerConfig {
    pub group_id: String,
    pub topics: Vec<String>,
    /// 同一 group 内启动的监听任务数
    pub concurrency: usize,
    pub auto_offset_reset: String,
    pub enable_auto_commit: bool,
    pub auto_commit_interval_ms: u64,
    pub session_timeout_ms: u64,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            group_id: CONSUMER_GROUP_ID.to_string(),
            topics: vec![TOPIC_NAME.to_string()],
            concurrency: 1,
            auto_offset_reset: "earliest".to_string(),
            enable_auto_commit: true,
            auto_commit_interval_ms: 5_000,
            session_timeout_ms: 45_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `RUST_LOG` 未设置时使用的过滤级别
    pub level: String,
    /// text 或 json
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeSection {
    pub shutdown_timeout_ms: u64,
}

impl Default for RuntimeSection {
    fn default() -> Self {
        Self {
            shutdown_timeout_ms: 5_000,
        }
    }
}

impl AppConfig {
    /// 从 TOML 文件加载
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// 加载默认位置的配置，叠加环境变量并校验
    ///
    /// 此时日志尚未初始化，配置来源通过返回值交给调用方记录
    pub fn load() -> Result<(Self, ConfigOrigin)> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// 同 `load`，文件不存在时使用默认值
    pub fn load_from(path: impl AsRef<Path>) -> Result<(Self, ConfigOrigin)> {
        let path = path.as_ref();
        let (mut config, file) = if path.exists() {
            (Self::load_from_file(path)?, Some(path.to_path_buf()))
        } else {
            (Self::default(), None)
        };

        let bootstrap_from_env = config.apply_env_with(|key| std::env::var(key).ok());
        config.validate()?;
        Ok((
            config,
            ConfigOrigin {
                file,
                bootstrap_from_env,
            },
        ))
    }

    /// 使用给定的查找函数应用环境变量覆盖，返回是否发生了覆盖
    pub fn apply_env_with<F>(&mut self, lookup: F) -> bool
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(BOOTSTRAP_SERVERS_ENV).filter(|s| !s.trim().is_empty()) {
            Some(servers) => {
                self.kafka.bootstrap_servers = servers;
                true
            }
            None => false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        parse_bootstrap_servers(&self.kafka.bootstrap_servers)?;

        if self.consumer.group_id.trim().is_empty() {
            return Err(RvgError::configuration_error("consumer.group_id must not be empty"));
        }
        if self.consumer.topics.is_empty() {
            return Err(RvgError::configuration_error("consumer.topics must not be empty"));
        }
        if self.consumer.concurrency == 0 {
            return Err(RvgError::configuration_error("consumer.concurrency must be at least 1"));
        }
        if self.producer.flush_timeout_ms >= self.runtime.shutdown_timeout_ms {
            return Err(RvgError::configuration_error(format!(
                "producer.flush_timeout_ms ({}) must be less than runtime.shutdown_timeout_ms ({})",
                self.producer.flush_timeout_ms, self.runtime.shutdown_timeout_ms
            )));
        }
        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(RvgError::configuration_error(format!(
                "logging.format must be text or json, got {}",
                self.logging.format
            )));
        }

        self.topic_spec().validate()
    }

    /// 根据 `[topic]` 段构建 topic 声明
    pub fn topic_spec(&self) -> TopicSpec {
        TopicSpec::new(
            self.topic.name.clone(),
            self.topic.partitions,
            self.topic.replication_factor,
        )
        .with_config("cleanup.policy", self.topic.cleanup_policy.clone())
        .with_config("retention.ms", self.topic.retention_ms.to_string())
        .with_config("segment.bytes", self.topic.segment_bytes.to_string())
        .with_config("max.message.bytes", self.topic.max_message_bytes.to_string())
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig::default()
            .with_shutdown_timeout(Duration::from_millis(self.runtime.shutdown_timeout_ms))
    }
}

#[cfg(feature = "kafka")]
mod kafka_impls {
    use super::AppConfig;
    use crate::kafka::{KafkaAdminConfig, KafkaConsumerConfig, KafkaProducerConfig};

    impl KafkaAdminConfig for AppConfig {
        fn kafka_bootstrap(&self) -> &str {
            &self.kafka.bootstrap_servers
        }

        fn operation_timeout_ms(&self) -> u64 {
            self.kafka.admin_operation_timeout_ms
        }
    }

    impl KafkaProducerConfig for AppConfig {
        fn kafka_bootstrap(&self) -> &str {
            &self.kafka.bootstrap_servers
        }

        fn message_timeout_ms(&self) -> u64 {
            self.producer.message_timeout_ms
        }

        fn enable_idempotence(&self) -> bool {
            self.producer.enable_idempotence
        }

        fn compression_type(&self) -> &str {
            &self.producer.compression_type
        }

        fn linger_ms(&self) -> u64 {
            self.producer.linger_ms
        }
    }

    impl KafkaConsumerConfig for AppConfig {
        fn kafka_bootstrap(&self) -> &str {
            &self.kafka.bootstrap_servers
        }

        fn consumer_group(&self) -> &str {
            &self.consumer.group_id
        }

        fn session_timeout_ms(&self) -> u64 {
            self.consumer.session_timeout_ms
        }

        fn enable_auto_commit(&self) -> bool {
            self.consumer.enable_auto_commit
        }

        fn auto_commit_interval_ms(&self) -> u64 {
            self.consumer.auto_commit_interval_ms
        }

        fn auto_offset_reset(&self) -> &str {
            &self.consumer.auto_offset_reset
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn defaults_match_wire_contract() {
        let config = AppConfig::default();
        assert_eq!(config.kafka.bootstrap_servers, "localhost:9092");
        assert_eq!(config.topic.name, "rvg-kafka-topic");
        assert_eq!(config.consumer.group_id, "rvg-kafka-id");
        assert_eq!(config.consumer.concurrency, 1);
        assert!(config.consumer.enable_auto_commit);
        assert!(config.producer.flush_timeout_ms < config.runtime.shutdown_timeout_ms);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [kafka]
            bootstrap_servers = "kafka-1:9092,kafka-2:9092"

            [consumer]
            concurrency = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.kafka.bootstrap_servers, "kafka-1:9092,kafka-2:9092");
        assert_eq!(config.kafka.admin_operation_timeout_ms, 30_000);
        assert_eq!(config.consumer.concurrency, 2);
        assert_eq!(config.consumer.group_id, "rvg-kafka-id");
        assert_eq!(config.topic.partitions, 2);
    }

    #[test]
    fn env_override_replaces_bootstrap_servers() {
        let mut config = AppConfig::default();
        let overridden = config.apply_env_with(|key| {
            (key == BOOTSTRAP_SERVERS_ENV).then(|| "broker:29092".to_string())
        });
        assert!(overridden);
        assert_eq!(config.kafka.bootstrap_servers, "broker:29092");

        assert!(!config.apply_env_with(|_| Some("  ".to_string())));
        assert_eq!(config.kafka.bootstrap_servers, "broker:29092");
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.kafka.bootstrap_servers = "no-port".to_string();
        let err = config.validate().unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::InvalidBootstrapServers));

        let mut config = AppConfig::default();
        config.consumer.concurrency = 0;
        assert_eq!(config.validate().unwrap_err().code(), Some(ErrorCode::ConfigurationError));

        let mut config = AppConfig::default();
        config.producer.flush_timeout_ms = config.runtime.shutdown_timeout_ms;
        assert_eq!(config.validate().unwrap_err().code(), Some(ErrorCode::ConfigurationError));

        let mut config = AppConfig::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.topic.partitions = 0;
        assert_eq!(config.validate().unwrap_err().code(), Some(ErrorCode::TopicInvalid));
    }

    #[test]
    fn topic_spec_carries_retention_and_size_limits() {
        let spec = AppConfig::default().topic_spec();
        assert_eq!(spec.config().get("cleanup.policy").map(String::as_str), Some("delete"));
        assert_eq!(spec.config().get("retention.ms").map(String::as_str), Some("86400000"));
        assert_eq!(spec.config().get("segment.bytes").map(String::as_str), Some("1073741824"));
        assert_eq!(spec.config().get("max.message.bytes").map(String::as_str), Some("1000012"));
    }

    #[test]
    fn malformed_toml_is_configuration_error() {
        let err = AppConfig::from_toml_str("[kafka\nbootstrap_servers = 1").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::ConfigurationError));
    }

    #[test]
    fn missing_file_falls_back_to_defaults_and_reports_origin() {
        let (config, origin) = AppConfig::load_from("does/not/exist.toml").unwrap();
        assert_eq!(origin.file, None);
        assert_eq!(config.topic.name, "rvg-kafka-topic");
        assert!(origin.to_string().starts_with("built-in defaults"));
    }

    #[test]
    fn origin_display_names_file_and_env_override() {
        let origin = ConfigOrigin {
            file: Some(PathBuf::from("config/application.toml")),
            bootstrap_from_env: true,
        };
        assert_eq!(
            origin.to_string(),
            "file config/application.toml, bootstrap servers from KAFKA_BOOTSTRAP_SERVERS"
        );
    }
}
