//! Topic 声明
//!
//! `TopicSpec` 描述期望存在的 topic，`TopicBootstrapper` 负责把它落到 broker 上

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Result, RvgError};
use crate::types::{
    TOPIC_MAX_MESSAGE_BYTES, TOPIC_NAME, TOPIC_PARTITIONS, TOPIC_REPLICATION_FACTOR,
    TOPIC_RETENTION_MS, TOPIC_SEGMENT_BYTES,
};

/// Kafka 对 topic 名称的长度限制
const MAX_TOPIC_NAME_LEN: usize = 249;

/// Topic 声明
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSpec {
    name: String,
    partitions: i32,
    replication_factor: i32,
    config: BTreeMap<String, String>,
}

impl TopicSpec {
    pub fn new(name: impl Into<String>, partitions: i32, replication_factor: i32) -> Self {
        Self {
            name: name.into(),
            partitions,
            replication_factor,
            config: BTreeMap::new(),
        }
    }

    /// `rvg-kafka-topic`：2 分区、2 副本、保留 1 天、段 1 GiB、单条消息约 1 MB
    pub fn rvg_default() -> Self {
        Self::new(TOPIC_NAME, TOPIC_PARTITIONS, TOPIC_REPLICATION_FACTOR)
            .with_config("cleanup.policy", "delete")
            .with_config("retention.ms", TOPIC_RETENTION_MS.to_string())
            .with_config("segment.bytes", TOPIC_SEGMENT_BYTES.to_string())
            .with_config("max.message.bytes", TOPIC_MAX_MESSAGE_BYTES.to_string())
    }

    #[must_use]
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_replication_factor(mut self, replication_factor: i32) -> Self {
        self.replication_factor = replication_factor;
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn partitions(&self) -> i32 {
        self.partitions
    }

    pub fn replication_factor(&self) -> i32 {
        self.replication_factor
    }

    pub fn config(&self) -> &BTreeMap<String, String> {
        &self.config
    }

    /// 校验名称与分区、副本数
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() || self.name.len() > MAX_TOPIC_NAME_LEN {
            return Err(RvgError::topic_invalid(format!(
                "topic name length must be 1..={}, got {}",
                MAX_TOPIC_NAME_LEN,
                self.name.len()
            )));
        }
        if self.name == "." || self.name == ".." {
            return Err(RvgError::topic_invalid("topic name cannot be '.' or '..'"));
        }
        if let Some(c) = self
            .name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
        {
            return Err(RvgError::topic_invalid(format!(
                "topic name '{}' contains illegal character '{}'",
                self.name, c
            )));
        }
        if self.partitions < 1 {
            return Err(RvgError::topic_invalid(format!(
                "partitions must be at least 1, got {}",
                self.partitions
            )));
        }
        if self.replication_factor < 1 {
            return Err(RvgError::topic_invalid(format!(
                "replication factor must be at least 1, got {}",
                self.replication_factor
            )));
        }
        Ok(())
    }
}

/// `ensure_topic` 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicOutcome {
    /// 新建了 topic
    Created,
    /// topic 已存在，未做修改
    AlreadyExists,
    /// topic 已存在但分区数不足，已扩容
    PartitionsIncreased { from: i32, to: i32 },
}

impl fmt::Display for TopicOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicOutcome::Created => write!(f, "created"),
            TopicOutcome::AlreadyExists => write!(f, "already exists"),
            TopicOutcome::PartitionsIncreased { from, to } => {
                write!(f, "partitions increased from {} to {}", from, to)
            }
        }
    }
}

/// 从集群元数据读取到的 topic 信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicDescription {
    pub name: String,
    pub partitions: i32,
    pub replication_factor: i32,
}
