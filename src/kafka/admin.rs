//! Topic 声明器
//!
//! 在流量开始之前确保 topic 存在：不存在则创建，已存在则只校验分区数

use std::time::Duration;

use rdkafka::admin::{
    AdminClient, AdminOptions, NewPartitions, NewTopic, TopicReplication, TopicResult,
};
use rdkafka::client::DefaultClientContext;
use rdkafka::config::ClientConfig;
use rdkafka::error::RDKafkaErrorCode;
use tracing::{debug, info, warn};

use crate::error::{ErrorBuilder, ErrorCode, Result, RvgError};
use crate::kafka::admin_config::KafkaAdminConfig;
use crate::kafka::topic::{TopicDescription, TopicOutcome, TopicSpec};

/// 构建 Kafka Admin 客户端
pub fn build_admin_client(
    config: &dyn KafkaAdminConfig,
) -> std::result::Result<AdminClient<DefaultClientContext>, rdkafka::error::KafkaError> {
    ClientConfig::new()
        .set("bootstrap.servers", config.kafka_bootstrap())
        .set("security.protocol", "plaintext")
        .create()
}

/// Topic 声明器
pub struct TopicBootstrapper {
    admin: AdminClient<DefaultClientContext>,
    operation_timeout: Duration,
    metadata_timeout: Duration,
}

impl TopicBootstrapper {
    pub fn new(config: &dyn KafkaAdminConfig) -> Result<Self> {
        let admin = build_admin_client(config)?;

        info!(
            bootstrap = %config.kafka_bootstrap(),
            "Kafka admin client created successfully"
        );

        Ok(Self {
            admin,
            operation_timeout: Duration::from_millis(config.operation_timeout_ms()),
            metadata_timeout: Duration::from_millis(config.metadata_timeout_ms()),
        })
    }

    fn admin_options(&self) -> AdminOptions {
        AdminOptions::new()
            .operation_timeout(Some(self.operation_timeout))
            .request_timeout(Some(self.operation_timeout))
    }

    /// 确保 topic 存在（幂等）
    ///
    /// 已存在的 topic 分区数少于声明值时会扩容到声明值；其余配置不做修改
    pub async fn ensure_topic(&self, spec: &TopicSpec) -> Result<TopicOutcome> {
        spec.validate()?;

        let mut new_topic = NewTopic::new(
            spec.name(),
            spec.partitions(),
            TopicReplication::Fixed(spec.replication_factor()),
        );
        for (key, value) in spec.config() {
            new_topic = new_topic.set(key, value);
        }

        debug!(
            topic = %spec.name(),
            partitions = spec.partitions(),
            replication_factor = spec.replication_factor(),
            config = ?spec.config(),
            "Declaring Kafka topic"
        );

        let results = self
            .admin
            .create_topics([&new_topic], &self.admin_options())
            .await?;

        let outcome = match Self::single_result(spec, results)? {
            None => TopicOutcome::Created,
            Some(RDKafkaErrorCode::TopicAlreadyExists) => self.reconcile_partitions(spec).await?,
            Some(RDKafkaErrorCode::InvalidReplicationFactor) => {
                return Err(ErrorBuilder::new(
                    ErrorCode::InsufficientReplicas,
                    "not enough brokers for the requested replication factor",
                )
                .param("topic", spec.name())
                .param("replication_factor", spec.replication_factor().to_string())
                .build_error());
            }
            Some(code) => {
                return Err(RvgError::topic_creation_failed(spec.name(), code.to_string()));
            }
        };

        info!(
            topic = %spec.name(),
            partitions = spec.partitions(),
            replication_factor = spec.replication_factor(),
            outcome = %outcome,
            "Kafka topic ready"
        );

        Ok(outcome)
    }

    /// 取出唯一一个 topic 结果，`None` 表示成功
    fn single_result(
        spec: &TopicSpec,
        results: Vec<TopicResult>,
    ) -> Result<Option<RDKafkaErrorCode>> {
        match results.into_iter().next() {
            Some(Ok(_)) => Ok(None),
            Some(Err((_, code))) => Ok(Some(code)),
            None => Err(RvgError::topic_creation_failed(
                spec.name(),
                "broker returned no result for topic creation",
            )),
        }
    }

    async fn reconcile_partitions(&self, spec: &TopicSpec) -> Result<TopicOutcome> {
        let current = match self.describe_topic(spec.name())? {
            Some(description) => description.partitions,
            None => return Ok(TopicOutcome::AlreadyExists),
        };

        if current > spec.partitions() {
            warn!(
                topic = %spec.name(),
                current,
                declared = spec.partitions(),
                "Topic has more partitions than declared, leaving it unchanged"
            );
            return Ok(TopicOutcome::AlreadyExists);
        }
        if current == spec.partitions() {
            return Ok(TopicOutcome::AlreadyExists);
        }

        // current < declared 且均为正数
        let new_partitions = NewPartitions::new(spec.name(), spec.partitions() as usize);
        let results = self
            .admin
            .create_partitions([&new_partitions], &self.admin_options())
            .await?;

        match results.into_iter().next() {
            Some(Ok(_)) => Ok(TopicOutcome::PartitionsIncreased {
                from: current,
                to: spec.partitions(),
            }),
            Some(Err((_, code))) => Err(ErrorBuilder::new(
                ErrorCode::PartitionUpdateFailed,
                "failed to increase topic partitions",
            )
            .param("topic", spec.name())
            .details(code.to_string())
            .build_error()),
            None => Err(RvgError::localized(
                ErrorCode::PartitionUpdateFailed,
                "broker returned no result for partition update",
            )),
        }
    }

    /// 读取 topic 的分区数与副本数，topic 不存在时返回 `None`
    ///
    /// 元数据请求是阻塞调用，只在启动阶段使用
    pub fn describe_topic(&self, name: &str) -> Result<Option<TopicDescription>> {
        let metadata = self
            .admin
            .inner()
            .fetch_metadata(Some(name), self.metadata_timeout)
            .map_err(|e| {
                ErrorBuilder::new(ErrorCode::MetadataFetchFailed, "failed to fetch topic metadata")
                    .param("topic", name)
                    .details(e.to_string())
                    .build_error()
            })?;

        let Some(topic) = metadata.topics().iter().find(|t| t.name() == name) else {
            return Ok(None);
        };
        if topic.error().is_some() || topic.partitions().is_empty() {
            return Ok(None);
        }

        let replication_factor = topic
            .partitions()
            .iter()
            .map(|p| p.replicas().len() as i32)
            .min()
            .unwrap_or(0);

        Ok(Some(TopicDescription {
            name: topic.name().to_string(),
            partitions: topic.partitions().len() as i32,
            replication_factor,
        }))
    }
}
