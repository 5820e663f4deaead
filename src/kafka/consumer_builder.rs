//! Kafka 消费者构建器

use rdkafka::config::ClientConfig;
use rdkafka::consumer::StreamConsumer;
use tracing::info;

use crate::kafka::consumer_config::KafkaConsumerConfig;

/// 构建 Kafka 消费者
///
/// offset 由 broker 管理，客户端按 `auto_commit_interval_ms` 周期自动提交
///
/// # 参数
/// * `config` - 实现了 `KafkaConsumerConfig` trait 的配置对象
pub fn build_kafka_consumer(
    config: &dyn KafkaConsumerConfig,
) -> Result<StreamConsumer, rdkafka::error::KafkaError> {
    let consumer: StreamConsumer = ClientConfig::new()
        .set("bootstrap.servers", config.kafka_bootstrap())
        .set("group.id", config.consumer_group())
        .set("enable.partition.eof", "false")
        .set("session.timeout.ms", config.session_timeout_ms().to_string())
        .set("enable.auto.commit", config.enable_auto_commit().to_string())
        .set("auto.commit.interval.ms", config.auto_commit_interval_ms().to_string())
        .set("auto.offset.reset", config.auto_offset_reset())
        .set("metadata.max.age.ms", config.metadata_max_age_ms().to_string())
        .set("security.protocol", "plaintext")
        .create()?;

    info!(
        bootstrap = %config.kafka_bootstrap(),
        group_id = %config.consumer_group(),
        auto_commit = config.enable_auto_commit(),
        auto_offset_reset = %config.auto_offset_reset(),
        "Kafka consumer created successfully"
    );

    Ok(consumer)
}
