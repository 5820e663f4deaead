//! Kafka 生产者构建器

use rdkafka::config::ClientConfig;
use rdkafka::producer::FutureProducer;
use tracing::info;

use crate::kafka::producer_config::KafkaProducerConfig;

/// 构建 Kafka 生产者
///
/// 消息体按 UTF-8 字节发送，不带 key，不做额外序列化
///
/// # 参数
/// * `config` - 实现了 `KafkaProducerConfig` trait 的配置对象
pub fn build_kafka_producer(
    config: &dyn KafkaProducerConfig,
) -> Result<FutureProducer, rdkafka::error::KafkaError> {
    let mut client_config = ClientConfig::new();
    client_config
        .set("bootstrap.servers", config.kafka_bootstrap())
        .set("message.timeout.ms", config.message_timeout_ms().to_string())
        .set("enable.idempotence", config.enable_idempotence().to_string())
        .set("compression.type", config.compression_type())
        .set("linger.ms", config.linger_ms().to_string())
        .set("metadata.max.age.ms", config.metadata_max_age_ms().to_string())
        .set("security.protocol", "plaintext");

    // 幂等生产者要求 acks=all
    if config.enable_idempotence() {
        client_config.set("acks", "all");
    }

    let producer: FutureProducer = client_config.create()?;

    info!(
        bootstrap = %config.kafka_bootstrap(),
        timeout_ms = config.message_timeout_ms(),
        idempotence = config.enable_idempotence(),
        compression = %config.compression_type(),
        "Kafka producer created successfully"
    );

    Ok(producer)
}
