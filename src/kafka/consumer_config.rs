//! Kafka 消费者配置 Trait
//!
//! 定义通用的 Kafka 消费者配置接口，允许不同服务提供自己的配置实现

/// Kafka 消费者配置 Trait
///
/// 任何需要构建 Kafka 消费者的服务配置都应该实现此 trait
pub trait KafkaConsumerConfig: Send + Sync {
    /// Kafka Bootstrap Servers 地址
    fn kafka_bootstrap(&self) -> &str;

    /// Consumer Group ID
    fn consumer_group(&self) -> &str;

    /// 会话超时（毫秒），默认 45000
    fn session_timeout_ms(&self) -> u64 {
        45_000
    }

    /// 是否自动提交 offset，默认 true
    fn enable_auto_commit(&self) -> bool {
        true
    }

    /// 自动提交间隔（毫秒），默认 5000
    fn auto_commit_interval_ms(&self) -> u64 {
        5_000
    }

    /// Offset 重置策略，默认 "earliest"
    fn auto_offset_reset(&self) -> &str {
        "earliest"
    }

    /// 元数据最大年龄（毫秒），默认 5 分钟
    fn metadata_max_age_ms(&self) -> u64 {
        300_000
    }
}
