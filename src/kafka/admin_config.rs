//! Kafka Admin 配置 Trait

/// Kafka Admin 配置 Trait
///
/// 需要声明 topic 的服务配置实现此 trait
pub trait KafkaAdminConfig: Send + Sync {
    /// Kafka Bootstrap Servers 地址
    fn kafka_bootstrap(&self) -> &str;

    /// Admin 操作超时（毫秒），默认 30 秒
    fn operation_timeout_ms(&self) -> u64 {
        30_000
    }

    /// 元数据请求超时（毫秒），默认 10 秒
    fn metadata_timeout_ms(&self) -> u64 {
        10_000
    }
}
