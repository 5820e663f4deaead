//! 共享常量与基础类型
//!
//! Provider 与 Consumer 两个进程之间唯一的约定就是这里的 topic、group 和消息内容

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, Result, RvgError};

/// Topic 名称
pub const TOPIC_NAME: &str = "rvg-kafka-topic";

/// Consumer Group ID
pub const CONSUMER_GROUP_ID: &str = "rvg-kafka-id";

/// Provider 启动时发送的消息
pub const HELLO_MESSAGE: &str = "Hello World from Kafka with Spring Boot!!";

/// 默认 broker 地址
pub const DEFAULT_BOOTSTRAP_SERVERS: &str = "localhost:9092";

/// Topic 分区数
pub const TOPIC_PARTITIONS: i32 = 2;

/// Topic 副本数
pub const TOPIC_REPLICATION_FACTOR: i32 = 2;

/// 消息保留时间（毫秒），1 天
pub const TOPIC_RETENTION_MS: u64 = 86_400_000;

/// 段文件大小（字节），1 GiB
pub const TOPIC_SEGMENT_BYTES: u64 = 1_073_741_824;

/// 单条消息最大大小（字节），约 1 MB
pub const TOPIC_MAX_MESSAGE_BYTES: u64 = 1_000_012;

/// 单个 broker 地址（host:port）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BrokerAddress {
    pub host: String,
    pub port: u16,
}

impl fmt::Display for BrokerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for BrokerAddress {
    type Err = RvgError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (host, port) = s.rsplit_once(':').ok_or_else(|| {
            RvgError::builder(ErrorCode::InvalidBootstrapServers, "broker address must be host:port")
                .param("address", s)
                .build_error()
        })?;

        if host.is_empty() {
            return Err(RvgError::builder(ErrorCode::InvalidBootstrapServers, "broker host is empty")
                .param("address", s)
                .build_error());
        }

        let port = port.parse::<u16>().map_err(|e| {
            RvgError::builder(ErrorCode::InvalidBootstrapServers, "broker port is not a valid u16")
                .param("address", s)
                .details(e.to_string())
                .build_error()
        })?;

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

/// 解析 `host:port[,host:port...]` 形式的 bootstrap servers
pub fn parse_bootstrap_servers(servers: &str) -> Result<Vec<BrokerAddress>> {
    let brokers = servers
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(str::parse)
        .collect::<Result<Vec<BrokerAddress>>>()?;

    if brokers.is_empty() {
        return Err(RvgError::localized(
            ErrorCode::InvalidBootstrapServers,
            "bootstrap servers list is empty",
        ));
    }

    Ok(brokers)
}
