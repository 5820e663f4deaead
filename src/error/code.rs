//! 错误代码和错误类别定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 错误代码枚举
///
/// 错误代码按类别分组，每个类别占用1000个代码范围：
/// - 1000-1999: 连接相关错误
/// - 2000-2999: Topic 管理相关错误
/// - 3000-3999: 消息相关错误
/// - 4000-4999: 配置相关错误
/// - 5000-5999: 序列化相关错误
/// - 9000-9999: 通用错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u32)]
pub enum ErrorCode {
    // ============================================================
    // 连接相关错误 (1000-1999)
    // ============================================================
    ConnectionFailed = 1000,
    BrokerUnavailable = 1002,

    // ============================================================
    // Topic 管理相关错误 (2000-2999)
    // ============================================================
    TopicCreationFailed = 2000,
    TopicInvalid = 2001,
    InsufficientReplicas = 2002,
    PartitionUpdateFailed = 2003,
    MetadataFetchFailed = 2004,

    // ============================================================
    // 消息相关错误 (3000-3999)
    // ============================================================
    MessageSendFailed = 3000,
    MessageDeliveryFailed = 3001,
    MessageTooLarge = 3002,
    QueueFull = 3003,
    SubscribeFailed = 3004,
    ReceiveFailed = 3005,

    // ============================================================
    // 配置相关错误 (4000-4999)
    // ============================================================
    ConfigurationError = 4000,
    InvalidBootstrapServers = 4001,

    // ============================================================
    // 序列化相关错误 (5000-5999)
    // ============================================================
    DeserializationError = 5001,
    EmptyPayload = 5002,

    // ============================================================
    // 通用错误 (9000-9999)
    // ============================================================
    OperationTimeout = 9001,
    UnknownError = 9999,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ErrorCode {
    /// 获取错误代码的数字值
    #[inline]
    pub fn as_u32(&self) -> u32 {
        *self as u32
    }

    /// 获取错误代码的英文标识符
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConnectionFailed => "CONNECTION_FAILED",
            ErrorCode::BrokerUnavailable => "BROKER_UNAVAILABLE",
            ErrorCode::TopicCreationFailed => "TOPIC_CREATION_FAILED",
            ErrorCode::TopicInvalid => "TOPIC_INVALID",
            ErrorCode::InsufficientReplicas => "INSUFFICIENT_REPLICAS",
            ErrorCode::PartitionUpdateFailed => "PARTITION_UPDATE_FAILED",
            ErrorCode::MetadataFetchFailed => "METADATA_FETCH_FAILED",
            ErrorCode::MessageSendFailed => "MESSAGE_SEND_FAILED",
            ErrorCode::MessageDeliveryFailed => "MESSAGE_DELIVERY_FAILED",
            ErrorCode::MessageTooLarge => "MESSAGE_TOO_LARGE",
            ErrorCode::QueueFull => "QUEUE_FULL",
            ErrorCode::SubscribeFailed => "SUBSCRIBE_FAILED",
            ErrorCode::ReceiveFailed => "RECEIVE_FAILED",
            ErrorCode::ConfigurationError => "CONFIGURATION_ERROR",
            ErrorCode::InvalidBootstrapServers => "INVALID_BOOTSTRAP_SERVERS",
            ErrorCode::DeserializationError => "DESERIALIZATION_ERROR",
            ErrorCode::EmptyPayload => "EMPTY_PAYLOAD",
            ErrorCode::OperationTimeout => "OPERATION_TIMEOUT",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// 获取错误代码的类别
    pub fn category(&self) -> ErrorCategory {
        match self.as_u32() {
            1000..=1999 => ErrorCategory::Connection,
            2000..=2999 => ErrorCategory::Topic,
            3000..=3999 => ErrorCategory::Message,
            4000..=4999 => ErrorCategory::Configuration,
            5000..=5999 => ErrorCategory::Serialization,
            _ => ErrorCategory::General,
        }
    }
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    Connection,
    Topic,
    Message,
    Configuration,
    Serialization,
    General,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Connection => write!(f, "CONNECTION"),
            ErrorCategory::Topic => write!(f, "TOPIC"),
            ErrorCategory::Message => write!(f, "MESSAGE"),
            ErrorCategory::Configuration => write!(f, "CONFIGURATION"),
            ErrorCategory::Serialization => write!(f, "SERIALIZATION"),
            ErrorCategory::General => write!(f, "GENERAL"),
        }
    }
}
