//! 统一错误类型

use super::builder::ErrorBuilder;
use super::code::{ErrorCategory, ErrorCode};
use std::collections::HashMap;
use thiserror::Error;

/// 统一错误类型
#[derive(Error, Debug, Clone)]
pub enum RvgError {
    /// 带错误代码的业务错误
    #[error("错误 [{code}] {reason}", code = .code.as_str())]
    Localized {
        code: ErrorCode,
        reason: String,
        details: Option<String>,
        params: Option<HashMap<String, String>>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(String),
}

impl RvgError {
    /// 创建带错误代码的错误
    pub fn localized(code: ErrorCode, reason: impl Into<String>) -> Self {
        RvgError::Localized {
            code,
            reason: reason.into(),
            details: None,
            params: None,
            timestamp: chrono::Utc::now(),
        }
    }

    /// 创建错误构建器
    pub fn builder(code: ErrorCode, reason: impl Into<String>) -> ErrorBuilder {
        ErrorBuilder::new(code, reason)
    }

    /// 创建 IO 错误
    pub fn io(msg: impl Into<String>) -> Self {
        RvgError::Io(msg.into())
    }

    // ============================================================
    // 便捷方法
    // ============================================================

    pub fn connection_failed(reason: impl Into<String>) -> Self {
        Self::localized(ErrorCode::ConnectionFailed, reason)
    }

    pub fn topic_creation_failed(topic: impl Into<String>, reason: impl Into<String>) -> Self {
        ErrorBuilder::new(ErrorCode::TopicCreationFailed, reason)
            .param("topic", topic)
            .build_error()
    }

    pub fn topic_invalid(reason: impl Into<String>) -> Self {
        Self::localized(ErrorCode::TopicInvalid, reason)
    }

    pub fn configuration_error(reason: impl Into<String>) -> Self {
        Self::localized(ErrorCode::ConfigurationError, reason)
    }

    pub fn deserialization_error(reason: impl Into<String>) -> Self {
        Self::localized(ErrorCode::DeserializationError, reason)
    }

    pub fn timeout(reason: impl Into<String>) -> Self {
        Self::localized(ErrorCode::OperationTimeout, reason)
    }

    // ============================================================
    // 信息获取方法
    // ============================================================

    /// 获取错误代码
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            RvgError::Localized { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// 获取错误类别，IO 错误归为通用类别
    pub fn category(&self) -> ErrorCategory {
        self.code()
            .map(|code| code.category())
            .unwrap_or(ErrorCategory::General)
    }

    /// 获取错误原因
    pub fn reason(&self) -> &str {
        match self {
            RvgError::Localized { reason, .. } => reason,
            RvgError::Io(msg) => msg,
        }
    }

    /// 获取错误详情
    pub fn details(&self) -> Option<&str> {
        match self {
            RvgError::Localized { details, .. } => details.as_deref(),
            _ => None,
        }
    }

    /// 获取错误参数
    pub fn param(&self, key: &str) -> Option<&str> {
        match self {
            RvgError::Localized {
                params: Some(params),
                ..
            } => params.get(key).map(String::as_str),
            _ => None,
        }
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, RvgError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code_identifier() {
        let err = RvgError::connection_failed("broker unreachable");
        assert_eq!(err.to_string(), "错误 [CONNECTION_FAILED] broker unreachable");
        assert_eq!(err.category(), ErrorCategory::Connection);
    }

    #[test]
    fn topic_creation_failed_carries_topic_param() {
        let err = RvgError::topic_creation_failed("rvg-kafka-topic", "replication factor too large");
        assert_eq!(err.code(), Some(ErrorCode::TopicCreationFailed));
        assert_eq!(err.param("topic"), Some("rvg-kafka-topic"));
        assert_eq!(err.reason(), "replication factor too large");
    }

    #[test]
    fn io_errors_have_no_code() {
        let err = RvgError::io("disk gone");
        assert_eq!(err.reason(), "disk gone");
        assert_eq!(err.code(), None);
        assert_eq!(err.category(), ErrorCategory::General);
        assert_eq!(err.details(), None);
    }
}
