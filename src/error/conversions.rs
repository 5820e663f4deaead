//! 错误类型转换实现
//!
//! 提供标准库、配置解析与 Kafka 客户端错误到 `RvgError` 的转换

use super::{ErrorBuilder, ErrorCode, RvgError};
use std::io;

impl From<io::Error> for RvgError {
    fn from(err: io::Error) -> Self {
        RvgError::io(err.to_string())
    }
}

impl From<toml::de::Error> for RvgError {
    fn from(err: toml::de::Error) -> Self {
        ErrorBuilder::new(ErrorCode::ConfigurationError, "TOML 配置解析错误")
            .details(err.to_string())
            .build_error()
    }
}

#[cfg(feature = "kafka")]
mod kafka {
    use super::*;
    use rdkafka::error::{KafkaError, RDKafkaErrorCode};

    /// 根据 Kafka 客户端错误选择错误代码
    ///
    /// `rdkafka_error_code()` 不覆盖 `AdminOp`，这里单独取出其中的错误码
    pub fn error_code_for(err: &KafkaError) -> ErrorCode {
        let code = match err {
            KafkaError::AdminOp(code) => Some(*code),
            _ => err.rdkafka_error_code(),
        };

        match code {
            Some(RDKafkaErrorCode::QueueFull) => return ErrorCode::QueueFull,
            Some(RDKafkaErrorCode::MessageSizeTooLarge) => return ErrorCode::MessageTooLarge,
            Some(RDKafkaErrorCode::InvalidReplicationFactor) => {
                return ErrorCode::InsufficientReplicas;
            }
            Some(RDKafkaErrorCode::AllBrokersDown | RDKafkaErrorCode::BrokerTransportFailure) => {
                return ErrorCode::BrokerUnavailable;
            }
            Some(RDKafkaErrorCode::OperationTimedOut | RDKafkaErrorCode::RequestTimedOut) => {
                return ErrorCode::OperationTimeout;
            }
            _ => {}
        }

        match err {
            KafkaError::ClientCreation(_) | KafkaError::ClientConfig(..) => {
                ErrorCode::ConnectionFailed
            }
            KafkaError::AdminOp(_) | KafkaError::AdminOpCreation(_) => {
                ErrorCode::TopicCreationFailed
            }
            KafkaError::MetadataFetch(_) => ErrorCode::MetadataFetchFailed,
            KafkaError::MessageProduction(_) => ErrorCode::MessageSendFailed,
            KafkaError::Subscription(_) => ErrorCode::SubscribeFailed,
            KafkaError::MessageConsumption(_) => ErrorCode::ReceiveFailed,
            KafkaError::Canceled => ErrorCode::MessageDeliveryFailed,
            _ => ErrorCode::UnknownError,
        }
    }

    impl From<KafkaError> for RvgError {
        fn from(err: KafkaError) -> Self {
            ErrorBuilder::new(error_code_for(&err), "Kafka 客户端错误")
                .details(err.to_string())
                .build_error()
        }
    }

}

#[cfg(feature = "kafka")]
pub use kafka::error_code_for;
