//! 消费端收到的消息

use crate::error::{ErrorCode, Result, RvgError};

/// 收到的一条消息
///
/// 约定只有 `payload`；topic、partition、offset 仅用于日志
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub payload: String,
}

impl InboundMessage {
    /// 按 UTF-8 解码消息体，空消息体（tombstone）与非法 UTF-8 均为错误
    pub fn decode_payload(payload: Option<&[u8]>) -> Result<String> {
        let bytes = payload
            .ok_or_else(|| RvgError::localized(ErrorCode::EmptyPayload, "message has no payload"))?;

        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| RvgError::deserialization_error(format!("payload is not valid UTF-8: {}", e)))
    }
}

#[cfg(feature = "kafka")]
impl<'a> TryFrom<&rdkafka::message::BorrowedMessage<'a>> for InboundMessage {
    type Error = RvgError;

    fn try_from(msg: &rdkafka::message::BorrowedMessage<'a>) -> Result<Self> {
        use rdkafka::message::Message;

        Ok(Self {
            topic: msg.topic().to_string(),
            partition: msg.partition(),
            offset: msg.offset(),
            payload: Self::decode_payload(msg.payload())?,
        })
    }
}
