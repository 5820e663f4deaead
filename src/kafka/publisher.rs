//! 消息发布器
//!
//! `publish` 只负责把消息放进客户端本地队列，不等待 broker 确认；
//! 投递由 librdkafka 的后台线程完成

use std::time::Duration;

use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use tracing::{debug, info, warn};

use crate::error::conversions::error_code_for;
use crate::error::{ErrorBuilder, ErrorCode, Result, RvgError};
use crate::kafka::producer_builder::build_kafka_producer;
use crate::kafka::producer_config::KafkaProducerConfig;

/// 字符串消息发布器，消息不带 key 和 header
pub struct KafkaPublisher {
    producer: FutureProducer,
}

impl KafkaPublisher {
    pub fn new(config: &dyn KafkaProducerConfig) -> Result<Self> {
        Ok(Self {
            producer: build_kafka_producer(config)?,
        })
    }

    fn record<'a>(topic: &'a str, payload: &'a str) -> FutureRecord<'a, (), str> {
        FutureRecord::to(topic).payload(payload)
    }

    /// 发送一条消息（fire-and-forget）
    ///
    /// 返回时消息仅被本地队列接受；只有入队失败（队列已满、消息过大等）才会返回错误
    pub fn publish(&self, topic: &str, payload: &str) -> Result<()> {
        match self.producer.send_result(Self::record(topic, payload)) {
            Ok(_delivery) => {
                debug!(
                    topic = %topic,
                    payload_len = payload.len(),
                    "Message enqueued for delivery"
                );
                Ok(())
            }
            Err((err, _)) => {
                warn!(topic = %topic, error = %err, "Failed to enqueue message");
                Err(ErrorBuilder::new(error_code_for(&err), "failed to enqueue message")
                    .param("topic", topic)
                    .details(err.to_string())
                    .build_error())
            }
        }
    }

    /// 发送一条消息并等待投递结果
    pub async fn publish_and_wait(&self, topic: &str, payload: &str, timeout: Duration) -> Result<()> {
        let delivery = self
            .producer
            .send_result(Self::record(topic, payload))
            .map_err(|(err, _)| RvgError::from(err))?;

        match tokio::time::timeout(timeout, delivery).await {
            Ok(Ok(Ok(_))) => {
                info!(topic = %topic, "Message delivered");
                Ok(())
            }
            Ok(Ok(Err((err, _)))) => Err(ErrorBuilder::new(
                ErrorCode::MessageDeliveryFailed,
                "broker rejected message",
            )
            .param("topic", topic)
            .details(err.to_string())
            .build_error()),
            Ok(Err(_canceled)) => Err(RvgError::localized(
                ErrorCode::MessageDeliveryFailed,
                "delivery report channel closed",
            )),
            Err(_) => Err(RvgError::timeout(format!(
                "no delivery report for topic {} within {:?}",
                topic, timeout
            ))),
        }
    }

    /// 等待所有在途消息投递完成
    pub fn flush(&self, timeout: Duration) -> Result<()> {
        let in_flight = self.producer.in_flight_count();
        self.producer.flush(timeout).map_err(|e| {
            ErrorBuilder::new(ErrorCode::OperationTimeout, "producer flush did not complete")
                .param("in_flight", in_flight.to_string())
                .details(e.to_string())
                .build_error()
        })?;
        info!(in_flight, "Kafka producer flushed");
        Ok(())
    }
}
