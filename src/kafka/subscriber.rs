//! 消息订阅者
//!
//! 显式订阅 topic，对每条投递到的消息调用一次处理器，直到收到关闭信号

use std::sync::Arc;

use futures::StreamExt;
use futures::future::BoxFuture;
use rdkafka::consumer::{Consumer, StreamConsumer};
use tracing::{debug, info, warn};

use crate::error::{ErrorBuilder, ErrorCode, Result, RvgError};
use crate::kafka::consumer_builder::build_kafka_consumer;
use crate::kafka::consumer_config::KafkaConsumerConfig;
use crate::kafka::handler::MessageHandler;
use crate::kafka::message::InboundMessage;
use crate::runtime::task::{MessageConsumer, ShutdownReceiver, TaskResult};

/// 订阅 topic
///
/// # 参数
/// * `config` - 提供 broker 地址与 group id
/// * `topics` - 订阅的 topic 集合
/// * `handler` - 每条消息调用一次
pub fn subscribe(
    config: &dyn KafkaConsumerConfig,
    topics: &[&str],
    handler: Arc<dyn MessageHandler>,
) -> Result<KafkaSubscriber> {
    if topics.is_empty() {
        return Err(RvgError::configuration_error("at least one topic is required to subscribe"));
    }

    let consumer = build_kafka_consumer(config)?;
    consumer.subscribe(topics).map_err(|e| {
        ErrorBuilder::new(ErrorCode::SubscribeFailed, "failed to subscribe to Kafka topics")
            .param("topics", topics.join(","))
            .details(e.to_string())
            .build_error()
    })?;

    info!(
        topics = ?topics,
        group_id = %config.consumer_group(),
        "Successfully subscribed to Kafka topics"
    );

    Ok(KafkaSubscriber {
        consumer,
        topics: topics.iter().map(|t| t.to_string()).collect(),
        group_id: config.consumer_group().to_string(),
        handler,
    })
}

/// 订阅者
pub struct KafkaSubscriber {
    consumer: StreamConsumer,
    topics: Vec<String>,
    group_id: String,
    handler: Arc<dyn MessageHandler>,
}

impl KafkaSubscriber {
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// 持续消费直到收到关闭信号
    ///
    /// 接收错误和无法解码的消息记录日志后跳过
    pub async fn consume_messages(&self, mut shutdown_rx: ShutdownReceiver) -> TaskResult {
        let mut stream = self.consumer.stream();
        let mut received: u64 = 0;

        info!(
            topics = ?self.topics,
            group_id = %self.group_id,
            "Kafka listener started"
        );

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    info!(group_id = %self.group_id, received, "Shutdown signal received, stopping Kafka listener");
                    break;
                }
                next = stream.next() => match next {
                    Some(Ok(msg)) => {
                        let decoded = InboundMessage::try_from(&msg);
                        drop(msg);
                        match decoded {
                            Ok(message) => {
                                received += 1;
                                debug!(
                                    topic = %message.topic,
                                    partition = message.partition,
                                    offset = message.offset,
                                    "Dispatching message to handler"
                                );
                                self.handler.on_message(&message).await;
                            }
                            Err(e) => {
                                warn!(error = %e, "Skipping undecodable Kafka message");
                            }
                        }
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, group_id = %self.group_id, "Kafka receive error");
                    }
                    None => {
                        warn!(group_id = %self.group_id, "Kafka message stream ended");
                        break;
                    }
                }
            }
        }

        drop(stream);
        self.consumer.unsubscribe();
        info!(group_id = %self.group_id, "Kafka listener stopped");
        Ok(())
    }
}

impl MessageConsumer for KafkaSubscriber {
    fn consume(&self, shutdown: ShutdownReceiver) -> BoxFuture<'_, TaskResult> {
        Box::pin(self.consume_messages(shutdown))
    }
}
