//! 消息处理器
//!
//! 订阅者对每条投递到的消息调用一次处理器；处理器没有返回值，不会中断消费

use async_trait::async_trait;
use tracing::info;

use crate::kafka::message::InboundMessage;

/// 消息处理器 trait
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn on_message(&self, message: &InboundMessage);
}

/// 记录日志的处理器：`Message received, message: <payload>`
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHandler;

impl LoggingHandler {
    pub fn log_line(payload: &str) -> String {
        format!("Message received, message: {}", payload)
    }
}

#[async_trait]
impl MessageHandler for LoggingHandler {
    async fn on_message(&self, message: &InboundMessage) {
        info!(
            topic = %message.topic,
            partition = message.partition,
            offset = message.offset,
            "{}",
            Self::log_line(&message.payload)
        );
    }
}

/// 把同步闭包包装成处理器
pub struct FnHandler<F>(F);

#[async_trait]
impl<F> MessageHandler for FnHandler<F>
where
    F: Fn(&InboundMessage) + Send + Sync,
{
    async fn on_message(&self, message: &InboundMessage) {
        (self.0)(message)
    }
}

pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&InboundMessage) + Send + Sync,
{
    FnHandler(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    /// 把 fmt 层的输出收集到内存
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn message(payload: &str) -> InboundMessage {
        InboundMessage {
            topic: "rvg-kafka-topic".to_string(),
            partition: 0,
            offset: 7,
            payload: payload.to_string(),
        }
    }

    #[test]
    fn log_line_format() {
        assert_eq!(
            LoggingHandler::log_line("Hello World from Kafka with Spring Boot!!"),
            "Message received, message: Hello World from Kafka with Spring Boot!!"
        );
    }

    #[tokio::test]
    async fn closure_handler_sees_every_message() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handler = handler_fn(move |m: &InboundMessage| {
            sink.lock().unwrap().push(m.payload.clone());
        });

        handler.on_message(&message("a")).await;
        handler.on_message(&message("b")).await;

        assert_eq!(*seen.lock().unwrap(), vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn logging_handler_emits_received_line_at_info() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        LoggingHandler
            .on_message(&message("Hello World from Kafka with Spring Boot!!"))
            .await;

        let output = logs.contents();
        assert!(
            output.contains("Message received, message: Hello World from Kafka with Spring Boot!!"),
            "captured: {}",
            output
        );
        assert!(output.contains("INFO"));
        assert!(output.contains("topic=rvg-kafka-topic"));
    }
}
