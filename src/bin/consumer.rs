//! Consumer 进程
//!
//! 以固定 group 订阅 topic，逐条记录收到的消息

use std::sync::Arc;

use rvg_kafka::kafka::{LoggingHandler, MessageHandler, subscribe};
use rvg_kafka::{AppConfig, ServiceRuntime, telemetry};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (config, origin) = AppConfig::load()?;
    telemetry::init_tracing(&config.logging)?;
    info!(source = %origin, "Configuration loaded");

    info!(
        bootstrap = %config.kafka.bootstrap_servers,
        group_id = %config.consumer.group_id,
        topics = ?config.consumer.topics,
        concurrency = config.consumer.concurrency,
        "Starting rvg-kafka consumer"
    );

    let handler: Arc<dyn MessageHandler> = Arc::new(LoggingHandler);
    let topics: Vec<&str> = config.consumer.topics.iter().map(String::as_str).collect();

    let mut runtime = ServiceRuntime::new("rvg-consumer").with_config(config.runtime_config());
    for index in 0..config.consumer.concurrency {
        let name = format!("kafka-listener-{}", index);
        let subscriber = subscribe(&config, &topics, handler.clone())?;
        info!(
            listener = %name,
            group_id = %subscriber.group_id(),
            topics = ?subscriber.topics(),
            "Kafka listener registered"
        );
        runtime = runtime.add_message_consumer(name, Box::new(subscriber));
    }

    runtime.run().await
}
