//! Provider 进程
//!
//! 启动时声明 topic 并发送一条固定消息，之后保持运行直到收到关闭信号

use std::time::Duration;

use rvg_kafka::kafka::{KafkaPublisher, TopicBootstrapper};
use rvg_kafka::runtime::{ShutdownReceiver, TaskResult};
use rvg_kafka::{AppConfig, HELLO_MESSAGE, ServiceRuntime, telemetry};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (config, origin) = AppConfig::load()?;
    telemetry::init_tracing(&config.logging)?;
    info!(source = %origin, "Configuration loaded");

    info!(
        bootstrap = %config.kafka.bootstrap_servers,
        topic = %config.topic.name,
        "Starting rvg-kafka provider"
    );

    // topic 声明失败时进程直接退出
    let spec = config.topic_spec();
    let bootstrapper = TopicBootstrapper::new(&config)?;
    if let Err(e) = bootstrapper.ensure_topic(&spec).await {
        error!(error = %e, topic = %spec.name(), "❌ Topic bootstrap failed");
        return Err(e.into());
    }
    drop(bootstrapper);

    let publisher = KafkaPublisher::new(&config)?;
    publisher.publish(spec.name(), HELLO_MESSAGE)?;
    info!(topic = %spec.name(), message = %HELLO_MESSAGE, "Startup message published");

    let flush_timeout = Duration::from_millis(config.producer.flush_timeout_ms);
    ServiceRuntime::new("rvg-provider")
        .with_config(config.runtime_config())
        .add_worker("kafka-producer", move |shutdown| {
            flush_on_shutdown(publisher, flush_timeout, shutdown)
        })
        .run()
        .await
}

/// 保持生产者存活，关闭时把本地队列里的消息刷到 broker
async fn flush_on_shutdown(
    publisher: KafkaPublisher,
    timeout: Duration,
    shutdown: ShutdownReceiver,
) -> TaskResult {
    let _ = shutdown.await;
    tokio::task::spawn_blocking(move || publisher.flush(timeout)).await??;
    Ok(())
}
