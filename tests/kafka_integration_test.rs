//! Kafka 集成测试
//!
//! 需要可访问的 Kafka broker，默认被忽略：
//! ```bash
//! docker run -d --name kafka -p 9092:9092 apache/kafka:3.8.0
//! KAFKA_BOOTSTRAP_SERVERS=localhost:9092 cargo test --test kafka_integration_test -- --ignored
//! ```
//!
//! 单 broker 环境无法满足 2 副本，测试默认使用 1 副本；
//! 集群环境可设置 `KAFKA_TEST_REPLICATION_FACTOR=2`

#![cfg(feature = "kafka")]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rvg_kafka::AppConfig;
use rvg_kafka::kafka::{TopicDescription, TopicOutcome, handler_fn};
use rvg_kafka::runtime::task::TaskResult;
use rvg_kafka::{
    HELLO_MESSAGE, InboundMessage, KafkaPublisher, KafkaSubscriber, LoggingHandler,
    MessageHandler, TOPIC_NAME, TopicBootstrapper, TopicSpec, subscribe,
};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_test::assert_ok;

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);
const RECEIVE_TIMEOUT: Duration = Duration::from_secs(30);

/// 默认连接 localhost:9092，可通过 `KAFKA_BOOTSTRAP_SERVERS` 覆盖
fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.apply_env_with(|key| std::env::var(key).ok());
    config
}

fn test_config_with_group(group_id: &str) -> AppConfig {
    let mut config = test_config();
    config.consumer.group_id = group_id.to_string();
    config
}

fn replication_factor() -> i32 {
    std::env::var("KAFKA_TEST_REPLICATION_FACTOR")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(1)
}

fn unique_name(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4())
}

fn test_topic_spec(name: &str) -> TopicSpec {
    TopicSpec::rvg_default()
        .with_name(name)
        .with_replication_factor(replication_factor())
}

/// 新建 topic 的元数据可能稍晚可见，轮询直到出现
async fn describe_eventually(admin: &TopicBootstrapper, name: &str) -> TopicDescription {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        if let Some(description) = admin.describe_topic(name).unwrap() {
            return description;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "topic {} never appeared in metadata",
            name
        );
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
}

async fn create_topic(name: &str) -> TopicSpec {
    let admin = TopicBootstrapper::new(&test_config()).unwrap();
    let spec = test_topic_spec(name);
    assert_ok!(admin.ensure_topic(&spec).await);
    describe_eventually(&admin, name).await;
    spec
}

/// 收集处理器收到的 payload
fn collecting_handler() -> (Arc<dyn MessageHandler>, Arc<Mutex<Vec<String>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    let handler = handler_fn(move |message: &InboundMessage| {
        sink.lock().unwrap().push(message.payload.clone());
    });
    (Arc::new(handler), received)
}

fn start_listener(subscriber: KafkaSubscriber) -> (oneshot::Sender<()>, JoinHandle<TaskResult>) {
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle = tokio::spawn(async move { subscriber.consume_messages(shutdown_rx).await });
    (shutdown_tx, handle)
}

async fn stop_listener(shutdown_tx: oneshot::Sender<()>, handle: JoinHandle<TaskResult>) {
    let _ = shutdown_tx.send(());
    let result = tokio::time::timeout(Duration::from_secs(10), handle)
        .await
        .expect("listener did not stop")
        .expect("listener panicked");
    assert!(result.is_ok());
}

async fn wait_for_count(received: &[&Arc<Mutex<Vec<String>>>], expected: usize) {
    let deadline = tokio::time::Instant::now() + RECEIVE_TIMEOUT;
    loop {
        let total: usize = received.iter().map(|r| r.lock().unwrap().len()).sum();
        if total >= expected {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "received {} of {} messages before timeout",
            total,
            expected
        );
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

#[tokio::test]
#[ignore]
async fn ensure_topic_is_idempotent() {
    let admin = TopicBootstrapper::new(&test_config()).unwrap();
    let name = unique_name("rvg-it-topic");
    let spec = test_topic_spec(&name);

    assert_eq!(admin.ensure_topic(&spec).await.unwrap(), TopicOutcome::Created);
    assert_eq!(admin.ensure_topic(&spec).await.unwrap(), TopicOutcome::AlreadyExists);

    let description = describe_eventually(&admin, &name).await;
    assert_eq!(description.partitions, 2);
    assert_eq!(description.replication_factor, replication_factor());
}

#[tokio::test]
#[ignore]
async fn ensure_topic_increases_missing_partitions() {
    let admin = TopicBootstrapper::new(&test_config()).unwrap();
    let name = unique_name("rvg-it-grow");

    let narrow = TopicSpec::new(&name, 1, replication_factor());
    assert_eq!(admin.ensure_topic(&narrow).await.unwrap(), TopicOutcome::Created);
    describe_eventually(&admin, &name).await;

    let outcome = admin.ensure_topic(&test_topic_spec(&name)).await.unwrap();
    assert_eq!(outcome, TopicOutcome::PartitionsIncreased { from: 1, to: 2 });
}

#[tokio::test]
#[ignore]
async fn fresh_group_sees_message_published_before_it_started() {
    let topic = unique_name("rvg-it-hello");
    create_topic(&topic).await;

    let publisher = KafkaPublisher::new(&test_config()).unwrap();
    assert_ok!(publisher.publish_and_wait(&topic, HELLO_MESSAGE, DELIVERY_TIMEOUT).await);

    let (handler, received) = collecting_handler();
    let config = test_config_with_group(&unique_name("rvg-it-group"));
    let subscriber = subscribe(&config, &[topic.as_str()], handler).unwrap();
    assert_eq!(subscriber.topics(), [topic.clone()]);
    assert_eq!(subscriber.group_id(), config.consumer.group_id);
    let (shutdown_tx, handle) = start_listener(subscriber);

    wait_for_count(&[&received], 1).await;
    stop_listener(shutdown_tx, handle).await;

    assert_eq!(*received.lock().unwrap(), vec![HELLO_MESSAGE.to_string()]);
}

#[tokio::test]
#[ignore]
async fn every_message_is_handled_once_with_identical_payload() {
    let topic = unique_name("rvg-it-count");
    create_topic(&topic).await;

    let expected: Vec<String> = (0..25)
        .map(|i| format!("payload #{} ünïcødé", i))
        .collect();

    let publisher = KafkaPublisher::new(&test_config()).unwrap();
    for payload in &expected {
        assert_ok!(publisher.publish_and_wait(&topic, payload, DELIVERY_TIMEOUT).await);
    }

    let (handler, received) = collecting_handler();
    let config = test_config_with_group(&unique_name("rvg-it-group"));
    let subscriber = subscribe(&config, &[topic.as_str()], handler).unwrap();
    let (shutdown_tx, handle) = start_listener(subscriber);

    wait_for_count(&[&received], expected.len()).await;
    // 多等一会儿，确认没有重复投递
    tokio::time::sleep(Duration::from_secs(2)).await;
    stop_listener(shutdown_tx, handle).await;

    let mut got = received.lock().unwrap().clone();
    got.sort();
    let mut want = expected.clone();
    want.sort();
    assert_eq!(got, want);
}

#[tokio::test]
#[ignore]
async fn listeners_in_one_group_share_messages_without_duplicates() {
    let topic = unique_name("rvg-it-share");
    create_topic(&topic).await;

    let config = test_config_with_group(&unique_name("rvg-it-group"));
    let (handler_a, received_a) = collecting_handler();
    let (handler_b, received_b) = collecting_handler();
    let (tx_a, handle_a) = start_listener(subscribe(&config, &[topic.as_str()], handler_a).unwrap());
    let (tx_b, handle_b) = start_listener(subscribe(&config, &[topic.as_str()], handler_b).unwrap());

    // 等待两个成员完成分区分配
    tokio::time::sleep(Duration::from_secs(10)).await;

    let publisher = KafkaPublisher::new(&test_config()).unwrap();
    let expected: Vec<String> = (0..40).map(|i| format!("shared-{}", i)).collect();
    for payload in &expected {
        assert_ok!(publisher.publish_and_wait(&topic, payload, DELIVERY_TIMEOUT).await);
    }

    wait_for_count(&[&received_a, &received_b], expected.len()).await;
    tokio::time::sleep(Duration::from_secs(2)).await;
    stop_listener(tx_a, handle_a).await;
    stop_listener(tx_b, handle_b).await;

    let a = received_a.lock().unwrap().clone();
    let b = received_b.lock().unwrap().clone();
    assert_eq!(a.len() + b.len(), expected.len());

    let union: HashSet<String> = a.into_iter().chain(b).collect();
    assert_eq!(union, expected.into_iter().collect::<HashSet<_>>());
}

#[tokio::test]
#[ignore]
async fn provider_and_consumer_end_to_end() {
    let config = test_config();
    let spec = config
        .topic_spec()
        .with_replication_factor(replication_factor());
    assert_eq!(spec.name(), TOPIC_NAME);

    let admin = TopicBootstrapper::new(&config).unwrap();
    assert_ok!(admin.ensure_topic(&spec).await);
    assert_ok!(admin.ensure_topic(&spec).await);
    describe_eventually(&admin, TOPIC_NAME).await;

    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = lines.clone();
    let handler: Arc<dyn MessageHandler> = Arc::new(handler_fn(move |message: &InboundMessage| {
        sink.lock().unwrap().push(LoggingHandler::log_line(&message.payload));
    }));
    let subscriber = subscribe(&config, &[TOPIC_NAME], handler).unwrap();
    let (shutdown_tx, handle) = start_listener(subscriber);

    let publisher = KafkaPublisher::new(&config).unwrap();
    assert_ok!(publisher.publish(TOPIC_NAME, HELLO_MESSAGE));
    assert_ok!(publisher.flush(DELIVERY_TIMEOUT));

    let expected_line = "Message received, message: Hello World from Kafka with Spring Boot!!";
    let deadline = tokio::time::Instant::now() + RECEIVE_TIMEOUT;
    while !lines.lock().unwrap().iter().any(|l| l == expected_line) {
        assert!(tokio::time::Instant::now() < deadline, "hello message never arrived");
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    stop_listener(shutdown_tx, handle).await;
}
