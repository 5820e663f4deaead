//! 运行时任务
//!
//! provider 的刷新任务和 consumer 的监听任务都以 `Task` 的形式交给 `ServiceRuntime`

use std::future::Future;

use futures::future::BoxFuture;
use tokio::sync::oneshot;

/// 任务结束时的结果，错误只用于记录日志
pub type TaskResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// 关闭信号，发送端由运行时持有
pub type ShutdownReceiver = oneshot::Receiver<()>;

/// 由 `ServiceRuntime` 启动和关闭的任务
pub trait Task: Send {
    fn name(&self) -> &str;

    /// 必须先于本任务启动的任务名称
    fn dependencies(&self) -> &[String] {
        &[]
    }

    /// 收到 `shutdown` 后应尽快返回
    fn run(self: Box<Self>, shutdown: ShutdownReceiver) -> BoxFuture<'static, TaskResult>;
}

/// 长期运行的消息消费者，例如 `KafkaSubscriber`
pub trait MessageConsumer: Send + Sync {
    fn consume(&self, shutdown: ShutdownReceiver) -> BoxFuture<'_, TaskResult>;
}

/// 把 `MessageConsumer` 挂到运行时上
pub struct ConsumerTask {
    name: String,
    consumer: Box<dyn MessageConsumer>,
}

impl ConsumerTask {
    pub fn new(name: impl Into<String>, consumer: Box<dyn MessageConsumer>) -> Self {
        Self {
            name: name.into(),
            consumer,
        }
    }
}

impl Task for ConsumerTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(self: Box<Self>, shutdown: ShutdownReceiver) -> BoxFuture<'static, TaskResult> {
        Box::pin(async move { self.consumer.consume(shutdown).await })
    }
}

type Launcher = Box<dyn FnOnce(ShutdownReceiver) -> BoxFuture<'static, TaskResult> + Send>;

/// 由闭包构造的任务
///
/// 闭包在启动时才被调用，拿到关闭信号后返回任务主体
///
/// ```rust
/// use rvg_kafka::runtime::task::FnTask;
///
/// let task = FnTask::new("flush-on-exit", |shutdown| async move {
///     let _ = shutdown.await;
///     Ok(())
/// });
/// ```
pub struct FnTask {
    name: String,
    after: Vec<String>,
    launch: Launcher,
}

impl FnTask {
    pub fn new<F, Fut>(name: impl Into<String>, launch: F) -> Self
    where
        F: FnOnce(ShutdownReceiver) -> Fut + Send + 'static,
        Fut: Future<Output = TaskResult> + Send + 'static,
    {
        Self {
            name: name.into(),
            after: Vec::new(),
            launch: Box::new(move |shutdown| Box::pin(launch(shutdown))),
        }
    }

    /// 不监听关闭信号的任务，停机超时后会被中止
    pub fn from_future<Fut>(name: impl Into<String>, future: Fut) -> Self
    where
        Fut: Future<Output = TaskResult> + Send + 'static,
    {
        Self::new(name, move |_shutdown| future)
    }

    #[must_use]
    pub fn after(mut self, dependencies: Vec<String>) -> Self {
        self.after = dependencies;
        self
    }
}

impl Task for FnTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> &[String] {
        &self.after
    }

    fn run(self: Box<Self>, shutdown: ShutdownReceiver) -> BoxFuture<'static, TaskResult> {
        (self.launch)(shutdown)
    }
}
