//! 运行时实现
//!
//! 任务按依赖顺序启动，收到关闭信号后逐个通知，超时未结束的任务被中止

use std::collections::{HashMap, HashSet, VecDeque};
use std::future::Future;

use anyhow::Result;
use tokio::sync::oneshot;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::runtime::config::RuntimeConfig;
use crate::runtime::task::{
    ConsumerTask, FnTask, MessageConsumer, ShutdownReceiver, Task, TaskResult,
};

/// 进程运行时
///
/// # 使用示例
/// ```rust,no_run
/// use rvg_kafka::runtime::ServiceRuntime;
///
/// # async fn example() -> anyhow::Result<()> {
/// ServiceRuntime::new("rvg-provider")
///     .add_future("warmup", async { Ok(()) })
///     .add_worker_after(
///         "kafka-producer",
///         |shutdown| async move {
///             let _ = shutdown.await;
///             Ok(())
///         },
///         vec!["warmup".to_string()],
///     )
///     .run()
///     .await
/// # }
/// ```
pub struct ServiceRuntime {
    service_name: String,
    tasks: Vec<Box<dyn Task>>,
    config: RuntimeConfig,
}

impl ServiceRuntime {
    /// `service_name` 只用于日志
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            tasks: Vec::new(),
            config: RuntimeConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn add_task(mut self, task: Box<dyn Task>) -> Self {
        info!(task_name = %task.name(), deps = ?task.dependencies(), "Adding task to runtime");
        self.tasks.push(task);
        self
    }

    /// 添加不监听关闭信号的任务
    pub fn add_future<Fut>(self, name: impl Into<String>, future: Fut) -> Self
    where
        Fut: Future<Output = TaskResult> + Send + 'static,
    {
        self.add_task(Box::new(FnTask::from_future(name, future)))
    }

    /// 添加监听关闭信号的任务，`launch` 在启动时调用
    pub fn add_worker<F, Fut>(self, name: impl Into<String>, launch: F) -> Self
    where
        F: FnOnce(ShutdownReceiver) -> Fut + Send + 'static,
        Fut: Future<Output = TaskResult> + Send + 'static,
    {
        self.add_task(Box::new(FnTask::new(name, launch)))
    }

    /// 同 `add_worker`，但在 `dependencies` 全部启动之后才启动
    pub fn add_worker_after<F, Fut>(
        self,
        name: impl Into<String>,
        launch: F,
        dependencies: Vec<String>,
    ) -> Self
    where
        F: FnOnce(ShutdownReceiver) -> Fut + Send + 'static,
        Fut: Future<Output = TaskResult> + Send + 'static,
    {
        self.add_task(Box::new(FnTask::new(name, launch).after(dependencies)))
    }

    pub fn add_message_consumer(
        self,
        name: impl Into<String>,
        consumer: Box<dyn MessageConsumer>,
    ) -> Self {
        self.add_task(Box::new(ConsumerTask::new(name, consumer)))
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// 运行直到收到 Ctrl+C 或 SIGTERM
    pub async fn run(self) -> Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// 运行直到 `signal` 完成
    ///
    /// 执行以下步骤：
    /// 1. 按依赖顺序启动所有任务
    /// 2. 等待关闭信号
    /// 3. 通知所有任务关闭
    /// 4. 在 `shutdown_timeout` 内等待任务结束，超时则中止
    pub async fn run_until<S>(mut self, signal: S) -> Result<()>
    where
        S: Future<Output = ()>,
    {
        info!(
            service_name = %self.service_name,
            task_count = self.tasks.len(),
            "🚀 Starting service runtime"
        );

        let tasks = std::mem::take(&mut self.tasks);
        let (mut join_set, task_shutdowns) =
            Self::start_tasks(tasks).map_err(|e| anyhow::anyhow!("Failed to start tasks: {}", e))?;

        signal.await;
        info!(service_name = %self.service_name, "Shutdown requested, stopping tasks");

        for tx in task_shutdowns {
            let _ = tx.send(());
        }

        Self::wait_for_tasks_shutdown(&self.config, &mut join_set).await;

        info!(service_name = %self.service_name, "Service runtime stopped");
        Ok(())
    }

    /// 启动所有任务（按依赖顺序）
    fn start_tasks(
        tasks: Vec<Box<dyn Task>>,
    ) -> Result<(JoinSet<TaskResult>, Vec<oneshot::Sender<()>>)> {
        let sorted_tasks = Self::topological_sort(tasks)?;

        let mut join_set = JoinSet::new();
        let mut task_shutdowns = Vec::new();

        for task in sorted_tasks {
            let task_name = task.name().to_string();
            let (task_shutdown_tx, task_shutdown_rx) = oneshot::channel();
            task_shutdowns.push(task_shutdown_tx);

            let task_future = task.run(task_shutdown_rx);

            join_set.spawn(async move {
                let result = task_future.await;
                match &result {
                    Ok(_) => {
                        info!(task_name = %task_name, "✅ Task completed");
                    }
                    Err(e) => {
                        error!(task_name = %task_name, error = %e, "❌ Task failed");
                    }
                }
                result
            });
        }

        Ok((join_set, task_shutdowns))
    }

    /// 拓扑排序任务，确定启动顺序
    ///
    /// Kahn 算法；无依赖关系的任务保持注册顺序，同时检测缺失依赖和循环依赖
    pub(crate) fn topological_sort(tasks: Vec<Box<dyn Task>>) -> Result<Vec<Box<dyn Task>>> {
        let mut task_map: HashMap<String, Box<dyn Task>> = HashMap::new();
        let mut task_names = Vec::new();

        for task in tasks {
            let name = task.name().to_string();
            if task_map.contains_key(&name) {
                return Err(anyhow::anyhow!("Task '{}' is registered more than once", name));
            }
            task_names.push(name.clone());
            task_map.insert(name, task);
        }

        // task -> 依赖它的任务列表
        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut in_degree: HashMap<&str, usize> = HashMap::new();

        for name in &task_names {
            let deps = task_map.get(name).map(|t| t.dependencies()).unwrap_or_default();
            in_degree.insert(name.as_str(), deps.len());

            for dep in deps {
                let Some(dep_name) = task_names.iter().find(|n| *n == dep) else {
                    return Err(anyhow::anyhow!(
                        "Task '{}' depends on '{}', but '{}' is not registered",
                        name,
                        dep,
                        dep
                    ));
                };
                dependents.entry(dep_name.as_str()).or_default().push(name.as_str());
            }
        }

        let mut queue: VecDeque<&str> = task_names
            .iter()
            .map(String::as_str)
            .filter(|name| in_degree.get(name).copied() == Some(0))
            .collect();

        let mut order: Vec<&str> = Vec::new();
        let mut processed: HashSet<&str> = HashSet::new();

        while let Some(current) = queue.pop_front() {
            if !processed.insert(current) {
                continue;
            }
            order.push(current);

            for dependent in dependents.get(current).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree = degree.saturating_sub(1);
                    if *degree == 0 {
                        queue.push_back(*dependent);
                    }
                }
            }
        }

        if order.len() != task_names.len() {
            let remaining: Vec<&str> = task_names
                .iter()
                .map(String::as_str)
                .filter(|name| !processed.contains(name))
                .collect();

            return Err(anyhow::anyhow!(
                "Circular dependency detected. Tasks involved: {:?}",
                remaining
            ));
        }

        if order.len() > 1 {
            info!(task_order = ?order, "Tasks sorted by dependencies");
        }

        Ok(order
            .into_iter()
            .filter_map(|name| task_map.remove(name))
            .collect())
    }

    /// 等待所有任务关闭
    async fn wait_for_tasks_shutdown(config: &RuntimeConfig, join_set: &mut JoinSet<TaskResult>) {
        let drain = async {
            while let Some(result) = join_set.join_next().await {
                match result {
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => {
                        warn!("Task completed with error: {}", e);
                    }
                    Err(e) => {
                        warn!("Task join error: {}", e);
                    }
                }
            }
        };

        match tokio::time::timeout(config.shutdown_timeout, drain).await {
            Ok(_) => {
                info!("All tasks completed");
            }
            Err(_) => {
                warn!(
                    timeout = ?config.shutdown_timeout,
                    "Tasks shutdown timeout, forcing exit"
                );
                join_set.abort_all();
            }
        }
    }
}

/// 等待 Ctrl+C 或 SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
