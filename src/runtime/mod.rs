//! 进程运行时
//!
//! 管理进程内的后台任务（Kafka 监听、生产者生命周期等）
//!
//! 1. **任务抽象**：通过 `Task` trait 支持不同类型的任务
//! 2. **依赖顺序**：按任务声明的依赖做拓扑排序后依次启动
//! 3. **优雅停机**：收到 Ctrl+C / SIGTERM 后逐个通知任务，超时则中止
//!
//! # 使用示例
//!
//! ```rust,no_run
//! use rvg_kafka::runtime::ServiceRuntime;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let runtime = ServiceRuntime::new("rvg-consumer")
//!     .add_worker("listener", |shutdown| async move {
//!         let _ = shutdown.await;
//!         Ok(())
//!     });
//!
//! runtime.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
#[allow(clippy::module_inception)]
pub mod runtime;
pub mod task;

pub use config::RuntimeConfig;
pub use runtime::{ServiceRuntime, shutdown_signal};
pub use task::{ConsumerTask, FnTask, MessageConsumer, ShutdownReceiver, Task, TaskResult};
