//! 错误处理模块
//!
//! 提供统一的错误类型、错误代码分类和 Kafka 客户端错误转换

pub mod builder;
pub mod code;
pub mod conversions;
pub mod rvg_error;

pub use builder::ErrorBuilder;
pub use code::{ErrorCategory, ErrorCode};
pub use rvg_error::{Result, RvgError};

/// 将基础设施错误转换为 `RvgError`
pub fn map_infra_error<E, S>(error: E, code: ErrorCode, message: S) -> RvgError
where
    E: std::fmt::Display,
    S: Into<String>,
{
    ErrorBuilder::new(code, message.into())
        .details(error.to_string())
        .build_error()
}

/// `Result` 的辅助扩展，用于把任意错误附上错误代码转换为 `RvgError`
pub trait ResultExt<T> {
    fn with_code<S>(self, code: ErrorCode, message: S) -> Result<T>
    where
        S: Into<String>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::fmt::Display,
{
    fn with_code<S>(self, code: ErrorCode, message: S) -> Result<T>
    where
        S: Into<String>,
    {
        self.map_err(|err| map_infra_error(err, code, message))
    }
}
