// crates/nf_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `NfError` 枚举和 `NfResult` 类型别名，用于整个项目的错误处理。
//!
//! # 设计原则
//!
//! 1. **层次化**: 基础层只定义核心错误，网格/场相关错误在 nf_mesh、nf_field 中定义
//! 2. **快速失败**: 配置类错误在启动阶段即返回，不做静默修正
//! 3. **调用方约定**: 运行期违反内部不变量的访问按约定直接 panic，不进错误通道
//!
//! # 示例
//!
//! ```
//! use nf_foundation::error::{NfError, NfResult};
//!
//! fn read_config() -> NfResult<()> {
//!     Err(NfError::config("配置文件格式错误"))
//! }
//! ```

use thiserror::Error;

/// 统一结果类型
pub type NfResult<T> = Result<T, NfError>;

/// NimbusFlow 错误类型
///
/// 核心错误类型，用于整个项目。网格与场管理相关的错误
/// 应在 `nf_mesh` / `nf_field` 中扩展并转换到此类型。
#[derive(Error, Debug)]
pub enum NfError {
    /// IO 错误
    #[error("IO错误: {message}")]
    Io {
        /// 描述性错误信息
        message: String,
        #[source]
        /// 可选的底层 IO 错误
        source: Option<std::io::Error>,
    },

    /// 配置错误
    #[error("配置错误: {message}")]
    Config {
        /// 具体错误信息
        message: String,
    },

    /// 配置值无效
    #[error("配置值无效: {key}={value}, 原因: {reason}")]
    InvalidConfig {
        /// 配置键名
        key: String,
        /// 配置值
        value: String,
        /// 无效原因说明
        reason: String,
    },

    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    /// 验证失败
    #[error("验证失败: {0}")]
    Validation(String),
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl NfError {
    /// 从IO错误创建
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// 配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 配置值无效
    pub fn invalid_config(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// 数组大小不匹配
    pub fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name,
            expected,
            actual,
        }
    }

    /// 验证失败
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

// ========================================================================
// 标准库错误转换
// ========================================================================

impl From<std::io::Error> for NfError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

// ========================================================================
// 测试
// ========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NfError::config("测试配置错误");
        assert!(err.to_string().contains("配置错误"));

        let err = NfError::invalid_config("ref_ratio", "1", "细化比必须 >= 2");
        assert!(err.to_string().contains("ref_ratio=1"));
    }

    #[test]
    fn test_size_mismatch() {
        let err = NfError::size_mismatch("boxes", 10, 5);
        assert!(err.to_string().contains("期望10"));
        assert!(err.to_string().contains("实际5"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let nf_err: NfError = io_err.into();
        assert!(matches!(nf_err, NfError::Io { .. }));
    }
}
