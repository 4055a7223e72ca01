// crates/nf_field/src/error.rs

//! 场管理层错误类型
//!
//! 全部为配置/声明阶段错误：声明与边界分类以 `Result` 传播，
//! 由驱动层中止；查找类错误（`get_field` 未知名称）按约定直接
//! panic，调用方在"不存在可恢复"的场景下先用 `field_exists` 探测。

use nf_foundation::NfError;
use thiserror::Error;

/// 场管理层错误
#[derive(Error, Debug)]
pub enum FieldError {
    /// 重复声明且签名不一致
    #[error("字段 '{name}' 重复声明且签名不匹配: {detail}")]
    SignatureMismatch {
        /// 场名称
        name: String,
        /// 差异描述
        detail: String,
    },

    /// 无法识别的语义边界类型
    #[error("边界朝向 {face} 的边界类型无法识别: '{value}'")]
    UnknownBoundaryKind {
        /// 朝向配置键名
        face: String,
        /// 给定的字符串
        value: String,
    },

    /// 壁面仅支持常数 Dirichlet 值
    #[error("字段 '{field}' 在朝向 {face} 为壁面, 仅支持常数 Dirichlet 值, 不支持剖面")]
    WallProfile {
        /// 场名称
        field: String,
        /// 朝向配置键名
        face: String,
    },

    /// 无法识别的插值格式选择子
    #[error("插值格式无法识别: '{value}'")]
    UnknownInterpScheme {
        /// 给定的字符串
        value: String,
    },

    /// 边界值向量长度与分量数不符
    #[error("字段 '{field}' 在朝向 {face} 的边界值数量不匹配: 期望{expected}, 实际{actual}")]
    BcValueLength {
        /// 场名称
        field: String,
        /// 朝向配置键名
        face: String,
        /// 期望长度（分量数）
        expected: usize,
        /// 实际长度
        actual: usize,
    },

    /// 其它边界/场配置错误
    #[error("场配置错误: {0}")]
    Config(String),
}

impl From<FieldError> for NfError {
    fn from(err: FieldError) -> Self {
        NfError::config(err.to_string())
    }
}
