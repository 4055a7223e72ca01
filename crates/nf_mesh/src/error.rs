// crates/nf_mesh/src/error.rs

//! 网格层错误类型

use nf_foundation::NfError;
use thiserror::Error;

/// 网格层错误
#[derive(Error, Debug)]
pub enum MeshError {
    /// 计算域定义无效
    #[error("计算域无效: {0}")]
    InvalidDomain(String),

    /// 分块尺寸无效
    #[error("分块尺寸无效: {value}, 必须为正")]
    InvalidPatchSize {
        /// 给定的分块尺寸
        value: i32,
    },

    /// 分块互相重叠
    #[error("分块 {first} 与分块 {second} 的有效区域重叠")]
    OverlappingPatches {
        /// 第一个分块序号
        first: usize,
        /// 第二个分块序号
        second: usize,
    },

}

impl From<MeshError> for NfError {
    fn from(err: MeshError) -> Self {
        NfError::validation(err.to_string())
    }
}
