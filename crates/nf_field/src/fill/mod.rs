// crates/nf_field/src/fill/mod.rs

//! 填充引擎
//!
//! 鬼层填充的全部数值机制：
//!
//! - [`interp`]: 粗细层空间插值算子
//! - [`exchange`]: 层内兄弟分块与周期回绕交换
//! - [`physbc`]: 物理边界函数子应用
//! - [`fillpatch`]: 操作编排（单层、两层、兄弟联合、入流刷新）
//!
//! 所有填充都是阻塞同步的；分块间用 rayon 并行，分块数低于
//! [`MIN_PARALLEL_PATCHES`] 时退回串行。

pub mod exchange;
pub mod fillpatch;
pub mod interp;
pub mod physbc;

pub use fillpatch::{FillPatchConfig, FillRule};
pub use interp::InterpScheme;

/// 并行阈值：分块数低于此值时串行执行
pub(crate) const MIN_PARALLEL_PATCHES: usize = 4;
