// crates/nf_field/src/boundary/mod.rs

//! 边界分类层
//!
//! 把用户声明的语义边界条件（壁面、入流、出流、对称、周期）
//! 翻译为每场、每分量、每朝向的数学填充规则，以及入流处的
//! 值生成函数子。
//!
//! - [`types`]: 语义/数学边界类型与边界表
//! - [`profiles`]: 入流剖面函数子（纯数据 + tag 分派）
//! - [`classify`]: 角色驱动的翻译规则

pub mod classify;
pub mod profiles;
pub mod types;

pub use classify::{classify, FaceBcSpec};
pub use profiles::InflowProfile;
pub use types::{BcTable, BoundaryKind, MathBc};
