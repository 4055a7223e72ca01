// crates/nf_foundation/src/lib.rs

//! NimbusFlow Foundation Layer
//!
//! 零重量基础层，提供整个项目的基础抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型
//! - [`direction`]: 坐标轴与域边界朝向系统
//! - [`location`]: 网格位置（单元中心/节点/错位面）
//! - [`float`]: 浮点比较工具和数值容差
//!
//! # 设计原则
//!
//! 1. **最小依赖**: 仅依赖 serde 和 thiserror
//! 2. **类型安全**: 编译期区分坐标轴、朝向与网格位置
//! 3. **零开销抽象**: release 模式下与裸枚举完全相同的性能
//!
//! # 示例
//!
//! ```
//! use nf_foundation::{Axis, DomainFace, MeshLocation};
//!
//! let face = DomainFace::XHi;
//! assert_eq!(face.axis(), Axis::X);
//! assert!(!face.is_low());
//! assert_eq!(face.opposite(), DomainFace::XLo);
//!
//! let loc = MeshLocation::XFace;
//! assert_eq!(loc.face_axis(), Some(Axis::X));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod direction;
pub mod error;
pub mod float;
pub mod location;

// 重导出常用类型
pub use direction::{Axis, DomainFace, Side, NUM_DOMAIN_FACES};
pub use error::{NfError, NfResult};
pub use location::MeshLocation;

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::direction::{Axis, DomainFace, Side};
    pub use crate::error::{NfError, NfResult};
    pub use crate::float::{approx_eq, approx_eq_rel};
    pub use crate::location::MeshLocation;
}
