// crates/nf_mesh/src/lib.rs

//! NimbusFlow 结构化网格基底
//!
//! 提供块结构 AMR 网格的索引与存储基础设施：
//!
//! - [`GridBox`]: 半开三维索引盒（生长/细化/粗化/相交/错位）
//! - [`LevelGeometry`]: 层级几何（索引域、物理坐标、周期性）
//! - [`PatchLayout`]: 域分解描述（互不重叠的有效盒 + 分区归属）
//! - [`Patch`] / [`PatchSet`]: 分量主序的分块存储
//! - [`DomainConfig`]: 计算域配置入口
//!
//! 本层不了解"场"的概念：谁拥有哪些分块集合、鬼层如何填充，
//! 由 `nf_field` 在其上定义。
//!
//! # 示例
//!
//! ```
//! use nf_mesh::{DomainConfig, GridBox};
//!
//! let cfg = DomainConfig {
//!     cells: [16, 16, 16],
//!     max_patch_size: 8,
//!     ..Default::default()
//! };
//! let (geometry, layout) = cfg.build_level0().unwrap();
//! assert_eq!(geometry.domain(), GridBox::cube(16));
//! assert_eq!(layout.num_patches(), 8);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod box3;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod patch;

// 重导出常用类型
pub use box3::{CellIter, GridBox};
pub use error::MeshError;
pub use geometry::{DomainConfig, LevelGeometry};
pub use layout::PatchLayout;
pub use patch::{Patch, PatchSet};

// box3 依赖的基础词汇
pub use nf_foundation::MeshLocation;
