// crates/nf_field/src/lib.rs

//! NimbusFlow 场管理与边界填充核心
//!
//! 块结构 AMR 流动求解器的状态中枢：
//!
//! - [`FieldRepo`]: 场仓库——全部仿真状态的唯一所有者，负责声明、
//!   查找、层级生命周期和时间态轮转
//! - [`Field`] / [`IntField`]: 轻量场句柄，数据守卫和填充操作的入口
//! - [`boundary`]: 语义边界到数学填充规则的分类层
//! - [`fill`]: 填充引擎（层内交换、粗细插值、物理边界、入流刷新）
//! - [`config`]: 声明式边界配置（JSON）
//!
//! # 典型流程
//!
//! ```
//! use nf_field::{FieldRepo, FieldRole, FillRule};
//! use nf_mesh::DomainConfig;
//!
//! let cfg = DomainConfig {
//!     cells: [8, 8, 8],
//!     periodic: [true, true, true],
//!     max_patch_size: 4,
//!     ..Default::default()
//! };
//! let (geometry, layout) = cfg.build_level0().unwrap();
//! let mut repo = FieldRepo::new(geometry, cfg.ref_ratio);
//!
//! repo.declare_cc_field("density", 1, 2, 2).unwrap();
//! repo.make_new_level_from_scratch(0, 0.0, layout);
//!
//! let density = repo.get_field("density");
//! density.fillpatch(0, 0.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod boundary;
pub mod config;
pub mod error;
pub mod field;
pub mod fill;
pub mod repo;
pub mod scratch;
pub mod types;

// 重导出常用类型
pub use boundary::{BcTable, BoundaryKind, FaceBcSpec, InflowProfile, MathBc};
pub use config::{DomainBcConfig, FaceBcConfig, InflowProfileConfig};
pub use error::FieldError;
pub use field::{Field, IntField};
pub use fill::{FillPatchConfig, FillRule, InterpScheme};
pub use repo::FieldRepo;
pub use scratch::{IntScratchField, ScratchField};
pub use types::{FieldInfo, FieldRole, FieldState};
