// crates/nf_field/src/types.rs

//! 场标识与元数据
//!
//! - [`FieldId`] / [`IntFieldId`]: 仓库内的场编号
//! - [`SlotId`]: 每层存储槽编号（一个场的每个时间态占一个槽）
//! - [`FieldState`]: 时间态寻址
//! - [`FieldRole`]: 场角色，驱动边界分类
//! - [`FieldInfo`]: 场签名（声明幂等性的判据）

use nf_foundation::MeshLocation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 实数场编号（仓库内索引）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(pub(crate) usize);

/// 整数场编号（掩码/标志场）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntFieldId(pub(crate) usize);

/// 每层存储槽编号
///
/// 同名场的每个时间态占一个独立的槽；`advance_states`
/// 轮转场记录内的槽编号列表，而非搬移数据。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub(crate) usize);

// ============================================================================
// 时间态
// ============================================================================

/// 时间态寻址
///
/// 一个场最多保留 3 个时间态；态序号必须小于场声明的 `nstates`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum FieldState {
    /// 最新态（n+1）
    #[default]
    New = 0,
    /// 上一步态（n）
    Old = 1,
    /// 半步态（n+1/2）
    Half = 2,
}

impl FieldState {
    /// 态序号（槽列表内的下标）
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// 态名称
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            FieldState::New => "new",
            FieldState::Old => "old",
            FieldState::Half => "half",
        }
    }
}

impl fmt::Display for FieldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// 场角色
// ============================================================================

/// 场角色
///
/// 边界分类层按角色将语义边界类型翻译为数学填充规则：
/// 同一个"壁面"对速度场是反射，对压力场是零梯度。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum FieldRole {
    /// 速度类向量场（3 分量，分量与坐标轴对应）
    Velocity = 0,
    /// 标量场（默认角色）
    #[default]
    Scalar = 1,
    /// 压力场（开边界无物理边界值）
    Pressure = 2,
    /// 源项/辅助场（求解时不参与物理边界求值）
    SourceTerm = 3,
}

impl FieldRole {
    /// 角色名称
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            FieldRole::Velocity => "velocity",
            FieldRole::Scalar => "scalar",
            FieldRole::Pressure => "pressure",
            FieldRole::SourceTerm => "source_term",
        }
    }
}

impl fmt::Display for FieldRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// 场签名
// ============================================================================

/// 场签名与元数据
///
/// 同名重复声明时以签名判定幂等性：签名一致返回既有句柄，
/// 不一致为致命配置错误。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldInfo {
    /// 场名称（仓库内唯一）
    pub name: String,
    /// 分量数
    pub ncomp: usize,
    /// 鬼层宽度
    pub nghost: i32,
    /// 保留时间态数
    pub nstates: usize,
    /// 网格位置
    pub location: MeshLocation,
}

impl FieldInfo {
    /// 创建场签名
    pub fn new(
        name: impl Into<String>,
        ncomp: usize,
        nghost: i32,
        nstates: usize,
        location: MeshLocation,
    ) -> Self {
        Self {
            name: name.into(),
            ncomp,
            nghost,
            nstates,
            location,
        }
    }

    /// 签名是否一致（重复声明判据）
    pub fn signature_matches(
        &self,
        ncomp: usize,
        nghost: i32,
        nstates: usize,
        location: MeshLocation,
    ) -> bool {
        self.ncomp == ncomp
            && self.nghost == nghost
            && self.nstates == nstates
            && self.location == location
    }

    /// 签名差异描述（用于错误信息）
    pub fn signature_diff(
        &self,
        ncomp: usize,
        nghost: i32,
        nstates: usize,
        location: MeshLocation,
    ) -> String {
        let mut parts = Vec::new();
        if self.ncomp != ncomp {
            parts.push(format!("ncomp {} != {}", self.ncomp, ncomp));
        }
        if self.nghost != nghost {
            parts.push(format!("nghost {} != {}", self.nghost, nghost));
        }
        if self.nstates != nstates {
            parts.push(format!("nstates {} != {}", self.nstates, nstates));
        }
        if self.location != location {
            parts.push(format!("location {} != {}", self.location, location));
        }
        parts.join(", ")
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_index() {
        assert_eq!(FieldState::New.index(), 0);
        assert_eq!(FieldState::Old.index(), 1);
        assert_eq!(FieldState::Half.index(), 2);
    }

    #[test]
    fn test_signature_matches() {
        let info = FieldInfo::new("density", 1, 2, 2, MeshLocation::Cell);
        assert!(info.signature_matches(1, 2, 2, MeshLocation::Cell));
        assert!(!info.signature_matches(3, 2, 2, MeshLocation::Cell));
        assert!(!info.signature_matches(1, 2, 2, MeshLocation::Node));
    }

    #[test]
    fn test_signature_diff() {
        let info = FieldInfo::new("density", 1, 2, 2, MeshLocation::Cell);
        let diff = info.signature_diff(3, 2, 1, MeshLocation::Cell);
        assert!(diff.contains("ncomp 1 != 3"));
        assert!(diff.contains("nstates 2 != 1"));
        assert!(!diff.contains("nghost"));
    }

    #[test]
    fn test_role_serde() {
        let json = serde_json::to_string(&FieldRole::SourceTerm).unwrap();
        assert_eq!(json, "\"source_term\"");
        let role: FieldRole = serde_json::from_str("\"velocity\"").unwrap();
        assert_eq!(role, FieldRole::Velocity);
    }
}
