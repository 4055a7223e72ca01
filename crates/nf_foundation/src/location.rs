// crates/nf_foundation/src/location.rs

//! 网格位置
//!
//! 场变量在结构化网格上的落点：单元中心、节点、或三个错位面之一。
//! 错位面场（面法向场）的数值存放在单元面上，通常表示通量类量。

use crate::direction::Axis;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 场变量的网格位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum MeshLocation {
    /// 单元中心
    Cell = 0,
    /// 节点（单元角点）
    Node = 1,
    /// X 法向面
    XFace = 2,
    /// Y 法向面
    YFace = 3,
    /// Z 法向面
    ZFace = 4,
}

impl MeshLocation {
    /// 是否单元中心
    #[inline]
    pub const fn is_cell(self) -> bool {
        matches!(self, MeshLocation::Cell)
    }

    /// 是否节点
    #[inline]
    pub const fn is_node(self) -> bool {
        matches!(self, MeshLocation::Node)
    }

    /// 是否错位面
    #[inline]
    pub const fn is_face(self) -> bool {
        matches!(
            self,
            MeshLocation::XFace | MeshLocation::YFace | MeshLocation::ZFace
        )
    }

    /// 错位面的法向轴，非面位置返回 `None`
    #[inline]
    pub const fn face_axis(self) -> Option<Axis> {
        match self {
            MeshLocation::XFace => Some(Axis::X),
            MeshLocation::YFace => Some(Axis::Y),
            MeshLocation::ZFace => Some(Axis::Z),
            _ => None,
        }
    }

    /// 由法向轴得到对应的面位置
    #[inline]
    pub const fn face_of(axis: Axis) -> Self {
        match axis {
            Axis::X => MeshLocation::XFace,
            Axis::Y => MeshLocation::YFace,
            Axis::Z => MeshLocation::ZFace,
        }
    }

    /// 各轴是否错位（索引范围比单元多一层）
    ///
    /// 节点位置在三条轴上都错位；面位置仅在法向轴上错位。
    #[inline]
    pub const fn staggered(self) -> [bool; 3] {
        match self {
            MeshLocation::Cell => [false, false, false],
            MeshLocation::Node => [true, true, true],
            MeshLocation::XFace => [true, false, false],
            MeshLocation::YFace => [false, true, false],
            MeshLocation::ZFace => [false, false, true],
        }
    }

    /// 位置名称
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            MeshLocation::Cell => "cell",
            MeshLocation::Node => "node",
            MeshLocation::XFace => "x_face",
            MeshLocation::YFace => "y_face",
            MeshLocation::ZFace => "z_face",
        }
    }
}

impl fmt::Display for MeshLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
