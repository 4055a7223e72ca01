// crates/nf_field/src/boundary/types.rs

//! 边界类型词汇
//!
//! 语义边界类型（[`BoundaryKind`]）描述域外边界的物理含义，
//! 对整个计算域全局给定；数学边界类型（[`MathBc`]）是分类层
//! 按场角色逐分量翻译出的数值填充规则。[`BcTable`] 是挂在
//! 每个场上的翻译结果。

use super::profiles::InflowProfile;
use nf_foundation::{DomainFace, NUM_DOMAIN_FACES};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 语义边界类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum BoundaryKind {
    /// 周期边界（成对出现在同一条轴上）
    #[default]
    Periodic = 0,
    /// 无滑移固壁
    NoSlipWall = 1,
    /// 自由滑移固壁
    SlipWall = 2,
    /// 对称边界
    Symmetry = 3,
    /// 质量入流
    MassInflow = 4,
    /// 压力出流
    PressureOutflow = 5,
}

impl BoundaryKind {
    /// 配置键名
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            BoundaryKind::Periodic => "periodic",
            BoundaryKind::NoSlipWall => "no_slip_wall",
            BoundaryKind::SlipWall => "slip_wall",
            BoundaryKind::Symmetry => "symmetry",
            BoundaryKind::MassInflow => "mass_inflow",
            BoundaryKind::PressureOutflow => "pressure_outflow",
        }
    }

    /// 从配置键名解析，未知返回 `None`
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "periodic" => Some(Self::Periodic),
            "no_slip_wall" => Some(Self::NoSlipWall),
            "slip_wall" => Some(Self::SlipWall),
            "symmetry" => Some(Self::Symmetry),
            "mass_inflow" => Some(Self::MassInflow),
            "pressure_outflow" => Some(Self::PressureOutflow),
            _ => None,
        }
    }

    /// 是否固壁类（反射法向速度）
    #[inline]
    pub const fn is_wall(self) -> bool {
        matches!(self, Self::NoSlipWall | Self::SlipWall)
    }
}

impl fmt::Display for BoundaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// 数学边界类型
// ============================================================================

/// 数学边界类型（数值填充规则）
///
/// 按值传入逐单元核函数，由 tag 分派求值，不携带闭包。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum MathBc {
    /// 内部/周期：由层内交换填充，物理边界核跳过
    #[default]
    Interior = 0,
    /// 固定值（常数或剖面求值）
    Dirichlet = 1,
    /// 零梯度
    Neumann = 2,
    /// 奇反射：ghost = 2*v_wall - mirror
    ReflectOdd = 3,
    /// 偶反射：ghost = mirror
    ReflectEven = 4,
    /// 一阶外推（取最近内部值）
    FirstOrderExtrap = 5,
    /// 高阶外推（两个内部值线性外推）
    HighOrderExtrap = 6,
}

// ============================================================================
// 边界表
// ============================================================================

/// 场的边界表：分类层的输出，填充引擎的输入
///
/// 每朝向一个语义类型；每（分量, 朝向）一个数学类型；
/// 每朝向一组常数值（分量长度）和一个可选剖面。
#[derive(Debug, Clone)]
pub struct BcTable {
    kinds: [BoundaryKind; NUM_DOMAIN_FACES],
    math: Vec<[MathBc; NUM_DOMAIN_FACES]>,
    values: [Vec<f64>; NUM_DOMAIN_FACES],
    profiles: [Option<InflowProfile>; NUM_DOMAIN_FACES],
}

impl BcTable {
    /// 全内部（周期）边界表：未分类场的默认值
    pub fn interior(ncomp: usize) -> Self {
        Self {
            kinds: [BoundaryKind::Periodic; NUM_DOMAIN_FACES],
            math: vec![[MathBc::Interior; NUM_DOMAIN_FACES]; ncomp],
            values: std::array::from_fn(|_| vec![0.0; ncomp]),
            profiles: std::array::from_fn(|_| None),
        }
    }

    /// 分量数
    #[inline]
    pub fn ncomp(&self) -> usize {
        self.math.len()
    }

    /// 某朝向的语义类型
    #[inline]
    pub fn kind(&self, face: DomainFace) -> BoundaryKind {
        self.kinds[face.index()]
    }

    /// 某（分量, 朝向）的数学类型
    #[inline]
    pub fn math_bc(&self, comp: usize, face: DomainFace) -> MathBc {
        self.math[comp][face.index()]
    }

    /// 某朝向某分量的常数边界值
    #[inline]
    pub fn value(&self, face: DomainFace, comp: usize) -> f64 {
        self.values[face.index()][comp]
    }

    /// 某朝向的剖面函数子
    #[inline]
    pub fn profile(&self, face: DomainFace) -> Option<&InflowProfile> {
        self.profiles[face.index()].as_ref()
    }

    /// 写入某朝向的语义类型
    pub fn set_kind(&mut self, face: DomainFace, kind: BoundaryKind) {
        self.kinds[face.index()] = kind;
    }

    /// 写入某（分量, 朝向）的数学类型
    pub fn set_math(&mut self, comp: usize, face: DomainFace, bc: MathBc) {
        self.math[comp][face.index()] = bc;
    }

    /// 写入某朝向的常数值向量
    pub fn set_values(&mut self, face: DomainFace, values: Vec<f64>) {
        debug_assert_eq!(values.len(), self.ncomp());
        self.values[face.index()] = values;
    }

    /// 写入某朝向的剖面函数子
    pub fn set_profile(&mut self, face: DomainFace, profile: InflowProfile) {
        self.profiles[face.index()] = Some(profile);
    }

    /// 被分类为质量入流的朝向
    pub fn inflow_faces(&self) -> impl Iterator<Item = DomainFace> + '_ {
        DomainFace::ALL
            .into_iter()
            .filter(|f| self.kind(*f) == BoundaryKind::MassInflow)
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_roundtrip() {
        for kind in [
            BoundaryKind::Periodic,
            BoundaryKind::NoSlipWall,
            BoundaryKind::SlipWall,
            BoundaryKind::Symmetry,
            BoundaryKind::MassInflow,
            BoundaryKind::PressureOutflow,
        ] {
            assert_eq!(BoundaryKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(BoundaryKind::from_name("open_sea"), None);
    }

    #[test]
    fn test_is_wall() {
        assert!(BoundaryKind::NoSlipWall.is_wall());
        assert!(BoundaryKind::SlipWall.is_wall());
        assert!(!BoundaryKind::Symmetry.is_wall());
        assert!(!BoundaryKind::MassInflow.is_wall());
    }

    #[test]
    fn test_table_defaults() {
        let table = BcTable::interior(3);
        assert_eq!(table.ncomp(), 3);
        for face in DomainFace::ALL {
            assert_eq!(table.kind(face), BoundaryKind::Periodic);
            for comp in 0..3 {
                assert_eq!(table.math_bc(comp, face), MathBc::Interior);
                assert_eq!(table.value(face, comp), 0.0);
            }
            assert!(table.profile(face).is_none());
        }
    }

    #[test]
    fn test_table_set_and_query() {
        let mut table = BcTable::interior(1);
        table.set_kind(DomainFace::XHi, BoundaryKind::MassInflow);
        table.set_math(0, DomainFace::XHi, MathBc::Dirichlet);
        table.set_values(DomainFace::XHi, vec![2.5]);

        assert_eq!(table.math_bc(0, DomainFace::XHi), MathBc::Dirichlet);
        assert_eq!(table.value(DomainFace::XHi, 0), 2.5);
        let inflow: Vec<_> = table.inflow_faces().collect();
        assert_eq!(inflow, vec![DomainFace::XHi]);
    }
}
