// crates/nf_foundation/src/direction.rs

//! 坐标轴与域边界朝向系统
//!
//! 三维结构化网格的方向词汇表：
//!
//! - [`Axis`]: 坐标轴 (X/Y/Z)
//! - [`Side`]: 低侧/高侧
//! - [`DomainFace`]: 计算域的 6 个外边界朝向
//!
//! 朝向的规范顺序为 `xlo, ylo, zlo, xhi, yhi, zhi`，
//! 与边界条件配置键保持一致。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 空间维数
pub const NDIM: usize = 3;

// ============================================================================
// 坐标轴
// ============================================================================

/// 坐标轴
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Axis {
    /// X 轴
    X = 0,
    /// Y 轴
    Y = 1,
    /// Z 轴
    Z = 2,
}

impl Axis {
    /// 全部坐标轴（按 X, Y, Z 顺序）
    pub const ALL: [Axis; NDIM] = [Axis::X, Axis::Y, Axis::Z];

    /// 轴序号 (X=0, Y=1, Z=2)
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// 从序号创建，越界返回 `None`
    #[inline]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Axis::X),
            1 => Some(Axis::Y),
            2 => Some(Axis::Z),
            _ => None,
        }
    }

    /// 另外两条轴（切向轴），按序号升序
    #[inline]
    pub const fn tangential(self) -> [Axis; 2] {
        match self {
            Axis::X => [Axis::Y, Axis::Z],
            Axis::Y => [Axis::X, Axis::Z],
            Axis::Z => [Axis::X, Axis::Y],
        }
    }

    /// 轴名称
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// 低侧/高侧
// ============================================================================

/// 某条轴上的低侧或高侧
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Side {
    /// 低侧（坐标减小方向）
    Low = 0,
    /// 高侧（坐标增大方向）
    High = 1,
}

impl Side {
    /// 朝向符号：低侧 -1，高侧 +1
    #[inline]
    pub const fn sign(self) -> i32 {
        match self {
            Side::Low => -1,
            Side::High => 1,
        }
    }

    /// 相反侧
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Low => Side::High,
            Side::High => Side::Low,
        }
    }
}

// ============================================================================
// 域边界朝向
// ============================================================================

/// 计算域的外边界朝向
///
/// 规范顺序（即 [`DomainFace::index`] 的取值顺序）为
/// `xlo, ylo, zlo, xhi, yhi, zhi`，与配置键一一对应。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum DomainFace {
    /// X 轴低侧
    XLo = 0,
    /// Y 轴低侧
    YLo = 1,
    /// Z 轴低侧
    ZLo = 2,
    /// X 轴高侧
    XHi = 3,
    /// Y 轴高侧
    YHi = 4,
    /// Z 轴高侧
    ZHi = 5,
}

/// 域边界朝向数量
pub const NUM_DOMAIN_FACES: usize = 6;

impl DomainFace {
    /// 全部朝向，按规范顺序
    pub const ALL: [DomainFace; NUM_DOMAIN_FACES] = [
        DomainFace::XLo,
        DomainFace::YLo,
        DomainFace::ZLo,
        DomainFace::XHi,
        DomainFace::YHi,
        DomainFace::ZHi,
    ];

    /// 朝向序号 (xlo=0, ylo=1, zlo=2, xhi=3, yhi=4, zhi=5)
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// 从序号创建，越界返回 `None`
    #[inline]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(DomainFace::XLo),
            1 => Some(DomainFace::YLo),
            2 => Some(DomainFace::ZLo),
            3 => Some(DomainFace::XHi),
            4 => Some(DomainFace::YHi),
            5 => Some(DomainFace::ZHi),
            _ => None,
        }
    }

    /// 由轴和侧构造
    #[inline]
    pub const fn from_axis_side(axis: Axis, side: Side) -> Self {
        let idx = axis.index() + 3 * side as usize;
        match Self::from_index(idx) {
            Some(face) => face,
            None => unreachable!(),
        }
    }

    /// 所在坐标轴
    #[inline]
    pub const fn axis(self) -> Axis {
        match self {
            DomainFace::XLo | DomainFace::XHi => Axis::X,
            DomainFace::YLo | DomainFace::YHi => Axis::Y,
            DomainFace::ZLo | DomainFace::ZHi => Axis::Z,
        }
    }

    /// 所在侧
    #[inline]
    pub const fn side(self) -> Side {
        if (self as usize) < 3 {
            Side::Low
        } else {
            Side::High
        }
    }

    /// 是否低侧
    #[inline]
    pub const fn is_low(self) -> bool {
        matches!(self.side(), Side::Low)
    }

    /// 对面的朝向
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            DomainFace::XLo => DomainFace::XHi,
            DomainFace::YLo => DomainFace::YHi,
            DomainFace::ZLo => DomainFace::ZHi,
            DomainFace::XHi => DomainFace::XLo,
            DomainFace::YHi => DomainFace::YLo,
            DomainFace::ZHi => DomainFace::ZLo,
        }
    }

    /// 外法向符号：低侧 -1，高侧 +1
    #[inline]
    pub const fn sign(self) -> i32 {
        self.side().sign()
    }

    /// 配置键名 ("xlo" ... "zhi")
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            DomainFace::XLo => "xlo",
            DomainFace::YLo => "ylo",
            DomainFace::ZLo => "zlo",
            DomainFace::XHi => "xhi",
            DomainFace::YHi => "yhi",
            DomainFace::ZHi => "zhi",
        }
    }

    /// 从配置键名解析
    pub fn from_name(name: &str) -> Option<Self> {
        DomainFace::ALL.iter().copied().find(|f| f.name() == name)
    }
}

impl fmt::Display for DomainFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_index() {
        assert_eq!(Axis::X.index(), 0);
        assert_eq!(Axis::Z.index(), 2);
        assert_eq!(Axis::from_index(1), Some(Axis::Y));
        assert_eq!(Axis::from_index(3), None);
    }

    #[test]
    fn test_axis_tangential() {
        assert_eq!(Axis::X.tangential(), [Axis::Y, Axis::Z]);
        assert_eq!(Axis::Y.tangential(), [Axis::X, Axis::Z]);
        assert_eq!(Axis::Z.tangential(), [Axis::X, Axis::Y]);
    }

    #[test]
    fn test_face_order() {
        // 规范顺序: xlo, ylo, zlo, xhi, yhi, zhi
        let names: Vec<&str> = DomainFace::ALL.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["xlo", "ylo", "zlo", "xhi", "yhi", "zhi"]);
        for (i, face) in DomainFace::ALL.iter().enumerate() {
            assert_eq!(face.index(), i);
            assert_eq!(DomainFace::from_index(i), Some(*face));
        }
    }

    #[test]
    fn test_face_axis_side() {
        assert_eq!(DomainFace::YLo.axis(), Axis::Y);
        assert_eq!(DomainFace::YLo.side(), Side::Low);
        assert_eq!(DomainFace::ZHi.axis(), Axis::Z);
        assert_eq!(DomainFace::ZHi.side(), Side::High);
        assert!(DomainFace::XLo.is_low());
        assert!(!DomainFace::XHi.is_low());
    }

    #[test]
    fn test_face_opposite() {
        for face in DomainFace::ALL {
            assert_eq!(face.opposite().opposite(), face);
            assert_eq!(face.opposite().axis(), face.axis());
            assert_ne!(face.opposite().side(), face.side());
        }
    }

    #[test]
    fn test_face_from_axis_side() {
        assert_eq!(
            DomainFace::from_axis_side(Axis::X, Side::Low),
            DomainFace::XLo
        );
        assert_eq!(
            DomainFace::from_axis_side(Axis::Z, Side::High),
            DomainFace::ZHi
        );
    }

    #[test]
    fn test_face_from_name() {
        assert_eq!(DomainFace::from_name("xhi"), Some(DomainFace::XHi));
        assert_eq!(DomainFace::from_name("north"), None);
    }

    #[test]
    fn test_sign() {
        assert_eq!(DomainFace::XLo.sign(), -1);
        assert_eq!(DomainFace::XHi.sign(), 1);
        assert_eq!(Side::Low.opposite(), Side::High);
    }

    #[test]
    fn test_serde_roundtrip() {
        let json = serde_json::to_string(&DomainFace::YHi).unwrap();
        assert_eq!(json, "\"yhi\"");
        let face: DomainFace = serde_json::from_str(&json).unwrap();
        assert_eq!(face, DomainFace::YHi);
    }
}
