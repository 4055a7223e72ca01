// crates/nf_mesh/src/box3.rs

//! 三维索引盒
//!
//! [`GridBox`] 是结构化网格上的半开索引区间 `[lo, hi)`，
//! 是分块、鬼层、粗细映射等一切索引运算的基础。
//!
//! # 约定
//!
//! 1. **半开区间**: `hi` 不包含在盒内，`size = hi - lo`
//! 2. **单元语义**: 除非经 [`GridBox::staggered_for`] 转换，
//!    盒内索引均指单元；节点/面索引盒在错位轴上比单元盒多一层
//! 3. **细化/粗化**: 针对单元盒定义；粗化对负索引向下取整，
//!    保证鬼层区域粗化后完整覆盖

use crate::MeshLocation;
use glam::IVec3;
use nf_foundation::{Axis, DomainFace, Side};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 半开三维索引盒 `[lo, hi)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridBox {
    lo: IVec3,
    hi: IVec3,
}

impl GridBox {
    /// 创建索引盒
    #[inline]
    pub const fn new(lo: IVec3, hi: IVec3) -> Self {
        Self { lo, hi }
    }

    /// 由起点和尺寸创建
    #[inline]
    pub fn from_size(lo: IVec3, size: IVec3) -> Self {
        Self { lo, hi: lo + size }
    }

    /// 原点起、边长 `n` 的立方盒（常用于测试域）
    #[inline]
    pub fn cube(n: i32) -> Self {
        Self {
            lo: IVec3::ZERO,
            hi: IVec3::splat(n),
        }
    }

    /// 低端索引（含）
    #[inline]
    pub const fn lo(&self) -> IVec3 {
        self.lo
    }

    /// 高端索引（不含）
    #[inline]
    pub const fn hi(&self) -> IVec3 {
        self.hi
    }

    /// 各轴尺寸
    #[inline]
    pub fn size(&self) -> IVec3 {
        self.hi - self.lo
    }

    /// 某轴尺寸
    #[inline]
    pub fn extent(&self, axis: Axis) -> i32 {
        self.hi[axis.index()] - self.lo[axis.index()]
    }

    /// 索引总数；空盒返回 0
    #[inline]
    pub fn num_cells(&self) -> usize {
        let s = self.size();
        if s.x <= 0 || s.y <= 0 || s.z <= 0 {
            0
        } else {
            (s.x as usize) * (s.y as usize) * (s.z as usize)
        }
    }

    /// 是否为空（任一轴尺寸非正）
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_cells() == 0
    }

    /// 是否包含索引
    #[inline]
    pub fn contains(&self, iv: IVec3) -> bool {
        iv.x >= self.lo.x
            && iv.y >= self.lo.y
            && iv.z >= self.lo.z
            && iv.x < self.hi.x
            && iv.y < self.hi.y
            && iv.z < self.hi.z
    }

    /// 是否完整包含另一个盒（空盒视为被任何盒包含）
    #[inline]
    pub fn contains_box(&self, other: &GridBox) -> bool {
        other.is_empty()
            || (self.contains(other.lo) && {
                let last = other.hi - IVec3::ONE;
                self.contains(last)
            })
    }

    /// 交集，空交返回 `None`
    #[inline]
    pub fn intersect(&self, other: &GridBox) -> Option<GridBox> {
        let b = GridBox {
            lo: self.lo.max(other.lo),
            hi: self.hi.min(other.hi),
        };
        if b.is_empty() {
            None
        } else {
            Some(b)
        }
    }

    /// 各轴向两侧扩展 `n` 层
    #[inline]
    pub fn grow(&self, n: i32) -> GridBox {
        GridBox {
            lo: self.lo - IVec3::splat(n),
            hi: self.hi + IVec3::splat(n),
        }
    }

    /// 指定轴向两侧扩展 `n` 层
    #[inline]
    pub fn grow_axis(&self, axis: Axis, n: i32) -> GridBox {
        let mut lo = self.lo;
        let mut hi = self.hi;
        lo[axis.index()] -= n;
        hi[axis.index()] += n;
        GridBox { lo, hi }
    }

    /// 指定轴的指定侧扩展 `n` 层
    #[inline]
    pub fn grow_side(&self, axis: Axis, side: Side, n: i32) -> GridBox {
        let mut lo = self.lo;
        let mut hi = self.hi;
        match side {
            Side::Low => lo[axis.index()] -= n,
            Side::High => hi[axis.index()] += n,
        }
        GridBox { lo, hi }
    }

    /// 整体平移
    #[inline]
    pub fn shift(&self, delta: IVec3) -> GridBox {
        GridBox {
            lo: self.lo + delta,
            hi: self.hi + delta,
        }
    }

    /// 单元盒细化：索引区间按比例放大
    #[inline]
    pub fn refine(&self, ratio: i32) -> GridBox {
        GridBox {
            lo: self.lo * ratio,
            hi: self.hi * ratio,
        }
    }

    /// 单元盒粗化：低端向下取整，高端向上取整
    ///
    /// 保证细层盒（含负索引鬼层）粗化后被完整覆盖。
    #[inline]
    pub fn coarsen(&self, ratio: i32) -> GridBox {
        let cdiv = |v: i32| v.div_euclid(ratio);
        let cdiv_up = |v: i32| (v + ratio - 1).div_euclid(ratio);
        GridBox {
            lo: IVec3::new(cdiv(self.lo.x), cdiv(self.lo.y), cdiv(self.lo.z)),
            hi: IVec3::new(cdiv_up(self.hi.x), cdiv_up(self.hi.y), cdiv_up(self.hi.z)),
        }
    }

    /// 单元盒转为指定网格位置的索引盒
    ///
    /// 错位轴上高端加一层（N 个单元对应 N+1 个面/节点）。
    #[inline]
    pub fn staggered_for(&self, location: MeshLocation) -> GridBox {
        let stag = location.staggered();
        let mut hi = self.hi;
        for axis in Axis::ALL {
            if stag[axis.index()] {
                hi[axis.index()] += 1;
            }
        }
        GridBox { lo: self.lo, hi }
    }

    /// 紧贴某朝向外侧、厚度 `depth` 的索引条带
    ///
    /// 用于单元语义的鬼层区域（如流入边界外侧的鬼单元）。
    pub fn adjacent_cells(&self, face: DomainFace, depth: i32) -> GridBox {
        let axis = face.axis().index();
        let mut lo = self.lo;
        let mut hi = self.hi;
        match face.side() {
            Side::Low => {
                hi[axis] = self.lo[axis];
                lo[axis] = self.lo[axis] - depth;
            }
            Side::High => {
                lo[axis] = self.hi[axis];
                hi[axis] = self.hi[axis] + depth;
            }
        }
        GridBox { lo, hi }
    }

    /// 紧贴某朝向内侧、厚度 `depth` 的索引条带（首层内部单元）
    pub fn boundary_slab(&self, face: DomainFace, depth: i32) -> GridBox {
        let axis = face.axis().index();
        let mut lo = self.lo;
        let mut hi = self.hi;
        match face.side() {
            Side::Low => hi[axis] = self.lo[axis] + depth,
            Side::High => lo[axis] = self.hi[axis] - depth,
        }
        GridBox { lo, hi }
    }

    /// 遍历盒内索引，X 最快
    #[inline]
    pub fn iter(&self) -> CellIter {
        CellIter::new(*self)
    }
}

impl fmt::Display for GridBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[({},{},{})..({},{},{}))",
            self.lo.x, self.lo.y, self.lo.z, self.hi.x, self.hi.y, self.hi.z
        )
    }
}

// ============================================================================
// 索引遍历
// ============================================================================

/// [`GridBox`] 的索引迭代器，X 方向最快（与存储布局一致）
#[derive(Debug, Clone)]
pub struct CellIter {
    lo: IVec3,
    hi: IVec3,
    cur: IVec3,
    done: bool,
}

impl CellIter {
    fn new(b: GridBox) -> Self {
        Self {
            lo: b.lo,
            hi: b.hi,
            cur: b.lo,
            done: b.is_empty(),
        }
    }
}

impl Iterator for CellIter {
    type Item = IVec3;

    fn next(&mut self) -> Option<IVec3> {
        if self.done {
            return None;
        }
        let out = self.cur;
        self.cur.x += 1;
        if self.cur.x == self.hi.x {
            self.cur.x = self.lo.x;
            self.cur.y += 1;
            if self.cur.y == self.hi.y {
                self.cur.y = self.lo.y;
                self.cur.z += 1;
                if self.cur.z == self.hi.z {
                    self.done = true;
                }
            }
        }
        Some(out)
    }
}

impl IntoIterator for GridBox {
    type Item = IVec3;
    type IntoIter = CellIter;

    fn into_iter(self) -> CellIter {
        CellIter::new(self)
    }
}

// ============================================================================
// 测试
// ============================================================================
