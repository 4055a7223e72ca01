// crates/nf_mesh/src/patch.rs

//! 分块存储
//!
//! [`Patch`] 是单个分块的分量主序（component-major）数据容器，
//! [`PatchSet`] 是一个层级上某个场的全部分块集合。
//!
//! # 存储约定
//!
//! 1. **存储盒**: 每个分块的存储区域为有效单元盒向外生长鬼层、
//!    再按网格位置错位后的索引盒
//! 2. **分量主序**: `data[comp * volume + linear(iv)]`，X 方向最快
//! 3. **非所有权语义在上层**: 本类型拥有自己的数据；场仓库通过
//!    [`PatchSet`] 持有持久存储

use crate::{GridBox, PatchLayout};
use glam::IVec3;
use nf_foundation::MeshLocation;
use std::sync::Arc;

/// 单个分块的分量主序数据
#[derive(Debug, Clone)]
pub struct Patch<T> {
    bounds: GridBox,
    ncomp: usize,
    data: Vec<T>,
}

impl<T: Copy + Default> Patch<T> {
    /// 创建零初始化分块
    ///
    /// `bounds` 为存储盒（通常已含鬼层并按位置错位）。
    pub fn new(bounds: GridBox, ncomp: usize) -> Self {
        debug_assert!(ncomp > 0, "分量数必须为正");
        let volume = bounds.num_cells();
        Self {
            bounds,
            ncomp,
            data: vec![T::default(); volume * ncomp],
        }
    }

    /// 存储盒
    #[inline]
    pub fn bounds(&self) -> GridBox {
        self.bounds
    }

    /// 分量数
    #[inline]
    pub fn ncomp(&self) -> usize {
        self.ncomp
    }

    /// 索引在存储盒内的线性偏移（X 最快）
    #[inline]
    fn linear(&self, iv: IVec3) -> usize {
        debug_assert!(self.bounds.contains(iv), "索引 {iv:?} 超出存储盒 {}", self.bounds);
        let rel = iv - self.bounds.lo();
        let s = self.bounds.size();
        (rel.x as usize) + (s.x as usize) * ((rel.y as usize) + (s.y as usize) * (rel.z as usize))
    }

    /// 读取数值
    #[inline]
    pub fn get(&self, iv: IVec3, comp: usize) -> T {
        debug_assert!(comp < self.ncomp);
        let volume = self.bounds.num_cells();
        self.data[comp * volume + self.linear(iv)]
    }

    /// 写入数值
    #[inline]
    pub fn set(&mut self, iv: IVec3, comp: usize, value: T) {
        debug_assert!(comp < self.ncomp);
        let volume = self.bounds.num_cells();
        let idx = comp * volume + self.linear(iv);
        self.data[idx] = value;
    }

    /// 全域（含鬼层）填充常数
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// 在区域内对单个分量填充常数
    pub fn fill_region(&mut self, region: &GridBox, comp: usize, value: T) {
        let Some(r) = self.bounds.intersect(region) else {
            return;
        };
        for iv in r.iter() {
            self.set(iv, comp, value);
        }
    }

    /// 提取区域数据（分量主序，区域局部排列）
    ///
    /// 与 [`Patch::paste`] 配对使用，实现两阶段 gather/scatter 拷贝，
    /// 避免同一分块集合内的别名借用。
    pub fn extract(&self, region: &GridBox) -> Vec<T> {
        debug_assert!(
            self.bounds.contains_box(region),
            "提取区域 {region} 超出存储盒 {}",
            self.bounds
        );
        let mut out = Vec::with_capacity(region.num_cells() * self.ncomp);
        for comp in 0..self.ncomp {
            for iv in region.iter() {
                out.push(self.get(iv, comp));
            }
        }
        out
    }

    /// 粘贴区域数据（[`Patch::extract`] 的逆操作）
    pub fn paste(&mut self, region: &GridBox, data: &[T]) {
        debug_assert_eq!(data.len(), region.num_cells() * self.ncomp);
        let mut cursor = 0;
        for comp in 0..self.ncomp {
            for iv in region.iter() {
                self.set(iv, comp, data[cursor]);
                cursor += 1;
            }
        }
    }

    /// 同索引区域拷贝
    pub fn copy_region(&mut self, src: &Patch<T>, region: &GridBox) {
        debug_assert_eq!(self.ncomp, src.ncomp);
        for comp in 0..self.ncomp {
            for iv in region.iter() {
                self.set(iv, comp, src.get(iv, comp));
            }
        }
    }

    /// 带平移的区域拷贝：目标索引 `iv` 读取源索引 `iv - shift`
    ///
    /// 用于周期回绕：源有效盒平移 `shift` 后与目标鬼层相交。
    pub fn copy_shifted(&mut self, src: &Patch<T>, dst_region: &GridBox, shift: IVec3) {
        debug_assert_eq!(self.ncomp, src.ncomp);
        for comp in 0..self.ncomp {
            for iv in dst_region.iter() {
                self.set(iv, comp, src.get(iv - shift, comp));
            }
        }
    }
}

// ============================================================================
// 分块集合
// ============================================================================

/// 一个层级上某个场的全部分块
///
/// 分块顺序与 [`PatchLayout`] 的有效盒顺序一致。
#[derive(Debug, Clone)]
pub struct PatchSet<T> {
    layout: Arc<PatchLayout>,
    location: MeshLocation,
    ncomp: usize,
    nghost: i32,
    patches: Vec<Patch<T>>,
}

impl<T: Copy + Default> PatchSet<T> {
    /// 按布局创建零初始化分块集合
    pub fn new(layout: Arc<PatchLayout>, ncomp: usize, nghost: i32, location: MeshLocation) -> Self {
        let patches = layout
            .boxes()
            .iter()
            .map(|b| Patch::new(b.grow(nghost).staggered_for(location), ncomp))
            .collect();
        Self {
            layout,
            location,
            ncomp,
            nghost,
            patches,
        }
    }

    /// 分块布局
    #[inline]
    pub fn layout(&self) -> &Arc<PatchLayout> {
        &self.layout
    }

    /// 网格位置
    #[inline]
    pub fn location(&self) -> MeshLocation {
        self.location
    }

    /// 分量数
    #[inline]
    pub fn ncomp(&self) -> usize {
        self.ncomp
    }

    /// 鬼层宽度
    #[inline]
    pub fn nghost(&self) -> i32 {
        self.nghost
    }

    /// 分块数
    #[inline]
    pub fn num_patches(&self) -> usize {
        self.patches.len()
    }

    /// 第 `i` 个分块
    #[inline]
    pub fn patch(&self, i: usize) -> &Patch<T> {
        &self.patches[i]
    }

    /// 第 `i` 个分块（可变）
    #[inline]
    pub fn patch_mut(&mut self, i: usize) -> &mut Patch<T> {
        &mut self.patches[i]
    }

    /// 全部分块切片（用于并行遍历）
    #[inline]
    pub fn patches(&self) -> &[Patch<T>] {
        &self.patches
    }

    /// 全部分块可变切片（用于并行遍历）
    #[inline]
    pub fn patches_mut(&mut self) -> &mut [Patch<T>] {
        &mut self.patches
    }

    /// 第 `i` 个分块的有效单元盒
    #[inline]
    pub fn valid_cells(&self, i: usize) -> GridBox {
        self.layout.boxes()[i]
    }

    /// 第 `i` 个分块在本场网格位置下的有效索引盒
    #[inline]
    pub fn valid_region(&self, i: usize) -> GridBox {
        self.layout.boxes()[i].staggered_for(self.location)
    }

    /// 全部分块（含鬼层）填充常数
    pub fn fill_all(&mut self, value: T) {
        for p in &mut self.patches {
            p.fill(value);
        }
    }
}

// ============================================================================
// 测试
// ============================================================================
