// crates/nf_mesh/src/layout.rs

//! 分块布局
//!
//! [`PatchLayout`] 描述一个层级的域分解：互不重叠的有效单元盒，
//! 以及每个分块归属的工作分区（rank）。布局在重划分（regrid）时
//! 整体替换，场存储据此重新分配。

use crate::{GridBox, MeshError};
use glam::IVec3;
use nf_foundation::NfResult;
use serde::{Deserialize, Serialize};

/// 一个层级的域分解描述
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchLayout {
    boxes: Vec<GridBox>,
    ranks: Vec<usize>,
}

impl PatchLayout {
    /// 由有效盒与归属分区创建，校验互不重叠
    pub fn new(boxes: Vec<GridBox>, ranks: Vec<usize>) -> NfResult<Self> {
        if boxes.len() != ranks.len() {
            return Err(nf_foundation::NfError::size_mismatch(
                "ranks",
                boxes.len(),
                ranks.len(),
            ));
        }
        for (i, a) in boxes.iter().enumerate() {
            if a.is_empty() {
                return Err(MeshError::InvalidDomain(format!("分块 {i} 为空盒")).into());
            }
            for (j, b) in boxes.iter().enumerate().skip(i + 1) {
                if a.intersect(b).is_some() {
                    return Err(MeshError::OverlappingPatches { first: i, second: j }.into());
                }
            }
        }
        Ok(Self { boxes, ranks })
    }

    /// 将计算域切分为边长不超过 `max_size` 的分块
    ///
    /// 分区按分块序号对 `num_ranks` 轮转分配。
    pub fn chunk(domain: GridBox, max_size: i32, num_ranks: usize) -> Self {
        assert!(max_size > 0, "分块尺寸必须为正: {max_size}");
        assert!(num_ranks > 0, "分区数必须为正: {num_ranks}");

        let n_chunks = |len: i32| -> i32 { (len + max_size - 1) / max_size };
        let size = domain.size();
        let nc = IVec3::new(n_chunks(size.x), n_chunks(size.y), n_chunks(size.z));

        let mut boxes = Vec::new();
        for cz in 0..nc.z {
            for cy in 0..nc.y {
                for cx in 0..nc.x {
                    let c = IVec3::new(cx, cy, cz);
                    let lo = domain.lo() + c * max_size;
                    let hi = (lo + IVec3::splat(max_size)).min(domain.hi());
                    boxes.push(GridBox::new(lo, hi));
                }
            }
        }
        let ranks = (0..boxes.len()).map(|i| i % num_ranks).collect();
        Self { boxes, ranks }
    }

    /// 分块数
    #[inline]
    pub fn num_patches(&self) -> usize {
        self.boxes.len()
    }

    /// 全部有效单元盒
    #[inline]
    pub fn boxes(&self) -> &[GridBox] {
        &self.boxes
    }

    /// 各分块归属的分区
    #[inline]
    pub fn ranks(&self) -> &[usize] {
        &self.ranks
    }

    /// 全部有效盒的并集所覆盖的总单元数
    pub fn num_cells(&self) -> usize {
        self.boxes.iter().map(|b| b.num_cells()).sum()
    }

    /// 与 `region` 相交的分块及交集
    pub fn intersections(&self, region: &GridBox) -> Vec<(usize, GridBox)> {
        self.boxes
            .iter()
            .enumerate()
            .filter_map(|(i, b)| b.intersect(region).map(|isect| (i, isect)))
            .collect()
    }

    /// 有效盒是否完整覆盖 `region`
    pub fn covers(&self, region: &GridBox) -> bool {
        let covered: usize = self
            .intersections(region)
            .iter()
            .map(|(_, b)| b.num_cells())
            .sum();
        covered == region.num_cells()
    }
}

// ============================================================================
// 测试
// ============================================================================
