// crates/nf_field/src/fill/exchange.rs

//! 层内鬼层交换
//!
//! 把同层兄弟分块的有效数据拷进彼此的鬼层，周期轴上附加
//! 镜像平移后的回绕拷贝。
//!
//! 分块集合内部存在别名问题（源和目标在同一个 `Vec` 里），
//! 因此交换分两阶段：先只读地把全部来源区域提取成局部缓冲，
//! 再可变地逐分块粘贴。粘贴阶段按分块并行。

use glam::IVec3;
use nf_mesh::{GridBox, LevelGeometry, PatchSet};
use rayon::prelude::*;

use super::MIN_PARALLEL_PATCHES;

/// 单个分块待粘贴的来源区域
type CopyOps = Vec<(GridBox, Vec<f64>)>;

/// 层内鬼层交换
///
/// `periodic_only` 为真时只做周期回绕（鬼层其余部分由调用方
/// 的粗层插值负责），否则兄弟重叠和周期回绕都做。
pub(crate) fn exchange_ghosts(set: &mut PatchSet<f64>, geom: &LevelGeometry, periodic_only: bool) {
    let ops = gather_copy_ops(set, geom, periodic_only);
    scatter_copy_ops(set, ops);
}

/// 阶段一：只读提取每个目标分块的全部来源数据
fn gather_copy_ops(set: &PatchSet<f64>, geom: &LevelGeometry, periodic_only: bool) -> Vec<CopyOps> {
    let mut shifts = vec![IVec3::ZERO];
    shifts.extend(geom.periodic_shifts());
    let n = set.num_patches();

    (0..n)
        .map(|dst| {
            let dst_bounds = set.patch(dst).bounds();
            let mut ops = CopyOps::new();
            for &shift in &shifts {
                if periodic_only && shift == IVec3::ZERO {
                    continue;
                }
                for src in 0..n {
                    if shift == IVec3::ZERO && src == dst {
                        continue;
                    }
                    let src_valid = set.valid_region(src).shift(shift);
                    let Some(region) = dst_bounds.intersect(&src_valid) else {
                        continue;
                    };
                    // 在源索引空间提取，粘贴时回到目标索引空间
                    let data = set.patch(src).extract(&region.shift(-shift));
                    ops.push((region, data));
                }
            }
            ops
        })
        .collect()
}

/// 阶段二：逐分块粘贴（分块间无别名，按分块并行）
fn scatter_copy_ops(set: &mut PatchSet<f64>, ops: Vec<Vec<(GridBox, Vec<f64>)>>) {
    let patches = set.patches_mut();
    let apply = |(patch, ops): (&mut nf_mesh::Patch<f64>, CopyOps)| {
        for (region, data) in &ops {
            patch.paste(region, data);
        }
    };
    if patches.len() >= MIN_PARALLEL_PATCHES {
        patches.par_iter_mut().zip(ops).for_each(apply);
    } else {
        patches.iter_mut().zip(ops).for_each(apply);
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use nf_foundation::MeshLocation;
    use nf_mesh::PatchLayout;
    use std::sync::Arc;

    fn geom_8(periodic: [bool; 3]) -> LevelGeometry {
        LevelGeometry::new(GridBox::cube(8), DVec3::ZERO, DVec3::splat(0.125), periodic)
    }

    /// 8^3 域切成 8 个 4^3 分块，有效区写全局线性场
    fn linear_set(nghost: i32) -> PatchSet<f64> {
        let layout = Arc::new(PatchLayout::chunk(GridBox::cube(8), 4, 1));
        let mut set = PatchSet::new(layout, 1, nghost, MeshLocation::Cell);
        for i in 0..set.num_patches() {
            let valid = set.valid_cells(i);
            for iv in valid.iter() {
                set.patch_mut(i).set(iv, 0, (iv.x + 10 * iv.y + 100 * iv.z) as f64);
            }
        }
        set
    }

    #[test]
    fn test_sibling_overlap_filled() {
        let geom = geom_8([false; 3]);
        let mut set = linear_set(2);
        exchange_ghosts(&mut set, &geom, false);

        // 每个分块的鬼层中与域相交的部分等于全局场
        for i in 0..set.num_patches() {
            let inner = set.patch(i).bounds().intersect(&GridBox::cube(8)).unwrap();
            for iv in inner.iter() {
                let expect = (iv.x + 10 * iv.y + 100 * iv.z) as f64;
                assert_eq!(set.patch(i).get(iv, 0), expect, "分块 {i} 索引 {iv:?}");
            }
        }
    }

    #[test]
    fn test_periodic_wraparound() {
        let geom = geom_8([true, false, false]);
        let mut set = linear_set(1);
        exchange_ghosts(&mut set, &geom, false);

        // x = -1 的鬼单元来自 x = 7 的回绕
        for i in 0..set.num_patches() {
            let b = set.patch(i).bounds();
            if b.lo().x > -1 {
                continue;
            }
            for iv in b.iter().filter(|iv| iv.x == -1 && (0..8).contains(&iv.y) && (0..8).contains(&iv.z)) {
                let expect = (7 + 10 * iv.y + 100 * iv.z) as f64;
                assert_eq!(set.patch(i).get(iv, 0), expect, "回绕鬼单元 {iv:?}");
            }
        }
    }

    #[test]
    fn test_periodic_only_skips_siblings() {
        let geom = geom_8([true, false, false]);
        let mut set = linear_set(1);
        exchange_ghosts(&mut set, &geom, true);

        // 分块 0 的有效区为 [0,4)^3；兄弟重叠区 x=4 未被填充
        let p = set.patch(0);
        assert_eq!(p.get(IVec3::new(4, 0, 0), 0), 0.0);
        // 但 x=-1 的周期回绕已填
        assert_eq!(p.get(IVec3::new(-1, 0, 0), 0), 7.0);
    }

    #[test]
    fn test_staggered_shared_planes_consistent() {
        // 错位场：兄弟分块共享的面平面交换后保持一致
        let layout = Arc::new(PatchLayout::chunk(GridBox::cube(8), 4, 1));
        let mut set = PatchSet::new(layout, 1, 1, MeshLocation::XFace);
        for i in 0..set.num_patches() {
            let valid = set.valid_region(i);
            for iv in valid.iter() {
                set.patch_mut(i).set(iv, 0, (iv.x + 10 * iv.y + 100 * iv.z) as f64);
            }
        }
        let geom = geom_8([false; 3]);
        exchange_ghosts(&mut set, &geom, false);

        let domain_faces = GridBox::cube(8).staggered_for(MeshLocation::XFace);
        for i in 0..set.num_patches() {
            let inner = set.patch(i).bounds().intersect(&domain_faces).unwrap();
            for iv in inner.iter() {
                let expect = (iv.x + 10 * iv.y + 100 * iv.z) as f64;
                assert_eq!(set.patch(i).get(iv, 0), expect);
            }
        }
    }
}
