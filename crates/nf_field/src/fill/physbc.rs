// crates/nf_field/src/fill/physbc.rs

//! 物理边界鬼层填充
//!
//! 按边界表把域外鬼层填充为数学边界规则规定的值。
//!
//! # 扫描顺序
//!
//! 轴按 X → Y → Z 依次处理，每条轴先低侧后高侧，条带覆盖分块
//! 存储盒的全部切向范围（含角区）。后处理轴的镜像读取会取到
//! 先处理轴已填好的鬼层值，域角鬼单元由此收敛到一致结果，
//! 不需要专门的角区核。
//!
//! # 索引约定（沿边界轴）
//!
//! 单元位置: 低侧镜像 `2b-1-i`，高侧镜像 `2e-1-i`（`b`/`e` 为域
//! 低端含/高端不含索引）；错位法向: 镜像 `2p-i`（`p` 为边界平面
//! 索引），且 Dirichlet/奇反射额外写边界平面本身。

use crate::boundary::{BcTable, MathBc};
use glam::IVec3;
use nf_foundation::{DomainFace, MeshLocation, Side};
use nf_mesh::{GridBox, LevelGeometry, Patch, PatchSet};
use rayon::prelude::*;

use super::MIN_PARALLEL_PATCHES;

/// 对分块集合应用物理边界填充
pub(crate) fn apply_phys_bc_set(
    set: &mut PatchSet<f64>,
    geom: &LevelGeometry,
    table: &BcTable,
    time: f64,
) {
    let location = set.location();
    let patches = set.patches_mut();
    if patches.len() >= MIN_PARALLEL_PATCHES {
        patches
            .par_iter_mut()
            .for_each(|p| apply_phys_bc_patch(p, geom, location, table, time));
    } else {
        for p in patches {
            apply_phys_bc_patch(p, geom, location, table, time);
        }
    }
}

/// 对单个分块应用物理边界填充
///
/// 分块存储盒未伸出计算域的朝向自动跳过；内部（周期）规则
/// 由层内交换负责，这里不触碰。
pub(crate) fn apply_phys_bc_patch(
    patch: &mut Patch<f64>,
    geom: &LevelGeometry,
    location: MeshLocation,
    table: &BcTable,
    time: f64,
) {
    debug_assert_eq!(patch.ncomp(), table.ncomp());
    // 低 X, 高 X, 低 Y, ... 的轴序展开
    for face in [
        DomainFace::XLo,
        DomainFace::XHi,
        DomainFace::YLo,
        DomainFace::YHi,
        DomainFace::ZLo,
        DomainFace::ZHi,
    ] {
        apply_face(patch, geom, location, table, time, face);
    }
}

/// 沿单条轴的边界索引算术
struct FaceIndexer {
    /// 边界平面（仅错位法向有意义）
    plane: i32,
    /// 最近内部索引
    first: i32,
    /// 次近内部索引
    second: i32,
}

impl FaceIndexer {
    fn new(face: DomainFace, domain: &GridBox, staggered: bool) -> Self {
        let a = face.axis().index();
        match face.side() {
            Side::Low => {
                let b = domain.lo()[a];
                Self { plane: b, first: b, second: b + 1 }
            }
            Side::High => {
                let e = domain.hi()[a];
                if staggered {
                    // 错位域高端不含，边界平面在 e-1
                    Self { plane: e - 1, first: e - 1, second: e - 2 }
                } else {
                    Self { plane: e, first: e - 1, second: e - 2 }
                }
            }
        }
    }

    /// 鬼层索引 `i` 的镜像内部索引
    #[inline]
    fn mirror(&self, i: i32, staggered: bool) -> i32 {
        if staggered {
            2 * self.plane - i
        } else {
            // 单元语义：低侧 plane=b、高侧 plane=e，镜像公式一致
            2 * self.plane - 1 - i
        }
    }

    /// 鬼层索引 `i` 离边界的层数（首层为 1）
    #[inline]
    fn depth(&self, i: i32, side: Side, staggered: bool) -> i32 {
        match side {
            Side::Low => self.plane - i,
            Side::High => {
                if staggered {
                    i - self.plane
                } else {
                    i - self.plane + 1
                }
            }
        }
    }
}

fn apply_face(
    patch: &mut Patch<f64>,
    geom: &LevelGeometry,
    location: MeshLocation,
    table: &BcTable,
    time: f64,
    face: DomainFace,
) {
    let domain = geom.domain_box_for(location);
    let a = face.axis().index();
    let side = face.side();
    let staggered = location.staggered()[a];
    let bounds = patch.bounds();

    // 域外鬼层条带（切向取存储盒全宽）
    let mut lo = bounds.lo();
    let mut hi = bounds.hi();
    match side {
        Side::Low => hi[a] = hi[a].min(domain.lo()[a]),
        Side::High => lo[a] = lo[a].max(domain.hi()[a]),
    }
    let strip = GridBox::new(lo, hi);
    if strip.is_empty() {
        return;
    }

    let idx = FaceIndexer::new(face, &domain, staggered);
    let at = |iv: IVec3, i: i32| {
        let mut jv = iv;
        jv[a] = i;
        jv
    };

    for comp in 0..table.ncomp() {
        let bc = table.math_bc(comp, face);
        if bc == MathBc::Interior {
            continue;
        }
        // Dirichlet 的边界值：剖面求值或常数
        let bc_value = |patch_pos: IVec3| -> f64 {
            match table.profile(face) {
                Some(profile) => {
                    let mut pos = geom.position(patch_pos, location);
                    pos[a] = geom.face_coordinate(face);
                    profile.evaluate(pos, time, comp)
                }
                None => table.value(face, comp),
            }
        };

        for iv in strip.iter() {
            let i = iv[a];
            let val = match bc {
                MathBc::Interior => unreachable!(),
                MathBc::Dirichlet => bc_value(iv),
                MathBc::Neumann | MathBc::FirstOrderExtrap => patch.get(at(iv, idx.first), comp),
                MathBc::ReflectOdd => {
                    let m = idx.mirror(i, staggered);
                    2.0 * table.value(face, comp) - patch.get(at(iv, m), comp)
                }
                MathBc::ReflectEven => {
                    let m = idx.mirror(i, staggered);
                    patch.get(at(iv, m), comp)
                }
                MathBc::HighOrderExtrap => {
                    let g = idx.depth(i, side, staggered) as f64;
                    let first = patch.get(at(iv, idx.first), comp);
                    // 只看边界轴：次近索引须同时落在域内和存储盒内
                    let second_ok = idx.second >= domain.lo()[a].max(bounds.lo()[a])
                        && idx.second < domain.hi()[a].min(bounds.hi()[a]);
                    if second_ok {
                        let second = patch.get(at(iv, idx.second), comp);
                        (1.0 + g) * first - g * second
                    } else {
                        // 域或存储盒太薄时退化为一阶外推
                        first
                    }
                }
            };
            patch.set(iv, comp, val);
        }

        // 错位法向的边界平面本身也由边界规则确定
        if staggered && matches!(bc, MathBc::Dirichlet | MathBc::ReflectOdd) {
            let mut plo = bounds.lo();
            let mut phi = bounds.hi();
            plo[a] = idx.plane;
            phi[a] = idx.plane + 1;
            if let Some(plane_box) = bounds.intersect(&GridBox::new(plo, phi)) {
                for iv in plane_box.iter() {
                    let val = match bc {
                        MathBc::Dirichlet => bc_value(iv),
                        _ => table.value(face, comp),
                    };
                    patch.set(iv, comp, val);
                }
            }
        }
    }
}

// ============================================================================
// 测试
// ============================================================================
