// crates/nf_field/src/fill/fillpatch.rs

//! 填充流程编排
//!
//! 场仓库各填充操作的核心实现，对分块集合而非场句柄工作：
//!
//! - 单层填充: 层内交换 + 物理边界
//! - 两层填充: 粗层汇集 → 插值到细层全存储盒 → 覆盖细层有效
//!   数据 → 细层物理边界
//! - 入流刷新: 只改入流朝向的鬼层
//!
//! 粗层数据按现状读取，从不递归填充；两层填充中物理边界函数子
//! 在粗细两套几何上各应用一次，保证界面两侧的边界一致性。

use crate::boundary::BcTable;
use crate::error::FieldError;
use glam::IVec3;
use nf_foundation::MeshLocation;
use nf_mesh::{GridBox, LevelGeometry, Patch, PatchSet};
use rayon::prelude::*;

use super::exchange::exchange_ghosts;
use super::interp::{interp_face_divfree, interp_patch, InterpScheme};
use super::physbc::{apply_phys_bc_patch, apply_phys_bc_set};
use super::MIN_PARALLEL_PATCHES;

// ============================================================================
// 填充规则
// ============================================================================

/// 真填充引擎的配置（注册时选定，场生命周期内固定）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillPatchConfig {
    /// 粗细层插值算子
    pub interp: InterpScheme,
}

impl FillPatchConfig {
    /// 用指定插值算子创建
    pub fn new(interp: InterpScheme) -> Self {
        Self { interp }
    }

    /// 按网格位置的默认算子创建
    pub fn default_for(location: MeshLocation) -> Self {
        Self {
            interp: InterpScheme::default_for(location),
        }
    }

    /// 从配置选择子创建
    pub fn from_scheme_name(name: &str) -> Result<Self, FieldError> {
        Ok(Self {
            interp: InterpScheme::from_name(name)?,
        })
    }
}

/// 场的填充规则，注册后固定
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillRule {
    /// 真填充引擎：交换、插值、物理边界
    Patch(FillPatchConfig),
    /// 每次填充把整个区域（含鬼层）置为常数
    ConstScalar(f64),
    /// 填充为空操作（源项类场）
    Null,
}

// ============================================================================
// 单层填充
// ============================================================================

/// 单层填充：层内交换（兄弟 + 周期）后应用物理边界
pub(crate) fn fill_single_level(
    set: &mut PatchSet<f64>,
    geom: &LevelGeometry,
    table: &BcTable,
    time: f64,
) {
    exchange_ghosts(set, geom, false);
    apply_phys_bc_set(set, geom, table, time);
}

/// 物理边界填充：只做周期回绕交换和边界函数子，不碰粗细界面
pub(crate) fn fill_phys_bc_only(
    set: &mut PatchSet<f64>,
    geom: &LevelGeometry,
    table: &BcTable,
    time: f64,
) {
    exchange_ghosts(set, geom, true);
    apply_phys_bc_set(set, geom, table, time);
}

// ============================================================================
// 粗层汇集
// ============================================================================

/// 把粗层有效数据（含周期镜像）汇集到覆盖 `need_cells` 的临时分块，
/// 并在粗层几何上应用物理边界
///
/// `need_cells` 为粗层单元盒，通常是细层目标区域粗化后再生长一层
/// （插值斜率模板）。未被粗层覆盖且在域内的部分保持零——合法嵌套
/// 的层级结构不会出现这种区域。
pub(crate) fn gather_coarse(
    coarse: &PatchSet<f64>,
    coarse_geom: &LevelGeometry,
    need_cells: GridBox,
    table: &BcTable,
    time: f64,
) -> Patch<f64> {
    let location = coarse.location();
    let bounds = need_cells.staggered_for(location);
    let mut tmp = Patch::new(bounds, coarse.ncomp());

    let mut shifts = vec![IVec3::ZERO];
    shifts.extend(coarse_geom.periodic_shifts());
    for &shift in &shifts {
        for j in 0..coarse.num_patches() {
            let src_valid = coarse.valid_region(j).shift(shift);
            if let Some(region) = bounds.intersect(&src_valid) {
                tmp.copy_shifted(coarse.patch(j), &region, shift);
            }
        }
    }
    apply_phys_bc_patch(&mut tmp, coarse_geom, location, table, time);
    tmp
}

// ============================================================================
// 两层填充
// ============================================================================

/// 两层填充：粗层插值到细层全存储盒，可选覆盖细层有效数据，
/// 最后在细层几何上应用物理边界
///
/// `overlay` 为真时走 fillpatch 路径（细层已有数据优先），为假时
/// 走 fillpatch_from_coarse 路径（整个区域来自粗层）。覆盖快照在
/// 插值之前提取，插值不会污染覆盖源。
pub(crate) fn fill_two_level(
    fine: &mut PatchSet<f64>,
    fine_geom: &LevelGeometry,
    coarse: &PatchSet<f64>,
    coarse_geom: &LevelGeometry,
    table: &BcTable,
    time: f64,
    interp: InterpScheme,
    ratio: i32,
    overlay: bool,
) {
    let location = fine.location();
    let nghost = fine.nghost();
    let n = fine.num_patches();

    // 阶段一（只读）：逐目标分块汇集粗层模板和细层覆盖快照
    let mut shifts = vec![IVec3::ZERO];
    shifts.extend(fine_geom.periodic_shifts());
    let prep: Vec<(Patch<f64>, Vec<(GridBox, Vec<f64>)>)> = (0..n)
        .map(|i| {
            let target_cells = fine.valid_cells(i).grow(nghost);
            let need_cells = target_cells.coarsen(ratio).grow(1);
            let ctmp = gather_coarse(coarse, coarse_geom, need_cells, table, time);

            let mut overlays = Vec::new();
            if overlay {
                let dst_bounds = fine.patch(i).bounds();
                for &shift in &shifts {
                    for j in 0..n {
                        let src_valid = fine.valid_region(j).shift(shift);
                        let Some(region) = dst_bounds.intersect(&src_valid) else {
                            continue;
                        };
                        overlays.push((region, fine.patch(j).extract(&region.shift(-shift))));
                    }
                }
            }
            (ctmp, overlays)
        })
        .collect();

    // 阶段二（可变，按分块并行）：插值、覆盖、物理边界
    let patches = fine.patches_mut();
    let apply = |(patch, (ctmp, overlays)): (
        &mut Patch<f64>,
        (Patch<f64>, Vec<(GridBox, Vec<f64>)>),
    )| {
        let region = patch.bounds();
        interp_patch(interp, patch, &region, &ctmp, ratio, location);
        for (r, data) in &overlays {
            patch.paste(r, data);
        }
        apply_phys_bc_patch(patch, fine_geom, location, table, time);
    };
    if patches.len() >= MIN_PARALLEL_PATCHES {
        patches.par_iter_mut().zip(prep).for_each(apply);
    } else {
        patches.iter_mut().zip(prep).for_each(apply);
    }
}

// ============================================================================
// 兄弟场联合填充
// ============================================================================

/// 三个面法向兄弟场的两层联合填充
///
/// `FaceDivFree` 需要三个分量联合求解残差路由，其余算子退化为
/// 三次独立插值。细化比为 2 时才允许 `FaceDivFree`（残差路由的
/// 扫掠结构按 2³ 子单元写死）。
#[allow(clippy::too_many_arguments)]
pub(crate) fn fill_two_level_siblings(
    fine: [&mut PatchSet<f64>; 3],
    fine_geom: &LevelGeometry,
    coarse: [&PatchSet<f64>; 3],
    coarse_geom: &LevelGeometry,
    tables: [&BcTable; 3],
    time: f64,
    interp: InterpScheme,
    ratio: i32,
) {
    assert!(
        interp != InterpScheme::FaceDivFree || ratio == 2,
        "散度保持插值只支持细化比 2, 实际 {ratio}"
    );
    let [fx, fy, fz] = fine;
    debug_assert_eq!(fx.location(), MeshLocation::XFace);
    debug_assert_eq!(fy.location(), MeshLocation::YFace);
    debug_assert_eq!(fz.location(), MeshLocation::ZFace);
    debug_assert!(fx.nghost() == fy.nghost() && fy.nghost() == fz.nghost());

    let nghost = fx.nghost();
    let n = fx.num_patches();
    let mut shifts = vec![IVec3::ZERO];
    shifts.extend(fine_geom.periodic_shifts());

    // 逐目标分块：三个分量的粗层模板和覆盖快照
    type Prep = ([Patch<f64>; 3], [Vec<(GridBox, Vec<f64>)>; 3]);
    let prep: Vec<Prep> = (0..n)
        .map(|i| {
            let target_cells = fx.valid_cells(i).grow(nghost);
            let need_cells = target_cells.coarsen(ratio).grow(1);
            let ctmp = std::array::from_fn(|a| {
                gather_coarse(coarse[a], coarse_geom, need_cells, tables[a], time)
            });
            let sets = [&*fx, &*fy, &*fz];
            let overlays = std::array::from_fn(|a| {
                let set = sets[a];
                let dst_bounds = set.patch(i).bounds();
                let mut ops = Vec::new();
                for &shift in &shifts {
                    for j in 0..n {
                        let src_valid = set.valid_region(j).shift(shift);
                        let Some(region) = dst_bounds.intersect(&src_valid) else {
                            continue;
                        };
                        ops.push((region, set.patch(j).extract(&region.shift(-shift))));
                    }
                }
                ops
            });
            (ctmp, overlays)
        })
        .collect();

    // 可变阶段：三个集合并行拉链，逐分块插值、覆盖、物理边界
    let spacing = fine_geom.spacing();
    // 有效盒在可变借用期间仍需查询，先快照
    let valid: Vec<GridBox> = (0..n).map(|i| fx.valid_cells(i)).collect();

    let apply = |i: usize,
                 px: &mut Patch<f64>,
                 py: &mut Patch<f64>,
                 pz: &mut Patch<f64>,
                 (ctmp, overlays): &Prep| {
        let target_cells = valid[i].grow(nghost);
        if interp == InterpScheme::FaceDivFree {
            interp_face_divfree(
                [&mut *px, &mut *py, &mut *pz],
                &target_cells,
                [&ctmp[0], &ctmp[1], &ctmp[2]],
                spacing,
            );
        } else {
            let locs = [MeshLocation::XFace, MeshLocation::YFace, MeshLocation::ZFace];
            for (a, p) in [&mut *px, &mut *py, &mut *pz].into_iter().enumerate() {
                let region = p.bounds();
                interp_patch(interp, p, &region, &ctmp[a], ratio, locs[a]);
            }
        }
        for (a, p) in [px, py, pz].into_iter().enumerate() {
            for (r, data) in &overlays[a] {
                p.paste(r, data);
            }
        }
    };

    {
        let px = fx.patches_mut();
        let py = fy.patches_mut();
        let pz = fz.patches_mut();
        if n >= MIN_PARALLEL_PATCHES {
            px.par_iter_mut()
                .zip(py.par_iter_mut())
                .zip(pz.par_iter_mut())
                .zip(&prep)
                .enumerate()
                .for_each(|(i, (((x, y), z), p))| apply(i, x, y, z, p));
        } else {
            for (i, ((x, y), z)) in px.iter_mut().zip(py.iter_mut()).zip(pz.iter_mut()).enumerate()
            {
                apply(i, x, y, z, &prep[i]);
            }
        }
    }

    apply_phys_bc_set(fx, fine_geom, tables[0], time);
    apply_phys_bc_set(fy, fine_geom, tables[1], time);
    apply_phys_bc_set(fz, fine_geom, tables[2], time);
}

// ============================================================================
// 入流刷新
// ============================================================================

/// 只刷新入流朝向的鬼层，其余鬼层不动
///
/// 条带取周期生长后的域的外侧邻接区（错位法向时含边界平面本身），
/// 覆盖入流面切向的周期鬼单元。
pub(crate) fn set_inflow_set(
    set: &mut PatchSet<f64>,
    geom: &LevelGeometry,
    table: &BcTable,
    time: f64,
) {
    let location = set.location();
    let nghost = set.nghost();
    let grown = geom.grow_periodic(nghost);

    for face in table.inflow_faces() {
        let strip = grown.adjacent_cells(face, nghost).staggered_for(location);
        let a = face.axis().index();
        for i in 0..set.num_patches() {
            let patch = set.patch_mut(i);
            let Some(region) = patch.bounds().intersect(&strip) else {
                continue;
            };
            for comp in 0..table.ncomp() {
                if table.math_bc(comp, face) != crate::boundary::MathBc::Dirichlet {
                    continue;
                }
                for iv in region.iter() {
                    let val = match table.profile(face) {
                        Some(profile) => {
                            let mut pos = geom.position(iv, location);
                            pos[a] = geom.face_coordinate(face);
                            profile.evaluate(pos, time, comp)
                        }
                        None => table.value(face, comp),
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
