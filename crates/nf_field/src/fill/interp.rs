// crates/nf_field/src/fill/interp.rs

//! 粗细层空间插值算子
//!
//! 算子在场注册时选定一次，引擎生命周期内固定（兄弟场联合填充
//! 可单独传入一次性覆盖）。守恒型单元插值满足往返性质：细层
//! 子单元平均回粗层精确还原粗层值。
//!
//! # 算子一览
//!
//! - [`InterpScheme::PiecewiseConstant`]: 注入（整数掩码场的固定规则）
//! - [`InterpScheme::CellConsLinear`]: 守恒限斜率线性（单元场默认）
//! - [`InterpScheme::NodeBilinear`]: 节点（三）线性（节点场默认）
//! - [`InterpScheme::FaceLinear`]: 错位面线性（面场默认）
//! - [`InterpScheme::FaceDivFree`]: 面线性 + 散度残差回路，
//!   每个细单元的散度等于其父粗单元（兄弟场联合填充专用）

use crate::error::FieldError;
use glam::{DVec3, IVec3};
use nf_foundation::{Axis, MeshLocation};
use nf_mesh::{GridBox, Patch};

/// 粗细层插值算子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InterpScheme {
    /// 分段常数注入
    PiecewiseConstant,
    /// 守恒限斜率线性（minmod 限制的中心斜率）
    #[default]
    CellConsLinear,
    /// 节点三线性
    NodeBilinear,
    /// 错位面线性（共面限斜率，层间线性混合）
    FaceLinear,
    /// 散度保持的面插值
    FaceDivFree,
}

impl InterpScheme {
    /// 配置键名
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            InterpScheme::PiecewiseConstant => "piecewise_constant",
            InterpScheme::CellConsLinear => "cell_cons_linear",
            InterpScheme::NodeBilinear => "node_bilinear",
            InterpScheme::FaceLinear => "face_linear",
            InterpScheme::FaceDivFree => "face_div_free",
        }
    }

    /// 从配置选择子解析，未知选择子为致命配置错误
    pub fn from_name(name: &str) -> Result<Self, FieldError> {
        match name {
            "piecewise_constant" => Ok(Self::PiecewiseConstant),
            "cell_cons_linear" => Ok(Self::CellConsLinear),
            "node_bilinear" => Ok(Self::NodeBilinear),
            "face_linear" => Ok(Self::FaceLinear),
            "face_div_free" => Ok(Self::FaceDivFree),
            _ => Err(FieldError::UnknownInterpScheme {
                value: name.to_string(),
            }),
        }
    }

    /// 某网格位置的默认算子
    pub fn default_for(location: MeshLocation) -> Self {
        match location {
            MeshLocation::Cell => Self::CellConsLinear,
            MeshLocation::Node => Self::NodeBilinear,
            _ => Self::FaceLinear,
        }
    }
}

/// minmod 限制的中心斜率
///
/// 单调区间内取中心差分并以 2 倍单侧差分为界；跨极值取零。
/// 线性数据下三个差分相等，斜率精确。
#[inline]
fn limited_slope(backward: f64, forward: f64) -> f64 {
    if forward * backward <= 0.0 {
        return 0.0;
    }
    let central = 0.5 * (forward + backward);
    central
        .abs()
        .min(2.0 * forward.abs())
        .min(2.0 * backward.abs())
        .copysign(central)
}

/// 某轴上粗单元 `k` 处的限斜率，邻居越界时取零
#[inline]
fn slope_at(coarse: &Patch<f64>, k: IVec3, comp: usize, axis: Axis) -> f64 {
    let mut lo = k;
    let mut hi = k;
    lo[axis.index()] -= 1;
    hi[axis.index()] += 1;
    if !coarse.bounds().contains(lo) || !coarse.bounds().contains(hi) {
        return 0.0;
    }
    let c = coarse.get(k, comp);
    limited_slope(c - coarse.get(lo, comp), coarse.get(hi, comp) - c)
}

/// 细索引在父粗单元内的归一化偏移（子单元偏移和为零，保证守恒）
#[inline]
fn child_offset(m: i32, ratio: i32) -> f64 {
    (2 * m + 1) as f64 / (2 * ratio) as f64 - 0.5
}

/// 将粗层数据插值到细层分块的 `region`（细层该位置索引空间）
///
/// `coarse` 必须覆盖 `region` 粗化后再生长一层（斜率模板）。
pub(crate) fn interp_patch(
    scheme: InterpScheme,
    fine: &mut Patch<f64>,
    region: &GridBox,
    coarse: &Patch<f64>,
    ratio: i32,
    location: MeshLocation,
) {
    match scheme {
        InterpScheme::PiecewiseConstant => {
            for comp in 0..fine.ncomp() {
                for iv in region.iter() {
                    let k = IVec3::new(
                        iv.x.div_euclid(ratio),
                        iv.y.div_euclid(ratio),
                        iv.z.div_euclid(ratio),
                    );
                    fine.set(iv, comp, coarse.get(k, comp));
                }
            }
        }
        InterpScheme::CellConsLinear => interp_cell_cons_linear(fine, region, coarse, ratio),
        InterpScheme::NodeBilinear => interp_node_bilinear(fine, region, coarse, ratio),
        InterpScheme::FaceLinear | InterpScheme::FaceDivFree => {
            let axis = location
                .face_axis()
                .expect("面插值算子要求错位面网格位置");
            interp_face_linear(fine, region, coarse, ratio, axis);
        }
    }
}

/// 守恒限斜率线性插值
///
/// fine = coarse + Σ slope_a · off_a；子偏移对称和零，
/// 2³ 个子单元平均严格还原粗层值。
fn interp_cell_cons_linear(fine: &mut Patch<f64>, region: &GridBox, coarse: &Patch<f64>, ratio: i32) {
    for comp in 0..fine.ncomp() {
        for iv in region.iter() {
            let k = IVec3::new(
                iv.x.div_euclid(ratio),
                iv.y.div_euclid(ratio),
                iv.z.div_euclid(ratio),
            );
            let mut val = coarse.get(k, comp);
            for axis in Axis::ALL {
                let a = axis.index();
                let m = iv[a] - k[a] * ratio;
                val += slope_at(coarse, k, comp, axis) * child_offset(m, ratio);
            }
            fine.set(iv, comp, val);
        }
    }
}

/// 节点三线性插值：重合节点直接拷贝，其余按周围 8 个粗节点加权
fn interp_node_bilinear(fine: &mut Patch<f64>, region: &GridBox, coarse: &Patch<f64>, ratio: i32) {
    for comp in 0..fine.ncomp() {
        for iv in region.iter() {
            let k = IVec3::new(
                iv.x.div_euclid(ratio),
                iv.y.div_euclid(ratio),
                iv.z.div_euclid(ratio),
            );
            let t = DVec3::new(
                (iv.x - k.x * ratio) as f64 / ratio as f64,
                (iv.y - k.y * ratio) as f64 / ratio as f64,
                (iv.z - k.z * ratio) as f64 / ratio as f64,
            );
            let mut val = 0.0;
            for corner in GridBox::new(IVec3::ZERO, IVec3::splat(2)).iter() {
                let w = (0..3)
                    .map(|a| if corner[a] == 1 { t[a] } else { 1.0 - t[a] })
                    .product::<f64>();
                if w != 0.0 {
                    val += w * coarse.get(k + corner, comp);
                }
            }
            fine.set(iv, comp, val);
        }
    }
}

/// 某粗面平面内（切向两轴）的守恒限斜率插值
fn face_plane_value(
    coarse: &Patch<f64>,
    comp: usize,
    normal: Axis,
    plane: i32,
    iv: IVec3,
    ratio: i32,
) -> f64 {
    let mut k = IVec3::new(
        iv.x.div_euclid(ratio),
        iv.y.div_euclid(ratio),
        iv.z.div_euclid(ratio),
    );
    k[normal.index()] = plane;
    let mut val = coarse.get(k, comp);
    for axis in normal.tangential() {
        let a = axis.index();
        let m = iv[a] - k[a] * ratio;
        val += slope_at(coarse, k, comp, axis) * child_offset(m, ratio);
    }
    val
}

/// 错位面线性插值
///
/// 与粗面重合的平面做面内限斜率插值（守恒形式：细面平均还原
/// 粗面值）；层间平面按法向线性混合两侧粗平面。
fn interp_face_linear(
    fine: &mut Patch<f64>,
    region: &GridBox,
    coarse: &Patch<f64>,
    ratio: i32,
    normal: Axis,
) {
    let n = normal.index();
    for comp in 0..fine.ncomp() {
        for iv in region.iter() {
            let kn = iv[n].div_euclid(ratio);
            let m = iv[n] - kn * ratio;
            let val = if m == 0 {
                face_plane_value(coarse, comp, normal, kn, iv, ratio)
            } else {
                let t = m as f64 / ratio as f64;
                let lo = face_plane_value(coarse, comp, normal, kn, iv, ratio);
                let hi = face_plane_value(coarse, comp, normal, kn + 1, iv, ratio);
                (1.0 - t) * lo + t * hi
            };
            fine.set(iv, comp, val);
        }
    }
}

// ============================================================================
// 散度保持的面插值（兄弟场联合填充）
// ============================================================================

/// 面法向三兄弟场的散度保持插值（细化比固定为 2）
///
/// 先对三个分量做 [`InterpScheme::FaceLinear`]，再在每个粗单元内
/// 做三次轴向扫掠，把细单元散度残差路由到 12 个内部细面上。
/// 共面细面的面内插值为守恒形式，残差在粗单元内自动和零，
/// 扫掠结束后每个细单元的散度严格等于其父粗单元的散度。
pub(crate) fn interp_face_divfree(
    fine: [&mut Patch<f64>; 3],
    cell_region: &GridBox,
    coarse: [&Patch<f64>; 3],
    spacing: DVec3,
) {
    let ratio = 2;
    let [fx, fy, fz] = fine;
    debug_assert!(fx.ncomp() == 1 && fy.ncomp() == 1 && fz.ncomp() == 1);

    interp_face_linear(fx, &cell_region.staggered_for(MeshLocation::XFace), coarse[0], ratio, Axis::X);
    interp_face_linear(fy, &cell_region.staggered_for(MeshLocation::YFace), coarse[1], ratio, Axis::Y);
    interp_face_linear(fz, &cell_region.staggered_for(MeshLocation::ZFace), coarse[2], ratio, Axis::Z);

    let div_fine = |fx: &Patch<f64>, fy: &Patch<f64>, fz: &Patch<f64>, c: IVec3| -> f64 {
        (fx.get(c + IVec3::X, 0) - fx.get(c, 0)) / spacing.x
            + (fy.get(c + IVec3::Y, 0) - fy.get(c, 0)) / spacing.y
            + (fz.get(c + IVec3::Z, 0) - fz.get(c, 0)) / spacing.z
    };

    for k in cell_region.coarsen(ratio).iter() {
        let children = GridBox::from_size(k * ratio, IVec3::splat(ratio));
        if !cell_region.contains_box(&children) {
            continue; // 残缺粗单元留给邻接分块/物理边界处理
        }
        let base = k * ratio;

        // 父粗单元散度（粗间距 = 2 倍细间距）
        let target = (coarse[0].get(k + IVec3::X, 0) - coarse[0].get(k, 0)) / (2.0 * spacing.x)
            + (coarse[1].get(k + IVec3::Y, 0) - coarse[1].get(k, 0)) / (2.0 * spacing.y)
            + (coarse[2].get(k + IVec3::Z, 0) - coarse[2].get(k, 0)) / (2.0 * spacing.z);

        // 残差 e[i][j][k] = 细单元散度 - 目标
        let mut e = [[[0.0_f64; 2]; 2]; 2];
        for c in GridBox::new(IVec3::ZERO, IVec3::splat(2)).iter() {
            e[c.x as usize][c.y as usize][c.z as usize] =
                div_fine(fx, fy, fz, base + c) - target;
        }

        // X 扫掠：调整内部 X 面使每对单元残差均衡
        for j in 0..2 {
            for kk in 0..2 {
                let (e0, e1) = (e[0][j][kk], e[1][j][kk]);
                let delta = spacing.x * (e1 - e0) * 0.5;
                let f = base + IVec3::new(1, j as i32, kk as i32);
                fx.set(f, 0, fx.get(f, 0) + delta);
                let avg = 0.5 * (e0 + e1);
                e[0][j][kk] = avg;
                e[1][j][kk] = avg;
            }
        }
        // Y 扫掠
        for i in 0..2 {
            for kk in 0..2 {
                let (e0, e1) = (e[i][0][kk], e[i][1][kk]);
                let delta = spacing.y * (e1 - e0) * 0.5;
                let f = base + IVec3::new(i as i32, 1, kk as i32);
                fy.set(f, 0, fy.get(f, 0) + delta);
                let avg = 0.5 * (e0 + e1);
                e[i][0][kk] = avg;
                e[i][1][kk] = avg;
            }
        }
        // Z 扫掠：扫掠后全部残差等于粗单元内均值（守恒形式下为零）
        for i in 0..2 {
            for j in 0..2 {
                let (e0, e1) = (e[i][j][0], e[i][j][1]);
                let delta = spacing.z * (e1 - e0) * 0.5;
                let f = base + IVec3::new(i as i32, j as i32, 1);
                fz.set(f, 0, fz.get(f, 0) + delta);
                let avg = 0.5 * (e0 + e1);
                e[i][j][0] = avg;
                e[i][j][1] = avg;
            }
        }
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// 粗层 4³ 单元（生长 1 层模板），线性场 f = a + b·i + c·j + d·k
    fn linear_coarse(a: f64, b: f64, c: f64, d: f64) -> Patch<f64> {
        let mut p = Patch::new(GridBox::cube(4).grow(1), 1);
        for iv in p.bounds().iter() {
            p.set(iv, 0, a + b * iv.x as f64 + c * iv.y as f64 + d * iv.z as f64);
        }
        p
    }

    #[test]
    fn test_from_name() {
        assert_eq!(
            InterpScheme::from_name("cell_cons_linear").unwrap(),
            InterpScheme::CellConsLinear
        );
        assert!(InterpScheme::from_name("cubic_spline").is_err());
    }

    #[test]
    fn test_default_for_location() {
        assert_eq!(
            InterpScheme::default_for(MeshLocation::Cell),
            InterpScheme::CellConsLinear
        );
        assert_eq!(
            InterpScheme::default_for(MeshLocation::Node),
            InterpScheme::NodeBilinear
        );
        assert_eq!(
            InterpScheme::default_for(MeshLocation::YFace),
            InterpScheme::FaceLinear
        );
    }

    #[test]
    fn test_limited_slope() {
        // 线性：斜率精确
        assert!((limited_slope(1.0, 1.0) - 1.0).abs() < 1e-14);
        // 极值：斜率为零
        assert_eq!(limited_slope(1.0, -1.0), 0.0);
        // 陡峭单侧：被 2 倍单侧差分限制
        assert!((limited_slope(0.1, 10.0) - 0.2).abs() < 1e-14);
    }

    #[test]
    fn test_piecewise_constant() {
        let coarse = linear_coarse(0.0, 1.0, 0.0, 0.0);
        let region = GridBox::cube(8);
        let mut fine = Patch::new(region, 1);
        interp_patch(
            InterpScheme::PiecewiseConstant,
            &mut fine,
            &region,
            &coarse,
            2,
            MeshLocation::Cell,
        );
        assert_eq!(fine.get(IVec3::new(4, 0, 0), 0), coarse.get(IVec3::new(2, 0, 0), 0));
        assert_eq!(fine.get(IVec3::new(5, 0, 0), 0), coarse.get(IVec3::new(2, 0, 0), 0));
    }

    #[test]
    fn test_cell_cons_linear_exact_for_linear() {
        // 粗单元中心值 a + b·(i+1/2)·h 对应线性场；细层应精确还原同一条斜坡
        let coarse = linear_coarse(0.0, 2.0, -1.0, 0.5);
        let region = GridBox::cube(8);
        let mut fine = Patch::new(region, 1);
        interp_patch(
            InterpScheme::CellConsLinear,
            &mut fine,
            &region,
            &coarse,
            2,
            MeshLocation::Cell,
        );
        // 细单元 (i) 的中心在粗索引坐标系下为 (i + 0.5)/2 - 0.5 + k
        for iv in region.iter() {
            let expect = 2.0 * ((iv.x as f64 + 0.5) / 2.0 - 0.5)
                - 1.0 * ((iv.y as f64 + 0.5) / 2.0 - 0.5)
                + 0.5 * ((iv.z as f64 + 0.5) / 2.0 - 0.5);
            assert!(
                (fine.get(iv, 0) - expect).abs() < 1e-12,
                "细单元 {iv:?}: {} != {expect}",
                fine.get(iv, 0)
            );
        }
    }

    #[test]
    fn test_cell_cons_linear_roundtrip() {
        // 守恒往返：8 个子单元平均严格还原粗层值
        let mut coarse = Patch::new(GridBox::cube(4).grow(1), 1);
        for (n, iv) in coarse.bounds().iter().enumerate() {
            coarse.set(iv, 0, (n as f64 * 0.37).sin() * 5.0);
        }
        let region = GridBox::cube(8);
        let mut fine = Patch::new(region, 1);
        interp_patch(
            InterpScheme::CellConsLinear,
            &mut fine,
            &region,
            &coarse,
            2,
            MeshLocation::Cell,
        );
        for k in GridBox::cube(4).iter() {
            let mut sum = 0.0;
            for c in GridBox::from_size(k * 2, IVec3::splat(2)).iter() {
                sum += fine.get(c, 0);
            }
            assert!(
                (sum / 8.0 - coarse.get(k, 0)).abs() < 1e-12,
                "粗单元 {k:?} 往返失败"
            );
        }
    }

    #[test]
    fn test_node_bilinear_exact_for_linear() {
        // 节点值 = 线性函数的节点采样
        let mut coarse = Patch::new(GridBox::cube(4).staggered_for(MeshLocation::Node).grow(1), 1);
        for iv in coarse.bounds().iter() {
            coarse.set(iv, 0, 3.0 * iv.x as f64 + iv.y as f64 - 2.0 * iv.z as f64);
        }
        let region = GridBox::cube(8).staggered_for(MeshLocation::Node);
        let mut fine = Patch::new(region, 1);
        interp_patch(
            InterpScheme::NodeBilinear,
            &mut fine,
            &region,
            &coarse,
            2,
            MeshLocation::Node,
        );
        for iv in region.iter() {
            let expect = (3.0 * iv.x as f64 + iv.y as f64 - 2.0 * iv.z as f64) / 2.0;
            assert!((fine.get(iv, 0) - expect).abs() < 1e-12);
        }
    }

    #[test]
    fn test_face_linear_coincident_planes() {
        // X 面场沿 y 线性：重合平面面内插值应精确
        let cbounds = GridBox::cube(4).staggered_for(MeshLocation::XFace).grow(1);
        let mut coarse = Patch::new(cbounds, 1);
        for iv in cbounds.iter() {
            coarse.set(iv, 0, iv.y as f64 + 0.5); // 粗面切向中心
        }
        let region = GridBox::cube(8).staggered_for(MeshLocation::XFace);
        let mut fine = Patch::new(region, 1);
        interp_patch(
            InterpScheme::FaceLinear,
            &mut fine,
            &region,
            &coarse,
            2,
            MeshLocation::XFace,
        );
        // 细面 (0, j, k) 在粗切向坐标 (j+0.5)/2
        for j in 0..8 {
            let got = fine.get(IVec3::new(0, j, 0), 0);
            let expect = (j as f64 + 0.5) / 2.0 - 0.5 + 0.5;
            assert!((got - expect).abs() < 1e-12, "j={j}: {got} != {expect}");
        }
    }

    #[test]
    fn test_face_divfree_preserves_divergence() {
        // 离散无散场: ux = y, uy = -x, uz = 0
        let spacing = DVec3::splat(0.25);
        let make = |loc: MeshLocation, f: &dyn Fn(IVec3) -> f64| {
            let bounds = GridBox::cube(4).staggered_for(loc).grow(1);
            let mut p = Patch::new(bounds, 1);
            for iv in bounds.iter() {
                p.set(iv, 0, f(iv));
            }
            p
        };
        let cx = make(MeshLocation::XFace, &|iv| iv.y as f64 + 0.5);
        let cy = make(MeshLocation::YFace, &|iv| -(iv.x as f64 + 0.5));
        let cz = make(MeshLocation::ZFace, &|_| 0.0);

        let cells = GridBox::cube(8);
        let mut fx = Patch::new(cells.staggered_for(MeshLocation::XFace), 1);
        let mut fy = Patch::new(cells.staggered_for(MeshLocation::YFace), 1);
        let mut fz = Patch::new(cells.staggered_for(MeshLocation::ZFace), 1);

        interp_face_divfree(
            [&mut fx, &mut fy, &mut fz],
            &cells,
            [&cx, &cy, &cz],
            spacing / 2.0,
        );

        let hf = spacing / 2.0;
        for c in cells.iter() {
            let div = (fx.get(c + IVec3::X, 0) - fx.get(c, 0)) / hf.x
                + (fy.get(c + IVec3::Y, 0) - fy.get(c, 0)) / hf.y
                + (fz.get(c + IVec3::Z, 0) - fz.get(c, 0)) / hf.z;
            assert!(div.abs() < 1e-11, "细单元 {c:?} 散度 {div} 非零");
        }
    }
}
