// crates/nf_mesh/src/geometry.rs

//! 层级几何
//!
//! [`LevelGeometry`] 描述一个 AMR 层级的索引域、物理坐标映射和
//! 周期性。细化/粗化生成相邻层级的几何；周期平移枚举供鬼层
//! 交换使用。[`DomainConfig`] 是计算域的配置入口。

use crate::{GridBox, MeshError, PatchLayout};
use glam::{DVec3, IVec3};
use nf_foundation::{Axis, DomainFace, MeshLocation, NfError, NfResult, Side};
use serde::{Deserialize, Serialize};

/// 一个 AMR 层级的几何描述
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelGeometry {
    domain: GridBox,
    origin: DVec3,
    spacing: DVec3,
    periodic: [bool; 3],
}

impl LevelGeometry {
    /// 创建层级几何
    ///
    /// `origin` 为 `domain.lo()` 单元低角点的物理坐标。
    pub fn new(domain: GridBox, origin: DVec3, spacing: DVec3, periodic: [bool; 3]) -> Self {
        debug_assert!(!domain.is_empty(), "计算域不能为空");
        debug_assert!(
            spacing.x > 0.0 && spacing.y > 0.0 && spacing.z > 0.0,
            "网格间距必须为正"
        );
        Self {
            domain,
            origin,
            spacing,
            periodic,
        }
    }

    /// 计算域单元盒
    #[inline]
    pub fn domain(&self) -> GridBox {
        self.domain
    }

    /// 指定网格位置的计算域索引盒
    #[inline]
    pub fn domain_box_for(&self, location: MeshLocation) -> GridBox {
        self.domain.staggered_for(location)
    }

    /// 原点物理坐标
    #[inline]
    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    /// 单元间距
    #[inline]
    pub fn spacing(&self) -> DVec3 {
        self.spacing
    }

    /// 某轴是否周期
    #[inline]
    pub fn is_periodic(&self, axis: Axis) -> bool {
        self.periodic[axis.index()]
    }

    /// 三轴周期标志
    #[inline]
    pub fn periodic(&self) -> [bool; 3] {
        self.periodic
    }

    /// 细化一级（索引域放大、间距缩小）
    pub fn refine(&self, ratio: i32) -> LevelGeometry {
        LevelGeometry {
            domain: self.domain.refine(ratio),
            origin: self.origin,
            spacing: self.spacing / ratio as f64,
            periodic: self.periodic,
        }
    }

    /// 粗化一级
    pub fn coarsen(&self, ratio: i32) -> LevelGeometry {
        LevelGeometry {
            domain: self.domain.coarsen(ratio),
            origin: self.origin,
            spacing: self.spacing * ratio as f64,
            periodic: self.periodic,
        }
    }

    /// 索引在指定网格位置下的物理坐标
    ///
    /// 非错位轴取单元中心（偏移 0.5），错位轴取面/节点本身。
    pub fn position(&self, iv: IVec3, location: MeshLocation) -> DVec3 {
        let stag = location.staggered();
        let mut pos = DVec3::ZERO;
        for axis in Axis::ALL {
            let a = axis.index();
            let offset = if stag[a] { 0.0 } else { 0.5 };
            pos[a] = self.origin[a]
                + self.spacing[a] * ((iv[a] - self.domain.lo()[a]) as f64 + offset);
        }
        pos
    }

    /// 某外边界朝向所在平面的物理坐标（沿该朝向的轴）
    pub fn face_coordinate(&self, face: DomainFace) -> f64 {
        let a = face.axis().index();
        match face.side() {
            Side::Low => self.origin[a],
            Side::High => self.origin[a] + self.spacing[a] * self.domain.extent(face.axis()) as f64,
        }
    }

    /// 周期镜像平移枚举（单元索引单位，不含零平移）
    ///
    /// 沿每条周期轴取 `{-L, 0, +L}` 的组合，角点回绕由组合平移覆盖。
    pub fn periodic_shifts(&self) -> Vec<IVec3> {
        let mut shifts = vec![IVec3::ZERO];
        for axis in Axis::ALL {
            if !self.is_periodic(axis) {
                continue;
            }
            let ext = self.domain.extent(axis);
            let mut next = Vec::with_capacity(shifts.len() * 3);
            for s in &shifts {
                let mut plus = *s;
                let mut minus = *s;
                plus[axis.index()] += ext;
                minus[axis.index()] -= ext;
                next.push(*s);
                next.push(plus);
                next.push(minus);
            }
            shifts = next;
        }
        shifts.retain(|s| *s != IVec3::ZERO);
        shifts
    }

    /// 沿周期轴外扩 `n` 层后的单元盒
    ///
    /// 非周期轴不扩展；用于入流刷新时覆盖切向周期鬼层。
    pub fn grow_periodic(&self, n: i32) -> GridBox {
        let mut b = self.domain;
        for axis in Axis::ALL {
            if self.is_periodic(axis) {
                b = b.grow_axis(axis, n);
            }
        }
        b
    }
}

// ============================================================================
// 计算域配置
// ============================================================================

/// 计算域配置（启动时读取一次）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct DomainConfig {
    /// 各轴单元数
    pub cells: [i32; 3],
    /// 域原点物理坐标
    pub origin: [f64; 3],
    /// 各轴物理长度
    pub extents: [f64; 3],
    /// 各轴周期标志
    pub periodic: [bool; 3],
    /// 分块最大边长
    pub max_patch_size: i32,
    /// 层间细化比
    pub ref_ratio: i32,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            cells: [8, 8, 8],
            origin: [0.0; 3],
            extents: [1.0; 3],
            periodic: [false; 3],
            max_patch_size: 32,
            ref_ratio: 2,
        }
    }
}

impl DomainConfig {
    /// 从 JSON 文本解析并校验
    pub fn from_json(text: &str) -> NfResult<Self> {
        let cfg: DomainConfig = serde_json::from_str(text)
            .map_err(|e| NfError::config(format!("计算域配置解析失败: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// 校验配置有效性
    pub fn validate(&self) -> NfResult<()> {
        for (a, &n) in self.cells.iter().enumerate() {
            if n <= 0 {
                return Err(
                    MeshError::InvalidDomain(format!("轴 {a} 的单元数 {n} 必须为正")).into(),
                );
            }
        }
        for (a, &len) in self.extents.iter().enumerate() {
            if len <= 0.0 {
                return Err(
                    MeshError::InvalidDomain(format!("轴 {a} 的物理长度 {len} 必须为正")).into(),
                );
            }
        }
        if self.max_patch_size <= 0 {
            return Err(MeshError::InvalidPatchSize {
                value: self.max_patch_size,
            }
            .into());
        }
        if self.ref_ratio < 2 {
            return Err(NfError::invalid_config(
                "ref_ratio",
                self.ref_ratio.to_string(),
                "细化比必须 >= 2",
            ));
        }
        Ok(())
    }

    /// 构建最粗层级的几何与分块布局
    pub fn build_level0(&self) -> NfResult<(LevelGeometry, PatchLayout)> {
        self.validate()?;
        let domain = GridBox::from_size(
            IVec3::ZERO,
            IVec3::new(self.cells[0], self.cells[1], self.cells[2]),
        );
        let spacing = DVec3::new(
            self.extents[0] / self.cells[0] as f64,
            self.extents[1] / self.cells[1] as f64,
            self.extents[2] / self.cells[2] as f64,
        );
        let origin = DVec3::from_array(self.origin);
        let geometry = LevelGeometry::new(domain, origin, spacing, self.periodic);
        let layout = PatchLayout::chunk(domain, self.max_patch_size, 1);
        Ok((geometry, layout))
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn geom_8(periodic: [bool; 3]) -> LevelGeometry {
        LevelGeometry::new(GridBox::cube(8), DVec3::ZERO, DVec3::splat(0.125), periodic)
    }

    #[test]
    fn test_position_cell_center() {
        let g = geom_8([false; 3]);
        let p = g.position(IVec3::ZERO, MeshLocation::Cell);
        assert!((p.x - 0.0625).abs() < 1e-14);
        let p = g.position(IVec3::new(7, 0, 0), MeshLocation::Cell);
        assert!((p.x - (1.0 - 0.0625)).abs() < 1e-14);
    }

    #[test]
    fn test_position_staggered() {
        let g = geom_8([false; 3]);
        // X 面在法向落在面上，切向落在单元中心
        let p = g.position(IVec3::ZERO, MeshLocation::XFace);
        assert!((p.x - 0.0).abs() < 1e-14);
        assert!((p.y - 0.0625).abs() < 1e-14);
        // 最后一个 X 面与域右端重合
        let p = g.position(IVec3::new(8, 0, 0), MeshLocation::XFace);
        assert!((p.x - 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_face_coordinate() {
        let g = geom_8([false; 3]);
        assert!((g.face_coordinate(DomainFace::XLo) - 0.0).abs() < 1e-14);
        assert!((g.face_coordinate(DomainFace::ZHi) - 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_refine_coarsen() {
        let g = geom_8([true, false, false]);
        let f = g.refine(2);
        assert_eq!(f.domain(), GridBox::cube(16));
        assert!((f.spacing().x - 0.0625).abs() < 1e-14);
        assert!(f.is_periodic(Axis::X));

        let c = f.coarsen(2);
        assert_eq!(c.domain(), g.domain());
        assert!((c.spacing().x - g.spacing().x).abs() < 1e-14);
    }

    #[test]
    fn test_periodic_shifts() {
        let g = geom_8([false; 3]);
        assert!(g.periodic_shifts().is_empty());

        let g = geom_8([true, false, false]);
        let shifts = g.periodic_shifts();
        assert_eq!(shifts.len(), 2);
        assert!(shifts.contains(&IVec3::new(8, 0, 0)));
        assert!(shifts.contains(&IVec3::new(-8, 0, 0)));

        // 三轴全周期: 3^3 - 1 = 26 个镜像
        let g = geom_8([true; 3]);
        assert_eq!(g.periodic_shifts().len(), 26);
    }

    #[test]
    fn test_grow_periodic() {
        let g = geom_8([false, true, false]);
        let b = g.grow_periodic(2);
        assert_eq!(b.lo(), IVec3::new(0, -2, 0));
        assert_eq!(b.hi(), IVec3::new(8, 10, 8));
    }

    #[test]
    fn test_domain_config_build() {
        let cfg = DomainConfig {
            cells: [8, 8, 8],
            max_patch_size: 4,
            ..Default::default()
        };
        let (geom, layout) = cfg.build_level0().unwrap();
        assert_eq!(geom.domain(), GridBox::cube(8));
        assert!((geom.spacing().x - 0.125).abs() < 1e-14);
        assert_eq!(layout.num_patches(), 8);
    }

    #[test]
    fn test_domain_config_validation() {
        let cfg = DomainConfig {
            cells: [0, 8, 8],
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = DomainConfig {
            ref_ratio: 1,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_domain_config_unknown_key() {
        let text = r#"{"cells": [4, 4, 4], "resolution": 2}"#;
        assert!(DomainConfig::from_json(text).is_err());
    }
}
