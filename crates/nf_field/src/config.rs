// crates/nf_field/src/config.rs

//! 边界条件配置
//!
//! 启动时读取一次的声明式边界配置：每个域朝向一个语义类型，
//! 外加按场名索引的常数值和入流剖面。解析后经
//! [`DomainBcConfig::face_specs`] 转成分类层的输入。
//!
//! 所有结构 `deny_unknown_fields`，未知键、未知语义类型、
//! 与周期轴矛盾的声明都在启动时报配置错误。

use crate::boundary::{FaceBcSpec, InflowProfile};
use crate::error::FieldError;
use nf_foundation::{Axis, DomainFace, NfError, NfResult, NUM_DOMAIN_FACES};
use nf_mesh::LevelGeometry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::boundary::BoundaryKind;

/// 入流剖面配置（tag 分派的声明形式）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum InflowProfileConfig {
    /// 各分量常数
    Constant {
        /// 每分量的入流值
        values: Vec<f64>,
    },
    /// 沿空间轴的线性斜坡
    Linear {
        /// 斜坡所沿的空间轴
        axis: Axis,
        /// 起点坐标
        start: f64,
        /// 终点坐标
        stop: f64,
        /// 起点处每分量的值
        vmin: Vec<f64>,
        /// 终点处每分量的值
        vmax: Vec<f64>,
    },
    /// 幂律剪切剖面
    PowerLaw {
        /// 剪切方向的空间轴
        axis: Axis,
        /// 轴坐标零点偏移
        #[serde(default)]
        origin_offset: f64,
        /// 参考高度
        ref_height: f64,
        /// 剪切指数
        shear_exp: f64,
        /// 剪切因子下限
        #[serde(default = "default_fmin")]
        fmin: f64,
        /// 剪切因子上限
        #[serde(default = "default_fmax")]
        fmax: f64,
        /// 每分量的基准值
        base: Vec<f64>,
    },
    /// Burggraf 顶盖驱动腔基准剖面（域范围取自层级几何）
    BurggrafLid {
        /// 归一化坐标所沿的空间轴
        axis: Axis,
        /// 速度比例因子
        #[serde(default = "default_scale")]
        scale: f64,
    },
}

fn default_fmin() -> f64 {
    0.0
}

fn default_fmax() -> f64 {
    f64::MAX
}

fn default_scale() -> f64 {
    1.0
}

impl InflowProfileConfig {
    /// 构建求值函数子（域范围类剖面从几何取参数）
    pub fn build(&self, geom: &LevelGeometry) -> InflowProfile {
        match self {
            InflowProfileConfig::Constant { values } => InflowProfile::Constant {
                values: values.clone(),
            },
            InflowProfileConfig::Linear {
                axis,
                start,
                stop,
                vmin,
                vmax,
            } => InflowProfile::Linear {
                axis: *axis,
                start: *start,
                stop: *stop,
                vmin: vmin.clone(),
                vmax: vmax.clone(),
            },
            InflowProfileConfig::PowerLaw {
                axis,
                origin_offset,
                ref_height,
                shear_exp,
                fmin,
                fmax,
                base,
            } => InflowProfile::PowerLaw {
                axis: *axis,
                origin_offset: *origin_offset,
                ref_height: *ref_height,
                shear_exp: *shear_exp,
                fmin: *fmin,
                fmax: *fmax,
                base: base.clone(),
            },
            InflowProfileConfig::BurggrafLid { axis, scale } => {
                let a = axis.index();
                InflowProfile::BurggrafLid {
                    axis: *axis,
                    origin: geom.origin()[a],
                    length: geom.spacing()[a] * geom.domain().extent(*axis) as f64,
                    scale: *scale,
                }
            }
        }
    }
}

// ============================================================================
// 逐朝向配置
// ============================================================================

/// 单个域朝向的边界配置
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct FaceBcConfig {
    /// 语义边界类型键名（缺省 periodic）
    pub kind: String,
    /// 按场名索引的常数边界值
    pub values: HashMap<String, Vec<f64>>,
    /// 按场名索引的入流剖面
    pub profiles: HashMap<String, InflowProfileConfig>,
}

impl FaceBcConfig {
    fn kind_parsed(&self, face: DomainFace) -> Result<BoundaryKind, FieldError> {
        if self.kind.is_empty() {
            return Ok(BoundaryKind::Periodic);
        }
        BoundaryKind::from_name(&self.kind).ok_or_else(|| FieldError::UnknownBoundaryKind {
            face: face.name().to_string(),
            value: self.kind.clone(),
        })
    }
}

/// 整个计算域的边界配置
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct DomainBcConfig {
    /// X 低侧
    pub xlo: FaceBcConfig,
    /// Y 低侧
    pub ylo: FaceBcConfig,
    /// Z 低侧
    pub zlo: FaceBcConfig,
    /// X 高侧
    pub xhi: FaceBcConfig,
    /// Y 高侧
    pub yhi: FaceBcConfig,
    /// Z 高侧
    pub zhi: FaceBcConfig,
}

impl DomainBcConfig {
    /// 从 JSON 文本解析
    pub fn from_json(text: &str) -> NfResult<Self> {
        serde_json::from_str(text).map_err(|e| NfError::config(format!("边界配置解析失败: {e}")))
    }

    /// 某朝向的配置
    pub fn face(&self, face: DomainFace) -> &FaceBcConfig {
        match face {
            DomainFace::XLo => &self.xlo,
            DomainFace::YLo => &self.ylo,
            DomainFace::ZLo => &self.zlo,
            DomainFace::XHi => &self.xhi,
            DomainFace::YHi => &self.yhi,
            DomainFace::ZHi => &self.zhi,
        }
    }

    /// 校验语义类型可解析，且与各轴周期性一致
    ///
    /// 周期轴两侧必须都声明 periodic，非周期轴两侧都不得声明。
    pub fn validate(&self, periodic: [bool; 3]) -> Result<(), FieldError> {
        for face in DomainFace::ALL {
            let kind = self.face(face).kind_parsed(face)?;
            let axis_periodic = periodic[face.axis().index()];
            if axis_periodic != (kind == BoundaryKind::Periodic) {
                return Err(FieldError::Config(format!(
                    "朝向 {} 的边界类型 '{kind}' 与轴 {} 的周期标志 {axis_periodic} 矛盾",
                    face.name(),
                    face.axis().name(),
                )));
            }
        }
        Ok(())
    }

    /// 为某个场构建分类层输入
    pub fn face_specs(
        &self,
        field: &str,
        geom: &LevelGeometry,
    ) -> Result<[FaceBcSpec; NUM_DOMAIN_FACES], FieldError> {
        let mut specs: [FaceBcSpec; NUM_DOMAIN_FACES] = Default::default();
        for face in DomainFace::ALL {
            let cfg = self.face(face);
            specs[face.index()] = FaceBcSpec {
                kind: cfg.kind_parsed(face)?,
                values: cfg.values.get(field).cloned(),
                profile: cfg.profiles.get(field).map(|p| p.build(geom)),
            };
        }
        Ok(specs)
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use nf_mesh::GridBox;

    fn geom() -> LevelGeometry {
        LevelGeometry::new(
            GridBox::cube(8),
            DVec3::ZERO,
            DVec3::splat(0.125),
            [true, false, false],
        )
    }

    #[test]
    fn test_parse_and_specs() {
        let text = r#"{
            "ylo": { "kind": "no_slip_wall" },
            "yhi": { "kind": "no_slip_wall" },
            "zlo": {
                "kind": "mass_inflow",
                "values": { "velocity": [0.0, 0.0, 1.0] }
            },
            "zhi": {
                "kind": "pressure_outflow",
                "profiles": {
                    "temperature": { "type": "constant", "values": [300.0] }
                }
            }
        }"#;
        let cfg = DomainBcConfig::from_json(text).unwrap();
        cfg.validate([true, false, false]).unwrap();

        let specs = cfg.face_specs("velocity", &geom()).unwrap();
        assert_eq!(specs[DomainFace::XLo.index()].kind, BoundaryKind::Periodic);
        assert_eq!(specs[DomainFace::YLo.index()].kind, BoundaryKind::NoSlipWall);
        assert_eq!(
            specs[DomainFace::ZLo.index()].values,
            Some(vec![0.0, 0.0, 1.0])
        );
        // values 按场名索引：别的场在 zlo 没有值
        let other = cfg.face_specs("temperature", &geom()).unwrap();
        assert_eq!(other[DomainFace::ZLo.index()].values, None);
        assert!(other[DomainFace::ZHi.index()].profile.is_some());
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let text = r#"{ "xlo": { "kind": "open_sea" }, "xhi": { "kind": "open_sea" } }"#;
        let cfg = DomainBcConfig::from_json(text).unwrap();
        let err = cfg.validate([false; 3]).unwrap_err();
        assert!(matches!(err, FieldError::UnknownBoundaryKind { .. }));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let text = r#"{ "xlo": { "kind": "symmetry", "ramp": 2.0 } }"#;
        assert!(DomainBcConfig::from_json(text).is_err());
    }

    #[test]
    fn test_periodic_consistency() {
        // 周期轴上声明壁面：矛盾
        let text = r#"{ "xlo": { "kind": "no_slip_wall" }, "xhi": { "kind": "no_slip_wall" } }"#;
        let cfg = DomainBcConfig::from_json(text).unwrap();
        assert!(cfg.validate([true, true, true]).is_err());
        // 非周期轴缺声明（缺省 periodic）：同样矛盾
        let cfg = DomainBcConfig::default();
        assert!(cfg.validate([false, true, true]).is_err());
        assert!(cfg.validate([true; 3]).is_ok());
    }

    #[test]
    fn test_burggraf_takes_extent_from_geometry() {
        let text = r#"{
            "zhi": {
                "kind": "mass_inflow",
                "profiles": { "velocity": { "type": "burggraf_lid", "axis": "x" } }
            }
        }"#;
        let cfg = DomainBcConfig::from_json(text).unwrap();
        let specs = cfg.face_specs("velocity", &geom()).unwrap();
        let Some(InflowProfile::BurggrafLid { origin, length, scale, .. }) =
            specs[DomainFace::ZHi.index()].profile.clone()
        else {
            panic!("期望顶盖剖面");
        };
        assert_eq!(origin, 0.0);
        assert!((length - 1.0).abs() < 1e-14);
        assert_eq!(scale, 1.0);
    }

    #[test]
    fn test_power_law_defaults() {
        let text = r#"{
            "type": "power_law",
            "axis": "z",
            "ref_height": 90.0,
            "shear_exp": 0.12,
            "base": [8.0, 0.0, 0.0]
        }"#;
        let cfg: InflowProfileConfig = serde_json::from_str(text).unwrap();
        let InflowProfile::PowerLaw { origin_offset, fmin, fmax, .. } = cfg.build(&geom()) else {
            panic!("期望幂律剖面");
        };
        assert_eq!(origin_offset, 0.0);
        assert_eq!(fmin, 0.0);
        assert_eq!(fmax, f64::MAX);
    }
}
