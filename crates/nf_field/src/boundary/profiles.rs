// crates/nf_field/src/boundary/profiles.rs

//! 入流剖面函数子
//!
//! 入流边界的值生成器。全部为纯数据结构，按值传入逐单元循环，
//! 由 tag 分派求值——没有闭包捕获，便于按位拷贝和并行分发。
//!
//! 时间参数一路传到求值处：当前实现的剖面都与时间无关，
//! 但求值契约保留时间以兼容时变入流。

use crate::error::FieldError;
use glam::DVec3;
use nf_foundation::Axis;

/// 入流剖面函数子
#[derive(Debug, Clone, PartialEq)]
pub enum InflowProfile {
    /// 各分量常数
    Constant {
        /// 每分量的入流值
        values: Vec<f64>,
    },

    /// 沿某空间轴的线性斜坡（轴坐标夹在 [start, stop] 内）
    Linear {
        /// 斜坡变化的空间轴
        axis: Axis,
        /// 斜坡起点坐标
        start: f64,
        /// 斜坡终点坐标
        stop: f64,
        /// 起点处每分量的值
        vmin: Vec<f64>,
        /// 终点处每分量的值
        vmax: Vec<f64>,
    },

    /// 幂律剪切剖面: base[c] * clamp(((x - offset)/ref_height)^alpha, fmin, fmax)
    PowerLaw {
        /// 剪切方向的空间轴
        axis: Axis,
        /// 轴坐标零点偏移
        origin_offset: f64,
        /// 参考高度
        ref_height: f64,
        /// 剪切指数 alpha
        shear_exp: f64,
        /// 剪切因子下限
        fmin: f64,
        /// 剪切因子上限
        fmax: f64,
        /// 每分量的基准值
        base: Vec<f64>,
    },

    /// Burggraf 顶盖驱动腔基准解的顶盖速度剖面
    ///
    /// 首分量 u = scale * 16 * (xi^4 - 2 xi^3 + xi^2)，
    /// xi 为沿 `axis` 的归一化坐标，其余分量为零。
    BurggrafLid {
        /// 归一化坐标所沿的空间轴
        axis: Axis,
        /// 该轴上域起点坐标
        origin: f64,
        /// 该轴上域长度
        length: f64,
        /// 速度比例因子
        scale: f64,
    },
}

impl InflowProfile {
    /// 在位置 `pos`、时刻 `time` 求第 `comp` 分量的值
    #[inline]
    pub fn evaluate(&self, pos: DVec3, _time: f64, comp: usize) -> f64 {
        match self {
            InflowProfile::Constant { values } => values[comp],

            InflowProfile::Linear {
                axis,
                start,
                stop,
                vmin,
                vmax,
            } => {
                let x = pos[axis.index()];
                let t = ((x - start) / (stop - start)).clamp(0.0, 1.0);
                vmin[comp] + t * (vmax[comp] - vmin[comp])
            }

            InflowProfile::PowerLaw {
                axis,
                origin_offset,
                ref_height,
                shear_exp,
                fmin,
                fmax,
                base,
            } => {
                let x = pos[axis.index()];
                let ratio = ((x - origin_offset) / ref_height).max(0.0);
                let factor = ratio.powf(*shear_exp).clamp(*fmin, *fmax);
                base[comp] * factor
            }

            InflowProfile::BurggrafLid {
                axis,
                origin,
                length,
                scale,
            } => {
                if comp != 0 {
                    return 0.0;
                }
                let xi = ((pos[axis.index()] - origin) / length).clamp(0.0, 1.0);
                let xi2 = xi * xi;
                scale * 16.0 * (xi2 * xi2 - 2.0 * xi2 * xi + xi2)
            }
        }
    }

    /// 校验剖面参数与场分量数一致
    pub fn validate(&self, field: &str, ncomp: usize) -> Result<(), FieldError> {
        let check_len = |what: &str, len: usize| -> Result<(), FieldError> {
            if len != ncomp {
                Err(FieldError::Config(format!(
                    "字段 '{field}' 的剖面 {what} 长度 {len} 与分量数 {ncomp} 不符"
                )))
            } else {
                Ok(())
            }
        };
        match self {
            InflowProfile::Constant { values } => check_len("values", values.len()),
            InflowProfile::Linear { vmin, vmax, start, stop, .. } => {
                check_len("vmin", vmin.len())?;
                check_len("vmax", vmax.len())?;
                if (stop - start).abs() < f64::EPSILON {
                    return Err(FieldError::Config(format!(
                        "字段 '{field}' 的线性剖面区间退化: start == stop"
                    )));
                }
                Ok(())
            }
            InflowProfile::PowerLaw { base, ref_height, .. } => {
                check_len("base", base.len())?;
                if *ref_height <= 0.0 {
                    return Err(FieldError::Config(format!(
                        "字段 '{field}' 的幂律剖面参考高度必须为正: {ref_height}"
                    )));
                }
                Ok(())
            }
            InflowProfile::BurggrafLid { length, .. } => {
                if *length <= 0.0 {
                    return Err(FieldError::Config(format!(
                        "字段 '{field}' 的顶盖剖面域长度必须为正: {length}"
                    )));
                }
                Ok(())
            }
        }
    }
}

// ============================================================================
// 测试
// ============================================================================
