// crates/nf_field/src/boundary/classify.rs

//! 边界分类层
//!
//! 将 {场角色, 每朝向语义边界类型} 翻译为 {逐分量数学边界类型,
//! 可选值生成函数子}。纯函数：相同输入恒得相同边界表，无副作用；
//! 翻译结果由仓库写回场记录。
//!
//! # 翻译规则
//!
//! | 语义 \ 角色      | 速度                    | 标量            | 压力    | 源项    |
//! |------------------|-------------------------|-----------------|---------|---------|
//! | periodic         | 内部                    | 内部            | 内部    | 内部    |
//! | no_slip_wall     | 奇反射(壁面值)          | 高阶外推        | 零梯度  | 高阶外推|
//! | slip_wall        | 法向奇/切向偶反射       | 高阶外推        | 零梯度  | 高阶外推|
//! | symmetry         | 法向奇/切向偶反射       | 偶反射          | 零梯度  | 高阶外推|
//! | mass_inflow      | Dirichlet(常数或剖面)   | Dirichlet/外推  | 零梯度  | 高阶外推|
//! | pressure_outflow | 一阶外推                | 高阶外推        | 零梯度  | 高阶外推|
//!
//! 速度场的壁面值只能是常数：在壁面挂剖面是致命配置错误。

use super::profiles::InflowProfile;
use super::types::{BcTable, BoundaryKind, MathBc};
use crate::error::FieldError;
use crate::types::FieldRole;
use nf_foundation::{DomainFace, NUM_DOMAIN_FACES};

/// 单个朝向的分类输入
#[derive(Debug, Clone, Default)]
pub struct FaceBcSpec {
    /// 语义边界类型
    pub kind: BoundaryKind,
    /// 该场在此朝向的常数值（缺省按零处理）
    pub values: Option<Vec<f64>>,
    /// 该场在此朝向的剖面函数子
    pub profile: Option<InflowProfile>,
}

/// 按场角色翻译语义边界为数学边界表
///
/// 确定性纯翻译；出错时带场名与朝向名返回配置错误。
pub fn classify(
    field: &str,
    role: FieldRole,
    ncomp: usize,
    specs: &[FaceBcSpec; NUM_DOMAIN_FACES],
) -> Result<BcTable, FieldError> {
    if role == FieldRole::Velocity && ncomp != 3 {
        return Err(FieldError::Config(format!(
            "字段 '{field}' 角色为速度但分量数为 {ncomp}, 期望 3"
        )));
    }

    let mut table = BcTable::interior(ncomp);
    for face in DomainFace::ALL {
        let spec = &specs[face.index()];
        table.set_kind(face, spec.kind);

        // 常数值：校验长度，缺省为零
        if let Some(values) = &spec.values {
            if values.len() != ncomp {
                return Err(FieldError::BcValueLength {
                    field: field.to_string(),
                    face: face.name().to_string(),
                    expected: ncomp,
                    actual: values.len(),
                });
            }
            table.set_values(face, values.clone());
        }

        // 剖面：壁面拒绝；其余校验后挂接
        if let Some(profile) = &spec.profile {
            if spec.kind.is_wall() {
                return Err(FieldError::WallProfile {
                    field: field.to_string(),
                    face: face.name().to_string(),
                });
            }
            profile.validate(field, ncomp)?;
            table.set_profile(face, profile.clone());
        }

        match role {
            FieldRole::Velocity => classify_velocity(&mut table, face, spec),
            FieldRole::Scalar => classify_scalar(&mut table, face, spec, ncomp),
            FieldRole::Pressure => classify_pressure(&mut table, face, ncomp),
            FieldRole::SourceTerm => classify_source_term(&mut table, face, spec.kind, ncomp),
        }
    }
    Ok(table)
}

/// 速度场翻译：分量与坐标轴对应，法向分量由朝向的轴决定
fn classify_velocity(table: &mut BcTable, face: DomainFace, spec: &FaceBcSpec) {
    let normal = face.axis().index();
    match spec.kind {
        BoundaryKind::Periodic => {}
        BoundaryKind::NoSlipWall => {
            // 无滑移：全部分量绕壁面值奇反射（壁面值默认为零）
            for comp in 0..3 {
                table.set_math(comp, face, MathBc::ReflectOdd);
            }
        }
        BoundaryKind::SlipWall | BoundaryKind::Symmetry => {
            for comp in 0..3 {
                let bc = if comp == normal {
                    MathBc::ReflectOdd
                } else {
                    MathBc::ReflectEven
                };
                table.set_math(comp, face, bc);
            }
        }
        BoundaryKind::MassInflow => {
            for comp in 0..3 {
                table.set_math(comp, face, MathBc::Dirichlet);
            }
        }
        BoundaryKind::PressureOutflow => {
            for comp in 0..3 {
                table.set_math(comp, face, MathBc::FirstOrderExtrap);
            }
        }
    }
}

/// 标量场翻译：入流给定值时 Dirichlet，否则外推
fn classify_scalar(table: &mut BcTable, face: DomainFace, spec: &FaceBcSpec, ncomp: usize) {
    let bc = match spec.kind {
        BoundaryKind::Periodic => return,
        BoundaryKind::Symmetry => MathBc::ReflectEven,
        BoundaryKind::MassInflow if spec.values.is_some() || spec.profile.is_some() => {
            MathBc::Dirichlet
        }
        _ => MathBc::HighOrderExtrap,
    };
    for comp in 0..ncomp {
        table.set_math(comp, face, bc);
    }
}

/// 压力场翻译：开边界无物理压力值，一律零梯度
fn classify_pressure(table: &mut BcTable, face: DomainFace, ncomp: usize) {
    if table.kind(face) == BoundaryKind::Periodic {
        return;
    }
    for comp in 0..ncomp {
        table.set_math(comp, face, MathBc::Neumann);
    }
}

/// 源项/辅助场翻译：只为填充服务，一律高阶外推
fn classify_source_term(table: &mut BcTable, face: DomainFace, kind: BoundaryKind, ncomp: usize) {
    if kind == BoundaryKind::Periodic {
        return;
    }
    for comp in 0..ncomp {
        table.set_math(comp, face, MathBc::HighOrderExtrap);
    }
}

// ============================================================================
// 测试
// ============================================================================
