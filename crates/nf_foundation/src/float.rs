// crates/nf_foundation/src/float.rs

//! 浮点比较工具和数值容差
//!
//! 数值一致性检验（守恒往返、周期回绕等）使用统一容差，
//! 避免各处散落魔术数字。

/// 默认绝对容差
pub const ABS_TOL: f64 = 1e-12;

/// 默认相对容差
pub const REL_TOL: f64 = 1e-10;

/// 绝对容差比较
#[inline]
pub fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

/// 混合容差比较：|a-b| <= max(abs_tol, rel_tol * max(|a|,|b|))
#[inline]
pub fn approx_eq_rel(a: f64, b: f64, abs_tol: f64, rel_tol: f64) -> bool {
    let diff = (a - b).abs();
    let scale = a.abs().max(b.abs());
    diff <= abs_tol.max(rel_tol * scale)
}
