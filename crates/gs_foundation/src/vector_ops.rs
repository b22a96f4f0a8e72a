// crates/gs_foundation/src/vector_ops.rs

//! 向量运算（BLAS Level 1 风格）
//!
//! 认证器处理的向量维度很小（状态 6 维、动作 2 维、扰动 4 维），
//! 直接在切片上运算，不引入矩阵库。
//!
//! # 函数列表
//!
//! - [`dot`]: 点积 x·y
//! - [`norm1`] / [`norm2`]: 范数
//! - [`max_abs_diff`]: ||x - y||∞

/// 点积 x·y
#[inline]
pub fn dot(x: &[f64], y: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), y.len());
    x.iter().zip(y.iter()).map(|(&xi, &yi)| xi * yi).sum()
}

/// 一范数 ||x||₁
#[inline]
pub fn norm1(x: &[f64]) -> f64 {
    x.iter().map(|v| v.abs()).sum()
}

/// 二范数 ||x||₂
#[inline]
pub fn norm2(x: &[f64]) -> f64 {
    dot(x, x).sqrt()
}

/// 两向量差的无穷范数 ||x - y||∞
#[inline]
pub fn max_abs_diff(x: &[f64], y: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), y.len());
    x.iter()
        .zip(y.iter())
        .map(|(&a, &b)| (a - b).abs())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_norms() {
        let x = [3.0, -4.0];
        assert_eq!(norm1(&x), 7.0);
        assert_eq!(norm2(&x), 5.0);
    }

    #[test]
    fn test_max_abs_diff() {
        assert_eq!(max_abs_diff(&[1.0, 5.0], &[1.5, 2.0]), 3.0);
    }
}
