// crates/gs_foundation/src/tolerance.rs

//! 数值容差配置
//!
//! 安全判定使用固定的浮点容差 ε：屏障值 `h >= -ε` 即视为安全，
//! 避免在边界处因浮点误差在 SAFE / CORRECTED 之间来回跳变。
//!
//! 容差以参数注入的方式传递，不存在全局容差变量。

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 容差构造错误
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ToleranceError {
    /// 容差必须为正的有限值
    #[error("容差 {name} 必须为正的有限值, 实际为 {value}")]
    NotPositive {
        /// 容差名称
        name: &'static str,
        /// 实际值
        value: f64,
    },
}

/// 数值容差
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// 安全边界容差 ε
    pub epsilon: f64,
    /// 迭代求解收敛容差
    pub convergence: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            epsilon: 1e-6,
            convergence: 1e-9,
        }
    }
}

impl Tolerance {
    /// 创建容差配置并校验
    pub fn new(epsilon: f64, convergence: f64) -> Result<Self, ToleranceError> {
        check_positive("epsilon", epsilon)?;
        check_positive("convergence", convergence)?;
        Ok(Self {
            epsilon,
            convergence,
        })
    }

    /// 屏障值是否处于安全区（含容差）
    #[inline]
    pub fn is_safe(&self, h: f64) -> bool {
        h >= -self.epsilon
    }

    /// 屏障值是否越界（超出容差）
    #[inline]
    pub fn is_violated(&self, h: f64) -> bool {
        !self.is_safe(h)
    }
}

fn check_positive(name: &'static str, value: f64) -> Result<(), ToleranceError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ToleranceError::NotPositive { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_boundary() {
        let tol = Tolerance::default();
        assert!(tol.is_safe(0.0));
        assert!(tol.is_safe(-1e-7));
        assert!(tol.is_violated(-1e-5));
    }

    #[test]
    fn test_new_rejects_non_positive() {
        assert!(Tolerance::new(0.0, 1e-9).is_err());
        assert!(Tolerance::new(1e-6, f64::NAN).is_err());
        assert!(Tolerance::new(1e-6, 1e-9).is_ok());
    }
}
