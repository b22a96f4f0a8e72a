// crates/gs_foundation/src/lib.rs

//! GridShield Foundation Layer
//!
//! 基础层，提供整个项目共用的数值工具。
//!
//! # 模块概览
//!
//! - [`tolerance`]: 安全边界容差 ε 与收敛容差
//! - [`validation`]: 配置/数据验证报告
//! - [`vector_ops`]: 小维度稠密向量运算（BLAS Level 1 风格）
//! - [`stats`]: Kahan 求和与在线方差统计
//!
//! # 设计原则
//!
//! 1. **最少依赖**: 仅依赖 serde 和 thiserror
//! 2. **确定性**: 所有运算不含随机性，相同输入得到逐位相同输出
//! 3. **无全局状态**: 容差等参数以值传递注入
//!
//! # 示例
//!
//! ```
//! use gs_foundation::{Tolerance, vector_ops::dot};
//!
//! let tol = Tolerance::default();
//! assert!(tol.is_safe(-0.5 * tol.epsilon));
//! assert_eq!(dot(&[1.0, 2.0], &[3.0, 4.0]), 11.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod stats;
pub mod tolerance;
pub mod validation;
pub mod vector_ops;

// 重导出常用类型
pub use stats::{KahanSum, RunningStats};
pub use tolerance::{Tolerance, ToleranceError};
pub use validation::{ValidationError, ValidationReport, ValidationWarning};

/// 条件不满足时提前返回错误
///
/// ```
/// use gs_foundation::ensure;
///
/// fn check(v: f64) -> Result<(), String> {
///     ensure!(v >= 0.0, format!("负值: {}", v));
///     Ok(())
/// }
/// assert!(check(1.0).is_ok());
/// assert!(check(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err.into());
        }
    };
}

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::ensure;
    pub use crate::stats::{KahanSum, RunningStats};
    pub use crate::tolerance::Tolerance;
    pub use crate::validation::{ValidationError, ValidationReport, ValidationWarning};
    pub use crate::vector_ops::{dot, max_abs_diff, norm1, norm2};
}
