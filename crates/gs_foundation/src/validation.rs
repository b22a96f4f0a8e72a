// crates/gs_foundation/src/validation.rs

//! 运行时验证工具
//!
//! 提供验证报告和错误/警告类型，用于配置与数据验证。
//!
//! # 示例
//!
//! ```
//! use gs_foundation::validation::{ValidationReport, ValidationError};
//!
//! let alpha = 1.5f64;
//! let mut report = ValidationReport::new();
//! if alpha > 1.0 {
//!     report.add_error(ValidationError::OutOfRange {
//!         field: "barriers[0].alpha".into(),
//!         value: alpha,
//!         min: 0.0,
//!         max: 1.0,
//!     });
//! }
//! assert!(report.has_errors());
//! ```

use std::fmt;

/// 验证报告
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// 错误列表
    pub errors: Vec<ValidationError>,
    /// 警告列表
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// 创建空的验证报告
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加错误
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// 检查值是否有限且在区间内，否则记录错误
    pub fn check_range(&mut self, field: impl Into<String>, value: f64, min: f64, max: f64) {
        let field = field.into();
        if !value.is_finite() {
            self.add_error(ValidationError::NonFinite { field, value });
        } else if value < min || value > max {
            self.add_error(ValidationError::OutOfRange {
                field,
                value,
                min,
                max,
            });
        }
    }

    /// 是否有错误
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// 是否有警告
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// 错误数量
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// 警告数量
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// 是否通过（无错误）
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "验证报告:")?;
        writeln!(f, "  错误: {} 个", self.error_count())?;
        writeln!(f, "  警告: {} 个", self.warning_count())?;

        if self.has_errors() {
            writeln!(f, "\n错误详情:")?;
            for (i, err) in self.errors.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, err)?;
            }
        }

        if self.has_warnings() {
            writeln!(f, "\n警告详情:")?;
            for (i, warn) in self.warnings.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, warn)?;
            }
        }

        Ok(())
    }
}

/// 验证错误类型
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// 非有限值
    NonFinite {
        /// 字段路径
        field: String,
        /// 非有限的数值
        value: f64,
    },
    /// 数据超出范围
    OutOfRange {
        /// 字段路径
        field: String,
        /// 实际值
        value: f64,
        /// 下界
        min: f64,
        /// 上界
        max: f64,
    },
    /// 一致性错误
    ConsistencyError {
        /// 错误描述
        message: String,
    },
    /// 自定义错误
    Custom {
        /// 自定义消息
        message: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite { field, value } => {
                write!(f, "字段{}={} (非有限值)", field, value)
            }
            Self::OutOfRange {
                field,
                value,
                min,
                max,
            } => {
                write!(f, "字段{}={} 超出范围[{}, {}]", field, value, min, max)
            }
            Self::ConsistencyError { message } => {
                write!(f, "一致性错误: {}", message)
            }
            Self::Custom { message } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for ValidationError {}

/// 验证警告类型
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationWarning {
    /// 高数值
    HighValue {
        /// 字段路径
        field: String,
        /// 实际值
        value: f64,
        /// 阈值
        threshold: f64,
    },
    /// 非单调的场景档案
    NonMonotone {
        /// 较平稳的场景
        calmer: String,
        /// 较严峻的场景
        harsher: String,
        /// 扰动维度
        dimension: String,
    },
    /// 自定义警告
    Custom {
        /// 自定义消息
        message: String,
    },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HighValue {
                field,
                value,
                threshold,
            } => write!(f, "字段{}={} 超过阈值{}", field, value, threshold),
            Self::NonMonotone {
                calmer,
                harsher,
                dimension,
            } => write!(
                f,
                "场景 {} 在维度 {} 上的半径小于 {}，估计器将取包络",
                harsher, dimension, calmer
            ),
            Self::Custom { message } => write!(f, "{}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_range() {
        let mut report = ValidationReport::new();
        report.check_range("a", 0.5, 0.0, 1.0);
        assert!(report.is_valid());
        report.check_range("b", 2.0, 0.0, 1.0);
        report.check_range("c", f64::NAN, 0.0, 1.0);
        assert_eq!(report.error_count(), 2);
        assert!(matches!(report.errors[1], ValidationError::NonFinite { .. }));
    }

    #[test]
    fn test_warning_display() {
        let mut a = ValidationReport::new();
        a.add_warning(ValidationWarning::Custom {
            message: "注意".into(),
        });
        assert!(a.has_warnings());
        assert!(a.to_string().contains("警告: 1 个"));
    }
}
