// crates/gs_safety/src/error.rs

//! 安全核心错误类型
//!
//! - [`ModelError`]: 维度/变量名/非有限值错误，致命，直接向上传播
//! - [`UncertaintyConfigError`]: 扰动档案配置错误，仅在配置期出现
//! - [`BarrierError`]: 屏障组构建错误
//! - [`CoreError`]: 驱动与构建器使用的汇总错误
//!
//! 求解器不收敛不是错误，记录在诊断信息中并降级为 INFEASIBLE。

use gs_config::{ConfigError, ScenarioKind};
use thiserror::Error;

/// 模型错误
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    /// 向量长度不匹配
    #[error("{what} 维度不匹配: 期望 {expected}, 实际 {actual}")]
    DimensionMismatch {
        /// 向量种类
        what: &'static str,
        /// 期望长度
        expected: usize,
        /// 实际长度
        actual: usize,
    },

    /// 未知变量名
    #[error("{what} 中没有名为 '{name}' 的变量")]
    UnknownVariable {
        /// 向量种类
        what: &'static str,
        /// 变量名
        name: String,
    },

    /// 缺失变量
    #[error("{what} 缺少变量 '{name}'")]
    MissingVariable {
        /// 向量种类
        what: &'static str,
        /// 变量名
        name: &'static str,
    },

    /// 重复变量
    #[error("{what} 中变量 '{name}' 重复出现")]
    DuplicateVariable {
        /// 向量种类
        what: &'static str,
        /// 变量名
        name: &'static str,
    },

    /// 非有限值
    #[error("{what}.{name} 为非有限值: {value}")]
    NonFinite {
        /// 向量种类
        what: &'static str,
        /// 变量名
        name: &'static str,
        /// 实际值
        value: f64,
    },

    /// 非法半径（负值或非有限值）
    #[error("不确定集第 {index} 维半径非法: {value}")]
    InvalidRadius {
        /// 维度索引
        index: usize,
        /// 实际值
        value: f64,
    },
}

/// 不确定性估计器配置错误
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UncertaintyConfigError {
    /// 场景没有扰动档案
    #[error("场景 '{0}' 未配置扰动档案")]
    MissingProfile(ScenarioKind),

    /// 档案参数非法
    #[error("场景 '{scenario}' 的 {field} 非法: {value}")]
    InvalidProfile {
        /// 场景
        scenario: ScenarioKind,
        /// 字段路径
        field: String,
        /// 实际值
        value: f64,
    },

    /// 运行时上下文非法（σ 或校准因子）
    #[error("场景上下文 {field} 非法: {value}")]
    InvalidContext {
        /// 字段
        field: &'static str,
        /// 实际值
        value: f64,
    },
}

/// 屏障组构建错误
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BarrierError {
    /// class-K 衰减率不在 (0, 1] 内
    #[error("屏障 '{name}' 的衰减率 α={alpha} 不在 (0, 1] 内")]
    InvalidDecayRate {
        /// 屏障名
        name: String,
        /// 实际值
        alpha: f64,
    },

    /// 参数非法
    #[error("屏障 '{name}' 参数非法: {reason}")]
    InvalidParameter {
        /// 屏障名
        name: String,
        /// 原因
        reason: String,
    },

    /// 名称重复
    #[error("屏障名称重复: '{0}'")]
    DuplicateName(String),
}

/// 汇总错误
#[derive(Debug, Error)]
pub enum CoreError {
    /// 模型错误
    #[error(transparent)]
    Model(#[from] ModelError),

    /// 不确定性配置错误
    #[error(transparent)]
    Uncertainty(#[from] UncertaintyConfigError),

    /// 屏障组错误
    #[error(transparent)]
    Barrier(#[from] BarrierError),

    /// 配置错误
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// 结果类型别名
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_error_display() {
        let err = ModelError::DimensionMismatch {
            what: "GridState",
            expected: 6,
            actual: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains("GridState"));
        assert!(msg.contains('6'));
    }

    #[test]
    fn test_core_error_from() {
        let err: CoreError = UncertaintyConfigError::MissingProfile(ScenarioKind::Heatwave).into();
        assert!(matches!(err, CoreError::Uncertainty(_)));
        assert!(err.to_string().contains("Heatwave"));
    }
}
