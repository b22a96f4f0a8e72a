// crates/gs_config/src/strategy.rs

//! 运行时策略选择
//!
//! 提供求解策略、故障安全策略、提案策略与安全过滤模式，
//! 均支持 `FromStr`/`Display`，可直接作为 CLI 参数。

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 校正求解策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverStrategy {
    /// Hildreth 对偶坐标上升 QP
    #[default]
    Qp,
    /// Dykstra 交替投影
    Projection,
}

impl SolverStrategy {
    /// 策略名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Qp => "qp",
            Self::Projection => "projection",
        }
    }
}

/// 故障安全策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailSafePolicy {
    /// 固定设定值
    #[default]
    Fixed,
    /// 保持上一次认证通过的动作，无历史时回落到固定设定值
    HoldLast,
}

impl FailSafePolicy {
    /// 策略名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::HoldLast => "hold_last",
        }
    }
}

/// 上游提案策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// 贪心调度：电池承担全部净负荷
    #[default]
    Greedy,
    /// 固定调度
    Fixed,
}

impl PolicyKind {
    /// 策略名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Greedy => "greedy",
            Self::Fixed => "fixed",
        }
    }
}

/// 安全过滤模式，用于方法对比
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// 不确定性感知 CBF：按估计的不确定集收紧
    #[default]
    UCbf,
    /// 确定性 CBF：零半径集合，不做收紧
    Deterministic,
    /// 不过滤，提案动作原样执行
    PassThrough,
}

impl FilterMode {
    /// 全部模式
    pub const ALL: [FilterMode; 3] = [Self::UCbf, Self::Deterministic, Self::PassThrough];

    /// 模式名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::UCbf => "u_cbf",
            Self::Deterministic => "deterministic",
            Self::PassThrough => "pass_through",
        }
    }

    /// 展示名称
    pub fn label(&self) -> &'static str {
        match self {
            Self::UCbf => "U-CBF",
            Self::Deterministic => "Det-CBF",
            Self::PassThrough => "No Filter",
        }
    }
}

macro_rules! impl_display {
    ($($ty:ty),*) => {
        $(
            impl std::fmt::Display for $ty {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}", self.name())
                }
            }
        )*
    };
}

impl_display!(SolverStrategy, FailSafePolicy, PolicyKind, FilterMode);

/// 策略解析错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyParseError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl std::fmt::Display for StrategyParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "无效的{}: '{}', 期望 {}", self.kind, self.value, self.expected)
    }
}

impl std::error::Error for StrategyParseError {}

impl FromStr for SolverStrategy {
    type Err = StrategyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "qp" | "hildreth" => Ok(Self::Qp),
            "projection" | "dykstra" => Ok(Self::Projection),
            _ => Err(StrategyParseError {
                kind: "求解策略",
                value: s.to_string(),
                expected: "'qp' 或 'projection'",
            }),
        }
    }
}

impl FromStr for FailSafePolicy {
    type Err = StrategyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "fixed" => Ok(Self::Fixed),
            "hold_last" | "hold" => Ok(Self::HoldLast),
            _ => Err(StrategyParseError {
                kind: "故障安全策略",
                value: s.to_string(),
                expected: "'fixed' 或 'hold_last'",
            }),
        }
    }
}

impl FromStr for PolicyKind {
    type Err = StrategyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "greedy" | "rl" => Ok(Self::Greedy),
            "fixed" | "idle" => Ok(Self::Fixed),
            _ => Err(StrategyParseError {
                kind: "提案策略",
                value: s.to_string(),
                expected: "'greedy' 或 'fixed'",
            }),
        }
    }
}

impl FromStr for FilterMode {
    type Err = StrategyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "u_cbf" | "ucbf" => Ok(Self::UCbf),
            "deterministic" | "det_cbf" | "det" => Ok(Self::Deterministic),
            "pass_through" | "passthrough" | "none" | "no_filter" => Ok(Self::PassThrough),
            _ => Err(StrategyParseError {
                kind: "过滤模式",
                value: s.to_string(),
                expected: "'u_cbf'、'deterministic' 或 'pass_through'",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parse() {
        assert_eq!("QP".parse::<SolverStrategy>().unwrap(), SolverStrategy::Qp);
        assert_eq!("dykstra".parse::<SolverStrategy>().unwrap(), SolverStrategy::Projection);
        assert!("newton".parse::<SolverStrategy>().is_err());
    }

    #[test]
    fn test_fail_safe_parse() {
        assert_eq!("hold-last".parse::<FailSafePolicy>().unwrap(), FailSafePolicy::HoldLast);
        assert_eq!(FailSafePolicy::default(), FailSafePolicy::Fixed);
        assert_eq!(FailSafePolicy::HoldLast.to_string(), "hold_last");
    }

    #[test]
    fn test_filter_mode_parse() {
        assert_eq!("U-CBF".parse::<FilterMode>().unwrap(), FilterMode::UCbf);
        assert_eq!("det-cbf".parse::<FilterMode>().unwrap(), FilterMode::Deterministic);
        assert_eq!("none".parse::<FilterMode>().unwrap(), FilterMode::PassThrough);
        assert_eq!(FilterMode::PassThrough.to_string(), "pass_through");
        assert_eq!(
            serde_json::to_string(&FilterMode::UCbf).unwrap(),
            "\"u_cbf\""
        );
    }

    #[test]
    fn test_policy_parse_error_message() {
        let err = "random".parse::<PolicyKind>().unwrap_err();
        assert!(err.to_string().contains("random"));
    }
}
