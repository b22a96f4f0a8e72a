// crates/gs_safety/src/certifier/result.rs

//! 认证结果与诊断信息
//!
//! 结果创建后不再修改，可直接序列化供观察者流式输出。

use serde::Serialize;

use gs_config::SolverStrategy;
use gs_foundation::Tolerance;

use crate::state::ControlAction;

/// 认证结论
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// 提案动作安全，原样通过
    Safe,
    /// 提案动作被最小修正
    Corrected,
    /// 不存在可认证动作，输出故障安全动作
    Infeasible,
    /// 未经过滤，提案动作直接执行（仅用于方法对比基线）
    Unfiltered,
}

impl Verdict {
    /// 名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Safe => "SAFE",
            Self::Corrected => "CORRECTED",
            Self::Infeasible => "INFEASIBLE",
            Self::Unfiltered => "UNFILTERED",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 单个约束的收紧结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintMargin {
    /// 屏障名
    pub name: String,
    /// 当前屏障值 h(x)
    pub h_current: f64,
    /// 收紧裕度 δ
    pub delta: f64,
    /// 名义下一状态的屏障值 h(x̂')
    pub h_predicted: f64,
    /// 松弛量 h(x̂') − δ − (1 − α)·h(x)
    pub slack: f64,
}

impl ConstraintMargin {
    /// 松弛量不小于 −ε
    #[inline]
    pub fn is_satisfied(&self, tolerance: &Tolerance) -> bool {
        tolerance.is_safe(self.slack)
    }
}

/// 求解失败原因
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SolveFailure {
    /// 违反的约束与动作无关，可行集为空
    EmptyFeasibleSet {
        /// 屏障名
        constraint: String,
    },
    /// 求解器在迭代上限内未收敛
    NotConverged {
        /// 最后一轮的最大约束违反量
        residual: f64,
    },
    /// 线性化解在非线性模型上验证失败
    VerificationFailed {
        /// 屏障名（执行器越界时为 "actuator_bounds"）
        constraint: String,
        /// 松弛量
        slack: f64,
    },
    /// 修正量未超过 ε
    NoEffectiveCorrection,
    /// 被取消
    Cancelled,
}

impl std::fmt::Display for SolveFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyFeasibleSet { constraint } => {
                write!(f, "约束 {} 与动作无关且已违反，可行集为空", constraint)
            }
            Self::NotConverged { residual } => write!(f, "求解未收敛，残差 {:.3e}", residual),
            Self::VerificationFailed { constraint, slack } => {
                write!(f, "约束 {} 验证失败，松弛量 {:.3e}", constraint, slack)
            }
            Self::NoEffectiveCorrection => write!(f, "修正量未超过 ε"),
            Self::Cancelled => write!(f, "认证被取消"),
        }
    }
}

/// 多步前瞻预警
///
/// 认证动作保持不变时，名义模型第 `step` 步首次出现收紧条件不满足。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarlyWarning {
    /// 屏障名
    pub constraint: String,
    /// 前瞻步数（1 为当前认证步）
    pub step: usize,
    /// 该步的松弛量
    pub slack: f64,
}

/// 求解器诊断
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolverDiagnostics {
    /// 求解策略
    pub strategy: SolverStrategy,
    /// 累计迭代轮数
    pub iterations: usize,
    /// 重线性化次数
    pub relinearizations: usize,
    /// 是否收敛并通过验证
    pub converged: bool,
    /// 最后一次求解的最大约束违反量
    pub max_residual: f64,
    /// 失败原因
    pub failure: Option<SolveFailure>,
    /// 是否因取消提前终止
    pub terminated_early: bool,
    /// 多步前瞻预警，仅供参考，不影响结论
    pub early_warnings: Vec<EarlyWarning>,
}

impl SolverDiagnostics {
    /// 未调用求解器时的诊断
    pub fn idle(strategy: SolverStrategy) -> Self {
        Self {
            strategy,
            iterations: 0,
            relinearizations: 0,
            converged: true,
            max_residual: 0.0,
            failure: None,
            terminated_early: false,
            early_warnings: Vec::new(),
        }
    }
}

/// 认证结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CertificationResult {
    /// 步序号
    pub tick: u64,
    /// 提案动作
    pub original: ControlAction,
    /// 认证动作
    pub certified: ControlAction,
    /// 各约束裕度（SAFE/CORRECTED 针对认证动作，INFEASIBLE 针对提案动作）
    pub margins: Vec<ConstraintMargin>,
    /// 结论
    pub verdict: Verdict,
    /// 求解器诊断
    pub diagnostics: SolverDiagnostics,
    /// 是否需要上报人工处理
    pub requires_escalation: bool,
}

impl CertificationResult {
    /// 认证动作
    #[inline]
    pub fn certified(&self) -> &ControlAction {
        &self.certified
    }

    /// 是否发生了干预（修正或故障安全）
    #[inline]
    pub fn intervened(&self) -> bool {
        matches!(self.verdict, Verdict::Corrected | Verdict::Infeasible)
    }

    /// 最小松弛量（无约束时为 +∞）
    pub fn min_slack(&self) -> f64 {
        self.margins
            .iter()
            .map(|m| m.slack)
            .fold(f64::INFINITY, f64::min)
    }

    /// 按名称查找约束裕度
    pub fn margin(&self, name: &str) -> Option<&ConstraintMargin> {
        self.margins.iter().find(|m| m.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&Verdict::Infeasible).unwrap(), "\"INFEASIBLE\"");
        assert_eq!(Verdict::Corrected.to_string(), "CORRECTED");
        assert_eq!(serde_json::to_string(&Verdict::Unfiltered).unwrap(), "\"UNFILTERED\"");
    }

    #[test]
    fn test_margin_satisfied_within_tolerance() {
        let margin = |slack| ConstraintMargin {
            name: "soc_min".into(),
            h_current: 0.1,
            delta: 0.0,
            h_predicted: 0.05,
            slack,
        };
        let tol = Tolerance::new(1e-6, 1e-9).unwrap();
        assert!(margin(0.0).is_satisfied(&tol));
        assert!(margin(-5e-7).is_satisfied(&tol));
        assert!(!margin(-2e-6).is_satisfied(&tol));
    }

    #[test]
    fn test_failure_serialization_tagged() {
        let json = serde_json::to_string(&SolveFailure::Cancelled).unwrap();
        assert_eq!(json, r#"{"kind":"cancelled"}"#);
    }
}
