// crates/gs_safety/src/certifier/mod.rs

//! U-CBF 认证器
//!
//! 对每个提案动作 u₀：
//!
//! 1. 以集合中心预测名义下一状态 x̂' = f(x, u₀, c)，计算各屏障裕度 δ_i
//! 2. 检查收紧的离散 CBF 条件 `h_i(x̂') − δ_i − (1 − α_i)·h_i(x) >= −ε`
//! 3. 全部满足且动作在执行器边界内 → SAFE
//! 4. 否则联合求解最小加权距离投影，并在非线性模型上重新验证，
//!    必要时重线性化 → CORRECTED
//! 5. 可行集为空、不收敛、被取消或验证失败 → INFEASIBLE，输出故障安全动作
//!
//! 默认不跨步复用对偶变量，相同输入得到逐位相同的结果。
//!
//! 配置了多步前瞻时，认证动作保持不变再沿名义模型外推若干步，
//! 收紧条件首次失效的位置写入诊断的 `early_warnings`。前瞻只报告，不改变动作。

pub mod result;

pub use result::{
    CertificationResult, ConstraintMargin, EarlyWarning, SolveFailure, SolverDiagnostics, Verdict,
};

use tracing::{debug, error, warn};

use gs_config::{CertifierConfig, ConfigError, FailSafeConfig, FailSafePolicy, GridConfig, MonitorConfig};
use gs_foundation::vector_ops::{dot, max_abs_diff, norm1};
use gs_foundation::Tolerance;

use crate::barrier::BarrierBank;
use crate::cancel::CancelToken;
use crate::dynamics::GridDynamics;
use crate::error::{CoreError, ModelError};
use crate::solver::{
    create_solver, ActionBox, HalfSpace, IterationSettings, ProjectionProblem, ProjectionSolver,
    SolveStatus,
};
use crate::state::{ControlAction, GridState, ACTION_DIM};
use crate::uncertainty::UncertaintySet;

/// 线性化系数低于此值视为与动作无关
const ACTION_SENSITIVITY_FLOOR: f64 = 1e-12;

/// 执行器边界
pub fn action_bounds(grid: &GridConfig) -> ActionBox {
    ActionBox {
        lower: [-grid.battery_max_kw, 0.0],
        upper: [grid.battery_max_kw, grid.shed_max_kw],
    }
}

/// U-CBF 认证器
pub struct Certifier {
    dynamics: GridDynamics,
    bank: BarrierBank,
    bounds: ActionBox,
    tolerance: Tolerance,
    max_iterations: usize,
    max_relinearizations: usize,
    lookahead_steps: usize,
    weights: [f64; ACTION_DIM],
    fail_safe: FailSafeConfig,
    solver: Box<dyn ProjectionSolver>,
    last_certified: Option<ControlAction>,
}

impl std::fmt::Debug for Certifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Certifier")
            .field("barriers", &self.bank.len())
            .field("strategy", &self.solver.strategy())
            .field("tolerance", &self.tolerance)
            .field("lookahead_steps", &self.lookahead_steps)
            .field("fail_safe", &self.fail_safe)
            .finish()
    }
}

impl Certifier {
    /// 由各组件构建
    pub fn new(
        dynamics: GridDynamics,
        bank: BarrierBank,
        grid: &GridConfig,
        config: &CertifierConfig,
    ) -> Result<Self, CoreError> {
        let tolerance = Tolerance::new(config.epsilon, config.convergence)
            .map_err(|e| ConfigError::invalid("certifier.epsilon", config.epsilon, e.to_string()))?;
        let weights = [config.action_weights.battery, config.action_weights.shed];
        if weights.iter().any(|w| !(w.is_finite() && *w > 0.0)) {
            return Err(ConfigError::invalid(
                "certifier.action_weights",
                format!("{:?}", weights),
                "权重必须为正的有限值",
            )
            .into());
        }
        let bounds = action_bounds(grid);
        let fail_safe = [config.fail_safe.battery_kw, config.fail_safe.shed_kw];
        if bounds.violation(&fail_safe) > 0.0 {
            return Err(ConfigError::invalid(
                "certifier.fail_safe",
                format!("{:?}", fail_safe),
                "故障安全动作必须在执行器边界内",
            )
            .into());
        }
        ControlAction::from_slice(&fail_safe)?;
        Ok(Self {
            dynamics,
            bank,
            bounds,
            tolerance,
            max_iterations: config.max_iterations.max(1),
            max_relinearizations: config.max_relinearizations,
            lookahead_steps: config.lookahead_steps,
            weights,
            fail_safe: config.fail_safe,
            solver: create_solver(config.solver, config.warm_start),
            last_certified: None,
        })
    }

    /// 从总配置构建
    pub fn from_config(config: &MonitorConfig) -> Result<Self, CoreError> {
        let dynamics = GridDynamics::new(&config.grid);
        let bank = BarrierBank::from_specs(&config.barriers)?;
        Self::new(dynamics, bank, &config.grid, &config.certifier)
    }

    /// 屏障组
    #[inline]
    pub fn barriers(&self) -> &BarrierBank {
        &self.bank
    }

    /// 动力学模型
    #[inline]
    pub fn dynamics(&self) -> &GridDynamics {
        &self.dynamics
    }

    /// 执行器边界
    #[inline]
    pub fn bounds(&self) -> &ActionBox {
        &self.bounds
    }

    /// 容差
    #[inline]
    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    /// 多步前瞻步数
    #[inline]
    pub fn lookahead_steps(&self) -> usize {
        self.lookahead_steps
    }

    /// 设置多步前瞻步数（小于 2 时关闭）
    pub fn set_lookahead_steps(&mut self, steps: usize) {
        self.lookahead_steps = steps;
    }

    /// 清除跨步状态（保持动作与求解器缓存）
    pub fn reset(&mut self) {
        self.last_certified = None;
        self.solver.reset();
    }

    /// 当前故障安全动作
    pub fn fail_safe_action(&self) -> ControlAction {
        let fixed = ControlAction::from_array([self.fail_safe.battery_kw, self.fail_safe.shed_kw]);
        match self.fail_safe.policy {
            FailSafePolicy::Fixed => fixed,
            FailSafePolicy::HoldLast => self.last_certified.unwrap_or(fixed),
        }
    }

    /// 计算动作的各约束裕度
    pub fn evaluate(
        &self,
        state: &GridState,
        action: &ControlAction,
        set: &UncertaintySet,
    ) -> Result<Vec<ConstraintMargin>, ModelError> {
        let next = self.dynamics.nominal(state, action, set.center())?;
        let e = self.dynamics.disturbance_jacobian();
        Ok(self
            .bank
            .iter()
            .map(|barrier| {
                let h_current = barrier.value(state);
                let h_predicted = barrier.value(&next);
                let delta = set.margin(&barrier.gradient(&next), &barrier.curvature(), &e);
                let slack = h_predicted - delta - (1.0 - barrier.decay_rate()) * h_current;
                ConstraintMargin {
                    name: barrier.name().to_string(),
                    h_current,
                    delta,
                    h_predicted,
                    slack,
                }
            })
            .collect())
    }

    /// 多步前瞻
    ///
    /// 保持 `action` 不变，以集合中心外推第 2..=H 步，对每个屏障记录
    /// 收紧条件首次不满足的步数。第 1 步即认证步本身，不在此重复检查。
    /// 外推状态超出模型定义域时停止外推。
    pub fn lookahead(
        &self,
        state: &GridState,
        action: &ControlAction,
        set: &UncertaintySet,
    ) -> Vec<EarlyWarning> {
        let mut warnings: Vec<EarlyWarning> = Vec::new();
        if self.lookahead_steps < 2 {
            return warnings;
        }
        let e = self.dynamics.disturbance_jacobian();
        let mut current = match self.dynamics.nominal(state, action, set.center()) {
            Ok(next) => next,
            Err(_) => return warnings,
        };
        for step in 2..=self.lookahead_steps {
            let next = match self.dynamics.nominal(&current, action, set.center()) {
                Ok(next) => next,
                Err(err) => {
                    debug!(tick = state.tick(), step, error = %err, "前瞻外推越界，停止");
                    break;
                }
            };
            for barrier in self.bank.iter() {
                if warnings.iter().any(|w| w.constraint == barrier.name()) {
                    continue;
                }
                let delta = set.margin(&barrier.gradient(&next), &barrier.curvature(), &e);
                let slack = barrier.value(&next)
                    - delta
                    - (1.0 - barrier.decay_rate()) * barrier.value(&current);
                if !self.tolerance.is_safe(slack) {
                    warnings.push(EarlyWarning {
                        constraint: barrier.name().to_string(),
                        step,
                        slack,
                    });
                }
            }
            current = next;
        }
        for w in &warnings {
            debug!(
                tick = state.tick(),
                constraint = %w.constraint,
                step = w.step,
                slack = w.slack,
                "前瞻预警"
            );
        }
        warnings
    }

    /// 不做过滤，原样放行提案动作
    ///
    /// 裕度与前瞻预警照常计算，便于与认证结果并排比较。
    pub fn pass_through(
        &self,
        state: &GridState,
        action: &ControlAction,
        set: &UncertaintySet,
    ) -> Result<CertificationResult, ModelError> {
        let margins = self.evaluate(state, action, set)?;
        let mut diagnostics = SolverDiagnostics::idle(self.solver.strategy());
        diagnostics.early_warnings = self.lookahead(state, action, set);
        Ok(CertificationResult {
            tick: state.tick(),
            original: *action,
            certified: *action,
            margins,
            verdict: Verdict::Unfiltered,
            diagnostics,
            requires_escalation: false,
        })
    }

    /// 认证提案动作
    pub fn certify(
        &mut self,
        state: &GridState,
        action: &ControlAction,
        set: &UncertaintySet,
    ) -> Result<CertificationResult, ModelError> {
        self.certify_with_cancel(state, action, set, &CancelToken::new())
    }

    /// 认证提案动作，求解过程中响应取消
    pub fn certify_with_cancel(
        &mut self,
        state: &GridState,
        action: &ControlAction,
        set: &UncertaintySet,
        cancel: &CancelToken,
    ) -> Result<CertificationResult, ModelError> {
        let eps = self.tolerance.epsilon;
        let margins = self.evaluate(state, action, set)?;
        let in_bounds = self.bounds.violation(&action.to_array()) <= eps;

        if in_bounds && margins.iter().all(|m| m.is_satisfied(&self.tolerance)) {
            debug!(tick = state.tick(), "提案动作安全");
            self.last_certified = Some(*action);
            let mut diagnostics = SolverDiagnostics::idle(self.solver.strategy());
            diagnostics.early_warnings = self.lookahead(state, action, set);
            return Ok(CertificationResult {
                tick: state.tick(),
                original: *action,
                certified: *action,
                margins,
                verdict: Verdict::Safe,
                diagnostics,
                requires_escalation: false,
            });
        }

        let (solution, mut diagnostics) = self.correct(state, action, set, cancel)?;
        match solution {
            Some((certified, corrected_margins)) => {
                warn!(
                    tick = state.tick(),
                    battery_kw = certified.battery_kw(),
                    shed_kw = certified.shed_kw(),
                    proposed_battery_kw = action.battery_kw(),
                    proposed_shed_kw = action.shed_kw(),
                    iterations = diagnostics.iterations,
                    "提案动作已修正"
                );
                self.last_certified = Some(certified);
                diagnostics.early_warnings = self.lookahead(state, &certified, set);
                Ok(CertificationResult {
                    tick: state.tick(),
                    original: *action,
                    certified,
                    margins: corrected_margins,
                    verdict: Verdict::Corrected,
                    diagnostics,
                    requires_escalation: false,
                })
            }
            None => {
                let fallback = self.fail_safe_action();
                let reason = diagnostics
                    .failure
                    .as_ref()
                    .map(|f| f.to_string())
                    .unwrap_or_default();
                error!(
                    tick = state.tick(),
                    battery_kw = fallback.battery_kw(),
                    shed_kw = fallback.shed_kw(),
                    reason = %reason,
                    "无可认证动作，切换到故障安全动作"
                );
                diagnostics.early_warnings = self.lookahead(state, &fallback, set);
                Ok(CertificationResult {
                    tick: state.tick(),
                    original: *action,
                    certified: fallback,
                    margins,
                    verdict: Verdict::Infeasible,
                    diagnostics,
                    requires_escalation: true,
                })
            }
        }
    }

    /// 线性化收紧约束
    ///
    /// 返回半空间列表；若某个已违反的约束与动作无关，返回其名称。
    fn linearize(
        &self,
        state: &GridState,
        anchor: &ControlAction,
        set: &UncertaintySet,
    ) -> Result<Result<Vec<HalfSpace>, String>, ModelError> {
        let eps = self.tolerance.epsilon;
        let next = self.dynamics.nominal(state, anchor, set.center())?;
        let b = self.dynamics.action_jacobian(state, anchor);
        let margins = self.evaluate(state, anchor, set)?;
        let u = anchor.to_array();

        let mut rows = Vec::with_capacity(self.bank.len());
        for (barrier, margin) in self.bank.iter().zip(&margins) {
            let g = barrier.gradient(&next);
            let mut a = [0.0; ACTION_DIM];
            for (k, gk) in g.iter().enumerate() {
                for j in 0..ACTION_DIM {
                    a[j] += gk * b[k][j];
                }
            }
            let sensitivity = norm1(&a);
            if sensitivity <= ACTION_SENSITIVITY_FLOOR {
                if !margin.is_satisfied(&self.tolerance) {
                    return Ok(Err(margin.name.clone()));
                }
                continue;
            }
            // 内点目标保证修正量超过 ε
            let target = eps * (1.0 + sensitivity);
            rows.push(HalfSpace {
                normal: a,
                offset: target - margin.slack + dot(&a, &u),
            });
        }
        Ok(Ok(rows))
    }

    /// 求解修正动作，返回 (动作, 裕度) 与诊断
    #[allow(clippy::type_complexity)]
    fn correct(
        &mut self,
        state: &GridState,
        action: &ControlAction,
        set: &UncertaintySet,
        cancel: &CancelToken,
    ) -> Result<(Option<(ControlAction, Vec<ConstraintMargin>)>, SolverDiagnostics), ModelError> {
        let eps = self.tolerance.epsilon;
        let target = action.to_array();
        let settings = IterationSettings {
            max_iterations: self.max_iterations,
            tolerance: self.tolerance.convergence,
        };
        let mut diag = SolverDiagnostics::idle(self.solver.strategy());
        diag.converged = false;

        let mut anchor = *action;
        for round in 0..=self.max_relinearizations {
            diag.relinearizations = round;
            let rows = match self.linearize(state, &anchor, set)? {
                Ok(rows) => rows,
                Err(constraint) => {
                    diag.failure = Some(SolveFailure::EmptyFeasibleSet { constraint });
                    return Ok((None, diag));
                }
            };
            let problem = ProjectionProblem {
                target,
                weights: self.weights,
                constraints: &rows,
                bounds: self.bounds,
            };
            let outcome = self.solver.solve(&problem, &settings, cancel);
            diag.iterations += outcome.iterations;
            diag.max_residual = outcome.residual;
            match outcome.status {
                SolveStatus::Converged => {}
                SolveStatus::Cancelled => {
                    diag.failure = Some(SolveFailure::Cancelled);
                    diag.terminated_early = true;
                    return Ok((None, diag));
                }
                SolveStatus::MaxIterationsReached => {
                    diag.failure = Some(SolveFailure::NotConverged {
                        residual: outcome.residual,
                    });
                    return Ok((None, diag));
                }
            }

            let candidate = ControlAction::from_slice(&self.bounds.clamp(&outcome.solution))?;
            let margins = self.evaluate(state, &candidate, set)?;
            match margins.iter().find(|m| !m.is_satisfied(&self.tolerance)) {
                None => {
                    if max_abs_diff(&candidate.to_array(), &target) <= eps {
                        diag.failure = Some(SolveFailure::NoEffectiveCorrection);
                        return Ok((None, diag));
                    }
                    diag.converged = true;
                    diag.failure = None;
                    return Ok((Some((candidate, margins)), diag));
                }
                Some(failed) => {
                    debug!(
                        tick = state.tick(),
                        constraint = %failed.name,
                        slack = failed.slack,
                        round,
                        "线性化解验证失败，重新线性化"
                    );
                    diag.failure = Some(SolveFailure::VerificationFailed {
                        constraint: failed.name.clone(),
                        slack: failed.slack,
                    });
                    anchor = candidate;
                }
            }
        }
        Ok((None, diag))
    }
}
