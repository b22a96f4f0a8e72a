// crates/gs_safety/src/solver/hildreth.rs

//! Hildreth 对偶坐标上升 QP
//!
//! 对 `min ½(u − u₀)ᵀW(u − u₀), Au >= b` 的对偶问题逐坐标上升：
//!
//! ```text
//! u   = u₀ + W⁻¹Aᵀλ,   λ >= 0
//! λ_i ← max(0, λ_i + (b_i − a_iᵀu) / (a_iᵀW⁻¹a_i))
//! ```
//!
//! 执行器边界作为额外的 2n 行参与迭代。约束集为空时 λ 发散，
//! 迭代在上限处停止并报告未收敛。

use gs_config::SolverStrategy;
use gs_foundation::vector_ops::dot;

use super::{
    HalfSpace, IterationSettings, ProjectionProblem, ProjectionSolver, SolveOutcome, SolveStatus,
};
use crate::cancel::CancelToken;
use crate::state::ACTION_DIM;

/// Hildreth 求解器
#[derive(Debug, Clone, Default)]
pub struct HildrethSolver {
    warm_start: bool,
    duals: Vec<f64>,
}

impl HildrethSolver {
    /// 创建求解器
    pub fn new(warm_start: bool) -> Self {
        Self {
            warm_start,
            duals: Vec::new(),
        }
    }
}

impl ProjectionSolver for HildrethSolver {
    fn solve(
        &mut self,
        problem: &ProjectionProblem<'_>,
        settings: &IterationSettings,
        cancel: &CancelToken,
    ) -> SolveOutcome {
        let inv_w = problem.inverse_weights();
        let rows: Vec<HalfSpace> = problem
            .constraints
            .iter()
            .copied()
            .chain(problem.bounds.half_spaces())
            .collect();
        let diag: Vec<f64> = rows
            .iter()
            .map(|r| (0..ACTION_DIM).map(|j| r.normal[j] * r.normal[j] * inv_w[j]).sum())
            .collect();

        let mut lambda = if self.warm_start && self.duals.len() == rows.len() {
            self.duals.clone()
        } else {
            vec![0.0; rows.len()]
        };

        let mut u = problem.target;
        for (row, &l) in rows.iter().zip(&lambda) {
            for j in 0..ACTION_DIM {
                u[j] += inv_w[j] * row.normal[j] * l;
            }
        }

        let mut status = SolveStatus::MaxIterationsReached;
        let mut iterations = 0;
        for iter in 1..=settings.max_iterations {
            if cancel.is_cancelled() {
                status = SolveStatus::Cancelled;
                break;
            }
            iterations = iter;
            let mut max_change = 0.0f64;
            for (i, row) in rows.iter().enumerate() {
                if diag[i] <= f64::MIN_POSITIVE {
                    continue;
                }
                let gap = row.offset - dot(&row.normal, &u);
                let updated = (lambda[i] + gap / diag[i]).max(0.0);
                let delta = updated - lambda[i];
                if delta != 0.0 {
                    for j in 0..ACTION_DIM {
                        let step = inv_w[j] * row.normal[j] * delta;
                        u[j] += step;
                        max_change = max_change.max(step.abs());
                    }
                    lambda[i] = updated;
                }
            }
            if max_change <= settings.tolerance && problem.max_violation(&u) <= settings.tolerance {
                status = SolveStatus::Converged;
                break;
            }
        }

        if self.warm_start {
            self.duals = lambda;
        }

        SolveOutcome {
            status,
            solution: u,
            iterations,
            residual: problem.max_violation(&u),
        }
    }

    fn strategy(&self) -> SolverStrategy {
        SolverStrategy::Qp
    }

    fn reset(&mut self) {
        self.duals.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::test_support::line_problem;

    fn settings() -> IterationSettings {
        IterationSettings {
            max_iterations: 500,
            tolerance: 1e-10,
        }
    }

    #[test]
    fn test_unconstrained_returns_target() {
        let problem = line_problem(&[]);
        let out = HildrethSolver::new(false).solve(&problem, &settings(), &CancelToken::new());
        assert!(out.is_converged());
        assert_eq!(out.solution, [-20.0, 0.0]);
        assert_eq!(out.iterations, 1);
    }

    #[test]
    fn test_conflicting_constraints_not_converged() {
        let cons = [HalfSpace {
            normal: [-1.0, 0.0],
            offset: 150.0,
        }];
        // b <= -150 与边界 b >= -100 冲突
        let problem = line_problem(&cons);
        let out = HildrethSolver::new(false).solve(&problem, &settings(), &CancelToken::new());
        assert!(!out.is_converged());
        assert_eq!(out.iterations, 500);
        assert!(out.residual > 1.0);
    }

    #[test]
    fn test_two_active_constraints() {
        let cons = [
            HalfSpace {
                normal: [1.0, 1.0],
                offset: 10.0,
            },
            HalfSpace {
                normal: [-1.0, 0.0],
                offset: -2.0,
            },
        ];
        // b + s >= 10, b <= 2  =>  b = 2, s = 8
        let problem = line_problem(&cons);
        let out = HildrethSolver::new(false).solve(&problem, &settings(), &CancelToken::new());
        assert!(out.is_converged());
        assert!((out.solution[0] - 2.0).abs() < 1e-8);
        assert!((out.solution[1] - 8.0).abs() < 1e-8);
    }

    #[test]
    fn test_cancelled_before_first_sweep() {
        let token = CancelToken::new();
        token.cancel();
        let cons = [HalfSpace {
            normal: [1.0, 1.0],
            offset: 10.0,
        }];
        let problem = line_problem(&cons);
        let out = HildrethSolver::new(false).solve(&problem, &settings(), &token);
        assert_eq!(out.status, SolveStatus::Cancelled);
        assert_eq!(out.iterations, 0);
    }

    #[test]
    fn test_warm_start_keeps_duals() {
        let cons = [HalfSpace {
            normal: [1.0, 1.0],
            offset: 10.0,
        }];
        let problem = line_problem(&cons);
        let mut solver = HildrethSolver::new(true);
        let cold = solver.solve(&problem, &settings(), &CancelToken::new());
        let warm = solver.solve(&problem, &settings(), &CancelToken::new());
        assert!(warm.iterations <= cold.iterations);
        assert!((warm.solution[0] - cold.solution[0]).abs() < 1e-8);
        solver.reset();
        assert!(solver.duals.is_empty());
    }
}
