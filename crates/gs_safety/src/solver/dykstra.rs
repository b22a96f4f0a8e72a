// crates/gs_safety/src/solver/dykstra.rs

//! Dykstra 交替投影
//!
//! 依次投影到每个半空间与执行器边界，并为每个集合保留修正增量，
//! 收敛到交集上（W 度量下）离 u₀ 最近的点。交集为空时不收敛。

use gs_config::SolverStrategy;
use gs_foundation::vector_ops::max_abs_diff;

use super::{IterationSettings, ProjectionProblem, ProjectionSolver, SolveOutcome, SolveStatus};
use crate::cancel::CancelToken;
use crate::state::ACTION_DIM;

/// Dykstra 求解器（无跨步状态）
#[derive(Debug, Clone, Copy, Default)]
pub struct DykstraSolver;

impl DykstraSolver {
    /// 创建求解器
    pub fn new() -> Self {
        Self
    }
}

impl ProjectionSolver for DykstraSolver {
    fn solve(
        &mut self,
        problem: &ProjectionProblem<'_>,
        settings: &IterationSettings,
        cancel: &CancelToken,
    ) -> SolveOutcome {
        let inv_w = problem.inverse_weights();
        let m = problem.constraints.len();
        // 最后一个增量属于执行器边界
        let mut increments = vec![[0.0; ACTION_DIM]; m + 1];
        let mut x = problem.target;

        let mut status = SolveStatus::MaxIterationsReached;
        let mut iterations = 0;
        for iter in 1..=settings.max_iterations {
            if cancel.is_cancelled() {
                status = SolveStatus::Cancelled;
                break;
            }
            iterations = iter;
            let previous = x;
            for (i, p) in increments.iter_mut().enumerate() {
                let mut shifted = x;
                for j in 0..ACTION_DIM {
                    shifted[j] += p[j];
                }
                let y = if i < m {
                    problem.constraints[i].project(&shifted, &inv_w)
                } else {
                    problem.bounds.clamp(&shifted)
                };
                for j in 0..ACTION_DIM {
                    p[j] = shifted[j] - y[j];
                }
                x = y;
            }
            if max_abs_diff(&x, &previous) <= settings.tolerance
                && problem.max_violation(&x) <= settings.tolerance
            {
                status = SolveStatus::Converged;
                break;
            }
        }

        SolveOutcome {
            status,
            solution: x,
            iterations,
            residual: problem.max_violation(&x),
        }
    }

    fn strategy(&self) -> SolverStrategy {
        SolverStrategy::Projection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::test_support::line_problem;
    use crate::solver::HalfSpace;

    fn settings() -> IterationSettings {
        IterationSettings {
            max_iterations: 500,
            tolerance: 1e-10,
        }
    }

    #[test]
    fn test_feasible_target_unchanged() {
        let cons = [HalfSpace {
            normal: [-1.0, 0.0],
            offset: 0.0,
        }];
        let problem = line_problem(&cons);
        let out = DykstraSolver::new().solve(&problem, &settings(), &CancelToken::new());
        assert!(out.is_converged());
        assert_eq!(out.solution, [-20.0, 0.0]);
    }

    #[test]
    fn test_projection_respects_box() {
        let cons = [HalfSpace {
            normal: [1.0, 1.0],
            offset: 135.0,
        }];
        // 无边界时解为 (104, 31)，电池上限生效后为 (100, 35)
        let problem = line_problem(&cons);
        let out = DykstraSolver::new().solve(&problem, &settings(), &CancelToken::new());
        assert!(out.is_converged());
        assert!((out.solution[0] - 100.0).abs() < 1e-6);
        assert!((out.solution[1] - 35.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_intersection_not_converged() {
        let cons = [HalfSpace {
            normal: [1.0, 1.0],
            offset: 500.0,
        }];
        let problem = line_problem(&cons);
        let out = DykstraSolver::new().solve(&problem, &settings(), &CancelToken::new());
        assert_eq!(out.status, SolveStatus::MaxIterationsReached);
        assert!(out.residual > 1.0);
    }
}
