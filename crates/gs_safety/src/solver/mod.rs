// crates/gs_safety/src/solver/mod.rs

//! 最小距离投影求解器
//!
//! 求解
//!
//! ```text
//! min  ‖W^{1/2}(u − u₀)‖²
//! s.t. a_iᵀu >= b_i         (线性化的收紧屏障约束)
//!      lower <= u <= upper  (执行器边界)
//! ```
//!
//! 其中 W 为正对角权重。两种策略：
//!
//! - [`HildrethSolver`]: 对偶坐标上升 QP
//! - [`DykstraSolver`]: Dykstra 交替投影
//!
//! 两者都有固定的迭代上限，并在每轮迭代之间检查取消令牌。

pub mod dykstra;
pub mod hildreth;

pub use dykstra::DykstraSolver;
pub use hildreth::HildrethSolver;

use gs_config::SolverStrategy;
use gs_foundation::vector_ops::dot;

use crate::cancel::CancelToken;
use crate::state::ACTION_DIM;

/// 半空间约束 aᵀu >= b
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfSpace {
    /// 法向量 a
    pub normal: [f64; ACTION_DIM],
    /// 下界 b
    pub offset: f64,
}

impl HalfSpace {
    /// 违反量 max(0, b − aᵀu)
    #[inline]
    pub fn violation(&self, u: &[f64; ACTION_DIM]) -> f64 {
        (self.offset - dot(&self.normal, u)).max(0.0)
    }

    /// 在 W 度量下投影到半空间
    pub(crate) fn project(&self, v: &[f64; ACTION_DIM], inv_w: &[f64; ACTION_DIM]) -> [f64; ACTION_DIM] {
        let gap = self.offset - dot(&self.normal, v);
        if gap <= 0.0 {
            return *v;
        }
        let denom: f64 = (0..ACTION_DIM)
            .map(|j| self.normal[j] * self.normal[j] * inv_w[j])
            .sum();
        let mut out = *v;
        for j in 0..ACTION_DIM {
            out[j] += inv_w[j] * self.normal[j] * gap / denom;
        }
        out
    }
}

/// 执行器边界
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionBox {
    /// 下界
    pub lower: [f64; ACTION_DIM],
    /// 上界
    pub upper: [f64; ACTION_DIM],
}

impl ActionBox {
    /// 截断到边界内
    pub fn clamp(&self, u: &[f64; ACTION_DIM]) -> [f64; ACTION_DIM] {
        let mut out = *u;
        for j in 0..ACTION_DIM {
            out[j] = out[j].clamp(self.lower[j], self.upper[j]);
        }
        out
    }

    /// 越界量（∞ 范数）
    pub fn violation(&self, u: &[f64; ACTION_DIM]) -> f64 {
        (0..ACTION_DIM)
            .map(|j| (self.lower[j] - u[j]).max(u[j] - self.upper[j]).max(0.0))
            .fold(0.0, f64::max)
    }

    /// 展开为 2·n 个半空间
    pub(crate) fn half_spaces(&self) -> Vec<HalfSpace> {
        let mut out = Vec::with_capacity(2 * ACTION_DIM);
        for j in 0..ACTION_DIM {
            let mut e = [0.0; ACTION_DIM];
            e[j] = 1.0;
            out.push(HalfSpace {
                normal: e,
                offset: self.lower[j],
            });
            e[j] = -1.0;
            out.push(HalfSpace {
                normal: e,
                offset: -self.upper[j],
            });
        }
        out
    }
}

/// 投影问题
#[derive(Debug, Clone, Copy)]
pub struct ProjectionProblem<'a> {
    /// 目标点 u₀
    pub target: [f64; ACTION_DIM],
    /// 对角权重 W
    pub weights: [f64; ACTION_DIM],
    /// 线性约束
    pub constraints: &'a [HalfSpace],
    /// 执行器边界
    pub bounds: ActionBox,
}

impl ProjectionProblem<'_> {
    /// W⁻¹
    pub(crate) fn inverse_weights(&self) -> [f64; ACTION_DIM] {
        let mut inv = [0.0; ACTION_DIM];
        for j in 0..ACTION_DIM {
            inv[j] = 1.0 / self.weights[j];
        }
        inv
    }

    /// 候选解的最大约束违反量（含边界）
    pub fn max_violation(&self, u: &[f64; ACTION_DIM]) -> f64 {
        self.constraints
            .iter()
            .map(|c| c.violation(u))
            .fold(self.bounds.violation(u), f64::max)
    }
}

/// 迭代设置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationSettings {
    /// 最大迭代轮数
    pub max_iterations: usize,
    /// 收敛容差
    pub tolerance: f64,
}

/// 求解状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// 收敛
    Converged,
    /// 达到最大迭代次数
    MaxIterationsReached,
    /// 被取消
    Cancelled,
}

/// 求解结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveOutcome {
    /// 求解状态
    pub status: SolveStatus,
    /// 最终迭代点
    pub solution: [f64; ACTION_DIM],
    /// 迭代轮数
    pub iterations: usize,
    /// 最终最大约束违反量
    pub residual: f64,
}

impl SolveOutcome {
    /// 是否收敛
    #[inline]
    pub fn is_converged(&self) -> bool {
        self.status == SolveStatus::Converged
    }
}

/// 投影求解器接口
pub trait ProjectionSolver: Send {
    /// 求解投影问题
    fn solve(
        &mut self,
        problem: &ProjectionProblem<'_>,
        settings: &IterationSettings,
        cancel: &CancelToken,
    ) -> SolveOutcome;

    /// 策略
    fn strategy(&self) -> SolverStrategy;

    /// 清除跨步缓存
    fn reset(&mut self) {}
}

/// 按策略创建求解器
pub fn create_solver(strategy: SolverStrategy, warm_start: bool) -> Box<dyn ProjectionSolver> {
    match strategy {
        SolverStrategy::Qp => Box::new(HildrethSolver::new(warm_start)),
        SolverStrategy::Projection => Box::new(DykstraSolver::new()),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// 单个线性约束 + 边界的测试问题
    pub fn line_problem(constraints: &[HalfSpace]) -> ProjectionProblem<'_> {
        ProjectionProblem {
            target: [-20.0, 0.0],
            weights: [1.0, 4.0],
            constraints,
            bounds: ActionBox {
                lower: [-100.0, 0.0],
                upper: [100.0, 40.0],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_space_projection() {
        let c = HalfSpace {
            normal: [1.0, 1.0],
            offset: 2.0,
        };
        let p = c.project(&[0.0, 0.0], &[1.0, 1.0]);
        assert!((p[0] - 1.0).abs() < 1e-12 && (p[1] - 1.0).abs() < 1e-12);
        // 加权：权重大的分量移动少
        let p = c.project(&[0.0, 0.0], &[1.0, 0.25]);
        assert!(p[0] > p[1]);
        assert!(c.violation(&p) < 1e-12);
    }

    #[test]
    fn test_box() {
        let b = ActionBox {
            lower: [-1.0, 0.0],
            upper: [1.0, 2.0],
        };
        assert_eq!(b.clamp(&[3.0, -1.0]), [1.0, 0.0]);
        assert_eq!(b.violation(&[3.0, -1.0]), 2.0);
        assert_eq!(b.half_spaces().len(), 4);
        assert!(b.half_spaces().iter().all(|h| h.violation(&[0.5, 1.0]) == 0.0));
    }

    #[test]
    fn test_strategies_agree() {
        let cons = [HalfSpace {
            normal: [1.0, 1.0],
            offset: 10.0,
        }];
        let problem = test_support::line_problem(&cons);
        let settings = IterationSettings {
            max_iterations: 500,
            tolerance: 1e-10,
        };
        let cancel = CancelToken::new();
        let a = create_solver(SolverStrategy::Qp, false).solve(&problem, &settings, &cancel);
        let b = create_solver(SolverStrategy::Projection, false).solve(&problem, &settings, &cancel);
        assert!(a.is_converged() && b.is_converged());
        // min (b+20)² + 4s², b + s >= 10  =>  b = 4, s = 6
        assert!((a.solution[0] - 4.0).abs() < 1e-6);
        assert!((a.solution[1] - 6.0).abs() < 1e-6);
        for j in 0..ACTION_DIM {
            assert!((a.solution[j] - b.solution[j]).abs() < 1e-6);
        }
    }
}
