// crates/gs_safety/src/lib.rs

//! GridShield Safety Layer (Layer 3)
//!
//! 微电网数字孪生的不确定性感知控制屏障函数（U-CBF）安全监控器。
//!
//! 给定估计状态与上游控制器的提案动作，判断该动作在有界扰动下能否让系统
//! 保持在安全运行包络内；不能时给出最小修正动作，仍不可行时回退到故障安全动作。
//!
//! # 模块概览
//!
//! - [`state`]: 状态、动作、扰动向量
//! - [`dynamics`]: 离散时间微电网模型及其雅可比
//! - [`uncertainty`]: 不确定集、场景估计器与保形校准
//! - [`barrier`]: 屏障函数库
//! - [`solver`]: 最小距离投影求解器（Hildreth QP / Dykstra 交替投影）
//! - [`certifier`]: U-CBF 认证器
//! - [`driver`]: 场景驱动器、提案策略、外生扰动与观察者
//! - [`compare`]: 多场景、多过滤方式并行对比
//! - [`cancel`]: 协作式取消令牌
//! - [`error`]: 错误类型
//!
//! # 层级架构
//!
//! ```text
//! Layer 5: gs_cli        ─> run / compare / info / validate
//! Layer 3: gs_safety     ─> 本层
//! Layer 2: gs_config     ─> MonitorConfig
//! Layer 1: gs_foundation ─> 容差、验证、向量运算
//! ```
//!
//! # 示例
//!
//! ```
//! use gs_config::MonitorConfig;
//! use gs_safety::{Certifier, ControlAction, GridState, UncertaintySet, Verdict};
//!
//! let mut certifier = Certifier::from_config(&MonitorConfig::default()).unwrap();
//! let state = GridState::steady(0.6, 25.0, 35.0, 230.0).unwrap();
//! let result = certifier
//!     .certify(&state, &ControlAction::idle(), &UncertaintySet::nominal())
//!     .unwrap();
//! assert_eq!(result.verdict, Verdict::Safe);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod barrier;
pub mod cancel;
pub mod certifier;
pub mod compare;
pub mod driver;
pub mod dynamics;
pub mod error;
pub mod solver;
pub mod state;
pub mod uncertainty;

/// 层级标识
pub const LAYER: u8 = 3;

// 重导出核心类型
pub use barrier::{Barrier, BarrierBank, BarrierKind};
pub use cancel::CancelToken;
pub use certifier::{
    action_bounds, CertificationResult, Certifier, ConstraintMargin, EarlyWarning, SolveFailure,
    SolverDiagnostics, Verdict,
};
pub use compare::{compare_methods, compare_scenarios, MethodReport, ScenarioReport};
pub use driver::{
    initial_state, Fault, FixedDispatch, FnObserver, GreedyDispatch, LoggingObserver,
    ProposalPolicy, RunSummary, ScenarioDriver, TickObserver, TickRecord,
};
pub use dynamics::GridDynamics;
pub use error::{BarrierError, CoreError, CoreResult, ModelError, UncertaintyConfigError};
pub use solver::{ActionBox, HalfSpace, ProjectionSolver};
pub use state::{ControlAction, Disturbance, GridState, StateVar, ACTION_DIM, STATE_DIM};
pub use uncertainty::{ConformalCalibrator, ScenarioContext, SignalStatistics, UncertaintySet};
