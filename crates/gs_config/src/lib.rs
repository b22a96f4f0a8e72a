// crates/gs_config/src/lib.rs

//! GridShield Config Layer (Layer 2)
//!
//! 配置层，提供电网参数、屏障定义、场景扰动档案与认证器设置。
//! 本层只描述数据，不包含任何求解逻辑。
//!
//! # 模块概览
//!
//! - [`monitor_config`]: MonitorConfig 总配置（全 f64，JSON 序列化）
//! - [`barrier_spec`]: 带标签的屏障约束定义
//! - [`scenario`]: 场景枚举与扰动档案
//! - [`strategy`]: 求解/故障安全/提案策略与过滤模式枚举
//! - [`error`]: 配置错误类型
//!
//! # 层级架构
//!
//! ```text
//! Layer 5: gs_cli        ─> 加载 MonitorConfig，驱动仿真
//! Layer 3: gs_safety     ─> 将配置解析为屏障组、估计器与认证器
//! Layer 2: gs_config     ─> MonitorConfig (本层)
//! Layer 1: gs_foundation
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod barrier_spec;
pub mod error;
pub mod monitor_config;
pub mod scenario;
pub mod strategy;

/// 层级标识
pub const LAYER: u8 = 2;

// 重导出核心类型
pub use barrier_spec::{default_barriers, BarrierKindSpec, BarrierSpec};
pub use error::ConfigError;
pub use monitor_config::{
    ActionWeights, CalibrationConfig, CertifierConfig, ExogenousConfig, FailSafeConfig,
    GridConfig, InitialStateConfig, MonitorConfig, SimulationConfig,
};
pub use scenario::{
    DisturbanceProfile, DisturbanceVector, ScenarioKind, ScenarioParseError, ScenarioProfiles,
    SetShape, DISTURBANCE_DIM,
};
pub use strategy::{FailSafePolicy, FilterMode, PolicyKind, SolverStrategy, StrategyParseError};
