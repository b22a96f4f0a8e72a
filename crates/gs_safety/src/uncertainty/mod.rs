// crates/gs_safety/src/uncertainty/mod.rs

//! 不确定性传播
//!
//! - [`set`]: 区间/椭球不确定集与屏障收紧裕度
//! - [`estimator`]: 场景档案 + 信号统计 → 不确定集
//! - [`calibration`]: 在线保形校准因子

pub mod calibration;
pub mod estimator;
pub mod set;

pub use calibration::ConformalCalibrator;
pub use estimator::{ScenarioContext, SignalStatistics, UncertaintyEstimator};
pub use set::UncertaintySet;
