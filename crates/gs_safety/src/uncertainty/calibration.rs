// crates/gs_safety/src/uncertainty/calibration.rs

//! 在线保形校准
//!
//! 每步根据实测扰动是否落入估计集合调整校准因子 η：
//!
//! ```text
//! η ← clamp(η + γ·(target − covered), η_min, η_max)
//! ```
//!
//! 漏覆盖时 η 增大，持续覆盖时 η 缓慢回落，长期覆盖率趋近目标值。

use serde::Serialize;

use gs_config::CalibrationConfig;

/// 保形校准器
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConformalCalibrator {
    enabled: bool,
    initial: f64,
    factor: f64,
    learning_rate: f64,
    target: f64,
    min_factor: f64,
    max_factor: f64,
    samples: u64,
    covered: u64,
}

impl ConformalCalibrator {
    /// 从配置创建
    pub fn new(config: &CalibrationConfig) -> Self {
        let factor = config
            .initial_factor
            .clamp(config.min_factor, config.max_factor.max(config.min_factor));
        Self {
            enabled: config.enabled,
            initial: factor,
            factor,
            learning_rate: config.learning_rate,
            target: config.target_coverage,
            min_factor: config.min_factor,
            max_factor: config.max_factor.max(config.min_factor),
            samples: 0,
            covered: 0,
        }
    }

    /// 当前校准因子 η
    #[inline]
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// 记录一次覆盖结果并返回更新后的 η
    pub fn update(&mut self, covered: bool) -> f64 {
        self.samples += 1;
        if covered {
            self.covered += 1;
        }
        if self.enabled {
            let hit = if covered { 1.0 } else { 0.0 };
            self.factor = (self.factor + self.learning_rate * (self.target - hit))
                .clamp(self.min_factor, self.max_factor);
        }
        self.factor
    }

    /// 经验覆盖率（无样本时为 1）
    pub fn empirical_coverage(&self) -> f64 {
        if self.samples == 0 {
            1.0
        } else {
            self.covered as f64 / self.samples as f64
        }
    }

    /// 样本数
    #[inline]
    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// 恢复初始状态
    pub fn reset(&mut self) {
        self.factor = self.initial;
        self.samples = 0;
        self.covered = 0;
    }
}
