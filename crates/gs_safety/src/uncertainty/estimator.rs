// crates/gs_safety/src/uncertainty/estimator.rs

//! 不确定性估计器
//!
//! 由场景、实时信号统计与校准因子计算下一步扰动的不确定集。
//! 估计是纯函数：相同上下文得到逐位相同的集合。

use serde::Serialize;

use gs_config::{DisturbanceProfile, ScenarioKind, ScenarioProfiles, DISTURBANCE_DIM};
use gs_foundation::RunningStats;

use crate::error::UncertaintyConfigError;
use crate::state::Disturbance;
use crate::uncertainty::set::UncertaintySet;

/// 扰动信号的在线统计（逐维）
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SignalStatistics {
    dims: [RunningStats; DISTURBANCE_DIM],
}

impl SignalStatistics {
    /// 创建空统计
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入一次实测扰动
    pub fn push(&mut self, w: &Disturbance) {
        for (stats, value) in self.dims.iter_mut().zip(w.to_array()) {
            stats.push(value);
        }
    }

    /// 样本数
    pub fn count(&self) -> u64 {
        self.dims[0].count()
    }

    /// 逐维标准差
    pub fn std_dev(&self) -> [f64; DISTURBANCE_DIM] {
        let mut out = [0.0; DISTURBANCE_DIM];
        for (o, s) in out.iter_mut().zip(self.dims.iter()) {
            *o = s.std_dev();
        }
        out
    }

    /// 重置
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 场景上下文
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScenarioContext {
    /// 场景
    pub scenario: ScenarioKind,
    /// 逐维信号标准差 σ
    pub sigma: [f64; DISTURBANCE_DIM],
    /// 校准因子 η
    pub calibration_factor: f64,
}

impl ScenarioContext {
    /// 零统计、η = 1 的上下文
    pub fn new(scenario: ScenarioKind) -> Self {
        Self {
            scenario,
            sigma: [0.0; DISTURBANCE_DIM],
            calibration_factor: 1.0,
        }
    }

    /// 设置 σ
    pub fn with_sigma(mut self, sigma: [f64; DISTURBANCE_DIM]) -> Self {
        self.sigma = sigma;
        self
    }

    /// 设置 η
    pub fn with_calibration(mut self, factor: f64) -> Self {
        self.calibration_factor = factor;
        self
    }
}

/// 不确定性估计器
#[derive(Debug, Clone, PartialEq)]
pub struct UncertaintyEstimator {
    profiles: [DisturbanceProfile; 4],
}

fn ordinal(kind: ScenarioKind) -> usize {
    match kind {
        ScenarioKind::Normal => 0,
        ScenarioKind::Heatwave => 1,
        ScenarioKind::CloudCover => 2,
        ScenarioKind::CyberAttack => 3,
    }
}

impl UncertaintyEstimator {
    /// 构建估计器，任一场景缺失档案或参数非法即失败
    pub fn new(profiles: &ScenarioProfiles) -> Result<Self, UncertaintyConfigError> {
        let fetch = |kind: ScenarioKind| -> Result<DisturbanceProfile, UncertaintyConfigError> {
            let profile = profiles
                .get(kind)
                .ok_or(UncertaintyConfigError::MissingProfile(kind))?;
            check_profile(kind, profile)?;
            Ok(profile.clone())
        };
        Ok(Self {
            profiles: [
                fetch(ScenarioKind::Normal)?,
                fetch(ScenarioKind::Heatwave)?,
                fetch(ScenarioKind::CloudCover)?,
                fetch(ScenarioKind::CyberAttack)?,
            ],
        })
    }

    /// 场景档案
    pub fn profile(&self, kind: ScenarioKind) -> &DisturbanceProfile {
        &self.profiles[ordinal(kind)]
    }

    /// 估计不确定集
    ///
    /// 半径取本场景半径与所有更平稳场景半径的逐维最大值，
    /// 更严峻的场景不会在任何维度上给出更小的集合。
    pub fn estimate(&self, ctx: &ScenarioContext) -> Result<UncertaintySet, UncertaintyConfigError> {
        if !ctx.calibration_factor.is_finite() || ctx.calibration_factor < 0.0 {
            return Err(UncertaintyConfigError::InvalidContext {
                field: "calibration_factor",
                value: ctx.calibration_factor,
            });
        }
        if let Some(&bad) = ctx.sigma.iter().find(|s| !s.is_finite() || **s < 0.0) {
            return Err(UncertaintyConfigError::InvalidContext {
                field: "sigma",
                value: bad,
            });
        }

        let mut radius = self.raw_radius(ctx.scenario, ctx);
        for calmer in ScenarioKind::ALL {
            if calmer.is_calmer_than(ctx.scenario) {
                let r = self.raw_radius(calmer, ctx);
                for j in 0..DISTURBANCE_DIM {
                    radius[j] = radius[j].max(r[j]);
                }
            }
        }

        let profile = self.profile(ctx.scenario);
        UncertaintySet::new(profile.bias.to_array(), radius, profile.shape).map_err(|_| {
            UncertaintyConfigError::InvalidProfile {
                scenario: ctx.scenario,
                field: "radius".into(),
                value: f64::NAN,
            }
        })
    }

    /// 单个场景自身的半径（不含包络）
    fn raw_radius(&self, kind: ScenarioKind, ctx: &ScenarioContext) -> [f64; DISTURBANCE_DIM] {
        let profile = self.profile(kind);
        let floor = profile.radius_floor.to_array();
        let z = profile.sigma_multiplier;
        let mut r = [0.0; DISTURBANCE_DIM];
        for j in 0..DISTURBANCE_DIM {
            r[j] = floor[j].max(z * ctx.calibration_factor * ctx.sigma[j]);
        }
        // 对抗档案不受校准收缩
        if let Some(worst) = &profile.worst_case {
            for (rj, wj) in r.iter_mut().zip(worst.to_array()) {
                *rj = rj.max(wj);
            }
        }
        r
    }
}

fn check_profile(kind: ScenarioKind, profile: &DisturbanceProfile) -> Result<(), UncertaintyConfigError> {
    let invalid = |field: String, value: f64| UncertaintyConfigError::InvalidProfile {
        scenario: kind,
        field,
        value,
    };
    if !profile.sigma_multiplier.is_finite() || profile.sigma_multiplier < 0.0 {
        return Err(invalid("sigma_multiplier".into(), profile.sigma_multiplier));
    }
    let names = gs_config::DisturbanceVector::NAMES;
    for (name, v) in names.iter().zip(profile.radius_floor.to_array()) {
        if !v.is_finite() || v < 0.0 {
            return Err(invalid(format!("radius_floor.{}", name), v));
        }
    }
    for (name, v) in names.iter().zip(profile.bias.to_array()) {
        if !v.is_finite() {
            return Err(invalid(format!("bias.{}", name), v));
        }
    }
    if let Some(worst) = &profile.worst_case {
        for (name, v) in names.iter().zip(worst.to_array()) {
            if !v.is_finite() || v < 0.0 {
                return Err(invalid(format!("worst_case.{}", name), v));
            }
        }
    }
    Ok(())
}
