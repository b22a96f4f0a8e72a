// crates/gs_safety/src/barrier.rs

//! 屏障函数库
//!
//! 每个屏障 h(x) 是状态的标量函数，h >= 0 表示安全。
//! 屏障以带标签的变体表示，配置加载时一次性解析，运行期间不可增删。
//!
//! | 变体 | h(x) |
//! |------|------|
//! | `SocMin` | soc − min |
//! | `SocMax` | max − soc |
//! | `LineImport` | limit − line_flow |
//! | `LineExport` | limit + line_flow |
//! | `FrequencyBand` | max_dev² − f² |
//! | `VoltageBand` | 1 − ((V − c)/r)² |

use std::collections::HashSet;

use gs_config::{BarrierKindSpec, BarrierSpec};
use gs_foundation::Tolerance;

use crate::error::BarrierError;
use crate::state::{GridState, StateVar, STATE_DIM};

/// 屏障种类
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BarrierKind {
    /// 荷电状态下限
    SocMin {
        /// 下限 [-]
        min: f64,
    },
    /// 荷电状态上限
    SocMax {
        /// 上限 [-]
        max: f64,
    },
    /// 线路购电极限
    LineImport {
        /// 极限 [kW]
        limit_kw: f64,
    },
    /// 线路售电极限
    LineExport {
        /// 极限 [kW]
        limit_kw: f64,
    },
    /// 频率偏差带
    FrequencyBand {
        /// 最大偏差 [Hz]
        max_dev_hz: f64,
    },
    /// 电压带（以中心与半宽表示）
    VoltageBand {
        /// 中心 [V]
        center_v: f64,
        /// 半宽 [V]
        half_width_v: f64,
    },
}

impl BarrierKind {
    fn from_spec(spec: &BarrierKindSpec) -> Self {
        match *spec {
            BarrierKindSpec::SocMin { min } => Self::SocMin { min },
            BarrierKindSpec::SocMax { max } => Self::SocMax { max },
            BarrierKindSpec::LineImport { limit_kw } => Self::LineImport { limit_kw },
            BarrierKindSpec::LineExport { limit_kw } => Self::LineExport { limit_kw },
            BarrierKindSpec::FrequencyBand { max_dev_hz } => Self::FrequencyBand { max_dev_hz },
            BarrierKindSpec::VoltageBand { min_v, max_v } => Self::VoltageBand {
                center_v: 0.5 * (min_v + max_v),
                half_width_v: 0.5 * (max_v - min_v),
            },
        }
    }

    fn parameters(&self) -> &'static [&'static str] {
        match self {
            Self::SocMin { .. } => &["min"],
            Self::SocMax { .. } => &["max"],
            Self::LineImport { .. } | Self::LineExport { .. } => &["limit_kw"],
            Self::FrequencyBand { .. } => &["max_dev_hz"],
            Self::VoltageBand { .. } => &["center_v", "half_width_v"],
        }
    }

    fn values(&self) -> Vec<f64> {
        match *self {
            Self::SocMin { min } => vec![min],
            Self::SocMax { max } => vec![max],
            Self::LineImport { limit_kw } | Self::LineExport { limit_kw } => vec![limit_kw],
            Self::FrequencyBand { max_dev_hz } => vec![max_dev_hz],
            Self::VoltageBand {
                center_v,
                half_width_v,
            } => vec![center_v, half_width_v],
        }
    }
}

/// 单个屏障约束
#[derive(Debug, Clone, PartialEq)]
pub struct Barrier {
    name: String,
    alpha: f64,
    kind: BarrierKind,
}

impl Barrier {
    /// 创建屏障并校验参数
    pub fn new(name: impl Into<String>, alpha: f64, kind: BarrierKind) -> Result<Self, BarrierError> {
        let name = name.into();
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(BarrierError::InvalidDecayRate { name, alpha });
        }
        for (param, value) in kind.parameters().iter().zip(kind.values()) {
            if !value.is_finite() {
                return Err(BarrierError::InvalidParameter {
                    name,
                    reason: format!("{} 为非有限值", param),
                });
            }
        }
        let degenerate = match kind {
            BarrierKind::FrequencyBand { max_dev_hz } => max_dev_hz <= 0.0,
            BarrierKind::VoltageBand { half_width_v, .. } => half_width_v <= 0.0,
            _ => false,
        };
        if degenerate {
            return Err(BarrierError::InvalidParameter {
                name,
                reason: "安全带宽度必须为正".into(),
            });
        }
        Ok(Self { name, alpha, kind })
    }

    /// 从配置解析
    pub fn from_spec(spec: &BarrierSpec) -> Result<Self, BarrierError> {
        Self::new(spec.resolved_name(), spec.alpha, BarrierKind::from_spec(&spec.kind))
    }

    /// 名称
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// class-K 衰减率 α
    #[inline]
    pub fn decay_rate(&self) -> f64 {
        self.alpha
    }

    /// 种类
    #[inline]
    pub fn kind(&self) -> &BarrierKind {
        &self.kind
    }

    /// 屏障值 h(x)
    pub fn value(&self, state: &GridState) -> f64 {
        self.value_at(&state.to_array())
    }

    /// 梯度 ∇h(x)
    pub fn gradient(&self, state: &GridState) -> [f64; STATE_DIM] {
        self.gradient_at(&state.to_array())
    }

    /// Hessian 对角元绝对值上界
    pub fn curvature(&self) -> [f64; STATE_DIM] {
        let mut h = [0.0; STATE_DIM];
        match self.kind {
            BarrierKind::FrequencyBand { .. } => h[StateVar::FreqDev.index()] = 2.0,
            BarrierKind::VoltageBand { half_width_v, .. } => {
                h[StateVar::Voltage.index()] = 2.0 / (half_width_v * half_width_v)
            }
            _ => {}
        }
        h
    }

    pub(crate) fn value_at(&self, x: &[f64; STATE_DIM]) -> f64 {
        let soc = x[StateVar::Soc.index()];
        let line = x[StateVar::LineFlow.index()];
        match self.kind {
            BarrierKind::SocMin { min } => soc - min,
            BarrierKind::SocMax { max } => max - soc,
            BarrierKind::LineImport { limit_kw } => limit_kw - line,
            BarrierKind::LineExport { limit_kw } => limit_kw + line,
            BarrierKind::FrequencyBand { max_dev_hz } => {
                let f = x[StateVar::FreqDev.index()];
                max_dev_hz * max_dev_hz - f * f
            }
            BarrierKind::VoltageBand {
                center_v,
                half_width_v,
            } => {
                let z = (x[StateVar::Voltage.index()] - center_v) / half_width_v;
                1.0 - z * z
            }
        }
    }

    pub(crate) fn gradient_at(&self, x: &[f64; STATE_DIM]) -> [f64; STATE_DIM] {
        let mut g = [0.0; STATE_DIM];
        match self.kind {
            BarrierKind::SocMin { .. } => g[StateVar::Soc.index()] = 1.0,
            BarrierKind::SocMax { .. } => g[StateVar::Soc.index()] = -1.0,
            BarrierKind::LineImport { .. } => g[StateVar::LineFlow.index()] = -1.0,
            BarrierKind::LineExport { .. } => g[StateVar::LineFlow.index()] = 1.0,
            BarrierKind::FrequencyBand { .. } => {
                let i = StateVar::FreqDev.index();
                g[i] = -2.0 * x[i];
            }
            BarrierKind::VoltageBand {
                center_v,
                half_width_v,
            } => {
                let i = StateVar::Voltage.index();
                g[i] = -2.0 * (x[i] - center_v) / (half_width_v * half_width_v);
            }
        }
        g
    }
}

/// 屏障组，按插入顺序求值
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BarrierBank {
    barriers: Vec<Barrier>,
}

impl BarrierBank {
    /// 创建屏障组，名称必须唯一
    pub fn new(barriers: Vec<Barrier>) -> Result<Self, BarrierError> {
        let mut seen = HashSet::new();
        for b in &barriers {
            if !seen.insert(b.name()) {
                return Err(BarrierError::DuplicateName(b.name().to_string()));
            }
        }
        Ok(Self { barriers })
    }

    /// 从配置解析
    pub fn from_specs(specs: &[BarrierSpec]) -> Result<Self, BarrierError> {
        let barriers = specs
            .iter()
            .map(Barrier::from_spec)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(barriers)
    }

    /// 屏障数量
    #[inline]
    pub fn len(&self) -> usize {
        self.barriers.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.barriers.is_empty()
    }

    /// 遍历屏障
    pub fn iter(&self) -> std::slice::Iter<'_, Barrier> {
        self.barriers.iter()
    }

    /// 按名称查找
    pub fn get(&self, name: &str) -> Option<&Barrier> {
        self.barriers.iter().find(|b| b.name() == name)
    }

    /// 各屏障在给定状态下的值
    pub fn evaluate(&self, state: &GridState) -> Vec<(&str, f64)> {
        self.barriers
            .iter()
            .map(|b| (b.name(), b.value(state)))
            .collect()
    }

    /// 越界（h < -ε）的屏障数量
    pub fn count_violations(&self, state: &GridState, tolerance: &Tolerance) -> usize {
        self.barriers
            .iter()
            .filter(|b| tolerance.is_violated(b.value(state)))
            .count()
    }
}

impl<'a> IntoIterator for &'a BarrierBank {
    type Item = &'a Barrier;
    type IntoIter = std::slice::Iter<'a, Barrier>;

    fn into_iter(self) -> Self::IntoIter {
        self.barriers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gs_config::default_barriers;

    fn state() -> GridState {
        GridState::from_slice(&[0.5, 64.0, 0.2, 236.0, 20.0, 84.0]).unwrap()
    }

    #[test]
    fn test_values() {
        let bank = BarrierBank::from_specs(&default_barriers()).unwrap();
        let x = state();
        let h: Vec<f64> = bank.evaluate(&x).into_iter().map(|(_, v)| v).collect();
        assert!((h[0] - 0.35).abs() < 1e-12);
        assert!((h[1] - 0.45).abs() < 1e-12);
        assert!((h[2] - 16.0).abs() < 1e-12);
        assert!((h[3] - 144.0).abs() < 1e-12);
        assert!((h[4] - (0.64 - 0.04)).abs() < 1e-12);
        assert!((h[5] - 0.75).abs() < 1e-12);
        assert_eq!(bank.count_violations(&x, &Tolerance::default()), 0);
    }

    #[test]
    fn test_violation_count_uses_tolerance() {
        let bank = BarrierBank::from_specs(&default_barriers()).unwrap();
        let tol = Tolerance::new(1e-6, 1e-9).unwrap();
        // 容差内的越界不计数
        let inside = GridState::from_slice(&[0.15 - 5e-7, 0.0, 0.0, 230.0, 10.0, 10.0]).unwrap();
        assert_eq!(bank.count_violations(&inside, &tol), 0);
        let outside = GridState::from_slice(&[0.15 - 5e-6, 0.0, 0.0, 230.0, 10.0, 10.0]).unwrap();
        assert_eq!(bank.count_violations(&outside, &tol), 1);
        let loose = Tolerance::new(1e-5, 1e-9).unwrap();
        assert_eq!(bank.count_violations(&outside, &loose), 0);
    }

    #[test]
    fn test_gradient_matches_finite_difference() {
        let bank = BarrierBank::from_specs(&default_barriers()).unwrap();
        let x = state().to_array();
        let h = 1e-6;
        for b in &bank {
            let g = b.gradient_at(&x);
            for k in 0..STATE_DIM {
                let mut xp = x;
                let mut xm = x;
                xp[k] += h;
                xm[k] -= h;
                let fd = (b.value_at(&xp) - b.value_at(&xm)) / (2.0 * h);
                assert!((fd - g[k]).abs() < 1e-5, "{} 第 {} 维", b.name(), k);
            }
        }
    }

    #[test]
    fn test_invalid_alpha_rejected() {
        let err = Barrier::new("soc_min", 1.5, BarrierKind::SocMin { min: 0.1 }).unwrap_err();
        assert!(matches!(err, BarrierError::InvalidDecayRate { .. }));
        assert!(Barrier::new("soc_min", 0.0, BarrierKind::SocMin { min: 0.1 }).is_err());
        assert!(Barrier::new("soc_min", 1.0, BarrierKind::SocMin { min: 0.1 }).is_ok());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let a = Barrier::new("x", 0.5, BarrierKind::SocMin { min: 0.1 }).unwrap();
        let b = Barrier::new("x", 0.5, BarrierKind::SocMax { max: 0.9 }).unwrap();
        assert!(matches!(
            BarrierBank::new(vec![a, b]),
            Err(BarrierError::DuplicateName(_))
        ));
    }

    #[test]
    fn test_insertion_order_preserved() {
        let specs = default_barriers();
        let bank = BarrierBank::from_specs(&specs).unwrap();
        let names: Vec<&str> = bank.iter().map(|b| b.name()).collect();
        let expected: Vec<&str> = specs.iter().map(|s| s.resolved_name()).collect();
        assert_eq!(names, expected);
    }
}
