// crates/gs_safety/src/uncertainty/set.rs

//! 扰动不确定集
//!
//! 以中心 c、逐维非负半径 r 与形状描述：
//!
//! - 区间：|w_j − c_j| <= r_j
//! - 椭球：Σ ((w_j − c_j)/r_j)² <= 1（r_j = 0 的维度要求 w_j = c_j）

use serde::Serialize;

use gs_config::{SetShape, DISTURBANCE_DIM};
use gs_foundation::vector_ops::{dot, norm2};

use crate::dynamics::DisturbanceJacobian;
use crate::error::ModelError;
use crate::state::{Disturbance, STATE_DIM};

/// 成员判定的绝对容差
const CONTAINS_TOL: f64 = 1e-12;

/// 不确定集
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UncertaintySet {
    center: [f64; DISTURBANCE_DIM],
    radius: [f64; DISTURBANCE_DIM],
    shape: SetShape,
}

impl UncertaintySet {
    /// 创建不确定集，拒绝负半径与非有限值
    pub fn new(
        center: [f64; DISTURBANCE_DIM],
        radius: [f64; DISTURBANCE_DIM],
        shape: SetShape,
    ) -> Result<Self, ModelError> {
        for (index, &value) in radius.iter().enumerate() {
            if !value.is_finite() || value < 0.0 {
                return Err(ModelError::InvalidRadius { index, value });
            }
        }
        Disturbance::from_slice(&center)?;
        Ok(Self {
            center,
            radius,
            shape,
        })
    }

    /// 区间集合
    pub fn interval(
        center: [f64; DISTURBANCE_DIM],
        radius: [f64; DISTURBANCE_DIM],
    ) -> Result<Self, ModelError> {
        Self::new(center, radius, SetShape::Interval)
    }

    /// 椭球集合
    pub fn ellipsoid(
        center: [f64; DISTURBANCE_DIM],
        radius: [f64; DISTURBANCE_DIM],
    ) -> Result<Self, ModelError> {
        Self::new(center, radius, SetShape::Ellipsoid)
    }

    /// 名义集合（零中心、零半径）
    pub const fn nominal() -> Self {
        Self {
            center: [0.0; DISTURBANCE_DIM],
            radius: [0.0; DISTURBANCE_DIM],
            shape: SetShape::Interval,
        }
    }

    /// 中心
    #[inline]
    pub fn center(&self) -> &[f64; DISTURBANCE_DIM] {
        &self.center
    }

    /// 半径
    #[inline]
    pub fn radius(&self) -> &[f64; DISTURBANCE_DIM] {
        &self.radius
    }

    /// 形状
    #[inline]
    pub fn shape(&self) -> SetShape {
        self.shape
    }

    /// 半径全为零
    pub fn is_nominal(&self) -> bool {
        self.radius.iter().all(|&r| r == 0.0)
    }

    /// 扰动是否落在集合内
    pub fn contains(&self, w: &Disturbance) -> bool {
        let w = w.to_array();
        match self.shape {
            SetShape::Interval => (0..DISTURBANCE_DIM)
                .all(|j| (w[j] - self.center[j]).abs() <= self.radius[j] + CONTAINS_TOL),
            SetShape::Ellipsoid => {
                let mut q = 0.0;
                for j in 0..DISTURBANCE_DIM {
                    let d = w[j] - self.center[j];
                    if self.radius[j] > 0.0 {
                        q += (d / self.radius[j]).powi(2);
                    } else if d.abs() > CONTAINS_TOL {
                        return false;
                    }
                }
                q <= 1.0 + CONTAINS_TOL
            }
        }
    }

    /// 同中心、同形状且逐维半径不小于 other
    pub fn dominates(&self, other: &UncertaintySet) -> bool {
        self.shape == other.shape
            && self.center == other.center
            && self
                .radius
                .iter()
                .zip(other.radius.iter())
                .all(|(a, b)| a >= b)
    }

    /// 屏障收紧裕度 δ >= 0
    ///
    /// `gradient` 为 ∇h 在名义下一状态处的值，`curvature` 为 Hessian 对角上界，
    /// `e` 为扰动雅可比。一阶项对线性屏障是精确最坏值，二阶项给出曲率上界。
    pub fn margin(
        &self,
        gradient: &[f64; STATE_DIM],
        curvature: &[f64; STATE_DIM],
        e: &DisturbanceJacobian,
    ) -> f64 {
        if self.is_nominal() {
            return 0.0;
        }
        // gᵀE
        let mut ge = [0.0; DISTURBANCE_DIM];
        for (k, row) in e.iter().enumerate() {
            for j in 0..DISTURBANCE_DIM {
                ge[j] += gradient[k] * row[j];
            }
        }
        match self.shape {
            SetShape::Interval => {
                let first: f64 = (0..DISTURBANCE_DIM)
                    .map(|j| ge[j].abs() * self.radius[j])
                    .sum();
                let second: f64 = e
                    .iter()
                    .zip(curvature)
                    .map(|(row, hk)| {
                        let spread: f64 = (0..DISTURBANCE_DIM)
                            .map(|j| row[j].abs() * self.radius[j])
                            .sum();
                        hk.abs() * spread * spread
                    })
                    .sum();
                first + 0.5 * second
            }
            SetShape::Ellipsoid => {
                let scale = |v: &[f64; DISTURBANCE_DIM]| {
                    let mut out = [0.0; DISTURBANCE_DIM];
                    for j in 0..DISTURBANCE_DIM {
                        out[j] = v[j] * self.radius[j];
                    }
                    out
                };
                let first = norm2(&scale(&ge));
                let second: f64 = e
                    .iter()
                    .zip(curvature)
                    .map(|(row, hk)| {
                        let scaled = scale(row);
                        hk.abs() * dot(&scaled, &scaled)
                    })
                    .sum();
                first + 0.5 * second
            }
        }
    }
}

impl Default for UncertaintySet {
    fn default() -> Self {
        Self::nominal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::GridDynamics;
    use gs_config::GridConfig;

    #[test]
    fn test_negative_radius_rejected() {
        assert!(matches!(
            UncertaintySet::interval([0.0; 4], [1.0, -0.1, 0.0, 0.0]),
            Err(ModelError::InvalidRadius { index: 1, .. })
        ));
        assert!(UncertaintySet::interval([0.0; 4], [f64::NAN, 0.0, 0.0, 0.0]).is_err());
    }

    #[test]
    fn test_contains() {
        let set = UncertaintySet::interval([0.0, 1.0, 0.0, 0.0], [2.0, 2.0, 0.0, 0.1]).unwrap();
        let inside = Disturbance::from_slice(&[1.5, -0.5, 0.0, 0.05]).unwrap();
        let outside = Disturbance::from_slice(&[0.0, 3.5, 0.0, 0.0]).unwrap();
        assert!(set.contains(&inside));
        assert!(!set.contains(&outside));

        let ell = UncertaintySet::ellipsoid([0.0; 4], [2.0, 2.0, 0.0, 0.0]).unwrap();
        let corner = Disturbance::from_slice(&[1.9, 1.9, 0.0, 0.0]).unwrap();
        assert!(set.contains(&corner));
        assert!(!ell.contains(&corner));
        let axis = Disturbance::from_slice(&[2.0, 0.0, 0.0, 0.0]).unwrap();
        assert!(ell.contains(&axis));
    }

    #[test]
    fn test_nominal() {
        let set = UncertaintySet::nominal();
        assert!(set.is_nominal());
        assert!(set.contains(&Disturbance::zero()));
        let e = GridDynamics::new(&GridConfig::default()).disturbance_jacobian();
        assert_eq!(set.margin(&[1.0; 6], &[2.0; 6], &e), 0.0);
    }

    #[test]
    fn test_linear_margin_is_exact_worst_case() {
        let e = GridDynamics::new(&GridConfig::default()).disturbance_jacobian();
        // h = limit - line：δ = r_pv + r_load
        let mut g = [0.0; STATE_DIM];
        g[1] = -1.0;
        let set = UncertaintySet::interval([0.0; 4], [3.0, 2.0, 0.01, 0.1]).unwrap();
        assert!((set.margin(&g, &[0.0; STATE_DIM], &e) - 5.0).abs() < 1e-12);
        let ell = UncertaintySet::ellipsoid([0.0; 4], [3.0, 4.0, 0.01, 0.1]).unwrap();
        assert!((ell.margin(&g, &[0.0; STATE_DIM], &e) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_curvature_term() {
        let e = GridDynamics::new(&GridConfig::default()).disturbance_jacobian();
        // 荷电状态只受 w_soc 影响：½·|H|·r² = ½·2·0.01²
        let mut curvature = [0.0; STATE_DIM];
        curvature[0] = 2.0;
        let g = [0.0; STATE_DIM];
        let radius = [3.0, 2.0, 0.01, 0.1];
        let set = UncertaintySet::interval([0.0; 4], radius).unwrap();
        let ell = UncertaintySet::ellipsoid([0.0; 4], radius).unwrap();
        assert!((set.margin(&g, &curvature, &e) - 1e-4).abs() < 1e-12);
        assert!((ell.margin(&g, &curvature, &e) - 1e-4).abs() < 1e-12);
    }

    #[test]
    fn test_dominates() {
        let small = UncertaintySet::interval([0.0; 4], [1.0, 1.0, 0.0, 0.0]).unwrap();
        let big = UncertaintySet::interval([0.0; 4], [2.0, 1.0, 0.1, 0.0]).unwrap();
        assert!(big.dominates(&small));
        assert!(!small.dominates(&big));
        assert!(small.dominates(&small));
    }
}
