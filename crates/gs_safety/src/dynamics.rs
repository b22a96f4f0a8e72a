// crates/gs_safety/src/dynamics.rs

//! 离散时间微电网动力学
//!
//! 以 Δt（小时）、电池功率 b（正为放电）、切负荷 s、扰动 w 表示：
//!
//! ```text
//! pv'   = pv + w_pv
//! load' = load + w_load
//! line' = load' - s - pv' - b
//! soc'  = soc - Δt·b/(η_d·E) + w_soc      (b >= 0)
//! soc'  = soc - Δt·b·η_c/E + w_soc        (b <  0)
//! f'    = ρ·f - k_f·(line' - line) + w_f
//! V'    = V - k_v·(line' - line)
//! ```
//!
//! 模型对扰动是仿射的，光伏非负由外部输入曲线保证。

use gs_config::{GridConfig, DISTURBANCE_DIM};

use crate::error::ModelError;
use crate::state::{ControlAction, Disturbance, GridState, ACTION_DIM, STATE_DIM};

/// 动作雅可比 ∂x'/∂u
pub type ActionJacobian = [[f64; ACTION_DIM]; STATE_DIM];
/// 扰动雅可比 ∂x'/∂w
pub type DisturbanceJacobian = [[f64; DISTURBANCE_DIM]; STATE_DIM];

/// 微电网动力学模型
#[derive(Debug, Clone, PartialEq)]
pub struct GridDynamics {
    dt_s: f64,
    capacity_kwh: f64,
    charge_efficiency: f64,
    discharge_efficiency: f64,
    freq_decay: f64,
    freq_gain: f64,
    voltage_gain: f64,
}

impl GridDynamics {
    /// 从电网配置构建
    pub fn new(config: &GridConfig) -> Self {
        Self {
            dt_s: config.dt_s,
            capacity_kwh: config.capacity_kwh,
            charge_efficiency: config.charge_efficiency,
            discharge_efficiency: config.discharge_efficiency,
            freq_decay: config.freq_decay,
            freq_gain: config.freq_gain_hz_per_kw,
            voltage_gain: config.voltage_gain_v_per_kw,
        }
    }

    /// 控制步长 [s]
    #[inline]
    pub fn dt_s(&self) -> f64 {
        self.dt_s
    }

    #[inline]
    fn dt_hours(&self) -> f64 {
        self.dt_s / 3600.0
    }

    /// 荷电状态对电池功率的灵敏度（随充放电方向切换）
    #[inline]
    fn soc_sensitivity(&self, battery_kw: f64) -> f64 {
        if battery_kw >= 0.0 {
            -self.dt_hours() / (self.discharge_efficiency * self.capacity_kwh)
        } else {
            -self.dt_hours() * self.charge_efficiency / self.capacity_kwh
        }
    }

    pub(crate) fn transition(
        &self,
        x: &[f64; STATE_DIM],
        u: &[f64; ACTION_DIM],
        w: &[f64; DISTURBANCE_DIM],
    ) -> [f64; STATE_DIM] {
        let [soc, line, freq, voltage, pv, load] = *x;
        let [b, s] = *u;
        let [w_pv, w_load, w_soc, w_f] = *w;

        let pv_next = pv + w_pv;
        let load_next = load + w_load;
        let line_next = load_next - s - pv_next - b;
        let soc_next = soc + self.soc_sensitivity(b) * b + w_soc;
        let d_line = line_next - line;
        let freq_next = self.freq_decay * freq - self.freq_gain * d_line + w_f;
        let voltage_next = voltage - self.voltage_gain * d_line;

        [soc_next, line_next, freq_next, voltage_next, pv_next, load_next]
    }

    /// 状态转移 x' = f(x, u) + w
    pub fn predict(
        &self,
        state: &GridState,
        action: &ControlAction,
        disturbance: &Disturbance,
    ) -> Result<GridState, ModelError> {
        let next = self.transition(&state.to_array(), &action.to_array(), &disturbance.to_array());
        self.advance(state, next)
    }

    /// 以集合中心为扰动的名义预测
    pub fn nominal(
        &self,
        state: &GridState,
        action: &ControlAction,
        center: &[f64; DISTURBANCE_DIM],
    ) -> Result<GridState, ModelError> {
        let next = self.transition(&state.to_array(), &action.to_array(), center);
        self.advance(state, next)
    }

    /// 原始切片版本的状态转移，检查各向量维度
    pub fn predict_raw(
        &self,
        state: &[f64],
        action: &[f64],
        disturbance: &[f64],
    ) -> Result<[f64; STATE_DIM], ModelError> {
        let x = GridState::from_slice(state)?;
        let u = ControlAction::from_slice(action)?;
        let w = Disturbance::from_slice(disturbance)?;
        Ok(self.transition(&x.to_array(), &u.to_array(), &w.to_array()))
    }

    fn advance(&self, state: &GridState, next: [f64; STATE_DIM]) -> Result<GridState, ModelError> {
        let advanced = GridState::from_slice(&next)?;
        Ok(advanced.at(state.tick() + 1, state.time_s() + self.dt_s))
    }

    /// 动作雅可比 ∂x'/∂u，荷电状态行按 b 的符号选择分支
    pub fn action_jacobian(&self, _state: &GridState, action: &ControlAction) -> ActionJacobian {
        let k_soc = self.soc_sensitivity(action.battery_kw());
        let kf = self.freq_gain;
        let kv = self.voltage_gain;
        [
            [k_soc, 0.0],
            [-1.0, -1.0],
            [kf, kf],
            [kv, kv],
            [0.0, 0.0],
            [0.0, 0.0],
        ]
    }

    /// 扰动雅可比 ∂x'/∂w（常数）
    pub fn disturbance_jacobian(&self) -> DisturbanceJacobian {
        let kf = self.freq_gain;
        let kv = self.voltage_gain;
        [
            [0.0, 0.0, 1.0, 0.0],
            [-1.0, 1.0, 0.0, 0.0],
            [kf, -kf, 0.0, 1.0],
            [kv, -kv, 0.0, 0.0],
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
        ]
    }

    /// 维持当前运行点的动作，即本模型中的无操作
    ///
    /// 由功率平衡反推当前电池出力 `b = load − pv − line`，切负荷为零。
    /// 零扰动下联络线与电压保持不变，频率按 ρ 衰减，只有荷电状态随 b 漂移。
    /// 功率平衡的稳态下即为 [`ControlAction::idle`]。
    pub fn hold_action(state: &GridState) -> Result<ControlAction, ModelError> {
        ControlAction::new(state.load_kw() - state.pv_kw() - state.line_flow_kw(), 0.0)
    }

    /// 功率平衡残差：line' - (load' - s - pv' - b)，守恒时为零
    pub fn power_balance_residual(next: &GridState, action: &ControlAction) -> f64 {
        next.line_flow_kw()
            - (next.load_kw() - action.shed_kw() - next.pv_kw() - action.battery_kw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> GridDynamics {
        GridDynamics::new(&GridConfig::default())
    }

    #[test]
    fn test_steady_state_is_fixed_point() {
        let m = model();
        let x = GridState::steady(0.6, 25.0, 35.0, 230.0).unwrap();
        let next = m.predict(&x, &ControlAction::idle(), &Disturbance::zero()).unwrap();
        assert_eq!(next.soc(), x.soc());
        assert_eq!(next.line_flow_kw(), x.line_flow_kw());
        assert_eq!(next.voltage_v(), x.voltage_v());
        assert_eq!(next.tick(), 1);
        assert_eq!(next.time_s(), 60.0);
    }

    #[test]
    fn test_discharge_and_charge_losses() {
        let m = model();
        let x = GridState::steady(0.5, 0.0, 0.0, 230.0).unwrap();
        let w = Disturbance::zero();
        let out = m.predict(&x, &ControlAction::new(60.0, 0.0).unwrap(), &w).unwrap();
        let inp = m.predict(&x, &ControlAction::new(-60.0, 0.0).unwrap(), &w).unwrap();
        // 1 分钟放电 60 kW = 1 kWh
        let drop = 0.5 - out.soc();
        let gain = inp.soc() - 0.5;
        assert!((drop - 1.0 / (0.95 * 200.0)).abs() < 1e-12);
        assert!((gain - 0.95 / 200.0).abs() < 1e-12);
        assert!(drop > gain);
    }

    #[test]
    fn test_hold_action_keeps_operating_point() {
        let m = model();
        let x = GridState::from_slice(&[0.5, 0.0, 0.2, 226.0, 0.0, 70.0]).unwrap();
        let hold = GridDynamics::hold_action(&x).unwrap();
        assert_eq!(hold, ControlAction::new(70.0, 0.0).unwrap());
        let next = m.predict(&x, &hold, &Disturbance::zero()).unwrap();
        assert_eq!(next.line_flow_kw(), x.line_flow_kw());
        assert_eq!(next.voltage_v(), x.voltage_v());
        assert!((next.freq_dev_hz() - 0.8 * 0.2).abs() < 1e-12);
        assert!(next.soc() < x.soc());

        let steady = GridState::steady(0.6, 25.0, 35.0, 230.0).unwrap();
        assert_eq!(GridDynamics::hold_action(&steady).unwrap(), ControlAction::idle());
    }

    #[test]
    fn test_power_balance_conserved() {
        let m = model();
        let x = GridState::from_slice(&[0.5, 12.0, 0.05, 229.0, 30.0, 40.0]).unwrap();
        let u = ControlAction::new(-15.0, 3.0).unwrap();
        let w = Disturbance::from_slice(&[-2.0, 1.5, 0.0, 0.01]).unwrap();
        let next = m.predict(&x, &u, &w).unwrap();
        assert!(GridDynamics::power_balance_residual(&next, &u).abs() < 1e-12);
    }

    #[test]
    fn test_jacobians_match_finite_difference() {
        let m = model();
        let x = GridState::from_slice(&[0.5, 12.0, 0.05, 229.0, 30.0, 40.0]).unwrap();
        let u = ControlAction::new(10.0, 2.0).unwrap();
        let w = [0.3, -0.2, 0.0, 0.0];
        let base = m.transition(&x.to_array(), &u.to_array(), &w);
        let ja = m.action_jacobian(&x, &u);
        let jw = m.disturbance_jacobian();
        let h = 1e-3;
        for j in 0..ACTION_DIM {
            let mut up = u.to_array();
            up[j] += h;
            let next = m.transition(&x.to_array(), &up, &w);
            for k in 0..STATE_DIM {
                assert!(((next[k] - base[k]) / h - ja[k][j]).abs() < 1e-6);
            }
        }
        for j in 0..DISTURBANCE_DIM {
            let mut wp = w;
            wp[j] += h;
            let next = m.transition(&x.to_array(), &u.to_array(), &wp);
            for k in 0..STATE_DIM {
                assert!(((next[k] - base[k]) / h - jw[k][j]).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_predict_raw_dimension_errors() {
        let m = model();
        let x = [0.5, 0.0, 0.0, 230.0, 0.0, 0.0];
        assert!(m.predict_raw(&x, &[0.0, 0.0], &[0.0; 4]).is_ok());
        assert!(matches!(
            m.predict_raw(&x, &[0.0], &[0.0; 4]),
            Err(ModelError::DimensionMismatch { what: "ControlAction", .. })
        ));
        assert!(matches!(
            m.predict_raw(&x, &[0.0, 0.0], &[0.0; 5]),
            Err(ModelError::DimensionMismatch { what: "Disturbance", .. })
        ));
    }
}
