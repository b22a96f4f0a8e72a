// crates/gs_safety/src/driver/policy.rs

//! 上游控制策略
//!
//! 监控器不关心提案动作如何产生，只要求策略能根据当前状态给出一个动作。

use gs_config::{GridConfig, PolicyKind, SimulationConfig};

use crate::error::ModelError;
use crate::state::{ControlAction, GridState};

/// 提案策略 trait
pub trait ProposalPolicy: Send {
    /// 根据当前状态提出动作
    fn propose(&mut self, state: &GridState) -> ControlAction;

    /// 策略名称
    fn name(&self) -> &str;
}

/// 贪心调度：电池承担全部净负荷，不切负荷
///
/// 不考虑荷电状态与联络线限值，是需要被监控的"激进"策略。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreedyDispatch {
    max_battery_kw: f64,
}

impl GreedyDispatch {
    /// 创建贪心调度
    pub fn new(max_battery_kw: f64) -> Self {
        Self {
            max_battery_kw: max_battery_kw.abs(),
        }
    }
}

impl ProposalPolicy for GreedyDispatch {
    fn propose(&mut self, state: &GridState) -> ControlAction {
        let net = state.load_kw() - state.pv_kw();
        ControlAction::from_array([net.clamp(-self.max_battery_kw, self.max_battery_kw), 0.0])
    }

    fn name(&self) -> &str {
        "greedy"
    }
}

/// 固定调度：每步提出同一动作
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedDispatch {
    action: ControlAction,
}

impl FixedDispatch {
    /// 创建固定调度
    pub fn new(action: ControlAction) -> Self {
        Self { action }
    }
}

impl ProposalPolicy for FixedDispatch {
    fn propose(&mut self, _state: &GridState) -> ControlAction {
        self.action
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// 按仿真配置创建策略
pub fn policy_from_config(
    simulation: &SimulationConfig,
    grid: &GridConfig,
) -> Result<Box<dyn ProposalPolicy>, ModelError> {
    Ok(match simulation.policy {
        PolicyKind::Greedy => Box::new(GreedyDispatch::new(grid.battery_max_kw)),
        PolicyKind::Fixed => Box::new(FixedDispatch::new(ControlAction::new(
            simulation.fixed_battery_kw,
            simulation.fixed_shed_kw,
        )?)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greedy_covers_net_load() {
        let mut policy = GreedyDispatch::new(100.0);
        let x = GridState::steady(0.5, 20.0, 50.0, 230.0).unwrap();
        assert_eq!(policy.propose(&x), ControlAction::new(30.0, 0.0).unwrap());

        // 光伏过剩时充电，受额定功率限制
        let x = GridState::steady(0.5, 300.0, 50.0, 230.0).unwrap();
        assert_eq!(policy.propose(&x).battery_kw(), -100.0);
    }

    #[test]
    fn test_policy_from_config() {
        let mut sim = SimulationConfig::default();
        let grid = GridConfig::default();
        assert_eq!(policy_from_config(&sim, &grid).unwrap().name(), "greedy");

        sim.policy = PolicyKind::Fixed;
        sim.fixed_battery_kw = -10.0;
        let mut policy = policy_from_config(&sim, &grid).unwrap();
        let x = GridState::steady(0.5, 20.0, 50.0, 230.0).unwrap();
        assert_eq!(policy.propose(&x).battery_kw(), -10.0);

        sim.fixed_shed_kw = f64::NAN;
        assert!(policy_from_config(&sim, &grid).is_err());
    }
}
