// crates/gs_safety/src/driver/summary.rs

//! 运行统计

use serde::Serialize;

use gs_config::{FilterMode, ScenarioKind};
use gs_foundation::KahanSum;

use crate::certifier::{CertificationResult, Verdict};

/// 运行统计累加器
#[derive(Debug, Clone, Default)]
pub(crate) struct SummaryAccumulator {
    ticks: u64,
    safe: u64,
    corrected: u64,
    infeasible: u64,
    unfiltered: u64,
    escalations: u64,
    early_warning_ticks: u64,
    violation_ticks: u64,
    violation_events: u64,
    covered: u64,
    solver_iterations: u64,
    proposed_battery_kwh: KahanSum,
    certified_battery_kwh: KahanSum,
    shed_kwh: KahanSum,
    correction_kw: KahanSum,
}

impl SummaryAccumulator {
    pub(crate) fn record(
        &mut self,
        result: &CertificationResult,
        violations: usize,
        covered: bool,
        dt_hours: f64,
    ) {
        self.ticks += 1;
        match result.verdict {
            Verdict::Safe => self.safe += 1,
            Verdict::Corrected => self.corrected += 1,
            Verdict::Infeasible => self.infeasible += 1,
            Verdict::Unfiltered => self.unfiltered += 1,
        }
        if result.requires_escalation {
            self.escalations += 1;
        }
        if !result.diagnostics.early_warnings.is_empty() {
            self.early_warning_ticks += 1;
        }
        if violations > 0 {
            self.violation_ticks += 1;
            self.violation_events += violations as u64;
        }
        if covered {
            self.covered += 1;
        }
        self.solver_iterations += result.diagnostics.iterations as u64;
        self.proposed_battery_kwh
            .add(result.original.battery_kw() * dt_hours);
        self.certified_battery_kwh
            .add(result.certified.battery_kw() * dt_hours);
        self.shed_kwh.add(result.certified.shed_kw() * dt_hours);
        self.correction_kw.add(
            (result.certified.battery_kw() - result.original.battery_kw()).abs()
                + (result.certified.shed_kw() - result.original.shed_kw()).abs(),
        );
    }

    pub(crate) fn finish(
        &self,
        scenario: ScenarioKind,
        filter_mode: FilterMode,
        calibration_factor: f64,
    ) -> RunSummary {
        let interventions = self.corrected + self.infeasible;
        let ratio = |n: u64| {
            if self.ticks == 0 {
                1.0
            } else {
                n as f64 / self.ticks as f64
            }
        };
        RunSummary {
            scenario,
            filter_mode,
            ticks: self.ticks,
            safe: self.safe,
            corrected: self.corrected,
            infeasible: self.infeasible,
            unfiltered: self.unfiltered,
            interventions,
            escalations: self.escalations,
            early_warning_ticks: self.early_warning_ticks,
            violation_ticks: self.violation_ticks,
            violation_events: self.violation_events,
            constraint_satisfaction_rate: ratio(self.ticks - self.violation_ticks),
            intervention_rate: if self.ticks == 0 { 0.0 } else { ratio(interventions) },
            coverage: ratio(self.covered),
            calibration_factor,
            solver_iterations: self.solver_iterations,
            mean_correction_kw: if interventions == 0 {
                0.0
            } else {
                self.correction_kw.value() / interventions as f64
            },
            proposed_battery_kwh: self.proposed_battery_kwh.value(),
            certified_battery_kwh: self.certified_battery_kwh.value(),
            shed_kwh: self.shed_kwh.value(),
        }
    }
}

/// 运行摘要
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// 场景
    pub scenario: ScenarioKind,
    /// 过滤方式
    pub filter_mode: FilterMode,
    /// 步数
    pub ticks: u64,
    /// SAFE 步数
    pub safe: u64,
    /// CORRECTED 步数
    pub corrected: u64,
    /// INFEASIBLE 步数
    pub infeasible: u64,
    /// 未过滤步数
    pub unfiltered: u64,
    /// 干预次数（CORRECTED + INFEASIBLE）
    pub interventions: u64,
    /// 上报次数
    pub escalations: u64,
    /// 出现前瞻预警的步数
    pub early_warning_ticks: u64,
    /// 实际状态存在越界的步数
    pub violation_ticks: u64,
    /// 越界的屏障总次数
    pub violation_events: u64,
    /// 约束满足率（无越界步的比例）
    pub constraint_satisfaction_rate: f64,
    /// 干预率
    pub intervention_rate: f64,
    /// 经验覆盖率
    pub coverage: f64,
    /// 最终校准因子 η
    pub calibration_factor: f64,
    /// 求解器累计迭代轮数
    pub solver_iterations: u64,
    /// 干预步的平均修正量（kW，L1 范数）
    pub mean_correction_kw: f64,
    /// 提案电池放电量 (kWh)
    pub proposed_battery_kwh: f64,
    /// 认证电池放电量 (kWh)
    pub certified_battery_kwh: f64,
    /// 切负荷电量 (kWh)
    pub shed_kwh: f64,
}

impl RunSummary {
    /// 单行描述
    pub fn describe(&self) -> String {
        format!(
            "{} [{}]: {} 步, SAFE {} / CORRECTED {} / INFEASIBLE {}, CSR {:.1}%, 覆盖率 {:.1}%, η = {:.3}",
            self.scenario.label(),
            self.filter_mode.label(),
            self.ticks,
            self.safe,
            self.corrected,
            self.infeasible,
            self.constraint_satisfaction_rate * 100.0,
            self.coverage * 100.0,
            self.calibration_factor
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certifier::{EarlyWarning, SolverDiagnostics};
    use crate::state::ControlAction;
    use gs_config::SolverStrategy;

    fn result(verdict: Verdict, original: f64, certified: f64) -> CertificationResult {
        CertificationResult {
            tick: 0,
            original: ControlAction::new(original, 0.0).unwrap(),
            certified: ControlAction::new(certified, 0.0).unwrap(),
            margins: Vec::new(),
            verdict,
            diagnostics: SolverDiagnostics::idle(SolverStrategy::Qp),
            requires_escalation: verdict == Verdict::Infeasible,
        }
    }

    #[test]
    fn test_empty_summary() {
        let s = SummaryAccumulator::default().finish(ScenarioKind::Normal, FilterMode::UCbf, 1.0);
        assert_eq!(s.ticks, 0);
        assert_eq!(s.constraint_satisfaction_rate, 1.0);
        assert_eq!(s.intervention_rate, 0.0);
    }

    #[test]
    fn test_counts_and_rates() {
        let mut acc = SummaryAccumulator::default();
        acc.record(&result(Verdict::Safe, 10.0, 10.0), 0, true, 0.5);
        acc.record(&result(Verdict::Corrected, 10.0, 4.0), 0, true, 0.5);
        acc.record(&result(Verdict::Infeasible, 10.0, 0.0), 2, false, 0.5);
        acc.record(&result(Verdict::Safe, 10.0, 10.0), 0, true, 0.5);
        let s = acc.finish(ScenarioKind::Heatwave, FilterMode::UCbf, 1.2);
        assert_eq!((s.safe, s.corrected, s.infeasible), (2, 1, 1));
        assert_eq!(s.interventions, 2);
        assert_eq!(s.escalations, 1);
        assert_eq!(s.violation_ticks, 1);
        assert_eq!(s.violation_events, 2);
        assert_eq!(s.constraint_satisfaction_rate, 0.75);
        assert_eq!(s.coverage, 0.75);
        assert_eq!(s.mean_correction_kw, 8.0);
        assert_eq!(s.proposed_battery_kwh, 20.0);
        assert_eq!(s.certified_battery_kwh, 12.0);
        assert!(s.describe().contains("Heatwave"));
        assert!(s.describe().contains("U-CBF"));
    }

    #[test]
    fn test_unfiltered_and_warning_counts() {
        let mut acc = SummaryAccumulator::default();
        let mut warned = result(Verdict::Unfiltered, 10.0, 10.0);
        warned.diagnostics.early_warnings.push(EarlyWarning {
            constraint: "soc_min".into(),
            step: 3,
            slack: -0.01,
        });
        acc.record(&warned, 1, true, 0.5);
        acc.record(&result(Verdict::Unfiltered, 10.0, 10.0), 0, true, 0.5);
        let s = acc.finish(ScenarioKind::Normal, FilterMode::PassThrough, 1.0);
        assert_eq!(s.unfiltered, 2);
        assert_eq!(s.interventions, 0);
        assert_eq!(s.intervention_rate, 0.0);
        assert_eq!(s.early_warning_ticks, 1);
        assert_eq!(s.violation_ticks, 1);
        assert!(s.describe().contains("No Filter"));
    }
}
