// crates/gs_safety/src/compare.rs

//! 并行对比
//!
//! - [`compare_scenarios`]: 同一过滤方式下的多场景对比
//! - [`compare_methods`]: 同一场景、同一外生扰动序列下的多种过滤方式对比
//!
//! 每次运行构建独立的驱动器并在 rayon 线程池中执行，实例之间不共享状态，
//! 结果与串行运行逐位一致。

use rayon::prelude::*;
use serde::Serialize;

use gs_config::{FilterMode, MonitorConfig, ScenarioKind};

use crate::driver::{RunSummary, ScenarioDriver};
use crate::error::CoreError;

/// 单个场景的对比结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioReport {
    /// 场景
    pub scenario: ScenarioKind,
    /// 运行摘要
    pub summary: RunSummary,
}

/// 单个过滤方式的对比结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodReport {
    /// 过滤方式
    pub filter_mode: FilterMode,
    /// 运行摘要
    pub summary: RunSummary,
}

/// 并行运行多个场景，结果按输入顺序返回
pub fn compare_scenarios(
    config: &MonitorConfig,
    scenarios: &[ScenarioKind],
    ticks: u64,
    seed: u64,
) -> Result<Vec<ScenarioReport>, CoreError> {
    config.validate()?;
    tracing::info!("并行对比 {} 个场景，每个 {} 步", scenarios.len(), ticks);
    scenarios
        .par_iter()
        .map(|&scenario| {
            let mut driver = ScenarioDriver::new(config, scenario)?.with_seed(seed);
            let summary = driver.run(ticks)?;
            Ok(ScenarioReport { scenario, summary })
        })
        .collect()
}

/// 以相同种子并行运行多种过滤方式，结果按输入顺序返回
pub fn compare_methods(
    config: &MonitorConfig,
    scenario: ScenarioKind,
    modes: &[FilterMode],
    ticks: u64,
    seed: u64,
) -> Result<Vec<MethodReport>, CoreError> {
    config.validate()?;
    tracing::info!("场景 {} 下并行对比 {} 种过滤方式，每种 {} 步", scenario, modes.len(), ticks);
    modes
        .par_iter()
        .map(|&filter_mode| {
            let mut driver = ScenarioDriver::new(config, scenario)?
                .with_seed(seed)
                .with_filter_mode(filter_mode);
            let summary = driver.run(ticks)?;
            Ok(MethodReport {
                filter_mode,
                summary,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_preserved() {
        let config = MonitorConfig::default();
        let kinds = [ScenarioKind::CyberAttack, ScenarioKind::Normal];
        let reports = compare_scenarios(&config, &kinds, 10, 1).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].scenario, ScenarioKind::CyberAttack);
        assert_eq!(reports[1].summary.scenario, ScenarioKind::Normal);
        assert!(reports.iter().all(|r| r.summary.ticks == 10));
    }

    #[test]
    fn test_methods_side_by_side() {
        let config = MonitorConfig::default();
        let reports =
            compare_methods(&config, ScenarioKind::Heatwave, &FilterMode::ALL, 30, 7).unwrap();
        assert_eq!(reports.len(), 3);
        for (report, mode) in reports.iter().zip(FilterMode::ALL) {
            assert_eq!(report.filter_mode, mode);
            assert_eq!(report.summary.filter_mode, mode);
            assert_eq!(report.summary.ticks, 30);
        }
        let pass = &reports[2].summary;
        assert_eq!(pass.unfiltered, 30);
        assert_eq!(pass.interventions, 0);
        assert_eq!(reports[0].summary.unfiltered, 0);
        assert_eq!(reports[1].summary.unfiltered, 0);
    }

    #[test]
    fn test_methods_match_single_runs() {
        let config = MonitorConfig::default();
        let reports = compare_methods(
            &config,
            ScenarioKind::CloudCover,
            &[FilterMode::Deterministic],
            12,
            3,
        )
        .unwrap();
        let mut driver = ScenarioDriver::new(&config, ScenarioKind::CloudCover)
            .unwrap()
            .with_seed(3)
            .with_filter_mode(FilterMode::Deterministic);
        assert_eq!(reports[0].summary, driver.run(12).unwrap());
    }
}
