// crates/gs_safety/tests/scenario_driver.rs

//! 场景驱动器测试
//! 验证驱动器施加认证动作、校准更新、并行对比的独立性与配置错误处理

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use gs_config::{MonitorConfig, ScenarioKind};
use gs_safety::{
    compare_scenarios, ControlAction, CoreError, FixedDispatch, FnObserver, GridDynamics,
    ScenarioDriver, TickRecord, Verdict,
};

fn low_soc_config() -> MonitorConfig {
    let mut config = MonitorConfig::default();
    config.simulation.initial.soc = 0.2;
    config
}

/// 测试驱动器施加的是认证动作而不是提案动作
#[test]
fn test_driver_applies_certified_action() {
    let interventions = Arc::new(AtomicUsize::new(0));
    let counter = interventions.clone();

    let mut driver = ScenarioDriver::new(&low_soc_config(), ScenarioKind::Normal)
        .unwrap()
        .with_policy(Box::new(FixedDispatch::new(ControlAction::new(60.0, 0.0).unwrap())));
    driver.add_observer(Arc::new(FnObserver::new(
        "balance",
        move |record: &TickRecord<'_>| {
            let certified = &record.result.certified;
            let residual = GridDynamics::power_balance_residual(record.next_state, certified);
            assert!(residual.abs() < 1e-9);
            if record.result.verdict != Verdict::Safe {
                assert_ne!(record.result.original, *certified);
                counter.fetch_add(1, Ordering::SeqCst);
            }
        },
    )));

    let summary = driver.run(40).unwrap();
    assert_eq!(summary.ticks, 40);
    assert!(interventions.load(Ordering::SeqCst) > 0);
    assert_eq!(
        summary.interventions,
        interventions.load(Ordering::SeqCst) as u64
    );
    // 荷电状态被守在下限之上
    assert!(driver.state().soc() >= 0.15);
    assert_eq!(summary.violation_ticks, 0);
    // 持续放电在下限附近触发前瞻预警
    assert!(summary.early_warning_ticks > 0);
}

/// 测试校准因子在配置范围内移动
#[test]
fn test_calibration_moves_within_bounds() {
    let config = MonitorConfig::default();
    let mut driver = ScenarioDriver::new(&config, ScenarioKind::CloudCover).unwrap();
    let summary = driver.run(120).unwrap();
    assert!(summary.coverage >= 0.0 && summary.coverage <= 1.0);
    assert!(summary.calibration_factor >= config.calibration.min_factor);
    assert!(summary.calibration_factor <= config.calibration.max_factor);

    let mut disabled = config.clone();
    disabled.calibration.enabled = false;
    let mut driver = ScenarioDriver::new(&disabled, ScenarioKind::CloudCover).unwrap();
    let summary = driver.run(120).unwrap();
    assert_eq!(summary.calibration_factor, disabled.calibration.initial_factor);
}

/// 测试同一种子的运行逐位一致
#[test]
fn test_runs_are_reproducible() {
    let config = MonitorConfig::default();
    let a = ScenarioDriver::new(&config, ScenarioKind::CyberAttack)
        .unwrap()
        .with_seed(11)
        .run(60)
        .unwrap();
    let b = ScenarioDriver::new(&config, ScenarioKind::CyberAttack)
        .unwrap()
        .with_seed(11)
        .run(60)
        .unwrap();
    assert_eq!(a, b);
}

/// 测试并行对比与单独运行结果一致
#[test]
fn test_comparison_matches_independent_runs() {
    let config = MonitorConfig::default();
    let kinds = ScenarioKind::ALL;
    let reports = compare_scenarios(&config, &kinds, 50, 5).unwrap();
    assert_eq!(reports.len(), kinds.len());
    for (report, kind) in reports.iter().zip(kinds) {
        assert_eq!(report.scenario, kind);
        let alone = ScenarioDriver::new(&config, kind)
            .unwrap()
            .with_seed(5)
            .run(50)
            .unwrap();
        assert_eq!(report.summary, alone);
    }
}

/// 测试单步记录可序列化
#[test]
fn test_tick_record_serializes() {
    let lines = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = lines.clone();
    let mut driver = ScenarioDriver::new(&MonitorConfig::default(), ScenarioKind::Heatwave).unwrap();
    driver.add_observer(Arc::new(FnObserver::new("json", move |record: &TickRecord<'_>| {
        let json = serde_json::to_string(record).unwrap();
        sink.lock().unwrap().push(json);
    })));
    driver.run(3).unwrap();
    let lines = lines.lock().unwrap();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("\"scenario\":\"heatwave\""));
    assert!(lines[0].contains("\"verdict\""));
}

/// 测试非法配置在构建时报错
#[test]
fn test_invalid_config_rejected() {
    let mut config = MonitorConfig::default();
    config.barriers[0].alpha = 1.5;
    assert!(matches!(
        ScenarioDriver::new(&config, ScenarioKind::Normal),
        Err(CoreError::Config(_))
    ));

    let mut config = MonitorConfig::default();
    config.scenarios.cyber_attack = None;
    assert!(matches!(
        ScenarioDriver::new(&config, ScenarioKind::Normal),
        Err(CoreError::Config(_))
    ));
}
