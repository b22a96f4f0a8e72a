// apps/gs_cli/src/commands/run.rs

//! 运行场景命令
//!
//! 在单个场景下推进数字孪生并逐步认证提案动作。
//!
//! # 输出
//!
//! - 默认：日志中打印干预与运行摘要
//! - `--json`：每步一行 `TickRecord`，最后一行为运行摘要

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use gs_config::{FilterMode, PolicyKind, ScenarioKind};
use gs_safety::{Fault, FnObserver, LoggingObserver, RunSummary, ScenarioDriver, TickRecord};
use serde::Serialize;
use tracing::{info, warn};

use super::load_config;

/// 运行场景参数
#[derive(Args)]
pub struct RunArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 场景 (normal, heatwave, cloud_cover, cyber_attack)
    #[arg(short, long)]
    pub scenario: Option<ScenarioKind>,

    /// 步数，缺省取配置值
    #[arg(short, long)]
    pub ticks: Option<u64>,

    /// 外生扰动随机种子
    #[arg(long)]
    pub seed: Option<u64>,

    /// 提案策略 (greedy, fixed)
    #[arg(long)]
    pub policy: Option<PolicyKind>,

    /// 过滤方式 (u_cbf, deterministic, pass_through)
    #[arg(long, default_value = "u_cbf")]
    pub filter: FilterMode,

    /// 多步前瞻步数，缺省取配置值，0 关闭
    #[arg(long)]
    pub lookahead: Option<usize>,

    /// 以 JSON 行输出每步记录与摘要
    #[arg(long)]
    pub json: bool,

    /// 日志中也打印 SAFE 步
    #[arg(long)]
    pub verbose: bool,

    /// 在第 N 步注入电压骤降
    #[arg(long, value_name = "TICK")]
    pub drop_voltage_at: Option<u64>,

    /// 电压骤降幅度 [V]
    #[arg(long, default_value = "15.0")]
    pub drop_voltage_v: f64,

    /// 在第 N 步注入频率尖峰
    #[arg(long, value_name = "TICK")]
    pub spike_frequency_at: Option<u64>,

    /// 频率尖峰幅度 [Hz]
    #[arg(long, default_value = "0.3")]
    pub spike_frequency_hz: f64,
}

impl RunArgs {
    /// 第 `tick` 步之前需要注入的故障
    fn faults_at(&self, tick: u64) -> Vec<Fault> {
        let mut faults = Vec::new();
        if self.drop_voltage_at == Some(tick) {
            faults.push(Fault::DropVoltage { volts: self.drop_voltage_v });
        }
        if self.spike_frequency_at == Some(tick) {
            faults.push(Fault::SpikeFrequency { hz: self.spike_frequency_hz });
        }
        faults
    }
}

/// JSON 模式下的最终摘要行
#[derive(Serialize)]
struct RunOutput<'a> {
    generated_at: String,
    elapsed_ms: u128,
    summary: &'a RunSummary,
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== GridShield 场景运行 ===");

    let mut config = load_config(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    if let Some(policy) = args.policy {
        config.simulation.policy = policy;
    }
    if let Some(steps) = args.lookahead {
        config.certifier.lookahead_steps = steps;
    }
    let scenario = args.scenario.unwrap_or(config.simulation.scenario);
    let ticks = args.ticks.unwrap_or(config.simulation.ticks);

    info!("场景: {}", scenario.label());
    info!("步数: {}", ticks);
    info!("种子: {}", config.simulation.seed);
    info!("策略: {}", config.simulation.policy);
    info!("求解器: {}", config.certifier.solver);
    info!("过滤: {}", args.filter.label());

    let mut driver = ScenarioDriver::new(&config, scenario)
        .with_context(|| format!("无法为场景 {} 构建驱动器", scenario))?
        .with_filter_mode(args.filter);

    if args.json {
        driver.add_observer(Arc::new(FnObserver::new("json", |record: &TickRecord<'_>| {
            match serde_json::to_string(record) {
                Ok(line) => println!("{}", line),
                Err(e) => warn!("记录序列化失败: {}", e),
            }
        })));
    } else {
        let observer = LoggingObserver::new(scenario.key());
        let observer = if args.verbose { observer.verbose() } else { observer };
        driver.add_observer(Arc::new(observer));
    }

    let start = Instant::now();
    for tick in 0..ticks {
        if driver.cancel_token().is_cancelled() {
            warn!("运行在第 {} 步被取消", tick);
            break;
        }
        for fault in args.faults_at(tick) {
            info!("第 {} 步注入故障: {:?}", tick, fault);
            driver.inject(fault);
        }
        driver
            .step()
            .with_context(|| format!("第 {} 步推进失败", tick))?;
    }
    let elapsed = start.elapsed();
    let summary = driver.summary();

    if args.json {
        let output = RunOutput {
            generated_at: Utc::now().to_rfc3339(),
            elapsed_ms: elapsed.as_millis(),
            summary: &summary,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        print_summary(&summary);
    }

    info!("=== 运行完成，用时 {:.2?} ===", elapsed);
    if summary.escalations > 0 {
        warn!("共有 {} 步需要上报人工处理", summary.escalations);
    }
    if summary.early_warning_ticks > 0 {
        warn!("共有 {} 步出现前瞻预警", summary.early_warning_ticks);
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!("{}", summary.describe());
    println!("  干预率        : {:.1}%", summary.intervention_rate * 100.0);
    println!("  违约步数      : {} ({} 次约束违约)", summary.violation_ticks, summary.violation_events);
    println!("  前瞻预警步数  : {}", summary.early_warning_ticks);
    println!("  平均修正量    : {:.3} kW", summary.mean_correction_kw);
    println!("  求解迭代      : {}", summary.solver_iterations);
    println!("  提案电池能量  : {:.3} kWh", summary.proposed_battery_kwh);
    println!("  认证电池能量  : {:.3} kWh", summary.certified_battery_kwh);
    println!("  切负荷能量    : {:.3} kWh", summary.shed_kwh);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> RunArgs {
        RunArgs {
            config: None,
            scenario: Some(ScenarioKind::Normal),
            ticks: Some(3),
            seed: Some(1),
            policy: None,
            filter: FilterMode::UCbf,
            lookahead: None,
            json: false,
            verbose: false,
            drop_voltage_at: Some(1),
            drop_voltage_v: 10.0,
            spike_frequency_at: Some(1),
            spike_frequency_hz: 0.2,
        }
    }

    #[test]
    fn test_faults_scheduled_by_tick() {
        let a = args();
        assert!(a.faults_at(0).is_empty());
        let faults = a.faults_at(1);
        assert_eq!(faults.len(), 2);
        assert_eq!(faults[0], Fault::DropVoltage { volts: 10.0 });
        assert_eq!(faults[1], Fault::SpikeFrequency { hz: 0.2 });
    }

    #[test]
    fn test_execute_default_config() {
        assert!(execute(args()).is_ok());
    }

    #[test]
    fn test_execute_pass_through_without_lookahead() {
        let mut a = args();
        a.filter = FilterMode::PassThrough;
        a.lookahead = Some(0);
        assert!(execute(a).is_ok());
    }
}
