// apps/gs_cli/src/commands/compare.rs

//! 对比命令
//!
//! 以相同种子并行运行，输出对比表或 JSON：
//!
//! - 默认按场景对比（U-CBF 过滤）
//! - 指定 `--methods` 时，在每个场景下对比多种过滤方式

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use gs_config::{FilterMode, ScenarioKind};
use gs_safety::{compare_methods, compare_scenarios, MethodReport, RunSummary, ScenarioReport};
use serde::Serialize;
use tracing::info;

use super::load_config;

/// 对比参数
#[derive(Args)]
pub struct CompareArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 参与对比的场景，逗号分隔；缺省为全部场景
    #[arg(short, long, value_delimiter = ',')]
    pub scenarios: Vec<ScenarioKind>,

    /// 参与对比的过滤方式，逗号分隔 (u_cbf, deterministic, pass_through)
    #[arg(short, long, value_delimiter = ',')]
    pub methods: Vec<FilterMode>,

    /// 每次运行的步数，缺省取配置值
    #[arg(short, long)]
    pub ticks: Option<u64>,

    /// 外生扰动随机种子，缺省取配置值
    #[arg(long)]
    pub seed: Option<u64>,

    /// 以 JSON 输出
    #[arg(long)]
    pub json: bool,
}

/// 单个场景下的方法对比
#[derive(Serialize)]
struct MethodTable {
    scenario: ScenarioKind,
    methods: Vec<MethodReport>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Reports {
    Scenarios(Vec<ScenarioReport>),
    Methods(Vec<MethodTable>),
}

#[derive(Serialize)]
struct CompareOutput<'a> {
    generated_at: String,
    ticks: u64,
    seed: u64,
    reports: &'a Reports,
}

/// 执行对比命令
pub fn execute(args: CompareArgs) -> Result<()> {
    info!("=== GridShield 对比 ===");

    let config = load_config(args.config.as_deref())?;
    let scenarios = if args.scenarios.is_empty() {
        ScenarioKind::ALL.to_vec()
    } else {
        args.scenarios.clone()
    };
    let ticks = args.ticks.unwrap_or(config.simulation.ticks);
    let seed = args.seed.unwrap_or(config.simulation.seed);

    let reports = if args.methods.is_empty() {
        Reports::Scenarios(
            compare_scenarios(&config, &scenarios, ticks, seed).context("场景对比失败")?,
        )
    } else {
        let mut tables = Vec::with_capacity(scenarios.len());
        for &scenario in &scenarios {
            let methods = compare_methods(&config, scenario, &args.methods, ticks, seed)
                .with_context(|| format!("场景 {} 的方法对比失败", scenario))?;
            tables.push(MethodTable { scenario, methods });
        }
        Reports::Methods(tables)
    };

    if args.json {
        let output = CompareOutput {
            generated_at: Utc::now().to_rfc3339(),
            ticks,
            seed,
            reports: &reports,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        match &reports {
            Reports::Scenarios(reports) => {
                print_header("场景");
                for report in reports {
                    print_row(report.scenario.label(), &report.summary);
                }
            }
            Reports::Methods(tables) => {
                for table in tables {
                    println!("[{}]", table.scenario.label());
                    print_header("方法");
                    for report in &table.methods {
                        print_row(report.filter_mode.label(), &report.summary);
                    }
                }
            }
        }
    }

    info!("=== 对比完成 ===");
    Ok(())
}

fn print_header(first: &str) {
    println!(
        "{:<14} {:>6} {:>6} {:>9} {:>10} {:>8} {:>8} {:>8} {:>7}",
        first, "SAFE", "CORR", "INFEAS", "违约步数", "CSR%", "干预%", "覆盖%", "η"
    );
}

fn print_row(label: &str, s: &RunSummary) {
    println!(
        "{:<14} {:>6} {:>6} {:>9} {:>10} {:>8.1} {:>8.1} {:>8.1} {:>7.3}",
        label,
        s.safe,
        s.corrected,
        s.infeasible,
        s.violation_ticks,
        s.constraint_satisfaction_rate * 100.0,
        s.intervention_rate * 100.0,
        s.coverage * 100.0,
        s.calibration_factor
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_two_scenarios() {
        let args = CompareArgs {
            config: None,
            scenarios: vec![ScenarioKind::Normal, ScenarioKind::Heatwave],
            methods: Vec::new(),
            ticks: Some(5),
            seed: Some(3),
            json: true,
        };
        assert!(execute(args).is_ok());
    }

    #[test]
    fn test_execute_methods_table() {
        let args = CompareArgs {
            config: None,
            scenarios: vec![ScenarioKind::CyberAttack],
            methods: FilterMode::ALL.to_vec(),
            ticks: Some(5),
            seed: Some(3),
            json: false,
        };
        assert!(execute(args).is_ok());
    }
}
