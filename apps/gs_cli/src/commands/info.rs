// apps/gs_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 显示层级、电网参数、屏障组与场景扰动档案。

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use gs_config::{MonitorConfig, ScenarioKind};
use gs_safety::action_bounds;
use tracing::info;

use super::load_config;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 显示系统信息
    #[arg(long)]
    pub system: bool,

    /// 将（默认或已加载的）配置导出到文件
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== GridShield 信息 ===");

    let config = load_config(args.config.as_deref())?;

    if args.system {
        print_system_info();
        println!();
    }
    print_config(&config);

    if let Some(path) = &args.export {
        config
            .save_to_file(path)
            .with_context(|| format!("无法写入配置文件 {}", path.display()))?;
        info!("配置已导出: {}", path.display());
    }
    Ok(())
}

fn print_system_info() {
    println!("系统信息:");
    println!("  版本: {}", env!("CARGO_PKG_VERSION"));
    println!("  平台: {} / {}", std::env::consts::OS, std::env::consts::ARCH);
    println!(
        "  并行线程: {}",
        std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
    );
    println!("  层级: gs_config (L{}) / gs_safety (L{})", gs_config::LAYER, gs_safety::LAYER);
}

fn print_config(config: &MonitorConfig) {
    let g = &config.grid;
    let bounds = action_bounds(g);
    println!("电网:");
    println!("  步长: {} s", g.dt_s);
    println!("  电池容量: {} kWh", g.capacity_kwh);
    println!("  充放电效率: {} / {}", g.charge_efficiency, g.discharge_efficiency);
    println!(
        "  动作范围: 电池 [{}, {}] kW, 切负荷 [{}, {}] kW",
        bounds.lower[0], bounds.upper[0], bounds.lower[1], bounds.upper[1]
    );
    println!("  标称电压: {} V", g.nominal_voltage_v);

    println!("屏障 ({}):", config.barriers.len());
    for spec in &config.barriers {
        println!("  {:<16} α = {:<5} {:?}", spec.resolved_name(), spec.alpha, spec.kind);
    }

    let c = &config.certifier;
    println!("认证器:");
    println!("  求解器: {}", c.solver);
    println!("  ε = {:e}, 收敛阈值 = {:e}", c.epsilon, c.convergence);
    println!("  最大迭代: {}, 最大重线性化: {}", c.max_iterations, c.max_relinearizations);
    println!("  多步前瞻: {} 步", c.lookahead_steps);
    println!(
        "  故障安全: {} ({} kW, {} kW)",
        c.fail_safe.policy, c.fail_safe.battery_kw, c.fail_safe.shed_kw
    );

    println!("场景:");
    for kind in ScenarioKind::ALL {
        match config.scenarios.get(kind) {
            Some(p) => println!(
                "  {:<14} {:?}, z = {}, 对抗 = {}",
                kind.label(),
                p.shape,
                p.sigma_multiplier,
                p.is_adversarial()
            ),
            None => println!("  {:<14} (未定义)", kind.label()),
        }
    }

    let cal = &config.calibration;
    println!(
        "校准: {} (η0 = {}, 目标覆盖率 = {}, 范围 [{}, {}])",
        if cal.enabled { "启用" } else { "关闭" },
        cal.initial_factor,
        cal.target_coverage,
        cal.min_factor,
        cal.max_factor
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_roundtrip() {
        let path = std::env::temp_dir().join("gs_cli_info_export.json");
        let args = InfoArgs {
            config: None,
            system: true,
            export: Some(path.clone()),
        };
        assert!(execute(args).is_ok());
        let loaded = MonitorConfig::from_file(&path).unwrap();
        assert_eq!(loaded.barriers.len(), MonitorConfig::default().barriers.len());
        let _ = std::fs::remove_file(path);
    }
}
