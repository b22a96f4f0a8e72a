// apps/gs_cli/src/main.rs

//! GridShield 命令行界面
//!
//! 微电网数字孪生 U-CBF 安全监控器的命令行工具。
//!
//! # 架构层级
//!
//! 本模块属于 **Layer 5: Application**：
//! - 只通过 `MonitorConfig` 与 `ScenarioDriver` 访问安全核心
//! - 错误统一转换为 `anyhow::Error` 并附加上下文

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// GridShield 微电网安全监控命令行工具
#[derive(Parser)]
#[command(name = "gs_cli")]
#[command(author = "GridShield Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Uncertainty-aware CBF safety monitor for a microgrid digital twin", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行单个场景
    Run(commands::run::RunArgs),
    /// 并行对比多个场景
    Compare(commands::compare::CompareArgs),
    /// 显示信息
    Info(commands::info::InfoArgs),
    /// 验证配置
    Validate(commands::validate::ValidateArgs),
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日志；JSON 输出走 stdout，日志写 stderr
    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&cli.log_level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Compare(args) => commands::compare::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("nonsense"), Level::INFO);
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::parse_from(["gs_cli", "run", "--scenario", "cyber", "--ticks", "5", "--json"]);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.scenario, Some(gs_config::ScenarioKind::CyberAttack));
                assert_eq!(args.ticks, Some(5));
                assert!(args.json);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_parse_compare_list() {
        let cli = Cli::parse_from(["gs_cli", "compare", "-s", "normal,cloud_cover"]);
        match cli.command {
            Commands::Compare(args) => assert_eq!(args.scenarios.len(), 2),
            _ => panic!("expected compare"),
        }
    }

    #[test]
    fn test_parse_filter_modes() {
        let cli = Cli::parse_from(["gs_cli", "run", "--filter", "pass-through", "--lookahead", "3"]);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.filter, gs_config::FilterMode::PassThrough);
                assert_eq!(args.lookahead, Some(3));
            }
            _ => panic!("expected run"),
        }
        let cli = Cli::parse_from(["gs_cli", "compare", "--methods", "u_cbf,det,none"]);
        match cli.command {
            Commands::Compare(args) => assert_eq!(args.methods, gs_config::FilterMode::ALL.to_vec()),
            _ => panic!("expected compare"),
        }
    }
}
