// apps/gs_cli/src/commands/validate.rs

//! 配置验证命令
//!
//! 解析配置文件并报告全部错误与警告，最后尝试构建认证器与各场景估计器。

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use gs_config::MonitorConfig;
use gs_safety::uncertainty::UncertaintyEstimator;
use gs_safety::Certifier;
use tracing::{error, info, warn};

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 配置文件路径；缺省验证默认配置
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== GridShield 配置验证 ===");

    let config = match &args.config {
        Some(path) => {
            info!("验证配置文件: {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("无法读取配置文件 {}", path.display()))?;
            // 不经 from_json，避免第一条错误即中断，完整报告
            serde_json::from_str::<MonitorConfig>(&content)
                .with_context(|| format!("配置文件解析失败 {}", path.display()))?
        }
        None => {
            info!("验证默认配置");
            MonitorConfig::default()
        }
    };

    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    for kind in config.scenarios.missing() {
        errors.push(format!("场景 '{}' 未定义扰动档案", kind.key()));
    }
    let report = config.validation_report();
    errors.extend(report.errors.iter().map(|e| e.to_string()));
    warnings.extend(report.warnings.iter().map(|w| w.to_string()));

    // 字段合法后再检查组件之间的约束
    if errors.is_empty() {
        if let Err(e) = Certifier::from_config(&config) {
            errors.push(format!("认证器构建失败: {}", e));
        }
        if let Err(e) = UncertaintyEstimator::new(&config.scenarios) {
            errors.push(format!("不确定性估计器构建失败: {}", e));
        }
    }

    for w in &warnings {
        warn!("警告: {}", w);
    }
    for e in &errors {
        error!("错误: {}", e);
    }

    info!("验证结果: {} 个错误, {} 个警告", errors.len(), warnings.len());

    if !errors.is_empty() {
        bail!("配置验证失败: {} 个错误", errors.len());
    }
    if args.strict && !warnings.is_empty() {
        bail!("严格模式下验证失败: {} 个警告", warnings.len());
    }

    info!("=== 配置有效 ===");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(name: &str, config: &MonitorConfig) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, serde_json::to_string(config).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_default_config_valid() {
        let args = ValidateArgs { config: None, strict: false };
        assert!(execute(args).is_ok());
    }

    #[test]
    fn test_invalid_alpha_reported() {
        let mut config = MonitorConfig::default();
        config.barriers[0].alpha = 1.5;
        let path = write_config("gs_cli_validate_alpha.json", &config);
        let args = ValidateArgs { config: Some(path.clone()), strict: false };
        assert!(execute(args).is_err());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_strict_fails_on_warnings() {
        let mut config = MonitorConfig::default();
        config.barriers.clear();
        let path = write_config("gs_cli_validate_strict.json", &config);
        let lenient = ValidateArgs { config: Some(path.clone()), strict: false };
        assert!(execute(lenient).is_ok());
        let strict = ValidateArgs { config: Some(path.clone()), strict: true };
        assert!(execute(strict).is_err());
        let _ = std::fs::remove_file(path);
    }
}
