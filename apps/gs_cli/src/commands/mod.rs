// apps/gs_cli/src/commands/mod.rs

//! 子命令实现

pub mod compare;
pub mod info;
pub mod run;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use gs_config::MonitorConfig;
use tracing::info;

/// 加载配置；未指定路径时使用默认配置
pub fn load_config(path: Option<&Path>) -> Result<MonitorConfig> {
    match path {
        Some(p) => {
            info!("加载配置: {}", p.display());
            MonitorConfig::from_file(p)
                .with_context(|| format!("无法加载配置文件 {}", p.display()))
        }
        None => {
            info!("未指定配置文件，使用默认配置");
            Ok(MonitorConfig::default())
        }
    }
}
