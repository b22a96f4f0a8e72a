// crates/gs_config/src/barrier_spec.rs

//! 屏障约束定义
//!
//! 配置文件中的屏障以带标签的枚举表示，在加载时解析为
//! `gs_safety::barrier` 中的具体屏障，运行期间不再增删。
//!
//! ```json
//! { "kind": "line_import", "limit_kw": 80.0, "alpha": 0.5 }
//! ```

use serde::{Deserialize, Serialize};

/// 屏障种类及其参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BarrierKindSpec {
    /// 荷电状态下限
    SocMin {
        /// 下限 [-]
        min: f64,
    },
    /// 荷电状态上限
    SocMax {
        /// 上限 [-]
        max: f64,
    },
    /// 线路输入（购电）热稳定极限
    LineImport {
        /// 极限 [kW]
        limit_kw: f64,
    },
    /// 线路输出（售电）热稳定极限
    LineExport {
        /// 极限 [kW]
        limit_kw: f64,
    },
    /// 频率偏差带
    FrequencyBand {
        /// 最大偏差 [Hz]
        max_dev_hz: f64,
    },
    /// 电压带
    VoltageBand {
        /// 下限 [V]
        min_v: f64,
        /// 上限 [V]
        max_v: f64,
    },
}

impl BarrierKindSpec {
    /// 默认名称
    pub fn default_name(&self) -> &'static str {
        match self {
            Self::SocMin { .. } => "soc_min",
            Self::SocMax { .. } => "soc_max",
            Self::LineImport { .. } => "line_import",
            Self::LineExport { .. } => "line_export",
            Self::FrequencyBand { .. } => "frequency_band",
            Self::VoltageBand { .. } => "voltage_band",
        }
    }
}

/// 单个屏障约束配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarrierSpec {
    /// 名称（缺省时使用种类名）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// class-K 衰减率 α ∈ (0, 1]
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// 种类与参数
    #[serde(flatten)]
    pub kind: BarrierKindSpec,
}

fn default_alpha() -> f64 {
    0.5
}

impl BarrierSpec {
    /// 以默认名称创建
    pub fn new(kind: BarrierKindSpec, alpha: f64) -> Self {
        Self {
            name: None,
            alpha,
            kind,
        }
    }

    /// 设置名称
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// 生效名称
    pub fn resolved_name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.kind.default_name())
    }
}

/// 默认屏障组
///
/// 荷电状态 15%–95%，线路 ±80 kW，频率 ±0.8 Hz，电压 218–242 V。
pub fn default_barriers() -> Vec<BarrierSpec> {
    vec![
        BarrierSpec::new(BarrierKindSpec::SocMin { min: 0.15 }, 0.5),
        BarrierSpec::new(BarrierKindSpec::SocMax { max: 0.95 }, 0.5),
        BarrierSpec::new(BarrierKindSpec::LineImport { limit_kw: 80.0 }, 0.5),
        BarrierSpec::new(BarrierKindSpec::LineExport { limit_kw: 80.0 }, 0.5),
        BarrierSpec::new(BarrierKindSpec::FrequencyBand { max_dev_hz: 0.8 }, 0.3),
        BarrierSpec::new(
            BarrierKindSpec::VoltageBand {
                min_v: 218.0,
                max_v: 242.0,
            },
            0.3,
        ),
    ]
}
