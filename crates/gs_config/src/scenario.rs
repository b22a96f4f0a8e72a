// crates/gs_config/src/scenario.rs

//! 场景与扰动档案
//!
//! 场景是封闭枚举，每个场景携带固定结构的 [`DisturbanceProfile`]，
//! 场景名拼写错误在解析阶段即失败，而不是静默回落到默认档案。

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 扰动维度数
pub const DISTURBANCE_DIM: usize = 4;

/// 运行场景
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// 正常运行
    Normal,
    /// 热浪：空调负荷激增，电池放电压力大
    Heatwave,
    /// 云层遮挡：光伏出力骤降
    CloudCover,
    /// 网络攻击：传感器欺骗，按最坏情况处理
    CyberAttack,
}

impl ScenarioKind {
    /// 全部场景，按压力等级递增
    pub const ALL: [ScenarioKind; 4] = [
        Self::Normal,
        Self::Heatwave,
        Self::CloudCover,
        Self::CyberAttack,
    ];

    /// 配置键名
    pub fn key(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Heatwave => "heatwave",
            Self::CloudCover => "cloud_cover",
            Self::CyberAttack => "cyber_attack",
        }
    }

    /// 展示名称
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Heatwave => "Heatwave",
            Self::CloudCover => "Cloud Cover",
            Self::CyberAttack => "Cyber Attack",
        }
    }

    /// 压力等级
    ///
    /// 热浪与云层遮挡同级，二者之间不要求单调。
    pub fn stress_level(&self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::Heatwave | Self::CloudCover => 1,
            Self::CyberAttack => 2,
        }
    }

    /// 是否严格比另一个场景平稳
    #[inline]
    pub fn is_calmer_than(&self, other: ScenarioKind) -> bool {
        self.stress_level() < other.stress_level()
    }
}

impl Default for ScenarioKind {
    fn default() -> Self {
        Self::Normal
    }
}

impl std::fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 场景解析错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioParseError(String);

impl FromStr for ScenarioKind {
    type Err = ScenarioParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match normalized.as_str() {
            "normal" => Ok(Self::Normal),
            "heatwave" => Ok(Self::Heatwave),
            "cloudcover" | "cloud" => Ok(Self::CloudCover),
            "cyberattack" | "cyber" => Ok(Self::CyberAttack),
            _ => Err(ScenarioParseError(s.to_string())),
        }
    }
}

impl std::fmt::Display for ScenarioParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "无效的场景: '{}', 期望 normal / heatwave / cloud_cover / cyber_attack",
            self.0
        )
    }
}

impl std::error::Error for ScenarioParseError {}

/// 扰动向量（按维度命名）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DisturbanceVector {
    /// 光伏预测误差 [kW]
    #[serde(default)]
    pub pv_kw: f64,
    /// 负荷预测误差 [kW]
    #[serde(default)]
    pub load_kw: f64,
    /// 荷电状态传感器误差 [-]
    #[serde(default)]
    pub soc: f64,
    /// 频率噪声 [Hz]
    #[serde(default)]
    pub freq_hz: f64,
}

impl DisturbanceVector {
    /// 维度名称，顺序与 [`to_array`](Self::to_array) 一致
    pub const NAMES: [&'static str; DISTURBANCE_DIM] = ["pv_kw", "load_kw", "soc", "freq_hz"];

    /// 创建扰动向量
    pub const fn new(pv_kw: f64, load_kw: f64, soc: f64, freq_hz: f64) -> Self {
        Self {
            pv_kw,
            load_kw,
            soc,
            freq_hz,
        }
    }

    /// 转为定长数组
    pub fn to_array(&self) -> [f64; DISTURBANCE_DIM] {
        [self.pv_kw, self.load_kw, self.soc, self.freq_hz]
    }

    /// 从定长数组构造
    pub fn from_array(a: [f64; DISTURBANCE_DIM]) -> Self {
        Self::new(a[0], a[1], a[2], a[3])
    }
}

/// 不确定集形状
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetShape {
    /// 区间（盒）集合
    #[default]
    Interval,
    /// 轴对齐椭球集合
    Ellipsoid,
}

/// 扰动档案
///
/// 统计半径 = max(floor, z·η·σ)，σ 为实时信号标准差，η 为校准因子。
/// 若给出 `worst_case`，该场景按对抗处理，半径不小于最坏情况半径。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisturbanceProfile {
    /// 集合形状
    #[serde(default)]
    pub shape: SetShape,
    /// 偏置（集合中心）
    #[serde(default)]
    pub bias: DisturbanceVector,
    /// σ 倍数 z
    #[serde(default = "default_sigma_multiplier")]
    pub sigma_multiplier: f64,
    /// 半径下限
    #[serde(default)]
    pub radius_floor: DisturbanceVector,
    /// 对抗最坏情况半径
    #[serde(default)]
    pub worst_case: Option<DisturbanceVector>,
}

fn default_sigma_multiplier() -> f64 {
    2.0
}

impl DisturbanceProfile {
    /// 是否为对抗档案
    #[inline]
    pub fn is_adversarial(&self) -> bool {
        self.worst_case.is_some()
    }

    /// 正常运行预设
    pub fn normal() -> Self {
        Self {
            shape: SetShape::Interval,
            bias: DisturbanceVector::default(),
            sigma_multiplier: 2.0,
            radius_floor: DisturbanceVector::new(0.5, 0.5, 0.001, 0.005),
            worst_case: None,
        }
    }

    /// 热浪预设：负荷误差放大并正偏
    pub fn heatwave() -> Self {
        Self {
            shape: SetShape::Interval,
            bias: DisturbanceVector::new(0.0, 1.0, 0.0, 0.0),
            sigma_multiplier: 2.5,
            radius_floor: DisturbanceVector::new(1.0, 3.0, 0.001, 0.01),
            worst_case: None,
        }
    }

    /// 云层遮挡预设：光伏误差放大并负偏
    pub fn cloud_cover() -> Self {
        Self {
            shape: SetShape::Interval,
            bias: DisturbanceVector::new(-2.0, 0.0, 0.0, 0.0),
            sigma_multiplier: 2.5,
            radius_floor: DisturbanceVector::new(4.0, 0.5, 0.001, 0.01),
            worst_case: None,
        }
    }

    /// 网络攻击预设：对抗最坏情况半径
    pub fn cyber_attack() -> Self {
        Self {
            shape: SetShape::Interval,
            bias: DisturbanceVector::default(),
            sigma_multiplier: 3.0,
            radius_floor: DisturbanceVector::new(4.0, 3.0, 0.002, 0.02),
            worst_case: Some(DisturbanceVector::new(10.0, 10.0, 0.08, 0.3)),
        }
    }
}

/// 全部场景的扰动档案
///
/// 字段为 `Option`，缺失的档案在构建估计器时报错。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioProfiles {
    /// 正常运行
    #[serde(default)]
    pub normal: Option<DisturbanceProfile>,
    /// 热浪
    #[serde(default)]
    pub heatwave: Option<DisturbanceProfile>,
    /// 云层遮挡
    #[serde(default)]
    pub cloud_cover: Option<DisturbanceProfile>,
    /// 网络攻击
    #[serde(default)]
    pub cyber_attack: Option<DisturbanceProfile>,
}

impl Default for ScenarioProfiles {
    fn default() -> Self {
        Self {
            normal: Some(DisturbanceProfile::normal()),
            heatwave: Some(DisturbanceProfile::heatwave()),
            cloud_cover: Some(DisturbanceProfile::cloud_cover()),
            cyber_attack: Some(DisturbanceProfile::cyber_attack()),
        }
    }
}

impl ScenarioProfiles {
    /// 获取场景档案
    pub fn get(&self, kind: ScenarioKind) -> Option<&DisturbanceProfile> {
        match kind {
            ScenarioKind::Normal => self.normal.as_ref(),
            ScenarioKind::Heatwave => self.heatwave.as_ref(),
            ScenarioKind::CloudCover => self.cloud_cover.as_ref(),
            ScenarioKind::CyberAttack => self.cyber_attack.as_ref(),
        }
    }

    /// 替换场景档案
    pub fn set(&mut self, kind: ScenarioKind, profile: DisturbanceProfile) {
        let slot = match kind {
            ScenarioKind::Normal => &mut self.normal,
            ScenarioKind::Heatwave => &mut self.heatwave,
            ScenarioKind::CloudCover => &mut self.cloud_cover,
            ScenarioKind::CyberAttack => &mut self.cyber_attack,
        };
        *slot = Some(profile);
    }

    /// 缺失档案的场景
    pub fn missing(&self) -> Vec<ScenarioKind> {
        ScenarioKind::ALL
            .into_iter()
            .filter(|k| self.get(*k).is_none())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_parse() {
        assert_eq!("normal".parse::<ScenarioKind>().unwrap(), ScenarioKind::Normal);
        assert_eq!("Cloud Cover".parse::<ScenarioKind>().unwrap(), ScenarioKind::CloudCover);
        assert_eq!("cyber_attack".parse::<ScenarioKind>().unwrap(), ScenarioKind::CyberAttack);
        assert_eq!("HEATWAVE".parse::<ScenarioKind>().unwrap(), ScenarioKind::Heatwave);
        assert!("heatwaves".parse::<ScenarioKind>().is_err());
    }

    #[test]
    fn test_stress_order() {
        assert!(ScenarioKind::Normal.is_calmer_than(ScenarioKind::Heatwave));
        assert!(!ScenarioKind::Heatwave.is_calmer_than(ScenarioKind::CloudCover));
        assert!(ScenarioKind::CloudCover.is_calmer_than(ScenarioKind::CyberAttack));
    }

    #[test]
    fn test_default_profiles_complete() {
        let profiles = ScenarioProfiles::default();
        assert!(profiles.missing().is_empty());
        assert!(profiles.get(ScenarioKind::CyberAttack).unwrap().is_adversarial());
        assert!(!profiles.get(ScenarioKind::Normal).unwrap().is_adversarial());
    }

    #[test]
    fn test_partial_profiles_from_json() {
        let json = r#"{ "normal": { "sigma_multiplier": 1.5 } }"#;
        let profiles: ScenarioProfiles = serde_json::from_str(json).unwrap();
        assert_eq!(profiles.missing().len(), 3);
        assert_eq!(profiles.get(ScenarioKind::Normal).unwrap().sigma_multiplier, 1.5);
    }
}
