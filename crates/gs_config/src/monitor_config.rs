// crates/gs_config/src/monitor_config.rs

//! MonitorConfig - 安全监控器配置（全 f64）
//!
//! 定义电网参数、屏障约束、认证器设置、场景扰动档案、
//! 在线校准与仿真参数。配置在加载时一次性校验，运行期间只读。

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use gs_foundation::validation::{ValidationError, ValidationReport, ValidationWarning};

use crate::barrier_spec::{default_barriers, BarrierKindSpec, BarrierSpec};
use crate::error::ConfigError;
use crate::scenario::{DisturbanceProfile, DisturbanceVector, ScenarioKind, ScenarioProfiles};
use crate::strategy::{FailSafePolicy, PolicyKind, SolverStrategy};

/// 前瞻步数超过此值时给出警告
const MAX_LOOKAHEAD_STEPS: usize = 20;

/// 安全监控器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// 电网物理参数
    #[serde(default)]
    pub grid: GridConfig,

    /// 屏障约束（按声明顺序求值）
    #[serde(default = "default_barriers")]
    pub barriers: Vec<BarrierSpec>,

    /// 认证器设置
    #[serde(default)]
    pub certifier: CertifierConfig,

    /// 场景扰动档案
    #[serde(default)]
    pub scenarios: ScenarioProfiles,

    /// 在线校准
    #[serde(default)]
    pub calibration: CalibrationConfig,

    /// 仿真设置
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// 电网物理参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// 控制步长 [s]
    #[serde(default = "default_dt")]
    pub dt_s: f64,

    /// 电池容量 [kWh]
    #[serde(default = "default_capacity")]
    pub capacity_kwh: f64,

    /// 电池最大充放电功率 [kW]
    #[serde(default = "default_battery_max")]
    pub battery_max_kw: f64,

    /// 最大可切负荷 [kW]
    #[serde(default = "default_shed_max")]
    pub shed_max_kw: f64,

    /// 充电效率
    #[serde(default = "default_efficiency")]
    pub charge_efficiency: f64,

    /// 放电效率
    #[serde(default = "default_efficiency")]
    pub discharge_efficiency: f64,

    /// 频率偏差衰减系数 ρ
    #[serde(default = "default_freq_decay")]
    pub freq_decay: f64,

    /// 交换功率变化对频率的增益 [Hz/kW]
    #[serde(default = "default_freq_gain")]
    pub freq_gain_hz_per_kw: f64,

    /// 交换功率变化对电压的增益 [V/kW]
    #[serde(default = "default_voltage_gain")]
    pub voltage_gain_v_per_kw: f64,

    /// 额定电压 [V]
    #[serde(default = "default_nominal_voltage")]
    pub nominal_voltage_v: f64,
}

fn default_dt() -> f64 { 60.0 }
fn default_capacity() -> f64 { 200.0 }
fn default_battery_max() -> f64 { 100.0 }
fn default_shed_max() -> f64 { 40.0 }
fn default_efficiency() -> f64 { 0.95 }
fn default_freq_decay() -> f64 { 0.8 }
fn default_freq_gain() -> f64 { 0.002 }
fn default_voltage_gain() -> f64 { 0.05 }
fn default_nominal_voltage() -> f64 { 230.0 }

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            dt_s: default_dt(),
            capacity_kwh: default_capacity(),
            battery_max_kw: default_battery_max(),
            shed_max_kw: default_shed_max(),
            charge_efficiency: default_efficiency(),
            discharge_efficiency: default_efficiency(),
            freq_decay: default_freq_decay(),
            freq_gain_hz_per_kw: default_freq_gain(),
            voltage_gain_v_per_kw: default_voltage_gain(),
            nominal_voltage_v: default_nominal_voltage(),
        }
    }
}

impl GridConfig {
    /// 步长 [h]
    #[inline]
    pub fn dt_hours(&self) -> f64 {
        self.dt_s / 3600.0
    }
}

/// 动作权重 W = diag(battery, shed)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionWeights {
    /// 电池功率权重
    #[serde(default = "default_battery_weight")]
    pub battery: f64,
    /// 切负荷权重
    #[serde(default = "default_shed_weight")]
    pub shed: f64,
}

fn default_battery_weight() -> f64 { 1.0 }
fn default_shed_weight() -> f64 { 4.0 }

impl Default for ActionWeights {
    fn default() -> Self {
        Self {
            battery: default_battery_weight(),
            shed: default_shed_weight(),
        }
    }
}

/// 故障安全动作配置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct FailSafeConfig {
    /// 策略
    #[serde(default)]
    pub policy: FailSafePolicy,
    /// 固定电池功率 [kW]
    #[serde(default)]
    pub battery_kw: f64,
    /// 固定切负荷 [kW]
    #[serde(default)]
    pub shed_kw: f64,
}

/// 认证器设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertifierConfig {
    /// 安全容差 ε
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,

    /// 求解器收敛容差
    #[serde(default = "default_convergence")]
    pub convergence: f64,

    /// 求解器最大迭代次数
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// 最大重线性化次数
    #[serde(default = "default_max_relinearizations")]
    pub max_relinearizations: usize,

    /// 求解策略
    #[serde(default)]
    pub solver: SolverStrategy,

    /// 动作权重
    #[serde(default)]
    pub action_weights: ActionWeights,

    /// 故障安全动作
    #[serde(default)]
    pub fail_safe: FailSafeConfig,

    /// 是否跨步复用对偶变量（关闭时逐位确定）
    #[serde(default)]
    pub warm_start: bool,

    /// 多步前瞻步数，小于 2 时关闭
    ///
    /// 以认证动作保持不变推演名义轨迹，只报告预警，不参与认证。
    #[serde(default = "default_lookahead_steps")]
    pub lookahead_steps: usize,
}

fn default_epsilon() -> f64 { 1e-6 }
fn default_convergence() -> f64 { 1e-9 }
fn default_max_iterations() -> usize { 500 }
fn default_max_relinearizations() -> usize { 3 }
fn default_lookahead_steps() -> usize { 5 }

impl Default for CertifierConfig {
    fn default() -> Self {
        Self {
            epsilon: default_epsilon(),
            convergence: default_convergence(),
            max_iterations: default_max_iterations(),
            max_relinearizations: default_max_relinearizations(),
            solver: SolverStrategy::default(),
            action_weights: ActionWeights::default(),
            fail_safe: FailSafeConfig::default(),
            warm_start: false,
            lookahead_steps: default_lookahead_steps(),
        }
    }
}

/// 在线保形校准设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// 是否启用
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 初始校准因子 η
    #[serde(default = "default_initial_factor")]
    pub initial_factor: f64,
    /// 学习率 γ
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// 目标覆盖率
    #[serde(default = "default_target_coverage")]
    pub target_coverage: f64,
    /// η 下限
    #[serde(default = "default_min_factor")]
    pub min_factor: f64,
    /// η 上限
    #[serde(default = "default_max_factor")]
    pub max_factor: f64,
    /// 预热样本数（之前只用半径下限）
    #[serde(default = "default_warmup")]
    pub warmup_samples: u64,
}

fn default_true() -> bool { true }
fn default_initial_factor() -> f64 { 1.0 }
fn default_learning_rate() -> f64 { 0.05 }
fn default_target_coverage() -> f64 { 0.9 }
fn default_min_factor() -> f64 { 0.5 }
fn default_max_factor() -> f64 { 3.0 }
fn default_warmup() -> u64 { 10 }

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            initial_factor: default_initial_factor(),
            learning_rate: default_learning_rate(),
            target_coverage: default_target_coverage(),
            min_factor: default_min_factor(),
            max_factor: default_max_factor(),
            warmup_samples: default_warmup(),
        }
    }
}

/// 初始运行点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialStateConfig {
    /// 荷电状态 [-]
    #[serde(default = "default_initial_soc")]
    pub soc: f64,
    /// 光伏出力 [kW]
    #[serde(default = "default_initial_pv")]
    pub pv_kw: f64,
    /// 负荷 [kW]
    #[serde(default = "default_initial_load")]
    pub load_kw: f64,
    /// 母线电压 [V]
    #[serde(default = "default_nominal_voltage")]
    pub voltage_v: f64,
    /// 频率偏差 [Hz]
    #[serde(default)]
    pub freq_dev_hz: f64,
}

fn default_initial_soc() -> f64 { 0.6 }
fn default_initial_pv() -> f64 { 25.0 }
fn default_initial_load() -> f64 { 35.0 }

impl Default for InitialStateConfig {
    fn default() -> Self {
        Self {
            soc: default_initial_soc(),
            pv_kw: default_initial_pv(),
            load_kw: default_initial_load(),
            voltage_v: default_nominal_voltage(),
            freq_dev_hz: 0.0,
        }
    }
}

/// 外部输入曲线参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExogenousConfig {
    /// 光伏峰值 [kW]
    #[serde(default = "default_pv_peak")]
    pub pv_peak_kw: f64,
    /// 基础负荷 [kW]
    #[serde(default = "default_initial_load")]
    pub base_load_kw: f64,
    /// 光伏噪声标准差 [kW]
    #[serde(default = "default_pv_noise")]
    pub pv_noise_kw: f64,
    /// 负荷噪声标准差 [kW]
    #[serde(default = "default_load_noise")]
    pub load_noise_kw: f64,
    /// 一天对应的步数
    #[serde(default = "default_ticks_per_day")]
    pub ticks_per_day: u64,
}

fn default_pv_peak() -> f64 { 60.0 }
fn default_pv_noise() -> f64 { 1.5 }
fn default_load_noise() -> f64 { 1.0 }
fn default_ticks_per_day() -> u64 { 1440 }

impl Default for ExogenousConfig {
    fn default() -> Self {
        Self {
            pv_peak_kw: default_pv_peak(),
            base_load_kw: default_initial_load(),
            pv_noise_kw: default_pv_noise(),
            load_noise_kw: default_load_noise(),
            ticks_per_day: default_ticks_per_day(),
        }
    }
}

/// 仿真设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// 随机种子
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// 默认步数
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    /// 默认场景
    #[serde(default)]
    pub scenario: ScenarioKind,
    /// 提案策略
    #[serde(default)]
    pub policy: PolicyKind,
    /// 固定调度策略的电池功率 [kW]
    #[serde(default)]
    pub fixed_battery_kw: f64,
    /// 固定调度策略的切负荷 [kW]
    #[serde(default)]
    pub fixed_shed_kw: f64,
    /// 初始运行点
    #[serde(default)]
    pub initial: InitialStateConfig,
    /// 外部输入曲线
    #[serde(default)]
    pub exogenous: ExogenousConfig,
}

fn default_seed() -> u64 { 42 }
fn default_ticks() -> u64 { 240 }

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            ticks: default_ticks(),
            scenario: ScenarioKind::default(),
            policy: PolicyKind::default(),
            fixed_battery_kw: 0.0,
            fixed_shed_kw: 0.0,
            initial: InitialStateConfig::default(),
            exogenous: ExogenousConfig::default(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            barriers: default_barriers(),
            certifier: CertifierConfig::default(),
            scenarios: ScenarioProfiles::default(),
            calibration: CalibrationConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        let config = Self::from_json(&content)?;
        Ok(config)
    }

    /// 从 JSON 字符串加载配置
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: MonitorConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(ConfigError::Io)?;
        Ok(())
    }

    /// 验证配置有效性
    ///
    /// 缺失的场景档案报告为 [`ConfigError::UndefinedProfile`]，
    /// 其余问题报告第一条错误。警告不影响结果。
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(kind) = self.scenarios.missing().first() {
            return Err(ConfigError::UndefinedProfile(kind.key().to_string()));
        }
        let report = self.validation_report();
        match report.errors.into_iter().next() {
            None => Ok(()),
            Some(err) => Err(validation_to_config_error(err)),
        }
    }

    /// 生成完整验证报告（错误与警告）
    pub fn validation_report(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        self.check_grid(&mut report);
        self.check_barriers(&mut report);
        self.check_certifier(&mut report);
        self.check_scenarios(&mut report);
        self.check_calibration(&mut report);
        self.check_simulation(&mut report);
        report
    }

    fn check_grid(&self, report: &mut ValidationReport) {
        let g = &self.grid;
        report.check_range("grid.dt_s", g.dt_s, 1e-3, 86_400.0);
        report.check_range("grid.capacity_kwh", g.capacity_kwh, 1e-6, f64::MAX);
        report.check_range("grid.battery_max_kw", g.battery_max_kw, 0.0, f64::MAX);
        report.check_range("grid.shed_max_kw", g.shed_max_kw, 0.0, f64::MAX);
        report.check_range("grid.charge_efficiency", g.charge_efficiency, 1e-6, 1.0);
        report.check_range("grid.discharge_efficiency", g.discharge_efficiency, 1e-6, 1.0);
        report.check_range("grid.freq_decay", g.freq_decay, 0.0, 1.0);
        report.check_range("grid.freq_gain_hz_per_kw", g.freq_gain_hz_per_kw, 0.0, f64::MAX);
        report.check_range("grid.voltage_gain_v_per_kw", g.voltage_gain_v_per_kw, 0.0, f64::MAX);
        report.check_range("grid.nominal_voltage_v", g.nominal_voltage_v, 1e-6, f64::MAX);
    }

    fn check_barriers(&self, report: &mut ValidationReport) {
        if self.barriers.is_empty() {
            report.add_warning(ValidationWarning::Custom {
                message: "未配置屏障约束，所有动作都将判定为 SAFE".into(),
            });
        }
        let mut seen = HashSet::new();
        for (i, spec) in self.barriers.iter().enumerate() {
            let prefix = format!("barriers[{}]", i);
            if spec.alpha <= 0.0 || !spec.alpha.is_finite() || spec.alpha > 1.0 {
                report.add_error(ValidationError::OutOfRange {
                    field: format!("{}.alpha", prefix),
                    value: spec.alpha,
                    min: 0.0,
                    max: 1.0,
                });
            }
            let name = spec.resolved_name().to_string();
            if !seen.insert(name.clone()) {
                report.add_error(ValidationError::ConsistencyError {
                    message: format!("屏障名称重复: {}", name),
                });
            }
            match &spec.kind {
                BarrierKindSpec::SocMin { min } => {
                    report.check_range(format!("{}.min", prefix), *min, 0.0, 1.0)
                }
                BarrierKindSpec::SocMax { max } => {
                    report.check_range(format!("{}.max", prefix), *max, 0.0, 1.0)
                }
                BarrierKindSpec::LineImport { limit_kw } | BarrierKindSpec::LineExport { limit_kw } => {
                    report.check_range(format!("{}.limit_kw", prefix), *limit_kw, 0.0, f64::MAX)
                }
                BarrierKindSpec::FrequencyBand { max_dev_hz } => {
                    report.check_range(format!("{}.max_dev_hz", prefix), *max_dev_hz, 1e-9, f64::MAX)
                }
                BarrierKindSpec::VoltageBand { min_v, max_v } => {
                    report.check_range(format!("{}.min_v", prefix), *min_v, 0.0, f64::MAX);
                    report.check_range(format!("{}.max_v", prefix), *max_v, 0.0, f64::MAX);
                    if min_v.is_finite() && max_v.is_finite() && min_v >= max_v {
                        report.add_error(ValidationError::ConsistencyError {
                            message: format!("{}: 电压下限 {} 不小于上限 {}", prefix, min_v, max_v),
                        });
                    }
                }
            }
        }
    }

    fn check_certifier(&self, report: &mut ValidationReport) {
        let c = &self.certifier;
        report.check_range("certifier.epsilon", c.epsilon, f64::MIN_POSITIVE, 1.0);
        report.check_range("certifier.convergence", c.convergence, f64::MIN_POSITIVE, 1.0);
        if c.max_iterations == 0 {
            report.add_error(ValidationError::Custom {
                message: "certifier.max_iterations 必须大于 0".into(),
            });
        }
        report.check_range("certifier.action_weights.battery", c.action_weights.battery, f64::MIN_POSITIVE, f64::MAX);
        report.check_range("certifier.action_weights.shed", c.action_weights.shed, f64::MIN_POSITIVE, f64::MAX);

        let g = &self.grid;
        report.check_range(
            "certifier.fail_safe.battery_kw",
            c.fail_safe.battery_kw,
            -g.battery_max_kw,
            g.battery_max_kw,
        );
        report.check_range("certifier.fail_safe.shed_kw", c.fail_safe.shed_kw, 0.0, g.shed_max_kw);

        if c.lookahead_steps > MAX_LOOKAHEAD_STEPS {
            report.add_warning(ValidationWarning::HighValue {
                field: "certifier.lookahead_steps".into(),
                value: c.lookahead_steps as f64,
                threshold: MAX_LOOKAHEAD_STEPS as f64,
            });
        }
        if c.warm_start {
            report.add_warning(ValidationWarning::Custom {
                message: "已启用 warm_start，认证结果依赖历史，不再逐位可复现".into(),
            });
        }
    }

    fn check_scenarios(&self, report: &mut ValidationReport) {
        for kind in self.scenarios.missing() {
            report.add_error(ValidationError::ConsistencyError {
                message: format!("场景 '{}' 未定义扰动档案", kind.key()),
            });
        }
        for kind in ScenarioKind::ALL {
            let Some(profile) = self.scenarios.get(kind) else {
                continue;
            };
            let prefix = format!("scenarios.{}", kind.key());
            report.check_range(
                format!("{}.sigma_multiplier", prefix),
                profile.sigma_multiplier,
                0.0,
                f64::MAX,
            );
            check_vector(report, &format!("{}.radius_floor", prefix), &profile.radius_floor, 0.0);
            check_vector(report, &format!("{}.bias", prefix), &profile.bias, f64::MIN);
            if let Some(worst) = &profile.worst_case {
                check_vector(report, &format!("{}.worst_case", prefix), worst, 0.0);
            }
        }

        // 档案表非单调时，估计器会取包络，这里只提示
        for calmer in ScenarioKind::ALL {
            for harsher in ScenarioKind::ALL {
                if !calmer.is_calmer_than(harsher) {
                    continue;
                }
                let (Some(a), Some(b)) = (self.scenarios.get(calmer), self.scenarios.get(harsher)) else {
                    continue;
                };
                let ra = effective_floor(a).to_array();
                let rb = effective_floor(b).to_array();
                for (j, name) in DisturbanceVector::NAMES.iter().enumerate() {
                    if rb[j] < ra[j] {
                        report.add_warning(ValidationWarning::NonMonotone {
                            calmer: calmer.key().into(),
                            harsher: harsher.key().into(),
                            dimension: (*name).into(),
                        });
                    }
                }
            }
        }
    }

    fn check_calibration(&self, report: &mut ValidationReport) {
        let c = &self.calibration;
        report.check_range("calibration.learning_rate", c.learning_rate, 0.0, 1.0);
        report.check_range("calibration.target_coverage", c.target_coverage, 0.0, 1.0);
        report.check_range("calibration.min_factor", c.min_factor, 0.0, f64::MAX);
        report.check_range("calibration.max_factor", c.max_factor, c.min_factor, f64::MAX);
        report.check_range("calibration.initial_factor", c.initial_factor, c.min_factor, c.max_factor);
    }

    fn check_simulation(&self, report: &mut ValidationReport) {
        let s = &self.simulation;
        let g = &self.grid;
        report.check_range("simulation.initial.soc", s.initial.soc, 0.0, 1.0);
        report.check_range("simulation.initial.pv_kw", s.initial.pv_kw, 0.0, f64::MAX);
        report.check_range("simulation.initial.load_kw", s.initial.load_kw, 0.0, f64::MAX);
        report.check_range("simulation.initial.voltage_v", s.initial.voltage_v, 0.0, f64::MAX);
        report.check_range("simulation.initial.freq_dev_hz", s.initial.freq_dev_hz, f64::MIN, f64::MAX);
        report.check_range("simulation.fixed_battery_kw", s.fixed_battery_kw, f64::MIN, f64::MAX);
        report.check_range("simulation.fixed_shed_kw", s.fixed_shed_kw, f64::MIN, f64::MAX);
        report.check_range("simulation.exogenous.pv_peak_kw", s.exogenous.pv_peak_kw, 0.0, f64::MAX);
        report.check_range("simulation.exogenous.base_load_kw", s.exogenous.base_load_kw, 0.0, f64::MAX);
        report.check_range("simulation.exogenous.pv_noise_kw", s.exogenous.pv_noise_kw, 0.0, f64::MAX);
        report.check_range("simulation.exogenous.load_noise_kw", s.exogenous.load_noise_kw, 0.0, f64::MAX);
        if s.exogenous.ticks_per_day == 0 {
            report.add_error(ValidationError::Custom {
                message: "simulation.exogenous.ticks_per_day 必须大于 0".into(),
            });
        }
        if s.fixed_battery_kw.abs() > g.battery_max_kw || s.fixed_shed_kw > g.shed_max_kw {
            report.add_warning(ValidationWarning::Custom {
                message: "固定调度超出执行器范围，认证器将始终校正".into(),
            });
        }
        if s.exogenous.pv_peak_kw > 2.0 * g.battery_max_kw {
            report.add_warning(ValidationWarning::HighValue {
                field: "simulation.exogenous.pv_peak_kw".into(),
                value: s.exogenous.pv_peak_kw,
                threshold: 2.0 * g.battery_max_kw,
            });
        }
    }
}

/// 档案在零方差下的有效半径
fn effective_floor(profile: &DisturbanceProfile) -> DisturbanceVector {
    let floor = profile.radius_floor.to_array();
    let worst = profile.worst_case.map(|w| w.to_array()).unwrap_or([0.0; 4]);
    let mut out = [0.0; 4];
    for j in 0..4 {
        out[j] = floor[j].max(worst[j]);
    }
    DisturbanceVector::from_array(out)
}

fn check_vector(report: &mut ValidationReport, prefix: &str, v: &DisturbanceVector, min: f64) {
    for (name, value) in DisturbanceVector::NAMES.iter().zip(v.to_array()) {
        report.check_range(format!("{}.{}", prefix, name), value, min, f64::MAX);
    }
}

fn validation_to_config_error(err: ValidationError) -> ConfigError {
    match err {
        ValidationError::NonFinite { field, value } => {
            ConfigError::invalid(field, value, "必须为有限值")
        }
        ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        } => ConfigError::invalid(field, value, format!("必须在 [{}, {}] 范围内", min, max)),
        ValidationError::ConsistencyError { message } | ValidationError::Custom { message } => {
            ConfigError::Build(message)
        }
    }
}
