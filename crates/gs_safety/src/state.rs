// crates/gs_safety/src/state.rs

//! 状态、动作与扰动向量
//!
//! 三类向量都是定长、按名称索引的连续量：
//!
//! | 向量 | 维度 | 变量（按顺序） |
//! |------|------|----------------|
//! | [`GridState`] | 6 | soc, line_flow_kw, freq_dev_hz, voltage_v, pv_kw, load_kw |
//! | [`ControlAction`] | 2 | battery_kw（正为放电）, shed_kw |
//! | [`Disturbance`] | 4 | pv_kw, load_kw, soc, freq_hz |
//!
//! 构造时检查长度、变量名与有限性，构造后不可变。

use serde::Serialize;

use gs_config::{DisturbanceVector, DISTURBANCE_DIM};

use crate::error::ModelError;

/// 状态维度
pub const STATE_DIM: usize = 6;
/// 动作维度
pub const ACTION_DIM: usize = 2;

/// 状态变量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateVar {
    /// 荷电状态 [-]
    Soc,
    /// 并网点交换功率 [kW]，正为购电
    LineFlow,
    /// 频率偏差 [Hz]
    FreqDev,
    /// 母线电压 [V]
    Voltage,
    /// 光伏出力 [kW]
    Pv,
    /// 负荷 [kW]
    Load,
}

impl StateVar {
    /// 全部变量，顺序即向量下标
    pub const ALL: [StateVar; STATE_DIM] = [
        Self::Soc,
        Self::LineFlow,
        Self::FreqDev,
        Self::Voltage,
        Self::Pv,
        Self::Load,
    ];

    /// 向量下标
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// 变量名
    pub const fn name(self) -> &'static str {
        match self {
            Self::Soc => "soc",
            Self::LineFlow => "line_flow_kw",
            Self::FreqDev => "freq_dev_hz",
            Self::Voltage => "voltage_v",
            Self::Pv => "pv_kw",
            Self::Load => "load_kw",
        }
    }
}

const STATE_NAMES: [&str; STATE_DIM] = [
    "soc",
    "line_flow_kw",
    "freq_dev_hz",
    "voltage_v",
    "pv_kw",
    "load_kw",
];
const ACTION_NAMES: [&str; ACTION_DIM] = ["battery_kw", "shed_kw"];

fn check_finite<const N: usize>(
    what: &'static str,
    names: &[&'static str; N],
    values: &[f64; N],
) -> Result<(), ModelError> {
    for (name, value) in names.iter().zip(values) {
        if !value.is_finite() {
            return Err(ModelError::NonFinite {
                what,
                name: *name,
                value: *value,
            });
        }
    }
    Ok(())
}

fn array_from_slice<const N: usize>(
    what: &'static str,
    names: &[&'static str; N],
    values: &[f64],
) -> Result<[f64; N], ModelError> {
    let array: [f64; N] = values
        .try_into()
        .map_err(|_| ModelError::DimensionMismatch {
            what,
            expected: N,
            actual: values.len(),
        })?;
    check_finite(what, names, &array)?;
    Ok(array)
}

fn array_from_pairs<const N: usize>(
    what: &'static str,
    names: &[&'static str; N],
    pairs: &[(&str, f64)],
) -> Result<[f64; N], ModelError> {
    let mut slots: [Option<f64>; N] = [None; N];
    for (name, value) in pairs {
        let idx = names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| ModelError::UnknownVariable {
                what,
                name: (*name).to_string(),
            })?;
        if slots[idx].is_some() {
            return Err(ModelError::DuplicateVariable {
                what,
                name: names[idx],
            });
        }
        slots[idx] = Some(*value);
    }
    let mut array = [0.0; N];
    for (i, slot) in slots.iter().enumerate() {
        array[i] = slot.ok_or(ModelError::MissingVariable {
            what,
            name: names[i],
        })?;
    }
    check_finite(what, names, &array)?;
    Ok(array)
}

// ============================================================
// 电网状态
// ============================================================

/// 电网状态快照
///
/// 每个控制步产生一个新状态，旧状态不被修改。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridState {
    tick: u64,
    time_s: f64,
    soc: f64,
    line_flow_kw: f64,
    freq_dev_hz: f64,
    voltage_v: f64,
    pv_kw: f64,
    load_kw: f64,
}

impl GridState {
    /// 变量名（按下标顺序）
    pub const NAMES: [&'static str; STATE_DIM] = STATE_NAMES;

    /// 从定长切片构造（tick = 0, t = 0）
    pub fn from_slice(values: &[f64]) -> Result<Self, ModelError> {
        let array = array_from_slice("GridState", &STATE_NAMES, values)?;
        Ok(Self::from_array(array, 0, 0.0))
    }

    /// 从 (名称, 值) 对构造，必须恰好覆盖全部变量
    pub fn from_pairs(pairs: &[(&str, f64)]) -> Result<Self, ModelError> {
        let array = array_from_pairs("GridState", &STATE_NAMES, pairs)?;
        Ok(Self::from_array(array, 0, 0.0))
    }

    /// 稳态运行点：交换功率与空闲电池一致，频率偏差为零
    pub fn steady(soc: f64, pv_kw: f64, load_kw: f64, voltage_v: f64) -> Result<Self, ModelError> {
        Self::from_slice(&[soc, load_kw - pv_kw, 0.0, voltage_v, pv_kw, load_kw])
    }

    /// 设置步序号与时间
    pub fn at(mut self, tick: u64, time_s: f64) -> Self {
        self.tick = tick;
        self.time_s = time_s;
        self
    }

    pub(crate) fn from_array(v: [f64; STATE_DIM], tick: u64, time_s: f64) -> Self {
        Self {
            tick,
            time_s,
            soc: v[0],
            line_flow_kw: v[1],
            freq_dev_hz: v[2],
            voltage_v: v[3],
            pv_kw: v[4],
            load_kw: v[5],
        }
    }

    /// 替换单个变量，返回新状态
    pub fn with_var(&self, var: StateVar, value: f64) -> Result<Self, ModelError> {
        let mut v = self.to_array();
        v[var.index()] = value;
        check_finite("GridState", &STATE_NAMES, &v)?;
        Ok(Self::from_array(v, self.tick, self.time_s))
    }

    /// 转为定长数组
    #[inline]
    pub fn to_array(&self) -> [f64; STATE_DIM] {
        [
            self.soc,
            self.line_flow_kw,
            self.freq_dev_hz,
            self.voltage_v,
            self.pv_kw,
            self.load_kw,
        ]
    }

    /// 按变量取值
    #[inline]
    pub fn get(&self, var: StateVar) -> f64 {
        self.to_array()[var.index()]
    }

    /// 步序号
    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// 仿真时间 [s]
    #[inline]
    pub fn time_s(&self) -> f64 {
        self.time_s
    }

    /// 荷电状态 [-]
    #[inline]
    pub fn soc(&self) -> f64 {
        self.soc
    }

    /// 交换功率 [kW]
    #[inline]
    pub fn line_flow_kw(&self) -> f64 {
        self.line_flow_kw
    }

    /// 频率偏差 [Hz]
    #[inline]
    pub fn freq_dev_hz(&self) -> f64 {
        self.freq_dev_hz
    }

    /// 电压 [V]
    #[inline]
    pub fn voltage_v(&self) -> f64 {
        self.voltage_v
    }

    /// 光伏 [kW]
    #[inline]
    pub fn pv_kw(&self) -> f64 {
        self.pv_kw
    }

    /// 负荷 [kW]
    #[inline]
    pub fn load_kw(&self) -> f64 {
        self.load_kw
    }
}

// ============================================================
// 控制动作
// ============================================================

/// 控制动作
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlAction {
    battery_kw: f64,
    shed_kw: f64,
}

impl ControlAction {
    /// 变量名（按下标顺序）
    pub const NAMES: [&'static str; ACTION_DIM] = ACTION_NAMES;

    /// 创建动作
    pub fn new(battery_kw: f64, shed_kw: f64) -> Result<Self, ModelError> {
        Self::from_slice(&[battery_kw, shed_kw])
    }

    /// 空动作（电池空闲、不切负荷）
    pub const fn idle() -> Self {
        Self {
            battery_kw: 0.0,
            shed_kw: 0.0,
        }
    }

    /// 从定长切片构造
    pub fn from_slice(values: &[f64]) -> Result<Self, ModelError> {
        let array = array_from_slice("ControlAction", &ACTION_NAMES, values)?;
        Ok(Self::from_array(array))
    }

    /// 从 (名称, 值) 对构造
    pub fn from_pairs(pairs: &[(&str, f64)]) -> Result<Self, ModelError> {
        let array = array_from_pairs("ControlAction", &ACTION_NAMES, pairs)?;
        Ok(Self::from_array(array))
    }

    pub(crate) const fn from_array(v: [f64; ACTION_DIM]) -> Self {
        Self {
            battery_kw: v[0],
            shed_kw: v[1],
        }
    }

    /// 转为定长数组
    #[inline]
    pub fn to_array(&self) -> [f64; ACTION_DIM] {
        [self.battery_kw, self.shed_kw]
    }

    /// 电池功率 [kW]，正为放电
    #[inline]
    pub fn battery_kw(&self) -> f64 {
        self.battery_kw
    }

    /// 切负荷 [kW]
    #[inline]
    pub fn shed_kw(&self) -> f64 {
        self.shed_kw
    }
}

impl Default for ControlAction {
    fn default() -> Self {
        Self::idle()
    }
}

// ============================================================
// 扰动
// ============================================================

/// 下一步扰动
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Disturbance {
    pv_kw: f64,
    load_kw: f64,
    soc: f64,
    freq_hz: f64,
}

impl Disturbance {
    /// 零扰动
    pub const fn zero() -> Self {
        Self {
            pv_kw: 0.0,
            load_kw: 0.0,
            soc: 0.0,
            freq_hz: 0.0,
        }
    }

    /// 从定长切片构造
    pub fn from_slice(values: &[f64]) -> Result<Self, ModelError> {
        let array = array_from_slice("Disturbance", &DisturbanceVector::NAMES, values)?;
        Ok(Self::from_array(array))
    }

    pub(crate) const fn from_array(v: [f64; DISTURBANCE_DIM]) -> Self {
        Self {
            pv_kw: v[0],
            load_kw: v[1],
            soc: v[2],
            freq_hz: v[3],
        }
    }

    /// 转为定长数组
    #[inline]
    pub fn to_array(&self) -> [f64; DISTURBANCE_DIM] {
        [self.pv_kw, self.load_kw, self.soc, self.freq_hz]
    }

    /// 光伏误差 [kW]
    #[inline]
    pub fn pv_kw(&self) -> f64 {
        self.pv_kw
    }

    /// 负荷误差 [kW]
    #[inline]
    pub fn load_kw(&self) -> f64 {
        self.load_kw
    }

    /// 荷电状态误差 [-]
    #[inline]
    pub fn soc(&self) -> f64 {
        self.soc
    }

    /// 频率噪声 [Hz]
    #[inline]
    pub fn freq_hz(&self) -> f64 {
        self.freq_hz
    }
}

impl From<DisturbanceVector> for Disturbance {
    fn from(v: DisturbanceVector) -> Self {
        Self::from_array(v.to_array())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_slice() {
        let s = GridState::from_slice(&[0.5, 10.0, 0.0, 230.0, 20.0, 30.0]).unwrap();
        assert_eq!(s.get(StateVar::LineFlow), 10.0);
        assert_eq!(s.tick(), 0);
        assert!(matches!(
            GridState::from_slice(&[0.5, 1.0]),
            Err(ModelError::DimensionMismatch { expected: 6, actual: 2, .. })
        ));
    }

    #[test]
    fn test_state_from_pairs() {
        let pairs = [
            ("load_kw", 30.0),
            ("pv_kw", 20.0),
            ("voltage_v", 230.0),
            ("freq_dev_hz", 0.0),
            ("line_flow_kw", 10.0),
            ("soc", 0.5),
        ];
        let s = GridState::from_pairs(&pairs).unwrap();
        assert_eq!(s.soc(), 0.5);
        assert_eq!(s.load_kw(), 30.0);

        let missing = &pairs[..5];
        assert!(matches!(
            GridState::from_pairs(missing),
            Err(ModelError::MissingVariable { name: "soc", .. })
        ));

        let mut unknown = pairs.to_vec();
        unknown[0] = ("laod_kw", 30.0);
        assert!(matches!(
            GridState::from_pairs(&unknown),
            Err(ModelError::UnknownVariable { .. })
        ));
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(matches!(
            ControlAction::new(f64::NAN, 0.0),
            Err(ModelError::NonFinite { name: "battery_kw", .. })
        ));
        assert!(Disturbance::from_slice(&[0.0, f64::INFINITY, 0.0, 0.0]).is_err());
        assert!(Disturbance::from_slice(&[0.0; 3]).is_err());
    }

    #[test]
    fn test_steady_state_balance() {
        let s = GridState::steady(0.6, 25.0, 35.0, 230.0).unwrap();
        assert_eq!(s.line_flow_kw(), 10.0);
        assert_eq!(s.freq_dev_hz(), 0.0);
    }

    #[test]
    fn test_with_var() {
        let s = GridState::steady(0.6, 25.0, 35.0, 230.0).unwrap().at(3, 180.0);
        let t = s.with_var(StateVar::Voltage, 215.0).unwrap();
        assert_eq!(t.voltage_v(), 215.0);
        assert_eq!(t.tick(), 3);
        assert_eq!(s.voltage_v(), 230.0);
    }
}
