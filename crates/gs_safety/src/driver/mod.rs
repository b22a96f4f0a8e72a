// crates/gs_safety/src/driver/mod.rs

//! 场景驱动器
//!
//! 持有权威状态，每次 [`ScenarioDriver::step`] 推进一步：
//!
//! ```text
//! 场景上下文 → 估计不确定集 → 策略提案 → 认证
//!   → 采样实际扰动（含待注入故障）→ 以认证动作推进状态
//!   → 更新校准与统计 → 通知观察者
//! ```
//!
//! 驱动器是唯一跨步可变的组件，多个实例之间不共享任何状态。
//!
//! 过滤方式可切换为确定性 CBF（保留估计中心、半径置零）或不过滤，用于方法对比；
//! 覆盖率与校准始终基于估计的不确定集。

pub mod exogenous;
pub mod observer;
pub mod policy;
pub mod summary;

pub use exogenous::ExogenousProfile;
pub use observer::{FnObserver, LoggingObserver, ObserverSet, TickObserver, TickRecord};
pub use policy::{policy_from_config, FixedDispatch, GreedyDispatch, ProposalPolicy};
pub use summary::RunSummary;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use gs_config::{FilterMode, MonitorConfig, ScenarioKind};

use crate::cancel::CancelToken;
use crate::certifier::{CertificationResult, Certifier};
use crate::error::{CoreError, ModelError};
use crate::state::{GridState, StateVar};
use crate::uncertainty::{
    ConformalCalibrator, ScenarioContext, SignalStatistics, UncertaintyEstimator, UncertaintySet,
};
use summary::SummaryAccumulator;

/// 一次性故障注入，作用于下一步的实际状态
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fault {
    /// 母线电压骤降
    DropVoltage {
        /// 下降量 (V)
        volts: f64,
    },
    /// 频率尖峰
    SpikeFrequency {
        /// 偏差增量 (Hz)
        hz: f64,
    },
}

impl Fault {
    /// 作用到状态上
    pub fn apply(&self, state: &GridState) -> Result<GridState, ModelError> {
        match *self {
            Self::DropVoltage { volts } => {
                state.with_var(StateVar::Voltage, state.voltage_v() - volts)
            }
            Self::SpikeFrequency { hz } => {
                state.with_var(StateVar::FreqDev, state.freq_dev_hz() + hz)
            }
        }
    }
}

/// 场景驱动器
pub struct ScenarioDriver {
    scenario: ScenarioKind,
    filter: FilterMode,
    estimator: UncertaintyEstimator,
    certifier: Certifier,
    calibrator: ConformalCalibrator,
    statistics: SignalStatistics,
    warmup_samples: u64,
    exogenous: ExogenousProfile,
    policy: Box<dyn ProposalPolicy>,
    observers: ObserverSet,
    cancel: CancelToken,
    initial: GridState,
    state: GridState,
    last: Option<CertificationResult>,
    pending_faults: Vec<Fault>,
    summary: SummaryAccumulator,
    dt_hours: f64,
}

impl std::fmt::Debug for ScenarioDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioDriver")
            .field("scenario", &self.scenario)
            .field("filter", &self.filter)
            .field("policy", &self.policy.name())
            .field("state", &self.state)
            .field("observers", &self.observers)
            .finish()
    }
}

/// 由仿真配置构造初始状态
pub fn initial_state(config: &MonitorConfig) -> Result<GridState, ModelError> {
    let init = &config.simulation.initial;
    GridState::from_slice(&[
        init.soc,
        init.load_kw - init.pv_kw,
        init.freq_dev_hz,
        init.voltage_v,
        init.pv_kw,
        init.load_kw,
    ])
}

impl ScenarioDriver {
    /// 创建驱动器，配置校验失败时返回错误
    pub fn new(config: &MonitorConfig, scenario: ScenarioKind) -> Result<Self, CoreError> {
        config.validate()?;
        let estimator = UncertaintyEstimator::new(&config.scenarios)?;
        let certifier = Certifier::from_config(config)?;
        let initial = initial_state(config)?;
        let policy = policy_from_config(&config.simulation, &config.grid)?;
        Ok(Self {
            scenario,
            filter: FilterMode::default(),
            estimator,
            certifier,
            calibrator: ConformalCalibrator::new(&config.calibration),
            statistics: SignalStatistics::new(),
            warmup_samples: config.calibration.warmup_samples,
            exogenous: ExogenousProfile::new(
                &config.simulation.exogenous,
                scenario,
                config.simulation.seed,
            ),
            policy,
            observers: ObserverSet::default(),
            cancel: CancelToken::new(),
            initial,
            state: initial,
            last: None,
            pending_faults: Vec::new(),
            summary: SummaryAccumulator::default(),
            dt_hours: config.grid.dt_hours(),
        })
    }

    /// 替换提案策略
    pub fn with_policy(mut self, policy: Box<dyn ProposalPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// 切换过滤方式
    pub fn with_filter_mode(mut self, filter: FilterMode) -> Self {
        self.filter = filter;
        self
    }

    /// 替换外生扰动种子
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.exogenous = ExogenousProfile::new(self.exogenous.config(), self.scenario, seed);
        self
    }

    /// 替换初始状态
    pub fn with_initial_state(mut self, state: GridState) -> Self {
        self.initial = state;
        self.state = state;
        self
    }

    /// 使用外部取消令牌
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// 添加观察者
    pub fn add_observer(&mut self, observer: Arc<dyn TickObserver>) {
        self.observers.add(observer);
    }

    /// 场景
    #[inline]
    pub fn scenario(&self) -> ScenarioKind {
        self.scenario
    }

    /// 过滤方式
    #[inline]
    pub fn filter_mode(&self) -> FilterMode {
        self.filter
    }

    /// 当前状态
    #[inline]
    pub fn state(&self) -> &GridState {
        &self.state
    }

    /// 最近一步的认证结果
    #[inline]
    pub fn last_result(&self) -> Option<&CertificationResult> {
        self.last.as_ref()
    }

    /// 认证器
    #[inline]
    pub fn certifier(&self) -> &Certifier {
        &self.certifier
    }

    /// 当前校准因子 η
    #[inline]
    pub fn calibration_factor(&self) -> f64 {
        self.calibrator.factor()
    }

    /// 取消令牌
    #[inline]
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// 运行摘要
    pub fn summary(&self) -> RunSummary {
        self.summary
            .finish(self.scenario, self.filter, self.calibrator.factor())
    }

    /// 注入故障，在下一步生效
    pub fn inject(&mut self, fault: Fault) {
        debug!(scenario = self.scenario.key(), ?fault, "注入故障");
        self.pending_faults.push(fault);
    }

    /// 当前场景上下文；统计样本不足时 σ 取零
    pub fn context(&self) -> ScenarioContext {
        let sigma = if self.statistics.count() >= self.warmup_samples {
            self.statistics.std_dev()
        } else {
            [0.0; gs_config::DISTURBANCE_DIM]
        };
        ScenarioContext::new(self.scenario)
            .with_sigma(sigma)
            .with_calibration(self.calibrator.factor())
    }

    /// 推进一步
    pub fn step(&mut self) -> Result<CertificationResult, CoreError> {
        let set = self.estimator.estimate(&self.context())?;
        let proposal = self.policy.propose(&self.state);
        let result = match self.filter {
            FilterMode::UCbf => {
                self.certifier
                    .certify_with_cancel(&self.state, &proposal, &set, &self.cancel)?
            }
            FilterMode::Deterministic => {
                let point = UncertaintySet::new(
                    *set.center(),
                    [0.0; gs_config::DISTURBANCE_DIM],
                    set.shape(),
                )?;
                self.certifier
                    .certify_with_cancel(&self.state, &proposal, &point, &self.cancel)?
            }
            FilterMode::PassThrough => self.certifier.pass_through(&self.state, &proposal, &set)?,
        };

        let realized = self.exogenous.sample(&self.state);
        let covered = set.contains(&realized);
        let mut next = self
            .certifier
            .dynamics()
            .predict(&self.state, &result.certified, &realized)?;
        for fault in self.pending_faults.drain(..) {
            next = fault.apply(&next)?;
        }

        let factor = self.calibrator.update(covered);
        self.statistics.push(&realized);
        let violations = self
            .certifier
            .barriers()
            .count_violations(&next, self.certifier.tolerance());
        self.summary.record(&result, violations, covered, self.dt_hours);

        debug!(
            scenario = self.scenario.key(),
            tick = result.tick,
            verdict = %result.verdict,
            covered,
            violations,
            "步进完成"
        );

        self.observers.emit(&TickRecord {
            scenario: self.scenario,
            state: &self.state,
            set: &set,
            result: &result,
            realized: &realized,
            covered,
            next_state: &next,
            violations,
            calibration_factor: factor,
        });

        self.state = next;
        self.last = Some(result.clone());
        Ok(result)
    }

    /// 连续推进 `ticks` 步，取消后提前停止
    pub fn run(&mut self, ticks: u64) -> Result<RunSummary, CoreError> {
        info!(
            "开始运行场景 {}，共 {} 步，策略 {}，过滤 {}",
            self.scenario,
            ticks,
            self.policy.name(),
            self.filter.label()
        );
        for _ in 0..ticks {
            if self.cancel.is_cancelled() {
                info!("场景 {} 运行被取消", self.scenario);
                break;
            }
            self.step()?;
        }
        let summary = self.summary();
        info!("{}", summary.describe());
        Ok(summary)
    }

    /// 恢复到初始状态（保留策略与观察者）
    pub fn reset(&mut self) {
        self.state = self.initial;
        self.last = None;
        self.pending_faults.clear();
        self.summary = SummaryAccumulator::default();
        self.calibrator.reset();
        self.statistics.reset();
        self.exogenous.reset();
        self.certifier.reset();
    }
}
